//! Host name resolution.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

/// Resolves a host name to an IPv4 address.
pub trait Resolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, host: &str) -> io::Result<Ipv4Addr>;
}

/// Resolver backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> io::Result<Ipv4Addr> {
        (host, 0)
            .to_socket_addrs()?
            .find_map(|addr| match addr.ip() {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no IPv4 address for '{host}'"))
            })
    }
}

/// Fixed host table. Unknown names fail to resolve.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    entries: HashMap<String, Ipv4Addr>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: impl Into<String>, addr: Ipv4Addr) -> Self {
        self.entries.insert(host.into(), addr);
        self
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, host: &str) -> io::Result<Ipv4Addr> {
        self.entries.get(host).copied().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("unknown host '{host}'"))
        })
    }
}
