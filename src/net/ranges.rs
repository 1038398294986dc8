//! Private IPv4 range table.
//!
//! Ranges are bucketed by the first two characters of the dotted-decimal
//! form of an address ("10", "12", "17", "19"). A bucket hit is confirmed
//! with an inclusive numeric bound check, so "100.1.1.1" lands in the "10"
//! bucket but falls outside 10.0.0.0/8.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

/// An inclusive range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateRange {
    pub name: &'static str,
    start: u32,
    end: u32,
}

impl PrivateRange {
    const fn new(name: &'static str, start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self {
            name,
            start: start.to_bits(),
            end: end.to_bits(),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let value = u32::from(addr);
        self.start <= value && value <= self.end
    }
}

const PRIVATE_RANGES: [(&str, PrivateRange); 4] = [
    (
        "10",
        PrivateRange::new(
            "10.0.0.0/8",
            Ipv4Addr::new(10, 0, 0, 0),
            Ipv4Addr::new(10, 255, 255, 255),
        ),
    ),
    (
        "12",
        PrivateRange::new(
            "127.0.0.0/8",
            Ipv4Addr::new(127, 0, 0, 0),
            Ipv4Addr::new(127, 255, 255, 255),
        ),
    ),
    (
        "17",
        PrivateRange::new(
            "172.16.0.0/12",
            Ipv4Addr::new(172, 16, 0, 0),
            Ipv4Addr::new(172, 31, 255, 255),
        ),
    ),
    (
        "19",
        PrivateRange::new(
            "192.168.0.0/16",
            Ipv4Addr::new(192, 168, 0, 0),
            Ipv4Addr::new(192, 168, 255, 255),
        ),
    ),
];

/// Read-only lookup table of private ranges.
#[derive(Debug)]
pub struct PrivateRangeTable {
    buckets: HashMap<&'static str, PrivateRange>,
}

impl PrivateRangeTable {
    /// The process-wide table, built on first use.
    pub fn shared() -> &'static PrivateRangeTable {
        static TABLE: OnceLock<PrivateRangeTable> = OnceLock::new();
        TABLE.get_or_init(|| PrivateRangeTable {
            buckets: PRIVATE_RANGES.into_iter().collect(),
        })
    }

    /// Returns the private range containing `addr`, if any.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<&PrivateRange> {
        let text = addr.to_string();
        let key = text.get(..2)?;
        self.buckets.get(key).filter(|range| range.contains(addr))
    }

    pub fn is_private(&self, addr: Ipv4Addr) -> bool {
        self.lookup(addr).is_some()
    }
}
