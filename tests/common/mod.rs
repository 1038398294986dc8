//! Shared utilities for integration tests.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use lunar_interceptor::config::InterceptorConfig;
use lunar_interceptor::net::StaticResolver;
use lunar_interceptor::resilience::MockClock;
use lunar_interceptor::Interceptor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` gets the raw request head and returns the status and body to answer with.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let (status, body) = f(head).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

#[allow(dead_code)]
async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// A port nothing listens on.
#[allow(dead_code)]
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Interceptor pointed at `proxy`, driven by a mock clock and a fixed resolver.
#[allow(dead_code)]
pub fn interceptor(config: &InterceptorConfig) -> (Interceptor, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new(1_000_000));
    let resolver = StaticResolver::new()
        .with("api.example.com", Ipv4Addr::new(93, 184, 216, 34))
        .with("payments.example.org", Ipv4Addr::new(151, 101, 1, 69))
        .with("httpbinmock", Ipv4Addr::new(172, 18, 0, 5))
        .with("db.internal", Ipv4Addr::new(10, 1, 2, 3));
    let interceptor = Interceptor::with_parts(config, clock.clone(), Arc::new(resolver));
    (interceptor, clock)
}

/// Config routing through `lunar-proxy:8000` for tenant `acme`.
#[allow(dead_code)]
pub fn proxy_config() -> InterceptorConfig {
    let mut config = InterceptorConfig::default();
    config.proxy.host = Some("lunar-proxy:8000".into());
    config.proxy.tenant_id = "acme".into();
    config
}
