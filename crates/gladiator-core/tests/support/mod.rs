#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Canned behaviour of a [`TestServer`].
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    /// Time the server waits before answering.
    pub latency: Duration,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            latency: Duration::ZERO,
        }
    }

    pub fn after(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[derive(Default)]
struct Stats {
    hits: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    heads: Mutex<Vec<String>>,
}

/// Minimal HTTP/1.1 server answering every request with the same reply.
pub struct TestServer {
    pub url: String,
    stats: Arc<Stats>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("server addr");
        let stats = Arc::new(Stats::default());

        let accept_stats = Arc::clone(&stats);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let stats = Arc::clone(&accept_stats);
                let reply = reply.clone();
                tokio::spawn(async move {
                    handle_client(stream, reply, stats).await;
                });
            }
        });

        Self {
            url: format!("http://{addr}/endpoint"),
            stats,
            handle,
        }
    }

    pub fn hits(&self) -> usize {
        self.stats.hits.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }

    /// Raw request heads received so far (request line plus headers).
    pub fn request_heads(&self) -> Vec<String> {
        self.stats.heads.lock().expect("heads lock").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_client(mut stream: TcpStream, reply: Reply, stats: Arc<Stats>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    stats.hits.fetch_add(1, Ordering::SeqCst);
    stats
        .heads
        .lock()
        .expect("heads lock")
        .push(String::from_utf8_lossy(&buf).into_owned());
    let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    stats.max_in_flight.fetch_max(now, Ordering::SeqCst);

    if !reply.latency.is_zero() {
        tokio::time::sleep(reply.latency).await;
    }

    let head = format!(
        "HTTP/1.1 {} Test\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.body.len()
    );
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&reply.body).await;
    let _ = stream.flush().await;
    stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    let _ = stream.shutdown().await;
}

/// A URL on localhost where nothing is listening.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}
