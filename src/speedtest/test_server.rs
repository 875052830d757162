//! Tiny HTTP/1.1 responder on 127.0.0.1 for exercising the transfer code.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body_len: usize,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body_len: usize,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    pub first_byte_delay: Duration,
}

impl Reply {
    pub fn ok(body_len: usize) -> Self {
        Self {
            status: 200,
            body_len,
            chunk_size: 16 * 1024,
            chunk_delay: Duration::ZERO,
            first_byte_delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::ok(0)
        }
    }

    /// Send the body `chunk_size` bytes at a time, pausing between chunks.
    pub fn trickle(mut self, chunk_size: usize, delay: Duration) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_delay = delay;
        self
    }

    /// Wait before sending the status line.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.first_byte_delay = delay;
        self
    }
}

pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl TestServer {
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        let reply = Arc::new(reply);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = log.clone();
                let reply = reply.clone();
                tokio::spawn(async move {
                    let _ = handle(stream, &*reply, &log).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn handle<F>(mut stream: TcpStream, reply: &F, log: &Mutex<Vec<Request>>) -> std::io::Result<()>
where
    F: Fn(&Request) -> Reply,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body_len = buf.len() - header_end;
    while body_len < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body_len += n;
    }

    let request = Request {
        method,
        path,
        body_len,
    };
    let reply = reply(&request);
    log.lock().unwrap().push(request);

    tokio::time::sleep(reply.first_byte_delay).await;

    let reason = if reply.status == 200 { "OK" } else { "Error" };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status, reason, reply.body_len
    );
    stream.write_all(head.as_bytes()).await?;
    stream.flush().await?;

    let payload = vec![0u8; reply.chunk_size.max(1)];
    let mut remaining = reply.body_len;
    while remaining > 0 {
        let n = remaining.min(payload.len());
        stream.write_all(&payload[..n]).await?;
        stream.flush().await?;
        remaining -= n;
        if remaining > 0 {
            tokio::time::sleep(reply.chunk_delay).await;
        }
    }

    stream.shutdown().await
}
