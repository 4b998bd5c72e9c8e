// ABOUTME: serves canned http responses on a loopback port for in-process stage tests.
// ABOUTME: records each raw request so tests can assert on paths, headers and bodies.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct Responder {
    pub base_url: String,
    requests: JoinHandle<Vec<String>>,
}

impl Responder {
    /// Waits until every canned response was served and returns the raw requests in order.
    pub async fn requests(self) -> Vec<String> {
        self.requests.await.unwrap()
    }
}

/// Answers one connection per canned `(status, body)` pair, in order.
pub async fn serve(responses: Vec<(u16, String)>) -> Responder {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let requests = tokio::spawn(async move {
        let mut seen = Vec::with_capacity(responses.len());
        for (status, body) in responses {
            let (mut stream, _addr) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        seen
    });

    Responder { base_url, requests }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    let head_end = loop {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&data).to_string();
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < head_end + content_length {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }

    String::from_utf8_lossy(&data).to_string()
}
