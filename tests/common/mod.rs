#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use papercheck_lib::optimize::{OptimizationError, OptimizationResult, TextOptimizer};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
    sync::Semaphore,
};

/// One canned HTTP response.
#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
}

impl Canned {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Loopback server answering every request with the same response and
/// recording `(request line, body)` pairs.
pub struct MockServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockServer {
    pub async fn start(response: Canned) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let response = response.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let (read, mut write) = stream.into_split();
                    let mut reader = BufReader::new(read);

                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).await.is_err() {
                        return;
                    }

                    let mut content_length = 0usize;
                    loop {
                        let mut header = String::new();
                        if reader.read_line(&mut header).await.unwrap_or(0) == 0 {
                            break;
                        }
                        let header = header.trim_end();
                        if header.is_empty() {
                            break;
                        }
                        if let Some((name, value)) = header.split_once(':') {
                            if name.eq_ignore_ascii_case("content-length") {
                                content_length = value.trim().parse().unwrap_or(0);
                            }
                        }
                    }

                    let mut body = vec![0u8; content_length];
                    if reader.read_exact(&mut body).await.is_err() {
                        return;
                    }
                    recorded.lock().unwrap().push((
                        request_line.trim_end().to_string(),
                        String::from_utf8_lossy(&body).into_owned(),
                    ));

                    let reply = format!(
                        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        response.status,
                        response.body.len(),
                        response.body
                    );
                    let _ = write.write_all(reply.as_bytes()).await;
                    let _ = write.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            requests,
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// In-process optimizer returning a fixed outcome and counting calls.
pub struct FakeOptimizer {
    outcome: Result<OptimizationResult, OptimizationError>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeOptimizer {
    pub fn succeeding(optimized_text: &str) -> Self {
        Self {
            outcome: Ok(OptimizationResult {
                optimized_text: optimized_text.to_string(),
                improvements: vec!["Varied sentence length".to_string()],
            }),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn failing(err: OptimizationError) -> Self {
        Self {
            outcome: Err(err),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Holds every call until the test adds a permit to `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextOptimizer for FakeOptimizer {
    async fn optimize(&self, _text: &str) -> Result<OptimizationResult, OptimizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|err| OptimizationError::Transport(err.to_string()))?;
        }
        self.outcome.clone()
    }
}
