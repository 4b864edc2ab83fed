//! Scripted HTTP server for end-to-end pipeline tests.
//!
//! Serves one scripted response per incoming request, in order, and records
//! every request head so tests can assert on headers and query strings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

#[derive(Clone)]
pub enum ScriptedResponse {
    Respond { status: u16, body: String },
    /// Drop the connection after reading the request.
    Reset,
    /// Read the request, then never answer.
    Stall,
}

pub fn response_json(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse::Respond {
        status,
        body: body.to_string(),
    }
}

pub struct ScriptedServer {
    base_url: String,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let request_count = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn({
            let scripts = Arc::clone(&scripts);
            let request_count = Arc::clone(&request_count);
            let requests = Arc::clone(&requests);

            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    let scripts = Arc::clone(&scripts);
                    let request_count = Arc::clone(&request_count);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        serve_one(socket, &scripts, &request_count, &requests).await;
                    });
                }
            }
        });

        Self {
            base_url,
            request_count,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Acquire)
    }

    /// The recorded head (request line and headers) of the nth request.
    pub fn recorded_request(&self, index: usize) -> Option<String> {
        let requests = match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        requests.get(index).cloned()
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: &[ScriptedResponse],
    request_count: &AtomicUsize,
    requests: &Mutex<Vec<String>>,
) {
    let Ok(head) = read_request_head(&mut socket).await else {
        return;
    };

    let index = request_count.fetch_add(1, Ordering::AcqRel);
    {
        let mut recorded = match requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        recorded.push(head);
    }

    let response = scripts.get(index).cloned().unwrap_or_else(|| {
        response_json(500, r#"{"code":500,"message":"unexpected request"}"#)
    });

    match response {
        ScriptedResponse::Reset => {}
        ScriptedResponse::Stall => {
            // Long enough to outlive any client timeout used in tests.
            sleep(Duration::from_secs(30)).await;
        }
        ScriptedResponse::Respond { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                status_reason(status),
                body.len(),
            );

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    }
}

async fn read_request_head(socket: &mut TcpStream) -> std::io::Result<String> {
    let mut request = Vec::new();
    let mut buffer = [0_u8; 2048];
    let mut header_end = None;

    loop {
        if header_end.is_none() {
            header_end = request
                .windows(4)
                .position(|window| window == b"\r\n\r\n")
                .map(|position| position + 4);
        }

        // Drain the body as well so the client is never mid-write when the
        // scripted response closes the connection.
        if let Some(header_end) = header_end {
            let head = String::from_utf8_lossy(&request[..header_end]).into_owned();
            let content_length = content_length(&head);
            if request.len() >= header_end + content_length {
                return Ok(head);
            }
        }

        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Ok(String::from_utf8_lossy(&request).into_owned());
        }
        request.extend_from_slice(&buffer[..n]);
    }
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}
