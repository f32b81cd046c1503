use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::data::error::ApiError;
use crate::data::progress::{Progress, ProgressTracker};

/// HTTP client for the indexer's REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    progress: Arc<ProgressTracker>,
}

impl ApiClient {
    /// Build a client rooted at `base_url`. Request paths are resolved relative to it.
    pub fn new(base_url: &str, timeout: Duration, progress: Arc<ProgressTracker>) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).wrap_err_with(|| format!("invalid API URL: {base_url}"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            progress,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `path` (query string included) and decode the JSON body as `T`.
    ///
    /// 404 maps to [`ApiError::NotFound`], any other non-2xx status to
    /// [`ApiError::Http`]. An empty body decodes as `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        progress: Progress,
    ) -> Result<T, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid request path {path}: {e}")))?;

        let _indicator = self.progress.begin(progress);
        debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let body = response.text().await?;
        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                body
            };
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;

    /// Serve `responses` in order, one connection each, and report every request target.
    pub async fn serve(
        responses: Vec<(&'static str, String)>,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let target = read_target(&mut socket).await;
                let _ = tx.send(target);
                write_response(&mut socket, status, &body).await;
            }
        });

        (format!("http://{addr}/api/"), rx)
    }

    /// Answer `connections` requests by matching the request target against `routes`;
    /// unmatched targets get a 404.
    pub async fn serve_routes(
        routes: Vec<(&'static str, &'static str, String)>,
        connections: usize,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for _ in 0..connections {
                let (mut socket, _) = listener.accept().await.unwrap();
                let target = read_target(&mut socket).await;
                let _ = tx.send(target.clone());

                let (status, body) = routes
                    .iter()
                    .find(|(path, _, _)| *path == target)
                    .map(|(_, status, body)| (*status, body.as_str()))
                    .unwrap_or(("404 Not Found", ""));
                write_response(&mut socket, status, body).await;
            }
        });

        (format!("http://{addr}/api/"), rx)
    }

    async fn read_target(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let request = String::from_utf8_lossy(&buf);
        request.split_whitespace().nth(1).unwrap_or_default().to_string()
    }

    async fn write_response(socket: &mut TcpStream, status: &str, body: &str) {
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    }

    pub async fn serve_once(
        status: &'static str,
        body: &str,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        serve(vec![(status, body.to_string())]).await
    }
}
