//! HTTP client for the RAG backend.
//!
//! Implements `RagBackend` against the REST API described in
//! `acbo_core::backend`. The demo flow never calls it.

use std::time::Duration;

use acbo_core::backend::{
    BackendDocument, DocumentList, ProcessResponse, RagBackend, RagQueryRequest, RagQueryResponse, UploadResponse,
};
use acbo_core::config::BackendConfig;
use acbo_core::error::{AcboError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

pub struct HttpRagBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRagBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AcboError::backend(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AcboError::backend(format!("{} failed ({}): {}", what, status, error_text)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AcboError::backend(format!("Failed to parse {} response: {}", what, e)))
    }
}

#[async_trait]
impl RagBackend for HttpRagBackend {
    async fn list_documents(&self) -> Result<Vec<BackendDocument>> {
        let list: DocumentList = self.send(self.client.get(self.url("/documents")), "list documents").await?;
        Ok(list.documents)
    }

    async fn upload_document(&self, filename: &str, content: Vec<u8>, document_type: &str) -> Result<UploadResponse> {
        let form = Form::new()
            .part("file", Part::bytes(content).file_name(filename.to_string()))
            .text("document_type", document_type.to_string());
        tracing::debug!("[HttpRagBackend] Uploading {}", filename);
        self.send(self.client.post(self.url("/documents/upload")).multipart(form), "upload")
            .await
    }

    async fn process_document(&self, document_id: &str) -> Result<ProcessResponse> {
        let url = self.url(&format!("/documents/process/{}", document_id));
        self.send(self.client.post(url), "process").await
    }

    async fn query_standard(&self, request: &RagQueryRequest) -> Result<RagQueryResponse> {
        self.send(self.client.post(self.url("/rag/standard")).json(request), "standard query")
            .await
    }

    async fn query_optimized(&self, request: &RagQueryRequest) -> Result<RagQueryResponse> {
        self.send(self.client.post(self.url("/rag/truecontext")).json(request), "optimized query")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned response and returns the raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (BackendConfig, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });

        let config = BackendConfig {
            base_url: format!("http://{}/", addr),
            ..BackendConfig::default()
        };
        (config, handle)
    }

    #[tokio::test]
    async fn test_list_documents() {
        let (config, server) = serve_once(
            "200 OK",
            r#"{"documents":[{"id":"d1","filename":"policy.pdf","processed":true,"chunk_count":42}]}"#,
        )
        .await;

        let docs = HttpRagBackend::new(&config).list_documents().await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].chunk_count, Some(42));
        assert!(server.await.unwrap().starts_with("GET /documents "));
    }

    #[tokio::test]
    async fn test_optimized_query_posts_json() {
        let (config, server) = serve_once(
            "200 OK",
            r#"{"response":"ok","quality_score":0.9,"quality_attempts":2,"metrics":{"tokens_input":10,"tokens_output":5,"cost":0.0}}"#,
        )
        .await;
        let request = RagQueryRequest {
            query: "What is covered?".into(),
            document_ids: vec!["d1".into()],
            model: config.model.clone(),
            top_k: Some(5),
        };

        let response = HttpRagBackend::new(&config).query_optimized(&request).await.unwrap();

        assert_eq!(response.quality_attempts, Some(2));
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /rag/truecontext "));
        assert!(raw.contains(r#""top_k":5"#));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_backend_error() {
        let (config, server) = serve_once("500 Internal Server Error", r#"{"detail":"index missing"}"#).await;

        let err = HttpRagBackend::new(&config).process_document("d1").await.unwrap_err();

        assert!(matches!(&err, AcboError::Backend(msg) if msg.contains("index missing")));
        assert!(server.await.unwrap().starts_with("POST /documents/process/d1 "));
    }
}
