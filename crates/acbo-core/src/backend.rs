//! RAG backend collaborator interface.
//!
//! The demo flow never calls a backend; every result is canned. This trait
//! and its DTOs describe the REST contract a real integration must satisfy:
//!
//! - `GET  /documents`
//! - `POST /documents/upload` (multipart `file` + `document_type`)
//! - `POST /documents/process/{id}`
//! - `POST /rag/standard` and `POST /rag/truecontext`

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::{CannedResult, Evidence, ResultMode, ResultPayload};

/// A document as the backend describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDocument {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub chunk_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    pub documents: Vec<BackendDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub document_id: Option<String>,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub chunks_created: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagQueryRequest {
    pub query: String,
    pub document_ids: Vec<String>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub tokens_input: u32,
    pub tokens_output: u32,
    pub cost: f64,
    #[serde(default)]
    pub latency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEvidence {
    pub chunk_id: String,
    pub text: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagQueryResponse {
    pub response: String,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub quality_breakdown: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub quality_attempts: Option<u32>,
    pub metrics: QueryMetrics,
    #[serde(default)]
    pub evidence: Option<Vec<BackendEvidence>>,
}

impl RagQueryResponse {
    /// Converts a backend answer into a tagged result payload.
    ///
    /// Dimensions are left empty: the backend reports a breakdown without
    /// thresholds.
    pub fn into_canned(self, mode: ResultMode) -> CannedResult {
        let payload = ResultPayload {
            response_text: self.response,
            overall_quality_score: self.quality_score.unwrap_or(0.0),
            tokens_used: self.metrics.tokens_input + self.metrics.tokens_output,
            attempt_count: self.quality_attempts.unwrap_or(1),
            dimensions: Vec::new(),
            evidence: self
                .evidence
                .unwrap_or_default()
                .into_iter()
                .map(|e| Evidence::new(e.text, e.chunk_id, e.score))
                .collect(),
        };
        match mode {
            ResultMode::Baseline => CannedResult::Baseline(payload),
            ResultMode::Optimized => CannedResult::Optimized(payload),
        }
    }
}

/// Remote RAG service.
#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<BackendDocument>>;

    async fn upload_document(
        &self,
        filename: &str,
        content: Vec<u8>,
        document_type: &str,
    ) -> Result<UploadResponse>;

    async fn process_document(&self, document_id: &str) -> Result<ProcessResponse>;

    /// `POST /rag/standard`
    async fn query_standard(&self, request: &RagQueryRequest) -> Result<RagQueryResponse>;

    /// `POST /rag/truecontext`
    async fn query_optimized(&self, request: &RagQueryRequest) -> Result<RagQueryResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_response_without_quality_fields() {
        let json = r#"{
            "response": "Water damage is covered.",
            "chunks_retrieved": 2,
            "evidence": [{"chunk_id": "c1", "text": "Section 4.2", "score": 0.8}],
            "metrics": {"tokens_input": 900, "tokens_output": 100, "cost": 0.01, "latency": 1.2}
        }"#;
        let response: RagQueryResponse = serde_json::from_str(json).unwrap();
        assert!(response.quality_score.is_none());

        let canned = response.into_canned(ResultMode::Baseline);
        assert_eq!(canned.mode(), ResultMode::Baseline);
        let payload = canned.payload();
        assert_eq!(payload.tokens_used, 1000);
        assert_eq!(payload.attempt_count, 1);
        assert_eq!(payload.evidence[0].source_label, "c1");
    }

    #[test]
    fn test_optimized_response_with_breakdown() {
        let json = r#"{
            "response": "ok",
            "quality_score": 0.87,
            "quality_breakdown": {"coverage": 0.85, "overall": 0.87},
            "quality_attempts": 2,
            "metrics": {"tokens_input": 10, "tokens_output": 5, "cost": 0.0}
        }"#;
        let response: RagQueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.quality_breakdown.as_ref().unwrap()["coverage"], 0.85);

        let canned = response.into_canned(ResultMode::Optimized);
        assert_eq!(canned.payload().overall_quality_score, 0.87);
        assert_eq!(canned.payload().attempt_count, 2);
    }

    #[test]
    fn test_request_omits_missing_top_k() {
        let request = RagQueryRequest {
            query: "q".into(),
            document_ids: vec!["d1".into()],
            model: "gpt-4.1-mini".into(),
            top_k: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("top_k").is_none());
    }
}
