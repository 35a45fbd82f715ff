//! Queries answered by a live RAG backend instead of the canned catalog.

use std::sync::Arc;

use acbo_core::AppStore;
use acbo_core::backend::{RagBackend, RagQueryRequest};
use acbo_core::config::AcboConfig;
use acbo_core::error::{AcboError, Result};
use acbo_core::query::{QueryResult, ResultMode};

pub struct RemoteQueryUseCase {
    store: Arc<AppStore>,
    backend: Arc<dyn RagBackend>,
    model: String,
    budget_limit: u32,
}

impl RemoteQueryUseCase {
    pub fn new(store: Arc<AppStore>, backend: Arc<dyn RagBackend>, config: &AcboConfig) -> Self {
        Self {
            store,
            backend,
            model: config.backend.model.clone(),
            budget_limit: config.budget.token_limit,
        }
    }

    /// Sends `query` over every processed backend document and records the
    /// answer. The optimized endpoint is used when ACBO is enabled.
    ///
    /// # Errors
    ///
    /// `Backend` if the backend is unreachable, answers with an error, or has
    /// no processed documents. Nothing is recorded in that case.
    pub async fn run_query(&self, query: &str) -> Result<QueryResult> {
        let mode = if self.store.read(|s| s.acbo_enabled) {
            ResultMode::Optimized
        } else {
            ResultMode::Baseline
        };

        self.store.set_current_query(query);
        self.store.set_is_querying(true);
        let answer = self.ask(query, mode).await;
        self.store.set_is_querying(false);

        let result = answer?;
        self.store.add_query_result(result.clone());
        self.store.set_results_visible(true);
        tracing::info!(
            "[RemoteQueryUseCase] {} answer, quality {:.2}, {} tokens",
            mode,
            result.overall_quality_score(),
            result.tokens_used()
        );
        Ok(result)
    }

    async fn ask(&self, query: &str, mode: ResultMode) -> Result<QueryResult> {
        let document_ids: Vec<String> = self
            .backend
            .list_documents()
            .await?
            .into_iter()
            .filter(|d| d.processed)
            .map(|d| d.id)
            .collect();
        if document_ids.is_empty() {
            return Err(AcboError::backend("no processed documents on the backend"));
        }

        let request = RagQueryRequest {
            query: query.to_string(),
            document_ids,
            model: self.model.clone(),
            top_k: None,
        };
        let response = match mode {
            ResultMode::Baseline => self.backend.query_standard(&request).await?,
            ResultMode::Optimized => self.backend.query_optimized(&request).await?,
        };
        Ok(QueryResult::new(query, response.into_canned(mode), self.budget_limit))
    }
}
