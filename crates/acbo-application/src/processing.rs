//! Document processing use case.
//!
//! Walks the ingestion stages on a sequencer, mirroring progress into the
//! store, then adds one completed document per upload along with the entities
//! extracted from them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use acbo_core::config::PacingConfig;
use acbo_core::document::{Document, entities_from_documents};
use acbo_core::error::Result;
use acbo_core::registry::SEEDED_DOCUMENT_ENTITIES;
use acbo_core::scenario::ProcessingStage;
use acbo_core::track::Track;
use acbo_core::{AppStore, ScenarioRegistry};
use acbo_execution::{RunOutcome, StepSequencer};
use rand::Rng;

/// A file handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl UploadRequest {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// Guesses the MIME type from the file extension.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        let mime_type = match extension.as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            _ => "application/octet-stream",
        };
        Self::new(name, mime_type, 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Completed(Vec<Document>),
    Superseded,
}

pub struct ProcessingUseCase {
    store: Arc<AppStore>,
    pacing: PacingConfig,
    sequencer: StepSequencer,
    /// Bumped by every `process` call; guards its store writes.
    generation: Mutex<u64>,
}

impl ProcessingUseCase {
    pub fn new(store: Arc<AppStore>, pacing: PacingConfig) -> Self {
        let sequencer = StepSequencer::new(Track::Processing).with_max_duration(pacing.max_run());
        Self {
            store,
            pacing,
            sequencer,
            generation: Mutex::new(0),
        }
    }

    /// Processes `uploads`.
    ///
    /// The store's processing stage goes `0, 1, ..., N` where `N` is the
    /// number of stages; reaching `N` means done. Chunk counts are random in
    /// `20..70`.
    ///
    /// An empty upload list is a no-op.
    pub async fn process(&self, uploads: Vec<UploadRequest>) -> Result<ProcessingOutcome> {
        if uploads.is_empty() {
            return Ok(ProcessingOutcome::Completed(Vec::new()));
        }

        tracing::info!("[ProcessingUseCase] Processing {} document(s)", uploads.len());
        let (generation, handle) = {
            let mut generation = self.lock_generation();
            *generation += 1;
            self.store.set_is_processing(true);
            self.store.set_processing_stage(0);

            let store = Arc::clone(&self.store);
            let stages: Vec<ProcessingStage> = ScenarioRegistry::processing_stages().to_vec();
            let handle = self.sequencer.run(stages, self.pacing.processing_stage(), move |index, stage: &ProcessingStage| {
                tracing::debug!("[ProcessingUseCase] Stage {}: {}", index + 1, stage.name);
                store.set_processing_stage(index + 1);
                Ok(())
            });
            (*generation, handle)
        };

        match handle.wait().await {
            Ok(RunOutcome::Completed { .. }) => {}
            Ok(RunOutcome::Superseded) => return Ok(ProcessingOutcome::Superseded),
            Err(e) => {
                self.if_current(generation, |store| store.set_is_processing(false));
                return Err(e);
            }
        }

        let documents = Self::complete(uploads);
        let recorded = self.if_current(generation, |store| {
            store.add_documents(documents.clone());
            store.add_entities(entities_from_documents(&documents));
            store.set_is_processing(false);
        });
        if !recorded {
            tracing::debug!("[ProcessingUseCase] Run #{} superseded before recording", generation);
            return Ok(ProcessingOutcome::Superseded);
        }

        tracing::info!("[ProcessingUseCase] Added {} document(s)", documents.len());
        Ok(ProcessingOutcome::Completed(documents))
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` only if `generation` is still the latest run.
    fn if_current(&self, generation: u64, f: impl FnOnce(&AppStore)) -> bool {
        let current = self.lock_generation();
        if *current != generation {
            return false;
        }
        f(&self.store);
        true
    }

    fn complete(uploads: Vec<UploadRequest>) -> Vec<Document> {
        let mut rng = rand::thread_rng();
        let entities: Vec<String> = SEEDED_DOCUMENT_ENTITIES.iter().map(|e| e.to_string()).collect();
        uploads
            .into_iter()
            .map(|upload| {
                Document::new(upload.name, upload.mime_type, upload.size_bytes)
                    .completed(rng.gen_range(20..70), entities.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acbo_core::document::DocumentStatus;
    use std::time::Duration;

    fn usecase(store: &Arc<AppStore>) -> ProcessingUseCase {
        ProcessingUseCase::new(Arc::clone(store), PacingConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_adds_completed_documents() {
        let store = Arc::new(AppStore::new());
        let uploads = vec![UploadRequest::from_name("policy.pdf"), UploadRequest::from_name("claim.docx")];

        let outcome = usecase(&store).process(uploads).await.unwrap();

        let ProcessingOutcome::Completed(docs) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(docs.len(), 2);
        let state = store.snapshot();
        assert_eq!(state.documents.len(), 2);
        assert_eq!(state.documents[0].name, "policy.pdf");
        assert_eq!(state.documents[1].name, "claim.docx");
        for doc in &state.documents {
            assert_eq!(doc.status, DocumentStatus::Completed);
            let chunks = doc.chunk_count.unwrap();
            assert!((20..70).contains(&chunks));
        }
        assert_eq!(state.processing_stage, ScenarioRegistry::processing_stages().len());
        assert!(!state.is_processing);

        let holder = state.entities.iter().find(|e| e.name == "Policy Holder").unwrap();
        assert_eq!(holder.count, 2);
        assert_eq!(state.entities.len(), SEEDED_DOCUMENT_ENTITIES.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_advances_every_interval() {
        let store = Arc::new(AppStore::new());
        let usecase = Arc::new(usecase(&store));
        let running = Arc::clone(&usecase);
        let task = tokio::spawn(async move { running.process(vec![UploadRequest::from_name("a.pdf")]).await });

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let state = store.snapshot();
        assert!(state.is_processing);
        assert_eq!(state.processing_stage, 2);
        assert!(state.documents.is_empty());

        task.await.unwrap().unwrap();
        assert_eq!(store.snapshot().documents.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_superseded_after_its_stages_finish_records_nothing() {
        let store = Arc::new(AppStore::new());
        let usecase = Arc::new(usecase(&store));
        let full_run = PacingConfig::default().processing_stage() * ScenarioRegistry::processing_stages().len() as u32;

        // Start the first run but leave its future parked while the stages play out.
        let first = usecase.process(vec![UploadRequest::from_name("old.pdf")]);
        tokio::pin!(first);
        tokio::select! {
            biased;
            _ = &mut first => panic!("first run finished immediately"),
            _ = tokio::task::yield_now() => {}
        }
        tokio::time::sleep(full_run + Duration::from_millis(100)).await;
        assert_eq!(store.snapshot().processing_stage, ScenarioRegistry::processing_stages().len());

        let running = Arc::clone(&usecase);
        let second = tokio::spawn(async move { running.process(vec![UploadRequest::from_name("new.pdf")]).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(first.await.unwrap(), ProcessingOutcome::Superseded);
        let state = store.snapshot();
        assert!(state.documents.is_empty());
        assert!(state.is_processing);
        assert_eq!(state.processing_stage, 0);

        let ProcessingOutcome::Completed(docs) = second.await.unwrap().unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(docs[0].name, "new.pdf");
        let state = store.snapshot();
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.documents[0].name, "new.pdf");
        assert!(!state.is_processing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_upload_is_noop() {
        let store = Arc::new(AppStore::new());
        let outcome = usecase(&store).process(Vec::new()).await.unwrap();
        assert_eq!(outcome, ProcessingOutcome::Completed(Vec::new()));
        assert!(!store.snapshot().is_processing);
    }

    #[test]
    fn test_mime_from_name() {
        assert_eq!(UploadRequest::from_name("A.PDF").mime_type, "application/pdf");
        assert_eq!(UploadRequest::from_name("notes").mime_type, "application/octet-stream");
    }
}
