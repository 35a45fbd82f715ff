//! Application state store.
//!
//! `AppStore` is the single owner and the only mutator of the pilot's session,
//! document, query and insight state. Each action applies its whole mutation
//! inside one `watch::Sender::send_modify` call: the change is atomic, and all
//! subscribers are marked changed before the action returns. Subscribers read
//! whole snapshots, so no reader can observe half of an action.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::document::{Document, Entity};
use crate::error::{AcboError, Result};
use crate::insight::{AccuracyPoint, LearningInsight};
use crate::query::{Feedback, QueryResult, ResultMode};
use crate::registry::ScenarioRegistry;
use crate::scenario::DemoScenario;
use crate::session::{Session, User};
use crate::track::TrackProgress;

/// A full snapshot of the pilot's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    // Auth
    pub session: Session,

    // Domain
    pub selected_domain: Option<String>,

    // Documents
    pub documents: Vec<Document>,
    pub entities: Vec<Entity>,
    pub processing_stage: usize,
    pub is_processing: bool,

    // Query
    pub current_query: String,
    /// Newest first.
    pub query_history: Vec<QueryResult>,
    pub active_result: Option<QueryResult>,
    pub is_querying: bool,

    // Mode
    pub is_compare_mode: bool,
    pub acbo_enabled: bool,

    // Learning
    pub insights: Vec<LearningInsight>,
    pub accuracy_history: Vec<AccuracyPoint>,

    // Demo
    pub active_scenario: Option<DemoScenario>,
    pub baseline_track: TrackProgress,
    pub optimized_track: TrackProgress,
    pub results_visible: bool,
}

impl AppState {
    /// Initial state: signed out, ACBO enabled, insights seeded from the registry.
    pub fn seeded() -> Self {
        Self {
            session: Session::default(),
            selected_domain: None,
            documents: Vec::new(),
            entities: Vec::new(),
            processing_stage: 0,
            is_processing: false,
            current_query: String::new(),
            query_history: Vec::new(),
            active_result: None,
            is_querying: false,
            is_compare_mode: false,
            acbo_enabled: true,
            insights: ScenarioRegistry::insights().to_vec(),
            accuracy_history: ScenarioRegistry::accuracy_history().to_vec(),
            active_scenario: None,
            baseline_track: TrackProgress::default(),
            optimized_track: TrackProgress::default(),
            results_visible: false,
        }
    }

    pub fn track(&self, mode: ResultMode) -> &TrackProgress {
        match mode {
            ResultMode::Baseline => &self.baseline_track,
            ResultMode::Optimized => &self.optimized_track,
        }
    }

    fn track_mut(&mut self, mode: ResultMode) -> &mut TrackProgress {
        match mode {
            ResultMode::Baseline => &mut self.baseline_track,
            ResultMode::Optimized => &mut self.optimized_track,
        }
    }

    pub fn find_result(&self, result_id: &str) -> Option<&QueryResult> {
        self.query_history.iter().find(|r| r.id == result_id)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::seeded()
    }
}

/// The state container. Share it as `Arc<AppStore>`.
pub struct AppStore {
    state: watch::Sender<AppState>,
}

impl AppStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AppState::seeded());
        Self { state }
    }

    /// Returns a receiver that is marked changed after every action.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn apply(&self, action: &'static str, f: impl FnOnce(&mut AppState)) {
        tracing::debug!("[AppStore] {}", action);
        self.state.send_modify(f);
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Signs in. Never fails; credentials are checked by an `Authenticator`
    /// before this is called.
    pub fn login(&self, email: &str, _password: &str) {
        let user = User::from_email(email);
        self.apply("login", |s| s.session = Session::signed_in(user));
    }

    /// Clears the session, selected domain, documents and entities.
    pub fn logout(&self) {
        self.apply("logout", |s| {
            s.session = Session::default();
            s.selected_domain = None;
            s.documents.clear();
            s.entities.clear();
        });
    }

    pub fn set_domain(&self, domain: impl Into<String>) {
        let domain = domain.into();
        self.apply("set_domain", |s| s.selected_domain = Some(domain));
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Appends in call order. Ids are not de-duplicated.
    pub fn add_documents(&self, docs: Vec<Document>) {
        self.apply("add_documents", |s| s.documents.extend(docs));
    }

    /// Merges entities by name; counts add up and document ids are unioned.
    pub fn add_entities(&self, entities: Vec<Entity>) {
        self.apply("add_entities", |s| {
            for entity in entities {
                match s.entities.iter_mut().find(|e| e.name == entity.name) {
                    Some(existing) => existing.merge(entity),
                    None => s.entities.push(entity),
                }
            }
        });
    }

    /// No monotonicity check: callers may move the stage backwards.
    pub fn set_processing_stage(&self, stage: usize) {
        self.apply("set_processing_stage", |s| s.processing_stage = stage);
    }

    pub fn set_is_processing(&self, processing: bool) {
        self.apply("set_is_processing", |s| s.is_processing = processing);
    }

    // ========================================================================
    // Query
    // ========================================================================

    pub fn set_current_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.apply("set_current_query", |s| s.current_query = query);
    }

    /// Prepends to history and makes the result active.
    pub fn add_query_result(&self, result: QueryResult) {
        self.apply("add_query_result", |s| {
            s.query_history.insert(0, result.clone());
            s.active_result = Some(result);
        });
    }

    pub fn set_active_result(&self, result: Option<QueryResult>) {
        self.apply("set_active_result", |s| s.active_result = result);
    }

    pub fn set_is_querying(&self, querying: bool) {
        self.apply("set_is_querying", |s| s.is_querying = querying);
    }

    // ========================================================================
    // Mode
    // ========================================================================

    pub fn toggle_compare_mode(&self) {
        self.apply("toggle_compare_mode", |s| s.is_compare_mode = !s.is_compare_mode);
    }

    pub fn set_compare_mode(&self, enabled: bool) {
        self.apply("set_compare_mode", |s| s.is_compare_mode = enabled);
    }

    pub fn toggle_acbo_enabled(&self) {
        self.apply("toggle_acbo_enabled", |s| s.acbo_enabled = !s.acbo_enabled);
    }

    // ========================================================================
    // Demo
    // ========================================================================

    pub fn set_active_scenario(&self, scenario: Option<DemoScenario>) {
        self.apply("set_active_scenario", |s| s.active_scenario = scenario);
    }

    pub fn set_track_progress(&self, mode: ResultMode, progress: TrackProgress) {
        self.apply("set_track_progress", |s| *s.track_mut(mode) = progress);
    }

    /// Both tracks back to idle and results hidden, in one action.
    pub fn reset_tracks(&self) {
        self.apply("reset_tracks", |s| {
            s.baseline_track = TrackProgress::default();
            s.optimized_track = TrackProgress::default();
            s.results_visible = false;
        });
    }

    pub fn set_results_visible(&self, visible: bool) {
        self.apply("set_results_visible", |s| s.results_visible = visible);
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    /// Records feedback on a result in history, and on the active result if
    /// it is the same one.
    ///
    /// # Errors
    ///
    /// `NotFound` if no result in history has `result_id`. State is left
    /// untouched and subscribers are not notified.
    pub fn submit_feedback(&self, result_id: &str, feedback: Feedback) -> Result<()> {
        let found = self.state.send_if_modified(|s| {
            let Some(entry) = s.query_history.iter_mut().find(|r| r.id == result_id) else {
                return false;
            };
            entry.feedback = Some(feedback);
            if let Some(active) = s.active_result.as_mut().filter(|a| a.id == result_id) {
                active.feedback = Some(feedback);
            }
            true
        });

        if !found {
            tracing::warn!("[AppStore] feedback for unknown result: {}", result_id);
            return Err(AcboError::not_found("QueryResult", result_id));
        }
        tracing::debug!("[AppStore] submit_feedback {} -> {}", result_id, feedback);
        Ok(())
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CannedResult, ResultPayload};
    use crate::track::TrackState;

    fn result(score: f64) -> QueryResult {
        let payload = ResultPayload {
            response_text: "r".into(),
            overall_quality_score: score,
            tokens_used: 100,
            attempt_count: 1,
            dimensions: Vec::new(),
            evidence: Vec::new(),
        };
        QueryResult::new("q", CannedResult::Optimized(payload), 8000)
    }

    fn doc(name: &str) -> Document {
        Document::new(name, "application/pdf", 10)
    }

    #[test]
    fn test_initial_state() {
        let state = AppStore::new().snapshot();
        assert!(!state.session.authenticated);
        assert!(state.acbo_enabled);
        assert!(!state.is_compare_mode);
        assert_eq!(state.insights.len(), 4);
        assert_eq!(state.accuracy_history.len(), 6);
    }

    #[test]
    fn test_login_derives_display_name() {
        let store = AppStore::new();
        store.login("demo@acbo.ai", "demo");
        let state = store.snapshot();
        assert!(state.session.authenticated);
        assert_eq!(state.session.user.unwrap().display_name, "demo");
    }

    #[test]
    fn test_logout_clears_session_and_documents() {
        let store = AppStore::new();
        store.login("a@b.c", "x");
        store.set_domain("Insurance");
        store.add_documents(vec![doc("a.pdf")]);
        store.add_entities(vec![Entity::new("Deductible", crate::document::EntityKind::Policy)]);

        store.logout();

        let state = store.snapshot();
        assert!(!state.session.authenticated);
        assert!(state.session.user.is_none());
        assert!(state.selected_domain.is_none());
        assert!(state.documents.is_empty());
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_logout_when_never_logged_in() {
        let store = AppStore::new();
        store.logout();
        let state = store.snapshot();
        assert!(!state.session.authenticated);
        assert!(state.session.user.is_none());
    }

    #[test]
    fn test_add_documents_preserves_batch_order() {
        let store = AppStore::new();
        let batches = vec![
            vec![doc("1"), doc("2")],
            vec![],
            vec![doc("3")],
            vec![doc("4"), doc("5"), doc("6")],
        ];
        let expected: Vec<String> = batches.iter().flatten().map(|d| d.name.clone()).collect();
        let total: usize = batches.iter().map(Vec::len).sum();

        for batch in batches {
            store.add_documents(batch);
        }

        let names: Vec<String> = store.read(|s| s.documents.iter().map(|d| d.name.clone()).collect());
        assert_eq!(names.len(), total);
        assert_eq!(names, expected);
    }

    #[test]
    fn test_add_documents_keeps_duplicate_ids() {
        let store = AppStore::new();
        let d = doc("dup.pdf");
        store.add_documents(vec![d.clone(), d]);
        assert_eq!(store.read(|s| s.documents.len()), 2);
    }

    #[test]
    fn test_add_query_result_prepends_and_activates() {
        let store = AppStore::new();
        let first = result(0.4);
        let second = result(0.9);
        store.add_query_result(first.clone());
        store.add_query_result(second.clone());

        let state = store.snapshot();
        assert_eq!(state.query_history[0].id, second.id);
        assert_eq!(state.query_history[1].id, first.id);
        assert_eq!(state.active_result.unwrap().id, second.id);
    }

    #[test]
    fn test_submit_feedback_updates_only_target() {
        let store = AppStore::new();
        let a = result(0.4);
        let b = result(0.9);
        store.add_query_result(a.clone());
        store.add_query_result(b.clone());

        store.submit_feedback(&a.id, Feedback::Negative).unwrap();

        let state = store.snapshot();
        assert_eq!(state.find_result(&a.id).unwrap().feedback, Some(Feedback::Negative));
        assert_eq!(state.find_result(&b.id).unwrap().feedback, None);
        // b is active, so the active copy is untouched
        assert_eq!(state.active_result.as_ref().unwrap().feedback, None);

        store.submit_feedback(&b.id, Feedback::Positive).unwrap();
        let state = store.snapshot();
        assert_eq!(state.active_result.as_ref().unwrap().feedback, Some(Feedback::Positive));
        assert_eq!(state.find_result(&a.id).unwrap().feedback, Some(Feedback::Negative));
    }

    #[test]
    fn test_submit_feedback_unknown_id_leaves_state_untouched() {
        let store = AppStore::new();
        store.add_query_result(result(0.5));
        let before = store.snapshot();
        let rx = store.subscribe();

        let err = store.submit_feedback("missing", Feedback::Positive).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.snapshot(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_subscribers_are_notified_before_action_returns() {
        let store = AppStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.toggle_compare_mode();

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_compare_mode);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_toggles_flip() {
        let store = AppStore::new();
        store.toggle_acbo_enabled();
        assert!(!store.read(|s| s.acbo_enabled));
        store.toggle_acbo_enabled();
        assert!(store.read(|s| s.acbo_enabled));
    }

    #[test]
    fn test_processing_stage_may_regress() {
        let store = AppStore::new();
        store.set_processing_stage(4);
        store.set_processing_stage(1);
        assert_eq!(store.read(|s| s.processing_stage), 1);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let store = AppStore::new();
        let mut snapshot = store.snapshot();
        snapshot.current_query = "mutated locally".into();
        assert!(store.read(|s| s.current_query.is_empty()));
    }

    #[test]
    fn test_reset_tracks() {
        let store = AppStore::new();
        let mut progress = TrackProgress::started(4);
        progress.state = TrackState::Running { step: 2 };
        store.set_track_progress(ResultMode::Baseline, progress);
        store.set_results_visible(true);

        store.reset_tracks();

        let state = store.snapshot();
        assert_eq!(state.track(ResultMode::Baseline).state, TrackState::Idle);
        assert!(!state.results_visible);
    }
}
