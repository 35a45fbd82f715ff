pub mod catalog;
pub mod config;
pub mod render;
pub mod run;
pub mod upload;

use std::sync::Arc;

use acbo_application::SessionUseCase;
use acbo_core::auth::DemoAuthenticator;
use acbo_core::config::AcboConfig;
use acbo_core::AppStore;
use anyhow::Result;

/// Shared state for one CLI invocation.
pub struct Context {
    pub config: AcboConfig,
    pub store: Arc<AppStore>,
    pub user: String,
    pub json: bool,
}

impl Context {
    pub fn new(config: AcboConfig, user: String, json: bool) -> Self {
        Self {
            config,
            store: Arc::new(AppStore::new()),
            user,
            json,
        }
    }

    /// Signs the configured user in with the demo authenticator.
    pub fn sign_in(&self) -> Result<SessionUseCase> {
        let session = SessionUseCase::new(Arc::clone(&self.store), Arc::new(DemoAuthenticator));
        let user = session.login(&self.user, "")?;
        tracing::debug!("[acbo] signed in as {}", user.email);
        Ok(session)
    }
}
