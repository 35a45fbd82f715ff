//! Session use case implementation.
//!
//! Sign-in, sign-out and the pre-query selections (domain and scenario) that
//! happen before any playback.

use std::sync::Arc;

use acbo_core::auth::Authenticator;
use acbo_core::error::{AcboError, Result};
use acbo_core::scenario::DemoScenario;
use acbo_core::session::User;
use acbo_core::{AppStore, ScenarioRegistry};

pub struct SessionUseCase {
    store: Arc<AppStore>,
    authenticator: Arc<dyn Authenticator>,
}

impl SessionUseCase {
    /// Creates a new `SessionUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The shared state store
    /// * `authenticator` - Checks credentials before the store is signed in
    pub fn new(store: Arc<AppStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self { store, authenticator }
    }

    /// Validates credentials, then signs in.
    ///
    /// # Errors
    ///
    /// `Auth` if the authenticator rejects the credentials. The session is
    /// left signed out.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        self.authenticator.authenticate(email, password)?;
        self.store.login(email, password);

        let user = self
            .store
            .read(|s| s.session.user.clone())
            .ok_or_else(|| AcboError::internal("login did not produce a user"))?;
        tracing::info!("[SessionUseCase] Signed in as {}", user.display_name);
        Ok(user)
    }

    pub fn logout(&self) {
        tracing::info!("[SessionUseCase] Signed out");
        self.store.logout();
    }

    /// Selects a domain from the picker.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown domain, `Config` for one that is listed but
    /// not enabled.
    pub fn select_domain(&self, domain_id: &str) -> Result<()> {
        let domain = ScenarioRegistry::domains()
            .iter()
            .find(|d| d.id.eq_ignore_ascii_case(domain_id))
            .ok_or_else(|| AcboError::not_found("Domain", domain_id))?;
        if !domain.enabled {
            return Err(AcboError::config(format!("domain '{}' is not available", domain.id)));
        }
        self.store.set_domain(domain.id.clone());
        Ok(())
    }

    /// Makes a scenario active without running it.
    pub fn select_scenario(&self, scenario_id: &str) -> Result<&'static DemoScenario> {
        let scenario = ScenarioRegistry::find(scenario_id)
            .ok_or_else(|| AcboError::not_found("DemoScenario", scenario_id))?;
        self.store.set_domain(scenario.domain.clone());
        self.store.set_active_scenario(Some(scenario.clone()));
        self.store.set_current_query(scenario.query_text.clone());
        Ok(scenario)
    }
}
