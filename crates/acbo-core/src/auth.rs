//! Credential checking.
//!
//! The store's `login` action is permissive and never fails; checking
//! credentials happens before it, behind this trait.

use crate::error::{AcboError, Result};

/// Validates credentials before a session is created.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, email: &str, password: &str) -> Result<()>;
}

/// Accepts any password. Only rejects an empty email, mirroring the login
/// form's required field.
#[derive(Debug, Clone, Default)]
pub struct DemoAuthenticator;

impl Authenticator for DemoAuthenticator {
    fn authenticate(&self, email: &str, _password: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(AcboError::auth("email is required"));
        }
        Ok(())
    }
}
