//! Session domain model.

use serde::{Deserialize, Serialize};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    /// Derived from the local part of the email at login.
    pub display_name: String,
}

impl User {
    /// Builds a user from an email address.
    ///
    /// The display name is everything before the first `@`, or the whole
    /// address if it has none.
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let display_name = email
            .split_once('@')
            .map(|(local, _)| local)
            .unwrap_or(&email)
            .to_string();
        Self {
            email,
            display_name,
        }
    }
}

/// Authentication state for the current process.
///
/// Created on login, cleared on logout. Owned exclusively by `AppStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<User>,
}

impl Session {
    pub fn signed_in(user: User) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_local_part() {
        let user = User::from_email("demo@acbo.ai");
        assert_eq!(user.display_name, "demo");
        assert_eq!(user.email, "demo@acbo.ai");
    }

    #[test]
    fn test_display_name_without_at() {
        let user = User::from_email("operator");
        assert_eq!(user.display_name, "operator");
    }

    #[test]
    fn test_default_session_is_signed_out() {
        let session = Session::default();
        assert!(!session.authenticated);
        assert!(session.user.is_none());
    }
}
