//! Session access for the data-access layer.
//!
//! The signed-in user is supplied by whoever hosts the loader. Analysis
//! code never reads it; only [`crate::loader::EventStore`] scopes rows by it.

use std::fmt;

/// Authentication state as seen by the data-access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedIn { user_id: String },
    SignedOut,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::SignedIn { user_id } => write!(f, "signed in as {}", user_id),
            SessionState::SignedOut => write!(f, "signed out"),
        }
    }
}

/// Source of the current session.
pub trait SessionProvider: Send + Sync {
    fn state(&self) -> SessionState;

    fn current_user_id(&self) -> Option<String> {
        match self.state() {
            SessionState::SignedIn { user_id } => Some(user_id),
            SessionState::SignedOut => None,
        }
    }
}

/// A session fixed at construction, as used by the CLI.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<String>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { user_id: None }
    }

    /// Signed in when `user_id` is present and non-blank.
    pub fn from_optional(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::signed_in(id),
            _ => Self::signed_out(),
        }
    }
}

impl SessionProvider for StaticSession {
    fn state(&self) -> SessionState {
        match self.user_id {
            Some(ref user_id) => SessionState::SignedIn {
                user_id: user_id.clone(),
            },
            None => SessionState::SignedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_session_states() {
        let session = StaticSession::signed_in("advisor-1");
        assert_eq!(session.current_user_id().as_deref(), Some("advisor-1"));
        assert_eq!(session.state().to_string(), "signed in as advisor-1");

        let session = StaticSession::signed_out();
        assert_eq!(session.state(), SessionState::SignedOut);
        assert!(session.current_user_id().is_none());
    }

    #[test]
    fn test_from_optional_blank_is_signed_out() {
        assert_eq!(StaticSession::from_optional(Some("  ")).state(), SessionState::SignedOut);
        assert_eq!(StaticSession::from_optional(None).state(), SessionState::SignedOut);
        assert_eq!(
            StaticSession::from_optional(Some(" u1 ")).current_user_id().as_deref(),
            Some("u1")
        );
    }
}
