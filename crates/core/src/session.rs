//! Sign-in gate for protected console views.
//!
//! ```text
//! Unknown --confirm(Some)--> Authenticated --sign_out--> Unauthenticated
//!    \------confirm(None)--> Unauthenticated --login_succeeded--> Authenticated
//! ```
//!
//! While the state is unknown, protected views show a loading indicator.
//! Unauthenticated visitors are sent to the login form and the requested
//! view is remembered so a successful login can return to it.

use serde::{Deserialize, Serialize};

use crate::types::DocId;

/// View shown after login when nothing else was requested.
pub const DEFAULT_VIEW: &str = "/";

/// Route of the login form.
pub const LOGIN_VIEW: &str = "/login";

/// The signed-in account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: DocId,
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Authenticated(SessionUser),
    Unauthenticated,
}

/// What a protected view should do for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewDecision {
    Loading,
    Render,
    RedirectToLogin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGate {
    state: SessionState,
    return_to: Option<String>,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unknown,
            return_to: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Record the identity service's answer about the current session.
    pub fn confirm(&mut self, user: Option<SessionUser>) {
        self.state = match user {
            Some(user) => SessionState::Authenticated(user),
            None => SessionState::Unauthenticated,
        };
    }

    /// Decide how a protected `view` is handled, remembering it when the
    /// visitor must sign in first.
    pub fn guard(&mut self, view: &str) -> ViewDecision {
        match self.state {
            SessionState::Authenticated(_) => ViewDecision::Render,
            SessionState::Unknown => {
                self.remember(view);
                ViewDecision::Loading
            }
            SessionState::Unauthenticated => {
                self.remember(view);
                ViewDecision::RedirectToLogin
            }
        }
    }

    /// Transition to `Authenticated` and return the view to navigate to.
    pub fn login_succeeded(&mut self, user: SessionUser) -> String {
        self.state = SessionState::Authenticated(user);
        self.return_to
            .take()
            .unwrap_or_else(|| DEFAULT_VIEW.to_string())
    }

    pub fn sign_out(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.return_to = None;
    }

    fn remember(&mut self, view: &str) {
        if view != LOGIN_VIEW {
            self.return_to = Some(view.to_string());
        }
    }
}
