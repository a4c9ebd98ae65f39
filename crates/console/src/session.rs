//! Sign-in state of the console.
//!
//! Wraps [`AuthGate`] around the API's session calls. Only accounts
//! carrying the admin marker count as signed in; any other account is
//! signed straight back out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cursus_core::session::{AuthGate, SessionState, SessionUser, ViewDecision};
use cursus_core::validation::require_email;

use crate::api::CatalogApi;
use crate::error::{normalize, ConsoleError, ConsoleResult};

pub struct SessionController {
    api: Arc<dyn CatalogApi>,
    gate: Mutex<AuthGate>,
}

impl SessionController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            gate: Mutex::new(AuthGate::new()),
        }
    }

    fn gate(&self) -> MutexGuard<'_, AuthGate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        self.gate().state().clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.gate().user().cloned()
    }

    /// Ask the API who is signed in and leave the `Unknown` state.
    pub async fn resolve(&self) -> ConsoleResult<()> {
        match self.api.current_user().await {
            Ok(user) => {
                self.gate().confirm(user.filter(|u| u.is_admin));
                Ok(())
            }
            Err(e) => {
                self.gate().confirm(None);
                Err(normalize("vérifier la session", e))
            }
        }
    }

    /// Decide how the protected `view` is handled right now.
    pub fn guard(&self, view: &str) -> ViewDecision {
        self.gate().guard(view)
    }

    /// Sign in and return the view to navigate to.
    pub async fn login(&self, email: &str, password: &str) -> ConsoleResult<String> {
        let email = require_email("email", email)?;
        if password.is_empty() {
            return Err(ConsoleError::invalid("password", "Ce champ est obligatoire."));
        }

        let user = self
            .api
            .login(&email, password)
            .await
            .map_err(|e| normalize("se connecter", e))?;

        if !user.is_admin {
            tracing::info!(uid = %user.uid, "Non-admin account refused by the console");
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "Sign-out after refused login failed");
            }
            self.gate().confirm(None);
            return Err(ConsoleError::Operation(
                "Accès refusé : ce compte n'a pas les droits d'administration.".into(),
            ));
        }

        Ok(self.gate().login_succeeded(user))
    }

    /// Sign out. The local state is cleared even when the API call fails.
    pub async fn logout(&self) -> ConsoleResult<()> {
        let result = self.api.logout().await;
        self.gate().sign_out();
        result.map_err(|e| normalize("se déconnecter", e))
    }
}
