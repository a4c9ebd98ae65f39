//! User roster page.
//!
//! Besides the usual add/edit/delete loop, each row carries an admin
//! toggle. A toggle for a user is refused while a previous one for the
//! same user is still running; toggles for different users proceed
//! independently.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use cursus_core::catalog::AdminUserView;

use super::{call, lock, PageCore, Submission};
use crate::api::CatalogApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::forms::{ProfileForm, UserForm};

/// Draft of the user dialog: a new account or a profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDraft {
    Account(UserForm),
    Profile(ProfileForm),
}

#[derive(Debug, Clone, Default)]
pub struct UsersState {
    pub core: PageCore<AdminUserView, UserDraft>,
    /// Users whose admin toggle is in flight.
    pub toggling: HashSet<String>,
}

pub struct UsersPage {
    api: Arc<dyn CatalogApi>,
    state: Mutex<UsersState>,
}

impl UsersPage {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            state: Mutex::new(UsersState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, UsersState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> UsersState {
        self.state().clone()
    }

    /// Rows whose name or email match the query.
    pub fn visible_rows(&self) -> Vec<AdminUserView> {
        self.state()
            .core
            .visible(|u| vec![u.profile.full_name.as_str(), u.profile.email.as_str()])
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn set_query(&self, query: &str) {
        self.state().core.query = query.to_string();
    }

    pub async fn load(&self) -> ConsoleResult<()> {
        self.state().core.loading = true;
        let result = call("charger les utilisateurs", self.api.list_users()).await;
        let mut state = self.state();
        state.core.loading = false;
        match result {
            Ok(rows) => {
                state.core.rows = rows;
                Ok(())
            }
            Err(e) => Err(state.core.report(e)),
        }
    }

    pub fn open_add(&self) {
        self.state()
            .core
            .open_add(UserDraft::Account(UserForm::default()));
    }

    pub fn open_edit(&self, uid: &str) -> ConsoleResult<()> {
        let mut state = self.state();
        let form = state
            .core
            .rows
            .iter()
            .find(|u| u.profile.uid == uid)
            .map(ProfileForm::from_user)
            .ok_or_else(|| ConsoleError::Operation("Utilisateur introuvable.".into()))?;
        state.core.open_edit(uid.to_string(), UserDraft::Profile(form));
        Ok(())
    }

    pub fn edit_account(&self, edit: impl FnOnce(&mut UserForm)) {
        if let Some(UserDraft::Account(form)) = self.state().core.dialog.draft_mut() {
            edit(form);
        }
    }

    pub fn edit_profile(&self, edit: impl FnOnce(&mut ProfileForm)) {
        if let Some(UserDraft::Profile(form)) = self.state().core.dialog.draft_mut() {
            edit(form);
        }
    }

    pub fn close_dialog(&self) {
        self.state().core.close_dialog();
    }

    pub fn ask_delete(&self, uid: &str) {
        self.state().core.ask_delete(uid.to_string());
    }

    pub fn cancel_delete(&self) {
        self.state().core.cancel_delete();
    }

    pub async fn submit(&self) -> ConsoleResult<()> {
        let submission = self.state().core.prepare(|target, draft| match (target, draft) {
            (None, UserDraft::Account(form)) => form.validate().map(Submission::Create),
            (Some(uid), UserDraft::Profile(form)) => form
                .validate()
                .map(|input| Submission::Update(uid, input)),
            _ => Err(ConsoleError::Operation(
                "Formulaire utilisateur incohérent.".into(),
            )),
        })?;

        let result = match &submission {
            Submission::Create(input) => {
                call("créer l'utilisateur", self.api.create_user(input))
                    .await
                    .map(|_| "Utilisateur créé.")
            }
            Submission::Update(uid, input) => {
                call("modifier l'utilisateur", self.api.update_user(uid, input))
                    .await
                    .map(|_| "Utilisateur modifié.")
            }
        };
        match result {
            Ok(message) => self.state().core.succeed(message),
            Err(e) => return Err(self.state().core.fail(e)),
        }
        self.load().await
    }

    /// Delete the user awaiting confirmation. Returns whether it is gone.
    pub async fn confirm_delete(&self) -> ConsoleResult<bool> {
        let uid = self.state().core.begin_delete()?;
        let outcome = match call("supprimer l'utilisateur", self.api.delete_user(&uid)).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.state().core.fail(e)),
        };
        let removed = self.state().core.finish_delete(outcome, "Utilisateur supprimé.");
        if removed {
            self.load().await?;
        }
        Ok(removed)
    }

    pub fn is_toggling(&self, uid: &str) -> bool {
        self.state().toggling.contains(uid)
    }

    /// Grant or revoke admin rights of `uid`, replacing its row with the
    /// updated view.
    pub async fn toggle_admin(&self, uid: &str) -> ConsoleResult<AdminUserView> {
        if !self.state().toggling.insert(uid.to_string()) {
            return Err(ConsoleError::Busy(
                "Une modification des droits de cet utilisateur est déjà en cours.".into(),
            ));
        }

        let result = call(
            "modifier les droits d'administration",
            self.api.toggle_admin(uid),
        )
        .await;

        let mut state = self.state();
        state.toggling.remove(uid);
        match result {
            Ok(view) => {
                if let Some(row) = state.core.rows.iter_mut().find(|u| u.profile.uid == uid) {
                    *row = view.clone();
                }
                let message = if view.is_admin {
                    "Droits d'administration accordés."
                } else {
                    "Droits d'administration retirés."
                };
                state.core.notices.success(message);
                Ok(view)
            }
            Err(e) => Err(state.core.report(e)),
        }
    }
}
