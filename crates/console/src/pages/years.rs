//! Academic years page.

use std::sync::{Arc, Mutex, MutexGuard};

use cursus_core::catalog::Year;

use super::{call, lock, PageCore, Submission};
use crate::api::CatalogApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::forms::YearForm;

pub struct YearsPage {
    api: Arc<dyn CatalogApi>,
    state: Mutex<PageCore<Year, YearForm>>,
}

impl YearsPage {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            state: Mutex::new(PageCore::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageCore<Year, YearForm>> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> PageCore<Year, YearForm> {
        self.state().clone()
    }

    pub fn visible_rows(&self) -> Vec<Year> {
        self.state()
            .visible(|y| vec![y.name.as_str()])
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn set_query(&self, query: &str) {
        self.state().query = query.to_string();
    }

    /// Open an empty draft placed after the last year.
    pub fn open_add(&self) {
        let mut state = self.state();
        let next = state.rows.iter().map(|y| y.order).max().map_or(1, |o| o + 1);
        state.open_add(YearForm {
            name: String::new(),
            order: next.to_string(),
        });
    }

    pub fn open_edit(&self, id: &str) -> ConsoleResult<()> {
        let mut state = self.state();
        let form = state
            .rows
            .iter()
            .find(|y| y.id == id)
            .map(YearForm::from_year)
            .ok_or_else(|| ConsoleError::Operation("Année introuvable.".into()))?;
        state.open_edit(id.to_string(), form);
        Ok(())
    }

    pub fn edit_draft(&self, edit: impl FnOnce(&mut YearForm)) {
        if let Some(draft) = self.state().dialog.draft_mut() {
            edit(draft);
        }
    }

    pub fn close_dialog(&self) {
        self.state().close_dialog();
    }

    pub fn ask_delete(&self, id: &str) {
        self.state().ask_delete(id.to_string());
    }

    pub fn cancel_delete(&self) {
        self.state().cancel_delete();
    }

    pub async fn load(&self) -> ConsoleResult<()> {
        self.state().loading = true;
        let result = call("charger les années", self.api.list_years()).await;
        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(rows) => {
                state.rows = rows;
                Ok(())
            }
            Err(e) => Err(state.report(e)),
        }
    }

    pub async fn submit(&self) -> ConsoleResult<()> {
        let submission = self.state().prepare(|target, form| match target {
            None => form.validate().map(Submission::Create),
            Some(id) => form
                .validate_update()
                .map(|input| Submission::Update(id, input)),
        })?;

        let result = match &submission {
            Submission::Create(input) => call("créer l'année", self.api.create_year(input))
                .await
                .map(|_| "Année créée."),
            Submission::Update(id, input) => {
                call("modifier l'année", self.api.update_year(id, input))
                    .await
                    .map(|_| "Année modifiée.")
            }
        };
        match result {
            Ok(message) => self.state().succeed(message),
            Err(e) => return Err(self.state().fail(e)),
        }
        self.load().await
    }

    /// Delete the row awaiting confirmation. Returns whether it is gone.
    pub async fn confirm_delete(&self) -> ConsoleResult<bool> {
        let id = self.state().begin_delete()?;
        let outcome = match call("supprimer l'année", self.api.delete_year(&id)).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.state().fail(e)),
        };
        let removed = self.state().finish_delete(outcome, "Année supprimée.");
        if removed {
            self.load().await?;
        }
        Ok(removed)
    }
}
