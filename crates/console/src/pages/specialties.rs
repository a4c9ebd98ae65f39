//! Specialties page, filterable by year.

use std::sync::{Arc, Mutex, MutexGuard};

use cursus_core::catalog::{Specialty, Year};
use cursus_core::selection::{CatalogSelection, ListLevel};

use super::{call, lock, PageCore, Submission};
use crate::api::CatalogApi;
use crate::error::{ConsoleError, ConsoleResult};
use crate::forms::SpecialtyForm;

#[derive(Debug, Clone, Default)]
pub struct SpecialtiesState {
    pub core: PageCore<Specialty, SpecialtyForm>,
    pub years: Vec<Year>,
    /// Only the year level is used, as the list filter.
    pub selection: CatalogSelection,
}

impl SpecialtiesState {
    pub fn year_name(&self, year_id: &str) -> Option<&str> {
        self.years
            .iter()
            .find(|y| y.id == year_id)
            .map(|y| y.name.as_str())
    }
}

pub struct SpecialtiesPage {
    api: Arc<dyn CatalogApi>,
    state: Mutex<SpecialtiesState>,
}

impl SpecialtiesPage {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            state: Mutex::new(SpecialtiesState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SpecialtiesState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> SpecialtiesState {
        self.state().clone()
    }

    pub fn visible_rows(&self) -> Vec<Specialty> {
        self.state()
            .core
            .visible(|s| vec![s.name.as_str(), s.campus.as_str()])
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn set_query(&self, query: &str) {
        self.state().core.query = query.to_string();
    }

    /// Open an empty draft, preset to the filtered year.
    pub fn open_add(&self) {
        let mut state = self.state();
        let year_id = state.selection.year_id().unwrap_or_default().to_string();
        state.core.open_add(SpecialtyForm {
            year_id,
            ..Default::default()
        });
    }

    pub fn open_edit(&self, id: &str) -> ConsoleResult<()> {
        let mut state = self.state();
        let form = state
            .core
            .rows
            .iter()
            .find(|s| s.id == id)
            .map(SpecialtyForm::from_specialty)
            .ok_or_else(|| ConsoleError::Operation("Spécialité introuvable.".into()))?;
        state.core.open_edit(id.to_string(), form);
        Ok(())
    }

    pub fn edit_draft(&self, edit: impl FnOnce(&mut SpecialtyForm)) {
        if let Some(draft) = self.state().core.dialog.draft_mut() {
            edit(draft);
        }
    }

    pub fn close_dialog(&self) {
        self.state().core.close_dialog();
    }

    pub fn ask_delete(&self, id: &str) {
        self.state().core.ask_delete(id.to_string());
    }

    pub fn cancel_delete(&self) {
        self.state().core.cancel_delete();
    }

    /// Load the year options and the specialties for the current filter.
    pub async fn load(&self) -> ConsoleResult<()> {
        match call("charger les années", self.api.list_years()).await {
            Ok(years) => self.state().years = years,
            Err(e) => return Err(self.state().core.report(e)),
        }
        self.load_rows().await
    }

    /// Filter by `year_id`; `None` shows every specialty.
    pub async fn filter_by_year(&self, year_id: Option<String>) -> ConsoleResult<()> {
        let changed = self.state().selection.select_year(year_id);
        if !changed {
            return Ok(());
        }
        self.load_rows().await
    }

    async fn load_rows(&self) -> ConsoleResult<()> {
        let (ticket, year_id) = {
            let mut state = self.state();
            state.core.loading = true;
            let selection = &state.selection;
            (
                selection.ticket(ListLevel::Specialties),
                selection.year_id().map(str::to_string),
            )
        };

        let result = call(
            "charger les spécialités",
            self.api.list_specialties(year_id.as_deref()),
        )
        .await;

        let mut state = self.state();
        if !state.selection.is_current(ticket) {
            tracing::debug!("Dropping specialties fetched for a previous filter");
            return Ok(());
        }
        state.core.loading = false;
        match result {
            Ok(rows) => {
                state.core.rows = rows;
                Ok(())
            }
            Err(e) => Err(state.core.report(e)),
        }
    }

    pub async fn submit(&self) -> ConsoleResult<()> {
        let submission = self.state().core.prepare(|target, form| match target {
            None => form.validate().map(Submission::Create),
            Some(id) => form
                .validate_update()
                .map(|input| Submission::Update(id, input)),
        })?;

        let result = match &submission {
            Submission::Create(input) => {
                call("créer la spécialité", self.api.create_specialty(input))
                    .await
                    .map(|_| "Spécialité créée.")
            }
            Submission::Update(id, input) => {
                call("modifier la spécialité", self.api.update_specialty(id, input))
                    .await
                    .map(|_| "Spécialité modifiée.")
            }
        };
        match result {
            Ok(message) => self.state().core.succeed(message),
            Err(e) => return Err(self.state().core.fail(e)),
        }
        self.load_rows().await
    }

    /// Delete the row awaiting confirmation. Returns whether it is gone.
    pub async fn confirm_delete(&self) -> ConsoleResult<bool> {
        let id = self.state().core.begin_delete()?;
        let outcome = match call("supprimer la spécialité", self.api.delete_specialty(&id)).await
        {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.state().core.fail(e)),
        };
        let removed = self.state().core.finish_delete(outcome, "Spécialité supprimée.");
        if removed {
            self.load_rows().await?;
        }
        Ok(removed)
    }
}
