//! Modules page.
//!
//! Rows are the modules of one specialty and semester, reached through a
//! year → specialty → semester cascade. Changing a level clears the levels
//! below it. A list fetched for a selection that has since changed is
//! dropped when it arrives.

use std::sync::{Arc, Mutex, MutexGuard};

use cursus_core::catalog::{CourseModule, Specialty, Year, SEMESTERS};
use cursus_core::selection::{CatalogSelection, ListLevel};

use super::{call, lock, PageCore, Submission};
use crate::api::{CatalogApi, ModuleQuery};
use crate::error::{ConsoleError, ConsoleResult};
use crate::forms::ModuleForm;

#[derive(Debug, Clone, Default)]
pub struct ModulesState {
    pub core: PageCore<CourseModule, ModuleForm>,
    pub selection: CatalogSelection,
    pub years: Vec<Year>,
    /// Specialties of the selected year.
    pub specialties: Vec<Specialty>,
}

impl ModulesState {
    /// Semester options, offered once a specialty is selected.
    pub fn semesters(&self) -> &'static [&'static str] {
        if self.selection.specialty_id().is_some() {
            SEMESTERS
        } else {
            &[]
        }
    }
}

pub struct ModulesPage {
    api: Arc<dyn CatalogApi>,
    state: Mutex<ModulesState>,
}

impl ModulesPage {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            state: Mutex::new(ModulesState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ModulesState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> ModulesState {
        self.state().clone()
    }

    pub fn visible_rows(&self) -> Vec<CourseModule> {
        self.state()
            .core
            .visible(|m| vec![m.name.as_str(), m.module_code.as_deref().unwrap_or("")])
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn set_query(&self, query: &str) {
        self.state().core.query = query.to_string();
    }

    pub async fn load(&self) -> ConsoleResult<()> {
        match call("charger les années", self.api.list_years()).await {
            Ok(years) => {
                self.state().years = years;
                Ok(())
            }
            Err(e) => Err(self.state().core.report(e)),
        }
    }

    pub async fn select_year(&self, year_id: Option<String>) -> ConsoleResult<()> {
        let (ticket, year_id) = {
            let mut state = self.state();
            if !state.selection.select_year(year_id) {
                return Ok(());
            }
            state.specialties.clear();
            state.core.rows.clear();
            state.core.loading = false;
            match state.selection.year_id() {
                Some(year_id) => (
                    state.selection.ticket(ListLevel::Specialties),
                    year_id.to_string(),
                ),
                None => return Ok(()),
            }
        };

        let result = call(
            "charger les spécialités",
            self.api.list_specialties(Some(&year_id)),
        )
        .await;

        let mut state = self.state();
        if !state.selection.is_current(ticket) {
            tracing::debug!(%year_id, "Dropping specialties fetched for a previous year");
            return Ok(());
        }
        match result {
            Ok(specialties) => {
                state.specialties = specialties;
                Ok(())
            }
            Err(e) => Err(state.core.report(e)),
        }
    }

    pub fn select_specialty(&self, specialty_id: Option<String>) {
        let mut state = self.state();
        if state.selection.select_specialty(specialty_id) {
            state.core.rows.clear();
            state.core.loading = false;
        }
    }

    pub async fn select_semester(&self, semester_key: Option<String>) -> ConsoleResult<()> {
        {
            let mut state = self.state();
            if !state.selection.select_semester(semester_key) {
                return Ok(());
            }
            state.core.rows.clear();
            state.core.loading = false;
        }
        self.load_rows().await
    }

    /// Fetch the modules of the selected specialty and semester.
    pub async fn load_rows(&self) -> ConsoleResult<()> {
        let (ticket, query) = {
            let mut state = self.state();
            if !state.selection.can_load(ListLevel::Modules) {
                return Ok(());
            }
            state.core.loading = true;
            let selection = &state.selection;
            let query = ModuleQuery {
                specialty_id: selection.specialty_id().map(str::to_string),
                semester_key: selection.semester_key().map(str::to_string),
                year_id: None,
            };
            (selection.ticket(ListLevel::Modules), query)
        };

        let result = call("charger les modules", self.api.list_modules(&query)).await;

        let mut state = self.state();
        if !state.selection.is_current(ticket) {
            tracing::debug!(?query, "Dropping modules fetched for a previous selection");
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

    /// Open an empty draft bound to the current selection.
    pub fn open_add(&self) -> ConsoleResult<()> {
        let mut state = self.state();
        let selection = &state.selection;
        let (Some(year_id), Some(specialty_id), Some(semester_key)) = (
            selection.year_id(),
            selection.specialty_id(),
            selection.semester_key(),
        ) else {
            return Err(ConsoleError::Operation(
                "Sélectionnez une année, une spécialité et un semestre.".into(),
            ));
        };
        let form = ModuleForm {
            year_id: year_id.to_string(),
            specialty_id: specialty_id.to_string(),
            semester_key: semester_key.to_string(),
            coefficient: "1".into(),
            credits: "1".into(),
            ..Default::default()
        };
        state.core.open_add(form);
        Ok(())
    }

    pub fn open_edit(&self, id: &str) -> ConsoleResult<()> {
        let mut state = self.state();
        let form = state
            .core
            .rows
            .iter()
            .find(|m| m.id == id)
            .map(ModuleForm::from_module)
            .ok_or_else(|| ConsoleError::Operation("Module introuvable.".into()))?;
        state.core.open_edit(id.to_string(), form);
        Ok(())
    }

    pub fn edit_draft(&self, edit: impl FnOnce(&mut ModuleForm)) {
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

    pub async fn submit(&self) -> ConsoleResult<()> {
        let submission = self.state().core.prepare(|target, form| match target {
            None => form.validate().map(Submission::Create),
            Some(id) => form
                .validate_update()
                .map(|input| Submission::Update(id, input)),
        })?;

        let result = match &submission {
            Submission::Create(input) => call("créer le module", self.api.create_module(input))
                .await
                .map(|_| "Module créé."),
            Submission::Update(id, input) => {
                call("modifier le module", self.api.update_module(id, input))
                    .await
                    .map(|_| "Module modifié.")
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
        let outcome = match call("supprimer le module", self.api.delete_module(&id)).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.state().core.fail(e)),
        };
        let removed = self.state().core.finish_delete(outcome, "Module supprimé.");
        if removed {
            self.load_rows().await?;
        }
        Ok(removed)
    }
}
