//! Resources page.
//!
//! Rows are the resources of one module, reached through the full
//! year → specialty → semester → module cascade. A saved resource can carry
//! an uploaded file, sent right after the create or update call, and a
//! whole list can be imported from free text.

use std::sync::{Arc, Mutex, MutexGuard};

use cursus_core::catalog::{CourseModule, Resource, Specialty, Year, SEMESTERS};
use cursus_core::selection::{CatalogSelection, ListLevel};

use super::{call, lock, PageCore, Submission};
use crate::api::{CatalogApi, FileUpload, ImportOutcome, ModuleQuery};
use crate::error::{ConsoleError, ConsoleResult};
use crate::forms::ResourceForm;

/// Import texts longer than this are refused before sending.
pub const MAX_IMPORT_CHARS: usize = 50_000;

#[derive(Debug, Clone, Default)]
pub struct ImportPanel {
    pub text: String,
    pub last: Option<ImportOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourcesState {
    pub core: PageCore<Resource, ResourceForm>,
    pub selection: CatalogSelection,
    pub years: Vec<Year>,
    pub specialties: Vec<Specialty>,
    pub modules: Vec<CourseModule>,
    pub import: ImportPanel,
}

impl ResourcesState {
    pub fn semesters(&self) -> &'static [&'static str] {
        if self.selection.specialty_id().is_some() {
            SEMESTERS
        } else {
            &[]
        }
    }

    fn clear_below_year(&mut self) {
        self.specialties.clear();
        self.clear_below_semester();
    }

    fn clear_below_semester(&mut self) {
        self.modules.clear();
        self.clear_rows();
    }

    fn clear_rows(&mut self) {
        self.core.rows.clear();
        self.core.loading = false;
        self.import.last = None;
    }
}

pub struct ResourcesPage {
    api: Arc<dyn CatalogApi>,
    state: Mutex<ResourcesState>,
}

impl ResourcesPage {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            state: Mutex::new(ResourcesState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ResourcesState> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> ResourcesState {
        self.state().clone()
    }

    pub fn visible_rows(&self) -> Vec<Resource> {
        self.state()
            .core
            .visible(|r| vec![r.title.as_str(), r.source.as_deref().unwrap_or("")])
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

    // ---- cascade ----

    pub async fn select_year(&self, year_id: Option<String>) -> ConsoleResult<()> {
        let (ticket, year_id) = {
            let mut state = self.state();
            if !state.selection.select_year(year_id) {
                return Ok(());
            }
            state.clear_below_year();
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
            state.clear_below_semester();
        }
    }

    pub async fn select_semester(&self, semester_key: Option<String>) -> ConsoleResult<()> {
        let (ticket, query) = {
            let mut state = self.state();
            if !state.selection.select_semester(semester_key) {
                return Ok(());
            }
            state.clear_below_semester();
            if !state.selection.can_load(ListLevel::Modules) {
                return Ok(());
            }
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
        match result {
            Ok(modules) => {
                state.modules = modules;
                Ok(())
            }
            Err(e) => Err(state.core.report(e)),
        }
    }

    pub async fn select_module(&self, module_id: Option<String>) -> ConsoleResult<()> {
        {
            let mut state = self.state();
            if !state.selection.select_module(module_id) {
                return Ok(());
            }
            state.clear_rows();
        }
        self.load_rows().await
    }

    /// Fetch the resources of the selected module.
    pub async fn load_rows(&self) -> ConsoleResult<()> {
        let (ticket, module_id) = {
            let mut state = self.state();
            let Some(module_id) = state.selection.module_id().map(str::to_string) else {
                return Ok(());
            };
            state.core.loading = true;
            (state.selection.ticket(ListLevel::Resources), module_id)
        };

        let result = call(
            "charger les ressources",
            self.api.list_resources(Some(&module_id)),
        )
        .await;

        let mut state = self.state();
        if !state.selection.is_current(ticket) {
            tracing::debug!(%module_id, "Dropping resources fetched for a previous module");
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

    // ---- dialog ----

    pub fn open_add(&self) -> ConsoleResult<()> {
        let mut state = self.state();
        let Some(module_id) = state.selection.module_id().map(str::to_string) else {
            return Err(ConsoleError::Operation("Sélectionnez d'abord un module.".into()));
        };
        state.core.open_add(ResourceForm {
            module_id,
            ..Default::default()
        });
        Ok(())
    }

    pub fn open_edit(&self, id: &str) -> ConsoleResult<()> {
        let mut state = self.state();
        let form = state
            .core
            .rows
            .iter()
            .find(|r| r.id == id)
            .map(ResourceForm::from_resource)
            .ok_or_else(|| ConsoleError::Operation("Ressource introuvable.".into()))?;
        state.core.open_edit(id.to_string(), form);
        Ok(())
    }

    pub fn edit_draft(&self, edit: impl FnOnce(&mut ResourceForm)) {
        if let Some(draft) = self.state().core.dialog.draft_mut() {
            edit(draft);
        }
    }

    /// Attach or detach the file to upload with the draft.
    pub fn set_file(&self, file: Option<FileUpload>) {
        self.edit_draft(|draft| draft.file = file);
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

    /// Save the draft, then upload its file when one is attached.
    pub async fn submit(&self) -> ConsoleResult<()> {
        let submission = self.state().core.prepare(|target, form| match target {
            None => form.validate().map(Submission::Create),
            Some(id) => form
                .validate_update()
                .map(|draft| Submission::Update(id, draft)),
        })?;

        let (saved, file, message) = match &submission {
            Submission::Create(draft) => (
                call("créer la ressource", self.api.create_resource(&draft.input)).await,
                draft.file.as_ref(),
                "Ressource créée.",
            ),
            Submission::Update(id, draft) => (
                call(
                    "modifier la ressource",
                    self.api.update_resource(id, &draft.input),
                )
                .await,
                draft.file.as_ref(),
                "Ressource modifiée.",
            ),
        };
        let saved = match saved {
            Ok(resource) => resource,
            Err(e) => return Err(self.state().core.fail(e)),
        };

        if let Some(file) = file {
            if matches!(submission, Submission::Create(_)) {
                self.state().core.keep_editing(saved.id.clone());
            }
            let uploaded = call(
                "téléverser le fichier",
                self.api.upload_resource_file(&saved.id, file),
            )
            .await;
            if let Err(e) = uploaded {
                let err = self.state().core.fail(e);
                if let Err(reload) = self.load_rows().await {
                    tracing::warn!(error = %reload, "Reload after failed upload failed");
                }
                return Err(err);
            }
        }

        self.state().core.succeed(message);
        self.load_rows().await
    }

    /// Delete the row awaiting confirmation. Returns whether it is gone.
    pub async fn confirm_delete(&self) -> ConsoleResult<bool> {
        let id = self.state().core.begin_delete()?;
        let outcome = match call("supprimer la ressource", self.api.delete_resource(&id)).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.state().core.fail(e)),
        };
        let removed = self.state().core.finish_delete(outcome, "Ressource supprimée.");
        if removed {
            self.load_rows().await?;
        }
        Ok(removed)
    }

    // ---- bulk import ----

    pub fn set_import_text(&self, text: &str) {
        self.state().import.text = text.to_string();
    }

    /// Send the import text for the selected module and reload its rows.
    pub async fn run_import(&self) -> ConsoleResult<ImportOutcome> {
        let (module_id, text) = {
            let mut state = self.state();
            let Some(module_id) = state.selection.module_id().map(str::to_string) else {
                return Err(ConsoleError::Operation("Sélectionnez d'abord un module.".into()));
            };
            let text = state.import.text.trim().to_string();
            if text.is_empty() {
                return Err(ConsoleError::invalid("text", "Collez une liste de ressources à importer."));
            }
            if text.chars().count() > MAX_IMPORT_CHARS {
                return Err(ConsoleError::invalid(
                    "text",
                    format!("Le texte ne doit pas dépasser {MAX_IMPORT_CHARS} caractères."),
                ));
            }
            state.core.begin_submit()?;
            (module_id, text)
        };

        let outcome = match call(
            "importer les ressources",
            self.api.import_resources(&module_id, &text),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.state().core.fail(e)),
        };

        {
            let mut state = self.state();
            state.core.submitting = false;
            state
                .core
                .notices
                .success(format!("{} ressource(s) importée(s).", outcome.created.len()));
            if !outcome.rejected.is_empty() {
                state.core.notices.error(format!(
                    "{} élément(s) ignoré(s) car invalides.",
                    outcome.rejected.len()
                ));
            }
            state.import.text.clear();
            state.import.last = Some(outcome.clone());
        }
        self.load_rows().await?;
        Ok(outcome)
    }
}
