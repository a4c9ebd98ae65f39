//! Page controllers, one per administration page.
//!
//! Every page follows the same loop: load rows, let the user filter them,
//! open an add/edit dialog bound to a draft form, validate the draft
//! locally, call the API, reload. Deletes go through a confirmation slot
//! and report blocked outcomes in the banner.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`, so the methods take `&self` and can be driven concurrently.

pub mod modules;
pub mod resources;
pub mod specialties;
pub mod users;
pub mod years;

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cursus_core::integrity::DeleteOutcome;
use cursus_core::search::filter_rows;

use crate::error::{normalize, ApiError, ConsoleError, ConsoleResult};
use crate::notices::Notices;

pub use modules::ModulesPage;
pub use resources::ResourcesPage;
pub use specialties::SpecialtiesPage;
pub use users::UsersPage;
pub use years::YearsPage;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The add/edit dialog of a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog<F> {
    Closed,
    Add(F),
    Edit { id: String, draft: F },
}

impl<F> Dialog<F> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn draft(&self) -> Option<&F> {
        match self {
            Self::Closed => None,
            Self::Add(draft) | Self::Edit { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut F> {
        match self {
            Self::Closed => None,
            Self::Add(draft) | Self::Edit { draft, .. } => Some(draft),
        }
    }

    /// Id of the row being edited, `None` when adding.
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Self::Edit { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// A validated draft, ready to send.
pub(crate) enum Submission<C, U> {
    Create(C),
    Update(String, U),
}

/// State every page carries.
#[derive(Debug, Clone)]
pub struct PageCore<Row, F> {
    pub rows: Vec<Row>,
    pub query: String,
    pub dialog: Dialog<F>,
    /// Row awaiting delete confirmation.
    pub pending_delete: Option<String>,
    /// Validation failure of the open draft.
    pub form_error: Option<ConsoleError>,
    pub submitting: bool,
    pub loading: bool,
    pub banner: Option<String>,
    pub notices: Notices,
}

impl<Row, F> Default for PageCore<Row, F> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            query: String::new(),
            dialog: Dialog::Closed,
            pending_delete: None,
            form_error: None,
            submitting: false,
            loading: false,
            banner: None,
            notices: Notices::default(),
        }
    }
}

impl<Row, F: Clone> PageCore<Row, F> {
    pub fn open_add(&mut self, draft: F) {
        self.dialog = Dialog::Add(draft);
        self.form_error = None;
    }

    pub fn open_edit(&mut self, id: String, draft: F) {
        self.dialog = Dialog::Edit { id, draft };
        self.form_error = None;
    }

    /// Turn an add dialog into an edit of the row just created, so a
    /// retry updates that row.
    pub(crate) fn keep_editing(&mut self, id: String) {
        self.dialog = match std::mem::replace(&mut self.dialog, Dialog::Closed) {
            Dialog::Add(draft) => Dialog::Edit { id, draft },
            other => other,
        };
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::Closed;
        self.form_error = None;
    }

    /// The open draft and the id it edits, cloned for submission.
    pub(crate) fn current_draft(&self) -> ConsoleResult<(Option<String>, F)> {
        match &self.dialog {
            Dialog::Closed => Err(ConsoleError::Operation(
                "Aucun formulaire n'est ouvert.".into(),
            )),
            Dialog::Add(draft) => Ok((None, draft.clone())),
            Dialog::Edit { id, draft } => Ok((Some(id.clone()), draft.clone())),
        }
    }

    /// Mark the page as submitting; refused while a submission runs.
    pub(crate) fn begin_submit(&mut self) -> ConsoleResult<()> {
        if self.submitting {
            return Err(ConsoleError::Busy(
                "Une opération est déjà en cours.".into(),
            ));
        }
        self.submitting = true;
        self.banner = None;
        Ok(())
    }

    /// Validate the open draft with `validate` and mark the page as
    /// submitting. Nothing is sent when validation fails.
    pub(crate) fn prepare<C, U>(
        &mut self,
        validate: impl FnOnce(Option<String>, F) -> ConsoleResult<Submission<C, U>>,
    ) -> ConsoleResult<Submission<C, U>> {
        let (target, draft) = self.current_draft()?;
        let submission = validate(target, draft).map_err(|e| self.reject_draft(e))?;
        self.begin_submit()?;
        self.form_error = None;
        Ok(submission)
    }

    /// Record a validation failure of the draft.
    pub(crate) fn reject_draft(&mut self, err: ConsoleError) -> ConsoleError {
        self.form_error = Some(err.clone());
        err
    }

    /// Report a failed operation. Field errors stay on the draft; the
    /// rest go to the banner and the notices.
    pub(crate) fn fail(&mut self, err: ConsoleError) -> ConsoleError {
        self.submitting = false;
        self.report(err)
    }

    /// Like [`PageCore::fail`], leaving the submitting flag alone.
    pub(crate) fn report(&mut self, err: ConsoleError) -> ConsoleError {
        match &err {
            ConsoleError::Invalid { .. } => self.form_error = Some(err.clone()),
            ConsoleError::Operation(message) | ConsoleError::Busy(message) => {
                self.banner = Some(message.clone());
                self.notices.error(message.clone());
            }
        }
        err
    }

    pub(crate) fn succeed(&mut self, message: &str) {
        self.submitting = false;
        self.close_dialog();
        self.notices.success(message);
    }

    pub fn ask_delete(&mut self, id: String) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Take the confirmed row and mark the page as submitting.
    pub(crate) fn begin_delete(&mut self) -> ConsoleResult<String> {
        let Some(id) = self.pending_delete.clone() else {
            return Err(ConsoleError::Operation(
                "Aucune suppression n'est en attente.".into(),
            ));
        };
        self.begin_submit()?;
        self.pending_delete = None;
        Ok(id)
    }

    /// Apply the outcome of a guarded delete. Returns whether the row is gone.
    pub(crate) fn finish_delete(&mut self, outcome: DeleteOutcome, message: &str) -> bool {
        self.submitting = false;
        if outcome.success {
            self.notices.success(message);
            return true;
        }
        let reason = outcome
            .message
            .unwrap_or_else(|| "La suppression a été refusée.".to_string());
        self.banner = Some(reason.clone());
        self.notices.error(reason);
        false
    }

    /// Rows matching the current query on the fields `fields` picks.
    pub fn visible<'a, G>(&'a self, fields: G) -> Vec<&'a Row>
    where
        G: Fn(&Row) -> Vec<&str>,
    {
        filter_rows(&self.rows, &self.query, fields)
    }
}

/// Await `call`, normalizing its failure for `operation`.
pub(crate) async fn call<T, Fut>(operation: &str, request: Fut) -> ConsoleResult<T>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    request.await.map_err(|e| normalize(operation, e))
}
