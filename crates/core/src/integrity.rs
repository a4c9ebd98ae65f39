//! Outcomes of guarded deletes.
//!
//! A delete that is refused because other documents still reference the
//! target is not an error: it yields a [`DeleteOutcome`] with
//! `success == false` and a message for the user, and the target is left
//! untouched.

use serde::{Deserialize, Serialize};

/// Result of a guarded delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeleteOutcome {
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Which dependents block deleting an entity, with user-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependentRule {
    /// Label of the target, e.g. "cette année".
    pub target: &'static str,
    /// Singular label of a dependent, e.g. "spécialité".
    pub dependent: &'static str,
    /// Grammatical gender of the dependent label, for agreement.
    pub feminine: bool,
}

pub const YEAR_DEPENDENTS: DependentRule = DependentRule {
    target: "cette année",
    dependent: "spécialité",
    feminine: true,
};

pub const SPECIALTY_DEPENDENTS: DependentRule = DependentRule {
    target: "cette spécialité",
    dependent: "module",
    feminine: false,
};

pub const MODULE_DEPENDENTS: DependentRule = DependentRule {
    target: "ce module",
    dependent: "ressource",
    feminine: true,
};

impl DependentRule {
    /// Outcome for a dependent count: deleted when zero, blocked otherwise.
    ///
    /// Only decides; the caller performs the delete when this allows it.
    pub fn evaluate(&self, dependent_count: u64) -> DeleteOutcome {
        if dependent_count == 0 {
            return DeleteOutcome::deleted();
        }
        DeleteOutcome::blocked(self.blocked_message(dependent_count))
    }

    pub fn blocked_message(&self, count: u64) -> String {
        let plural = if count > 1 { "s" } else { "" };
        format!(
            "Impossible de supprimer {} : {count} {}{plural} y {} encore rattaché{}{plural}.",
            self.target,
            self.dependent,
            if count > 1 { "sont" } else { "est" },
            if self.feminine { "e" } else { "" },
        )
    }
}
