//! Course modules taught in a specialty during one semester.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};
use crate::validation::{optional_text, require_in_range, require_non_negative, require_text};

/// Lowest allowed eliminatory mark.
pub const MIN_MARK: f64 = 0.0;

/// Highest allowed eliminatory mark (marks are out of 20).
pub const MAX_MARK: f64 = 20.0;

/// Assessment components a module can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Evaluation {
    #[serde(rename = "TD")]
    Td,
    #[serde(rename = "TP")]
    Tp,
    #[serde(rename = "Examen")]
    Examen,
}

impl Evaluation {
    pub const ALL: [Evaluation; 3] = [Self::Td, Self::Tp, Self::Examen];

    pub fn label(self) -> &'static str {
        match self {
            Self::Td => "TD",
            Self::Tp => "TP",
            Self::Examen => "Examen",
        }
    }
}

/// A document from the `modules` collection.
///
/// Keyed by [`crate::slug::module_id`] over the specialty, semester and
/// name given at creation. Listed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: DocId,
    pub name: String,
    pub specialty_id: DocId,
    pub year_id: DocId,
    pub semester_key: String,
    #[serde(default)]
    pub module_code: Option<String>,
    pub coefficient: f64,
    pub credits: f64,
    #[serde(default)]
    pub evaluations: BTreeSet<Evaluation>,
    /// Mark below which the module is failed regardless of the average
    /// (note éliminatoire).
    #[serde(default)]
    pub eliminatory_mark: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCourseModule {
    pub name: String,
    pub specialty_id: DocId,
    pub year_id: DocId,
    pub semester_key: String,
    #[serde(default)]
    pub module_code: Option<String>,
    pub coefficient: f64,
    pub credits: f64,
    #[serde(default)]
    pub evaluations: BTreeSet<Evaluation>,
    #[serde(default)]
    pub eliminatory_mark: Option<f64>,
}

impl CreateCourseModule {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            name: require_text("name", &self.name)?,
            specialty_id: require_text("specialty_id", &self.specialty_id)?,
            year_id: require_text("year_id", &self.year_id)?,
            semester_key: require_text("semester_key", &self.semester_key)?,
            module_code: optional_text(self.module_code.as_deref()),
            coefficient: require_non_negative("coefficient", self.coefficient)?,
            credits: require_non_negative("credits", self.credits)?,
            evaluations: self.evaluations,
            eliminatory_mark: self
                .eliminatory_mark
                .map(|m| require_in_range("eliminatory_mark", m, MIN_MARK, MAX_MARK))
                .transpose()?,
        })
    }
}

/// Partial update. Specialty, year and semester are fixed at creation
/// because they are part of the document key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCourseModule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some("")` clears the code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluations: Option<BTreeSet<Evaluation>>,
    /// `Some(None)` clears the mark; `None` leaves it untouched.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub eliminatory_mark: Option<Option<f64>>,
}

impl UpdateCourseModule {
    pub fn normalized(self) -> Result<Self, CoreError> {
        let eliminatory_mark = match self.eliminatory_mark {
            Some(Some(m)) => Some(Some(require_in_range(
                "eliminatory_mark",
                m,
                MIN_MARK,
                MAX_MARK,
            )?)),
            other => other,
        };
        Ok(Self {
            name: self.name.map(|v| require_text("name", &v)).transpose()?,
            module_code: self.module_code.map(|v| v.trim().to_string()),
            coefficient: self
                .coefficient
                .map(|v| require_non_negative("coefficient", v))
                .transpose()?,
            credits: self
                .credits
                .map(|v| require_non_negative("credits", v))
                .transpose()?,
            evaluations: self.evaluations,
            eliminatory_mark,
        })
    }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Option<f64>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<f64>>, D::Error> {
        Option::<f64>::deserialize(d).map(Some)
    }
}
