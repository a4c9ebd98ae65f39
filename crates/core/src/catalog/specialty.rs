//! Specialties (programmes) offered within an academic year.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};
use crate::validation::{optional_text, require_text};

/// A document from the `specialties` collection, keyed by the slug of its
/// name. Listed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: DocId,
    pub name: String,
    pub year_id: DocId,
    pub campus: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpecialty {
    pub name: String,
    pub year_id: DocId,
    pub campus: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CreateSpecialty {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            name: require_text("name", &self.name)?,
            year_id: require_text("year_id", &self.year_id)?,
            campus: require_text("campus", &self.campus)?,
            icon: optional_text(self.icon.as_deref()),
        })
    }
}

/// Partial update. The document key stays the slug of the original name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSpecialty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_id: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    /// `Some("")` clears the icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl UpdateSpecialty {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            name: self.name.map(|v| require_text("name", &v)).transpose()?,
            year_id: self.year_id.map(|v| require_text("year_id", &v)).transpose()?,
            campus: self.campus.map(|v| require_text("campus", &v)).transpose()?,
            icon: self.icon.map(|v| v.trim().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateSpecialty {
        CreateSpecialty {
            name: " Génie Logiciel ".into(),
            year_id: "y1".into(),
            campus: "Campus Nord".into(),
            icon: Some("  ".into()),
        }
    }

    #[test]
    fn create_normalizes() {
        let normalized = input().normalized().unwrap();
        assert_eq!(normalized.name, "Génie Logiciel");
        assert_eq!(normalized.icon, None);
    }

    #[test]
    fn create_requires_year_and_campus() {
        let mut missing_year = input();
        missing_year.year_id = "".into();
        assert_eq!(missing_year.normalized().unwrap_err().field(), Some("year_id"));

        let mut missing_campus = input();
        missing_campus.campus = " ".into();
        assert_eq!(missing_campus.normalized().unwrap_err().field(), Some("campus"));
    }

    #[test]
    fn update_blank_icon_clears() {
        let patch = UpdateSpecialty {
            icon: Some("  ".into()),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(patch.icon.as_deref(), Some(""));
    }
}
