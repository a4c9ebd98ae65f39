//! Academic years.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};
use crate::validation::require_text;

/// A document from the `years` collection. Listed by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Year {
    pub id: DocId,
    pub name: String,
    pub order: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateYear {
    pub name: String,
    pub order: i64,
}

impl CreateYear {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            name: require_text("name", &self.name)?,
            order: self.order,
        })
    }
}

/// Partial update for a year. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateYear {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl UpdateYear {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            name: self.name.map(|v| require_text("name", &v)).transpose()?,
            order: self.order,
        })
    }
}
