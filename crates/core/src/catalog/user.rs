//! User roster profiles.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};
use crate::validation::{optional_text, require_email, require_text};

/// Minimum password length for accounts created from the console.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A document from the `users` collection, keyed by uid. Listed by
/// `full_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub uid: DocId,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub matricule: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub speciality: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Roster row: a profile plus whether an admin marker exists for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserProfile {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub matricule: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub speciality: Option<String>,
}

impl CreateUserProfile {
    pub fn normalized(self) -> Result<Self, CoreError> {
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::invalid(
                "password",
                format!("Le mot de passe doit contenir au moins {MIN_PASSWORD_LENGTH} caractères."),
            ));
        }
        Ok(Self {
            email: require_email("email", &self.email)?,
            password: self.password,
            full_name: require_text("full_name", &self.full_name)?,
            matricule: optional_text(self.matricule.as_deref()),
            year: optional_text(self.year.as_deref()),
            speciality: optional_text(self.speciality.as_deref()),
        })
    }
}

/// Partial profile update. Blank optional fields clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speciality: Option<String>,
}

impl UpdateUserProfile {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            email: self.email.map(|v| require_email("email", &v)).transpose()?,
            full_name: self
                .full_name
                .map(|v| require_text("full_name", &v))
                .transpose()?,
            matricule: self.matricule.map(|v| v.trim().to_string()),
            year: self.year.map(|v| v.trim().to_string()),
            speciality: self.speciality.map(|v| v.trim().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateUserProfile {
        CreateUserProfile {
            email: "Etudiant@Univ.dz".into(),
            password: "motdepasse".into(),
            full_name: " Amina Benali ".into(),
            matricule: Some("".into()),
            year: Some("L2".into()),
            speciality: None,
        }
    }

    #[test]
    fn create_normalizes_email_and_name() {
        let normalized = input().normalized().unwrap();
        assert_eq!(normalized.email, "etudiant@univ.dz");
        assert_eq!(normalized.full_name, "Amina Benali");
        assert_eq!(normalized.matricule, None);
    }

    #[test]
    fn short_password_rejected() {
        let mut bad = input();
        bad.password = "court".into();
        assert_eq!(bad.normalized().unwrap_err().field(), Some("password"));
    }

    #[test]
    fn profile_accepts_id_alias() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "a@b.dz",
            "full_name": "A",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(profile.uid, "u1");
    }

    #[test]
    fn admin_view_flattens_profile() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "uid": "u1",
            "email": "a@b.dz",
            "full_name": "A",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        let json = serde_json::to_value(AdminUserView {
            profile,
            is_admin: true,
        })
        .unwrap();
        assert_eq!(json["uid"], "u1");
        assert_eq!(json["is_admin"], true);
    }
}
