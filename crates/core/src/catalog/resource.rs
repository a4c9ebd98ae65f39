//! Learning resources attached to a module.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};
use crate::validation::{optional_text, require_http_url, require_text};

/// Kind of learning resource. Unknown values decode as [`ResourceKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[serde(rename = "cours")]
    Course,
    #[serde(rename = "td")]
    Exercises,
    #[serde(rename = "tp")]
    Lab,
    #[serde(rename = "examen")]
    Exam,
    #[serde(rename = "resume")]
    Summary,
    Video,
    #[serde(rename = "livre")]
    Book,
    #[serde(rename = "lien")]
    Link,
    #[serde(rename = "autre", other)]
    Other,
}

impl ResourceKind {
    /// Parse a loosely written kind (case and accents ignored).
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let folded = crate::slug::slugify(raw);
        let kind = match folded.as_str() {
            "cours" | "course" | "lecture" => Self::Course,
            "td" | "exercices" | "exercises" => Self::Exercises,
            "tp" | "lab" | "travaux-pratiques" => Self::Lab,
            "examen" | "exam" | "sujet" => Self::Exam,
            "resume" | "summary" | "fiche" => Self::Summary,
            "video" => Self::Video,
            "livre" | "book" | "ouvrage" => Self::Book,
            "lien" | "link" | "site" => Self::Link,
            "autre" | "other" => Self::Other,
            _ => return None,
        };
        Some(kind)
    }
}

/// A document from the `resources` collection. Listed by `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: DocId,
    pub module_id: DocId,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub title: String,
    /// Empty until a URL is entered or a file is uploaded.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_exclusive: bool,
    /// Object-storage path of an uploaded file, if any.
    #[serde(default)]
    pub storage_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResource {
    pub module_id: DocId,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub title: String,
    /// Absent when the content will be provided by a file upload.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_exclusive: bool,
}

impl CreateResource {
    pub fn normalized(self) -> Result<Self, CoreError> {
        let url = match optional_text(self.url.as_deref()) {
            Some(url) => Some(require_http_url("url", &url)?),
            None => None,
        };
        Ok(Self {
            module_id: require_text("module_id", &self.module_id)?,
            kind: self.kind,
            title: require_text("title", &self.title)?,
            url,
            source: optional_text(self.source.as_deref()),
            is_recommended: self.is_recommended,
            is_exclusive: self.is_exclusive,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResource {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `Some("")` clears the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recommended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exclusive: Option<bool>,
}

impl UpdateResource {
    pub fn normalized(self) -> Result<Self, CoreError> {
        Ok(Self {
            kind: self.kind,
            title: self.title.map(|v| require_text("title", &v)).transpose()?,
            url: self.url.map(|v| require_http_url("url", &v)).transpose()?,
            source: self.source.map(|v| v.trim().to_string()),
            is_recommended: self.is_recommended,
            is_exclusive: self.is_exclusive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateResource {
        CreateResource {
            module_id: "spec-x_s2_algebre".into(),
            kind: ResourceKind::Course,
            title: " Chapitre 1 ".into(),
            url: Some("  ".into()),
            source: None,
            is_recommended: true,
            is_exclusive: false,
        }
    }

    #[test]
    fn blank_url_means_pending_upload() {
        let normalized = input().normalized().unwrap();
        assert_eq!(normalized.url, None);
        assert_eq!(normalized.title, "Chapitre 1");
    }

    #[test]
    fn invalid_url_rejected() {
        let mut bad = input();
        bad.url = Some("chapitre1.pdf".into());
        assert_eq!(bad.normalized().unwrap_err().field(), Some("url"));
    }

    #[test]
    fn unknown_kind_decodes_as_other() {
        let kind: ResourceKind = serde_json::from_str("\"podcast\"").unwrap();
        assert_eq!(kind, ResourceKind::Other);
        let kind: ResourceKind = serde_json::from_str("\"td\"").unwrap();
        assert_eq!(kind, ResourceKind::Exercises);
    }

    #[test]
    fn kind_serializes_under_type_key() {
        let json = serde_json::to_value(input()).unwrap();
        assert_eq!(json["type"], "cours");
    }

    #[test]
    fn lenient_kind_parsing() {
        assert_eq!(ResourceKind::parse_lenient("Vidéo"), Some(ResourceKind::Video));
        assert_eq!(ResourceKind::parse_lenient("EXAMEN"), Some(ResourceKind::Exam));
        assert_eq!(ResourceKind::parse_lenient("???"), None);
    }

    #[test]
    fn update_rejects_blank_url() {
        assert!(UpdateResource {
            url: Some("".into()),
            ..Default::default()
        }
        .normalized()
        .is_err());
    }
}
