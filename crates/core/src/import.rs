//! Validation of bulk-import payloads returned by the completion API.
//!
//! The model is asked for `{"resources": [...]}` but its output is treated
//! as untrusted text: code fences are stripped, a bare array is accepted
//! too, and every item is checked before it can become a resource.
//! Invalid items are reported individually instead of failing the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{CreateResource, ResourceKind};
use crate::error::CoreError;
use crate::types::DocId;
use crate::validation::{optional_text, require_http_url, require_text};

/// Upper bound on items accepted from one payload.
pub const MAX_IMPORT_ITEMS: usize = 100;

/// A resource extracted from free text, validated and ready to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub is_recommended: bool,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

impl ImportedResource {
    pub fn into_create(self, module_id: DocId) -> CreateResource {
        CreateResource {
            module_id,
            kind: self.kind,
            title: self.title,
            url: Some(self.url),
            source: self.source,
            is_recommended: self.is_recommended,
            is_exclusive: false,
        }
    }
}

/// An item that failed validation, by position in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedItem {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub accepted: Vec<ImportedResource>,
    pub rejected: Vec<RejectedItem>,
}

/// Parse and validate the raw text of a completion.
///
/// Fails only when the text is not JSON or has no item list at all.
pub fn parse_import_payload(raw: &str) -> Result<ImportBatch, CoreError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        CoreError::Validation(format!("La réponse d'import n'est pas un JSON valide : {e}"))
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("resources") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CoreError::Validation(
                    "La réponse d'import ne contient pas de liste « resources ».".into(),
                ))
            }
        },
        _ => {
            return Err(CoreError::Validation(
                "La réponse d'import doit être une liste de ressources.".into(),
            ))
        }
    };

    let mut batch = ImportBatch::default();
    for (index, item) in items.iter().enumerate() {
        if index >= MAX_IMPORT_ITEMS {
            batch.rejected.push(RejectedItem {
                index,
                reason: format!("Limite de {MAX_IMPORT_ITEMS} ressources par import atteinte."),
            });
            continue;
        }
        match validate_item(item) {
            Ok(resource) => batch.accepted.push(resource),
            Err(err) => batch.rejected.push(RejectedItem {
                index,
                reason: reason_of(&err),
            }),
        }
    }
    Ok(batch)
}

fn validate_item(item: &Value) -> Result<ImportedResource, CoreError> {
    let obj = item
        .as_object()
        .ok_or_else(|| CoreError::Validation("L'élément n'est pas un objet.".into()))?;

    let text = |key: &str| obj.get(key).and_then(Value::as_str);
    let flag = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_bool))
            .unwrap_or(false)
    };

    let title = require_text("title", text("title").unwrap_or_default())?;
    let url = require_http_url("url", text("url").unwrap_or_default())?;
    let kind = text("type")
        .and_then(ResourceKind::parse_lenient)
        .unwrap_or(ResourceKind::Other);

    Ok(ImportedResource {
        title,
        url,
        source: optional_text(text("source")),
        is_recommended: flag(&["is_recommended", "isRecommended"]),
        kind,
    })
}

fn reason_of(err: &CoreError) -> String {
    match err {
        CoreError::InvalidField { field, message } => format!("{field} : {message}"),
        CoreError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Remove a surrounding Markdown code fence (with optional language tag).
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_resources_object() {
        let raw = r#"{"resources": [
            {"title": "Cours 1", "url": "https://u.dz/c1.pdf", "source": "Prof. A", "isRecommended": true, "type": "cours"}
        ]}"#;
        let batch = parse_import_payload(raw).unwrap();
        assert_eq!(batch.accepted.len(), 1);
        assert!(batch.rejected.is_empty());
        let item = &batch.accepted[0];
        assert!(item.is_recommended);
        assert_eq!(item.kind, ResourceKind::Course);
        assert_eq!(item.source.as_deref(), Some("Prof. A"));
    }

    #[test]
    fn accepts_fenced_bare_array() {
        let raw = "```json\n[{\"title\": \"TD 2\", \"url\": \"http://u.dz/td2\", \"type\": \"TD\"}]\n```";
        let batch = parse_import_payload(raw).unwrap();
        assert_eq!(batch.accepted[0].kind, ResourceKind::Exercises);
    }

    #[test]
    fn invalid_items_are_reported_not_created() {
        let raw = r#"[
            {"title": "", "url": "https://u.dz/a"},
            {"title": "Sans lien"},
            "texte",
            {"title": "Bon", "url": "https://u.dz/b", "type": "inconnu"}
        ]"#;
        let batch = parse_import_payload(raw).unwrap();
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].kind, ResourceKind::Other);
        let indexes: Vec<usize> = batch.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(batch.rejected[1].reason.starts_with("url"));
    }

    #[test]
    fn non_json_fails() {
        assert!(parse_import_payload("Voici les ressources : ...").is_err());
    }

    #[test]
    fn object_without_list_fails() {
        assert!(parse_import_payload(r#"{"items": []}"#).is_err());
        assert!(parse_import_payload("42").is_err());
    }

    #[test]
    fn caps_item_count() {
        let items: Vec<Value> = (0..MAX_IMPORT_ITEMS + 3)
            .map(|i| serde_json::json!({"title": format!("R{i}"), "url": "https://u.dz/r"}))
            .collect();
        let batch = parse_import_payload(&Value::Array(items).to_string()).unwrap();
        assert_eq!(batch.accepted.len(), MAX_IMPORT_ITEMS);
        assert_eq!(batch.rejected.len(), 3);
    }

    #[test]
    fn into_create_targets_module() {
        let batch =
            parse_import_payload(r#"[{"title": "A", "url": "https://u.dz/a"}]"#).unwrap();
        let create = batch.accepted[0].clone().into_create("m1".into());
        assert_eq!(create.module_id, "m1");
        assert_eq!(create.url.as_deref(), Some("https://u.dz/a"));
        assert!(!create.is_exclusive);
    }
}
