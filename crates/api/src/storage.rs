//! Object storage for uploaded resource files.
//!
//! Files live under `resources/{resource_id}/{file name}` relative to the
//! storage root and are served back at `{PUBLIC_BASE_URL}/files/{path}`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use cursus_core::slug::slugify;

/// Errors from a [`FileStorage`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

/// A stored object: where it lives and how to download it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage-relative path, e.g. `resources/abc/cours-1.pdf`.
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write `bytes` at the relative `path`, replacing any existing object.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<StoredFile, StorageError>;

    /// Remove the object at `path`. Missing objects are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Public download URL for `path`.
    fn url_for(&self, path: &str) -> String;
}

/// Storage path of a resource's uploaded file.
pub fn resource_file_path(resource_id: &str, file_name: &str) -> String {
    format!("resources/{resource_id}/{}", sanitize_file_name(file_name))
}

/// Reduce a client-supplied file name to `slug[.ext]`.
///
/// Directory parts are dropped and the stem is slugified; an empty stem
/// becomes `fichier`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let mut stem = slugify(stem);
    if stem.is_empty() {
        stem = "fichier".into();
    }
    let ext: String = ext
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}

/// Files on the local filesystem under `root`.
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path under the root, refusing anything that could
    /// escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::debug!(path, size = bytes.len(), "Stored file");
        Ok(StoredFile {
            path: path.to_string(),
            url: self.url_for(path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/files/{path}", self.public_base_url)
    }
}
