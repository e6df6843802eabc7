use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub created_at: i64,
    pub content_type: String,
}

/// Binary files addressed by key: profile pictures and campaign media.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<ObjectMetadata>;
    async fn get(&self, key: &str) -> Result<Bytes>;
}

/// Fresh key for a user's profile picture, keeping the file extension.
pub fn profile_picture_key(username: &str, file_name: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("profile/{}/{}.{}", username, id, ext.to_ascii_lowercase()),
        None => format!("profile/{}/{}", username, id),
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Uploads a new picture and points the backend user at it.
pub async fn replace_profile_picture<S: ObjectStore + ?Sized>(
    store: &S,
    api: &ApiClient,
    username: &str,
    file_name: &str,
    data: Bytes,
) -> Result<String> {
    let key = profile_picture_key(username, file_name);
    store.put(&key, data, content_type_for(file_name)).await?;
    api.update_profile_picture(username, &key).await?;
    Ok(key)
}

pub async fn remove_profile_picture(api: &ApiClient, username: &str) -> Result<()> {
    api.update_profile_picture(username, "").await
}

/// Filesystem-backed store, used for local development and tests.
pub struct LocalObjectStore {
    root_path: PathBuf,
    metadata: Arc<DashMap<String, ObjectMetadata>>,
}

impl LocalObjectStore {
    pub async fn new(root_path: impl Into<PathBuf>) -> Result<Self> {
        let root = root_path.into();
        fs::create_dir_all(&root).await.map_err(io_error)?;
        Ok(Self {
            root_path: root,
            metadata: Arc::new(DashMap::new()),
        })
    }

    pub fn metadata(&self, key: &str) -> Option<ObjectMetadata> {
        self.metadata.get(key).map(|m| m.clone())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(ClientError::Storage(format!("invalid object key '{}'", key)));
        }
        Ok(self.root_path.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<ObjectMetadata> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        fs::write(&path, &data).await.map_err(io_error)?;

        let meta = ObjectMetadata {
            key: key.to_string(),
            size: data.len() as u64,
            created_at: chrono::Utc::now().timestamp(),
            content_type: content_type.to_string(),
        };
        self.metadata.insert(key.to_string(), meta.clone());
        debug!(key, size = meta.size, "object stored");
        Ok(meta)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ClientError::NotFound(key.to_string())),
            Err(e) => Err(io_error(e)),
        }
    }
}

fn io_error(e: std::io::Error) -> ClientError {
    ClientError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path()).await.unwrap();

        let meta = store
            .put("profile/mina/a.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();
        assert_eq!(meta.size, 9);
        assert_eq!(store.get("profile/mina/a.png").await.unwrap(), Bytes::from_static(b"png-bytes"));
        assert_eq!(store.metadata("profile/mina/a.png").unwrap().content_type, "image/png");
    }

    #[tokio::test]
    async fn test_missing_and_unsafe_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path()).await.unwrap();

        assert!(matches!(store.get("nope").await, Err(ClientError::NotFound(_))));
        assert!(matches!(
            store.put("../escape", Bytes::new(), "text/plain").await,
            Err(ClientError::Storage(_))
        ));
    }

    #[test]
    fn test_profile_picture_key() {
        let key = profile_picture_key("mina", "Me.JPG");
        assert!(key.starts_with("profile/mina/"));
        assert!(key.ends_with(".jpg"));
        assert_eq!(content_type_for("Me.JPG"), "image/jpeg");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }
}
