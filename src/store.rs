use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tracing::instrument;

use crate::notification::StoredMessage;

/// Read access to stored raw messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn load(&self, location: &StoredMessage) -> Result<Vec<u8>>;
}

/// Messages laid out on disk as `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FsMessageStore {
    root: PathBuf,
}

impl FsMessageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, location: &StoredMessage) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for part in [&location.bucket, &location.key] {
            let relative = Path::new(part);
            if part.is_empty()
                || !relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)))
            {
                bail!("Invalid storage location component: {:?}", part);
            }
            path.push(relative);
        }
        Ok(path)
    }
}

#[async_trait]
impl MessageStore for FsMessageStore {
    #[instrument(skip_all, fields(bucket = %location.bucket, key = %location.key))]
    async fn load(&self, location: &StoredMessage) -> Result<Vec<u8>> {
        let path = self.path_for(location)?;
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read stored message {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(bucket: &str, key: &str) -> StoredMessage {
        StoredMessage {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn loads_message_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("incoming")).unwrap();
        std::fs::write(dir.path().join("incoming/abc123"), b"Subject: hi\r\n\r\nbody").unwrap();

        let store = FsMessageStore::new(dir.path());
        let bytes = store.load(&location("incoming", "abc123")).await.unwrap();
        assert_eq!(bytes, b"Subject: hi\r\n\r\nbody");
    }

    #[tokio::test]
    async fn nested_keys_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("incoming/2024/03")).unwrap();
        std::fs::write(dir.path().join("incoming/2024/03/m"), b"x").unwrap();

        let store = FsMessageStore::new(dir.path());
        assert!(store.load(&location("incoming", "2024/03/m")).await.is_ok());
    }

    #[tokio::test]
    async fn missing_message_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMessageStore::new(dir.path());
        assert!(store.load(&location("incoming", "nope")).await.is_err());
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let store = FsMessageStore::new("/tmp/store");
        for (bucket, key) in [("..", "x"), ("incoming", "../secret"), ("incoming", "/etc/passwd"), ("", "x")] {
            let err = store.load(&location(bucket, key)).await.unwrap_err();
            assert!(err.to_string().contains("Invalid storage location"));
        }
    }
}
