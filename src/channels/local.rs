//! Filesystem voice store
//!
//! Each chat is a directory under the store root. Delivered audio is named
//! by its content hash, and the reference is the file's path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::VoiceChannel;
use crate::{Error, Result};

/// Writes voice messages into per-chat directories
#[derive(Debug, Clone)]
pub struct LocalVoiceStore {
    root: PathBuf,
}

impl LocalVoiceStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn chat_dir(&self, chat_id: &str) -> Result<PathBuf> {
        if chat_id.is_empty() || chat_id.contains(['/', '\\']) || chat_id.starts_with('.') {
            return Err(Error::Channel(format!("invalid chat id: {chat_id:?}")));
        }
        Ok(self.root.join(chat_id))
    }
}

#[async_trait]
impl VoiceChannel for LocalVoiceStore {
    async fn send_voice(
        &self,
        chat_id: &str,
        audio: Vec<u8>,
        _reply_to: Option<&str>,
    ) -> Result<Option<String>> {
        let dir = self.chat_dir(chat_id)?;
        tokio::fs::create_dir_all(&dir).await?;

        let digest = hex::encode(Sha256::digest(&audio));
        let path = dir.join(format!("{}.ogg", &digest[..16]));
        tokio::fs::write(&path, &audio).await?;

        tracing::debug!(path = %path.display(), bytes = audio.len(), "voice written");
        Ok(Some(path.to_string_lossy().into_owned()))
    }

    async fn share_voice(
        &self,
        chat_id: &str,
        reference: &str,
        _reply_to: Option<&str>,
    ) -> Result<()> {
        let source = Path::new(reference);
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(Error::NotFound(format!("voice file {reference}")));
        }

        let dir = self.chat_dir(chat_id)?;
        if source.parent() == Some(dir.as_path()) {
            return Ok(());
        }

        tokio::fs::create_dir_all(&dir).await?;
        let file_name = source
            .file_name()
            .ok_or_else(|| Error::Channel(format!("invalid voice reference: {reference}")))?;
        tokio::fs::copy(source, dir.join(file_name)).await?;

        tracing::debug!(reference, chat_id, "voice shared");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_returns_path_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVoiceStore::new(dir.path());

        let reference = store
            .send_voice("chat1", b"OggS".to_vec(), None)
            .await
            .unwrap()
            .unwrap();

        assert!(reference.ends_with(".ogg"));
        assert_eq!(std::fs::read(&reference).unwrap(), b"OggS");
    }

    #[tokio::test]
    async fn test_share_copies_into_other_chat() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVoiceStore::new(dir.path());

        let reference = store
            .send_voice("alice", b"OggS".to_vec(), None)
            .await
            .unwrap()
            .unwrap();
        store.share_voice("bob", &reference, None).await.unwrap();

        let name = Path::new(&reference).file_name().unwrap();
        assert!(dir.path().join("bob").join(name).exists());

        // Sharing into the owning chat is a no-op
        store.share_voice("alice", &reference, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_share_missing_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVoiceStore::new(dir.path());

        let missing = dir.path().join("gone.ogg");
        let err = store
            .share_voice("chat", missing.to_str().unwrap(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_path_like_chat_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalVoiceStore::new(dir.path());

        for chat in ["", "../up", "a/b", ".hidden"] {
            assert!(store.send_voice(chat, vec![1], None).await.is_err());
        }
    }
}
