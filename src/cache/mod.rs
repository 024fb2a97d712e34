//! Content-addressed caches for translations and synthesized speech
//!
//! Both caches key entries by the hash of the normalized input text paired
//! with a language. The two key spaces are disjoint tables and are never
//! compared with each other.
//!
//! Lookups return `Ok(None)` when nothing is cached. Any `Err` is a degraded
//! backend; the pipeline treats it as a miss.

mod sqlite;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

pub use sqlite::{CacheStats, SqliteSpeechCache, SqliteTranslationCache, TableStats};

use crate::Result;

/// Text translation cache
#[async_trait]
pub trait TranslationCache: Send + Sync {
    /// Look up a translation of `text` into `target`
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    async fn get(&self, text: &str, source: &str, target: &str) -> Result<Option<String>>;

    /// Remember `translation` of `text` into `target`
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    async fn store(&self, text: &str, translation: &str, source: &str, target: &str)
    -> Result<()>;
}

/// Synthesized speech cache
///
/// Holds external references to delivered audio, never the audio bytes.
#[async_trait]
pub trait SpeechCache: Send + Sync {
    /// Look up a reference to audio of `text` spoken in `language`
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    async fn get(&self, text: &str, language: &str) -> Result<Option<String>>;

    /// Remember `reference` as the audio of `text` spoken in `language`
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails
    async fn store(&self, reference: &str, text: &str, language: &str) -> Result<()>;
}

/// Canonical form of text before hashing
#[must_use]
pub fn normalize_text(text: &str) -> &str {
    text.trim()
}

/// Fixed-size content hash of the normalized text, hex encoded
#[must_use]
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(normalize_text(text).as_bytes()))
}
