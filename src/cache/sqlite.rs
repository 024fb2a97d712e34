//! `SQLite`-backed cache tables
//!
//! A lookup bumps `requested_count` and `last_requested_at` so stale or
//! rarely used rows can be pruned by an external job.

use async_trait::async_trait;
use rusqlite::OptionalExtension;

use super::{SpeechCache, TranslationCache, content_hash, normalize_text};
use crate::Result;
use crate::db::{self, DbPool};

const SELECT_TRANSLATION: &str = r"UPDATE text_translation
SET
    last_requested_at = datetime('now'),
    requested_count = requested_count + 1
WHERE hash = ?1 AND target_lang = ?2
RETURNING translated_text";

const UPSERT_TRANSLATION: &str = r"INSERT INTO text_translation
    (hash, target_lang, input_text, translated_text)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(hash, target_lang) DO UPDATE SET
    translated_text = excluded.translated_text,
    last_requested_at = datetime('now')";

const SELECT_SPEECH: &str = r"UPDATE generated_speech
SET
    last_requested_at = datetime('now'),
    requested_count = requested_count + 1
WHERE hash = ?1 AND target_lang = ?2
RETURNING audio_ref";

const UPSERT_SPEECH: &str = r"INSERT INTO generated_speech
    (hash, target_lang, input_text, audio_ref)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(hash, target_lang) DO UPDATE SET
    audio_ref = excluded.audio_ref,
    last_requested_at = datetime('now')";

/// Translation cache stored in the `text_translation` table
///
/// The key ignores the source language: the hash of the text already
/// identifies what was said.
#[derive(Debug, Clone)]
pub struct SqliteTranslationCache {
    pool: DbPool,
}

impl SqliteTranslationCache {
    /// Create a cache over an initialized pool
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranslationCache for SqliteTranslationCache {
    async fn get(&self, text: &str, _source: &str, target: &str) -> Result<Option<String>> {
        let conn = db::conn(&self.pool)?;
        let translated = conn
            .query_row(SELECT_TRANSLATION, [content_hash(text).as_str(), target], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(translated)
    }

    async fn store(
        &self,
        text: &str,
        translation: &str,
        _source: &str,
        target: &str,
    ) -> Result<()> {
        let conn = db::conn(&self.pool)?;
        conn.execute(
            UPSERT_TRANSLATION,
            [content_hash(text).as_str(), target, normalize_text(text), translation],
        )?;
        Ok(())
    }
}

/// Speech cache stored in the `generated_speech` table
#[derive(Debug, Clone)]
pub struct SqliteSpeechCache {
    pool: DbPool,
}

impl SqliteSpeechCache {
    /// Create a cache over an initialized pool
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpeechCache for SqliteSpeechCache {
    async fn get(&self, text: &str, language: &str) -> Result<Option<String>> {
        let conn = db::conn(&self.pool)?;
        let reference = conn
            .query_row(SELECT_SPEECH, [content_hash(text).as_str(), language], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(reference)
    }

    async fn store(&self, reference: &str, text: &str, language: &str) -> Result<()> {
        let conn = db::conn(&self.pool)?;
        conn.execute(
            UPSERT_SPEECH,
            [content_hash(text).as_str(), language, normalize_text(text), reference],
        )?;
        Ok(())
    }
}

/// Usage numbers for one cache table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Number of cached entries
    pub entries: u64,
    /// Lookups that hit an entry, plus one per stored entry
    pub requests: u64,
}

/// Usage numbers for both caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub translations: TableStats,
    pub speech: TableStats,
}

impl CacheStats {
    /// Collect stats from the cache tables
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn collect(pool: &DbPool) -> Result<Self> {
        let conn = db::conn(pool)?;
        let table = |name: &str| -> Result<TableStats> {
            let sql = format!("SELECT COUNT(*), COALESCE(SUM(requested_count), 0) FROM {name}");
            let (entries, requests): (i64, i64) =
                conn.query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
            Ok(TableStats {
                entries: entries.unsigned_abs(),
                requests: requests.unsigned_abs(),
            })
        };

        Ok(Self {
            translations: table("text_translation")?,
            speech: table("generated_speech")?,
        })
    }
}
