//! Database schema and migrations

use rusqlite::Connection;

use crate::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema
///
/// # Errors
///
/// Returns error if migration fails
pub fn init(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Users and their translation preferences
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            source_lang TEXT NOT NULL,
            target_lang TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        PRAGMA user_version = 1;
        ",
    )?;

    tracing::info!("migrated to schema v1");
    Ok(())
}

fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Translated text keyed by input hash and target language
        CREATE TABLE IF NOT EXISTS text_translation (
            hash TEXT NOT NULL,
            target_lang TEXT NOT NULL,
            input_text TEXT NOT NULL,
            translated_text TEXT NOT NULL,
            requested_count INTEGER NOT NULL DEFAULT 1,
            last_requested_at TEXT NOT NULL DEFAULT (datetime('now')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (hash, target_lang)
        );

        -- References to delivered speech keyed by text hash and language
        CREATE TABLE IF NOT EXISTS generated_speech (
            hash TEXT NOT NULL,
            target_lang TEXT NOT NULL,
            input_text TEXT NOT NULL,
            audio_ref TEXT NOT NULL,
            requested_count INTEGER NOT NULL DEFAULT 1,
            last_requested_at TEXT NOT NULL DEFAULT (datetime('now')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (hash, target_lang)
        );

        CREATE INDEX IF NOT EXISTS idx_text_translation_last ON text_translation(last_requested_at);
        CREATE INDEX IF NOT EXISTS idx_generated_speech_last ON generated_speech(last_requested_at);

        PRAGMA user_version = 2;
        ",
    )?;

    tracing::info!("migrated to schema v2");
    Ok(())
}
