//! User repository: translation preferences and points balance

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::OptionalExtension;

use super::DbPool;
use crate::delivery::CostCharger;
use crate::{Error, Result};

/// A user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// External identity (e.g. Telegram user ID)
    pub id: String,
    /// Language the user usually speaks
    pub source_lang: String,
    /// Language the user wants translations in
    pub target_lang: String,
    /// Remaining points balance (may be negative)
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Defaults applied to newly seen users
#[derive(Debug, Clone)]
pub struct UserDefaults {
    pub source_lang: String,
    pub target_lang: String,
    pub initial_points: i64,
}

impl Default for UserDefaults {
    fn default() -> Self {
        Self {
            source_lang: "ru".to_string(),
            target_lang: "en".to_string(),
            initial_points: 60,
        }
    }
}

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: DbPool,
    defaults: UserDefaults,
}

const SELECT_USER: &str =
    "SELECT id, source_lang, target_lang, points, created_at, updated_at FROM users WHERE id = ?1";

impl UserRepo {
    /// Create a new user repository
    #[must_use]
    pub const fn new(pool: DbPool, defaults: UserDefaults) -> Self {
        Self { pool, defaults }
    }

    /// Find a user by ID (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, id: &str) -> Result<Option<User>> {
        let conn = super::conn(&self.pool)?;

        let user = conn
            .query_row(SELECT_USER, [id], |row| {
                Ok(User {
                    id: row.get(0)?,
                    source_lang: row.get(1)?,
                    target_lang: row.get(2)?,
                    points: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            })
            .optional()?;

        Ok(user)
    }

    /// Find or create a user with the configured defaults
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_or_create(&self, id: &str) -> Result<User> {
        {
            let conn = super::conn(&self.pool)?;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO users (id, source_lang, target_lang, points) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    id,
                    self.defaults.source_lang,
                    self.defaults.target_lang,
                    self.defaults.initial_points,
                ],
            )?;

            if inserted > 0 {
                tracing::info!(user_id = id, points = self.defaults.initial_points, "created user");
            }
        }

        self.find(id)?
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    /// Set both translation languages
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown user, or error if database
    /// operation fails
    pub fn set_languages(&self, id: &str, source_lang: &str, target_lang: &str) -> Result<()> {
        let conn = super::conn(&self.pool)?;

        let updated = conn.execute(
            "UPDATE users SET source_lang = ?2, target_lang = ?3, updated_at = datetime('now') WHERE id = ?1",
            [id, source_lang, target_lang],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("user {id}")));
        }
        Ok(())
    }

    /// Swap source and target languages
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown user, or error if database
    /// operation fails
    pub fn swap_languages(&self, id: &str) -> Result<User> {
        {
            let conn = super::conn(&self.pool)?;
            let updated = conn.execute(
                "UPDATE users SET source_lang = target_lang, target_lang = source_lang, updated_at = datetime('now') WHERE id = ?1",
                [id],
            )?;

            if updated == 0 {
                return Err(Error::NotFound(format!("user {id}")));
            }
        }

        self.find(id)?
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    /// Subtract `cost` points from a user's balance
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown user, or error if database
    /// operation fails
    pub fn charge(&self, id: &str, cost: u64) -> Result<()> {
        let cost = i64::try_from(cost)
            .map_err(|_| Error::Database(format!("cost {cost} out of range")))?;
        let conn = super::conn(&self.pool)?;

        let updated = conn.execute(
            "UPDATE users SET points = points - ?2, updated_at = datetime('now') WHERE id = ?1",
            rusqlite::params![id, cost],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("user {id}")));
        }

        tracing::debug!(user_id = id, cost, "charged user");
        Ok(())
    }
}

#[async_trait]
impl CostCharger for UserRepo {
    async fn charge_cost(&self, user_id: &str, cost: u64) -> Result<()> {
        self.charge(user_id, cost)
    }
}

/// Parse an `SQLite` `datetime('now')` timestamp
fn parse_datetime(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}
