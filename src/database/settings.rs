use sqlx::Row;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, error, warn};

use super::*;

/// Keys the game itself keeps in the settings table.
pub mod keys {
    pub const SOUND_MUTED: &str = "SoundMutedPref";
    pub const GAME_COUNT: &str = "GameCountPref";
    pub const GAMES_BEFORE_AD: &str = "GamesBeforeAdPref";
}

const UPSERT_SETTING: &str = "INSERT INTO info (opt, value) VALUES (?, ?) \
    ON CONFLICT (opt) DO UPDATE SET value = excluded.value";

/// Typed key/value flags backed by the `info` table.
///
/// Every write hits the database before returning. Reads never fail:
/// a missing, unparsable, or unreadable value yields the caller's default.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    database: DatabasePool,
}

impl SettingsStore {
    pub fn new(database: DatabasePool) -> Self {
        Self { database }
    }

    pub async fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_parsed(key, default).await
    }

    pub async fn set_bool(&self, key: &str, value: bool) -> StoreResult<()> {
        self.set_raw(key, &value.to_string()).await
    }

    pub async fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_parsed(key, default).await
    }

    pub async fn set_int(&self, key: &str, value: i64) -> StoreResult<()> {
        self.set_raw(key, &value.to_string()).await
    }

    pub async fn get_string(&self, key: &str, default: &str) -> String {
        match self.get_raw(key).await {
            Some(value) => value,
            None => default.to_owned(),
        }
    }

    pub async fn set_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.set_raw(key, value).await
    }

    /// Adds one to an integer counter (missing counts as 0) and returns the new value.
    ///
    /// Read and write share one transaction, so concurrent increments all count.
    pub async fn increment_int(&self, key: &str) -> StoreResult<i64> {
        let mut transaction = self.database.begin().await?;

        let current = sqlx::query("SELECT value FROM info WHERE opt = ?")
            .bind(key)
            .fetch_optional(&mut transaction)
            .await?
            .and_then(|row| row.try_get_unchecked::<Option<String>, usize>(0).ok().flatten())
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let value = current + 1;

        sqlx::query(UPSERT_SETTING)
            .bind(key)
            .bind(value.to_string())
            .execute(&mut transaction)
            .await?;
        transaction.commit().await?;

        debug!(key, value, "counter incremented");
        Ok(value)
    }

    async fn get_parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = match self.get_raw(key).await {
            Some(raw) => raw,
            None => return default,
        };
        match raw.parse() {
            Ok(value) => value,
            Err(err) => {
                warn!(key, value = %raw, %err, "unparsable setting, using default");
                default
            }
        }
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        let response = sqlx::query("SELECT value FROM info WHERE opt = ?")
            .bind(key)
            .fetch_optional(&self.database)
            .await;

        match response {
            Ok(Some(row)) => row
                .try_get_unchecked::<Option<String>, usize>(0)
                .ok()
                .flatten(),
            Ok(None) => None,
            Err(err) => {
                error!(key, %err, "failed to read setting");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(UPSERT_SETTING)
            .bind(key)
            .bind(value)
            .execute(&self.database)
            .await?;

        debug!(key, value, "setting stored");
        Ok(())
    }
}
