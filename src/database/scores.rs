use sqlx::Row;
use tracing::{info, warn};

use super::*;

/// Upper bound for [`ScoreStore::top_scores`].
pub const MAX_TOP_SCORES: usize = 5;
/// Upper bound for [`ScoreStore::recent_names`].
pub const MAX_RECENT_NAMES: usize = 3;

/// Append-only ledger of completed games.
#[derive(Clone, Debug)]
pub struct ScoreStore {
    database: DatabasePool,
    coin_cap: Option<Coins>,
}

impl ScoreStore {
    pub fn new(database: DatabasePool) -> Self {
        Self {
            database,
            coin_cap: None,
        }
    }

    /// Rejects any game reporting more than `cap` coins.
    pub fn with_coin_cap(mut self, cap: Coins) -> Self {
        self.coin_cap = Some(cap);
        self
    }

    /// Appends one game to the ledger. The name is stored as given.
    pub async fn submit(&self, points: Points, coins: Coins, name: &str) -> StoreResult<()> {
        if let Some(cap) = self.coin_cap {
            if coins > cap {
                warn!(coins, cap, "refusing implausible coin count");
                return Err(StoreError::ImplausibleCoins { coins, cap });
            }
        }

        sqlx::query("INSERT INTO score (points, coins, name) VALUES (?, ?, ?)")
            .bind(i64::from(points))
            .bind(encode_coins(coins))
            .bind(name)
            .execute(&self.database)
            .await?;

        info!(points, coins, name, "score recorded");
        Ok(())
    }

    /// Best games first. Equal points keep insertion order.
    /// `limit` is clamped to [`MAX_TOP_SCORES`].
    pub async fn top_scores(&self, limit: usize) -> StoreResult<Vec<ScoreRecord>> {
        let limit = limit.min(MAX_TOP_SCORES) as i64;
        let rows = sqlx::query(
            "SELECT points, coins, name FROM score ORDER BY points DESC, rowid ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.database)
        .await?;

        let scores = rows
            .into_iter()
            .map(|row| {
                let points = row.try_get_unchecked::<i64, usize>(0)?;
                let coins = row.try_get_unchecked::<i64, usize>(1)?;
                let name = row.try_get_unchecked::<Option<String>, usize>(2)?;
                Ok(ScoreRecord::new(
                    clamp_points(points),
                    decode_coins(coins),
                    name.unwrap_or_default(),
                ))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(scores)
    }

    /// Coins collected over every recorded game.
    pub async fn total_coins(&self) -> StoreResult<u64> {
        let rows = sqlx::query("SELECT SUM(coins), COUNT(coins) FROM score")
            .fetch_all(&self.database)
            .await?;

        if rows.len() != 1 {
            warn!(rows = rows.len(), "unexpected coin aggregate, reporting none");
            return Ok(0);
        }
        let row = &rows[0];
        let sum = row.try_get_unchecked::<Option<i64>, usize>(0)?.unwrap_or(0);
        let count = row.try_get_unchecked::<i64, usize>(1)?;

        Ok(((sum - count) / 2).max(0) as u64)
    }

    /// Distinct non-blank names, most recent game first.
    /// `limit` is clamped to [`MAX_RECENT_NAMES`].
    pub async fn recent_names(&self, limit: usize) -> StoreResult<Vec<String>> {
        let limit = limit.min(MAX_RECENT_NAMES) as i64;
        let rows = sqlx::query(
            "SELECT name FROM score WHERE name IS NOT NULL AND TRIM(name) <> '' \
             GROUP BY name ORDER BY MAX(rowid) DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.database)
        .await?;

        let names = rows
            .into_iter()
            .map(|row| row.try_get_unchecked::<String, usize>(0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

fn clamp_points(points: i64) -> Points {
    use std::convert::TryFrom;
    Points::try_from(points.max(0)).unwrap_or(Points::MAX)
}
