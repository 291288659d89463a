use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

mod score;
mod scores;
mod settings;
mod store_error;

pub use score::{decode_coins, encode_coins, Coins, Points, ScoreRecord};
pub use scores::{ScoreStore, MAX_RECENT_NAMES, MAX_TOP_SCORES};
pub use settings::{keys, SettingsStore};
pub use store_error::*;

pub type DatabasePool = sqlx::SqlitePool;

const SCORE_TABLE_CREATE: &str = "CREATE TABLE IF NOT EXISTS score (\
    rowid INTEGER PRIMARY KEY AUTOINCREMENT, \
    name TEXT DEFAULT 'Anonymous', \
    points INTEGER DEFAULT 0, \
    coins INTEGER DEFAULT 0)";

const INFO_TABLE_CREATE: &str = "CREATE TABLE IF NOT EXISTS info (opt TEXT, value TEXT)";

const INFO_INDEX_CREATE: &str = "CREATE UNIQUE INDEX IF NOT EXISTS info_opt ON info (opt)";

/// Connects to the database at `database_url` and installs the schema.
///
/// The pool holds a single connection for its whole lifetime, so every
/// operation runs alone and in-memory databases survive between calls.
pub async fn open(database_url: &str) -> StoreResult<DatabasePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    install_schema(&pool).await?;
    info!(database_url, "score database ready");
    Ok(pool)
}

async fn install_schema(pool: &DatabasePool) -> StoreResult<()> {
    let mut transaction = pool.begin().await?;

    sqlx::query(SCORE_TABLE_CREATE)
        .execute(&mut transaction)
        .await?;
    sqlx::query(INFO_TABLE_CREATE)
        .execute(&mut transaction)
        .await?;
    // Older `info` tables had no uniqueness on `opt`; the newest row wins
    let duplicates = sqlx::query(
        "DELETE FROM info WHERE rowid NOT IN (SELECT MAX(rowid) FROM info GROUP BY opt)",
    )
    .execute(&mut transaction)
    .await?
    .rows_affected();
    if duplicates > 0 {
        info!(duplicates, "dropped duplicate settings from legacy info table");
    }
    sqlx::query(INFO_INDEX_CREATE)
        .execute(&mut transaction)
        .await?;

    // The first revision of `score` had no coins column
    let columns = sqlx::query("PRAGMA table_info(score)")
        .fetch_all(&mut transaction)
        .await?;
    let has_coins = columns
        .iter()
        .any(|row| row.try_get_unchecked::<String, usize>(1).ok().as_deref() == Some("coins"));
    if !has_coins {
        sqlx::query("ALTER TABLE score ADD COLUMN coins INTEGER DEFAULT 0")
            .execute(&mut transaction)
            .await?;
        let upgraded = sqlx::query("UPDATE score SET coins = ?")
            .bind(encode_coins(0))
            .execute(&mut transaction)
            .await?
            .rows_affected();
        info!(upgraded, "added coins column to legacy score table");
    }

    transaction.commit().await?;
    Ok(())
}
