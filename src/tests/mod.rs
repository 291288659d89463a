use proptest::prelude::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::database::{self, keys, DatabasePool, ScoreRecord, ScoreStore, SettingsStore, StoreError};
use crate::leaderboard::{DisabledLeaderboard, LeaderboardSync, SyncConfig};
use crate::name_input::NameInputBridge;
use crate::runner::RunnerCore;


const MEMORY_DATABASE: &str = "sqlite::memory:";

async fn open_memory() -> DatabasePool {
    database::open(MEMORY_DATABASE)
        .await
        .expect("in-memory database")
}

async fn score_store() -> ScoreStore {
    ScoreStore::new(open_memory().await)
}

/// Creates a database file the way an older release left it
/// and returns its path
async fn legacy_database(tag: &str, statements: &[&str]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "runner_scores_{}_{}.db",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let legacy = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    for statement in statements {
        sqlx::query(statement).execute(&legacy).await.unwrap();
    }
    legacy.close().await;

    path
}

fn database_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

/// Runs a future to completion outside of `#[tokio::test]`
fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
        .block_on(future)
}

/// Submits a score and reads it back as the best one
#[tokio::test]
async fn submit_then_read_back() {
    let store = score_store().await;

    store.submit(1234, 17, "Alice").await.unwrap();

    let scores = store.top_scores(1).await.unwrap();
    assert_eq!(scores, vec![ScoreRecord::new(1234, 17, "Alice")]);
}

/// Best points first, equal points in insertion order
#[tokio::test]
async fn top_scores_order() {
    let store = score_store().await;

    let games = [(10, "first"), (30, "best"), (10, "second"), (20, "middle"), (0, "zero")];
    for (points, name) in games.iter() {
        store.submit(*points, 0, name).await.unwrap();
    }

    let names: Vec<_> = store
        .top_scores(5)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(names, vec!["best", "middle", "first", "second", "zero"]);
}

/// Asking for more than five scores yields five, an empty store yields none
#[tokio::test]
async fn top_scores_limits() {
    let store = score_store().await;
    assert!(store.top_scores(5).await.unwrap().is_empty());

    for points in 0..7 {
        store.submit(points, 1, "Bob").await.unwrap();
    }

    assert_eq!(store.top_scores(10).await.unwrap().len(), 5);
    assert_eq!(store.top_scores(2).await.unwrap().len(), 2);
    assert_eq!(store.top_scores(0).await.unwrap().len(), 0);
}

#[tokio::test]
async fn total_coins_sums_decoded_counts() {
    let store = score_store().await;
    assert_eq!(store.total_coins().await.unwrap(), 0);

    for coins in [3, 0, 7].iter() {
        store.submit(100, *coins, "Carol").await.unwrap();
    }

    assert_eq!(store.total_coins().await.unwrap(), 10);
}

/// Recent names skip blanks and duplicates, newest first
#[tokio::test]
async fn recent_names_are_distinct() {
    let store = score_store().await;
    for name in ["Alice", "Bob", "   ", "Alice", "Carol", ""].iter() {
        store.submit(1, 0, name).await.unwrap();
    }

    let names = store.recent_names(5).await.unwrap();
    assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
}

#[tokio::test]
async fn coin_cap_rejects_without_writing() {
    let store = score_store().await.with_coin_cap(200);

    store.submit(50, 200, "Dave").await.unwrap();
    let error = store.submit(60, 201, "Dave").await.unwrap_err();

    assert!(matches!(
        error,
        StoreError::ImplausibleCoins { coins: 201, cap: 200 }
    ));
    assert_eq!(store.top_scores(5).await.unwrap().len(), 1);
    assert_eq!(store.total_coins().await.unwrap(), 200);
}

/// Opens a database created by the revision without the coins column
#[tokio::test]
async fn legacy_score_table_gains_coins() {
    let path = legacy_database(
        "legacy_score",
        &[
            "CREATE TABLE score (rowid INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT DEFAULT 'Anonymous', points INTEGER DEFAULT 0)",
            "INSERT INTO score (name, points) VALUES ('Old', 900)",
        ],
    )
    .await;

    let pool = database::open(&database_url(&path)).await.unwrap();
    let store = ScoreStore::new(pool.clone());

    assert_eq!(
        store.top_scores(1).await.unwrap(),
        vec![ScoreRecord::new(900, 0, "Old")]
    );
    assert_eq!(store.total_coins().await.unwrap(), 0);

    store.submit(10, 4, "New").await.unwrap();
    assert_eq!(store.total_coins().await.unwrap(), 4);

    pool.close().await;
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn settings_defaults_and_overwrites() {
    let settings = SettingsStore::new(open_memory().await);

    assert!(!settings.get_bool(keys::SOUND_MUTED, false).await);
    assert_eq!(settings.get_int(keys::GAMES_BEFORE_AD, 3).await, 3);

    settings.set_bool(keys::SOUND_MUTED, true).await.unwrap();
    settings.set_int(keys::GAMES_BEFORE_AD, 5).await.unwrap();
    settings.set_int(keys::GAMES_BEFORE_AD, 2).await.unwrap();

    assert!(settings.get_bool(keys::SOUND_MUTED, false).await);
    assert_eq!(settings.get_int(keys::GAMES_BEFORE_AD, 3).await, 2);
}

#[tokio::test]
async fn settings_counters_and_strings() {
    let settings = SettingsStore::new(open_memory().await);

    assert_eq!(settings.increment_int(keys::GAME_COUNT).await.unwrap(), 1);
    assert_eq!(settings.increment_int(keys::GAME_COUNT).await.unwrap(), 2);

    settings.set_string("last_player", "Alice").await.unwrap();
    assert_eq!(settings.get_string("last_player", "").await, "Alice");
    assert_eq!(settings.get_string("missing", "fallback").await, "fallback");

    // A value of the wrong type reads as the default
    assert_eq!(settings.get_int("last_player", 7).await, 7);
    assert!(settings.get_bool("last_player", true).await);
}

/// Settings written through one store are seen by another on the same database
#[tokio::test]
async fn settings_are_shared() {
    let pool = open_memory().await;
    let writer = SettingsStore::new(pool.clone());
    let reader = SettingsStore::new(pool);

    writer.set_bool(keys::SOUND_MUTED, true).await.unwrap();
    assert!(reader.get_bool(keys::SOUND_MUTED, false).await);
}

/// Opens a database whose settings table repeats a key
#[tokio::test]
async fn legacy_info_table_keeps_newest_duplicate() {
    let path = legacy_database(
        "legacy_info",
        &[
            "CREATE TABLE info (opt TEXT, value TEXT)",
            "INSERT INTO info (opt, value) VALUES ('GamesBeforeAdPref', '2')",
            "INSERT INTO info (opt, value) VALUES ('SoundMutedPref', 'true')",
            "INSERT INTO info (opt, value) VALUES ('GamesBeforeAdPref', '3')",
        ],
    )
    .await;

    let pool = database::open(&database_url(&path)).await.unwrap();
    let settings = SettingsStore::new(pool.clone());

    assert_eq!(settings.get_int(keys::GAMES_BEFORE_AD, 0).await, 3);
    assert!(settings.get_bool(keys::SOUND_MUTED, false).await);

    // Writes now replace the single remaining row
    settings.set_int(keys::GAMES_BEFORE_AD, 1).await.unwrap();
    assert_eq!(settings.get_int(keys::GAMES_BEFORE_AD, 0).await, 1);

    pool.close().await;
    let _ = std::fs::remove_file(&path);
}

/// Two increments racing on the same counter both count
#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let pool = open_memory().await;
    let first = SettingsStore::new(pool.clone());
    let second = SettingsStore::new(pool);

    let (a, b) = tokio::join!(
        first.increment_int(keys::GAME_COUNT),
        second.increment_int(keys::GAME_COUNT)
    );
    let mut returned = vec![a.unwrap(), b.unwrap()];
    returned.sort_unstable();

    assert_eq!(returned, vec![1, 2]);
    assert_eq!(first.get_int(keys::GAME_COUNT, 0).await, 2);
}

/// A game that cannot be written is reported, never dropped
#[tokio::test]
async fn storage_fault_reaches_the_caller() {
    let pool = open_memory().await;
    let store = ScoreStore::new(pool.clone());
    let settings = SettingsStore::new(pool.clone());
    let core = RunnerCore::new(
        store.clone(),
        settings.clone(),
        NameInputBridge::headless(),
        LeaderboardSync::new(Arc::new(DisabledLeaderboard), SyncConfig::default()),
    );

    pool.close().await;

    assert!(matches!(
        store.submit(10, 1, "Alice").await,
        Err(StoreError::Database(_))
    ));
    assert!(matches!(
        core.submit_score(10, 1, "Alice").await,
        Err(StoreError::Database(_))
    ));
    assert!(matches!(
        settings.set_bool(keys::SOUND_MUTED, true).await,
        Err(StoreError::Database(_))
    ));
    // Reads still fall back to the default
    assert!(settings.get_bool(keys::SOUND_MUTED, true).await);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any finished game reads back exactly as it was recorded
    #[test]
    fn any_game_reads_back(
        points in any::<u32>(),
        coins in any::<u32>(),
        name in "[A-Za-z0-9 ]{0,11}",
    ) {
        let scores = block_on(async {
            let store = score_store().await;
            store.submit(points, coins, &name).await.unwrap();
            store.top_scores(1).await.unwrap()
        });
        prop_assert_eq!(scores, vec![ScoreRecord::new(points, coins, name.clone())]);
    }
}
