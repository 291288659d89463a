//! Local score ledger, settings and player-name hand-off for an arcade runner,
//! with best-effort sync to a remote leaderboard.
//!
//! ```text
//! simulation thread                         UI thread
//!   request_name() ──── show_prompt ───────▶ name prompt
//!   poll_name() each tick ◀──── supply(raw) ─┘
//!   submit_score() ─▶ ScoreStore (sqlite) ─▶ LeaderboardSync (background)
//! ```

pub mod config;
pub mod database;
pub mod leaderboard;
pub mod name_input;
pub mod runner;

#[cfg(test)]
mod tests;

pub use config::CoreConfig;
pub use database::{ScoreRecord, ScoreStore, SettingsStore, StoreError};
pub use leaderboard::{LeaderboardService, LeaderboardSync, PushOutcome, PushPolicy, SyncConfig};
pub use name_input::{NameInputBridge, NameInputError, NameInputSurface};
pub use runner::RunnerCore;
