use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::CoreConfig;
use crate::database::{self, Coins, Points, ScoreRecord, ScoreStore, SettingsStore, StoreResult};
use crate::leaderboard::{LeaderboardService, LeaderboardSync, PushOutcome};
use crate::name_input::{NameInputBridge, NameInputError, NameInputSurface};

/// Everything the game simulation talks to, constructed once at startup.
///
/// Clones share the same stores and the same name request, so one clone can
/// live on the simulation side and another on the UI side.
#[derive(Clone, Debug)]
pub struct RunnerCore {
    scores: ScoreStore,
    settings: SettingsStore,
    names: NameInputBridge,
    sync: LeaderboardSync,
}

impl RunnerCore {
    pub fn new(
        scores: ScoreStore,
        settings: SettingsStore,
        names: NameInputBridge,
        sync: LeaderboardSync,
    ) -> Self {
        Self {
            scores,
            settings,
            names,
            sync,
        }
    }

    /// Opens the database named in `config` and wires the components.
    pub async fn open(
        config: &CoreConfig,
        surface: impl NameInputSurface + 'static,
        service: Arc<dyn LeaderboardService>,
    ) -> StoreResult<Self> {
        let database = database::open(&config.database_url).await?;
        Ok(Self::new(
            ScoreStore::new(database.clone()),
            SettingsStore::new(database),
            NameInputBridge::new(surface),
            LeaderboardSync::new(service, config.sync.clone()),
        ))
    }

    pub fn request_name(&self) -> Result<(), NameInputError> {
        self.names.request()
    }

    pub fn poll_name(&self) -> Option<String> {
        self.names.poll()
    }

    /// UI side of the name hand-off.
    pub fn names(&self) -> &NameInputBridge {
        &self.names
    }

    /// Records a finished game, then pushes it to the remote board in the
    /// background. Only the local write can fail.
    pub async fn submit_score(
        &self,
        points: Points,
        coins: Coins,
        name: &str,
    ) -> StoreResult<JoinHandle<PushOutcome>> {
        self.scores.submit(points, coins, name).await?;
        Ok(self.sync.push(points, Some(coins), name))
    }

    pub async fn top_scores(&self, limit: usize) -> StoreResult<Vec<ScoreRecord>> {
        self.scores.top_scores(limit).await
    }

    pub async fn total_coins(&self) -> StoreResult<u64> {
        self.scores.total_coins().await
    }

    pub async fn recent_names(&self, limit: usize) -> StoreResult<Vec<String>> {
        self.scores.recent_names(limit).await
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn leaderboard(&self) -> &LeaderboardSync {
        &self.sync
    }
}
