use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::*;

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// When a finished game is sent to the remote board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushPolicy {
    /// Every game.
    Always,
    /// Only games beating the player's current remote best.
    OnlyIfBetter,
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self::Always
    }
}

#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Boards configured for this title. Scores go to the first one.
    pub boards: Vec<BoardId>,
    pub policy: PushPolicy,
    /// Bound on a whole push, from board lookup to submission.
    pub timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            boards: Vec::new(),
            policy: PushPolicy::default(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    NotInitialized,
    Offline,
    NoBoardConfigured,
    BoardNotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Submitted(SubmissionResult),
    Skipped(SkipReason),
    NotBetter { remote_best: Points },
    Failed(RemoteError),
    TimedOut,
}

/// Best-effort propagation of local scores to a remote board.
///
/// Nothing here is retried or queued: the local ledger is the record of truth.
#[derive(Clone)]
pub struct LeaderboardSync {
    service: Arc<dyn LeaderboardService>,
    config: SyncConfig,
}

impl LeaderboardSync {
    pub fn new(service: Arc<dyn LeaderboardService>, config: SyncConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Why the remote path is closed right now, if it is.
    pub fn unavailable_reason(&self) -> Option<SkipReason> {
        if !self.service.is_enabled() {
            Some(SkipReason::Disabled)
        } else if !self.service.is_initialized() {
            Some(SkipReason::NotInitialized)
        } else if !(self.service.is_online() || self.service.is_logged_in()) {
            Some(SkipReason::Offline)
        } else {
            None
        }
    }

    /// Sends a score in the background and returns immediately.
    ///
    /// The handle may be dropped; the outcome is logged either way.
    /// Must be called from within a tokio runtime.
    pub fn push(&self, points: Points, coins: Option<Coins>, handle: &str) -> JoinHandle<PushOutcome> {
        let submission = LeaderboardSubmission {
            points,
            coins,
            player: handle.to_owned(),
        };
        let sync = self.clone();
        tokio::spawn(async move {
            let outcome = sync.push_now(&submission).await;
            log_outcome(&submission, &outcome);
            outcome
        })
    }

    async fn push_now(&self, submission: &LeaderboardSubmission) -> PushOutcome {
        if let Some(reason) = self.unavailable_reason() {
            return PushOutcome::Skipped(reason);
        }
        match tokio::time::timeout(self.config.timeout, self.submit(submission)).await {
            Ok(outcome) => outcome,
            Err(_) => PushOutcome::TimedOut,
        }
    }

    async fn submit(&self, submission: &LeaderboardSubmission) -> PushOutcome {
        let board = match self.resolve_board().await {
            Ok(board) => board,
            Err(outcome) => return outcome,
        };

        if self.config.policy == PushPolicy::OnlyIfBetter {
            match self
                .service
                .score_for_user(&board, &submission.player)
                .await
            {
                Ok(Some(best)) if best.points >= submission.points => {
                    return PushOutcome::NotBetter {
                        remote_best: best.points,
                    }
                }
                Ok(_) => {}
                Err(err) => return PushOutcome::Failed(err),
            }
        }

        match self
            .service
            .submit_score(&board, submission.points, submission.metadata())
            .await
        {
            Ok(result) => PushOutcome::Submitted(result),
            Err(err) => PushOutcome::Failed(err),
        }
    }

    async fn resolve_board(&self) -> Result<RemoteBoard, PushOutcome> {
        let id = match self.config.boards.first() {
            Some(id) => *id,
            None => return Err(PushOutcome::Skipped(SkipReason::NoBoardConfigured)),
        };
        match self.service.leaderboard_by_id(id).await {
            Ok(Some(board)) => Ok(board),
            Ok(None) => Err(PushOutcome::Skipped(SkipReason::BoardNotFound)),
            Err(err) => Err(PushOutcome::Failed(err)),
        }
    }

    /// The user's best on the first configured board, if it can be had.
    pub async fn fetch_remote_best(&self, user: &str) -> Option<Points> {
        if let Some(reason) = self.unavailable_reason() {
            debug!(?reason, "remote best not fetched");
            return None;
        }

        let fetch = async {
            let board = self.resolve_board().await.ok()?;
            match self.service.score_for_user(&board, user).await {
                Ok(score) => score.map(|score| score.points),
                Err(err) => {
                    warn!(%err, user, "failed to fetch remote best");
                    None
                }
            }
        };
        match tokio::time::timeout(self.config.timeout, fetch).await {
            Ok(best) => best,
            Err(_) => {
                warn!(user, "timed out fetching remote best");
                None
            }
        }
    }
}

impl std::fmt::Debug for LeaderboardSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardSync")
            .field("config", &self.config)
            .finish()
    }
}

fn log_outcome(submission: &LeaderboardSubmission, outcome: &PushOutcome) {
    let points = submission.points;
    let player = submission.player.as_str();
    match outcome {
        PushOutcome::Submitted(result) => {
            info!(points, player, result = result.0, "score submitted to leaderboard")
        }
        PushOutcome::Skipped(reason) => debug!(points, player, ?reason, "leaderboard push skipped"),
        PushOutcome::NotBetter { remote_best } => {
            debug!(points, player, remote_best, "remote best not beaten")
        }
        PushOutcome::Failed(err) => warn!(points, player, %err, "leaderboard push failed"),
        PushOutcome::TimedOut => warn!(points, player, "leaderboard push timed out"),
    }
}
