use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::database::{Coins, Points};

mod sync;

pub use sync::*;

pub type BoardId = u32;

/// A board as resolved by the remote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteBoard {
    pub id: BoardId,
    pub name: String,
}

/// A user's entry on a remote board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteScore {
    pub points: Points,
}

/// The service's answer to a submission, typically a rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionResult(pub i64);

/// What is sent alongside the points. Never stored locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSubmission {
    pub points: Points,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coins: Option<Coins>,
    pub player: String,
}

impl LeaderboardSubmission {
    pub fn metadata(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("leaderboard service unavailable: {0}")]
    Unavailable(String),
    #[error("leaderboard service rejected the request: {0}")]
    Rejected(String),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Client side of a remote ranking service.
///
/// Implementations may complete on any thread.
#[async_trait]
pub trait LeaderboardService: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn is_initialized(&self) -> bool;
    fn is_online(&self) -> bool;
    fn is_logged_in(&self) -> bool;

    async fn leaderboard_by_id(&self, id: BoardId) -> RemoteResult<Option<RemoteBoard>>;

    async fn score_for_user(
        &self,
        board: &RemoteBoard,
        user: &str,
    ) -> RemoteResult<Option<RemoteScore>>;

    async fn submit_score(
        &self,
        board: &RemoteBoard,
        points: Points,
        metadata: Option<String>,
    ) -> RemoteResult<SubmissionResult>;
}

/// Stand-in for builds without a remote service. Never enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledLeaderboard;

#[async_trait]
impl LeaderboardService for DisabledLeaderboard {
    fn is_enabled(&self) -> bool {
        false
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn is_online(&self) -> bool {
        false
    }

    fn is_logged_in(&self) -> bool {
        false
    }

    async fn leaderboard_by_id(&self, _id: BoardId) -> RemoteResult<Option<RemoteBoard>> {
        Err(RemoteError::Unavailable("no leaderboard service".to_owned()))
    }

    async fn score_for_user(
        &self,
        _board: &RemoteBoard,
        _user: &str,
    ) -> RemoteResult<Option<RemoteScore>> {
        Err(RemoteError::Unavailable("no leaderboard service".to_owned()))
    }

    async fn submit_score(
        &self,
        _board: &RemoteBoard,
        _points: Points,
        _metadata: Option<String>,
    ) -> RemoteResult<SubmissionResult> {
        Err(RemoteError::Unavailable("no leaderboard service".to_owned()))
    }
}
