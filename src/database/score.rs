use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

// Column types in the `score` table:
// points  INTEGER
// coins   INTEGER (odd-encoded, see `encode_coins`)
// name    TEXT

pub type Points = u32;
pub type Coins = u32;

/// One completed game, as the ledger hands it back.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct ScoreRecord {
    pub points: Points,
    pub coins: Coins,
    pub name: String,
}

impl ScoreRecord {
    pub fn new(points: Points, coins: Coins, name: impl Into<String>) -> Self {
        Self {
            points,
            coins,
            name: name.into(),
        }
    }
}

/// Coins are stored as `2 * coins + 1`: an odd stored value is always an
/// encoded count.
pub fn encode_coins(coins: Coins) -> i64 {
    2 * i64::from(coins) + 1
}

/// Inverse of [`encode_coins`]. Values below 1 (legacy rows) decode to 0.
pub fn decode_coins(stored: i64) -> Coins {
    Coins::try_from((stored - 1) / 2).unwrap_or(0)
}
