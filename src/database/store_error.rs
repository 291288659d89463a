use super::score::Coins;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{coins} coins in one game exceeds the cap of {cap}")]
    ImplausibleCoins { coins: Coins, cap: Coins },
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
