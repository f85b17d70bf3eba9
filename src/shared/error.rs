use thiserror::Error;

/// Every way an action or a persistence step can fail.
///
/// Failed actions never leave partial mutations behind.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("creature catalog unavailable: {0}")]
    DataUnavailable(String),

    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("every base-form creature is already owned")]
    PoolExhausted,

    #[error("save data is corrupt: {0}")]
    CorruptSave(String),

    #[error("unknown reference: {0}")]
    InvalidReference(String),

    #[error("team is full")]
    TeamFull,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}
