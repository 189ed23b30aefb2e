use crate::types::{BlockHeight, OwnerId, Points};
use thiserror::Error;

/// Errors that can occur while accruing, spending or configuring points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EconomyError {
    #[error("insufficient points: required={required}, available={available}")]
    InsufficientPoints { required: Points, available: Points },

    #[error("unknown asset category: {0}")]
    UnknownCategory(String),

    #[error("claim height {current} is before last claim at {last_claim}")]
    NegativeElapsedTime {
        last_claim: BlockHeight,
        current: BlockHeight,
    },

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("invalid economy parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("player {owner} already exists")]
    PlayerAlreadyExists { owner: OwnerId },

    #[error("player {owner} not found")]
    PlayerNotFound { owner: OwnerId },

    #[error("{caller} is not authorized for admin operations")]
    Unauthorized { caller: OwnerId },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EconomyError>;
