use serde::{Deserialize, Serialize};
use slotroll_core::{CashoutReceipt, GameError, RollReceipt, Symbol};

pub const SESSION_COOKIE_NAME: &str = "session_id";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub credits: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RollResponse {
    pub symbols: [Symbol; 3],
    pub credits: u64,
    pub is_win: bool,
    pub reward: u64,
}

impl From<RollReceipt> for RollResponse {
    fn from(receipt: RollReceipt) -> Self {
        Self {
            symbols: receipt.outcome.symbols,
            credits: receipt.credits,
            is_win: receipt.outcome.is_win,
            reward: receipt.outcome.reward,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CashoutResponse {
    pub credits: u64,
    pub message: String,
}

impl From<CashoutReceipt> for CashoutResponse {
    fn from(receipt: CashoutReceipt) -> Self {
        Self {
            credits: receipt.credits,
            message: receipt.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Bad request")]
    BadRequest,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Unauthorized => ApiError::Unauthorized,
            GameError::InsufficientCredits { .. } => ApiError::BadRequest,
            GameError::InternalInconsistency { .. } => ApiError::Internal,
        }
    }
}
