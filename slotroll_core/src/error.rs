use crate::session::SessionId;
use crate::symbols::Symbol;

/// Failures surfaced by the roll/cashout orchestration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// No resolvable session for the supplied token.
    #[error("unauthorized: no active session")]
    Unauthorized,
    /// The session exists but cannot afford the operation.
    #[error("insufficient credits: have {credits}, need {required}")]
    InsufficientCredits { credits: u64, required: u64 },
    /// A session resolved by the guard disappeared mid-operation. Only
    /// reachable when the per-session serialization is bypassed.
    #[error("session {session} vanished during {stage}")]
    InternalInconsistency {
        session: SessionId,
        stage: LedgerStage,
    },
}

impl GameError {
    /// True for rejections caused by the caller, false for ledger faults.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, GameError::InternalInconsistency { .. })
    }
}

/// Which ledger write of a roll found its session missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStage {
    Deduction,
    Reward,
}

impl std::fmt::Display for LedgerStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerStage::Deduction => f.write_str("cost deduction"),
            LedgerStage::Reward => f.write_str("reward payout"),
        }
    }
}

/// Rejected game configuration. Raised while building components, never
/// per request.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("symbol set must not be empty")]
    EmptySymbolSet,
    #[error("symbol {0} listed more than once")]
    DuplicateSymbol(Symbol),
    #[error("reward table has no payout for symbol {0}")]
    MissingReward(Symbol),
    #[error("reward table pays nothing for symbol {0}")]
    ZeroReward(Symbol),
    #[error("cheat bracket #{index} has chance {chance}, expected a value in [0, 1]")]
    InvalidChance { index: usize, chance: f64 },
    #[error("cheat bracket #{index} has min {min} above max {max}")]
    InvertedBracket { index: usize, min: u64, max: u64 },
    #[error("roll cost must be at least 1")]
    ZeroRollCost,
    #[error("initial credits {0} exceed the ledger's signed range")]
    InitialCreditsTooLarge(u64),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_inconsistency_is_a_ledger_fault() {
        assert!(GameError::Unauthorized.is_user_error());
        assert!(GameError::InsufficientCredits {
            credits: 0,
            required: 1
        }
        .is_user_error());
        let fault = GameError::InternalInconsistency {
            session: SessionId::new(),
            stage: LedgerStage::Reward,
        };
        assert!(!fault.is_user_error());
        assert!(fault.to_string().contains("reward payout"));
    }
}
