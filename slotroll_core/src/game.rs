//! Roll and cashout orchestration over the ledger.
//!
//! A roll moves a session through `Active -> Active` or `Active -> GameOver`
//! (balance hit exactly zero, session destroyed). Requests that fail the
//! guard chain are rejected before the ledger or the engine is touched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    config::GameConfig,
    engine::{ConfiguredMachine, Engine, RollOutcome},
    error::{ConfigError, GameError, LedgerStage},
    guard,
    rng::RandomSource,
    session::{Session, SessionId, SessionManager},
};

pub const CASHOUT_MESSAGE: &str = "Cashed out successfully";

/// A roll is allowed on any positive balance; a cost above the balance
/// clamps it to zero.
const MIN_ROLL_CREDITS: u64 = 1;
/// Cashout needs something to pay out.
const MIN_CASHOUT_CREDITS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollReceipt {
    #[serde(flatten)]
    pub outcome: RollOutcome,
    pub credits: u64,
    /// The balance reached zero and the session was destroyed.
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutReceipt {
    pub credits: u64,
    pub message: String,
}

pub struct GameService<M> {
    ledger: Arc<SessionManager>,
    engine: M,
    roll_cost: u64,
}

impl<R: RandomSource + Clone> GameService<ConfiguredMachine<R>> {
    pub fn from_config(config: &GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = ConfiguredMachine::from_config(config, rng)?;
        let ledger = Arc::new(SessionManager::new(config.initial_credits));
        Ok(Self::new(ledger, engine, config.roll_cost))
    }
}

impl<M: Engine> GameService<M> {
    pub fn new(ledger: Arc<SessionManager>, engine: M, roll_cost: u64) -> Self {
        Self {
            ledger,
            engine,
            roll_cost,
        }
    }

    pub fn ledger(&self) -> &Arc<SessionManager> {
        &self.ledger
    }

    pub fn engine(&self) -> &M {
        &self.engine
    }

    pub fn roll_cost(&self) -> u64 {
        self.roll_cost
    }

    /// Returns the session behind `token`, or a fresh one when the token is
    /// missing, malformed or unknown. The flag is true for fresh sessions.
    pub fn resolve_or_create_session(&self, token: Option<&str>) -> (Session, bool) {
        let existing = token
            .and_then(|t| t.parse::<SessionId>().ok())
            .and_then(|id| self.ledger.get_session(&id));
        match existing {
            Some(session) => (session, false),
            None => (self.ledger.create_session(), true),
        }
    }

    pub fn roll(&self, token: Option<&str>) -> Result<RollReceipt, GameError> {
        self.guarded(token, MIN_ROLL_CREDITS, |session| self.execute_roll(session))
    }

    pub fn cashout(&self, token: Option<&str>) -> Result<CashoutReceipt, GameError> {
        self.guarded(token, MIN_CASHOUT_CREDITS, |session| {
            Ok(self.execute_cashout(session))
        })
    }

    /// Roll for a session that already passed the guard chain. Callers
    /// must hold the session's gate; see [`SessionManager::gate`].
    pub fn execute_roll(&self, session: &Session) -> Result<RollReceipt, GameError> {
        let target = signed(session.credits).saturating_sub(signed(self.roll_cost));
        let charged = self
            .ledger
            .update_credits(&session.id, target)
            .ok_or_else(|| inconsistency(session.id, LedgerStage::Deduction))?;

        let outcome = self.engine.roll(charged.credits);

        let mut credits = charged.credits;
        if outcome.is_win {
            let target = signed(charged.credits).saturating_add(signed(outcome.reward));
            let paid = self
                .ledger
                .update_credits(&session.id, target)
                .ok_or_else(|| inconsistency(session.id, LedgerStage::Reward))?;
            credits = paid.credits;
        }

        let game_over = credits == 0;
        if game_over {
            self.ledger.destroy_session(&session.id);
            info!(session = %session.id, "game over");
        }

        Ok(RollReceipt {
            outcome,
            credits,
            game_over,
        })
    }

    /// Destroys the session and hands back its balance.
    pub fn execute_cashout(&self, session: &Session) -> CashoutReceipt {
        self.ledger.destroy_session(&session.id);
        info!(session = %session.id, credits = session.credits, "cashed out");
        CashoutReceipt {
            credits: session.credits,
            message: CASHOUT_MESSAGE.to_string(),
        }
    }

    /// Runs `op` with the session's gate held, after the guard chain passed
    /// under that same gate.
    fn guarded<T>(
        &self,
        token: Option<&str>,
        required: u64,
        op: impl FnOnce(&Session) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let id = guard::session_id(token)?;
        let gate = self.ledger.gate(&id).ok_or_else(|| guard::unknown(&id))?;
        let _held = gate.lock();
        let session = guard::check(&self.ledger, &id, required)?;
        op(&session)
    }
}

fn signed(credits: u64) -> i64 {
    i64::try_from(credits).unwrap_or(i64::MAX)
}

fn inconsistency(session: SessionId, stage: LedgerStage) -> GameError {
    error!(%session, %stage, "session vanished mid-roll");
    GameError::InternalInconsistency { session, stage }
}
