//! Preconditions checked, in order, before a roll or cashout touches the
//! ledger: token parses -> session resolves -> balance covers the operation.

use tracing::warn;

use crate::error::GameError;
use crate::session::{Session, SessionId, SessionManager};

pub fn session_id(token: Option<&str>) -> Result<SessionId, GameError> {
    let Some(token) = token else {
        warn!("missing session token");
        return Err(GameError::Unauthorized);
    };
    token.parse().map_err(|_| {
        warn!(token, "malformed session token");
        GameError::Unauthorized
    })
}

pub fn resolve(ledger: &SessionManager, id: &SessionId) -> Result<Session, GameError> {
    ledger.get_session(id).ok_or_else(|| unknown(id))
}

pub fn require_credits(session: Session, required: u64) -> Result<Session, GameError> {
    if session.credits < required {
        warn!(
            session = %session.id,
            credits = session.credits,
            required,
            "insufficient credits"
        );
        return Err(GameError::InsufficientCredits {
            credits: session.credits,
            required,
        });
    }
    Ok(session)
}

/// Full chain for an already parsed id.
pub fn check(ledger: &SessionManager, id: &SessionId, required: u64) -> Result<Session, GameError> {
    resolve(ledger, id).and_then(|session| require_credits(session, required))
}

pub(crate) fn unknown(id: &SessionId) -> GameError {
    warn!(session = %id, "unknown session");
    GameError::Unauthorized
}
