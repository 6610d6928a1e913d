//! The session ledger: the only shared mutable state in the game.
//!
//! Each entry pairs a [`Session`] with a gate mutex. Orchestration holds the
//! gate for the whole read-modify-write of a roll or cashout, which
//! serializes operations per session id while different sessions proceed in
//! parallel. Gates are dropped together with their entry, so destroyed
//! sessions leave nothing behind.
//!
//! The ledger lives in process memory and is lost on restart.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::INITIAL_CREDITS;

/// Opaque session token. Random v4 ids are never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub credits: u64,
}

/// Per-session serialization handle.
pub type SessionGate = Arc<Mutex<()>>;

#[derive(Debug)]
struct Entry {
    session: Session,
    gate: SessionGate,
}

#[derive(Debug)]
pub struct SessionManager {
    entries: Mutex<HashMap<SessionId, Entry>>,
    initial_credits: u64,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(INITIAL_CREDITS)
    }
}

impl SessionManager {
    pub fn new(initial_credits: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            initial_credits,
        }
    }

    pub fn initial_credits(&self) -> u64 {
        self.initial_credits
    }

    pub fn create_session(&self) -> Session {
        let session = Session {
            id: SessionId::new(),
            credits: self.initial_credits,
        };
        self.entries.lock().insert(
            session.id,
            Entry {
                session,
                gate: SessionGate::default(),
            },
        );
        debug!(session = %session.id, credits = session.credits, "session created");
        session
    }

    pub fn get_session(&self, id: &SessionId) -> Option<Session> {
        self.entries.lock().get(id).map(|e| e.session)
    }

    /// Replaces the balance with `max(0, credits)`. Unknown ids are left
    /// untouched and yield `None`.
    pub fn update_credits(&self, id: &SessionId, credits: i64) -> Option<Session> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(id)?;
        entry.session.credits = credits.max(0) as u64;
        Some(entry.session)
    }

    pub fn destroy_session(&self, id: &SessionId) {
        if self.entries.lock().remove(id).is_some() {
            debug!(session = %id, "session destroyed");
        }
    }

    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Gate for a live session. Callers lock it and then re-read the
    /// session, since it may have been destroyed while they waited.
    pub fn gate(&self, id: &SessionId) -> Option<SessionGate> {
        self.entries.lock().get(id).map(|e| e.gate.clone())
    }
}
