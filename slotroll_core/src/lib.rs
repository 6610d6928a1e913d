pub mod cheat;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod guard;
pub mod paytable;
pub mod rng;
pub mod session;
pub mod symbols;

pub use crate::cheat::{BracketCheatPolicy, CheatBracket, CheatPolicy};
pub use crate::config::{GameConfig, INITIAL_CREDITS, ROLL_COST};
pub use crate::engine::{ConfiguredMachine, Engine, RollOutcome, SlotMachine};
pub use crate::error::{ConfigError, GameError, LedgerStage};
pub use crate::game::{CashoutReceipt, GameService, RollReceipt, CASHOUT_MESSAGE};
pub use crate::paytable::{PaytableCalculator, RewardCalculator, RewardTable, Verdict};
pub use crate::rng::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use crate::session::{Session, SessionGate, SessionId, SessionManager};
pub use crate::symbols::{Reel, Symbol, SymbolGenerator, SymbolSet, UniformSymbolGenerator};
