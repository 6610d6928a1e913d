use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cheat::CheatBracket;
use crate::error::ConfigError;
use crate::paytable::RewardTable;
use crate::symbols::{Symbol, SymbolSet};

pub const INITIAL_CREDITS: u64 = 10;
pub const ROLL_COST: u64 = 1;

/// Everything the engine and ledger are built from. Every field has a
/// default, so `{}` is a valid config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub symbols: Vec<Symbol>,
    pub rewards: RewardTable,
    pub cheat_brackets: Vec<CheatBracket>,
    pub initial_credits: u64,
    pub roll_cost: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            symbols: Symbol::ALL.to_vec(),
            rewards: RewardTable::simple_default(),
            cheat_brackets: CheatBracket::default_brackets(),
            initial_credits: INITIAL_CREDITS,
            roll_cost: ROLL_COST,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Falls back to the defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let symbols = self.symbol_set()?;
        self.rewards.ensure_covers(&symbols)?;
        CheatBracket::validate_all(&self.cheat_brackets)?;
        if self.roll_cost == 0 {
            return Err(ConfigError::ZeroRollCost);
        }
        if i64::try_from(self.initial_credits).is_err() {
            return Err(ConfigError::InitialCreditsTooLarge(self.initial_credits));
        }
        Ok(())
    }

    pub fn symbol_set(&self) -> Result<SymbolSet, ConfigError> {
        SymbolSet::new(self.symbols.clone())
    }
}
