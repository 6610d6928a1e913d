use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::rng::RandomSource;

/// Balance range with the probability of discarding a win in it.
/// `max == None` means the range is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheatBracket {
    pub min: u64,
    #[serde(default)]
    pub max: Option<u64>,
    pub chance: f64,
}

impl CheatBracket {
    pub const fn new(min: u64, max: Option<u64>, chance: f64) -> Self {
        Self { min, max, chance }
    }

    pub fn contains(&self, credits: u64) -> bool {
        credits >= self.min && self.max.map_or(true, |max| credits <= max)
    }

    /// `[40, 60] -> 0.3`, `[61, inf) -> 0.6`, nothing below 40.
    pub fn default_brackets() -> Vec<CheatBracket> {
        vec![
            CheatBracket::new(40, Some(60), 0.3),
            CheatBracket::new(61, None, 0.6),
        ]
    }

    pub fn validate_all(brackets: &[CheatBracket]) -> Result<(), ConfigError> {
        for (index, bracket) in brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.chance) {
                return Err(ConfigError::InvalidChance {
                    index,
                    chance: bracket.chance,
                });
            }
            if let Some(max) = bracket.max {
                if bracket.min > max {
                    return Err(ConfigError::InvertedBracket {
                        index,
                        min: bracket.min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

pub trait CheatPolicy: Send + Sync {
    fn should_reroll(&self, credits: u64) -> bool;
}

/// First matching bracket wins, in list order. Overlaps are resolved by
/// position, never by range width.
#[derive(Debug, Clone)]
pub struct BracketCheatPolicy<R> {
    brackets: Vec<CheatBracket>,
    rng: R,
}

impl<R: RandomSource> BracketCheatPolicy<R> {
    pub fn new(brackets: Vec<CheatBracket>, rng: R) -> Result<Self, ConfigError> {
        CheatBracket::validate_all(&brackets)?;
        Ok(Self { brackets, rng })
    }

    pub fn brackets(&self) -> &[CheatBracket] {
        &self.brackets
    }

    pub fn bracket_for(&self, credits: u64) -> Option<&CheatBracket> {
        self.brackets.iter().find(|b| b.contains(credits))
    }
}

impl<R: RandomSource> CheatPolicy for BracketCheatPolicy<R> {
    fn should_reroll(&self, credits: u64) -> bool {
        let Some(bracket) = self.bracket_for(credits) else {
            return false;
        };
        let roll = self.rng.next_f64();
        // inclusive: a draw equal to the chance still triggers
        if roll <= bracket.chance {
            info!(credits, ?bracket, roll, "re-roll triggered");
            return true;
        }
        false
    }
}
