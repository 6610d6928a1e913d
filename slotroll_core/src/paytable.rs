use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::symbols::{Reel, Symbol, SymbolSet};

/// Three-of-a-kind payout per symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardTable(pub BTreeMap<Symbol, u64>);

impl RewardTable {
    pub fn simple_default() -> Self {
        Self(BTreeMap::from([
            (Symbol::Cherry, 10),
            (Symbol::Lemon, 20),
            (Symbol::Orange, 30),
            (Symbol::Watermelon, 40),
        ]))
    }

    pub fn payout(&self, symbol: Symbol) -> Option<u64> {
        self.0.get(&symbol).copied()
    }

    /// Every drawable symbol needs a positive payout, otherwise a triple
    /// would be a win worth nothing.
    pub fn ensure_covers(&self, symbols: &SymbolSet) -> Result<(), ConfigError> {
        for &symbol in symbols.as_slice() {
            match self.payout(symbol) {
                None => return Err(ConfigError::MissingReward(symbol)),
                Some(0) => return Err(ConfigError::ZeroReward(symbol)),
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self::simple_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_win: bool,
    pub reward: u64,
}

impl Verdict {
    pub const LOSS: Verdict = Verdict {
        is_win: false,
        reward: 0,
    };
}

pub trait RewardCalculator: Send + Sync {
    fn calculate(&self, reel: &Reel) -> Verdict;
}

/// Pays `table[symbol]` when all three positions match.
#[derive(Debug, Clone)]
pub struct PaytableCalculator {
    table: RewardTable,
}

impl PaytableCalculator {
    /// The table must price every symbol the generator can draw.
    pub fn new(table: RewardTable, symbols: &SymbolSet) -> Result<Self, ConfigError> {
        table.ensure_covers(symbols)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &RewardTable {
        &self.table
    }
}

impl RewardCalculator for PaytableCalculator {
    fn calculate(&self, reel: &Reel) -> Verdict {
        let [a, b, c] = *reel;
        if a != b || b != c {
            return Verdict::LOSS;
        }
        // Coverage was checked against the symbol set at construction.
        Verdict {
            is_win: true,
            reward: self.table.payout(a).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> PaytableCalculator {
        PaytableCalculator::new(RewardTable::simple_default(), &SymbolSet::default()).unwrap()
    }

    #[test]
    fn triples_pay_the_table() {
        let calc = calculator();
        for sym in Symbol::ALL {
            let verdict = calc.calculate(&[sym; 3]);
            assert!(verdict.is_win);
            assert_eq!(Some(verdict.reward), RewardTable::simple_default().payout(sym));
        }
    }

    #[test]
    fn any_mismatch_loses() {
        let calc = calculator();
        for a in Symbol::ALL {
            for b in Symbol::ALL {
                for c in Symbol::ALL {
                    if a == b && b == c {
                        continue;
                    }
                    assert_eq!(calc.calculate(&[a, b, c]), Verdict::LOSS);
                }
            }
        }
    }

    #[test]
    fn custom_table() {
        let table = RewardTable(BTreeMap::from([
            (Symbol::Cherry, 1),
            (Symbol::Lemon, 2),
            (Symbol::Orange, 3),
            (Symbol::Watermelon, 100),
        ]));
        let calc = PaytableCalculator::new(table, &SymbolSet::default()).unwrap();
        assert_eq!(calc.calculate(&[Symbol::Watermelon; 3]).reward, 100);
    }

    #[test]
    fn incomplete_table_is_rejected() {
        let table = RewardTable(BTreeMap::from([(Symbol::Cherry, 10)]));
        let err = PaytableCalculator::new(table, &SymbolSet::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReward(Symbol::Lemon)));
    }

    #[test]
    fn zero_payout_is_rejected() {
        let mut table = RewardTable::simple_default();
        table.0.insert(Symbol::Orange, 0);
        let err = PaytableCalculator::new(table, &SymbolSet::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroReward(Symbol::Orange)));
    }

    #[test]
    fn table_only_needs_the_active_symbols() {
        let table = RewardTable(BTreeMap::from([(Symbol::Lemon, 5)]));
        let set = SymbolSet::new(vec![Symbol::Lemon]).unwrap();
        assert!(PaytableCalculator::new(table, &set).is_ok());
    }
}
