use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    #[serde(rename = "C")]
    Cherry,
    #[serde(rename = "L")]
    Lemon,
    #[serde(rename = "O")]
    Orange,
    #[serde(rename = "W")]
    Watermelon,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Watermelon,
    ];

    /// Single-letter wire code.
    pub fn code(self) -> &'static str {
        match self {
            Symbol::Cherry => "C",
            Symbol::Lemon => "L",
            Symbol::Orange => "O",
            Symbol::Watermelon => "W",
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The three symbols produced by one generation call.
pub type Reel = [Symbol; 3];

/// Ordered, non-empty, duplicate-free set of drawable symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolSet(Vec<Symbol>);

impl SymbolSet {
    pub fn new(symbols: impl Into<Vec<Symbol>>) -> Result<Self, ConfigError> {
        let symbols = symbols.into();
        if symbols.is_empty() {
            return Err(ConfigError::EmptySymbolSet);
        }
        for (i, sym) in symbols.iter().enumerate() {
            if symbols[..i].contains(sym) {
                return Err(ConfigError::DuplicateSymbol(*sym));
            }
        }
        Ok(Self(symbols))
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.0.contains(&symbol)
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self(Symbol::ALL.to_vec())
    }
}

pub trait SymbolGenerator: Send + Sync {
    fn generate_reel(&self) -> Reel;
}

/// Draws each position independently and uniformly, with replacement.
#[derive(Debug, Clone)]
pub struct UniformSymbolGenerator<R> {
    symbols: SymbolSet,
    rng: R,
}

impl<R: RandomSource> UniformSymbolGenerator<R> {
    pub fn new(symbols: SymbolSet, rng: R) -> Self {
        Self { symbols, rng }
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    fn draw(&self) -> Symbol {
        let set = self.symbols.as_slice();
        set[self.rng.next_index(set.len())]
    }
}

impl<R: RandomSource> SymbolGenerator for UniformSymbolGenerator<R> {
    fn generate_reel(&self) -> Reel {
        [self.draw(), self.draw(), self.draw()]
    }
}
