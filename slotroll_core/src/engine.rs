use serde::{Deserialize, Serialize};

use crate::{
    cheat::{BracketCheatPolicy, CheatPolicy},
    config::GameConfig,
    error::ConfigError,
    paytable::{PaytableCalculator, RewardCalculator},
    rng::RandomSource,
    symbols::{Reel, SymbolGenerator, UniformSymbolGenerator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    pub symbols: Reel,
    pub is_win: bool,
    pub reward: u64,
}

/// Anything that turns a balance into one roll outcome.
pub trait Engine: Send + Sync {
    fn roll(&self, credits: u64) -> RollOutcome;
}

/// generate -> score -> maybe re-roll once -> score. Holds no state
/// between calls beyond its collaborators.
#[derive(Debug, Clone)]
pub struct SlotMachine<G, C, P> {
    generator: G,
    calculator: C,
    policy: P,
}

/// Machine wired from a [`GameConfig`], generator and policy sharing one source.
pub type ConfiguredMachine<R> =
    SlotMachine<UniformSymbolGenerator<R>, PaytableCalculator, BracketCheatPolicy<R>>;

impl<G, C, P> SlotMachine<G, C, P>
where
    G: SymbolGenerator,
    C: RewardCalculator,
    P: CheatPolicy,
{
    pub fn new(generator: G, calculator: C, policy: P) -> Self {
        Self {
            generator,
            calculator,
            policy,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// `credits` is the balance the caller hands in (after the roll cost,
    /// before any reward). The policy sees it only when the first reel wins,
    /// and the second reel replaces the first even if it wins as well.
    pub fn roll(&self, credits: u64) -> RollOutcome {
        let mut symbols = self.generator.generate_reel();
        let mut verdict = self.calculator.calculate(&symbols);

        if verdict.is_win && self.policy.should_reroll(credits) {
            symbols = self.generator.generate_reel();
            verdict = self.calculator.calculate(&symbols);
        }

        RollOutcome {
            symbols,
            is_win: verdict.is_win,
            reward: verdict.reward,
        }
    }
}

impl<G, C, P> Engine for SlotMachine<G, C, P>
where
    G: SymbolGenerator,
    C: RewardCalculator,
    P: CheatPolicy,
{
    fn roll(&self, credits: u64) -> RollOutcome {
        SlotMachine::roll(self, credits)
    }
}

impl<R: RandomSource + Clone> ConfiguredMachine<R> {
    pub fn from_config(config: &GameConfig, rng: R) -> Result<Self, ConfigError> {
        let symbols = config.symbol_set()?;
        let calculator = PaytableCalculator::new(config.rewards.clone(), &symbols)?;
        let policy = BracketCheatPolicy::new(config.cheat_brackets.clone(), rng.clone())?;
        let generator = UniformSymbolGenerator::new(symbols, rng);
        Ok(Self::new(generator, calculator, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::Verdict;
    use crate::symbols::Symbol;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use Symbol::*;

    struct ScriptedGenerator {
        reels: Mutex<VecDeque<Reel>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedGenerator {
        fn new(reels: Vec<Reel>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let generator = Self {
                reels: Mutex::new(reels.into()),
                calls: calls.clone(),
            };
            (generator, calls)
        }
    }

    impl SymbolGenerator for ScriptedGenerator {
        fn generate_reel(&self) -> Reel {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut reels = self.reels.lock();
            // repeat the last reel once the script runs out
            if reels.len() > 1 {
                reels.pop_front().unwrap()
            } else {
                reels[0]
            }
        }
    }

    struct CountingCalculator<C> {
        inner: C,
        calls: Arc<AtomicUsize>,
    }

    impl<C: RewardCalculator> RewardCalculator for CountingCalculator<C> {
        fn calculate(&self, reel: &Reel) -> Verdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.calculate(reel)
        }
    }

    struct FixedPolicy {
        answer: bool,
        seen: Mutex<Vec<u64>>,
    }

    impl FixedPolicy {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CheatPolicy for FixedPolicy {
        fn should_reroll(&self, credits: u64) -> bool {
            self.seen.lock().push(credits);
            self.answer
        }
    }

    fn calculator() -> (CountingCalculator<PaytableCalculator>, Arc<AtomicUsize>) {
        let inner = PaytableCalculator::new(
            crate::paytable::RewardTable::simple_default(),
            &crate::symbols::SymbolSet::default(),
        )
        .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        (
            CountingCalculator {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }

    #[test]
    fn loss_skips_the_policy() {
        let (generator, _) = ScriptedGenerator::new(vec![[Cherry, Lemon, Orange]]);
        let (calc, _) = calculator();
        let machine = SlotMachine::new(generator, calc, FixedPolicy::new(true));
        let out = machine.roll(10);
        assert_eq!(
            out,
            RollOutcome {
                symbols: [Cherry, Lemon, Orange],
                is_win: false,
                reward: 0
            }
        );
        assert!(machine.policy.seen.lock().is_empty());
    }

    #[test]
    fn win_without_reroll() {
        let (generator, _) = ScriptedGenerator::new(vec![[Watermelon; 3]]);
        let (calc, _) = calculator();
        let machine = SlotMachine::new(generator, calc, FixedPolicy::new(false));
        let out = machine.roll(42);
        assert!(out.is_win);
        assert_eq!(out.reward, 40);
        assert_eq!(*machine.policy.seen.lock(), vec![42]);
    }

    #[test]
    fn reroll_replaces_a_win_with_a_loss() {
        let (generator, _) = ScriptedGenerator::new(vec![[Watermelon; 3], [Cherry, Lemon, Orange]]);
        let (calc, _) = calculator();
        let machine = SlotMachine::new(generator, calc, FixedPolicy::new(true));
        let out = machine.roll(50);
        assert_eq!(out.symbols, [Cherry, Lemon, Orange]);
        assert!(!out.is_win);
        assert_eq!(out.reward, 0);
    }

    #[test]
    fn reroll_keeps_a_second_win() {
        let (generator, _) = ScriptedGenerator::new(vec![[Watermelon; 3], [Cherry; 3]]);
        let (calc, _) = calculator();
        let machine = SlotMachine::new(generator, calc, FixedPolicy::new(true));
        let out = machine.roll(50);
        assert_eq!(out.symbols, [Cherry; 3]);
        assert_eq!(out.reward, 10);
    }

    #[test]
    fn rerolls_at_most_once() {
        let (generator, gen_calls) = ScriptedGenerator::new(vec![[Watermelon; 3]]);
        let (calc, calc_calls) = calculator();
        let machine = SlotMachine::new(generator, calc, FixedPolicy::new(true));
        let out = machine.roll(50);
        assert!(out.is_win);
        assert_eq!(gen_calls.load(Ordering::SeqCst), 2);
        assert_eq!(calc_calls.load(Ordering::SeqCst), 2);
        assert_eq!(machine.policy.seen.lock().len(), 1);
    }

    #[test]
    fn configured_machine_respects_singleton_set() {
        let config = GameConfig {
            symbols: vec![Lemon],
            cheat_brackets: Vec::new(),
            ..GameConfig::default()
        };
        let machine = ConfiguredMachine::from_config(&config, crate::rng::ThreadRandom).unwrap();
        for _ in 0..20 {
            let out = machine.roll(10);
            assert_eq!(out.symbols, [Lemon; 3]);
            assert_eq!(out.reward, 20);
        }
    }
}
