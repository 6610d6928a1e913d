use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use slotroll_core::{
    BracketCheatPolicy, CheatBracket, CheatPolicy, Engine, GameConfig, GameService,
    PaytableCalculator, RandomSource, SeededRandom, SessionId, SessionManager, SlotMachine,
    ThreadRandom, UniformSymbolGenerator,
};

#[derive(Parser)]
#[command(name = "slotroll-cli", about = "Local play and house-edge simulation for the slot game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Game config JSON; built-in defaults when omitted
    #[arg(long, value_parser, env = "SLOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session and roll until broke, a target balance, or a roll limit, then cash out
    Play {
        #[arg(long, default_value_t = 100)]
        max_rolls: u64,
        /// Cash out as soon as the balance reaches this value
        #[arg(long)]
        target: Option<u64>,
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Roll N times at a fixed starting balance and report rates
    Simulate {
        #[arg(long, default_value_t = 10_000)]
        rolls: u64,
        /// Balance held before every roll
        #[arg(long, default_value_t = 50)]
        credits: u64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Print the validated effective configuration
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = GameConfig::load_or_default(cli.config.as_deref()).context("loading game config")?;

    match cli.command {
        Commands::Play {
            max_rolls,
            target,
            seed,
        } => match seed {
            Some(seed) => play(&config, Arc::new(SeededRandom::new(seed)), max_rolls, target),
            None => play(&config, ThreadRandom, max_rolls, target),
        },
        Commands::Simulate {
            rolls,
            credits,
            seed,
        } => {
            let report = simulate(&config, rolls, credits, seed)?;
            print_report(&config, credits, &report);
            Ok(())
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn play<R: RandomSource + Clone>(
    config: &GameConfig,
    rng: R,
    max_rolls: u64,
    target: Option<u64>,
) -> anyhow::Result<()> {
    let game = GameService::from_config(config, rng)?;
    let (session, _) = game.resolve_or_create_session(None);
    let token = session.id.to_string();
    println!("session {} starts with {} credits", session.id, session.credits);

    for n in 1..=max_rolls {
        let receipt = game.roll(Some(&token))?;
        let reel: Vec<&str> = receipt.outcome.symbols.iter().map(|s| s.code()).collect();
        println!(
            "#{:>4} {} {:<5} reward={:<3} credits={}",
            n,
            reel.join(" "),
            if receipt.outcome.is_win { "WIN" } else { "-" },
            receipt.outcome.reward,
            receipt.credits
        );
        if receipt.game_over {
            println!("game over after {n} rolls");
            return Ok(());
        }
        if target.is_some_and(|t| receipt.credits >= t) {
            break;
        }
    }

    let receipt = game.cashout(Some(&token))?;
    println!("{}: {} credits", receipt.message, receipt.credits);
    Ok(())
}

/// Tallies how often the wrapped policy is asked and how often it re-rolls.
/// The machine only asks after a winning first reel.
struct CountingPolicy<P> {
    inner: P,
    consulted: AtomicU64,
    rerolls: AtomicU64,
}

impl<P: CheatPolicy> CountingPolicy<P> {
    fn new(inner: P) -> Self {
        Self {
            inner,
            consulted: AtomicU64::new(0),
            rerolls: AtomicU64::new(0),
        }
    }
}

impl<P: CheatPolicy> CheatPolicy for CountingPolicy<P> {
    fn should_reroll(&self, credits: u64) -> bool {
        self.consulted.fetch_add(1, Ordering::Relaxed);
        let reroll = self.inner.should_reroll(credits);
        if reroll {
            self.rerolls.fetch_add(1, Ordering::Relaxed);
        }
        reroll
    }
}

#[derive(Debug, Default)]
struct SimulationReport {
    rolls: u64,
    wins: u64,
    paid: u64,
    first_reel_wins: u64,
    rerolls: u64,
}

impl SimulationReport {
    fn reroll_rate(&self) -> f64 {
        if self.first_reel_wins == 0 {
            return 0.0;
        }
        self.rerolls as f64 / self.first_reel_wins as f64
    }
}

fn simulate(
    config: &GameConfig,
    rolls: u64,
    credits: u64,
    seed: u64,
) -> anyhow::Result<SimulationReport> {
    anyhow::ensure!(rolls > 0, "rolls must be positive");
    anyhow::ensure!(credits >= config.roll_cost, "credits must cover the roll cost");
    config.validate()?;

    let rng = Arc::new(SeededRandom::new(seed));
    let symbols = config.symbol_set()?;
    let calculator = PaytableCalculator::new(config.rewards.clone(), &symbols)?;
    let brackets = BracketCheatPolicy::new(config.cheat_brackets.clone(), rng.clone())?;
    let policy = CountingPolicy::new(brackets);
    let machine = SlotMachine::new(UniformSymbolGenerator::new(symbols, rng), calculator, policy);
    let game = GameService::new(
        Arc::new(SessionManager::new(config.initial_credits)),
        machine,
        config.roll_cost,
    );

    let (mut session, _) = game.resolve_or_create_session(None);
    let mut report = SimulationReport::default();

    for _ in 0..rolls {
        pin_balance(&game, &session.id, credits)?;
        let receipt = game.roll(Some(&session.id.to_string()))?;
        if receipt.game_over {
            session = game.resolve_or_create_session(None).0;
        }
        report.rolls += 1;
        if receipt.outcome.is_win {
            report.wins += 1;
            report.paid += receipt.outcome.reward;
        }
    }

    let policy = game.engine().policy();
    report.first_reel_wins = policy.consulted.load(Ordering::Relaxed);
    report.rerolls = policy.rerolls.load(Ordering::Relaxed);
    debug!(?report, "simulation finished");
    Ok(report)
}

fn print_report(config: &GameConfig, credits: u64, report: &SimulationReport) {
    let charged = credits.saturating_sub(config.roll_cost);
    let bracket = config
        .cheat_brackets
        .iter()
        .find(|b| b.contains(charged))
        .copied();
    let staked = report.rolls * config.roll_cost;
    println!("rolls:          {}", report.rolls);
    println!("balance/roll:   {credits} (policy sees {charged})");
    println!("bracket:        {}", describe(bracket));
    println!("win rate:       {:.4}", report.wins as f64 / report.rolls as f64);
    println!(
        "re-roll rate:   {:.4} ({} of {} first-reel wins)",
        report.reroll_rate(),
        report.rerolls,
        report.first_reel_wins
    );
    println!("return/stake:   {:.4}", report.paid as f64 / staked as f64);
}

/// Puts the session back at `credits` so every roll starts from the same balance.
fn pin_balance<M: Engine>(
    game: &GameService<M>,
    id: &SessionId,
    credits: u64,
) -> anyhow::Result<()> {
    let target = i64::try_from(credits).context("credits out of range")?;
    game.ledger()
        .update_credits(id, target)
        .with_context(|| format!("session {id} disappeared"))?;
    Ok(())
}

fn describe(bracket: Option<CheatBracket>) -> String {
    match bracket {
        None => "none (wins are never re-rolled)".to_string(),
        Some(CheatBracket {
            min,
            max: Some(max),
            chance,
        }) => format!("[{min}, {max}] re-roll chance {chance}"),
        Some(CheatBracket {
            min,
            max: None,
            chance,
        }) => format!("[{min}, inf) re-roll chance {chance}"),
    }
}
