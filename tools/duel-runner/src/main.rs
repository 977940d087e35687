//! duel-runner: headless archery duel driver.
//!
//! Usage:
//!   duel-runner simulate --params '{"matchId":"m1","playerId":"p1","opponentId":"b9bot"}' --seed 7
//!   duel-runner cadence --matches 10 --seed 1

use std::path::PathBuf;
use std::process;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archery_ai::profiles::TargetingProfile;
use archery_core::commands::DuelCommand;
use archery_core::config::MatchConfig;
use archery_core::enums::{Difficulty, MatchPhase};
use archery_core::events::{DuelEvent, MatchAbort, MatchReport};
use archery_core::params::MatchParams;
use archery_core::ports::{ReportError, ResultReporter};
use archery_sim::{DuelEngine, SimConfig};

/// Upper bound on ticks for one match: countdown, play, report delays and slack.
const MAX_TICKS: u64 = 30 * 600;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    init_tracing(&parse_flag(&args[2..], "--log-level").unwrap_or_else(|| "info".into()));

    let result = match args[1].as_str() {
        "simulate" => cmd_simulate(&args[2..]),
        "cadence" => cmd_cadence(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("Unknown command: {other}")),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "duel-runner: headless archery duel driver\n\
         \n\
         Commands:\n\
         \n\
         simulate  Play one match and print the submitted result as JSON\n\
         \n\
           --params <json>     Platform match parameters (default: vs. an easy bot)\n\
           --seed <N>          RNG seed (default: 42)\n\
           --difficulty <d>    easy | hard, overrides the bot id prefix\n\
           --config <path>     MatchConfig JSON\n\
           --profile <path>    TargetingProfile JSON for the bot\n\
           --autopilot         Let the AI play the local side too\n\
         \n\
         cadence   Compare easy and hard bots over several matches\n\
         \n\
           --matches <N>       Matches per difficulty (default: 5)\n\
           --seed <N>          Base seed (default: 42)\n\
           --config <path>     MatchConfig JSON\n\
         \n\
         Common:\n\
         \n\
           --log-level <lvl>   tracing filter when RUST_LOG is unset (default: info)\n"
    );
}

/// Initialize tracing/logging. Logs go to stderr so stdout stays JSON.
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn parse_flag(args: &[String], name: &str) -> Option<String> {
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_seed(args: &[String]) -> Result<u64, String> {
    match parse_flag(args, "--seed") {
        Some(s) => s.parse().map_err(|_| format!("--seed expects an integer, got {s}")),
        None => Ok(42),
    }
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    match value.to_ascii_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "hard" => Ok(Difficulty::Hard),
        other => Err(format!("Unknown difficulty: {other}")),
    }
}

fn read_file(path: &str) -> Result<String, String> {
    let path = PathBuf::from(path);
    std::fs::read_to_string(&path).map_err(|e| format!("Cannot read {}: {e}", path.display()))
}

fn load_match_config(args: &[String]) -> Result<Option<MatchConfig>, String> {
    parse_flag(args, "--config")
        .map(|path| MatchConfig::from_json_str(&read_file(&path)?).map_err(|e| e.to_string()))
        .transpose()
}

/// Prints every payload as one JSON line on stdout.
struct StdoutReporter;

impl ResultReporter for StdoutReporter {
    fn report_result(&mut self, report: &MatchReport) -> Result<(), ReportError> {
        println!("{}", serde_json::to_string(&json!({ "matchResult": report }))?);
        Ok(())
    }

    fn report_abort(&mut self, abort: &MatchAbort) -> Result<(), ReportError> {
        println!("{}", serde_json::to_string(&json!({ "matchAbort": abort }))?);
        Ok(())
    }
}

/// Drive one match from countdown to submitted result.
///
/// Acknowledges the submission the tick after it is made, the way the
/// hosting platform would.
fn play_match(engine: &mut DuelEngine) -> u64 {
    engine.queue_command(DuelCommand::StartCountdown);
    for _ in 0..MAX_TICKS {
        let snapshot = engine.tick();
        if snapshot
            .events
            .iter()
            .any(|e| matches!(e, DuelEvent::MatchResult { .. }))
        {
            engine.queue_command(DuelCommand::AcknowledgeSubmission);
            engine.tick();
            break;
        }
    }
    engine.time().tick
}

// --- Simulate command ---

fn cmd_simulate(args: &[String]) -> Result<(), String> {
    let params_json = parse_flag(args, "--params").unwrap_or_else(|| {
        r#"{"matchId":"local","playerId":"player","opponentId":"a9-bot"}"#.to_string()
    });
    let params = MatchParams::from_json(&params_json).map_err(|e| e.to_string())?;
    let seed = parse_seed(args)?;

    let mut config = SimConfig::for_match(params, 1, seed);
    if let Some(match_config) = load_match_config(args)? {
        config = config.with_match_config(match_config);
    }
    config.autopilot = has_flag(args, "--autopilot");
    if let Some(d) = parse_difficulty_flag(args)? {
        config.difficulty = d;
    }
    if let Some(path) = parse_flag(args, "--profile") {
        let profile = TargetingProfile::from_json_str(&read_file(&path)?).map_err(|e| e.to_string())?;
        config.profile = Some(profile);
    }

    info!(
        seed,
        difficulty = ?config.difficulty,
        mode = ?config.mode,
        networked = config.match_config.networked,
        "Simulating match"
    );
    let mut engine = DuelEngine::new(config)
        .map_err(|e| e.to_string())?
        .with_reporter(Box::new(StdoutReporter));

    let ticks = play_match(&mut engine);
    let state = engine.match_flow().state();
    if state.phase != MatchPhase::Ended {
        warn!(ticks, "Match did not finish within the tick budget");
    }

    let summary = json!({
        "ticks": ticks,
        "phase": state.phase,
        "outcome": state.outcome,
        "endReason": state.end_reason,
        "red": state.red_score,
        "blue": state.blue_score,
        "shooters": engine.shooters().iter().map(|s| s.view()).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?);
    Ok(())
}

fn parse_difficulty_flag(args: &[String]) -> Result<Option<Difficulty>, String> {
    parse_flag(args, "--difficulty")
        .map(|d| parse_difficulty(&d))
        .transpose()
}

// --- Cadence command ---

fn cmd_cadence(args: &[String]) -> Result<(), String> {
    let matches: u32 = match parse_flag(args, "--matches") {
        Some(n) => n.parse().map_err(|_| format!("--matches expects an integer, got {n}"))?,
        None => 5,
    };
    if matches == 0 {
        return Err("--matches must be at least 1".into());
    }
    let match_config = load_match_config(args)?.unwrap_or_default();
    let mut seeds = ChaCha8Rng::seed_from_u64(parse_seed(args)?);

    let mut rows = Vec::new();
    for difficulty in [Difficulty::Easy, Difficulty::Hard] {
        let mut shots = 0u64;
        let mut hits = 0u64;
        for _ in 0..matches {
            let config = SimConfig {
                seed: seeds.gen(),
                difficulty,
                match_config: match_config.clone(),
                ..Default::default()
            };
            let bot_side = config.local_side.opponent();
            let mut engine = DuelEngine::new(config).map_err(|e| e.to_string())?;
            play_match(&mut engine);

            shots += engine
                .shooters()
                .iter()
                .map(|s| s.state().shots_fired as u64)
                .sum::<u64>();
            hits += engine.match_flow().state().score(bot_side) as u64;
        }

        info!(?difficulty, shots, hits, matches, "Cadence survey");
        rows.push(json!({
            "difficulty": difficulty,
            "matches": matches,
            "shotsPerMatch": shots as f64 / matches as f64,
            "hitsPerMatch": hits as f64 / matches as f64,
            "accuracy": if shots > 0 { hits as f64 / shots as f64 } else { 0.0 },
        }));
    }

    println!("{}", serde_json::to_string_pretty(&rows).map_err(|e| e.to_string())?);
    Ok(())
}
