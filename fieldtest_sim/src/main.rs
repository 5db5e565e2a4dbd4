//! fieldtest Simulator CLI
//!
//! Run the built-in simulated test scenarios and check their outcomes.

use clap::Parser;
use fieldtest_sim::scenarios::ScenarioId;
use fieldtest_sim::{ScenarioResult, ScenarioRunner, TestConfig, DEFAULT_TICK_RATE_HZ, DEFAULT_TIMEOUT_S};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// fieldtest simulated test CLI
#[derive(Parser, Debug)]
#[command(name = "fieldtest-sim")]
#[command(about = "Run tick-synchronized simulated field tests", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (robot_reaches_center, ball_into_goal, robot_leaves_field,
    /// unreachable_target, transport_drop, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Simulated timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_S)]
    timeout: f64,

    /// Simulated tick duration in seconds
    #[arg(long, default_value_t = 1.0 / DEFAULT_TICK_RATE_HZ as f64)]
    tick_duration: f64,

    /// Run with the live display (threaded mode, real-time pacing)
    #[arg(long)]
    enable_visualization: bool,

    /// Display layout id
    #[arg(long)]
    layout: Option<String>,

    /// Stop as soon as every eventually validation has passed
    #[arg(long)]
    exit_early: bool,

    /// Stream runs to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    rerun: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export the run to a JSON file (single scenario only)
    #[arg(long)]
    export: Option<String>,
}

fn parse_scenarios(arg: &str) -> Result<Vec<ScenarioId>, String> {
    if arg == "all" {
        return Ok(ScenarioId::all());
    }
    arg.parse().map(|scenario| vec![scenario])
}

fn print_available_scenarios() {
    eprintln!("Available scenarios:");
    for scenario in ScenarioId::all() {
        eprintln!("  {:<22} {}", scenario.name(), scenario.description());
    }
    eprintln!("  {:<22} Every scenario above", "all");
}

fn build_config(args: &Args) -> Result<TestConfig, String> {
    if args.seeds == 0 {
        return Err("--seeds must be at least 1".to_string());
    }

    let seconds = |name: &str, value: f64| {
        Duration::try_from_secs_f64(value).map_err(|e| format!("invalid --{} {}: {}", name, value, e))
    };

    let mut config = TestConfig::default()
        .with_timeout(seconds("timeout", args.timeout)?)
        .with_tick_duration(seconds("tick-duration", args.tick_duration)?)
        .with_early_exit(args.exit_early);

    if args.enable_visualization {
        config = config.with_visualization(args.layout.clone());
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !args.json {
        info!("fieldtest Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios = match parse_scenarios(&args.scenario) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_available_scenarios();
            std::process::exit(2);
        }
    };

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if args.export.is_some() && (scenarios.len() > 1 || args.seeds > 1) {
        eprintln!("Error: --export only supports a single scenario and seed");
        std::process::exit(2);
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let mut runner = ScenarioRunner::new(seed, config.clone()).with_rerun(args.rerun);
        if let Some(path) = &args.export {
            runner = runner.with_export(path);
        }

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) {} as expected in {} ticks",
                        scenario.name(),
                        seed,
                        result.outcome.kind(),
                        result.total_ticks
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) MISMATCH: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "expected": r.expected,
                    "outcome": r.outcome.kind(),
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs matched their expected outcome!", total);
        } else {
            error!("❌ {}/{} scenario runs did not match!", failed_count, total);

            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
