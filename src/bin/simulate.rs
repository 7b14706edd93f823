//! Combat balance simulator CLI.
//!
//! Fight many battles with a simple policy to check the balance table.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                          # 1000 battles at level 1
//!   cargo run --bin simulate -- -n 200 --level 12 --region iron_peaks
//!   cargo run --bin simulate -- --balance tuning.json --seed 42

use saga::core::{BalanceConfig, GameData};
use saga::simulator::{run_simulation, SimConfig};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    let balance = match &config.balance_path {
        Some(path) => match BalanceConfig::from_json_file(path) {
            Ok(balance) => balance,
            Err(e) => {
                eprintln!("Failed to load balance file {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => BalanceConfig::default(),
    };
    let data = match GameData::with_balance(balance) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Invalid game data: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              SAGA COMBAT SIMULATOR                            ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Battles:        {}", config.num_runs);
    println!("  Level:          {}", config.level);
    println!("  Class:          {}", config.class.name());
    println!(
        "  Region:         {}",
        config.region_id.as_deref().unwrap_or("(none)")
    );
    if let Some(path) = &config.balance_path {
        println!("  Balance:        {}", path.display());
    }
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();

    match run_simulation(&config, &data) {
        Ok(report) => {
            println!("{}", report.to_text());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(1000);
                    i += 1;
                }
            }
            "-l" | "--level" => {
                if i + 1 < args.len() {
                    config.level = args[i + 1].parse().unwrap_or(1);
                    i += 1;
                }
            }
            "-r" | "--region" => {
                if i + 1 < args.len() {
                    config.region_id = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "-c" | "--class" => {
                if i + 1 < args.len() {
                    if let Some(class) = saga::character::CharacterClass::all()
                        .into_iter()
                        .find(|c| format!("{:?}", c).eq_ignore_ascii_case(&args[i + 1]))
                    {
                        config.class = class;
                    }
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-b" | "--balance" => {
                if i + 1 < args.len() {
                    config.balance_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Saga Combat Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>        Number of battles (default: 1000)");
    println!("    -l, --level <L>       Player level (default: 1)");
    println!("    -r, --region <ID>     Region id, e.g. greenvale, iron_peaks");
    println!("    -c, --class <C>       warrior, mage, rogue or bard (default: warrior)");
    println!("    -s, --seed <S>        Random seed for reproducibility");
    println!("    -b, --balance <FILE>  Balance JSON overriding the shipped table");
    println!("    -v, --verbose         Print every battle");
    println!("    -h, --help            Show this help");
    println!();
    println!("Set RUST_LOG=debug to trace each combat step.");
}
