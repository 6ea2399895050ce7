use log::{debug, info, warn};
use magnetic::config::Config;
use magnetic::hints::load_hint_file;
use magnetic::host_terminal::TerminalHost;
use magnetic::interpreter::Interpreter;
use magnetic::msrand::MsRand;
use magnetic::vm::{Game, VM};
use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "magnetic.toml";

fn usage(program: &str) {
    println!("magnetic - interpreter for Magnetic Scrolls adventure games");
    println!();
    println!(
        "Usage: {} [--config FILE] [--seed N] [--limit N] [--hints FILE] <game.mag>",
        program
    );
    println!();
    println!("Type {} on a line of its own to take back a turn.", magnetic::host_terminal::UNDO_COMMAND);
    println!("Settings not given on the command line are read from {DEFAULT_CONFIG}.");
}

struct Args {
    config: PathBuf,
    game: Option<PathBuf>,
    seed: Option<u32>,
    limit: Option<u64>,
    hints: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        config: PathBuf::from(DEFAULT_CONFIG),
        game: None,
        seed: None,
        limit: None,
        hints: None,
    };
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{name} needs a value"))
        };
        match arg.as_str() {
            "--config" => parsed.config = PathBuf::from(value("--config")?),
            "--hints" => parsed.hints = Some(PathBuf::from(value("--hints")?)),
            "--seed" => {
                let v = value("--seed")?;
                parsed.seed = Some(v.parse().map_err(|_| format!("Invalid seed: {v}"))?);
            }
            "--limit" => {
                let v = value("--limit")?;
                parsed.limit = Some(v.parse().map_err(|_| format!("Invalid limit: {v}"))?);
            }
            other if other.starts_with("--") => return Err(format!("Unknown option {other}")),
            other => parsed.game = Some(PathBuf::from(other)),
        }
    }
    Ok(parsed)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("Error: {message}");
            usage(&args[0]);
            std::process::exit(2);
        }
    };

    let config = Config::load(&parsed.config)?;

    // RUST_LOG wins over the configured filter
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();
    debug!("Configuration: {:?}", config);

    let Some(game_path) = parsed.game.or(config.game.clone()) else {
        usage(&args[0]);
        return Ok(());
    };

    debug!("Loading game: {}", game_path.display());
    let mut file = match File::open(&game_path) {
        Ok(file) => file,
        Err(e) => {
            match e.kind() {
                std::io::ErrorKind::NotFound => {
                    eprintln!("Error: Game file not found: {}", game_path.display());
                    eprintln!();
                    eprintln!("Please check:");
                    eprintln!("• File path is correct");
                    eprintln!("• You're running from the right directory");
                }
                std::io::ErrorKind::PermissionDenied => {
                    eprintln!(
                        "Error: Permission denied accessing game file: {}",
                        game_path.display()
                    );
                }
                _ => {
                    eprintln!("Error: Cannot open game file '{}': {}", game_path.display(), e);
                }
            }
            std::process::exit(1);
        }
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let game = match Game::from_memory(bytes) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error: {} is not a usable game image: {}", game_path.display(), e);
            std::process::exit(1);
        }
    };

    debug!("Header:{}", game.header);

    let vm = match parsed.seed.or(config.seed) {
        Some(seed) => {
            info!("Using fixed random seed {seed}");
            VM::with_rng(game, MsRand::new_predictable(seed))
        }
        None => VM::new(game),
    };

    let mut host = TerminalHost::new(config.status_line);
    if let Some(dir) = config.save_dir.clone() {
        host = host.with_save_dir(dir);
    }
    let mut interpreter = Interpreter::new(vm, host);

    if interpreter.vm.is_magwin() {
        let hint_path = parsed
            .hints
            .or(config.hints.clone())
            .unwrap_or_else(|| game_path.with_extension("hnt"));
        match load_hint_file(&hint_path) {
            Ok(hints) => interpreter.set_hints(hints),
            Err(e) => warn!("No hints from {}: {}", hint_path.display(), e),
        }
    }

    let limit = parsed.limit.or(config.instruction_limit);
    if let Err(e) = interpreter.run_with_limit(limit) {
        debug!("Final state:\n{}", interpreter.vm.status());
        return Err(e.into());
    }
    Ok(())
}
