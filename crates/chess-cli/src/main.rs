//! Command-line front end for the chess engine.

mod config;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chess_engine::movegen::perft::{perft, perft_divide, perft_parallel};
use chess_engine::search::tt::TranspositionTable;
use chess_engine::search::{MATE, MAX_PLY};
use chess_engine::{
    generate_moves, parse_move, recommend_move_with, DepthReport, Position, SearchHandle,
};
use clap::{Parser, Subcommand};
use config::EngineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-cli")]
#[command(about = "Search, perft and move tools for the chess engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a position and print the best move
    Search {
        /// Position to search (defaults to the starting position)
        #[arg(long)]
        fen: Option<String>,
        /// Maximum iterative deepening depth
        #[arg(short, long)]
        depth: Option<u8>,
        /// Stop searching after this many milliseconds
        #[arg(long)]
        movetime: Option<u64>,
        /// TOML file with engine settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(long)]
        fen: Option<String>,
        #[arg(short, long)]
        depth: u32,
        /// Print the node count below each root move
        #[arg(long)]
        divide: bool,
        /// Worker threads for the root split
        #[arg(short, long, default_value = "1")]
        threads: usize,
    },
    /// List the legal moves of a position
    Moves {
        #[arg(long)]
        fen: Option<String>,
    },
    /// Apply coordinate moves (e2e4, e7e8q) and print the resulting FEN
    Play {
        #[arg(long)]
        fen: Option<String>,
        moves: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            fen,
            depth,
            movetime,
            config,
        } => {
            let mut settings = match config {
                Some(path) => EngineConfig::load(&path)?,
                None => EngineConfig::default(),
            };
            if let Some(depth) = depth {
                settings.search.max_depth = depth;
            }
            if movetime.is_some() {
                settings.move_time_ms = movetime;
            }
            settings.validate()?;
            run_search(&load_position(fen.as_deref())?, &settings)?;
        }
        Commands::Perft {
            fen,
            depth,
            divide,
            threads,
        } => run_perft(&load_position(fen.as_deref())?, depth, divide, threads),
        Commands::Moves { fen } => {
            let position = load_position(fen.as_deref())?;
            let moves = generate_moves(&position);
            for m in &moves {
                println!("{m}");
            }
            println!("{} legal moves", moves.len());
        }
        Commands::Play { fen, moves } => {
            let mut position = load_position(fen.as_deref())?;
            for text in &moves {
                let m = parse_move(&position, text)
                    .with_context(|| format!("cannot play {text} in {}", position.to_fen()))?;
                position = position.apply(m);
            }
            println!("{}", position.to_fen());
        }
    }

    Ok(())
}

fn load_position(fen: Option<&str>) -> anyhow::Result<Position> {
    match fen {
        Some(fen) => Position::from_fen(fen).with_context(|| format!("invalid FEN {fen:?}")),
        None => Ok(Position::startpos()),
    }
}

fn run_search(position: &Position, settings: &EngineConfig) -> anyhow::Result<()> {
    let handle = SearchHandle::new();
    let mut tt = TranspositionTable::try_new(settings.search.tt_bits)
        .context("cannot set up the transposition table")?;

    // The timer is detached; if the search ends first it just sleeps out.
    if let Some(ms) = settings.move_time_ms {
        let timer = handle.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(ms));
            timer.stop();
        });
    }

    let mut print_depth = |report: &DepthReport| {
        println!(
            "depth {} score {} nodes {} time {}ms best {}",
            report.depth,
            format_score(report.score),
            report.nodes,
            report.elapsed.as_millis(),
            report.best_move
        );
    };
    let result = recommend_move_with(&handle, position, &mut tt, &settings.search, &mut print_depth);

    match result.best_move {
        Some(m) => println!("bestmove {m} score {}", format_score(result.score)),
        None if result.score == 0 => println!("bestmove (none) stalemate"),
        None => println!("bestmove (none) checkmate"),
    }
    Ok(())
}

fn run_perft(position: &Position, depth: u32, divide: bool, threads: usize) {
    let start = Instant::now();
    let nodes = if divide {
        let counts = perft_divide(position, depth);
        for (m, count) in &counts {
            println!("{m}: {count}");
        }
        counts.iter().map(|(_, count)| count).sum()
    } else if threads > 1 {
        perft_parallel(position, depth, threads)
    } else {
        perft(position, depth)
    };

    let elapsed = start.elapsed();
    let nps = (nodes as f64 / elapsed.as_secs_f64().max(1e-9)) as u64;
    println!("nodes {nodes} time {}ms nps {nps}", elapsed.as_millis());
}

/// Centipawns, or `mate N` (negative when being mated) for forced mates.
fn format_score(score: i32) -> String {
    let mate_bound = MATE - MAX_PLY as i32;
    if score.abs() >= mate_bound {
        let plies = MATE - score.abs();
        let moves = (plies + 1) / 2;
        if score > 0 {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {score}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "chess-cli",
            "search",
            "--depth",
            "5",
            "--movetime",
            "300",
            "--config",
            "engine.toml",
        ])
        .unwrap();
        match cli.command {
            Commands::Search {
                fen,
                depth,
                movetime,
                config,
            } => {
                assert_eq!(fen, None);
                assert_eq!(depth, Some(5));
                assert_eq!(movetime, Some(300));
                assert_eq!(config, Some(PathBuf::from("engine.toml")));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn parses_perft_defaults() {
        let cli = Cli::try_parse_from(["chess-cli", "perft", "-d", "4"]).unwrap();
        match cli.command {
            Commands::Perft {
                depth,
                divide,
                threads,
                ..
            } => {
                assert_eq!(depth, 4);
                assert!(!divide);
                assert_eq!(threads, 1);
            }
            _ => panic!("expected perft"),
        }
        assert!(Cli::try_parse_from(["chess-cli", "perft"]).is_err());
    }

    #[test]
    fn parses_play_moves() {
        let cli = Cli::try_parse_from(["chess-cli", "play", "e2e4", "e7e5"]).unwrap();
        match cli.command {
            Commands::Play { fen, moves } => {
                assert_eq!(fen, None);
                assert_eq!(moves, vec!["e2e4", "e7e5"]);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn help_lists_subcommands() {
        let help = Cli::command().render_help().to_string();
        for name in ["search", "perft", "moves", "play"] {
            assert!(help.contains(name), "{name} missing from help");
        }
    }

    #[test]
    fn load_position_defaults_and_errors() {
        assert_eq!(load_position(None).unwrap(), Position::startpos());
        assert!(load_position(Some("8/8/8 w - - 0 1")).is_err());
    }

    #[test]
    fn scores_are_formatted() {
        assert_eq!(format_score(35), "cp 35");
        assert_eq!(format_score(-120), "cp -120");
        assert_eq!(format_score(MATE - 1), "mate 1");
        assert_eq!(format_score(MATE - 3), "mate 2");
        assert_eq!(format_score(-(MATE - 2)), "mate -1");
    }

    #[test]
    fn oversized_table_is_an_error_not_a_panic() {
        let mut settings = EngineConfig::default();
        settings.search.tt_bits = 48;
        assert!(settings.validate().is_err());
        let err = run_search(&Position::startpos(), &settings).unwrap_err();
        assert!(format!("{err:#}").contains("too large"));
    }
}
