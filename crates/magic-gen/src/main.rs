//! Regenerates `magic_numbers.rs` for the engine.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use magic_gen::{generate, parse_seed, render_source, DEFAULT_SEED};
use tracing_subscriber::EnvFilter;

/// Search for magic bitboard multipliers and emit them as Rust source.
#[derive(Parser)]
#[command(name = "magic-gen")]
#[command(about = "Search for magic multipliers and emit magic_numbers.rs")]
struct Args {
    /// Seed for the candidate generator (decimal or 0x hex)
    #[arg(long, default_value_t = DEFAULT_SEED, value_parser = parse_seed)]
    seed: u64,

    /// Write the source here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    tracing::info!(seed = args.seed, "searching for magics");
    let source = render_source(&generate(args.seed));
    match args.output {
        Some(path) => {
            fs::write(&path, source).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{source}"),
    }
    Ok(())
}
