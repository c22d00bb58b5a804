//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.

use std::thread;

use super::{apply, generate_moves};
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
///
/// This is the standard perft function used to validate move generators.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in &moves {
        let new_pos = apply(*m, position);
        nodes += perft(&new_pos, depth - 1);
    }
    nodes
}

/// Perft with divide - shows node count for each move at depth-1.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(position);
    let mut results = Vec::with_capacity(moves.len());

    for m in &moves {
        let new_pos = apply(*m, position);
        let nodes = if depth > 1 {
            perft(&new_pos, depth - 1)
        } else {
            1
        };
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

/// Perft with the root moves split across `threads` scoped worker threads.
///
/// Positions are plain values, so the workers share nothing but the root
/// position they read from. `threads` is clamped to at least one.
pub fn perft_parallel(position: &Position, depth: u32, threads: usize) -> u64 {
    if depth <= 1 || threads <= 1 {
        return perft(position, depth);
    }

    let moves = generate_moves(position);
    let chunk_size = moves.len().div_ceil(threads).max(1);

    thread::scope(|scope| {
        let workers: Vec<_> = moves
            .as_slice()
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|m| perft(&apply(*m, position), depth - 1))
                        .sum::<u64>()
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| match worker.join() {
                Ok(nodes) => nodes,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .sum()
    })
}
