//! Iterative-deepening alpha-beta search.
//!
//! The search is a plain negamax over legal moves with a transposition table
//! for move ordering and exact-score cutoffs. It runs on the caller's thread;
//! another thread can cut it short through a [`SearchHandle`].

pub mod eval;
pub mod tt;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chess_core::Move;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::movegen::{apply, generate_moves, in_check};
use crate::zobrist::zobrist_hash;
use crate::Position;
use eval::evaluate;
use tt::{score_from_tt, score_to_tt, NodeType, TranspositionTable, TtEntry};

/// Score of being checkmated at the root. Mates further away score closer to zero.
pub const MATE: i32 = 30_000;

/// Bound larger than any reachable score.
pub const INF: i32 = 32_000;

/// Deepest ply a search can reach; mate scores never drift further than this.
pub const MAX_PLY: u32 = 256;

/// Cooperative cancellation flag shared between a search and its controller.
///
/// Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct SearchHandle {
    stopped: Arc<AtomicBool>,
}

impl SearchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks any search using this handle to finish as soon as possible.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Clears a previous stop request so the handle can drive a new search.
    pub fn go(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

fn default_max_depth() -> u8 {
    7
}

fn default_tt_bits() -> u8 {
    20
}

/// Search limits. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Deepest iteration of the iterative deepening loop.
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,

    /// Transposition table size as a power of two.
    #[serde(default = "default_tt_bits")]
    pub tt_bits: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: default_max_depth(),
            tt_bits: default_tt_bits(),
        }
    }
}

/// Progress after one completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthReport {
    pub depth: u8,
    pub score: i32,
    pub best_move: Move,
    /// Nodes visited since the search started.
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// From the side to move's perspective: `-MATE` when checkmated, `0` when stalemated.
    pub score: i32,
    /// Deepest completed iteration, `0` if none completed.
    pub depth: u8,
    pub nodes: u64,
}

/// Receives search progress. Called only from the searching thread.
pub trait SearchReporter {
    /// Called once per completed depth.
    fn on_depth(&mut self, report: &DepthReport);

    /// Called once when the search returns.
    fn on_finish(&mut self, _result: &SearchResult) {}
}

/// Silent reporter.
impl SearchReporter for () {
    fn on_depth(&mut self, _report: &DepthReport) {}
}

impl<F> SearchReporter for F
where
    F: FnMut(&DepthReport),
{
    fn on_depth(&mut self, report: &DepthReport) {
        self(report)
    }
}

/// Searches with the default configuration and no progress reporting.
pub fn recommend_move(
    handle: &SearchHandle,
    position: &Position,
    tt: &mut TranspositionTable,
) -> SearchResult {
    recommend_move_with(handle, position, tt, &SearchConfig::default(), &mut ())
}

/// Runs iterative deepening up to `config.max_depth` or until `handle` is stopped.
///
/// A stop request is not cleared here; call [`SearchHandle::go`] before
/// reusing a handle that was stopped.
pub fn recommend_move_with<R>(
    handle: &SearchHandle,
    position: &Position,
    tt: &mut TranspositionTable,
    config: &SearchConfig,
    reporter: &mut R,
) -> SearchResult
where
    R: SearchReporter + ?Sized,
{
    let start = Instant::now();
    let root_moves = generate_moves(position);

    let Some(&first_move) = root_moves.as_slice().first() else {
        let score = if in_check(position) { -MATE } else { 0 };
        let result = SearchResult {
            best_move: None,
            score,
            depth: 0,
            nodes: 0,
        };
        info!(score, "no legal moves at the root");
        reporter.on_finish(&result);
        return result;
    };

    let mut searcher = Searcher {
        handle,
        tt,
        nodes: 0,
    };
    let mut result = SearchResult {
        best_move: Some(first_move),
        score: 0,
        depth: 0,
        nodes: 0,
    };

    for depth in 1..=config.max_depth.max(1) {
        if handle.is_stopped() {
            break;
        }

        let outcome = searcher.search_root(position, depth);
        if !outcome.completed {
            if depth == 1 {
                if let Some(partial) = outcome.best_move {
                    result.best_move = Some(partial);
                    result.score = outcome.score;
                }
            }
            debug!(depth, "iteration interrupted");
            break;
        }

        let Some(best_move) = outcome.best_move else {
            break;
        };
        result = SearchResult {
            best_move: Some(best_move),
            score: outcome.score,
            depth,
            nodes: searcher.nodes,
        };

        let report = DepthReport {
            depth,
            score: outcome.score,
            best_move,
            nodes: searcher.nodes,
            elapsed: start.elapsed(),
        };
        debug!(
            depth,
            score = report.score,
            nodes = report.nodes,
            best = %best_move,
            "completed depth"
        );
        reporter.on_depth(&report);
    }

    result.nodes = searcher.nodes;
    info!(
        best = ?result.best_move.map(|m| m.to_uci()),
        score = result.score,
        depth = result.depth,
        nodes = result.nodes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search finished"
    );
    reporter.on_finish(&result);
    result
}

struct RootOutcome {
    best_move: Option<Move>,
    score: i32,
    completed: bool,
}

/// Search state
struct Searcher<'a> {
    handle: &'a SearchHandle,
    tt: &'a mut TranspositionTable,
    nodes: u64,
}

impl Searcher<'_> {
    fn search_root(&mut self, position: &Position, depth: u8) -> RootOutcome {
        self.nodes += 1;
        let key = zobrist_hash(position);
        let mut moves = generate_moves(position);
        let promoted_from = self
            .tt
            .probe(key)
            .and_then(|entry| moves.move_to_front(entry.best_move, entry.move_index.into()));

        let mut alpha = -INF;
        let mut best_move = None;
        let mut best_rank = 0;
        let mut best_score = -INF;

        for (rank, &m) in moves.as_slice().iter().enumerate() {
            if self.handle.is_stopped() {
                return RootOutcome {
                    best_move,
                    score: best_score,
                    completed: false,
                };
            }

            let score = -self.negamax(&apply(m, position), depth - 1, -INF, -alpha, 1);
            if self.handle.is_stopped() {
                return RootOutcome {
                    best_move,
                    score: best_score,
                    completed: false,
                };
            }

            if score > best_score {
                best_score = score;
                best_move = Some(m);
                best_rank = rank;
            }
            if score > alpha {
                alpha = score;
            }
        }

        if let Some(m) = best_move {
            self.tt.store(TtEntry {
                key,
                best_move: m,
                move_index: generation_index(best_rank, promoted_from),
                score: score_to_tt(best_score, 0),
                depth,
                node_type: NodeType::Exact,
            });
        }

        RootOutcome {
            best_move,
            score: best_score,
            completed: true,
        }
    }

    /// Fail-soft negamax. Scores are from the side to move's perspective.
    /// After a stop request the returned score is meaningless and nothing is stored.
    fn negamax(&mut self, position: &Position, depth: u8, mut alpha: i32, beta: i32, ply: u32) -> i32 {
        self.nodes += 1;

        if depth == 0 {
            return evaluate(position);
        }

        let key = zobrist_hash(position);
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            if entry.depth >= depth && entry.node_type == NodeType::Exact {
                return score_from_tt(entry.score, ply);
            }
            tt_move = Some((entry.best_move, usize::from(entry.move_index)));
        }

        let mut moves = generate_moves(position);
        if moves.is_empty() {
            return if in_check(position) {
                -MATE + ply as i32
            } else {
                0
            };
        }
        let promoted_from = tt_move.and_then(|(m, hint)| moves.move_to_front(m, hint));

        let mut best_score = -INF;
        let mut best_move = moves[0];
        let mut best_rank = 0;
        let mut node_type = NodeType::UpperBound;

        for (rank, &m) in moves.as_slice().iter().enumerate() {
            if self.handle.is_stopped() {
                return best_score;
            }

            let score = -self.negamax(&apply(m, position), depth - 1, -beta, -alpha, ply + 1);
            if self.handle.is_stopped() {
                return best_score;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                best_rank = rank;
            }
            if score >= beta {
                node_type = NodeType::LowerBound;
                break;
            }
            if score > alpha {
                alpha = score;
                node_type = NodeType::Exact;
            }
        }

        self.tt.store(TtEntry {
            key,
            best_move,
            move_index: generation_index(best_rank, promoted_from),
            score: score_to_tt(best_score, ply),
            depth,
            node_type,
        });
        best_score
    }
}

/// Maps a position in the reordered move list back to the generator's order,
/// given where the move placed first originally stood.
fn generation_index(rank: usize, promoted_from: Option<usize>) -> u8 {
    let index = match promoted_from {
        Some(from) if rank == 0 => from,
        Some(from) if rank <= from => rank - 1,
        _ => rank,
    };
    // Move lists hold at most 256 moves.
    index as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_stop_and_go() {
        let handle = SearchHandle::new();
        assert!(!handle.is_stopped());
        let clone = handle.clone();
        clone.stop();
        assert!(handle.is_stopped());
        handle.go();
        assert!(!clone.is_stopped());
    }

    #[test]
    fn config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.max_depth, 7);
        assert_eq!(config.tt_bits, 20);
    }

    #[test]
    fn reporter_closure_sees_every_depth() {
        let handle = SearchHandle::new();
        let mut tt = TranspositionTable::new(12);
        let config = SearchConfig {
            max_depth: 3,
            ..SearchConfig::default()
        };
        let mut depths = Vec::new();
        let mut reporter = |report: &DepthReport| depths.push(report.depth);
        let result =
            recommend_move_with(&handle, &Position::startpos(), &mut tt, &config, &mut reporter);
        assert_eq!(depths, vec![1, 2, 3]);
        assert_eq!(result.depth, 3);
        assert!(result.best_move.is_some());
        assert!(result.nodes > 0);
    }

    #[test]
    fn stopped_before_start_returns_first_legal_move() {
        let handle = SearchHandle::new();
        handle.stop();
        let mut tt = TranspositionTable::new(10);
        let position = Position::startpos();
        let result = recommend_move(&handle, &position, &mut tt);
        assert_eq!(result.depth, 0);
        assert_eq!(result.best_move, Some(generate_moves(&position)[0]));
    }

    #[test]
    fn terminal_positions_have_no_move() {
        let handle = SearchHandle::new();
        let mut tt = TranspositionTable::new(10);

        let mated = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = recommend_move(&handle, &mated, &mut tt);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -MATE);

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = recommend_move(&handle, &stalemate, &mut tt);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn generation_index_undoes_the_reordering() {
        // [a b c d] with c promoted becomes [c a b d].
        let promoted = Some(2);
        let mapped: Vec<u8> = (0..4).map(|rank| generation_index(rank, promoted)).collect();
        assert_eq!(mapped, vec![2, 0, 1, 3]);
        assert_eq!(generation_index(3, None), 3);
        assert_eq!(generation_index(0, Some(0)), 0);
    }

    #[test]
    fn stored_move_index_points_into_the_generated_list() {
        let position =
            Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let mut tt = TranspositionTable::new(16);
        let config = SearchConfig {
            max_depth: 3,
            ..SearchConfig::default()
        };
        recommend_move_with(&SearchHandle::new(), &position, &mut tt, &config, &mut ());

        let root = tt.probe(zobrist_hash(&position)).copied().unwrap();
        let moves = generate_moves(&position);
        assert_eq!(moves[usize::from(root.move_index)], root.best_move);

        for &m in &moves {
            let child = apply(m, &position);
            if let Some(entry) = tt.probe(zobrist_hash(&child)) {
                let replies = generate_moves(&child);
                assert_eq!(replies[usize::from(entry.move_index)], entry.best_move);
            }
        }
    }
}
