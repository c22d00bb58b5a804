//! Bitboard chess engine: legal move generation and alpha-beta search.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`Position`] - full game state, kept as a mailbox and as bitboards
//! - [`movegen`] - magic-bitboard legal move generation, move application and perft
//! - [`search`] - iterative-deepening negamax with a transposition table and
//!   cooperative cancellation
//! - [`zobrist_hash`] - position hashing
//!
//! # Architecture
//!
//! Each piece type/color combination has a 64-bit integer where each bit
//! represents a square; a parallel 64-entry mailbox answers "what stands on
//! this square" directly. Sliding attacks come from magic lookup tables built
//! once per process from constants produced offline by `magic-gen`.
//!
//! # Example
//!
//! ```
//! use chess_engine::search::{recommend_move, tt::TranspositionTable, SearchHandle};
//! use chess_engine::{generate_moves, parse_move, Position};
//!
//! let position = Position::startpos();
//! println!("Legal moves from starting position: {}", generate_moves(&position).len());
//!
//! let after_e4 = position.apply(parse_move(&position, "e2e4").unwrap());
//! let mut tt = TranspositionTable::new(16);
//! let result = recommend_move(&SearchHandle::new(), &after_e4, &mut tt);
//! assert!(result.best_move.is_some());
//! ```

mod bitboard;
pub mod movegen;
mod position;
pub mod search;
mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::{
    apply, generate_moves, in_check, is_legal_move, is_square_attacked, parse_move, CheckInfo,
    MoveList, MoveParseError,
};
pub use position::Position;
pub use search::{
    recommend_move, recommend_move_with, DepthReport, SearchConfig, SearchHandle, SearchReporter,
    SearchResult,
};
pub use zobrist::{zobrist_hash, ZobristKeys, ZOBRIST};
