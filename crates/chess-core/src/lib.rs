//! Core types for chess.
//!
//! This crate provides the fundamental types used across the engine:
//! - [`Piece`], [`Color`] and [`ColoredPiece`] for board occupants
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`CastleRights`] for per-player castling availability
//! - [`Move`] and [`MoveKind`], the 16-bit packed move
//! - [`Fen`] parsing and serialization

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::CastleRights;
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveKind};
pub use piece::{ColoredPiece, Piece};
pub use square::{File, ParseSquareError, Rank, Square};
