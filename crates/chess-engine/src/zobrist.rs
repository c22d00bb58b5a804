//! Zobrist hashing for position identification.
//!
//! Zobrist hashing creates a unique hash for each chess position by XORing
//! random numbers associated with:
//! - Each piece on each square (12 pieces x 64 squares = 768 values)
//! - Side to move
//! - Castling rights (4 values)
//! - En passant file (8 values)
//!
//! The hash is recomputed from scratch for each position; the halfmove clock
//! and fullmove number never contribute to it.

use chess_core::{Color, Piece, Square};

use crate::Position;

/// Zobrist hash keys.
///
/// Generated using a fixed seed for reproducibility.
pub struct ZobristKeys {
    /// Keys for pieces: [piece][color][square]
    pub pieces: [[[u64; 64]; 2]; 6],
    /// Key for black to move (XOR when black to move).
    pub black_to_move: u64,
    /// Keys for castling rights, indexed by `color * 2 + side` (kingside 0, queenside 1).
    pub castling: [u64; 4],
    /// Keys for en passant file.
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Initializes Zobrist keys using a simple PRNG.
    ///
    /// Uses a fixed seed for reproducibility across runs.
    pub const fn new() -> Self {
        // Simple xorshift64 PRNG for const initialization
        const fn next_random(state: u64) -> (u64, u64) {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x, x)
        }

        let mut state = 0x9E3779B97F4A7C15u64; // Golden ratio seed
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        // Initialize piece keys
        let mut piece = 0;
        while piece < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    let (new_state, value) = next_random(state);
                    state = new_state;
                    pieces[piece][color][square] = value;
                    square += 1;
                }
                color += 1;
            }
            piece += 1;
        }

        // Initialize black to move key
        let (new_state, black_to_move) = next_random(state);
        state = new_state;

        // Initialize castling keys
        let mut i = 0;
        while i < 4 {
            let (new_state, value) = next_random(state);
            state = new_state;
            castling[i] = value;
            i += 1;
        }

        // Initialize en passant keys
        let mut i = 0;
        while i < 8 {
            let (new_state, value) = next_random(state);
            state = new_state;
            en_passant[i] = value;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// Returns the key for a piece on a square.
    #[inline]
    pub const fn piece_key(&self, piece: Piece, color: Color, square: Square) -> u64 {
        self.pieces[piece.index()][color.index()][square.index() as usize]
    }

    /// Returns the key for one castling right of `color`.
    #[inline]
    pub const fn castling_key(&self, color: Color, kingside: bool) -> u64 {
        let side = if kingside { 0 } else { 1 };
        self.castling[color.index() * 2 + side]
    }

    /// Returns the key for an en passant file (0-7).
    #[inline]
    pub const fn en_passant_key(&self, file: usize) -> u64 {
        self.en_passant[file]
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

/// Computes the Zobrist hash of a position.
pub fn zobrist_hash(position: &Position) -> u64 {
    let mut hash = 0u64;

    for color in Color::ALL {
        for piece in Piece::ALL {
            for sq in position.pieces_of(piece, color) {
                hash ^= ZOBRIST.piece_key(piece, color, sq);
            }
        }

        let rights = position.castle_rights(color);
        if rights.kingside() {
            hash ^= ZOBRIST.castling_key(color, true);
        }
        if rights.queenside() {
            hash ^= ZOBRIST.castling_key(color, false);
        }
    }

    if position.side_to_move == Color::Black {
        hash ^= ZOBRIST.black_to_move;
    }
    if let Some(ep) = position.en_passant {
        hash ^= ZOBRIST.en_passant_key(ep.file().index() as usize);
    }

    hash
}
