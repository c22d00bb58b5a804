//! Chess position representation.
//!
//! A position keeps two views of the board in lockstep: a 64-entry mailbox for
//! O(1) "what stands here" queries and twelve per-piece-color bitboards for
//! set-wise move generation. The two per-color occupancy bitboards are always
//! re-derived from the twelve piece bitboards, never patched by hand.

use chess_core::{CastleRights, Color, ColoredPiece, Fen, FenError, Piece, Square};

use crate::Bitboard;

/// Complete chess position state.
///
/// A value type: applying a move produces a new, independent position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: [Option<ColoredPiece>; 64],

    /// Indexed by [`ColoredPiece::index`].
    pieces: [Bitboard; 12],

    /// Indexed by [`Color::index`]; derived from `pieces`.
    occupancy: [Bitboard; 2],

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights indexed by [`Color::index`].
    pub castling: [CastleRights; 2],

    /// Square a pawn skipped over on the previous move, if that move was a double push.
    pub en_passant: Option<Square>,

    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,
}

impl Position {
    /// A board with no pieces. Only useful as a starting point for construction.
    pub(crate) fn empty() -> Self {
        Position {
            board: [None; 64],
            pieces: [Bitboard::EMPTY; 12],
            occupancy: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: [CastleRights::None; 2],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_record(&Fen::parse(fen)?))
    }

    /// Builds a position from an already parsed FEN record.
    pub fn from_record(fen: &Fen) -> Self {
        let mut position = Position::empty();
        for sq in Square::all() {
            if let Some(occupant) = fen.board[sq.index() as usize] {
                position.put(sq, occupant);
            }
        }
        position.refresh_occupancy();

        position.side_to_move = fen.active_color;
        position.castling = fen.castling;
        position.en_passant = fen.en_passant;
        position.halfmove_clock = fen.halfmove_clock;
        position.fullmove_number = fen.fullmove_number;
        position
    }

    /// Converts the position to a FEN record.
    pub fn to_record(&self) -> Fen {
        Fen {
            board: self.board,
            active_color: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        self.to_record().to_string()
    }

    /// Returns the occupant of the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<ColoredPiece> {
        self.board[sq.index() as usize]
    }

    /// Returns a bitboard of pieces of the given type and color.
    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[ColoredPiece::new(piece, color).index()]
    }

    /// All squares occupied by `color`.
    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    #[inline]
    pub fn castle_rights(&self, color: Color) -> CastleRights {
        self.castling[color.index()]
    }

    /// The square of `color`'s king.
    ///
    /// # Panics
    ///
    /// Panics if `color` has no king. Positions built from FEN always have
    /// both kings, and moves never capture a king, so this only fires on
    /// misuse upstream.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        match self.pieces_of(Piece::King, color).first() {
            Some(sq) => sq,
            None => panic!("no {color} king on the board"),
        }
    }

    /// Places `occupant` on an empty square. Occupancy is left stale until
    /// [`Position::refresh_occupancy`] runs.
    pub(crate) fn put(&mut self, sq: Square, occupant: ColoredPiece) {
        debug_assert!(self.board[sq.index() as usize].is_none());
        self.board[sq.index() as usize] = Some(occupant);
        self.pieces[occupant.index()].set(sq);
    }

    /// Empties a square and returns what stood there.
    pub(crate) fn take(&mut self, sq: Square) -> Option<ColoredPiece> {
        let occupant = self.board[sq.index() as usize].take()?;
        self.pieces[occupant.index()].clear(sq);
        Some(occupant)
    }

    /// Re-derives both occupancy bitboards from the twelve piece bitboards.
    pub(crate) fn refresh_occupancy(&mut self) {
        for color in Color::ALL {
            self.occupancy[color.index()] = Piece::ALL
                .iter()
                .fold(Bitboard::EMPTY, |acc, &piece| acc | self.pieces_of(piece, color));
        }
    }

    /// Checks the representation invariants: the mailbox agrees with the
    /// piece bitboards, no square is claimed by two bitboards, and occupancy
    /// is the union of each color's pieces.
    pub fn is_consistent(&self) -> bool {
        let mut seen = Bitboard::EMPTY;
        for (index, bb) in self.pieces.iter().enumerate() {
            if (seen & *bb).is_not_empty() {
                return false;
            }
            seen |= *bb;
            let Some(occupant) = ColoredPiece::from_index(index) else {
                return false;
            };
            if bb.into_iter().any(|sq| self.piece_at(sq) != Some(occupant)) {
                return false;
            }
        }
        let mailbox_count = self.board.iter().flatten().count() as u32;
        let mut expected = self.clone();
        expected.refresh_occupancy();
        mailbox_count == seen.count() && expected.occupancy == self.occupancy
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
