//! Chess piece representation.

use crate::Color;
use std::fmt;

/// The six types of chess pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All piece types in order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Promotion targets, ordered by the low two bits of a promoting [`MoveKind`].
    ///
    /// [`MoveKind`]: crate::MoveKind
    pub const PROMOTIONS: [Piece; 4] = [Piece::Rook, Piece::Knight, Piece::Bishop, Piece::Queen];

    /// Returns the index of this piece type (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase letter used by FEN and coordinate move text.
    pub const fn letter(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Parses a piece letter, ignoring case.
    pub const fn from_letter(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }

    /// Returns true if this piece is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// The occupant of a board square: a piece type together with its owner.
///
/// There are twelve values; an empty square is represented by `None` wherever
/// an `Option<ColoredPiece>` is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPiece {
    pub piece: Piece,
    pub color: Color,
}

impl ColoredPiece {
    #[inline]
    pub const fn new(piece: Piece, color: Color) -> Self {
        ColoredPiece { piece, color }
    }

    /// Dense index in 0..12: White pieces first, then Black, each in [`Piece::ALL`] order.
    #[inline]
    pub const fn index(self) -> usize {
        self.color.index() * 6 + self.piece.index()
    }

    /// Inverse of [`ColoredPiece::index`].
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= 12 {
            return None;
        }
        let color = if index < 6 { Color::White } else { Color::Black };
        Some(ColoredPiece::new(Piece::ALL[index % 6], color))
    }

    /// Returns the FEN character: uppercase for White, lowercase for Black.
    pub const fn to_fen_char(self) -> char {
        let c = self.piece.letter();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN character into a colored piece.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Piece::from_letter(c) {
            Some(piece) => Some(ColoredPiece::new(piece, color)),
            None => None,
        }
    }
}

impl fmt::Display for ColoredPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_char())
    }
}
