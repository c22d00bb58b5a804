//! Packed move representation.

use crate::{Piece, Square};
use std::fmt;

/// What kind of move a [`Move`] is.
///
/// The discriminants are a stable 4-bit contract:
/// bit 3 marks a capture, bit 2 a promotion, and for promotions the low two
/// bits select the piece from [`Piece::PROMOTIONS`] (rook, knight, bishop, queen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    Quiet = 0,
    DoublePush = 1,
    CastleKingside = 2,
    CastleQueenside = 3,
    PromoteRook = 4,
    PromoteKnight = 5,
    PromoteBishop = 6,
    PromoteQueen = 7,
    Capture = 8,
    EnPassant = 9,
    PromoteRookCapture = 12,
    PromoteKnightCapture = 13,
    PromoteBishopCapture = 14,
    PromoteQueenCapture = 15,
}

impl MoveKind {
    const CAPTURE_BIT: u8 = 0b1000;
    const PROMOTION_BIT: u8 = 0b0100;

    /// Decodes the 4-bit kind field. The unused codes 10 and 11 yield `None`.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        let kind = match bits {
            0 => MoveKind::Quiet,
            1 => MoveKind::DoublePush,
            2 => MoveKind::CastleKingside,
            3 => MoveKind::CastleQueenside,
            4 => MoveKind::PromoteRook,
            5 => MoveKind::PromoteKnight,
            6 => MoveKind::PromoteBishop,
            7 => MoveKind::PromoteQueen,
            8 => MoveKind::Capture,
            9 => MoveKind::EnPassant,
            12 => MoveKind::PromoteRookCapture,
            13 => MoveKind::PromoteKnightCapture,
            14 => MoveKind::PromoteBishopCapture,
            15 => MoveKind::PromoteQueenCapture,
            _ => return None,
        };
        Some(kind)
    }

    /// The promotion kind for `piece`, or `None` if the piece cannot be promoted to.
    pub const fn promotion(piece: Piece, capture: bool) -> Option<Self> {
        let low = match piece {
            Piece::Rook => 0,
            Piece::Knight => 1,
            Piece::Bishop => 2,
            Piece::Queen => 3,
            _ => return None,
        };
        let capture_bit = if capture { Self::CAPTURE_BIT } else { 0 };
        Self::from_bits(Self::PROMOTION_BIT | capture_bit | low)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// True for captures, en passant and capturing promotions.
    #[inline]
    pub const fn is_capture(self) -> bool {
        self.bits() & Self::CAPTURE_BIT != 0
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.bits() & Self::PROMOTION_BIT != 0
    }

    /// Returns the promotion piece if this is a promotion move.
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        if self.is_promotion() {
            Some(Piece::PROMOTIONS[(self.bits() & 0b11) as usize])
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self, MoveKind::EnPassant)
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        matches!(self, MoveKind::DoublePush)
    }
}

/// A chess move.
///
/// Encoded in 16 bits: from square (bits 0-5), to square (bits 6-11),
/// [`MoveKind`] (bits 12-15). The all-zero value is [`Move::NULL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// "No move". Never produced by move generation, since a1a1 is not a move.
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        let encoded =
            (from.index() as u16) | ((to.index() as u16) << 6) | ((kind.bits() as u16) << 12);
        Move(encoded)
    }

    /// A quiet move with no special handling.
    #[inline]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveKind::Quiet)
    }

    /// Reconstructs a move from its packed form.
    #[inline]
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match MoveKind::from_bits((raw >> 12) as u8) {
            Some(_) => Some(Move(raw)),
            None => None,
        }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn from(self) -> Square {
        // SAFETY: masked to 6 bits, always valid square index
        unsafe { Square::from_index_unchecked((self.0 & 0x3F) as u8) }
    }

    #[inline]
    pub const fn to(self) -> Square {
        // SAFETY: masked to 6 bits, always valid square index
        unsafe { Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8) }
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        match MoveKind::from_bits((self.0 >> 12) as u8) {
            Some(kind) => kind,
            // `new` and `from_raw` only accept valid kinds
            None => MoveKind::Quiet,
        }
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.kind().is_capture()
    }

    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        self.kind().promotion_piece()
    }

    /// Coordinate notation, e.g. "e2e4" or "e7e8q". The null move prints as "0000".
    pub fn to_uci(self) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        match self.promotion_piece() {
            Some(piece) => format!("{}{}{}", self.from(), self.to(), piece.letter()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Parses coordinate notation into an under-specified move.
    ///
    /// Only the squares and the promotion piece are known from the text; the
    /// engine resolves the real kind (capture, castle, ...) against a position.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let kind = match s[4..].chars().next() {
            Some(c) => MoveKind::promotion(Piece::from_letter(c)?, false)?,
            None => MoveKind::Quiet,
        };
        Some(Move::new(from, to, kind))
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn move_encoding() {
        let m = Move::new(sq("e2"), sq("e4"), MoveKind::DoublePush);
        assert_eq!(m.from(), sq("e2"));
        assert_eq!(m.to(), sq("e4"));
        assert_eq!(m.kind(), MoveKind::DoublePush);
        assert_eq!(Move::from_raw(m.raw()), Some(m));
    }

    #[test]
    fn from_raw_rejects_unused_kinds() {
        assert_eq!(Move::from_raw(10 << 12), None);
        assert_eq!(Move::from_raw(11 << 12), None);
        assert_eq!(Move::from_raw(0), Some(Move::NULL));
    }

    #[test]
    fn kind_bit_contract() {
        for bits in 0..16u8 {
            let Some(kind) = MoveKind::from_bits(bits) else {
                assert!(bits == 10 || bits == 11);
                continue;
            };
            assert_eq!(kind.bits(), bits);
            assert_eq!(kind.is_capture(), bits & 8 != 0);
            assert_eq!(kind.is_promotion(), bits & 4 != 0);
        }
        assert!(MoveKind::EnPassant.is_capture());
        assert!(!MoveKind::EnPassant.is_promotion());
        assert!(!MoveKind::CastleQueenside.is_capture());
    }

    #[test]
    fn promotion_kinds() {
        for piece in Piece::PROMOTIONS {
            let quiet = MoveKind::promotion(piece, false).unwrap();
            let capture = MoveKind::promotion(piece, true).unwrap();
            assert_eq!(quiet.promotion_piece(), Some(piece));
            assert_eq!(capture.promotion_piece(), Some(piece));
            assert!(!quiet.is_capture());
            assert!(capture.is_capture());
        }
        assert_eq!(MoveKind::promotion(Piece::King, false), None);
        assert_eq!(MoveKind::promotion(Piece::Pawn, true), None);
        assert_eq!(MoveKind::Capture.promotion_piece(), None);
    }

    #[test]
    fn castling_and_special_kinds() {
        assert!(MoveKind::CastleKingside.is_castling());
        assert!(MoveKind::CastleQueenside.is_castling());
        assert!(!MoveKind::Quiet.is_castling());
        assert!(MoveKind::EnPassant.is_en_passant());
        assert!(MoveKind::DoublePush.is_double_push());
    }

    #[test]
    fn move_uci() {
        assert_eq!(Move::quiet(sq("g1"), sq("f3")).to_uci(), "g1f3");
        let promo = Move::new(
            sq("e7"),
            sq("d8"),
            MoveKind::PromoteKnightCapture,
        );
        assert_eq!(promo.to_uci(), "e7d8n");
        assert_eq!(Move::NULL.to_uci(), "0000");
    }

    #[test]
    fn move_from_uci() {
        let m = Move::from_uci("e2e4").unwrap();
        assert_eq!(m.from(), Square::new(File::E, Rank::R2));
        assert_eq!(m.to(), Square::new(File::E, Rank::R4));
        assert_eq!(m.kind(), MoveKind::Quiet);

        assert_eq!(
            Move::from_uci("e7e8Q").unwrap().promotion_piece(),
            Some(Piece::Queen)
        );
        assert_eq!(
            Move::from_uci("a2a1r").unwrap().kind(),
            MoveKind::PromoteRook
        );

        assert!(Move::from_uci("invalid").is_none());
        assert!(Move::from_uci("e2e9").is_none());
        assert!(Move::from_uci("e7e8k").is_none());
        assert!(Move::from_uci("e7e8x").is_none());
        assert!(Move::from_uci("e2").is_none());
        assert!(Move::from_uci("e2e4qq").is_none());
        assert!(Move::from_uci("e2é4").is_none());
    }

    #[test]
    fn null_move() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::default(), Move::NULL);
        assert!(!Move::quiet(Square::A1, Square::A8).is_null());
    }

    #[test]
    fn move_debug_display() {
        let m = Move::quiet(sq("e2"), sq("e4"));
        assert_eq!(format!("{:?}", m), "Move(e2e4)");
        assert_eq!(format!("{}", m), "e2e4");
    }
}
