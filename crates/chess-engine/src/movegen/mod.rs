//! Move generation.
//!
//! This module provides legal move generation for chess positions using
//! magic bitboards for sliding piece attacks and a per-position
//! [`CheckInfo`] for check evasion and pins. Only en passant, whose capture
//! can uncover a check along the rank, is verified by applying the move.

mod analysis;
mod apply;
mod attacks;
mod magic_numbers;
pub mod magics;
pub mod perft;

use chess_core::{Color, ColoredPiece, File, Move, MoveKind, Piece, Square};
use thiserror::Error;

use crate::{Bitboard, Position};

pub use analysis::{attacked_squares, attackers_to, CheckInfo};
pub use apply::apply;
pub use attacks::{
    between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks, queen_attacks,
    rook_attacks,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves the list can hold.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Moves `m` to index 0, shifting the moves before it back by one, and
    /// returns the index it came from. `hint` is checked before scanning.
    /// Returns `None` (and leaves the order alone) if `m` is not in the list.
    pub fn move_to_front(&mut self, m: Move, hint: usize) -> Option<usize> {
        let index = if self.as_slice().get(hint) == Some(&m) {
            hint
        } else {
            self.as_slice().iter().position(|&x| x == m)?
        };
        self.moves[..=index].rotate_right(1);
        Some(index)
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Error returned when coordinate move text cannot be matched to a legal move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("malformed move text {0:?}, expected coordinates like e2e4 or e7e8q")]
    Malformed(String),

    #[error("{0} is not a legal move in this position")]
    Illegal(String),
}

/// Generates all legal moves for the given position.
pub fn generate_moves(position: &Position) -> MoveList {
    let info = CheckInfo::new(position);
    let mut moves = MoveList::new();

    if !info.in_double_check() {
        generate_pawn_moves(position, &info, &mut moves);
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            generate_piece_moves(position, &info, piece, &mut moves);
        }
    }
    generate_king_moves(position, &info, &mut moves);
    if !info.in_check() {
        generate_castling_moves(position, &info, &mut moves);
    }

    moves
}

/// Pushes a capture or quiet move for every square in `targets`.
fn push_targets(from: Square, targets: Bitboard, theirs: Bitboard, moves: &mut MoveList) {
    for to in targets {
        let kind = if theirs.contains(to) {
            MoveKind::Capture
        } else {
            MoveKind::Quiet
        };
        moves.push(Move::new(from, to, kind));
    }
}

/// Pushes a pawn move, expanding it into the four promotions on the last rank.
fn push_pawn_move(from: Square, to: Square, capture: bool, us: Color, moves: &mut MoveList) {
    if to.rank() == us.promotion_rank() {
        for piece in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
            if let Some(kind) = MoveKind::promotion(piece, capture) {
                moves.push(Move::new(from, to, kind));
            }
        }
    } else if capture {
        moves.push(Move::new(from, to, MoveKind::Capture));
    } else {
        moves.push(Move::quiet(from, to));
    }
}

fn generate_pawn_moves(position: &Position, info: &CheckInfo, moves: &mut MoveList) {
    let us = position.side_to_move;
    let theirs = position.occupancy(!us);
    let occupied = position.occupied();
    let push = us.pawn_push();

    for from in position.pieces_of(Piece::Pawn, us) {
        let allowed = info.pawn_restriction & info.pin_ray(from);

        if let Some(one) = from.offset(push) {
            if !occupied.contains(one) {
                if allowed.contains(one) {
                    push_pawn_move(from, one, false, us, moves);
                }
                if from.rank() == us.pawn_rank() {
                    if let Some(two) = one.offset(push) {
                        if !occupied.contains(two) && allowed.contains(two) {
                            moves.push(Move::new(from, two, MoveKind::DoublePush));
                        }
                    }
                }
            }
        }

        for to in pawn_attacks(from, us) & theirs & allowed {
            push_pawn_move(from, to, true, us, moves);
        }

        if let Some(ep) = position.en_passant {
            if pawn_attacks(from, us).contains(ep) && allowed.contains(ep) {
                let m = Move::new(from, ep, MoveKind::EnPassant);
                if !is_king_attacked(&apply(m, position), us) {
                    moves.push(m);
                }
            }
        }
    }
}

fn generate_piece_moves(position: &Position, info: &CheckInfo, piece: Piece, moves: &mut MoveList) {
    let us = position.side_to_move;
    let ours = position.occupancy(us);
    let theirs = position.occupancy(!us);
    let occupied = position.occupied();

    for from in position.pieces_of(piece, us) {
        let attacks = match piece {
            Piece::Knight => knight_attacks(from),
            Piece::Bishop => bishop_attacks(from, occupied),
            Piece::Rook => rook_attacks(from, occupied),
            Piece::Queen => queen_attacks(from, occupied),
            Piece::Pawn | Piece::King => Bitboard::EMPTY,
        };
        let targets = attacks & !ours & info.non_king_restriction & info.pin_ray(from);
        push_targets(from, targets, theirs, moves);
    }
}

fn generate_king_moves(position: &Position, info: &CheckInfo, moves: &mut MoveList) {
    let us = position.side_to_move;
    let king = position.king_square(us);
    let targets = king_attacks(king) & !position.occupancy(us) & !info.attacked_by_opponent;
    push_targets(king, targets, position.occupancy(!us), moves);
}

/// Generates castling moves. The caller guarantees the king is not in check.
fn generate_castling_moves(position: &Position, info: &CheckInfo, moves: &mut MoveList) {
    let us = position.side_to_move;
    let rights = position.castle_rights(us);
    let rank = us.back_rank();
    let king_from = Square::new(File::E, rank);
    if rights.is_none() || position.king_square(us) != king_from {
        return;
    }

    let occupied = position.occupied();
    let own_rook = Some(ColoredPiece::new(Piece::Rook, us));
    let sides = [
        (rights.kingside(), File::H, File::G, MoveKind::CastleKingside),
        (rights.queenside(), File::A, File::C, MoveKind::CastleQueenside),
    ];

    for (allowed, rook_file, king_file, kind) in sides {
        if !allowed {
            continue;
        }
        let rook_from = Square::new(rook_file, rank);
        let king_to = Square::new(king_file, rank);
        if position.piece_at(rook_from) != own_rook
            || (between(king_from, rook_from) & occupied).is_not_empty()
        {
            continue;
        }
        let king_path = between(king_from, king_to)
            | Bitboard::from_square(king_from)
            | Bitboard::from_square(king_to);
        if (king_path & info.attacked_by_opponent).is_empty() {
            moves.push(Move::new(king_from, king_to, kind));
        }
    }
}

/// Returns true if `m` is among the legal moves of `position`.
pub fn is_legal_move(m: Move, position: &Position) -> bool {
    generate_moves(position).contains(m)
}

/// Returns true if the given square is attacked by the given color.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    attackers_to(position, sq, by, position.occupied()).is_not_empty()
}

/// Returns true if the king of the given color is attacked.
pub fn is_king_attacked(position: &Position, king_color: Color) -> bool {
    is_square_attacked(position, position.king_square(king_color), !king_color)
}

/// Returns true if the side to move is in check.
pub fn in_check(position: &Position) -> bool {
    is_king_attacked(position, position.side_to_move)
}

/// Resolves coordinate text such as `e2e4` or `e7e8n` to the matching legal
/// move, filling in the capture, castling and en passant details. A missing
/// promotion letter on a promoting move means a queen.
pub fn parse_move(position: &Position, text: &str) -> Result<Move, MoveParseError> {
    let text = text.trim();
    let parsed = Move::from_uci(text).ok_or_else(|| MoveParseError::Malformed(text.to_string()))?;
    let wanted = parsed.promotion_piece();

    generate_moves(position)
        .as_slice()
        .iter()
        .copied()
        .find(|m| {
            m.from() == parsed.from()
                && m.to() == parsed.to()
                && match (wanted, m.promotion_piece()) {
                    (None, None) => true,
                    (None, Some(piece)) => piece == Piece::Queen,
                    (Some(a), Some(b)) => a == b,
                    (Some(_), None) => false,
                }
        })
        .ok_or_else(|| MoveParseError::Illegal(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn moves_of(fen: &str) -> MoveList {
        generate_moves(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn movelist_push_and_iterate() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        let m1 = Move::new(sq("e2"), sq("e4"), MoveKind::DoublePush);
        let m2 = Move::new(sq("d2"), sq("d4"), MoveKind::DoublePush);

        list.push(m1);
        list.push(m2);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0], m1);
        assert_eq!(list[1], m2);
        assert!(list.contains(m2));
        assert!(!list.contains(Move::quiet(sq("a2"), sq("a3"))));
    }

    #[test]
    fn movelist_clear_and_default() {
        let mut list = MoveList::default();
        assert!(list.is_empty());
        list.push(Move::quiet(sq("e2"), sq("e3")));
        assert_eq!(list.len(), 1);

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn movelist_retain() {
        let mut list = MoveList::new();
        list.push(Move::quiet(sq("e2"), sq("e3")));
        list.push(Move::quiet(sq("e2"), sq("e4")));
        list.push(Move::quiet(sq("e3"), sq("e4")));

        list.retain(|m| m.from() == sq("e2"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn movelist_move_to_front() {
        let a = Move::quiet(sq("a2"), sq("a3"));
        let b = Move::quiet(sq("b2"), sq("b3"));
        let c = Move::quiet(sq("c2"), sq("c3"));
        let mut list = MoveList::new();
        for m in [a, b, c] {
            list.push(m);
        }

        assert_eq!(list.move_to_front(c, 2), Some(2));
        assert_eq!(list.as_slice(), &[c, a, b]);
        // A stale hint falls back to a scan.
        assert_eq!(list.move_to_front(b, 0), Some(2));
        assert_eq!(list.as_slice(), &[b, c, a]);
        assert_eq!(list.move_to_front(b, 99), Some(0));
        assert_eq!(list.as_slice(), &[b, c, a]);
        assert_eq!(list.move_to_front(Move::quiet(sq("h2"), sq("h3")), 1), None);
        assert_eq!(list.as_slice(), &[b, c, a]);
    }

    #[test]
    fn generate_moves_startpos() {
        let moves = generate_moves(&Position::startpos());
        assert_eq!(moves.len(), 20); // 16 pawn moves + 4 knight moves
        assert!(moves.contains(Move::new(sq("e2"), sq("e4"), MoveKind::DoublePush)));
        assert!(moves.contains(Move::quiet(sq("g1"), sq("f3"))));
    }

    #[test]
    fn captures_are_tagged() {
        let moves = moves_of("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        assert!(moves.contains(Move::new(sq("e4"), sq("d5"), MoveKind::Capture)));
        assert!(!moves.contains(Move::quiet(sq("e4"), sq("d5"))));
    }

    #[test]
    fn is_square_attacked_startpos() {
        let position = Position::startpos();
        assert!(is_square_attacked(&position, sq("e3"), Color::White));
        assert!(!is_square_attacked(&position, sq("e4"), Color::White));
        assert!(is_square_attacked(&position, sq("f6"), Color::Black));
    }

    #[test]
    fn in_check_detection() {
        assert!(!in_check(&Position::startpos()));
        let checked = Position::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").unwrap();
        assert!(in_check(&checked));
        assert!(is_king_attacked(&checked, Color::White));
        assert!(!is_king_attacked(&checked, Color::Black));
    }

    #[test]
    fn castling_both_sides() {
        let moves = moves_of("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert!(moves.contains(Move::new(Square::E1, Square::G1, MoveKind::CastleKingside)));
        assert!(moves.contains(Move::new(Square::E1, Square::C1, MoveKind::CastleQueenside)));
    }

    #[test]
    fn no_castling_through_check() {
        // The rook on f5 covers f1.
        let moves = moves_of("r3k2r/ppppp1pp/8/5r2/8/8/PPPPP1PP/R3K2R w KQkq - 0 1");
        assert!(!moves.contains(Move::new(Square::E1, Square::G1, MoveKind::CastleKingside)));
        assert!(moves.contains(Move::new(Square::E1, Square::C1, MoveKind::CastleQueenside)));
    }

    #[test]
    fn queenside_castling_ignores_attacked_b_file() {
        // b1 must be empty but may be attacked.
        let moves = moves_of("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves.contains(Move::new(Square::E1, Square::C1, MoveKind::CastleQueenside)));
    }

    #[test]
    fn no_castling_without_rook() {
        let moves = moves_of("4k3/8/8/8/8/8/8/4K3 w K - 0 1");
        assert!(moves.as_slice().iter().all(|m| !m.kind().is_castling()));
    }

    #[test]
    fn en_passant_available() {
        let moves = moves_of("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 1");
        assert!(moves.contains(Move::new(sq("f5"), sq("e6"), MoveKind::EnPassant)));
    }

    #[test]
    fn en_passant_exposing_rank_check_is_illegal() {
        let moves = moves_of("8/8/8/KPp4r/8/8/8/7k w - c6 0 1");
        assert!(!moves.as_slice().iter().any(|m| m.kind().is_en_passant()));
    }

    #[test]
    fn en_passant_captures_checking_pawn() {
        let moves = moves_of("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        assert!(moves.contains(Move::new(sq("e4"), sq("d3"), MoveKind::EnPassant)));
    }

    #[test]
    fn promotion_expands_to_four_moves() {
        let moves = moves_of("8/P7/8/8/8/8/8/4K2k w - - 0 1");
        let promotions = moves
            .as_slice()
            .iter()
            .filter(|m| m.kind().is_promotion())
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn pinned_piece_stays_on_its_ray() {
        let moves = moves_of("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        let rook_moves: Vec<_> = moves
            .as_slice()
            .iter()
            .filter(|m| m.from() == sq("e2"))
            .collect();
        assert_eq!(rook_moves.len(), 6);
        assert!(rook_moves.iter().all(|m| m.to().file() == File::E));
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let moves = moves_of("4r1k1/8/8/8/8/3n4/8/Q3K3 w - - 0 1");
        assert!(!moves.is_empty());
        assert!(moves.as_slice().iter().all(|m| m.from() == Square::E1));
    }

    #[test]
    fn is_legal_move_checks_membership() {
        let position = Position::startpos();
        assert!(is_legal_move(Move::quiet(sq("b1"), sq("c3")), &position));
        assert!(!is_legal_move(Move::quiet(sq("b1"), sq("d2")), &position));
    }

    #[test]
    fn parse_move_resolves_kinds() {
        let position = Position::startpos();
        assert_eq!(
            parse_move(&position, "e2e4"),
            Ok(Move::new(sq("e2"), sq("e4"), MoveKind::DoublePush))
        );
        let castling = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(
            parse_move(&castling, "e1c1"),
            Ok(Move::new(Square::E1, Square::C1, MoveKind::CastleQueenside))
        );
    }

    #[test]
    fn parse_move_promotion_defaults_to_queen() {
        let position = Position::from_fen("1r5k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            parse_move(&position, "a7a8"),
            Ok(Move::new(sq("a7"), sq("a8"), MoveKind::PromoteQueen))
        );
        assert_eq!(
            parse_move(&position, "a7b8n"),
            Ok(Move::new(sq("a7"), sq("b8"), MoveKind::PromoteKnightCapture))
        );
    }

    #[test]
    fn parse_move_errors() {
        let position = Position::startpos();
        assert!(matches!(parse_move(&position, "e9e4"), Err(MoveParseError::Malformed(_))));
        assert!(matches!(parse_move(&position, "hello"), Err(MoveParseError::Malformed(_))));
        assert_eq!(
            parse_move(&position, "e2e5"),
            Err(MoveParseError::Illegal("e2e5".to_string()))
        );
    }
}
