//! Check and pin analysis.
//!
//! Everything the legal move generator needs to know about the side to move's
//! king is computed once per position here, so that piece moves can be
//! filtered with plain mask intersections instead of make/unmake testing.

use chess_core::{Color, Piece, Square};

use super::attacks::{
    between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks, rook_attacks,
};
use crate::{Bitboard, Position};

/// King-safety facts about a position, from the side to move's point of view.
#[derive(Debug, Clone)]
pub struct CheckInfo {
    /// Every square the opponent attacks, with the mover's king lifted off the
    /// board so that sliders see through it.
    pub attacked_by_opponent: Bitboard,

    /// Opponent pieces currently attacking the mover's king.
    pub giving_check: Bitboard,

    /// Target squares available to knights, bishops, rooks and queens.
    pub non_king_restriction: Bitboard,

    /// Like `non_king_restriction`, plus the en passant square when the
    /// checker is the pawn that just double-pushed.
    pub pawn_restriction: Bitboard,

    /// Per-square movement ray. `FULL` for unpinned pieces, otherwise the
    /// line through the pinning slider and the king.
    pub pin_rays: [Bitboard; 64],
}

impl CheckInfo {
    pub fn new(position: &Position) -> Self {
        let us = position.side_to_move;
        let them = !us;
        let king = position.king_square(us);
        let occupied = position.occupied();

        let attacked_by_opponent =
            attacked_squares(position, them, occupied ^ Bitboard::from_square(king));
        let giving_check = attackers_to(position, king, them, occupied);

        let (non_king_restriction, pawn_restriction) =
            match (giving_check.first(), giving_check.more_than_one()) {
                (None, _) => (Bitboard::FULL, Bitboard::FULL),
                (Some(_), true) => (Bitboard::EMPTY, Bitboard::EMPTY),
                (Some(checker), false) => {
                    let mut evasions = giving_check;
                    if position.piece_at(checker).is_some_and(|p| p.piece.is_slider()) {
                        evasions |= between(checker, king);
                    }
                    let mut pawn_evasions = evasions;
                    if let Some(ep) = position.en_passant {
                        if ep.offset(-us.pawn_push()) == Some(checker) {
                            pawn_evasions.set(ep);
                        }
                    }
                    (evasions, pawn_evasions)
                }
            };

        CheckInfo {
            attacked_by_opponent,
            giving_check,
            non_king_restriction,
            pawn_restriction,
            pin_rays: pin_rays(position, us, king),
        }
    }

    /// True if the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.giving_check.is_not_empty()
    }

    /// True if two pieces give check at once; only king moves can answer that.
    #[inline]
    pub fn in_double_check(&self) -> bool {
        self.giving_check.more_than_one()
    }

    #[inline]
    pub fn pin_ray(&self, sq: Square) -> Bitboard {
        self.pin_rays[sq.index() as usize]
    }
}

fn pin_rays(position: &Position, us: Color, king: Square) -> [Bitboard; 64] {
    let them = !us;
    let occupied = position.occupied();
    let queens = position.pieces_of(Piece::Queen, them);
    let diagonal = (position.pieces_of(Piece::Bishop, them) | queens)
        & bishop_attacks(king, Bitboard::EMPTY);
    let orthogonal = (position.pieces_of(Piece::Rook, them) | queens)
        & rook_attacks(king, Bitboard::EMPTY);

    let mut rays = [Bitboard::FULL; 64];
    for slider in diagonal | orthogonal {
        let blockers = between(slider, king) & occupied;
        if blockers.more_than_one() {
            continue;
        }
        if let Some(pinned) = blockers.first() {
            if position.occupancy(us).contains(pinned) {
                rays[pinned.index() as usize] = line(slider, king);
            }
        }
    }
    rays
}

/// Pieces of color `by` that attack `sq`, given the board occupancy `occupied`.
pub fn attackers_to(position: &Position, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
    let queens = position.pieces_of(Piece::Queen, by);
    (pawn_attacks(sq, !by) & position.pieces_of(Piece::Pawn, by))
        | (knight_attacks(sq) & position.pieces_of(Piece::Knight, by))
        | (king_attacks(sq) & position.pieces_of(Piece::King, by))
        | (bishop_attacks(sq, occupied) & (position.pieces_of(Piece::Bishop, by) | queens))
        | (rook_attacks(sq, occupied) & (position.pieces_of(Piece::Rook, by) | queens))
}

/// Union of all squares attacked by `by`'s pieces under the given occupancy.
pub fn attacked_squares(position: &Position, by: Color, occupied: Bitboard) -> Bitboard {
    let mut attacked = Bitboard::EMPTY;
    for sq in position.pieces_of(Piece::Pawn, by) {
        attacked |= pawn_attacks(sq, by);
    }
    for sq in position.pieces_of(Piece::Knight, by) {
        attacked |= knight_attacks(sq);
    }
    let queens = position.pieces_of(Piece::Queen, by);
    for sq in position.pieces_of(Piece::Bishop, by) | queens {
        attacked |= bishop_attacks(sq, occupied);
    }
    for sq in position.pieces_of(Piece::Rook, by) | queens {
        attacked |= rook_attacks(sq, occupied);
    }
    for sq in position.pieces_of(Piece::King, by) {
        attacked |= king_attacks(sq);
    }
    attacked
}
