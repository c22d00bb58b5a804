//! Producing the successor position for a move.

use chess_core::{CastleRights, Color, ColoredPiece, File, Move, MoveKind, Piece, Square};

use crate::Position;

/// Applies a legal move and returns the resulting position.
///
/// The input position is left untouched. Passing a move that is not legal in
/// `position` is a caller bug; a move from an empty square panics.
pub fn apply(m: Move, position: &Position) -> Position {
    let mut next = position.clone();
    let us = position.side_to_move;
    let from = m.from();
    let to = m.to();
    let kind = m.kind();

    let mover = match next.take(from) {
        Some(mover) => mover,
        None => panic!("no piece on {from} for move {m}"),
    };

    let captured = if kind.is_en_passant() {
        next.take(Square::new(to.file(), from.rank()))
    } else {
        next.take(to)
    };

    let placed = match kind.promotion_piece() {
        Some(piece) => ColoredPiece::new(piece, us),
        None => mover,
    };
    next.put(to, placed);

    if kind.is_castling() {
        let rank = us.back_rank();
        let (rook_from, rook_to) = if kind == MoveKind::CastleKingside {
            (Square::new(File::H, rank), Square::new(File::F, rank))
        } else {
            (Square::new(File::A, rank), Square::new(File::D, rank))
        };
        if let Some(rook) = next.take(rook_from) {
            next.put(rook_to, rook);
        }
    }

    next.refresh_occupancy();

    if mover.piece == Piece::King {
        next.castling[us.index()] = CastleRights::None;
    }
    revoke_corner_right(&mut next.castling, from);
    revoke_corner_right(&mut next.castling, to);

    next.en_passant = if kind.is_double_push() {
        from.offset(us.pawn_push())
    } else {
        None
    };

    if mover.piece == Piece::Pawn || captured.is_some() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock += 1;
    }
    if us == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = !us;

    next
}

/// Anything leaving or arriving on a rook's initial corner costs that castling right.
fn revoke_corner_right(castling: &mut [CastleRights; 2], sq: Square) {
    let (color, kingside) = match sq {
        Square::A1 => (Color::White, false),
        Square::H1 => (Color::White, true),
        Square::A8 => (Color::Black, false),
        Square::H8 => (Color::Black, true),
        _ => return,
    };
    let rights = &mut castling[color.index()];
    *rights = if kingside {
        rights.without_kingside()
    } else {
        rights.without_queenside()
    };
}

impl Position {
    /// Returns the position after playing `m`. See [`apply`].
    #[inline]
    pub fn apply(&self, m: Move) -> Position {
        apply(m, self)
    }
}
