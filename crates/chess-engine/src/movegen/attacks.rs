//! Fixed attack tables for leapers and pawns, and line geometry between squares.

use crate::Bitboard;
use chess_core::{Color, Square};

pub use super::magics::{bishop_attacks, queen_attacks, rook_attacks};

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_STEPS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_STEPS);

/// Pawn capture targets, indexed `[color][square]`.
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(1, -1), (1, 1)]),
    leaper_table(&[(-1, -1), (-1, 1)]),
];

/// Squares strictly between two aligned squares, indexed `[from][to]`.
static BETWEEN: [[Bitboard; 64]; 64] = line_table(false);

/// The full board line through two aligned squares, indexed `[from][to]`.
static LINE: [[Bitboard; 64]; 64] = line_table(true);

/// (rank, file) deltas.
const KNIGHT_STEPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Squares a `color` pawn on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Squares strictly between `a` and `b`; empty unless they share a rank,
/// file or diagonal.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.index() as usize][b.index() as usize]
}

/// The whole rank, file or diagonal through `a` and `b`, including both;
/// empty if they are not aligned.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    LINE[a.index() as usize][b.index() as usize]
}

const fn leaper_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            let (dr, df) = steps[i];
            let (r, f) = (rank + dr, file + df);
            if on_board(r, f) {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    table
}

const fn line_table(full_line: bool) -> [[Bitboard; 64]; 64] {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut a = 0u8;
    while a < 64 {
        let mut b = 0u8;
        while b < 64 {
            if a != b {
                table[a as usize][b as usize] = line_between(a, b, full_line);
            }
            b += 1;
        }
        a += 1;
    }
    table
}

const fn line_between(a: u8, b: u8, full_line: bool) -> Bitboard {
    let (ar, af) = ((a / 8) as i8, (a % 8) as i8);
    let (br, bf) = ((b / 8) as i8, (b % 8) as i8);
    let (dr, df) = (br - ar, bf - af);
    if !(dr == 0 || df == 0 || dr == df || dr == -df) {
        return Bitboard::EMPTY;
    }
    let (sr, sf) = (dr.signum(), df.signum());

    let mut bits = 0u64;
    if full_line {
        // Back up to the board edge, then walk the whole line.
        let (mut r, mut f) = (ar, af);
        while on_board(r - sr, f - sf) {
            r -= sr;
            f -= sf;
        }
        while on_board(r, f) {
            bits |= 1u64 << (r * 8 + f);
            r += sr;
            f += sf;
        }
    } else {
        let (mut r, mut f) = (ar + sr, af + sf);
        while r != br || f != bf {
            bits |= 1u64 << (r * 8 + f);
            r += sr;
            f += sf;
        }
    }
    Bitboard(bits)
}

const fn on_board(rank: i8, file: i8) -> bool {
    rank >= 0 && rank < 8 && file >= 0 && file < 8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn knight_attack_counts() {
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(sq("a4")).count(), 4);
        assert_eq!(knight_attacks(Square::H8).count(), 2);
    }

    #[test]
    fn knight_specific_squares() {
        let expected: Bitboard = ["d6", "f6", "g5", "g3", "f2", "d2", "c3", "c5"]
            .into_iter()
            .map(sq)
            .collect();
        assert_eq!(knight_attacks(sq("e4")), expected);
    }

    #[test]
    fn king_attack_counts() {
        assert_eq!(king_attacks(sq("d4")).count(), 8);
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(sq("a4")).count(), 5);
    }

    #[test]
    fn pawn_attacks_by_color() {
        let white = pawn_attacks(sq("d4"), Color::White);
        assert_eq!(white, [sq("c5"), sq("e5")].into_iter().collect());
        let black = pawn_attacks(sq("d4"), Color::Black);
        assert_eq!(black, [sq("c3"), sq("e3")].into_iter().collect());
        assert_eq!(pawn_attacks(sq("a4"), Color::White).count(), 1);
        assert!(pawn_attacks(sq("d8"), Color::White).is_empty());
    }

    #[test]
    fn between_aligned_squares() {
        assert_eq!(
            between(Square::A1, Square::D1),
            [Square::B1, Square::C1].into_iter().collect()
        );
        assert_eq!(
            between(sq("h8"), sq("e5")),
            [sq("g7"), sq("f6")].into_iter().collect()
        );
        assert_eq!(between(sq("e4"), sq("e5")), Bitboard::EMPTY);
        assert_eq!(between(sq("e4"), sq("f6")), Bitboard::EMPTY);
        assert_eq!(between(sq("e2"), sq("e7")), between(sq("e7"), sq("e2")));
    }

    #[test]
    fn line_through_aligned_squares() {
        assert_eq!(line(sq("c3"), sq("e5")), Bitboard::new(0x8040_2010_0804_0201));
        assert_eq!(line(sq("b4"), sq("g4")).count(), 8);
        assert!(line(sq("b4"), sq("g4")).contains(sq("a4")));
        assert_eq!(line(sq("e1"), sq("e8")), Bitboard::file(chess_core::File::E));
        assert!(line(sq("a1"), sq("b3")).is_empty());
        assert!(line(sq("a1"), sq("a1")).is_empty());
    }
}
