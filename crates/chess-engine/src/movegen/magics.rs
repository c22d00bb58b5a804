//! Magic bitboard tables for sliding piece attack generation.
//!
//! Every square uses a fixed index width (12 bits for rooks, 9 for bishops):
//! `index = ((occupied & mask) * magic) >> (64 - bits)`. The magic numbers are
//! fixed constants produced offline by `magic-gen`; only the dense lookup
//! tables are filled at first use, from those constants.

use super::magic_numbers::{BISHOP_INDEX_BITS, BISHOP_MAGICS, ROOK_INDEX_BITS, ROOK_MAGICS};
use crate::Bitboard;
use chess_core::Square;
use std::sync::OnceLock;

pub use super::magic_numbers::MAGIC_SEED;

/// The two slider movement patterns. Queens use both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Rook,
    Bishop,
}

impl Slider {
    pub const ALL: [Slider; 2] = [Slider::Rook, Slider::Bishop];

    /// Width of the per-square table index.
    #[inline]
    pub const fn index_bits(self) -> u32 {
        match self {
            Slider::Rook => ROOK_INDEX_BITS,
            Slider::Bishop => BISHOP_INDEX_BITS,
        }
    }

    /// Relevant-blocker mask: the rays from `sq` on an empty board, minus the
    /// far edge squares and `sq` itself.
    #[inline]
    pub fn mask(self, sq: Square) -> Bitboard {
        match self {
            Slider::Rook => ROOK_MASKS[sq.index() as usize],
            Slider::Bishop => BISHOP_MASKS[sq.index() as usize],
        }
    }

    /// The embedded magic number for `sq`.
    #[inline]
    pub fn magic(self, sq: Square) -> u64 {
        match self {
            Slider::Rook => ROOK_MAGICS[sq.index() as usize],
            Slider::Bishop => BISHOP_MAGICS[sq.index() as usize],
        }
    }

    /// Reference attack computation, used to fill and verify the tables.
    #[inline]
    pub const fn attacks_slow(self, sq: Square, occupied: Bitboard) -> Bitboard {
        let sq = sq.index();
        let occ = occupied.0;
        let bits = match self {
            Slider::Rook => {
                line_attacks(sq, occ, file_mask_ex(sq), false)
                    | line_attacks(sq, occ, rank_mask_ex(sq), true)
            }
            Slider::Bishop => {
                line_attacks(sq, occ, diagonal_mask_ex(sq), false)
                    | line_attacks(sq, occ, anti_diagonal_mask_ex(sq), false)
            }
        };
        Bitboard(bits)
    }
}

/// Maps a blocker board to its slot in a square's lookup table.
#[inline]
pub const fn magic_index(mask: Bitboard, magic: u64, bits: u32, occupied: Bitboard) -> usize {
    ((occupied.0 & mask.0).wrapping_mul(magic) >> (64 - bits)) as usize
}

/// Iterates over every subset of `mask`, starting with the empty set.
///
/// Uses the Carry-Rippler trick, so a mask with n bits yields exactly 2^n boards.
pub fn blocker_subsets(mask: Bitboard) -> impl Iterator<Item = Bitboard> {
    let mut next = Some(Bitboard::EMPTY);
    std::iter::from_fn(move || {
        let current = next?;
        let following = current.0.wrapping_sub(mask.0) & mask.0;
        next = (following != 0).then_some(Bitboard(following));
        Some(current)
    })
}

/// Rook relevant-blocker masks.
pub static ROOK_MASKS: [Bitboard; 64] = compute_masks(Slider::Rook);

/// Bishop relevant-blocker masks.
pub static BISHOP_MASKS: [Bitboard; 64] = compute_masks(Slider::Bishop);

const RANK_1: u64 = 0x0000_0000_0000_00FF;
const RANK_8: u64 = 0xFF00_0000_0000_0000;
const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;
const MAIN_DIAGONAL: u64 = 0x8040_2010_0804_0201;
const MAIN_ANTI_DIAGONAL: u64 = 0x0102_0408_1020_4080;

const fn file_mask_ex(sq: u8) -> u64 {
    (FILE_A << (sq % 8)) ^ (1u64 << sq)
}

const fn rank_mask_ex(sq: u8) -> u64 {
    (RANK_1 << (sq & 56)) ^ (1u64 << sq)
}

const fn diagonal_mask_ex(sq: u8) -> u64 {
    let diagonal = (sq % 8) as i32 - (sq / 8) as i32;
    let line = if diagonal >= 0 {
        MAIN_DIAGONAL >> (diagonal * 8)
    } else {
        MAIN_DIAGONAL << (-diagonal * 8)
    };
    line ^ (1u64 << sq)
}

const fn anti_diagonal_mask_ex(sq: u8) -> u64 {
    let diagonal = 7 - (sq % 8) as i32 - (sq / 8) as i32;
    let line = if diagonal >= 0 {
        MAIN_ANTI_DIAGONAL >> (diagonal * 8)
    } else {
        MAIN_ANTI_DIAGONAL << (-diagonal * 8)
    };
    line ^ (1u64 << sq)
}

/// Obstruction difference along one line (hyperbola quintessence).
///
/// `line` must exclude `sq`. Files and diagonals hold at most one square per
/// rank, so a byte swap reverses them; ranks need a full bit reversal.
const fn line_attacks(sq: u8, occupied: u64, line: u64, is_rank: bool) -> u64 {
    let slider = 1u64 << sq;
    let mut forward = occupied & line;
    let mut backward = reverse(forward, is_rank);
    forward = forward.wrapping_sub(slider);
    backward = backward.wrapping_sub(reverse(slider, is_rank));
    forward ^= reverse(backward, is_rank);
    forward & line
}

const fn reverse(bits: u64, is_rank: bool) -> u64 {
    if is_rank {
        bits.reverse_bits()
    } else {
        bits.swap_bytes()
    }
}

const fn compute_masks(slider: Slider) -> [Bitboard; 64] {
    let mut masks = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let bits = match slider {
            Slider::Rook => {
                (file_mask_ex(sq) & !(RANK_1 | RANK_8)) | (rank_mask_ex(sq) & !(FILE_A | FILE_H))
            }
            Slider::Bishop => {
                (diagonal_mask_ex(sq) | anti_diagonal_mask_ex(sq))
                    & !(RANK_1 | RANK_8 | FILE_A | FILE_H)
            }
        };
        masks[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    masks
}

/// Dense attack tables for both sliders.
struct AttackTables {
    /// 64 x 2^12 entries.
    rook: Vec<Bitboard>,
    /// 64 x 2^9 entries.
    bishop: Vec<Bitboard>,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

fn attack_tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(|| {
        tracing::trace!("filling slider attack tables");
        AttackTables {
            rook: fill_table(Slider::Rook),
            bishop: fill_table(Slider::Bishop),
        }
    })
}

fn fill_table(slider: Slider) -> Vec<Bitboard> {
    let bits = slider.index_bits();
    let stride = 1usize << bits;
    let mut table = vec![Bitboard::EMPTY; 64 * stride];

    for sq in Square::all() {
        let mask = slider.mask(sq);
        let magic = slider.magic(sq);
        let base = sq.index() as usize * stride;
        for blockers in blocker_subsets(mask) {
            let attacks = slider.attacks_slow(sq, blockers);
            let slot = &mut table[base + magic_index(mask, magic, bits, blockers)];
            // Slider attacks are never empty, so an occupied slot holding a
            // different set means the magic does not separate these boards.
            debug_assert!(
                slot.is_empty() || *slot == attacks,
                "{slider:?} magic for {sq} maps two attack sets to one slot"
            );
            *slot = attacks;
        }
    }
    table
}

#[inline]
fn lookup(table: &[Bitboard], slider: Slider, sq: Square, occupied: Bitboard) -> Bitboard {
    let bits = slider.index_bits();
    let index = magic_index(slider.mask(sq), slider.magic(sq), bits, occupied);
    table[(sq.index() as usize) << bits | index]
}

/// Returns bishop attacks for a square given occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    lookup(&attack_tables().bishop, Slider::Bishop, sq, occupied)
}

/// Returns rook attacks for a square given occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    lookup(&attack_tables().rook, Slider::Rook, sq, occupied)
}

/// Returns queen attacks (bishop + rook).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}
