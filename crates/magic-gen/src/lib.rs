//! Offline search for magic multipliers.
//!
//! A magic for a square maps every blocker subset of the square's mask to a
//! table slot such that subsets sharing a slot also share their attack set.
//! Candidates are sparse random numbers (the AND of three draws), checked
//! against every subset. The results are written out as Rust source and
//! compiled into the engine; nothing here runs at engine start-up.
//!
//! One seeded generator is shared across all squares, rooks first, so a seed
//! fully determines both tables.

use std::fmt::Write;

use chess_core::Square;
use chess_engine::movegen::magics::{blocker_subsets, magic_index, Slider};
use chess_engine::Bitboard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed the engine's checked-in tables come from.
pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;

/// A verified magic for one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicEntry {
    pub square: Square,
    pub slider: Slider,
    pub mask: Bitboard,
    pub magic: u64,
    pub bits: u32,
    /// Candidates drawn before this one succeeded.
    pub attempts: u64,
}

/// Every blocker subset of the square's mask, paired with its true attack set.
fn reference_attacks(square: Square, slider: Slider) -> Vec<(Bitboard, Bitboard)> {
    blocker_subsets(slider.mask(square))
        .map(|blockers| (blockers, slider.attacks_slow(square, blockers)))
        .collect()
}

/// Scratch table for collision checks. Each slot remembers the attempt that
/// last wrote it, so a new attempt starts from an empty table without clearing.
struct TrialTable {
    slots: Vec<(u64, Bitboard)>,
    attempt: u64,
}

impl TrialTable {
    fn new(bits: u32) -> Self {
        TrialTable {
            slots: vec![(0, Bitboard::EMPTY); 1 << bits],
            attempt: 0,
        }
    }

    /// Reports whether `magic` maps no two subsets with different attack
    /// sets to the same slot.
    fn fills_cleanly(
        &mut self,
        reference: &[(Bitboard, Bitboard)],
        mask: Bitboard,
        magic: u64,
        bits: u32,
    ) -> bool {
        self.attempt += 1;
        for &(blockers, attacks) in reference {
            let slot = &mut self.slots[magic_index(mask, magic, bits, blockers)];
            if slot.0 != self.attempt {
                *slot = (self.attempt, attacks);
            } else if slot.1 != attacks {
                return false;
            }
        }
        true
    }
}

/// Draws candidates from `rng` until one indexes `square`'s table without
/// destructive collisions.
pub fn find_magic<R: Rng + ?Sized>(square: Square, slider: Slider, rng: &mut R) -> MagicEntry {
    let mask = slider.mask(square);
    let bits = slider.index_bits();
    let reference = reference_attacks(square, slider);
    let mut table = TrialTable::new(bits);
    let mut attempts = 0u64;

    loop {
        attempts += 1;
        let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        // Too few high bits in the product can never spread the mask over the index.
        if (mask.0.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        if table.fills_cleanly(&reference, mask, magic, bits) {
            return MagicEntry {
                square,
                slider,
                mask,
                magic,
                bits,
                attempts,
            };
        }
    }
}

/// Checks `magic` for `square` against every blocker subset.
pub fn verify_magic(square: Square, slider: Slider, magic: u64) -> bool {
    let bits = slider.index_bits();
    TrialTable::new(bits).fills_cleanly(
        &reference_attacks(square, slider),
        slider.mask(square),
        magic,
        bits,
    )
}

/// Both multiplier tables, indexed by square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicTables {
    pub seed: u64,
    pub rook: [u64; 64],
    pub bishop: [u64; 64],
}

/// Finds a magic for every square, rooks then bishops, from one generator
/// seeded with `seed`.
pub fn generate(seed: u64) -> MagicTables {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tables = MagicTables {
        seed,
        rook: [0; 64],
        bishop: [0; 64],
    };

    for slider in Slider::ALL {
        let table = match slider {
            Slider::Rook => &mut tables.rook,
            Slider::Bishop => &mut tables.bishop,
        };
        let mut total_attempts = 0;
        for sq in Square::all() {
            let entry = find_magic(sq, slider, &mut rng);
            tracing::debug!(
                ?slider,
                square = %sq,
                magic = format_args!("{:#018x}", entry.magic),
                attempts = entry.attempts,
                "found magic"
            );
            total_attempts += entry.attempts;
            table[sq.index() as usize] = entry.magic;
        }
        tracing::info!(?slider, total_attempts, "all squares done");
    }
    tables
}

/// Parses a seed written in decimal or as `0x`-prefixed hex, underscores allowed.
pub fn parse_seed(text: &str) -> Result<u64, std::num::ParseIntError> {
    let digits = text.replace('_', "");
    match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse(),
    }
}

/// Renders the engine's `magic_numbers.rs` for the given tables.
pub fn render_source(tables: &MagicTables) -> String {
    let mut out = String::new();
    out.push_str("// Generated by `magic-gen`. Do not edit by hand.\n");
    out.push_str(&format!(
        "// Regenerate with: cargo run --release -p magic-gen -- --seed {seed:#010x} \
         --output crates/chess-engine/src/movegen/magic_numbers.rs\n\n",
        seed = tables.seed
    ));
    out.push_str(&format!(
        "/// Seed `magic-gen` produced these tables from.\n\
         pub const MAGIC_SEED: u64 = {seed:#010x};\n\n",
        seed = tables.seed
    ));
    out.push_str(&format!(
        "/// Index width of every rook lookup table (2^{bits} entries per square).\n\
         pub const ROOK_INDEX_BITS: u32 = {bits};\n\n",
        bits = Slider::Rook.index_bits()
    ));
    out.push_str(&format!(
        "/// Index width of every bishop lookup table (2^{bits} entries per square).\n\
         pub const BISHOP_INDEX_BITS: u32 = {bits};\n\n",
        bits = Slider::Bishop.index_bits()
    ));
    render_table(&mut out, "ROOK_MAGICS", &tables.rook);
    out.push('\n');
    render_table(&mut out, "BISHOP_MAGICS", &tables.bishop);
    out
}

fn render_table(out: &mut String, name: &str, magics: &[u64; 64]) {
    out.push_str("#[rustfmt::skip]\n");
    out.push_str(&format!("pub const {name}: [u64; 64] = [\n"));
    for row in magics.chunks(4) {
        let cells: Vec<String> = row.iter().map(|m| format!("0x{m:016x}")).collect();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "    {},", cells.join(", "));
    }
    out.push_str("];\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::movegen::magics::MAGIC_SEED;

    fn embedded(slider: Slider) -> [u64; 64] {
        let mut magics = [0u64; 64];
        for sq in Square::all() {
            magics[sq.index() as usize] = slider.magic(sq);
        }
        magics
    }

    fn embedded_tables() -> MagicTables {
        MagicTables {
            seed: MAGIC_SEED,
            rook: embedded(Slider::Rook),
            bishop: embedded(Slider::Bishop),
        }
    }

    #[test]
    fn embedded_magics_verify() {
        for slider in Slider::ALL {
            for sq in Square::all() {
                assert!(verify_magic(sq, slider, slider.magic(sq)), "{slider:?} {sq}");
            }
        }
    }

    #[test]
    fn zero_is_not_a_magic() {
        assert!(!verify_magic(Square::A1, Slider::Rook, 0));
        assert!(!verify_magic(Square::C1, Slider::Bishop, 0));
    }

    #[test]
    fn found_magics_verify() {
        let mut rng = StdRng::seed_from_u64(7);
        for (slider, sq) in [
            (Slider::Bishop, Square::A1),
            (Slider::Bishop, Square::from_algebraic("d4").unwrap()),
            (Slider::Rook, Square::from_algebraic("e5").unwrap()),
        ] {
            let entry = find_magic(sq, slider, &mut rng);
            assert_eq!(entry.square, sq);
            assert_eq!(entry.bits, slider.index_bits());
            assert!(entry.attempts >= 1);
            assert!(verify_magic(sq, slider, entry.magic));
        }
    }

    #[test]
    fn search_is_reproducible_for_a_seed() {
        let sq = Square::from_algebraic("c6").unwrap();
        let a = find_magic(sq, Slider::Bishop, &mut StdRng::seed_from_u64(42));
        let b = find_magic(sq, Slider::Bishop, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn checked_in_seed_reproduces_the_first_rook_magics() {
        assert_eq!(MAGIC_SEED, DEFAULT_SEED);
        let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
        for sq in [Square::A1, Square::B1, Square::C1] {
            let entry = find_magic(sq, Slider::Rook, &mut rng);
            assert_eq!(entry.magic, Slider::Rook.magic(sq), "rook {sq}");
        }
    }

    #[test]
    #[ignore = "searches all 128 squares"]
    fn checked_in_seed_reproduces_the_engine_file() {
        let generated = generate(MAGIC_SEED);
        assert_eq!(generated, embedded_tables());
        let on_disk = include_str!("../../chess-engine/src/movegen/magic_numbers.rs");
        assert_eq!(render_source(&generated), on_disk);
    }

    #[test]
    fn rendered_source_matches_the_engine_file() {
        let on_disk = include_str!("../../chess-engine/src/movegen/magic_numbers.rs");
        assert_eq!(render_source(&embedded_tables()), on_disk);
    }

    #[test]
    fn seeds_parse_in_decimal_and_hex() {
        assert_eq!(parse_seed("42"), Ok(42));
        assert_eq!(parse_seed("0x00c0ffee"), Ok(DEFAULT_SEED));
        assert_eq!(parse_seed("0x00C0_FFEE"), Ok(DEFAULT_SEED));
        assert!(parse_seed("0xzz").is_err());
        assert!(parse_seed("").is_err());
    }
}
