//! Transposition table.
//!
//! A fixed-size, power-of-two array of slots indexed by the low bits of the
//! Zobrist key. Every store overwrites its slot; a probe only answers when the
//! full key matches. A slot whose key is zero is empty.

use std::collections::TryReserveError;

use chess_core::Move;
use thiserror::Error;

use super::{MATE, MAX_PLY};

/// Largest accepted table size, as a power of two (16 GiB of entries).
pub const MAX_TT_BITS: u8 = 30;

/// Errors from sizing a [`TranspositionTable`].
#[derive(Debug, Error)]
pub enum TtError {
    #[error("transposition table of 2^{bits} slots is too large (at most 2^{max})")]
    TooLarge { bits: u8, max: u8 },

    #[error("cannot allocate a transposition table of 2^{bits} slots: {source}")]
    Alloc {
        bits: u8,
        #[source]
        source: TryReserveError,
    },
}

/// How the stored score relates to the true value of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// The score is exact.
    Exact,
    /// The search failed high; the true score is at least this.
    LowerBound,
    /// No move raised alpha; the true score is at most this.
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    /// Full Zobrist key; zero marks an empty slot.
    pub key: u64,
    pub best_move: Move,
    /// Where `best_move` stood in the generator's output for this position.
    pub move_index: u8,
    /// Stored relative to the node, see [`score_to_tt`].
    pub score: i16,
    pub depth: u8,
    pub node_type: NodeType,
}

impl TtEntry {
    pub const EMPTY: TtEntry = TtEntry {
        key: 0,
        best_move: Move::NULL,
        move_index: 0,
        score: 0,
        depth: 0,
        node_type: NodeType::UpperBound,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key == 0
    }
}

/// Single-owner transposition table. A search borrows it mutably for its duration.
pub struct TranspositionTable {
    slots: Vec<TtEntry>,
    mask: u64,
}

impl TranspositionTable {
    /// Creates a table with `2^bits` slots.
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_TT_BITS`] or the allocation fails.
    /// Use [`TranspositionTable::try_new`] for sizes that come from users.
    pub fn new(bits: u8) -> Self {
        match Self::try_new(bits) {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a table with `2^bits` slots, reporting oversized or failed
    /// allocations instead of aborting.
    pub fn try_new(bits: u8) -> Result<Self, TtError> {
        if bits > MAX_TT_BITS {
            return Err(TtError::TooLarge {
                bits,
                max: MAX_TT_BITS,
            });
        }
        let capacity = 1usize << bits;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| TtError::Alloc { bits, source })?;
        slots.resize(capacity, TtEntry::EMPTY);
        tracing::debug!(bits, capacity, "allocated transposition table");
        Ok(TranspositionTable {
            slots,
            mask: capacity as u64 - 1,
        })
    }

    /// Creates the largest power-of-two table that fits in `megabytes`.
    pub fn with_size_mb(megabytes: usize) -> Self {
        let slot_size = std::mem::size_of::<TtEntry>();
        let slots = (megabytes * 1024 * 1024 / slot_size).max(1);
        Self::new((slots.ilog2() as u8).min(MAX_TT_BITS))
    }

    #[inline]
    fn slot(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    /// Returns the entry for `key`, if its slot currently holds that key.
    pub fn probe(&self, key: u64) -> Option<&TtEntry> {
        let entry = &self.slots[self.slot(key)];
        (!entry.is_empty() && entry.key == key).then_some(entry)
    }

    /// Stores `entry`, replacing whatever occupied its slot.
    pub fn store(&mut self, entry: TtEntry) {
        let slot = self.slot(entry.key);
        self.slots[slot] = entry;
    }

    pub fn clear(&mut self) {
        self.slots.fill(TtEntry::EMPTY);
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Per-mille of slots in use, sampled over the first thousand slots.
    pub fn occupancy_permille(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample].iter().filter(|s| !s.is_empty()).count();
        (used * 1000 / sample) as u32
    }
}

/// Scores at least this far from zero encode a forced mate.
const MATE_BOUND: i32 = MATE - MAX_PLY as i32;

/// Converts a root-relative mate score into one relative to the node at `ply`.
pub fn score_to_tt(score: i32, ply: u32) -> i16 {
    let relative = if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    };
    relative.clamp(-MATE, MATE) as i16
}

/// Inverse of [`score_to_tt`] for a probe at `ply`.
pub fn score_from_tt(score: i16, ply: u32) -> i32 {
    let score = i32::from(score);
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}
