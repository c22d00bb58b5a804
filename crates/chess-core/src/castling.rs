//! Per-player castling rights.

/// Castling rights held by one player.
///
/// Bit 0 is the kingside right, bit 1 the queenside right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CastleRights {
    #[default]
    None = 0,
    Kingside = 1,
    Queenside = 2,
    Both = 3,
}

impl CastleRights {
    /// Builds rights from the two individual flags.
    #[inline]
    pub const fn from_flags(kingside: bool, queenside: bool) -> Self {
        match (kingside, queenside) {
            (false, false) => CastleRights::None,
            (true, false) => CastleRights::Kingside,
            (false, true) => CastleRights::Queenside,
            (true, true) => CastleRights::Both,
        }
    }

    #[inline]
    pub const fn kingside(self) -> bool {
        (self as u8) & 1 != 0
    }

    #[inline]
    pub const fn queenside(self) -> bool {
        (self as u8) & 2 != 0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, CastleRights::None)
    }

    #[inline]
    pub const fn without_kingside(self) -> Self {
        Self::from_flags(false, self.queenside())
    }

    #[inline]
    pub const fn without_queenside(self) -> Self {
        Self::from_flags(self.kingside(), false)
    }
}
