//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::{CastleRights, Color, ColoredPiece, File, Piece, Rank, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("the {0} king is missing from the board")]
    MissingKing(Color),
}

/// A parsed FEN record.
///
/// All six fields are decoded into typed values; the engine builds its
/// position representation from this and produces one to serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Occupant of each square, indexed a1 = 0 .. h8 = 63.
    pub board: [Option<ColoredPiece>; 64],
    pub active_color: Color,
    /// Castling rights indexed by [`Color::index`].
    pub castling: [CastleRights; 2],
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let board = Self::parse_placement(parts[0])?;

        let active_color = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = Self::parse_castling(parts[2])?;
        let en_passant = Self::parse_en_passant(parts[3], active_color, &board)?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
        let fullmove_number = parts[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(Fen {
            board,
            active_color,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(placement: &str) -> Result<[Option<ColoredPiece>; 64], FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = [None; 64];
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_text.chars() {
                if let Some(run) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += run as usize;
                } else if let Some(occupant) = ColoredPiece::from_fen_char(c) {
                    if file < 8 {
                        board[rank * 8 + file] = Some(occupant);
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank + 1,
                    file
                )));
            }
        }

        for color in Color::ALL {
            let king = Some(ColoredPiece::new(Piece::King, color));
            if !board.contains(&king) {
                return Err(FenError::MissingKing(color));
            }
        }

        Ok(board)
    }

    fn parse_castling(castling: &str) -> Result<[CastleRights; 2], FenError> {
        if castling == "-" {
            return Ok([CastleRights::None; 2]);
        }
        if castling.is_empty() {
            return Err(FenError::InvalidCastlingRights(castling.to_string()));
        }

        let mut flags = [[false; 2]; 2];
        for c in castling.chars() {
            let (color, side) = match c {
                'K' => (Color::White, 0),
                'Q' => (Color::White, 1),
                'k' => (Color::Black, 0),
                'q' => (Color::Black, 1),
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}'",
                        c
                    )))
                }
            };
            flags[color.index()][side] = true;
        }

        Ok(flags.map(|[kingside, queenside]| CastleRights::from_flags(kingside, queenside)))
    }

    /// The target square must sit behind a pawn of the side not to move that
    /// could just have made a double push.
    fn parse_en_passant(
        ep: &str,
        active_color: Color,
        board: &[Option<ColoredPiece>; 64],
    ) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }
        let Some(target) = Square::from_algebraic(ep) else {
            return Err(FenError::InvalidEnPassantSquare(ep.to_string()));
        };

        let them = active_color.opposite();
        let expected_rank = match active_color {
            Color::White => Rank::R6,
            Color::Black => Rank::R3,
        };
        if target.rank() != expected_rank {
            return Err(FenError::InvalidEnPassantSquare(format!(
                "{ep} is not on rank {expected_rank} with {active_color} to move"
            )));
        }
        if board[target.index() as usize].is_some() {
            return Err(FenError::InvalidEnPassantSquare(format!("{ep} is occupied")));
        }

        let pushed_pawn = target
            .offset(them.pawn_push())
            .and_then(|sq| board[sq.index() as usize]);
        if pushed_pawn != Some(ColoredPiece::new(Piece::Pawn, them)) {
            return Err(FenError::InvalidEnPassantSquare(format!(
                "no {them} pawn in front of {ep}"
            )));
        }
        Ok(Some(target))
    }

    /// The piece-placement field alone.
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in Rank::ALL.iter().rev() {
            let mut empty_run = 0;
            for file in File::ALL {
                let sq = Square::new(file, *rank);
                match self.board[sq.index() as usize] {
                    Some(occupant) => {
                        if empty_run > 0 {
                            out.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        out.push(occupant.to_fen_char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
            }
            if *rank != Rank::R1 {
                out.push('/');
            }
        }
        out
    }

    fn castling_field(&self) -> String {
        let mut out = String::new();
        for color in Color::ALL {
            let rights = self.castling[color.index()];
            let (k, q) = match color {
                Color::White => ('K', 'Q'),
                Color::Black => ('k', 'q'),
            };
            if rights.kingside() {
                out.push(k);
            }
            if rights.queenside() {
                out.push(q);
            }
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let en_passant = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement(),
            self.active_color.fen_char(),
            self.castling_field(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl FromStr for Fen {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fen::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINGS_ONLY: &str = "4k3/8/8/8/8/8/8/4K3";

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(Fen::STARTPOS).unwrap();
        assert_eq!(fen.active_color, Color::White);
        assert_eq!(fen.castling, [CastleRights::Both; 2]);
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(
            fen.board[Square::E1.index() as usize],
            Some(ColoredPiece::new(Piece::King, Color::White))
        );
        assert_eq!(
            fen.board[Square::A8.index() as usize],
            Some(ColoredPiece::new(Piece::Rook, Color::Black))
        );
        assert_eq!(fen.board[28], None);
    }

    #[test]
    fn parse_custom_position() {
        let fen = Fen::parse("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
        assert_eq!(fen.halfmove_clock, 2);
        assert_eq!(fen.fullmove_number, 3);
    }

    #[test]
    fn roundtrip() {
        for original in [
            Fen::STARTPOS,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            assert_eq!(Fen::parse(original).unwrap().to_string(), original);
        }
    }

    #[test]
    fn partial_castling() {
        let fen = Fen::parse(&format!("{KINGS_ONLY} w Kq - 0 1")).unwrap();
        assert_eq!(fen.castling, [CastleRights::Kingside, CastleRights::Queenside]);
        assert!(fen.to_string().contains(" Kq "));
    }

    #[test]
    fn en_passant_square() {
        let fen = Fen::parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(fen.en_passant, Square::from_algebraic("d6"));
        let fen = Fen::parse("4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1").unwrap();
        assert_eq!(fen.en_passant, Square::from_algebraic("d3"));
    }

    #[test]
    fn invalid_part_count_and_color() {
        assert_eq!(Fen::parse("invalid"), Err(FenError::InvalidPartCount(1)));
        assert!(matches!(
            Fen::parse(&format!("{KINGS_ONLY} x KQkq - 0 1")),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        for placement in [
            "8/8/8/8/8/8/8",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR",
            "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "4k3/8/8/8/8/8/8/4K30",
        ] {
            assert!(
                matches!(
                    Fen::parse(&format!("{placement} w - - 0 1")),
                    Err(FenError::InvalidPiecePlacement(_))
                ),
                "{placement}"
            );
        }
    }

    #[test]
    fn missing_king_is_rejected() {
        assert_eq!(
            Fen::parse("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::MissingKing(Color::Black))
        );
        assert_eq!(
            Fen::parse("4k3/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::MissingKing(Color::White))
        );
    }

    #[test]
    fn invalid_castling_rights() {
        assert!(matches!(
            Fen::parse(&format!("{KINGS_ONLY} w XYZ - 0 1")),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn invalid_en_passant() {
        for ep in ["abc", "x3", "e4"] {
            assert!(matches!(
                Fen::parse(&format!("{KINGS_ONLY} w - {ep} 0 1")),
                Err(FenError::InvalidEnPassantSquare(_))
            ));
        }
    }

    #[test]
    fn en_passant_rank_must_match_side_to_move() {
        // A rank-3 target with White to move would let White take its own pawn.
        for fen in [
            "4k3/8/8/8/8/8/3PP3/4K3 w - e3 0 1",
            "4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1",
            "4k3/8/8/4p3/8/8/8/4K3 b - e6 0 1",
        ] {
            assert!(
                matches!(Fen::parse(fen), Err(FenError::InvalidEnPassantSquare(_))),
                "{fen}"
            );
        }
    }

    #[test]
    fn en_passant_needs_the_pushed_pawn() {
        for fen in [
            // nothing in front of the target
            "4k3/8/8/8/8/8/8/4K3 w - d6 0 1",
            // our own pawn instead of the opponent's
            "4k3/8/8/3P4/8/8/8/4K3 w - d6 0 1",
            // an enemy piece that is not a pawn
            "4k3/8/8/3n4/8/8/8/4K3 w - d6 0 1",
            "4k3/8/8/8/3N4/8/8/4K3 b - d3 0 1",
        ] {
            assert!(
                matches!(Fen::parse(fen), Err(FenError::InvalidEnPassantSquare(_))),
                "{fen}"
            );
        }
    }

    #[test]
    fn en_passant_target_must_be_empty() {
        assert!(matches!(
            Fen::parse("4k3/8/3n4/3p4/8/8/8/4K3 w - d6 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            Fen::parse(&format!("{KINGS_ONLY} w - - abc 1")),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse(&format!("{KINGS_ONLY} w - - 0 xyz")),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn fen_error_display() {
        assert!(FenError::InvalidPartCount(3).to_string().contains('3'));
        assert!(FenError::InvalidEnPassantSquare("z9".to_string())
            .to_string()
            .contains("z9"));
        assert_eq!(
            FenError::MissingKing(Color::Black).to_string(),
            "the Black king is missing from the board"
        );
    }
}
