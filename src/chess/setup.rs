//! The un-validated position record and its FEN codec.

use crate::chess::board::Board;
use crate::chess::core::{File, Role, Side, Square};
use crate::chess::square_set::SquareSet;

/// A position record that is not required to be legal: board placement,
/// side to move, castling-eligible rooks, en-passant target, move counters
/// and (opaque) remaining-checks metadata, exactly as parsed from FEN.
///
/// [`crate::chess::position::Position`] is built from a `Setup` by
/// validating it; an illegal `Setup` (e.g. with the side not to move in
/// check) is rejected at that point, not here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Setup {
    pub board: Board,
    pub turn: Side,
    pub unmoved_rooks: SquareSet,
    pub ep_square: Option<Square>,
    pub halfmoves: u32,
    pub fullmoves: u32,
    pub remaining_checks: Option<[u32; 2]>,
}

impl Setup {
    /// The setup for a new standard game.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            board: Board::starting(),
            turn: Side::White,
            unmoved_rooks: SquareSet::CORNERS & SquareSet::BACKRANKS,
            ep_square: None,
            halfmoves: 0,
            fullmoves: 1,
            remaining_checks: None,
        }
    }

    /// Parses a FEN string: `board turn castling ep halfmoves fullmoves
    /// [remainingChecks]`, or, with `remainingChecks` preceding
    /// `halfmoves`, `board turn castling ep remainingChecks halfmoves
    /// fullmoves`. Runs of whitespace or underscores separate fields;
    /// missing trailing fields default to `w - - 0 1`.
    pub fn parse_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|s| !s.is_empty())
            .collect();
        if fields.is_empty() {
            return Err(FenError::Fen);
        }
        let board = Board::from_fen_field(fields[0]).map_err(|_| FenError::Board)?;
        let turn = match fields.get(1).copied().unwrap_or("w") {
            "w" => Side::White,
            "b" => Side::Black,
            _ => return Err(FenError::Turn),
        };
        let unmoved_rooks = parse_castling_field(fields.get(2).copied().unwrap_or("-"), &board)?;
        let ep_square = parse_ep_field(fields.get(3).copied().unwrap_or("-"))?;

        // Detect whether remainingChecks (format "n+n" or "n n") precedes
        // halfmoves, which is the alternate field ordering this parser
        // must also accept.
        let rest = &fields[4.min(fields.len())..];
        let (remaining_checks, rest) = parse_leading_remaining_checks(rest)?;
        let halfmoves = rest
            .first()
            .map_or(Ok(0), |s| s.parse().map_err(|_| FenError::Halfmoves))?;
        let fullmoves = rest
            .get(1)
            .map_or(Ok(1), |s| s.parse().map_err(|_| FenError::Fullmoves))?;
        let remaining_checks = match remaining_checks {
            Some(checks) => Some(checks),
            None => parse_trailing_remaining_checks(rest.get(2).copied())?,
        };

        Ok(Self {
            board,
            turn,
            unmoved_rooks,
            ep_square,
            halfmoves,
            fullmoves,
            remaining_checks,
        })
    }

    /// Emits a FEN string in canonical field order, clamping `halfmoves`
    /// to `[0, 9999]` and `fullmoves` to `[1, 9999]`.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = format!(
            "{} {} {} {}",
            self.board.to_fen_field(),
            if self.turn == Side::White { "w" } else { "b" },
            self.castling_field(),
            self.ep_square.map_or_else(|| "-".to_string(), |sq| sq.to_algebraic()),
        );
        fen.push_str(&format!(
            " {} {}",
            self.halfmoves.min(9999),
            self.fullmoves.clamp(1, 9999)
        ));
        if let Some([white, black]) = self.remaining_checks {
            fen.push_str(&format!(" {white}+{black}"));
        }
        fen
    }

    fn castling_field(&self) -> String {
        use crate::chess::core::CastlingSide;

        if self.unmoved_rooks.is_empty() {
            return "-".to_string();
        }
        let castles = crate::chess::castles::Castles::from_setup(&self.board, self.unmoved_rooks);
        let mut field = String::new();
        for (side, upper) in [(Side::White, true), (Side::Black, false)] {
            for castling_side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
                let Some(rook) = castles.rook_of(side, castling_side) else {
                    continue;
                };
                let outermost = outermost_rook_on_board(&self.board, side, castling_side) == Some(rook);
                let c = if outermost {
                    match castling_side {
                        CastlingSide::KingSide => 'k',
                        CastlingSide::QueenSide => 'q',
                    }
                } else {
                    rook.file().to_char()
                };
                field.push(if upper { c.to_ascii_uppercase() } else { c });
            }
        }
        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }
}

/// The rook that a symbolic `K`/`Q` castling letter would resolve to for
/// `side`/`castling_side`: the outermost rook physically on the board's
/// backrank flanking the king, regardless of whether it still has
/// castling rights. Used both to parse symbolic letters and to decide,
/// on emission, whether the recorded right still matches what a symbolic
/// letter would mean (and thus whether `KQkq` notation is safe to emit).
fn outermost_rook_on_board(
    board: &Board,
    side: Side,
    castling_side: crate::chess::core::CastlingSide,
) -> Option<Square> {
    let king = board.king_of(side)?;
    let rooks = board.pieces_of(side, Role::Rook) & SquareSet::rank(side.backrank());
    match castling_side {
        crate::chess::core::CastlingSide::KingSide => rooks.iter_descending().find(|&sq| sq > king),
        crate::chess::core::CastlingSide::QueenSide => rooks.iter_ascending().find(|&sq| sq < king),
    }
}

fn parse_castling_field(field: &str, board: &Board) -> Result<SquareSet, FenError> {
    if field == "-" {
        return Ok(SquareSet::EMPTY);
    }
    let mut unmoved_rooks = SquareSet::EMPTY;
    for c in field.chars() {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let backrank = side.backrank();
        let lower = c.to_ascii_lowercase();
        let square = if lower == 'k' || lower == 'q' {
            let castling_side = if lower == 'k' {
                crate::chess::core::CastlingSide::KingSide
            } else {
                crate::chess::core::CastlingSide::QueenSide
            };
            outermost_rook_on_board(board, side, castling_side).ok_or(FenError::Castling)?
        } else if ('a'..='h').contains(&lower) {
            let file = File::from_char(lower).ok_or(FenError::Castling)?;
            Square::from_coords(file, backrank)
        } else {
            return Err(FenError::Castling);
        };
        unmoved_rooks = unmoved_rooks.with(square);
    }
    for side in [Side::White, Side::Black] {
        if (unmoved_rooks & SquareSet::rank(side.backrank())).len() > 2 {
            return Err(FenError::Castling);
        }
    }
    Ok(unmoved_rooks)
}

fn parse_ep_field(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    Square::from_algebraic(field).map(Some).ok_or(FenError::EpSquare)
}

fn parse_leading_remaining_checks(rest: &[&str]) -> Result<(Option<[u32; 2]>, &[&str]), FenError> {
    match rest.first() {
        Some(field) if field.contains('+') => {
            Ok((Some(parse_remaining_checks(field)?), &rest[1..]))
        }
        _ => Ok((None, rest)),
    }
}

fn parse_trailing_remaining_checks(field: Option<&str>) -> Result<Option<[u32; 2]>, FenError> {
    field.map(parse_remaining_checks).transpose()
}

fn parse_remaining_checks(field: &str) -> Result<[u32; 2], FenError> {
    let (white, black) = field.split_once('+').ok_or(FenError::RemainingChecks)?;
    let white: u32 = white.parse().map_err(|_| FenError::RemainingChecks)?;
    let black: u32 = black.parse().map_err(|_| FenError::RemainingChecks)?;
    Ok([white, black])
}

/// FEN parsing failures, one variant per field that can go wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FenError {
    /// The board (piece-placement) field is malformed.
    #[error("invalid board field")]
    Board,
    /// The side-to-move field is neither `w` nor `b`.
    #[error("invalid turn field")]
    Turn,
    /// The castling field has an invalid character or more than two
    /// unmoved rooks on a backrank.
    #[error("invalid castling field")]
    Castling,
    /// The en-passant field is not `-` or a valid algebraic square.
    #[error("invalid en passant field")]
    EpSquare,
    /// The halfmove clock is not a valid non-negative integer.
    #[error("invalid halfmove clock field")]
    Halfmoves,
    /// The fullmove number is not a valid positive integer.
    #[error("invalid fullmove number field")]
    Fullmoves,
    /// The remaining-checks field is malformed.
    #[error("invalid remaining checks field")]
    RemainingChecks,
    /// The FEN string as a whole could not be split into fields.
    #[error("malformed FEN string")]
    Fen,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_fen_round_trips() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let setup = Setup::parse_fen(fen).unwrap();
        assert_eq!(setup.to_fen(), fen);
    }

    #[test]
    fn missing_trailing_fields_default() {
        let setup = Setup::parse_fen("8/8/8/8/8/8/8/4K2k").unwrap();
        assert_eq!(setup.turn, Side::White);
        assert_eq!(setup.unmoved_rooks, SquareSet::EMPTY);
        assert_eq!(setup.ep_square, None);
        assert_eq!(setup.halfmoves, 0);
        assert_eq!(setup.fullmoves, 1);
    }

    #[test]
    fn shredder_castling_letters_round_trip_to_kqkq_when_outermost() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w HAha - 0 1";
        let setup = Setup::parse_fen(fen).unwrap();
        assert_eq!(setup.unmoved_rooks, SquareSet::CORNERS & SquareSet::BACKRANKS);
        assert_eq!(
            setup.to_fen(),
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"
        );
    }

    #[test]
    fn non_outermost_rook_forces_shredder_emission() {
        let fen = "1r2k2r/8/8/8/8/8/8/1R2K2R w HB - 0 1";
        let setup = Setup::parse_fen(fen).unwrap();
        assert_eq!(setup.to_fen(), fen);
    }

    #[test]
    fn too_many_unmoved_rooks_on_a_backrank_is_rejected() {
        assert_eq!(
            Setup::parse_fen("r1r1k2r/8/8/8/8/8/8/4K3 w haq - 0 1"),
            Err(FenError::Castling)
        );
    }

    #[test]
    fn remaining_checks_field_is_carried_through() {
        let setup = Setup::parse_fen(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 3+1 0 1",
        )
        .unwrap();
        assert_eq!(setup.remaining_checks, Some([3, 1]));
    }
}
