//! Piece placement: per-role and per-side bitboards, plus the FEN board
//! field codec.

use std::fmt;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::chess::attacks;
use crate::chess::core::{Piece, Rank, Role, Side, Square};
use crate::chess::square_set::SquareSet;

/// Piece placement on the 64 squares, represented as nine overlapping
/// [`SquareSet`]s: `occupied`, one per side, and one per role. Immutable;
/// [`Board::set_piece_at`] and [`Board::remove_piece_at`] return new boards.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Board {
    by_side: [SquareSet; 2],
    by_role: [SquareSet; 6],
}

impl Board {
    /// The empty board.
    pub const EMPTY: Self = Self {
        by_side: [SquareSet::EMPTY; 2],
        by_role: [SquareSet::EMPTY; 6],
    };

    /// The board set up for a new standard game.
    #[must_use]
    pub fn starting() -> Self {
        Self::from_fen_field("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
            .expect("starting board FEN is well-formed")
    }

    /// All occupied squares.
    #[must_use]
    pub fn occupied(&self) -> SquareSet {
        self.by_side[0] | self.by_side[1]
    }

    /// Squares occupied by `side`.
    #[must_use]
    pub fn by_side(&self, side: Side) -> SquareSet {
        self.by_side[side as usize]
    }

    /// Squares occupied by a piece of role `role`, of either side.
    #[must_use]
    pub fn by_role(&self, role: Role) -> SquareSet {
        self.by_role[role as usize]
    }

    /// Squares occupied by `piece`.
    #[must_use]
    pub fn by_piece(&self, piece: Piece) -> SquareSet {
        self.by_side(piece.side) & self.by_role(piece.role)
    }

    /// Squares occupied by a piece of role `role` belonging to `side`. Alias
    /// of [`Board::by_piece`] taking the pair the other way around.
    #[must_use]
    pub fn pieces_of(&self, side: Side, role: Role) -> SquareSet {
        self.by_piece(Piece::new(side, role))
    }

    /// The role of the piece on `square`, if any.
    #[must_use]
    pub fn role_at(&self, square: Square) -> Option<Role> {
        Role::iter().find(|&role| self.by_role(role).contains(square))
    }

    /// The side of the piece on `square`, if any.
    #[must_use]
    pub fn side_at(&self, square: Square) -> Option<Side> {
        if self.by_side(Side::White).contains(square) {
            Some(Side::White)
        } else if self.by_side(Side::Black).contains(square) {
            Some(Side::Black)
        } else {
            None
        }
    }

    /// The piece on `square`, if any.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        Some(Piece::new(self.side_at(square)?, self.role_at(square)?))
    }

    /// The square `side`'s king stands on, if present.
    #[must_use]
    pub fn king_of(&self, side: Side) -> Option<Square> {
        self.pieces_of(side, Role::King).single_square()
    }

    /// Number of pieces of `side`.
    #[must_use]
    pub fn material_count(&self, side: Side) -> u32 {
        self.by_side(side).len()
    }

    /// Returns a new board with `piece` placed on `square`, replacing
    /// whatever was previously there.
    #[must_use]
    pub fn set_piece_at(&self, square: Square, piece: Piece) -> Self {
        let mut board = self.remove_piece_at(square);
        board.by_side[piece.side as usize] = board.by_side[piece.side as usize].with(square);
        board.by_role[piece.role as usize] = board.by_role[piece.role as usize].with(square);
        board
    }

    /// Returns a new board with whatever piece stood on `square` removed.
    #[must_use]
    pub fn remove_piece_at(&self, square: Square) -> Self {
        let mut board = *self;
        for side_set in &mut board.by_side {
            *side_set = side_set.without(square);
        }
        for role_set in &mut board.by_role {
            *role_set = role_set.without(square);
        }
        board
    }

    /// Squares from which a piece of `attacker` attacks `square`, computed
    /// against `occupied` (which need not equal `self.occupied()`: callers
    /// use a hypothetical occupancy for castling-path and en-passant
    /// discovered-check queries).
    #[must_use]
    pub fn attacks_to(&self, square: Square, attacker: Side, occupied: SquareSet) -> SquareSet {
        let mut attackers = SquareSet::EMPTY;
        attackers |= attacks::pawn_attacks(square, attacker.opposite())
            & self.pieces_of(attacker, Role::Pawn);
        attackers |= attacks::knight_attacks(square) & self.pieces_of(attacker, Role::Knight);
        attackers |= attacks::king_attacks(square) & self.pieces_of(attacker, Role::King);
        let diagonal_sliders = self.pieces_of(attacker, Role::Bishop) | self.pieces_of(attacker, Role::Queen);
        attackers |= attacks::bishop_attacks(square, occupied) & diagonal_sliders;
        let orthogonal_sliders = self.pieces_of(attacker, Role::Rook) | self.pieces_of(attacker, Role::Queen);
        attackers |= attacks::rook_attacks(square, occupied) & orthogonal_sliders;
        attackers
    }

    /// Parses the board (first) field of a FEN string, e.g.
    /// `"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"`.
    pub fn from_fen_field(field: &str) -> Result<Self, BoardFenError> {
        let mut board = Self::EMPTY;
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(BoardFenError);
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = Rank::from_index(7 - u8::try_from(rank_from_top).map_err(|_| BoardFenError)?);
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(BoardFenError);
                    }
                    file += u8::try_from(skip).map_err(|_| BoardFenError)?;
                } else {
                    let piece = Piece::from_char(c).ok_or(BoardFenError)?;
                    if file >= 8 {
                        return Err(BoardFenError);
                    }
                    let square = Square::from_coords(crate::chess::core::File::from_index(file), rank);
                    board = board.set_piece_at(square, piece);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(BoardFenError);
            }
        }
        Ok(board)
    }

    /// Emits the board field of a FEN string.
    #[must_use]
    pub fn to_fen_field(&self) -> String {
        (0..8)
            .rev()
            .map(|rank_index| {
                let rank = Rank::from_index(rank_index);
                let mut rank_str = String::new();
                let mut empty_run = 0u8;
                for file_index in 0..8 {
                    let square = Square::from_coords(
                        crate::chess::core::File::from_index(file_index),
                        rank,
                    );
                    match self.piece_at(square) {
                        Some(piece) => {
                            if empty_run > 0 {
                                rank_str.push_str(&empty_run.to_string());
                                empty_run = 0;
                            }
                            rank_str.push(piece.to_char());
                        }
                        None => empty_run += 1,
                    }
                }
                if empty_run > 0 {
                    rank_str.push_str(&empty_run.to_string());
                }
                rank_str
            })
            .join("/")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// The board field did not parse as a valid FEN piece-placement string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid FEN board field")]
pub struct BoardFenError;

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank_index in (0..8).rev() {
            let rank = Rank::from_index(rank_index);
            for file_index in 0..8 {
                let square = Square::from_coords(crate::chess::core::File::from_index(file_index), rank);
                let c = self.piece_at(square).map_or('.', Piece::to_char);
                write!(f, "{c}")?;
                if file_index != 7 {
                    write!(f, " ")?;
                }
            }
            if rank_index != 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_field())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_board_fen_matches_spec_example() {
        assert_eq!(
            Board::starting().to_fen_field(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn board_fen_round_trips() {
        let fen = "r1bq1r2/3n2k1/p1p1pp2/3pP2P/8/PPNB2Q1/2P2P2/R3K3";
        let board = Board::from_fen_field(fen).unwrap();
        assert_eq!(board.to_fen_field(), fen);
    }

    #[test]
    fn invariants_hold_for_starting_position() {
        let board = Board::starting();
        assert_eq!(board.by_side(Side::White) | board.by_side(Side::Black), board.occupied());
        assert_eq!(board.by_side(Side::White) & board.by_side(Side::Black), SquareSet::EMPTY);
        assert_eq!(board.king_of(Side::White), Some(Square::E1));
        assert_eq!(board.king_of(Side::Black), Some(Square::E8));
        assert_eq!(board.material_count(Side::White), 16);
    }

    #[test]
    fn set_and_remove_piece_round_trip() {
        let board = Board::starting();
        let removed = board.remove_piece_at(Square::E2);
        assert_eq!(removed.piece_at(Square::E2), None);
        let restored = removed.set_piece_at(Square::E2, Piece::new(Side::White, Role::Pawn));
        assert_eq!(restored, board);
    }

    #[test]
    fn invalid_board_field_is_rejected() {
        assert_eq!(Board::from_fen_field("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP"), Err(BoardFenError));
        assert_eq!(Board::from_fen_field("rnbqkbnr/zzzzzzzz/8/8/8/8/PPPPPPPP/RNBQKBNR"), Err(BoardFenError));
    }
}
