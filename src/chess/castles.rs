//! Castling rights: which rooks have not moved, and the derived rook
//! origin squares and path masks used by the move generator and FEN
//! castling-field codec.

use crate::chess::attacks;
use crate::chess::board::Board;
use crate::chess::core::{CastlingSide, Role, Side, Square};
use crate::chess::square_set::SquareSet;

/// Castling rights, derived from a board and the set of rooks that have
/// never moved (and never been captured). At most one rook per side per
/// [`CastlingSide`] is tracked: the outermost rook flanking the king on
/// that side, per the Shredder-FEN convention.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Castles {
    unmoved_rooks: SquareSet,
    rook: [[Option<Square>; 2]; 2],
    path: [[SquareSet; 2]; 2],
}

impl Castles {
    /// No castling rights at all.
    pub const EMPTY: Self = Self {
        unmoved_rooks: SquareSet::EMPTY,
        rook: [[None; 2]; 2],
        path: [[SquareSet::EMPTY; 2]; 2],
    };

    /// Full rights for the standard starting position.
    #[must_use]
    pub fn starting() -> Self {
        Self::from_setup(&Board::starting(), SquareSet::CORNERS & SquareSet::BACKRANKS)
    }

    /// Derives castling rights by scanning each side's backrank,
    /// intersected with `unmoved_rooks`, for rooks flanking that side's
    /// king. If the king is absent from its backrank, no rights are
    /// recorded for that side.
    #[must_use]
    pub fn from_setup(board: &Board, unmoved_rooks: SquareSet) -> Self {
        let mut castles = Self {
            unmoved_rooks,
            ..Self::EMPTY
        };
        for side in [Side::White, Side::Black] {
            let Some(king) = board.king_of(side) else {
                continue;
            };
            if king.rank() != side.backrank() {
                continue;
            }
            let rooks =
                board.pieces_of(side, Role::Rook) & unmoved_rooks & SquareSet::rank(side.backrank());
            let queenside_rook = rooks.iter_ascending().find(|&sq| sq < king);
            let kingside_rook = rooks.iter_descending().find(|&sq| sq > king);
            if let Some(rook) = queenside_rook {
                castles.add(side, CastlingSide::QueenSide, king, rook);
            }
            if let Some(rook) = kingside_rook {
                castles.add(side, CastlingSide::KingSide, king, rook);
            }
        }
        castles
    }

    fn add(&mut self, side: Side, castling_side: CastlingSide, king: Square, rook: Square) {
        let king_to = Square::from_coords(castling_side.king_to_file(), side.backrank());
        let rook_to = Square::from_coords(castling_side.rook_to_file(), side.backrank());
        let path = (attacks::between(king, king_to)
            | attacks::between(rook, rook_to)
            | SquareSet::from_square(king_to)
            | SquareSet::from_square(rook_to))
        .without(king)
        .without(rook);
        self.rook[side as usize][castling_side as usize] = Some(rook);
        self.path[side as usize][castling_side as usize] = path;
    }

    /// The rook origin square for `side`'s `castling_side` right, if it
    /// exists.
    #[must_use]
    pub fn rook_of(&self, side: Side, castling_side: CastlingSide) -> Option<Square> {
        self.rook[side as usize][castling_side as usize]
    }

    /// The squares that must be empty (excluding king and rook origins) for
    /// `side` to castle to `castling_side`. Empty if the right does not
    /// exist.
    #[must_use]
    pub fn path_of(&self, side: Side, castling_side: CastlingSide) -> SquareSet {
        self.path[side as usize][castling_side as usize]
    }

    /// The full set of rooks tracked as "unmoved", regardless of whether
    /// they currently anchor a recorded right (a rook that is not the
    /// outermost on its backrank is still "unmoved" but grants no right).
    #[must_use]
    pub const fn unmoved_rooks(&self) -> SquareSet {
        self.unmoved_rooks
    }

    /// Clears whichever right (if any) has its rook on `square`.
    #[must_use]
    pub fn discard_rook_at(&self, square: Square) -> Self {
        let mut castles = *self;
        castles.unmoved_rooks = castles.unmoved_rooks.without(square);
        for side in [Side::White, Side::Black] {
            for castling_side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
                if castles.rook_of(side, castling_side) == Some(square) {
                    castles.rook[side as usize][castling_side as usize] = None;
                    castles.path[side as usize][castling_side as usize] = SquareSet::EMPTY;
                }
            }
        }
        castles
    }

    /// Clears both of `side`'s castling rights.
    #[must_use]
    pub fn discard_side(&self, side: Side) -> Self {
        let mut castles = *self;
        for castling_side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
            if let Some(rook) = castles.rook_of(side, castling_side) {
                castles.unmoved_rooks = castles.unmoved_rooks.without(rook);
            }
            castles.rook[side as usize][castling_side as usize] = None;
            castles.path[side as usize][castling_side as usize] = SquareSet::EMPTY;
        }
        castles
    }

    /// Whether `side` retains any castling right.
    #[must_use]
    pub fn any(&self, side: Side) -> bool {
        self.rook_of(side, CastlingSide::KingSide).is_some()
            || self.rook_of(side, CastlingSide::QueenSide).is_some()
    }
}
