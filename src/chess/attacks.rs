//! Precomputed leaper attack tables and hyperbola-quintessence sliding
//! attack generation.
//!
//! All tables are computed once, lazily, on first use and then read-only for
//! the remainder of the process: no Position exists before the first call
//! into this module, so there is no thread-safety concern in the
//! initialization itself.

use std::sync::OnceLock;

use crate::chess::core::{File, Rank, Side, Square, BOARD_SIZE};
use crate::chess::square_set::SquareSet;

struct Tables {
    king: [SquareSet; 64],
    knight: [SquareSet; 64],
    pawn: [[SquareSet; 64]; 2],
    file_mask: [SquareSet; 64],
    rank_mask: [SquareSet; 64],
    diag_mask: [SquareSet; 64],
    anti_diag_mask: [SquareSet; 64],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn leaper_attacks(square: Square, offsets: &[(i8, i8)]) -> SquareSet {
    offsets
        .iter()
        .filter_map(|&(df, dr)| square.offset(df, dr))
        .fold(SquareSet::EMPTY, |acc, to| acc.with(to))
}

fn pawn_attacks_uncached(square: Square, side: Side) -> SquareSet {
    let dr = side.pawn_push_direction();
    leaper_attacks(square, &[(-1, dr), (1, dr)])
}

fn line_mask(square: Square, squares: impl Iterator<Item = Square>) -> SquareSet {
    squares
        .filter(|&sq| sq != square)
        .fold(SquareSet::EMPTY, |acc, sq| acc.with(sq))
}

fn file_mask(square: Square) -> SquareSet {
    line_mask(
        square,
        (0..8).map(|rank| Square::from_coords(square.file(), Rank::from_index(rank))),
    )
}

fn rank_mask(square: Square) -> SquareSet {
    line_mask(
        square,
        (0..8).map(|file| Square::from_coords(File::from_index(file), square.rank())),
    )
}

fn diag_mask(square: Square) -> SquareSet {
    let (file, rank) = (square.file() as i8, square.rank() as i8);
    line_mask(
        square,
        (0..8).filter_map(move |i| square.offset(i - file, i - rank)),
    )
}

fn anti_diag_mask(square: Square) -> SquareSet {
    let (file, rank) = (square.file() as i8, square.rank() as i8);
    line_mask(
        square,
        (0..8).filter_map(move |i| square.offset(i - file, rank - i)),
    )
}

fn build_tables() -> Tables {
    let mut king = [SquareSet::EMPTY; 64];
    let mut knight = [SquareSet::EMPTY; 64];
    let mut pawn = [[SquareSet::EMPTY; 64]; 2];
    let mut file_m = [SquareSet::EMPTY; 64];
    let mut rank_m = [SquareSet::EMPTY; 64];
    let mut diag_m = [SquareSet::EMPTY; 64];
    let mut anti_diag_m = [SquareSet::EMPTY; 64];
    for index in 0..BOARD_SIZE {
        let square = Square::from_index(index);
        let i = index as usize;
        king[i] = leaper_attacks(square, &KING_OFFSETS);
        knight[i] = leaper_attacks(square, &KNIGHT_OFFSETS);
        pawn[0][i] = pawn_attacks_uncached(square, Side::White);
        pawn[1][i] = pawn_attacks_uncached(square, Side::Black);
        file_m[i] = file_mask(square);
        rank_m[i] = rank_mask(square);
        diag_m[i] = diag_mask(square);
        anti_diag_m[i] = anti_diag_mask(square);
    }
    Tables {
        king,
        knight,
        pawn,
        file_mask: file_m,
        rank_mask: rank_m,
        diag_mask: diag_m,
        anti_diag_mask: anti_diag_m,
    }
}

fn tables() -> &'static Tables {
    TABLES.get_or_init(build_tables)
}

/// Precomputed king attacks from `square`.
#[must_use]
pub fn king_attacks(square: Square) -> SquareSet {
    tables().king[square as usize]
}

/// Precomputed knight attacks from `square`.
#[must_use]
pub fn knight_attacks(square: Square) -> SquareSet {
    tables().knight[square as usize]
}

/// Precomputed pawn attacks from `square` for `side`.
#[must_use]
pub fn pawn_attacks(square: Square, side: Side) -> SquareSet {
    tables().pawn[side as usize][square as usize]
}

/// Hyperbola quintessence: the attack set along `line_mask` from `square`
/// given `occupied`, using
/// `(o - 2s) ⊕ reverse(reverse(o) - 2 * reverse(s))`.
fn hyperbola_quintessence(square: Square, line_mask: SquareSet, occupied: SquareSet) -> SquareSet {
    let slider = 1u64 << square as u8;
    let forward = occupied.bits() & line_mask.bits();
    let reverse = forward.reverse_bits();
    let forward = forward.wrapping_sub(slider.wrapping_mul(2));
    let reverse = reverse.wrapping_sub(slider.reverse_bits().wrapping_mul(2));
    SquareSet::from_bits((forward ^ reverse.reverse_bits()) & line_mask.bits())
}

/// Bishop attacks from `square` given `occupied`.
#[must_use]
pub fn bishop_attacks(square: Square, occupied: SquareSet) -> SquareSet {
    let t = tables();
    let i = square as usize;
    hyperbola_quintessence(square, t.diag_mask[i], occupied)
        | hyperbola_quintessence(square, t.anti_diag_mask[i], occupied)
}

/// Rook attacks from `square` given `occupied`.
#[must_use]
pub fn rook_attacks(square: Square, occupied: SquareSet) -> SquareSet {
    let t = tables();
    let i = square as usize;
    hyperbola_quintessence(square, t.file_mask[i], occupied)
        | hyperbola_quintessence(square, t.rank_mask[i], occupied)
}

/// Queen attacks from `square` given `occupied`: the union of bishop and
/// rook attacks.
#[must_use]
pub fn queen_attacks(square: Square, occupied: SquareSet) -> SquareSet {
    bishop_attacks(square, occupied) | rook_attacks(square, occupied)
}

fn aligned(a: Square, b: Square) -> bool {
    a.file() == b.file()
        || a.rank() == b.rank()
        || diag_mask(a).contains(b)
        || anti_diag_mask(a).contains(b)
}

/// The full line (rank, file or diagonal) through both `a` and `b`, or the
/// empty set if they are not colinear.
#[must_use]
pub fn ray(a: Square, b: Square) -> SquareSet {
    if a == b || !aligned(a, b) {
        return SquareSet::EMPTY;
    }
    let t = tables();
    let i = a as usize;
    let candidate = if a.file() == b.file() {
        t.file_mask[i]
    } else if a.rank() == b.rank() {
        t.rank_mask[i]
    } else if diag_mask(a).contains(b) {
        t.diag_mask[i]
    } else {
        t.anti_diag_mask[i]
    };
    candidate.with(a).with(b)
}

/// The open segment strictly between `a` and `b`, or the empty set if they
/// are not colinear.
#[must_use]
pub fn between(a: Square, b: Square) -> SquareSet {
    if !aligned(a, b) {
        return SquareSet::EMPTY;
    }
    let blockers = SquareSet::from_square(a) | SquareSet::from_square(b);
    if a.file() == b.file() {
        rook_attacks(a, blockers) & rook_attacks(b, blockers) & tables().file_mask[a as usize]
    } else if a.rank() == b.rank() {
        rook_attacks(a, blockers) & rook_attacks(b, blockers) & tables().rank_mask[a as usize]
    } else {
        bishop_attacks(a, blockers) & bishop_attacks(b, blockers)
    }
}
