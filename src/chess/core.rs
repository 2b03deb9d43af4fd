//! Core enumerations shared by every other module: files, ranks, squares,
//! sides, roles, pieces and moves.

use std::fmt;
use std::mem;
use std::str::FromStr;

use strum::EnumIter;

/// Number of squares on the board.
pub const BOARD_SIZE: u8 = 64;
/// Number of files (and ranks) on the board.
pub const BOARD_WIDTH: u8 = 8;

/// A file (column) of the board, `a` through `h`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, EnumIter)]
#[repr(u8)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// Builds a file from its 0-indexed position, `a` = 0.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        debug_assert!(index < BOARD_WIDTH);
        // SAFETY: File is repr(u8) with exactly BOARD_WIDTH variants in
        // ascending order, so any index < BOARD_WIDTH is a valid discriminant.
        unsafe { mem::transmute::<u8, Self>(index) }
    }

    /// The lowercase FEN character for this file.
    #[must_use]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }

    /// Parses a lowercase or uppercase file letter.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        let lower = c.to_ascii_lowercase();
        ('a'..='h').contains(&lower).then(|| Self::from_index(lower as u8 - b'a'))
    }
}

/// A rank (row) of the board, `1` through `8`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, EnumIter)]
#[repr(u8)]
pub enum Rank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

impl Rank {
    /// Builds a rank from its 0-indexed position, rank 1 = 0.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        debug_assert!(index < BOARD_WIDTH);
        // SAFETY: see File::from_index.
        unsafe { mem::transmute::<u8, Self>(index) }
    }

    /// The FEN digit for this rank, `'1'..='8'`.
    #[must_use]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }

    /// Parses a rank digit `'1'..='8'`.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        ('1'..='8').contains(&c).then(|| Self::from_index(c as u8 - b'1'))
    }
}

/// A square on the board, 0..64 in little-endian rank-file order:
/// `square = file + 8 * rank`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, EnumIter)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Builds a square from its LERF index, `0..64`.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        debug_assert!(index < BOARD_SIZE);
        // SAFETY: Square is repr(u8) with exactly BOARD_SIZE variants in
        // ascending LERF order, so any index < BOARD_SIZE is valid.
        unsafe { mem::transmute::<u8, Self>(index) }
    }

    /// Builds a square from its file and rank.
    #[must_use]
    pub const fn from_coords(file: File, rank: Rank) -> Self {
        Self::from_index(file as u8 + BOARD_WIDTH * rank as u8)
    }

    /// This square's file.
    #[must_use]
    pub const fn file(self) -> File {
        File::from_index(self as u8 % BOARD_WIDTH)
    }

    /// This square's rank.
    #[must_use]
    pub const fn rank(self) -> Rank {
        Rank::from_index(self as u8 / BOARD_WIDTH)
    }

    /// Offsets this square by `(files, ranks)`, returning `None` if the
    /// result would leave the board.
    #[must_use]
    pub fn offset(self, files: i8, ranks: i8) -> Option<Self> {
        let file = i16::from(self.file() as i8) + i16::from(files);
        let rank = i16::from(self.rank() as i8) + i16::from(ranks);
        ((0..8).contains(&file) && (0..8).contains(&rank)).then(|| {
            Self::from_coords(File::from_index(file as u8), Rank::from_index(rank as u8))
        })
    }

    /// Algebraic notation, e.g. `"e4"`.
    #[must_use]
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file().to_char(), self.rank().to_char())
    }

    /// Parses algebraic notation, e.g. `"e4"`.
    #[must_use]
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        chars.next().is_none().then_some(Self::from_coords(file, rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

/// One of the two sides of the board.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, EnumIter)]
#[repr(u8)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The other side. An involution: `side.opposite().opposite() == side`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// This side's back rank (rank 1 for white, rank 8 for black).
    #[must_use]
    pub const fn backrank(self) -> Rank {
        match self {
            Self::White => Rank::First,
            Self::Black => Rank::Eighth,
        }
    }

    /// The rank a pawn of this side starts on.
    #[must_use]
    pub const fn pawn_rank(self) -> Rank {
        match self {
            Self::White => Rank::Second,
            Self::Black => Rank::Seventh,
        }
    }

    /// The direction (in ranks) a pawn of this side pushes.
    #[must_use]
    pub const fn pawn_push_direction(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

/// A kind of chess piece, independent of side.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, EnumIter)]
#[repr(u8)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    /// The canonical (lowercase) FEN/SAN character for this role. Pawns have
    /// no SAN letter but do have a FEN letter.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Parses a role from its lowercase FEN/SAN character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let role = chars.next().and_then(Self::from_char).ok_or(())?;
        chars.next().is_none().then_some(role).ok_or(())
    }
}

/// A piece: the pairing of a [`Side`] and a [`Role`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Piece {
    pub side: Side,
    pub role: Role,
}

impl Piece {
    /// Builds a piece.
    #[must_use]
    pub const fn new(side: Side, role: Role) -> Self {
        Self { side, role }
    }

    /// The FEN character for this piece: uppercase for white, lowercase for
    /// black.
    #[must_use]
    pub fn to_char(self) -> char {
        match self.side {
            Side::White => self.role.to_char().to_ascii_uppercase(),
            Side::Black => self.role.to_char(),
        }
    }

    /// Parses a FEN piece character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Self::new(side, Role::from_char(c)?))
    }
}

/// Which side of the board a castling move travels toward.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, EnumIter)]
#[repr(u8)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    /// The file the king lands on after castling to this side.
    #[must_use]
    pub const fn king_to_file(self) -> File {
        match self {
            Self::KingSide => File::G,
            Self::QueenSide => File::C,
        }
    }

    /// The file the rook lands on after castling to this side.
    #[must_use]
    pub const fn rook_to_file(self) -> File {
        match self {
            Self::KingSide => File::F,
            Self::QueenSide => File::D,
        }
    }
}

/// A chess move. Currently only normal moves (including promotions and,
/// via the `from`/`to` squares, castling and en passant) are representable.
/// Kept as an enum so future variants (e.g. drops for variants with
/// pockets) can be added without changing the move generator's public
/// shape.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Move {
    /// A normal move: relocate the piece on `from` to `to`, optionally
    /// promoting it. Encodes castling as "king moves to rook's origin
    /// square" (Shredder-style) rather than to the g/c file.
    Normal {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
}

impl Move {
    /// The square the moved piece starts on.
    #[must_use]
    pub const fn from(self) -> Square {
        match self {
            Self::Normal { from, .. } => from,
        }
    }

    /// The square the moved piece ends on.
    #[must_use]
    pub const fn to(self) -> Square {
        match self {
            Self::Normal { to, .. } => to,
        }
    }

    /// The promotion role, if any.
    #[must_use]
    pub const fn promotion(self) -> Option<Role> {
        match self {
            Self::Normal { promotion, .. } => promotion,
        }
    }

    /// UCI move string: `<from><to>[promo]`.
    #[must_use]
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(role) => format!("{}{}{}", self.from(), self.to(), role.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Parses a UCI move string.
    #[must_use]
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s.len() {
            5 => Some(Role::from_char(s.as_bytes()[4] as char)?),
            _ => None,
        };
        Some(Self::Normal { from, to, promotion })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// A fixed-capacity move list. 256 is a safe upper bound on the number of
/// legal moves in any reachable chess position (the known maximum is 218).
pub type MoveList = arrayvec::ArrayVec<Move, 256>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn side_opposite_is_involution() {
        assert_eq!(Side::White.opposite().opposite(), Side::White);
        assert_eq!(Side::White.opposite(), Side::Black);
    }

    #[test]
    fn square_from_coords_round_trips() {
        let square = Square::from_coords(File::E, Rank::Fourth);
        assert_eq!(square.file(), File::E);
        assert_eq!(square.rank(), Rank::Fourth);
        assert_eq!(square.to_algebraic(), "e4");
    }

    #[test]
    fn uci_round_trip() {
        let mv = Move::from_uci("h7h8q").unwrap();
        assert_eq!(mv, Move::Normal {
            from: Square::H7,
            to: Square::H8,
            promotion: Some(Role::Queen),
        });
        let mv = Move::Normal {
            from: Square::A1,
            to: Square::A1,
            promotion: Some(Role::Knight),
        };
        assert_eq!(mv.to_uci(), "a1a1n");
    }

    #[test]
    fn piece_char_round_trips() {
        let piece = Piece::new(Side::Black, Role::Knight);
        assert_eq!(piece.to_char(), 'n');
        assert_eq!(Piece::from_char('n'), Some(piece));
        assert_eq!(
            Piece::from_char('Q'),
            Some(Piece::new(Side::White, Role::Queen))
        );
    }
}
