//! The validated position: legality checking, legal move generation, move
//! application, terminal-state detection, and the SAN codec.

use std::fmt;

use crate::chess::attacks;
use crate::chess::board::Board;
use crate::chess::castles::Castles;
use crate::chess::core::{CastlingSide, File, Move, MoveList, Piece, Rank, Role, Side, Square};
use crate::chess::setup::{FenError, Setup};
use crate::chess::square_set::SquareSet;

/// A legal chess position: board placement, side to move, castling rights,
/// en-passant target, and move counters. Every public mutation returns a new
/// `Position`; there is no in-place mutation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    board: Board,
    turn: Side,
    castles: Castles,
    ep_square: Option<Square>,
    halfmoves: u32,
    fullmoves: u32,
}

impl Position {
    /// The position for a new standard game.
    #[must_use]
    pub fn starting() -> Self {
        Self::from_setup(Setup::starting(), false).expect("starting setup is legal")
    }

    /// Validates `setup` and builds a `Position` from it. Unless
    /// `suppress_impossible_check` is set, also rejects checker
    /// configurations that could never arise from a legal game.
    pub fn from_setup(setup: Setup, suppress_impossible_check: bool) -> Result<Self, PositionError> {
        let Setup {
            board,
            turn,
            unmoved_rooks,
            ep_square,
            halfmoves,
            fullmoves,
            ..
        } = setup;

        if board.occupied().is_empty() {
            return Err(PositionError::Empty);
        }
        if board.by_role(Role::King).len() != 2
            || board.pieces_of(Side::White, Role::King).len() != 1
            || board.pieces_of(Side::Black, Role::King).len() != 1
        {
            return Err(PositionError::Kings);
        }
        if !(board.by_role(Role::Pawn) & SquareSet::BACKRANKS).is_empty() {
            return Err(PositionError::PawnsOnBackrank);
        }

        let castles = Castles::from_setup(&board, unmoved_rooks);
        let ep_square = ep_square.filter(|&sq| valid_ep_square(&board, turn, sq));

        let position = Self {
            board,
            turn,
            castles,
            ep_square,
            halfmoves,
            fullmoves,
        };

        let their_king = position
            .board
            .king_of(turn.opposite())
            .expect("validated above");
        if !position
            .board
            .attacks_to(their_king, turn, position.board.occupied())
            .is_empty()
        {
            return Err(PositionError::OppositeCheck);
        }

        if !suppress_impossible_check {
            validate_impossible_check(&position)?;
        }

        Ok(position)
    }

    /// Parses a FEN string and validates the resulting position.
    pub fn from_fen(fen: &str, suppress_impossible_check: bool) -> Result<Self, ParseFenError> {
        let setup = Setup::parse_fen(fen)?;
        Ok(Self::from_setup(setup, suppress_impossible_check)?)
    }

    /// The piece placement.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[must_use]
    pub const fn turn(&self) -> Side {
        self.turn
    }

    /// The castling rights.
    #[must_use]
    pub const fn castles(&self) -> &Castles {
        &self.castles
    }

    /// The raw en-passant target square, as carried in the position (not
    /// filtered for legal capturability; see [`Position::legal_ep_square`]).
    #[must_use]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// The halfmove clock (since the last capture or pawn move).
    #[must_use]
    pub const fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    /// The fullmove counter.
    #[must_use]
    pub const fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    fn king(&self) -> Square {
        self.board.king_of(self.turn).expect("every Position has both kings")
    }

    /// Squares from which an enemy piece attacks the mover's king.
    #[must_use]
    pub fn checkers(&self) -> SquareSet {
        self.board
            .attacks_to(self.king(), self.turn.opposite(), self.board.occupied())
    }

    /// Whether the side to move is in check.
    #[must_use]
    pub fn is_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    /// Generates every strictly legal move in this position.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        let us = self.turn;
        let them = us.opposite();
        let king = self.king();
        let occupied = self.board.occupied();
        let own = self.board.by_side(us);
        let enemy = self.board.by_side(them);
        let checkers = self.checkers();

        let occupied_without_king = occupied.without(king);
        for to in attacks::king_attacks(king) & !own {
            if self.board.attacks_to(to, them, occupied_without_king).is_empty() {
                moves.push(Move::Normal {
                    from: king,
                    to,
                    promotion: None,
                });
            }
        }

        if checkers.len() >= 2 {
            return moves;
        }

        let target = match checkers.single_square() {
            Some(checker) => attacks::between(king, checker).with(checker),
            None => SquareSet::FULL,
        };

        let blockers = slider_blockers(&self.board, them, king);
        let pin_mask = |from: Square| {
            if blockers.contains(from) {
                attacks::ray(from, king)
            } else {
                SquareSet::FULL
            }
        };

        for from in self.board.pieces_of(us, Role::Knight) {
            let dests = attacks::knight_attacks(from) & !own & target & pin_mask(from);
            push_simple_moves(&mut moves, from, dests);
        }
        for from in self.board.pieces_of(us, Role::Bishop) {
            let dests = attacks::bishop_attacks(from, occupied) & !own & target & pin_mask(from);
            push_simple_moves(&mut moves, from, dests);
        }
        for from in self.board.pieces_of(us, Role::Rook) {
            let dests = attacks::rook_attacks(from, occupied) & !own & target & pin_mask(from);
            push_simple_moves(&mut moves, from, dests);
        }
        for from in self.board.pieces_of(us, Role::Queen) {
            let dests = attacks::queen_attacks(from, occupied) & !own & target & pin_mask(from);
            push_simple_moves(&mut moves, from, dests);
        }

        self.generate_pawn_moves(&mut moves, target, blockers, king, occupied, enemy);

        if checkers.is_empty() {
            self.generate_castling_moves(&mut moves, king, occupied);
        }

        moves
    }

    fn generate_pawn_moves(
        &self,
        moves: &mut MoveList,
        target: SquareSet,
        blockers: SquareSet,
        king: Square,
        occupied: SquareSet,
        enemy: SquareSet,
    ) {
        let us = self.turn;
        let direction = us.pawn_push_direction();
        let pin_mask = |from: Square| {
            if blockers.contains(from) {
                attacks::ray(from, king)
            } else {
                SquareSet::FULL
            }
        };

        for from in self.board.pieces_of(us, Role::Pawn) {
            let allowed = target & pin_mask(from);

            if let Some(one) = from.offset(0, direction) {
                if !occupied.contains(one) {
                    if allowed.contains(one) {
                        push_pawn_moves(moves, from, one, us);
                    }
                    if from.rank() == us.pawn_rank() {
                        if let Some(two) = from.offset(0, 2 * direction) {
                            if !occupied.contains(two) && allowed.contains(two) {
                                moves.push(Move::Normal {
                                    from,
                                    to: two,
                                    promotion: None,
                                });
                            }
                        }
                    }
                }
            }

            for to in attacks::pawn_attacks(from, us) & enemy & allowed {
                push_pawn_moves(moves, from, to, us);
            }

            if let Some(ep) = self.ep_square {
                if attacks::pawn_attacks(from, us).contains(ep) {
                    self.try_en_passant(moves, from, ep, king, occupied);
                }
            }
        }
    }

    fn try_en_passant(
        &self,
        moves: &mut MoveList,
        from: Square,
        ep: Square,
        king: Square,
        occupied: SquareSet,
    ) {
        let us = self.turn;
        let them = us.opposite();
        let captured_pawn = ep
            .offset(0, -us.pawn_push_direction())
            .expect("ep square always has a square behind it");
        let virtual_occupied = occupied.without(from).without(captured_pawn).with(ep);
        if self.board.attacks_to(king, them, virtual_occupied).is_empty() {
            moves.push(Move::Normal {
                from,
                to: ep,
                promotion: None,
            });
        }
    }

    fn generate_castling_moves(&self, moves: &mut MoveList, king: Square, occupied: SquareSet) {
        let us = self.turn;
        let them = us.opposite();
        if king.rank() != us.backrank() {
            return;
        }
        for castling_side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
            let Some(rook) = self.castles.rook_of(us, castling_side) else {
                continue;
            };
            let path = self.castles.path_of(us, castling_side);
            if !(path & occupied).is_empty() {
                continue;
            }

            let king_to = Square::from_coords(castling_side.king_to_file(), us.backrank());
            let rook_to = Square::from_coords(castling_side.rook_to_file(), us.backrank());

            let king_walk = attacks::between(king, king_to).with(king).with(king_to);
            let occupied_without_king = occupied.without(king);
            let walk_is_safe = king_walk
                .into_iter()
                .all(|sq| self.board.attacks_to(sq, them, occupied_without_king).is_empty());
            if !walk_is_safe {
                continue;
            }

            let post_occupied = occupied.without(king).without(rook).with(king_to).with(rook_to);
            if !self.board.attacks_to(king_to, them, post_occupied).is_empty() {
                continue;
            }

            moves.push(Move::Normal {
                from: king,
                to: rook,
                promotion: None,
            });
        }
    }

    /// Rewrites `mv` into the canonical (Shredder) castling encoding when it
    /// is a castling move expressed via the traditional `g`/`c`-file
    /// destination, so [`Position::is_legal`] and [`Position::play`] accept
    /// both encodings. Non-castling moves and moves already in canonical
    /// form pass through unchanged.
    #[must_use]
    pub fn normalize_move(&self, mv: Move) -> Move {
        let Move::Normal { from, to, promotion } = mv;
        if promotion.is_some() {
            return mv;
        }
        let Some(Piece { role: Role::King, .. }) = self.board.piece_at(from) else {
            return mv;
        };
        if from.rank() != self.turn.backrank() || to.rank() != self.turn.backrank() {
            return mv;
        }
        for castling_side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
            let king_to = Square::from_coords(castling_side.king_to_file(), self.turn.backrank());
            if to == king_to && self.castles.rook_of(self.turn, castling_side) != Some(to) {
                if let Some(rook) = self.castles.rook_of(self.turn, castling_side) {
                    return Move::Normal {
                        from,
                        to: rook,
                        promotion: None,
                    };
                }
            }
        }
        mv
    }

    /// Whether this move (after normalization) is among [`Self::legal_moves`].
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves().contains(&self.normalize_move(mv))
    }

    /// Applies `mv` without checking legality.
    #[must_use]
    pub fn play_unchecked(&self, mv: Move) -> Self {
        let Move::Normal { from, to, promotion } = mv;
        let us = self.turn;
        let them = us.opposite();
        let moved = self.board.piece_at(from);
        let is_pawn = moved.is_some_and(|p| p.role == Role::Pawn);
        let is_king = moved.is_some_and(|p| p.role == Role::King);
        let is_capture = self.board.piece_at(to).is_some();
        let is_castle = is_king && self.board.piece_at(to) == Some(Piece::new(us, Role::Rook));

        let mut board = self.board.remove_piece_at(from);
        let mut castles = self.castles;
        let mut ep_square = None;
        let mut halfmoves = self.halfmoves + 1;

        if is_pawn && Some(to) == self.ep_square {
            let captured_pawn = to
                .offset(0, -us.pawn_push_direction())
                .expect("ep square always has a square behind it");
            board = board.remove_piece_at(captured_pawn);
        }

        if is_pawn {
            let double_step = match us {
                Side::White => from.rank() == Rank::Second
                    && to.rank() == Rank::Fourth,
                Side::Black => from.rank() == Rank::Seventh
                    && to.rank() == Rank::Fifth,
            };
            if double_step {
                ep_square = from.offset(0, us.pawn_push_direction());
            }
        }

        if moved.is_some_and(|p| p.role == Role::Rook) {
            castles = castles.discard_rook_at(from);
        }
        if is_king && !is_castle {
            castles = castles.discard_side(us);
        }

        if is_castle {
            let castling_side = if to.file() > from.file() {
                CastlingSide::KingSide
            } else {
                CastlingSide::QueenSide
            };
            let king_to = Square::from_coords(castling_side.king_to_file(), us.backrank());
            let rook_to = Square::from_coords(castling_side.rook_to_file(), us.backrank());
            board = board.remove_piece_at(to);
            board = board.set_piece_at(king_to, Piece::new(us, Role::King));
            board = board.set_piece_at(rook_to, Piece::new(us, Role::Rook));
            castles = castles.discard_side(us);
        } else {
            let role = promotion.unwrap_or_else(|| moved.map_or(Role::Pawn, |p| p.role));
            board = board.set_piece_at(to, Piece::new(us, role));
        }

        if is_capture && !is_castle {
            castles = castles.discard_rook_at(to);
        }

        if (is_pawn || is_capture) && !is_castle {
            halfmoves = 0;
        }

        let fullmoves = if us == Side::Black { self.fullmoves + 1 } else { self.fullmoves };

        Self {
            board,
            turn: them,
            castles,
            ep_square,
            halfmoves,
            fullmoves,
        }
    }

    /// Applies `mv`, rejecting it if not legal.
    pub fn play(&self, mv: Move) -> Result<Self, PlayError> {
        let mv = self.normalize_move(mv);
        if !self.legal_moves().contains(&mv) {
            return Err(PlayError);
        }
        Ok(self.play_unchecked(mv))
    }

    /// Whether the side to move has at least one legal move.
    #[must_use]
    pub fn has_legal_moves(&self) -> bool {
        !self.legal_moves().is_empty()
    }

    /// Checkmate: in check with no legal moves.
    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_moves()
    }

    /// Stalemate: not in check but no legal moves.
    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_moves()
    }

    /// Whether neither side has enough material to deliver checkmate.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        [Side::White, Side::Black]
            .into_iter()
            .all(|side| self.side_has_insufficient_material(side))
    }

    fn side_has_insufficient_material(&self, side: Side) -> bool {
        let board = &self.board;
        if !board.pieces_of(side, Role::Pawn).is_empty()
            || !board.pieces_of(side, Role::Rook).is_empty()
            || !board.pieces_of(side, Role::Queen).is_empty()
        {
            return false;
        }
        let knights = board.pieces_of(side, Role::Knight);
        let bishops = board.pieces_of(side, Role::Bishop);
        if knights.is_empty() && bishops.is_empty() {
            return true;
        }
        if !bishops.is_empty() && knights.is_empty() {
            let all_bishops = board.by_role(Role::Bishop);
            let same_complex = (all_bishops & SquareSet::DARK_SQUARES).is_empty()
                || (all_bishops & SquareSet::LIGHT_SQUARES).is_empty();
            let no_pawns_or_knights_anywhere =
                board.by_role(Role::Pawn).is_empty() && board.by_role(Role::Knight).is_empty();
            return same_complex && no_pawns_or_knights_anywhere;
        }
        if !knights.is_empty() && bishops.is_empty() && knights.len() <= 2 {
            let opponent = side.opposite();
            let opponent_only_king_and_queens = board.by_side(opponent)
                == board.pieces_of(opponent, Role::King) | board.pieces_of(opponent, Role::Queen);
            return opponent_only_king_and_queens;
        }
        false
    }

    /// The game's outcome, if the position is terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_checkmate() {
            Some(Outcome::Decisive { winner: self.turn.opposite() })
        } else if self.is_stalemate() || self.is_insufficient_material() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// The en-passant square, retained only if at least one of the
    /// side-to-move's pawns can legally capture onto it. Used when emitting
    /// FEN so round-tripped positions do not carry misleading ep squares.
    #[must_use]
    pub fn legal_ep_square(&self) -> Option<Square> {
        self.ep_square.filter(|&ep| {
            self.legal_moves()
                .iter()
                .any(|mv| mv.to() == ep && self.board.piece_at(mv.from()).is_some_and(|p| p.role == Role::Pawn))
        })
    }

    /// Converts back to an un-validated [`Setup`].
    #[must_use]
    pub fn to_setup(&self) -> Setup {
        Setup {
            board: self.board,
            turn: self.turn,
            unmoved_rooks: self.castles.unmoved_rooks(),
            ep_square: self.legal_ep_square(),
            halfmoves: self.halfmoves,
            fullmoves: self.fullmoves,
            remaining_checks: None,
        }
    }

    /// Emits this position's FEN string.
    #[must_use]
    pub fn fen(&self) -> String {
        self.to_setup().to_fen()
    }

    fn san_candidates(&self, role: Role, to: Square) -> MoveList {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.to() == to && self.board.piece_at(mv.from()).is_some_and(|p| p.role == role))
            .collect()
    }

    /// Emits the Standard Algebraic Notation for `mv`, which must be legal
    /// in this position.
    #[must_use]
    pub fn san(&self, mv: Move) -> String {
        let Move::Normal { from, to, promotion } = mv;
        let moved = self.board.piece_at(from);
        let is_castle = moved.is_some_and(|p| p.role == Role::King)
            && self.board.piece_at(to) == Some(Piece::new(self.turn, Role::Rook));

        let mut san = if is_castle {
            if to.file() > from.file() {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            }
        } else {
            let role = moved.map_or(Role::Pawn, |p| p.role);
            let is_capture = self.board.piece_at(to).is_some() || (role == Role::Pawn && Some(to) == self.ep_square);
            let mut s = String::new();
            if role == Role::Pawn {
                if is_capture {
                    s.push(from.file().to_char());
                }
            } else {
                s.push(role.to_char().to_ascii_uppercase());
                let candidates = self.san_candidates(role, to);
                let same_file = candidates.iter().any(|mv| mv.from() != from && mv.from().file() == from.file());
                let same_rank = candidates.iter().any(|mv| mv.from() != from && mv.from().rank() == from.rank());
                let ambiguous = candidates.iter().any(|mv| mv.from() != from);
                if ambiguous {
                    if !same_file {
                        s.push(from.file().to_char());
                    } else if !same_rank {
                        s.push(from.rank().to_char());
                    } else {
                        s.push(from.file().to_char());
                        s.push(from.rank().to_char());
                    }
                }
            }
            if is_capture {
                s.push('x');
            }
            s.push_str(&to.to_algebraic());
            if let Some(role) = promotion {
                s.push('=');
                s.push(role.to_char().to_ascii_uppercase());
            }
            s
        };

        let after = self.play_unchecked(self.normalize_move(mv));
        if after.is_check() {
            san.push(if after.is_checkmate() { '#' } else { '+' });
        }
        san
    }

    /// Parses Standard Algebraic Notation, returning the unique legal move
    /// it denotes, or `None` on any ambiguity or illegality.
    #[must_use]
    pub fn parse_san(&self, input: &str) -> Option<Move> {
        let trimmed = input.trim_end_matches(['!', '?', '#', '+']);
        if trimmed == "O-O" || trimmed == "0-0" {
            return self.find_castling_move(CastlingSide::KingSide);
        }
        if trimmed == "O-O-O" || trimmed == "0-0-0" {
            return self.find_castling_move(CastlingSide::QueenSide);
        }

        let (body, promotion) = match trimmed.split_once('=') {
            Some((body, promo)) => (body, Some(Role::from_char(promo.chars().next()?)?)),
            None => (trimmed, None),
        };

        let mut chars: Vec<char> = body.chars().collect();
        if chars.len() < 2 {
            return None;
        }
        let to = Square::from_algebraic(&chars[chars.len() - 2..].iter().collect::<String>())?;
        chars.truncate(chars.len() - 2);
        if chars.last() == Some(&'x') {
            chars.pop();
        }

        if chars.first().map_or(true, |c| c.is_ascii_lowercase()) {
            // Pawn move: a leftover leading char (if any) is the source file.
            let source_file = chars.first().and_then(|&c| File::from_char(c));
            let candidates: MoveList = self
                .legal_moves()
                .into_iter()
                .filter(|mv| {
                    mv.to() == to
                        && mv.promotion() == promotion
                        && self.board.piece_at(mv.from()).is_some_and(|p| p.role == Role::Pawn)
                        && source_file.map_or(true, |f| mv.from().file() == f)
                })
                .collect();
            return furthest_behind(&candidates, self.turn);
        }

        let role = Role::from_char(chars[0])?;
        let disambiguation: String = chars[1..].iter().collect();
        let candidates: Vec<Move> = self
            .san_candidates(role, to)
            .into_iter()
            .filter(|mv| square_matches_disambiguation(mv.from(), &disambiguation))
            .collect();
        match candidates.as_slice() {
            [mv] => Some(*mv),
            _ => None,
        }
    }

    fn find_castling_move(&self, castling_side: CastlingSide) -> Option<Move> {
        let rook = self.castles.rook_of(self.turn, castling_side)?;
        let king = self.board.king_of(self.turn)?;
        let mv = Move::Normal {
            from: king,
            to: rook,
            promotion: None,
        };
        self.legal_moves().contains(&mv).then_some(mv)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

fn push_simple_moves(moves: &mut MoveList, from: Square, dests: SquareSet) {
    for to in dests {
        moves.push(Move::Normal {
            from,
            to,
            promotion: None,
        });
    }
}

fn push_pawn_moves(moves: &mut MoveList, from: Square, to: Square, side: Side) {
    if to.rank() == side.opposite().backrank() {
        for role in [Role::Queen, Role::Rook, Role::Bishop, Role::Knight] {
            moves.push(Move::Normal {
                from,
                to,
                promotion: Some(role),
            });
        }
    } else {
        moves.push(Move::Normal {
            from,
            to,
            promotion: None,
        });
    }
}

fn square_matches_disambiguation(square: Square, disambiguation: &str) -> bool {
    match disambiguation.len() {
        0 => true,
        1 => {
            let c = disambiguation.chars().next().expect("checked len");
            if let Some(file) = File::from_char(c) {
                square.file() == file
            } else if let Some(rank) = Rank::from_char(c) {
                square.rank() == rank
            } else {
                false
            }
        }
        _ => Square::from_algebraic(disambiguation) == Some(square),
    }
}

fn furthest_behind(candidates: &[Move], turn: Side) -> Option<Move> {
    match turn {
        Side::White => candidates.iter().min_by_key(|mv| mv.from().rank() as u8).copied(),
        Side::Black => candidates.iter().max_by_key(|mv| mv.from().rank() as u8).copied(),
    }
}

/// The structural precondition on an ep square: it lies on the rank just
/// behind a possible double push, the square one step forward is empty, and
/// an opponent pawn sits one step backward.
fn valid_ep_square(board: &Board, turn: Side, sq: Square) -> bool {
    let expected_rank = match turn {
        Side::White => Rank::Sixth,
        Side::Black => Rank::Third,
    };
    if sq.rank() != expected_rank {
        return false;
    }
    let direction = turn.pawn_push_direction();
    let Some(forward) = sq.offset(0, direction) else {
        return false;
    };
    if board.occupied().contains(forward) {
        return false;
    }
    let Some(backward) = sq.offset(0, -direction) else {
        return false;
    };
    board.piece_at(backward) == Some(Piece::new(turn.opposite(), Role::Pawn))
}

/// The set of `attacker`'s pieces absolutely pinned to `king`: for each
/// enemy slider attacking `king`'s line on an otherwise empty board, the
/// occupied squares on the open segment between them are blockers iff
/// exactly one square is occupied there.
fn slider_blockers(board: &Board, attacker: Side, king: Square) -> SquareSet {
    let diagonal_snipers = attacks::bishop_attacks(king, SquareSet::EMPTY)
        & (board.pieces_of(attacker, Role::Bishop) | board.pieces_of(attacker, Role::Queen));
    let orthogonal_snipers = attacks::rook_attacks(king, SquareSet::EMPTY)
        & (board.pieces_of(attacker, Role::Rook) | board.pieces_of(attacker, Role::Queen));

    let mut blockers = SquareSet::EMPTY;
    for sniper in diagonal_snipers | orthogonal_snipers {
        let between = attacks::between(king, sniper) & board.occupied();
        if between.len() == 1 {
            blockers |= between;
        }
    }
    blockers
}

fn validate_impossible_check(position: &Position) -> Result<(), PositionError> {
    let us = position.turn;
    let king = position.king();
    let checkers = position.checkers();

    if checkers.len() > 2 {
        return Err(PositionError::ImpossibleCheck);
    }

    if checkers.len() == 2 {
        let squares: Vec<Square> = checkers.into_iter().collect();
        let (a, b) = (squares[0], squares[1]);
        let both_sliders = [a, b].into_iter().all(|sq| {
            matches!(
                position.board.role_at(sq),
                Some(Role::Bishop | Role::Rook | Role::Queen)
            )
        });
        if both_sliders && attacks::ray(a, b).contains(king) {
            return Err(PositionError::ImpossibleCheck);
        }
    }

    if let Some(ep) = position.ep_square {
        let pushed_pawn = ep
            .offset(0, -us.pawn_push_direction())
            .expect("ep square always has a square behind it");
        let pawn_origin = ep
            .offset(0, us.pawn_push_direction())
            .expect("ep square always has a square in front of it");
        for checker in checkers {
            if checker == pushed_pawn {
                continue;
            }
            let ray = attacks::ray(checker, king);
            if ray.is_empty() || !ray.contains(pawn_origin) {
                return Err(PositionError::ImpossibleCheck);
            }
        }
    }

    Ok(())
}

/// Causes of an illegal [`Setup`] rejected at [`Position::from_setup`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PositionError {
    /// The board has no pieces at all.
    #[error("empty board")]
    Empty,
    /// Either side lacks a king, or there are not exactly two kings.
    #[error("wrong number of kings")]
    Kings,
    /// The side not to move is in check.
    #[error("opponent is in check")]
    OppositeCheck,
    /// A pawn sits on the first or last rank.
    #[error("pawn on backrank")]
    PawnsOnBackrank,
    /// The checker configuration could not arise from a legal game.
    #[error("impossible check")]
    ImpossibleCheck,
}

/// `play` was asked to apply a move that is not legal in this position.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("illegal move")]
pub struct PlayError;

/// Either the FEN failed to parse, or it parsed to an illegal position.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseFenError {
    /// The FEN string itself is malformed.
    #[error(transparent)]
    Fen(#[from] FenError),
    /// The FEN parsed but described an illegal position.
    #[error(transparent)]
    Position(#[from] PositionError),
}

/// The outcome of a terminal position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// One side is checkmated; `winner` is the side that delivered it.
    Decisive { winner: Side },
    /// Stalemate or insufficient material.
    Draw,
}
