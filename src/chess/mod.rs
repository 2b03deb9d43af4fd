//! Chess rules: bitboards, attack generation, piece placement, castling
//! rights, FEN parsing, and the validated, legal-move-generating `Position`.

pub mod attacks;
pub mod board;
pub mod castles;
pub mod core;
pub mod position;
pub mod setup;
pub mod square_set;
