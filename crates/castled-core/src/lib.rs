//! Core types for chess.
//!
//! This crate provides the fundamental types used across the rules engine:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] and [`MoveFlag`] for move representation

mod color;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use mov::{Move, MoveFlag};
pub use piece::Piece;
pub use square::{File, Rank, Square, SquareError};
