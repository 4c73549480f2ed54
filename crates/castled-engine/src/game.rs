//! A stateful game session.
//!
//! [`Game`] owns the current [`Position`] and is the checked surface the
//! presentation layer talks to: every move is validated before it is
//! applied, and the terminal status is recomputed after each move.

use crate::movegen::{in_check, MoveList};
use crate::rules::{self, GameStatus, MoveOutcome};
use crate::Position;
use castled_core::Square;
use thiserror::Error;

/// Error type for game operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The move is not legal in the current position.
    #[error("illegal move: {from}{to}")]
    IllegalMove { from: Square, to: Square },
    /// The game has already reached checkmate or stalemate.
    #[error("the game has already ended")]
    GameOver,
}

/// A chess game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    status: GameStatus,
}

impl Game {
    /// Starts a game from the standard initial position.
    pub fn new() -> Self {
        Self::from_position(Position::initial())
    }

    /// Starts a game from a custom position, which may already be terminal.
    pub fn from_position(position: Position) -> Self {
        let status = rules::status(&position);
        Game { position, status }
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the current game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        in_check(&self.position, self.position.side_to_move)
    }

    /// Returns true if the given move is legal right now.
    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        rules::is_legal(&self.position, from, to)
    }

    /// Collects the legal moves starting on the given square, for rendering
    /// move hints.
    pub fn legal_moves_from(&self, from: Square) -> MoveList {
        rules::legal_moves_from(&self.position, from)
    }

    /// Validates and plays a move, reporting what it did.
    ///
    /// On error the position is left untouched.
    pub fn make_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, GameError> {
        if self.status != GameStatus::Ongoing {
            return Err(GameError::GameOver);
        }
        if !rules::is_legal(&self.position, from, to) {
            return Err(GameError::IllegalMove { from, to });
        }

        let (next, outcome) = rules::make_move(&self.position, from, to);
        self.position = next;
        self.status = rules::status(&self.position);
        Ok(outcome)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
