//! The 8x8 piece grid.

use castled_core::{Color, File, Piece, Rank, Square};
use std::fmt;

/// An 8x8 mapping from square to optional piece.
///
/// Stored as a flat 64-cell array, rank-major from a1. The board is a plain
/// value: the engine clones it whenever a move must be tried without
/// committing it, and the clone never aliases back into the live state.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<(Piece, Color)>; 64],
}

impl Board {
    /// Creates a board with no pieces on it.
    pub const fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    /// Creates a board with the standard starting arrangement.
    pub fn standard() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];

        let mut board = Board::empty();
        for (file, piece) in File::ALL.into_iter().zip(BACK_RANK) {
            board.place(Square::new(file, Rank::R1), piece, Color::White);
            board.place(Square::new(file, Rank::R2), Piece::Pawn, Color::White);
            board.place(Square::new(file, Rank::R8), piece, Color::Black);
            board.place(Square::new(file, Rank::R7), Piece::Pawn, Color::Black);
        }
        board
    }

    #[inline]
    const fn index(square: Square) -> usize {
        (square.rank_index() * 8 + square.file_index()) as usize
    }

    /// Returns the piece and its owner on the given square, if any.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.cells[Self::index(square)]
    }

    /// Returns true if the given square holds no piece.
    #[inline]
    pub fn is_vacant(&self, square: Square) -> bool {
        self.cells[Self::index(square)].is_none()
    }

    /// Puts a piece on the given square, replacing any occupant.
    #[inline]
    pub fn place(&mut self, square: Square, piece: Piece, color: Color) {
        self.cells[Self::index(square)] = Some((piece, color));
    }

    /// Takes the piece off the given square, returning it.
    #[inline]
    pub fn remove(&mut self, square: Square) -> Option<(Piece, Color)> {
        self.cells[Self::index(square)].take()
    }

    /// Returns the square of the given color's king, if one is on the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| self.piece_at(sq) == Some((Piece::King, color)))
    }

    /// Iterates over the given color's pieces and the squares they stand on.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some((piece, c)) if c == color => Some((sq, piece)),
            _ => None,
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                let c = match self.piece_at(Square::new(file, rank)) {
                    Some((piece, color)) => piece.glyph(color),
                    None => '.',
                };
                write!(f, "{}", c)?;
                if file != File::H {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\n{})", self)
    }
}
