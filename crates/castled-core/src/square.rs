//! Board square representation.

use std::fmt;
use thiserror::Error;

/// Error returned when raw coordinates do not name a square on the board.
///
/// Raw `(rank, file)` pairs arrive from outside the engine (a UI mapping
/// clicks to cells); both coordinates must be in `0..8`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SquareError {
    #[error("coordinates (rank {rank}, file {file}) are outside the 8x8 board")]
    OutOfBoard { rank: u8, file: u8 },
}

/// A file (column) on the chess board, from A to H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files in order.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// Creates a file from index (0-7).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(File::A),
            1 => Some(File::B),
            2 => Some(File::C),
            3 => Some(File::D),
            4 => Some(File::E),
            5 => Some(File::F),
            6 => Some(File::G),
            7 => Some(File::H),
            _ => None,
        }
    }

    /// Creates a file from a character ('a'-'h' or 'A'-'H').
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(File::A),
            'b' => Some(File::B),
            'c' => Some(File::C),
            'd' => Some(File::D),
            'e' => Some(File::E),
            'f' => Some(File::F),
            'g' => Some(File::G),
            'h' => Some(File::H),
            _ => None,
        }
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the character representation.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A rank (row) on the chess board, from 1 to 8.
///
/// Rank 1 (index 0) is White's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// All ranks in order.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    /// Creates a rank from index (0-7).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Rank::R1),
            1 => Some(Rank::R2),
            2 => Some(Rank::R3),
            3 => Some(Rank::R4),
            4 => Some(Rank::R5),
            5 => Some(Rank::R6),
            6 => Some(Rank::R7),
            7 => Some(Rank::R8),
            _ => None,
        }
    }

    /// Creates a rank from a character ('1'-'8').
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Rank::R1),
            '2' => Some(Rank::R2),
            '3' => Some(Rank::R3),
            '4' => Some(Rank::R4),
            '5' => Some(Rank::R5),
            '6' => Some(Rank::R6),
            '7' => Some(Rank::R7),
            '8' => Some(Rank::R8),
            _ => None,
        }
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the character representation.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A square on the chess board, identified by file and rank.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    file: File,
    rank: Rank,
}

impl Square {
    /// Creates a square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square { file, rank }
    }

    /// Creates a square from raw `(rank, file)` coordinates.
    ///
    /// This is the boundary constructor for callers holding untyped grid
    /// coordinates, such as a UI translating pixel clicks to cells.
    pub fn from_coords(rank: u8, file: u8) -> Result<Self, SquareError> {
        match (File::from_index(file), Rank::from_index(rank)) {
            (Some(file), Some(rank)) => Ok(Square { file, rank }),
            _ => Err(SquareError::OutOfBoard { rank, file }),
        }
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square { file, rank })
    }

    /// Returns the file of this square.
    #[inline]
    pub const fn file(self) -> File {
        self.file
    }

    /// Returns the rank of this square.
    #[inline]
    pub const fn rank(self) -> Rank {
        self.rank
    }

    /// Returns the file index (0-7).
    #[inline]
    pub const fn file_index(self) -> u8 {
        self.file.index()
    }

    /// Returns the rank index (0-7).
    #[inline]
    pub const fn rank_index(self) -> u8 {
        self.rank.index()
    }

    /// Returns the square displaced by the given file and rank deltas, or
    /// `None` if that falls off the board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let file = self.file.index() as i8 + file_delta;
        let rank = self.rank.index() as i8 + rank_delta;
        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            return None;
        }
        Square::from_coords(rank as u8, file as u8).ok()
    }

    /// Iterates over all 64 squares, rank by rank from a1 to h8.
    pub fn all() -> impl Iterator<Item = Square> {
        Rank::ALL
            .into_iter()
            .flat_map(|rank| File::ALL.into_iter().map(move |file| Square { file, rank }))
    }

    // Home squares of the castling pieces.
    pub const A1: Square = Square::new(File::A, Rank::R1);
    pub const C1: Square = Square::new(File::C, Rank::R1);
    pub const D1: Square = Square::new(File::D, Rank::R1);
    pub const E1: Square = Square::new(File::E, Rank::R1);
    pub const F1: Square = Square::new(File::F, Rank::R1);
    pub const G1: Square = Square::new(File::G, Rank::R1);
    pub const H1: Square = Square::new(File::H, Rank::R1);
    pub const A8: Square = Square::new(File::A, Rank::R8);
    pub const C8: Square = Square::new(File::C, Rank::R8);
    pub const D8: Square = Square::new(File::D, Rank::R8);
    pub const E8: Square = Square::new(File::E, Rank::R8);
    pub const F8: Square = Square::new(File::F, Rank::R8);
    pub const G8: Square = Square::new(File::G, Rank::R8);
    pub const H8: Square = Square::new(File::H, Rank::R8);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({}{})", self.file, self.rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.rank)
    }
}
