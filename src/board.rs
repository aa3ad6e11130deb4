use std::fmt;
use std::str::FromStr;

use crate::error::GameError;
use crate::types::{BOARD_SIZE, Cell, NUM_SQUARES, Player, Position};

/// Immutable Othello board snapshot represented by two bitboards.
///
/// Bit `row * 8 + col` of each mask marks a stone of that colour. Every
/// mutator returns a new snapshot; `Board` is `Copy`, so no two snapshots
/// ever share storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    pub fn empty() -> Self {
        Self { black: 0, white: 0 }
    }

    /// Builds a board from raw masks.
    ///
    /// Overlapping bits are not an error: a square set in both masks becomes
    /// black and the white bit is dropped. Callers that need to detect
    /// overlap must check `black & white` themselves.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        Self {
            black,
            white: white & !black,
        }
    }

    pub fn cell(&self, pos: Position) -> Cell {
        let square = bit(pos.index());
        if (self.black & square) != 0 {
            Cell::Black
        } else if (self.white & square) != 0 {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        ((self.black | self.white) & bit(pos.index())) == 0
    }

    /// Returns a copy with `pos` set to `cell`.
    pub fn with_cell(&self, pos: Position, cell: Cell) -> Self {
        let square = bit(pos.index());
        let mut next = Self {
            black: self.black & !square,
            white: self.white & !square,
        };
        match cell {
            Cell::Black => next.black |= square,
            Cell::White => next.white |= square,
            Cell::Empty => {}
        }
        next
    }

    /// Returns a copy with every square in `positions` owned by `player`.
    pub fn with_stones<'a>(
        &self,
        player: Player,
        positions: impl IntoIterator<Item = &'a Position>,
    ) -> Self {
        let mask = positions
            .into_iter()
            .fold(0u64, |acc, pos| acc | bit(pos.index()));
        match player {
            Player::Black => Self {
                black: self.black | mask,
                white: self.white & !mask,
            },
            Player::White => Self {
                black: self.black & !mask,
                white: self.white | mask,
            },
        }
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black_count, white_count) = self.count();
        NUM_SQUARES as u8 - black_count - white_count
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Same position with every stone's colour inverted.
    pub fn swap_colors(&self) -> Self {
        Self {
            black: self.white,
            white: self.black,
        }
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (pos, cell) in positions().zip(board.iter_mut()) {
            *cell = self.cell(pos).code();
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pos) in positions().enumerate() {
            let ch = match self.cell(pos) {
                Cell::Black => 'B',
                Cell::White => 'W',
                Cell::Empty => '.',
            };
            write!(f, "{ch}")?;
            if i % BOARD_SIZE == BOARD_SIZE - 1 && i + 1 < NUM_SQUARES {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Parses the [`Display`](fmt::Display) form: 64 of `B`, `W`, `.`, whitespace ignored.
impl FromStr for Board {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::empty();
        let mut squares = positions();
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            let cell = match ch {
                'B' | 'b' => Cell::Black,
                'W' | 'w' => Cell::White,
                '.' | '-' => Cell::Empty,
                other => {
                    return Err(GameError::MalformedBoard(format!(
                        "unexpected character {other:?}"
                    )));
                }
            };
            let pos = squares.next().ok_or_else(|| {
                GameError::MalformedBoard(format!("more than {NUM_SQUARES} squares"))
            })?;
            board = board.with_cell(pos, cell);
        }
        if squares.next().is_some() {
            return Err(GameError::MalformedBoard(format!(
                "fewer than {NUM_SQUARES} squares"
            )));
        }
        Ok(board)
    }
}

/// All squares in row-major order.
pub fn positions() -> impl Iterator<Item = Position> {
    (0..NUM_SQUARES).filter_map(Position::from_index)
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}
