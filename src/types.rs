use serde::Serialize;

use crate::error::GameError;

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Side to move. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Numeric code shared with [`Cell::code`]: 1=black, 2=white.
    pub fn code(self) -> u8 {
        self.to_cell().code()
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::Black => f.write_str("B"),
            Player::White => f.write_str("W"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    /// 0=empty, 1=black, 2=white.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Black => 1,
            Cell::White => 2,
        }
    }

    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }
}

/// A board coordinate. Always on the board once constructed through [`Position::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, GameError> {
        if row as usize >= BOARD_SIZE || col as usize >= BOARD_SIZE {
            return Err(GameError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Row-major square index (0..=63).
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_SQUARES).then(|| Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        })
    }

    /// The neighbouring square in `dir`, or `None` past the edge.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Self::new(row, col).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Scan order used for flip sets.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// `(d_row, d_col)` unit vector.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

/// Final result after game over. `winner` is `None` on a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: Option<Player>,
    pub black_count: u8,
    pub white_count: u8,
}

impl GameResult {
    pub fn from_counts(black_count: u8, white_count: u8) -> Self {
        let winner = match black_count.cmp(&white_count) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        };
        Self {
            winner,
            black_count,
            white_count,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Out-of-band messages produced by a transition, consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// `player` had no legal move and forfeits the turn.
    Pass { player: Player },
    GameOver { result: GameResult },
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// 64 cell codes in row-major order (0=empty, 1=black, 2=white).
    pub board: Vec<u8>,
    /// Side to move. After game over this is the side that would have moved next.
    pub current_player: Player,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    pub result: Option<GameResult>,
    /// Legal targets for `current_player`; empty once the game is over.
    pub valid_moves: Vec<Position>,
    /// Contract:
    /// - After a move: cells it flipped, also when the opponent then had to pass.
    /// - Start or reset: empty.
    pub flipped: Vec<Position>,
    pub last_move: Option<Position>,
    pub theme: String,
    pub notifications: Vec<Notification>,
}
