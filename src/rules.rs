//! Move legality and board mutation.
//!
//! Every function here is pure: it takes a board snapshot and a player and
//! returns a value. Nothing is cached between calls.

use crate::board::{Board, positions};
use crate::error::GameError;
use crate::types::{Direction, GameResult, Player, Position};

/// A legal placement together with the opponent stones it flips.
///
/// Only [`valid_moves`] and [`find_move`] construct moves. Each move records
/// the board and player it was enumerated for, and [`apply_move`] refuses
/// it anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    position: Position,
    /// Direction by direction (N, NE, E, ..., NW), outward within each direction.
    flips: Vec<Position>,
    origin: (Board, Player),
}

impl Move {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn flips(&self) -> &[Position] {
        &self.flips
    }

    pub fn into_flips(self) -> Vec<Position> {
        self.flips
    }
}

/// Enumerates every legal move for `player` in row-major order.
pub fn valid_moves(board: &Board, player: Player) -> Vec<Move> {
    positions()
        .filter_map(|pos| move_at(board, player, pos))
        .collect()
}

/// Looks up the move at `pos`, if it is legal for `player`.
pub fn find_move(board: &Board, player: Player, pos: Position) -> Option<Move> {
    move_at(board, player, pos)
}

pub fn has_valid_move(board: &Board, player: Player) -> bool {
    positions()
        .any(|pos| board.is_empty_at(pos) && !collect_flips(board, player, pos).is_empty())
}

/// Plays `mv` and returns the resulting board. `board` itself is never modified.
pub fn apply_move(board: &Board, player: Player, mv: &Move) -> Result<Board, GameError> {
    if mv.origin != (*board, player) {
        return Err(GameError::InvalidMove(
            "move was not enumerated for this board and player",
        ));
    }
    if !board.is_empty_at(mv.position) {
        return Err(GameError::InvalidMove("target square is occupied"));
    }
    if mv.flips.is_empty() || collect_flips(board, player, mv.position) != mv.flips {
        return Err(GameError::InvalidMove("flip set does not match the board"));
    }

    Ok(board.with_stones(player, std::iter::once(&mv.position).chain(&mv.flips)))
}

/// Neither side can move.
pub fn is_terminal(board: &Board) -> bool {
    !has_valid_move(board, Player::Black) && !has_valid_move(board, Player::White)
}

pub fn game_result(board: &Board) -> GameResult {
    let (black, white) = board.count();
    GameResult::from_counts(black, white)
}

fn move_at(board: &Board, player: Player, pos: Position) -> Option<Move> {
    if !board.is_empty_at(pos) {
        return None;
    }
    let flips = collect_flips(board, player, pos);
    if flips.is_empty() {
        return None;
    }
    Some(Move {
        position: pos,
        flips,
        origin: (*board, player),
    })
}

fn collect_flips(board: &Board, player: Player, pos: Position) -> Vec<Position> {
    let me = player.to_cell();
    let opp = player.opponent().to_cell();
    let mut flips = Vec::new();

    for dir in Direction::ALL {
        let mut line = Vec::new();
        let mut cursor = pos.step(dir);

        while let Some(square) = cursor {
            if board.cell(square) != opp {
                break;
            }
            line.push(square);
            cursor = square.step(dir);
        }

        if !line.is_empty() && cursor.is_some_and(|end| board.cell(end) == me) {
            flips.extend(line);
        }
    }

    flips
}
