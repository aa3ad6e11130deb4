use std::rc::Rc;

use tracing::{debug, info, instrument};

use crate::board::Board;
use crate::config::AppConfig;
use crate::error::{ConfigError, GameError};
use crate::rules::{self, Move};
use crate::types::{GameResult, GameView, Notification, Player, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing(Player),
    GameOver(GameResult),
}

/// Everything the presentation layer can ask the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Play(Position),
    Reset,
    CycleTheme,
}

/// One immutable game snapshot.
///
/// [`GameState::update`] is the only transition: it consumes an [`Action`]
/// and returns the next snapshot, leaving `self` as it was. Pass and
/// game-over detection run synchronously after every accepted move, and
/// their outcome is reported through [`GameState::notifications`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    phase: Phase,
    themes: Rc<[String]>,
    theme_index: usize,
    last_move: Option<Position>,
    flipped: Vec<Position>,
    notifications: Vec<Notification>,
}

impl GameState {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::start(
            Rc::from(config.themes.clone()),
            config.initial_theme_index(),
        ))
    }

    /// Starts from an arbitrary position with `player` to move.
    ///
    /// Pass and game-over rules are applied immediately, so the returned
    /// state may already have moved on to the opponent or ended.
    pub fn with_position(
        board: Board,
        player: Player,
        config: &AppConfig,
    ) -> Result<Self, ConfigError> {
        let mut state = Self::new(config)?;
        state.board = board;
        state.phase = Phase::Playing(player);
        Ok(state.settle())
    }

    fn start(themes: Rc<[String]>, theme_index: usize) -> Self {
        Self {
            board: Board::new(),
            phase: Phase::Playing(Player::Black),
            themes,
            theme_index,
            last_move: None,
            flipped: Vec::new(),
            notifications: Vec::new(),
        }
        .settle()
    }

    #[instrument(level = "debug", skip(self), fields(phase = ?self.phase))]
    pub fn update(&self, action: Action) -> Result<Self, GameError> {
        match action {
            Action::Play(pos) => self.play(pos),
            Action::Reset => {
                info!("game reset");
                Ok(Self::start(Rc::clone(&self.themes), self.theme_index))
            }
            Action::CycleTheme => {
                let theme_index = (self.theme_index + 1) % self.themes.len();
                debug!(theme = %self.themes[theme_index], "theme changed");
                Ok(Self {
                    theme_index,
                    notifications: Vec::new(),
                    ..self.clone()
                })
            }
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Side to move, or `None` once the game is over.
    pub fn current_player(&self) -> Option<Player> {
        match self.phase {
            Phase::Playing(player) => Some(player),
            Phase::GameOver(_) => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.phase {
            Phase::GameOver(result) => Some(result),
            Phase::Playing(_) => None,
        }
    }

    pub fn theme(&self) -> &str {
        &self.themes[self.theme_index]
    }

    /// Notifications raised by the transition that produced this state.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    /// Cells flipped by the most recent move.
    pub fn flipped(&self) -> &[Position] {
        &self.flipped
    }

    pub fn valid_moves(&self) -> Vec<Move> {
        self.current_player()
            .map(|player| rules::valid_moves(&self.board, player))
            .unwrap_or_default()
    }

    pub fn to_view(&self) -> GameView {
        let (black_count, white_count) = self.board.count();
        let current_player = match self.phase {
            Phase::Playing(player) => player,
            Phase::GameOver(_) => self.next_player_after_game_over(),
        };
        GameView {
            board: self.board.to_array().to_vec(),
            current_player,
            black_count,
            white_count,
            is_game_over: self.is_game_over(),
            result: self.result(),
            valid_moves: self.valid_moves().iter().map(Move::position).collect(),
            flipped: self.flipped.clone(),
            last_move: self.last_move,
            theme: self.theme().to_string(),
            notifications: self.notifications.clone(),
        }
    }

    fn play(&self, pos: Position) -> Result<Self, GameError> {
        let player = match self.phase {
            Phase::Playing(player) => player,
            Phase::GameOver(_) => return Err(GameError::GameOver),
        };

        let mv = rules::find_move(&self.board, player, pos).ok_or(GameError::IllegalMove {
            row: pos.row(),
            col: pos.col(),
        })?;
        let board = rules::apply_move(&self.board, player, &mv)?;
        debug!(
            %player,
            row = pos.row(),
            col = pos.col(),
            flipped = mv.flips().len(),
            "move applied"
        );

        let next = Self {
            board,
            phase: Phase::Playing(player.opponent()),
            themes: Rc::clone(&self.themes),
            theme_index: self.theme_index,
            last_move: Some(pos),
            flipped: mv.into_flips(),
            notifications: Vec::new(),
        };
        Ok(next.settle())
    }

    /// Post-transition hook: resolves a forced pass or the end of the game.
    ///
    /// The side to move is checked first; the opponent only when the side
    /// to move is stuck.
    fn settle(mut self) -> Self {
        let Phase::Playing(player) = self.phase else {
            return self;
        };
        if rules::has_valid_move(&self.board, player) {
            return self;
        }

        let opponent = player.opponent();
        if rules::has_valid_move(&self.board, opponent) {
            debug!(%player, "no legal move, turn passes");
            self.notifications.push(Notification::Pass { player });
            self.phase = Phase::Playing(opponent);
        } else {
            let result = rules::game_result(&self.board);
            info!(
                black = result.black_count,
                white = result.white_count,
                winner = ?result.winner,
                "game over"
            );
            self.notifications.push(Notification::GameOver { result });
            self.phase = Phase::GameOver(result);
        }
        self
    }

    fn next_player_after_game_over(&self) -> Player {
        match self.last_move.map(|pos| self.board.cell(pos).owner()) {
            Some(Some(mover)) => mover.opponent(),
            _ => Player::Black,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        let config = AppConfig::default();
        let theme_index = config.initial_theme_index();
        Self::start(Rc::from(config.themes), theme_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: u8, col: u8) -> Position {
        Position::new(row, col).unwrap()
    }

    fn board(rows: &str) -> Board {
        rows.parse().unwrap()
    }

    #[test]
    fn initial_state_is_correct() {
        let game = GameState::default();
        let view = game.to_view();

        assert_eq!(game.phase(), Phase::Playing(Player::Black));
        assert_eq!(view.black_count, 2);
        assert_eq!(view.white_count, 2);
        assert!(!view.is_game_over);
        assert!(view.flipped.is_empty());
        assert!(view.notifications.is_empty());
        assert_eq!(view.valid_moves.len(), 4);
        assert_eq!(view.theme, "light");
    }

    #[test]
    fn legal_move_switches_turn_and_records_flips() {
        let game = GameState::default();

        let next = game.update(Action::Play(p(2, 3))).unwrap();

        assert_eq!(next.phase(), Phase::Playing(Player::White));
        assert_eq!(next.flipped(), &[p(3, 3)]);
        assert_eq!(next.last_move(), Some(p(2, 3)));
        assert_eq!(next.board().count(), (4, 1));
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn illegal_move_returns_error() {
        let game = GameState::default();

        let err = game.update(Action::Play(p(0, 0))).unwrap_err();

        assert_eq!(err, GameError::IllegalMove { row: 0, col: 0 });
        assert_eq!(
            game.update(Action::Play(p(3, 3))).unwrap_err(),
            GameError::IllegalMove { row: 3, col: 3 }
        );
    }

    #[test]
    fn pass_switches_turn_without_touching_board() {
        // Black's only stone is walled in; White can still take (0,0).
        let b = board(
            ".BWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW",
        );
        assert!(rules::valid_moves(&b, Player::Black).is_empty());

        let game = GameState::with_position(b, Player::Black, &AppConfig::default()).unwrap();

        assert_eq!(game.board(), &b);
        assert_eq!(game.phase(), Phase::Playing(Player::White));
        assert_eq!(
            game.notifications(),
            &[Notification::Pass {
                player: Player::Black
            }]
        );
        assert!(game.flipped().is_empty());
    }

    #[test]
    fn move_that_leaves_opponent_stuck_emits_pass() {
        // After White takes (0,0) Black's only stone sits beside the white
        // corner and cannot flank anything, while White can still play (7,5).
        let b = board(
            ".BW.....
             ........
             ........
             ........
             ........
             ........
             ........
             ......BW",
        );
        let game = GameState::with_position(b, Player::White, &AppConfig::default()).unwrap();
        assert_eq!(game.phase(), Phase::Playing(Player::White));

        let next = game.update(Action::Play(p(0, 0))).unwrap();

        assert_eq!(next.flipped(), &[p(0, 1)]);
        assert_eq!(next.phase(), Phase::Playing(Player::White));
        assert_eq!(
            next.notifications(),
            &[Notification::Pass {
                player: Player::Black
            }]
        );
    }

    #[test]
    fn both_sides_stuck_ends_game() {
        let b = board(
            ".BBBBBBB
             BBBBBBBB
             BBBBBBBB
             BBBBBBBB
             BBBBBBBB
             BBBBBBBB
             BBBBBBBB
             BBBBBBBB",
        );

        let game = GameState::with_position(b, Player::Black, &AppConfig::default()).unwrap();

        assert!(game.is_game_over());
        let result = game.result().unwrap();
        assert_eq!(result.winner, Some(Player::Black));
        assert_eq!(
            game.notifications(),
            &[Notification::GameOver { result }]
        );
        assert!(game.valid_moves().is_empty());
        assert_eq!(game.update(Action::Play(p(0, 0))), Err(GameError::GameOver));
    }

    #[test]
    fn filling_last_square_ends_game() {
        let b = board(
            ".BWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW
             WWWWWWWW",
        );
        let game = GameState::with_position(b, Player::White, &AppConfig::default()).unwrap();

        let over = game.update(Action::Play(p(0, 0))).unwrap();
        let view = over.to_view();

        assert!(view.is_game_over);
        assert_eq!(view.black_count, 0);
        assert_eq!(view.white_count, 64);
        assert_eq!(view.flipped, vec![p(0, 1)]);
        assert_eq!(view.current_player, Player::Black);
        assert_eq!(
            view.result.map(|r| r.winner),
            Some(Some(Player::White))
        );
    }

    #[test]
    fn scoring_33_to_31_is_black_win() {
        let black = (1u64 << 33) - 1;
        let b = Board::from_bitboards(black, !black);

        let game = GameState::with_position(b, Player::White, &AppConfig::default()).unwrap();

        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: Some(Player::Black),
                black_count: 33,
                white_count: 31,
            })
        );
    }

    #[test]
    fn equal_counts_end_in_draw() {
        let black = 0x0000_0000_FFFF_FFFF;
        let b = Board::from_bitboards(black, !black);

        let game = GameState::with_position(b, Player::Black, &AppConfig::default()).unwrap();

        let result = GameResult {
            winner: None,
            black_count: 32,
            white_count: 32,
        };
        assert_eq!(game.phase(), Phase::GameOver(result));
        assert!(game.result().is_some_and(|r| r.is_draw()));
        assert_eq!(game.notifications(), &[Notification::GameOver { result }]);
        assert!(game.to_view().valid_moves.is_empty());
    }

    #[test]
    fn reset_restores_start_and_keeps_theme() {
        let game = GameState::default()
            .update(Action::CycleTheme)
            .and_then(|g| g.update(Action::Play(p(2, 3))))
            .unwrap();

        let fresh = game.update(Action::Reset).unwrap();

        assert_eq!(fresh.board(), &Board::new());
        assert_eq!(fresh.phase(), Phase::Playing(Player::Black));
        assert!(fresh.flipped().is_empty());
        assert_eq!(fresh.last_move(), None);
        assert_eq!(fresh.theme(), "dark");
    }

    #[test]
    fn theme_cycles_in_order_and_wraps() {
        let mut game = GameState::default();
        let mut seen = Vec::new();
        for _ in 0..5 {
            game = game.update(Action::CycleTheme).unwrap();
            seen.push(game.theme().to_string());
        }

        assert_eq!(seen, vec!["dark", "rose", "orange", "light", "dark"]);
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn theme_can_change_after_game_over() {
        let full = Board::from_bitboards(u64::MAX, 0);
        let game = GameState::with_position(full, Player::Black, &AppConfig::default()).unwrap();

        let next = game.update(Action::CycleTheme).unwrap();

        assert!(next.is_game_over());
        assert_eq!(next.theme(), "dark");
        assert!(next.notifications().is_empty());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = AppConfig {
            themes: Vec::new(),
            initial_theme: None,
        };

        assert!(GameState::new(&config).is_err());
    }

    #[test]
    fn random_playout_always_terminates() {
        let mut game = GameState::default();
        let mut turns = 0;
        while !game.is_game_over() {
            let moves = game.valid_moves();
            let target = moves[turns % moves.len()].position();
            game = game.update(Action::Play(target)).unwrap();
            turns += 1;
            assert!(turns <= 60);
        }

        let (black, white) = game.board().count();
        assert_eq!(game.result(), Some(GameResult::from_counts(black, white)));
    }
}
