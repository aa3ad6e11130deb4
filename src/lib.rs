use tracing::warn;
use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod rules;
pub mod types;

pub use board::Board;
pub use config::AppConfig;
pub use error::{ConfigError, GameError};
pub use game::{Action, GameState, Phase};
pub use rules::{
    Move, apply_move, find_move, game_result, has_valid_move, is_terminal, valid_moves,
};
pub use types::{Cell, Direction, GameResult, GameView, Notification, Player, Position};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Game handle owned by the page. Holds the current [`GameState`] and swaps
/// in the successor on every accepted action.
#[wasm_bindgen]
pub struct OthelloApp {
    state: GameState,
}

#[wasm_bindgen]
impl OthelloApp {
    /// `config` may be `undefined`/`null` for defaults, or an object with
    /// `themes` and `initial_theme`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<OthelloApp, JsError> {
        let config = parse_config(config)?;
        let state = GameState::new(&config)?;
        Ok(Self { state })
    }

    pub fn view(&self) -> Result<JsValue, JsError> {
        to_js(&self.state.to_view())
    }

    /// Handles a click on `(row, col)`. Clicks that are not a legal move are
    /// ignored and the unchanged view is returned.
    pub fn play(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        match Position::new(row, col).and_then(|pos| self.state.update(Action::Play(pos))) {
            Ok(next) => self.state = next,
            Err(err) => warn!(row, col, %err, "click ignored"),
        }
        self.view()
    }

    pub fn reset(&mut self) -> Result<JsValue, JsError> {
        self.dispatch(Action::Reset)
    }

    #[wasm_bindgen(js_name = cycleTheme)]
    pub fn cycle_theme(&mut self) -> Result<JsValue, JsError> {
        self.dispatch(Action::CycleTheme)
    }

    fn dispatch(&mut self, action: Action) -> Result<JsValue, JsError> {
        self.state = self.state.update(action)?;
        self.view()
    }
}

fn parse_config(value: JsValue) -> Result<AppConfig, ConfigError> {
    if value.is_undefined() || value.is_null() {
        return Ok(AppConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| ConfigError::Deserialize(e.to_string()))
}

fn to_js(view: &GameView) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(view).map_err(|e| JsError::new(&e.to_string()))
}
