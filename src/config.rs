use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_THEMES: [&str; 4] = ["light", "dark", "rose", "orange"];

/// Host-supplied settings. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Theme names in cycling order. The host maps them to stylesheet classes.
    pub themes: Vec<String>,
    /// Theme shown on start; the first theme when unset.
    pub initial_theme: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            themes: DEFAULT_THEMES.iter().map(|t| t.to_string()).collect(),
            initial_theme: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.themes.is_empty() {
            return Err(ConfigError::Validation("themes must not be empty".into()));
        }
        if let Some(blank) = self.themes.iter().position(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "themes[{blank}] must not be blank"
            )));
        }
        if let Some(initial) = &self.initial_theme
            && !self.themes.contains(initial)
        {
            return Err(ConfigError::Validation(format!(
                "initial_theme {initial:?} is not in themes"
            )));
        }
        Ok(())
    }

    /// Index into `themes` of the starting theme.
    pub fn initial_theme_index(&self) -> usize {
        self.initial_theme
            .as_ref()
            .and_then(|initial| self.themes.iter().position(|t| t == initial))
            .unwrap_or(0)
    }
}
