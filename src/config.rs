//! Validated game configuration.
//!
//! The rule engine accepts any non-empty grid, so custom test positions can be
//! tiny. Games started through the binary or the protocol go through
//! [`GameConfig::new`], which enforces [`MIN_SIZE`]`..=`[`MAX_SIZE`].

use thiserror::Error;

use crate::board::Diagonals;
use crate::constants::{DEFAULT_HEIGHT, DEFAULT_MAX_PLIES, DEFAULT_WIDTH, MAX_SIZE, MIN_SIZE};

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width {0} is outside {min}..={max}", min = MIN_SIZE, max = MAX_SIZE)]
    WidthOutOfRange(usize),
    #[error("board height {0} is outside {min}..={max}", min = MIN_SIZE, max = MAX_SIZE)]
    HeightOutOfRange(usize),
}

/// Parameters fixed at the start of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub diagonals: Diagonals,
    /// Move applications before the match runner calls a draw.
    pub max_plies: usize,
    /// Base seed for the agents' random number generators.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            diagonals: Diagonals::All,
            max_plies: DEFAULT_MAX_PLIES,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Create a configuration for a `width x height` board.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&width) {
            return Err(ConfigError::WidthOutOfRange(width));
        }
        if !(MIN_SIZE..=MAX_SIZE).contains(&height) {
            return Err(ConfigError::HeightOutOfRange(height));
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    pub fn with_diagonals(mut self, diagonals: Diagonals) -> Self {
        self.diagonals = diagonals;
        self
    }

    pub fn with_max_plies(mut self, max_plies: usize) -> Self {
        self.max_plies = max_plies;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds() {
        assert!(GameConfig::new(MIN_SIZE, MAX_SIZE).is_ok());
        assert!(GameConfig::new(MAX_SIZE, MIN_SIZE).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(GameConfig::new(4, 7), Err(ConfigError::WidthOutOfRange(4)));
        assert_eq!(GameConfig::new(7, 11), Err(ConfigError::HeightOutOfRange(11)));
    }

    #[test]
    fn test_default_is_valid() {
        let cfg = GameConfig::default();
        assert_eq!(GameConfig::new(cfg.width, cfg.height), Ok(cfg));
    }
}
