use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const MIN_BOARD_WIDTH: f32 = 400.0;
const MIN_BOARD_HEIGHT: f32 = 360.0;

/// Dimensions of the play field in board units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 640.0,
        }
    }
}

/// Tunable parameters of a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play field dimensions.
    pub board: BoardConfig,
    /// Credits available when a session starts.
    pub starting_credits: u32,
    /// Breaches tolerated before the session ends.
    pub starting_lives: u32,
    /// Seed for path generation and wave jitter.
    pub seed: u64,
    /// Step used by fixed-step tick sources, in milliseconds.
    pub tick_step_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            starting_credits: 100,
            starting_lives: 10,
            seed: 0x5eed,
            tick_step_ms: 16,
        }
    }
}

impl GameConfig {
    /// Checks that the configuration can drive a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.width < MIN_BOARD_WIDTH || self.board.height < MIN_BOARD_HEIGHT {
            return Err(ConfigError::BoardTooSmall {
                width: self.board.width,
                height: self.board.height,
                min_width: MIN_BOARD_WIDTH,
                min_height: MIN_BOARD_HEIGHT,
            });
        }
        if self.tick_step_ms == 0 {
            return Err(ConfigError::ZeroTickStep);
        }
        Ok(())
    }

    /// Fixed tick step as a duration.
    #[must_use]
    pub const fn tick_step(&self) -> Duration {
        Duration::from_millis(self.tick_step_ms)
    }
}
