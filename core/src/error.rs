use thiserror::Error;

/// Reasons a tower placement is refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The footprint would extend past the board edge.
    #[error("position is too close to the board edge")]
    OutOfBounds,
    /// The position overlaps the enemy path.
    #[error("position overlaps the enemy path")]
    OnPath,
    /// The position overlaps the base.
    #[error("position overlaps the base")]
    OnBase,
    /// The position overlaps an existing tower.
    #[error("position overlaps another tower")]
    OnTower,
}

/// Reasons a player command is rejected without mutating state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The credit balance does not cover the cost.
    #[error("insufficient funds: {required} credits required, {available} available")]
    InsufficientFunds {
        /// Credits the action costs.
        required: u32,
        /// Credits on hand.
        available: u32,
    },
    /// The tower cannot be placed at the requested position.
    #[error("invalid placement: {0}")]
    InvalidPlacement(PlacementError),
    /// The attribute key does not name an upgrade.
    #[error("unknown attribute `{0}`")]
    InvalidAttribute(String),
    /// The tower already carries a specialization.
    #[error("tower is already specialized")]
    AlreadySpecialized,
    /// The specialization is not offered for the tower's kind.
    #[error("specialization is not offered for this tower")]
    InvalidSpecialization,
    /// No tower exists with the provided identifier.
    #[error("unknown tower")]
    UnknownTower,
    /// A wave is already in progress.
    #[error("a wave is already active")]
    WaveAlreadyActive,
    /// The base has fallen; only a restart is accepted.
    #[error("the base has been destroyed")]
    BaseDestroyed,
}

impl From<PlacementError> for CommandError {
    fn from(reason: PlacementError) -> Self {
        Self::InvalidPlacement(reason)
    }
}

/// Reasons a game configuration is refused.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The board cannot hold the path margins plus a minimal walk.
    #[error("board of {width}x{height} is too small, need at least {min_width}x{min_height}")]
    BoardTooSmall {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
        /// Smallest accepted width.
        min_width: f32,
        /// Smallest accepted height.
        min_height: f32,
    },
    /// The fixed tick step must advance time.
    #[error("tick step must be greater than zero")]
    ZeroTickStep,
}
