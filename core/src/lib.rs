#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Aegis Defence engine.
//!
//! This crate defines the message surface that connects the session clock,
//! the authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that systems
//! and presentation layers react to. Systems consume immutable snapshots and
//! respond exclusively with new command batches.

use std::{collections::VecDeque, fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod base;
mod config;
mod error;
mod stats;

pub use base::{
    base_upgrade_cost, max_hp_for_level, rate_of_fire_boost, shields_for_level,
    tower_damage_reduction, BaseLevels, BASE_BREACH_DAMAGE, BASE_STARTING_HP,
    BASE_STARTING_SHIELDS, UNKNOWN_BASE_ATTRIBUTE_COST,
};
pub use config::{BoardConfig, GameConfig};
pub use error::{CommandError, ConfigError, PlacementError};
pub use stats::{
    level_multiplier, sell_value, tower_upgrade_cost, tower_upgrade_cost_for_key,
    wave_completion_bonus, AttackPattern, EnemyProfile, SlowEffect, TowerBaseStats, TowerStats,
    UpgradeLevels, DOT_TICK_INTERVAL, NOMINAL_FRAME_MS, SPECIALIZATION_COST, SPLASH_RADIUS,
    UNKNOWN_TOWER_ATTRIBUTE_COST,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Aegis Defence.";

/// Top-level phase of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Normal play: waves may be started and the clock advances the world.
    Playing,
    /// The base fell; only a restart resumes play.
    GameOver,
}

/// Playback speed applied to raw elapsed-time samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedMultiplier {
    /// Real-time playback.
    #[default]
    Normal,
    /// Fast-forward playback at twice the real-time rate.
    Double,
}

impl SpeedMultiplier {
    /// Scaling factor applied to elapsed time.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
        }
    }

    /// Returns the other speed setting.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Normal,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Clears every entity and installs a freshly generated path.
    ResetSession {
        /// Play field dimensions used for placement bounds.
        board: BoardConfig,
        /// Route enemies follow; its final point anchors the base.
        path: Path,
        /// Credit balance the session starts with.
        starting_credits: u32,
        /// Number of breaches the session tolerates.
        starting_lives: u32,
    },
    /// Advances the simulation clock by the provided (already scaled) delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy of the given kind enter the path.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Records the enemy a tower is currently locked on to.
    AssignTarget {
        /// Tower whose target changes.
        tower: TowerId,
        /// New target handle, or `None` when nothing is in range.
        target: Option<EnemyId>,
    },
    /// Requests that a tower attack using its current attack pattern.
    FireTower {
        /// Tower performing the attack.
        tower: TowerId,
        /// Primary target of the attack.
        target: EnemyId,
    },
    /// Requests placement of a tower centred on the provided position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Board position of the tower centre.
        position: Vec2,
    },
    /// Requests a single-level upgrade of a tower attribute.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
        /// Attribute that gains a level.
        attribute: TowerAttribute,
    },
    /// Requests a permanent specialization for a tower.
    SpecializeTower {
        /// Tower to specialize.
        tower: TowerId,
        /// Specialization option to apply.
        specialization: Specialization,
    },
    /// Requests the sale of a tower.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Requests a single-level upgrade of a base attribute.
    UpgradeBase {
        /// Attribute that gains a level.
        attribute: BaseAttribute,
    },
    /// Marks the current wave as active.
    StartWave,
    /// Closes the active wave: repairs the base and pays the completion bonus.
    CompleteWave,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the world was cleared and reinitialized.
    SessionReset {
        /// Number of points in the newly installed path.
        path_points: usize,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Position the enemy starts at.
        position: Vec2,
        /// Wave-scaled maximum health.
        max_health: f32,
    },
    /// Reports the position of an enemy after movement.
    EnemyMoved {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Position after the move.
        position: Vec2,
    },
    /// Reports damage applied to an enemy after damage reduction.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage applied after reduction.
        amount: f32,
        /// Remaining health.
        health: f32,
    },
    /// Reports that a slow status was applied or refreshed on an enemy.
    EnemySlowed {
        /// Enemy that was slowed.
        enemy: EnemyId,
        /// Fractional speed penalty.
        magnitude: f32,
        /// Duration of the slow.
        duration: Duration,
    },
    /// Reports that an enemy died and its reward was credited.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Credits awarded for the kill.
        reward: u32,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyReachedBase {
        /// Enemy that breached the base.
        enemy: EnemyId,
    },
    /// Reports damage taken by the base.
    BaseDamaged {
        /// Damage applied.
        amount: f32,
        /// Remaining hit points.
        hp: f32,
        /// Lives remaining after the breach.
        lives: u32,
    },
    /// Reports a between-wave repair of the base.
    BaseRepaired {
        /// Hit points restored.
        amount: f32,
        /// Hit points after the repair.
        hp: f32,
    },
    /// Confirms a base upgrade.
    BaseUpgraded {
        /// Attribute that was upgraded.
        attribute: BaseAttribute,
        /// Level reached.
        level: u32,
        /// Credits spent.
        cost: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower placed.
        kind: TowerKind,
        /// Board position of the tower centre.
        position: Vec2,
        /// Credits spent.
        cost: u32,
    },
    /// Confirms a tower upgrade.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Attribute that was upgraded.
        attribute: TowerAttribute,
        /// Level reached.
        level: u32,
        /// Credits spent.
        cost: u32,
    },
    /// Confirms a tower specialization.
    TowerSpecialized {
        /// Tower that was specialized.
        tower: TowerId,
        /// Specialization applied.
        specialization: Specialization,
        /// Credits spent.
        cost: u32,
    },
    /// Confirms a tower sale.
    TowerSold {
        /// Tower that was sold.
        tower: TowerId,
        /// Credits refunded.
        refund: u32,
    },
    /// Reports a tower attack for effect rendering.
    TowerFired {
        /// Tower that attacked.
        tower: TowerId,
        /// Pattern used for the attack.
        pattern: AttackPattern,
        /// Every enemy affected by the attack.
        targets: Vec<EnemyId>,
    },
    /// Reports the credit balance after a change.
    CreditsChanged {
        /// Credits available.
        credits: u32,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// Wave number that started.
        wave: u32,
    },
    /// Announces the completion of a wave.
    WaveCompleted {
        /// Wave number reached after completion.
        wave: u32,
        /// Credits awarded for the completion.
        bonus: u32,
    },
    /// Announces that the base was destroyed.
    GameOver {
        /// Wave the session ended on.
        wave: u32,
    },
    /// Reports that a player command was rejected without mutating state.
    CommandRejected {
        /// Reason for the rejection.
        reason: CommandError,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Ordered route from the left board edge to the base anchor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Vec2>,
}

impl Path {
    /// Creates a path from ordered points.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Ordered points composing the path.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of points in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the path has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Entry point of the path.
    #[must_use]
    pub fn start(&self) -> Option<Vec2> {
        self.points.first().copied()
    }

    /// Terminal point of the path, where the base sits.
    #[must_use]
    pub fn base_anchor(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Point at the provided index.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }
}

/// Enemy archetypes that compose waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast, fragile swarm unit.
    Light,
    /// Mid-weight unit with partial damage reduction.
    Armored,
    /// Slow, heavily armored unit.
    Heavy,
}

impl EnemyKind {
    /// Every enemy kind ordered from lightest to heaviest.
    pub const ALL: [EnemyKind; 3] = [Self::Light, Self::Armored, Self::Heavy];

    /// Returns the base profile for the kind.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            Self::Light => EnemyProfile {
                base_health: 50.0,
                base_speed: 2.0,
                armor: 0.0,
                damage_reduction: 0.0,
                scaling_factor: 1.15,
            },
            Self::Armored => EnemyProfile {
                base_health: 150.0,
                base_speed: 1.2,
                armor: 10.0,
                damage_reduction: 0.1,
                scaling_factor: 1.2,
            },
            Self::Heavy => EnemyProfile {
                base_health: 300.0,
                base_speed: 0.7,
                armor: 25.0,
                damage_reduction: 0.25,
                scaling_factor: 1.3,
            },
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Plasma cannon striking one enemy at a time.
    SingleTarget,
    /// Tesla coil arcing across several enemies at once.
    MultiChain,
    /// Graviton emitter slowing several enemies at once.
    MultiDebuff,
}

impl TowerKind {
    /// Every tower kind in catalogue order.
    pub const ALL: [TowerKind; 3] = [Self::SingleTarget, Self::MultiChain, Self::MultiDebuff];

    /// Returns the unleveled stat block for the kind.
    #[must_use]
    pub const fn base_stats(self) -> TowerBaseStats {
        match self {
            Self::SingleTarget => TowerBaseStats {
                damage: 25.0,
                range: 200.0,
                attack_speed: 2.0,
                pattern: AttackPattern::Single,
                max_targets: 1,
                slow: None,
            },
            Self::MultiChain => TowerBaseStats {
                damage: 10.0,
                range: 150.0,
                attack_speed: 1.5,
                pattern: AttackPattern::Chain,
                max_targets: 3,
                slow: None,
            },
            Self::MultiDebuff => TowerBaseStats {
                damage: 0.0,
                range: 175.0,
                attack_speed: 1.0,
                pattern: AttackPattern::Debuff,
                max_targets: 4,
                slow: Some(SlowEffect::new(0.3, Duration::from_millis(2_000))),
            },
        }
    }

    /// Credits required to place the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::SingleTarget => 50,
            Self::MultiChain => 75,
            Self::MultiDebuff => 100,
        }
    }

    /// Specialization options offered for the kind.
    #[must_use]
    pub const fn specializations(self) -> [Specialization; 3] {
        match self {
            Self::SingleTarget => [
                Specialization::Overload,
                Specialization::Explosive,
                Specialization::GravitonRounds,
            ],
            Self::MultiChain => [
                Specialization::HighVoltage,
                Specialization::FocusedLightning,
                Specialization::ElectroPulse,
            ],
            Self::MultiDebuff => [
                Specialization::EventHorizon,
                Specialization::Singularity,
                Specialization::Railgun,
            ],
        }
    }
}

/// Permanent structural upgrades available to towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    /// Doubles damage at the cost of attack speed.
    Overload,
    /// Converts single hits into splash damage.
    Explosive,
    /// Adds an on-hit slow to single hits.
    GravitonRounds,
    /// Raises damage, range, and the chain target count.
    HighVoltage,
    /// Collapses the chain into one high-damage bolt.
    FocusedLightning,
    /// Adds an on-hit slow to chained bolts.
    ElectroPulse,
    /// Stronger, longer slow on more targets with extra range.
    EventHorizon,
    /// Replaces the slow with damage over time.
    Singularity,
    /// Replaces the slow with a direct-damage slug.
    Railgun,
}

impl Specialization {
    /// Tower kind that offers this specialization.
    #[must_use]
    pub const fn tower_kind(self) -> TowerKind {
        match self {
            Self::Overload | Self::Explosive | Self::GravitonRounds => TowerKind::SingleTarget,
            Self::HighVoltage | Self::FocusedLightning | Self::ElectroPulse => TowerKind::MultiChain,
            Self::EventHorizon | Self::Singularity | Self::Railgun => TowerKind::MultiDebuff,
        }
    }

    /// Credits required to apply the specialization.
    #[must_use]
    pub const fn cost(self) -> u32 {
        SPECIALIZATION_COST
    }

    /// Display name of the specialization.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Overload => "Plasma Overload",
            Self::Explosive => "Explosive Shot",
            Self::GravitonRounds => "Graviton Rounds",
            Self::HighVoltage => "High Voltage",
            Self::FocusedLightning => "Focused Lightning",
            Self::ElectroPulse => "Electro-Gravitic Pulse",
            Self::EventHorizon => "Event Horizon",
            Self::Singularity => "Singularity Collapse",
            Self::Railgun => "Kinetic Railgun",
        }
    }
}

/// Tower attributes that can be upgraded independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerAttribute {
    /// Targeting radius.
    Range,
    /// Damage per hit.
    Damage,
    /// Attacks per second.
    AttackSpeed,
}

impl TowerAttribute {
    /// Every upgradeable tower attribute.
    pub const ALL: [TowerAttribute; 3] = [Self::Range, Self::Damage, Self::AttackSpeed];

    /// Stable string key of the attribute.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Damage => "damage",
            Self::AttackSpeed => "attackSpeed",
        }
    }
}

impl FromStr for TowerAttribute {
    type Err = CommandError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "range" => Ok(Self::Range),
            "damage" => Ok(Self::Damage),
            "attackSpeed" | "attack_speed" => Ok(Self::AttackSpeed),
            other => Err(CommandError::InvalidAttribute(other.to_owned())),
        }
    }
}

impl fmt::Display for TowerAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Base attributes that can be upgraded independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseAttribute {
    /// Between-wave repair capacity.
    Shields,
    /// Tower rate-of-fire boost.
    Energy,
    /// Maximum hit points.
    Hp,
}

impl BaseAttribute {
    /// Every upgradeable base attribute.
    pub const ALL: [BaseAttribute; 3] = [Self::Shields, Self::Energy, Self::Hp];

    /// Stable string key of the attribute.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Shields => "shields",
            Self::Energy => "energy",
            Self::Hp => "hp",
        }
    }
}

impl FromStr for BaseAttribute {
    type Err = CommandError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "shields" => Ok(Self::Shields),
            "energy" => Ok(Self::Energy),
            "hp" => Ok(Self::Hp),
            other => Err(CommandError::InvalidAttribute(other.to_owned())),
        }
    }
}

impl fmt::Display for BaseAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Scheduled release of one enemy, relative to the start of its wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Kind of enemy to release.
    pub kind: EnemyKind,
    /// Offset from the wave start at which the enemy enters the path.
    pub delay: Duration,
}

/// Spawn entries of a wave ordered by non-decreasing delay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveSpawnQueue {
    entries: VecDeque<SpawnEntry>,
}

impl WaveSpawnQueue {
    /// Builds a queue from unordered entries. Equal delays keep their input order.
    #[must_use]
    pub fn from_entries(mut entries: Vec<SpawnEntry>) -> Self {
        entries.sort_by_key(|entry| entry.delay);
        Self {
            entries: entries.into(),
        }
    }

    /// Iterator over the pending entries in release order.
    pub fn iter(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.entries.iter()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether every entry has been released.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the front entry when its delay has elapsed.
    pub fn pop_due(&mut self, elapsed: Duration) -> Option<SpawnEntry> {
        if self.entries.front()?.delay <= elapsed {
            self.entries.pop_front()
        } else {
            None
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Board position of the enemy.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Wave-scaled maximum health.
    pub max_health: f32,
    /// Indicates whether a slow status is in effect.
    pub slowed: bool,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Read-only snapshot describing all active enemies.
///
/// Snapshots are kept in spawn order, which is also the enumeration order
/// towers use when breaking distance ties and filling multi-target attacks.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of active enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Board position of the tower centre.
    pub position: Vec2,
    /// Upgrade levels of the three attributes.
    pub levels: UpgradeLevels,
    /// Specialization, once chosen.
    pub specialization: Option<Specialization>,
    /// Stats derived from kind, levels, and specialization.
    pub stats: TowerStats,
    /// Enemy the tower is locked on to, if any.
    pub target: Option<EnemyId>,
    /// Simulated time remaining before the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of towers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the board has no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the base used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseSnapshot {
    /// Board position of the base.
    pub position: Vec2,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Hit points restored by a between-wave repair.
    pub shields: f32,
    /// Upgrade levels of the three base attributes.
    pub levels: BaseLevels,
    /// Rate-of-fire multiplier granted to towers by the energy level.
    pub rate_of_fire_boost: f32,
    /// Damage reduction derived from the hp level.
    pub tower_damage_reduction: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specializations_belong_to_the_offering_kind() {
        for kind in TowerKind::ALL {
            for specialization in kind.specializations() {
                assert_eq!(specialization.tower_kind(), kind);
            }
        }
    }

    #[test]
    fn tower_attribute_keys_parse_back() {
        for attribute in TowerAttribute::ALL {
            assert_eq!(attribute.key().parse::<TowerAttribute>(), Ok(attribute));
        }
        assert_eq!(
            "splash".parse::<TowerAttribute>(),
            Err(CommandError::InvalidAttribute("splash".to_owned()))
        );
    }

    #[test]
    fn base_attribute_keys_parse_back() {
        for attribute in BaseAttribute::ALL {
            assert_eq!(attribute.key().parse::<BaseAttribute>(), Ok(attribute));
        }
        assert!("armor".parse::<BaseAttribute>().is_err());
    }

    #[test]
    fn speed_multiplier_toggles_between_settings() {
        assert_eq!(SpeedMultiplier::default().factor(), 1);
        assert_eq!(SpeedMultiplier::Normal.toggled(), SpeedMultiplier::Double);
        assert_eq!(SpeedMultiplier::Double.toggled().factor(), 1);
    }

    #[test]
    fn enemy_view_preserves_spawn_order() {
        let snapshot = |id| EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Light,
            position: Vec2::ZERO,
            health: 25.0,
            max_health: 50.0,
            slowed: false,
        };
        let view = EnemyView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);
        let ids: Vec<u32> = view.iter().map(|enemy| enemy.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(view.get(EnemyId::new(2)).is_some());
        assert!(view.get(EnemyId::new(3)).is_none());
        assert!((snapshot(1).health_fraction() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn spawn_queue_releases_in_delay_order() {
        let entry = |kind, millis| SpawnEntry {
            kind,
            delay: Duration::from_millis(millis),
        };
        let mut queue = WaveSpawnQueue::from_entries(vec![
            entry(EnemyKind::Heavy, 900),
            entry(EnemyKind::Light, 100),
            entry(EnemyKind::Armored, 100),
        ]);
        assert_eq!(queue.pop_due(Duration::from_millis(99)), None);
        assert_eq!(
            queue.pop_due(Duration::from_millis(100)),
            Some(entry(EnemyKind::Light, 100))
        );
        assert_eq!(
            queue.pop_due(Duration::from_millis(100)),
            Some(entry(EnemyKind::Armored, 100))
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(Duration::from_millis(100)), None);
    }

    #[test]
    fn path_exposes_entry_and_anchor() {
        let path = Path::new(vec![Vec2::new(0.0, 80.0), Vec2::new(885.0, 160.0)]);
        assert_eq!(path.start(), Some(Vec2::new(0.0, 80.0)));
        assert_eq!(path.base_anchor(), Some(Vec2::new(885.0, 160.0)));
        assert!(Path::default().is_empty());
    }
}
