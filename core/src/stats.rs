use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Specialization, TowerAttribute, TowerKind};

/// Credits charged for any specialization.
pub const SPECIALIZATION_COST: u32 = 100;

/// Splash radius of explosive shots, measured from the struck enemy.
pub const SPLASH_RADIUS: f32 = 40.0;

/// Interval between damage-over-time ticks.
pub const DOT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Length of the nominal frame enemy speeds are expressed against, in milliseconds.
pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;

/// Nominal cost reported for attribute keys that do not name an upgrade.
pub const UNKNOWN_TOWER_ATTRIBUTE_COST: u32 = 25;

const TOWER_UPGRADE_BASE_COST: f64 = 25.0;
const TOWER_UPGRADE_GROWTH: f64 = 1.4;
const SELL_VALUE_PER_UPGRADE: u32 = 15;
const LEVEL_STEP: f32 = 0.2;

/// Shape of the damage a tower deals when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Damages the primary target only.
    Single,
    /// Damages every enemy within the splash radius of the primary target.
    Aoe,
    /// Damages the primary target plus further enemies within tower range.
    Chain,
    /// Slows the primary target plus further enemies within tower range.
    Debuff,
    /// Attaches a repeating damage tick to the primary target.
    DamageOverTime,
}

/// Movement penalty applied to an enemy for a limited time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Fraction of speed removed while the slow is active.
    pub magnitude: f32,
    /// How long the slow lasts once applied.
    pub duration: Duration,
}

impl SlowEffect {
    /// Creates a slow with the provided magnitude and duration.
    #[must_use]
    pub const fn new(magnitude: f32, duration: Duration) -> Self {
        Self {
            magnitude,
            duration,
        }
    }
}

/// Unscaled characteristics of an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    /// Health at wave one.
    pub base_health: f32,
    /// Distance covered per nominal frame.
    pub base_speed: f32,
    /// Flat armor rating, informational only.
    pub armor: f32,
    /// Fraction of incoming damage ignored.
    pub damage_reduction: f32,
    /// Per-wave health growth factor.
    pub scaling_factor: f32,
}

impl EnemyProfile {
    /// Maximum health of the archetype on the provided wave.
    #[must_use]
    pub fn max_health(&self, wave: u32) -> f32 {
        let exponent = i32::try_from(wave.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = f64::from(self.base_health) * f64::from(self.scaling_factor).powi(exponent);
        scaled.round() as f32
    }

    /// Credits awarded for killing the archetype on the provided wave.
    #[must_use]
    pub fn currency_value(&self, wave: u32) -> u32 {
        let value = f64::from(self.base_health) / 10.0 + 2.0 * f64::from(wave);
        value.floor() as u32
    }
}

/// Stat block of a tower kind before levels or specialization apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerBaseStats {
    /// Damage per hit.
    pub damage: f32,
    /// Targeting radius.
    pub range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Attack pattern.
    pub pattern: AttackPattern,
    /// Enemies affected per attack.
    pub max_targets: usize,
    /// Slow applied by debuff attacks.
    pub slow: Option<SlowEffect>,
}

/// Independent upgrade levels of a tower's attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeLevels {
    /// Range level.
    pub range: u32,
    /// Damage level.
    pub damage: u32,
    /// Attack speed level.
    pub attack_speed: u32,
}

impl Default for UpgradeLevels {
    fn default() -> Self {
        Self {
            range: 1,
            damage: 1,
            attack_speed: 1,
        }
    }
}

impl UpgradeLevels {
    /// Current level of the provided attribute.
    #[must_use]
    pub const fn get(&self, attribute: TowerAttribute) -> u32 {
        match attribute {
            TowerAttribute::Range => self.range,
            TowerAttribute::Damage => self.damage,
            TowerAttribute::AttackSpeed => self.attack_speed,
        }
    }

    /// Raises the provided attribute by one level and returns the new level.
    pub fn raise(&mut self, attribute: TowerAttribute) -> u32 {
        let level = match attribute {
            TowerAttribute::Range => &mut self.range,
            TowerAttribute::Damage => &mut self.damage,
            TowerAttribute::AttackSpeed => &mut self.attack_speed,
        };
        *level += 1;
        *level
    }

    /// Number of upgrades purchased across all attributes.
    #[must_use]
    pub fn purchased(&self) -> u32 {
        TowerAttribute::ALL
            .into_iter()
            .map(|attribute| self.get(attribute).saturating_sub(1))
            .sum()
    }

    /// Cost of the next upgrade for the provided attribute.
    #[must_use]
    pub fn upgrade_cost(&self, attribute: TowerAttribute) -> u32 {
        tower_upgrade_cost(self.get(attribute))
    }
}

/// Multiplier a stat receives at the provided upgrade level.
#[must_use]
pub fn level_multiplier(level: u32) -> f32 {
    1.0 + LEVEL_STEP * level.saturating_sub(1) as f32
}

/// Cost of raising a tower attribute that currently sits at `level`.
#[must_use]
pub fn tower_upgrade_cost(level: u32) -> u32 {
    let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    (TOWER_UPGRADE_BASE_COST * TOWER_UPGRADE_GROWTH.powi(exponent)).floor() as u32
}

/// Cost of the next upgrade for a string-keyed attribute.
///
/// Keys that do not name an attribute report a nominal cost instead of failing.
#[must_use]
pub fn tower_upgrade_cost_for_key(levels: &UpgradeLevels, key: &str) -> u32 {
    key.parse::<TowerAttribute>()
        .map_or(UNKNOWN_TOWER_ATTRIBUTE_COST, |attribute| {
            levels.upgrade_cost(attribute)
        })
}

/// Credits refunded when a tower is sold.
#[must_use]
pub fn sell_value(kind: TowerKind, levels: &UpgradeLevels, specialized: bool) -> u32 {
    let specialization = if specialized { SPECIALIZATION_COST } else { 0 };
    kind.cost() + SELL_VALUE_PER_UPGRADE * levels.purchased() + specialization
}

/// Credits awarded when the wave counter advances to `next_wave`.
#[must_use]
pub const fn wave_completion_bonus(next_wave: u32) -> u32 {
    50 + 10 * next_wave
}

/// Effective combat statistics of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage per hit, or per tick for damage over time.
    pub damage: f32,
    /// Targeting radius.
    pub range: f32,
    /// Attacks per second before the base energy boost.
    pub attack_speed: f32,
    /// Attack pattern.
    pub pattern: AttackPattern,
    /// Enemies affected per attack.
    pub max_targets: usize,
    /// Splash radius for area attacks.
    pub splash_radius: Option<f32>,
    /// Slow applied by debuff attacks or on hit.
    pub slow: Option<SlowEffect>,
    /// Total duration of damage over time.
    pub dot_duration: Option<Duration>,
}

impl TowerStats {
    /// Derives effective stats from kind, levels, and specialization.
    #[must_use]
    pub fn derive(
        kind: TowerKind,
        levels: &UpgradeLevels,
        specialization: Option<Specialization>,
    ) -> Self {
        let base = kind.base_stats();
        let damage_multiplier = level_multiplier(levels.damage);
        let mut stats = Self {
            damage: base.damage * damage_multiplier,
            range: base.range * level_multiplier(levels.range),
            attack_speed: base.attack_speed * level_multiplier(levels.attack_speed),
            pattern: base.pattern,
            max_targets: base.max_targets,
            splash_radius: None,
            slow: base.slow,
            dot_duration: None,
        };

        match specialization {
            None => {}
            Some(Specialization::Overload) => {
                stats.damage *= 2.0;
                stats.attack_speed *= 0.7;
            }
            Some(Specialization::Explosive) => {
                stats.pattern = AttackPattern::Aoe;
                stats.splash_radius = Some(SPLASH_RADIUS);
            }
            Some(Specialization::GravitonRounds) => {
                stats.slow = Some(SlowEffect::new(0.3, Duration::from_millis(1_500)));
            }
            Some(Specialization::HighVoltage) => {
                stats.damage *= 1.5;
                stats.max_targets = 4;
                stats.range *= 1.2;
            }
            Some(Specialization::FocusedLightning) => {
                stats.pattern = AttackPattern::Single;
                stats.max_targets = 1;
                stats.damage *= 3.0;
            }
            Some(Specialization::ElectroPulse) => {
                stats.slow = Some(SlowEffect::new(0.2, Duration::from_millis(1_000)));
            }
            Some(Specialization::EventHorizon) => {
                stats.slow = Some(SlowEffect::new(0.5, Duration::from_millis(4_000)));
                stats.max_targets = 6;
                stats.range *= 1.2;
            }
            Some(Specialization::Singularity) => {
                stats.pattern = AttackPattern::DamageOverTime;
                stats.max_targets = 1;
                stats.damage = 5.0 * damage_multiplier;
                stats.slow = None;
                stats.dot_duration = Some(Duration::from_millis(3_000));
            }
            Some(Specialization::Railgun) => {
                stats.pattern = AttackPattern::Single;
                stats.max_targets = 1;
                stats.damage = 40.0 * damage_multiplier;
                stats.slow = None;
                stats.attack_speed *= 1.2;
            }
        }

        stats
    }

    /// Minimum simulated time between attacks given the base rate-of-fire boost.
    #[must_use]
    pub fn attack_interval(&self, rate_of_fire_boost: f32) -> Duration {
        let attacks_per_second = self.attack_speed * rate_of_fire_boost;
        if attacks_per_second <= 0.0 {
            return Duration::MAX;
        }
        Duration::from_secs_f32(1.0 / attacks_per_second)
    }
}
