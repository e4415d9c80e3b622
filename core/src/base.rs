use serde::{Deserialize, Serialize};

use crate::BaseAttribute;

/// Maximum hit points of a base with no hp upgrades.
pub const BASE_STARTING_HP: f32 = 500.0;

/// Shield capacity of a base with no shield upgrades.
pub const BASE_STARTING_SHIELDS: f32 = 100.0;

/// Hit points removed each time an enemy reaches the base.
pub const BASE_BREACH_DAMAGE: f32 = 10.0;

/// Cost reported for attribute keys that do not name a base upgrade.
pub const UNKNOWN_BASE_ATTRIBUTE_COST: u32 = 0;

const BASE_UPGRADE_BASE_COST: f64 = 100.0;
const BASE_UPGRADE_GROWTH: f64 = 1.3;
const EARLY_LEVEL_CAP: u32 = 5;

/// Independent upgrade levels of the base's attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseLevels {
    /// Shield level.
    pub shields: u32,
    /// Energy level.
    pub energy: u32,
    /// Hit point level.
    pub hp: u32,
}

impl Default for BaseLevels {
    fn default() -> Self {
        Self {
            shields: 1,
            energy: 1,
            hp: 1,
        }
    }
}

impl BaseLevels {
    /// Current level of the provided attribute.
    #[must_use]
    pub const fn get(&self, attribute: BaseAttribute) -> u32 {
        match attribute {
            BaseAttribute::Shields => self.shields,
            BaseAttribute::Energy => self.energy,
            BaseAttribute::Hp => self.hp,
        }
    }

    /// Raises the provided attribute by one level and returns the new level.
    pub fn raise(&mut self, attribute: BaseAttribute) -> u32 {
        let level = match attribute {
            BaseAttribute::Shields => &mut self.shields,
            BaseAttribute::Energy => &mut self.energy,
            BaseAttribute::Hp => &mut self.hp,
        };
        *level += 1;
        *level
    }

    /// Cost of the next upgrade for the provided attribute.
    #[must_use]
    pub fn upgrade_cost(&self, attribute: BaseAttribute) -> u32 {
        base_upgrade_cost(self.get(attribute))
    }

    /// Cost of the next upgrade for a string-keyed attribute.
    #[must_use]
    pub fn upgrade_cost_for_key(&self, key: &str) -> u32 {
        key.parse::<BaseAttribute>()
            .map_or(UNKNOWN_BASE_ATTRIBUTE_COST, |attribute| {
                self.upgrade_cost(attribute)
            })
    }
}

/// Cost of raising a base attribute that currently sits at `level`.
#[must_use]
pub fn base_upgrade_cost(level: u32) -> u32 {
    let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    (BASE_UPGRADE_BASE_COST * BASE_UPGRADE_GROWTH.powi(exponent)).floor() as u32
}

/// Shield capacity at the provided shield level.
///
/// Growth is steeper once the level passes five.
#[must_use]
pub fn shields_for_level(level: u32) -> f32 {
    let level = level.max(1);
    if level <= EARLY_LEVEL_CAP {
        BASE_STARTING_SHIELDS + 37.5 * (level - 1) as f32
    } else {
        250.0 + 70.0 * (level - EARLY_LEVEL_CAP) as f32
    }
}

/// Tower rate-of-fire multiplier at the provided energy level.
#[must_use]
pub fn rate_of_fire_boost(level: u32) -> f32 {
    let level = level.max(1);
    if level <= EARLY_LEVEL_CAP {
        1.0 + 0.025 * (level - 1) as f32
    } else {
        1.15 + 0.03 * (level - EARLY_LEVEL_CAP) as f32
    }
}

/// Maximum hit points at the provided hp level.
#[must_use]
pub fn max_hp_for_level(level: u32) -> f32 {
    BASE_STARTING_HP * (1.0 + 0.2 * level.saturating_sub(1) as f32)
}

/// Tower damage reduction granted at the provided hp level.
#[must_use]
pub fn tower_damage_reduction(level: u32) -> f32 {
    0.02 * level.saturating_sub(1) as f32
}
