//! The home base and its upgradeable defenses.

use aegis_defence_core::{
    max_hp_for_level, rate_of_fire_boost, shields_for_level, tower_damage_reduction,
    BaseAttribute, BaseLevels, BaseSnapshot, BASE_STARTING_HP, BASE_STARTING_SHIELDS,
};
use glam::Vec2;

#[derive(Clone, Debug)]
pub(crate) struct Base {
    pub(crate) position: Vec2,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) shields: f32,
    pub(crate) levels: BaseLevels,
}

impl Base {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            hp: BASE_STARTING_HP,
            max_hp: BASE_STARTING_HP,
            shields: BASE_STARTING_SHIELDS,
            levels: BaseLevels::default(),
        }
    }

    /// Raises an attribute one level and returns the level reached.
    pub(crate) fn upgrade(&mut self, attribute: BaseAttribute) -> u32 {
        let level = self.levels.raise(attribute);
        match attribute {
            BaseAttribute::Shields => self.shields = shields_for_level(level),
            BaseAttribute::Energy => {}
            BaseAttribute::Hp => {
                let max_hp = max_hp_for_level(level);
                self.hp += max_hp - self.max_hp;
                self.max_hp = max_hp;
            }
        }
        level
    }

    /// Applies breach damage, clamping at zero. Returns the damage dealt.
    pub(crate) fn take_damage(&mut self, amount: f32) -> f32 {
        let dealt = amount.min(self.hp).max(0.0);
        self.hp -= dealt;
        dealt
    }

    /// Restores hit points up to the shield capacity. Returns the amount restored.
    pub(crate) fn repair(&mut self) -> f32 {
        let repaired = (self.hp + self.shields).min(self.max_hp);
        let restored = repaired - self.hp;
        self.hp = repaired;
        restored
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.hp <= 0.0
    }

    pub(crate) fn rate_of_fire_boost(&self) -> f32 {
        rate_of_fire_boost(self.levels.energy)
    }

    pub(crate) fn snapshot(&self) -> BaseSnapshot {
        BaseSnapshot {
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            shields: self.shields,
            levels: self.levels,
            rate_of_fire_boost: self.rate_of_fire_boost(),
            tower_damage_reduction: tower_damage_reduction(self.levels.hp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_caps_at_max_hp() {
        let mut base = Base::new(Vec2::ZERO);
        base.hp = 400.0;
        assert_eq!(base.repair(), 100.0);
        assert_eq!(base.hp, 500.0);

        base.hp = 300.0;
        assert_eq!(base.repair(), 100.0);
        assert_eq!(base.hp, 400.0);
    }

    #[test]
    fn hp_upgrade_raises_current_hp_by_the_same_delta() {
        let mut base = Base::new(Vec2::ZERO);
        base.hp = 450.0;
        assert_eq!(base.upgrade(BaseAttribute::Hp), 2);
        assert_eq!(base.max_hp, 600.0);
        assert_eq!(base.hp, 550.0);
    }

    #[test]
    fn shield_upgrade_recomputes_capacity() {
        let mut base = Base::new(Vec2::ZERO);
        let _ = base.upgrade(BaseAttribute::Shields);
        assert_eq!(base.shields, 137.5);
    }

    #[test]
    fn breach_damage_clamps_at_zero() {
        let mut base = Base::new(Vec2::ZERO);
        base.hp = 4.0;
        assert_eq!(base.take_damage(10.0), 4.0);
        assert_eq!(base.hp, 0.0);
        assert!(base.is_destroyed());
    }

    #[test]
    fn energy_upgrade_feeds_rate_of_fire() {
        let mut base = Base::new(Vec2::ZERO);
        let _ = base.upgrade(BaseAttribute::Energy);
        assert!((base.snapshot().rate_of_fire_boost - 1.025).abs() < 1e-6);
    }
}
