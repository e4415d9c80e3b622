//! Enemy state, path following, and status effects.

use std::time::Duration;

use aegis_defence_core::{
    EnemyId, EnemyKind, EnemySnapshot, Path, SlowEffect, NOMINAL_FRAME_MS,
};
use glam::Vec2;

const SEGMENT_EPSILON: f32 = 1e-4;

/// Lifecycle of an enemy inside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Active,
    Dead,
    ReachedBase,
}

/// Slow currently applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SlowStatus {
    magnitude: f32,
    remaining: Duration,
}

/// Authoritative state of a single enemy.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) currency_value: u32,
    pub(crate) lifecycle: Lifecycle,
    speed: f32,
    /// Armor, as the fraction of incoming damage absorbed.
    damage_reduction: f32,
    path_index: usize,
    progress: f32,
    slow: Option<SlowStatus>,
}

impl Enemy {
    /// Creates an enemy at the start of the path with stats scaled for `wave`.
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, wave: u32, start: Vec2) -> Self {
        let profile = kind.profile();
        let max_health = profile.max_health(wave);
        Self {
            id,
            kind,
            position: start,
            health: max_health,
            max_health,
            currency_value: profile.currency_value(wave),
            lifecycle: Lifecycle::Active,
            speed: profile.base_speed,
            damage_reduction: profile.damage_reduction,
            path_index: 0,
            progress: 0.0,
            slow: None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Advances slow expiry and movement by `dt`.
    ///
    /// Returns `true` when the enemy moved.
    pub(crate) fn advance(&mut self, dt: Duration, path: &Path) -> bool {
        if !self.is_active() {
            return false;
        }

        if let Some(slow) = &mut self.slow {
            slow.remaining = slow.remaining.saturating_sub(dt);
            if slow.remaining.is_zero() {
                self.slow = None;
            }
        }

        let Some(next) = path.point(self.path_index + 1) else {
            self.lifecycle = Lifecycle::ReachedBase;
            return false;
        };
        let Some(current) = path.point(self.path_index) else {
            self.lifecycle = Lifecycle::ReachedBase;
            return false;
        };

        let speed = match self.slow {
            Some(slow) => self.speed * (1.0 - slow.magnitude),
            None => self.speed,
        };
        let distance = speed * (dt.as_secs_f32() * 1000.0 / NOMINAL_FRAME_MS);
        let segment = next - current;
        let length = segment.length();

        self.progress += distance;
        if length <= SEGMENT_EPSILON || self.progress >= length {
            self.path_index += 1;
            self.progress = 0.0;
            self.position = next;
            if self.path_index + 1 >= path.len() {
                self.lifecycle = Lifecycle::ReachedBase;
            }
        } else {
            self.position = current + segment * (self.progress / length);
        }
        true
    }

    /// Applies incoming damage after reduction and returns the amount taken.
    pub(crate) fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let applied = (amount * (1.0 - self.damage_reduction)).min(self.health);
        self.health = (self.health - applied).max(0.0);
        if self.health <= 0.0 {
            self.lifecycle = Lifecycle::Dead;
        }
        applied
    }

    /// Applies or refreshes a slow. Slows never stack.
    pub(crate) fn apply_slow(&mut self, effect: SlowEffect) {
        if !self.is_active() {
            return;
        }
        self.slow = Some(SlowStatus {
            magnitude: effect.magnitude,
            remaining: effect.duration,
        });
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            slowed: self.slow.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> Path {
        Path::new(vec![
            Vec2::new(0.0, 100.0),
            Vec2::new(10.0, 100.0),
            Vec2::new(20.0, 100.0),
        ])
    }

    fn frame() -> Duration {
        Duration::from_secs_f32(NOMINAL_FRAME_MS / 1000.0)
    }

    #[test]
    fn wave_one_light_enemy_starts_at_base_health() {
        let enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::ZERO);
        assert_eq!(enemy.max_health, 50.0);
        assert_eq!(enemy.health, 50.0);
        assert_eq!(enemy.currency_value, 7);
    }

    #[test]
    fn movement_interpolates_along_segment() {
        let path = straight_path();
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::new(0.0, 100.0));
        assert!(enemy.advance(frame(), &path));
        assert!((enemy.position.x - 2.0).abs() < 1e-3);
        assert_eq!(enemy.position.y, 100.0);
    }

    #[test]
    fn reaching_a_point_snaps_without_carry() {
        let path = straight_path();
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::new(0.0, 100.0));
        let step = Duration::from_millis(25);
        for _ in 0..3 {
            let _ = enemy.advance(step, &path);
        }
        assert!((enemy.position.x - 9.0).abs() < 1e-2);
        let _ = enemy.advance(step, &path);
        assert_eq!(enemy.position, Vec2::new(10.0, 100.0));
        let _ = enemy.advance(step, &path);
        assert!((enemy.position.x - 13.0).abs() < 1e-2);
    }

    #[test]
    fn last_point_marks_enemy_as_reached() {
        let path = straight_path();
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::new(0.0, 100.0));
        let _ = enemy.advance(Duration::from_secs(1), &path);
        assert!(enemy.is_active());
        let _ = enemy.advance(Duration::from_secs(1), &path);
        assert_eq!(enemy.lifecycle, Lifecycle::ReachedBase);
        assert!(!enemy.advance(Duration::from_secs(1), &path));
    }

    #[test]
    fn slow_reduces_speed_and_expires() {
        let path = Path::new(vec![Vec2::ZERO, Vec2::new(1_000.0, 0.0)]);
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::ZERO);
        enemy.apply_slow(SlowEffect::new(0.5, Duration::from_millis(20)));
        let _ = enemy.advance(frame(), &path);
        assert!((enemy.position.x - 1.0).abs() < 1e-3);
        assert!(enemy.snapshot().slowed);
        let _ = enemy.advance(frame(), &path);
        assert!(!enemy.snapshot().slowed);
        assert!((enemy.position.x - 3.0).abs() < 1e-3);
    }

    #[test]
    fn slow_refreshes_instead_of_stacking() {
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::ZERO);
        enemy.apply_slow(SlowEffect::new(0.3, Duration::from_millis(2_000)));
        enemy.apply_slow(SlowEffect::new(0.5, Duration::from_millis(500)));
        assert_eq!(
            enemy.slow,
            Some(SlowStatus {
                magnitude: 0.5,
                remaining: Duration::from_millis(500),
            })
        );
    }

    #[test]
    fn damage_reduction_and_death_happen_once() {
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Armored, 1, Vec2::ZERO);
        let taken = enemy.take_damage(100.0);
        assert!((taken - 90.0).abs() < 1e-4);
        assert!((enemy.health - 60.0).abs() < 1e-4);
        let _ = enemy.take_damage(1_000.0);
        assert_eq!(enemy.health, 0.0);
        assert_eq!(enemy.lifecycle, Lifecycle::Dead);
        assert_eq!(enemy.take_damage(10.0), 0.0);
    }

    #[test]
    fn zero_length_segments_are_skipped() {
        let path = Path::new(vec![Vec2::ZERO, Vec2::ZERO, Vec2::new(100.0, 0.0)]);
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Heavy, 1, Vec2::ZERO);
        let _ = enemy.advance(Duration::from_millis(1), &path);
        assert!(enemy.is_active());
        assert_eq!(enemy.path_index, 1);
    }

    proptest::proptest! {
        #[test]
        fn health_stays_within_bounds(hits in proptest::collection::vec(0.0f32..400.0, 0..20)) {
            let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Heavy, 3, Vec2::ZERO);
            for hit in hits {
                let before = enemy.health;
                let taken = enemy.take_damage(hit);
                proptest::prop_assert!(taken <= before);
                proptest::prop_assert!(enemy.health >= 0.0);
                proptest::prop_assert!(enemy.health <= enemy.max_health);
            }
        }

        #[test]
        fn forward_path_progress_is_monotone(steps in proptest::collection::vec(1u64..200, 1..40)) {
            let path = Path::new(vec![
                Vec2::ZERO,
                Vec2::new(35.0, 0.0),
                Vec2::new(60.0, 0.0),
                Vec2::new(200.0, 0.0),
            ]);
            let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Light, 1, Vec2::ZERO);
            let mut last_x = enemy.position.x;
            for millis in steps {
                let _ = enemy.advance(Duration::from_millis(millis), &path);
                proptest::prop_assert!(enemy.position.x >= last_x);
                proptest::prop_assert!(enemy.position.x <= 200.0);
                last_x = enemy.position.x;
            }
        }
    }
}
