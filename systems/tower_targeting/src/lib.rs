#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps tower targets valid and acquires new ones.

use aegis_defence_core::{Command, EnemyId, EnemySnapshot, EnemyView, TowerSnapshot, TowerView};
use glam::Vec2;

/// Tower targeting system that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AssignTarget` for every tower whose target changes.
    ///
    /// A held target is kept while it is alive and within range. Otherwise the
    /// nearest enemy in range is chosen; on equal distance the enemy that
    /// spawned first wins.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter() {
            let next = self.resolve(tower);
            if next != tower.target {
                out.push(Command::AssignTarget {
                    tower: tower.id,
                    target: next,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace.extend(
            enemies
                .iter()
                .filter(|snapshot| snapshot.health > 0.0)
                .map(EnemyCandidate::from_snapshot),
        );
    }

    fn resolve(&self, tower: &TowerSnapshot) -> Option<EnemyId> {
        let range_sq = tower.stats.range * tower.stats.range;

        if let Some(held) = tower.target {
            let still_valid = self
                .enemy_workspace
                .iter()
                .find(|candidate| candidate.id == held)
                .is_some_and(|candidate| candidate.distance_sq(tower.position) <= range_sq);
            if still_valid {
                return Some(held);
            }
        }

        let mut best: Option<(f32, EnemyId)> = None;
        for candidate in &self.enemy_workspace {
            let distance_sq = candidate.distance_sq(tower.position);
            if distance_sq > range_sq {
                continue;
            }
            match best {
                Some((closest, _)) if distance_sq >= closest => {}
                _ => best = Some((distance_sq, candidate.id)),
            }
        }
        best.map(|(_, id)| id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

impl EnemyCandidate {
    fn from_snapshot(snapshot: &EnemySnapshot) -> Self {
        Self {
            id: snapshot.id,
            position: snapshot.position,
        }
    }

    fn distance_sq(&self, origin: Vec2) -> f32 {
        self.position.distance_squared(origin)
    }
}
