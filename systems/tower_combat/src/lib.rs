#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands for towers whose cooldown elapsed.

use aegis_defence_core::{Command, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireTower` entries for towers that hold a target and
    /// whose cooldown has elapsed.
    pub fn handle(&mut self, towers: &TowerView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for tower in towers.iter() {
            let Some(target) = tower.target else {
                continue;
            };
            if tower.ready_in.is_zero() {
                self.scratch.push(Command::FireTower {
                    tower: tower.id,
                    target,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_defence_core::{
        EnemyId, TowerId, TowerKind, TowerSnapshot, TowerStats, UpgradeLevels,
    };
    use glam::Vec2;
    use std::time::Duration;

    fn snapshot(id: u32, target: Option<u32>, ready_in: Duration) -> TowerSnapshot {
        let levels = UpgradeLevels::default();
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::MultiChain,
            position: Vec2::new(100.0, 100.0),
            levels,
            specialization: None,
            stats: TowerStats::derive(TowerKind::MultiChain, &levels, None),
            target: target.map(EnemyId::new),
            ready_in,
        }
    }

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            snapshot(5, Some(1), Duration::ZERO),
            snapshot(2, Some(4), Duration::ZERO),
            snapshot(3, Some(9), Duration::from_millis(250)),
        ]);
        let mut out = Vec::new();

        system.handle(&towers, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTower {
                    tower: TowerId::new(2),
                    target: EnemyId::new(4),
                },
                Command::FireTower {
                    tower: TowerId::new(5),
                    target: EnemyId::new(1),
                },
            ],
        );
    }

    #[test]
    fn towers_without_targets_hold_fire() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(1, None, Duration::ZERO)]);
        let mut out = Vec::new();

        system.handle(&towers, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn output_is_appended_not_replaced() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(1, Some(2), Duration::ZERO)]);
        let mut out = vec![Command::StartWave];

        system.handle(&towers, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Command::StartWave);
    }
}
