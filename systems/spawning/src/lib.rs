#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that releases scheduled enemies as a wave's clock runs.

use std::time::Duration;

use aegis_defence_core::{Command, WaveSpawnQueue};

/// Pure system that emits spawn commands once queued delays have elapsed.
#[derive(Debug, Default)]
pub struct Spawning {
    queue: WaveSpawnQueue,
    elapsed: Duration,
}

impl Spawning {
    /// Creates a spawning system with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the schedule of a newly started wave and restarts its clock.
    pub fn begin_wave(&mut self, queue: WaveSpawnQueue) {
        self.queue = queue;
        self.elapsed = Duration::ZERO;
    }

    /// Drops any pending entries.
    pub fn clear(&mut self) {
        self.begin_wave(WaveSpawnQueue::default());
    }

    /// Advances the wave clock by `dt` and emits `Command::SpawnEnemy` for
    /// every entry whose delay has elapsed, in schedule order.
    pub fn handle(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.queue.is_empty() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        while let Some(entry) = self.queue.pop_due(self.elapsed) {
            out.push(Command::SpawnEnemy { kind: entry.kind });
        }
    }

    /// Reports whether every scheduled entry has been released.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of entries still waiting for release.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_defence_core::{EnemyKind, SpawnEntry};

    fn queue(delays: &[(EnemyKind, u64)]) -> WaveSpawnQueue {
        WaveSpawnQueue::from_entries(
            delays
                .iter()
                .map(|&(kind, millis)| SpawnEntry {
                    kind,
                    delay: Duration::from_millis(millis),
                })
                .collect(),
        )
    }

    #[test]
    fn idle_system_emits_nothing() {
        let mut spawning = Spawning::new();
        let mut out = Vec::new();
        spawning.handle(Duration::from_secs(5), &mut out);
        assert!(out.is_empty());
        assert!(spawning.is_exhausted());
    }

    #[test]
    fn entries_release_once_their_delay_elapses() {
        let mut spawning = Spawning::new();
        spawning.begin_wave(queue(&[
            (EnemyKind::Light, 0),
            (EnemyKind::Light, 800),
            (EnemyKind::Armored, 1_300),
        ]));

        let mut out = Vec::new();
        spawning.handle(Duration::from_millis(16), &mut out);
        assert_eq!(
            out,
            vec![Command::SpawnEnemy {
                kind: EnemyKind::Light,
            }]
        );

        out.clear();
        spawning.handle(Duration::from_millis(700), &mut out);
        assert!(out.is_empty());
        assert_eq!(spawning.pending(), 2);

        spawning.handle(Duration::from_millis(1_000), &mut out);
        assert_eq!(out.len(), 2);
        assert!(spawning.is_exhausted());
    }

    #[test]
    fn clearing_drops_pending_entries() {
        let mut spawning = Spawning::new();
        spawning.begin_wave(queue(&[(EnemyKind::Heavy, 5_000)]));
        spawning.clear();
        assert!(spawning.is_exhausted());
    }
}
