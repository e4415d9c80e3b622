//! Cancellable repeating damage-over-time tasks.

use std::time::Duration;

use aegis_defence_core::{EnemyId, TowerId, DOT_TICK_INTERVAL};

/// Handle identifying a scheduled damage-over-time task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TimerHandle(u64);

/// Damage owed to an enemy by a task that came due.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DotTick {
    pub(crate) enemy: EnemyId,
    pub(crate) damage: f32,
}

#[derive(Clone, Debug)]
struct DotTask {
    handle: TimerHandle,
    enemy: EnemyId,
    source: TowerId,
    damage: f32,
    duration: Duration,
    elapsed: Duration,
    until_next: Duration,
}

/// Timer service advancing every outstanding damage-over-time task.
#[derive(Debug, Default)]
pub(crate) struct DotTimers {
    tasks: Vec<DotTask>,
    next_handle: u64,
}

impl DotTimers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedules repeating ticks against `enemy`.
    ///
    /// A task from the same source tower on the same enemy is replaced.
    pub(crate) fn schedule(
        &mut self,
        enemy: EnemyId,
        source: TowerId,
        damage: f32,
        duration: Duration,
    ) -> TimerHandle {
        if let Some(existing) = self.handle_for(enemy, source) {
            let _ = self.cancel(existing);
        }

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.tasks.push(DotTask {
            handle,
            enemy,
            source,
            damage,
            duration,
            elapsed: Duration::ZERO,
            until_next: DOT_TICK_INTERVAL,
        });
        handle
    }

    fn handle_for(&self, enemy: EnemyId, source: TowerId) -> Option<TimerHandle> {
        self.tasks
            .iter()
            .find(|task| task.enemy == enemy && task.source == source)
            .map(|task| task.handle)
    }

    /// Cancels a task, reporting whether it was still outstanding.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }

    /// Cancels every task bound to `enemy` and returns how many were removed.
    pub(crate) fn cancel_enemy(&mut self, enemy: EnemyId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.enemy != enemy);
        before - self.tasks.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Advances every task by `dt`, collecting ticks that came due in order.
    ///
    /// Tasks whose elapsed time reaches their duration are retired.
    pub(crate) fn advance(&mut self, dt: Duration, out: &mut Vec<DotTick>) {
        for task in &mut self.tasks {
            let mut budget = dt;
            while budget >= task.until_next && task.elapsed < task.duration {
                budget -= task.until_next;
                task.elapsed += DOT_TICK_INTERVAL;
                task.until_next = DOT_TICK_INTERVAL;
                out.push(DotTick {
                    enemy: task.enemy,
                    damage: task.damage,
                });
            }
            if task.elapsed < task.duration {
                task.until_next -= budget;
            }
        }
        self.tasks.retain(|task| task.elapsed < task.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_millis(3_000);

    fn ticks(timers: &mut DotTimers, dt: Duration) -> Vec<DotTick> {
        let mut out = Vec::new();
        timers.advance(dt, &mut out);
        out
    }

    #[test]
    fn ticks_every_interval_until_duration() {
        let mut timers = DotTimers::new();
        let _ = timers.schedule(EnemyId::new(1), TowerId::new(0), 5.0, DURATION);

        assert!(ticks(&mut timers, Duration::from_millis(499)).is_empty());
        assert_eq!(ticks(&mut timers, Duration::from_millis(1)).len(), 1);

        let remaining = ticks(&mut timers, Duration::from_secs(10));
        assert_eq!(remaining.len(), 5);
        assert_eq!(timers.len(), 0);
    }

    #[test]
    fn small_steps_accumulate() {
        let mut timers = DotTimers::new();
        let _ = timers.schedule(EnemyId::new(1), TowerId::new(0), 5.0, DURATION);
        let mut total = 0;
        for _ in 0..250 {
            total += ticks(&mut timers, Duration::from_millis(16)).len();
        }
        assert_eq!(total, 6);
        assert_eq!(timers.len(), 0);
    }

    #[test]
    fn same_source_replaces_task() {
        let mut timers = DotTimers::new();
        let first = timers.schedule(EnemyId::new(1), TowerId::new(0), 5.0, DURATION);
        let _ = timers.schedule(EnemyId::new(1), TowerId::new(1), 5.0, DURATION);
        let _ = timers.schedule(EnemyId::new(1), TowerId::new(0), 6.0, DURATION);
        assert_eq!(timers.len(), 2);
        assert!(!timers.cancel(first));
    }

    #[test]
    fn cancelling_an_enemy_stops_its_ticks() {
        let mut timers = DotTimers::new();
        let _ = timers.schedule(EnemyId::new(1), TowerId::new(0), 5.0, DURATION);
        let keep = timers.schedule(EnemyId::new(2), TowerId::new(0), 5.0, DURATION);
        assert_eq!(timers.cancel_enemy(EnemyId::new(1)), 1);

        let due = ticks(&mut timers, Duration::from_millis(500));
        assert_eq!(
            due,
            vec![DotTick {
                enemy: EnemyId::new(2),
                damage: 5.0,
            }]
        );
        assert!(timers.cancel(keep));
        assert!(!timers.cancel(keep));
        assert_eq!(timers.len(), 0);
    }
}
