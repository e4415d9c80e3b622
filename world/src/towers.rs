//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use aegis_defence_core::{
    BoardConfig, EnemyId, Path, PlacementError, Specialization, TowerId, TowerKind,
    TowerSnapshot, TowerStats, UpgradeLevels,
};
use glam::Vec2;

const EDGE_CLEARANCE: f32 = 25.0;
const PATH_CLEARANCE: f32 = 40.0;
const BASE_CLEARANCE: f32 = 75.0;
const TOWER_CLEARANCE: f32 = 50.0;

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Board position of the tower centre.
    pub(crate) position: Vec2,
    pub(crate) levels: UpgradeLevels,
    pub(crate) specialization: Option<Specialization>,
    /// Cached result of `TowerStats::derive`, refreshed on every change.
    pub(crate) stats: TowerStats,
    pub(crate) target: Option<EnemyId>,
    /// Simulated time of the last attack; `None` until the first shot.
    pub(crate) last_attack: Option<Duration>,
}

impl TowerState {
    pub(crate) fn refresh_stats(&mut self) {
        self.stats = TowerStats::derive(self.kind, &self.levels, self.specialization);
    }

    /// Time remaining before the cooldown gate opens.
    pub(crate) fn ready_in(&self, now: Duration, rate_of_fire_boost: f32) -> Duration {
        match self.last_attack {
            None => Duration::ZERO,
            Some(last) => {
                let ready_at = last.saturating_add(self.stats.attack_interval(rate_of_fire_boost));
                ready_at.saturating_sub(now)
            }
        }
    }

    pub(crate) fn snapshot(&self, now: Duration, rate_of_fire_boost: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            levels: self.levels,
            specialization: self.specialization,
            stats: self.stats,
            target: self.target,
            ready_in: self.ready_in(now, rate_of_fire_boost),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a freshly placed tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let levels = UpgradeLevels::default();
        let state = TowerState {
            id,
            kind,
            position,
            levels,
            specialization: None,
            stats: TowerStats::derive(kind, &levels, None),
            target: None,
            last_attack: None,
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}

/// Checks a candidate tower centre against the board, path, base, and towers.
pub(crate) fn validate_placement(
    position: Vec2,
    board: &BoardConfig,
    path: &Path,
    base: Vec2,
    towers: &TowerRegistry,
) -> Result<(), PlacementError> {
    if position.x < EDGE_CLEARANCE
        || position.x > board.width - EDGE_CLEARANCE
        || position.y < EDGE_CLEARANCE
        || position.y > board.height - EDGE_CLEARANCE
    {
        return Err(PlacementError::OutOfBounds);
    }

    if path
        .points()
        .iter()
        .any(|point| point.distance(position) < PATH_CLEARANCE)
    {
        return Err(PlacementError::OnPath);
    }

    if base.distance(position) < BASE_CLEARANCE {
        return Err(PlacementError::OnBase);
    }

    if towers
        .iter()
        .any(|tower| tower.position.distance(position) < TOWER_CLEARANCE)
    {
        return Err(PlacementError::OnTower);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_defence_core::TowerAttribute;

    fn board() -> BoardConfig {
        BoardConfig {
            width: 960.0,
            height: 640.0,
        }
    }

    fn path() -> Path {
        Path::new(vec![Vec2::new(0.0, 320.0), Vec2::new(885.0, 320.0)])
    }

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::SingleTarget, Vec2::new(100.0, 100.0));
        let second = registry.insert(TowerKind::MultiChain, Vec2::new(200.0, 100.0));
        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert!(registry.remove(first).is_some());
        assert!(registry.get(first).is_none());
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn cooldown_opens_after_attack_interval() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::SingleTarget, Vec2::new(100.0, 100.0));
        let tower = registry.get_mut(id).expect("tower exists");
        assert_eq!(tower.ready_in(Duration::ZERO, 1.0), Duration::ZERO);

        tower.last_attack = Some(Duration::from_millis(1_000));
        assert_eq!(
            tower.ready_in(Duration::from_millis(1_200), 1.0),
            Duration::from_millis(300)
        );
        assert_eq!(tower.ready_in(Duration::from_millis(1_500), 1.0), Duration::ZERO);
    }

    #[test]
    fn refresh_stats_picks_up_new_levels() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::MultiChain, Vec2::new(100.0, 100.0));
        let tower = registry.get_mut(id).expect("tower exists");
        let _ = tower.levels.raise(TowerAttribute::Range);
        tower.refresh_stats();
        assert!((tower.stats.range - 180.0).abs() < 1e-4);
    }

    #[test]
    fn placement_rejects_each_overlap() {
        let mut towers = TowerRegistry::new();
        let base = Vec2::new(885.0, 320.0);
        let check = |position, towers: &TowerRegistry| {
            validate_placement(position, &board(), &path(), base, towers)
        };

        assert_eq!(check(Vec2::new(10.0, 200.0), &towers), Err(PlacementError::OutOfBounds));
        assert_eq!(check(Vec2::new(400.0, 620.0), &towers), Err(PlacementError::OutOfBounds));
        assert_eq!(check(Vec2::new(20.0, 340.0), &towers), Err(PlacementError::OutOfBounds));
        assert_eq!(check(Vec2::new(30.0, 340.0), &towers), Err(PlacementError::OnPath));
        assert_eq!(check(Vec2::new(885.0, 380.0), &towers), Err(PlacementError::OnBase));
        assert_eq!(check(Vec2::new(400.0, 200.0), &towers), Ok(()));

        let _ = towers.insert(TowerKind::SingleTarget, Vec2::new(400.0, 200.0));
        assert_eq!(check(Vec2::new(430.0, 200.0), &towers), Err(PlacementError::OnTower));
        assert_eq!(check(Vec2::new(450.0, 200.0), &towers), Ok(()));
    }
}
