#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Aegis Defence.

mod base;
mod economy;
mod enemies;
mod timers;
mod towers;

use std::time::Duration;

use aegis_defence_core::{
    wave_completion_bonus, AttackPattern, BoardConfig, Command, CommandError, EnemyId, EnemyKind,
    Event, GameConfig, GamePhase, Path, SlowEffect, Specialization, TowerAttribute, TowerId,
    TowerKind, BASE_BREACH_DAMAGE,
};
use glam::Vec2;
use tracing::{debug, info};

use base::Base;
use economy::Economy;
use enemies::{Enemy, Lifecycle};
use timers::{DotTick, DotTimers};
use towers::{validate_placement, TowerRegistry};

/// Represents the authoritative Aegis Defence world state.
#[derive(Debug)]
pub struct World {
    board: BoardConfig,
    path: Path,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    towers: TowerRegistry,
    base: Base,
    economy: Economy,
    dots: DotTimers,
    dot_scratch: Vec<DotTick>,
    wave: u32,
    wave_active: bool,
    lives: u32,
    phase: GamePhase,
    clock: Duration,
}

impl World {
    /// Creates an empty world with default economy and no path.
    ///
    /// Sessions install a generated path through `Command::ResetSession`.
    #[must_use]
    pub fn new() -> Self {
        let defaults = GameConfig::default();
        Self {
            board: defaults.board,
            path: Path::default(),
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            towers: TowerRegistry::new(),
            base: Base::new(Vec2::ZERO),
            economy: Economy::new(defaults.starting_credits),
            dots: DotTimers::new(),
            dot_scratch: Vec::new(),
            wave: 1,
            wave_active: false,
            lives: defaults.starting_lives,
            phase: GamePhase::Playing,
            clock: Duration::ZERO,
        }
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        id
    }

    fn reject(&self, reason: CommandError, out_events: &mut Vec<Event>) {
        debug!(%reason, "command rejected");
        out_events.push(Event::CommandRejected { reason });
    }

    fn spend(&mut self, cost: u32, out_events: &mut Vec<Event>) -> bool {
        match self.economy.spend(cost) {
            Ok(()) => true,
            Err(reason) => {
                self.reject(reason, out_events);
                false
            }
        }
    }

    fn push_credits(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::CreditsChanged {
            credits: self.economy.credits(),
        });
    }

    fn damage_enemy(&mut self, id: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemy_mut(id) else {
            return;
        };
        if !enemy.is_active() {
            return;
        }
        let applied = enemy.take_damage(amount);
        out_events.push(Event::EnemyDamaged {
            enemy: id,
            amount: applied,
            health: enemy.health,
        });
    }

    fn slow_enemy(&mut self, id: EnemyId, effect: SlowEffect, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemy_mut(id) else {
            return;
        };
        if !enemy.is_active() {
            return;
        }
        enemy.apply_slow(effect);
        out_events.push(Event::EnemySlowed {
            enemy: id,
            magnitude: effect.magnitude,
            duration: effect.duration,
        });
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        for enemy in &mut self.enemies {
            if enemy.advance(dt, &self.path) {
                out_events.push(Event::EnemyMoved {
                    enemy: enemy.id,
                    position: enemy.position,
                });
            }
        }

        self.dot_scratch.clear();
        self.dots.advance(dt, &mut self.dot_scratch);
        let ticks = std::mem::take(&mut self.dot_scratch);
        for tick in &ticks {
            self.damage_enemy(tick.enemy, tick.damage, out_events);
        }
        self.dot_scratch = ticks;

        self.resolve_casualties(out_events);
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let Some(start) = self.path.start() else {
            debug!(?kind, "spawn ignored without a path");
            return;
        };
        let id = self.allocate_enemy_id();
        let enemy = Enemy::spawn(id, kind, self.wave, start);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position: start,
            max_health: enemy.max_health,
        });
        self.enemies.push(enemy);
    }

    fn fire_tower(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let boost = self.base.rate_of_fire_boost();
        let Some(tower) = self.towers.get(tower_id) else {
            return;
        };
        if !tower.ready_in(self.clock, boost).is_zero() {
            return;
        }
        let Some(primary) = self
            .enemies
            .iter()
            .find(|enemy| enemy.id == target && enemy.is_active())
        else {
            return;
        };

        let stats = tower.stats;
        let origin = tower.position;
        let focus = primary.position;
        let affected: Vec<EnemyId> = match stats.pattern {
            AttackPattern::Single | AttackPattern::DamageOverTime => vec![target],
            AttackPattern::Aoe => {
                let radius = stats.splash_radius.unwrap_or_default();
                self.enemies
                    .iter()
                    .filter(|enemy| enemy.is_active() && enemy.position.distance(focus) <= radius)
                    .map(|enemy| enemy.id)
                    .collect()
            }
            AttackPattern::Chain | AttackPattern::Debuff => {
                let mut selected = vec![target];
                selected.extend(
                    self.enemies
                        .iter()
                        .filter(|enemy| {
                            enemy.id != target
                                && enemy.is_active()
                                && enemy.position.distance(origin) <= stats.range
                        })
                        .map(|enemy| enemy.id)
                        .take(stats.max_targets.saturating_sub(1)),
                );
                selected
            }
        };

        if let Some(tower) = self.towers.get_mut(tower_id) {
            tower.last_attack = Some(self.clock);
        }
        out_events.push(Event::TowerFired {
            tower: tower_id,
            pattern: stats.pattern,
            targets: affected.clone(),
        });

        for enemy in affected {
            match stats.pattern {
                AttackPattern::Single | AttackPattern::Aoe | AttackPattern::Chain => {
                    self.damage_enemy(enemy, stats.damage, out_events);
                    if let Some(effect) = stats.slow {
                        self.slow_enemy(enemy, effect, out_events);
                    }
                }
                AttackPattern::Debuff => {
                    if let Some(effect) = stats.slow {
                        self.slow_enemy(enemy, effect, out_events);
                    }
                }
                AttackPattern::DamageOverTime => {
                    let duration = stats.dot_duration.unwrap_or_default();
                    let _ = self.dots.schedule(enemy, tower_id, stats.damage, duration);
                    self.damage_enemy(enemy, stats.damage, out_events);
                }
            }
        }

        self.resolve_casualties(out_events);
    }

    /// Removes enemies that died or breached the base and settles the
    /// consequences: kill rewards, base damage, lives, and timer cleanup.
    fn resolve_casualties(&mut self, out_events: &mut Vec<Event>) {
        if self.enemies.iter().all(Enemy::is_active) {
            return;
        }

        let mut removed = Vec::new();
        for enemy in &self.enemies {
            match enemy.lifecycle {
                Lifecycle::Active => continue,
                Lifecycle::Dead => {
                    self.economy.credit(enemy.currency_value);
                    out_events.push(Event::EnemyDied {
                        enemy: enemy.id,
                        reward: enemy.currency_value,
                    });
                    self.push_credits(out_events);
                }
                Lifecycle::ReachedBase => {
                    let dealt = self.base.take_damage(BASE_BREACH_DAMAGE);
                    self.lives = self.lives.saturating_sub(1);
                    out_events.push(Event::EnemyReachedBase { enemy: enemy.id });
                    out_events.push(Event::BaseDamaged {
                        amount: dealt,
                        hp: self.base.hp,
                        lives: self.lives,
                    });
                }
            }
            removed.push(enemy.id);
        }

        self.enemies.retain(Enemy::is_active);
        for id in &removed {
            let _ = self.dots.cancel_enemy(*id);
        }
        for tower in self.towers.iter_mut() {
            if tower.target.is_some_and(|target| removed.contains(&target)) {
                tower.target = None;
            }
        }

        if self.phase == GamePhase::Playing && (self.base.is_destroyed() || self.lives == 0) {
            self.phase = GamePhase::GameOver;
            self.wave_active = false;
            info!(wave = self.wave, "base destroyed");
            out_events.push(Event::GameOver { wave: self.wave });
        }
    }

    fn place_tower(&mut self, kind: TowerKind, position: Vec2, out_events: &mut Vec<Event>) {
        if let Err(reason) = validate_placement(
            position,
            &self.board,
            &self.path,
            self.base.position,
            &self.towers,
        ) {
            self.reject(reason.into(), out_events);
            return;
        }
        let cost = kind.cost();
        if !self.spend(cost, out_events) {
            return;
        }
        let tower = self.towers.insert(kind, position);
        debug!(tower = tower.get(), ?kind, %position, "tower placed");
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            position,
            cost,
        });
        self.push_credits(out_events);
    }

    fn upgrade_tower(
        &mut self,
        tower_id: TowerId,
        attribute: TowerAttribute,
        out_events: &mut Vec<Event>,
    ) {
        let Some(tower) = self.towers.get(tower_id) else {
            self.reject(CommandError::UnknownTower, out_events);
            return;
        };
        let cost = tower.levels.upgrade_cost(attribute);
        if !self.spend(cost, out_events) {
            return;
        }
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        let level = tower.levels.raise(attribute);
        tower.refresh_stats();
        debug!(tower = tower_id.get(), %attribute, level, "tower upgraded");
        out_events.push(Event::TowerUpgraded {
            tower: tower_id,
            attribute,
            level,
            cost,
        });
        self.push_credits(out_events);
    }

    fn specialize_tower(
        &mut self,
        tower_id: TowerId,
        specialization: Specialization,
        out_events: &mut Vec<Event>,
    ) {
        let Some(tower) = self.towers.get(tower_id) else {
            self.reject(CommandError::UnknownTower, out_events);
            return;
        };
        if tower.specialization.is_some() {
            self.reject(CommandError::AlreadySpecialized, out_events);
            return;
        }
        if specialization.tower_kind() != tower.kind {
            self.reject(CommandError::InvalidSpecialization, out_events);
            return;
        }
        let cost = specialization.cost();
        if !self.spend(cost, out_events) {
            return;
        }
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        tower.specialization = Some(specialization);
        tower.refresh_stats();
        debug!(tower = tower_id.get(), ?specialization, "tower specialized");
        out_events.push(Event::TowerSpecialized {
            tower: tower_id,
            specialization,
            cost,
        });
        self.push_credits(out_events);
    }

    fn sell_tower(&mut self, tower_id: TowerId, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.remove(tower_id) else {
            self.reject(CommandError::UnknownTower, out_events);
            return;
        };
        let refund = aegis_defence_core::sell_value(
            tower.kind,
            &tower.levels,
            tower.specialization.is_some(),
        );
        self.economy.credit(refund);
        debug!(tower = tower_id.get(), refund, "tower sold");
        out_events.push(Event::TowerSold {
            tower: tower_id,
            refund,
        });
        self.push_credits(out_events);
    }

    fn complete_wave(&mut self, out_events: &mut Vec<Event>) {
        if !self.wave_active {
            return;
        }
        let restored = self.base.repair();
        out_events.push(Event::BaseRepaired {
            amount: restored,
            hp: self.base.hp,
        });
        self.wave += 1;
        self.wave_active = false;
        let bonus = wave_completion_bonus(self.wave);
        self.economy.credit(bonus);
        info!(wave = self.wave, bonus, "wave completed");
        out_events.push(Event::WaveCompleted {
            wave: self.wave,
            bonus,
        });
        self.push_credits(out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Player commands that cannot be honoured leave the world untouched and emit
/// `Event::CommandRejected`. Once the base has fallen only
/// `Command::ResetSession` has any effect.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase == GamePhase::GameOver {
        match command {
            Command::ResetSession { .. } => {}
            Command::PlaceTower { .. }
            | Command::UpgradeTower { .. }
            | Command::SpecializeTower { .. }
            | Command::SellTower { .. }
            | Command::UpgradeBase { .. }
            | Command::StartWave => {
                world.reject(CommandError::BaseDestroyed, out_events);
                return;
            }
            Command::Tick { .. }
            | Command::SpawnEnemy { .. }
            | Command::AssignTarget { .. }
            | Command::FireTower { .. }
            | Command::CompleteWave => return,
        }
    }

    match command {
        Command::ResetSession {
            board,
            path,
            starting_credits,
            starting_lives,
        } => {
            let anchor = path.base_anchor().unwrap_or(Vec2::ZERO);
            let path_points = path.len();
            *world = World {
                board,
                path,
                base: Base::new(anchor),
                economy: Economy::new(starting_credits),
                lives: starting_lives,
                ..World::new()
            };
            info!(path_points, "session reset");
            out_events.push(Event::SessionReset { path_points });
            world.push_credits(out_events);
        }
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::AssignTarget { tower, target } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.target = target;
            }
        }
        Command::FireTower { tower, target } => world.fire_tower(tower, target, out_events),
        Command::PlaceTower { kind, position } => world.place_tower(kind, position, out_events),
        Command::UpgradeTower { tower, attribute } => {
            world.upgrade_tower(tower, attribute, out_events);
        }
        Command::SpecializeTower {
            tower,
            specialization,
        } => world.specialize_tower(tower, specialization, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::UpgradeBase { attribute } => {
            let cost = world.base.levels.upgrade_cost(attribute);
            if !world.spend(cost, out_events) {
                return;
            }
            let level = world.base.upgrade(attribute);
            debug!(%attribute, level, "base upgraded");
            out_events.push(Event::BaseUpgraded {
                attribute,
                level,
                cost,
            });
            world.push_credits(out_events);
        }
        Command::StartWave => {
            if world.wave_active {
                world.reject(CommandError::WaveAlreadyActive, out_events);
                return;
            }
            world.wave_active = true;
            info!(wave = world.wave, "wave started");
            out_events.push(Event::WaveStarted { wave: world.wave });
        }
        Command::CompleteWave => world.complete_wave(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use aegis_defence_core::{
        sell_value, BaseAttribute, BaseSnapshot, BoardConfig, EnemyView, GamePhase, Path,
        PlacementError, TowerAttribute, TowerId, TowerView,
    };
    use glam::Vec2;

    use super::{towers::validate_placement, World};

    /// Play field dimensions of the current session.
    #[must_use]
    pub fn board(world: &World) -> &BoardConfig {
        &world.board
    }

    /// Route enemies follow in the current session.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Credits available to the player.
    #[must_use]
    pub fn credits(world: &World) -> u32 {
        world.economy.credits()
    }

    /// Reports whether the player can cover the provided cost.
    #[must_use]
    pub fn can_afford(world: &World, cost: u32) -> bool {
        world.economy.can_afford(cost)
    }

    /// Current wave number.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn is_wave_active(world: &World) -> bool {
        world.wave_active
    }

    /// Breaches the session can still absorb.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Current game phase.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// Simulated time elapsed since the session was reset.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Number of enemies still on the path.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of outstanding damage-over-time effects.
    #[must_use]
    pub fn active_dot_effects(world: &World) -> usize {
        world.dots.len()
    }

    /// Captures a read-only view of the enemies on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let boost = world.base.rate_of_fire_boost();
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.snapshot(world.clock, boost))
                .collect(),
        )
    }

    /// Captures the base's defensive state.
    #[must_use]
    pub fn base(world: &World) -> BaseSnapshot {
        world.base.snapshot()
    }

    /// Cost of the next base upgrade for the provided attribute.
    #[must_use]
    pub fn base_upgrade_cost(world: &World, attribute: BaseAttribute) -> u32 {
        world.base.levels.upgrade_cost(attribute)
    }

    /// Cost of the next base upgrade for a string-keyed attribute.
    #[must_use]
    pub fn base_upgrade_cost_for_key(world: &World, key: &str) -> u32 {
        world.base.levels.upgrade_cost_for_key(key)
    }

    /// Cost of the next upgrade of a tower attribute, if the tower exists.
    #[must_use]
    pub fn tower_upgrade_cost(
        world: &World,
        tower: TowerId,
        attribute: TowerAttribute,
    ) -> Option<u32> {
        world
            .towers
            .get(tower)
            .map(|state| state.levels.upgrade_cost(attribute))
    }

    /// Cost of the next upgrade of a string-keyed tower attribute, if the tower exists.
    #[must_use]
    pub fn tower_upgrade_cost_for_key(world: &World, tower: TowerId, key: &str) -> Option<u32> {
        world
            .towers
            .get(tower)
            .map(|state| aegis_defence_core::tower_upgrade_cost_for_key(&state.levels, key))
    }

    /// Credits the tower would refund if sold now.
    #[must_use]
    pub fn sell_value_of(world: &World, tower: TowerId) -> Option<u32> {
        world.towers.get(tower).map(|state| {
            sell_value(state.kind, &state.levels, state.specialization.is_some())
        })
    }

    /// Checks whether a tower could be placed at the provided position.
    pub fn placement(world: &World, position: Vec2) -> Result<(), PlacementError> {
        validate_placement(
            position,
            &world.board,
            &world.path,
            world.base.position,
            &world.towers,
        )
    }
}
