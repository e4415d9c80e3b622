#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that drives the world through the simulation systems.
//!
//! A [`Session`] owns the authoritative [`World`] together with every pure
//! system. Each tick runs the pipeline in a fixed order: scheduled spawns are
//! released, enemies and timers advance, towers reacquire targets, ready
//! towers fire and finally a cleared wave is completed. Player actions go
//! through the same command path and report rejections as
//! [`CommandError`] values.

mod clock;

use std::time::Duration;

use aegis_defence_core::{
    BaseAttribute, BaseSnapshot, BoardConfig, Command, CommandError, ConfigError, EnemyView,
    Event, GameConfig, GamePhase, Path, PlacementError, SpeedMultiplier, Specialization,
    TowerAttribute, TowerId, TowerKind, TowerView,
};
use aegis_defence_system_path_generation::generate;
use aegis_defence_system_spawning::Spawning;
use aegis_defence_system_tower_combat::TowerCombat;
use aegis_defence_system_tower_targeting::TowerTargeting;
use aegis_defence_system_wave_scheduling::{build_wave, wave_rng};
use aegis_defence_world::{self as world, query, World};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use clock::{FixedStep, TickSource, WallClock};

/// Running game: world state, simulation systems and frame bookkeeping.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    world: World,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    rng: ChaCha8Rng,
    paused: bool,
    speed: SpeedMultiplier,
    last_frame: Option<Duration>,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Session {
    /// Validates the configuration and starts a fresh session on a newly
    /// generated path.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            world: World::new(),
            spawning: Spawning::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            paused: false,
            speed: SpeedMultiplier::default(),
            last_frame: None,
            events: Vec::new(),
            commands: Vec::new(),
        };
        session.reset_world();
        Ok(session)
    }

    /// Discards all progress and starts over on a new path.
    ///
    /// Pause and fast-forward are cleared and the next frame re-anchors the
    /// frame clock.
    pub fn restart(&mut self) {
        info!("session restarted");
        self.reset_world();
    }

    fn reset_world(&mut self) {
        let generated = generate(&self.config.board, &mut self.rng);
        self.spawning.clear();
        self.commands.clear();
        self.paused = false;
        self.speed = SpeedMultiplier::Normal;
        self.last_frame = None;
        world::apply(
            &mut self.world,
            Command::ResetSession {
                board: self.config.board,
                path: generated.path,
                starting_credits: self.config.starting_credits,
                starting_lives: self.config.starting_lives,
            },
            &mut self.events,
        );
    }

    /// Applies a player command and returns the events it produced.
    fn execute(&mut self, command: Command) -> Result<&[Event], CommandError> {
        let first = self.events.len();
        world::apply(&mut self.world, command, &mut self.events);
        let produced = &self.events[first..];
        let rejection = produced.iter().find_map(|event| match event {
            Event::CommandRejected { reason } => Some(reason.clone()),
            _ => None,
        });
        match rejection {
            Some(reason) => {
                warn!(%reason, "player command rejected");
                Err(reason)
            }
            None => Ok(&self.events[first..]),
        }
    }

    fn reject(&mut self, reason: CommandError) -> CommandError {
        warn!(%reason, "player command rejected");
        self.events.push(Event::CommandRejected {
            reason: reason.clone(),
        });
        reason
    }

    /// Places a tower of the given kind, paying its cost.
    pub fn place_tower(&mut self, kind: TowerKind, position: Vec2) -> Result<TowerId, CommandError> {
        let produced = self.execute(Command::PlaceTower { kind, position })?;
        produced
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(*tower),
                _ => None,
            })
            .ok_or(CommandError::UnknownTower)
    }

    /// Raises one upgrade level of a tower attribute.
    pub fn upgrade_tower(
        &mut self,
        tower: TowerId,
        attribute: TowerAttribute,
    ) -> Result<(), CommandError> {
        self.execute(Command::UpgradeTower { tower, attribute })
            .map(|_| ())
    }

    /// Raises a tower attribute named by its string key.
    pub fn upgrade_tower_by_key(&mut self, tower: TowerId, key: &str) -> Result<(), CommandError> {
        match key.parse::<TowerAttribute>() {
            Ok(attribute) => self.upgrade_tower(tower, attribute),
            Err(reason) => Err(self.reject(reason)),
        }
    }

    /// Commits a tower to one of its kind's specializations.
    pub fn specialize_tower(
        &mut self,
        tower: TowerId,
        specialization: Specialization,
    ) -> Result<(), CommandError> {
        self.execute(Command::SpecializeTower {
            tower,
            specialization,
        })
        .map(|_| ())
    }

    /// Sells a tower and returns the refunded credits.
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<u32, CommandError> {
        let produced = self.execute(Command::SellTower { tower })?;
        produced
            .iter()
            .find_map(|event| match event {
                Event::TowerSold { refund, .. } => Some(*refund),
                _ => None,
            })
            .ok_or(CommandError::UnknownTower)
    }

    /// Raises one level of a base attribute.
    pub fn upgrade_base(&mut self, attribute: BaseAttribute) -> Result<(), CommandError> {
        self.execute(Command::UpgradeBase { attribute }).map(|_| ())
    }

    /// Raises a base attribute named by its string key.
    pub fn upgrade_base_by_key(&mut self, key: &str) -> Result<(), CommandError> {
        match key.parse::<BaseAttribute>() {
            Ok(attribute) => self.upgrade_base(attribute),
            Err(reason) => Err(self.reject(reason)),
        }
    }

    /// Starts the current wave and schedules its enemies.
    pub fn start_wave(&mut self) -> Result<(), CommandError> {
        let _ = self.execute(Command::StartWave)?;
        let wave = query::wave(&self.world);
        let queue = build_wave(wave, &mut wave_rng(self.config.seed, wave));
        debug!(wave, enemies = queue.len(), "wave scheduled");
        self.spawning.begin_wave(queue);
        Ok(())
    }

    /// Flips the pause flag and returns whether the session is now paused.
    ///
    /// Resuming re-anchors the frame clock so the paused span is never
    /// simulated.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            self.last_frame = None;
        }
        debug!(paused = self.paused, "pause toggled");
        self.paused
    }

    /// Switches between normal and double speed and returns the new setting.
    pub fn toggle_fast_forward(&mut self) -> SpeedMultiplier {
        self.speed = self.speed.toggled();
        debug!(factor = self.speed.factor(), "speed toggled");
        self.speed
    }

    /// Handles a frame stamped with the provided timestamp.
    ///
    /// The first frame after creation, restart or resume only anchors the
    /// frame clock; later frames advance the simulation by the time since the
    /// previous frame.
    pub fn frame(&mut self, now: Duration) {
        if self.paused {
            return;
        }
        let Some(previous) = self.last_frame.replace(now) else {
            return;
        };
        self.tick(now.saturating_sub(previous));
    }

    /// Samples the provided source and handles the resulting frame.
    pub fn pump<S: TickSource + ?Sized>(&mut self, source: &mut S) {
        let now = source.now();
        self.frame(now);
    }

    /// Advances the simulation by `raw` scaled with the speed multiplier.
    ///
    /// Nothing happens while paused or after the base has fallen.
    pub fn tick(&mut self, raw: Duration) {
        if self.paused || query::phase(&self.world) == GamePhase::GameOver {
            return;
        }
        let dt = raw.saturating_mul(self.speed.factor());

        self.spawning.handle(dt, &mut self.commands);
        self.flush_commands();

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.commands);
        self.flush_commands();

        let towers = query::tower_view(&self.world);
        self.combat.handle(&towers, &mut self.commands);
        self.flush_commands();

        if query::is_wave_active(&self.world)
            && self.spawning.is_exhausted()
            && query::active_enemy_count(&self.world) == 0
        {
            world::apply(&mut self.world, Command::CompleteWave, &mut self.events);
        }
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    /// Removes and returns every event produced since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed(&self) -> SpeedMultiplier {
        self.speed
    }

    /// Number of scheduled enemies not yet released this wave.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawning.pending()
    }

    /// Credits available to the player.
    #[must_use]
    pub fn credits(&self) -> u32 {
        query::credits(&self.world)
    }

    /// Current wave number.
    #[must_use]
    pub fn wave(&self) -> u32 {
        query::wave(&self.world)
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn is_wave_active(&self) -> bool {
        query::is_wave_active(&self.world)
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(&self) -> u32 {
        query::lives(&self.world)
    }

    /// Whether the game is still running.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        query::phase(&self.world)
    }

    /// Simulated time since the session started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Board dimensions.
    #[must_use]
    pub fn board(&self) -> &BoardConfig {
        query::board(&self.world)
    }

    /// Route enemies follow.
    #[must_use]
    pub fn path(&self) -> &Path {
        query::path(&self.world)
    }

    /// Snapshot of the base.
    #[must_use]
    pub fn base(&self) -> BaseSnapshot {
        query::base(&self.world)
    }

    /// Snapshot of every live enemy.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of every tower.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Checks whether a tower could be placed at `position`.
    pub fn placement(&self, position: Vec2) -> Result<(), PlacementError> {
        query::placement(&self.world, position)
    }

    /// Cost of the next upgrade of a base attribute.
    #[must_use]
    pub fn base_upgrade_cost(&self, attribute: BaseAttribute) -> u32 {
        query::base_upgrade_cost(&self.world, attribute)
    }

    /// Cost of the next upgrade of a string-keyed base attribute.
    #[must_use]
    pub fn base_upgrade_cost_for_key(&self, key: &str) -> u32 {
        query::base_upgrade_cost_for_key(&self.world, key)
    }

    /// Cost of the next upgrade of a tower attribute.
    #[must_use]
    pub fn tower_upgrade_cost(&self, tower: TowerId, attribute: TowerAttribute) -> Option<u32> {
        query::tower_upgrade_cost(&self.world, tower, attribute)
    }

    /// Cost of the next upgrade of a string-keyed tower attribute.
    #[must_use]
    pub fn tower_upgrade_cost_for_key(&self, tower: TowerId, key: &str) -> Option<u32> {
        query::tower_upgrade_cost_for_key(&self.world, tower, key)
    }

    /// Credits a tower would refund if sold now.
    #[must_use]
    pub fn sell_value(&self, tower: TowerId) -> Option<u32> {
        query::sell_value_of(&self.world, tower)
    }
}
