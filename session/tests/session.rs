use std::time::Duration;

use aegis_defence_core::{
    CommandError, EnemyKind, Event, GameConfig, GamePhase, SpeedMultiplier, TowerKind,
};
use aegis_defence_session::{FixedStep, Session, TickSource};
use glam::Vec2;
use proptest::prelude::*;

const STEP: Duration = Duration::from_millis(16);
const WAVE_TIMEOUT: Duration = Duration::from_secs(300);

fn session_with(config: GameConfig) -> Session {
    let mut session = Session::new(config).expect("config is valid");
    let _ = session.drain_events().count();
    session
}

fn site_near_path(session: &Session, max_distance: f32) -> Vec2 {
    let points = session.path().points().to_vec();
    for y in (30..610).step_by(10) {
        for x in (30..930).step_by(10) {
            let candidate = Vec2::new(x as f32, y as f32);
            let close = points
                .iter()
                .any(|point| point.distance(candidate) <= max_distance);
            if close && session.placement(candidate).is_ok() {
                return candidate;
            }
        }
    }
    panic!("no valid tower site near the path");
}

fn run_wave(session: &mut Session) -> Vec<(Duration, Event)> {
    let mut stamped = Vec::new();
    while session.is_wave_active() && session.elapsed() < WAVE_TIMEOUT {
        session.tick(STEP);
        let now = session.elapsed();
        stamped.extend(session.drain_events().map(|event| (now, event)));
    }
    stamped
}

#[test]
fn first_wave_enemies_spawn_at_full_health() {
    let mut session = session_with(GameConfig::default());
    session.start_wave().expect("wave starts");
    session.tick(Duration::from_millis(300));

    let spawned: Vec<(EnemyKind, f32)> = session
        .drain_events()
        .filter_map(|event| match event {
            Event::EnemySpawned {
                kind, max_health, ..
            } => Some((kind, max_health)),
            _ => None,
        })
        .collect();
    assert_eq!(spawned, vec![(EnemyKind::Light, 50.0)]);
    assert_eq!(session.enemies().iter().next().map(|e| e.health), Some(50.0));
}

#[test]
fn placement_without_funds_keeps_credits() {
    let mut session = session_with(GameConfig {
        starting_credits: 40,
        ..GameConfig::default()
    });
    let site = site_near_path(&session, 120.0);

    assert_eq!(
        session.place_tower(TowerKind::SingleTarget, site),
        Err(CommandError::InsufficientFunds {
            required: 50,
            available: 40,
        })
    );
    assert_eq!(session.credits(), 40);
    assert!(session.towers().is_empty());
}

#[test]
fn tower_fires_at_most_once_per_attack_interval() {
    let mut session = session_with(GameConfig::default());
    let site = site_near_path(&session, 120.0);
    let tower = session
        .place_tower(TowerKind::SingleTarget, site)
        .expect("tower placed");
    session.start_wave().expect("wave starts");

    let shots: Vec<Duration> = run_wave(&mut session)
        .into_iter()
        .filter_map(|(at, event)| match event {
            Event::TowerFired { tower: source, .. } if source == tower => Some(at),
            _ => None,
        })
        .collect();

    assert!(!shots.is_empty());
    for pair in shots.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(500));
    }
}

#[test]
fn undefended_wave_breaches_then_repairs() {
    let mut session = session_with(GameConfig::default());
    session.start_wave().expect("wave starts");

    let events: Vec<Event> = run_wave(&mut session)
        .into_iter()
        .map(|(_, event)| event)
        .collect();

    let breaches = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyReachedBase { .. }))
        .count();
    assert_eq!(breaches, 3);
    assert!(events.contains(&Event::BaseRepaired {
        amount: 30.0,
        hp: 500.0,
    }));
    assert!(events.contains(&Event::WaveCompleted { wave: 2, bonus: 70 }));
    assert_eq!(session.lives(), 7);
    assert_eq!(session.wave(), 2);
    assert_eq!(session.credits(), 170);
    assert!(!session.is_wave_active());
}

#[test]
fn losing_every_life_ends_the_game() {
    let mut session = session_with(GameConfig {
        starting_lives: 1,
        ..GameConfig::default()
    });
    session.start_wave().expect("wave starts");

    let events = run_wave(&mut session);
    assert!(events
        .iter()
        .any(|(_, event)| *event == Event::GameOver { wave: 1 }));
    assert_eq!(session.phase(), GamePhase::GameOver);

    let frozen = session.elapsed();
    session.tick(Duration::from_secs(1));
    assert_eq!(session.elapsed(), frozen);
    assert_eq!(
        session.place_tower(TowerKind::SingleTarget, Vec2::new(400.0, 300.0)),
        Err(CommandError::BaseDestroyed)
    );
    assert_eq!(session.start_wave(), Err(CommandError::BaseDestroyed));
}

#[test]
fn resuming_discards_the_paused_span() {
    let mut session = session_with(GameConfig::default());
    session.frame(Duration::ZERO);
    session.frame(STEP);
    assert_eq!(session.elapsed(), STEP);

    assert!(session.toggle_pause());
    session.frame(Duration::from_secs(10));
    assert_eq!(session.elapsed(), STEP);

    assert!(!session.toggle_pause());
    session.frame(Duration::from_secs(20));
    assert_eq!(session.elapsed(), STEP);
    session.frame(Duration::from_secs(20) + STEP);
    assert_eq!(session.elapsed(), STEP * 2);
}

#[test]
fn fast_forward_doubles_simulated_time() {
    let mut session = session_with(GameConfig::default());
    assert_eq!(session.toggle_fast_forward(), SpeedMultiplier::Double);

    let mut source = FixedStep::new(STEP);
    for _ in 0..11 {
        session.pump(&mut source);
    }
    assert_eq!(session.elapsed(), STEP * 20);

    assert_eq!(session.toggle_fast_forward(), SpeedMultiplier::Normal);
    session.pump(&mut source);
    assert_eq!(session.elapsed(), STEP * 21);
}

#[test]
fn restart_clears_progress() {
    let mut session = session_with(GameConfig::default());
    let site = site_near_path(&session, 120.0);
    let _ = session
        .place_tower(TowerKind::SingleTarget, site)
        .expect("tower placed");
    session.start_wave().expect("wave starts");
    let _ = session.toggle_fast_forward();
    for _ in 0..100 {
        session.tick(STEP);
    }

    session.restart();
    let events: Vec<Event> = session.drain_events().collect();

    assert!(matches!(events[0], Event::SessionReset { .. }));
    assert_eq!(session.credits(), 100);
    assert_eq!(session.wave(), 1);
    assert_eq!(session.lives(), 10);
    assert_eq!(session.speed(), SpeedMultiplier::Normal);
    assert_eq!(session.elapsed(), Duration::ZERO);
    assert_eq!(session.pending_spawns(), 0);
    assert!(session.towers().is_empty());
    assert!(session.enemies().is_empty());
    assert!(!session.is_wave_active());
}

#[test]
fn same_seed_replays_identical_event_streams() {
    fn script(seed: u64) -> Vec<Event> {
        let mut session = Session::new(GameConfig {
            seed,
            ..GameConfig::default()
        })
        .expect("config is valid");
        let site = site_near_path(&session, 120.0);
        let _ = session.place_tower(TowerKind::MultiChain, site);
        session.start_wave().expect("wave starts");
        let mut source = FixedStep::new(STEP);
        for _ in 0..600 {
            session.pump(&mut source);
        }
        session.drain_events().collect()
    }

    assert_eq!(script(99), script(99));
}

#[test]
fn unknown_tower_is_rejected() {
    let mut session = session_with(GameConfig::default());
    let missing = aegis_defence_core::TowerId::new(42);
    assert_eq!(
        session.sell_tower(missing),
        Err(CommandError::UnknownTower)
    );
    assert_eq!(
        session.upgrade_tower_by_key(missing, "damage"),
        Err(CommandError::UnknownTower)
    );
    assert_eq!(session.sell_value(missing), None);
}

struct Burst {
    frames: Vec<Duration>,
    index: usize,
}

impl TickSource for Burst {
    fn now(&mut self) -> Duration {
        let now = self.frames[self.index.min(self.frames.len() - 1)];
        self.index += 1;
        now
    }
}

#[test]
fn custom_tick_sources_drive_the_session() {
    let mut session = session_with(GameConfig::default());
    let mut source = Burst {
        frames: vec![
            Duration::from_millis(100),
            Duration::from_millis(130),
            Duration::from_millis(200),
        ],
        index: 0,
    };
    for _ in 0..3 {
        session.pump(&mut source);
    }
    assert_eq!(session.elapsed(), Duration::from_millis(100));
}

proptest! {
    #[test]
    fn placements_either_pay_or_leave_credits_alone(
        attempts in prop::collection::vec((0.0f32..960.0, 0.0f32..640.0, 0usize..3), 1..12),
    ) {
        let mut session = session_with(GameConfig {
            starting_credits: 400,
            ..GameConfig::default()
        });
        for (x, y, kind) in attempts {
            let kind = TowerKind::ALL[kind];
            let before = session.credits();
            match session.place_tower(kind, Vec2::new(x, y)) {
                Ok(_) => prop_assert_eq!(session.credits(), before - kind.cost()),
                Err(_) => prop_assert_eq!(session.credits(), before),
            }
        }
    }
}
