//! Naive autopilot that builds, upgrades and starts waves on its own.

use std::time::Duration;

use aegis_defence_core::{
    Event, GamePhase, TowerAttribute, TowerKind, SPECIALIZATION_COST,
};
use aegis_defence_session::{FixedStep, Session, TickSource, WallClock};
use glam::Vec2;
use serde::Deserialize;
use tracing::{debug, info, warn};

const SITE_STEP: usize = 20;
const SPECIALIZE_FROM_WAVE: u32 = 3;

/// Knobs for the autopilot, loadable from the `[autoplay]` config table.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct AutoplaySettings {
    pub(crate) waves: u32,
    pub(crate) fast_forward: bool,
    pub(crate) realtime: bool,
    pub(crate) max_wave_secs: u64,
}

impl Default for AutoplaySettings {
    fn default() -> Self {
        Self {
            waves: 5,
            fast_forward: false,
            realtime: false,
            max_wave_secs: 600,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Summary {
    pub(crate) waves_cleared: u32,
    pub(crate) towers_built: u32,
    pub(crate) upgrades: u32,
    pub(crate) shots: u32,
    pub(crate) kills: u32,
    pub(crate) breaches: u32,
}

/// Plays waves until the requested number is cleared or the base falls.
pub(crate) fn run(session: &mut Session, settings: &AutoplaySettings) -> Summary {
    let mut summary = Summary::default();
    let step = session.config().tick_step();
    let mut fixed = FixedStep::new(step);
    let mut wall = WallClock::new();
    let source: &mut dyn TickSource = if settings.realtime {
        &mut wall
    } else {
        &mut fixed
    };
    let limit = Duration::from_secs(settings.max_wave_secs);
    if settings.fast_forward {
        let _ = session.toggle_fast_forward();
    }
    tally(session, &mut summary);

    while summary.waves_cleared < settings.waves && session.phase() == GamePhase::Playing {
        invest(session, &mut summary);
        if let Err(reason) = session.start_wave() {
            warn!(%reason, "wave refused");
            break;
        }

        let started = session.elapsed();
        while session.is_wave_active() && session.elapsed().saturating_sub(started) < limit {
            session.pump(source);
            tally(session, &mut summary);
            if settings.realtime {
                std::thread::sleep(step);
            }
        }

        if session.is_wave_active() {
            warn!(wave = session.wave(), "wave exceeded its time limit");
            break;
        }
        if session.phase() == GamePhase::Playing {
            summary.waves_cleared += 1;
            info!(
                next_wave = session.wave(),
                credits = session.credits(),
                lives = session.lives(),
                "wave cleared"
            );
        }
    }

    summary
}

fn tally(session: &mut Session, summary: &mut Summary) {
    for event in session.drain_events() {
        match event {
            Event::TowerFired { .. } => summary.shots += 1,
            Event::EnemyDied { .. } => summary.kills += 1,
            Event::EnemyReachedBase { .. } => summary.breaches += 1,
            Event::GameOver { wave } => warn!(wave, "base destroyed"),
            _ => {}
        }
    }
}

/// Spends credits until nothing useful is affordable.
fn invest(session: &mut Session, summary: &mut Summary) {
    loop {
        let kind = next_tower_kind(session);
        if session.credits() >= kind.cost() {
            if let Some(site) = best_site(session, kind) {
                match session.place_tower(kind, site) {
                    Ok(tower) => {
                        info!(tower = tower.get(), ?kind, x = site.x, y = site.y, "tower built");
                        summary.towers_built += 1;
                        continue;
                    }
                    Err(reason) => debug!(%reason, "placement skipped"),
                }
            }
        }

        if session.wave() >= SPECIALIZE_FROM_WAVE && specialize_one(session) {
            summary.upgrades += 1;
            continue;
        }

        let cheapest = session
            .towers()
            .iter()
            .filter_map(|tower| {
                session
                    .tower_upgrade_cost(tower.id, TowerAttribute::Damage)
                    .map(|cost| (cost, tower.id))
            })
            .min();
        if let Some((cost, tower)) = cheapest {
            if cost <= session.credits()
                && session
                    .upgrade_tower(tower, TowerAttribute::Damage)
                    .is_ok()
            {
                summary.upgrades += 1;
                continue;
            }
        }
        break;
    }
}

fn next_tower_kind(session: &Session) -> TowerKind {
    match session.towers().len() % 3 {
        2 => TowerKind::MultiChain,
        _ => TowerKind::SingleTarget,
    }
}

fn specialize_one(session: &mut Session) -> bool {
    if session.credits() < SPECIALIZATION_COST + TowerKind::SingleTarget.cost() {
        return false;
    }
    let candidate = session
        .towers()
        .iter()
        .find(|tower| tower.specialization.is_none())
        .map(|tower| (tower.id, tower.kind.specializations()[0]));
    let Some((tower, specialization)) = candidate else {
        return false;
    };
    match session.specialize_tower(tower, specialization) {
        Ok(()) => {
            info!(tower = tower.get(), ?specialization, "tower specialized");
            true
        }
        Err(_) => false,
    }
}

/// Valid site covering the most path points within the kind's range.
fn best_site(session: &Session, kind: TowerKind) -> Option<Vec2> {
    let range = kind.base_stats().range;
    let board = *session.board();
    let points = session.path().points();

    let mut best: Option<(usize, Vec2)> = None;
    for y in (0..board.height as usize).step_by(SITE_STEP) {
        for x in (0..board.width as usize).step_by(SITE_STEP) {
            let site = Vec2::new(x as f32, y as f32);
            if session.placement(site).is_err() {
                continue;
            }
            let coverage = points
                .iter()
                .filter(|point| point.distance(site) <= range)
                .count();
            if best.map_or(true, |(score, _)| coverage > score) {
                best = Some((coverage, site));
            }
        }
    }
    best.map(|(_, site)| site)
}
