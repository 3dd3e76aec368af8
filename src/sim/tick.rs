//! Per-frame simulation step and phase transitions
//!
//! Nothing here touches audio or storage. Transitions return the side effects
//! they require as a list of `Effect`s, in the order they must be performed,
//! and the engine interprets them after the state change.

use rand::Rng;

use super::physics::{apply_gravity, check_collision};
use super::spawn::spawn_obstacle;
use super::state::{GamePhase, GameState, Particle};
use super::zones::{ZoneCatalog, ZoneId};
use crate::Viewport;
use crate::consts::*;

/// Haptic feedback patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Jump,
    Hit,
    ZoneClear,
}

impl Haptic {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            Haptic::Jump => &[10],
            Haptic::Hit => &[50],
            Haptic::ZoneClear => &[100, 50, 100],
        }
    }
}

/// A side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Stop every track (also cancels any in-flight fade)
    StopAllAudio,
    /// Start the zone's track
    PlayZone(ZoneId),
    /// Ramp the zone's track to silence, then stop it
    FadeOutZone { zone: ZoneId, duration: f32 },
    /// Write the resumable progress record
    PersistSave {
        current_zone: usize,
        score: u64,
        lives: u8,
    },
    Haptic(Haptic),
}

/// Advance the game by `dt` seconds. No-op unless Playing.
pub fn update<R: Rng>(
    state: &mut GameState,
    catalog: &ZoneCatalog,
    viewport: &Viewport,
    dt: f32,
    rng: &mut R,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    if state.phase != GamePhase::Playing {
        return effects;
    }

    state.time += dt;
    state.zone_timer += dt;

    let zone = catalog.get(state.current_zone_index);
    let scroll_speed = viewport.scroll_speed(zone.speed);
    state.scroll_x += scroll_speed * dt;

    apply_gravity(&mut state.character, viewport.ground_y(), dt);
    state.refresh_zone_progress();

    if state.time - state.last_obstacle_spawn_time > zone.obstacle_interval {
        let obstacle = spawn_obstacle(zone, viewport, state.time, rng);
        state.obstacles.push(obstacle);
        state.last_obstacle_spawn_time = state.time;
    }

    // Rebuild the obstacle list in spawn order
    let character_pos = state.character.pos;
    let mut pending = std::mem::take(&mut state.obstacles).into_iter();
    let mut kept = Vec::with_capacity(pending.len());

    while let Some(mut obs) = pending.next() {
        obs.pos.x -= scroll_speed * dt;

        if !obs.collected && check_collision(character_pos, &obs) {
            if obs.is_collectible {
                obs.collected = true;
                state.score += obs.points;
                if obs.gives_life && state.lives < MAX_LIVES {
                    state.lives += 1;
                    state.particles.push(Particle::life_gain(&obs));
                }
                state.particles.push(Particle::score(&obs));
            } else {
                // Hazard: costs a life and is removed immediately
                state.lives = state.lives.saturating_sub(1);
                state.character.hit_flash = 1.0;
                effects.push(Effect::Haptic(Haptic::Hit));

                if state.lives == 0 {
                    kept.extend(pending.by_ref());
                    state.obstacles = kept;
                    state.phase = GamePhase::GameOver;
                    log::info!("Game over in zone {} with score {}", zone.id, state.score);
                    effects.push(Effect::StopAllAudio);
                    return effects;
                }
                continue;
            }
        }

        if obs.is_offscreen() {
            if !obs.is_collectible && !obs.collected {
                state.score += PASS_BONUS;
            }
            continue;
        }

        kept.push(obs);
    }
    state.obstacles = kept;

    let frames = dt * 60.0;
    for particle in state.particles.iter_mut() {
        particle.pos.y += particle.vy * frames;
        particle.life -= dt * 2.0;
    }
    state.particles.retain(|p| p.life > 0.0);

    if !state.fade_fired && state.zone_timer >= ZONE_FADE_START {
        state.fade_fired = true;
        effects.push(Effect::FadeOutZone {
            zone: zone.id,
            duration: ZONE_FADE_DURATION,
        });
    }

    if state.zone_timer >= ZONE_MAX_DURATION {
        effects.extend(complete_zone(state, catalog));
    }

    effects
}

/// Zone time budget reached: bonus life, then Finale or ZoneTransition
pub fn complete_zone(state: &mut GameState, catalog: &ZoneCatalog) -> Vec<Effect> {
    let mut effects = vec![Effect::Haptic(Haptic::ZoneClear)];
    let was_last_zone = catalog.is_last(state.current_zone_index);

    if state.lives < MAX_LIVES {
        state.lives += 1;
    }

    if was_last_zone {
        state.phase = GamePhase::Finale;
        log::info!("All zones cleared, final score {}", state.score);
        effects.push(Effect::StopAllAudio);
        return effects;
    }

    state.phase = GamePhase::ZoneTransition;
    state.transition_timer = 0.0;
    state.transition_alpha = 0.0;
    log::info!(
        "Zone {} cleared (score {}, lives {})",
        state.current_zone_index + 1,
        state.score,
        state.lives
    );

    effects.push(Effect::PersistSave {
        current_zone: state.current_zone_index + 1,
        score: state.score,
        lives: state.lives,
    });
    effects
}

/// Advance the transition overlay. Returns true once it has finished.
///
/// Alpha ramps 0 -> 1 over the first 0.5s, holds until 1.0s, and ramps back
/// to 0 by 1.5s.
pub fn update_transition(state: &mut GameState, dt: f32) -> bool {
    if state.phase != GamePhase::ZoneTransition {
        return false;
    }
    state.transition_timer += dt;
    let t = state.transition_timer;

    if t >= TRANSITION_DURATION {
        state.transition_alpha = 0.0;
        return true;
    }

    state.transition_alpha = if t < TRANSITION_FADE_IN {
        t / TRANSITION_FADE_IN
    } else if t < TRANSITION_HOLD_END {
        1.0
    } else {
        1.0 - (t - TRANSITION_HOLD_END) / (TRANSITION_DURATION - TRANSITION_HOLD_END)
    };
    false
}

/// Enter the next zone after a completed transition
pub fn advance_to_next_zone(state: &mut GameState, catalog: &ZoneCatalog) -> Vec<Effect> {
    if state.phase != GamePhase::ZoneTransition {
        return Vec::new();
    }
    let next = (state.current_zone_index + 1).min(catalog.len() - 1);
    state.enter_zone(next);
    state.phase = GamePhase::Playing;
    log::info!("Entering zone {} ({})", next + 1, catalog.get(next).name);
    vec![Effect::PlayZone(catalog.get(next).id)]
}

/// Brand-new run from the first zone
pub fn restart_game(
    state: &mut GameState,
    catalog: &ZoneCatalog,
    viewport: &Viewport,
) -> Vec<Effect> {
    *state = GameState::new();
    state.phase = GamePhase::Playing;
    state.reset_character(viewport);
    vec![Effect::StopAllAudio, Effect::PlayZone(catalog.get(0).id)]
}

/// Replay a zone with full lives, keeping the score
///
/// Out-of-range indices fall back to the first zone.
pub fn restart_from_zone(
    state: &mut GameState,
    catalog: &ZoneCatalog,
    zone_index: usize,
    viewport: &Viewport,
) -> Vec<Effect> {
    let index = catalog.clamp_index(zone_index);
    state.enter_zone(index);
    state.lives = MAX_LIVES;
    state.phase = GamePhase::Playing;
    state.reset_character(viewport);
    vec![Effect::StopAllAudio, Effect::PlayZone(catalog.get(index).id)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Obstacle, ParticleKind};
    use approx::assert_relative_eq;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 500.0)
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new();
        state.phase = GamePhase::Playing;
        state.reset_character(&viewport());
        state
    }

    fn hazard_on_character(state: &GameState) -> Obstacle {
        Obstacle::hazard("amplifier", state.character.pos, Vec2::splat(CHARACTER_SIZE), 0.0)
    }

    fn collectible_on_character(state: &GameState, points: u64, gives_life: bool) -> Obstacle {
        Obstacle::collectible(
            "heartBalloon",
            state.character.pos,
            Vec2::splat(CHARACTER_SIZE),
            points,
            gives_life,
        )
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    #[test]
    fn test_update_is_noop_unless_playing() {
        let catalog = ZoneCatalog::builtin();
        for phase in [
            GamePhase::Loading,
            GamePhase::Start,
            GamePhase::Paused,
            GamePhase::GameOver,
            GamePhase::ZoneTransition,
            GamePhase::Finale,
        ] {
            let mut state = playing_state();
            state.phase = phase;
            let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
            assert!(effects.is_empty());
            assert_eq!(state.time, 0.0);
            assert_eq!(state.scroll_x, 0.0);
        }
    }

    #[test]
    fn test_update_advances_clocks_and_scroll() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        update(&mut state, &catalog, &viewport(), 0.5, &mut rng());
        assert_relative_eq!(state.time, 0.5);
        assert_relative_eq!(state.zone_timer, 0.5);
        // 1000 * 1.5 / 60 * 1.0 * 1.6 = 40 px/s
        assert_relative_eq!(state.scroll_x, 20.0, epsilon = 1e-4);
        assert_relative_eq!(state.zone_progress, 0.5 / ZONE_MAX_DURATION);
    }

    #[test]
    fn test_spawn_is_interval_gated() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        let interval = catalog.get(0).obstacle_interval;

        // Just under the interval: nothing yet
        update(&mut state, &catalog, &viewport(), interval - 0.01, &mut rng());
        assert!(state.obstacles.is_empty());

        // Crossing it: exactly one spawn
        update(&mut state, &catalog, &viewport(), 0.02, &mut rng());
        assert_eq!(state.obstacles.len(), 1);
        assert_relative_eq!(state.last_obstacle_spawn_time, state.time);

        update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_hazard_hit_costs_life_and_is_removed() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        let hazard = hazard_on_character(&state);
        state.obstacles.push(hazard);

        let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.lives, 2);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.character.hit_flash, 1.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(effects.contains(&Effect::Haptic(Haptic::Hit)));
        assert!(!effects.contains(&Effect::StopAllAudio));
    }

    #[test]
    fn test_fatal_hit_goes_to_game_over() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.lives = 1;
        let hazard = hazard_on_character(&state);
        state.obstacles.push(hazard);

        let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(effects.last(), Some(&Effect::StopAllAudio));
    }

    #[test]
    fn test_multiple_hits_in_one_tick_stop_at_game_over() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.lives = 2;
        for _ in 0..3 {
            let hazard = hazard_on_character(&state);
            state.obstacles.push(hazard);
        }
        let far = Obstacle::hazard("drumSet", Vec2::new(800.0, 0.0), Vec2::splat(40.0), 0.0);
        state.obstacles.push(far);
        let start_x = state.character.pos.x;

        let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert_eq!(
            effects.iter().filter(|e| **e == Effect::StopAllAudio).count(),
            1
        );
        // Two hazards consumed; the rest were left untouched
        assert_eq!(state.obstacles.len(), 2);
        assert_eq!(state.obstacles[0].pos.x, start_x);
        assert_eq!(state.obstacles[1].pos.x, 800.0);
        // Particles and fade were not processed
        assert!(state.particles.is_empty());

        // Further updates are no-ops
        assert!(update(&mut state, &catalog, &viewport(), DT, &mut rng()).is_empty());
    }

    #[test]
    fn test_collectible_with_life_grant() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.lives = 2;
        state.score = 100;
        let item = collectible_on_character(&state, 20, true);
        state.obstacles.push(item);

        update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 120);
        assert_eq!(state.particles.len(), 2);
        assert!(state.particles.iter().any(|p| p.kind == ParticleKind::LifeGain));
        assert!(state.particles.iter().any(|p| p.kind == ParticleKind::Score && p.text == "+20"));
        // Stays on screen, marked collected
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.obstacles[0].collected);

        // Collected items are not counted twice
        update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.score, 120);
    }

    #[test]
    fn test_life_grant_capped_at_max() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        let item = collectible_on_character(&state, 5, true);
        state.obstacles.push(item);

        update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 5);
        assert_eq!(state.particles.len(), 1);
    }

    #[test]
    fn test_pass_bonus_only_for_hazards() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.obstacles.push(Obstacle::hazard(
            "bone",
            Vec2::new(-89.0, 0.0),
            Vec2::splat(40.0),
            0.0,
        ));
        state.obstacles.push(Obstacle::collectible(
            "star",
            Vec2::new(-89.0, 0.0),
            Vec2::splat(40.0),
            15,
            false,
        ));

        update(&mut state, &catalog, &viewport(), 0.1, &mut rng());
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, PASS_BONUS);
    }

    #[test]
    fn test_particles_rise_and_expire() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        let item = collectible_on_character(&state, 10, false);
        state.obstacles.push(item);
        update(&mut state, &catalog, &viewport(), DT, &mut rng());
        let y0 = state.particles[0].pos.y;

        update(&mut state, &catalog, &viewport(), 0.1, &mut rng());
        assert!(state.particles[0].pos.y < y0);

        for _ in 0..10 {
            update(&mut state, &catalog, &viewport(), 0.1, &mut rng());
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_fade_fires_once_per_zone() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.zone_timer = ZONE_FADE_START - 0.01;

        // A long frame jumps well past the old 0.1s window and still fires
        let effects = update(&mut state, &catalog, &viewport(), 0.5, &mut rng());
        assert!(effects.contains(&Effect::FadeOutZone {
            zone: 1,
            duration: ZONE_FADE_DURATION
        }));

        let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert!(!effects.iter().any(|e| matches!(e, Effect::FadeOutZone { .. })));
    }

    #[test]
    fn test_full_zone_clear() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.score = 340;
        state.fade_fired = true;
        state.zone_timer = ZONE_MAX_DURATION - 0.001;

        let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.phase, GamePhase::ZoneTransition);
        assert_eq!(state.lives, 3);
        assert_eq!(state.zone_progress, 1.0);
        assert_eq!(state.transition_timer, 0.0);
        assert_eq!(state.transition_alpha, 0.0);
        assert!(effects.contains(&Effect::PersistSave {
            current_zone: 1,
            score: 340,
            lives: 3
        }));
        // Zone index only moves on advance
        assert_eq!(state.current_zone_index, 0);
    }

    #[test]
    fn test_zone_clear_awards_life() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.lives = 1;
        let effects = complete_zone(&mut state, &catalog);
        assert_eq!(state.lives, 2);
        assert!(effects.contains(&Effect::PersistSave {
            current_zone: 1,
            score: 0,
            lives: 2
        }));
    }

    #[test]
    fn test_last_zone_goes_straight_to_finale() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.current_zone_index = 9;
        state.zone_timer = ZONE_MAX_DURATION - 0.001;

        let effects = update(&mut state, &catalog, &viewport(), DT, &mut rng());
        assert_eq!(state.phase, GamePhase::Finale);
        assert!(effects.contains(&Effect::StopAllAudio));
        assert!(!effects.iter().any(|e| matches!(e, Effect::PersistSave { .. })));

        // Terminal: no further simulation
        let scroll = state.scroll_x;
        assert!(update(&mut state, &catalog, &viewport(), DT, &mut rng()).is_empty());
        assert_eq!(state.scroll_x, scroll);
    }

    #[test]
    fn test_transition_timing() {
        let mut state = GameState::new();
        state.phase = GamePhase::ZoneTransition;

        assert!(!update_transition(&mut state, 0.25));
        assert_relative_eq!(state.transition_alpha, 0.5);
        assert!(!update_transition(&mut state, 0.25));
        assert_relative_eq!(state.transition_alpha, 1.0);
        assert!(!update_transition(&mut state, 0.4));
        assert_relative_eq!(state.transition_alpha, 1.0);
        assert!(!update_transition(&mut state, 0.35));
        assert_relative_eq!(state.transition_alpha, 0.5, epsilon = 1e-4);
        assert!(update_transition(&mut state, 0.3));
        assert_eq!(state.transition_alpha, 0.0);
    }

    #[test]
    fn test_transition_ignored_outside_phase() {
        let mut state = playing_state();
        assert!(!update_transition(&mut state, 2.0));
        assert_eq!(state.transition_timer, 0.0);
    }

    #[test]
    fn test_advance_to_next_zone() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.zone_timer = ZONE_MAX_DURATION;
        let hazard = hazard_on_character(&state);
        state.obstacles.push(hazard);
        state.particles.push(Particle::score(&state.obstacles[0]));
        complete_zone(&mut state, &catalog);

        while !update_transition(&mut state, DT) {}
        let effects = advance_to_next_zone(&mut state, &catalog);
        assert_eq!(effects, vec![Effect::PlayZone(2)]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.current_zone_index, 1);
        assert_eq!(state.zone_timer, 0.0);
        assert!(state.obstacles.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.last_obstacle_spawn_time, 0.0);

        // Exactly once
        assert!(advance_to_next_zone(&mut state, &catalog).is_empty());
        assert_eq!(state.current_zone_index, 1);
    }

    #[test]
    fn test_restart_game_resets_everything() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.score = 999;
        state.lives = 1;
        state.current_zone_index = 6;
        state.phase = GamePhase::Finale;

        let effects = restart_game(&mut state, &catalog, &viewport());
        assert_eq!(effects, vec![Effect::StopAllAudio, Effect::PlayZone(1)]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!((state.score, state.lives, state.current_zone_index), (0, 3, 0));
        assert!(state.character.is_on_ground);
    }

    #[test]
    fn test_restart_from_zone_keeps_score() {
        let catalog = ZoneCatalog::builtin();
        let mut state = playing_state();
        state.score = 450;
        state.lives = 0;
        state.phase = GamePhase::GameOver;
        state.current_zone_index = 3;

        let effects = restart_from_zone(&mut state, &catalog, 3, &viewport());
        assert_eq!(effects, vec![Effect::StopAllAudio, Effect::PlayZone(4)]);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 450);
        assert_eq!(state.phase, GamePhase::Playing);

        // Invalid index falls back to the first zone
        let effects = restart_from_zone(&mut state, &catalog, 77, &viewport());
        assert_eq!(state.current_zone_index, 0);
        assert_eq!(effects[1], Effect::PlayZone(1));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Hazard,
        LifeItem,
        ClearZone,
        Idle,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Hazard),
            Just(Op::LifeItem),
            Just(Op::ClearZone),
            Just(Op::Idle),
        ]
    }

    fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(op_strategy(), 1..60)
    }

    proptest! {
        #[test]
        fn prop_lives_bounded_and_score_monotonic(ops in ops_strategy()) {
            let catalog = ZoneCatalog::builtin();
            let vp = viewport();
            let mut rng = Pcg32::seed_from_u64(5);
            let mut state = playing_state();
            let mut last_score = state.score;

            for op in ops {
                match op {
                    Op::Hazard => {
                        let h = hazard_on_character(&state);
                        state.obstacles.push(h);
                    }
                    Op::LifeItem => {
                        let c = collectible_on_character(&state, 10, true);
                        state.obstacles.push(c);
                    }
                    Op::ClearZone => state.zone_timer = ZONE_MAX_DURATION,
                    Op::Idle => {}
                }
                update(&mut state, &catalog, &vp, DT, &mut rng);

                prop_assert!(state.lives <= MAX_LIVES);
                prop_assert!(state.score >= last_score);
                last_score = state.score;

                match state.phase {
                    GamePhase::ZoneTransition => {
                        while !update_transition(&mut state, 0.1) {}
                        advance_to_next_zone(&mut state, &catalog);
                    }
                    GamePhase::GameOver => {
                        prop_assert_eq!(state.lives, 0);
                        let zone = state.current_zone_index;
                        restart_from_zone(&mut state, &catalog, zone, &vp);
                    }
                    GamePhase::Finale => break,
                    _ => {}
                }
            }
        }

        #[test]
        fn prop_transition_alpha_in_range(steps in prop::collection::vec(0.0f32..0.3, 1..40)) {
            let mut state = GameState::new();
            state.phase = GamePhase::ZoneTransition;
            for dt in steps {
                let done = update_transition(&mut state, dt);
                prop_assert!((0.0..=1.0).contains(&state.transition_alpha));
                prop_assert_eq!(done, state.transition_timer >= TRANSITION_DURATION);
                if done { break; }
            }
        }
    }
}
