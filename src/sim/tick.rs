//! Per-frame simulation step
//!
//! Single-threaded update loop that advances the whole simulation by one
//! variable timestep: player motion and firing, entity scrolling,
//! collision resolution, spawn replenishment, and level progression, in a
//! fixed order so a given seed and input sequence replays identically.

use glam::Vec2;

use super::collision;
use super::movement::{self, MoveInput};
use super::spawn;
use super::state::{BuffKind, Bullet, GamePhase, GameState};
use crate::config::Config;
use crate::consts::*;

/// Input commands for a single step (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub movement: MoveInput,
    /// Fire is held, not edge-triggered; the cooldown gate decides
    pub fire: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one frame delta.
///
/// A non-positive `dt` is a no-op: the caller sees the exact same state
/// back, with no collision or spawn side effects. Oversized deltas (a
/// stalled frame) are clamped to `MAX_DT` before integrating.
pub fn step(state: &mut GameState, cfg: &Config, input: &TickInput, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    if state.phase == GamePhase::GameOver {
        return;
    }
    let dt = dt.min(MAX_DT);
    state.time += dt as f64;

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        input.clone()
    };

    movement::move_player(state, cfg, &input.movement, dt);
    if input.fire {
        try_fire(state, cfg);
    }

    movement::move_bullets(state, cfg, dt);
    movement::move_enemies(state, cfg, dt);
    movement::recycle_enemies(state, cfg);
    movement::move_chests(state, cfg, dt);
    movement::scroll_trees(state, cfg, dt);

    collision::resolve_bullet_enemy(state, cfg);
    collision::resolve_player_enemy(state, cfg);
    if state.phase == GamePhase::GameOver {
        state.effects.update(dt);
        return;
    }
    collision::resolve_player_chest(state, cfg);

    spawn::replenish(state, cfg);
    advance_level(state, cfg);

    state.effects.update(dt);
}

/// Cooldown-gated firing. Rapid shortens the gate, multi widens the volley
/// to three angled bullets, explosive flags every bullet in the volley.
pub fn try_fire(state: &mut GameState, cfg: &Config) {
    let now = state.time;
    let buffs = state.player.buffs;

    let mut cooldown = cfg.combat.base_shot_cooldown as f64;
    if buffs.active(BuffKind::Rapid, now) {
        cooldown *= cfg.buffs.rapid_cooldown_factor as f64;
    }
    if now - state.player.last_shot < cooldown {
        return;
    }
    state.player.last_shot = now;

    let explosive = buffs.active(BuffKind::Explosive, now);
    let angles: &[f32] = if buffs.active(BuffKind::Multi, now) {
        &cfg.buffs.multi_spread_angles
    } else {
        &[0.0]
    };

    let speed = cfg.combat.bullet_speed;
    // Muzzle sits slightly ahead of the player center
    let origin = state.player.pos + Vec2::new(0.0, -0.3);
    for &ang in angles {
        state.bullets.push(Bullet {
            pos: origin,
            vel: Vec2::new(ang.sin() * speed * 0.6, -speed * ang.cos()),
            radius: BULLET_RADIUS,
            explosive,
        });
    }
}

/// Level up when the score strictly exceeds `level * multiplier`; each new
/// level arrives with its own enemy wave and chest drop.
fn advance_level(state: &mut GameState, cfg: &Config) {
    let threshold = state.level as u64 * cfg.progression.level_score_multiplier;
    if state.score > threshold {
        state.level += 1;
        log::info!("level {} at score {}", state.level, state.score);
        spawn::spawn_wave(state, cfg, state.level);
    }
}

/// Demo-mode pilot: dodge the nearest enemy closing in on the player's
/// lane, otherwise drift toward a chest, otherwise recenter. Always
/// holding fire.
pub fn autopilot(state: &GameState) -> TickInput {
    let px = state.player.pos.x;
    let pz = state.player.pos.y;

    let mut input = TickInput {
        fire: true,
        ..TickInput::default()
    };

    // Nearest enemy ahead of the player and roughly in its lane
    let threat = state
        .enemies
        .iter()
        .filter(|e| e.pos.y < pz && (e.pos.x - px).abs() < 2.5)
        .min_by(|a, b| {
            (pz - a.pos.y)
                .partial_cmp(&(pz - b.pos.y))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(enemy) = threat {
        let gap = pz - enemy.pos.y;
        if gap < 4.0 {
            if enemy.pos.x >= px {
                input.movement.left = true;
            } else {
                input.movement.right = true;
            }
            input.movement.dash = gap < 2.0;
            return input;
        }
    }

    // Safe: chase the nearest chest, else drift back to center
    let target = state
        .chests
        .iter()
        .min_by(|a, b| {
            a.pos
                .distance_squared(state.player.pos)
                .partial_cmp(&b.pos.distance_squared(state.player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.pos);

    match target {
        Some(pos) => {
            if pos.x > px + 0.2 {
                input.movement.right = true;
            } else if pos.x < px - 0.2 {
                input.movement.left = true;
            }
            if pos.y > pz + 0.2 {
                input.movement.down = true;
            } else if pos.y < pz - 0.2 {
                input.movement.up = true;
            }
        }
        None => {
            if px > 0.5 {
                input.movement.left = true;
            } else if px < -0.5 {
                input.movement.right = true;
            }
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Difficulty};
    use crate::sim::state::{Capabilities, GameState};

    const DT: f32 = 1.0 / 60.0;

    fn quiet() -> (Config, GameState) {
        let cfg = Config::base();
        let mut state = GameState::new(&cfg, 7, 0);
        state.enemies.clear();
        state.chests.clear();
        (cfg, state)
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let (cfg, mut state) = quiet();
        let time = state.time;
        let pos = state.player.pos;
        let trees = state.trees.len();

        step(&mut state, &cfg, &TickInput::default(), 0.0);
        step(&mut state, &cfg, &TickInput::default(), -0.5);

        assert_eq!(state.time, time);
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.trees.len(), trees);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_oversized_dt_is_clamped() {
        let (cfg, mut state) = quiet();
        step(&mut state, &cfg, &TickInput::default(), 1.0);
        assert!((state.time - MAX_DT as f64).abs() < 1e-9);
    }

    #[test]
    fn test_game_over_freezes_the_step() {
        let (cfg, mut state) = quiet();
        state.phase = GamePhase::GameOver;
        let time = state.time;
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        step(&mut state, &cfg, &input, DT);
        assert_eq!(state.time, time);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_fire_cooldown_gate() {
        let (cfg, mut state) = quiet();
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        step(&mut state, &cfg, &input, DT);
        assert_eq!(state.bullets.len(), 1);

        // Next frame is still inside the 0.28s cooldown
        step(&mut state, &cfg, &input, DT);
        assert_eq!(state.bullets.len(), 1);

        // Walk the clock past the cooldown
        for _ in 0..20 {
            step(&mut state, &cfg, &TickInput::default(), DT);
        }
        step(&mut state, &cfg, &input, DT);
        assert_eq!(state.bullets.len(), 2);
    }

    #[test]
    fn test_rapid_buff_shortens_cooldown() {
        let (cfg, mut state) = quiet();
        state
            .player
            .buffs
            .apply(BuffKind::Rapid, state.time, cfg.buffs.duration_ms);
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        // 0.28 * 0.4 = 0.112s: at 60Hz the 8th frame re-fires
        for _ in 0..8 {
            step(&mut state, &cfg, &input, DT);
        }
        assert_eq!(state.bullets.len(), 2);
    }

    #[test]
    fn test_multi_buff_fires_angled_volley() {
        let (cfg, mut state) = quiet();
        state
            .player
            .buffs
            .apply(BuffKind::Multi, state.time, cfg.buffs.duration_ms);
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        step(&mut state, &cfg, &input, DT);
        assert_eq!(state.bullets.len(), 3);
        // Outer bullets diverge laterally, center flies straight
        let xs: Vec<f32> = state.bullets.iter().map(|b| b.vel.x).collect();
        assert!(xs[0] < 0.0);
        assert_eq!(xs[1], 0.0);
        assert!(xs[2] > 0.0);
        assert!(state.bullets.iter().all(|b| b.vel.y < 0.0));
        assert!(state.bullets.iter().all(|b| !b.explosive));
    }

    #[test]
    fn test_explosive_buff_flags_bullets() {
        let (cfg, mut state) = quiet();
        state
            .player
            .buffs
            .apply(BuffKind::Explosive, state.time, cfg.buffs.duration_ms);
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        step(&mut state, &cfg, &input, DT);
        assert!(!state.bullets.is_empty());
        assert!(state.bullets.iter().all(|b| b.explosive));
    }

    #[test]
    fn test_expired_buff_no_longer_applies() {
        let (cfg, mut state) = quiet();
        state
            .player
            .buffs
            .apply(BuffKind::Explosive, state.time, cfg.buffs.duration_ms);
        // 6s window at 33ms clamped steps: ~200 steps to outlive it
        for _ in 0..220 {
            step(&mut state, &cfg, &TickInput::default(), MAX_DT);
        }
        state.bullets.clear();
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        step(&mut state, &cfg, &input, DT);
        assert!(!state.bullets.is_empty());
        assert!(state.bullets.iter().all(|b| !b.explosive));
    }

    #[test]
    fn test_level_up_requires_strictly_greater_score() {
        let (cfg, mut state) = quiet();
        state.score = cfg.progression.level_score_multiplier;
        step(&mut state, &cfg, &TickInput::default(), DT);
        assert_eq!(state.level, 1);

        state.score += 1;
        step(&mut state, &cfg, &TickInput::default(), DT);
        assert_eq!(state.level, 2);
        // The new level brought its wave with it
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_replenish_respects_enemy_cap() {
        let cfg = Config::base();
        let mut state = GameState::new(&cfg, 11, 0);
        for _ in 0..600 {
            step(&mut state, &cfg, &TickInput::default(), DT);
            let cap = (5 + 2 * state.level as usize).min(30);
            assert!(state.enemies.len() <= cap);
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_autopilot_run_stays_in_bounds() {
        let cfg = Config::for_difficulty(Difficulty::Normal);
        let mut state = GameState::new(&cfg, 1234, 0);
        state.capabilities = Capabilities {
            brainstem_model: true,
        };
        let input = TickInput {
            idle_mode: true,
            ..TickInput::default()
        };
        for _ in 0..1200 {
            step(&mut state, &cfg, &input, DT);
            let b = cfg.environment.bounds;
            assert!(state.player.pos.x.abs() <= b.x);
            assert!(state.player.pos.y.abs() <= b.z);
            assert!(state.effects.active_count() <= state.effects.capacity());
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn test_same_seed_and_inputs_replay_identically() {
        let cfg = Config::base();
        let mut a = GameState::new(&cfg, 99, 0);
        let mut b = GameState::new(&cfg, 99, 0);
        let input = TickInput {
            fire: true,
            ..TickInput::default()
        };
        for _ in 0..300 {
            step(&mut a, &cfg, &input, DT);
            step(&mut b, &cfg, &input, DT);
        }
        assert_eq!(a.time, b.time);
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.kind, eb.kind);
        }
    }
}
