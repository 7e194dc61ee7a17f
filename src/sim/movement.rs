//! Per-tick movement and steering
//!
//! Advances every entity kind: enemies scroll forward with kind-specific
//! lateral corrections, bullets and chests integrate their velocities,
//! trees scroll and recycle in place, and the player integrates input plus
//! knockback with arena clamping and trunk blocking.

use glam::Vec2;
use rand::Rng;

use super::spawn::{roll_tree, tree_recycle_z, tree_spawn_interval};
use super::state::{EnemyAi, GameState};
use crate::config::Config;
use crate::consts::*;
use crate::damp_factor;

/// Hard cap on steering corrections per tick, prevents teleporting
const STEER_CLAMP: f32 = 0.3;
/// Brainstem tracking is weaker than orc steering
const TRACK_CLAMP: f32 = 0.25;

/// Directional movement input for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub dash: bool,
}

/// Integrate player input and knockback, clamp to arena bounds, then roll
/// back to the pre-move position if the new position overlaps any trunk.
/// Foliage never blocks.
pub fn move_player(state: &mut GameState, cfg: &Config, input: &MoveInput, dt: f32) {
    let speed = if input.dash {
        cfg.player.dash_speed
    } else {
        cfg.player.speed
    };
    let prev = state.player.pos;

    let mut delta = Vec2::ZERO;
    if input.up {
        delta.y -= speed * dt;
    }
    if input.down {
        delta.y += speed * dt;
    }
    if input.left {
        delta.x -= speed * dt;
    }
    if input.right {
        delta.x += speed * dt;
    }
    state.player.pos += delta + state.player.vel * dt;

    let bounds = cfg.environment.bounds;
    state.player.pos.x = state.player.pos.x.clamp(-bounds.x, bounds.x);
    state.player.pos.y = state.player.pos.y.clamp(-bounds.z, bounds.z);

    for tree in &state.trees {
        let collide_r = state.player.radius + tree.trunk_radius;
        if state.player.pos.distance_squared(tree.pos) < collide_r * collide_r {
            state.player.pos = prev;
            break;
        }
    }

    let damp = damp_factor(cfg.physics.damping, dt);
    state.player.vel *= damp;

    if state.player.invuln > 0.0 {
        state.player.invuln -= dt;
    }
}

/// Advance all enemies: forward scroll, damped lateral knockback, spin,
/// and the kind-specific steering rule.
pub fn move_enemies(state: &mut GameState, cfg: &Config, dt: f32) {
    let player_x = state.player.pos.x;
    let time = state.time as f32;
    let damp = damp_factor(cfg.physics.damping, dt);

    for enemy in &mut state.enemies {
        enemy.pos.y += enemy.vz * dt;
        enemy.pos.x += enemy.vx * dt;
        enemy.vx *= damp;

        match enemy.ai {
            EnemyAi::Steer => {
                let dx = player_x - enemy.pos.x;
                enemy.pos.x +=
                    (dx * cfg.ai.orc_turn_speed * dt).clamp(-STEER_CLAMP, STEER_CLAMP);
            }
            EnemyAi::Drift { seed } => {
                let phase = time + seed;
                let drift = (phase * 0.8).sin() * cfg.ai.brain_stem_drift * dt;
                let track = ((player_x - enemy.pos.x) * 0.15 * dt).clamp(-TRACK_CLAMP, TRACK_CLAMP);
                enemy.pos.x += drift + track;
            }
            EnemyAi::None => {}
        }

        enemy.yaw += enemy.spin_y * dt;
        enemy.pitch += enemy.spin_x * dt;
        if enemy.flash > 0.0 {
            enemy.flash = (enemy.flash - dt).max(0.0);
        }
    }
}

/// Advance bullets and cull the ones that left the corridor
pub fn move_bullets(state: &mut GameState, cfg: &Config, dt: f32) {
    let bounds = cfg.environment.bounds;
    for bullet in &mut state.bullets {
        bullet.pos += bullet.vel * dt;
    }
    state.bullets.retain(|b| {
        b.pos.y >= -bounds.z - BULLET_CULL_Z_MARGIN && b.pos.x.abs() <= bounds.x + BULLET_CULL_X_MARGIN
    });
}

/// Recycle enemies past the near boundary. No score is awarded here.
pub fn recycle_enemies(state: &mut GameState, cfg: &Config) {
    let limit = cfg.environment.bounds.z + RECYCLE_Z_MARGIN;
    state.enemies.retain(|e| e.pos.y <= limit);
}

/// Advance chests and recycle the ones past the boundary. No loot is
/// granted on boundary recycle.
pub fn move_chests(state: &mut GameState, cfg: &Config, dt: f32) {
    let limit = cfg.environment.bounds.z + RECYCLE_Z_MARGIN;
    for chest in &mut state.chests {
        chest.pos.y += chest.vz * dt;
    }
    state.chests.retain(|c| c.pos.y <= limit);
}

/// Scroll trees toward the player and recycle them in place; spawn new
/// ones on a level-scaled accumulator up to the fixed maximum.
pub fn scroll_trees(state: &mut GameState, cfg: &Config, dt: f32) {
    state.tree_spawn_accumulator += dt;
    if state.trees.len() < cfg.environment.max_trees
        && state.tree_spawn_accumulator >= tree_spawn_interval(state.level)
    {
        state.tree_spawn_accumulator = 0.0;
        let tree = roll_tree(state, cfg);
        state.trees.push(tree);
    }

    let scroll_speed = cfg.environment.tree_scroll_base + state.level as f32 * 0.15;
    let limit = cfg.environment.bounds.z + RECYCLE_Z_MARGIN;
    let recycle_z = tree_recycle_z(cfg);
    for idx in 0..state.trees.len() {
        state.trees[idx].pos.y += scroll_speed * dt;
        if state.trees[idx].pos.y > limit {
            // Reposition and reroll dimensions, keeping the pool slot
            let kind = state.trees[idx].kind;
            let bx = cfg.environment.bounds.x;
            let x = state.rng.random_range(-bx + 0.8..bx - 0.8);
            let z = recycle_z + state.rng.random_range(0.0..TREE_SPAWN_BAND);
            let (trunk_height, crown_radius, trunk_radius, radius) =
                super::spawn::roll_tree_dims(state, kind);
            let tree = &mut state.trees[idx];
            tree.pos = Vec2::new(x, z);
            tree.trunk_height = trunk_height;
            tree.crown_radius = crown_radius;
            tree.trunk_radius = trunk_radius;
            tree.radius = radius;
        }
    }
}
