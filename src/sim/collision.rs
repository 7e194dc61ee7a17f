//! Collision detection and resolution
//!
//! All collisions are simplified 2D-footprint tests in the ground plane:
//! axis-aligned overlap for enemies (half-extent boxes) against circles
//! (player capsule, bullets) and circle-circle for chest pickup. Each
//! resolver mutates hp/lives/score, emits events, and requests pooled
//! effects; removal bookkeeping guarantees no entity is scored twice and
//! no bullet hits twice.

use glam::Vec2;
use rand::Rng;

use super::state::{BuffKind, GameEvent, GamePhase, GameState, LootKind};
use crate::config::Config;
use crate::consts::*;
use crate::NORMALIZE_EPSILON;

/// Axis-aligned overlap between a half-extent box and a circle footprint
#[inline]
pub fn box_circle_overlap(
    box_pos: Vec2,
    half_w: f32,
    half_d: f32,
    circle_pos: Vec2,
    radius: f32,
) -> bool {
    (circle_pos.x - box_pos.x).abs() <= half_w + radius
        && (circle_pos.y - box_pos.y).abs() <= half_d + radius
}

/// Unit vector from `from` toward `to`, guarded against coincident points
#[inline]
pub fn knockback_dir(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let len = delta.length().max(NORMALIZE_EPSILON);
    delta / len
}

/// Player vs enemy contact. Only while the invulnerability window is
/// closed: costs one life, opens the window, knocks the player back away
/// from the enemy center, and ends the run at zero lives.
pub fn resolve_player_enemy(state: &mut GameState, cfg: &Config) {
    if state.player.invuln > 0.0 {
        return;
    }
    let pr = cfg.physics.player_capsule_radius;
    let player_pos = state.player.pos;

    let hit = state
        .enemies
        .iter()
        .find(|e| box_circle_overlap(e.pos, e.half_w, e.half_d, player_pos, pr))
        .map(|e| e.pos);

    let Some(enemy_pos) = hit else { return };

    state.lives = state.lives.saturating_sub(1);
    state.player.invuln = cfg.player.invuln_duration;
    state.push_event(GameEvent::Hit);
    state.effects.acquire(player_pos);

    let dir = knockback_dir(enemy_pos, player_pos);
    state.player.vel += dir * cfg.physics.player_knockback;

    if state.lives == 0 {
        game_over(state);
    }
}

/// Close out the run: freeze the phase and fold the score into the high
/// score. The persistence collaborator writes it back only when beaten.
fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    if state.score > state.high_score {
        state.high_score = state.score;
        log::info!("game over: new high score {}", state.score);
    } else {
        log::info!("game over: score {} (best {})", state.score, state.high_score);
    }
}

/// Bullet vs enemy. Each bullet is consumed by its first overlapping
/// enemy: 1 damage plus knockback along the bullet's direction. An
/// explosive bullet then deals 2 splash damage to every *other* enemy
/// within the configured radius of the impact point, evaluated once per
/// impact. Lethal damage removes the enemy and scores its kind's value.
pub fn resolve_bullet_enemy(state: &mut GameState, cfg: &Config) {
    let mut bi = state.bullets.len();
    while bi > 0 {
        bi -= 1;
        let bullet = state.bullets[bi].clone();

        // Scan newest-first, matching removal-safe reverse iteration
        let mut hit_idx = None;
        for ei in (0..state.enemies.len()).rev() {
            let e = &state.enemies[ei];
            if box_circle_overlap(e.pos, e.half_w, e.half_d, bullet.pos, bullet.radius) {
                hit_idx = Some(ei);
                break;
            }
        }
        let Some(ei) = hit_idx else { continue };

        let impact = state.enemies[ei].pos;
        {
            let mag = bullet.vel.length().max(NORMALIZE_EPSILON);
            let dir = bullet.vel / mag;
            let enemy = &mut state.enemies[ei];
            enemy.hp -= 1;
            enemy.vx += dir.x * cfg.physics.enemy_knockback;
            // Slight extra push forward
            enemy.vz += dir.y * cfg.physics.enemy_knockback * 0.2;
            if enemy.hp > 0 {
                enemy.flash = 0.12;
            }
        }
        state.effects.acquire(impact);

        if bullet.explosive {
            let radius_sq = cfg.combat.explosive_radius * cfg.combat.explosive_radius;
            for ej in 0..state.enemies.len() {
                if ej == ei {
                    continue;
                }
                let pos = state.enemies[ej].pos;
                if pos.distance_squared(impact) <= radius_sq {
                    let enemy = &mut state.enemies[ej];
                    enemy.hp -= 2;
                    if enemy.hp > 0 {
                        enemy.flash = 0.12;
                    }
                    state.effects.acquire(pos);
                }
            }
        }

        // Single reap pass for this impact: everything at hp <= 0 died to
        // it (earlier impacts already reaped), so each kill scores exactly
        // once.
        let mut ej = state.enemies.len();
        while ej > 0 {
            ej -= 1;
            if state.enemies[ej].hp <= 0 {
                let dead = state.enemies.remove(ej);
                state.score += cfg.enemies.scores.for_kind(dead.kind);
            }
        }

        state.bullets.remove(bi);
    }
}

/// Roll a loot category from a uniform [0,1) draw. Thresholds
/// 0.25 / 0.50 / 0.80 / 1.0.
pub fn roll_loot(roll: f32) -> LootKind {
    if roll < 0.25 {
        LootKind::Health
    } else if roll < 0.50 {
        LootKind::Rapid
    } else if roll < 0.80 {
        LootKind::Multi
    } else {
        LootKind::Explosive
    }
}

/// Player vs chest: circular overlap on summed radii. Pickup removes the
/// chest, grants a random loot category, and awards a flat score bonus.
pub fn resolve_player_chest(state: &mut GameState, cfg: &Config) {
    let player_pos = state.player.pos;
    let player_r = state.player.radius;

    let mut ci = state.chests.len();
    while ci > 0 {
        ci -= 1;
        let chest = &state.chests[ci];
        let reach = player_r + chest.radius;
        if player_pos.distance_squared(chest.pos) > reach * reach {
            continue;
        }
        state.chests.remove(ci);

        let loot = roll_loot(state.rng.random());
        apply_loot(state, cfg, loot);
        state.score += CHEST_SCORE_BONUS;
        state.push_event(GameEvent::Collect);
        state.effects.acquire(player_pos);
    }
}

/// Grant a loot category: health heals one life, the rest open (or renew)
/// the matching buff window at `now + duration`.
pub fn apply_loot(state: &mut GameState, cfg: &Config, loot: LootKind) {
    let now = state.time;
    let duration = cfg.buffs.duration_ms;
    match loot {
        LootKind::Health => state.lives += 1,
        LootKind::Rapid => state.player.buffs.apply(BuffKind::Rapid, now, duration),
        LootKind::Multi => state.player.buffs.apply(BuffKind::Multi, now, duration),
        LootKind::Explosive => state.player.buffs.apply(BuffKind::Explosive, now, duration),
    }
}
