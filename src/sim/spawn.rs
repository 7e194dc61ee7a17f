//! Entity spawning
//!
//! Wave composition, enemy-kind selection, chest cadence, and tree
//! density. All randomness flows through the seeded RNG owned by
//! `GameState`, so spawn sequences replay exactly from a seed.
//!
//! Enemy-kind selection intentionally uses sequential conditional draws
//! (brainstem check, then orc check, then a geometric categorical draw),
//! so the literal chance values are conditional probabilities. That is the
//! original tuning curve; do not collapse this into one distribution.

use glam::Vec2;
use rand::Rng;

use super::state::{Chest, Enemy, EnemyAi, EnemyKind, GameState, Tree, TreeKind};
use crate::config::Config;
use crate::consts::*;

/// Fixed collider half-extents for the modeled (non-parametric) kinds.
/// Derived once from the model bounding boxes with a shrink factor so tiny
/// protrusions don't inflate the hitbox.
const ORC_HALF_EXTENT: f32 = 0.5;
const ORC_HEIGHT: f32 = 1.8;
const BRAINSTEM_HALF_EXTENT: f32 = 0.45;
const BRAINSTEM_HEIGHT: f32 = 2.4;

/// Spawn a level's wave: `min(5 + 2*level, 12)` enemies and
/// `min(chest_wave_base + level/chest_wave_divisor, chest_wave_max)` chests.
pub fn spawn_wave(state: &mut GameState, cfg: &Config, level: u32) {
    let count = (5 + level * 2).min(12);
    for _ in 0..count {
        let enemy = create_enemy(state, cfg);
        state.enemies.push(enemy);
    }
    let chest_count =
        (cfg.loot.chest_wave_base + level / cfg.loot.chest_wave_divisor).min(cfg.loot.chest_wave_max);
    for _ in 0..chest_count {
        spawn_chest(state, cfg);
    }
    log::debug!("wave spawned: level={level} enemies={count} chests={chest_count}");
}

/// Lateral spawn position inside the bounds with the given margin
fn spawn_x(state: &mut GameState, cfg: &Config, margin: f32) -> f32 {
    let bx = cfg.environment.bounds.x;
    state.rng.random_range(-bx + margin..bx - margin)
}

fn random_sign(state: &mut GameState) -> f32 {
    if state.rng.random::<f32>() < 0.5 { -1.0 } else { 1.0 }
}

/// Enemy factory: sequential conditional kind selection, then randomized
/// per-kind size, speed, and spin, with the collider footprint derived
/// once from the size and immutable afterward.
pub fn create_enemy(state: &mut GameState, cfg: &Config) -> Enemy {
    let spawn_z = -cfg.environment.bounds.z - ENEMY_SPAWN_Z_OFFSET;

    // Brainstem branch only when the model capability is present; a
    // missing model degrades this kind's probability to zero.
    if state.capabilities.brainstem_model
        && state.rng.random::<f32>() < cfg.enemies.chances.brain_stem
    {
        let x = spawn_x(state, cfg, 0.5);
        let vz = state.rng.random_range(2.2..4.0);
        let spin_y = state.rng.random_range(0.4..1.0) * random_sign(state);
        let seed = state.rng.random_range(0.0..std::f32::consts::TAU);
        return Enemy {
            kind: EnemyKind::Brainstem,
            pos: Vec2::new(x, spawn_z),
            vz,
            vx: 0.0,
            half_w: BRAINSTEM_HALF_EXTENT,
            half_d: BRAINSTEM_HALF_EXTENT,
            height: BRAINSTEM_HEIGHT,
            spin_y,
            spin_x: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            hp: cfg.enemies.hp.for_kind(EnemyKind::Brainstem),
            ai: EnemyAi::Drift { seed },
            flash: 0.0,
        };
    }

    // Orc branch: independent second draw
    if state.rng.random::<f32>() < cfg.enemies.chances.orc {
        let x = spawn_x(state, cfg, 0.5);
        let vz = state.rng.random_range(2.0..4.2);
        let spin_y = state.rng.random_range(0.3..0.9) * random_sign(state);
        return Enemy {
            kind: EnemyKind::Orc,
            pos: Vec2::new(x, spawn_z),
            vz,
            vx: 0.0,
            half_w: ORC_HALF_EXTENT,
            half_d: ORC_HALF_EXTENT,
            height: ORC_HEIGHT,
            spin_y,
            spin_x: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            hp: cfg.enemies.hp.for_kind(EnemyKind::Orc),
            ai: EnemyAi::Steer,
            flash: 0.0,
        };
    }

    // Geometric hazard variety by fixed cumulative thresholds
    let roll: f32 = state.rng.random();
    let (kind, half_w, half_d, height) = if roll < 0.30 {
        let w = 0.8 + state.rng.random_range(0.2..1.1);
        let d = 0.8 + state.rng.random_range(0.2..1.1);
        let h = state.rng.random_range(0.8..1.4);
        (EnemyKind::Box, w / 2.0, d / 2.0, h)
    } else if roll < 0.55 {
        let s: f32 = state.rng.random_range(0.7..1.05);
        let h = state.rng.random_range(1.0..1.6);
        (EnemyKind::Cylinder, s / 2.0, s / 2.0, h)
    } else if roll < 0.75 {
        let s: f32 = state.rng.random_range(0.9..1.3);
        let h = state.rng.random_range(1.2..1.8);
        (EnemyKind::Cone, s * 0.55, s * 0.55, h)
    } else if roll < 0.90 {
        let s: f32 = state.rng.random_range(0.9..1.3);
        (EnemyKind::Icosa, s * 0.55, s * 0.55, s)
    } else {
        let s: f32 = state.rng.random_range(1.1..1.5);
        // Outer torus radius: ring radius plus tube radius
        (EnemyKind::Torus, s * 0.63, s * 0.63, 0.6)
    };

    let x = spawn_x(state, cfg, 0.5);
    let vz = state.rng.random_range(2.0..5.5);
    let spin_y = state.rng.random_range(0.6..2.0) * random_sign(state);
    // Cones and tougher kinds sometimes tumble about X as well
    let spin_x = if roll >= 0.55 && state.rng.random::<f32>() < 0.4 {
        state.rng.random_range(0.3..1.0)
    } else {
        0.0
    };

    Enemy {
        kind,
        pos: Vec2::new(x, spawn_z),
        vz,
        vx: 0.0,
        half_w,
        half_d,
        height,
        spin_y,
        spin_x,
        yaw: 0.0,
        pitch: 0.0,
        hp: cfg.enemies.hp.for_kind(kind),
        ai: EnemyAi::None,
        flash: 0.0,
    }
}

pub fn spawn_chest(state: &mut GameState, cfg: &Config) {
    let x = spawn_x(state, cfg, 0.5);
    let vz = state.rng.random_range(1.5..4.0);
    state.chests.push(Chest {
        pos: Vec2::new(x, -cfg.environment.bounds.z - cfg.loot.chest_spawn_z_offset),
        vz,
        radius: 0.55,
    });
}

/// The Z line past which trees recycle back to; spawns scatter within a
/// band behind it so the tree line never pops in at a single depth.
pub fn tree_recycle_z(cfg: &Config) -> f32 {
    -cfg.environment.bounds.z - ENEMY_SPAWN_Z_OFFSET - TREE_SPAWN_BAND
}

/// Roll a tree's kind and dimensions. Used both at spawn and when a tree
/// recycles past the boundary (trees reroll in place, they don't respawn).
pub fn roll_tree(state: &mut GameState, cfg: &Config) -> Tree {
    let kind_roll: f32 = state.rng.random();
    let kind = if kind_roll < 0.5 {
        TreeKind::Round
    } else if kind_roll < 0.85 {
        TreeKind::Pine
    } else {
        TreeKind::Dead
    };
    let x = spawn_x(state, cfg, 0.8);
    let z = tree_recycle_z(cfg) + state.rng.random_range(0.0..TREE_SPAWN_BAND);
    let (trunk_height, crown_radius, trunk_radius, radius) = roll_tree_dims(state, kind);
    Tree {
        kind,
        pos: Vec2::new(x, z),
        radius,
        trunk_radius,
        trunk_height,
        crown_radius,
    }
}

/// Randomized per-kind dimensions as (trunk height, crown radius, trunk
/// radius, footprint radius). Also used when a tree recycles, since
/// recycling rerolls sizes in place.
pub(crate) fn roll_tree_dims(state: &mut GameState, kind: TreeKind) -> (f32, f32, f32, f32) {
    match kind {
        TreeKind::Round => {
            let trunk_h = state.rng.random_range(3.0..4.2);
            let crown_r: f32 = state.rng.random_range(1.0..1.6);
            (trunk_h, crown_r, 0.28, crown_r * 0.9 + 0.4)
        }
        TreeKind::Pine => (state.rng.random_range(2.8..3.5), 1.0, 0.22, 1.0),
        TreeKind::Dead => (state.rng.random_range(3.5..5.0), 0.0, 0.18, 0.6),
    }
}

pub fn spawn_trees(state: &mut GameState, cfg: &Config, count: usize) {
    for _ in 0..count {
        let tree = roll_tree(state, cfg);
        state.trees.push(tree);
    }
}

/// Live enemy cap for the periodic spawner at a given level
pub fn enemy_cap(cfg: &Config, level: u32) -> usize {
    (cfg.progression.enemy_cap_base + level * cfg.progression.enemy_cap_per_level)
        .min(cfg.progression.enemy_cap_max) as usize
}

/// Live chest cap for the periodic spawner at a given level
pub fn chest_cap(cfg: &Config, level: u32) -> usize {
    (cfg.loot.chest_wave_base + level / cfg.loot.chest_periodic_divisor)
        .min(cfg.loot.chest_periodic_max) as usize
}

/// Per-tick replenishment: top up enemies below the level cap one at a
/// time, and roll the periodic chest chance while below the chest cap.
pub fn replenish(state: &mut GameState, cfg: &Config) {
    if state.enemies.len() < enemy_cap(cfg, state.level) {
        let enemy = create_enemy(state, cfg);
        state.enemies.push(enemy);
    }
    if state.chests.len() < chest_cap(cfg, state.level)
        && state.rng.random::<f32>() < cfg.loot.chest_periodic_chance
    {
        spawn_chest(state, cfg);
    }
}

/// Tree spawn pacing: the interval shortens with level, floored at 1.5 s
pub fn tree_spawn_interval(level: u32) -> f32 {
    (4.0 - 0.15 * level as f32).max(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Difficulty};
    use crate::sim::GameState;

    fn fresh(cfg: &Config, seed: u64) -> GameState {
        GameState::new(cfg, seed, 0)
    }

    #[test]
    fn test_wave_counts_scale_with_level() {
        let cfg = Config::base();
        let mut state = fresh(&cfg, 1);
        state.enemies.clear();
        state.chests.clear();

        spawn_wave(&mut state, &cfg, 1);
        assert_eq!(state.enemies.len(), 7);
        assert_eq!(state.chests.len(), 1);

        state.enemies.clear();
        state.chests.clear();
        spawn_wave(&mut state, &cfg, 9);
        // Enemy count saturates at 12, chests at chest_wave_max
        assert_eq!(state.enemies.len(), 12);
        assert_eq!(state.chests.len(), 3);
    }

    #[test]
    fn test_no_brainstem_without_capability() {
        let cfg = Config::for_difficulty(Difficulty::Hard);
        let mut state = fresh(&cfg, 99);
        assert!(!state.capabilities.brainstem_model);
        for _ in 0..500 {
            let e = create_enemy(&mut state, &cfg);
            assert_ne!(e.kind, EnemyKind::Brainstem);
        }
    }

    #[test]
    fn test_brainstem_spawns_once_capability_arrives() {
        let cfg = Config::for_difficulty(Difficulty::Hard);
        let mut state = fresh(&cfg, 99);
        state.capabilities.brainstem_model = true;
        let seen = (0..500)
            .map(|_| create_enemy(&mut state, &cfg))
            .any(|e| e.kind == EnemyKind::Brainstem);
        assert!(seen);
    }

    #[test]
    fn test_spawn_sequence_reproducible_from_seed() {
        let cfg = Config::base();
        let mut a = fresh(&cfg, 1234);
        let mut b = fresh(&cfg, 1234);
        for _ in 0..50 {
            let ea = create_enemy(&mut a, &cfg);
            let eb = create_enemy(&mut b, &cfg);
            assert_eq!(ea.kind, eb.kind);
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.vz, eb.vz);
            assert_eq!(ea.half_w, eb.half_w);
        }
    }

    #[test]
    fn test_enemy_footprint_and_hp_by_kind() {
        let cfg = Config::base();
        let mut state = fresh(&cfg, 5);
        state.capabilities.brainstem_model = true;
        for _ in 0..500 {
            let e = create_enemy(&mut state, &cfg);
            assert!(e.half_w > 0.0 && e.half_d > 0.0);
            assert_eq!(e.hp, cfg.enemies.hp.for_kind(e.kind));
            match e.kind {
                EnemyKind::Orc => {
                    assert_eq!(e.half_w, 0.5);
                    assert_eq!(e.half_d, 0.5);
                    assert_eq!(e.ai, EnemyAi::Steer);
                }
                EnemyKind::Brainstem => {
                    assert!(matches!(e.ai, EnemyAi::Drift { .. }));
                    assert_eq!(e.hp, 4);
                }
                EnemyKind::Icosa | EnemyKind::Torus => {
                    assert_eq!(e.hp, 3);
                    assert_eq!(e.ai, EnemyAi::None);
                }
                _ => assert_eq!(e.hp, 1),
            }
            // Spawned beyond the far edge, inside lateral bounds
            assert_eq!(e.pos.y, -cfg.environment.bounds.z - ENEMY_SPAWN_Z_OFFSET);
            assert!(e.pos.x.abs() <= cfg.environment.bounds.x - 0.5);
        }
    }

    #[test]
    fn test_caps() {
        let cfg = Config::base();
        assert_eq!(enemy_cap(&cfg, 1), 7);
        assert_eq!(enemy_cap(&cfg, 20), 30);
        assert_eq!(chest_cap(&cfg, 1), 1);
        assert_eq!(chest_cap(&cfg, 3), 2);
        assert_eq!(chest_cap(&cfg, 30), 4);
    }

    #[test]
    fn test_tree_spawn_interval_floors() {
        assert_eq!(tree_spawn_interval(1), 3.85);
        assert!((tree_spawn_interval(10) - 2.5).abs() < 1e-6);
        assert_eq!(tree_spawn_interval(50), 1.5);
    }

    #[test]
    fn test_tree_dimensions_by_kind() {
        let cfg = Config::base();
        let mut state = fresh(&cfg, 11);
        for _ in 0..200 {
            let t = roll_tree(&mut state, &cfg);
            match t.kind {
                TreeKind::Round => {
                    assert_eq!(t.trunk_radius, 0.28);
                    assert!(t.crown_radius >= 1.0 && t.crown_radius < 1.6);
                }
                TreeKind::Pine => {
                    assert_eq!(t.trunk_radius, 0.22);
                    assert_eq!(t.crown_radius, 1.0);
                }
                TreeKind::Dead => {
                    assert_eq!(t.trunk_radius, 0.18);
                    assert_eq!(t.crown_radius, 0.0);
                }
            }
            assert!(t.pos.y <= tree_recycle_z(&cfg) + TREE_SPAWN_BAND);
        }
    }
}
