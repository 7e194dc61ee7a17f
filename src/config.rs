//! Central game configuration
//!
//! Base tunables plus named difficulty presets. A preset is a sparse patch
//! merged section by section onto the base; the resolved config is
//! immutable for the rest of the session. Validation collects warnings but
//! never fails: out-of-range values are logged and honored as given.

use serde::{Deserialize, Serialize};

use crate::sim::EnemyKind;

/// Difficulty preset selector - the only external tunable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// The sparse overrides this preset applies to the base config
    fn patch(&self) -> DifficultyPatch {
        match self {
            Difficulty::Easy => DifficultyPatch {
                base_shot_cooldown: Some(0.24),
                orc_chance: Some(0.45),
                brain_stem_chance: Some(0.10),
                level_score_multiplier: Some(80),
                chest_periodic_chance: Some(0.009),
            },
            Difficulty::Normal => DifficultyPatch::default(),
            Difficulty::Hard => DifficultyPatch {
                base_shot_cooldown: Some(0.32),
                orc_chance: Some(0.55),
                brain_stem_chance: Some(0.20),
                level_score_multiplier: Some(110),
                chest_periodic_chance: Some(0.004),
            },
        }
    }
}

/// Playable area half-extents in the ground plane
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub x: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    pub radius: f32,
    pub speed: f32,
    pub dash_speed: f32,
    pub invuln_duration: f32,
}

/// Camera tunables, passed through to the presentation layer untouched
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub height: f32,
    pub offset_z: f32,
    pub lag: f32,
    pub fov: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvironmentConfig {
    pub bounds: Bounds,
    pub max_trees: usize,
    pub tree_scroll_base: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct CombatConfig {
    pub bullet_speed: f32,
    /// Base seconds between shots (modified by the rapid buff)
    pub base_shot_cooldown: f32,
    pub explosive_radius: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct BuffConfig {
    pub duration_ms: f64,
    pub rapid_cooldown_factor: f32,
    pub multi_spread_angles: [f32; 3],
}

/// Spawn probabilities for the two modeled enemy kinds. These are
/// sequential conditional draws, not a normalized distribution: the
/// brainstem check runs first (and only when the model capability is
/// present), then the orc check, then the geometric categorical draw.
#[derive(Debug, Clone, Copy)]
pub struct SpawnChances {
    pub brain_stem: f32,
    pub orc: f32,
}

/// Per-kind hit points, with a default for the basic geometric hazards
#[derive(Debug, Clone, Copy)]
pub struct EnemyHpTable {
    pub brainstem: i32,
    pub orc: i32,
    pub icosa: i32,
    pub torus: i32,
    pub default: i32,
}

impl EnemyHpTable {
    pub fn for_kind(&self, kind: EnemyKind) -> i32 {
        match kind {
            EnemyKind::Brainstem => self.brainstem,
            EnemyKind::Orc => self.orc,
            EnemyKind::Icosa => self.icosa,
            EnemyKind::Torus => self.torus,
            _ => self.default,
        }
    }
}

/// Per-kind score values awarded on lethal damage
#[derive(Debug, Clone, Copy)]
pub struct EnemyScoreTable {
    pub brainstem: u64,
    pub orc: u64,
    pub icosa: u64,
    pub torus: u64,
    pub default: u64,
}

impl EnemyScoreTable {
    pub fn for_kind(&self, kind: EnemyKind) -> u64 {
        match kind {
            EnemyKind::Brainstem => self.brainstem,
            EnemyKind::Orc => self.orc,
            EnemyKind::Icosa => self.icosa,
            EnemyKind::Torus => self.torus,
            _ => self.default,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnemiesConfig {
    pub chances: SpawnChances,
    pub hp: EnemyHpTable,
    pub scores: EnemyScoreTable,
}

#[derive(Debug, Clone, Copy)]
pub struct LootConfig {
    pub chest_wave_base: u32,
    pub chest_wave_divisor: u32,
    pub chest_wave_max: u32,
    pub chest_periodic_divisor: u32,
    pub chest_periodic_max: u32,
    pub chest_periodic_chance: f32,
    pub chest_spawn_z_offset: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct BloomConfig {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct EffectsConfig {
    pub pool_size: usize,
    pub bloom: BloomConfig,
    pub max_gpu_particles: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct AiConfig {
    /// How quickly orcs steer toward the player's X
    pub orc_turn_speed: f32,
    /// Lateral drift speed base for brainstem enemies
    pub brain_stem_drift: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicsConfig {
    /// Vertical span of the player capsule (visual torso+legs)
    pub player_capsule_height: f32,
    /// Horizontal collision radius used for enemy contact
    pub player_capsule_radius: f32,
    /// Magnitude applied to the player on enemy collision
    pub player_knockback: f32,
    /// Base magnitude applied to an enemy when hit by a bullet
    pub enemy_knockback: f32,
    /// Per-second velocity damping for knockback velocities
    pub damping: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressionConfig {
    pub level_score_multiplier: u64,
    pub enemy_cap_base: u32,
    pub enemy_cap_per_level: u32,
    pub enemy_cap_max: u32,
}

/// Resolved session tunables. Built once by [`resolve_config`] and taken by
/// shared reference everywhere after that.
#[derive(Debug, Clone)]
pub struct Config {
    pub version: &'static str,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub environment: EnvironmentConfig,
    pub combat: CombatConfig,
    pub buffs: BuffConfig,
    pub enemies: EnemiesConfig,
    pub loot: LootConfig,
    pub effects: EffectsConfig,
    pub ai: AiConfig,
    pub physics: PhysicsConfig,
    pub progression: ProgressionConfig,
}

/// Sparse per-preset overrides. Fields mirror the nested sections they
/// land in; `None` keeps the base value.
#[derive(Debug, Clone, Copy, Default)]
struct DifficultyPatch {
    base_shot_cooldown: Option<f32>,
    orc_chance: Option<f32>,
    brain_stem_chance: Option<f32>,
    level_score_multiplier: Option<u64>,
    chest_periodic_chance: Option<f32>,
}

impl Config {
    /// Base tunables (the `normal` preset resolves to exactly this)
    pub fn base() -> Self {
        Self {
            version: "1.0.0",
            player: PlayerConfig {
                radius: 0.5,
                speed: 6.0,
                dash_speed: 11.0,
                invuln_duration: 0.9,
            },
            camera: CameraConfig {
                height: 4.8,
                offset_z: 5.8,
                lag: 0.18,
                fov: 58.0,
            },
            environment: EnvironmentConfig {
                bounds: Bounds { x: 12.0, z: 6.0 },
                max_trees: 26,
                tree_scroll_base: 1.2,
            },
            combat: CombatConfig {
                bullet_speed: 12.0,
                base_shot_cooldown: 0.28,
                explosive_radius: 1.6,
            },
            buffs: BuffConfig {
                duration_ms: 6000.0,
                rapid_cooldown_factor: 0.4,
                multi_spread_angles: [-0.18, 0.0, 0.18],
            },
            enemies: EnemiesConfig {
                chances: SpawnChances {
                    brain_stem: 0.15,
                    orc: 0.50,
                },
                hp: EnemyHpTable {
                    brainstem: 4,
                    orc: 2,
                    icosa: 3,
                    torus: 3,
                    default: 1,
                },
                scores: EnemyScoreTable {
                    brainstem: 40,
                    orc: 25,
                    icosa: 30,
                    torus: 30,
                    default: 15,
                },
            },
            loot: LootConfig {
                chest_wave_base: 1,
                chest_wave_divisor: 3,
                chest_wave_max: 3,
                chest_periodic_divisor: 3,
                chest_periodic_max: 4,
                chest_periodic_chance: 0.006,
                chest_spawn_z_offset: 1.5,
            },
            effects: EffectsConfig {
                pool_size: 32,
                bloom: BloomConfig {
                    enabled: true,
                    strength: 0.8,
                    radius: 0.4,
                    threshold: 0.85,
                },
                max_gpu_particles: 600,
            },
            ai: AiConfig {
                orc_turn_speed: 1.25,
                brain_stem_drift: 0.6,
            },
            physics: PhysicsConfig {
                player_capsule_height: 1.8,
                player_capsule_radius: 0.55,
                player_knockback: 3.2,
                enemy_knockback: 2.4,
                damping: 5.0,
            },
            progression: ProgressionConfig {
                level_score_multiplier: 100,
                enemy_cap_base: 5,
                enemy_cap_per_level: 2,
                enemy_cap_max: 30,
            },
        }
    }

    /// Merge a difficulty preset onto the base tunables
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let mut cfg = Self::base();
        let patch = difficulty.patch();
        if let Some(v) = patch.base_shot_cooldown {
            cfg.combat.base_shot_cooldown = v;
        }
        if let Some(v) = patch.orc_chance {
            cfg.enemies.chances.orc = v;
        }
        if let Some(v) = patch.brain_stem_chance {
            cfg.enemies.chances.brain_stem = v;
        }
        if let Some(v) = patch.level_score_multiplier {
            cfg.progression.level_score_multiplier = v;
        }
        if let Some(v) = patch.chest_periodic_chance {
            cfg.loot.chest_periodic_chance = v;
        }
        cfg
    }

    /// Range checks for obvious misconfigs. Returns warnings instead of
    /// failing; the config is used regardless.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.player.speed <= 0.0 {
            warnings.push("player.speed must be > 0".to_string());
        }
        if self.combat.base_shot_cooldown <= 0.0 {
            warnings.push("combat.base_shot_cooldown must be > 0".to_string());
        }
        if self.combat.explosive_radius <= 0.0 {
            warnings.push("combat.explosive_radius must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.loot.chest_periodic_chance) {
            warnings.push("loot.chest_periodic_chance out of [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.enemies.chances.orc) {
            warnings.push("enemies.chances.orc out of [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.enemies.chances.brain_stem) {
            warnings.push("enemies.chances.brain_stem out of [0,1]".to_string());
        }
        if self.effects.bloom.strength < 0.0 || self.effects.bloom.radius < 0.0 {
            warnings.push("effects.bloom values must be >= 0".to_string());
        }
        warnings
    }
}

/// Resolve the session config for a named difficulty, logging any range
/// warnings. Warnings never block startup.
pub fn resolve_config(difficulty: Difficulty) -> Config {
    let cfg = Config::for_difficulty(difficulty);
    let warnings = cfg.validate();
    for warning in &warnings {
        log::warn!("config validation: {warning}");
    }
    log::info!(
        "config resolved: difficulty={} version={}",
        difficulty.as_str(),
        cfg.version
    );
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_validate_clean() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let cfg = Config::for_difficulty(d);
            assert!(
                cfg.validate().is_empty(),
                "preset {:?} produced warnings",
                d
            );
            assert!((0.0..=1.0).contains(&cfg.enemies.chances.orc));
            assert!((0.0..=1.0).contains(&cfg.enemies.chances.brain_stem));
            assert!((0.0..=1.0).contains(&cfg.loot.chest_periodic_chance));
            assert!(cfg.combat.base_shot_cooldown > 0.0);
            assert!(cfg.combat.explosive_radius > 0.0);
        }
    }

    #[test]
    fn test_normal_is_the_base() {
        let base = Config::base();
        let normal = Config::for_difficulty(Difficulty::Normal);
        assert_eq!(
            base.combat.base_shot_cooldown,
            normal.combat.base_shot_cooldown
        );
        assert_eq!(
            base.progression.level_score_multiplier,
            normal.progression.level_score_multiplier
        );
    }

    #[test]
    fn test_presets_merge_only_patched_fields() {
        let easy = Config::for_difficulty(Difficulty::Easy);
        assert_eq!(easy.combat.base_shot_cooldown, 0.24);
        assert_eq!(easy.enemies.chances.orc, 0.45);
        assert_eq!(easy.enemies.chances.brain_stem, 0.10);
        assert_eq!(easy.progression.level_score_multiplier, 80);
        assert_eq!(easy.loot.chest_periodic_chance, 0.009);
        // Untouched sections keep base values
        assert_eq!(easy.combat.bullet_speed, 12.0);
        assert_eq!(easy.enemies.hp.orc, 2);
        assert_eq!(easy.loot.chest_wave_max, 3);

        let hard = Config::for_difficulty(Difficulty::Hard);
        assert_eq!(hard.combat.base_shot_cooldown, 0.32);
        assert_eq!(hard.enemies.chances.orc, 0.55);
        assert_eq!(hard.progression.level_score_multiplier, 110);
    }

    #[test]
    fn test_invalid_values_surface_as_warnings() {
        let mut cfg = Config::base();
        cfg.combat.base_shot_cooldown = -0.1;
        cfg.enemies.chances.orc = 1.4;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("base_shot_cooldown"));
        assert!(warnings[1].contains("chances.orc"));
        // Degrades gracefully: the value is kept, not clamped
        assert_eq!(cfg.enemies.chances.orc, 1.4);
    }

    #[test]
    fn test_hp_and_score_tables() {
        let cfg = Config::base();
        assert_eq!(cfg.enemies.hp.for_kind(EnemyKind::Brainstem), 4);
        assert_eq!(cfg.enemies.hp.for_kind(EnemyKind::Box), 1);
        assert_eq!(cfg.enemies.hp.for_kind(EnemyKind::Torus), 3);
        assert_eq!(cfg.enemies.scores.for_kind(EnemyKind::Orc), 25);
        assert_eq!(cfg.enemies.scores.for_kind(EnemyKind::Cone), 15);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("Easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }
}
