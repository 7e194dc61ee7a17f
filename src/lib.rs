//! Neon Dodger - simulation core for a scrolling corridor dodging game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, AI, collisions, buffs, progression)
//! - `config`: Data-driven game balance with difficulty presets
//! - `highscore`: Single-record high score persistence
//!
//! Rendering, audio, and HUD are external collaborators: they consume the
//! entity collections, pooled effect handles, emitted `GameEvent`s, and the
//! HUD snapshot, and never mutate simulation state.

pub mod config;
pub mod highscore;
pub mod sim;

pub use config::{Config, Difficulty, resolve_config};
pub use highscore::{HighScoreRecord, HighScoreStore};

/// Game configuration constants
pub mod consts {
    /// Upper bound on a single simulation step (seconds); larger frame
    /// deltas are clamped to avoid large-step instability after a stall.
    pub const MAX_DT: f32 = 0.033;

    /// Lives at the start of a run
    pub const INITIAL_LIVES: u32 = 3;
    /// Lives cap used by the HUD health pie (state itself is uncapped)
    pub const HUD_MAX_LIVES: u32 = 3;
    /// Trees planted up front by `GameState::new`
    pub const INITIAL_TREES: usize = 8;

    /// Bullet collision radius
    pub const BULLET_RADIUS: f32 = 0.12;
    /// Bullets are culled this far past the spawn edge
    pub const BULLET_CULL_Z_MARGIN: f32 = 14.0;
    /// Bullets are culled this far outside the lateral bounds
    pub const BULLET_CULL_X_MARGIN: f32 = 4.0;

    /// Entities past `bounds.z + RECYCLE_Z_MARGIN` are recycled
    pub const RECYCLE_Z_MARGIN: f32 = 2.0;
    /// Enemies spawn this far beyond the far edge
    pub const ENEMY_SPAWN_Z_OFFSET: f32 = 1.5;
    /// Trees spawn inside an 8-unit band past the recycle line
    pub const TREE_SPAWN_BAND: f32 = 8.0;

    /// Lifetime of a pooled hit effect (seconds)
    pub const EFFECT_LIFETIME: f32 = 0.6;

    /// Flat score bonus for opening a chest
    pub const CHEST_SCORE_BONUS: u64 = 5;
}

/// Exponential damping factor for knockback velocities over one step.
///
/// Multiplying a velocity by this each tick decays it toward zero at
/// `damping` per second independent of the tick rate.
#[inline]
pub fn damp_factor(damping: f32, dt: f32) -> f32 {
    (-damping * dt).exp()
}

/// Minimum vector length accepted before normalizing; shorter deltas fall
/// back to this to avoid division by near-zero when source and target
/// coincide.
pub const NORMALIZE_EPSILON: f32 = 0.001;
