//! Game state and core simulation types
//!
//! Every entity collection, the player, progression counters, the effect
//! pool, and the seeded RNG live in [`GameState`]. No ambient statics: the
//! whole session is one value with explicit construction and reset.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::Config;
use crate::consts::*;

/// Current phase of gameplay. Pausing is a caller-side gate, not a phase:
/// the loop is re-entrant per tick and simply isn't stepped while paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended (lives reached 0)
    GameOver,
}

/// Enemy variants. Brainstem and orc carry AI sub-state; the geometric
/// hazards only scroll and spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Brainstem,
    Orc,
    Box,
    Cylinder,
    Cone,
    Icosa,
    Torus,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Brainstem => "brainstem",
            EnemyKind::Orc => "orc",
            EnemyKind::Box => "box",
            EnemyKind::Cylinder => "cylinder",
            EnemyKind::Cone => "cone",
            EnemyKind::Icosa => "icosa",
            EnemyKind::Torus => "torus",
        }
    }
}

/// Kind-specific steering behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAi {
    /// No lateral correction, only scroll and spin
    None,
    /// Steer toward the player's X (orc)
    Steer,
    /// Sinusoidal drift plus weak tracking (brainstem)
    Drift { seed: f32 },
}

/// An enemy hazard scrolling toward the player
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Ground-plane position; `pos.x` is world X, `pos.y` is world Z
    pub pos: Vec2,
    /// Forward scroll speed (world Z per second)
    pub vz: f32,
    /// Lateral knockback velocity, damped each tick
    pub vx: f32,
    /// Collider half-width / half-depth footprint, fixed at spawn
    pub half_w: f32,
    pub half_d: f32,
    /// Visual height for the renderer (no collision role)
    pub height: f32,
    /// Spin rates (radians/sec) and accumulated rotation
    pub spin_y: f32,
    pub spin_x: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub hp: i32,
    pub ai: EnemyAi,
    /// Hit-flash timer for renderer tinting; set on non-lethal hits
    pub flash: f32,
}

/// A player projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Captured from the explosive buff at fire time, never re-evaluated
    pub explosive: bool,
}

/// A loot chest falling toward the player
#[derive(Debug, Clone)]
pub struct Chest {
    pub pos: Vec2,
    pub vz: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Round,
    Pine,
    Dead,
}

/// A passive obstacle. Trees are a capped pool recycled in place: past the
/// boundary they are repositioned and rerolled, never destroyed.
#[derive(Debug, Clone)]
pub struct Tree {
    pub kind: TreeKind,
    pub pos: Vec2,
    /// Footprint radius for the renderer / spacing
    pub radius: f32,
    /// The only collision-relevant radius: trunks block, foliage does not
    pub trunk_radius: f32,
    pub trunk_height: f32,
    pub crown_radius: f32,
}

/// Loot categories granted by chests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootKind {
    Health,
    Rapid,
    Multi,
    Explosive,
}

/// Timed combat buff kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffKind {
    Rapid,
    Multi,
    Explosive,
}

/// Active buff windows keyed by absolute expiry time on the sim clock.
/// At most one window per kind; reapplication overwrites the expiry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Buffs {
    rapid_until: f64,
    multi_until: f64,
    explosive_until: f64,
}

impl Buffs {
    fn slot(&mut self, kind: BuffKind) -> &mut f64 {
        match kind {
            BuffKind::Rapid => &mut self.rapid_until,
            BuffKind::Multi => &mut self.multi_until,
            BuffKind::Explosive => &mut self.explosive_until,
        }
    }

    pub fn apply(&mut self, kind: BuffKind, now: f64, duration_ms: f64) {
        *self.slot(kind) = now + duration_ms / 1000.0;
    }

    pub fn active(&self, kind: BuffKind, now: f64) -> bool {
        now < self.expiry(kind)
    }

    pub fn expiry(&self, kind: BuffKind) -> f64 {
        match kind {
            BuffKind::Rapid => self.rapid_until,
            BuffKind::Multi => self.multi_until,
            BuffKind::Explosive => self.explosive_until,
        }
    }

    /// Seconds left on a buff window, zero when inactive
    pub fn remaining(&self, kind: BuffKind, now: f64) -> f64 {
        (self.expiry(kind) - now).max(0.0)
    }
}

/// The player avatar
#[derive(Debug, Clone)]
pub struct Player {
    /// Ground-plane position; `pos.x` is world X, `pos.y` is world Z
    pub pos: Vec2,
    /// Knockback velocity, damped each tick
    pub vel: Vec2,
    /// Pickup radius (chest overlap); enemy contact uses the capsule radius
    pub radius: f32,
    /// Invulnerability window remaining, seconds (>= 0)
    pub invuln: f32,
    pub buffs: Buffs,
    /// Sim time of the last shot, for the fire-rate gate
    pub last_shot: f64,
}

impl Player {
    fn new(cfg: &Config) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: cfg.player.radius,
            invuln: 0.0,
            buffs: Buffs::default(),
            last_shot: -999.0,
        }
    }
}

/// Discrete events consumed by the audio collaborator; payload-free
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Hit,
    Collect,
}

/// A pooled visual-effect slot
#[derive(Debug, Clone)]
pub struct EffectSlot {
    pub pos: Vec2,
    pub age: f32,
}

impl EffectSlot {
    /// Draw scale grows linearly over the effect lifetime
    pub fn scale(&self) -> f32 {
        1.0 + 2.5 * self.age
    }

    /// Draw alpha fades linearly to zero at expiry
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / EFFECT_LIFETIME).max(0.0)
    }
}

/// Index-addressed arena of reusable hit-effect handles with an explicit
/// free list. Fixed capacity: when exhausted, acquire requests are
/// silently dropped rather than growing the pool.
#[derive(Debug, Clone)]
pub struct EffectPool {
    slots: Vec<Option<EffectSlot>>,
    free: Vec<usize>,
}

impl EffectPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            free: (0..capacity).rev().collect(),
        }
    }

    /// Borrow a slot for a hit effect at `pos`. Returns the handle index,
    /// or `None` when the pool is exhausted.
    pub fn acquire(&mut self, pos: Vec2) -> Option<usize> {
        let idx = self.free.pop()?;
        self.slots[idx] = Some(EffectSlot { pos, age: 0.0 });
        Some(idx)
    }

    pub fn release(&mut self, idx: usize) {
        if self.slots[idx].take().is_some() {
            self.free.push(idx);
        }
    }

    /// Age active effects and return expired ones to the free list
    pub fn update(&mut self, dt: f32) {
        for idx in 0..self.slots.len() {
            let expired = match &mut self.slots[idx] {
                Some(slot) => {
                    slot.age += dt;
                    slot.age >= EFFECT_LIFETIME
                }
                None => false,
            };
            if expired {
                self.release(idx);
            }
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &EffectSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|slot| (i, slot)))
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Capability flags fed in by the presentation layer. "Not yet available"
/// is an ongoing state, not a one-time check: a model can finish loading
/// mid-session and the spawn table picks it up on the next draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Brainstem enemy model loaded; gates that spawn branch entirely
    pub brainstem_model: bool,
}

/// Read-only HUD snapshot, serializable for an overlay surface
#[derive(Debug, Clone, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub high_score: u64,
    /// Health pie fill in [0,1], capped at the display maximum
    pub health_frac: f32,
    /// Remaining buff windows in seconds
    pub rapid_remaining: f64,
    pub multi_remaining: f64,
    pub explosive_remaining: f64,
}

/// One enemy draw record
#[derive(Debug, Clone, Serialize)]
pub struct EnemyInstance {
    pub kind: &'static str,
    pub pos: [f32; 2],
    pub yaw: f32,
    pub pitch: f32,
    /// Full extents: width, depth, height
    pub size: [f32; 3],
    pub flash: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletInstance {
    pub pos: [f32; 2],
    pub explosive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeInstance {
    pub kind: &'static str,
    pub pos: [f32; 2],
    pub trunk_height: f32,
    pub trunk_radius: f32,
    pub crown_radius: f32,
}

/// One pooled effect draw record; scale and alpha derived from age
#[derive(Debug, Clone, Serialize)]
pub struct EffectInstance {
    pub handle: usize,
    pub pos: [f32; 2],
    pub scale: f32,
    pub alpha: f32,
}

/// Read-only render snapshot: everything the presentation layer needs to
/// draw one frame, serializable so a shell can hand it across a boundary
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub player_pos: [f32; 2],
    pub player_invuln: f32,
    pub enemies: Vec<EnemyInstance>,
    pub bullets: Vec<BulletInstance>,
    pub chests: Vec<[f32; 2]>,
    pub trees: Vec<TreeInstance>,
    pub effects: Vec<EffectInstance>,
}

/// Complete game state (deterministic given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Sim clock in seconds, the only time source for buffs and cooldowns
    pub time: f64,
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    /// Best score carried into this session; updated on game over
    pub high_score: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub chests: Vec<Chest>,
    pub trees: Vec<Tree>,
    pub effects: EffectPool,
    pub capabilities: Capabilities,
    /// Time accumulator pacing periodic tree spawns
    pub(crate) tree_spawn_accumulator: f32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh session: level 1 wave plus the initial tree stand
    pub fn new(cfg: &Config, seed: u64, high_score: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            phase: GamePhase::Playing,
            score: 0,
            level: 1,
            lives: INITIAL_LIVES,
            high_score,
            player: Player::new(cfg),
            enemies: Vec::new(),
            bullets: Vec::new(),
            chests: Vec::new(),
            trees: Vec::new(),
            effects: EffectPool::new(cfg.effects.pool_size),
            capabilities: Capabilities::default(),
            tree_spawn_accumulator: 0.0,
            events: Vec::new(),
        };
        super::spawn::spawn_wave(&mut state, cfg, 1);
        super::spawn::spawn_trees(&mut state, cfg, INITIAL_TREES);
        state
    }

    /// Restart in place, keeping the high score and capability flags
    pub fn reset(&mut self, cfg: &Config, seed: u64) {
        let capabilities = self.capabilities;
        let high_score = self.high_score;
        *self = Self::new(cfg, seed, high_score);
        self.capabilities = capabilities;
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain events emitted since the last call (audio collaborator)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// HUD snapshot for display; never exposes mutable state
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            lives: self.lives,
            level: self.level,
            high_score: self.high_score,
            health_frac: (self.lives.min(HUD_MAX_LIVES) as f32) / (HUD_MAX_LIVES as f32),
            rapid_remaining: self.player.buffs.remaining(BuffKind::Rapid, self.time),
            multi_remaining: self.player.buffs.remaining(BuffKind::Multi, self.time),
            explosive_remaining: self.player.buffs.remaining(BuffKind::Explosive, self.time),
        }
    }

    /// Render snapshot for one frame; never exposes mutable state
    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            player_pos: self.player.pos.to_array(),
            player_invuln: self.player.invuln,
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyInstance {
                    kind: e.kind.as_str(),
                    pos: e.pos.to_array(),
                    yaw: e.yaw,
                    pitch: e.pitch,
                    size: [e.half_w * 2.0, e.half_d * 2.0, e.height],
                    flash: e.flash,
                })
                .collect(),
            bullets: self
                .bullets
                .iter()
                .map(|b| BulletInstance {
                    pos: b.pos.to_array(),
                    explosive: b.explosive,
                })
                .collect(),
            chests: self.chests.iter().map(|c| c.pos.to_array()).collect(),
            trees: self
                .trees
                .iter()
                .map(|t| TreeInstance {
                    kind: match t.kind {
                        TreeKind::Round => "round",
                        TreeKind::Pine => "pine",
                        TreeKind::Dead => "dead",
                    },
                    pos: t.pos.to_array(),
                    trunk_height: t.trunk_height,
                    trunk_radius: t.trunk_radius,
                    crown_radius: t.crown_radius,
                })
                .collect(),
            effects: self
                .effects
                .iter_active()
                .map(|(handle, slot)| EffectInstance {
                    handle,
                    pos: slot.pos.to_array(),
                    scale: slot.scale(),
                    alpha: slot.alpha(),
                })
                .collect(),
        }
    }
}
