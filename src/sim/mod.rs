//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Explicit simulation clock advanced by the caller's frame deltas
//! - Stable update order within every step
//! - No rendering or platform dependencies

pub mod collision;
pub mod movement;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{box_circle_overlap, roll_loot};
pub use movement::MoveInput;
pub use state::{
    BuffKind, Buffs, Bullet, Capabilities, Chest, EffectPool, EffectSlot, Enemy, EnemyAi,
    EnemyKind, GameEvent, GamePhase, GameState, HudSnapshot, LootKind, Player, RenderSnapshot,
    Tree, TreeKind,
};
pub use tick::{TickInput, autopilot, step};
