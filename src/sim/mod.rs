//! Deterministic session engine
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Virtual clock only (the host feeds frame deltas)
//! - Seeded RNG only
//! - Stable iteration order (targets in creation order)
//! - No rendering or platform dependencies

pub mod aim;
pub mod clock;
pub mod engine;
pub mod geometry;
pub mod state;
pub mod target;

pub use aim::{AimCursor, PointerMotion};
pub use clock::{CancelHandle, Scheduler};
pub use engine::{Engine, HomeStats};
pub use geometry::{
    Bounds, Circle, circle_contains_point, pick_spaced_position, random_position_within,
};
pub use state::{
    Difficulty, EndCause, GameEvent, Hud, MissReason, ModeKind, Screen, Session, SessionStatus,
    TargetPool, UnknownDifficulty,
};
pub use target::{
    Placement, RemovalReason, Shrink, StepOutcome, Target, TargetKind, TargetSpec,
};
