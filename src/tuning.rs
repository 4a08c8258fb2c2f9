//! Data-driven game balance
//!
//! Everything here is pure: no RNG, no state. Randomness lives in
//! placement and spawn timing only.

use serde::{Deserialize, Serialize};

use crate::sim::{Difficulty, ModeKind};

// === Warm-up ===

/// Total warm-up length in seconds (sum of the phase lengths)
pub const WARMUP_TOTAL_SECS: u32 = 180;
/// Lives at the start of a warm-up
pub const WARMUP_LIVES: u8 = 3;

/// Warm-up sub-drill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKey {
    Reaction,
    Flick,
    Control,
}

/// Immutable configuration for one warm-up phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseConfig {
    pub key: PhaseKey,
    pub label: &'static str,
    pub secs: u32,
    /// Target diameter (px)
    pub size: f32,
    /// Time-to-hit; `None` means the target never times out
    pub lifetime_ms: Option<f64>,
    /// Spawn delay window after a hit or a life-losing miss
    pub delay_min_ms: f64,
    pub delay_max_ms: f64,
    /// Bounce speed (px/ms) for moving targets
    pub speed: Option<f32>,
}

impl PhaseConfig {
    pub fn has_spawn_delay(&self) -> bool {
        self.delay_max_ms > 0.0
    }

    pub fn hint(&self) -> &'static str {
        match self.key {
            PhaseKey::Reaction => "Wait for the target, then hit it fast",
            PhaseKey::Flick => "Flick. Accuracy beats speed",
            PhaseKey::Control => "Control. Track the moving target",
        }
    }
}

/// The three warm-up phases, in order
pub const WARMUP_PHASES: [PhaseConfig; 3] = [
    PhaseConfig {
        key: PhaseKey::Reaction,
        label: "Reaction",
        secs: 45,
        size: 34.0,
        lifetime_ms: Some(1300.0),
        delay_min_ms: 360.0,
        delay_max_ms: 920.0,
        speed: None,
    },
    PhaseConfig {
        key: PhaseKey::Flick,
        label: "Flick",
        secs: 70,
        size: 28.0,
        lifetime_ms: Some(1600.0),
        delay_min_ms: 0.0,
        delay_max_ms: 0.0,
        speed: None,
    },
    PhaseConfig {
        key: PhaseKey::Control,
        label: "Control",
        secs: 65,
        size: 28.0,
        lifetime_ms: None,
        delay_min_ms: 0.0,
        delay_max_ms: 0.0,
        speed: Some(0.22),
    },
];

// === Moving targets ===

/// Bounce speed limits (px/ms)
pub const BOUNCE_SPEED_MIN: f32 = 0.12;
pub const BOUNCE_SPEED_MAX: f32 = 0.55;

// === Endless ===

pub const ENDLESS_SIZE_MAX: f32 = 32.0;
pub const ENDLESS_SIZE_MIN: f32 = 18.0;
/// Score points per 1px of size lost
pub const ENDLESS_SIZE_STEP: u32 = 6;
pub const ENDLESS_LIFETIME_MAX_MS: f64 = 1400.0;
pub const ENDLESS_LIFETIME_MIN_MS: f64 = 380.0;
pub const ENDLESS_LIFETIME_PER_POINT_MS: f64 = 18.0;
/// Score at which targets start moving
pub const ENDLESS_MOVING_FROM: u32 = 18;
pub const ENDLESS_SPEED_MIN: f32 = 0.14;
pub const ENDLESS_SPEED_MAX: f32 = 0.46;
pub const ENDLESS_SPEED_PER_POINT: f32 = 0.003;

/// Parameters for the next single target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetParams {
    pub size: f32,
    pub lifetime_ms: f64,
    pub moving: bool,
    pub speed: f32,
}

/// Endless difficulty ramp as a function of the current score
pub fn endless_params(score: u32) -> TargetParams {
    let size = (ENDLESS_SIZE_MAX - (score / ENDLESS_SIZE_STEP) as f32)
        .clamp(ENDLESS_SIZE_MIN, ENDLESS_SIZE_MAX);
    let lifetime_ms = (ENDLESS_LIFETIME_MAX_MS - score as f64 * ENDLESS_LIFETIME_PER_POINT_MS)
        .clamp(ENDLESS_LIFETIME_MIN_MS, ENDLESS_LIFETIME_MAX_MS);
    let speed = (ENDLESS_SPEED_MIN + score as f32 * ENDLESS_SPEED_PER_POINT)
        .clamp(ENDLESS_SPEED_MIN, ENDLESS_SPEED_MAX);
    TargetParams {
        size,
        lifetime_ms,
        moving: score >= ENDLESS_MOVING_FROM,
        speed,
    }
}

// === Arcade ===

/// Linear shrink from the base size down to a floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShrinkCurve {
    pub min_size: f32,
    /// Time from base size to the floor
    pub duration_ms: f64,
}

/// Per-(mode, difficulty) arcade configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcadeParams {
    pub max_active: usize,
    pub base_size: f32,
    pub shrink: Option<ShrinkCurve>,
    /// Fall speed (px/ms)
    pub fall_speed: Option<f32>,
    pub spawn_every_ms: f64,
    /// Uniform +/- jitter applied to each spawn interval
    pub spawn_jitter_ms: f64,
}

impl ArcadeParams {
    /// Shrink rate in px/ms, if this mode shrinks
    pub fn shrink_rate(&self) -> Option<f64> {
        self.shrink.map(|s| (self.base_size - s.min_size) as f64 / s.duration_ms)
    }
}

/// Delay before the first arcade spawn
pub const ARCADE_FIRST_SPAWN_MS: f64 = 300.0;
/// Shrink mode backfills a hit target after this delay
pub const SHRINK_REPLACEMENT_DELAY_MS: f64 = 140.0;
/// Minimum center distance between arcade targets, as a multiple of size
pub const ARCADE_SEPARATION_FACTOR: f32 = 1.35;
/// Sampling budget for spaced placement
pub const PLACEMENT_ATTEMPTS: u32 = 24;

const fn arcade(
    max_active: usize,
    base_size: f32,
    shrink: Option<ShrinkCurve>,
    fall_speed: Option<f32>,
    spawn_every_ms: f64,
    spawn_jitter_ms: f64,
) -> ArcadeParams {
    ArcadeParams {
        max_active,
        base_size,
        shrink,
        fall_speed,
        spawn_every_ms,
        spawn_jitter_ms,
    }
}

const fn shrink(min_size: f32, duration_ms: f64) -> Option<ShrinkCurve> {
    Some(ShrinkCurve {
        min_size,
        duration_ms,
    })
}

/// Rows: Easy, Medium, Hard
const SHRINK_TABLE: [ArcadeParams; 3] = [
    arcade(3, 58.0, shrink(12.0, 3200.0), None, 900.0, 0.0),
    arcade(4, 50.0, shrink(10.0, 2600.0), None, 750.0, 0.0),
    arcade(5, 42.0, shrink(8.0, 2000.0), None, 600.0, 0.0),
];

const FALLING_TABLE: [ArcadeParams; 3] = [
    arcade(4, 48.0, None, Some(0.10), 1100.0, 200.0),
    arcade(5, 42.0, None, Some(0.14), 900.0, 250.0),
    arcade(6, 36.0, None, Some(0.19), 700.0, 300.0),
];

const FALLING_SHRINK_TABLE: [ArcadeParams; 3] = [
    arcade(4, 56.0, shrink(14.0, 3600.0), Some(0.08), 1100.0, 200.0),
    arcade(5, 50.0, shrink(12.0, 3000.0), Some(0.11), 900.0, 250.0),
    arcade(6, 44.0, shrink(10.0, 2400.0), Some(0.15), 700.0, 300.0),
];

/// Arcade table lookup; `None` for the single-target modes
pub fn arcade_params(mode: ModeKind, difficulty: Difficulty) -> Option<ArcadeParams> {
    let row = match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    };
    match mode {
        ModeKind::Shrink => Some(SHRINK_TABLE[row]),
        ModeKind::Falling => Some(FALLING_TABLE[row]),
        ModeKind::FallingShrink => Some(FALLING_SHRINK_TABLE[row]),
        ModeKind::Warmup | ModeKind::Endless => None,
    }
}
