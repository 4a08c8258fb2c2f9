//! Session state and the events the engine emits
//!
//! Everything the host needs to draw a frame or a result screen lives
//! here; the engine is the only writer.

use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::{RemovalReason, Target};
use crate::stats::SessionSummary;
use crate::tuning::{PhaseConfig, PhaseKey, WARMUP_LIVES, WARMUP_PHASES, WARMUP_TOTAL_SECS};

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    /// Three-phase timed drill with lives
    Warmup,
    /// One target at a time, first miss ends the run
    Endless,
    /// Arcade: shrinking targets
    Shrink,
    /// Arcade: falling targets
    Falling,
    /// Arcade: falling and shrinking targets
    FallingShrink,
}

impl ModeKind {
    pub const ALL: [ModeKind; 5] = [
        ModeKind::Warmup,
        ModeKind::Endless,
        ModeKind::Shrink,
        ModeKind::Falling,
        ModeKind::FallingShrink,
    ];

    /// Arcade modes keep a field of concurrent targets
    pub fn is_arcade(&self) -> bool {
        matches!(
            self,
            ModeKind::Shrink | ModeKind::Falling | ModeKind::FallingShrink
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModeKind::Warmup => "Warm-up",
            ModeKind::Endless => "Endless",
            ModeKind::Shrink => "Shrink",
            ModeKind::Falling => "Falling",
            ModeKind::FallingShrink => "Falling+Shrink",
        }
    }

    /// Stable identifier for storage keys
    pub fn as_key(&self) -> &'static str {
        match self {
            ModeKind::Warmup => "warmup",
            ModeKind::Endless => "endless",
            ModeKind::Shrink => "shrink",
            ModeKind::Falling => "falling",
            ModeKind::FallingShrink => "falling_shrink",
        }
    }
}

/// Arcade difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

}

/// Difficulty name that matches no level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Lifecycle of a session (one-way)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Ended,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Warm-up clock ran out
    TimeUp,
    /// Warm-up ran past its last phase
    Completed,
    /// Warm-up lives exhausted
    OutOfLives,
    /// Arcade: a target left without being hit, or a miss-click
    Defeat,
    /// Endless: clicked empty space
    Missed,
    /// Endless: the target timed out
    TimedOut,
    /// Player quit
    Stopped,
}

impl EndCause {
    /// Result screen title
    pub fn title(&self) -> &'static str {
        match self {
            EndCause::TimeUp | EndCause::Completed => "Warm-up complete",
            EndCause::OutOfLives => "Out of lives",
            EndCause::Defeat => "Defeat",
            EndCause::Missed => "Missed",
            EndCause::TimedOut => "Too slow",
            EndCause::Stopped => "Stopped",
        }
    }
}

/// Why a miss was registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    ClickedEmpty,
    LifetimeExpired,
}

/// The session's targets: one slot or a field, never both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TargetPool {
    Single(Option<Target>),
    Field(Vec<Target>),
}

impl TargetPool {
    pub fn for_mode(mode: ModeKind) -> Self {
        if mode.is_arcade() {
            TargetPool::Field(Vec::new())
        } else {
            TargetPool::Single(None)
        }
    }

    /// Live targets in creation order
    pub fn as_slice(&self) -> &[Target] {
        match self {
            TargetPool::Single(slot) => slot.as_slice(),
            TargetPool::Field(targets) => targets.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Target> {
        self.as_slice().iter().find(|t| t.id == id)
    }

    pub fn single(&self) -> Option<&Target> {
        match self {
            TargetPool::Single(slot) => slot.as_ref(),
            TargetPool::Field(_) => None,
        }
    }

    /// First target containing `point`, oldest first
    pub fn hit_test(&self, point: Vec2) -> Option<u32> {
        self.as_slice()
            .iter()
            .find(|t| t.contains(point))
            .map(|t| t.id)
    }

    /// Remove by id; a second call for the same id returns `None`
    pub fn remove(&mut self, id: u32) -> Option<Target> {
        match self {
            TargetPool::Single(slot) => {
                if slot.as_ref().is_some_and(|t| t.id == id) {
                    slot.take()
                } else {
                    None
                }
            }
            TargetPool::Field(targets) => {
                let idx = targets.iter().position(|t| t.id == id)?;
                Some(targets.remove(idx))
            }
        }
    }

    pub fn take_all(&mut self) -> Vec<Target> {
        match self {
            TargetPool::Single(slot) => slot.take().into_iter().collect(),
            TargetPool::Field(targets) => std::mem::take(targets),
        }
    }
}

/// One game run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub mode: ModeKind,
    /// Arcade modes only
    pub difficulty: Option<Difficulty>,
    pub status: SessionStatus,
    pub end_cause: Option<EndCause>,
    /// Hits
    pub score: u32,
    pub misses: u32,
    /// Warm-up only
    pub lives: u8,
    pub total_left_secs: u32,
    pub phase_index: usize,
    pub phase_left_secs: u32,
    pub started_at_ms: f64,
    pub elapsed_ms: f64,
    pub targets: TargetPool,
    // Warm-up measurements
    pub reaction_ms: Vec<f64>,
    pub flick_ms: Vec<f64>,
    pub control_hits: u32,
    /// Phases entered so far, in order
    pub phases_seen: Vec<PhaseKey>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ModeKind::Warmup, None, 0.0)
    }
}

impl Session {
    /// Fresh, not-yet-running session with the mode's initial counters
    pub fn new(mode: ModeKind, difficulty: Option<Difficulty>, now_ms: f64) -> Self {
        let warmup = mode == ModeKind::Warmup;
        Self {
            mode,
            difficulty: if mode.is_arcade() {
                Some(difficulty.unwrap_or_default())
            } else {
                None
            },
            status: SessionStatus::Idle,
            end_cause: None,
            score: 0,
            misses: 0,
            lives: if warmup { WARMUP_LIVES } else { 0 },
            total_left_secs: if warmup { WARMUP_TOTAL_SECS } else { 0 },
            phase_index: 0,
            phase_left_secs: if warmup { WARMUP_PHASES[0].secs } else { 0 },
            started_at_ms: now_ms,
            elapsed_ms: 0.0,
            targets: TargetPool::for_mode(mode),
            reaction_ms: Vec::new(),
            flick_ms: Vec::new(),
            control_hits: 0,
            phases_seen: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Current warm-up phase
    pub fn phase(&self) -> Option<&'static PhaseConfig> {
        if self.mode == ModeKind::Warmup {
            WARMUP_PHASES.get(self.phase_index)
        } else {
            None
        }
    }

    pub fn phase_key(&self) -> Option<PhaseKey> {
        self.phase().map(|p| p.key)
    }
}

/// Top-level screens of the host shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Home,
    Game,
    Result,
}

/// HUD snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub mode_label: &'static str,
    pub phase_label: Option<&'static str>,
    /// `m:ss`, warm-up only
    pub timer: Option<String>,
    pub score_text: String,
    /// (remaining, max), warm-up only
    pub lives: Option<(u8, u8)>,
    /// Time-to-hit of the live Endless target
    pub pace_ms: Option<f64>,
}

/// Output of the engine for the presentation and feedback gateways
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    ShowScreen(Screen),
    TargetSpawned(Target),
    TargetMoved { id: u32, pos: Vec2, size: f32 },
    TargetRemoved { id: u32, reason: RemovalReason },
    Hud(Hud),
    Hint(&'static str),
    Toast(&'static str),
    /// Endless time-to-hit bar; `None` hides it
    Pace(Option<f64>),
    PhaseStarted(PhaseKey),
    Hit { id: u32, latency_ms: f64 },
    Miss(MissReason),
    SessionEnded(SessionSummary),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TargetKind;

    #[test]
    fn test_initial_counters() {
        let s = Session::new(ModeKind::Warmup, Some(Difficulty::Hard), 0.0);
        assert_eq!(s.lives, 3);
        assert_eq!(s.total_left_secs, 180);
        assert_eq!(s.phase_left_secs, 45);
        assert_eq!(s.difficulty, None);
        assert_eq!(s.phase_key(), Some(PhaseKey::Reaction));

        let s = Session::new(ModeKind::Falling, None, 0.0);
        assert_eq!(s.difficulty, Some(Difficulty::Medium));
        assert_eq!(s.lives, 0);
        assert!(s.phase().is_none());
        assert!(matches!(s.targets, TargetPool::Field(_)));
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!("med".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(UnknownDifficulty("nightmare".to_string()))
        );
    }

    fn field_target(id: u32, pos: Vec2) -> Target {
        Target {
            id,
            kind: TargetKind::Shrinking,
            pos,
            size: 40.0,
            base_size: 40.0,
            vel: Vec2::ZERO,
            shrink: None,
            spawned_at_ms: id as f64,
            age_ms: 0.0,
            lifetime: None,
        }
    }

    #[test]
    fn test_overlapping_hit_goes_to_oldest() {
        let pool = TargetPool::Field(vec![
            field_target(4, Vec2::new(100.0, 100.0)),
            field_target(9, Vec2::new(110.0, 110.0)),
        ]);
        // Inside both circles
        assert_eq!(pool.hit_test(Vec2::new(125.0, 125.0)), Some(4));
        // Only the newer one reaches this far
        assert_eq!(pool.hit_test(Vec2::new(140.0, 140.0)), Some(9));
        assert_eq!(pool.hit_test(Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_pool_remove_is_idempotent() {
        let mut pool = TargetPool::Field(Vec::new());
        assert!(pool.remove(3).is_none());
        assert!(pool.is_empty());
        let mut single = TargetPool::Single(None);
        assert!(single.remove(1).is_none());
        assert!(single.take_all().is_empty());
    }
}
