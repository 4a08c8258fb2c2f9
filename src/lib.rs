//! Aim Warm-up - an aim-training mini-game engine
//!
//! Core modules:
//! - `sim`: Deterministic session engine (scheduler, targets, hit-testing, phases)
//! - `tuning`: Data-driven difficulty curves and mode tables
//! - `stats`: End-of-session summary
//! - `persistence`: Best scores and daily streak storage
//! - `platform`: Presentation/feedback gateways (DOM shell on wasm)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod streak;
pub mod tuning;

pub use highscores::ScoreKey;
pub use settings::Settings;
pub use sim::{Difficulty, EndCause, Engine, ModeKind, SessionStatus};
pub use stats::SessionSummary;

/// Engine configuration constants
pub mod consts {
    /// Warm-up clock period (one HUD second)
    pub const TICK_MS: f64 = 1000.0;

    /// Playfield used until the host reports its real size
    pub const DEFAULT_FIELD_WIDTH: f32 = 360.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 520.0;

    /// Longest frame delta fed to physics (tab switches, debugger pauses)
    pub const MAX_FRAME_DT_MS: f64 = 100.0;

    /// Raw-aim sensitivity bounds and default
    pub const MIN_SENSITIVITY: f32 = 0.1;
    pub const MAX_SENSITIVITY: f32 = 5.0;
    pub const DEFAULT_SENSITIVITY: f32 = 1.0;
}

/// Format whole seconds as `m:ss` for the HUD timer
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(180), "3:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(0), "0:00");
    }
}
