//! End-of-session statistics
//!
//! Reduces a finished session into what the result screen shows.

use serde::{Deserialize, Serialize};

use crate::sim::{Difficulty, EndCause, ModeKind, Session};

/// Warm-up accuracy needed for the top verdict
pub const READY_ACCURACY: u32 = 86;
/// Warm-up average reaction needed for the top verdict
pub const READY_REACTION_MS: u32 = 230;
pub const WARM_ACCURACY: u32 = 78;
/// Score-mode result that counts as a confident run
pub const CONFIDENT_SCORE: u32 = 20;

/// One-line judgement for the result screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Warm-up: clean and quick
    Ready,
    /// Warm-up: decent accuracy
    Warm,
    /// Warm-up: needs more
    Cold,
    /// Score modes: beat (or tied) the stored best
    NewRecord,
    Confident,
    TryAgain,
}

impl Verdict {
    pub fn subtitle(&self) -> &'static str {
        match self {
            Verdict::Ready => "Clean. You're ready to play.",
            Verdict::Warm => "Good. You're warmed up.",
            Verdict::Cold => "Warmed up. Now go play.",
            Verdict::NewRecord => "New record. Nice.",
            Verdict::Confident => "Solid run. Keep pushing.",
            Verdict::TryAgain => "One more try and it'll go higher.",
        }
    }
}

/// Terminal summary of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mode: ModeKind,
    pub difficulty: Option<Difficulty>,
    pub cause: EndCause,
    pub score: u32,
    pub misses: u32,
    pub accuracy_pct: u32,
    /// Warm-up Reaction phase
    pub avg_reaction_ms: Option<u32>,
    /// Warm-up Flick phase
    pub avg_flick_ms: Option<u32>,
    /// Warm-up Control phase
    pub control_hits: u32,
    pub previous_best: u32,
    pub best: u32,
    pub streak: u32,
    pub duration_ms: f64,
    pub verdict: Verdict,
}

impl SessionSummary {
    pub fn is_new_best(&self) -> bool {
        self.score > self.previous_best
    }
}

/// Rounded hit percentage, 0 with no attempts
pub fn accuracy_pct(hits: u32, misses: u32) -> u32 {
    let attempts = hits + misses;
    if attempts == 0 {
        return 0;
    }
    (hits as f64 / attempts as f64 * 100.0).round() as u32
}

/// Rounded mean, `None` with no samples
pub fn average_ms(samples: &[f64]) -> Option<u32> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().sum();
    Some((sum / samples.len() as f64).round() as u32)
}

/// Build the summary for a session that just ended
pub fn summarize(
    session: &Session,
    cause: EndCause,
    previous_best: u32,
    best: u32,
    streak: u32,
) -> SessionSummary {
    let accuracy = accuracy_pct(session.score, session.misses);
    let avg_reaction_ms = average_ms(&session.reaction_ms);

    let verdict = if session.mode == ModeKind::Warmup {
        let quick = avg_reaction_ms.is_some_and(|ms| ms <= READY_REACTION_MS);
        if accuracy >= READY_ACCURACY && quick {
            Verdict::Ready
        } else if accuracy >= WARM_ACCURACY {
            Verdict::Warm
        } else {
            Verdict::Cold
        }
    } else if session.score > 0 && session.score >= previous_best {
        Verdict::NewRecord
    } else if session.score >= CONFIDENT_SCORE {
        Verdict::Confident
    } else {
        Verdict::TryAgain
    };

    SessionSummary {
        mode: session.mode,
        difficulty: session.difficulty,
        cause,
        score: session.score,
        misses: session.misses,
        accuracy_pct: accuracy,
        avg_reaction_ms,
        avg_flick_ms: average_ms(&session.flick_ms),
        control_hits: session.control_hits,
        previous_best,
        best,
        streak,
        duration_ms: session.elapsed_ms,
        verdict,
    }
}
