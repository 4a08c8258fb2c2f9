//! Best-score keys
//!
//! One best score per (mode, difficulty). Single-target modes have no
//! difficulty and share one key per mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::{Difficulty, ModeKind};

/// Prefix for every best-score storage key
pub const BEST_KEY_PREFIX: &str = "aim_warmup_best";

/// Lookup key for a stored best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreKey {
    pub mode: ModeKind,
    pub difficulty: Option<Difficulty>,
}

impl ScoreKey {
    /// Normalized key: arcade modes always carry a difficulty (Medium when
    /// unspecified), the others never do
    pub fn new(mode: ModeKind, difficulty: Option<Difficulty>) -> Self {
        let difficulty = if mode.is_arcade() {
            Some(difficulty.unwrap_or_default())
        } else {
            None
        };
        Self { mode, difficulty }
    }

    /// Key used by key-value backends
    pub fn storage_key(&self) -> String {
        match self.difficulty {
            Some(d) => format!("{}_{}_{}", BEST_KEY_PREFIX, self.mode.as_key(), d.as_key()),
            None => format!("{}_{}", BEST_KEY_PREFIX, self.mode.as_key()),
        }
    }

    /// Every key the game can produce
    pub fn all() -> Vec<ScoreKey> {
        ModeKind::ALL
            .iter()
            .flat_map(|&mode| {
                if mode.is_arcade() {
                    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
                        .iter()
                        .map(|&d| ScoreKey::new(mode, Some(d)))
                        .collect::<Vec<_>>()
                } else {
                    vec![ScoreKey::new(mode, None)]
                }
            })
            .collect()
    }
}

impl fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.difficulty {
            Some(d) => write!(f, "{} ({})", self.mode.label(), d.as_key()),
            None => write!(f, "{}", self.mode.label()),
        }
    }
}
