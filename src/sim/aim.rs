//! Raw-aim crosshair
//!
//! A virtual cursor decoupled from the native pointer. With pointer lock
//! it integrates the true relative deltas (`movementX/Y`); without it the
//! deltas are emulated from successive absolute positions. Either way the
//! result is scaled by the sensitivity and clamped to the playfield.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Bounds;
use crate::consts::{DEFAULT_SENSITIVITY, MAX_SENSITIVITY, MIN_SENSITIVITY};

/// One pointer-move sample from the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerMotion {
    /// Absolute pointer position in playfield coordinates
    pub position: Vec2,
    /// Relative movement reported under pointer lock
    pub movement: Option<Vec2>,
}

impl PointerMotion {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            movement: None,
        }
    }

    pub fn locked(movement: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            movement: Some(movement),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AimCursor {
    pos: Vec2,
    sensitivity: f32,
    locked: bool,
    /// Last absolute position seen by the emulated path
    anchor: Option<Vec2>,
}

impl AimCursor {
    /// Cursor centered in `bounds`
    pub fn new(bounds: Bounds) -> Self {
        Self {
            pos: Vec2::new(bounds.width / 2.0, bounds.height / 2.0),
            sensitivity: DEFAULT_SENSITIVITY,
            locked: false,
            anchor: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = if sensitivity.is_finite() {
            sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        } else {
            DEFAULT_SENSITIVITY
        };
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Switch between true and emulated relative input
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.anchor = None;
    }

    pub fn recenter(&mut self, bounds: Bounds) {
        self.pos = Vec2::new(bounds.width / 2.0, bounds.height / 2.0);
        self.anchor = None;
    }

    /// Re-clamp after the playfield changed size
    pub fn clamp_to(&mut self, bounds: Bounds) {
        self.pos = bounds.clamp_point(self.pos);
    }

    pub fn apply(&mut self, motion: PointerMotion, bounds: Bounds) {
        let delta = match (self.locked, motion.movement) {
            (true, Some(movement)) => movement,
            _ => {
                let delta = self
                    .anchor
                    .map(|anchor| motion.position - anchor)
                    .unwrap_or(Vec2::ZERO);
                self.anchor = Some(motion.position);
                delta
            }
        };
        self.pos = bounds.clamp_point(self.pos + delta * self.sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Bounds {
        Bounds::new(200.0, 100.0)
    }

    #[test]
    fn test_starts_centered() {
        assert_eq!(AimCursor::new(field()).position(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_locked_uses_true_deltas() {
        let mut aim = AimCursor::new(field());
        aim.set_locked(true);
        aim.set_sensitivity(2.0);
        aim.apply(PointerMotion::locked(Vec2::new(5.0, -5.0)), field());
        assert_eq!(aim.position(), Vec2::new(110.0, 40.0));
    }

    #[test]
    fn test_emulated_deltas_from_positions() {
        let mut aim = AimCursor::new(field());
        // First sample only anchors
        aim.apply(PointerMotion::at(Vec2::new(10.0, 10.0)), field());
        assert_eq!(aim.position(), Vec2::new(100.0, 50.0));
        aim.apply(PointerMotion::at(Vec2::new(15.0, 12.0)), field());
        assert_eq!(aim.position(), Vec2::new(105.0, 52.0));
    }

    #[test]
    fn test_clamped_to_bounds() {
        let mut aim = AimCursor::new(field());
        aim.set_locked(true);
        aim.apply(PointerMotion::locked(Vec2::new(-1000.0, 1000.0)), field());
        assert_eq!(aim.position(), Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_sensitivity_is_sanitized() {
        let mut aim = AimCursor::new(field());
        aim.set_sensitivity(f32::NAN);
        assert_eq!(aim.sensitivity(), DEFAULT_SENSITIVITY);
        aim.set_sensitivity(100.0);
        assert_eq!(aim.sensitivity(), MAX_SENSITIVITY);
    }
}
