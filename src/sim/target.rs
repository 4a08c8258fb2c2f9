//! Target entity and its per-frame integration step

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::CancelHandle;
use super::geometry::{Bounds, Circle, pick_spaced_position, random_position_within};
use crate::tuning::{BOUNCE_SPEED_MAX, BOUNCE_SPEED_MIN, PLACEMENT_ATTEMPTS};

/// Slack for the shrink floor comparison (float drift over many frames)
const SIZE_EPSILON: f32 = 1e-3;

/// How a target moves and decays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// Sits still until hit or timed out
    Stationary,
    /// Moves and bounces off the four playfield edges
    Bouncing,
    /// Sits still and shrinks toward a floor
    Shrinking,
    /// Drops from the top edge
    Falling,
    /// Drops and shrinks at the same time
    FallingShrinking,
}

impl TargetKind {
    pub fn falls(&self) -> bool {
        matches!(self, TargetKind::Falling | TargetKind::FallingShrinking)
    }

    pub fn shrinks(&self) -> bool {
        matches!(self, TargetKind::Shrinking | TargetKind::FallingShrinking)
    }
}

/// Linear shrink state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shrink {
    pub rate_per_ms: f64,
    pub min_size: f32,
}

/// Everything needed to spawn one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub size: f32,
    /// Bounce speed or fall speed (px/ms); ignored for still targets
    pub speed: f32,
    pub shrink: Option<Shrink>,
}

/// Where to put a new target
#[derive(Debug, Clone, Copy)]
pub enum Placement<'a> {
    Anywhere,
    /// Keep away from existing targets where possible
    Spaced {
        existing: &'a [Circle],
        min_separation: f32,
    },
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    /// Shrank to (or below) its floor
    ShrinkOut,
    /// Fell past the bottom edge
    FallOut,
}

/// Why a target left the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    Hit,
    Expired,
    ShrinkOut,
    FallOut,
    /// Replaced by a fresh spawn (resize, miss respawn)
    Replaced,
    /// Session teardown or end
    Cleared,
}

impl RemovalReason {
    /// In arcade modes anything but a hit loses the run
    pub fn is_defeat(&self) -> bool {
        matches!(
            self,
            RemovalReason::Expired | RemovalReason::ShrinkOut | RemovalReason::FallOut
        )
    }
}

/// A spawned hittable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub kind: TargetKind,
    /// Top-left corner (px)
    pub pos: Vec2,
    /// Current diameter (px)
    pub size: f32,
    pub base_size: f32,
    /// px/ms
    pub vel: Vec2,
    pub shrink: Option<Shrink>,
    pub spawned_at_ms: f64,
    pub age_ms: f64,
    /// Pending lifetime timeout, if any
    #[serde(skip)]
    pub lifetime: Option<CancelHandle>,
}

impl Target {
    /// Create a target at a freshly sampled position
    pub fn spawn<R: Rng + ?Sized>(
        id: u32,
        spec: &TargetSpec,
        placement: Placement<'_>,
        bounds: Bounds,
        now_ms: f64,
        rng: &mut R,
    ) -> Self {
        // Falling targets enter along the top edge
        let field = if spec.kind.falls() {
            Bounds::new(bounds.width, spec.size)
        } else {
            bounds
        };
        let pos = match placement {
            Placement::Anywhere => random_position_within(field, spec.size, rng),
            Placement::Spaced {
                existing,
                min_separation,
            } => pick_spaced_position(
                field,
                spec.size,
                existing,
                min_separation,
                PLACEMENT_ATTEMPTS,
                rng,
            ),
        };

        let vel = match spec.kind {
            TargetKind::Bouncing => {
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                let speed = spec.speed.clamp(BOUNCE_SPEED_MIN, BOUNCE_SPEED_MAX);
                Vec2::new(angle.cos(), angle.sin()) * speed
            }
            TargetKind::Falling | TargetKind::FallingShrinking => Vec2::new(0.0, spec.speed),
            TargetKind::Stationary | TargetKind::Shrinking => Vec2::ZERO,
        };

        Self {
            id,
            kind: spec.kind,
            pos,
            size: spec.size,
            base_size: spec.size,
            vel,
            shrink: if spec.kind.shrinks() { spec.shrink } else { None },
            spawned_at_ms: now_ms,
            age_ms: 0.0,
            lifetime: None,
        }
    }

    /// Hit circle in playfield coordinates
    pub fn circle(&self) -> Circle {
        Circle::from_box(self.pos, self.size)
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.circle().contains(point)
    }

    /// Advance one frame
    ///
    /// Shrink-out is checked before fall-out. An out result leaves the
    /// visual state as it was on the previous frame.
    pub fn advance(&mut self, dt_ms: f64, bounds: Bounds) -> StepOutcome {
        self.age_ms += dt_ms;
        let dt = dt_ms as f32;

        if let Some(shrink) = self.shrink {
            let new_size = (self.base_size as f64 - shrink.rate_per_ms * self.age_ms) as f32;
            if new_size <= shrink.min_size + SIZE_EPSILON {
                return StepOutcome::ShrinkOut;
            }
            // Keep the center fixed
            let delta = self.size - new_size;
            self.pos += Vec2::splat(delta / 2.0);
            self.size = new_size;
        }

        match self.kind {
            TargetKind::Bouncing => self.bounce(dt, bounds),
            TargetKind::Falling | TargetKind::FallingShrinking => {
                self.pos.y += self.vel.y * dt;
                if self.pos.y >= bounds.height {
                    return StepOutcome::FallOut;
                }
            }
            TargetKind::Stationary | TargetKind::Shrinking => {}
        }

        if self.shrink.is_some() {
            let max = bounds.max_corner(self.size);
            self.pos.x = self.pos.x.clamp(0.0, max.x);
            if !self.kind.falls() {
                self.pos.y = self.pos.y.clamp(0.0, max.y);
            }
        }

        StepOutcome::Alive
    }

    fn bounce(&mut self, dt: f32, bounds: Bounds) {
        let max = bounds.max_corner(self.size);
        self.pos += self.vel * dt;

        if self.pos.x <= 0.0 {
            self.pos.x = 0.0;
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x >= max.x {
            self.pos.x = max.x;
            self.vel.x = -self.vel.x.abs();
        }

        if self.pos.y <= 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.vel.y.abs();
        } else if self.pos.y >= max.y {
            self.pos.y = max.y;
            self.vel.y = -self.vel.y.abs();
        }
    }

    /// Pull the target back inside new bounds (after a resize)
    pub fn clamp_into(&mut self, bounds: Bounds) {
        if self.kind.falls() {
            let max = bounds.max_corner(self.size);
            self.pos.x = self.pos.x.clamp(0.0, max.x);
        } else {
            self.pos = bounds.clamp_corner(self.pos, self.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> Bounds {
        Bounds::new(300.0, 400.0)
    }

    fn still(kind: TargetKind, size: f32) -> Target {
        Target {
            id: 1,
            kind,
            pos: Vec2::new(100.0, 100.0),
            size,
            base_size: size,
            vel: Vec2::ZERO,
            shrink: None,
            spawned_at_ms: 0.0,
            age_ms: 0.0,
            lifetime: None,
        }
    }

    #[test]
    fn test_spawn_inside_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let spec = TargetSpec {
            kind: TargetKind::Stationary,
            size: 34.0,
            speed: 0.0,
            shrink: None,
        };
        for i in 0..100 {
            let t = Target::spawn(i, &spec, Placement::Anywhere, field(), 5.0, &mut rng);
            assert!(t.pos.x >= 0.0 && t.pos.x <= 266.0);
            assert!(t.pos.y >= 0.0 && t.pos.y <= 366.0);
            assert_eq!(t.age_ms, 0.0);
            assert_eq!(t.spawned_at_ms, 5.0);
        }
    }

    #[test]
    fn test_falling_spawns_on_top_edge() {
        let mut rng = Pcg32::seed_from_u64(9);
        let spec = TargetSpec {
            kind: TargetKind::Falling,
            size: 40.0,
            speed: 0.1,
            shrink: None,
        };
        let t = Target::spawn(1, &spec, Placement::Anywhere, field(), 0.0, &mut rng);
        assert_eq!(t.pos.y, 0.0);
        assert_eq!(t.vel, Vec2::new(0.0, 0.1));
    }

    #[test]
    fn test_bouncing_speed_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(2);
        let spec = TargetSpec {
            kind: TargetKind::Bouncing,
            size: 28.0,
            speed: 5.0,
            shrink: None,
        };
        let t = Target::spawn(1, &spec, Placement::Anywhere, field(), 0.0, &mut rng);
        assert!((t.vel.length() - BOUNCE_SPEED_MAX).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_off_right_wall() {
        let mut t = still(TargetKind::Bouncing, 20.0);
        t.pos = Vec2::new(275.0, 100.0);
        t.vel = Vec2::new(0.5, 0.0);
        assert_eq!(t.advance(20.0, field()), StepOutcome::Alive);
        assert_eq!(t.pos.x, 280.0);
        assert!(t.vel.x < 0.0);
        t.advance(10.0, field());
        assert!(t.pos.x < 280.0);
    }

    #[test]
    fn test_bounce_off_top_wall() {
        let mut t = still(TargetKind::Bouncing, 20.0);
        t.pos = Vec2::new(50.0, 3.0);
        t.vel = Vec2::new(0.0, -0.2);
        t.advance(50.0, field());
        assert_eq!(t.pos.y, 0.0);
        assert!(t.vel.y > 0.0);
    }

    #[test]
    fn test_shrink_keeps_center() {
        let mut t = still(TargetKind::Shrinking, 50.0);
        t.shrink = Some(Shrink {
            rate_per_ms: 0.01,
            min_size: 10.0,
        });
        let before = t.circle().center;
        assert_eq!(t.advance(1000.0, field()), StepOutcome::Alive);
        assert!((t.size - 40.0).abs() < 1e-4);
        assert!(t.circle().center.distance(before) < 1e-3);
    }

    #[test]
    fn test_shrink_out_at_floor() {
        let mut t = still(TargetKind::Shrinking, 58.0);
        t.shrink = Some(Shrink {
            rate_per_ms: 46.0 / 3200.0,
            min_size: 12.0,
        });
        for _ in 0..199 {
            assert_eq!(t.advance(16.0, field()), StepOutcome::Alive);
        }
        let size_before = t.size;
        assert_eq!(t.advance(16.0, field()), StepOutcome::ShrinkOut);
        // The failing frame does not touch the visual state
        assert_eq!(t.size, size_before);
    }

    #[test]
    fn test_fall_out_past_bottom() {
        let mut t = still(TargetKind::Falling, 20.0);
        t.pos = Vec2::new(10.0, 390.0);
        t.vel = Vec2::new(0.0, 0.5);
        assert_eq!(t.advance(10.0, field()), StepOutcome::Alive);
        assert_eq!(t.advance(10.0, field()), StepOutcome::FallOut);
    }

    #[test]
    fn test_shrink_out_wins_over_fall_out() {
        let mut t = still(TargetKind::FallingShrinking, 20.0);
        t.pos = Vec2::new(10.0, 395.0);
        t.vel = Vec2::new(0.0, 1.0);
        t.shrink = Some(Shrink {
            rate_per_ms: 1.0,
            min_size: 5.0,
        });
        assert_eq!(t.advance(20.0, field()), StepOutcome::ShrinkOut);
    }

    #[test]
    fn test_removal_reasons() {
        assert!(!RemovalReason::Hit.is_defeat());
        assert!(!RemovalReason::Cleared.is_defeat());
        assert!(RemovalReason::ShrinkOut.is_defeat());
        assert!(RemovalReason::FallOut.is_defeat());
        assert!(RemovalReason::Expired.is_defeat());
    }
}
