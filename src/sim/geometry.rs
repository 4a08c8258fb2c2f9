//! Playfield geometry: placement and circle hit-testing
//!
//! Target positions are top-left corners of the target's bounding box
//! (the way a rendered element is positioned); the hit circle is the
//! inscribed circle of that box.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Playfield size in logical pixels, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        // NaN.max(0.0) is 0.0, so garbage from the host degenerates to empty
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Largest top-left coordinate that keeps a box of `size` inside
    #[inline]
    pub fn max_corner(&self, size: f32) -> Vec2 {
        Vec2::new((self.width - size).max(0.0), (self.height - size).max(0.0))
    }

    /// Clamp a top-left corner so the box stays inside (or pins to 0,0)
    pub fn clamp_corner(&self, pos: Vec2, size: f32) -> Vec2 {
        let max = self.max_corner(size);
        Vec2::new(pos.x.clamp(0.0, max.x), pos.y.clamp(0.0, max.y))
    }

    /// Clamp an arbitrary point into the playfield
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}

/// A hit circle in playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Inscribed circle of a square box at `corner` with side `size`
    pub fn from_box(corner: Vec2, size: f32) -> Self {
        let radius = size / 2.0;
        Self {
            center: corner + Vec2::splat(radius),
            radius,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        circle_contains_point(self.center, self.radius, p)
    }
}

/// Uniform top-left position keeping a `size` box inside `bounds`
///
/// Collapses to 0 on any axis where the box does not fit.
pub fn random_position_within<R: Rng + ?Sized>(bounds: Bounds, size: f32, rng: &mut R) -> Vec2 {
    let max = bounds.max_corner(size);
    Vec2::new(
        rng.random::<f32>() * max.x,
        rng.random::<f32>() * max.y,
    )
}

/// Sample positions until one is at least `min_separation` from every
/// existing circle center, keeping the best candidate as a fallback
///
/// Bounded to `max_attempts` samples (at least one).
pub fn pick_spaced_position<R: Rng + ?Sized>(
    bounds: Bounds,
    size: f32,
    existing: &[Circle],
    min_separation: f32,
    max_attempts: u32,
    rng: &mut R,
) -> Vec2 {
    let mut best = Vec2::ZERO;
    let mut best_clearance = f32::NEG_INFINITY;

    for _ in 0..max_attempts.max(1) {
        let candidate = random_position_within(bounds, size, rng);
        let center = Circle::from_box(candidate, size).center;
        let clearance = existing
            .iter()
            .map(|c| c.center.distance(center))
            .fold(f32::INFINITY, f32::min);

        if clearance >= min_separation {
            return candidate;
        }
        if clearance > best_clearance {
            best_clearance = clearance;
            best = candidate;
        }
    }

    best
}

/// Inclusive point-in-circle test
#[inline]
pub fn circle_contains_point(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_degenerate_bounds_pin_to_origin() {
        let mut rng = Pcg32::seed_from_u64(7);
        let pos = random_position_within(Bounds::new(20.0, 500.0), 40.0, &mut rng);
        assert_eq!(pos.x, 0.0);
        assert!(pos.y >= 0.0 && pos.y <= 460.0);

        let pos = random_position_within(Bounds::new(f32::NAN, -3.0), 10.0, &mut rng);
        assert_eq!(pos, Vec2::ZERO);
    }

    #[test]
    fn test_circle_edge_is_inclusive() {
        assert!(circle_contains_point(Vec2::ZERO, 5.0, Vec2::new(3.0, 4.0)));
        assert!(!circle_contains_point(Vec2::ZERO, 5.0, Vec2::new(3.0, 4.01)));
    }

    #[test]
    fn test_from_box_center() {
        let c = Circle::from_box(Vec2::new(10.0, 20.0), 30.0);
        assert_eq!(c.center, Vec2::new(25.0, 35.0));
        assert_eq!(c.radius, 15.0);
    }

    #[test]
    fn test_spaced_keeps_distance_when_room() {
        let mut rng = Pcg32::seed_from_u64(42);
        let bounds = Bounds::new(400.0, 400.0);
        let existing = [Circle::from_box(Vec2::new(0.0, 0.0), 40.0)];
        let pos = pick_spaced_position(bounds, 40.0, &existing, 60.0, 64, &mut rng);
        let center = Circle::from_box(pos, 40.0).center;
        assert!(center.distance(existing[0].center) >= 60.0);
    }

    #[test]
    fn test_spaced_falls_back_to_best() {
        let mut rng = Pcg32::seed_from_u64(3);
        // Impossible separation: must still return a valid in-bounds spot
        let bounds = Bounds::new(100.0, 100.0);
        let existing = [Circle::from_box(Vec2::new(30.0, 30.0), 40.0)];
        let pos = pick_spaced_position(bounds, 40.0, &existing, 10_000.0, 8, &mut rng);
        assert!(pos.x >= 0.0 && pos.x <= 60.0);
        assert!(pos.y >= 0.0 && pos.y <= 60.0);
    }

    proptest! {
        #[test]
        fn prop_spaced_without_neighbours_stays_inside(
            w in 0.0f32..2000.0,
            h in 0.0f32..2000.0,
            size in 1.0f32..200.0,
            seed in any::<u64>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let bounds = Bounds::new(w, h);
            let pos = pick_spaced_position(bounds, size, &[], 50.0, 16, &mut rng);
            prop_assert!(pos.x >= 0.0 && pos.y >= 0.0);
            prop_assert!(pos.x <= (w - size).max(0.0));
            prop_assert!(pos.y <= (h - size).max(0.0));
        }

        #[test]
        fn prop_box_center_is_hit(x in -500.0f32..500.0, y in -500.0f32..500.0, size in 1.0f32..120.0) {
            let circle = Circle::from_box(Vec2::new(x, y), size);
            prop_assert!(circle.contains(circle.center));
            prop_assert!(!circle.contains(circle.center + Vec2::new(size, 0.0)));
        }
    }
}
