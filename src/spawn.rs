//! Particle placement.
//!
//! Positions are generated once and then shared, read-only, by every particle
//! group. The random source is always passed in so runs can be reproduced
//! with a seeded generator:
//!
//! ```ignore
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let positions = generate_positions(&mut rng, 10_000, 1000.0);
//! ```

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

/// Immutable point set shared by all particle groups.
pub type PositionSet = Arc<[Vec3]>;

/// Scatter `count` points uniformly through the cube `[-extent, extent]^3`.
///
/// Each coordinate is drawn independently.
pub fn generate_positions<R: Rng + ?Sized>(rng: &mut R, count: usize, extent: f32) -> PositionSet {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            )
        })
        .collect()
}

/// Random Euler rotation with each axis in `[0, 2π)`.
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(0.0..TAU),
        rng.gen_range(0.0..TAU),
        rng.gen_range(0.0..TAU),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_count_and_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let positions = generate_positions(&mut rng, 10_000, 1000.0);

        assert_eq!(positions.len(), 10_000);
        for p in positions.iter() {
            assert!(p.abs().max_element() <= 1000.0, "out of bounds: {p}");
        }
    }

    #[test]
    fn test_fills_the_cube() {
        let mut rng = StdRng::seed_from_u64(2);
        let positions = generate_positions(&mut rng, 10_000, 1000.0);

        // With 10k samples every octant is populated and the spread reaches
        // well past the middle of the range on each axis.
        let min = positions.iter().fold(Vec3::splat(f32::MAX), |a, p| a.min(*p));
        let max = positions.iter().fold(Vec3::splat(f32::MIN), |a, p| a.max(*p));
        assert!(min.max_element() < -900.0);
        assert!(max.min_element() > 900.0);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let a = generate_positions(&mut StdRng::seed_from_u64(9), 100, 10.0);
        let b = generate_positions(&mut StdRng::seed_from_u64(9), 100, 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_positions(&mut rng, 0, 1.0).is_empty());
    }

    #[test]
    fn test_rotation_range() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let r = random_rotation(&mut rng);
            assert!(r.min_element() >= 0.0);
            assert!(r.max_element() < TAU);
        }
    }
}
