// Morphing between two height maps.
// Visual expectation: the wireframe slowly melts from the first map into the
// second, then back again, forever.
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::HeightGrid;

/// Check once, before rendering starts, that two grids can be blended.
pub fn check_same_shape<T: Copy, U: Copy>(a: &HeightGrid<T>, b: &HeightGrid<U>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            left: a.shape(),
            right: b.shape(),
        });
    }
    Ok(())
}

/// Per-cell linear blend: `a + (b - a) * alpha`.
/// Callers guarantee equal shapes (see [`check_same_shape`]).
pub fn interpolate(a: &HeightGrid<f32>, b: &HeightGrid<f32>, alpha: f32) -> HeightGrid<f32> {
    debug_assert_eq!(a.shape(), b.shape(), "interpolating grids of different shape");
    // Exact endpoints, independent of float rounding in the general formula.
    if alpha <= 0.0 {
        return a.clone();
    }
    if alpha >= 1.0 {
        return b.clone();
    }
    HeightGrid::from_fn(a.width(), a.height(), |x, y| {
        let from = a.get(x, y);
        from + (b.get(x, y) - from) * alpha
    })
}

/// Which way the blend factor is currently moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,  // towards the second map (alpha grows)
    Backward, // towards the first map (alpha shrinks)
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Oscillating blend factor. `alpha` stays in [0, 1]; the direction flips
/// exactly when a bound is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    pub alpha: f32,
    pub direction: Direction,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            direction: Direction::Forward,
        }
    }
}

impl BlendState {
    /// Move `alpha` one step; clamp to the bound and turn around when hitting it.
    pub fn advance(self, step: f32) -> Self {
        let alpha = self.alpha + step * self.direction.sign();
        if alpha >= 1.0 {
            debug!("blend reached second map, turning back");
            Self {
                alpha: 1.0,
                direction: Direction::Backward,
            }
        } else if alpha <= 0.0 {
            debug!("blend reached first map, turning back");
            Self {
                alpha: 0.0,
                direction: Direction::Forward,
            }
        } else {
            Self { alpha, ..self }
        }
    }
}
