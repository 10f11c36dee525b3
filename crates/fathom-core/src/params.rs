//! Physical and numerical simulation parameters.

/// Fixed CFL safety factor the frame scheduler uses to pick `dt_max`.
///
/// The leapfrog stencil is stable for `c * dt / dx <= 1 / sqrt(2) ≈ 0.707`
/// in two dimensions; `dt_max = CFL_SAFETY * dx / c` stays below that bound
/// with headroom to spare.
pub const CFL_SAFETY: f32 = 0.6;

/// Physical and grid parameters shared by every substep of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Speed of sound, in meters per second.
    pub c: f32,
    /// Grid spacing, in meters per pixel.
    pub dx: f32,
}

impl SimParams {
    /// Speed of sound of air at roughly room temperature, with a grid
    /// spacing chosen so that a 512px-wide field spans about 4.4 meters.
    pub const fn new(c: f32, dx: f32) -> Self {
        Self { c, dx }
    }

    /// The largest stable timestep for these parameters: `CFL_SAFETY * dx /
    /// c`.
    #[inline]
    pub fn max_stable_dt(&self) -> f32 {
        CFL_SAFETY * self.dx / self.c
    }

    /// `(c * dt / dx)^2`, the squared Courant number used directly in the
    /// Laplacian coefficient of the leapfrog update.
    #[inline]
    pub fn courant_squared(&self, dt: f32) -> f32 {
        let courant = self.c * dt / self.dx;
        courant * courant
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            c: 343.0,
            dx: 0.0086,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_room_scale_constants() {
        let p = SimParams::default();
        assert!((p.c - 343.0).abs() < 1e-6);
        assert!((p.dx - 0.0086).abs() < 1e-6);
    }

    #[test]
    fn max_stable_dt_stays_below_the_cfl_bound() {
        let p = SimParams::default();
        let dt = p.max_stable_dt();
        assert!(dt > 0.0);
        let courant = p.c * dt / p.dx;
        assert!(courant < core::f32::consts::FRAC_1_SQRT_2);
    }
}
