//! The pressure field: triple-buffered grid state, obstacles, and the
//! active region they drive.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::active_region::ActiveRegion;
use crate::error::FieldError;
use crate::params::SimParams;
use crate::preset::DampingPreset;
use crate::stepper::step_cpu;

/// Growth margin, in pixels, applied around newly-active cells each frame.
const ACTIVE_REGION_MARGIN: u32 = 4;

/// Rotating indices into [`Field::buffers`] identifying which of the three
/// owned buffers currently plays the role of `prev`, `cur`, and `next`.
///
/// Rotated by permutation after each substep rather than by copying data:
/// the buffer that was `prev` becomes the new `next` (to be overwritten),
/// `cur` becomes `prev`, and `next` becomes `cur`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BufferIndices {
    prev: usize,
    cur: usize,
    next: usize,
}

impl BufferIndices {
    const fn initial() -> Self {
        Self {
            prev: 0,
            cur: 1,
            next: 2,
        }
    }

    const fn rotate(self) -> Self {
        Self {
            prev: self.cur,
            cur: self.next,
            next: self.prev,
        }
    }
}

/// A 2D acoustic pressure field with triple-buffered leapfrog state,
/// obstacles, continuous sources, and listener probes.
#[derive(Debug, Clone)]
pub struct Field {
    width: u32,
    height: u32,
    buffers: [Vec<f32>; 3],
    indices: BufferIndices,
    obstacle: Vec<u8>,
    active_region: ActiveRegion,
}

impl Field {
    /// Creates a silent field of the given dimensions with no obstacles.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            buffers: [vec![0.0; len], vec![0.0; len], vec![0.0; len]],
            indices: BufferIndices::initial(),
            obstacle: vec![0u8; len],
            active_region: ActiveRegion::new(width, height),
        }
    }

    /// Grid dimensions, `(width, height)`.
    #[inline]
    pub const fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The current pressure field (the most recently completed substep).
    #[inline]
    pub fn pressure(&self) -> &[f32] {
        &self.buffers[self.indices.cur]
    }

    /// The pressure field one substep behind [`Field::pressure`] — the
    /// state the leapfrog stencil needs alongside `cur` to keep stepping.
    #[inline]
    pub fn pressure_prev(&self) -> &[f32] {
        &self.buffers[self.indices.prev]
    }

    /// Overwrites the current and previous pressure buffers in place, e.g.
    /// after a batch of substeps computed off-device. Leaves the scratch
    /// (`next`) slot and the buffer rotation untouched.
    ///
    /// # Panics
    ///
    /// Panics if either slice's length does not match the field's cell
    /// count.
    pub fn load_gpu_result(&mut self, cur: &[f32], prev: &[f32]) {
        assert_eq!(cur.len(), self.buffers[self.indices.cur].len());
        assert_eq!(prev.len(), self.buffers[self.indices.prev].len());
        self.buffers[self.indices.cur].copy_from_slice(cur);
        self.buffers[self.indices.prev].copy_from_slice(prev);
    }

    /// The obstacle mask: one byte per cell, non-zero marks a rigid cell.
    #[inline]
    pub fn obstacles(&self) -> &[u8] {
        &self.obstacle
    }

    /// The active region bounding box tracker.
    #[inline]
    pub const fn active_region(&self) -> &ActiveRegion {
        &self.active_region
    }

    /// Expands the active region by `margin` pixels on all four sides, a
    /// no-op if nothing has happened yet. Called once per frame by the
    /// scheduler as a safety margin against wavefronts escaping the active
    /// window within the frame.
    pub fn expand_active_region(&mut self, margin: u32) {
        self.active_region
            .expand_margin(margin, self.width, self.height);
    }

    /// Zeroes all three pressure buffers and resets the active region,
    /// leaving obstacles untouched.
    pub fn clear(&mut self) {
        for buf in &mut self.buffers {
            buf.iter_mut().for_each(|v| *v = 0.0);
        }
        self.active_region.reset();
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Marks all cells within `radius` pixels of `(x, y)` as rigid
    /// obstacles.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidRadius`] if `radius` is outside `[1,
    /// 50]`.
    pub fn add_obstacle(&mut self, x: u32, y: u32, radius: i32) -> Result<(), FieldError> {
        self.set_obstacle_disc(x, y, radius, true)
    }

    /// Clears obstacle status for all cells within `radius` pixels of
    /// `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidRadius`] if `radius` is outside `[1,
    /// 50]`.
    pub fn remove_obstacle(&mut self, x: u32, y: u32, radius: i32) -> Result<(), FieldError> {
        self.set_obstacle_disc(x, y, radius, false)
    }

    fn set_obstacle_disc(
        &mut self,
        x: u32,
        y: u32,
        radius: i32,
        value: bool,
    ) -> Result<(), FieldError> {
        if !(1..=50).contains(&radius) {
            return Err(FieldError::InvalidRadius { radius });
        }
        let r2 = radius * radius;
        let (cx, cy) = (i64::from(x), i64::from(y));
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let (px, py) = (cx + i64::from(dx), cy + i64::from(dy));
                if self.in_bounds(px, py) {
                    let i = (py as u32 * self.width + px as u32) as usize;
                    self.obstacle[i] = u8::from(value);
                    if value {
                        for buf in &mut self.buffers {
                            buf[i] = 0.0;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Removes every obstacle from the field.
    pub fn clear_obstacles(&mut self) {
        self.obstacle.iter_mut().for_each(|v| *v = 0);
    }

    /// Replaces the obstacle mask wholesale. `mask.len()` must equal
    /// `width * height`; a non-zero byte marks a rigid cell.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MaskSizeMismatch`] if `mask.len()` does not
    /// match the field's cell count.
    pub fn load_obstacles_from_mask(&mut self, mask: &[u8]) -> Result<(), FieldError> {
        let expected = (self.width as usize) * (self.height as usize);
        if mask.len() != expected {
            return Err(FieldError::MaskSizeMismatch {
                expected,
                actual: mask.len(),
            });
        }
        self.obstacle.copy_from_slice(mask);
        for (i, &m) in mask.iter().enumerate() {
            if m != 0 {
                for buf in &mut self.buffers {
                    buf[i] = 0.0;
                }
            }
        }
        Ok(())
    }

    /// Injects a Gaussian-profile pressure impulse centered at `(x, y)`
    /// with peak amplitude `pressure` (pascals) and radius `radius`
    /// pixels (standard deviation `1.25 * radius`).
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidAmplitude`] if `pressure` is outside
    /// `(0, 1000]`, or [`FieldError::InvalidRadius`] if `radius` is
    /// outside `[1, 50]`.
    pub fn add_impulse(
        &mut self,
        x: u32,
        y: u32,
        pressure: f32,
        radius: i32,
    ) -> Result<(), FieldError> {
        if !(pressure > 0.0 && pressure <= 1000.0) {
            return Err(FieldError::InvalidAmplitude { pressure });
        }
        if !(1..=50).contains(&radius) {
            return Err(FieldError::InvalidRadius { radius });
        }

        let sigma = 1.25 * radius as f32;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let span = radius;
        let (cx, cy) = (i64::from(x), i64::from(y));
        let cur = self.indices.cur;

        for dy in -span..=span {
            for dx in -span..=span {
                let (px, py) = (cx + i64::from(dx), cy + i64::from(dy));
                if !self.in_bounds(px, py) {
                    continue;
                }
                let i = (py as u32 * self.width + px as u32) as usize;
                if self.obstacle[i] != 0 {
                    continue;
                }
                let d2 = (dx * dx + dy * dy) as f32;
                let weight = libm::expf(-d2 / two_sigma_sq);
                self.buffers[cur][i] += pressure * weight;
            }
        }

        self.active_region
            .grow(x, y, 2 * radius as u32, self.width, self.height);
        Ok(())
    }

    /// Adds `pressure` pascals directly to the current buffer at `(x, y)`.
    /// A no-op on out-of-bounds coordinates or obstacle cells.
    ///
    /// Used both by continuous sources each substep and internally by
    /// [`Field::add_impulse`]'s single-cell case.
    pub fn inject(&mut self, x: u32, y: u32, pressure: f32) {
        if !self.in_bounds(i64::from(x), i64::from(y)) {
            return;
        }
        let i = (y * self.width + x) as usize;
        if self.obstacle[i] != 0 {
            return;
        }
        self.buffers[self.indices.cur][i] += pressure;
        self.active_region
            .grow(x, y, ACTIVE_REGION_MARGIN, self.width, self.height);
    }

    /// Returns disjoint `(prev, cur, next)` views into the three owned
    /// buffers according to the current rotation, without `unsafe`.
    fn buffer_refs(&mut self) -> (&[f32], &[f32], &mut [f32]) {
        let BufferIndices { prev, cur, next } = self.indices;
        let [b0, b1, b2] = &mut self.buffers;
        match (prev, cur, next) {
            (0, 1, 2) => (b0, b1, b2),
            (0, 2, 1) => (b0, b2, b1),
            (1, 0, 2) => (b1, b0, b2),
            (1, 2, 0) => (b1, b2, b0),
            (2, 0, 1) => (b2, b0, b1),
            (2, 1, 0) => (b2, b1, b0),
            _ => unreachable!("buffer indices are always a permutation of {{0, 1, 2}}"),
        }
    }

    /// Advances the field by one leapfrog substep of length `dt`, returning
    /// a listener sample if `listener` names a grid coordinate.
    pub fn step(
        &mut self,
        dt: f32,
        params: &SimParams,
        preset: &DampingPreset,
        listener: Option<(u32, u32)>,
    ) -> Option<f32> {
        let (width, height) = (self.width, self.height);
        let (prev, cur, next) = self.buffer_refs();
        let sample = step_cpu(
            prev,
            cur,
            next,
            &self.obstacle,
            width,
            height,
            dt,
            params,
            preset,
            listener,
        );
        self.indices = self.indices.rotate();
        sample
    }
}
