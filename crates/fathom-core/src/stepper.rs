//! The leapfrog FDTD update and boundary resolution, as a free function
//! operating on raw buffer slices.
//!
//! Kept separate from [`crate::field::Field`] so the exact same numerical
//! core can be driven by a GPU-parity test with hand-rolled buffers, with
//! no `Field` bookkeeping in the way.

use crate::preset::DampingPreset;
use crate::params::SimParams;

#[inline]
fn idx(x: u32, y: u32, width: u32) -> usize {
    (y * width + x) as usize
}

/// Advances one leapfrog substep in place.
///
/// `prev` and `cur` are the two most recent pressure fields; `next` is
/// written with the field one substep ahead. `obstacle` is a `width *
/// height` mask where a non-zero byte marks a rigid cell. `listener`, if
/// given, names a grid coordinate whose `cur` value (i.e. the value just
/// before this substep overwrote it) is returned as this substep's
/// listener sample — matching the order the GPU backend reads back
/// listener taps in, before the compute dispatch that produces `next`.
///
/// # Panics
///
/// Panics if `prev`, `cur`, `next`, or `obstacle` do not all have length
/// `width * height`.
pub fn step_cpu(
    prev: &[f32],
    cur: &[f32],
    next: &mut [f32],
    obstacle: &[u8],
    width: u32,
    height: u32,
    dt: f32,
    params: &SimParams,
    preset: &DampingPreset,
    listener: Option<(u32, u32)>,
) -> Option<f32> {
    let len = (width as usize) * (height as usize);
    assert_eq!(prev.len(), len);
    assert_eq!(cur.len(), len);
    assert_eq!(next.len(), len);
    assert_eq!(obstacle.len(), len);

    let sample = listener.map(|(lx, ly)| cur[idx(lx, ly, width)]);

    let k = params.courant_squared(dt);
    let two_d = preset.two_d();
    let d = preset.d;

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let i = idx(x, y, width);
            if obstacle[i] != 0 {
                next[i] = 0.0;
                continue;
            }
            let neighbors = cur[idx(x + 1, y, width)]
                + cur[idx(x - 1, y, width)]
                + cur[idx(x, y + 1, width)]
                + cur[idx(x, y - 1, width)];
            next[i] = two_d * cur[i] - d * prev[i] + d * k * (neighbors - 4.0 * cur[i]);
        }
    }

    if preset.is_absorbing() {
        resolve_absorbing_boundary(cur, next, obstacle, width, height, params, dt);
    } else {
        resolve_reflective_boundary(next, obstacle, width, height, preset.r);
    }

    sample
}

fn resolve_reflective_boundary(next: &mut [f32], obstacle: &[u8], width: u32, height: u32, r: f32) {
    if width < 2 || height < 2 {
        return;
    }

    for x in 0..width {
        let inward_top = idx(x, 1, width);
        let top = idx(x, 0, width);
        next[top] = if obstacle[top] != 0 { 0.0 } else { r * next[inward_top] };

        let inward_bottom = idx(x, height - 2, width);
        let bottom = idx(x, height - 1, width);
        next[bottom] = if obstacle[bottom] != 0 { 0.0 } else { r * next[inward_bottom] };
    }

    for y in 0..height {
        let inward_left = idx(1, y, width);
        let left = idx(0, y, width);
        next[left] = if obstacle[left] != 0 { 0.0 } else { r * next[inward_left] };

        let inward_right = idx(width - 2, y, width);
        let right = idx(width - 1, y, width);
        next[right] = if obstacle[right] != 0 { 0.0 } else { r * next[inward_right] };
    }
}

fn resolve_absorbing_boundary(
    cur: &[f32],
    next: &mut [f32],
    obstacle: &[u8],
    width: u32,
    height: u32,
    params: &SimParams,
    dt: f32,
) {
    if width < 2 || height < 2 {
        return;
    }

    let a = (params.c * dt / params.dx).min(1.0);

    for x in 1..width.saturating_sub(1) {
        let top = idx(x, 0, width);
        let inward_top = idx(x, 1, width);
        next[top] = if obstacle[top] != 0 {
            0.0
        } else {
            cur[top] - a * (cur[top] - cur[inward_top])
        };

        let bottom = idx(x, height - 1, width);
        let inward_bottom = idx(x, height - 2, width);
        next[bottom] = if obstacle[bottom] != 0 {
            0.0
        } else {
            cur[bottom] - a * (cur[bottom] - cur[inward_bottom])
        };
    }

    for y in 1..height.saturating_sub(1) {
        let left = idx(0, y, width);
        let inward_left = idx(1, y, width);
        next[left] = if obstacle[left] != 0 {
            0.0
        } else {
            cur[left] - a * (cur[left] - cur[inward_left])
        };

        let right = idx(width - 1, y, width);
        let inward_right = idx(width - 2, y, width);
        next[right] = if obstacle[right] != 0 {
            0.0
        } else {
            cur[right] - a * (cur[right] - cur[inward_right])
        };
    }

    for &(cx, cy) in &[
        (0, 0),
        (width - 1, 0),
        (0, height - 1),
        (width - 1, height - 1),
    ] {
        next[idx(cx, cy, width)] = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(width: u32, height: u32) -> (Vec<f32>, Vec<f32>, Vec<f32>, Vec<u8>) {
        let len = (width * height) as usize;
        (vec![0.0; len], vec![0.0; len], vec![0.0; len], vec![0u8; len])
    }

    #[test]
    fn silent_field_stays_silent() {
        let (mut prev, mut cur, mut next, obstacle) = flat_field(16, 16);
        let params = SimParams::default();
        let preset = DampingPreset::realistic();
        for _ in 0..10 {
            step_cpu(
                &prev, &cur, &mut next, &obstacle, 16, 16, 1e-5, &params, &preset, None,
            );
            core::mem::swap(&mut prev, &mut cur);
            core::mem::swap(&mut cur, &mut next);
        }
        assert!(cur.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn obstacle_cell_stays_zero() {
        let (prev, mut cur, mut next, mut obstacle) = flat_field(8, 8);
        obstacle[idx(4, 4, 8)] = 1;
        cur[idx(4, 4, 8)] = 5.0; // pre-existing pressure should be clamped on the next substep
        let params = SimParams::default();
        let preset = DampingPreset::realistic();
        step_cpu(
            &prev, &cur, &mut next, &obstacle, 8, 8, 1e-5, &params, &preset, None,
        );
        assert_eq!(next[idx(4, 4, 8)], 0.0);
    }

    #[test]
    fn reflective_boundary_mirrors_inward_neighbor() {
        let (prev, cur, mut next, obstacle) = flat_field(8, 8);
        next[idx(3, 1, 8)] = 2.0;
        let preset = DampingPreset::custom(0.997, 0.85);
        resolve_reflective_boundary(&mut next, &obstacle, 8, 8, preset.r);
        assert!((next[idx(3, 0, 8)] - 1.7).abs() < 1e-6);
        let _ = (prev, cur);
    }

    #[test]
    fn absorbing_boundary_zeroes_corners() {
        let (_prev, cur, mut next, obstacle) = flat_field(8, 8);
        let params = SimParams::default();
        resolve_absorbing_boundary(&cur, &mut next, &obstacle, 8, 8, &params, 1e-5);
        assert_eq!(next[idx(0, 0, 8)], 0.0);
        assert_eq!(next[idx(7, 7, 8)], 0.0);
    }

    #[test]
    fn reflective_boundary_obstacle_cell_stays_zero() {
        let (prev, cur, mut next, mut obstacle) = flat_field(8, 8);
        obstacle[idx(3, 0, 8)] = 1;
        next[idx(3, 1, 8)] = 2.0;
        let preset = DampingPreset::custom(0.997, 0.85);
        resolve_reflective_boundary(&mut next, &obstacle, 8, 8, preset.r);
        assert_eq!(next[idx(3, 0, 8)], 0.0);
        let _ = (prev, cur);
    }

    #[test]
    fn absorbing_boundary_obstacle_cell_stays_zero() {
        let (_prev, mut cur, mut next, mut obstacle) = flat_field(8, 8);
        obstacle[idx(0, 3, 8)] = 1;
        cur[idx(0, 3, 8)] = 5.0;
        cur[idx(1, 3, 8)] = 1.0;
        let params = SimParams::default();
        resolve_absorbing_boundary(&cur, &mut next, &obstacle, 8, 8, &params, 1e-5);
        assert_eq!(next[idx(0, 3, 8)], 0.0);
    }

    #[test]
    fn boundary_obstacle_stays_zero_through_full_step() {
        let (prev, mut cur, mut next, mut obstacle) = flat_field(8, 8);
        obstacle[idx(0, 0, 8)] = 1;
        cur[idx(0, 0, 8)] = 5.0;
        cur[idx(1, 0, 8)] = 3.0;
        cur[idx(0, 1, 8)] = 3.0;
        let params = SimParams::default();
        let preset = DampingPreset::realistic();
        step_cpu(
            &prev, &cur, &mut next, &obstacle, 8, 8, 1e-5, &params, &preset, None,
        );
        assert_eq!(next[idx(0, 0, 8)], 0.0);
    }

    #[test]
    fn listener_sample_reads_cur_before_step() {
        let (prev, mut cur, mut next, obstacle) = flat_field(8, 8);
        cur[idx(2, 2, 8)] = 0.42;
        let params = SimParams::default();
        let preset = DampingPreset::realistic();
        let sample = step_cpu(
            &prev,
            &cur,
            &mut next,
            &obstacle,
            8,
            8,
            1e-5,
            &params,
            &preset,
            Some((2, 2)),
        );
        assert_eq!(sample, Some(0.42));
    }
}
