//! Per-frame substep planning and the CPU dispatch loop.

use fathom_core::{DampingPreset, Field, Listener, SimParams, SourcePool};

/// Hard upper bound on substeps per frame. Exceeding the CFL-computed count
/// truncates to this value and signals overload; lost simulation time is
/// not recovered.
pub const MAX_SUBSTEPS: u32 = 1500;

/// The substep count and per-substep timestep chosen for one frame, plus
/// whether the CFL-computed count had to be truncated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstepPlan {
    /// Number of substeps this frame will run.
    pub n: u32,
    /// Per-substep timestep, `frame_duration / n`.
    pub dt: f32,
    /// Whether the CFL-computed substep count exceeded [`MAX_SUBSTEPS`] and
    /// was truncated.
    pub overloaded: bool,
    /// The substep count the CFL computation called for, before any
    /// truncation.
    pub requested: u32,
}

/// Computes `dt_max`, `N`, and `dt` for a frame of the given duration, per
/// the scheduler's fixed CFL safety factor.
pub fn plan_substeps(frame_duration: f32, params: &SimParams) -> SubstepPlan {
    let dt_max = params.max_stable_dt();
    let requested = (frame_duration / dt_max).ceil().max(1.0) as u32;
    let n = requested.min(MAX_SUBSTEPS);
    let dt = frame_duration / n as f32;
    SubstepPlan {
        n,
        dt,
        overloaded: requested > MAX_SUBSTEPS,
        requested,
    }
}

/// The margin, in pixels, to grow the active region by this frame: a
/// two-sided safety margin against wavefronts escaping the active window
/// within the frame.
pub fn active_region_margin(params: &SimParams, dt: f32, n: u32) -> u32 {
    let margin = 2.0 * params.c * dt / params.dx * n as f32;
    margin.ceil().max(0.0) as u32
}

/// Runs `plan.n` CPU substeps, injecting every playing source before each
/// substep and recording one listener sample per substep.
pub fn run_cpu_substeps(
    field: &mut Field,
    sources: &mut SourcePool,
    listener: &mut Listener,
    params: &SimParams,
    preset: &DampingPreset,
    plan: &SubstepPlan,
) {
    let listener_pos = listener.is_enabled().then(|| listener.position());

    for _ in 0..plan.n {
        for (_, source) in sources.iter_mut() {
            let pressure = source.sample_for_step(plan.dt);
            if pressure != 0.0 {
                let (x, y) = source.position_xy();
                field.inject(x, y, pressure);
            }
        }

        let sample = field.step(plan.dt, params, preset, listener_pos);
        if let Some(value) = sample {
            listener.push_sample(value);
        }
    }

    field.expand_active_region(active_region_margin(params, plan.dt, plan.n));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_substeps_uses_ceiling_division() {
        let params = SimParams::default();
        let dt_max = params.max_stable_dt();
        let plan = plan_substeps(dt_max * 2.5, &params);
        assert_eq!(plan.n, 3);
        assert!(!plan.overloaded);
    }

    #[test]
    fn plan_substeps_truncates_above_the_cap() {
        let params = SimParams::default();
        let dt_max = params.max_stable_dt();
        let plan = plan_substeps(dt_max * 10_000.0, &params);
        assert_eq!(plan.n, MAX_SUBSTEPS);
        assert!(plan.overloaded);
        assert!(plan.requested > MAX_SUBSTEPS);
    }

    #[test]
    fn run_cpu_substeps_fills_listener_to_n_samples() {
        let mut field = Field::new(32, 32);
        let mut sources = SourcePool::new();
        let mut listener = Listener::new(16, 16);
        let params = SimParams::default();
        let preset = DampingPreset::realistic();
        let plan = plan_substeps(0.01, &params);

        run_cpu_substeps(&mut field, &mut sources, &mut listener, &params, &preset, &plan);
        assert_eq!(listener.samples().len(), plan.n as usize);
    }

    #[test]
    fn disabled_listener_yields_no_samples() {
        let mut field = Field::new(32, 32);
        let mut sources = SourcePool::new();
        let mut listener = Listener::new(16, 16);
        listener.set_enabled(false);
        let params = SimParams::default();
        let preset = DampingPreset::realistic();
        let plan = plan_substeps(0.01, &params);

        run_cpu_substeps(&mut field, &mut sources, &mut listener, &params, &preset, &plan);
        assert_eq!(listener.samples().len(), 0);
    }
}
