//! The simulator facade: the single `Simulator` object instance state for
//! field, sources, listener, presets, and backend selection lives on, and
//! the control-surface methods external callers (CLI, GUI) drive it with.

use std::sync::Arc;

use fathom_core::{
    ContinuousSource, DampingPreset, Field, Listener, Sample, SimParams, SourceHandle, SourcePool,
};

use crate::error::EngineError;
use crate::scheduler::{self, SubstepPlan};

/// Which path the scheduler dispatches substeps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Run substeps on the CPU via [`fathom_core::stepper::step_cpu`].
    Cpu,
    /// Run substeps on the GPU backend, with CPU fallback on failure.
    Gpu,
}

/// Per-frame statistics returned by [`Simulator::advance`], useful for
/// diagnostics and the CLI's `bench` subcommand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// The substep plan this frame actually ran.
    pub plan: SubstepPlan,
    /// Which backend ran the substeps.
    pub backend: Backend,
}

/// Owns the field, source pool, listener, and damping preset, and exposes
/// every command in the control surface as a method evaluated at a frame
/// boundary.
///
/// `!Sync` by convention: only the thread that owns the simulator calls
/// `advance`. The listener's per-frame sample vector is the only thing
/// that crosses to the audio thread, and it does so by being moved into
/// the audio bridge once per frame, not by sharing the simulator itself.
pub struct Simulator {
    field: Field,
    sources: SourcePool,
    listener: Listener,
    params: SimParams,
    preset: DampingPreset,
    backend: Backend,
    was_overloaded: bool,
    #[cfg(feature = "gpu")]
    gpu_backend: Option<(u32, u32, fathom_gpu::GpuBackend)>,
}

impl Simulator {
    /// Creates a simulator over a silent `width x height` field with the
    /// realistic preset, default physical parameters, an enabled listener
    /// at the grid center, and the CPU backend.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            field: Field::new(width, height),
            sources: SourcePool::new(),
            listener: Listener::new(width / 2, height / 2),
            params: SimParams::default(),
            preset: DampingPreset::realistic(),
            backend: Backend::Cpu,
            was_overloaded: false,
            #[cfg(feature = "gpu")]
            gpu_backend: None,
        }
    }

    /// Read-only access to the field (for rendering/recording feeds).
    #[inline]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Currently active damping preset.
    #[inline]
    pub const fn preset(&self) -> &DampingPreset {
        &self.preset
    }

    /// Currently active physical parameters.
    #[inline]
    pub const fn params(&self) -> &SimParams {
        &self.params
    }

    /// Currently selected backend.
    #[inline]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    // -- control surface: impulses and obstacles -------------------------

    /// Injects a Gaussian pressure impulse. See [`Field::add_impulse`].
    pub fn add_impulse(&mut self, x: u32, y: u32, pressure: f32, radius: i32) -> Result<(), EngineError> {
        self.field.add_impulse(x, y, pressure, radius)?;
        Ok(())
    }

    /// Marks a disc of cells as rigid obstacles. See
    /// [`Field::add_obstacle`].
    pub fn add_obstacle(&mut self, x: u32, y: u32, radius: i32) -> Result<(), EngineError> {
        self.field.add_obstacle(x, y, radius)?;
        Ok(())
    }

    /// Clears obstacle status within a disc. See [`Field::remove_obstacle`].
    pub fn remove_obstacle(&mut self, x: u32, y: u32, radius: i32) -> Result<(), EngineError> {
        self.field.remove_obstacle(x, y, radius)?;
        Ok(())
    }

    /// Removes every obstacle.
    pub fn clear_obstacles(&mut self) {
        self.field.clear_obstacles();
    }

    /// Replaces the obstacle mask wholesale. See
    /// [`Field::load_obstacles_from_mask`].
    pub fn load_obstacles(&mut self, mask: &[u8]) -> Result<(), EngineError> {
        self.field.load_obstacles_from_mask(mask)?;
        Ok(())
    }

    /// Zeroes all pressure buffers and resets the active region, leaving
    /// obstacles untouched.
    pub fn clear_waves(&mut self) {
        self.field.clear();
    }

    // -- control surface: listener ---------------------------------------

    /// Moves the listener to new grid coordinates.
    pub fn set_listener_position(&mut self, x: u32, y: u32) {
        self.listener.set_position(x, y);
    }

    /// Enables or disables listener recording.
    pub fn set_listener_enabled(&mut self, enabled: bool) {
        self.listener.set_enabled(enabled);
    }

    // -- control surface: audio sources -----------------------------------

    /// Adds a continuous audio source at `(x, y)` and returns a handle to
    /// it.
    pub fn add_source(&mut self, sample: Arc<Sample>, x: u32, y: u32) -> SourceHandle {
        self.sources.add_source(ContinuousSource::new(sample, x, y))
    }

    /// Removes a source by handle.
    pub fn remove_source(&mut self, handle: SourceHandle) {
        self.sources.remove_source(handle);
    }

    /// Removes every source.
    pub fn clear_sources(&mut self) {
        self.sources.clear_sources();
    }

    /// Pauses or resumes a source by handle. A no-op if the handle is
    /// stale.
    pub fn set_source_playing(&mut self, handle: SourceHandle, playing: bool) {
        if let Some(source) = self.sources.get_mut(handle) {
            if playing {
                source.play();
            } else {
                source.pause();
            }
        }
    }

    // -- control surface: physical parameters -----------------------------

    /// Sets the wave speed, in meters per second.
    pub fn set_wave_speed(&mut self, c: f32) {
        self.params.c = c;
    }

    /// Applies a damping preset by value.
    pub fn apply_preset(&mut self, preset: DampingPreset) {
        self.preset = preset;
    }

    /// Applies a damping preset by name (`"realistic"`, `"visualization"`,
    /// `"anechoic"`), or a custom `(d, r)` pair via a non-matching name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPreset`] if `name` matches none of
    /// the three named presets.
    pub fn apply_preset_by_name(&mut self, name: &str) -> Result<(), EngineError> {
        self.preset = match name {
            "realistic" => DampingPreset::realistic(),
            "visualization" => DampingPreset::visualization(),
            "anechoic" => DampingPreset::anechoic(),
            other => return Err(EngineError::UnknownPreset(other.to_string())),
        };
        Ok(())
    }

    /// Selects the CPU or GPU backend. Toggling to a backend that turns
    /// out to be unavailable is reported via [`Simulator::advance`]'s
    /// result, not here — the toggle always succeeds, and the fallback
    /// happens at the next frame if needed.
    pub fn set_backend(&mut self, backend: Backend) {
        self.backend = backend;
    }

    /// Resizes the grid, discarding obstacles and sources and preserving
    /// the listener's position proportionally to the new dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (old_w, old_h) = self.field.dims();
        let (lx, ly) = self.listener.position();
        let new_x = if old_w == 0 { width / 2 } else { (lx as u64 * width as u64 / old_w as u64) as u32 };
        let new_y = if old_h == 0 { height / 2 } else { (ly as u64 * height as u64 / old_h as u64) as u32 };

        self.field = Field::new(width, height);
        self.sources.clear_sources();
        self.listener.set_position(new_x.min(width.saturating_sub(1)), new_y.min(height.saturating_sub(1)));
        #[cfg(feature = "gpu")]
        {
            self.gpu_backend = None;
        }
    }

    // -- frame advance -----------------------------------------------------

    /// Advances the simulation by one frame of `frame_duration` seconds:
    /// clears the listener's per-frame buffer, computes the substep plan,
    /// drives the selected backend, and returns statistics about the
    /// frame.
    ///
    /// Substep-count overload is reported exactly once per transition
    /// (entering and leaving overload), not once per frame, via
    /// `tracing::warn!`.
    pub fn advance(&mut self, frame_duration: f32) -> FrameStats {
        self.listener.clear_frame();

        let plan = scheduler::plan_substeps(frame_duration, &self.params);

        if plan.overloaded && !self.was_overloaded {
            tracing::warn!(
                requested = plan.requested,
                capped = plan.n,
                "frame substep count exceeded the cap; entering overload"
            );
        } else if !plan.overloaded && self.was_overloaded {
            tracing::info!("frame substep count back within the cap; leaving overload");
        }
        self.was_overloaded = plan.overloaded;

        let backend = self.run_backend(&plan);

        FrameStats { plan, backend }
    }

    fn run_backend(&mut self, plan: &SubstepPlan) -> Backend {
        match self.backend {
            #[cfg(feature = "gpu")]
            Backend::Gpu => {
                if self.try_run_gpu(plan) {
                    return Backend::Gpu;
                }
                tracing::warn!("GPU backend unavailable this frame; falling back to CPU");
                self.run_cpu(plan);
                Backend::Cpu
            }
            #[cfg(not(feature = "gpu"))]
            Backend::Gpu => {
                tracing::debug!(
                    "GPU backend requested but this build was compiled without the `gpu` feature; falling back to CPU"
                );
                self.run_cpu(plan);
                Backend::Cpu
            }
            Backend::Cpu => {
                self.run_cpu(plan);
                Backend::Cpu
            }
        }
    }

    fn run_cpu(&mut self, plan: &SubstepPlan) {
        scheduler::run_cpu_substeps(
            &mut self.field,
            &mut self.sources,
            &mut self.listener,
            &self.params,
            &self.preset,
            plan,
        );
    }

    /// Attempts to run this frame's substeps on the GPU backend, lazily
    /// acquiring or re-acquiring it if the field was resized since the last
    /// GPU frame. Returns `false` (leaving `field`/`sources`/`listener`
    /// untouched) if no adapter is available or the frame failed to encode,
    /// so the caller can fall back to the CPU path for this frame only.
    #[cfg(feature = "gpu")]
    fn try_run_gpu(&mut self, plan: &SubstepPlan) -> bool {
        let (width, height) = self.field.dims();

        let margin = scheduler::active_region_margin(&self.params, plan.dt, plan.n);
        self.field.expand_active_region(margin);
        let (offset_x, offset_y, win_w, win_h) = match self.field.active_region().bounds() {
            Some((x0, y0, x1, y1)) => (x0, y0, x1 - x0 + 1, y1 - y0 + 1),
            None => (0, 0, width, height),
        };

        let needs_new_backend = !matches!(&self.gpu_backend, Some((w, h, _)) if *w == width && *h == height);
        if needs_new_backend {
            match fathom_gpu::GpuBackend::try_new(width, height) {
                Ok(backend) => self.gpu_backend = Some((width, height, backend)),
                Err(error) => {
                    tracing::warn!(%error, "failed to acquire GPU backend");
                    return false;
                }
            }
        }

        let listener_pos = self.listener.is_enabled().then(|| self.listener.position());
        let gpu_plan = fathom_gpu::GpuFramePlan {
            n: plan.n,
            dt: plan.dt,
            listener: listener_pos,
            active_window: (offset_x, offset_y, win_w, win_h),
        };

        let Some((_, _, backend)) = self.gpu_backend.as_mut() else {
            return false;
        };

        match backend.run_frame(
            &mut self.field,
            &mut self.sources,
            &self.preset,
            &self.params,
            &gpu_plan,
        ) {
            Ok(samples) => {
                self.listener.push_samples(&samples);
                true
            }
            Err(error) => {
                tracing::warn!(%error, "GPU frame encode failed");
                false
            }
        }
    }

    /// Takes ownership of this frame's listener samples, for handoff to an
    /// audio bridge.
    pub fn take_listener_frame(&mut self) -> Vec<f32> {
        self.listener.take_frame()
    }
}
