//! Back-to-front execution of binned commands against a render backend.
//!
//! The backend trait is the GPU boundary: the scheduler decides ordering,
//! depth ranges, and depth-buffer handoff; the backend turns that into API
//! calls. Slices execute farthest first so nearer slices overwrite farther
//! depth, and each slice's depth is folded into a frame-wide accumulation
//! target before its depth buffer is cleared for the next slice.

use crate::binning::FrustumScheduler;
use crate::camera::FrameContext;
use crate::command::{CommandBuffer, CommandId, DrawCommand, OwnerId, Pass};
use crate::error::{ExecutionError, SceneError};

/// Inward bias applied to every slice's near plane except the nearest,
/// so adjacent slice depth ranges overlap slightly instead of seaming.
pub const NEAR_SEAM_BIAS: f64 = 0.99;

/// Diagnostic tint handed to the backend in place of the command's own
/// shading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugTint {
    /// RGB tint color, each channel in `[0, 1]`.
    pub color: [f32; 3],
}

impl DebugTint {
    /// Color a slice-overlap bitmask: red for slice 0, green for slice 1,
    /// blue for slice 2, additively.
    pub fn from_overlap_mask(mask: u32) -> Self {
        let channel = |bit: u32| if mask & bit != 0 { 1.0 } else { 0.0 };
        Self {
            color: [channel(0b001), channel(0b010), channel(0b100)],
        }
    }

    /// A stable pseudo-random color per command id (SplitMix64 finalizer).
    pub fn from_command_hash(id: CommandId) -> Self {
        let mut x = (id.index() as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        x ^= x >> 31;
        Self {
            color: [
                (x & 0xFF) as f32 / 255.0,
                ((x >> 8) & 0xFF) as f32 / 255.0,
                ((x >> 16) & 0xFF) as f32 / 255.0,
            ],
        }
    }
}

/// Which diagnostic tint to apply to executed commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TintMode {
    /// Tint by slice-overlap mask (requires diagnostics to be enabled).
    OverlapMask,
    /// Tint each command a stable pseudo-random color.
    CommandHash,
}

/// Optional cross-cutting hooks consulted during execution. All default
/// to off; the hot path pays nothing for absent hooks.
#[derive(Clone, Copy, Default)]
pub struct ExecutionOptions<'a> {
    /// Diagnostic tint applied to every executed command.
    pub tint: Option<TintMode>,
    /// Predicate over the command owner; commands it rejects are skipped.
    pub command_filter: Option<&'a dyn Fn(Option<OwnerId>) -> bool>,
    /// Redirect this slice's depth handoff to the inspectable debug target.
    pub inspect_depth_slice: Option<usize>,
}

/// The GPU-facing boundary executing scheduled work.
///
/// Implementations bind real API objects; the scheduler only dictates
/// order. Execution failures must be returned, not swallowed: the
/// scheduler aborts the frame on the first error because GPU state after
/// a partial slice is unreliable.
pub trait RenderBackend {
    /// Bind the frame's color/depth targets and clear color once.
    fn begin_frame(&mut self);

    /// Point the active projection at a depth range.
    fn set_depth_range(&mut self, near: f64, far: f64);

    /// Clear the depth buffer for the current slice.
    fn clear_depth(&mut self);

    /// Execute one draw command, optionally replacing its shading with a
    /// diagnostic tint.
    fn execute(
        &mut self,
        command: &DrawCommand,
        tint: Option<DebugTint>,
    ) -> Result<(), ExecutionError>;

    /// Fold the current slice's depth into the frame-wide accumulation
    /// target. `inspect` redirects it to the inspectable debug target
    /// instead.
    fn accumulate_depth(&mut self, slice_index: usize, inspect: bool);

    /// Copy the accumulated color/depth into the output framebuffer.
    fn composite(&mut self);
}

impl FrustumScheduler {
    /// Execute the binned frame: slices back-to-front, passes in order
    /// within each slice, translucent back-to-front within its pass, then
    /// overlay commands over the full camera range, then the composite.
    ///
    /// Stored slice ranges are never modified; the seam bias is applied to
    /// the projection only, so the recorded partition stays exact for the
    /// next frame's reuse decision.
    pub fn execute_frame<B: RenderBackend>(
        &mut self,
        frame: &FrameContext<'_>,
        commands: &CommandBuffer,
        backend: &mut B,
        options: &ExecutionOptions<'_>,
    ) -> Result<(), SceneError> {
        backend.begin_frame();

        for index in (0..self.frustums.len()).rev() {
            {
                let intervals = &self.intervals;
                self.frustums.slices_mut()[index]
                    .pass_commands_mut(Pass::Translucent)
                    .sort_by(|a, b| {
                        intervals[b.index()]
                            .start
                            .total_cmp(&intervals[a.index()].start)
                    });
            }

            let slice = &self.frustums.slices()[index];
            let far = slice.far();
            let near = if index == 0 {
                slice.near()
            } else {
                slice.near() * NEAR_SEAM_BIAS
            };
            backend.set_depth_range(near, far);
            backend.clear_depth();

            for pass in Pass::BINNED {
                for slot in 0..self.frustums.slices()[index].pass_count(pass) {
                    let id = self.frustums.slices()[index].pass_commands(pass)[slot];
                    self.execute_one(id, commands, backend, options)?;
                }
            }

            backend.accumulate_depth(index, options.inspect_depth_slice == Some(index));
        }

        // Overlay commands draw once over the whole camera range.
        backend.set_depth_range(frame.camera.frustum.near, frame.camera.frustum.far);
        for slot in 0..self.overlay.len() {
            let id = self.overlay[slot];
            self.execute_one(id, commands, backend, options)?;
        }

        backend.composite();
        Ok(())
    }

    fn execute_one<B: RenderBackend>(
        &mut self,
        id: CommandId,
        commands: &CommandBuffer,
        backend: &mut B,
        options: &ExecutionOptions<'_>,
    ) -> Result<(), SceneError> {
        let command = &commands[id];
        if let Some(filter) = options.command_filter
            && !filter(command.owner)
        {
            return Ok(());
        }

        backend.execute(command, self.tint_for(options.tint, id))?;
        if let Some(diag) = &mut self.diagnostics {
            diag.record_execution(id);
        }
        Ok(())
    }

    fn tint_for(&self, mode: Option<TintMode>, id: CommandId) -> Option<DebugTint> {
        match mode? {
            TintMode::OverlapMask => {
                let mask = self
                    .diagnostics
                    .as_ref()
                    .map_or(0, |diag| diag.overlap_mask(id));
                Some(DebugTint::from_overlap_mask(mask))
            }
            TintMode::CommandHash => Some(DebugTint::from_command_hash(id)),
        }
    }
}
