//! Per-frame visibility and draw scheduling for planet-scale scenes.
//!
//! A single depth buffer cannot cover sub-meter and planetary geometry at
//! once, so the camera's depth range is partitioned into a stack of
//! logarithmic frustum slices. Each frame, producers append draw commands
//! to a shared [`CommandBuffer`]; the [`FrustumScheduler`] culls them, bins
//! each survivor into every slice its depth extent overlaps, adapts the
//! partition to the observed extent, and executes the buckets back-to-front
//! through a [`RenderBackend`] with a depth-buffer handoff between slices.

pub mod binning;
pub mod camera;
pub mod command;
pub mod error;
pub mod executor;
pub mod slice;
pub mod stats;

pub use binning::{FrustumScheduler, MAX_BINNING_PASSES};
pub use camera::{Camera, FrameContext, SceneMode};
pub use command::{CommandBuffer, CommandId, CommandKind, DrawCommand, OwnerId, Pass};
pub use error::{ExecutionError, SceneError};
pub use executor::{DebugTint, ExecutionOptions, NEAR_SEAM_BIAS, RenderBackend, TintMode};
pub use slice::{FrustumSlice, MultiFrustum, slice_count};
pub use stats::{FrameStatistics, FrustumDiagnostics};
