//! Visibility culling and slice binning with adaptive repartitioning.
//!
//! One binning pass walks the command buffer, rejects commands the culling
//! volume or occluder proves invisible, and inserts each survivor into
//! every depth slice its view-direction extent overlaps. The observed
//! extent then drives the partition: when it disagrees with the active
//! slices, the partition is recomputed and binning reruns against it.
//! Because the discovered extent depends only on the commands and camera,
//! the loop settles after at most one repartition; the pass cap exists to
//! turn a violated producer contract into an error instead of a hang.

use stratum_cull::{DepthInterval, Intersection};

use crate::camera::{FrameContext, SceneMode};
use crate::command::{CommandBuffer, CommandId, CommandKind, DrawCommand, Pass};
use crate::error::SceneError;
use crate::slice::{FrustumSlice, MultiFrustum, slice_count};
use crate::stats::{FrameStatistics, FrustumDiagnostics};

/// Upper bound on binning passes within one frame. Exceeding it is a
/// configuration error, not a retry condition.
pub const MAX_BINNING_PASSES: usize = 8;

/// Extent and flags gathered by one binning pass.
struct BinningOutcome {
    near: f64,
    far: f64,
    unbounded_seen: bool,
}

/// Per-frame draw scheduler: owns the slice partition, the per-slice
/// buckets, the overlay list, and all reusable scratch storage.
#[derive(Debug, Default)]
pub struct FrustumScheduler {
    pub(crate) frustums: MultiFrustum,
    pub(crate) overlay: Vec<CommandId>,
    /// Cached per-command depth interval, indexed by command id. Reused
    /// across frames; also the sort key for translucent execution.
    pub(crate) intervals: Vec<DepthInterval>,
    pub(crate) diagnostics: Option<FrustumDiagnostics>,
}

impl FrustumScheduler {
    /// Create a scheduler with no active partition and diagnostics off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable overlap diagnostics and statistics.
    pub fn enable_diagnostics(&mut self, enabled: bool) {
        if enabled {
            if self.diagnostics.is_none() {
                self.diagnostics = Some(FrustumDiagnostics::new());
            }
        } else {
            self.diagnostics = None;
        }
    }

    /// Overlap diagnostics, when enabled.
    pub fn diagnostics(&self) -> Option<&FrustumDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Statistics for the most recently executed frame, when diagnostics
    /// are enabled.
    pub fn statistics(&self) -> Option<&FrameStatistics> {
        self.diagnostics.as_ref().map(FrustumDiagnostics::statistics)
    }

    /// The active depth slices, nearest first.
    pub fn slices(&self) -> &[FrustumSlice] {
        self.frustums.slices()
    }

    /// Overlay commands collected by the last binning pass, in submission
    /// order.
    pub fn overlay_commands(&self) -> &[CommandId] {
        &self.overlay
    }

    /// Cull the command buffer and bin survivors into depth slices,
    /// adapting the partition to the observed depth extent.
    ///
    /// Returns the number of binning passes used (1 when last frame's
    /// partition was reusable, 2 after a repartition). The command buffer
    /// must not change between passes; it is borrowed immutably for the
    /// whole call.
    pub fn cull_and_bin(
        &mut self,
        frame: &FrameContext<'_>,
        commands: &CommandBuffer,
    ) -> Result<usize, SceneError> {
        let ratio = frame.far_to_near_ratio;
        if !(ratio > 1.0) {
            return Err(SceneError::InvalidRatio(ratio));
        }
        let camera_near = frame.camera.frustum.near;
        let camera_far = frame.camera.frustum.far;
        if !(camera_near > 0.0) || camera_far <= camera_near {
            return Err(SceneError::InvalidDepthRange {
                near: camera_near,
                far: camera_far,
            });
        }

        for pass in 1..=MAX_BINNING_PASSES {
            let outcome = self.bin_once(frame, commands);

            let (near, far) = if outcome.unbounded_seen {
                // A command without bounds spans everything; the observed
                // extent is meaningless, so fall back to the camera range.
                (camera_near, camera_far)
            } else if outcome.near == f64::MAX {
                // No surviving bounded commands: keep last frame's
                // partition and never take a log of an empty extent.
                return Ok(pass);
            } else {
                let near = outcome.near.clamp(camera_near, camera_far);
                let far = outcome.far.clamp(near, camera_far);
                (near, far)
            };

            let count = slice_count(near, far, ratio);
            let slices = self.frustums.slices();
            let reusable = count == slices.len()
                && !slices.is_empty()
                && near >= slices[0].near()
                && far <= slices[slices.len() - 1].far();
            if reusable {
                return Ok(pass);
            }

            log::debug!("repartitioning into {count} slices over [{near:.3}, {far:.3}]");
            self.frustums.repartition(near, far, ratio, count);
        }

        Err(SceneError::RepartitionDiverged {
            passes: MAX_BINNING_PASSES,
        })
    }

    /// One culling/binning pass against the current partition.
    fn bin_once(&mut self, frame: &FrameContext<'_>, commands: &CommandBuffer) -> BinningOutcome {
        self.frustums.reset_buckets();
        self.overlay.clear();
        self.intervals.clear();
        self.intervals.resize(
            commands.len(),
            DepthInterval {
                start: 0.0,
                stop: 0.0,
            },
        );
        if let Some(diag) = &mut self.diagnostics {
            diag.reset(commands.len());
        }

        let camera = frame.camera;
        let mut near = f64::MAX;
        let mut far = f64::MIN;
        let mut unbounded_seen = false;

        for (id, command) in commands.iter() {
            if command.pass == Pass::Overlay {
                self.overlay.push(id);
                continue;
            }

            let interval = match command.bounding_volume {
                Some(volume) => {
                    if volume.radius < 0.0 {
                        log::warn!(
                            "dropping draw command with negative bounding radius {}",
                            volume.radius
                        );
                        continue;
                    }

                    if command.cull {
                        if frame.culling_volume.visibility(&volume) == Intersection::Outside {
                            continue;
                        }
                        if frame.mode == SceneMode::Scene3D
                            && let Some(occluder) = &frame.occluder
                            && !occluder.is_sphere_visible(&volume)
                        {
                            continue;
                        }
                    }

                    let interval =
                        volume.depth_interval(camera.position_wc, camera.direction_wc);
                    near = near.min(interval.start);
                    far = far.max(interval.stop);
                    interval
                }
                None => {
                    if command.kind != CommandKind::ClearDepth {
                        unbounded_seen = true;
                    }
                    DepthInterval {
                        start: camera.frustum.near,
                        stop: camera.frustum.far,
                    }
                }
            };

            self.intervals[id.index()] = interval;
            self.insert_into_bins(id, command, interval);
        }

        BinningOutcome {
            near,
            far,
            unbounded_seen,
        }
    }

    /// Insert a command into every slice its interval overlaps.
    ///
    /// Slices are sorted by near, so once the interval ends before a
    /// slice begins no later slice can overlap either.
    fn insert_into_bins(&mut self, id: CommandId, command: &DrawCommand, interval: DepthInterval) {
        let pass = match command.kind {
            CommandKind::ClearDepth => Pass::Opaque,
            CommandKind::Draw => command.pass,
        };

        for (index, slice) in self.frustums.slices_mut().iter_mut().enumerate() {
            if interval.start > slice.far() {
                continue;
            }
            if interval.stop < slice.near() {
                break;
            }

            slice.insert(pass, id);
            if let Some(diag) = &mut self.diagnostics {
                diag.record_overlap(id, index);
            }
            if command.execute_in_closest_frustum {
                break;
            }
        }
    }
}
