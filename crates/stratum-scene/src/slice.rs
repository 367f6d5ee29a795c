//! Depth slices and the logarithmic frustum partitioner.
//!
//! The camera's `[near, far]` range is covered by slices whose `far / near`
//! never exceeds the configured ratio, so depth precision stays usable from
//! sub-meter foreground out to planetary distances. Slice storage and the
//! per-pass buckets inside each slice are reused across frames by index:
//! repartitioning rewrites `near`/`far` in place, and resetting a bucket
//! only zeroes its count.

use crate::command::{CommandId, Pass};

/// Number of slices needed so each stays within `ratio`, floored at one
/// for any non-empty extent.
///
/// Callers guarantee `0 < near <= far` and `ratio > 1`.
pub fn slice_count(near: f64, far: f64, ratio: f64) -> usize {
    let count = ((far / near).ln() / ratio.ln()).ceil();
    (count as usize).max(1)
}

/// One depth sub-range of the view volume with its per-pass command buckets.
#[derive(Debug)]
pub struct FrustumSlice {
    near: f64,
    far: f64,
    buckets: [Vec<CommandId>; Pass::COUNT],
    counts: [usize; Pass::COUNT],
}

impl FrustumSlice {
    fn empty() -> Self {
        Self {
            near: 0.0,
            far: 0.0,
            buckets: Default::default(),
            counts: [0; Pass::COUNT],
        }
    }

    /// Near distance of this slice.
    pub fn near(&self) -> f64 {
        self.near
    }

    /// Far distance of this slice.
    pub fn far(&self) -> f64 {
        self.far
    }

    /// Commands bucketed for `pass`, in insertion order.
    ///
    /// Bounded by the live count, never the bucket's allocated length, so
    /// stale entries from previous frames are unreachable.
    pub fn pass_commands(&self, pass: Pass) -> &[CommandId] {
        &self.buckets[pass.index()][..self.counts[pass.index()]]
    }

    /// Number of commands bucketed for `pass`.
    pub fn pass_count(&self, pass: Pass) -> usize {
        self.counts[pass.index()]
    }

    pub(crate) fn pass_commands_mut(&mut self, pass: Pass) -> &mut [CommandId] {
        let count = self.counts[pass.index()];
        &mut self.buckets[pass.index()][..count]
    }

    pub(crate) fn set_range(&mut self, near: f64, far: f64) {
        self.near = near;
        self.far = far;
    }

    pub(crate) fn reset(&mut self) {
        self.counts = [0; Pass::COUNT];
    }

    /// Append `id` to the bucket for `pass`, overwriting a stale slot when
    /// one is available.
    pub(crate) fn insert(&mut self, pass: Pass, id: CommandId) {
        let p = pass.index();
        let slot = self.counts[p];
        if slot < self.buckets[p].len() {
            self.buckets[p][slot] = id;
        } else {
            self.buckets[p].push(id);
        }
        self.counts[p] = slot + 1;
    }
}

/// The reusable stack of depth slices covering the camera's depth range.
///
/// The backing storage only grows; `active` bounds how many slices the
/// current partition uses, so shrinking a partition never drops buckets.
#[derive(Debug, Default)]
pub struct MultiFrustum {
    slices: Vec<FrustumSlice>,
    active: usize,
}

impl MultiFrustum {
    /// Create an empty multi-frustum.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active slices, in increasing-near order.
    pub fn slices(&self) -> &[FrustumSlice] {
        &self.slices[..self.active]
    }

    /// Number of active slices.
    pub fn len(&self) -> usize {
        self.active
    }

    /// Whether no slices are active.
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    pub(crate) fn slices_mut(&mut self) -> &mut [FrustumSlice] {
        &mut self.slices[..self.active]
    }

    /// Recompute the partition over `[near, far]` in place.
    ///
    /// Slice `m` covers `[max(near, ratio^m * near), min(far, ratio * near_m)]`,
    /// a logarithmic progression whose last slice is clamped to `far`.
    /// Re-invoking with identical arguments rewrites the same values into
    /// the same storage and allocates nothing.
    pub(crate) fn repartition(&mut self, near: f64, far: f64, ratio: f64, count: usize) {
        if self.slices.len() < count {
            self.slices.resize_with(count, FrustumSlice::empty);
        }
        self.active = count;

        for m in 0..count {
            let cur_near = near.max(ratio.powi(m as i32) * near);
            let cur_far = far.min(ratio * cur_near);
            self.slices[m].set_range(cur_near, cur_far);
        }
    }

    /// Zero every active slice's bucket counts for a fresh binning pass.
    pub(crate) fn reset_buckets(&mut self) {
        for slice in &mut self.slices[..self.active] {
            slice.reset();
        }
    }
}
