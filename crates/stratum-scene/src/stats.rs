//! Frustum overlap diagnostics and per-frame statistics.
//!
//! Diagnostics are opt-in and live outside the binning hot path: the
//! scheduler records into them only when they are enabled.

use rustc_hash::FxHashMap;

use crate::command::CommandId;

/// Aggregate statistics for one executed frame.
#[derive(Clone, Debug, Default)]
pub struct FrameStatistics {
    /// Number of command executions, counting a command once per slice it
    /// ran in (plus overlay executions).
    pub total_commands: usize,
    /// Histogram of overlap patterns: slice-occupancy bitmask to the number
    /// of executions with that mask.
    pub commands_in_frustums: FxHashMap<u32, usize>,
}

/// Per-command overlap masks plus the frame statistics built from them.
#[derive(Debug, Default)]
pub struct FrustumDiagnostics {
    masks: Vec<u32>,
    stats: FrameStatistics,
}

impl FrustumDiagnostics {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Which slices the command was inserted into, as a bitmask with bit
    /// `i` set for slice `i`. Slices past bit 31 are not recorded.
    pub fn overlap_mask(&self, id: CommandId) -> u32 {
        self.masks.get(id.index()).copied().unwrap_or(0)
    }

    /// Statistics for the most recently executed frame.
    pub fn statistics(&self) -> &FrameStatistics {
        &self.stats
    }

    pub(crate) fn reset(&mut self, command_count: usize) {
        self.masks.clear();
        self.masks.resize(command_count, 0);
        self.stats.total_commands = 0;
        self.stats.commands_in_frustums.clear();
    }

    pub(crate) fn record_overlap(&mut self, id: CommandId, slice_index: usize) {
        if slice_index < u32::BITS as usize {
            self.masks[id.index()] |= 1 << slice_index;
        }
    }

    pub(crate) fn record_execution(&mut self, id: CommandId) {
        let mask = self.overlap_mask(id);
        self.stats.total_commands += 1;
        *self.stats.commands_in_frustums.entry(mask).or_insert(0) += 1;
    }
}
