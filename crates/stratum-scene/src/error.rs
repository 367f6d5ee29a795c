//! Scheduler error types.

/// Failure while executing a single draw command in the render backend.
///
/// The scheduler never absorbs these: the frame aborts and the error
/// surfaces to the per-frame caller, since resuming mid-slice with
/// partially updated GPU state is unsafe.
#[derive(Debug, thiserror::Error)]
#[error("draw command execution failed: {0}")]
pub struct ExecutionError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl ExecutionError {
    /// Wrap a backend-specific error.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

/// Errors raised by frame scheduling.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The far-to-near ratio cannot subdivide a depth range.
    #[error("far-to-near ratio must be greater than 1, got {0}")]
    InvalidRatio(f64),

    /// The camera depth range cannot be partitioned.
    #[error("camera depth range [{near}, {far}] must be positive and increasing")]
    InvalidDepthRange {
        /// Camera near plane distance.
        near: f64,
        /// Camera far plane distance.
        far: f64,
    },

    /// The adaptive repartition loop failed to settle, which means the
    /// partition inputs changed between passes over an untouched command
    /// buffer.
    #[error("frustum repartition did not settle after {passes} binning passes")]
    RepartitionDiverged {
        /// Number of binning passes attempted.
        passes: usize,
    },

    /// A backend execution failure, propagated unmodified.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
