use cipherswarm_core::liveness::LivenessPolicy;

/// Default width of a device performance bucket.
pub const DEFAULT_DEVICE_BUCKET_SECS: i64 = 600;

/// Tunables for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Width of the rolling device performance buckets, in seconds.
    pub device_bucket_secs: i64,
    /// Liveness reaping policy; `None` disables the monitor.
    pub liveness: Option<LivenessPolicy>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            device_bucket_secs: DEFAULT_DEVICE_BUCKET_SECS,
            liveness: None,
        }
    }
}
