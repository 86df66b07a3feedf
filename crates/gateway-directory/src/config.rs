//! Directory configuration.

/// Default largest accepted encoded node status: 4MB.
pub const DEFAULT_MAX_STATUS_SIZE: usize = 4 * 1024 * 1024;

/// Configuration for a [`GatewayNodeManager`](crate::GatewayNodeManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Fixed instance id advertised in every status.
    /// A random UUID is generated when unset.
    pub uuid: Option<String>,
    /// Starting value of the local status sequence.
    /// Derived from wall-clock seconds when unset.
    pub initial_seq: Option<u32>,
    /// Largest encoded status accepted from a peer.
    pub max_status_size: usize,
}

impl GatewayConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            uuid: None,
            initial_seq: None,
            max_status_size: DEFAULT_MAX_STATUS_SIZE,
        }
    }

    /// Set the instance id.
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Set the starting sequence.
    #[must_use]
    pub const fn with_initial_seq(mut self, seq: u32) -> Self {
        self.initial_seq = Some(seq);
        self
    }

    /// Set the largest accepted status size.
    #[must_use]
    pub const fn with_max_status_size(mut self, size: usize) -> Self {
        self.max_status_size = size;
        self
    }

    /// Check if an encoded status size is within the allowed limit.
    #[must_use]
    pub const fn is_status_size_valid(&self, size: usize) -> bool {
        size <= self.max_status_size
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new()
    }
}
