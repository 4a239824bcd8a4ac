//! Session configuration.

use std::time::Duration;

/// Default bound on the initial connect.
///
/// The transport's own 15 s connect timeout plus a 1 s margin.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(16);

/// Connect-time settings for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on opening the transport
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }
}

impl SessionConfig {
    /// Override the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
