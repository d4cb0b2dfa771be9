//! Synchronizer configuration.

use std::time::Duration;

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Human-readable node name sent in hello messages.
    pub moniker: String,
    /// Maximum number of concurrently open sessions. This bounds how
    /// many catch-up conversations the node serves at once, independent
    /// of how many peers are asking.
    pub max_open_sessions: usize,
    /// Number of blocks carried per `MoreBlocks` response.
    pub block_per_message: u32,
    /// How far below our own height a non-full-history node still
    /// serves requests from.
    pub latest_block_interval: u32,
    /// Whether this node retains and serves the full history.
    pub full_history: bool,
    /// Open sessions older than this are abandoned on the next tick.
    pub session_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            moniker: String::from("basin-node"),
            max_open_sessions: 8,
            block_per_message: 60,
            latest_block_interval: 720,
            full_history: false,
            session_timeout: Duration::from_secs(10),
        }
    }
}
