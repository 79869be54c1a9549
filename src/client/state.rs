use crate::infrastructure::TaskManager;
use tokio::task::JoinHandle;

/// Consolidated mutable state for RealtimeClient
/// Using a single struct keeps state transitions atomic
pub struct ClientState {
    /// Retries made since the last successful connection
    pub reconnect_attempts: u32,

    /// Bumped by every explicit disconnect; attempts and sessions started
    /// under an older epoch are stale
    pub epoch: u64,

    /// Timer task of the scheduled retry (if any)
    pub pending_reconnect: Option<JoinHandle<()>>,

    /// Session tasks (inbound reader and heartbeat)
    pub task_manager: TaskManager,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            reconnect_attempts: 0,
            epoch: 0,
            pending_reconnect: None,
            task_manager: TaskManager::new(),
        }
    }

    /// Abort the scheduled retry, if one is waiting
    pub fn cancel_pending_reconnect(&mut self) {
        if let Some(handle) = self.pending_reconnect.take() {
            handle.abort();
            tracing::debug!("Cancelled pending reconnect");
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
