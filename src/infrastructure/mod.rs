// Infrastructure module - Core background services and utilities
pub mod endpoint;
pub mod heartbeat;
pub mod task_manager;
pub mod timer;

pub use endpoint::to_ws_endpoint;
pub use heartbeat::{HeartbeatManager, HeartbeatTick};
pub use task_manager::TaskManager;
pub use timer::Backoff;
