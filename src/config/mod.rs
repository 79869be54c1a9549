mod settings;

pub use settings::{ReconnectConfig, Settings};
