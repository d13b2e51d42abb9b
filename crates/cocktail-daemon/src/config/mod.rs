mod api;
mod daemon;
mod logging;
mod system;
mod types;

pub use api::{ApiConfig, DEFAULT_API_PORT};
pub use daemon::DaemonConfig;
pub use logging::LoggingConfig;
pub use system::SystemConfig;
pub use types::LogLevel;
