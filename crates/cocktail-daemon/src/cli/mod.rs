pub mod checks;
pub mod commands;
pub mod config_cmd;
pub mod init;
pub mod run;
pub mod status;
pub mod utils;

pub use commands::{Cli, Commands, ConfigAction, OutputFormat};
pub use utils::init_logging;
