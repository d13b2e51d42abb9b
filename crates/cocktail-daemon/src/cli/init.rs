use std::path::PathBuf;

use cocktail_daemon::DaemonConfig;
use cocktail_types::{CocktailError, CocktailResult};

pub fn init_daemon(config_path: &PathBuf, data_dir: &PathBuf, force: bool) -> CocktailResult<()> {
    println!("\x1b[38;5;46mInitializing cocktaild...\x1b[0m");
    println!();

    if config_path.exists() && !force {
        println!("\x1b[38;5;226mConfiguration already exists at {:?}\x1b[0m", config_path);
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)
        .map_err(|e| CocktailError::Config(format!("failed to create data directory: {e}")))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CocktailError::Config(format!("failed to create config directory: {e}")))?;
    }

    let mut config = DaemonConfig::default();
    config.data_dir = data_dir.clone();
    config.validate()?;
    config.save(config_path)?;

    println!();
    println!("\x1b[38;5;46m======================================================================\x1b[0m");
    println!("\x1b[1;38;5;46m  cocktaild initialized\x1b[0m");
    println!("\x1b[38;5;46m======================================================================\x1b[0m");
    println!();
    println!("  \x1b[38;5;245mConfig:\x1b[0m  \x1b[38;5;51m{}\x1b[0m", config_path.display());
    println!("  \x1b[38;5;245mData:\x1b[0m    \x1b[38;5;51m{}\x1b[0m", data_dir.display());
    println!();
    println!("\x1b[38;5;226mNext steps:\x1b[0m");
    println!("  1. Set robot_address and pump_serial_port in config.toml");
    println!("  2. Start the daemon:  \x1b[38;5;51mcocktaild run\x1b[0m");
    println!("  3. Check status:      \x1b[38;5;51mcocktaild status\x1b[0m");
    println!();
    println!("\x1b[38;5;46m======================================================================\x1b[0m");

    Ok(())
}
