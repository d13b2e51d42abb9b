use std::path::PathBuf;

use cocktail_daemon::{Application, DaemonConfig};
use cocktail_types::CocktailResult;
use tracing::info;

use super::utils::print_banner;

pub async fn run_daemon(config_path: &PathBuf, data_dir: &PathBuf, fake_system: bool) -> CocktailResult<()> {
    print_banner();
    info!("starting cocktaild v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if config_path.exists() {
        info!(path = ?config_path, "loading configuration");
        DaemonConfig::load(config_path)?
    } else {
        info!("no configuration file found, using defaults");
        DaemonConfig::default()
    };

    config.data_dir = data_dir.clone();
    if fake_system {
        config.fake_system = true;
    }

    let mut app = Application::new(config)?;
    app.start().await?;

    print_ready_message(&app);

    wait_for_shutdown().await;

    info!("shutting down...");
    app.stop().await?;
    info!("shutdown complete");
    Ok(())
}

fn print_ready_message(app: &Application) {
    let config = app.config();
    println!();
    println!("\x1b[38;5;46m======================================================================\x1b[0m");
    println!("\x1b[1;38;5;46m  cocktaild is now running\x1b[0m");
    println!("\x1b[38;5;46m======================================================================\x1b[0m");
    if config.api.enabled {
        println!("  API:   \x1b[38;5;51mhttp://{}:{}\x1b[0m", config.api.bind_address, config.api.port);
    } else {
        println!("  API:   \x1b[38;5;245mdisabled\x1b[0m");
    }
    println!("  Robot: \x1b[38;5;51m{}\x1b[0m", config.robot_address);
    println!("  Pump:  \x1b[38;5;51m{}\x1b[0m", config.pump_serial_port);
    if config.fake_system {
        println!("  Mode:  \x1b[38;5;226mfake_system (no hardware attached)\x1b[0m");
    }
    println!();
    println!("  \x1b[38;5;245mPress Ctrl+C to stop\x1b[0m");
    println!("\x1b[38;5;46m======================================================================\x1b[0m");
    println!();
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => { info!("received SIGTERM"); }
            _ = sigint.recv() => { info!("received SIGINT"); }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C");
    }
}
