use super::commands::Cli;
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, EnvFilter};

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "info,cocktail_daemon=debug",
            2 => "debug",
            _ => "trace",
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(ref log_file) = cli.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .expect("failed to open log file");
        let file_layer = fmt::layer().with_writer(std::sync::Mutex::new(file)).with_ansi(false);
        subscriber.with(file_layer).init();
    } else {
        let stdout_layer = fmt::layer().with_target(cli.verbose >= 2);
        subscriber.with(stdout_layer).init();
    }
}

pub fn print_banner() {
    println!("\x1b[38;5;46m");
    println!(
        r#"
     _____           _     _        _ _     _
    / ____|         | |   | |      (_) |   | |
   | |     ___   ___| | __| |_ __ _ _| | __| |
   | |    / _ \ / __| |/ _` | '__| | | |/ _` |
   | |___| (_) | (__| | (_| | |  | | | | (_| |
    \_____\___/ \___|_|\__,_|_|  |_|_|_|\__,_|"#
    );
    println!("\x1b[0m");
    println!("        \x1b[38;5;245mcocktail cell control core - v{}\x1b[0m", BUILD_VERSION);
    println!();
}
