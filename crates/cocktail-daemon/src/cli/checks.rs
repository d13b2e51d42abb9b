use std::path::PathBuf;

use cocktail_daemon::{Application, DaemonConfig};
use cocktail_types::CocktailResult;

pub async fn run_checks(config_path: &PathBuf, data_dir: &PathBuf) -> CocktailResult<()> {
    println!("\x1b[38;5;46mcocktaild diagnostics\x1b[0m");
    println!("\x1b[38;5;245m{}\x1b[0m", "=".repeat(50));
    println!();

    let mut config = if config_path.exists() {
        DaemonConfig::load(config_path)?
    } else {
        println!("\x1b[38;5;226mno config.toml found, checking against defaults\x1b[0m");
        DaemonConfig::default()
    };
    config.data_dir = data_dir.clone();
    config.api.enabled = false;

    let app = Application::new(config)?;
    let report = app.diagnose().await;

    for (name, result) in report.checks() {
        let (symbol, color) = match result {
            r if r.is_pass() => ("OK  ", "38;5;46"),
            r if r.is_fail() => ("FAIL", "38;5;196"),
            _ => ("WARN", "38;5;226"),
        };
        println!("[\x1b[{color}m{symbol}\x1b[0m] {name}: {}", result.message());
    }

    println!();
    println!("\x1b[38;5;245m{}\x1b[0m", "=".repeat(50));
    println!("Summary: {}", report.summary());

    if report.has_failures() {
        println!("\n\x1b[38;5;196mSome checks failed. Fix issues before running.\x1b[0m");
    } else if !report.all_passed() {
        println!("\n\x1b[38;5;226mAll critical checks passed. Some warnings may need attention.\x1b[0m");
    } else {
        println!("\n\x1b[38;5;46mAll checks passed! Ready to run.\x1b[0m");
    }

    Ok(())
}
