use super::commands::OutputFormat;
use cocktail_daemon::DaemonConfig;
use cocktail_types::CocktailResult;
use std::path::PathBuf;

pub async fn show_status(config_path: &PathBuf, data_dir: &PathBuf, format: &OutputFormat) -> CocktailResult<()> {
    let port = if config_path.exists() {
        DaemonConfig::load(config_path).map(|c| c.api.port).unwrap_or(cocktail_daemon::config::DEFAULT_API_PORT)
    } else {
        cocktail_daemon::config::DEFAULT_API_PORT
    };

    let url = format!("http://127.0.0.1:{port}/api/status");

    match reqwest::get(&url).await {
        Ok(response) if response.status().is_success() => {
            let status: serde_json::Value = response.json().await.unwrap_or_default();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status).unwrap()),
                OutputFormat::Text => {
                    println!("\x1b[38;5;46m* cocktaild: RUNNING\x1b[0m");
                    println!("\x1b[38;5;245m{}\x1b[0m", "=".repeat(50));
                    if let Some(queued) = status.get("queued_orders") {
                        println!("Queued orders:  \x1b[38;5;51m{}\x1b[0m", queued);
                    }
                    if let Some(total) = status.get("total_orders") {
                        println!("Total orders:   \x1b[38;5;51m{}\x1b[0m", total);
                    }
                    if let Some(recipes) = status.get("total_recipes") {
                        println!("Recipes:        \x1b[38;5;51m{}\x1b[0m", recipes);
                    }
                    if let Some(uptime) = status.get("uptime_secs") {
                        let secs = uptime.as_u64().unwrap_or(0);
                        println!("Uptime:         \x1b[38;5;51m{}h {}m {}s\x1b[0m", secs / 3600, (secs % 3600) / 60, secs % 60);
                    }
                    println!("\x1b[38;5;245m{}\x1b[0m", "=".repeat(50));
                }
            }
        }
        Ok(response) => {
            println!("\x1b[38;5;196m* cocktaild: ERROR\x1b[0m (API returned {})", response.status());
        }
        Err(_) => {
            println!("\x1b[38;5;245m* cocktaild: NOT RUNNING\x1b[0m");
            println!();
            println!("Start with: \x1b[38;5;51mcocktaild run\x1b[0m");
            let _ = data_dir;
        }
    }

    Ok(())
}
