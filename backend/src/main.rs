// Solarlead Server entrypoint
//!
//! Component construction and HTTP wiring live in `lifecycle` so this file
//! stays a thin orchestrator.

use anyhow::Result;
use log::info;
use solarlead_configs::ServerConfig;
use solarlead_server::lifecycle::{bootstrap, run};
use solarlead_server::logging;
use std::env;

const DEFAULT_CONFIG_PATH: &str = "server.toml";

#[actix_web::main]
async fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to load {}: {:#}", config_path, e);
            eprintln!("❌ Server cannot start without valid configuration");
            std::process::exit(1);
        },
    };

    // Logging before any other side effects
    let server_log_path = format!("{}/server.log", config.logging.logs_path);
    logging::init_logging(
        &config.logging.level,
        &server_log_path,
        config.logging.log_to_console,
        Some(&config.logging.targets),
        &config.logging.format,
    )?;

    info!("╔═══════════════════════════════════════════════════════════════╗");
    info!("║           Solarlead Server v{:<34} ║", env!("CARGO_PKG_VERSION"));
    info!("╠═══════════════════════════════════════════════════════════════╣");
    info!("║  Commit:     {:<49} ║", env!("GIT_COMMIT_HASH"));
    info!("║  Branch:     {:<49} ║", env!("GIT_BRANCH"));
    info!("╚═══════════════════════════════════════════════════════════════╝");
    info!("Config: {}", config_path);
    info!("Host: {}  Port: {}", config.server.host, config.server.port);

    if !config.auth.cookie_secure {
        log::warn!("Session cookies are sent without the Secure flag; use only for local development");
    }

    let components = bootstrap(&config)?;
    run(&config, components).await
}

fn load_config(path: &str) -> Result<ServerConfig> {
    let mut config = ServerConfig::load_or_default(path)?;
    config.apply_env_overrides()?;
    config.finalize()?;
    Ok(config)
}
