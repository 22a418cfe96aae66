//! Blog server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p blog-server
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use blog_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {}", e);
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        retention_days = config.retention.days,
        "Configuration loaded"
    );

    if let Err(e) = blog_server::run(config).await {
        error!(error = %e, subsystem = e.subsystem(), "Server failed");
        std::process::exit(1);
    }
}
