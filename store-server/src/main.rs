use anyhow::Context;
use store_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env) and logging
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );

    print_banner();
    tracing::info!(environment = %config.environment, "Store server starting...");

    // 2. Open the store and build services
    let state = ServerState::initialize(&config).context("failed to initialize server state")?;

    // 3. Serve HTTP until Ctrl-C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
