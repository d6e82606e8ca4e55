use bodega_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    tracing::info!("bodega server starting...");

    let config = Config::from_env();
    let state = ServerState::initialize(&config);

    Server::with_state(config, state).run().await
}
