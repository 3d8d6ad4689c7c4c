use std::net::SocketAddr;

use team_service_server::{app_with_state, config, state::AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = config::read_config();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging_config))
        .init();

    let state = AppState::new(&config.db_url).await;
    let app = app_with_state(state).await;

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!("Listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
