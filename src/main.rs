use std::sync::Arc;

use grino_uploads::config::ServerConfig;
use grino_uploads::server::{router, AppState};
use grino_uploads::storage::CloudinaryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Grino upload relay");

    let config = ServerConfig::from_env()?;
    let store = Arc::new(CloudinaryStore::new(config.cloudinary.clone()));

    let addr = config.bind_addr;
    let app = router(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
