//! Vault entry-point: loads settings, prepares storage, and serves HTTP.

mod server;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use vault::inbound::http::session_config::{BuildMode, session_settings_from_env};
use vault::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use vault::outbound::storage::CapStdBlobStore;
use vault::settings::VaultSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = VaultSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| std::io::Error::other(format!("invalid session settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let database_url = settings.database_url().map_err(std::io::Error::other)?;

    run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(std::io::Error::other)?;
    let blobs = CapStdBlobStore::open(&settings.uploads_dir()).map_err(std::io::Error::other)?;

    let config = ServerConfig::new(session, bind_addr, pool, blobs)
        .with_max_upload_bytes(settings.max_upload_bytes());
    create_server(config, settings.admin_password()).await?.await
}
