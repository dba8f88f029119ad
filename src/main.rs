#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use pin_archiver::{
    Result,
    bot::{self, BotData},
    cloudflare::{CloudflareApi, HttpCloudflareClient},
    config,
    core::provision,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    if let Err(e) = dotenv() {
        info!("No .env file loaded: {}", e);
    }

    // 3. Load and validate configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let app_config = Arc::new(app_config);

    // 4. Build the Cloudflare client
    let api: Arc<dyn CloudflareApi> = Arc::new(
        HttpCloudflareClient::new(&app_config.cloudflare)
            .inspect_err(|e| error!("Failed to build Cloudflare client: {}", e))?,
    );

    // 5. Provision the D1 database (and the R2 bucket, if configured)
    let database_id = provision::ensure_database(api.as_ref(), &app_config.cloudflare.database_name)
        .await
        .inspect(|_| info!("D1 database ready."))
        .inspect_err(|e| error!("Failed to provision D1 database: {}", e))?;

    if let Some(bucket) = &app_config.cloudflare.bucket_name {
        provision::ensure_bucket(api.as_ref(), bucket)
            .await
            .inspect(|_| info!("R2 bucket ready."))
            .inspect_err(|e| error!("Failed to provision R2 bucket: {}", e))?;
    }

    // 6. Run the bot
    bot::run_bot(BotData::new(Arc::clone(&app_config), api, database_id)).await
}
