use clap::Parser;
use ferrumcache::{web, CacheConfig};
use tracing::{error, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = CacheConfig::parse();

    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("FerrumCache starting on {}...", config.bind);

    if let Err(e) = web::run(config).await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}
