//! plotcluster HTTP server.
//!
//! ```bash
//! cargo run --release
//!
//! PLOTCLUSTER_PORT=9000 PLOTCLUSTER_LOG_LEVEL=plotcluster=debug,info cargo run --release
//! ```
//!
//! See [`plotcluster::config`] for every variable.

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use plotcluster::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.addr(),
        static_dir = %config.static_dir.display(),
        kmeans_n_init = config.kmeans_n_init,
        linkage = ?config.linkage,
        "plotcluster starting"
    );

    plotcluster::server::serve(&config)
        .await
        .map_err(|e| anyhow::anyhow!("server on {} stopped: {e}", config.addr()))
}
