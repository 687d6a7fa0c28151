use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drape-server", version, about = "SVG combine-and-upload service")]
struct Args {
    /// TCP listener for upload requests.
    #[arg(long, env = "DRAPE_LISTEN", default_value = "127.0.0.1:8790")]
    listen: SocketAddr,

    /// Directory combined artifacts are written into.
    #[arg(long, env = "DRAPE_ARTIFACT_DIR", default_value = "artifacts")]
    artifact_dir: PathBuf,

    /// URL prefix for stored artifacts. A path (`/artifacts`) is served from `artifact_dir` by this
    /// server; a full URL means something else publishes the directory.
    #[arg(long, env = "DRAPE_PUBLIC_BASE_URL", default_value = "/artifacts")]
    public_base_url: String,

    /// Name prefix for stored artifacts.
    #[arg(long, env = "DRAPE_ARTIFACT_PREFIX", default_value = "combined")]
    artifact_prefix: String,

    /// Pixels per view-box unit for PNG output.
    #[arg(long, env = "DRAPE_RASTER_SCALE", default_value_t = 1.0)]
    raster_scale: f32,

    /// Rasterization budget in seconds.
    #[arg(long, env = "DRAPE_RASTER_TIMEOUT_SECS", default_value_t = 20)]
    raster_timeout_secs: u64,

    /// Per-artifact write budget in seconds.
    #[arg(long, env = "DRAPE_UPLOAD_TIMEOUT_SECS", default_value_t = 30)]
    upload_timeout_secs: u64,

    /// Per-asset fetch timeout in seconds.
    #[arg(long, env = "DRAPE_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    fetch_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    #[arg(long, env = "DRAPE_MAX_UPLOAD_BYTES", default_value_t = 16 * 1024 * 1024)]
    max_upload_bytes: usize,
}

impl Args {
    fn server_config(&self) -> anyhow::Result<drape::ServerConfig> {
        let cfg = drape::ServerConfig {
            listen: self.listen,
            artifact_dir: self.artifact_dir.clone(),
            public_base_url: self.public_base_url.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_upload_bytes: self.max_upload_bytes,
            compose: drape::ComposeOpts {
                raster: drape::RasterOpts {
                    scale: self.raster_scale,
                    ..drape::RasterOpts::default()
                },
                raster_timeout: Duration::from_secs(self.raster_timeout_secs),
                upload_timeout: Duration::from_secs(self.upload_timeout_secs),
                artifact_prefix: self.artifact_prefix.clone(),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Args::parse().server_config()?;

    let fetcher =
        drape::HttpAssetFetcher::new(cfg.fetch_timeout, drape::DEFAULT_MAX_ASSET_BYTES)?;
    let store = drape::FsArtifactStore::new(&cfg.artifact_dir, &cfg.public_base_url);
    let composer = Arc::new(drape::Composer::new(
        Arc::new(fetcher),
        Arc::new(store),
        cfg.compose.clone(),
    ));

    let app = drape::with_artifact_dir(
        drape::router(composer, cfg.max_upload_bytes),
        &cfg.public_base_url,
        &cfg.artifact_dir,
    );
    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("bind {}", cfg.listen))?;
    info!(
        listen = %cfg.listen,
        artifacts = %cfg.artifact_dir.display(),
        base_url = %cfg.public_base_url,
        "drape upload service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to install ctrl-c handler");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("serve")?;
    Ok(())
}
