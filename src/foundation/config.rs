use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Largest raster edge the pipeline will allocate, in pixels.
pub const MAX_RASTER_DIM: u32 = 16_384;

/// Resolution policy for the rasterizer.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterOpts {
    /// Pixels per view-box unit. `1.0` renders at the composite's native size.
    pub scale: f32,
    /// Upper bound for either output edge.
    pub max_dim: u32,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            scale: 1.0,
            max_dim: MAX_RASTER_DIM,
        }
    }
}

impl RasterOpts {
    /// Reject scales the renderer cannot honor.
    pub fn validate(&self) -> DrapeResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(DrapeError::input("raster scale must be finite and > 0"));
        }
        if self.max_dim == 0 {
            return Err(DrapeError::input("raster max_dim must be > 0"));
        }
        Ok(())
    }
}

/// Options controlling the combine-and-upload pipeline.
#[derive(Clone, Debug)]
pub struct ComposeOpts {
    /// Rasterizer resolution policy.
    pub raster: RasterOpts,
    /// Budget for converting the composite to PNG.
    pub raster_timeout: Duration,
    /// Budget for each individual artifact write.
    pub upload_timeout: Duration,
    /// Name prefix for stored artifacts.
    pub artifact_prefix: String,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            raster: RasterOpts::default(),
            raster_timeout: Duration::from_secs(20),
            upload_timeout: Duration::from_secs(30),
            artifact_prefix: "design".to_string(),
        }
    }
}

/// Startup settings for the upload service.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Directory the filesystem store writes into.
    pub artifact_dir: PathBuf,
    /// Prefix of every returned artifact URL. A path is served from `artifact_dir` by the
    /// service itself.
    pub public_base_url: String,
    /// Per-asset fetch budget.
    pub fetch_timeout: Duration,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    pub compose: ComposeOpts,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8790)),
            artifact_dir: PathBuf::from("artifacts"),
            public_base_url: "/artifacts".to_string(),
            fetch_timeout: Duration::from_secs(10),
            max_upload_bytes: 16 * 1024 * 1024,
            compose: ComposeOpts::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> DrapeResult<()> {
        self.compose.raster.validate()?;
        if self.max_upload_bytes == 0 {
            return Err(DrapeError::input("max upload size must be > 0"));
        }
        if self.fetch_timeout.is_zero()
            || self.compose.raster_timeout.is_zero()
            || self.compose.upload_timeout.is_zero()
        {
            return Err(DrapeError::input("timeouts must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
