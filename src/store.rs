//! Artifact persistence boundary.
//!
//! The core hands bytes to an [`ArtifactStore`] and gets back an addressable URL. Where the bytes
//! end up (local disk, object storage, CDN) is the adapter's business.

pub(crate) mod fs;
pub(crate) mod memory;
pub(crate) mod naming;

use async_trait::async_trait;

use crate::foundation::error::DrapeResult;

/// Content type of combined SVG artifacts.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";
/// Content type of rasterized artifacts.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Persists artifact bytes under a caller-chosen name and returns where they can be fetched.
///
/// Implementations must never overwrite an existing artifact. Two calls with different names
/// are always independent; there is no dedup requirement.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` as `suggested_name` and return its URL.
    async fn store(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        content_type: &str,
    ) -> DrapeResult<String>;
}

/// Reject names that could escape a flat namespace.
pub(crate) fn check_name(name: &str) -> DrapeResult<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains("..")
    {
        return Err(crate::foundation::error::DrapeError::storage(format!(
            "invalid artifact name '{name}'"
        )));
    }
    Ok(())
}
