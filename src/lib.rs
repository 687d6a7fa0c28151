//! drape composes buyer artwork onto the printable surfaces of a physical product.
//!
//! Two halves:
//!
//! 1. **Design state**: one [`Design`] per [`Surface`] the buyer has touched, driven by a pure
//!    reducer ([`transition`]) over typed [`Action`]s. Exactly one design is active at a time.
//! 2. **Composition pipeline**: [`Composer`] fetches vector assets, stacks them with
//!    [`combine_svgs`], renders the result with [`rasterize`] and persists both artifacts through
//!    an [`ArtifactStore`].
//!
//! The reducer performs no IO and raises no errors; unrecognized actions leave the collection
//! unchanged. The pipeline is the only async component and reports failures as [`DrapeError`].
#![forbid(unsafe_code)]

mod compose;
mod design;
mod fetch;
mod foundation;
mod http;
mod store;
mod surface;

pub use compose::orchestrator::{CombinedUrls, Composer};
pub use compose::raster::{RasterImage, parse_composite, raster_size, rasterize};
pub use compose::svg::{
    CompositeArtifact, DEFAULT_VIEW_BOX, Placement, ViewBox, combine_svgs, extract_inner_markup,
    extract_namespace_decls, extract_view_box,
};
pub use design::model::{
    Design, DesignHandoff, DesignId, Item, ItemId, TextAlign, TextProps,
};
pub use design::reducer::{Action, Applied, apply, transition};
pub use design::session::DesignSession;
pub use fetch::{
    AssetFetcher, AssetRef, DEFAULT_MAX_ASSET_BYTES, HttpAssetFetcher, StaticAssetFetcher,
};
pub use foundation::config::{ComposeOpts, MAX_RASTER_DIM, RasterOpts, ServerConfig};
pub use foundation::error::{DrapeError, DrapeResult, Stage};
pub use http::upload::{ErrorBody, FILES_FIELD, router, with_artifact_dir};
pub use store::fs::FsArtifactStore;
pub use store::memory::{MemoryArtifactStore, StoredArtifact};
pub use store::naming::{artifact_name, artifact_stem};
pub use store::{ArtifactStore, PNG_CONTENT_TYPE, SVG_CONTENT_TYPE};
pub use surface::registry::{DEFAULT_SURFACE_COLOR, Surface, SurfaceRef, SurfaceRegistry};

/// Re-exported so callers can cancel [`Composer`] calls without naming `tokio-util` themselves.
pub use tokio_util::sync::CancellationToken;
