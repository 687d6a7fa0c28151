//! Combine-and-upload: fetch vector assets, stack them, rasterize, persist both artifacts.
//!
//! This is the only part of the crate that performs IO. Fetches run concurrently, but the
//! compositor waits for every one of them since stacking order is input order. Either both
//! artifact URLs come back or the call fails; a raster failure persists nothing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::compose::raster::{RasterImage, rasterize};
use crate::compose::svg::{CompositeArtifact, combine_svgs};
use crate::fetch::{AssetFetcher, AssetRef};
use crate::foundation::config::ComposeOpts;
use crate::foundation::error::{DrapeError, DrapeResult, Stage};
use crate::store::naming::artifact_stem;
use crate::store::{ArtifactStore, PNG_CONTENT_TYPE, SVG_CONTENT_TYPE};

/// Where the two artifacts of one composite ended up.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedUrls {
    pub svg_url: String,
    pub png_url: String,
}

/// Orchestrates compositor, rasterizer and artifact store behind one call.
#[derive(Clone)]
pub struct Composer {
    fetcher: Arc<dyn AssetFetcher>,
    store: Arc<dyn ArtifactStore>,
    opts: ComposeOpts,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer").field("opts", &self.opts).finish()
    }
}

impl Composer {
    pub fn new(
        fetcher: Arc<dyn AssetFetcher>,
        store: Arc<dyn ArtifactStore>,
        opts: ComposeOpts,
    ) -> Self {
        Self {
            fetcher,
            store,
            opts,
        }
    }

    pub fn opts(&self) -> &ComposeOpts {
        &self.opts
    }

    /// Fetch `refs`, combine them and persist the SVG + PNG pair.
    ///
    /// An empty selection fails with [`DrapeError::Input`] before any fetch is started. When
    /// `cancel` fires, in-flight fetches are aborted and the call returns
    /// [`DrapeError::Cancelled`]; nothing is persisted after that point.
    #[tracing::instrument(skip_all, fields(assets = refs.len()))]
    pub async fn combine_and_upload(
        &self,
        refs: &[AssetRef],
        cancel: &CancellationToken,
    ) -> DrapeResult<CombinedUrls> {
        if refs.is_empty() {
            return Err(DrapeError::input("no assets selected"));
        }
        let docs = self.fetch_all(refs, cancel).await?;
        self.compose_and_store(docs, cancel).await
    }

    /// Same pipeline as [`Composer::combine_and_upload`] for SVG bytes already in hand.
    #[tracing::instrument(skip_all, fields(docs = docs.len()))]
    pub async fn compose_and_store(
        &self,
        docs: Vec<Vec<u8>>,
        cancel: &CancellationToken,
    ) -> DrapeResult<CombinedUrls> {
        if docs.is_empty() {
            return Err(DrapeError::input("no svg documents submitted"));
        }
        let texts: Vec<String> = docs
            .into_iter()
            .enumerate()
            .map(|(idx, bytes)| {
                String::from_utf8(bytes).unwrap_or_else(|e| {
                    tracing::warn!(index = idx, err = %e, "svg input is not utf-8; contributing empty content");
                    String::new()
                })
            })
            .collect();

        let composite = combine_svgs(&texts)?;
        let raster = self.rasterize_bounded(&composite, cancel).await?;

        if cancel.is_cancelled() {
            return Err(DrapeError::Cancelled);
        }

        // From here on both writes are attempted; no cancellation point between them.
        let stem = artifact_stem(&self.opts.artifact_prefix);
        let svg_url = self
            .store_bounded(
                composite.combined_svg_text.into_bytes(),
                &format!("{stem}.svg"),
                SVG_CONTENT_TYPE,
            )
            .await?;
        let png_url = self
            .store_bounded(raster.png, &format!("{stem}.png"), PNG_CONTENT_TYPE)
            .await?;

        tracing::info!(%svg_url, %png_url, width = raster.width, height = raster.height, "stored composite");
        Ok(CombinedUrls { svg_url, png_url })
    }

    async fn fetch_all(
        &self,
        refs: &[AssetRef],
        cancel: &CancellationToken,
    ) -> DrapeResult<Vec<Vec<u8>>> {
        let mut join_set = JoinSet::new();
        for (idx, asset) in refs.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            join_set.spawn(async move { (idx, fetcher.fetch(&asset).await) });
        }

        // Dropping `join_set` on an early return aborts whatever is still in flight.
        let mut slots: Vec<Option<Vec<u8>>> = vec![None; refs.len()];
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("combine cancelled during fetch");
                    return Err(DrapeError::Cancelled);
                }
                next = join_set.join_next() => next,
            };
            let Some(joined) = joined else {
                break;
            };
            let (idx, result) =
                joined.map_err(|e| DrapeError::Other(anyhow!("asset fetch task failed: {e}")))?;
            slots[idx] = Some(result?);
        }

        refs.iter()
            .zip(slots)
            .map(|(asset, slot)| {
                slot.ok_or_else(|| DrapeError::Other(anyhow!("missing fetch result for '{asset}'")))
            })
            .collect()
    }

    async fn rasterize_bounded(
        &self,
        composite: &CompositeArtifact,
        cancel: &CancellationToken,
    ) -> DrapeResult<RasterImage> {
        let svg = composite.combined_svg_text.clone();
        let opts = self.opts.raster.clone();
        let budget = self.opts.raster_timeout;
        let task = tokio::task::spawn_blocking(move || rasterize(&svg, &opts));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DrapeError::Cancelled),
            res = tokio::time::timeout(budget, task) => match res {
                Err(_) => Err(DrapeError::timeout(Stage::Rasterize, budget)),
                Ok(Err(join)) => Err(DrapeError::Other(anyhow!("rasterize task failed: {join}"))),
                Ok(Ok(raster)) => raster,
            },
        }
    }

    async fn store_bounded(
        &self,
        bytes: Vec<u8>,
        name: &str,
        content_type: &str,
    ) -> DrapeResult<String> {
        let budget: Duration = self.opts.upload_timeout;
        tokio::time::timeout(budget, self.store.store(bytes, name, content_type))
            .await
            .map_err(|_| DrapeError::timeout(Stage::Upload, budget))?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/orchestrator.rs"]
mod tests;
