use tokio_util::sync::CancellationToken;

use crate::compose::orchestrator::{CombinedUrls, Composer};
use crate::design::model::{Design, DesignHandoff, Item};
use crate::design::reducer::{Action, Applied, apply};
use crate::fetch::AssetRef;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::surface::registry::SurfaceRef;

/// Single-writer owner of one editing session's designs.
///
/// Writes take `&mut self`, so dispatches are serialized by construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesignSession {
    designs: Vec<Design>,
}

impl DesignSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously captured collection.
    pub fn from_designs(designs: Vec<Design>) -> Self {
        Self { designs }
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn active(&self) -> Option<&Design> {
        self.designs.iter().find(|d| d.is_active)
    }

    /// Apply `action`; returns whether the collection changed.
    pub fn dispatch(&mut self, action: &Action) -> bool {
        match apply(&self.designs, action) {
            Applied::Changed(next) => {
                self.designs = next;
                true
            }
            Applied::Unchanged => false,
        }
    }

    /// Decode and apply a client JSON action.
    pub fn dispatch_json(&mut self, value: &serde_json::Value) -> bool {
        self.dispatch(&Action::from_json(value))
    }

    /// Hand-off record for the design bound to `surface`, once finalized.
    pub fn handoff(&self, surface: &SurfaceRef) -> Option<DesignHandoff> {
        self.designs
            .iter()
            .find(|d| d.surface.url == surface.0)
            .and_then(Design::handoff)
    }

    /// All finalized designs, in creation order.
    pub fn handoffs(&self) -> Vec<DesignHandoff> {
        self.designs.iter().filter_map(Design::handoff).collect()
    }

    /// Combine `refs` into one composite and place it on the active design.
    ///
    /// On any failure, including cancellation, the session is left exactly as it was.
    pub async fn combine_and_add(
        &mut self,
        composer: &Composer,
        refs: &[AssetRef],
        cancel: &CancellationToken,
    ) -> DrapeResult<CombinedUrls> {
        if refs.is_empty() {
            return Err(DrapeError::input("no assets selected"));
        }
        if self.active().is_none() {
            return Err(DrapeError::input("no surface selected"));
        }

        let urls = composer.combine_and_upload(refs, cancel).await?;
        if cancel.is_cancelled() {
            return Err(DrapeError::Cancelled);
        }
        self.dispatch(&Action::AddItem(Item::svg(urls.svg_url.clone())));
        Ok(urls)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/design/session.rs"]
mod tests;
