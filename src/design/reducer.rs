//! Pure state transitions for the per-surface design collection.
//!
//! Every observable change to a design flows through [`Action`]. Transitions never mutate their
//! input; they return a fresh collection (or [`Applied::Unchanged`] when the action does not apply).

use crate::design::model::{Design, DesignId, Item, ItemId, TextProps};
use crate::surface::registry::{DEFAULT_SURFACE_COLOR, Surface, SurfaceRef};

/// Edits a client can dispatch against the design collection.
///
/// JSON form is `{ "type": "ADD_ITEM", "payload": ... }`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Activate the design for `surface`, creating it on first reference.
    AddOrActivateSurface(Surface),
    /// Activate an existing design by surface key.
    ActivateSurface(SurfaceRef),
    /// Wipe items, uploads and renders everywhere and reset colors.
    ClearAll,
    /// Append an item to the active design.
    AddItem(Item),
    /// Remove one item from the active design.
    RemoveItem(ItemId),
    /// Append a raster upload to the active design's gallery.
    AddUploadedImage(String),
    /// Recolor every surface.
    SetApparelColor(String),
    /// Replace the active design's text tool settings.
    SetTextProps(TextProps),
    /// Capture finalized renders into the active design, creating and activating a design for
    /// `surface` when none exists yet.
    StoreDesign {
        /// Surface the renders belong to.
        surface: Surface,
        /// Serialized canvas.
        json_design: serde_json::Value,
        /// PNG render location.
        png_image: String,
        /// SVG render location.
        svg_image: String,
    },
    /// Activate a design by id.
    SwitchDesign(DesignId),
    /// Clear `is_new` on the active design's items once the backing store has them.
    MarkItemsPersisted,
    /// Any action kind this build does not understand.
    #[serde(skip)]
    Unknown {
        /// The unrecognized `type` tag, if one was present.
        kind: String,
    },
}

impl Action {
    /// Decode a dispatched JSON action.
    ///
    /// Unrecognized or malformed actions decode to [`Action::Unknown`] instead of failing, so a
    /// newer client never breaks an older reducer.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match serde_json::from_value::<Action>(value.clone()) {
            Ok(action) => action,
            Err(err) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<missing>")
                    .to_string();
                tracing::debug!(%kind, %err, "unrecognized design action");
                Action::Unknown { kind }
            }
        }
    }
}

/// Result of applying one action.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// The action did not apply; the previous collection stands.
    Unchanged,
    /// The next collection.
    Changed(Vec<Design>),
}

impl Applied {
    pub fn is_changed(&self) -> bool {
        matches!(self, Applied::Changed(_))
    }

    /// Resolve to a concrete collection, reusing `prev` when nothing changed.
    pub fn into_designs(self, prev: &[Design]) -> Vec<Design> {
        match self {
            Applied::Unchanged => prev.to_vec(),
            Applied::Changed(next) => next,
        }
    }
}

/// Reducer entry point: `designs` + `action` -> next `designs`.
pub fn transition(designs: &[Design], action: &Action) -> Vec<Design> {
    apply(designs, action).into_designs(designs)
}

/// Like [`transition`] but reports whether the action applied.
pub fn apply(designs: &[Design], action: &Action) -> Applied {
    match action {
        Action::AddOrActivateSurface(surface) => {
            if designs.iter().any(|d| d.surface.same_face(surface)) {
                Applied::Changed(activate_where(designs, |d| d.surface.same_face(surface)))
            } else {
                Applied::Changed(append_active(designs, Design::new(next_id(designs), surface.clone())))
            }
        }
        Action::ActivateSurface(r) => {
            if designs.iter().any(|d| d.surface.url == r.0) {
                Applied::Changed(activate_where(designs, |d| d.surface.url == r.0))
            } else {
                Applied::Unchanged
            }
        }
        Action::SwitchDesign(id) => {
            if designs.iter().any(|d| d.id == *id) {
                Applied::Changed(activate_where(designs, |d| d.id == *id))
            } else {
                Applied::Unchanged
            }
        }
        Action::ClearAll => Applied::Changed(
            designs
                .iter()
                .map(|d| Design {
                    surface: d.surface.with_color(DEFAULT_SURFACE_COLOR),
                    items: Vec::new(),
                    json_design: None,
                    png_image: None,
                    svg_image: None,
                    renders_stale: false,
                    uploaded_images: Vec::new(),
                    ..d.clone()
                })
                .collect(),
        ),
        Action::AddItem(item) => update_active(designs, |d| {
            let mut next = d.clone();
            next.items.push(item.clone());
            next.renders_stale = next.has_renders();
            Some(next)
        }),
        Action::RemoveItem(item_id) => update_active(designs, |d| {
            let pos = d.items.iter().position(|i| i.id() == item_id)?;
            let mut next = d.clone();
            next.items.remove(pos);
            next.renders_stale = next.has_renders();
            Some(next)
        }),
        Action::AddUploadedImage(src) => update_active(designs, |d| {
            let mut next = d.clone();
            next.uploaded_images.push(src.clone());
            Some(next)
        }),
        Action::SetApparelColor(color) => Applied::Changed(
            designs
                .iter()
                .map(|d| Design {
                    surface: d.surface.with_color(color.as_str()),
                    ..d.clone()
                })
                .collect(),
        ),
        Action::SetTextProps(props) => update_active(designs, |d| {
            Some(Design {
                text_props: Some(props.clone()),
                ..d.clone()
            })
        }),
        Action::StoreDesign {
            surface,
            json_design,
            png_image,
            svg_image,
        } => {
            let snapshot = |d: Design| Design {
                json_design: Some(json_design.clone()),
                png_image: Some(png_image.clone()),
                svg_image: Some(svg_image.clone()),
                renders_stale: false,
                ..d
            };
            if designs.iter().any(|d| d.surface.same_face(surface)) {
                // Renders are captured from what the buyer is looking at.
                update_active(designs, |d| Some(snapshot(d.clone())))
            } else {
                let fresh = snapshot(Design::new(next_id(designs), surface.clone()));
                Applied::Changed(append_active(designs, fresh))
            }
        }
        Action::MarkItemsPersisted => update_active(designs, |d| {
            Some(Design {
                items: d.items.iter().map(Item::mark_persisted).collect(),
                ..d.clone()
            })
        }),
        Action::Unknown { .. } => Applied::Unchanged,
    }
}

/// Ids are sequential and never reused within a collection.
fn next_id(designs: &[Design]) -> DesignId {
    DesignId(designs.iter().map(|d| d.id.0).max().map_or(1, |m| m + 1))
}

fn activate_where(designs: &[Design], pred: impl Fn(&Design) -> bool) -> Vec<Design> {
    let mut activated = false;
    designs
        .iter()
        .map(|d| {
            // First match wins so a malformed input with duplicate keys still ends with one active.
            let on = !activated && pred(d);
            activated |= on;
            Design {
                is_active: on,
                ..d.clone()
            }
        })
        .collect()
}

fn append_active(designs: &[Design], mut fresh: Design) -> Vec<Design> {
    fresh.is_active = true;
    designs
        .iter()
        .map(|d| Design {
            is_active: false,
            ..d.clone()
        })
        .chain(std::iter::once(fresh))
        .collect()
}

fn update_active(designs: &[Design], f: impl FnOnce(&Design) -> Option<Design>) -> Applied {
    let Some(idx) = designs.iter().position(|d| d.is_active) else {
        return Applied::Unchanged;
    };
    let Some(updated) = f(&designs[idx]) else {
        return Applied::Unchanged;
    };
    let mut next = designs.to_vec();
    next[idx] = updated;
    Applied::Changed(next)
}

#[cfg(test)]
#[path = "../../tests/unit/design/reducer.rs"]
mod tests;
