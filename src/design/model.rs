use crate::surface::registry::Surface;

/// Identifier of a placed item. Client-generated; opaque to the core.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Fresh random identifier for an item that has not been persisted yet.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a design. Assigned once when the design is created.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct DesignId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal text alignment.
pub enum TextAlign {
    /// Align to start.
    Left,
    /// Center.
    #[default]
    Center,
    /// Align to end.
    Right,
}

/// Last-known text tool configuration. Stored, never rendered by the core.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    /// Font family name as the client knows it.
    pub font_family: String,
    /// Font size in canvas units.
    pub font_size: f64,
    /// Fill color.
    pub fill: String,
    /// CSS-style weight (400 regular, 700 bold).
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    /// Alignment.
    #[serde(default)]
    pub text_align: TextAlign,
}

fn default_font_weight() -> u16 {
    400
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 24.0,
            fill: "#000000".to_string(),
            font_weight: default_font_weight(),
            text_align: TextAlign::default(),
        }
    }
}

/// One placed asset on a design.
///
/// `is_new` marks items the backing store has not accepted yet.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Item {
    /// Vector asset, possibly a composite produced by the orchestrator.
    Svg {
        /// Item id.
        id: ItemId,
        /// Where the SVG lives.
        url: String,
        /// Not yet persisted.
        is_new: bool,
    },
    /// Uploaded raster, as a data URL or remote URL.
    Image {
        /// Item id.
        id: ItemId,
        /// Image source.
        src: String,
        /// Not yet persisted.
        is_new: bool,
    },
    /// Text block. Kept as data; the client draws it.
    Text {
        /// Item id.
        id: ItemId,
        /// Text content.
        content: String,
        /// Styling at placement time.
        props: TextProps,
        /// Not yet persisted.
        is_new: bool,
    },
}

impl Item {
    /// New, unpersisted vector item with a generated id.
    pub fn svg(url: impl Into<String>) -> Self {
        Self::Svg {
            id: ItemId::generate(),
            url: url.into(),
            is_new: true,
        }
    }

    /// New, unpersisted raster item with a generated id.
    pub fn image(src: impl Into<String>) -> Self {
        Self::Image {
            id: ItemId::generate(),
            src: src.into(),
            is_new: true,
        }
    }

    /// New, unpersisted text item with a generated id.
    pub fn text(content: impl Into<String>, props: TextProps) -> Self {
        Self::Text {
            id: ItemId::generate(),
            content: content.into(),
            props,
            is_new: true,
        }
    }

    pub fn id(&self) -> &ItemId {
        match self {
            Self::Svg { id, .. } | Self::Image { id, .. } | Self::Text { id, .. } => id,
        }
    }

    pub fn is_new(&self) -> bool {
        match self {
            Self::Svg { is_new, .. } | Self::Image { is_new, .. } | Self::Text { is_new, .. } => {
                *is_new
            }
        }
    }

    /// Copy of this item flagged as accepted by the backing store.
    pub fn mark_persisted(&self) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::Svg { is_new, .. } | Self::Image { is_new, .. } | Self::Text { is_new, .. } => {
                *is_new = false
            }
        }
        out
    }
}

/// Editable state bound to one surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    /// Stable id, never reassigned.
    pub id: DesignId,
    /// Owning surface. Only its color changes.
    pub surface: Surface,
    /// Placed items; index order is z-order.
    pub items: Vec<Item>,
    /// Whether this design currently receives edits.
    pub is_active: bool,
    /// Serialized canvas captured on the last store.
    pub json_design: Option<serde_json::Value>,
    /// PNG render captured on the last store.
    pub png_image: Option<String>,
    /// SVG render captured on the last store.
    pub svg_image: Option<String>,
    /// Set when `items` changed after the renders were captured.
    #[serde(default)]
    pub renders_stale: bool,
    /// Raster uploads offered again in the gallery.
    pub uploaded_images: Vec<String>,
    /// Last text tool configuration.
    pub text_props: Option<TextProps>,
}

impl Design {
    /// Empty, inactive design for `surface`.
    pub fn new(id: DesignId, surface: Surface) -> Self {
        Self {
            id,
            surface,
            items: Vec::new(),
            is_active: false,
            json_design: None,
            png_image: None,
            svg_image: None,
            renders_stale: false,
            uploaded_images: Vec::new(),
            text_props: None,
        }
    }

    pub fn has_renders(&self) -> bool {
        self.json_design.is_some() || self.png_image.is_some() || self.svg_image.is_some()
    }

    /// Renders are present and reflect the current items.
    pub fn is_finalized(&self) -> bool {
        self.has_renders() && !self.renders_stale
    }

    /// Record the cart collaborator stores verbatim, if this design is finalized.
    pub fn handoff(&self) -> Option<DesignHandoff> {
        if !self.is_finalized() {
            return None;
        }
        Some(DesignHandoff {
            id: self.id,
            surface: self.surface.clone(),
            items: self.items.clone(),
            json_design: self.json_design.clone(),
            png_image: self.png_image.clone(),
            svg_image: self.svg_image.clone(),
        })
    }
}

/// Finalized design as handed to the cart. Opaque to the receiver.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignHandoff {
    pub id: DesignId,
    pub surface: Surface,
    pub items: Vec<Item>,
    pub json_design: Option<serde_json::Value>,
    pub png_image: Option<String>,
    pub svg_image: Option<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/design/model.rs"]
mod tests;
