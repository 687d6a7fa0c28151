use std::collections::HashSet;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Color a surface falls back to when a design is cleared.
pub const DEFAULT_SURFACE_COLOR: &str = "#ffffff";

/// One printable face of a product (front, back, sleeve).
///
/// `url` points at the background artwork and doubles as the natural key: two
/// surfaces with the same `url` are the same surface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Surface {
    /// Background image for the face.
    pub url: String,
    /// Human-facing side label, e.g. `"front"`.
    pub side: String,
    /// Garment color applied behind the artwork.
    pub color: String,
}

impl Surface {
    /// Build a surface with the default color.
    pub fn new(url: impl Into<String>, side: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            side: side.into(),
            color: DEFAULT_SURFACE_COLOR.to_string(),
        }
    }

    /// Copy of this surface recolored. Only the color is ever changed by the core.
    pub fn with_color(&self, color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..self.clone()
        }
    }

    /// Whether `other` names the same physical face.
    pub fn same_face(&self, other: &Surface) -> bool {
        self.url == other.url
    }
}

/// Reference to a surface by its natural key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SurfaceRef(pub String);

impl SurfaceRef {
    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Surface> for SurfaceRef {
    fn from(s: &Surface) -> Self {
        Self(s.url.clone())
    }
}

/// Ordered catalog of the surfaces a product exposes.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceRegistry {
    surfaces: Vec<Surface>,
}

impl SurfaceRegistry {
    /// Build a registry, rejecting blank or duplicate urls.
    pub fn new(surfaces: Vec<Surface>) -> DrapeResult<Self> {
        let mut seen = HashSet::new();
        for s in &surfaces {
            if s.url.trim().is_empty() {
                return Err(DrapeError::input(format!(
                    "surface '{}' has an empty url",
                    s.side
                )));
            }
            if !seen.insert(s.url.as_str()) {
                return Err(DrapeError::input(format!(
                    "duplicate surface url '{}'",
                    s.url
                )));
            }
        }
        Ok(Self { surfaces })
    }

    /// Surfaces in catalog order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Look a surface up by its natural key.
    pub fn get(&self, r: &SurfaceRef) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.url == r.0)
    }

    /// First surface with the given side label.
    pub fn by_side(&self, side: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.side.eq_ignore_ascii_case(side))
    }

    /// The surface a fresh editing session starts on.
    pub fn primary(&self) -> Option<&Surface> {
        self.surfaces.first()
    }

    /// Number of surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/registry.rs"]
mod tests;
