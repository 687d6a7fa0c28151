//! Vertical stacking of independently authored SVG documents.
//!
//! Inputs are matched with plain string patterns rather than parsed as XML: the first `viewBox`
//! attribute anywhere in a document wins, and the inner markup is everything between the first
//! `<svg ...>` start tag and the last `</svg>`. A document that does not fit those patterns still
//! takes part in the layout with a default box and no content.
//!
//! Prefixed namespace declarations (`xmlns:inkscape=...`) on an input's root tag move onto that
//! input's group so editor metadata inside the markup stays bound.

use std::fmt::Write as _;
use std::sync::LazyLock;

use kurbo::{Point, Rect, Size, Vec2};
use regex::Regex;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Box used for inputs whose `viewBox` is absent or unusable.
pub const DEFAULT_VIEW_BOX: ViewBox = ViewBox::new(0.0, 0.0, 100.0, 100.0);

static VIEW_BOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"viewBox\s*=\s*["']([^"']*)["']"#).expect("view box pattern is valid")
});

static SVG_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").expect("svg open tag pattern is valid"));

static XMLNS_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bxmlns:([A-Za-z_][\w.-]*)\s*=\s*("[^"]*"|'[^']*')"#)
        .expect("namespace declaration pattern is valid")
});

/// An SVG `viewBox`: origin and size exactly as written in the document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub origin: Point,
    pub size: Size,
}

impl ViewBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}

/// Where one input landed inside the composite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// The input's own view box (or [`DEFAULT_VIEW_BOX`]).
    pub view_box: ViewBox,
    /// Translation applied to the input's content.
    pub offset: Vec2,
    /// The input contributed no markup.
    pub empty: bool,
}

/// Combined SVG plus the geometry it was built from. Never mutated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeArtifact {
    pub combined_svg_text: String,
    pub width_units: f64,
    pub height_units: f64,
    /// One entry per input, in input order.
    pub placements: Vec<Placement>,
}

impl CompositeArtifact {
    /// Width over height of the composite view box.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_units / self.height_units
    }
}

/// Extract the first `viewBox` of `doc`, falling back to [`DEFAULT_VIEW_BOX`].
pub fn extract_view_box(doc: &str) -> ViewBox {
    VIEW_BOX_RE
        .captures(doc)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_view_box(m.as_str()))
        .unwrap_or(DEFAULT_VIEW_BOX)
}

fn parse_view_box(raw: &str) -> Option<ViewBox> {
    let nums = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()?;
    let [x, y, w, h] = nums.as_slice() else {
        return None;
    };
    if *w <= 0.0 || *h <= 0.0 {
        return None;
    }
    Some(ViewBox::new(*x, *y, *w, *h))
}

/// Markup between the outermost `<svg>` tags, or `None` when the document has no such pair.
pub fn extract_inner_markup(doc: &str) -> Option<&str> {
    let open = SVG_OPEN_RE.find(doc)?;
    if open.as_str().ends_with("/>") {
        return None;
    }
    let close = doc.rfind("</svg>")?;
    if close < open.end() {
        return None;
    }
    Some(&doc[open.end()..close])
}

/// Prefixed `xmlns:*` declarations on the root `<svg>` tag, verbatim, in document order.
///
/// `xlink` is skipped since the wrapper always declares it.
pub fn extract_namespace_decls(doc: &str) -> Vec<&str> {
    let Some(open) = SVG_OPEN_RE.find(doc) else {
        return Vec::new();
    };
    XMLNS_PREFIX_RE
        .captures_iter(open.as_str())
        .filter(|c| c.get(1).is_some_and(|p| p.as_str() != "xlink"))
        .filter_map(|c| c.get(0).map(|m| m.as_str()))
        .collect()
}

/// Stack `docs` top to bottom, centering narrower inputs horizontally.
///
/// Errors:
/// - [`DrapeError::Input`] when `docs` is empty.
/// - [`DrapeError::Composition`] when no input contributes any markup.
#[tracing::instrument(level = "debug", skip_all, fields(inputs = docs.len()))]
pub fn combine_svgs<S: AsRef<str>>(docs: &[S]) -> DrapeResult<CompositeArtifact> {
    if docs.is_empty() {
        return Err(DrapeError::input("no svg documents to combine"));
    }

    let parts: Vec<(ViewBox, &str, Vec<&str>)> = docs
        .iter()
        .enumerate()
        .map(|(idx, doc)| {
            let doc = doc.as_ref();
            let inner = extract_inner_markup(doc).unwrap_or_else(|| {
                tracing::warn!(index = idx, "svg input has no usable markup; contributing empty content");
                ""
            });
            (extract_view_box(doc), inner, extract_namespace_decls(doc))
        })
        .collect();

    if parts.iter().all(|(_, inner, _)| inner.trim().is_empty()) {
        return Err(DrapeError::composition(format!(
            "none of the {} svg inputs carried any content",
            docs.len()
        )));
    }

    let max_width = parts
        .iter()
        .map(|(vb, _, _)| vb.width())
        .fold(0.0_f64, f64::max);
    let total_height: f64 = parts.iter().map(|(vb, _, _)| vb.height()).sum();

    let mut out =
        String::with_capacity(parts.iter().map(|(_, s, _)| s.len() + 48).sum::<usize>() + 160);
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 {max_width} {total_height}" width="{max_width}" height="{total_height}">"#
    );

    let mut placements = Vec::with_capacity(parts.len());
    let mut y = 0.0_f64;
    for (view_box, inner, decls) in parts {
        let offset = Vec2::new((max_width - view_box.width()) / 2.0, y);
        let _ = write!(out, r#"<g transform="translate({}, {})""#, offset.x, offset.y);
        // Declarations stay scoped to their own input, so two inputs may bind one prefix differently.
        for decl in decls {
            out.push(' ');
            out.push_str(decl);
        }
        let _ = write!(out, ">{inner}</g>");
        placements.push(Placement {
            view_box,
            offset,
            empty: inner.trim().is_empty(),
        });
        y += view_box.height();
    }
    out.push_str("</svg>");

    Ok(CompositeArtifact {
        combined_svg_text: out,
        width_units: max_width,
        height_units: total_height,
        placements,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/svg.rs"]
mod tests;
