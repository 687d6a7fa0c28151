use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::config::RasterOpts;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Encoded PNG plus its pixel size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Parse a combined SVG for rendering.
///
/// Anything the renderer rejects is a [`DrapeError::Rasterization`], so callers can fall back to
/// serving the SVG itself.
pub fn parse_composite(svg: &str) -> DrapeResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_str(svg, &opts)
        .map_err(|e| DrapeError::rasterization(format!("parse combined svg: {e}")))
}

/// Pixel size for `tree` under `opts`, preserving the view-box aspect ratio.
pub fn raster_size(tree: &usvg::Tree, opts: &RasterOpts) -> DrapeResult<(u32, u32)> {
    fn to_px(v: f32) -> DrapeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(DrapeError::rasterization("svg has invalid width/height"));
        }
        Ok((v.round() as u32).max(1))
    }

    opts.validate()?;
    let size = tree.size();
    let w = to_px(size.width() * opts.scale)?;
    let h = to_px(size.height() * opts.scale)?;

    let max = opts.max_dim;
    if w > max || h > max {
        return Err(DrapeError::rasterization(format!(
            "svg raster size too large: {w}x{h} (max {max}x{max})"
        )));
    }
    Ok((w, h))
}

/// Render `svg` to PNG. Default options render at the native view-box size.
#[tracing::instrument(level = "debug", skip_all, fields(svg_len = svg.len()))]
pub fn rasterize(svg: &str, opts: &RasterOpts) -> DrapeResult<RasterImage> {
    let tree = parse_composite(svg)?;
    let (width, height) = raster_size(&tree, opts)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DrapeError::rasterization("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia keeps premultiplied pixels; PNG wants straight alpha.
    let mut rgba = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| DrapeError::rasterization("pixel buffer does not match raster size"))?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encode composite png")?;

    tracing::debug!(width, height, png_len = png.len(), "rasterized composite");
    Ok(RasterImage { width, height, png })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/raster.rs"]
mod tests;
