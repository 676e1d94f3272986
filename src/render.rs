//! Raster export.
//!
//! Renders the whole scene at 1:1 scene units per pixel into a PNG, cropped
//! to the painted extent of the objects plus a margin. The camera plays no
//! part: an export looks the same at any on-screen zoom.
//!
//! Text needs a font file (`BOARD_EXPORT_FONT`); without one, text objects
//! are left out of the image. Image objects render when their `src` is an
//! inline `data:` URL.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use ab_glyph::{Font, FontArc, ScaleFont};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tiny_skia::{
    Color, FillRule, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Stroke, Transform,
};
use tracing::{debug, warn};

use crate::camera::Rect;
use crate::config::EditorConfig;
use crate::consts::TEXT_LINE_HEIGHT;
use crate::doc::{DrawableObject, Scene, Shape};
use crate::error::ErrorCode;
use crate::hit;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export of {width}x{height} px exceeds the size limit")]
    TooLarge { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "E_EXPORT_TOO_LARGE",
            Self::Encode(_) => "E_EXPORT_ENCODE",
        }
    }
}

/// Export settings.
#[derive(Clone)]
pub struct ExportOptions {
    /// Margin around the scene extent, in pixels.
    pub padding: u32,
    /// Maximum width and height of the output.
    pub max_px: u32,
    /// Font for text objects.
    pub font: Option<FontArc>,
}

impl std::fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOptions")
            .field("padding", &self.padding)
            .field("max_px", &self.max_px)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ExportOptions {
    /// Build options from config, loading the export font if one is set. A
    /// font that cannot be read is logged and skipped.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        let font = config.export_font.as_ref().and_then(|path| match std::fs::read(path) {
            Ok(bytes) => match FontArc::try_from_vec(bytes) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "export font is not a valid font file");
                    None
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "export font could not be read");
                None
            }
        });
        Self { padding: config.export_padding_px, max_px: config.export_max_px, font }
    }
}

/// Download filename for a project's export.
#[must_use]
pub fn export_filename(project_id: &str) -> String {
    format!("whiteboard-{project_id}.png")
}

// =============================================================================
// EXPORT
// =============================================================================

/// Render the scene to PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::TooLarge`] if the scene extent plus padding does
/// not fit within `max_px`, or [`ExportError::Encode`] if PNG encoding fails.
pub fn export_png(scene: &Scene, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let pixmap = rasterize(scene, options)?;
    pixmap.encode_png().map_err(|e| ExportError::Encode(e.to_string()))
}

/// Render the scene into a pixmap. See [`export_png`].
///
/// # Errors
///
/// Returns [`ExportError::TooLarge`] if the output, or the glyph raster of a
/// text object, would exceed `max_px`.
pub fn rasterize(scene: &Scene, options: &ExportOptions) -> Result<Pixmap, ExportError> {
    let pad = f64::from(options.padding);
    let extent = hit::scene_extent(scene).unwrap_or_else(|| Rect::from_xywh(0.0, 0.0, 0.0, 0.0));
    let origin_x = (extent.min.x - pad).floor();
    let origin_y = (extent.min.y - pad).floor();
    let width = ((extent.max.x + pad).ceil() - origin_x).max(1.0);
    let height = ((extent.max.y + pad).ceil() - origin_y).max(1.0);

    let limit = f64::from(options.max_px);
    if width > limit || height > limit {
        let (width, height) = (width.min(f64::from(u32::MAX)) as u32, height.min(f64::from(u32::MAX)) as u32);
        return Err(ExportError::TooLarge { width, height });
    }
    let (width, height) = (width as u32, height as u32);
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::TooLarge { width, height })?;

    pixmap.fill(parse_color(scene.background()).unwrap_or(Color::WHITE));

    let to_pixels = Transform::from_translate(-origin_x as f32, -origin_y as f32);
    for obj in scene.objects() {
        draw_object(&mut pixmap, obj, to_pixels, options)?;
    }
    debug!(width, height, objects = scene.len(), "scene rasterized");
    Ok(pixmap)
}

/// Local -> pixel transform: scale about the header origin, rotate about the
/// pivot, then shift into the export frame.
fn object_transform(obj: &DrawableObject, to_pixels: Transform) -> Transform {
    let h = &obj.header;
    let pivot = hit::pivot(obj);
    Transform::from_row(h.scale_x as f32, 0.0, 0.0, h.scale_y as f32, h.x as f32, h.y as f32)
        .post_concat(Transform::from_rotate_at(h.rotation as f32, pivot.x as f32, pivot.y as f32))
        .post_concat(to_pixels)
}

fn draw_object(
    pixmap: &mut Pixmap,
    obj: &DrawableObject,
    to_pixels: Transform,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let transform = object_transform(obj, to_pixels);

    match &obj.shape {
        Shape::Rectangle { width, height } => {
            let path = tiny_skia::Rect::from_xywh(0.0, 0.0, *width as f32, *height as f32).map(PathBuilder::from_rect);
            paint_path(pixmap, path.as_ref(), obj, transform);
        }
        Shape::Circle { radius } => {
            let r = *radius as f32;
            paint_path(pixmap, PathBuilder::from_circle(r, r, r).as_ref(), obj, transform);
        }
        Shape::Triangle { width, height } => {
            let (w, ht) = (*width as f32, *height as f32);
            let mut pb = PathBuilder::new();
            pb.move_to(w * 0.5, 0.0);
            pb.line_to(0.0, ht);
            pb.line_to(w, ht);
            pb.close();
            paint_path(pixmap, pb.finish().as_ref(), obj, transform);
        }
        Shape::Line { dx, dy } => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, 0.0);
            pb.line_to(*dx as f32, *dy as f32);
            stroke_path(pixmap, pb.finish().as_ref(), obj, transform);
        }
        Shape::FreehandPath { points } => draw_freehand(pixmap, points, obj, transform),
        Shape::Text { text, font_size, .. } => match &options.font {
            Some(font) => {
                let h = &obj.header;
                let color = h.fill.as_deref().or(Some(h.stroke.as_str())).and_then(parse_color);
                if let Some(color) = color {
                    let run = TextRun { text, font_size: *font_size, color };
                    draw_text(pixmap, font, &run, obj, transform, options.max_px)?;
                }
            }
            None => debug!(id = %obj.id, "no export font configured; text skipped"),
        },
        Shape::Image { src, width, height } => match decode_data_url(src) {
            Some(image) => {
                let sx = *width as f32 / image.width() as f32;
                let sy = *height as f32 / image.height() as f32;
                pixmap.draw_pixmap(
                    0,
                    0,
                    image.as_ref(),
                    &PixmapPaint::default(),
                    transform.pre_scale(sx, sy),
                    None,
                );
            }
            None => debug!(id = %obj.id, "image source is not a decodable data URL; skipped"),
        },
    }
    Ok(())
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn paint_path(pixmap: &mut Pixmap, path: Option<&Path>, obj: &DrawableObject, transform: Transform) {
    let Some(path) = path else {
        return;
    };
    if let Some(fill) = obj.header.fill.as_deref().and_then(parse_color) {
        pixmap.fill_path(path, &solid_paint(fill), FillRule::Winding, transform, None);
    }
    stroke_path(pixmap, Some(path), obj, transform);
}

fn stroke_path(pixmap: &mut Pixmap, path: Option<&Path>, obj: &DrawableObject, transform: Transform) {
    let h = &obj.header;
    let (Some(path), Some(color)) = (path, parse_color(&h.stroke)) else {
        return;
    };
    if h.stroke_width <= 0.0 {
        return;
    }
    let stroke = Stroke {
        width: h.stroke_width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(path, &solid_paint(color), &stroke, transform, None);
}

fn draw_freehand(pixmap: &mut Pixmap, points: &[crate::camera::Point], obj: &DrawableObject, transform: Transform) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.iter().all(|p| p == first) {
        // A tap: paint a dot as wide as the brush.
        let r = (obj.header.stroke_width * 0.5).max(0.5) as f32;
        if let (Some(dot), Some(color)) =
            (PathBuilder::from_circle(first.x as f32, first.y as f32, r), parse_color(&obj.header.stroke))
        {
            pixmap.fill_path(&dot, &solid_paint(color), FillRule::Winding, transform, None);
        }
        return;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    stroke_path(pixmap, pb.finish().as_ref(), obj, transform);
}

// =============================================================================
// TEXT
// =============================================================================

struct TextRun<'a> {
    text: &'a str,
    font_size: f64,
    color: Color,
}

/// Pixels per local unit at which glyphs are rasterized: the larger of the
/// object's two scale factors, so glyphs are never sampled coarser than they
/// land on the canvas.
fn text_raster_scale(obj: &DrawableObject) -> f64 {
    let h = &obj.header;
    let scale = h.scale_x.max(h.scale_y);
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// Pixel size of a glyph coverage buffer, rejected when either side exceeds
/// `max_px` or the buffer length overflows.
fn coverage_size(width: f64, height: f64, max_px: u32) -> Result<(u32, u32), ExportError> {
    let limit = f64::from(max_px);
    let (w, h) = (width.ceil().max(1.0), height.ceil().max(1.0));
    let clamp = |v: f64| v.min(f64::from(u32::MAX)) as u32;
    if w > limit || h > limit {
        return Err(ExportError::TooLarge { width: clamp(w), height: clamp(h) });
    }
    let (w, h) = (w as u32, h as u32);
    w.checked_mul(h).map(|_| (w, h)).ok_or(ExportError::TooLarge { width: w, height: h })
}

/// Rasterize glyph coverage at device resolution, then composite it through
/// the object transform with the raster scale divided back out.
fn draw_text(
    pixmap: &mut Pixmap,
    font: &FontArc,
    run: &TextRun<'_>,
    obj: &DrawableObject,
    transform: Transform,
    max_px: u32,
) -> Result<(), ExportError> {
    let raster_scale = text_raster_scale(obj);
    let device_size = run.font_size * raster_scale;
    coverage_size(device_size, device_size * TEXT_LINE_HEIGHT, max_px)?;
    let size = device_size as f32;
    let scaled = font.as_scaled(size);
    let line_height = size * TEXT_LINE_HEIGHT as f32;
    let lines: Vec<&str> = run.text.split('\n').collect();

    let line_width = |line: &str| -> f32 {
        let mut width = 0.0;
        let mut prev = None;
        for ch in line.chars() {
            let gid = font.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, gid);
            }
            width += scaled.h_advance(gid);
            prev = Some(gid);
        }
        width
    };
    let widest = lines.iter().map(|l| line_width(l)).fold(0.0_f32, f32::max);
    let (width, height) =
        coverage_size(f64::from(widest), f64::from(line_height) * lines.len() as f64, max_px)?;
    let mut coverage = vec![0.0_f32; width as usize * height as usize];

    for (row, line) in lines.iter().enumerate() {
        let baseline = row as f32 * line_height + scaled.ascent();
        let mut x = 0.0;
        let mut prev = None;
        for ch in line.chars() {
            let gid = font.glyph_id(ch);
            if let Some(p) = prev {
                x += scaled.kern(p, gid);
            }
            let glyph = gid.with_scale_and_position(size, ab_glyph::point(x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, cov| {
                    let gx = bounds.min.x as i64 + i64::from(px);
                    let gy = bounds.min.y as i64 + i64::from(py);
                    if gx >= 0 && gy >= 0 && gx < i64::from(width) && gy < i64::from(height) {
                        let slot = &mut coverage[gy as usize * width as usize + gx as usize];
                        *slot = slot.max(cov.min(1.0));
                    }
                });
            }
            x += scaled.h_advance(gid);
            prev = Some(gid);
        }
    }

    let Some(mut glyphs) = Pixmap::new(width, height) else {
        return Ok(());
    };
    let rgba = run.color.to_color_u8();
    for (pixel, cov) in glyphs.pixels_mut().iter_mut().zip(&coverage) {
        if *cov <= 0.0 {
            continue;
        }
        let a = (cov * f32::from(rgba.alpha())).round() as u8;
        if let Some(c) = premultiply(rgba.red(), rgba.green(), rgba.blue(), a) {
            *pixel = c;
        }
    }
    let unscale = (1.0 / raster_scale) as f32;
    pixmap.draw_pixmap(0, 0, glyphs.as_ref(), &PixmapPaint::default(), transform.pre_scale(unscale, unscale), None);
    Ok(())
}

// =============================================================================
// IMAGES
// =============================================================================

/// Decode a `data:<mime>;base64,<payload>` URL into a premultiplied pixmap.
fn decode_data_url(src: &str) -> Option<Pixmap> {
    let rest = src.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    let bytes = match BASE64.decode(payload.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "image data URL is not valid base64");
            return None;
        }
    };
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => {
            debug!(error = %e, "image data URL could not be decoded");
            return None;
        }
    };
    let rgba = image.to_rgba8();
    let size = IntSize::from_wh(rgba.width(), rgba.height())?;

    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size)
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> Option<PremultipliedColorU8> {
    let mul = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
    PremultipliedColorU8::from_rgba(mul(r), mul(g), mul(b), a)
}

// =============================================================================
// COLORS
// =============================================================================

/// Parse the CSS color forms the editor writes: `#rgb`, `#rrggbb`,
/// `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`, `transparent`, and a
/// handful of names.
#[must_use]
pub fn parse_color(raw: &str) -> Option<Color> {
    let s = raw.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" | "none" => return Some(Color::TRANSPARENT),
        "black" => return Some(Color::BLACK),
        "white" => return Some(Color::WHITE),
        "red" => return Some(Color::from_rgba8(255, 0, 0, 255)),
        "green" => return Some(Color::from_rgba8(0, 128, 0, 255)),
        "blue" => return Some(Color::from_rgba8(0, 0, 255, 255)),
        _ => {}
    }

    if let Some(hex) = s.strip_prefix('#') {
        let nibble = |i: usize| hex_u8(hex.get(i..=i)?);
        let byte = |i: usize| hex_u8(hex.get(i..i + 2)?);
        return match hex.len() {
            3 => Some(Color::from_rgba8(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255)),
            6 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        };
    }

    let (body, has_alpha) = match s.strip_prefix("rgba(") {
        Some(body) => (body, true),
        None => (s.strip_prefix("rgb(")?, false),
    };
    let parts: Vec<f32> = body.strip_suffix(')')?.split(',').map(parse_f32).collect::<Option<_>>()?;
    let channel = |v: f32| v.clamp(0.0, 255.0).round() as u8;
    match (has_alpha, parts.as_slice()) {
        (false, &[r, g, b]) => Some(Color::from_rgba8(channel(r), channel(g), channel(b), 255)),
        (true, &[r, g, b, a]) => {
            Some(Color::from_rgba8(channel(r), channel(g), channel(b), (a.clamp(0.0, 1.0) * 255.0).round() as u8))
        }
        _ => None,
    }
}

fn hex_u8(digits: &str) -> Option<u8> {
    match u8::from_str_radix(digits, 16) {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

fn parse_f32(raw: &str) -> Option<f32> {
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}
