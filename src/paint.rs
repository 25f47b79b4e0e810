//! Puts scenes on screen. A scene is rasterized with the same renderer the
//! exporter uses and uploaded as a texture, which is then drawn under the
//! viewport transform; hover feedback is stroked on top as vector outlines.

use eframe::egui::{self, Color32, Pos2, Stroke, TextureHandle, TextureOptions};
use synteny_protocol::ViewportTransform;
use synteny_render::export::{export_view_box, rasterize, scene_to_svg};
use synteny_render::{PathData, Rect, Scene, Theme};

/// Largest texture side we ask the GPU for.
const MAX_TEXTURE_SIDE: f64 = 8192.0;
/// Raster scales are rounded to this step so small zoom changes reuse the texture.
const SCALE_STEP: f64 = 0.5;

/// Texture scale for a view: device pixels per content unit, quantized and
/// capped so the texture stays within [`MAX_TEXTURE_SIDE`].
pub fn raster_scale(k: f64, pixels_per_point: f32, view_box: Rect) -> f32 {
    let wanted = (k * pixels_per_point as f64 / SCALE_STEP).ceil().max(1.0) * SCALE_STEP;
    let side = view_box.width.max(view_box.height).max(1.0);
    wanted.min(MAX_TEXTURE_SIDE / side) as f32
}

pub fn to_screen(origin: Pos2, transform: &ViewportTransform, x: f64, y: f64) -> Pos2 {
    let (sx, sy) = transform.apply((x, y));
    Pos2::new(origin.x + sx as f32, origin.y + sy as f32)
}

pub fn screen_rect(origin: Pos2, transform: &ViewportTransform, r: Rect) -> egui::Rect {
    egui::Rect::from_min_max(
        to_screen(origin, transform, r.x, r.y),
        to_screen(origin, transform, r.right(), r.bottom()),
    )
}

/// `#rrggbb` to a color; anything else is `None`.
pub fn parse_hex(color: &str) -> Option<Color32> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub fn theme_color(theme: Theme, pick: fn(Theme) -> &'static str) -> Color32 {
    parse_hex(pick(theme)).unwrap_or(Color32::GRAY)
}

/// Rasterized copy of a scene, refreshed when the scene revision or the
/// requested scale changes.
pub struct SceneTexture {
    name: &'static str,
    texture: Option<TextureHandle>,
    view_box: Rect,
    key: Option<(u64, u32, Theme)>,
}

impl SceneTexture {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            texture: None,
            view_box: Rect::default(),
            key: None,
        }
    }

    /// Content area the texture covers.
    pub fn view_box(&self) -> Rect {
        self.view_box
    }

    pub fn is_ready(&self) -> bool {
        self.texture.is_some()
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn update(
        &mut self,
        ctx: &egui::Context,
        scene: &Scene,
        theme: Theme,
        revision: u64,
        k: f64,
    ) {
        let view_box = export_view_box(scene);
        let scale = raster_scale(k, ctx.pixels_per_point(), view_box);
        let key = (revision, scale.to_bits(), theme);
        if self.key == Some(key) {
            return;
        }
        self.key = Some(key);
        self.view_box = view_box;
        let svg = scene_to_svg(scene, theme);
        match rasterize(&svg, theme, scale) {
            Ok(pixmap) => {
                let size = [pixmap.width() as usize, pixmap.height() as usize];
                let image = egui::ColorImage::from_rgba_premultiplied(size, pixmap.data());
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::LINEAR),
                    None => {
                        self.texture = Some(ctx.load_texture(self.name, image, TextureOptions::LINEAR))
                    }
                }
                log::debug!("Rasterized {} at {scale}x ({}x{})", self.name, size[0], size[1]);
            }
            Err(e) => {
                log::warn!("Could not rasterize {}: {e}", self.name);
                self.texture = None;
            }
        }
    }

    /// Draws the texture so that content coordinates land where `transform`
    /// puts them relative to `origin`.
    pub fn paint(&self, painter: &egui::Painter, origin: Pos2, transform: &ViewportTransform) {
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                screen_rect(origin, transform, self.view_box),
                egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }

    /// Draws the whole texture into `rect`, e.g. the minimap.
    pub fn paint_into(&self, painter: &egui::Painter, rect: egui::Rect) {
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }
}

/// Strokes the outline of a path under the transform.
pub fn outline_path(
    painter: &egui::Painter,
    path: &PathData,
    origin: Pos2,
    transform: &ViewportTransform,
    stroke: Stroke,
) {
    for ring in path.flatten() {
        let points: Vec<Pos2> = ring
            .iter()
            .map(|p| to_screen(origin, transform, p.x, p.y))
            .collect();
        if points.len() > 1 {
            painter.add(egui::Shape::closed_line(points, stroke));
        }
    }
}

pub fn outline_rect(painter: &egui::Painter, rect: egui::Rect, stroke: Stroke) {
    let points = vec![
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    painter.add(egui::Shape::closed_line(points, stroke));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_scale_is_quantized_and_capped() {
        let small = Rect::new(0.0, 0.0, 1000.0, 500.0);
        assert_eq!(raster_scale(1.0, 1.0, small), 1.0);
        assert_eq!(raster_scale(1.2, 1.0, small), 1.5);
        assert_eq!(raster_scale(1.0, 2.0, small), 2.0);
        assert_eq!(raster_scale(0.5, 1.0, small), 1.0);
        assert!((raster_scale(5.0, 2.0, small) - 8.192).abs() < 1e-4);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex("#2563eb"), Some(Color32::from_rgb(0x25, 0x63, 0xeb)));
        assert_eq!(parse_hex("2563eb"), None);
        assert_eq!(parse_hex("#fff"), None);
    }

    #[test]
    fn content_maps_through_transform() {
        let t = ViewportTransform::new(2.0, 100.0, 50.0);
        let p = to_screen(Pos2::new(10.0, 20.0), &t, 5.0, 5.0);
        assert_eq!(p, Pos2::new(120.0, 80.0));
        let r = screen_rect(Pos2::ZERO, &t, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(r, egui::Rect::from_min_max(Pos2::new(100.0, 50.0), Pos2::new(120.0, 70.0)));
    }
}
