//! Static export of a scene: theme-aware SVG text, or a 2x PNG/JPG raster
//! with a background fill and a small caption in the bottom-right corner.
//!
//! The export always covers the full content bounding box plus a fixed
//! padding, independent of any pan or zoom applied in the viewer.

use crate::geometry::Rect;
use crate::scene::{LinearGradient, NodeId, NodeKind, Paint, Scene, Style};
use crate::theme::Theme;
use chrono::NaiveDateTime;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use lazy_static::lazy_static;
use resvg::{tiny_skia, usvg};
use std::error::Error;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use svg::node::element::{
    Circle, Definitions, Group, Line, LinearGradient as SvgGradient, Path as SvgPath, Rectangle,
    Stop, Style as SvgStyle, Text,
};
use svg::{Document, Node};

/// Space added on every side of the content bounding box.
pub const EXPORT_PADDING: f64 = 20.0;
pub const RASTER_SCALE: f32 = 2.0;
pub const ATTRIBUTION: &str = "Synteny Viewer";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

lazy_static! {
    static ref FONT_DB: Arc<usvg::fontdb::Database> = {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Jpg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Svg, ExportFormat::Png, ExportFormat::Jpg];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
        }
    }

    pub fn is_raster(self) -> bool {
        self != ExportFormat::Svg
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Svg(String),
    Pixmap { width: u32, height: u32 },
    Encode(String),
    Io(std::io::Error),
    Cancelled,
    TimedOut,
}

impl Error for ExportError {}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportError::Svg(e) => write!(f, "could not load exported SVG: {e}"),
            ExportError::Pixmap { width, height } => {
                write!(f, "could not allocate a {width}x{height} raster")
            }
            ExportError::Encode(e) => write!(f, "image encoding failed: {e}"),
            ExportError::Io(e) => write!(f, "IO error: {e}"),
            ExportError::Cancelled => write!(f, "export cancelled"),
            ExportError::TimedOut => write!(f, "export timed out"),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::Encode(err.to_string())
    }
}

/// Shared flag a caller flips to abandon an export in flight.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub theme: Theme,
    /// 1..=100, JPG only.
    pub jpeg_quality: u8,
    pub caption: String,
    pub cancel: Option<CancelToken>,
    pub deadline: Option<Instant>,
}

impl ExportOptions {
    pub fn new(format: ExportFormat, theme: Theme) -> Self {
        Self {
            format,
            theme,
            jpeg_quality: 92,
            caption: ATTRIBUTION.to_string(),
            cancel: None,
            deadline: None,
        }
    }

    fn check(&self) -> Result<(), ExportError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(ExportError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(ExportError::TimedOut);
        }
        Ok(())
    }
}

/// Content bounding box grown by [`EXPORT_PADDING`]. An empty scene exports
/// as a blank padding-only canvas.
pub fn export_view_box(scene: &Scene) -> Rect {
    scene
        .bounding_box()
        .unwrap_or_default()
        .expand(EXPORT_PADDING)
}

fn theme_stylesheet(theme: Theme) -> String {
    format!(
        "text {{ font-family: sans-serif; }}\n\
         .chromosome-label, .marker-label {{ fill: {text}; }}\n\
         .tick-label, .breakpoint-label, .caption {{ fill: {muted}; }}\n\
         .chromosome-body {{ stroke: {stroke}; }}\n",
        text = theme.text(),
        muted = theme.muted_text(),
        stroke = theme.stroke(),
    )
}

fn apply_style<N: Node>(node: &mut N, style: &Style) {
    if let Some(fill) = &style.fill {
        let value = match fill {
            Paint::Color(c) => c.clone(),
            Paint::Gradient(id) => format!("url(#{id})"),
        };
        node.assign("fill", value);
    }
    if let Some(stroke) = &style.stroke {
        node.assign("stroke", stroke.clone());
    }
    if let Some(w) = style.stroke_width {
        node.assign("stroke-width", w);
    }
    if let Some(o) = style.opacity {
        node.assign("opacity", o);
    }
    if let Some(o) = style.fill_opacity {
        node.assign("fill-opacity", o);
    }
    if let Some(o) = style.stroke_opacity {
        node.assign("stroke-opacity", o);
    }
    if let Some(weight) = &style.font_weight {
        node.assign("font-weight", weight.clone());
    }
    if let Some(class) = &style.class {
        node.assign("class", class.clone());
    }
}

fn gradient_element(gradient: &LinearGradient) -> SvgGradient {
    let mut element = SvgGradient::new()
        .set("id", gradient.id.clone())
        .set("x1", gradient.from.x)
        .set("y1", gradient.from.y)
        .set("x2", gradient.to.x)
        .set("y2", gradient.to.y);
    for stop in &gradient.stops {
        element = element.add(
            Stop::new()
                .set("offset", stop.offset)
                .set("stop-color", stop.color.clone())
                .set("stop-opacity", stop.opacity),
        );
    }
    element
}

fn append_children<N: Node>(scene: &Scene, id: NodeId, target: &mut N) {
    let Some(node) = scene.node(id) else {
        return;
    };
    for child_id in node.children() {
        let Some(child) = scene.node(*child_id) else {
            continue;
        };
        if child.style.hidden {
            continue;
        }
        let style = &child.style;
        match &child.kind {
            NodeKind::Group => {
                let mut group = Group::new();
                apply_style(&mut group, style);
                append_children(scene, *child_id, &mut group);
                target.append(group);
            }
            NodeKind::Path(data) => {
                let mut path = SvgPath::new().set("d", data.to_svg_d());
                apply_style(&mut path, style);
                target.append(path);
            }
            NodeKind::Rect {
                rect,
                corner_radius,
            } => {
                let mut element = Rectangle::new()
                    .set("x", rect.x)
                    .set("y", rect.y)
                    .set("width", rect.width)
                    .set("height", rect.height);
                if *corner_radius > 0.0 {
                    element = element.set("rx", *corner_radius);
                }
                apply_style(&mut element, style);
                target.append(element);
            }
            NodeKind::Text {
                position,
                content,
                anchor,
                font_size,
            } => {
                let mut text = Text::new(content.clone())
                    .set("x", position.x)
                    .set("y", position.y)
                    .set("text-anchor", anchor.as_svg())
                    .set("font-size", *font_size);
                apply_style(&mut text, style);
                target.append(text);
            }
            NodeKind::Line { from, to } => {
                let mut line = Line::new()
                    .set("x1", from.x)
                    .set("y1", from.y)
                    .set("x2", to.x)
                    .set("y2", to.y);
                apply_style(&mut line, style);
                target.append(line);
            }
            NodeKind::Circle { center, radius } => {
                let mut circle = Circle::new()
                    .set("cx", center.x)
                    .set("cy", center.y)
                    .set("r", *radius);
                apply_style(&mut circle, style);
                target.append(circle);
            }
        }
    }
}

fn build_document(scene: &Scene, theme: Theme, caption: Option<&str>) -> Document {
    let vb = export_view_box(scene);
    let mut defs = Definitions::new();
    for gradient in scene.gradients() {
        defs = defs.add(gradient_element(gradient));
    }
    let mut doc = Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set(
            "viewBox",
            format!("{} {} {} {}", vb.x, vb.y, vb.width, vb.height),
        )
        .set("width", vb.width)
        .set("height", vb.height)
        .add(SvgStyle::new(theme_stylesheet(theme)))
        .add(defs);
    append_children(scene, scene.root(), &mut doc);
    if let Some(caption) = caption.filter(|c| !c.is_empty()) {
        doc = doc.add(
            Text::new(caption.to_string())
                .set("x", vb.right() - 6.0)
                .set("y", vb.bottom() - 6.0)
                .set("text-anchor", "end")
                .set("font-size", 9)
                .set("class", "caption")
                .set("fill", theme.muted_text()),
        );
    }
    doc
}

/// Serializes `scene` with an XML declaration and a theme stylesheet.
pub fn scene_to_svg(scene: &Scene, theme: Theme) -> String {
    format!("{XML_DECLARATION}{}", build_document(scene, theme, None))
}

/// Rasterizes SVG text at `scale` over an opaque theme background.
pub fn rasterize(svg: &str, theme: Theme, scale: f32) -> Result<tiny_skia::Pixmap, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = FONT_DB.clone();
    let tree =
        usvg::Tree::from_data(svg.as_bytes(), &opt).map_err(|e| ExportError::Svg(e.to_string()))?;
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
    let [r, g, b] = theme.background_rgb();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn encode(pixmap: &tiny_skia::Pixmap, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut out = vec![];
    match options.format {
        ExportFormat::Png => {
            PngEncoder::new(&mut out).write_image(
                pixmap.data(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpg => {
            // The background is opaque, so premultiplied and straight RGB agree.
            let rgb: Vec<u8> = pixmap
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            JpegEncoder::new_with_quality(&mut out, options.jpeg_quality.clamp(1, 100))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)?;
        }
        ExportFormat::Svg => return Err(ExportError::Encode("SVG is not a raster".to_string())),
    }
    Ok(out)
}

/// Produces the file contents for `options.format`.
pub fn export_bytes(scene: &Scene, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    options.check()?;
    if !options.format.is_raster() {
        return Ok(scene_to_svg(scene, options.theme).into_bytes());
    }
    let svg = format!(
        "{XML_DECLARATION}{}",
        build_document(scene, options.theme, Some(&options.caption))
    );
    options.check()?;
    let pixmap = rasterize(&svg, options.theme, RASTER_SCALE)?;
    options.check()?;
    encode(&pixmap, options)
}

/// Writes the export to `path` through a temporary file in the same
/// directory. Nothing is left behind when any step fails or is cancelled.
pub fn export_to_path(
    scene: &Scene,
    path: &Path,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let bytes = match export_bytes(scene, options) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Export to {} failed: {e}", path.display());
            return Err(e);
        }
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    options.check()?;
    tmp.persist(path).map_err(|e| ExportError::Io(e.error))?;
    log::info!(
        "Exported {} ({} bytes) to {}",
        options.format.extension(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// `synteny-view-YYYYMMDD-HHMMSS.<ext>`
pub fn timestamped_filename(format: ExportFormat, at: &NaiveDateTime) -> String {
    format!(
        "synteny-view-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::scene::TextAnchor;
    use chrono::NaiveDate;
    use svg::node::element::tag::Type;
    use svg::parser::Event;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.create_group(root);
        let rect = scene.create_rect(g, Rect::new(10.0, 20.0, 100.0, 30.0), 0.0);
        scene.style_mut(rect).unwrap().fill = Some(Paint::color("#ff0000"));
        let label = scene.create_text(g, Point::new(60.0, 15.0), "chr1", TextAnchor::Middle, 10.0);
        scene.style_mut(label).unwrap().class = Some("chromosome-label".to_string());
        scene
    }

    fn root_view_box(text: &str) -> Vec<f64> {
        for event in svg::read(text).unwrap() {
            if let Event::Tag("svg", Type::Start, attributes) = event {
                return attributes["viewBox"]
                    .split_whitespace()
                    .map(|v| v.parse().unwrap())
                    .collect();
            }
        }
        panic!("no root svg element");
    }

    #[test]
    fn view_box_is_content_plus_padding() {
        let scene = scene();
        let bounds = scene.bounding_box().unwrap();
        for theme in [Theme::Light, Theme::Dark] {
            let text = scene_to_svg(&scene, theme);
            assert!(text.starts_with("<?xml"));
            assert!(text.contains(theme.text()));
            let vb = root_view_box(&text);
            assert!((vb[2] - (bounds.width + 2.0 * EXPORT_PADDING)).abs() < 1e-9);
            assert!((vb[3] - (bounds.height + 2.0 * EXPORT_PADDING)).abs() < 1e-9);
        }
    }

    #[test]
    fn hidden_nodes_are_not_exported() {
        let mut scene = scene();
        let root = scene.root();
        let hidden = scene.create_circle(root, Point::new(500.0, 500.0), 5.0);
        scene.style_mut(hidden).unwrap().hidden = true;
        assert!(!scene_to_svg(&scene, Theme::Light).contains("<circle"));
    }

    #[test]
    fn png_is_rendered_at_double_density() {
        let scene = scene();
        let bytes = export_bytes(&scene, &ExportOptions::new(ExportFormat::Png, Theme::Dark)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        let vb = export_view_box(&scene);
        assert_eq!(decoded.width(), (vb.width * 2.0).ceil() as u32);
        assert_eq!(decoded.height(), (vb.height * 2.0).ceil() as u32);
        // Corner pixel carries the theme background.
        let px = decoded.to_rgba8().get_pixel(0, 0).0;
        assert_eq!(&px[..3], &Theme::Dark.background_rgb());
    }

    #[test]
    fn jpg_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        export_to_path(&scene(), &path, &ExportOptions::new(ExportFormat::Jpg, Theme::Light)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn cancelled_export_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let token = CancelToken::new();
        token.cancel();
        let options = ExportOptions {
            cancel: Some(token),
            ..ExportOptions::new(ExportFormat::Png, Theme::Light)
        };
        assert!(matches!(
            export_to_path(&scene(), &path, &options),
            Err(ExportError::Cancelled)
        ));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn expired_deadline_times_out() {
        let options = ExportOptions {
            deadline: Some(Instant::now()),
            ..ExportOptions::new(ExportFormat::Svg, Theme::Light)
        };
        assert!(matches!(
            export_bytes(&scene(), &options),
            Err(ExportError::TimedOut)
        ));
    }

    #[test]
    fn empty_scene_exports_padding_only() {
        let vb = root_view_box(&scene_to_svg(&Scene::new(), Theme::Light));
        assert_eq!(vb, vec![-EXPORT_PADDING, -EXPORT_PADDING, 2.0 * EXPORT_PADDING, 2.0 * EXPORT_PADDING]);
    }

    #[test]
    fn filenames_are_timestamped() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        assert_eq!(
            timestamped_filename(ExportFormat::Png, &at),
            "synteny-view-20240307-090501.png"
        );
        assert_eq!("JPEG".parse::<ExportFormat>(), Ok(ExportFormat::Jpg));
    }
}
