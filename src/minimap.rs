//! Maps the overview's content bounds into a small frame and back.

use synteny_protocol::ViewportTransform;
use synteny_render::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapFrame {
    content: Rect,
    size: (f64, f64),
    scale: f64,
    offset: (f64, f64),
}

impl MinimapFrame {
    /// Fits `content` into a `width` x `height` frame, centred, keeping its
    /// aspect ratio. Returns `None` for empty content.
    pub fn fit(content: Rect, width: f64, height: f64) -> Option<Self> {
        if content.width <= 0.0 || content.height <= 0.0 || width <= 0.0 || height <= 0.0 {
            return None;
        }
        let scale = (width / content.width).min(height / content.height);
        let offset = (
            (width - content.width * scale) / 2.0,
            (height - content.height * scale) / 2.0,
        );
        Some(Self {
            content,
            size: (width, height),
            scale,
            offset,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Where the content lands inside the frame.
    pub fn content_rect(&self) -> Rect {
        self.to_frame(self.content)
    }

    pub fn to_frame(&self, r: Rect) -> Rect {
        Rect::new(
            self.offset.0 + (r.x - self.content.x) * self.scale,
            self.offset.1 + (r.y - self.content.y) * self.scale,
            r.width * self.scale,
            r.height * self.scale,
        )
    }

    pub fn to_content(&self, p: (f64, f64)) -> (f64, f64) {
        (
            self.content.x + (p.0 - self.offset.0) / self.scale,
            self.content.y + (p.1 - self.offset.1) / self.scale,
        )
    }

    /// The viewport indicator for a visible region, clipped to the frame.
    pub fn indicator(&self, visible: Rect) -> Rect {
        let r = self.to_frame(visible);
        let x0 = r.x.clamp(0.0, self.size.0);
        let y0 = r.y.clamp(0.0, self.size.1);
        let x1 = r.right().clamp(0.0, self.size.0);
        let y1 = r.bottom().clamp(0.0, self.size.1);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Transform that centres the main view on the content point under a
    /// minimap click, keeping the zoom level.
    pub fn recenter(
        &self,
        click: (f64, f64),
        current: &ViewportTransform,
        container: (f64, f64),
    ) -> ViewportTransform {
        let (cx, cy) = self.to_content(click);
        ViewportTransform::new(
            current.k,
            container.0 / 2.0 - cx * current.k,
            container.1 / 2.0 - cy * current.k,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_wide_content() {
        let frame = MinimapFrame::fit(Rect::new(0.0, 0.0, 1000.0, 500.0), 200.0, 200.0).unwrap();
        assert_eq!(frame.scale(), 0.2);
        assert_eq!(frame.content_rect(), Rect::new(0.0, 50.0, 200.0, 100.0));
        assert!(MinimapFrame::fit(Rect::default(), 200.0, 200.0).is_none());
    }

    #[test]
    fn indicator_tracks_visible_region() {
        let frame = MinimapFrame::fit(Rect::new(0.0, 0.0, 1000.0, 1000.0), 100.0, 100.0).unwrap();
        assert_eq!(
            frame.indicator(Rect::new(100.0, 200.0, 400.0, 300.0)),
            Rect::new(10.0, 20.0, 40.0, 30.0)
        );
        assert_eq!(
            frame.indicator(Rect::new(-500.0, 0.0, 1000.0, 2000.0)),
            Rect::new(0.0, 0.0, 50.0, 100.0)
        );
    }

    #[test]
    fn click_recenters_at_same_zoom() {
        let frame = MinimapFrame::fit(Rect::new(0.0, 0.0, 1000.0, 1000.0), 100.0, 100.0).unwrap();
        let t = frame.recenter((50.0, 50.0), &ViewportTransform::new(2.0, 0.0, 0.0), (800.0, 600.0));
        assert_eq!(t, ViewportTransform::new(2.0, 400.0 - 1000.0, 300.0 - 1000.0));
    }
}
