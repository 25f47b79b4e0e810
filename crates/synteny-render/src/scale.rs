//! Base-pair to pixel (and base-pair to angle) mappings.

use crate::geometry::Point;

/// Monotonic linear mapping from a genomic domain onto an output range.
///
/// A zero-width domain never divides: every position maps to the start of the
/// range and inversion returns the start of the domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// `[0, max_bp] -> [0, width]`, the layout's shared chromosome scale.
    pub fn for_layout(max_bp: u64, width: f64) -> Self {
        Self::new((0.0, max_bp as f64), (0.0, width))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain.1 == self.domain.0
    }

    pub fn scale(&self, position: f64) -> f64 {
        if self.is_degenerate() {
            return self.range.0;
        }
        let t = (position - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    pub fn scale_bp(&self, position: u64) -> f64 {
        self.scale(position as f64)
    }

    pub fn invert(&self, value: f64) -> f64 {
        if self.is_degenerate() || self.range.1 == self.range.0 {
            return self.domain.0;
        }
        let t = (value - self.range.0) / (self.range.1 - self.range.0);
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }

    /// Pixel length of `[start, end]` under this scale.
    pub fn span(&self, start: u64, end: u64) -> f64 {
        self.scale_bp(end) - self.scale_bp(start)
    }
}

/// Position-to-angle mapping for one arc of the radial view. Angles are in
/// radians, measured clockwise from the positive x axis (screen coordinates).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularScale {
    inner: LinearScale,
}

impl AngularScale {
    pub fn new(size_bp: u64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            inner: LinearScale::new((0.0, size_bp as f64), (start_angle, end_angle)),
        }
    }

    pub fn angle(&self, position: u64) -> f64 {
        self.inner.scale_bp(position)
    }

    pub fn position(&self, angle: f64) -> f64 {
        self.inner.invert(angle)
    }

    pub fn start_angle(&self) -> f64 {
        self.inner.range().0
    }

    pub fn end_angle(&self) -> f64 {
        self.inner.range().1
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle() - self.start_angle()
    }

    pub fn point(&self, position: u64, center: Point, radius: f64) -> Point {
        Point::polar(center, radius, self.angle(position))
    }
}
