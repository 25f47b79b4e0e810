//! Points, rectangles and path data in content coordinates.

use std::fmt::Write;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn polar(center: Point, radius: f64, angle: f64) -> Self {
        Self {
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn expand(&self, by: f64) -> Rect {
        Rect::new(
            self.x - by,
            self.y - by,
            self.width + 2.0 * by,
            self.height + 2.0 * by,
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// SVG-style path data kept as commands so it can be serialized, measured
/// and hit-tested without a rendering backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    commands: Vec<PathCommand>,
}

const CURVE_STEPS: usize = 16;

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn quad_to(mut self, c: Point, p: Point) -> Self {
        self.commands.push(PathCommand::QuadTo(c, p));
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, p: Point) -> Self {
        self.commands.push(PathCommand::CubicTo(c1, c2, p));
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Appends straight segments along a circular arc, excluding the start point.
    pub fn arc_to(mut self, center: Point, radius: f64, from_angle: f64, to_angle: f64) -> Self {
        let steps = (((to_angle - from_angle).abs() / std::f64::consts::PI) * 64.0).ceil() as usize;
        let steps = steps.max(1);
        for i in 1..=steps {
            let a = from_angle + (to_angle - from_angle) * (i as f64 / steps as f64);
            self.commands
                .push(PathCommand::LineTo(Point::polar(center, radius, a)));
        }
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        for cmd in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = match cmd {
                PathCommand::MoveTo(p) => write!(d, "M {:.3} {:.3}", p.x, p.y),
                PathCommand::LineTo(p) => write!(d, "L {:.3} {:.3}", p.x, p.y),
                PathCommand::QuadTo(c, p) => {
                    write!(d, "Q {:.3} {:.3} {:.3} {:.3}", c.x, c.y, p.x, p.y)
                }
                PathCommand::CubicTo(c1, c2, p) => write!(
                    d,
                    "C {:.3} {:.3} {:.3} {:.3} {:.3} {:.3}",
                    c1.x, c1.y, c2.x, c2.y, p.x, p.y
                ),
                PathCommand::Close => write!(d, "Z"),
            };
        }
        d
    }

    /// Polylines approximating each subpath; curves are sampled at a fixed step count.
    pub fn flatten(&self) -> Vec<Vec<Point>> {
        let mut subpaths: Vec<Vec<Point>> = vec![];
        let mut current: Vec<Point> = vec![];
        let mut cursor = Point::default();
        let mut start = Point::default();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        subpaths.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(p);
                    cursor = p;
                    start = p;
                }
                PathCommand::LineTo(p) => {
                    current.push(p);
                    cursor = p;
                }
                PathCommand::QuadTo(c, p) => {
                    for i in 1..=CURVE_STEPS {
                        let t = i as f64 / CURVE_STEPS as f64;
                        let mt = 1.0 - t;
                        current.push(Point::new(
                            mt * mt * cursor.x + 2.0 * mt * t * c.x + t * t * p.x,
                            mt * mt * cursor.y + 2.0 * mt * t * c.y + t * t * p.y,
                        ));
                    }
                    cursor = p;
                }
                PathCommand::CubicTo(c1, c2, p) => {
                    for i in 1..=CURVE_STEPS {
                        let t = i as f64 / CURVE_STEPS as f64;
                        let mt = 1.0 - t;
                        let a = mt * mt * mt;
                        let b = 3.0 * mt * mt * t;
                        let c = 3.0 * mt * t * t;
                        let e = t * t * t;
                        current.push(Point::new(
                            a * cursor.x + b * c1.x + c * c2.x + e * p.x,
                            a * cursor.y + b * c1.y + c * c2.y + e * p.y,
                        ));
                    }
                    cursor = p;
                }
                PathCommand::Close => {
                    current.push(start);
                    cursor = start;
                }
            }
        }
        if current.len() > 1 {
            subpaths.push(current);
        }
        subpaths
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(self.flatten().into_iter().flatten())
    }

    /// Even-odd containment over the flattened outline.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for poly in self.flatten() {
            let n = poly.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (poly[i], poly[j]);
                if (a.y > p.y) != (b.y > p.y) {
                    let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                    if p.x < x_cross {
                        inside = !inside;
                    }
                }
                j = i;
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_union_and_contains() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, -5.0, 25.0, 15.0));
        assert!(u.contains(Point::new(24.0, -4.0)));
        assert!(!a.contains(Point::new(11.0, 5.0)));
    }

    #[test]
    fn path_serializes_commands() {
        let d = PathData::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .cubic_to(Point::new(10.0, 5.0), Point::new(0.0, 5.0), Point::new(0.0, 10.0))
            .close()
            .to_svg_d();
        assert!(d.starts_with("M 0.000 0.000 L 10.000 0.000 C "));
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn closed_square_contains_interior_point_only() {
        let square = PathData::new()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .line_to(Point::new(10.0, 10.0))
            .line_to(Point::new(0.0, 10.0))
            .close();
        assert!(square.contains(Point::new(5.0, 5.0)));
        assert!(!square.contains(Point::new(15.0, 5.0)));
        assert_eq!(square.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn cubic_bounds_stay_within_hull() {
        let path = PathData::new()
            .move_to(Point::new(0.0, 0.0))
            .cubic_to(Point::new(0.0, 50.0), Point::new(100.0, 50.0), Point::new(100.0, 100.0));
        let b = path.bounds().unwrap();
        assert!(b.x >= 0.0 && b.right() <= 100.0);
        assert!(b.y >= 0.0 && b.bottom() <= 100.0);
    }
}
