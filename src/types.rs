use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate on a traced contour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_f64(self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }
}

/// Vertex ordering convention.
///
/// Orientation is measured with the shoelace formula on raw pixel
/// coordinates: `CounterClockwise` means a positive signed area when `x` points
/// right and `y` points up. Because image rows grow downwards, a
/// counter-clockwise polygon appears clockwise when drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

/// Ordered polygon with floating-point vertices in image pixel coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Polygon {
    pub vertices: Vec<Point2<f64>>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point2<f64>>) -> Self {
        Self { vertices }
    }

    /// Polygon with `n` vertices at the origin.
    pub fn with_len(n: usize) -> Self {
        Self {
            vertices: vec![Point2::origin(); n],
        }
    }

    /// Polygon built from the contour points selected by `splits`.
    pub fn from_splits(contour: &[Point2i], splits: &[usize]) -> Self {
        Self {
            vertices: splits.iter().map(|&i| contour[i].to_f64()).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Shoelace signed area, positive for counter-clockwise order.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            total += a.x * b.y - b.x * a.y;
        }
        0.5 * total
    }

    /// Unsigned area. Only meaningful for simple polygons.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn winding(&self) -> Winding {
        if self.is_ccw() {
            Winding::CounterClockwise
        } else {
            Winding::Clockwise
        }
    }

    /// True when every turn has the same, non-zero orientation.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut positive = 0usize;
        let mut negative = 0usize;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let cross = (b - a).perp(&(c - b));
            if cross > 0.0 {
                positive += 1;
            } else if cross < 0.0 {
                negative += 1;
            }
        }
        positive == n || negative == n
    }

    /// Reverse the vertex order while keeping vertex 0 in place.
    pub fn flip(&mut self) {
        if self.vertices.len() > 2 {
            self.vertices[1..].reverse();
        }
    }

    /// Vertex centroid.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2::new(sx / n, sy / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ])
    }

    #[test]
    fn signed_area_tracks_orientation() {
        let mut poly = square();
        assert!((poly.signed_area() - 16.0).abs() < 1e-12);
        assert_eq!(poly.winding(), Winding::CounterClockwise);
        poly.flip();
        assert!((poly.signed_area() + 16.0).abs() < 1e-12);
        assert_eq!(poly.winding(), Winding::Clockwise);
        assert_eq!(poly.vertices[0], Point2::new(0.0, 0.0));
        assert_eq!(poly.vertices[1], Point2::new(0.0, 4.0));
    }

    #[test]
    fn convexity_rejects_dents_and_collinear_vertices() {
        assert!(square().is_convex());

        let dented = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ]);
        assert!(!dented.is_convex());

        let collinear = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
        ]);
        assert!(!collinear.is_convex());
    }
}
