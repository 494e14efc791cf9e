//! Single-pass connected component labeling with contour tracing
//! (Chang, Chen & Lu 2004).
//!
//! The mask is copied into a buffer padded by one background pixel on every
//! side so the tracer never needs bounds checks. Background pixels visited
//! while searching around a boundary are marked `-1`; an unmarked background
//! pixel below a foreground pixel therefore always starts a new hole boundary.

use super::{ConnectRule, Contour, ContourTracer};
use crate::image::{ImageI32, ImageU8};
use crate::types::Point2i;

const FOREGROUND: i8 = 1;
const BACKGROUND: i8 = 0;
const VISITED: i8 = -1;

// clockwise on screen, starting east
const OFFSETS_8: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const OFFSETS_4: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

#[derive(Clone, Debug, Default)]
pub struct LinearContourLabeler {
    rule: ConnectRule,
    padded: Vec<i8>,
    stride: usize,
}

impl LinearContourLabeler {
    pub fn new(rule: ConnectRule) -> Self {
        Self {
            rule,
            padded: Vec::new(),
            stride: 0,
        }
    }

    pub fn rule(&self) -> ConnectRule {
        self.rule
    }

    fn offsets(&self) -> &'static [(isize, isize)] {
        match self.rule {
            ConnectRule::Four => &OFFSETS_4,
            ConnectRule::Eight => &OFFSETS_8,
        }
    }

    fn initial_direction(&self, external: bool) -> usize {
        match (self.rule, external) {
            (ConnectRule::Eight, true) => 7,
            (ConnectRule::Eight, false) => 3,
            (ConnectRule::Four, true) => 0,
            (ConnectRule::Four, false) => 2,
        }
    }

    /// Where to start searching around a pixel reached by moving along `dir`.
    fn next_search(&self, dir: usize) -> usize {
        match self.rule {
            ConnectRule::Four => (dir + 3) % 4,
            ConnectRule::Eight => (dir + 6) % 8,
        }
    }

    fn pad(&mut self, binary: &ImageU8<'_>) {
        let (w, h) = (binary.w, binary.h);
        self.stride = w + 2;
        self.padded.clear();
        self.padded.resize((w + 2) * (h + 2), BACKGROUND);
        for y in 0..h {
            let dst = (y + 1) * self.stride + 1;
            for x in 0..w {
                if binary.is_set(x, y) {
                    self.padded[dst + x] = FOREGROUND;
                }
            }
        }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> i8 {
        self.padded[y * self.stride + x]
    }

    /// Clockwise search around `(x, y)` starting at `dir`. Returns the first
    /// foreground neighbour and the direction that reaches it.
    fn search(&mut self, x: usize, y: usize, dir: usize) -> Option<(usize, usize, usize)> {
        let offsets = self.offsets();
        for i in 0..offsets.len() {
            let d = (dir + i) % offsets.len();
            let (dx, dy) = offsets[d];
            let nx = (x as isize + dx) as usize;
            let ny = (y as isize + dy) as usize;
            let idx = ny * self.stride + nx;
            if self.padded[idx] == FOREGROUND {
                return Some((nx, ny, d));
            }
            self.padded[idx] = VISITED;
        }
        None
    }

    /// Follow one boundary starting at padded position `(sx, sy)`, labeling
    /// every boundary pixel.
    fn trace(
        &mut self,
        label: i32,
        sx: usize,
        sy: usize,
        external: bool,
        labeled: &mut ImageI32,
    ) -> Vec<Point2i> {
        let mut contour = Vec::new();
        let mut add = |x: usize, y: usize, contour: &mut Vec<Point2i>| {
            labeled.set(x - 1, y - 1, label);
            contour.push(Point2i::new(x as i32 - 1, y as i32 - 1));
        };

        add(sx, sy, &mut contour);
        let Some((tx, ty, mut dir)) = self.search(sx, sy, self.initial_direction(external)) else {
            return contour;
        };

        let (mut x, mut y) = (tx, ty);
        loop {
            let Some((nx, ny, nd)) = self.search(x, y, self.next_search(dir)) else {
                break;
            };
            if x == sx && y == sy && nx == tx && ny == ty {
                break;
            }
            add(x, y, &mut contour);
            x = nx;
            y = ny;
            dir = nd;
        }
        contour
    }
}

/// Label of the pixel left of padded position `(x, y)`, 0 in the first column.
fn left_label(labeled: &ImageI32, x: usize, y: usize) -> i32 {
    if x > 1 {
        labeled.get(x - 2, y - 1)
    } else {
        0
    }
}

impl ContourTracer for LinearContourLabeler {
    fn process(&mut self, binary: &ImageU8<'_>, labeled: &mut ImageI32) -> Vec<Contour> {
        let (w, h) = (binary.w, binary.h);
        labeled.reshape(w, h);
        self.pad(binary);

        let mut contours: Vec<Contour> = Vec::new();
        for y in 1..=h {
            for x in 1..=w {
                if self.at(x, y) != FOREGROUND {
                    continue;
                }
                let mut label = labeled.get(x - 1, y - 1);
                if label == 0 && self.at(x, y - 1) != FOREGROUND {
                    let id = contours.len() + 1;
                    label = id as i32;
                    let external = self.trace(label, x, y, true, labeled);
                    contours.push(Contour {
                        id,
                        external,
                        internal: Vec::new(),
                    });
                }
                // a pixel that starts an outer boundary can also sit on top of a hole
                if self.at(x, y + 1) == BACKGROUND {
                    if label == 0 {
                        label = left_label(labeled, x, y);
                    }
                    debug_assert!(label > 0, "hole below ({}, {}) has no owner", x - 1, y - 1);
                    let hole = self.trace(label, x, y, false, labeled);
                    if let Some(c) = contours.get_mut((label as usize).wrapping_sub(1)) {
                        c.internal.push(hole);
                    }
                } else if label == 0 {
                    label = left_label(labeled, x, y);
                    labeled.set(x - 1, y - 1, label);
                }
            }
        }
        contours
    }
}
