/// Background and shape intensities of the synthetic scenes.
pub const BACKGROUND: f64 = 200.0;
pub const FOREGROUND: f64 = 20.0;

/// Sub-samples per pixel axis used for anti-aliasing.
const SUPERSAMPLE: usize = 6;

/// True when `p` lies inside the convex polygon, in either winding.
pub fn inside_convex(corners: &[[f64; 2]], p: [f64; 2]) -> bool {
    let n = corners.len();
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = corners[i];
        let b = corners[(i + 1) % n];
        let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Render dark convex polygons on a bright background with area coverage.
///
/// `to_scene` maps an image position into the frame the polygons are defined
/// in; use the identity for an undistorted image.
pub fn render_polygons_u8<F>(
    width: usize,
    height: usize,
    polygons: &[Vec<[f64; 2]>],
    to_scene: F,
) -> Vec<u8>
where
    F: Fn(f64, f64) -> [f64; 2],
{
    let step = 1.0 / SUPERSAMPLE as f64;
    let total = (SUPERSAMPLE * SUPERSAMPLE) as f64;
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut hits = 0usize;
            for sy in 0..SUPERSAMPLE {
                for sx in 0..SUPERSAMPLE {
                    let px = x as f64 - 0.5 + (sx as f64 + 0.5) * step;
                    let py = y as f64 - 0.5 + (sy as f64 + 0.5) * step;
                    let p = to_scene(px, py);
                    if polygons.iter().any(|poly| inside_convex(poly, p)) {
                        hits += 1;
                    }
                }
            }
            let c = hits as f64 / total;
            img[y * width + x] = (FOREGROUND * c + BACKGROUND * (1.0 - c)).round() as u8;
        }
    }
    img
}

/// Render one undistorted dark polygon.
pub fn render_polygon_u8(width: usize, height: usize, corners: &[[f64; 2]]) -> Vec<u8> {
    render_polygons_u8(width, height, &[corners.to_vec()], |x, y| [x, y])
}

/// Invert intensities, turning a dark shape into a bright one.
pub fn invert(img: &[u8]) -> Vec<u8> {
    img.iter().map(|&v| 220 - v.min(220)).collect()
}

/// Mask of pixels darker than `threshold`.
pub fn threshold_below(img: &[u8], threshold: u8) -> Vec<u8> {
    img.iter().map(|&v| u8::from(v < threshold)).collect()
}
