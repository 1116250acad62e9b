//! Integer circle rasterization.

use std::collections::HashSet;

use sholl_core::RasterPoint;

use crate::bounds::Bounds;

/// One octant of a circle of integer `radius` around the origin, from
/// `(0, radius)` towards the diagonal.
fn octant(radius: i32) -> Vec<(i32, i32)> {
    let (mut x, mut y, mut err) = (0, radius, 0);
    let mut points = Vec::with_capacity(usize::try_from(radius).unwrap_or(0) + 1);
    loop {
        points.push((x, y));
        let err_right = err + 2 * x + 1;
        let err_down = err - 2 * y + 1;
        if err_down.abs() < err_right.abs() {
            y -= 1;
            err = err_down;
        } else {
            x += 1;
            err = err_right;
        }
        if x > y {
            break;
        }
    }
    points
}

/// Pixels on the circle of integer `radius` around `center`, in traversal
/// order around the circumference.
///
/// The first octant is rasterized with the midpoint rule and mirrored into
/// the remaining seven. Coordinates shared by adjacent octants appear once;
/// pixels outside `bounds` are dropped. A zero radius yields the center.
#[must_use]
pub fn points_on_circle(center: RasterPoint, radius: i32, bounds: &Bounds) -> Vec<RasterPoint> {
    if radius <= 0 {
        return if bounds.contains_xy(center.x, center.y) {
            vec![center]
        } else {
            Vec::new()
        };
    }

    let oct = octant(radius);
    let m = oct.len();
    let mut ring = vec![(0, 0); m * 8];
    for (i, &(x, y)) in oct.iter().enumerate() {
        ring[i] = (x, y);
        ring[m * 2 - i - 1] = (y, x);
        ring[m * 2 + i] = (y, -x);
        ring[m * 4 - i - 1] = (x, -y);
        ring[m * 4 + i] = (-x, -y);
        ring[m * 6 - i - 1] = (-y, -x);
        ring[m * 6 + i] = (-y, x);
        ring[m * 8 - i - 1] = (-x, y);
    }

    let mut seen = HashSet::with_capacity(ring.len());
    ring.into_iter()
        .map(|(dx, dy)| RasterPoint::new(center.x + dx, center.y + dy, center.z))
        .filter(|p| bounds.contains_xy(p.x, p.y) && seen.insert(*p))
        .collect()
}
