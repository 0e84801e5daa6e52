//! Pole-of-inaccessibility label placement.
//!
//! A quadtree-subdivision search (the "polylabel" algorithm): repeatedly
//! split the cell with the best possible distance bound until no remaining
//! cell can beat the incumbent by more than the precision tolerance. The
//! max-heap orders cells with a local wrapper around `f64::total_cmp`
//! rather than pulling in an ordered-float dependency.

use crate::types::Ring;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Stop subdividing once a cell's best-possible distance can't beat the
/// incumbent by more than this many pixels.
const PRECISION: f64 = 1.0;

/// Find the point of a polygon (outer ring plus holes) farthest from any
/// boundary edge: the spot with the most room to print a label.
///
/// Returns `None` when no interior cell has a positive signed distance (no
/// placement can be computed), per the rule that stage 5 drops placements
/// it can't compute rather than emitting an invalid point.
pub fn pole_of_inaccessibility(outer: &Ring, holes: &[Ring]) -> Option<(f64, f64)> {
    let (min_x, min_y, max_x, max_y) = bounding_box(outer);
    let width = max_x - min_x;
    let height = max_y - min_y;
    let cell_size = width.min(height);

    if cell_size <= 0.0 {
        return None;
    }

    let mut heap = BinaryHeap::new();
    let mut half = cell_size / 2.0;

    let mut y = min_y;
    while y < max_y {
        let mut x = min_x;
        while x < max_x {
            heap.push(Cell::new(x + half, y + half, half, outer, holes));
            x += cell_size;
        }
        y += cell_size;
    }

    let centroid = polygon_centroid(outer);
    let mut best = Cell::new(centroid.0, centroid.1, 0.0, outer, holes);

    while let Some(cell) = heap.pop() {
        if cell.distance > best.distance {
            best = Cell::new(cell.x, cell.y, 0.0, outer, holes);
        }

        if cell.max_distance - best.distance <= PRECISION {
            continue;
        }

        let quarter = cell.half / 2.0;
        for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            heap.push(Cell::new(
                cell.x + dx * quarter,
                cell.y + dy * quarter,
                quarter,
                outer,
                holes,
            ));
        }
    }

    if best.distance <= 0.0 {
        return None;
    }

    Some((best.x, best.y))
}

struct Cell {
    x: f64,
    y: f64,
    half: f64,
    distance: f64,
    max_distance: f64,
}

impl Cell {
    fn new(x: f64, y: f64, half: f64, outer: &Ring, holes: &[Ring]) -> Self {
        let distance = signed_distance(x, y, outer, holes);
        let max_distance = distance + half * std::f64::consts::SQRT_2;
        Self {
            x,
            y,
            half,
            distance,
            max_distance,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.max_distance == other.max_distance
    }
}
impl Eq for Cell {}
impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.max_distance.total_cmp(&other.max_distance)
    }
}

/// Distance to the nearest boundary edge (outer ring or any hole), negative
/// if the point lies outside the polygon.
fn signed_distance(x: f64, y: f64, outer: &Ring, holes: &[Ring]) -> f64 {
    let mut min_dist = point_to_ring_distance(x, y, outer);
    for hole in holes {
        min_dist = min_dist.min(point_to_ring_distance(x, y, hole));
    }

    let inside = point_in_polygon(x, y, outer, holes);
    if inside {
        min_dist
    } else {
        -min_dist
    }
}

fn point_in_polygon(x: f64, y: f64, outer: &Ring, holes: &[Ring]) -> bool {
    if !ray_cast(x, y, outer) {
        return false;
    }
    for hole in holes {
        if ray_cast(x, y, hole) {
            return false;
        }
    }
    true
}

fn ray_cast(px: f64, py: f64, ring: &Ring) -> bool {
    let mut inside = false;
    for window in ring.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        let crosses = (y0 > py) != (y1 > py);
        if crosses {
            let x_intersect = x0 + (py - y0) / (y1 - y0) * (x1 - x0);
            if px < x_intersect {
                inside = !inside;
            }
        }
    }
    inside
}

fn point_to_ring_distance(px: f64, py: f64, ring: &Ring) -> f64 {
    let mut min_dist = f64::INFINITY;
    for window in ring.windows(2) {
        let d = point_to_segment_distance(px, py, window[0], window[1]);
        if d < min_dist {
            min_dist = d;
        }
    }
    min_dist
}

fn point_to_segment_distance(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let dx = bx - ax;
    let dy = by - ay;

    if dx == 0.0 && dy == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    let t = (((px - ax) * dx + (py - ay) * dy) / (dx * dx + dy * dy)).clamp(0.0, 1.0);
    let proj_x = ax + t * dx;
    let proj_y = ay + t * dy;
    ((px - proj_x).powi(2) + (py - proj_y).powi(2)).sqrt()
}

fn bounding_box(ring: &Ring) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(x, y) in ring {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    (min_x, min_y, max_x, max_y)
}

/// Area-weighted centroid of the outer ring, used only as a fallback
/// starting candidate (it can land outside a concave polygon).
fn polygon_centroid(ring: &Ring) -> (f64, f64) {
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for window in ring.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        let cross = x0 * y1 - x1 * y0;
        area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if area.abs() < f64::EPSILON {
        return ring.first().copied().unwrap_or((0.0, 0.0));
    }
    area /= 2.0;
    (cx / (6.0 * area), cy / (6.0 * area))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Ring {
        vec![
            (min, min),
            (max, min),
            (max, max),
            (min, max),
            (min, min),
        ]
    }

    #[test]
    fn square_pole_is_center() {
        let outer = square(0.0, 10.0);
        let (x, y) = pole_of_inaccessibility(&outer, &[]).expect("square has an interior");
        assert!((x - 5.0).abs() < 0.5, "x={}", x);
        assert!((y - 5.0).abs() < 0.5, "y={}", y);
    }

    #[test]
    fn square_with_hole_avoids_hole() {
        let outer = square(0.0, 20.0);
        let hole = square(8.0, 12.0);
        let (x, y) =
            pole_of_inaccessibility(&outer, &[hole]).expect("annulus has an interior");
        let inside_hole = x > 8.0 && x < 12.0 && y > 8.0 && y < 12.0;
        assert!(!inside_hole, "pole landed inside the hole: ({}, {})", x, y);
    }

    #[test]
    fn narrow_rectangle_pole_on_long_axis() {
        let outer: Ring = vec![
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 4.0),
            (0.0, 4.0),
            (0.0, 0.0),
        ];
        let (_, y) = pole_of_inaccessibility(&outer, &[]).expect("rectangle has an interior");
        assert!((y - 2.0).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn degenerate_zero_area_ring_has_no_placement() {
        // A ring collapsed to a line has no interior cell at all.
        let outer: Ring = vec![(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)];
        assert!(pole_of_inaccessibility(&outer, &[]).is_none());
    }
}
