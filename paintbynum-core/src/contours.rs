//! Marching-squares-equivalent contour extraction.
//!
//! Walks the pixel-grid edges that separate a palette index's mask from
//! everything else, orients each edge so the mask pixel sits on the left of
//! the direction of travel, and stitches same-vertex edges back into closed
//! rings. Ring vertices land on the half-integer lattice (pixel centers are
//! integers, so a pixel's corners sit half a unit off in both axes) rather
//! than on any interpolated position, since the input mask is binary.
//!
//! Ring winding is the `(x_i*y_{i+1} - x_{i+1}*y_i)` shoelace sum: outer
//! boundaries come out positive, holes come out negative. Rings are nested
//! into `Region`s by point-in-polygon containment, and both are filtered by
//! absolute outer-ring area (`MIN_POLYGON_AREA`), independent of the
//! region-size threshold `cleanup` already applied.

use crate::execution::map_maybe_parallel;
use crate::types::{LabelMap, Region, Ring};
use std::collections::HashMap;

/// Outer rings smaller than this (in px^2) are dropped even though they
/// survived `cleanup`'s region-size threshold; a handful of isolated pixels
/// that merge-absorption left just above `min_region_size` still don't
/// deserve their own traced outline.
const MIN_POLYGON_AREA: f64 = 50.0;

type Vertex = (i32, i32);

struct Edge {
    start: Vertex,
    end: Vertex,
    /// The mask pixel this edge borders on its "inside" side.
    inside: (i32, i32),
}

/// Trace every palette index's regions out of a label map.
pub fn extract_regions(labels: &LabelMap, palette_len: usize) -> Vec<Region> {
    let indices: Vec<usize> = (0..palette_len).collect();
    let per_index = map_maybe_parallel(&indices, |&idx| {
        extract_regions_for_index(labels, idx as u8)
    });
    per_index.into_iter().flatten().collect()
}

fn extract_regions_for_index(labels: &LabelMap, palette_index: u8) -> Vec<Region> {
    let width = labels.width as i32;
    let height = labels.height as i32;
    let mask = |x: i32, y: i32| -> bool {
        x >= 0
            && y >= 0
            && x < width
            && y < height
            && labels.labels[(y as usize) * (labels.width as usize) + (x as usize)]
                == palette_index
    };

    let edges = build_edges(width, height, &mask);
    let rings = stitch_rings(edges);

    let mut outers: Vec<(Ring, f64)> = Vec::new();
    let mut holes: Vec<Ring> = Vec::new();

    for ring in rings {
        let area = signed_area(&ring);
        if area > 0.0 {
            outers.push((ring, area));
        } else {
            holes.push(ring);
        }
    }

    let mut regions: Vec<Region> = outers
        .into_iter()
        .filter(|(_, area)| *area >= MIN_POLYGON_AREA)
        .map(|(outer, _)| Region {
            palette_index: palette_index as usize,
            outer,
            holes: Vec::new(),
        })
        .collect();

    for hole in holes {
        let Some(point) = hole.first().copied() else {
            continue;
        };
        let mut best: Option<(usize, f64)> = None;
        for (i, region) in regions.iter().enumerate() {
            if point_in_ring(point, &region.outer) {
                let area = signed_area(&region.outer);
                if best.map_or(true, |(_, best_area)| area < best_area) {
                    best = Some((i, area));
                }
            }
        }
        match best {
            Some((i, _)) => regions[i].holes.push(hole),
            None => log::warn!(
                "hole ring for palette index {} has no enclosing outer ring; dropping",
                palette_index
            ),
        }
    }

    regions
}

fn build_edges(width: i32, height: i32, mask: &dyn Fn(i32, i32) -> bool) -> Vec<Edge> {
    let mut edges = Vec::new();

    // Vertical edges: one per column of vertices, separating the pixel to
    // its left from the pixel to its right.
    for i in 0..=width {
        for j in 0..height {
            let left = mask(i - 1, j);
            let right = mask(i, j);
            if left == right {
                continue;
            }
            if left {
                edges.push(Edge {
                    start: (i, j),
                    end: (i, j + 1),
                    inside: (i - 1, j),
                });
            } else {
                edges.push(Edge {
                    start: (i, j + 1),
                    end: (i, j),
                    inside: (i, j),
                });
            }
        }
    }

    // Horizontal edges: one per row of vertices, separating the pixel above
    // from the pixel below.
    for j in 0..=height {
        for i in 0..width {
            let top = mask(i, j - 1);
            let bottom = mask(i, j);
            if top == bottom {
                continue;
            }
            if bottom {
                edges.push(Edge {
                    start: (i, j),
                    end: (i + 1, j),
                    inside: (i, j),
                });
            } else {
                edges.push(Edge {
                    start: (i + 1, j),
                    end: (i, j),
                    inside: (i, j - 1),
                });
            }
        }
    }

    edges
}

/// Stitch directed edges into closed rings.
///
/// Every vertex has either one outgoing edge (an ordinary corner: follow it)
/// or two (a checkerboard vertex, where two same-label pixels touch only at
/// a corner): pick the one that shares `inside` with the edge arriving, which
/// keeps the two diagonal blobs on separate rings, consistent with the
/// 4-connectivity `cleanup` already enforced.
fn stitch_rings(edges: Vec<Edge>) -> Vec<Ring> {
    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.start).or_default().push(idx);
    }

    let mut visited = vec![false; edges.len()];
    let mut rings = Vec::new();

    for start_idx in 0..edges.len() {
        if visited[start_idx] {
            continue;
        }

        let mut grid_points = Vec::new();
        let mut current = start_idx;
        loop {
            visited[current] = true;
            let edge = &edges[current];
            grid_points.push(edge.start);

            let candidates = &outgoing[&edge.end];
            let next = if candidates.len() == 1 {
                candidates[0]
            } else {
                *candidates
                    .iter()
                    .find(|&&c| edges[c].inside == edge.inside)
                    .expect("checkerboard vertex must have a matching outgoing edge")
            };

            if next == start_idx {
                break;
            }
            current = next;
        }

        let mut ring: Ring = grid_points
            .into_iter()
            .map(|(i, j)| (i as f64 - 0.5, j as f64 - 0.5))
            .collect();
        ring.push(ring[0]);
        rings.push(ring);
    }

    rings
}

/// `(x_i*y_{i+1} - x_{i+1}*y_i)` shoelace sum, signed: positive for the
/// winding direction `build_edges`/`stitch_rings` produce on an outer ring.
fn signed_area(ring: &Ring) -> f64 {
    let mut sum = 0.0;
    for window in ring.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        sum += x0 * y1 - x1 * y0;
    }
    sum / 2.0
}

/// Ray-casting point-in-polygon test against a single ring (the caller is
/// responsible for combining this with hole membership where needed).
fn point_in_ring(point: (f64, f64), ring: &Ring) -> bool {
    let (px, py) = point;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_from(width: u32, height: u32, data: &[u8]) -> LabelMap {
        LabelMap::new(width, height, data.to_vec())
    }

    #[test]
    fn isolated_pixel_traces_a_unit_square_outer_ring() {
        let labels = labels_from(1, 1, &[0]);
        let regions = extract_regions_for_index(&labels, 0);
        assert_eq!(regions.len(), 0, "below MIN_POLYGON_AREA, filtered out");
    }

    #[test]
    fn solid_rectangle_traces_one_outer_ring_with_correct_area() {
        // 10x6 block, area 60, clears MIN_POLYGON_AREA.
        let labels = labels_from(10, 6, &vec![0u8; 60]);
        let regions = extract_regions_for_index(&labels, 0);
        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert!(region.holes.is_empty());
        assert!((signed_area(&region.outer) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn annulus_produces_outer_ring_and_one_hole() {
        // 3x3 block of label 0 with a label 1 center: label 0's region has
        // a hole where label 1 sits.
        #[rustfmt::skip]
        let data = vec![
            0, 0, 0,
            0, 1, 0,
            0, 0, 0,
        ];
        let labels = labels_from(3, 3, &data);
        let regions = extract_regions_for_index(&labels, 0);
        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert_eq!(region.holes.len(), 1);
        // The outer ring traces the full 3x3 bounding square (area 9), with
        // a separate -1 hole ring for the label-1 center; 9 - 1 = 8 is the
        // mask's pixel count, not the outer ring's own shoelace area.
        assert!((signed_area(&region.outer) - 9.0).abs() < 1e-9);
        assert!((signed_area(&region.holes[0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_touching_pixels_stay_as_separate_rings() {
        // Checkerboard: label 0 at (0,0) and (1,1), label 1 at (1,0) and
        // (0,1). The two label-0 pixels touch only at a corner and must not
        // be stitched into one ring (4-connectivity, as in `cleanup`).
        #[rustfmt::skip]
        let data = vec![
            0, 1,
            1, 0,
        ];
        let labels = labels_from(2, 2, &data);
        let regions = extract_regions_for_index(&labels, 0);
        // Both unit squares are below MIN_POLYGON_AREA so they're filtered,
        // but the ring count before filtering is what matters here.
        let width = 2i32;
        let height = 2i32;
        let mask = |x: i32, y: i32| -> bool {
            x >= 0
                && y >= 0
                && x < width
                && y < height
                && data[(y as usize) * 2 + (x as usize)] == 0
        };
        let edges = build_edges(width, height, &mask);
        let rings = stitch_rings(edges);
        assert_eq!(rings.len(), 2, "checkerboard must trace as two rings");
        assert_eq!(regions.len(), 0);
    }

    #[test]
    fn point_in_ring_detects_containment() {
        let square: Ring = vec![
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
            (0.0, 0.0),
        ];
        assert!(point_in_ring((2.0, 2.0), &square));
        assert!(!point_in_ring((10.0, 10.0), &square));
    }
}
