//! Region cleanup: connected-component labeling and noise absorption.
//!
//! The flood fill walks an explicit index stack rather than recursing, over
//! 4-connected same-label neighbors. Components smaller than the configured
//! minimum are absorbed into whichever differing 4-neighbor label borders
//! them most.

use crate::types::LabelMap;

/// Maximum label value the palette quantizer can produce (`u8`), used to size
/// the fixed tally array for absorption so no hashing is needed.
const MAX_LABELS: usize = 256;

/// One maximal 4-connected run of same-label pixels.
struct Component {
    label: u8,
    pixels: Vec<usize>,
}

/// Clean up a label map in place: merge every connected component smaller
/// than `min_region_size` into whichever differing 4-neighbor label borders
/// it most, lowest label index breaking ties.
///
/// Runs a single pass; a component whose absorption target itself later
/// shrinks below threshold is not revisited.
pub fn cleanup(labels: &mut LabelMap, min_region_size: u32) {
    let components = find_components(labels);

    for component in &components {
        if component.pixels.len() >= min_region_size as usize {
            continue;
        }
        if let Some(target) = dominant_neighbor_label(labels, component) {
            for &idx in &component.pixels {
                labels.labels[idx] = target;
            }
        }
        // A component with no foreign neighbor (the whole image is one
        // label) has nothing to absorb into and is left as-is.
    }
}

fn find_components(labels: &LabelMap) -> Vec<Component> {
    let width = labels.width as usize;
    let height = labels.height as usize;
    let total = width * height;
    let mut visited = vec![false; total];
    let mut components = Vec::new();

    for start in 0..total {
        if visited[start] {
            continue;
        }
        let label = labels.labels[start];
        let mut pixels = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(idx) = stack.pop() {
            pixels.push(idx);
            let x = idx % width;
            let y = idx / width;

            if x > 0 {
                let n = idx - 1;
                if !visited[n] && labels.labels[n] == label {
                    visited[n] = true;
                    stack.push(n);
                }
            }
            if x + 1 < width {
                let n = idx + 1;
                if !visited[n] && labels.labels[n] == label {
                    visited[n] = true;
                    stack.push(n);
                }
            }
            if y > 0 {
                let n = idx - width;
                if !visited[n] && labels.labels[n] == label {
                    visited[n] = true;
                    stack.push(n);
                }
            }
            if y + 1 < height {
                let n = idx + width;
                if !visited[n] && labels.labels[n] == label {
                    visited[n] = true;
                    stack.push(n);
                }
            }
        }

        components.push(Component { label, pixels });
    }

    components
}

/// Tally each differing 4-neighbor label touching `component`'s boundary and
/// return the most common, lowest-index on ties.
fn dominant_neighbor_label(labels: &LabelMap, component: &Component) -> Option<u8> {
    let width = labels.width as usize;
    let height = labels.height as usize;
    let mut tally = [0u32; MAX_LABELS];
    let mut any = false;

    for &idx in &component.pixels {
        let x = idx % width;
        let y = idx / width;

        let mut tally_neighbor = |nx: i64, ny: i64| {
            if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                return;
            }
            let n = (ny as usize) * width + (nx as usize);
            let neighbor_label = labels.labels[n];
            if neighbor_label != component.label {
                tally[neighbor_label as usize] += 1;
                any = true;
            }
        };

        tally_neighbor(x as i64 - 1, y as i64);
        tally_neighbor(x as i64 + 1, y as i64);
        tally_neighbor(x as i64, y as i64 - 1);
        tally_neighbor(x as i64, y as i64 + 1);
    }

    if !any {
        return None;
    }

    let mut best_label = 0u8;
    let mut best_count = 0u32;
    for (label, &count) in tally.iter().enumerate() {
        if count > best_count {
            best_count = count;
            best_label = label as u8;
        }
    }
    Some(best_label)
}
