//! Configuration for the paint-by-numbers pipeline

use crate::error::{PaintError, PaintResult};
use serde::{Deserialize, Serialize};

/// Settings for a single `process` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Number of palette colors to quantize to, K in [2, 50].
    pub k_colors: u32,

    /// Minimum connected-component size (in pixels) that survives region
    /// cleanup without being absorbed into a neighbor.
    pub min_region_size: u32,

    /// RNG seed for k-means centroid initialization. `None` uses OS entropy
    /// (nondeterministic); `Some(seed)` makes a call reproducible.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            k_colors: 16,
            min_region_size: 50,
            seed: None,
        }
    }
}

impl Settings {
    /// Validate range constraints on the settings.
    ///
    /// `min_region_size` has no upper bound to reject: an oversized
    /// threshold just means cleanup absorbs everything it can, falling back
    /// to leaving a component as-is when no merge target exists.
    pub fn validate(&self) -> PaintResult<()> {
        if !(2..=50).contains(&self.k_colors) {
            return Err(PaintError::validation(format!(
                "k_colors {} out of range [2, 50]",
                self.k_colors
            )));
        }
        Ok(())
    }
}
