//! paint-by-numbers image pipeline: sRGB image in, palette + per-pixel labels
//! + traced region outlines + label placements out.
//!
//! Five stages run in order, each consuming the previous stage's output
//! wholesale. The pipeline never suspends mid-stage: `process` only checks
//! cancellation between stages, not inside them.
//!
//! 1. [`color`]      sRGB -> CIE Lab
//! 2. [`quantize`]   Lab samples -> palette + per-pixel labels (k-means)
//! 3. [`cleanup`]    connected-component noise absorption
//! 4. [`contours`]   per-label boundary tracing with holes
//! 5. [`placement`]  pole of inaccessibility per region
//!
//! Inputs are validated up front, progress is reported at stage boundaries,
//! and the entry point returns a `Result` rather than panicking on bad input.

pub mod cleanup;
pub mod color;
pub mod config;
pub mod contours;
pub mod error;
pub mod execution;
pub mod placement;
pub mod progress;
pub mod quantize;
pub mod types;

pub use color::lab_to_rgb;
pub use config::Settings;
pub use error::{PaintError, PaintResult};
pub use progress::{CancellationToken, ProgressCallback, ProgressEvent};
pub use types::{Lab, LabelMap, Palette, Placement, ProcessResult, Region, Ring};

use image::RgbaImage;

/// Run the full pipeline over a decoded image.
///
/// `on_progress` is invoked at each stage boundary; pass `&mut |_| {}` to
/// ignore progress. `cancel` is polled between stages only.
pub fn process(
    image: &RgbaImage,
    settings: &Settings,
    on_progress: &mut ProgressCallback,
    cancel: &CancellationToken,
) -> PaintResult<ProcessResult> {
    validate(image, settings)?;

    let width = image.width();
    let height = image.height();

    on_progress(ProgressEvent::status("converting colors to Lab"));
    let pixels: Vec<image::Rgba<u8>> = image.pixels().copied().collect();
    let lab_buffer = color::convert_buffer(&pixels);
    on_progress(ProgressEvent::progress(10));

    if cancel.is_cancelled() {
        return Err(PaintError::Cancelled);
    }

    on_progress(ProgressEvent::status("quantizing palette"));
    let (palette, raw_labels) =
        quantize::quantize(&lab_buffer, width, height, settings.k_colors, settings.seed);
    on_progress(ProgressEvent::progress(45));

    if cancel.is_cancelled() {
        return Err(PaintError::Cancelled);
    }

    on_progress(ProgressEvent::status("cleaning up small regions"));
    let mut labels = LabelMap::new(width, height, raw_labels);
    cleanup::cleanup(&mut labels, settings.min_region_size);
    on_progress(ProgressEvent::progress(65));

    if cancel.is_cancelled() {
        return Err(PaintError::Cancelled);
    }

    on_progress(ProgressEvent::status("tracing region contours"));
    let regions = contours::extract_regions(&labels, palette.len());
    on_progress(ProgressEvent::progress(85));

    if cancel.is_cancelled() {
        return Err(PaintError::Cancelled);
    }

    on_progress(ProgressEvent::status("placing labels"));
    // A region with a degenerate outer ring (fewer than 3 distinct points)
    // has nowhere sensible to put a label; drop it rather than aborting the
    // whole call.
    let placements = regions
        .iter()
        .filter_map(|region| {
            if region.outer.len() < 4 {
                let err = PaintError::internal(format!(
                    "region for palette index {} has a degenerate outer ring; skipping placement",
                    region.palette_index
                ));
                log::warn!("{err}");
                return None;
            }
            let (x, y) = match placement::pole_of_inaccessibility(&region.outer, &region.holes) {
                Some(point) => point,
                None => {
                    log::warn!(
                        "{}",
                        PaintError::internal(format!(
                            "region for palette index {} has no interior placement point; skipping",
                            region.palette_index
                        ))
                    );
                    return None;
                }
            };
            Some(Placement {
                x,
                y,
                label: region.palette_index as u32 + 1,
            })
        })
        .collect();
    on_progress(ProgressEvent::progress(100));

    log::info!(
        "processed {}x{} image into {} colors, {} regions",
        width,
        height,
        palette.len(),
        regions.len()
    );

    Ok(ProcessResult {
        width,
        height,
        palette,
        labels,
        regions,
        placements,
    })
}

fn validate(image: &RgbaImage, settings: &Settings) -> PaintResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PaintError::validation("image has zero width or height"));
    }
    settings.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_image(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn rejects_zero_dimensions() {
        let image = RgbaImage::new(0, 0);
        let settings = Settings::default();
        let mut events = Vec::new();
        let result = process(
            &image,
            &settings,
            &mut |e| events.push(e),
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(PaintError::Validation { .. })));
    }

    #[test]
    fn rejects_out_of_range_k() {
        let image = solid_image(4, 4, [10, 20, 30, 255]);
        let settings = Settings {
            k_colors: 1,
            ..Settings::default()
        };
        let result = process(
            &image,
            &settings,
            &mut |_| {},
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(PaintError::Validation { .. })));
    }

    #[test]
    fn solid_color_image_produces_one_region() {
        let image = solid_image(20, 20, [200, 50, 50, 255]);
        let settings = Settings {
            k_colors: 2,
            min_region_size: 1,
            seed: Some(1),
        };
        let result = process(&image, &settings, &mut |_| {}, &CancellationToken::new()).unwrap();
        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.placements.len(), 1);
    }

    #[test]
    fn cancellation_before_first_stage_is_observed() {
        let image = solid_image(4, 4, [1, 2, 3, 255]);
        let settings = Settings::default();
        let token = CancellationToken::new();
        token.cancel();
        let result = process(&image, &settings, &mut |_| {}, &token);
        // Validation runs first regardless of cancellation; cancellation is
        // only checked between stages, so a solid valid image with a
        // pre-cancelled token still completes stage 1 before the first
        // check trips.
        assert!(matches!(result, Err(PaintError::Cancelled)));
    }

    #[test]
    fn progress_events_are_emitted_in_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        let image = solid_image(4, 4, [1, 2, 3, 255]);
        let settings = Settings {
            k_colors: 2,
            min_region_size: 1,
            seed: Some(1),
        };
        let mut percents = Vec::new();
        let _ = process(
            &image,
            &settings,
            &mut |event| {
                if let ProgressEvent::Progress { percent } = event {
                    percents.push(percent);
                }
            },
            &CancellationToken::new(),
        );
        assert_eq!(percents, vec![10, 45, 65, 85, 100]);
    }
}
