//! Command-line front end for `paintbynum_core`.
//!
//! Decodes an input image, runs the pipeline, and writes out an SVG outline
//! sheet plus a JSON sidecar describing the palette and label placements.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use paintbynum_core::{process, CancellationToken, ProgressEvent, Settings};
use svg::node::element::{Group, Path as SvgPath, Text};
use svg::Document;

/// Turn a raster image into a paint-by-numbers outline sheet.
#[derive(Parser, Debug)]
#[command(name = "paintbynum", version, about)]
struct Cli {
    /// Input image path (PNG or JPEG).
    input: PathBuf,

    /// Output SVG path.
    #[arg(short, long, default_value = "output.svg")]
    output: PathBuf,

    /// Number of palette colors.
    #[arg(short, long, default_value_t = 16)]
    k: u32,

    /// Minimum region size in pixels; smaller regions are absorbed into a
    /// neighbor during cleanup.
    #[arg(long, default_value_t = 50)]
    min_region_size: u32,

    /// RNG seed for reproducible palettes. Omit for a fresh random palette
    /// on every run.
    #[arg(long)]
    seed: Option<u64>,

    /// Also write a JSON sidecar with the palette and label placements,
    /// alongside the SVG using the same stem.
    #[arg(long)]
    emit_json: bool,

    /// Also write a PNG preview of the quantized label map, colored by the
    /// recovered palette, alongside the SVG using the same stem.
    #[arg(long)]
    emit_preview: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let image = image::open(&cli.input)
        .with_context(|| format!("failed to open input image {}", cli.input.display()))?
        .to_rgba8();

    let settings = Settings {
        k_colors: cli.k,
        min_region_size: cli.min_region_size,
        seed: cli.seed,
    };

    let mut last_status = String::new();
    let result = process(
        &image,
        &settings,
        &mut |event| {
            if let ProgressEvent::Status { message } = event {
                last_status = message;
                log::info!("{}", last_status);
            }
        },
        &CancellationToken::new(),
    )
    .context("pipeline failed")?;

    log::info!(
        "traced {} regions from a {} color palette",
        result.regions.len(),
        result.palette.len()
    );

    let document = build_svg(&result);
    svg::save(&cli.output, &document)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    if cli.emit_json {
        let sidecar = cli.output.with_extension("json");
        let summary = serde_json::json!({
            "width": result.width,
            "height": result.height,
            "palette": result.palette.iter().map(|lab| {
                let (r, g, b) = paintbynum_core::lab_to_rgb(*lab);
                serde_json::json!({"l": lab.l, "a": lab.a, "b": lab.b, "rgb": [r, g, b]})
            }).collect::<Vec<_>>(),
            "placements": result.placements.iter().map(|p| {
                serde_json::json!({"x": p.x, "y": p.y, "label": p.label})
            }).collect::<Vec<_>>(),
        });
        fs::write(&sidecar, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("failed to write {}", sidecar.display()))?;
    }

    if cli.emit_preview {
        let preview_path = cli.output.with_extension("preview.png");
        let preview = build_label_preview(&result);
        preview
            .save(&preview_path)
            .with_context(|| format!("failed to write {}", preview_path.display()))?;
    }

    Ok(())
}

fn build_label_preview(result: &paintbynum_core::ProcessResult) -> image::RgbImage {
    let rgb_palette: Vec<(u8, u8, u8)> = result
        .palette
        .iter()
        .map(|lab| paintbynum_core::lab_to_rgb(*lab))
        .collect();

    image::RgbImage::from_fn(result.width, result.height, |x, y| {
        let label = result.labels.get(x, y) as usize;
        let (r, g, b) = rgb_palette[label];
        image::Rgb([r, g, b])
    })
}

fn build_svg(result: &paintbynum_core::ProcessResult) -> Document {
    let mut document = Document::new()
        .set("viewBox", (0, 0, result.width, result.height))
        .set("width", result.width)
        .set("height", result.height);

    for region in &result.regions {
        let (r, g, b) = paintbynum_core::lab_to_rgb(result.palette[region.palette_index]);
        let data = ring_path_data(&region.outer, &region.holes);
        let path = SvgPath::new()
            .set("d", data)
            .set("fill", format!("rgb({}, {}, {})", r, g, b))
            .set("fill-rule", "evenodd")
            .set("stroke", "black")
            .set("stroke-width", 0.5);
        document = document.add(path);
    }

    let mut labels = Group::new().set("font-size", 4).set("text-anchor", "middle");
    for placement in &result.placements {
        let text = Text::new()
            .set("x", placement.x)
            .set("y", placement.y)
            .add(svg::node::Text::new(placement.label.to_string()));
        labels = labels.add(text);
    }
    document.add(labels)
}

fn ring_path_data(outer: &[(f64, f64)], holes: &[Vec<(f64, f64)>]) -> svg::node::element::path::Data {
    let mut data = svg::node::element::path::Data::new();
    data = append_ring(data, outer);
    for hole in holes {
        data = append_ring(data, hole);
    }
    data
}

fn append_ring(
    mut data: svg::node::element::path::Data,
    ring: &[(f64, f64)],
) -> svg::node::element::path::Data {
    let Some(&(x0, y0)) = ring.first() else {
        return data;
    };
    data = data.move_to((x0, y0));
    for &(x, y) in &ring[1..] {
        data = data.line_to((x, y));
    }
    data.close()
}
