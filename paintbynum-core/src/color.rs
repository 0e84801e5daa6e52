//! sRGB -> CIE Lab color space conversion.
//!
//! Inverse sRGB companding, the sRGB->XYZ matrix via nalgebra, D65 reference
//! white, then the Lab nonlinearity.

use crate::execution::map_maybe_parallel;
use crate::types::Lab;
use image::Rgba;
use nalgebra::{Matrix3, Vector3};

const XN: f32 = 0.95047;
const YN: f32 = 1.00000;
const ZN: f32 = 1.08883;

/// Convert one sRGB pixel to CIE Lab. Alpha is ignored.
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let mut rgb = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];

    for component in &mut rgb {
        *component = if *component >= 0.04045 {
            ((*component + 0.055) / 1.055).powf(2.4)
        } else {
            *component / 12.92
        };
    }

    // Observer = 2 degrees, Illuminant = D65
    let xyz_matrix = Matrix3::new(
        0.4124, 0.3576, 0.1805, 0.2126, 0.7152, 0.0722, 0.0193, 0.1192, 0.9505,
    );
    let xyz = xyz_matrix * Vector3::new(rgb[0], rgb[1], rgb[2]);

    let fx = lab_f(xyz[0] / XN);
    let fy = lab_f(xyz[1] / YN);
    let fz = lab_f(xyz[2] / ZN);

    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.powf(1.0 / 3.0)
    } else {
        (903.3 * t + 16.0) / 116.0
    }
}

/// Convert a full RGBA pixel buffer to a row-major Lab buffer. Embarrassingly
/// parallel over pixels.
pub fn convert_buffer(pixels: &[Rgba<u8>]) -> Vec<Lab> {
    map_maybe_parallel(pixels, |p| rgb_to_lab(p.0[0], p.0[1], p.0[2]))
}

/// Inverse of `rgb_to_lab`, for rendering a palette swatch back to sRGB.
/// Not used anywhere in the pipeline itself (labels carry a palette index,
/// never a recovered color), only by consumers that need to draw the
/// palette.
pub fn lab_to_rgb(lab: Lab) -> (u8, u8, u8) {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let xyz = [
        XN * lab_f_inv(fx),
        YN * lab_f_inv(fy),
        ZN * lab_f_inv(fz),
    ];

    let xyz_to_rgb = Matrix3::new(
        3.2406, -1.5372, -0.4986, -0.9689, 1.8758, 0.0415, 0.0557, -0.2040, 1.0570,
    );
    let rgb = xyz_to_rgb * Vector3::new(xyz[0], xyz[1], xyz[2]);

    let to_u8 = |c: f32| -> u8 {
        let companded = if c <= 0.0031308 {
            c * 12.92
        } else {
            1.055 * c.max(0.0).powf(1.0 / 2.4) - 0.055
        };
        (companded.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    (to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2]))
}

fn lab_f_inv(t: f32) -> f32 {
    let delta = 6.0 / 29.0;
    if t > delta {
        t.powi(3)
    } else {
        3.0 * delta * delta * (t - 4.0 / 29.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_l_100() {
        let lab = rgb_to_lab(255, 255, 255);
        assert!((lab.l - 100.0).abs() < 0.1, "L was {}", lab.l);
        assert!(lab.a.abs() < 0.1);
        assert!(lab.b.abs() < 0.1);
    }

    #[test]
    fn black_is_l_0() {
        let lab = rgb_to_lab(0, 0, 0);
        assert!(lab.l.abs() < 0.1);
        assert!(lab.a.abs() < 0.1);
        assert!(lab.b.abs() < 0.1);
    }

    #[test]
    fn lab_to_rgb_round_trips() {
        for &(r, g, b) in &[(255u8, 0u8, 0u8), (12, 200, 90), (128, 128, 128)] {
            let lab = rgb_to_lab(r, g, b);
            let (rr, rg, rb) = lab_to_rgb(lab);
            assert!((rr as i16 - r as i16).abs() <= 2, "r {} vs {}", rr, r);
            assert!((rg as i16 - g as i16).abs() <= 2, "g {} vs {}", rg, g);
            assert!((rb as i16 - b as i16).abs() <= 2, "b {} vs {}", rb, b);
        }
    }

    #[test]
    fn red_has_positive_a() {
        let lab = rgb_to_lab(255, 0, 0);
        assert!(lab.a > 50.0, "expected strongly positive a*, got {}", lab.a);
    }

    #[test]
    fn convert_buffer_matches_scalar() {
        let pixels = vec![Rgba([255, 0, 0, 255]), Rgba([0, 255, 0, 255])];
        let labs = convert_buffer(&pixels);
        assert_eq!(labs[0], rgb_to_lab(255, 0, 0));
        assert_eq!(labs[1], rgb_to_lab(0, 255, 0));
    }
}
