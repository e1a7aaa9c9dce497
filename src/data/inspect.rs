//! Output tree inspection.
//!
//! Reports per-class image counts, images that fail to decode, and
//! near-black frames (blank captures that add noise to a class).

use image::DynamicImage;
use kmeans_colors::get_kmeans;
use palette::{FromColor, Lab, Srgb};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};

use crate::data::dataset::Dataset;

/// RGB threshold value below which a color is considered "near black"
pub const BLACK_THRESHOLD: f32 = 10.0;

const MAX_SAMPLES: u32 = 100_000;

#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Run the dominant-color check (decodes every image fully)
    pub detect_black: bool,
    /// Number of classes the downstream classifier is configured for
    pub expected_classes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCount {
    pub name: String,
    pub images: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectReport {
    pub classes: Vec<ClassCount>,
    pub total_images: usize,
    pub undecodable: Vec<PathBuf>,
    pub near_black: Vec<PathBuf>,
    /// `(expected, found)` when the class count does not match
    pub class_count_mismatch: Option<(usize, usize)>,
}

impl InspectReport {
    pub fn is_clean(&self) -> bool {
        self.undecodable.is_empty()
            && self.near_black.is_empty()
            && self.class_count_mismatch.is_none()
    }
}

pub fn inspect(dataset: &Dataset, options: &InspectOptions) -> InspectReport {
    let _span = info_span!("inspect").entered();

    let mut report = InspectReport {
        classes: dataset
            .classes()
            .iter()
            .map(|c| ClassCount {
                name: c.name.clone(),
                images: c.images.len(),
            })
            .collect(),
        total_images: dataset.total_images(),
        ..Default::default()
    };

    if let Some(expected) = options.expected_classes {
        let found = dataset.classes().len();
        if expected != found {
            warn!("Expected {} classes but found {}", expected, found);
            report.class_count_mismatch = Some((expected, found));
        }
    }

    for (_, path) in dataset.samples() {
        let img = match image::open(path) {
            Ok(img) => img,
            Err(e) => {
                warn!("Failed to decode {:?}: {}", path, e);
                report.undecodable.push(path.to_path_buf());
                continue;
            }
        };

        if options.detect_black {
            if let Some(color) = dominant_color(&img) {
                debug!("Dominant color of {:?}: {:?}", path, color);
                if is_near_black(color) {
                    report.near_black.push(path.to_path_buf());
                }
            }
        }
    }

    info!(
        "Inspected {} images: {} undecodable, {} near-black",
        report.total_images,
        report.undecodable.len(),
        report.near_black.len()
    );
    report
}

/// Calculates the dominant color in an image using k-means clustering
///
/// Pixels are sampled on a grid (up to 100k samples) and clustered in Lab
/// space; the centroid with the most members is returned as RGB.
pub fn dominant_color(img: &DynamicImage) -> Option<(u8, u8, u8)> {
    let img_rgb = img.to_rgb8();
    let (width, height) = img_rgb.dimensions();

    let step = ((width * height) as f32 / MAX_SAMPLES as f32).sqrt().ceil() as usize;
    let step = step.max(1);

    let lab_pixels: Vec<Lab> = (0..height)
        .step_by(step)
        .flat_map(|y| (0..width).step_by(step).map(move |x| (x, y)))
        .map(|(x, y)| {
            let pixel = img_rgb.get_pixel(x, y);
            let rgb = Srgb::new(
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            );
            Lab::from_color(rgb)
        })
        .collect();

    if lab_pixels.is_empty() {
        return None;
    }

    let result = get_kmeans(3, 20, 1.0, false, &lab_pixels, 0);

    let mut counts = vec![0usize; result.centroids.len()];
    for &idx in &result.indices {
        if let Some(count) = counts.get_mut(idx as usize) {
            *count += 1;
        }
    }

    let (dominant, _) = result
        .centroids
        .iter()
        .zip(counts)
        .max_by_key(|(_, count)| *count)?;

    let rgb: Srgb = Srgb::from_color(*dominant);
    Some((
        (rgb.red * 255.0).clamp(0.0, 255.0) as u8,
        (rgb.green * 255.0).clamp(0.0, 255.0) as u8,
        (rgb.blue * 255.0).clamp(0.0, 255.0) as u8,
    ))
}

/// A color is near black if every RGB channel is below `BLACK_THRESHOLD`
pub fn is_near_black(color: (u8, u8, u8)) -> bool {
    let (r, g, b) = color;
    (r as f32) < BLACK_THRESHOLD && (g as f32) < BLACK_THRESHOLD && (b as f32) < BLACK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn solid(path: &std::path::Path, color: [u8; 3]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(32, 32, Rgb(color)).save(path).unwrap();
    }

    #[test]
    fn test_is_near_black() {
        assert!(is_near_black((0, 0, 0)));
        assert!(is_near_black((9, 9, 9)));
        assert!(!is_near_black((10, 10, 10)));
        assert!(!is_near_black((9, 9, 15)));
        assert!(!is_near_black((255, 255, 255)));
    }

    #[test]
    fn test_dominant_color_of_solid_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])));
        let color = dominant_color(&img).unwrap();
        assert!(is_near_black(color));

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([250, 250, 250])));
        let color = dominant_color(&img).unwrap();
        assert!(!is_near_black(color));
    }

    #[test]
    fn test_inspect_flags_problems() {
        let temp = TempDir::new().unwrap();
        solid(&temp.path().join("crab/ok.png"), [200, 120, 40]);
        solid(&temp.path().join("crab/dark.png"), [0, 0, 0]);
        fs::create_dir_all(temp.path().join("star")).unwrap();
        fs::write(temp.path().join("star/broken.jpg"), b"not an image").unwrap();

        let dataset = Dataset::open(temp.path()).unwrap();
        let report = inspect(
            &dataset,
            &InspectOptions {
                detect_black: true,
                expected_classes: Some(7),
            },
        );

        assert_eq!(report.total_images, 3);
        assert_eq!(
            report.classes,
            vec![
                ClassCount {
                    name: "crab".to_string(),
                    images: 2
                },
                ClassCount {
                    name: "star".to_string(),
                    images: 1
                },
            ]
        );
        assert_eq!(report.undecodable, vec![temp.path().join("star/broken.jpg")]);
        assert_eq!(report.near_black, vec![temp.path().join("crab/dark.png")]);
        assert_eq!(report.class_count_mismatch, Some((7, 2)));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_inspect_clean_tree() {
        let temp = TempDir::new().unwrap();
        solid(&temp.path().join("crab/a.png"), [200, 120, 40]);

        let dataset = Dataset::open(temp.path()).unwrap();
        let report = inspect(
            &dataset,
            &InspectOptions {
                detect_black: false,
                expected_classes: Some(1),
            },
        );

        assert!(report.is_clean());
    }
}
