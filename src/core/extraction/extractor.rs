//! Feature extraction capability
//!
//! Descriptor and text extraction is treated as a pluggable capability: the
//! alignment pipeline only needs "given an image, return local descriptors
//! and recognized text". Production setups inject an OCR-backed extractor;
//! the crate ships a lightweight patch extractor as a default and a mock
//! for tests.

use std::path::Path;
use std::time::Duration;

use rustdct::DctPlanner;

use crate::core::error::SyncError;
use crate::core::extraction::descriptor::{Descriptor, DescriptorSet};

/// Descriptors plus recognized text for one image. Text may be empty.
#[derive(Debug, Clone, Default)]
pub struct ExtractedImage {
    pub descriptors: DescriptorSet,
    pub text: String,
}

pub trait FeatureExtractor: Send + Sync {
    /// Extract descriptors and text from the image at `path`, working on a
    /// version downscaled so the smaller dimension is at most `size_bound`
    /// pixels.
    fn extract(&self, path: &Path, size_bound: u32) -> Result<ExtractedImage, SyncError>;
}

pub struct MockFeatureExtractor {
    responses: Box<dyn Fn(&Path) -> Result<ExtractedImage, SyncError> + Send + Sync>,
    delay: Option<Box<dyn Fn(&Path) -> Duration + Send + Sync>>,
}

impl MockFeatureExtractor {
    pub fn with_responses<F>(responses: F) -> Self
    where
        F: Fn(&Path) -> Result<ExtractedImage, SyncError> + Send + Sync + 'static,
    {
        Self {
            responses: Box::new(responses),
            delay: None,
        }
    }

    /// Sleep per image before answering, to force out-of-order completion
    /// in coordinator tests.
    pub fn with_delays<F>(mut self, delay: F) -> Self
    where
        F: Fn(&Path) -> Duration + Send + Sync + 'static,
    {
        self.delay = Some(Box::new(delay));
        self
    }
}

impl FeatureExtractor for MockFeatureExtractor {
    fn extract(&self, path: &Path, _size_bound: u32) -> Result<ExtractedImage, SyncError> {
        if let Some(delay) = &self.delay {
            std::thread::sleep(delay(path));
        }
        (self.responses)(path)
    }
}

const PATCH_SIZE: usize = 16;
const SIGNATURE_SIZE: usize = 4;
const MAX_KEYPOINTS: usize = 256;

/// Built-in extractor: strong gradient corners described by the
/// low-frequency DCT signature of their surrounding patch.
///
/// Deliberately modest - it stands in for a real descriptor service the way
/// a lightweight detector stands in for a full OCR stack. Recognized text
/// is always empty; supply an OCR-backed `FeatureExtractor` to enable the
/// text refinement pass.
pub struct PatchFeatureExtractor {
    gradient_threshold: i32,
}

impl PatchFeatureExtractor {
    pub fn new() -> Self {
        Self {
            gradient_threshold: 25,
        }
    }

    /// Halve the image until the smaller dimension fits the bound.
    fn downscale(image: image::GrayImage, size_bound: u32) -> image::GrayImage {
        let mut smaller = image.width().min(image.height());
        let mut factor = 1u32;
        while smaller > size_bound {
            smaller /= 2;
            factor *= 2;
        }
        if factor == 1 {
            return image;
        }
        image::imageops::resize(
            &image,
            image.width() / factor,
            image.height() / factor,
            image::imageops::FilterType::Triangle,
        )
    }

    /// Gradient response at every interior pixel, strongest first.
    fn keypoints(gray: &image::GrayImage, threshold: i32) -> Vec<(u32, u32, i32)> {
        let (width, height) = gray.dimensions();
        let margin = (PATCH_SIZE / 2) as u32;
        if width <= 2 * margin || height <= 2 * margin {
            return Vec::new();
        }

        let mut points = Vec::new();
        for y in margin..height - margin {
            for x in margin..width - margin {
                let gx = gray.get_pixel(x + 1, y).0[0] as i32
                    - gray.get_pixel(x - 1, y).0[0] as i32;
                let gy = gray.get_pixel(x, y + 1).0[0] as i32
                    - gray.get_pixel(x, y - 1).0[0] as i32;
                let response = gx * gx + gy * gy;
                if response > threshold * threshold {
                    points.push((x, y, response));
                }
            }
        }

        points.sort_by(|a, b| b.2.cmp(&a.2));
        points.truncate(MAX_KEYPOINTS);
        points
    }

    /// Low-frequency 2D DCT-II coefficients of the patch around (x, y),
    /// L2-normalized. The DC coefficient is dropped so overall brightness
    /// does not dominate.
    fn patch_signature(
        gray: &image::GrayImage,
        x: u32,
        y: u32,
        dct: &dyn rustdct::TransformType2And3<f32>,
    ) -> Descriptor {
        let half = (PATCH_SIZE / 2) as u32;
        let mut patch = [0.0f32; PATCH_SIZE * PATCH_SIZE];
        for py in 0..PATCH_SIZE {
            for px in 0..PATCH_SIZE {
                let sx = x + px as u32 - half;
                let sy = y + py as u32 - half;
                patch[py * PATCH_SIZE + px] = gray.get_pixel(sx, sy).0[0] as f32 / 255.0;
            }
        }

        // Rows, then columns.
        for row in patch.chunks_exact_mut(PATCH_SIZE) {
            dct.process_dct2(row);
        }
        let mut column = [0.0f32; PATCH_SIZE];
        for col in 0..PATCH_SIZE {
            for row in 0..PATCH_SIZE {
                column[row] = patch[row * PATCH_SIZE + col];
            }
            dct.process_dct2(&mut column);
            for row in 0..PATCH_SIZE {
                patch[row * PATCH_SIZE + col] = column[row];
            }
        }

        let mut signature = Vec::with_capacity(SIGNATURE_SIZE * SIGNATURE_SIZE - 1);
        for row in 0..SIGNATURE_SIZE {
            for col in 0..SIGNATURE_SIZE {
                if row == 0 && col == 0 {
                    continue;
                }
                signature.push(patch[row * PATCH_SIZE + col]);
            }
        }

        let norm = signature.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in signature.iter_mut() {
                *value /= norm;
            }
        }
        Descriptor::new(signature)
    }
}

impl Default for PatchFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for PatchFeatureExtractor {
    fn extract(&self, path: &Path, size_bound: u32) -> Result<ExtractedImage, SyncError> {
        let image = image::open(path)
            .map_err(|e| SyncError::extraction(path, e.to_string()))?
            .to_luma8();
        let gray = Self::downscale(image, size_bound);

        let mut planner = DctPlanner::new();
        let dct = planner.plan_dct2(PATCH_SIZE);

        let descriptors = Self::keypoints(&gray, self.gradient_threshold)
            .into_iter()
            .map(|(x, y, _)| Self::patch_signature(&gray, x, y, dct.as_ref()))
            .collect();

        Ok(ExtractedImage {
            descriptors: DescriptorSet::new(descriptors),
            text: String::new(),
        })
    }
}
