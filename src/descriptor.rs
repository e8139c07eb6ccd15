use crate::track::utils::FromVec;
use crate::track::Feature;
use crate::utils::bbox::BoundingBox;
use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;

/// Canonical descriptor crop width
pub const DESCRIPTOR_WIDTH: u32 = 64;

/// Canonical descriptor crop height
pub const DESCRIPTOR_HEIGHT: u32 = 128;

const CHANNELS: usize = 3;

/// Raw-pixel appearance signature extractor.
///
/// The region under the box is cropped, resized to the canonical resolution, scaled to `[0; 1]`
/// and flattened row by row with interleaved channels. Descriptors produced by extractors with
/// different resolutions are not comparable.
///
#[derive(Debug, Clone, Copy)]
pub struct DescriptorExtractor {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl Default for DescriptorExtractor {
    fn default() -> Self {
        Self {
            width: DESCRIPTOR_WIDTH,
            height: DESCRIPTOR_HEIGHT,
            filter: FilterType::Triangle,
        }
    }
}

impl DescriptorExtractor {
    /// Creates the extractor with a custom canonical resolution
    ///
    pub fn new(width: u32, height: u32, filter: FilterType) -> Self {
        assert!(
            width > 0 && height > 0,
            "Descriptor resolution must be a positive number"
        );
        Self {
            width,
            height,
            filter,
        }
    }

    /// Number of values in every produced descriptor
    ///
    pub fn descriptor_len(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    /// Extracts the descriptor for the box in the frame.
    ///
    /// Returns `None` when the box clamped to the frame has no area.
    ///
    pub fn extract(&self, frame: &RgbImage, bbox: &BoundingBox) -> Option<Feature> {
        self.extract_raw(frame, bbox)
            .map(|raw| Feature::from_vec(raw.as_slice()))
    }

    /// The same as [extract](DescriptorExtractor::extract) but returns the flat vector
    ///
    pub fn extract_raw(&self, frame: &RgbImage, bbox: &BoundingBox) -> Option<Vec<f32>> {
        let region = bbox.pixel_region(frame.width(), frame.height())?;
        let crop = imageops::crop_imm(frame, region.left, region.top, region.width, region.height)
            .to_image();
        let resized = imageops::resize(&crop, self.width, self.height, self.filter);
        Some(
            resized
                .into_raw()
                .into_iter()
                .map(|v| v as f32 / 255.0)
                .collect(),
        )
    }

    /// Extracts descriptors for all boxes of one frame in parallel. The output order matches the
    /// input order.
    ///
    pub fn extract_batch(&self, frame: &RgbImage, boxes: &[BoundingBox]) -> Vec<Option<Feature>> {
        boxes
            .par_iter()
            .map(|bbox| self.extract(frame, bbox))
            .collect()
    }
}
