use crate::Errors;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default minimal detector confidence
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Default IoU that a detection must exceed to be matched positionally
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.3;

/// Default cosine distance that a detection must stay below to be matched visually
pub const DEFAULT_FEATURE_THRESHOLD: f32 = 0.4;

/// Default number of frames the track survives without being matched
pub const DEFAULT_MAX_MISSING_FRAMES: usize = 45;

/// Class that is used to configure the player tracker.
///
/// The options may be deserialized from JSON or other `serde` formats; the fields absent in the
/// input take their default values. The options are checked only when [build](PlayerSortOptions::build)
/// is called.
///
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSortOptions {
    confidence_threshold: f32,
    iou_threshold: f32,
    feature_threshold: f32,
    max_missing_frames: usize,
}

impl Default for PlayerSortOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            feature_threshold: DEFAULT_FEATURE_THRESHOLD,
            max_missing_frames: DEFAULT_MAX_MISSING_FRAMES,
        }
    }
}

impl PlayerSortOptions {
    /// Detections with the score lower than the threshold never take part in matching or track
    /// creation.
    ///
    pub fn confidence_threshold(mut self, conf: f32) -> Self {
        self.confidence_threshold = conf;
        self
    }

    /// The IoU between a detection and the track's last box must be strictly greater than the
    /// threshold for the positional match.
    ///
    pub fn iou_threshold(mut self, iou: f32) -> Self {
        self.iou_threshold = iou;
        self
    }

    /// The cosine distance between a detection descriptor and the track's last descriptor must be
    /// strictly less than the threshold for the visual match.
    ///
    pub fn feature_threshold(mut self, dist: f32) -> Self {
        self.feature_threshold = dist;
        self
    }

    /// The number of frames the track remains active without being matched.
    ///
    /// The track last seen at frame `F` is still matchable at `F + n` and is expired at `F + n + 1`.
    ///
    pub fn max_missing_frames(mut self, n: usize) -> Self {
        self.max_missing_frames = n;
        self
    }

    /// Validates the options and produces the immutable configuration
    ///
    pub fn build(self) -> Result<PlayerSortConfig> {
        check_range(
            "confidence_threshold",
            self.confidence_threshold,
            0.0,
            1.0,
        )?;
        check_range("iou_threshold", self.iou_threshold, 0.0, 1.0)?;
        check_range("feature_threshold", self.feature_threshold, 0.0, 2.0)?;

        Ok(PlayerSortConfig {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            feature_threshold: self.feature_threshold,
            max_missing_frames: self.max_missing_frames,
        })
    }
}

fn check_range(name: &str, value: f32, low: f32, high: f32) -> Result<()> {
    if !value.is_finite() || value < low || value > high {
        return Err(Errors::Configuration(format!(
            "{} must be within [{}; {}], got {}",
            name, low, high, value
        ))
        .into());
    }
    Ok(())
}

/// Validated tracker configuration
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSortConfig {
    confidence_threshold: f32,
    iou_threshold: f32,
    feature_threshold: f32,
    max_missing_frames: usize,
}

impl Default for PlayerSortConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            feature_threshold: DEFAULT_FEATURE_THRESHOLD,
            max_missing_frames: DEFAULT_MAX_MISSING_FRAMES,
        }
    }
}

impl PlayerSortConfig {
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    pub fn feature_threshold(&self) -> f32 {
        self.feature_threshold
    }

    pub fn max_missing_frames(&self) -> usize {
        self.max_missing_frames
    }
}
