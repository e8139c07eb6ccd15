/// Core tracking structures: the track itself and the store that keeps all of them
pub mod track;

/// Trackers built on top of the store: the greedy player tracker, its driver and pipelined API
pub mod trackers;

/// Bounding boxes and other geometric helpers
pub mod utils;

/// Distance functions for appearance descriptors
pub mod distance;

/// Raw-pixel appearance descriptor extraction
pub mod descriptor;

/// Synthetic box and frame generators for tests and demos
pub mod examples;

/// Frequently used types
pub mod prelude;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Errors {
    /// The crop defined by the box is empty or lies outside of the frame.
    ///
    /// The crate never constructs it: an invalid region produces no descriptor and the detection
    /// is skipped. Callers that want to report such boxes raise it themselves.
    #[error("Bounding box produces an empty or out-of-frame region.")]
    InvalidRegion,
    #[error("Track {0} is not present in the store.")]
    UnknownTrackReference(u64),
    #[error("Track {track_id} was last seen at frame {last_seen}, frame {frame} cannot be appended.")]
    NonMonotonicFrame {
        track_id: u64,
        last_seen: usize,
        frame: usize,
    },
    #[error("Invalid tracker configuration: {0}")]
    Configuration(String),
    #[error("Invalid tracker checkpoint: {0}")]
    InvalidCheckpoint(String),
    #[error("The tracking pipeline is closed and no longer accepts frames.")]
    PipelineClosed,
}

pub(crate) const EPS: f32 = 0.00001;

/// Denominator guard used by IoU calculation
pub const IOU_EPS: f64 = 1e-6;

/// Approximate comparison for float-based structures
pub trait EstimateClose {
    fn almost_same(&self, other: &Self, eps: f32) -> bool;
}
