use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use ultraviolet::f32x8;

pub mod store;
pub mod utils;

/// Appearance feature vector representation, kept as SIMD lanes. The tail of the last lane is
/// padded with zeros which doesn't affect cosine distances.
pub type Feature = Vec<f32x8>;

/// Number of SIMD lanes used to store feature parts internally
const FEATURE_LANES_SIZE: usize = 8;

/// One history record: the box observed for the track at a certain frame
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub bbox: BoundingBox,
    pub frame: usize,
}

/// Persistent identity of one player across frames.
///
/// The history is append-only and its frame indices strictly increase. The last history entry
/// always mirrors `last_box` and `last_seen_frame`.
///
#[derive(Debug, Clone)]
pub struct Track {
    track_id: u64,
    history: Vec<HistoryEntry>,
    last_descriptor: Option<Feature>,
}

impl Track {
    /// Creates a new track with the first observation
    ///
    pub fn new(track_id: u64, bbox: BoundingBox, descriptor: Option<Feature>, frame: usize) -> Self {
        Self {
            track_id,
            history: vec![HistoryEntry { bbox, frame }],
            last_descriptor: descriptor,
        }
    }

    /// Rebuilds the track from a persisted history. The history must not be empty and must be
    /// strictly increasing by frame.
    ///
    pub(crate) fn from_history(
        track_id: u64,
        history: Vec<HistoryEntry>,
        descriptor: Option<Feature>,
    ) -> Result<Self> {
        if history.is_empty() {
            return Err(Errors::InvalidCheckpoint(format!(
                "track {} has empty history",
                track_id
            ))
            .into());
        }
        if history.windows(2).any(|w| w[0].frame >= w[1].frame) {
            return Err(Errors::InvalidCheckpoint(format!(
                "track {} history frames are not strictly increasing",
                track_id
            ))
            .into());
        }
        Ok(Self {
            track_id,
            history,
            last_descriptor: descriptor,
        })
    }

    /// Returns track_id.
    ///
    pub fn get_track_id(&self) -> u64 {
        self.track_id
    }

    pub fn get_history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn get_last_box(&self) -> &BoundingBox {
        &self.last_entry().bbox
    }

    pub fn get_last_descriptor(&self) -> Option<&Feature> {
        self.last_descriptor.as_ref()
    }

    pub fn get_last_seen_frame(&self) -> usize {
        self.last_entry().frame
    }

    /// Number of frames the track was observed in
    ///
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Number of frames passed since the track was observed lastly
    ///
    pub fn missing_frames(&self, current_frame: usize) -> usize {
        current_frame.saturating_sub(self.get_last_seen_frame())
    }

    /// Appends a new observation.
    ///
    /// The descriptor replaces the previous one only when present, so a track keeps its last
    /// successfully extracted appearance.
    ///
    pub fn add_observation(
        &mut self,
        bbox: BoundingBox,
        descriptor: Option<Feature>,
        frame: usize,
    ) -> Result<()> {
        let last_seen = self.get_last_seen_frame();
        if frame <= last_seen {
            return Err(Errors::NonMonotonicFrame {
                track_id: self.track_id,
                last_seen,
                frame,
            }
            .into());
        }
        self.history.push(HistoryEntry { bbox, frame });
        if descriptor.is_some() {
            self.last_descriptor = descriptor;
        }
        Ok(())
    }

    fn last_entry(&self) -> &HistoryEntry {
        // never empty: constructors put the first entry and history is append-only
        &self.history[self.history.len() - 1]
    }
}
