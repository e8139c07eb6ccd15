use crate::track::store::{TrackStore, TrackerState};
use crate::track::Track;
use crate::trackers::detection::Detection;
use crate::trackers::options::PlayerSortConfig;
use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use log::debug;

use self::voting::PlayerVoting;

/// Two-tier greedy voting: IoU first, appearance as a fallback
///
pub mod voting;

/// How the detection got its track in the current frame
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchKind {
    /// no active track qualified, a new one was started
    #[default]
    Created,
    /// matched by the overlap with the last box of the track
    Positional,
    /// matched by the appearance descriptor
    Visual,
}

/// Online track information for the frame the track was updated in
///
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTrack {
    /// id of the track
    ///
    pub id: u64,
    /// the box of the detection assigned to the track
    ///
    pub bbox: BoundingBox,
    /// the frame the track was updated at
    ///
    pub frame: usize,
    /// number of frames the track was observed in
    ///
    pub length: usize,
    /// the tier that produced the assignment
    ///
    pub match_kind: MatchKind,
}

impl PlayerTrack {
    fn new(track: &Track, match_kind: MatchKind) -> Self {
        Self {
            id: track.get_track_id(),
            bbox: *track.get_last_box(),
            frame: track.get_last_seen_frame(),
            length: track.len(),
            match_kind,
        }
    }
}

/// Online player tracker.
///
/// Every call of [predict](PlayerSort::predict) is a new frame. Detections are matched greedily
/// in the order they are passed; unmatched ones start new tracks. Tracks that were not matched for
/// more than `max_missing_frames` frames stop taking part in matching, but remain available through
/// [tracks](PlayerSort::tracks).
///
pub struct PlayerSort {
    config: PlayerSortConfig,
    voting: PlayerVoting,
    store: TrackStore,
    frame: usize,
}

impl Default for PlayerSort {
    fn default() -> Self {
        Self::new(PlayerSortConfig::default())
    }
}

impl PlayerSort {
    /// Creates new tracker
    ///
    /// # Parameters
    /// * `config` - validated configuration, see [PlayerSortOptions](crate::trackers::options::PlayerSortOptions)
    ///
    pub fn new(config: PlayerSortConfig) -> Self {
        Self {
            voting: PlayerVoting::new(config.iou_threshold(), config.feature_threshold()),
            store: TrackStore::new(config.max_missing_frames()),
            config,
            frame: 0,
        }
    }

    /// Rebuilds the tracker from the checkpoint. The next call of `predict` processes the frame
    /// that follows `state.frame`.
    ///
    pub fn restore(config: PlayerSortConfig, state: &TrackerState) -> Result<Self> {
        let store = TrackStore::restore(config.max_missing_frames(), state)?;
        Ok(Self {
            voting: PlayerVoting::new(config.iou_threshold(), config.feature_threshold()),
            store,
            config,
            frame: state.frame,
        })
    }

    /// Serializable state of the tracker
    ///
    /// # Parameters
    /// * `with_history` - keep full trajectories, otherwise only the last state of every track
    ///
    pub fn checkpoint(&self, with_history: bool) -> TrackerState {
        self.store.checkpoint(self.frame, with_history)
    }

    pub fn config(&self) -> &PlayerSortConfig {
        &self.config
    }

    /// The index of the lastly processed frame, `0` before the first one
    ///
    pub fn current_frame(&self) -> usize {
        self.frame
    }

    /// Skip number of frames to force tracks to expire, e.g. when the frames are dropped by the
    /// caller
    ///
    /// # Parameters
    /// * `n` - number of frames to skip
    ///
    pub fn skip_frames(&mut self, n: usize) {
        if n > 0 {
            self.advance(n);
        }
    }

    /// Tracks eligible for matching, in ascending id order
    ///
    pub fn active_tracks(&self) -> Vec<&Track> {
        self.store.active_tracks()
    }

    /// The track with the id, active or expired
    ///
    pub fn track(&self, track_id: u64) -> Option<&Track> {
        self.store.get(track_id)
    }

    /// All tracks ever created, in ascending id order
    ///
    pub fn tracks(&self) -> Vec<&Track> {
        self.store.tracks()
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Processes the next frame
    ///
    /// # Parameters
    /// * `detections` - detections of the frame; ones with low score or without descriptor are ignored
    ///
    /// # Returns
    /// The tracks updated or created in the frame, in the order of the eligible detections.
    /// An error means the store contract is broken and the tracker must not be fed further.
    ///
    pub fn predict(&mut self, detections: &[Detection]) -> Result<Vec<PlayerTrack>> {
        self.advance(1);
        let frame = self.frame;

        let eligible = detections
            .iter()
            .filter(|d| d.is_eligible(self.config.confidence_threshold()))
            .collect::<Vec<_>>();

        debug!(
            "Frame {}: {} of {} detections are eligible, {} active tracks",
            frame,
            eligible.len(),
            detections.len(),
            self.store.stats().1
        );

        let winners = self
            .voting
            .winners(&eligible, &self.store.active_tracks());

        let mut res = Vec::with_capacity(eligible.len());
        for (detection, winner) in eligible.into_iter().zip(winners) {
            let (track_id, match_kind) = match winner {
                Some((track_id, match_kind)) => {
                    self.store.update(
                        track_id,
                        detection.bbox,
                        detection.descriptor.clone(),
                        frame,
                    )?;
                    (track_id, match_kind)
                }
                None => (
                    self.store
                        .create(detection.bbox, detection.descriptor.clone(), frame),
                    MatchKind::Created,
                ),
            };

            let track = self
                .store
                .get(track_id)
                .ok_or(Errors::UnknownTrackReference(track_id))?;
            res.push(PlayerTrack::new(track, match_kind));
        }

        Ok(res)
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut TrackStore {
        &mut self.store
    }

    // The frame moves first, so a track that exceeds the bound never takes part in matching.
    fn advance(&mut self, n: usize) {
        self.frame += n;
        self.store.prune(self.frame);
    }
}
