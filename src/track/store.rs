use crate::track::utils::FromVec;
use crate::track::{Feature, HistoryEntry, Track};
use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

mod store_tests;

/// Serializable state of one track
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCheckpoint {
    pub id: u64,
    pub last_box: BoundingBox,
    pub last_descriptor: Option<Vec<f32>>,
    pub last_seen_frame: usize,
    /// `(box, frame)` pairs, only present when the full trajectory is persisted
    #[serde(default)]
    pub history: Option<Vec<(BoundingBox, usize)>>,
}

/// Minimal state that is required to continue tracking after a restart
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerState {
    pub next_id: u64,
    pub frame: usize,
    pub tracks: Vec<TrackCheckpoint>,
}

/// Authoritative set of the tracks.
///
/// All the tracks ever created are kept in the log until the store is dropped; the active index
/// keeps only those that are eligible for matching. Ids are allocated sequentially from `0` and
/// never reused.
///
#[derive(Debug, Clone)]
pub struct TrackStore {
    max_missing_frames: usize,
    next_id: u64,
    tracks: HashMap<u64, Track>,
    active: BTreeSet<u64>,
}

impl TrackStore {
    /// Creates the store
    ///
    /// # Parameters
    /// * `max_missing_frames` - how many frames the track stays active without being updated
    ///
    pub fn new(max_missing_frames: usize) -> Self {
        Self {
            max_missing_frames,
            next_id: 0,
            tracks: HashMap::default(),
            active: BTreeSet::default(),
        }
    }

    pub fn max_missing_frames(&self) -> usize {
        self.max_missing_frames
    }

    /// The id the next created track receives
    ///
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Active tracks in ascending id order
    ///
    pub fn active_tracks(&self) -> Vec<&Track> {
        self.active
            .iter()
            .map(|track_id| &self.tracks[track_id])
            .collect()
    }

    /// Ids of active tracks in ascending order
    ///
    pub fn active_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.active.iter().copied()
    }

    pub fn is_active(&self, track_id: u64) -> bool {
        self.active.contains(&track_id)
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// All tracks, active and expired, in ascending id order
    ///
    pub fn tracks(&self) -> Vec<&Track> {
        self.tracks
            .values()
            .sorted_by_key(|t| t.get_track_id())
            .collect()
    }

    /// Returns `(all tracks, active tracks)` counts
    ///
    pub fn stats(&self) -> (usize, usize) {
        (self.tracks.len(), self.active.len())
    }

    /// Creates a new active track and returns its id
    ///
    pub fn create(&mut self, bbox: BoundingBox, descriptor: Option<Feature>, frame: usize) -> u64 {
        let track_id = self.next_id;
        self.next_id += 1;
        self.tracks
            .insert(track_id, Track::new(track_id, bbox, descriptor, frame));
        self.active.insert(track_id);
        debug!("Track {} created at frame {}", track_id, frame);
        track_id
    }

    /// Appends the observation to the existing track
    ///
    /// # Returns
    /// * [`Errors::UnknownTrackReference`](Errors::UnknownTrackReference) when the track is absent;
    /// * [`Errors::NonMonotonicFrame`](Errors::NonMonotonicFrame) when the frame doesn't advance the track.
    ///
    pub fn update(
        &mut self,
        track_id: u64,
        bbox: BoundingBox,
        descriptor: Option<Feature>,
        frame: usize,
    ) -> Result<()> {
        let track = self
            .tracks
            .get_mut(&track_id)
            .ok_or(Errors::UnknownTrackReference(track_id))?;
        track.add_observation(bbox, descriptor, frame)?;
        self.active.insert(track_id);
        Ok(())
    }

    /// Removes from the active index the tracks that were missing for more than
    /// `max_missing_frames` frames at `frame`. Returns the ids removed.
    ///
    pub fn prune(&mut self, frame: usize) -> Vec<u64> {
        let expired = self
            .active
            .iter()
            .filter(|track_id| self.tracks[*track_id].missing_frames(frame) > self.max_missing_frames)
            .copied()
            .collect::<Vec<_>>();

        for track_id in &expired {
            self.active.remove(track_id);
            debug!("Track {} expired at frame {}", track_id, frame);
        }
        expired
    }

    /// Builds the serializable state of the store
    ///
    /// # Parameters
    /// * `frame` - the frame the tracker is currently at
    /// * `with_history` - persist full trajectories or only the last state of every track
    ///
    pub fn checkpoint(&self, frame: usize, with_history: bool) -> TrackerState {
        let tracks = self
            .tracks()
            .into_iter()
            .map(|t| TrackCheckpoint {
                id: t.get_track_id(),
                last_box: *t.get_last_box(),
                last_descriptor: t.get_last_descriptor().map(|d| Vec::<f32>::from_vec(d)),
                last_seen_frame: t.get_last_seen_frame(),
                history: if with_history {
                    Some(t.get_history().iter().map(|e| (e.bbox, e.frame)).collect())
                } else {
                    None
                },
            })
            .collect();

        TrackerState {
            next_id: self.next_id,
            frame,
            tracks,
        }
    }

    /// Rebuilds the store from the state; the active index is recomputed for `state.frame`.
    ///
    pub fn restore(max_missing_frames: usize, state: &TrackerState) -> Result<Self> {
        let mut store = Self::new(max_missing_frames);
        store.next_id = state.next_id;

        let mut seen = HashSet::new();
        for t in &state.tracks {
            if t.id >= state.next_id {
                return Err(Errors::InvalidCheckpoint(format!(
                    "track id {} is not below next id {}",
                    t.id, state.next_id
                ))
                .into());
            }
            if !seen.insert(t.id) {
                return Err(
                    Errors::InvalidCheckpoint(format!("track id {} is duplicated", t.id)).into(),
                );
            }
            if t.last_seen_frame > state.frame {
                return Err(Errors::InvalidCheckpoint(format!(
                    "track {} was seen at frame {} after the current frame {}",
                    t.id, t.last_seen_frame, state.frame
                ))
                .into());
            }

            let descriptor = t
                .last_descriptor
                .as_ref()
                .map(|d| Feature::from_vec(d.as_slice()));

            let track = match &t.history {
                None => Track::new(t.id, t.last_box, descriptor, t.last_seen_frame),
                Some(history) => {
                    let track = Track::from_history(
                        t.id,
                        history
                            .iter()
                            .map(|(bbox, frame)| HistoryEntry {
                                bbox: *bbox,
                                frame: *frame,
                            })
                            .collect(),
                        descriptor,
                    )?;
                    if track.get_last_seen_frame() != t.last_seen_frame
                        || *track.get_last_box() != t.last_box
                    {
                        return Err(Errors::InvalidCheckpoint(format!(
                            "track {} history doesn't end with its last box",
                            t.id
                        ))
                        .into());
                    }
                    track
                }
            };

            store.tracks.insert(t.id, track);
            store.active.insert(t.id);
        }

        store.prune(state.frame);
        Ok(store)
    }
}
