pub use crate::descriptor::DescriptorExtractor;
pub use crate::track::store::{TrackCheckpoint, TrackStore, TrackerState};
pub use crate::track::utils::FromVec;
pub use crate::track::{Feature, HistoryEntry, Track};
pub use crate::trackers::batch_api::{BatchPlayerSort, FrameResult};
pub use crate::trackers::detection::{ClassFilter, Detection, RawDetection};
pub use crate::trackers::driver::{FrameDriver, ProcessingStats};
pub use crate::trackers::options::{PlayerSortConfig, PlayerSortOptions};
pub use crate::trackers::player_sort::{MatchKind, PlayerSort, PlayerTrack};
pub use crate::utils::bbox::BoundingBox;
pub use crate::Errors;
