/// Tracker configuration builder
///
pub mod options;

/// Detections accepted by the tracker and the detector-side adapter
///
pub mod detection;

/// Greedy online player tracker
///
pub mod player_sort;

/// Frame driver: class filtering, descriptor extraction and tracking with throughput counters
pub mod driver;

/// Player tracker with pipelined API
pub mod batch_api;
