use crate::descriptor::DescriptorExtractor;
use crate::trackers::detection::{ClassFilter, Detection, RawDetection};
use crate::trackers::player_sort::{PlayerSort, PlayerTrack};
use anyhow::Result;
use image::RgbImage;
use log::info;
use std::time::{Duration, Instant};

/// Counters accumulated by the [FrameDriver]
///
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessingStats {
    /// frames processed
    pub frames: usize,
    /// detections that passed the class filter
    pub detections: usize,
    /// detections that got a track
    pub associated: usize,
    /// time spent in the driver
    pub elapsed: Duration,
}

impl ProcessingStats {
    /// Frames per second, `0.0` when nothing was measured
    ///
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Glue between a detector and the tracker.
///
/// For every frame it keeps the detections of the wanted classes, extracts their descriptors from
/// the frame and passes them to the tracker in the detector order.
///
pub struct FrameDriver {
    tracker: PlayerSort,
    extractor: DescriptorExtractor,
    filter: ClassFilter,
    stats: ProcessingStats,
}

impl FrameDriver {
    pub fn new(tracker: PlayerSort) -> Self {
        Self {
            tracker,
            extractor: DescriptorExtractor::default(),
            filter: ClassFilter::default(),
            stats: ProcessingStats::default(),
        }
    }

    pub fn extractor(mut self, extractor: DescriptorExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn class_filter(mut self, filter: ClassFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Tracks the detections of the frame
    ///
    /// # Parameters
    /// * `frame` - the frame the detections were produced from
    /// * `detections` - detector output in corner form
    ///
    /// # Returns
    /// The tracks updated in the frame, ready to be drawn.
    ///
    pub fn process(
        &mut self,
        frame: &RgbImage,
        detections: &[RawDetection],
    ) -> Result<Vec<PlayerTrack>> {
        let started = Instant::now();

        let selected = self.filter.apply(detections);
        let boxes = selected.iter().map(|d| d.to_xywh()).collect::<Vec<_>>();
        let descriptors = self.extractor.extract_batch(frame, &boxes);

        let detections = selected
            .iter()
            .zip(boxes)
            .zip(descriptors)
            .map(|((raw, bbox), descriptor)| Detection::new(bbox, raw.score, descriptor))
            .collect::<Vec<_>>();

        let res = self.tracker.predict(&detections)?;

        self.stats.frames += 1;
        self.stats.detections += detections.len();
        self.stats.associated += res.len();
        self.stats.elapsed += started.elapsed();

        Ok(res)
    }

    pub fn tracker(&self) -> &PlayerSort {
        &self.tracker
    }

    pub fn stats(&self) -> ProcessingStats {
        self.stats
    }

    /// Logs the throughput summary and returns the tracker with the collected counters
    ///
    pub fn finish(self) -> (PlayerSort, ProcessingStats) {
        info!(
            "Processed {} frames in {:.2} seconds ({:.2} FPS), {} of {} detections associated",
            self.stats.frames,
            self.stats.elapsed.as_secs_f64(),
            self.stats.fps(),
            self.stats.associated,
            self.stats.detections
        );
        (self.tracker, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use crate::examples::PitchScene;
    use crate::trackers::detection::{ClassFilter, RawDetection, PLAYER_CLASS};
    use crate::trackers::driver::{FrameDriver, ProcessingStats};
    use crate::trackers::player_sort::{MatchKind, PlayerSort};
    use crate::utils::bbox::BoundingBox;
    use anyhow::Result;
    use image::Rgb;
    use std::time::Duration;

    fn raw(bbox: &BoundingBox, class_id: i64) -> RawDetection {
        let (x1, y1, x2, y2) = bbox.as_xyxy();
        RawDetection::new((x1, y1, x2, y2), 0.9, class_id)
    }

    #[test]
    fn players_keep_ids() -> Result<()> {
        let mut scene = PitchScene::new(400, 200)
            .player(BoundingBox::new(20.0, 60.0, 40.0, 80.0), Rgb([220, 20, 20]), 2.0)
            .player(BoundingBox::new(150.0, 60.0, 40.0, 80.0), Rgb([20, 20, 220]), 2.0)
            .player(BoundingBox::new(280.0, 60.0, 40.0, 80.0), Rgb([240, 240, 0]), 2.0);
        let mut driver = FrameDriver::new(PlayerSort::default());

        for frame_num in 1..=30 {
            let (frame, boxes) = scene.next_frame();
            let detections = vec![
                raw(&boxes[0], PLAYER_CLASS),
                raw(&boxes[1], PLAYER_CLASS),
                // referee
                raw(&boxes[2], 3),
            ];
            let res = driver.process(&frame, &detections)?;
            assert_eq!(res.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0, 1]);
            if frame_num > 1 {
                assert!(res.iter().all(|t| t.match_kind == MatchKind::Positional));
            }
        }

        let stats = driver.stats();
        assert_eq!(stats.frames, 30);
        assert_eq!(stats.detections, 60);
        assert_eq!(stats.associated, 60);

        let (tracker, _) = driver.finish();
        assert_eq!(tracker.tracks().len(), 2);
        assert_eq!(tracker.track(1).unwrap().len(), 30);
        Ok(())
    }

    #[test]
    fn out_of_frame_detections_are_dropped() -> Result<()> {
        let mut scene = PitchScene::new(200, 200).player(
            BoundingBox::new(20.0, 20.0, 40.0, 80.0),
            Rgb([220, 20, 20]),
            0.0,
        );
        let mut driver =
            FrameDriver::new(PlayerSort::default()).class_filter(ClassFilter::new(&[0]));
        let (frame, boxes) = scene.next_frame();
        let res = driver.process(
            &frame,
            &[
                raw(&boxes[0], 0),
                raw(&BoundingBox::new(300.0, 20.0, 40.0, 80.0), 0),
            ],
        )?;
        assert_eq!(res.len(), 1);
        assert_eq!(driver.stats().detections, 2);
        assert_eq!(driver.stats().associated, 1);
        Ok(())
    }

    #[test]
    fn fps() {
        let stats = ProcessingStats {
            frames: 50,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.fps() - 25.0).abs() < 1e-9);
        assert_eq!(ProcessingStats::default().fps(), 0.0);
    }
}
