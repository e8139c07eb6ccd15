use crate::distance::cosine_distance;
use crate::track::Track;
use crate::trackers::detection::Detection;
use crate::trackers::player_sort::MatchKind;
use crate::utils::bbox::BoundingBox;
use log::debug;
use std::collections::HashSet;

/// Greedy two-tier voting.
///
/// Every detection takes the best of the tracks not yet taken in the frame. A positional
/// candidate (IoU above the threshold) always beats a visual one (cosine distance below the
/// threshold). Within a tier the first track with the best metric wins, so the outcome depends
/// only on the order of detections and tracks.
///
#[derive(Debug, Clone, Copy)]
pub struct PlayerVoting {
    iou_threshold: f32,
    feature_threshold: f32,
}

impl PlayerVoting {
    pub fn new(iou_threshold: f32, feature_threshold: f32) -> Self {
        Self {
            iou_threshold,
            feature_threshold,
        }
    }

    /// Resolves the winners for the detections of one frame.
    ///
    /// # Parameters
    /// * `detections` - eligible detections in processing order
    /// * `tracks` - active tracks in ascending id order
    ///
    /// # Returns
    /// The winner for every detection at the same position, `None` means a new track is required.
    /// No track appears twice in the result.
    ///
    pub fn winners(
        &self,
        detections: &[&Detection],
        tracks: &[&Track],
    ) -> Vec<Option<(u64, MatchKind)>> {
        let mut matched = HashSet::new();
        let mut res = Vec::with_capacity(detections.len());
        for detection in detections {
            let winner = self.best_track(
                detection,
                tracks
                    .iter()
                    .filter(|t| !matched.contains(&t.get_track_id()))
                    .copied(),
            );
            if let Some((track_id, _)) = winner {
                matched.insert(track_id);
            }
            res.push(winner);
        }
        res
    }

    /// Selects the best track for a single detection among the candidates
    ///
    pub fn best_track<'a, I>(&self, detection: &Detection, tracks: I) -> Option<(u64, MatchKind)>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut best_iou: Option<(u64, f32)> = None;
        let mut best_dist: Option<(u64, f32)> = None;

        for track in tracks {
            let track_id = track.get_track_id();
            let iou = BoundingBox::iou(&detection.bbox, track.get_last_box());
            if iou > self.iou_threshold {
                if best_iou.map_or(true, |(_, best)| iou > best) {
                    best_iou = Some((track_id, iou));
                }
                continue;
            }

            // the visual tier can't win against a positional candidate
            if best_iou.is_some() {
                continue;
            }

            // zero-norm descriptors have no defined distance and never match visually
            let dist = match (&detection.descriptor, track.get_last_descriptor()) {
                (Some(feature), Some(track_feature)) => cosine_distance(feature, track_feature),
                _ => None,
            };
            if let Some(dist) = dist {
                if dist < self.feature_threshold && best_dist.map_or(true, |(_, best)| dist < best)
                {
                    best_dist = Some((track_id, dist));
                }
            }
        }

        if let Some((track_id, iou)) = best_iou {
            debug!("Positional winner: track {}, IoU {}", track_id, iou);
            Some((track_id, MatchKind::Positional))
        } else if let Some((track_id, dist)) = best_dist {
            debug!("Visual winner: track {}, distance {}", track_id, dist);
            Some((track_id, MatchKind::Visual))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod voting_tests {
    use crate::examples::vec2;
    use crate::track::Track;
    use crate::trackers::detection::Detection;
    use crate::trackers::player_sort::voting::PlayerVoting;
    use crate::trackers::player_sort::MatchKind;
    use crate::utils::bbox::BoundingBox;

    fn voting() -> PlayerVoting {
        PlayerVoting::new(0.3, 0.4)
    }

    #[test]
    fn positional_match() {
        let t = Track::new(
            0,
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.0)),
            1,
        );
        let d = Detection::new(
            BoundingBox::new(12.0, 11.0, 50.0, 100.0),
            0.9,
            Some(vec2(0.0, 1.0)),
        );
        assert_eq!(
            voting().best_track(&d, [&t]),
            Some((0, MatchKind::Positional))
        );
    }

    #[test]
    fn visual_match() {
        let t = Track::new(
            0,
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.1)),
            1,
        );
        let d = Detection::new(
            BoundingBox::new(500.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        assert_eq!(voting().best_track(&d, [&t]), Some((0, MatchKind::Visual)));
    }

    #[test]
    fn no_match() {
        let far_no_feature = Track::new(0, BoundingBox::new(300.0, 10.0, 50.0, 100.0), None, 1);
        let far_other_look = Track::new(
            1,
            BoundingBox::new(500.0, 10.0, 50.0, 100.0),
            Some(vec2(0.0, 1.0)),
            1,
        );
        let d = Detection::new(
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        assert_eq!(
            voting().best_track(&d, [&far_no_feature, &far_other_look]),
            None
        );
    }

    #[test]
    fn positional_beats_visual_in_any_order() {
        let look_alike = Track::new(
            0,
            BoundingBox::new(400.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.0)),
            1,
        );
        let overlapping = Track::new(
            1,
            BoundingBox::new(15.0, 10.0, 50.0, 100.0),
            Some(vec2(0.0, 1.0)),
            1,
        );
        let d = Detection::new(
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        assert_eq!(
            voting().best_track(&d, [&look_alike, &overlapping]),
            Some((1, MatchKind::Positional))
        );
        assert_eq!(
            voting().best_track(&d, [&overlapping, &look_alike]),
            Some((1, MatchKind::Positional))
        );
    }

    #[test]
    fn best_within_tier() {
        let t0 = Track::new(0, BoundingBox::new(30.0, 10.0, 50.0, 100.0), None, 1);
        let t1 = Track::new(1, BoundingBox::new(12.0, 10.0, 50.0, 100.0), None, 1);
        let t2 = Track::new(2, BoundingBox::new(12.0, 10.0, 50.0, 100.0), None, 1);
        let d = Detection::new(
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        // equal IoU: the first track wins
        assert_eq!(
            voting().best_track(&d, [&t0, &t1, &t2]),
            Some((1, MatchKind::Positional))
        );

        let v0 = Track::new(
            0,
            BoundingBox::new(300.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.5)),
            1,
        );
        let v1 = Track::new(
            1,
            BoundingBox::new(500.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.1)),
            1,
        );
        assert_eq!(
            voting().best_track(&d, [&v0, &v1]),
            Some((1, MatchKind::Visual))
        );
    }

    #[test]
    fn zero_descriptor_never_matches_visually() {
        let relaxed = PlayerVoting::new(0.3, 1.5);
        let t = Track::new(
            0,
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.0)),
            1,
        );
        let black = Detection::new(
            BoundingBox::new(600.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(0.0, 0.0)),
        );
        assert_eq!(relaxed.best_track(&black, [&t]), None);

        let dark_track = Track::new(
            1,
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            Some(vec2(0.0, 0.0)),
            1,
        );
        let d = Detection::new(
            BoundingBox::new(600.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        assert_eq!(relaxed.best_track(&d, [&dark_track]), None);

        // a regular pair still matches under the same threshold
        assert_eq!(relaxed.best_track(&d, [&t]), Some((0, MatchKind::Visual)));
    }

    #[test]
    fn winners_are_unique() {
        let t = Track::new(
            0,
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            Some(vec2(1.0, 0.0)),
            1,
        );
        let d1 = Detection::new(
            BoundingBox::new(11.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        let d2 = Detection::new(
            BoundingBox::new(10.0, 10.0, 50.0, 100.0),
            0.9,
            Some(vec2(1.0, 0.0)),
        );
        let w = voting().winners(&[&d1, &d2], &[&t]);
        assert_eq!(w, vec![Some((0, MatchKind::Positional)), None]);
    }
}
