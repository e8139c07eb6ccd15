use crate::track::Feature;
use crate::utils::bbox::BoundingBox;
use std::collections::HashSet;

/// Goalkeeper class of the player detector
pub const GOALKEEPER_CLASS: i64 = 1;

/// Field player class of the player detector
pub const PLAYER_CLASS: i64 = 2;

/// One object observation within a single frame, prior to identity assignment
///
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f32,
    /// Absent when the region under the box couldn't be extracted
    pub descriptor: Option<Feature>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f32, descriptor: Option<Feature>) -> Self {
        Self {
            bbox,
            score,
            descriptor,
        }
    }

    /// Checks that the detection may take part in matching: the score reaches the threshold and
    /// the descriptor is present. `NaN` scores never pass.
    ///
    pub fn is_eligible(&self, confidence_threshold: f32) -> bool {
        self.score >= confidence_threshold && self.descriptor.is_some()
    }
}

/// Raw object detector output in corner form
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: i64,
}

impl RawDetection {
    pub fn new(xyxy: (f32, f32, f32, f32), score: f32, class_id: i64) -> Self {
        let (x1, y1, x2, y2) = xyxy;
        Self {
            x1,
            y1,
            x2,
            y2,
            score,
            class_id,
        }
    }

    /// Converts the corners to the `(x, y, width, height)` box
    ///
    pub fn to_xywh(&self) -> BoundingBox {
        BoundingBox::from_xyxy(self.x1, self.y1, self.x2, self.y2)
    }
}

/// Keeps only detections of the configured classes.
///
/// The default filter keeps goalkeepers and field players.
///
#[derive(Debug, Clone)]
pub struct ClassFilter {
    classes: HashSet<i64>,
}

impl Default for ClassFilter {
    fn default() -> Self {
        Self::new(&[GOALKEEPER_CLASS, PLAYER_CLASS])
    }
}

impl ClassFilter {
    pub fn new(classes: &[i64]) -> Self {
        Self {
            classes: classes.iter().copied().collect(),
        }
    }

    pub fn accepts(&self, class_id: i64) -> bool {
        self.classes.contains(&class_id)
    }

    /// Selected detections in the input order
    ///
    pub fn apply<'a>(&self, detections: &'a [RawDetection]) -> Vec<&'a RawDetection> {
        detections
            .iter()
            .filter(|d| self.accepts(d.class_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::examples::vec2;
    use crate::trackers::detection::{ClassFilter, Detection, RawDetection};
    use crate::utils::bbox::BoundingBox;

    #[test]
    fn eligibility() {
        let bb = BoundingBox::new(0.0, 0.0, 10.0, 20.0);
        assert!(Detection::new(bb, 0.3, Some(vec2(1.0, 0.0))).is_eligible(0.3));
        assert!(!Detection::new(bb, 0.29, Some(vec2(1.0, 0.0))).is_eligible(0.3));
        assert!(!Detection::new(bb, 0.9, None).is_eligible(0.3));
        assert!(!Detection::new(bb, f32::NAN, Some(vec2(1.0, 0.0))).is_eligible(0.0));
    }

    #[test]
    fn corners() {
        let d = RawDetection::new((10.0, 20.0, 60.0, 120.0), 0.8, 2);
        assert_eq!(d.to_xywh(), BoundingBox::new(10.0, 20.0, 50.0, 100.0));
    }

    #[test]
    fn class_filter() {
        let detections = [
            RawDetection::new((0.0, 0.0, 1.0, 1.0), 0.9, 0),
            RawDetection::new((1.0, 0.0, 2.0, 1.0), 0.9, 2),
            RawDetection::new((2.0, 0.0, 3.0, 1.0), 0.9, 3),
            RawDetection::new((3.0, 0.0, 4.0, 1.0), 0.9, 1),
        ];
        let kept = ClassFilter::default().apply(&detections);
        assert_eq!(kept, vec![&detections[1], &detections[3]]);

        let referees = ClassFilter::new(&[3]).apply(&detections);
        assert_eq!(referees, vec![&detections[2]]);
    }
}
