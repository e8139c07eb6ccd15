use crate::{EstimateClose, EPS, IOU_EPS};
use serde::{Deserialize, Serialize};

/// Bounding box in the format (x, y, width, height), pixel units
///
#[derive(Clone, Default, Debug, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "x")]
    _x: f32,
    #[serde(rename = "y")]
    _y: f32,
    #[serde(rename = "width")]
    _width: f32,
    #[serde(rename = "height")]
    _height: f32,
}

/// Integer pixel window inside a frame: left, top, width, height
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Constructor
    ///
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            _x: x,
            _y: y,
            _width: width,
            _height: height,
        }
    }

    /// Creates the box from corner form `(x1, y1, x2, y2)` produced by detectors
    ///
    pub fn from_xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn x(&self) -> f32 {
        self._x
    }

    pub fn y(&self) -> f32 {
        self._y
    }

    pub fn width(&self) -> f32 {
        self._width
    }

    pub fn height(&self) -> f32 {
        self._height
    }

    pub fn right(&self) -> f32 {
        self._x + self._width
    }

    pub fn bottom(&self) -> f32 {
        self._y + self._height
    }

    pub fn area(&self) -> f32 {
        self._width.max(0.0) * self._height.max(0.0)
    }

    /// Returns `(x1, y1, x2, y2)`
    ///
    pub fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self._x, self._y, self.right(), self.bottom())
    }

    /// Area of the overlap of two boxes. Degenerate boxes overlap nothing.
    ///
    pub fn intersection(l: &BoundingBox, r: &BoundingBox) -> f64 {
        let (ax0, ay0, ax1, ay1) = l.as_xyxy();
        let (bx0, by0, bx1, by1) = r.as_xyxy();

        let (x1, y1) = (ax0.max(bx0), ay0.max(by0));
        let (x2, y2) = (ax1.min(bx1), ay1.min(by1));

        let int_width = (x2 - x1) as f64;
        let int_height = (y2 - y1) as f64;

        if int_width > 0.0 && int_height > 0.0 {
            int_width * int_height
        } else {
            0.0_f64
        }
    }

    /// Intersection over union.
    ///
    /// The union is `area(l) + area(r) - intersection` and a small epsilon is added to the
    /// denominator, so zero-sized boxes yield `0.0` instead of `NaN`. The bottom edge of the
    /// overlap is taken from both boxes, which keeps `iou(a, b) == iou(b, a)`.
    ///
    pub fn iou(l: &BoundingBox, r: &BoundingBox) -> f32 {
        let intersection = BoundingBox::intersection(l, r);
        let union = l.area() as f64 + r.area() as f64 - intersection;
        (intersection / (union + IOU_EPS)) as f32
    }

    /// Clamps the box to a `frame_width x frame_height` frame.
    ///
    /// Coordinates are truncated toward zero first, as pixel indices are. Returns `None` when
    /// nothing of the box remains inside the frame or the box has no area.
    ///
    pub fn pixel_region(&self, frame_width: u32, frame_height: u32) -> Option<PixelRegion> {
        if !(self._x.is_finite()
            && self._y.is_finite()
            && self._width.is_finite()
            && self._height.is_finite())
        {
            return None;
        }

        let (x, y) = (self._x.trunc() as i64, self._y.trunc() as i64);
        let (w, h) = (self._width.trunc() as i64, self._height.trunc() as i64);

        let left = x.clamp(0, frame_width as i64);
        let top = y.clamp(0, frame_height as i64);
        let right = (x + w).clamp(0, frame_width as i64);
        let bottom = (y + h).clamp(0, frame_height as i64);

        if right <= left || bottom <= top {
            None
        } else {
            Some(PixelRegion {
                left: left as u32,
                top: top as u32,
                width: (right - left) as u32,
                height: (bottom - top) as u32,
            })
        }
    }
}

impl EstimateClose for BoundingBox {
    /// Allows comparing bboxes
    ///
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self._x - other._x).abs() < eps
            && (self._y - other._y).abs() < eps
            && (self._width - other._width).abs() < eps
            && (self._height - other._height).abs() < eps
    }
}

impl PartialEq<Self> for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.almost_same(other, EPS)
    }
}
