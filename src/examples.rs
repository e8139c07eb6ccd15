use crate::track::utils::FromVec;
use crate::track::Feature;
use crate::utils::bbox::BoundingBox;
use image::{Rgb, RgbImage};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn vec2(x: f32, y: f32) -> Feature {
    Feature::from_vec(vec![x, y])
}

/// Generator of a randomly drifting box. Seeded, so the sequences repeat between runs.
///
pub struct BoxGen2 {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    gen: StdRng,
    dist_pos: Uniform<f32>,
    dist_box: Uniform<f32>,
}

impl BoxGen2 {
    pub fn with_seed(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        pos_drift: f32,
        box_drift: f32,
        seed: u64,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            gen: StdRng::seed_from_u64(seed),
            dist_pos: Uniform::new_inclusive(-pos_drift, pos_drift),
            dist_box: Uniform::new_inclusive(-box_drift, box_drift),
        }
    }
}

impl Iterator for BoxGen2 {
    type Item = BoundingBox;

    fn next(&mut self) -> Option<Self::Item> {
        self.x += self.gen.sample(self.dist_pos);
        self.y += self.gen.sample(self.dist_pos);

        self.width += self.gen.sample(self.dist_box);
        self.height += self.gen.sample(self.dist_box);

        if self.width < 1.0 {
            self.width = 1.0;
        }
        if self.height < 1.0 {
            self.height = 1.0;
        }

        Some(BoundingBox::new(self.x, self.y, self.width, self.height))
    }
}

/// Frame filled with one color
///
pub fn solid_frame(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Fills the part of the box that lies inside the frame
///
pub fn paint_box(frame: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    if let Some(region) = bbox.pixel_region(frame.width(), frame.height()) {
        for y in region.top..region.top + region.height {
            for x in region.left..region.left + region.width {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Synthetic pitch: colored players drifting over a green background.
///
/// Every player keeps its jersey color, so the frames produce stable appearance descriptors.
///
pub struct PitchScene {
    width: u32,
    height: u32,
    players: Vec<(BoxGen2, Rgb<u8>)>,
}

impl PitchScene {
    pub const BACKGROUND: Rgb<u8> = Rgb([30, 110, 40]);

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            players: Vec::default(),
        }
    }

    /// Adds a player starting at `bbox` that moves for up to `drift` pixels per frame
    ///
    pub fn player(mut self, bbox: BoundingBox, color: Rgb<u8>, drift: f32) -> Self {
        let seed = self.players.len() as u64;
        self.players.push((
            BoxGen2::with_seed(
                bbox.x(),
                bbox.y(),
                bbox.width(),
                bbox.height(),
                drift,
                0.0,
                seed,
            ),
            color,
        ));
        self
    }

    /// Renders the next frame and returns it with the boxes of the players in insertion order
    ///
    pub fn next_frame(&mut self) -> (RgbImage, Vec<BoundingBox>) {
        let mut frame = solid_frame(self.width, self.height, Self::BACKGROUND);
        let boxes = self
            .players
            .iter_mut()
            .map(|(gen, color)| {
                // the generator never ends
                let bbox = gen.next().unwrap_or_default();
                paint_box(&mut frame, &bbox, *color);
                bbox
            })
            .collect();
        (frame, boxes)
    }
}
