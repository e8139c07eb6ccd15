use anyhow::Result;
use image::Rgb;
use log::info;
use playertrack::examples::PitchScene;
use playertrack::prelude::*;
use playertrack::trackers::detection::{GOALKEEPER_CLASS, PLAYER_CLASS};

fn main() -> Result<()> {
    env_logger::init();

    let config = PlayerSortOptions::default()
        .confidence_threshold(0.3)
        .max_missing_frames(25)
        .build()?;
    let mut driver = FrameDriver::new(PlayerSort::new(config));

    let mut scene = PitchScene::new(1280, 720)
        .player(BoundingBox::new(100.0, 300.0, 40.0, 90.0), Rgb([210, 30, 30]), 3.0)
        .player(BoundingBox::new(400.0, 280.0, 40.0, 90.0), Rgb([30, 30, 210]), 3.0)
        .player(BoundingBox::new(700.0, 320.0, 40.0, 90.0), Rgb([230, 230, 230]), 3.0)
        .player(BoundingBox::new(1100.0, 300.0, 40.0, 90.0), Rgb([20, 20, 20]), 1.0);

    for frame_num in 1..=100 {
        let (frame, boxes) = scene.next_frame();
        let detections = boxes
            .iter()
            .enumerate()
            // the second player is hidden behind the others for a while
            .filter(|(i, _)| !(*i == 1 && (40..55).contains(&frame_num)))
            .map(|(i, bb)| {
                let (x1, y1, x2, y2) = bb.as_xyxy();
                let class_id = if i == 3 { GOALKEEPER_CLASS } else { PLAYER_CLASS };
                RawDetection::new((x1, y1, x2, y2), 0.85, class_id)
            })
            .collect::<Vec<_>>();

        let tracks = driver.process(&frame, &detections)?;
        if frame_num % 20 == 0 {
            for t in &tracks {
                eprintln!(
                    "Frame {}: id {} at {:?} ({:?}, length {})",
                    t.frame, t.id, t.bbox, t.match_kind, t.length
                );
            }
        }
    }

    let (tracker, stats) = driver.finish();
    info!("Tracks created: {}", tracker.tracks().len());
    eprintln!(
        "Tracks: {}, active: {}, {:.2} FPS",
        tracker.tracks().len(),
        tracker.active_tracks().len(),
        stats.fps()
    );

    let state = tracker.checkpoint(false);
    eprintln!("Checkpoint: {} bytes", serde_json::to_vec(&state)?.len());
    Ok(())
}
