use std::time::{Duration, Instant};

use townwalk_shared::layout::TownLayout;
use tracing::info;

use crate::camera::CameraMode;
use crate::snapshot::FrameSnapshot;

/// Rendering boundary. The static layout is handed over once; after that
/// the sink only sees per-tick snapshots.
pub trait FrameSink {
    fn build_scene(&mut self, layout: &TownLayout);
    fn present(&mut self, frame: &FrameSnapshot);
}

const SUMMARY_INTERVAL: Duration = Duration::from_secs(1);

/// Sink that draws nothing and logs a frame summary at most once a second.
#[derive(Debug, Default)]
pub struct TraceSink {
    last_summary: Option<Instant>,
    frames_since_summary: u32,
}

impl TraceSink {
    /// Returns true when a summary was logged for this frame.
    fn present_at(&mut self, frame: &FrameSnapshot, now: Instant) -> bool {
        self.frames_since_summary += 1;
        if self
            .last_summary
            .is_some_and(|last| now.duration_since(last) < SUMMARY_INTERVAL)
        {
            return false;
        }

        let mode = match frame.camera.mode {
            CameraMode::FirstPerson => "first-person",
            CameraMode::ThirdPerson => "third-person",
        };
        let target = frame
            .target
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_string());
        let pos = frame.avatar.position;
        let speed = frame.avatar.velocity.with_y(0.0).length();
        info!(
            "avatar=({:.1}, {:.1}, {:.1}) speed={speed:.1} camera={mode} \
             blocks={} highlighted={} target={target} frames={}",
            pos.x,
            pos.y,
            pos.z,
            frame.blocks.len(),
            frame.highlighted().count(),
            self.frames_since_summary
        );

        self.last_summary = Some(now);
        self.frames_since_summary = 0;
        true
    }
}

impl FrameSink for TraceSink {
    fn build_scene(&mut self, layout: &TownLayout) {
        info!(
            "Town scene: {} houses, {} trees, {} lamps, {} road surfaces",
            layout.houses.len(),
            layout.trees.len(),
            layout.lamps.len(),
            layout.surfaces.len()
        );
    }

    fn present(&mut self, frame: &FrameSnapshot) {
        self.present_at(frame, Instant::now());
    }
}
