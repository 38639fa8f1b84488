use glam::{IVec3, Mat4, Quat, Vec3};
use townwalk_shared::block::{Block, BlockColor, BlockId};

use crate::animation::{LimbPoses, MotionState};
use crate::camera::{Camera, CameraMode};

/// How far in front of the camera the crosshair is drawn.
pub const CROSSHAIR_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarTransform {
    pub position: Vec3,
    pub yaw: f32,
    /// Last commanded velocity.
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub forward: Vec3,
    pub view_projection: Mat4,
    pub mode: CameraMode,
}

impl CameraPose {
    pub fn from_camera(camera: &Camera, mode: CameraMode) -> Self {
        Self {
            position: camera.position,
            orientation: camera.orientation(),
            forward: camera.forward_direction(),
            view_projection: camera.view_projection_matrix(),
            mode,
        }
    }

    /// World position of the screen-centre crosshair.
    pub fn crosshair(&self) -> Vec3 {
        self.position + self.forward * CROSSHAIR_DISTANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockInstance {
    pub id: BlockId,
    pub position: IVec3,
    pub color: BlockColor,
    pub highlighted: bool,
}

impl BlockInstance {
    pub fn new(block: &Block, target: Option<BlockId>) -> Self {
        Self {
            id: block.id,
            position: block.position,
            color: block.color,
            highlighted: target == Some(block.id),
        }
    }
}

/// Everything a renderer needs to draw one tick. Produced by the session and
/// consumed without feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub avatar: AvatarTransform,
    pub limbs: LimbPoses,
    pub motion: MotionState,
    pub walk_phase: f32,
    pub punch_phase: f32,
    pub camera: CameraPose,
    pub crosshair: Vec3,
    pub blocks: Vec<BlockInstance>,
    pub target: Option<BlockId>,
}

impl FrameSnapshot {
    pub fn highlighted(&self) -> impl Iterator<Item = &BlockInstance> {
        self.blocks.iter().filter(|block| block.highlighted)
    }
}
