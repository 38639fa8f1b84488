use glam::Vec3;
use townwalk_shared::block::BlockId;
use townwalk_shared::physics::{ray_aabb_distance, Ray};

use crate::world::BlockStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHit {
    pub id: BlockId,
    pub distance: f32,
}

/// Nearest block whose cube the ray hits closer than `max_reach`. On equal
/// distance the block stored first wins. A ray starting inside a cube hits
/// it at distance zero.
pub fn find_target(
    origin: Vec3,
    direction: Vec3,
    blocks: &BlockStore,
    max_reach: f32,
) -> Option<TargetHit> {
    let ray = Ray::new(origin, direction);
    if ray.direction == Vec3::ZERO {
        return None;
    }

    let mut best: Option<TargetHit> = None;
    for block in blocks.iter() {
        let Some(distance) = ray_aabb_distance(&ray, &block.bounds()) else {
            continue;
        };
        if !distance.is_finite() || distance >= max_reach {
            continue;
        }
        if best.map_or(true, |hit| distance < hit.distance) {
            best = Some(TargetHit {
                id: block.id,
                distance,
            });
        }
    }
    best
}
