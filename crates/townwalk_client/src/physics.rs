use glam::Vec3;
use rapier3d::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use townwalk_shared::block::{BlockId, BLOCK_SIZE};
use townwalk_shared::layout::{TownLayout, AVATAR_RADIUS, GRAVITY};
use tracing::debug;

use crate::world::BlockStore;

/// The slice of a rigid body the controller is allowed to touch. Rotation,
/// mass and shape stay with the simulation.
pub trait PhysicsBody {
    fn linvel(&self) -> Vec3;
    fn translation(&self) -> Vec3;
    fn set_linvel(&mut self, velocity: Vec3, wake: bool);
}

impl PhysicsBody for RigidBody {
    fn linvel(&self) -> Vec3 {
        let v = RigidBody::linvel(self);
        Vec3::new(v.x, v.y, v.z)
    }

    fn translation(&self) -> Vec3 {
        let t = RigidBody::translation(self);
        Vec3::new(t.x, t.y, t.z)
    }

    fn set_linvel(&mut self, velocity: Vec3, wake: bool) {
        RigidBody::set_linvel(self, vector![velocity.x, velocity.y, velocity.z], wake);
    }
}

fn fixed_cuboid(center: Vec3, half_extents: Vec3) -> Collider {
    ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        .translation(vector![center.x, center.y, center.z])
        .build()
}

/// Rapier world holding the town's static geometry, the avatar ball and one
/// fixed cube per placed block.
pub struct RapierWorld {
    gravity: Vector<Real>,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    avatar: Option<RigidBodyHandle>,
    static_colliders: usize,
    block_colliders: FxHashMap<BlockId, ColliderHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(GRAVITY)
    }
}

impl RapierWorld {
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity_y, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            avatar: None,
            static_colliders: 0,
            block_colliders: FxHashMap::default(),
        }
    }

    /// Inserts a fixed collider for every solid piece of the layout.
    pub fn add_layout(&mut self, layout: &TownLayout) {
        let colliders = layout.colliders();
        for collider in &colliders {
            let bounds = collider.bounds;
            self.collider_set
                .insert(fixed_cuboid(bounds.center(), bounds.half_extents()));
        }
        self.static_colliders += colliders.len();
        debug!(
            "added {} static town colliders ({} total)",
            colliders.len(),
            self.static_colliders
        );
    }

    /// Creates the avatar ball, replacing any previous one.
    pub fn spawn_avatar(&mut self, position: Vec3) -> RigidBodyHandle {
        if let Some(previous) = self.avatar.take() {
            self.rigid_body_set.remove(
                previous,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
        }

        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .lock_rotations()
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::ball(AVATAR_RADIUS).build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.avatar = Some(handle);
        handle
    }

    #[cfg(test)]
    pub fn avatar_body(&self) -> Option<&RigidBody> {
        self.rigid_body_set.get(self.avatar?)
    }

    pub fn avatar_body_mut(&mut self) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(self.avatar?)
    }

    /// Brings block colliders in line with the store: new ids gain a fixed
    /// cube, ids no longer stored lose theirs.
    pub fn sync_blocks(&mut self, blocks: &BlockStore) {
        if blocks.is_empty() && self.block_colliders.is_empty() {
            return;
        }
        let live: FxHashSet<BlockId> = blocks.iter().map(|block| block.id).collect();

        let stale: Vec<BlockId> = self
            .block_colliders
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(handle) = self.block_colliders.remove(&id) {
                self.collider_set.remove(
                    handle,
                    &mut self.island_manager,
                    &mut self.rigid_body_set,
                    true,
                );
                debug!("dropped collider for block {id}");
            }
        }

        for block in blocks.iter() {
            if self.block_colliders.contains_key(&block.id) {
                continue;
            }
            let collider = fixed_cuboid(block.center(), Vec3::splat(BLOCK_SIZE * 0.5));
            let handle = self.collider_set.insert(collider);
            self.block_colliders.insert(block.id, handle);
        }
    }

    #[cfg(test)]
    pub fn block_collider_count(&self) -> usize {
        self.block_colliders.len()
    }

    #[cfg(test)]
    pub fn static_collider_count(&self) -> usize {
        self.static_colliders
    }

    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}
