use glam::{Quat, Vec3};
use townwalk_shared::actions::ActionFlags;
use townwalk_shared::layout::SPAWN_POSITION;
use tracing::debug;

use crate::physics::PhysicsBody;
use crate::settings::ControllerTuning;

/// Last pose reported by the physics body. Kept so a frame without a body
/// still has somewhere to draw the avatar.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Heading the body is drawn with; follows the camera yaw.
    pub yaw: f32,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            position: SPAWN_POSITION,
            velocity: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    pub velocity: Vec3,
    pub jumped: bool,
}

/// Horizontal velocity from the movement flags, rotated into world space by
/// the camera yaw. Opposing keys cancel.
pub fn desired_horizontal_velocity(
    flags: ActionFlags,
    yaw: f32,
    tuning: &ControllerTuning,
) -> Vec3 {
    let axis = |positive: ActionFlags, negative: ActionFlags| {
        flags.contains(positive) as i32 as f32 - flags.contains(negative) as i32 as f32
    };
    let local = Vec3::new(
        axis(ActionFlags::RIGHT, ActionFlags::LEFT),
        0.0,
        axis(ActionFlags::BACKWARD, ActionFlags::FORWARD),
    )
    .normalize_or_zero();

    let speed = if flags.contains(ActionFlags::RUN) {
        tuning.move_speed * tuning.run_multiplier
    } else {
        tuning.move_speed
    };

    Quat::from_rotation_y(yaw) * (local * speed)
}

/// Builds this tick's velocity command. Vertical velocity passes through
/// unless a jump fires from (near) rest.
pub fn integrate_motion(
    flags: ActionFlags,
    yaw: f32,
    current_velocity: Vec3,
    tuning: &ControllerTuning,
) -> VelocityCommand {
    let horizontal = desired_horizontal_velocity(flags, yaw, tuning);
    let grounded = current_velocity.y.abs() < tuning.grounded_threshold;
    let jumped = flags.contains(ActionFlags::JUMP) && grounded;
    let vertical = if jumped {
        tuning.jump_force
    } else {
        current_velocity.y
    };

    VelocityCommand {
        velocity: Vec3::new(horizontal.x, vertical, horizontal.z),
        jumped,
    }
}

#[derive(Debug)]
pub struct MotionIntegrator {
    tuning: ControllerTuning,
    last_flags: ActionFlags,
}

impl MotionIntegrator {
    pub fn new(tuning: ControllerTuning) -> Self {
        Self {
            tuning,
            last_flags: ActionFlags::empty(),
        }
    }

    /// Writes the command to the body every tick with the wake flag set.
    pub fn apply(
        &mut self,
        flags: ActionFlags,
        yaw: f32,
        body: &mut dyn PhysicsBody,
    ) -> VelocityCommand {
        let command = integrate_motion(flags, yaw, body.linvel(), &self.tuning);
        body.set_linvel(command.velocity, true);

        let movement = flags & (ActionFlags::MOVEMENT | ActionFlags::RUN);
        if movement != self.last_flags {
            if movement.is_moving() {
                debug!(
                    "moving {} (run={})",
                    movement.movement_label(),
                    movement.contains(ActionFlags::RUN)
                );
            } else {
                debug!("stopped moving");
            }
            self.last_flags = movement;
        }
        if command.jumped {
            debug!("jump impulse vy={:.2}", command.velocity.y);
        }

        command
    }
}
