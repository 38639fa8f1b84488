use std::f32::consts::{PI, TAU};

use crate::settings::AnimationTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Idle,
    Walking,
    Punching,
}

/// Rotation about the limb's local X axis (radians) plus a forward offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimbPose {
    pub rotation: f32,
    pub offset: f32,
}

impl LimbPose {
    fn damped(self, factor: f32) -> Self {
        Self {
            rotation: self.rotation * factor,
            offset: self.offset * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimbPoses {
    pub left_arm: LimbPose,
    pub right_arm: LimbPose,
    pub left_leg: LimbPose,
    pub right_leg: LimbPose,
}

impl LimbPoses {
    fn damped(self, factor: f32) -> Self {
        Self {
            left_arm: self.left_arm.damped(factor),
            right_arm: self.right_arm.damped(factor),
            left_leg: self.left_leg.damped(factor),
            right_leg: self.right_leg.damped(factor),
        }
    }
}

/// Walk-cycle and punch phases plus the limb poses they drive. The right arm
/// is the punching limb.
#[derive(Debug, Clone)]
pub struct AnimationPhaseTracker {
    tuning: AnimationTuning,
    walk_phase: f32,
    punch_phase: f32,
    punching: bool,
    state: MotionState,
    poses: LimbPoses,
}

impl AnimationPhaseTracker {
    pub fn new(tuning: AnimationTuning) -> Self {
        Self {
            tuning,
            walk_phase: 0.0,
            punch_phase: 0.0,
            punching: false,
            state: MotionState::Idle,
            poses: LimbPoses::default(),
        }
    }

    /// Restarts the punch from phase 0, even if one is already in flight.
    pub fn start_punch(&mut self) {
        self.punching = true;
        self.punch_phase = 0.0;
        self.state = MotionState::Punching;
    }

    pub fn update(&mut self, dt: f32, moving: bool) -> MotionState {
        self.state = if self.punching {
            self.advance_punch(dt);
            MotionState::Punching
        } else if moving {
            self.advance_walk(dt);
            MotionState::Walking
        } else {
            self.poses = self.poses.damped(self.tuning.idle_damping);
            MotionState::Idle
        };
        self.state
    }

    fn advance_punch(&mut self, dt: f32) {
        self.punch_phase += dt * self.tuning.punch_rate;
        if self.punch_phase >= PI {
            self.punching = false;
            self.punch_phase = 0.0;
        }

        let swing = self.punch_phase.sin();
        let damped = self.poses.damped(self.tuning.idle_damping);
        self.poses = LimbPoses {
            right_arm: LimbPose {
                rotation: -swing * self.tuning.punch_angle,
                offset: swing * self.tuning.punch_reach,
            },
            ..damped
        };
    }

    fn advance_walk(&mut self, dt: f32) {
        self.walk_phase = (self.walk_phase + dt * self.tuning.walk_rate).rem_euclid(TAU);

        let s = self.walk_phase.sin();
        let arm = s * self.tuning.arm_swing;
        let leg = s * self.tuning.leg_swing;
        self.poses = LimbPoses {
            left_arm: LimbPose {
                rotation: arm,
                offset: 0.0,
            },
            right_arm: LimbPose {
                rotation: -arm,
                offset: 0.0,
            },
            left_leg: LimbPose {
                rotation: -leg,
                offset: 0.0,
            },
            right_leg: LimbPose {
                rotation: leg,
                offset: 0.0,
            },
        };
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    #[cfg(test)]
    pub fn is_punching(&self) -> bool {
        self.punching
    }

    pub fn walk_phase(&self) -> f32 {
        self.walk_phase
    }

    pub fn punch_phase(&self) -> f32 {
        self.punch_phase
    }

    pub fn poses(&self) -> LimbPoses {
        self.poses
    }
}
