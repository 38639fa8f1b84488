use glam::{Mat4, Quat, Vec2, Vec3};

use crate::settings::CameraTuning;

/// Below this horizontal distance the look-at target is treated as straight
/// up or down and the previous heading is kept.
const LOOK_AT_MIN_HORIZONTAL: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    FirstPerson,
    ThirdPerson,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
        }
    }
}

/// Angles follow the usual right-handed, Y-up convention: yaw 0 and pitch 0
/// look down -Z, positive yaw turns toward -X, positive pitch looks up.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Look input, driven by the mouse.
    pub yaw: f32,
    pub pitch: f32,
    /// Orientation actually rendered. Equals the look input in first person;
    /// the rig overrides it with a look-at in third person.
    pub view_yaw: f32,
    pub view_pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            view_yaw: 0.0,
            view_pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn update_look(&mut self, mouse_delta: Vec2, look_sensitivity: f32) {
        const MAX_PITCH: f32 = 89.0_f32.to_radians();

        self.yaw -= mouse_delta.x * look_sensitivity;
        self.pitch -= mouse_delta.y * look_sensitivity;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Heading-only rotation used to carry movement input into world space.
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.view_yaw) * Quat::from_rotation_x(self.view_pitch)
    }

    pub fn forward_direction(&self) -> Vec3 {
        Vec3::new(
            -self.view_yaw.sin() * self.view_pitch.cos(),
            self.view_pitch.sin(),
            -self.view_yaw.cos() * self.view_pitch.cos(),
        )
        .normalize_or_zero()
    }

    /// Points the rendered view at `target` without touching the look input.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        let horizontal = Vec2::new(dir.x, dir.z).length();
        if horizontal > LOOK_AT_MIN_HORIZONTAL {
            self.view_yaw = (-dir.x).atan2(-dir.z);
        }
        if dir.length_squared() > 0.0 {
            self.view_pitch = dir.y.atan2(horizontal);
        }
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        let view = Mat4::look_to_rh(self.position, self.forward_direction(), Vec3::Y);
        let projection = Mat4::perspective_rh(
            self.fov,
            self.aspect.max(0.0001),
            self.near.max(0.0001),
            self.far.max(self.near + 0.0001),
        );

        projection * view
    }
}

/// Places the camera relative to the avatar each tick according to the mode.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub mode: CameraMode,
    tuning: CameraTuning,
}

impl CameraRig {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            mode: CameraMode::FirstPerson,
            tuning,
        }
    }

    /// Instant switch, no blending.
    pub fn toggle(&mut self) -> CameraMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn update(&self, camera: &mut Camera, avatar_position: Vec3) {
        match self.mode {
            CameraMode::FirstPerson => {
                camera.position = avatar_position + Vec3::Y * self.tuning.eye_height;
                camera.view_yaw = camera.yaw;
                camera.view_pitch = camera.pitch;
            }
            CameraMode::ThirdPerson => {
                camera.position =
                    avatar_position + camera.yaw_rotation() * self.tuning.third_person_offset;
                camera.look_at(avatar_position + Vec3::Y * self.tuning.look_height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::{Vec2, Vec3};

    use super::{Camera, CameraMode, CameraRig};
    use crate::settings::CameraTuning;

    fn assert_vec_close(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn zero_angles_look_down_negative_z() {
        let camera = Camera::default();
        assert_vec_close(camera.forward_direction(), Vec3::NEG_Z);
        assert_vec_close(camera.orientation() * Vec3::NEG_Z, Vec3::NEG_Z);
    }

    #[test]
    fn orientation_agrees_with_forward_direction() {
        let camera = Camera {
            view_yaw: 0.7,
            view_pitch: -0.3,
            ..Camera::default()
        };
        assert_vec_close(camera.orientation() * Vec3::NEG_Z, camera.forward_direction());
    }

    #[test]
    fn mouse_right_turns_right_and_pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.update_look(Vec2::new(100.0, 0.0), 0.01);
        let rig = CameraRig::new(CameraTuning::default());
        rig.update(&mut camera, Vec3::ZERO);
        assert!(camera.forward_direction().x > 0.0);

        camera.update_look(Vec2::new(0.0, -10_000.0), 0.01);
        assert!(camera.pitch <= 89.0_f32.to_radians() + 1e-6);
    }

    #[test]
    fn first_person_sits_at_eye_height_and_uses_look_input() {
        let rig = CameraRig::new(CameraTuning::default());
        let mut camera = Camera {
            yaw: 0.4,
            pitch: 0.2,
            ..Camera::default()
        };
        rig.update(&mut camera, Vec3::new(1.0, -4.5, 3.0));

        assert_vec_close(camera.position, Vec3::new(1.0, -3.0, 3.0));
        assert_eq!(camera.view_yaw, 0.4);
        assert_eq!(camera.view_pitch, 0.2);
    }

    #[test]
    fn third_person_sits_behind_and_looks_at_avatar() {
        let mut rig = CameraRig::new(CameraTuning::default());
        assert_eq!(rig.toggle(), CameraMode::ThirdPerson);

        let avatar = Vec3::new(0.0, 0.0, 10.0);
        let mut camera = Camera::default();
        rig.update(&mut camera, avatar);

        assert_vec_close(camera.position, Vec3::new(0.0, 3.0, 16.0));
        let target = avatar + Vec3::Y;
        assert_vec_close(
            camera.forward_direction(),
            (target - camera.position).normalize(),
        );
    }

    #[test]
    fn third_person_offset_follows_yaw_without_feeding_back() {
        let mut rig = CameraRig::new(CameraTuning::default());
        rig.toggle();
        let mut camera = Camera {
            yaw: FRAC_PI_2,
            ..Camera::default()
        };
        for _ in 0..10 {
            rig.update(&mut camera, Vec3::ZERO);
        }

        // facing -X, so "behind" is +X
        assert_vec_close(camera.position, Vec3::new(6.0, 3.0, 0.0));
        assert_eq!(camera.yaw, FRAC_PI_2);
        assert!((camera.view_yaw - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn toggling_twice_returns_to_first_person() {
        let mut rig = CameraRig::new(CameraTuning::default());
        rig.toggle();
        assert_eq!(rig.toggle(), CameraMode::FirstPerson);
    }
}
