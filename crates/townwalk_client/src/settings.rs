use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_FILE: &str = "townwalk.toml";

const MIN_MOUSE_SENSITIVITY: f32 = 0.1;
const MAX_MOUSE_SENSITIVITY: f32 = 10.0;
const MIN_FOV: f32 = 30.0;
const MAX_FOV: f32 = 110.0;
const MAX_REMOVAL_DELAY_MS: u64 = 2_000;

/// Motion integrator constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    pub move_speed: f32,
    pub run_multiplier: f32,
    pub jump_force: f32,
    /// Vertical speed below which the avatar counts as grounded.
    pub grounded_threshold: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            run_multiplier: 1.5,
            jump_force: 4.0,
            grounded_threshold: 0.1,
        }
    }
}

impl ControllerTuning {
    fn sanitize(mut self) -> Self {
        self.move_speed = self.move_speed.clamp(0.0, 50.0);
        self.run_multiplier = self.run_multiplier.clamp(1.0, 5.0);
        self.jump_force = self.jump_force.clamp(0.0, 50.0);
        self.grounded_threshold = self.grounded_threshold.clamp(0.001, 5.0);
        self
    }
}

/// Rates are radians of phase per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTuning {
    pub walk_rate: f32,
    pub punch_rate: f32,
    /// Per-tick multiplier applied to limb poses while idle; must stay below 1.
    pub idle_damping: f32,
    pub arm_swing: f32,
    pub leg_swing: f32,
    pub punch_angle: f32,
    pub punch_reach: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            walk_rate: 10.0,
            punch_rate: 10.0,
            idle_damping: 0.9,
            arm_swing: 0.6,
            leg_swing: 0.5,
            punch_angle: 1.5,
            punch_reach: 0.3,
        }
    }
}

impl AnimationTuning {
    fn sanitize(mut self) -> Self {
        self.walk_rate = self.walk_rate.clamp(0.0, 100.0);
        self.punch_rate = self.punch_rate.clamp(0.1, 100.0);
        self.idle_damping = self.idle_damping.clamp(0.0, 0.99);
        self.arm_swing = self.arm_swing.clamp(0.0, 3.0);
        self.leg_swing = self.leg_swing.clamp(0.0, 3.0);
        self.punch_angle = self.punch_angle.clamp(0.0, 3.0);
        self.punch_reach = self.punch_reach.clamp(0.0, 2.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub eye_height: f32,
    /// Third-person offset in the camera's yaw frame: +Y up, +Z behind.
    pub third_person_offset: Vec3,
    /// Height above the avatar origin the third-person camera looks at.
    pub look_height: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            eye_height: 1.5,
            third_person_offset: Vec3::new(0.0, 3.0, 6.0),
            look_height: 1.0,
        }
    }
}

impl CameraTuning {
    fn sanitize(mut self) -> Self {
        self.eye_height = self.eye_height.clamp(0.0, 10.0);
        self.third_person_offset = self
            .third_person_offset
            .clamp(Vec3::splat(-30.0), Vec3::splat(30.0));
        self.look_height = self.look_height.clamp(-5.0, 10.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTuning {
    pub max_reach: f32,
    pub place_distance: f32,
    pub removal_delay_ms: u64,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            max_reach: 6.0,
            place_distance: 3.0,
            removal_delay_ms: 150,
        }
    }
}

impl InteractionTuning {
    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }

    fn sanitize(mut self) -> Self {
        self.max_reach = self.max_reach.clamp(0.5, 100.0);
        self.place_distance = self.place_distance.clamp(0.5, 100.0);
        self.removal_delay_ms = self.removal_delay_ms.min(MAX_REMOVAL_DELAY_MS);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default)]
    pub controller: ControllerTuning,
    #[serde(default)]
    pub animation: AnimationTuning,
    #[serde(default)]
    pub camera: CameraTuning,
    #[serde(default)]
    pub interaction: InteractionTuning,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: default_mouse_sensitivity(),
            fov: default_fov(),
            controller: ControllerTuning::default(),
            animation: AnimationTuning::default(),
            camera: CameraTuning::default(),
            interaction: InteractionTuning::default(),
        }
    }
}

impl ClientSettings {
    pub fn sanitize(mut self) -> Self {
        self.mouse_sensitivity = self
            .mouse_sensitivity
            .clamp(MIN_MOUSE_SENSITIVITY, MAX_MOUSE_SENSITIVITY);
        self.fov = self.fov.clamp(MIN_FOV, MAX_FOV);
        self.controller = self.controller.sanitize();
        self.animation = self.animation.sanitize();
        self.camera = self.camera.sanitize();
        self.interaction = self.interaction.sanitize();
        self
    }

    /// Radians of look rotation per pixel of mouse motion.
    pub fn look_sensitivity(&self) -> f32 {
        self.mouse_sensitivity * 0.001
    }

    pub fn parse(contents: &str) -> io::Result<Self> {
        let parsed = toml::from_str::<Self>(contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize settings: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let settings = self.clone().sanitize();
        let serialized = toml::to_string_pretty(&settings).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize settings: {e}"),
            )
        })?;
        fs::write(path, serialized)
    }
}

fn default_mouse_sensitivity() -> f32 {
    2.5
}

fn default_fov() -> f32 {
    75.0
}

pub fn load_or_create_settings(path: &Path) -> ClientSettings {
    match ClientSettings::load(path) {
        Ok(settings) => settings,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to create default settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
        Err(err) => {
            warn!("Failed to load settings from {}: {err}", path.display());
            let settings = ClientSettings::default();
            if let Err(save_err) = settings.save(path) {
                warn!(
                    "Failed to overwrite settings at {}: {save_err}",
                    path.display()
                );
            }
            settings
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::PathBuf;

    use glam::Vec3;

    use super::{load_or_create_settings, ClientSettings};

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("townwalk-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir.join(name)
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed = ClientSettings::parse(
            r#"
            fov = 90.0

            [interaction]
            removal_delay_ms = 300
            "#,
        )
        .expect("parse partial settings");

        assert_eq!(parsed.fov, 90.0);
        assert_eq!(parsed.mouse_sensitivity, 2.5);
        assert_eq!(parsed.interaction.removal_delay_ms, 300);
        assert_eq!(parsed.interaction.place_distance, 3.0);
        assert_eq!(parsed.controller.jump_force, 4.0);
        assert_eq!(parsed.camera.third_person_offset, Vec3::new(0.0, 3.0, 6.0));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let parsed = ClientSettings::parse(
            r#"
            mouse_sensitivity = 500.0

            [animation]
            idle_damping = 1.5

            [controller]
            run_multiplier = 0.2
            "#,
        )
        .expect("parse settings");

        assert_eq!(parsed.mouse_sensitivity, 10.0);
        assert!(parsed.animation.idle_damping < 1.0);
        assert_eq!(parsed.controller.run_multiplier, 1.0);
    }

    #[test]
    fn malformed_file_is_invalid_data() {
        let err = ClientSettings::parse("fov = \"wide\"").expect_err("should reject");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = scratch_path("missing.toml");
        let _ = fs::remove_file(&path);

        let settings = load_or_create_settings(&path);
        assert_eq!(settings, ClientSettings::default());
        assert!(path.exists());
        assert_eq!(ClientSettings::load(&path).expect("reload"), settings);

        let _ = fs::remove_file(&path);
    }
}
