use std::time::Instant;

use glam::Vec2;
use rand::rngs::StdRng;
use townwalk_core::events::{self, EventReceiver};
use townwalk_shared::actions::ActionFlags;
use townwalk_shared::block::BlockId;
use townwalk_shared::layout::INITIAL_CAMERA_POSITION;
use tracing::info;

use crate::animation::AnimationPhaseTracker;
use crate::camera::{Camera, CameraRig};
use crate::input::KeyBindings;
use crate::interaction::{BlockProtocol, InteractionSurface, PointerButton, SurfaceEvent};
use crate::physics::PhysicsBody;
use crate::player::{Avatar, MotionIntegrator};
use crate::settings::ClientSettings;
use crate::snapshot::{AvatarTransform, BlockInstance, CameraPose, FrameSnapshot};
use crate::targeting::find_target;
use crate::world::BlockStore;

/// Longest step a single tick will integrate; stalls beyond this are dropped.
pub const MAX_TICK_DT: f32 = 0.1;

/// Held input sampled by the host for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub actions: ActionFlags,
    /// Pointer motion since the previous tick, in pixels.
    pub look_delta: Vec2,
}

/// The player controller: avatar motion, animation, camera and block
/// interaction for one mounted scene.
pub struct PlayerSession {
    events: EventReceiver<SurfaceEvent>,
    bindings: KeyBindings,
    look_sensitivity: f32,
    max_reach: f32,
    rng: StdRng,

    avatar: Avatar,
    motion: MotionIntegrator,
    animation: AnimationPhaseTracker,
    camera: Camera,
    rig: CameraRig,
    blocks: BlockStore,
    protocol: BlockProtocol,
    target: Option<BlockId>,
}

impl PlayerSession {
    pub fn mount(
        settings: &ClientSettings,
        bindings: KeyBindings,
        rng: StdRng,
    ) -> (Self, InteractionSurface) {
        let (tx, rx) = events::channel();
        let camera = Camera {
            position: INITIAL_CAMERA_POSITION,
            fov: settings.fov.to_radians(),
            ..Camera::default()
        };

        let session = Self {
            events: rx,
            bindings,
            look_sensitivity: settings.look_sensitivity(),
            max_reach: settings.interaction.max_reach,
            rng,
            avatar: Avatar::default(),
            motion: MotionIntegrator::new(settings.controller),
            animation: AnimationPhaseTracker::new(settings.animation),
            camera,
            rig: CameraRig::new(settings.camera),
            blocks: BlockStore::default(),
            protocol: BlockProtocol::new(&settings.interaction),
            target: None,
        };
        info!("Player session mounted");

        (session, InteractionSurface::new(tx))
    }

    /// Drops pending removals and the event queue. The surface handed out by
    /// `mount` reports every later press as undelivered.
    pub fn unmount(mut self) {
        let dropped = self.protocol.cancel_pending();
        info!(
            "Player session unmounted ({} blocks, {dropped} pending removal(s) dropped)",
            self.blocks.len()
        );
    }

    /// Runs one frame: queued events, motion, animation, camera, targeting.
    /// Without a body the motion and camera passes are skipped.
    pub fn tick(
        &mut self,
        dt: f32,
        now: Instant,
        input: TickInput,
        body: Option<&mut dyn PhysicsBody>,
    ) -> FrameSnapshot {
        let dt = dt.clamp(0.0, MAX_TICK_DT);

        for event in self.events.drain() {
            self.handle_event(event, now);
        }

        self.camera.update_look(input.look_delta, self.look_sensitivity);

        let has_body = body.is_some();
        if let Some(body) = body {
            let command = self.motion.apply(input.actions, self.camera.yaw, body);
            self.avatar.position = body.translation();
            self.avatar.velocity = command.velocity;
        }
        self.avatar.yaw = self.camera.yaw;

        self.animation.update(dt, input.actions.is_moving());

        if has_body {
            self.rig.update(&mut self.camera, self.avatar.position);
        }

        self.target = find_target(
            self.camera.position,
            self.camera.forward_direction(),
            &self.blocks,
            self.max_reach,
        )
        .map(|hit| hit.id);

        self.snapshot()
    }

    /// Applies removals that have come due. Driven by wall-clock time, not
    /// by the frame tick. A target that was removed is dropped until the next
    /// targeting pass.
    pub fn fire_due_removals(&mut self, now: Instant) -> Vec<BlockId> {
        let removed = self.protocol.fire_due(now, &mut self.blocks);
        if self.target.is_some_and(|id| removed.contains(&id)) {
            self.target = None;
        }
        removed
    }

    fn handle_event(&mut self, event: SurfaceEvent, now: Instant) {
        match event {
            SurfaceEvent::PointerDown(PointerButton::Primary) => {
                self.protocol.place(
                    &mut self.blocks,
                    self.camera.position,
                    self.camera.forward_direction(),
                    &mut self.rng,
                );
            }
            SurfaceEvent::PointerDown(PointerButton::Secondary) => {
                let target = self.target.filter(|id| self.blocks.contains(*id));
                if self.protocol.request_removal(now, target).is_some() {
                    self.animation.start_punch();
                }
            }
            SurfaceEvent::PointerDown(PointerButton::Other) => {}
            SurfaceEvent::KeyDown(key) if key == self.bindings.toggle_camera => {
                let mode = self.rig.toggle();
                info!("Camera mode: {mode:?}");
            }
            SurfaceEvent::KeyDown(_) => {}
        }
    }

    fn snapshot(&self) -> FrameSnapshot {
        let camera = CameraPose::from_camera(&self.camera, self.rig.mode);
        FrameSnapshot {
            avatar: AvatarTransform {
                position: self.avatar.position,
                yaw: self.avatar.yaw,
                velocity: self.avatar.velocity,
            },
            limbs: self.animation.poses(),
            motion: self.animation.state(),
            walk_phase: self.animation.walk_phase(),
            punch_phase: self.animation.punch_phase(),
            crosshair: camera.crosshair(),
            camera,
            blocks: self
                .blocks
                .iter()
                .map(|block| BlockInstance::new(block, self.target))
                .collect(),
            target: self.target,
        }
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    pub fn next_removal_deadline(&self) -> Option<Instant> {
        self.protocol.next_removal_deadline()
    }

    /// Viewport change from the host window.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }
}

#[cfg(test)]
impl PlayerSession {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn target(&self) -> Option<BlockId> {
        self.target
    }

    fn animation(&self) -> &AnimationPhaseTracker {
        &self.animation
    }

    fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    fn pending_removals(&self) -> usize {
        self.protocol.pending_removals()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use glam::{IVec3, Vec2, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use townwalk_shared::actions::ActionFlags;
    use townwalk_shared::block::BlockColor;
    use winit::keyboard::KeyCode;

    use super::{PlayerSession, TickInput};
    use crate::animation::MotionState;
    use crate::camera::CameraMode;
    use crate::input::KeyBindings;
    use crate::interaction::{InteractionSurface, PointerButton};
    use crate::physics::PhysicsBody;
    use crate::settings::ClientSettings;

    const DT: f32 = 0.1;

    struct StubBody {
        position: Vec3,
        linvel: Vec3,
    }

    impl StubBody {
        fn at(position: Vec3) -> Self {
            Self {
                position,
                linvel: Vec3::ZERO,
            }
        }
    }

    impl PhysicsBody for StubBody {
        fn linvel(&self) -> Vec3 {
            self.linvel
        }

        fn translation(&self) -> Vec3 {
            self.position
        }

        fn set_linvel(&mut self, velocity: Vec3, _wake: bool) {
            self.linvel = velocity;
        }
    }

    fn mount() -> (PlayerSession, InteractionSurface) {
        PlayerSession::mount(
            &ClientSettings::default(),
            KeyBindings::default(),
            StdRng::seed_from_u64(11),
        )
    }

    /// Eye height lands at y = 1.7, so placements round up to y = 2.
    fn standing() -> StubBody {
        StubBody::at(Vec3::new(0.0, 0.2, 0.0))
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn placement_lands_three_units_ahead_of_the_eye() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let now = Instant::now();
        session.tick(DT, now, idle(), Some(&mut body));

        surface.pointer_down(PointerButton::Primary);
        let frame = session.tick(DT, now, idle(), Some(&mut body));

        assert_eq!(session.blocks().len(), 1);
        let block = frame.blocks[0];
        assert_eq!(block.position, IVec3::new(0, 2, -3));
        assert!(BlockColor::PALETTE.contains(&block.color));
    }

    #[test]
    fn events_are_applied_at_the_start_of_the_tick() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let now = Instant::now();
        session.tick(DT, now, idle(), Some(&mut body));

        surface.pointer_down(PointerButton::Primary);
        assert_eq!(session.blocks().len(), 0);

        // the block placed this tick is already targeted in the same tick
        let frame = session.tick(DT, now, idle(), Some(&mut body));
        assert!(frame.target.is_some());
        assert_eq!(frame.highlighted().count(), 1);
    }

    #[test]
    fn secondary_press_on_target_punches_then_removes_after_delay() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let start = Instant::now();
        session.tick(DT, start, idle(), Some(&mut body));
        surface.pointer_down(PointerButton::Primary);
        session.tick(DT, start, idle(), Some(&mut body));
        let target = session.target().expect("placed block is targeted");

        surface.pointer_down(PointerButton::Secondary);
        session.tick(0.0, start, idle(), Some(&mut body));
        assert_eq!(session.animation().state(), MotionState::Punching);
        assert_eq!(session.animation().punch_phase(), 0.0);
        assert_eq!(session.pending_removals(), 1);

        assert!(session
            .fire_due_removals(start + Duration::from_millis(149))
            .is_empty());
        assert!(session.blocks().contains(target));

        let removed = session.fire_due_removals(start + Duration::from_millis(150));
        assert_eq!(removed, vec![target]);
        assert!(!session.blocks().contains(target));

        assert!(session
            .fire_due_removals(start + Duration::from_secs(5))
            .is_empty());
    }

    #[test]
    fn removal_uses_the_id_captured_at_press_time() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let start = Instant::now();
        session.tick(DT, start, idle(), Some(&mut body));
        surface.pointer_down(PointerButton::Primary);
        session.tick(DT, start, idle(), Some(&mut body));
        let captured = session.target().expect("target");

        surface.pointer_down(PointerButton::Secondary);
        session.tick(DT, start, idle(), Some(&mut body));

        // turn away so the target changes before the delay elapses
        let look_away = TickInput {
            look_delta: Vec2::new(1_000.0, 0.0),
            ..TickInput::default()
        };
        session.tick(DT, start, look_away, Some(&mut body));
        assert_ne!(session.target(), Some(captured));

        session.fire_due_removals(start + Duration::from_secs(1));
        assert!(session.blocks().is_empty());
    }

    #[test]
    fn removed_target_cannot_be_punched_again() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let start = Instant::now();
        session.tick(DT, start, idle(), Some(&mut body));
        surface.pointer_down(PointerButton::Primary);
        session.tick(DT, start, idle(), Some(&mut body));
        let target = session.target().expect("placed block is targeted");

        surface.pointer_down(PointerButton::Secondary);
        session.tick(0.1, start, idle(), Some(&mut body));
        let phase = session.animation().punch_phase();
        assert!(phase > 0.0);

        assert_eq!(
            session.fire_due_removals(start + Duration::from_millis(200)),
            vec![target]
        );
        assert_eq!(session.target(), None);

        // press lands before the next targeting pass
        surface.pointer_down(PointerButton::Secondary);
        session.tick(0.0, start, idle(), Some(&mut body));
        assert_eq!(session.pending_removals(), 0);
        assert_eq!(session.animation().punch_phase(), phase);
        assert!(session.blocks().is_empty());
    }

    #[test]
    fn secondary_press_without_target_does_nothing() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let outcome = surface.pointer_down(PointerButton::Secondary);
        assert!(outcome.suppress_default);

        session.tick(DT, Instant::now(), idle(), Some(&mut body));
        assert_eq!(session.pending_removals(), 0);
        assert_eq!(session.animation().state(), MotionState::Idle);
    }

    #[test]
    fn walking_forward_for_one_tick_advances_walk_phase() {
        let (mut session, _surface) = mount();
        let mut body = standing();
        let input = TickInput {
            actions: ActionFlags::FORWARD,
            ..TickInput::default()
        };

        let frame = session.tick(DT, Instant::now(), input, Some(&mut body));
        assert_eq!(frame.motion, MotionState::Walking);
        assert!((frame.walk_phase - 1.0).abs() < 1e-5);
        assert!(body.linvel.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-5));
    }

    #[test]
    fn grounded_jump_commands_jump_force() {
        let (mut session, _surface) = mount();
        let mut body = standing();
        let input = TickInput {
            actions: ActionFlags::JUMP,
            ..TickInput::default()
        };

        session.tick(DT, Instant::now(), input, Some(&mut body));
        assert_eq!(body.linvel.y, 4.0);
        assert_eq!(session.avatar().velocity.y, 4.0);
    }

    #[test]
    fn toggle_key_switches_camera_mode() {
        let (mut session, surface) = mount();
        let mut body = standing();
        surface.key_down(KeyCode::KeyV);
        surface.key_down(KeyCode::KeyQ);

        let frame = session.tick(DT, Instant::now(), idle(), Some(&mut body));
        assert_eq!(frame.camera.mode, CameraMode::ThirdPerson);
        assert!(frame
            .camera
            .position
            .abs_diff_eq(Vec3::new(0.0, 3.2, 6.0), 1e-5));
    }

    #[test]
    fn tick_without_body_skips_motion_and_camera() {
        let (mut session, _surface) = mount();
        let input = TickInput {
            actions: ActionFlags::FORWARD,
            ..TickInput::default()
        };
        let before = session.camera().position;

        let frame = session.tick(DT, Instant::now(), input, None);
        assert_eq!(frame.camera.position, before);
        assert_eq!(frame.avatar.position, session.avatar().position);
        // animation still runs
        assert_eq!(frame.motion, MotionState::Walking);
    }

    #[test]
    fn oversized_dt_is_clamped() {
        let (mut session, _surface) = mount();
        let input = TickInput {
            actions: ActionFlags::FORWARD,
            ..TickInput::default()
        };
        let frame = session.tick(5.0, Instant::now(), input, None);
        assert!((frame.walk_phase - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unmount_detaches_the_surface() {
        let (mut session, surface) = mount();
        let mut body = standing();
        let now = Instant::now();
        session.tick(DT, now, idle(), Some(&mut body));
        surface.pointer_down(PointerButton::Primary);
        session.tick(DT, now, idle(), Some(&mut body));
        surface.pointer_down(PointerButton::Secondary);
        session.tick(DT, now, idle(), Some(&mut body));
        assert_eq!(session.pending_removals(), 1);

        session.unmount();
        assert!(!surface.pointer_down(PointerButton::Primary).delivered);
        assert!(!surface.key_down(KeyCode::KeyV));
    }
}
