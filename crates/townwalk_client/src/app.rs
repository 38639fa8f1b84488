use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use townwalk_shared::actions::ActionFlags;
use townwalk_shared::layout::{TownLayout, SPAWN_POSITION};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::input::{InputState, KeyBindings};
use crate::interaction::InteractionSurface;
use crate::physics::{PhysicsBody, RapierWorld};
use crate::render::{FrameSink, TraceSink};
use crate::session::{PlayerSession, TickInput, MAX_TICK_DT};
use crate::settings::{load_or_create_settings, ClientSettings, SETTINGS_FILE};

/// Seconds since the previous frame, zero on the first one.
fn frame_dt(last_frame: Option<Instant>, now: Instant) -> f32 {
    last_frame
        .map(|last| now.saturating_duration_since(last).as_secs_f32())
        .unwrap_or(0.0)
}

struct TownApp {
    window: Option<Arc<Window>>,
    settings: ClientSettings,
    bindings: KeyBindings,
    input: InputState,
    layout: TownLayout,
    physics: RapierWorld,
    session: Option<PlayerSession>,
    surface: Option<InteractionSurface>,
    sink: TraceSink,
    cursor_grabbed: bool,
    last_frame: Option<Instant>,
}

impl TownApp {
    fn new(settings: ClientSettings) -> Self {
        Self {
            window: None,
            settings,
            bindings: KeyBindings::default(),
            input: InputState::default(),
            layout: TownLayout::town(),
            physics: RapierWorld::default(),
            session: None,
            surface: None,
            sink: TraceSink::default(),
            cursor_grabbed: false,
            last_frame: None,
        }
    }

    fn mount_scene(&mut self) {
        self.physics.add_layout(&self.layout);
        self.physics.spawn_avatar(SPAWN_POSITION);
        self.sink.build_scene(&self.layout);

        let (mut session, surface) = PlayerSession::mount(
            &self.settings,
            self.bindings.clone(),
            StdRng::from_entropy(),
        );
        if let Some(window) = self.window.as_ref() {
            let size = window.inner_size();
            if size.width > 0 && size.height > 0 {
                session.set_aspect(size.width as f32 / size.height as f32);
            }
        }
        self.session = Some(session);
        self.surface = Some(surface);
    }

    fn unmount_scene(&mut self) {
        self.surface = None;
        if let Some(session) = self.session.take() {
            session.unmount();
        }
    }

    fn set_cursor_grab(&mut self, enabled: bool) {
        let Some(window) = self.window.as_ref() else {
            self.cursor_grabbed = false;
            return;
        };

        let grabbed = if enabled {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
                .is_ok()
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!("failed to release cursor grab: {err}");
            }
            false
        };

        window.set_cursor_visible(!grabbed);
        if !grabbed {
            self.input.clear();
        }
        self.cursor_grabbed = grabbed;
    }

    fn update_frame(&mut self) {
        let now = Instant::now();
        let dt = frame_dt(self.last_frame, now).min(MAX_TICK_DT);
        self.last_frame = Some(now);

        let Some(session) = self.session.as_mut() else {
            return;
        };

        let actions = if self.cursor_grabbed {
            self.input.sample(&self.bindings)
        } else {
            ActionFlags::empty()
        };
        let input = TickInput {
            actions,
            look_delta: self.input.take_mouse_delta(),
        };

        let body = self
            .physics
            .avatar_body_mut()
            .map(|body| body as &mut dyn PhysicsBody);
        let frame = session.tick(dt, now, input, body);

        self.physics.sync_blocks(session.blocks());
        self.physics.step(dt);
        self.sink.present(&frame);
    }
}

impl ApplicationHandler for TownApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes().with_title("Townwalk");
        match event_loop.create_window(attrs) {
            Ok(window) => {
                self.window = Some(Arc::new(window));
                self.mount_scene();
                self.last_frame = Some(Instant::now());
                info!("Client window initialized; click to capture the cursor");
            }
            Err(err) => {
                error!("failed to create client window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|window| window.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; shutting down client event loop");
                self.unmount_scene();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };

                match event.state {
                    ElementState::Pressed => {
                        self.input.press_key(code);
                        if event.repeat {
                            return;
                        }
                        if code == self.bindings.release_cursor {
                            self.set_cursor_grab(false);
                        } else if let Some(surface) = self.surface.as_ref() {
                            surface.key_down(code);
                        }
                    }
                    ElementState::Released => self.input.release_key(code),
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if state != ElementState::Pressed {
                    return;
                }
                if !self.cursor_grabbed {
                    // First click only captures the cursor
                    if button == MouseButton::Left {
                        self.set_cursor_grab(true);
                    }
                    return;
                }
                if let Some(surface) = self.surface.as_ref() {
                    surface.pointer_down(button.into());
                }
            }
            WindowEvent::Focused(false) => {
                self.set_cursor_grab(false);
            }
            WindowEvent::Resized(size) => {
                info!("Window resized to {}x{}", size.width, size.height);
                if size.height > 0 {
                    if let Some(session) = self.session.as_mut() {
                        session.set_aspect(size.width as f32 / size.height as f32);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.update_frame();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if !self.cursor_grabbed {
            return;
        }

        if let DeviceEvent::MouseMotion { delta } = event {
            self.input
                .add_mouse_delta(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.as_mut() {
            let now = Instant::now();
            if session
                .next_removal_deadline()
                .is_some_and(|deadline| deadline <= now)
            {
                session.fire_due_removals(now);
            }
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

pub fn run() -> Result<(), String> {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();
    info!("Townwalk client starting...");

    let settings = load_or_create_settings(Path::new(SETTINGS_FILE));
    let event_loop =
        EventLoop::new().map_err(|err| format!("Failed to create event loop: {err}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TownApp::new(settings);
    event_loop
        .run_app(&mut app)
        .map_err(|err| format!("Event loop exited with error: {err}"))
}
