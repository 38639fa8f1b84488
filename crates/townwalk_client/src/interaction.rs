use std::time::{Duration, Instant};

use glam::{IVec3, Vec3};
use rand::Rng;
use townwalk_core::events::EventSender;
use townwalk_core::timers::DelayQueue;
use townwalk_shared::block::{Block, BlockColor, BlockId, BlockIdAllocator};
use townwalk_shared::coords::snap_to_grid;
use tracing::{debug, info};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::settings::InteractionTuning;
use crate::world::BlockStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    PointerDown(PointerButton),
    KeyDown(KeyCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerOutcome {
    /// Queued for the session. False once the session has been unmounted.
    pub delivered: bool,
    /// The host must not run its own default action (context menu) for this press.
    pub suppress_default: bool,
}

/// Handle the platform layer uses to feed presses into a mounted session.
#[derive(Clone)]
pub struct InteractionSurface {
    events: EventSender<SurfaceEvent>,
}

impl InteractionSurface {
    pub(crate) fn new(events: EventSender<SurfaceEvent>) -> Self {
        Self { events }
    }

    /// Secondary presses are always consumed, attached or not.
    pub fn pointer_down(&self, button: PointerButton) -> PointerOutcome {
        let suppress_default = button == PointerButton::Secondary;
        if button == PointerButton::Other {
            return PointerOutcome {
                delivered: false,
                suppress_default,
            };
        }

        PointerOutcome {
            delivered: self.events.send(SurfaceEvent::PointerDown(button)).is_ok(),
            suppress_default,
        }
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.events.send(SurfaceEvent::KeyDown(key)).is_ok()
    }
}

/// Cell a new block goes into: the point `place_distance` ahead of the
/// camera, rounded per axis.
pub fn placement_cell(camera_position: Vec3, forward: Vec3, place_distance: f32) -> IVec3 {
    snap_to_grid(camera_position + forward * place_distance)
}

/// Turns presses into block store mutations. Removals are deferred and carry
/// the id captured at press time.
#[derive(Debug)]
pub struct BlockProtocol {
    ids: BlockIdAllocator,
    pending_removals: DelayQueue<BlockId>,
    place_distance: f32,
    removal_delay: Duration,
}

impl BlockProtocol {
    pub fn new(tuning: &InteractionTuning) -> Self {
        Self {
            ids: BlockIdAllocator::default(),
            pending_removals: DelayQueue::new(),
            place_distance: tuning.place_distance,
            removal_delay: tuning.removal_delay(),
        }
    }

    /// Appends a block ahead of the camera. Occupied cells are not checked.
    pub fn place<R: Rng>(
        &mut self,
        store: &mut BlockStore,
        camera_position: Vec3,
        forward: Vec3,
        rng: &mut R,
    ) -> Block {
        let block = Block {
            id: self.ids.next_id(),
            position: placement_cell(camera_position, forward, self.place_distance),
            color: BlockColor::random(rng),
        };
        store.push(block);
        info!(
            "Placed block {} at {} ({})",
            block.id,
            block.position,
            block.color.hex()
        );
        block
    }

    /// Schedules removal of `target` after the configured delay. Returns the
    /// id when a removal was scheduled.
    pub fn request_removal(&mut self, now: Instant, target: Option<BlockId>) -> Option<BlockId> {
        let id = target?;
        self.pending_removals.schedule(now, self.removal_delay, id);
        debug!("removal of block {id} scheduled in {:?}", self.removal_delay);
        Some(id)
    }

    /// Applies every removal due at `now` and returns the ids actually
    /// removed. Ids already gone are skipped.
    pub fn fire_due(&mut self, now: Instant, store: &mut BlockStore) -> Vec<BlockId> {
        let mut removed = Vec::new();
        for id in self.pending_removals.drain_due(now) {
            match store.remove(id) {
                Some(block) => {
                    info!("Removed block {} at {}", block.id, block.position);
                    removed.push(id);
                }
                None => debug!("block {id} already removed"),
            }
        }
        removed
    }

    #[cfg(test)]
    pub fn pending_removals(&self) -> usize {
        self.pending_removals.len()
    }

    pub fn next_removal_deadline(&self) -> Option<Instant> {
        self.pending_removals.next_deadline()
    }

    pub fn cancel_pending(&mut self) -> usize {
        self.pending_removals.clear()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use glam::{IVec3, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use townwalk_core::events::channel;
    use townwalk_shared::block::{BlockColor, BlockId};
    use winit::keyboard::KeyCode;

    use super::{placement_cell, BlockProtocol, InteractionSurface, PointerButton, SurfaceEvent};
    use crate::settings::InteractionTuning;
    use crate::world::BlockStore;

    #[test]
    fn placement_rounds_the_raw_point() {
        assert_eq!(
            placement_cell(Vec3::new(0.4, 1.6, -0.2), Vec3::NEG_Z, 3.0),
            IVec3::new(0, 2, -3)
        );
        let raw = Vec3::new(2.3, -0.7, 5.5);
        assert_eq!(placement_cell(raw, Vec3::ZERO, 3.0), raw.round().as_ivec3());
    }

    #[test]
    fn placing_from_origin_looking_down_negative_z() {
        let mut protocol = BlockProtocol::new(&InteractionTuning::default());
        let mut store = BlockStore::default();
        let mut rng = StdRng::seed_from_u64(1);

        let block = protocol.place(&mut store, Vec3::ZERO, Vec3::NEG_Z, &mut rng);

        assert_eq!(block.position, IVec3::new(0, 0, -3));
        assert!(BlockColor::PALETTE.contains(&block.color));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn placing_twice_in_one_spot_stacks_two_blocks() {
        let mut protocol = BlockProtocol::new(&InteractionTuning::default());
        let mut store = BlockStore::default();
        let mut rng = StdRng::seed_from_u64(2);

        let a = protocol.place(&mut store, Vec3::ZERO, Vec3::NEG_Z, &mut rng);
        let b = protocol.place(&mut store, Vec3::ZERO, Vec3::NEG_Z, &mut rng);
        assert_eq!(a.position, b.position);
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn removal_waits_for_the_delay_and_fires_once() {
        let mut protocol = BlockProtocol::new(&InteractionTuning::default());
        let mut store = BlockStore::default();
        let mut rng = StdRng::seed_from_u64(3);
        let block = protocol.place(&mut store, Vec3::ZERO, Vec3::NEG_Z, &mut rng);

        let start = Instant::now();
        assert_eq!(protocol.request_removal(start, Some(block.id)), Some(block.id));
        assert!(protocol
            .fire_due(start + Duration::from_millis(100), &mut store)
            .is_empty());
        assert_eq!(store.len(), 1);

        let removed = protocol.fire_due(start + Duration::from_millis(150), &mut store);
        assert_eq!(removed, vec![block.id]);
        assert!(store.is_empty());
        assert_eq!(protocol.pending_removals(), 0);
    }

    #[test]
    fn duplicate_removals_are_no_ops() {
        let mut protocol = BlockProtocol::new(&InteractionTuning::default());
        let mut store = BlockStore::default();
        let mut rng = StdRng::seed_from_u64(4);
        let keep = protocol.place(&mut store, Vec3::ZERO, Vec3::NEG_Z, &mut rng);
        let gone = protocol.place(&mut store, Vec3::ZERO, Vec3::X, &mut rng);

        let start = Instant::now();
        protocol.request_removal(start, Some(gone.id));
        protocol.request_removal(start, Some(gone.id));
        let removed = protocol.fire_due(start + Duration::from_secs(1), &mut store);

        assert_eq!(removed, vec![gone.id]);
        assert_eq!(store.len(), 1);
        assert!(store.contains(keep.id));
    }

    #[test]
    fn removal_without_target_schedules_nothing() {
        let mut protocol = BlockProtocol::new(&InteractionTuning::default());
        assert_eq!(protocol.request_removal(Instant::now(), None), None);
        assert_eq!(protocol.pending_removals(), 0);
    }

    #[test]
    fn cancel_pending_drops_scheduled_removals() {
        let mut protocol = BlockProtocol::new(&InteractionTuning::default());
        let now = Instant::now();
        protocol.request_removal(now, Some(BlockId(0)));
        protocol.request_removal(now, Some(BlockId(1)));
        assert_eq!(protocol.cancel_pending(), 2);
        assert_eq!(protocol.next_removal_deadline(), None);
    }

    #[test]
    fn surface_consumes_secondary_presses_even_when_detached() {
        let (tx, rx) = channel();
        let surface = InteractionSurface::new(tx);

        let primary = surface.pointer_down(PointerButton::Primary);
        assert!(primary.delivered && !primary.suppress_default);
        let secondary = surface.pointer_down(PointerButton::Secondary);
        assert!(secondary.delivered && secondary.suppress_default);
        assert!(!surface.pointer_down(PointerButton::Other).delivered);
        assert!(surface.key_down(KeyCode::KeyV));

        assert_eq!(
            rx.drain(),
            vec![
                SurfaceEvent::PointerDown(PointerButton::Primary),
                SurfaceEvent::PointerDown(PointerButton::Secondary),
                SurfaceEvent::KeyDown(KeyCode::KeyV),
            ]
        );

        drop(rx);
        let detached = surface.pointer_down(PointerButton::Secondary);
        assert!(!detached.delivered);
        assert!(detached.suppress_default);
        assert!(!surface.key_down(KeyCode::KeyV));
    }
}
