pub mod events;
pub mod timers;
