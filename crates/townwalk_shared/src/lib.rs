pub mod actions;
pub mod block;
pub mod coords;
pub mod layout;
pub mod physics;
