use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Discrete action states sampled once per tick.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ActionFlags: u8 {
        const FORWARD  = 0b0000_0001;
        const BACKWARD = 0b0000_0010;
        const LEFT     = 0b0000_0100;
        const RIGHT    = 0b0000_1000;
        const JUMP     = 0b0001_0000;
        const RUN      = 0b0010_0000;

        const MOVEMENT = Self::FORWARD.bits()
            | Self::BACKWARD.bits()
            | Self::LEFT.bits()
            | Self::RIGHT.bits();
    }
}

impl ActionFlags {
    pub fn is_moving(self) -> bool {
        self.intersects(Self::MOVEMENT)
    }

    /// Space-separated names of the asserted movement directions, for logs.
    pub fn movement_label(self) -> String {
        let mut parts = Vec::new();
        for (flag, name) in [
            (Self::FORWARD, "forward"),
            (Self::BACKWARD, "backward"),
            (Self::LEFT, "left"),
            (Self::RIGHT, "right"),
        ] {
            if self.contains(flag) {
                parts.push(name);
            }
        }
        parts.join(" ")
    }
}
