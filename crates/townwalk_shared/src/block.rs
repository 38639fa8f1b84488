use glam::{IVec3, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::coords::cell_center;
use crate::physics::AABB;

/// Edge length of a placed block, in world units.
pub const BLOCK_SIZE: f32 = 1.0;

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockId(pub u64);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out block ids in creation order. Ids are never reused within a session.
#[derive(Debug, Default)]
pub struct BlockIdAllocator {
    next: u64,
}

impl BlockIdAllocator {
    pub fn next_id(&mut self) -> BlockId {
        let id = BlockId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockColor {
    Sand,
    Clay,
    Linen,
    Rust,
    Ochre,
    Moss,
}

impl BlockColor {
    pub const PALETTE: [BlockColor; 6] = [
        BlockColor::Sand,
        BlockColor::Clay,
        BlockColor::Linen,
        BlockColor::Rust,
        BlockColor::Ochre,
        BlockColor::Moss,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::PALETTE[rng.gen_range(0..Self::PALETTE.len())]
    }

    pub fn hex(self) -> &'static str {
        match self {
            BlockColor::Sand => "#d4a373",
            BlockColor::Clay => "#cb997e",
            BlockColor::Linen => "#e9edc9",
            BlockColor::Rust => "#bc6c25",
            BlockColor::Ochre => "#dda15e",
            BlockColor::Moss => "#606c38",
        }
    }

    /// Linear-ish RGB in `0.0..=1.0`, straight from the hex code.
    pub fn rgb(self) -> [f32; 3] {
        let hex = self.hex().trim_start_matches('#');
        let channel = |start: usize| {
            u8::from_str_radix(&hex[start..start + 2], 16).unwrap_or(0) as f32 / 255.0
        };
        [channel(0), channel(2), channel(4)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub position: IVec3,
    pub color: BlockColor,
}

impl Block {
    pub fn center(&self) -> Vec3 {
        cell_center(self.position)
    }

    pub fn bounds(&self) -> AABB {
        AABB::from_center_size(self.center(), Vec3::splat(BLOCK_SIZE))
    }
}
