use glam::{IVec3, Vec3};

/// Size of one placement cell. Block centres sit on integer multiples of this.
pub const GRID_UNIT: f32 = 1.0;

/// Snaps a world position to the nearest grid cell, rounding each axis
/// independently (halves round away from zero).
pub fn snap_to_grid(world_pos: Vec3) -> IVec3 {
    (world_pos / GRID_UNIT).round().as_ivec3()
}

pub fn cell_center(cell: IVec3) -> Vec3 {
    cell.as_vec3() * GRID_UNIT
}
