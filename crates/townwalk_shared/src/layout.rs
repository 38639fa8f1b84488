//! Fixed town layout: ground, boundary walls, roads, houses, trees and street
//! lamps. Consumed once when a scene is built; nothing here changes at runtime.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::{Vec2, Vec3};

use crate::physics::AABB;

/// World height of the walkable ground surface.
pub const GROUND_LEVEL: f32 = -5.0;
/// Half the side length of the square town, measured to the boundary walls.
pub const TOWN_HALF_EXTENT: f32 = 50.0;
pub const GRAVITY: f32 = -9.81;
pub const AVATAR_RADIUS: f32 = 0.5;
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 2.0, 10.0);
pub const INITIAL_CAMERA_POSITION: Vec3 = Vec3::new(0.0, -1.0, 20.0);

const GROUND_THICKNESS: f32 = 0.2;
const WALL_HALF_HEIGHT: f32 = 20.0;
const WALL_HALF_THICKNESS: f32 = 0.5;
const ROAD_COLOR: &str = "#3d3d3d";
const MARKING_COLOR: &str = "#ffff00";

const HOUSE_HALF_SIZE: Vec3 = Vec3::new(3.0, 2.0, 3.0);
const ROOF_RADIUS: f32 = 5.0;
const ROOF_HEIGHT: f32 = 2.5;
const ROOF_CENTER_Y: f32 = 5.0;

const LAMP_POLE_HALF: Vec3 = Vec3::new(0.15, 2.0, 0.15);
const LAMP_ROAD_OFFSETS: [f32; 8] = [-50.0, -42.0, -25.0, -15.0, 15.0, 25.0, 42.0, 50.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Pine,
    Oak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Ground,
    Wall,
    House,
    Tree,
    Lamp,
}

/// Flat, non-colliding surface drawn just above the ground (roads, driveways, markings).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub center: Vec3,
    /// Extent along world X and Z.
    pub size: Vec2,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct House {
    pub x: f32,
    pub z: f32,
    pub rotation_y: f32,
    pub color: &'static str,
}

impl House {
    pub fn base_bounds(&self) -> AABB {
        AABB::from_center_half_extents(
            Vec3::new(self.x, GROUND_LEVEL + HOUSE_HALF_SIZE.y, self.z),
            HOUSE_HALF_SIZE,
        )
    }

    /// Four-sided roof turned 45 degrees, so its footprint is axis aligned.
    pub fn roof_bounds(&self) -> AABB {
        let half_footprint = ROOF_RADIUS * FRAC_PI_4.cos();
        AABB::from_center_half_extents(
            Vec3::new(self.x, GROUND_LEVEL + ROOF_CENTER_Y, self.z),
            Vec3::new(half_footprint, ROOF_HEIGHT * 0.5, half_footprint),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tree {
    pub x: f32,
    pub z: f32,
    pub scale: f32,
    pub kind: TreeKind,
}

impl Tree {
    pub fn trunk_bounds(&self) -> AABB {
        let radius = match self.kind {
            TreeKind::Pine => 0.6,
            TreeKind::Oak => 0.8,
        };
        AABB::from_center_half_extents(
            Vec3::new(self.x, GROUND_LEVEL + self.scale, self.z),
            Vec3::new(radius, 1.0, radius) * self.scale,
        )
    }

    pub fn canopy_bounds(&self) -> AABB {
        let (center_y, half) = match self.kind {
            // two stacked cones, 1..5 and 3..6 above the base
            TreeKind::Pine => (3.5, Vec3::new(2.0, 2.5, 2.0)),
            TreeKind::Oak => (3.5, Vec3::splat(2.5)),
        };
        AABB::from_center_half_extents(
            Vec3::new(self.x, GROUND_LEVEL + center_y * self.scale, self.z),
            half * self.scale,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lamp {
    pub position: Vec3,
    /// Rotation about +Y; at zero the arm points along +X.
    pub rotation_y: f32,
}

impl Lamp {
    pub fn pole_bounds(&self) -> AABB {
        AABB::from_center_half_extents(
            self.position + Vec3::new(0.0, LAMP_POLE_HALF.y, 0.0),
            LAMP_POLE_HALF,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    pub kind: ColliderKind,
    pub bounds: AABB,
}

#[derive(Debug, Clone)]
pub struct TownLayout {
    pub ground: AABB,
    pub walls: Vec<AABB>,
    pub surfaces: Vec<Surface>,
    pub houses: Vec<House>,
    pub trees: Vec<Tree>,
    pub lamps: Vec<Lamp>,
    /// Base of the four-armed lamp at the central crossroads.
    pub central_lamp: Vec3,
}

impl TownLayout {
    pub fn town() -> Self {
        Self {
            ground: AABB::from_center_half_extents(
                Vec3::new(0.0, GROUND_LEVEL - GROUND_THICKNESS * 0.5, 0.0),
                Vec3::new(TOWN_HALF_EXTENT, GROUND_THICKNESS * 0.5, TOWN_HALF_EXTENT),
            ),
            walls: boundary_walls(),
            surfaces: road_surfaces(),
            houses: houses(),
            trees: trees(),
            lamps: street_lamps(),
            central_lamp: Vec3::new(0.0, GROUND_LEVEL, 0.0),
        }
    }

    /// Every solid piece of the town as an axis-aligned box.
    pub fn colliders(&self) -> Vec<StaticCollider> {
        let mut colliders = vec![StaticCollider {
            kind: ColliderKind::Ground,
            bounds: self.ground,
        }];

        colliders.extend(self.walls.iter().map(|&bounds| StaticCollider {
            kind: ColliderKind::Wall,
            bounds,
        }));

        for house in &self.houses {
            for bounds in [house.base_bounds(), house.roof_bounds()] {
                colliders.push(StaticCollider {
                    kind: ColliderKind::House,
                    bounds,
                });
            }
        }

        for tree in &self.trees {
            for bounds in [tree.trunk_bounds(), tree.canopy_bounds()] {
                colliders.push(StaticCollider {
                    kind: ColliderKind::Tree,
                    bounds,
                });
            }
        }

        colliders.extend(self.lamps.iter().map(|lamp| StaticCollider {
            kind: ColliderKind::Lamp,
            bounds: lamp.pole_bounds(),
        }));

        let base = self.central_lamp;
        for (center_y, half) in [
            (0.3, Vec3::new(2.0, 0.1, 2.0)),
            (0.6, Vec3::new(1.2, 0.25, 1.2)),
            (4.0, Vec3::new(0.5, 4.0, 0.5)),
        ] {
            colliders.push(StaticCollider {
                kind: ColliderKind::Lamp,
                bounds: AABB::from_center_half_extents(base + Vec3::Y * center_y, half),
            });
        }

        colliders
    }

    /// Whether `position` lies inside the walls and above the ground.
    pub fn contains(&self, position: Vec3) -> bool {
        let inner = TOWN_HALF_EXTENT - WALL_HALF_THICKNESS;
        position.x.abs() < inner && position.z.abs() < inner && position.y > GROUND_LEVEL
    }
}

fn boundary_walls() -> Vec<AABB> {
    let along_x = Vec3::new(TOWN_HALF_EXTENT, WALL_HALF_HEIGHT, WALL_HALF_THICKNESS);
    let along_z = Vec3::new(WALL_HALF_THICKNESS, WALL_HALF_HEIGHT, TOWN_HALF_EXTENT);
    vec![
        AABB::from_center_half_extents(Vec3::new(0.0, 0.0, TOWN_HALF_EXTENT), along_x),
        AABB::from_center_half_extents(Vec3::new(0.0, 0.0, -TOWN_HALF_EXTENT), along_x),
        AABB::from_center_half_extents(Vec3::new(TOWN_HALF_EXTENT, 0.0, 0.0), along_z),
        AABB::from_center_half_extents(Vec3::new(-TOWN_HALF_EXTENT, 0.0, 0.0), along_z),
    ]
}

fn road_surfaces() -> Vec<Surface> {
    let road = |x: f32, y: f32, z: f32, size: Vec2| Surface {
        center: Vec3::new(x, y, z),
        size,
        color: ROAD_COLOR,
    };

    let mut surfaces = vec![
        road(0.0, -4.98, 0.0, Vec2::new(100.0, 8.0)),
        road(0.0, -4.97, 0.0, Vec2::new(8.0, 100.0)),
    ];

    for x in [-35.0, 35.0] {
        surfaces.push(road(x, -4.96, -12.0, Vec2::new(4.0, 16.0)));
        surfaces.push(road(x, -4.96, 12.0, Vec2::new(4.0, 16.0)));
    }
    for z in [-35.0, 35.0] {
        surfaces.push(road(-12.0, -4.96, z, Vec2::new(16.0, 4.0)));
        surfaces.push(road(12.0, -4.96, z, Vec2::new(16.0, 4.0)));
    }

    for i in 0..10 {
        let offset = i as f32 * 12.0 - 54.0;
        surfaces.push(Surface {
            center: Vec3::new(offset, -4.95, 0.0),
            size: Vec2::new(6.0, 0.2),
            color: MARKING_COLOR,
        });
        surfaces.push(Surface {
            center: Vec3::new(0.0, -4.95, offset),
            size: Vec2::new(0.2, 6.0),
            color: MARKING_COLOR,
        });
    }

    surfaces
}

fn houses() -> Vec<House> {
    let house = |x: f32, z: f32, rotation_y: f32, color: &'static str| House {
        x,
        z,
        rotation_y,
        color,
    };

    vec![
        // north side, facing south
        house(-35.0, -20.0, 0.0, "#d4a373"),
        house(35.0, -20.0, 0.0, "#cb997e"),
        // south side, facing north
        house(-35.0, 20.0, PI, "#e9edc9"),
        house(35.0, 20.0, PI, "#bc6c25"),
        // west side, facing east
        house(-20.0, -35.0, FRAC_PI_2, "#dda15e"),
        house(-20.0, 35.0, FRAC_PI_2, "#e9edc9"),
        // east side, facing west
        house(20.0, -35.0, -FRAC_PI_2, "#bc6c25"),
        house(20.0, 35.0, -FRAC_PI_2, "#d4a373"),
    ]
}

fn trees() -> Vec<Tree> {
    use TreeKind::{Oak, Pine};

    let table: [(f32, f32, f32, TreeKind); 32] = [
        // flanking the north/south driveways
        (-43.0, -16.0, 1.0, Pine),
        (27.0, -16.0, 1.0, Pine),
        (-27.0, -16.0, 1.0, Pine),
        (43.0, -16.0, 1.0, Pine),
        (-43.0, 16.0, 1.0, Pine),
        (27.0, 16.0, 1.0, Pine),
        (-27.0, 16.0, 1.0, Pine),
        (43.0, 16.0, 1.0, Pine),
        // flanking the west/east driveways
        (-16.0, -43.0, 1.0, Oak),
        (-16.0, 27.0, 1.0, Oak),
        (-16.0, -27.0, 1.0, Oak),
        (-16.0, 43.0, 1.0, Oak),
        (16.0, -43.0, 1.0, Oak),
        (16.0, 27.0, 1.0, Oak),
        (16.0, -27.0, 1.0, Oak),
        (16.0, 43.0, 1.0, Oak),
        // lining the east-west road
        (-25.0, -10.0, 1.0, Pine),
        (-15.0, -10.0, 0.9, Pine),
        (15.0, -10.0, 0.9, Pine),
        (25.0, -10.0, 1.0, Pine),
        (-25.0, 10.0, 0.9, Pine),
        (-15.0, 10.0, 0.9, Pine),
        (15.0, 10.0, 0.9, Pine),
        (25.0, 10.0, 1.2, Pine),
        // lining the north-south road
        (-10.0, -25.0, 1.0, Oak),
        (-10.0, -15.0, 0.9, Oak),
        (-10.0, 15.0, 0.9, Oak),
        (-10.0, 25.0, 1.2, Oak),
        (10.0, -25.0, 1.1, Oak),
        (10.0, -15.0, 0.9, Oak),
        (10.0, 15.0, 0.9, Oak),
        (10.0, 25.0, 0.9, Oak),
    ];

    table
        .into_iter()
        .map(|(x, z, scale, kind)| Tree { x, z, scale, kind })
        .collect()
}

fn street_lamps() -> Vec<Lamp> {
    let lamp = |x: f32, z: f32, rotation_y: f32| Lamp {
        position: Vec3::new(x, GROUND_LEVEL, z),
        rotation_y,
    };

    let mut lamps = Vec::with_capacity(38);
    for x in LAMP_ROAD_OFFSETS {
        lamps.push(lamp(x, -6.0, -FRAC_PI_2));
        lamps.push(lamp(x, 6.0, FRAC_PI_2));
    }
    for z in LAMP_ROAD_OFFSETS {
        lamps.push(lamp(-6.0, z, 0.0));
        lamps.push(lamp(6.0, z, PI));
    }

    // beside the outer driveways
    lamps.push(lamp(-38.0, -12.0, 0.0));
    lamps.push(lamp(38.0, -12.0, PI));
    lamps.push(lamp(-38.0, 12.0, 0.0));
    lamps.push(lamp(38.0, 12.0, PI));
    lamps.push(lamp(-12.0, -38.0, -FRAC_PI_2));
    lamps.push(lamp(12.0, -38.0, -FRAC_PI_2));

    lamps
}
