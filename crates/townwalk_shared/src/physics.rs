use glam::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::from_center_half_extents(center, size * 0.5)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray that hits nothing.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Distance along `ray` to the first point inside `aabb`, using the slab test.
///
/// A ray that starts inside the box reports a distance of zero. Boxes entirely
/// behind the origin, and degenerate rays, report `None`.
pub fn ray_aabb_distance(ray: &Ray, aabb: &AABB) -> Option<f32> {
    if ray.direction == Vec3::ZERO {
        return None;
    }

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        let (min, max) = (aabb.min[axis], aabb.max[axis]);

        if direction == 0.0 {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction;
        let t1 = (min - origin) * inv;
        let t2 = (max - origin) * inv;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_exit < t_enter {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    Some(t_enter.max(0.0))
}
