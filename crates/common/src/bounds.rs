use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
///
/// An empty box has `min > max` and unions as the identity: merging anything
/// into an empty box yields that thing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// The empty box, identity element for `merge`.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Unit cube centered on the origin.
    pub const UNIT: Self = Self {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow to include `point`.
    pub fn merge_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow to include `other`. Merging an empty box is a no-op.
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn contains(&self, point: Vec3) -> bool {
        !self.is_empty()
            && point.cmpge(self.min).all()
            && point.cmple(self.max).all()
    }

    /// The axis-aligned box enclosing this box under `matrix`.
    ///
    /// Transforms all eight corners and re-wraps them, so rotations produce a
    /// conservative (possibly larger) box.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut out = Self::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.merge_point(matrix.transform_point3(corner));
        }
        out
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_empty() {
        assert!(BoundingBox::EMPTY.is_empty());
        assert!(!BoundingBox::UNIT.is_empty());
    }

    #[test]
    fn merge_point_grows_box() {
        let mut b = BoundingBox::EMPTY;
        b.merge_point(Vec3::new(1.0, 2.0, 3.0));
        b.merge_point(Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn merge_empty_is_identity() {
        let mut b = BoundingBox::UNIT;
        b.merge(&BoundingBox::EMPTY);
        assert_eq!(b, BoundingBox::UNIT);

        let mut e = BoundingBox::EMPTY;
        e.merge(&BoundingBox::UNIT);
        assert_eq!(e, BoundingBox::UNIT);
    }

    #[test]
    fn contains_checks_bounds() {
        assert!(BoundingBox::UNIT.contains(Vec3::ZERO));
        assert!(!BoundingBox::UNIT.contains(Vec3::splat(2.0)));
        assert!(!BoundingBox::EMPTY.contains(Vec3::ZERO));
    }

    #[test]
    fn transformed_translates() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let b = BoundingBox::UNIT.transformed(&m);
        assert_eq!(b.center(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(b.extents(), Vec3::ONE);
    }

    #[test]
    fn transformed_empty_stays_empty() {
        let m = Mat4::from_translation(Vec3::ONE);
        assert!(BoundingBox::EMPTY.transformed(&m).is_empty());
    }
}
