use nalgebra::{point, Point3, Vector3};

use super::Ray;

/// Axis aligned box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub lower: Point3<f32>,
    pub upper: Point3<f32>,
}

impl BoundBox {
    pub fn new(lower: Point3<f32>, upper: Point3<f32>) -> BoundBox {
        BoundBox { lower, upper }
    }

    /// Zero sized boundbox
    ///
    /// For testing purposes, where bound box is irrelevant
    pub fn empty() -> BoundBox {
        BoundBox {
            lower: point![0.0, 0.0, 0.0],
            upper: point![0.0, 0.0, 0.0],
        }
    }

    pub fn from_position_dims(position: Point3<f32>, dimensions: Vector3<f32>) -> BoundBox {
        BoundBox {
            lower: position,
            upper: position + dimensions,
        }
    }

    pub fn dims(&self) -> Vector3<f32> {
        self.upper - self.lower
    }

    pub fn center(&self) -> Point3<f32> {
        self.lower + 0.5 * self.dims()
    }

    /// Inclusive containment test, points on the faces are inside.
    pub fn contains(&self, pos: &Point3<f32>) -> bool {
        self.upper.x >= pos.x
            && self.upper.y >= pos.y
            && self.upper.z >= pos.z
            && pos.x >= self.lower.x
            && pos.y >= self.lower.y
            && pos.z >= self.lower.z
    }

    /// Ray parameters `(t_near, t_far)` of the segment inside the box.
    ///
    /// `t_near` may be negative when the ray starts inside the box.
    /// Returns `None` if the ray misses or the box is entirely behind the origin.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        // Source: An Efficient and Robust Ray–Box Intersection Algorithm. Amy Williams et al. 2004.
        // http://citeseerx.ist.psu.edu/viewdoc/summary?doi=10.1.1.64.7663

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (lower, upper) = (self.lower[axis], self.upper[axis]);

            if direction == 0.0 {
                // Parallel to the slab, either always inside or never
                if origin < lower || origin > upper {
                    return None;
                }
                continue;
            }

            let t0 = (lower - origin) / direction;
            let t1 = (upper - origin) / direction;
            let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

            t_min = f32::max(t_min, near);
            t_max = f32::min(t_max, far);
        }

        // if tmax < 0, ray is intersecting AABB, but the whole AABB is behind us
        if t_max.is_sign_negative() {
            return None;
        }

        // if tmin > tmax, ray doesn't intersect AABB
        if t_min > t_max {
            return None;
        }

        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;

    fn unit_box() -> BoundBox {
        BoundBox::new(point![0.0, 0.0, 0.0], point![1.0, 1.0, 1.0])
    }

    #[test]
    fn intersect_works() {
        let ray = Ray::new(point![-1.0, -1.0, 0.0], vector![1.0, 1.0, 1.0]);
        assert!(unit_box().intersect(&ray).is_some());
    }

    #[test]
    fn intersect_axis_aligned() {
        let ray = Ray::new(point![-5.0, 0.5, 0.5], vector![1.0, 0.0, 0.0]);
        let (t0, t1) = unit_box().intersect(&ray).unwrap();
        assert_eq!(t0, 5.0);
        assert_eq!(t1, 6.0);
    }

    #[test]
    fn parallel_ray_outside_slab() {
        let ray = Ray::new(point![-5.0, 2.0, 0.5], vector![1.0, 0.0, 0.0]);
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn not_intersecting() {
        let ray = Ray::new(point![200.0, 200.0, 200.0], vector![1.0, 0.0, 0.0]);
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn box_behind_ray() {
        let ray = Ray::new(point![3.0, 0.5, 0.5], vector![1.0, 0.0, 0.0]);
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn origin_inside() {
        let ray = Ray::new(point![0.5, 0.5, 0.5], vector![0.0, 0.0, 1.0]);
        let (t0, t1) = unit_box().intersect(&ray).unwrap();
        assert!(t0 < 0.0);
        assert_eq!(t1, 0.5);
    }

    #[test]
    fn center_and_contains() {
        let bbox = BoundBox::from_position_dims(point![1.0, 1.0, 1.0], vector![2.0, 4.0, 6.0]);
        assert_eq!(bbox.center(), point![2.0, 3.0, 4.0]);
        assert!(bbox.contains(&point![1.0, 5.0, 7.0]));
        assert!(!bbox.contains(&point![0.9, 2.0, 2.0]));
    }
}
