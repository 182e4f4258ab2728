use nalgebra::{Point3, Vector3};

/// Ray cast by camera.
/// Main usecase is getting intersections with volumes ([`BoundBox::intersect`](super::BoundBox::intersect)),
/// then iterating over the intersected line segment in steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Construct new ray using `origin` and `direction`.
    /// `direction` does not have to be normalized, see [`Ray::normalized`].
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Ray {
        Ray { origin, direction }
    }

    /// Returns point `t` units far from ray origin in ray direction
    pub fn point_from_t(&self, t: f32) -> Point3<f32> {
        self.origin + t * self.direction
    }

    /// Same ray with unit direction.
    ///
    /// `None` for zero length or non finite rays, these cannot be marched.
    pub fn normalized(&self) -> Option<Ray> {
        let finite = self.origin.iter().chain(self.direction.iter()).all(|c| c.is_finite());
        if !finite {
            return None;
        }
        let direction = self.direction.try_normalize(f32::EPSILON)?;
        Some(Ray {
            origin: self.origin,
            direction,
        })
    }
}
