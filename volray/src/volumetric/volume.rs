use nalgebra::{point, vector, Point3, Vector3};
use thiserror::Error;

use crate::{
    common::{BoundBox, ValueRange},
    volume_property::Interpolation,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VolumeError {
    #[error("volume has a zero dimension {0:?}")]
    EmptyDimension([usize; 3]),

    #[error("voxel spacing must be positive and finite, got {0:?}")]
    InvalidSpacing([f32; 3]),

    #[error("volume {0:?} has more voxels than can be addressed")]
    TooLarge([usize; 3]),

    #[error("expected {expected} samples, got {found}")]
    DataLength { expected: usize, found: usize },
}

/// Immutable scalar grid.
///
/// Samples are stored x-fastest, one slice after another
/// (`index = x + y * nx + z * nx * ny`).
/// Voxel `(0,0,0)` sits at `origin` in world coordinates, voxel centers are
/// `spacing` apart, so the world bounds are `origin .. origin + (size - 1) * spacing`.
pub struct Volume {
    size: Vector3<usize>,
    spacing: Vector3<f32>,
    origin: Point3<f32>,
    bound_box: BoundBox,
    value_range: ValueRange,
    data: Vec<f32>,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("size", &self.size)
            .field("spacing", &self.spacing)
            .field("box", &self.bound_box)
            .field("range", &self.value_range)
            .field("data len", &self.data.len())
            .finish()
    }
}

impl Volume {
    /// Construct volume from x-fastest samples.
    ///
    /// # Errors
    ///
    /// Every dimension must be non-zero, spacing positive and `data`
    /// must hold exactly `size.x * size.y * size.z` samples.
    pub fn new(
        size: Vector3<usize>,
        spacing: Vector3<f32>,
        origin: Point3<f32>,
        data: Vec<f32>,
    ) -> Result<Volume, VolumeError> {
        if size.iter().any(|&d| d == 0) {
            return Err(VolumeError::EmptyDimension(size.into()));
        }
        if spacing.iter().any(|&s| !s.is_finite() || s <= 0.0) {
            return Err(VolumeError::InvalidSpacing(spacing.into()));
        }
        let expected = voxel_count(size).ok_or(VolumeError::TooLarge(size.into()))?;
        if data.len() != expected {
            return Err(VolumeError::DataLength {
                expected,
                found: data.len(),
            });
        }

        let extent = size.map(|v| (v - 1) as f32).component_mul(&spacing);
        let bound_box = BoundBox::from_position_dims(origin, extent);
        let value_range = ValueRange::from_samples(data.iter().copied());

        Ok(Volume {
            size,
            spacing,
            origin,
            bound_box,
            value_range,
            data,
        })
    }

    /// Data dimensions in voxels
    pub fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    /// Distance between voxel centers along each axis
    pub fn get_spacing(&self) -> Vector3<f32> {
        self.spacing
    }

    pub fn get_origin(&self) -> Point3<f32> {
        self.origin
    }

    pub fn get_bound_box(&self) -> BoundBox {
        self.bound_box
    }

    pub fn center(&self) -> Point3<f32> {
        self.bound_box.center()
    }

    /// Lowest and highest sample
    pub fn value_range(&self) -> ValueRange {
        self.value_range
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    fn get_3d_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.size.x + z * self.size.x * self.size.y
    }

    /// Sample of voxel `(x,y,z)`, `None` outside of the grid
    pub fn get_data(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return None;
        }
        Some(self.data[self.get_3d_index(x, y, z)])
    }

    // Caller guarantees indices inside the grid
    #[inline]
    fn voxel(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.get_3d_index(x, y, z)]
    }

    /// Convert world position to continuous grid coordinates.
    /// Voxel centers have integer grid coordinates.
    pub fn world_to_grid(&self, pos: Point3<f32>) -> Point3<f32> {
        Point3::from((pos - self.origin).component_div(&self.spacing))
    }

    fn clamp_to_grid(&self, grid: Point3<f32>) -> Point3<f32> {
        let max = self.size.map(|v| (v - 1) as f32);
        point![
            grid.x.clamp(0.0, max.x),
            grid.y.clamp(0.0, max.y),
            grid.z.clamp(0.0, max.z)
        ]
    }

    /// Closest voxel sample, `grid` is clamped to the volume.
    pub fn sample_nearest(&self, grid: Point3<f32>) -> f32 {
        let g = self.clamp_to_grid(grid);
        self.voxel(
            g.x.round() as usize,
            g.y.round() as usize,
            g.z.round() as usize,
        )
    }

    /// Trilinear interpolation sample, `grid` is clamped to the volume.
    pub fn sample_trilinear(&self, grid: Point3<f32>) -> f32 {
        let g = self.clamp_to_grid(grid);

        let x0 = g.x.floor() as usize;
        let y0 = g.y.floor() as usize;
        let z0 = g.z.floor() as usize;
        let x1 = (x0 + 1).min(self.size.x - 1);
        let y1 = (y0 + 1).min(self.size.y - 1);
        let z1 = (z0 + 1).min(self.size.z - 1);

        let x_t = g.x - x0 as f32;
        let y_t = g.y - y0 as f32;
        let z_t = g.z - z0 as f32;

        // x lines
        let c00 = lerp(self.voxel(x0, y0, z0), self.voxel(x1, y0, z0), x_t);
        let c10 = lerp(self.voxel(x0, y1, z0), self.voxel(x1, y1, z0), x_t);
        let c01 = lerp(self.voxel(x0, y0, z1), self.voxel(x1, y0, z1), x_t);
        let c11 = lerp(self.voxel(x0, y1, z1), self.voxel(x1, y1, z1), x_t);

        // y plane
        let c0 = lerp(c00, c10, y_t);
        let c1 = lerp(c01, c11, y_t);

        lerp(c0, c1, z_t)
    }

    pub fn sample(&self, grid: Point3<f32>, interpolation: Interpolation) -> f32 {
        match interpolation {
            Interpolation::Nearest => self.sample_nearest(grid),
            Interpolation::Linear => self.sample_trilinear(grid),
        }
    }

    /// Intensity gradient at `grid`, in intensity per world unit.
    ///
    /// Central differences one voxel apart; at the border the
    /// difference becomes one-sided.
    pub fn gradient(&self, grid: Point3<f32>, interpolation: Interpolation) -> Vector3<f32> {
        let g = self.clamp_to_grid(grid);
        let max = self.size.map(|v| (v - 1) as f32);

        let mut gradient = vector![0.0, 0.0, 0.0];
        for axis in 0..3 {
            let hi = f32::min(g[axis] + 1.0, max[axis]);
            let lo = f32::max(g[axis] - 1.0, 0.0);
            let span = hi - lo;
            if span <= 0.0 {
                // Flat axis, single voxel thick
                continue;
            }

            let mut p_hi = g;
            p_hi[axis] = hi;
            let mut p_lo = g;
            p_lo[axis] = lo;

            let diff = self.sample(p_hi, interpolation) - self.sample(p_lo, interpolation);
            gradient[axis] = diff / (span * self.spacing[axis]);
        }
        gradient
    }
}

/// `nx * ny * nz`, `None` on overflow
pub fn voxel_count(size: Vector3<usize>) -> Option<usize> {
    size.x.checked_mul(size.y)?.checked_mul(size.z)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
