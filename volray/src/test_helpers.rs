//! Module with helper functions
//! Saves repetition in unit tests and benchmarks

use nalgebra::{point, vector, Vector3};

use crate::{
    transfer_function::{ColorTransferFunction, PiecewiseFunction},
    volume_property::VolumeProperty,
    volumetric::Volume,
};

/// 2x2x2 volume with values rising in x, then y, then z
pub fn white_volume() -> Volume {
    let data = vec![0.0, 32.0, 64.0, 96.0, 128.0, 160.0, 192.0, 255.0];
    Volume::new(vector![2, 2, 2], vector![1.0, 1.0, 1.0], point![0.0, 0.0, 0.0], data)
        .expect("valid white volume")
}

/// Unit spaced volume filled with `value`
pub fn uniform_volume(size: Vector3<usize>, value: f32) -> Volume {
    let data = vec![value; size.x * size.y * size.z];
    Volume::new(size, vector![1.0, 1.0, 1.0], point![0.0, 0.0, 0.0], data)
        .expect("valid uniform volume")
}

/// Sphere of `value` in the middle of an otherwise zero volume
pub fn sphere_volume(side: usize, value: f32) -> Volume {
    let center = (side as f32 - 1.0) / 2.0;
    let radius = side as f32 / 3.0;
    let mut data = Vec::with_capacity(side * side * side);
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                let d = vector![x as f32 - center, y as f32 - center, z as f32 - center];
                data.push(if d.norm() <= radius { value } else { 0.0 });
            }
        }
    }
    Volume::new(
        vector![side, side, side],
        vector![1.0, 1.0, 1.0],
        point![0.0, 0.0, 0.0],
        data,
    )
    .expect("valid sphere volume")
}

/// Gray ramp, black and transparent at 0, white and opaque at `high`
pub fn gray_property(high: f32) -> VolumeProperty {
    let color = ColorTransferFunction::new([(0.0, [0.0; 3]), (high, [1.0; 3])])
        .expect("valid gray color");
    let opacity = PiecewiseFunction::new([(0.0, 0.0), (high, 1.0)]).expect("valid gray opacity");
    VolumeProperty::builder(color, opacity)
        .build()
        .expect("valid gray property")
}
