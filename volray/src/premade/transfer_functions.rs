use crate::{
    error::Error,
    transfer_function::{ColorTransferFunction, InvalidControlPoints, PiecewiseFunction},
    volume_property::{Interpolation, VolumeProperty},
};

// Intensities in Hounsfield units
// Flesh (red-ish): 500 to 1000
// Bone (white): over 1150

pub fn ct_color() -> Result<ColorTransferFunction, InvalidControlPoints> {
    ColorTransferFunction::new([
        (0.0, [0.0, 0.0, 0.0]),
        (500.0, [1.0, 0.5, 0.3]),
        (1000.0, [1.0, 0.5, 0.3]),
        (1150.0, [1.0, 1.0, 0.9]),
    ])
}

pub fn ct_scalar_opacity() -> Result<PiecewiseFunction, InvalidControlPoints> {
    PiecewiseFunction::new([(0.0, 0.0), (500.0, 0.15), (1000.0, 0.15), (1150.0, 0.85)])
}

/// Hides flat regions, keeps boundaries between tissues.
/// Gradient measured per unit distance (1 mm for most medical data).
pub fn ct_gradient_opacity() -> Result<PiecewiseFunction, InvalidControlPoints> {
    PiecewiseFunction::new([(0.0, 0.0), (90.0, 0.5), (100.0, 1.0)])
}

/// Flesh and bone of a CT scan.
///
/// Shading coefficients are set but shading stays off, turn it on with
/// [`to_builder`](VolumeProperty::to_builder).
pub fn ct_tissue() -> Result<VolumeProperty, Error> {
    let property = VolumeProperty::builder(ct_color()?, ct_scalar_opacity()?)
        .gradient_opacity(Some(ct_gradient_opacity()?))
        .interpolation(Interpolation::Linear)
        .ambient(0.4)
        .diffuse(0.6)
        .specular(0.2)
        .build()?;
    Ok(property)
}
