//! Visual appearance of a volume.

use crate::{
    color::RGB,
    transfer_function::{ColorTransferFunction, InvalidControlPoints, PiecewiseFunction},
};

/// How the volume is sampled between voxel centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Value of the closest voxel
    Nearest,
    /// Trilinear interpolation of the 8 surrounding voxels
    #[default]
    Linear,
}

/// Phong lighting coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub specular_power: f32,
}

impl Default for Shading {
    fn default() -> Self {
        Shading {
            ambient: 1.0,
            diffuse: 0.0,
            specular: 0.0,
            specular_power: 10.0,
        }
    }
}

/// Aggregates transfer functions and lighting of one volume.
///
/// Immutable once built, shared read-only by all rays of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeProperty {
    color: ColorTransferFunction,
    scalar_opacity: PiecewiseFunction,
    gradient_opacity: Option<PiecewiseFunction>,
    shade: bool,
    shading: Shading,
    interpolation: Interpolation,
    scalar_opacity_unit_distance: f32,
}

impl VolumeProperty {
    pub fn builder(
        color: ColorTransferFunction,
        scalar_opacity: PiecewiseFunction,
    ) -> VolumePropertyBuilder {
        VolumePropertyBuilder {
            color,
            scalar_opacity,
            gradient_opacity: None,
            shade: false,
            shading: Shading::default(),
            interpolation: Interpolation::default(),
            scalar_opacity_unit_distance: 1.0,
        }
    }

    /// Color of `intensity`.
    pub fn color(&self, intensity: f32) -> RGB {
        self.color.evaluate(intensity)
    }

    /// Opacity of `intensity`, before gradient modulation.
    pub fn opacity(&self, intensity: f32) -> f32 {
        self.scalar_opacity.evaluate(intensity)
    }

    /// Opacity multiplier for gradient `magnitude`, 1 when no gradient function is set.
    pub fn gradient_opacity(&self, magnitude: f32) -> f32 {
        match &self.gradient_opacity {
            Some(tf) => tf.evaluate(magnitude),
            None => 1.0,
        }
    }

    pub fn has_gradient_opacity(&self) -> bool {
        self.gradient_opacity.is_some()
    }

    pub fn color_function(&self) -> &ColorTransferFunction {
        &self.color
    }

    pub fn scalar_opacity_function(&self) -> &PiecewiseFunction {
        &self.scalar_opacity
    }

    pub fn gradient_opacity_function(&self) -> Option<&PiecewiseFunction> {
        self.gradient_opacity.as_ref()
    }

    pub fn shade(&self) -> bool {
        self.shade
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Distance in world units at which the scalar opacity applies unchanged
    pub fn scalar_opacity_unit_distance(&self) -> f32 {
        self.scalar_opacity_unit_distance
    }

    /// Builder preloaded with this property, for deriving a modified copy.
    pub fn to_builder(&self) -> VolumePropertyBuilder {
        VolumePropertyBuilder {
            color: self.color.clone(),
            scalar_opacity: self.scalar_opacity.clone(),
            gradient_opacity: self.gradient_opacity.clone(),
            shade: self.shade,
            shading: self.shading,
            interpolation: self.interpolation,
            scalar_opacity_unit_distance: self.scalar_opacity_unit_distance,
        }
    }
}

pub struct VolumePropertyBuilder {
    color: ColorTransferFunction,
    scalar_opacity: PiecewiseFunction,
    gradient_opacity: Option<PiecewiseFunction>,
    shade: bool,
    shading: Shading,
    interpolation: Interpolation,
    scalar_opacity_unit_distance: f32,
}

impl VolumePropertyBuilder {
    pub fn color(mut self, color: ColorTransferFunction) -> Self {
        self.color = color;
        self
    }

    pub fn scalar_opacity(mut self, scalar_opacity: PiecewiseFunction) -> Self {
        self.scalar_opacity = scalar_opacity;
        self
    }

    pub fn gradient_opacity(mut self, gradient_opacity: Option<PiecewiseFunction>) -> Self {
        self.gradient_opacity = gradient_opacity;
        self
    }

    /// Turn directional lighting on or off.
    /// Coefficients are kept either way but only used when on.
    pub fn shade(mut self, shade: bool) -> Self {
        self.shade = shade;
        self
    }

    pub fn ambient(mut self, ambient: f32) -> Self {
        self.shading.ambient = ambient;
        self
    }

    pub fn diffuse(mut self, diffuse: f32) -> Self {
        self.shading.diffuse = diffuse;
        self
    }

    pub fn specular(mut self, specular: f32) -> Self {
        self.shading.specular = specular;
        self
    }

    pub fn specular_power(mut self, power: f32) -> Self {
        self.shading.specular_power = power;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn scalar_opacity_unit_distance(mut self, distance: f32) -> Self {
        self.scalar_opacity_unit_distance = distance;
        self
    }

    /// Finish the property.
    ///
    /// # Errors
    ///
    /// Lighting coefficients and the unit distance must be finite and non negative
    /// (unit distance strictly positive).
    pub fn build(self) -> Result<VolumeProperty, InvalidShading> {
        let Shading {
            ambient,
            diffuse,
            specular,
            specular_power,
        } = self.shading;

        for (name, value) in [
            ("ambient", ambient),
            ("diffuse", diffuse),
            ("specular", specular),
            ("specular power", specular_power),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidShading::Coefficient { name, value });
            }
        }

        let unit = self.scalar_opacity_unit_distance;
        if !unit.is_finite() || unit <= 0.0 {
            return Err(InvalidShading::UnitDistance(unit));
        }

        Ok(VolumeProperty {
            color: self.color,
            scalar_opacity: self.scalar_opacity,
            gradient_opacity: self.gradient_opacity,
            shade: self.shade,
            shading: self.shading,
            interpolation: self.interpolation,
            scalar_opacity_unit_distance: unit,
        })
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum InvalidShading {
    #[error("{name} coefficient must be finite and non negative, got {value}")]
    Coefficient { name: &'static str, value: f32 },

    #[error("scalar opacity unit distance must be positive, got {0}")]
    UnitDistance(f32),
}

/// Property with a single color and opacity, for quick setups.
pub fn uniform_property(rgb: [f32; 3], opacity: f32) -> Result<VolumeProperty, InvalidControlPoints> {
    let color = ColorTransferFunction::new([(0.0, rgb)])?;
    let scalar_opacity = PiecewiseFunction::constant(opacity)?;
    // Default coefficients are always valid
    Ok(VolumeProperty {
        color,
        scalar_opacity,
        gradient_opacity: None,
        shade: false,
        shading: Shading::default(),
        interpolation: Interpolation::Linear,
        scalar_opacity_unit_distance: 1.0,
    })
}
