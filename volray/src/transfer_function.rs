//! Piecewise-linear transfer functions.
//!
//! A transfer function is an ordered list of control points `(key, value)`.
//! Between two neighbouring points the value is interpolated linearly,
//! outside of the defined range it clamps to the nearest endpoint.
//!
//! Keys must be strictly ascending, this is checked once at construction
//! so evaluation never has to deal with unsorted data.

use nalgebra::Vector3;
use thiserror::Error;

use crate::{color::RGB, common::ValueRange};

/// Misconfigured transfer function.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidControlPoints {
    #[error("transfer function needs at least one control point")]
    Empty,

    #[error("control point {index} is not finite")]
    NonFinite { index: usize },

    #[error("control point {index} (key {key}) does not follow key {previous} in ascending order")]
    NotAscending {
        index: usize,
        previous: f32,
        key: f32,
    },

    #[error("control point {index} has opacity {value} outside of <0;1>")]
    OpacityOutOfRange { index: usize, value: f32 },

    #[error("control point {index} has a color channel outside of <0;1>")]
    ColorOutOfRange { index: usize },
}

/// Values that can be interpolated between two control points.
pub trait Lerp: Copy {
    /// Interpolate between `a` and `b`, `t` in `<0;1>`.
    /// Result never leaves the interval spanned by `a` and `b`.
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(a: f32, b: f32, t: f32) -> f32 {
        // Clamp so rounding can not overshoot the bracketing values
        (a + (b - a) * t).clamp(a.min(b), a.max(b))
    }
}

impl Lerp for Vector3<f32> {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.zip_map(&b, |a, b| f32::lerp(a, b, t))
    }
}

/// Sorted control points, shared by all transfer function kinds.
#[derive(Debug, Clone, PartialEq)]
struct ControlPoints<T> {
    keys: Vec<f32>,
    values: Vec<T>,
}

impl<T: Lerp> ControlPoints<T> {
    fn new(points: Vec<(f32, T)>) -> Result<Self, InvalidControlPoints> {
        if points.is_empty() {
            return Err(InvalidControlPoints::Empty);
        }

        for (index, pair) in points.windows(2).enumerate() {
            let (previous, key) = (pair[0].0, pair[1].0);
            if key <= previous {
                return Err(InvalidControlPoints::NotAscending {
                    index: index + 1,
                    previous,
                    key,
                });
            }
        }

        let (keys, values) = points.into_iter().unzip();
        Ok(ControlPoints { keys, values })
    }

    fn evaluate(&self, key: f32) -> T {
        let last = self.keys.len() - 1;

        // NaN falls to the first point
        if key.is_nan() || key <= self.keys[0] {
            return self.values[0];
        }
        if key >= self.keys[last] {
            return self.values[last];
        }

        // First point strictly above `key`, exists because of the clamp above
        let upper = self.keys.partition_point(|&k| k <= key);
        let lower = upper - 1;

        let (k0, k1) = (self.keys[lower], self.keys[upper]);
        let t = (key - k0) / (k1 - k0);
        T::lerp(self.values[lower], self.values[upper], t)
    }

    fn key_range(&self) -> ValueRange {
        ValueRange::from_samples(self.keys.iter().copied())
    }

    fn iter(&self) -> impl Iterator<Item = (f32, T)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }
}

/// Scalar function, maps a key to a value in `<0;1>`.
///
/// Used both for scalar opacity (key is intensity) and
/// gradient opacity (key is gradient magnitude).
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseFunction {
    points: ControlPoints<f32>,
}

impl PiecewiseFunction {
    /// Build function from `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Points must be non-empty, finite, strictly ascending by key
    /// and every value must lie in `<0;1>`.
    pub fn new<I>(points: I) -> Result<PiecewiseFunction, InvalidControlPoints>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let points: Vec<_> = points.into_iter().collect();

        for (index, &(key, value)) in points.iter().enumerate() {
            if !key.is_finite() || !value.is_finite() {
                return Err(InvalidControlPoints::NonFinite { index });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidControlPoints::OpacityOutOfRange { index, value });
            }
        }

        Ok(PiecewiseFunction {
            points: ControlPoints::new(points)?,
        })
    }

    /// Function returning `value` everywhere.
    pub fn constant(value: f32) -> Result<PiecewiseFunction, InvalidControlPoints> {
        PiecewiseFunction::new([(0.0, value)])
    }

    pub fn evaluate(&self, key: f32) -> f32 {
        self.points.evaluate(key)
    }

    /// Range between the first and the last key
    pub fn key_range(&self) -> ValueRange {
        self.points.key_range()
    }

    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.points.iter()
    }
}

/// Maps intensity to RGB color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTransferFunction {
    points: ControlPoints<RGB>,
}

impl ColorTransferFunction {
    /// Build function from `(intensity, [r, g, b])` pairs.
    ///
    /// # Errors
    ///
    /// Points must be non-empty, finite, strictly ascending by intensity
    /// and every channel must lie in `<0;1>`.
    pub fn new<I>(points: I) -> Result<ColorTransferFunction, InvalidControlPoints>
    where
        I: IntoIterator<Item = (f32, [f32; 3])>,
    {
        let mut checked = Vec::new();

        for (index, (key, rgb)) in points.into_iter().enumerate() {
            if !key.is_finite() || rgb.iter().any(|c| !c.is_finite()) {
                return Err(InvalidControlPoints::NonFinite { index });
            }
            if rgb.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(InvalidControlPoints::ColorOutOfRange { index });
            }
            checked.push((key, RGB::from(rgb)));
        }

        Ok(ColorTransferFunction {
            points: ControlPoints::new(checked)?,
        })
    }

    pub fn evaluate(&self, intensity: f32) -> RGB {
        self.points.evaluate(intensity)
    }

    pub fn key_range(&self) -> ValueRange {
        self.points.key_range()
    }

    pub fn points(&self) -> impl Iterator<Item = (f32, RGB)> + '_ {
        self.points.iter()
    }
}
