//! Marching of a single ray through the volume.

use nalgebra::{vector, Vector3};
use thiserror::Error;

use crate::{
    color::{self, RGB, RGBA},
    common::Ray,
    volume_property::{Shading, VolumeProperty},
    volumetric::Volume,
};

use super::RenderOptions;

/// Slack for the last sample, so a segment that is a whole multiple of the step
/// gets its far end sampled despite rounding.
const STEP_SLACK: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayState {
    /// Ray reached the volume, no sample taken yet
    Entering,
    /// Sampling the volume
    Marching,
    /// Accumulated opacity crossed the termination threshold
    EarlyTerminated,
    /// Ray left the volume
    ExitedVolume,
}

/// Outcome of a ray which hit the volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayResult {
    /// Accumulated color, premultiplied by the accumulated opacity in `w`
    pub color: RGBA,
    pub state: RayState,
    /// Number of samples taken
    pub samples: usize,
}

/// Rays which yield no samples, rendered as background.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateRay {
    #[error("ray direction is zero or not finite")]
    ZeroDirection,
    #[error("ray does not intersect the volume")]
    MissedVolume,
}

/// Front to back "over" operator.
///
/// `accum` is premultiplied, `color` is not. Compositing with zero `alpha` leaves
/// `accum` unchanged.
pub fn composite(accum: RGBA, color: RGB, alpha: f32) -> RGBA {
    let weight = (1.0 - accum.w) * alpha;
    vector![
        accum.x + weight * color.x,
        accum.y + weight * color.y,
        accum.z + weight * color.z,
        accum.w + weight
    ]
}

/// Scale opacity defined per `unit_distance` to a sample `step` long.
pub fn correct_opacity(alpha: f32, step: f32, unit_distance: f32) -> f32 {
    if alpha >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - alpha).powf(step / unit_distance)
}

/// Phong lighting with a headlight.
///
/// Light and view directions are both opposite of `ray_dir` (unit).
/// The normal faces the viewer whatever side of the surface is hit.
pub fn shade(color: RGB, gradient: Vector3<f32>, ray_dir: Vector3<f32>, shading: &Shading) -> RGB {
    let to_eye = -ray_dir;

    let normal = match (-gradient).try_normalize(f32::EPSILON) {
        Some(n) if n.dot(&to_eye) < 0.0 => -n,
        Some(n) => n,
        // Flat region, no direction to light
        None => return (color * shading.ambient).map(|c| c.clamp(0.0, 1.0)),
    };

    let n_dot_l = f32::max(normal.dot(&to_eye), 0.0);
    let reflected = 2.0 * n_dot_l * normal - to_eye;
    let r_dot_v = f32::max(reflected.dot(&to_eye), 0.0);

    let lit = color * (shading.ambient + shading.diffuse * n_dot_l);
    let highlight = shading.specular * r_dot_v.powf(shading.specular_power);

    lit.map(|c| (c + highlight).clamp(0.0, 1.0))
}

/// Cast `ray` through `volume`, accumulating samples front to back.
///
/// Samples lie at `t_near + i * step` for every `i` with the sample inside
/// the intersected segment. A camera inside the volume starts at its own position.
pub fn cast_ray(
    volume: &Volume,
    property: &VolumeProperty,
    ray: &Ray,
    options: &RenderOptions,
) -> Result<RayResult, DegenerateRay> {
    let ray = ray.normalized().ok_or(DegenerateRay::ZeroDirection)?;

    let (t0, t1) = volume
        .get_bound_box()
        .intersect(&ray)
        .ok_or(DegenerateRay::MissedVolume)?;
    if t1 < 0.0 {
        // Volume behind the camera
        return Err(DegenerateRay::MissedVolume);
    }
    let t_near = f32::max(t0, 0.0);

    let step = options.sample_step;
    let last_step = if step > 0.0 && step.is_finite() {
        ((t1 - t_near) / step + STEP_SLACK).floor() as usize
    } else {
        0
    };

    let interpolation = property.interpolation();
    let need_gradient = property.shade() || property.has_gradient_opacity();
    let unit_distance = property.scalar_opacity_unit_distance();
    let shading = property.shading();

    let mut accum = color::zero();
    let mut state = RayState::Entering;
    let mut samples = 0;

    for i in 0..=last_step {
        state = RayState::Marching;
        samples += 1;

        let pos = ray.point_from_t(t_near + i as f32 * step);
        let grid = volume.world_to_grid(pos);
        let intensity = volume.sample(grid, interpolation);

        let mut alpha = property.opacity(intensity);
        if alpha <= 0.0 {
            continue;
        }

        let gradient = if need_gradient {
            volume.gradient(grid, interpolation)
        } else {
            Vector3::zeros()
        };

        if property.has_gradient_opacity() {
            alpha *= property.gradient_opacity(gradient.norm());
            if alpha <= 0.0 {
                continue;
            }
        }

        let alpha = correct_opacity(alpha, step, unit_distance);

        let mut rgb = property.color(intensity);
        if property.shade() {
            rgb = shade(rgb, gradient, ray.direction, &shading);
        }

        accum = composite(accum, rgb, alpha);

        if options.early_ray_termination && accum.w > options.termination_threshold {
            return Ok(RayResult {
                color: accum,
                state: RayState::EarlyTerminated,
                samples,
            });
        }
    }

    if state == RayState::Marching {
        state = RayState::ExitedVolume;
    }

    Ok(RayResult {
        color: accum,
        state,
        samples,
    })
}

/// Put the background under accumulated color `accum`
pub fn over_background(accum: RGBA, background: RGBA) -> RGBA {
    let t = 1.0 - accum.w;
    vector![
        accum.x + t * background.x,
        accum.y + t * background.y,
        accum.z + t * background.z,
        accum.w + t * background.w
    ]
}
