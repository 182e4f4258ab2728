use std::str::FromStr;

use nalgebra::{vector, Point3, Rotation3, Unit, Vector3};
use thiserror::Error;

use crate::{common::Ray, volumetric::Volume};

/// Distance of the initial camera from the volume center, in world units (mm for DICOM)
pub const INITIAL_DISTANCE: f32 = 400.0;

/// Default vertical field of view, degrees
pub const DEFAULT_FOV_Y: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Rays spread from the camera position
    Perspective {
        /// Vertical field of view in degrees
        fov_y: f32,
    },
    /// Rays share the view direction
    Parallel {
        /// Half of the view height in world units
        scale: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: DEFAULT_FOV_Y,
        }
    }
}

/// Viewpoint looking at a focal point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Point3<f32>,
    focal_point: Point3<f32>,
    /// Unit, orthogonal to `direction`
    up: Vector3<f32>,
    /// Unit, `direction x up`
    right: Vector3<f32>,
    /// Unit, zero if position and focal point coincide
    direction: Vector3<f32>,
    projection: Projection,
    /// Width / height of the image plane
    aspect: f32,
    /// Offset of the upper left corner of the image plane
    plane_00: Vector3<f32>,
    /// Offset between the left and right edge of the image plane
    du: Vector3<f32>,
    /// Offset between the top and bottom edge of the image plane, pointing down
    dv: Vector3<f32>,
}

impl Camera {
    /// Perspective camera at `position` looking at `focal_point`.
    ///
    /// `view_up` does not have to be orthogonal to the view direction, only its
    /// component perpendicular to it is used.
    pub fn new(position: Point3<f32>, focal_point: Point3<f32>, view_up: Vector3<f32>) -> Camera {
        let mut camera = Camera {
            position,
            focal_point,
            up: view_up,
            right: Vector3::zeros(),
            direction: Vector3::zeros(),
            projection: Projection::default(),
            aspect: 1.0,
            plane_00: Vector3::zeros(),
            du: Vector3::zeros(),
            dv: Vector3::zeros(),
        };
        camera.recalc_plane();
        camera
    }

    /// Initial view of a volume.
    ///
    /// Looks at the volume center from the +x side, with -z as up.
    pub fn looking_at_volume(volume: &Volume) -> Camera {
        let center = volume.center();
        let position = center + vector![INITIAL_DISTANCE, 0.0, 0.0];
        Camera::new(position, center, vector![0.0, 0.0, -1.0])
    }

    pub fn with_projection(mut self, projection: Projection) -> Camera {
        self.projection = projection;
        self.recalc_dudv();
        self
    }

    /// Change aspect ratio of image plane.
    ///
    /// For example 1.7777 for 16:9 ratio
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.recalc_dudv();
    }

    /// Changes aspect ratio to match `(width, height)` resolution
    pub fn set_aspect_from_resolution(&mut self, width: usize, height: usize) {
        self.set_aspect(width as f32 / height as f32);
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.recalc_dudv();
    }

    /// Get ray crossing the image plane at `pixel_coord`
    ///
    /// # Arguments
    ///
    /// * `pixel_coord` - Coordinates in the range of `<0;1>x<0;1>`, point \[0,0\] being upper left corner
    pub fn get_ray(&self, pixel_coord: (f32, f32)) -> Ray {
        let offset = self.plane_00 + self.du * pixel_coord.0 + self.dv * pixel_coord.1;
        match self.projection {
            Projection::Perspective { .. } => Ray::new(self.position, offset),
            Projection::Parallel { .. } => Ray::new(self.position + offset, self.direction),
        }
    }

    /// Apply one interaction step
    pub fn apply(&mut self, event: CameraEvent) {
        match event {
            CameraEvent::Orbit { azimuth, elevation } => self.orbit(azimuth, elevation),
            CameraEvent::Pan { dx, dy } => {
                let delta = self.right * dx + self.up * dy;
                self.position += delta;
                self.focal_point += delta;
            }
            CameraEvent::Zoom { factor } => self.zoom(factor),
            CameraEvent::Roll { angle } => {
                if let Some(axis) = Unit::try_new(self.direction, f32::EPSILON) {
                    let rotation = Rotation3::from_axis_angle(&axis, angle.to_radians());
                    self.up = rotation * self.up;
                }
            }
        }
        self.recalc_plane();
        log::trace!("Camera after {:?}: {:?}", event, self.position);
    }

    fn orbit(&mut self, azimuth: f32, elevation: f32) {
        if let Some(up) = Unit::try_new(self.up, f32::EPSILON) {
            let rotation = Rotation3::from_axis_angle(&up, azimuth.to_radians());
            self.position = self.focal_point + rotation * (self.position - self.focal_point);
        }

        // Right axis after azimuth
        let direction = self.focal_point - self.position;
        if let Some(right) = Unit::try_new(direction.cross(&self.up), f32::EPSILON) {
            let rotation = Rotation3::from_axis_angle(&right, elevation.to_radians());
            self.position = self.focal_point + rotation * (self.position - self.focal_point);
            self.up = rotation * self.up;
        }
    }

    fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring zoom by {}", factor);
            return;
        }
        match &mut self.projection {
            Projection::Perspective { .. } => {
                let offset = self.position - self.focal_point;
                self.position = self.focal_point + offset / factor;
            }
            Projection::Parallel { scale } => *scale /= factor,
        }
    }

    // Call when position, focal point or up changed
    fn recalc_plane(&mut self) {
        self.direction = (self.focal_point - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        self.recalc_up_right();
        self.recalc_dudv();
    }

    fn recalc_up_right(&mut self) {
        let d = self.direction;
        let up = self.up - d * self.up.dot(&d);
        let up = match up.try_normalize(f32::EPSILON) {
            Some(up) => up,
            // Up parallel with view direction, any perpendicular will do
            None => {
                let helper = if d.x.abs() < 0.9 {
                    Vector3::x()
                } else {
                    Vector3::y()
                };
                (helper - d * helper.dot(&d))
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::z)
            }
        };
        self.up = up;
        self.right = d.cross(&up);
    }

    // Call when projection, aspect or axes changed
    fn recalc_dudv(&mut self) {
        let half_height = match self.projection {
            Projection::Perspective { fov_y } => f32::tan(f32::to_radians(0.5 * fov_y)),
            Projection::Parallel { scale } => scale,
        };
        let half_width = half_height * self.aspect;

        self.du = 2.0 * half_width * self.right;
        self.dv = -2.0 * half_height * self.up; // Notice '-' sign, rows go down
        let corner = -0.5 * self.du - 0.5 * self.dv;
        self.plane_00 = match self.projection {
            Projection::Perspective { .. } => self.direction + corner,
            Projection::Parallel { .. } => corner,
        };
    }

    pub fn get_position(&self) -> Point3<f32> {
        self.position
    }

    pub fn get_focal_point(&self) -> Point3<f32> {
        self.focal_point
    }

    pub fn get_view_up(&self) -> Vector3<f32> {
        self.up
    }

    /// Unit view direction, zero for a degenerate camera
    pub fn get_dir(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn get_projection(&self) -> Projection {
        self.projection
    }

    pub fn get_aspect(&self) -> f32 {
        self.aspect
    }
}

/// Discrete interaction step, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    /// Rotate around the focal point, azimuth about view up, elevation about the right axis
    Orbit { azimuth: f32, elevation: f32 },
    /// Move camera and focal point along the right and up axes
    Pan { dx: f32, dy: f32 },
    /// Values above 1 move closer
    Zoom { factor: f32 },
    /// Rotate view up about the view direction
    Roll { angle: f32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("unknown camera event '{0}', expected orbit, pan, zoom or roll")]
    Unknown(String),
    #[error("malformed arguments of camera event '{0}'")]
    Malformed(String),
}

impl FromStr for CameraEvent {
    type Err = ParseEventError;

    /// Parses `orbit:AZ,EL`, `pan:DX,DY`, `zoom:F` and `roll:DEG`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, args) = s
            .split_once(':')
            .ok_or_else(|| ParseEventError::Malformed(s.to_string()))?;

        let numbers = args
            .split(',')
            .map(|a| a.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseEventError::Malformed(s.to_string()))?;

        let event = match (kind.trim(), numbers.as_slice()) {
            ("orbit", &[azimuth, elevation]) => CameraEvent::Orbit { azimuth, elevation },
            ("pan", &[dx, dy]) => CameraEvent::Pan { dx, dy },
            ("zoom", &[factor]) if factor > 0.0 => CameraEvent::Zoom { factor },
            ("roll", &[angle]) => CameraEvent::Roll { angle },
            ("orbit" | "pan" | "zoom" | "roll", _) => {
                return Err(ParseEventError::Malformed(s.to_string()))
            }
            _ => return Err(ParseEventError::Unknown(kind.to_string())),
        };
        Ok(event)
    }
}
