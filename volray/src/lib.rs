//! Ray casting renderer of medical volumes.
//!
//! A directory of DICOM slices (or a `.vol` file) is stacked into a [`Volume`],
//! intensities are mapped to color and opacity by the transfer functions of a
//! [`VolumeProperty`] and a [`Camera`] looks at it through the [`Renderer`].
//!
//! ```no_run
//! use volray::{premade::transfer_functions::ct_tissue, RenderOptions, Session, SessionConfig, VolumeSource};
//!
//! let config = SessionConfig {
//!     source: VolumeSource::Dicom("scans/head".into()),
//!     width: 640,
//!     height: 480,
//! };
//! let mut session = Session::load(&config, ct_tissue()?, RenderOptions::builder())?;
//! let frame = session.render();
//! assert_eq!(frame.resolution(), (640, 480));
//! # Ok::<(), volray::Error>(())
//! ```

pub mod camera;
pub mod color;
pub mod common;
mod error;
pub mod premade;
pub mod present;
pub mod render;
mod session;
pub mod test_helpers;
pub mod transfer_function;
pub mod volume_property;
pub mod volumetric;

pub use camera::{Camera, CameraEvent, Projection};
pub use error::Error;
pub use render::{FrameBuffer, RenderOptions, Renderer, RendererFront};
pub use session::{Session, SessionConfig, VolumeSource};
pub use transfer_function::{ColorTransferFunction, PiecewiseFunction};
pub use volume_property::{Interpolation, VolumeProperty};
pub use volumetric::Volume;
