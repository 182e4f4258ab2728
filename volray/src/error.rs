use thiserror::Error;

use crate::{
    present::PresentError, render::RenderOptionsError, transfer_function::InvalidControlPoints,
    volume_property::InvalidShading, volumetric::LoadError,
};

/// Faults which stop a session.
///
/// Ray level problems never get here, they render as background.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot load volume: {0}")]
    Load(#[from] LoadError),

    #[error("invalid transfer function: {0}")]
    ControlPoints(#[from] InvalidControlPoints),

    #[error("invalid volume property: {0}")]
    Shading(#[from] InvalidShading),

    #[error("invalid render options: {0}")]
    Options(#[from] RenderOptionsError),

    #[error("cannot present frame: {0}")]
    Present(#[from] PresentError),
}
