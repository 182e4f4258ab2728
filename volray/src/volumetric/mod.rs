//! Scalar volumes and the ways to load them.

mod dicom_decoder;
mod loader;
mod raw;
mod volume;

pub use dicom_decoder::DicomSliceDecoder;
pub use loader::{DecodedSlice, LoadError, SliceDecoder, VolumeLoader};
pub use raw::{RawHeader, RawVolumeReader, RAW_HEADER_LEN};
pub use volume::{Volume, VolumeError};

/// Loader of DICOM series directories.
pub fn dicom_loader() -> VolumeLoader<DicomSliceDecoder> {
    VolumeLoader::new(DicomSliceDecoder)
}
