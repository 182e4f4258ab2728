use std::path::Path;

use dicom::{
    core::Tag,
    object::{open_file, FileDicomObject, InMemDicomObject},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use nalgebra::{point, vector};
use ndarray::s;

use super::loader::{DecodedSlice, LoadError, SliceDecoder};

/// Decodes single frame DICOM files.
///
/// Pixel values have the modality rescale applied (Hounsfield units for CT)
/// and no VOI windowing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomSliceDecoder;

impl SliceDecoder for DicomSliceDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedSlice, LoadError> {
        let corrupt = |reason: String| LoadError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };

        let object = open_file(path).map_err(|e| corrupt(e.to_string()))?;

        let pixel_data = object
            .decode_pixel_data()
            .map_err(|e| corrupt(e.to_string()))?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Identity);
        let image = pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .map_err(|e| corrupt(e.to_string()))?
            .slice_move(s![0, .., .., 0]);

        let (height, width) = image.dim();
        let data = image.iter().copied().collect();

        let mut slice = DecodedSlice::new(width, height, data);

        // PixelSpacing is stored as (row spacing, column spacing)
        slice.pixel_spacing = floats(&object, tags::PIXEL_SPACING)
            .filter(|ps| ps.len() >= 2)
            .map(|ps| (ps[1], ps[0]));
        slice.position = floats(&object, tags::IMAGE_POSITION_PATIENT)
            .filter(|p| p.len() >= 3)
            .map(|p| point![p[0], p[1], p[2]]);
        slice.orientation = floats(&object, tags::IMAGE_ORIENTATION_PATIENT)
            .filter(|o| o.len() >= 6)
            .map(|o| (vector![o[0], o[1], o[2]], vector![o[3], o[4], o[5]]));
        slice.slice_thickness = object
            .element(tags::SLICE_THICKNESS)
            .ok()
            .and_then(|e| e.to_float32().ok());
        slice.instance_number = object
            .element(tags::INSTANCE_NUMBER)
            .ok()
            .and_then(|e| e.to_int::<i32>().ok());
        slice.modality = object
            .element(tags::MODALITY)
            .ok()
            .and_then(|e| e.to_str().ok())
            .map(|m| m.trim().to_string());

        log::trace!(
            "Decoded {}: {}x{}, position {:?}",
            path.display(),
            width,
            height,
            slice.position.map(|p| p.coords.as_slice().to_vec())
        );

        Ok(slice)
    }
}

fn floats(
    object: &FileDicomObject<InMemDicomObject>,
    tag: Tag,
) -> Option<Vec<f32>> {
    object.element(tag).ok()?.to_multi_float32().ok()
}
