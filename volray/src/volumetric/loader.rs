use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

use nalgebra::{point, vector, Point3, Vector3};
use rayon::prelude::*;
use thiserror::Error;

use super::{Volume, VolumeError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no slices found in {}", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("cannot decode {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("slice {} is {found:?} (width, height), expected {expected:?}", path.display())]
    InconsistentDimensions {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("slice {} has modality {found:?}, expected {expected:?}", path.display())]
    InconsistentModality {
        path: PathBuf,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("invalid raw volume {}: {reason}", path.display())]
    InvalidRawVolume { path: PathBuf, reason: String },

    #[error(transparent)]
    Geometry(#[from] VolumeError),
}

/// One decoded cross-section and the metadata needed to stack it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSlice {
    pub width: usize,
    pub height: usize,
    /// `height` rows of `width` samples
    pub data: Vec<f32>,
    /// Distance between columns (x) and rows (y)
    pub pixel_spacing: Option<(f32, f32)>,
    /// World position of the first pixel
    pub position: Option<Point3<f32>>,
    /// Direction cosines of a row and of a column
    pub orientation: Option<(Vector3<f32>, Vector3<f32>)>,
    pub slice_thickness: Option<f32>,
    pub instance_number: Option<i32>,
    pub modality: Option<String>,
}

impl DecodedSlice {
    /// Slice without any metadata
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> DecodedSlice {
        DecodedSlice {
            width,
            height,
            data,
            pixel_spacing: None,
            position: None,
            orientation: None,
            slice_thickness: None,
            instance_number: None,
            modality: None,
        }
    }

    fn normal(&self) -> Option<Vector3<f32>> {
        let (row, column) = self.orientation?;
        row.cross(&column).try_normalize(f32::EPSILON)
    }
}

/// Source of decoded cross-sections.
///
/// Pixel formats are the decoder's business, the loader only stacks slices.
pub trait SliceDecoder: Sync {
    fn decode(&self, path: &Path) -> Result<DecodedSlice, LoadError>;
}

/// Stacks a directory of slices into a [`Volume`].
pub struct VolumeLoader<D> {
    decoder: D,
}

impl<D> VolumeLoader<D>
where
    D: SliceDecoder,
{
    pub fn new(decoder: D) -> Self {
        VolumeLoader { decoder }
    }

    /// Load every slice file found directly in `dir`.
    ///
    /// Hidden files and sub-directories are skipped.
    ///
    /// # Errors
    ///
    /// Fails if the directory can't be listed or holds no slices, if any file
    /// can't be decoded, or if slices differ in size or modality.
    pub fn load_directory(&self, dir: impl AsRef<Path>) -> Result<Volume, LoadError> {
        let dir = dir.as_ref();
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();

            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden {
                log::warn!("Skipping hidden file {}", path.display());
                continue;
            }
            let file_type = entry.file_type().map_err(io_err)?;
            if file_type.is_dir() {
                log::debug!("Skipping directory {}", path.display());
                continue;
            }
            paths.push(path);
        }

        if paths.is_empty() {
            return Err(LoadError::EmptyDirectory(dir.to_path_buf()));
        }

        // Deterministic fallback order
        paths.sort();

        log::info!("Decoding {} slices from {}", paths.len(), dir.display());

        self.load_files(&paths)
    }

    /// Load the given slice files into one volume.
    pub fn load_files(&self, paths: &[impl AsRef<Path> + Sync]) -> Result<Volume, LoadError> {
        let first = paths
            .first()
            .ok_or_else(|| LoadError::EmptyDirectory(PathBuf::new()))?;

        let slices = paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                self.decoder
                    .decode(path)
                    .map(|slice| (path.to_path_buf(), slice))
            })
            .collect::<Result<Vec<_>, _>>()?;

        validate(&slices)?;

        let ordered = order_slices(slices);
        let volume = assemble(ordered)?;

        let range = volume.value_range();
        log::info!(
            "Loaded volume from {}: size {:?}, spacing {:?}, values {}..{}",
            first.as_ref().display(),
            volume.get_size().as_slice(),
            volume.get_spacing().as_slice(),
            range.low,
            range.high
        );

        Ok(volume)
    }
}

fn validate(slices: &[(PathBuf, DecodedSlice)]) -> Result<(), LoadError> {
    let (_, reference) = &slices[0];
    let expected = (reference.width, reference.height);

    for (path, slice) in slices {
        let found = (slice.width, slice.height);
        if found != expected {
            return Err(LoadError::InconsistentDimensions {
                path: path.clone(),
                expected,
                found,
            });
        }
        if slice.data.len() != slice.width * slice.height {
            return Err(LoadError::Corrupt {
                path: path.clone(),
                reason: format!(
                    "{} samples for a {}x{} slice",
                    slice.data.len(),
                    slice.width,
                    slice.height
                ),
            });
        }
        if slice.modality != reference.modality {
            return Err(LoadError::InconsistentModality {
                path: path.clone(),
                expected: reference.modality.clone(),
                found: slice.modality.clone(),
            });
        }
    }
    Ok(())
}

/// Slices paired with their depth along the stacking axis, nearest first.
struct OrderedSlices {
    slices: Vec<DecodedSlice>,
    depths: Option<Vec<f32>>,
}

fn order_slices(slices: Vec<(PathBuf, DecodedSlice)>) -> OrderedSlices {
    let normal = slices[0]
        .1
        .normal()
        .map(toward_positive_axis)
        .unwrap_or_else(|| vector![0.0, 0.0, 1.0]);

    let all_positioned = slices.iter().all(|(_, s)| s.position.is_some());
    let all_numbered = slices.iter().all(|(_, s)| s.instance_number.is_some());

    let mut keyed: Vec<(f32, DecodedSlice)> = slices
        .into_iter()
        .enumerate()
        .map(|(i, (_, slice))| {
            let key = match (slice.position, slice.instance_number) {
                (Some(pos), _) if all_positioned => pos.coords.dot(&normal),
                (_, Some(number)) if all_numbered => number as f32,
                // Paths arrive sorted by name
                _ => i as f32,
            };
            (key, slice)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let depths = all_positioned.then(|| keyed.iter().map(|(key, _)| *key).collect());
    let slices = keyed.into_iter().map(|(_, slice)| slice).collect();

    OrderedSlices { slices, depths }
}

/// Slices stack away from the origin along the grid's z axis, so the
/// normal is flipped to point along its dominant axis.
fn toward_positive_axis(normal: Vector3<f32>) -> Vector3<f32> {
    let dominant = normal.iamax();
    if normal[dominant] < 0.0 {
        -normal
    } else {
        normal
    }
}

fn slice_spacing(ordered: &OrderedSlices) -> f32 {
    let first = &ordered.slices[0];

    if let Some(depths) = &ordered.depths {
        if depths.len() > 1 {
            let span = depths[depths.len() - 1] - depths[0];
            let mean = span / (depths.len() - 1) as f32;
            if mean.is_finite() && mean > f32::EPSILON {
                return mean;
            }
            log::warn!("Slice positions coincide, falling back to slice thickness");
        }
    }

    match first.slice_thickness {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => 1.0,
    }
}

fn assemble(ordered: OrderedSlices) -> Result<Volume, LoadError> {
    let z_spacing = slice_spacing(&ordered);

    let first = &ordered.slices[0];
    let (x_spacing, y_spacing) = first.pixel_spacing.unwrap_or((1.0, 1.0));
    let origin = first.position.unwrap_or_else(|| point![0.0, 0.0, 0.0]);
    let size = vector![first.width, first.height, ordered.slices.len()];

    let mut data = Vec::with_capacity(size.x * size.y * size.z);
    for slice in ordered.slices {
        data.extend(slice.data);
    }

    let spacing = vector![x_spacing, y_spacing, z_spacing];
    Ok(Volume::new(size, spacing, origin, data)?)
}

#[cfg(test)]
mod test {

    use std::{collections::HashMap, fs::File};

    use approx::assert_relative_eq;
    use nalgebra::point;

    use super::*;

    /// Serves slices registered by file name, files themselves are empty.
    struct FakeDecoder {
        slices: HashMap<String, DecodedSlice>,
    }

    impl SliceDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedSlice, LoadError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.slices
                .get(&name)
                .cloned()
                .ok_or_else(|| LoadError::Corrupt {
                    path: path.to_path_buf(),
                    reason: "not a slice".into(),
                })
        }
    }

    fn slice(value: f32, z: f32) -> DecodedSlice {
        let mut s = DecodedSlice::new(2, 3, vec![value; 6]);
        s.pixel_spacing = Some((0.5, 0.75));
        s.position = Some(point![-10.0, -20.0, z]);
        s.orientation = Some((vector![1.0, 0.0, 0.0], vector![0.0, 1.0, 0.0]));
        s.modality = Some("CT".into());
        s
    }

    fn setup(slices: Vec<(&str, DecodedSlice)>) -> (tempfile::TempDir, VolumeLoader<FakeDecoder>) {
        let dir = tempfile::tempdir().unwrap();
        let mut map = HashMap::new();
        for (name, s) in slices {
            File::create(dir.path().join(name)).unwrap();
            map.insert(name.to_string(), s);
        }
        (dir, VolumeLoader::new(FakeDecoder { slices: map }))
    }

    #[test]
    fn stacks_by_position() {
        // File names deliberately out of position order
        let (dir, loader) = setup(vec![
            ("a.dcm", slice(3.0, 5.0)),
            ("b.dcm", slice(1.0, 1.0)),
            ("c.dcm", slice(2.0, 3.0)),
        ]);

        let volume = loader.load_directory(dir.path()).unwrap();

        assert_eq!(volume.get_size(), vector![2, 3, 3]);
        assert_relative_eq!(volume.get_spacing(), vector![0.5, 0.75, 2.0]);
        assert_eq!(volume.get_origin(), point![-10.0, -20.0, 1.0]);
        assert_eq!(volume.get_data(0, 0, 0), Some(1.0));
        assert_eq!(volume.get_data(1, 2, 1), Some(2.0));
        assert_eq!(volume.get_data(0, 1, 2), Some(3.0));
    }

    #[test]
    fn falls_back_to_instance_number() {
        let mut first = DecodedSlice::new(1, 1, vec![10.0]);
        first.instance_number = Some(2);
        first.slice_thickness = Some(2.5);
        let mut second = DecodedSlice::new(1, 1, vec![20.0]);
        second.instance_number = Some(1);
        second.slice_thickness = Some(2.5);

        let (dir, loader) = setup(vec![("1", first), ("2", second)]);
        let volume = loader.load_directory(dir.path()).unwrap();

        assert_eq!(volume.get_data(0, 0, 0), Some(20.0));
        assert_eq!(volume.get_data(0, 0, 1), Some(10.0));
        assert_eq!(volume.get_spacing(), vector![1.0, 1.0, 2.5]);
    }

    #[test]
    fn skips_hidden_files_and_directories() {
        let (dir, loader) = setup(vec![("only", slice(7.0, 0.0))]);
        File::create(dir.path().join(".DS_Store")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let volume = loader.load_directory(dir.path()).unwrap();
        assert_eq!(volume.get_size(), vector![2, 3, 1]);
    }

    #[test]
    fn empty_directory() {
        let (dir, loader) = setup(vec![]);
        let err = loader.load_directory(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDirectory(_)));
    }

    #[test]
    fn missing_directory() {
        let (dir, loader) = setup(vec![]);
        let err = loader.load_directory(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn inconsistent_dimensions() {
        let (dir, loader) = setup(vec![
            ("a", slice(1.0, 0.0)),
            ("b", DecodedSlice::new(3, 3, vec![0.0; 9])),
        ]);
        let err = loader.load_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InconsistentDimensions {
                expected: (2, 3),
                found: (3, 3),
                ..
            }
        ));
    }

    #[test]
    fn inconsistent_modality() {
        let mut mr = slice(1.0, 1.0);
        mr.modality = Some("MR".into());
        let (dir, loader) = setup(vec![("a", slice(1.0, 0.0)), ("b", mr)]);
        let err = loader.load_directory(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::InconsistentModality { .. }));
    }

    #[test]
    fn corrupt_file_fails_whole_load() {
        let (dir, loader) = setup(vec![("a", slice(1.0, 0.0))]);
        File::create(dir.path().join("garbage")).unwrap();
        let err = loader.load_directory(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn short_slice_data_is_corrupt() {
        let (dir, loader) = setup(vec![("a", DecodedSlice::new(2, 2, vec![0.0; 3]))]);
        let err = loader.load_directory(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn coinciding_positions_use_thickness() {
        let mut a = slice(1.0, 4.0);
        a.slice_thickness = Some(3.0);
        let mut b = slice(2.0, 4.0);
        b.slice_thickness = Some(3.0);
        let (dir, loader) = setup(vec![("a", a), ("b", b)]);
        let volume = loader.load_directory(dir.path()).unwrap();
        assert_eq!(volume.get_spacing().z, 3.0);
    }

    #[test]
    fn oblique_normal_orders_slices() {
        // Slice normal is -z, the grid still grows toward +z from the lowest slice
        let mut far = slice(1.0, 10.0);
        far.orientation = Some((vector![1.0, 0.0, 0.0], vector![0.0, -1.0, 0.0]));
        let mut near = slice(2.0, 0.0);
        near.orientation = far.orientation;

        let (dir, loader) = setup(vec![("b", far), ("a", near)]);
        let volume = loader.load_directory(dir.path()).unwrap();
        assert_eq!(volume.get_data(0, 0, 0), Some(2.0));
        assert_eq!(volume.get_data(0, 0, 1), Some(1.0));
        assert_eq!(volume.get_spacing().z, 10.0);
        assert_eq!(volume.get_origin().z, 0.0);
        assert_eq!(volume.get_bound_box().upper.z, 10.0);
    }
}
