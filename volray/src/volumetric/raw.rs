use std::{fs::File, path::Path};

use memmap::MmapOptions;
use nalgebra::{point, vector, Vector3};
use nom::{
    bytes::complete::take,
    number::complete::{le_f32, le_u32, u8 as byte},
    sequence::tuple,
    IResult,
};

use super::{loader::LoadError, volume::voxel_count, Volume};

/// 3x u32 size, 1 padding byte, 3x f32 voxel shape, sample order and its parameter
pub const RAW_HEADER_LEN: usize = 3 * 4 + 1 + 3 * 4 + 2;

const ORDER_LINEAR: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHeader {
    pub size: Vector3<usize>,
    pub spacing: Vector3<f32>,
    pub order: u8,
}

fn header(s: &[u8]) -> IResult<&[u8], RawHeader> {
    let mut header = tuple((
        tuple((le_u32, le_u32, le_u32)),
        take(1_u8),
        tuple((le_f32, le_f32, le_f32)),
        byte,
        byte,
    ));

    let (s, (size, _, spacing, order, _param)) = header(s)?;

    Ok((
        s,
        RawHeader {
            size: vector![size.0 as usize, size.1 as usize, size.2 as usize],
            spacing: vector![spacing.0, spacing.1, spacing.2],
            order,
        },
    ))
}

/// Reader of the generator's `.vol` format.
///
/// Little-endian header followed by one byte per sample, z growing fastest.
pub struct RawVolumeReader;

impl RawVolumeReader {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Volume, LoadError> {
        let path = path.as_ref();
        let invalid = |reason: String| LoadError::InvalidRawVolume {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if (len as usize) < RAW_HEADER_LEN {
            return Err(invalid(format!("file has only {len} bytes")));
        }

        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let volume = Self::from_bytes(&mmap).map_err(invalid)?;
        log::info!(
            "Read raw volume {}: size {:?}",
            path.display(),
            volume.get_size().as_slice()
        );
        Ok(volume)
    }

    /// Parse an in-memory `.vol` image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Volume, String> {
        let (body, header) = header(bytes).map_err(|_| "truncated header".to_string())?;

        if header.order != ORDER_LINEAR {
            return Err(format!("unsupported sample order {}", header.order));
        }

        let size = header.size;
        let expected = voxel_count(size)
            .ok_or_else(|| format!("size {:?} overflows the sample count", size.as_slice()))?;
        if body.len() < expected {
            return Err(format!(
                "expected {expected} samples, file holds {}",
                body.len()
            ));
        }

        // File is z-fastest, volume is x-fastest
        let mut data = vec![0.0; expected];
        for (i, &value) in body[..expected].iter().enumerate() {
            let z = i % size.z;
            let y = (i / size.z) % size.y;
            let x = i / (size.y * size.z);
            data[x + y * size.x + z * size.x * size.y] = value as f32;
        }

        Volume::new(size, header.spacing, point![0.0, 0.0, 0.0], data).map_err(|e| e.to_string())
    }
}
