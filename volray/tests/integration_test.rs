use std::{
    fs,
    io::Write,
    path::Path,
};

use nalgebra::{point, vector};
use volray::{
    color,
    present::{PngPresenter, Present},
    volume_property::uniform_property,
    volumetric::{DecodedSlice, LoadError, SliceDecoder, VolumeLoader},
    CameraEvent, RenderOptions, Session, SessionConfig, VolumeSource,
};

pub const WIDTH: usize = 9;
pub const HEIGHT: usize = 7;

/// `.vol` image, linear sample order
fn write_raw_volume(path: &Path, side: u32, value: u8) {
    let mut bytes = Vec::new();
    for _ in 0..3 {
        bytes.extend_from_slice(&side.to_le_bytes());
    }
    bytes.push(0);
    for _ in 0..3 {
        bytes.extend_from_slice(&1.0_f32.to_le_bytes());
    }
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend(std::iter::repeat(value).take((side * side * side) as usize));

    let mut file = fs::File::create(path).unwrap();
    file.write_all(&bytes).unwrap();
}

/// Slice files hold their samples as text, instance number is the file stem
struct TextDecoder;

impl SliceDecoder for TextDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedSlice, LoadError> {
        let corrupt = |reason: &str| LoadError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        let text = fs::read_to_string(path).map_err(|_| corrupt("unreadable"))?;
        let data = text
            .split_whitespace()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| corrupt("not a number"))?;
        let number = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i32>().ok());

        let mut slice = DecodedSlice::new(2, 2, data);
        slice.instance_number = number;
        slice.slice_thickness = Some(2.5);
        Ok(slice)
    }
}

#[test]
fn raw_volume_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let vol_path = dir.path().join("cube.vol");
    write_raw_volume(&vol_path, 10, 200);

    let config = SessionConfig {
        source: VolumeSource::Raw(vol_path),
        width: WIDTH,
        height: HEIGHT,
    };
    let property = uniform_property([1.0, 0.0, 0.0], 1.0).unwrap();
    let mut session =
        Session::load(&config, property, RenderOptions::builder().worker_count(3)).unwrap();

    assert_eq!(session.volume().get_size(), vector![10, 10, 10]);
    assert_eq!(session.volume().get_data(5, 5, 5), Some(200.0));

    let red = color::new(1.0, 0.0, 0.0, 1.0);
    let frame = session.render();
    assert_eq!(frame.resolution(), (WIDTH, HEIGHT));
    assert_eq!(frame.get(WIDTH / 2, HEIGHT / 2), Some(red));
    assert!(frame
        .pixels()
        .iter()
        .all(|p| *p == red || *p == color::black()));

    let mut presenter = PngPresenter::new(dir.path().join("frame"));
    session.present(&mut presenter).unwrap();

    let png = image::open(dir.path().join("frame_0000.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(png.dimensions(), (WIDTH as u32, HEIGHT as u32));
    assert_eq!(
        png.get_pixel(WIDTH as u32 / 2, HEIGHT as u32 / 2).0,
        [255, 0, 0, 255]
    );
}

#[test]
fn events_keep_volume_in_view() {
    let dir = tempfile::tempdir().unwrap();
    let vol_path = dir.path().join("cube.vol");
    write_raw_volume(&vol_path, 8, 50);

    let config = SessionConfig {
        source: VolumeSource::Raw(vol_path),
        width: WIDTH,
        height: HEIGHT,
    };
    let property = uniform_property([0.0, 1.0, 0.0], 1.0).unwrap();
    let mut session = Session::load(&config, property, RenderOptions::builder()).unwrap();
    let green = color::new(0.0, 1.0, 0.0, 1.0);

    for event in ["orbit:45,30", "roll:15", "zoom:1.5", "orbit:-120,0"] {
        let event: CameraEvent = event.parse().unwrap();
        let frame = session.handle_event(event);
        assert_eq!(frame.get(WIDTH / 2, HEIGHT / 2), Some(green), "{:?}", event);
    }
}

#[test]
fn render_thread_serves_session_view() {
    let dir = tempfile::tempdir().unwrap();
    let vol_path = dir.path().join("cube.vol");
    write_raw_volume(&vol_path, 6, 1);

    let config = SessionConfig {
        source: VolumeSource::Raw(vol_path),
        width: WIDTH,
        height: HEIGHT,
    };
    let property = uniform_property([0.0, 0.0, 1.0], 1.0).unwrap();
    let mut session = Session::load(&config, property, RenderOptions::builder()).unwrap();
    let expected = session.render().clone();

    let mut front = session.spawn_front();
    let generation = front.request_render(session.camera());
    let (received, frame) = front.receive_frame().unwrap();

    assert_eq!(received, generation);
    assert_eq!(frame, expected);
    assert_eq!(*front.get_buffer_handle().lock(), expected);
    front.shutdown();
}

#[test]
fn custom_decoder_stacks_by_instance_number() {
    let dir = tempfile::tempdir().unwrap();
    // Names sort opposite to instance numbers
    for (name, values) in [("10.txt", "3 3 3 3"), ("2.txt", "1 1 1 1"), ("7.txt", "2 2 2 2")] {
        fs::write(dir.path().join(name), values).unwrap();
    }
    fs::write(dir.path().join(".DS_Store"), "junk").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let volume = VolumeLoader::new(TextDecoder)
        .load_directory(dir.path())
        .unwrap();

    assert_eq!(volume.get_size(), vector![2, 2, 3]);
    assert_eq!(volume.get_spacing(), vector![1.0, 1.0, 2.5]);
    assert_eq!(volume.get_origin(), point![0.0, 0.0, 0.0]);
    assert_eq!(volume.get_data(0, 0, 0), Some(1.0));
    assert_eq!(volume.get_data(1, 1, 1), Some(2.0));
    assert_eq!(volume.get_data(0, 1, 2), Some(3.0));
}

#[test]
fn custom_decoder_reports_bad_slice() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("1.txt"), "0 0 0 0").unwrap();
    fs::write(dir.path().join("2.txt"), "0 zero 0 0").unwrap();

    let err = VolumeLoader::new(TextDecoder)
        .load_directory(dir.path())
        .unwrap_err();
    match err {
        LoadError::Corrupt { path, .. } => assert_eq!(path, dir.path().join("2.txt")),
        other => panic!("unexpected error {}", other),
    }
}
