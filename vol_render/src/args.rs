//! Argument parsing and validation
//! Uses library `clap`

use std::ffi::OsStr;

use clap::{Arg, ArgGroup, Command, ValueHint};
use volray::CameraEvent;

// up to 32bit value
pub fn is_positive_number(num: &str) -> Result<(), String> {
    match num.parse::<u32>() {
        Ok(n) if n > 0 => Ok(()),
        Ok(_) => Err("Number must be greater than 0".into()),
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_float_number(num: &str) -> Result<(), String> {
    match num.parse::<f32>() {
        Ok(n) if n.is_finite() => Ok(()),
        _ => Err("Number required".into()),
    }
}

pub fn is_positive_float(num: &str) -> Result<(), String> {
    match num.parse::<f32>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
        Ok(_) => Err("Number must be greater than 0.0".into()),
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_unit_float(num: &str) -> Result<(), String> {
    match num.parse::<f32>() {
        Ok(n) if (0.0..=1.0).contains(&n) => Ok(()),
        Ok(_) => Err("Number must be in range <0;1>".into()),
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_camera_event(event: &str) -> Result<(), String> {
    event
        .parse::<CameraEvent>()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

const PROJECTION_NAMES: &[&str] = &["perspective", "parallel"];

/// Comma separated list of exactly `n` numbers, option may repeat
fn point_list<'a>(name: &'a str, n: usize, value_names: &'a [&'a str], help: &'a str) -> Arg<'a> {
    Arg::new(name)
        .help(help)
        .long(name)
        .number_of_values(n)
        .value_names(value_names)
        .use_value_delimiter(true)
        .require_value_delimiter(true)
        .require_equals(true)
        .multiple_occurrences(true)
        .allow_hyphen_values(true)
        .validator(is_float_number)
}

pub fn get_command<'a>() -> Command<'a> {
    Command::new("Vol-render")
        .version("0.1.0")
        .about("Ray casting renderer of DICOM series and .vol files")
        .arg(
            Arg::new("dicom")
                .help("Directory with DICOM slices")
                .long("dicom")
                .value_name("DIR")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("raw")
                .help("Volume in .vol format")
                .long("raw")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .group(
            ArgGroup::new("source")
                .args(&["dicom", "raw"])
                .required(true),
        )
        .arg(
            Arg::new("size")
                .help("Resolution of rendered frames")
                .long("size")
                .short('s')
                .number_of_values(2)
                .value_names(&["W", "H"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .default_values(&["640", "480"])
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("step")
                .help("Distance between samples along a ray")
                .long("step")
                .value_name("DIST")
                .validator(is_positive_float),
        )
        .arg(
            Arg::new("projection")
                .help("Camera projection")
                .long("projection")
                .short('p')
                .default_value("perspective")
                .value_name("KIND")
                .possible_values(PROJECTION_NAMES),
        )
        .arg(
            Arg::new("nearest")
                .help("Nearest neighbour sampling instead of trilinear")
                .long("nearest"),
        )
        .arg(Arg::new("shade").help("Enable Phong shading").long("shade"))
        .arg(
            Arg::new("no-ert")
                .help("Disable early ray termination")
                .long("no-ert"),
        )
        .arg(
            Arg::new("threads")
                .help("Render threads, defaults to available parallelism")
                .long("threads")
                .short('t')
                .value_name("N")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("background")
                .help("Background color")
                .long("background")
                .number_of_values(4)
                .value_names(&["R", "G", "B", "A"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .default_values(&["0", "0", "0", "1"])
                .validator(is_unit_float),
        )
        .arg(point_list(
            "color-point",
            4,
            &["I", "R", "G", "B"],
            "Color control point, replaces the preset color function",
        ))
        .arg(point_list(
            "opacity-point",
            2,
            &["I", "A"],
            "Scalar opacity control point, replaces the preset opacity function",
        ))
        .arg(point_list(
            "gradient-point",
            2,
            &["G", "A"],
            "Gradient opacity control point, replaces the preset gradient opacity",
        ))
        .arg(
            Arg::new("event")
                .help("Camera event applied after the first frame, e.g. orbit:30,0 or zoom:1.5")
                .long("event")
                .short('e')
                .value_name("EVENT")
                .multiple_occurrences(true)
                .allow_hyphen_values(true)
                .validator(is_camera_event),
        )
        .arg(
            Arg::new("output")
                .help("Prefix of output PNG files")
                .long("output")
                .short('o')
                .value_name("PREFIX")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath)
                .default_value_os(OsStr::new("frame")),
        )
}
