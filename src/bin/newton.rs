// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate image;
extern crate log;
extern crate newtonbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::bmp::BMPEncoder;
use image::ColorType;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;
use std::time::Duration;

use newtonbrot::parse::{parse_keyframe, parse_keyframes};
use newtonbrot::{
    colour_raster, render_animation, render_image, DepthRange, FrameParams, FrameResult, Palette, PipelineSettings,
    RenderError, Viewport,
};

fn validate_keyframe(s: &str) -> Result<(), String> {
    match parse_keyframe(s) {
        Ok(_) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const WINDOW_WIDTH: &str = "window-width";
const WINDOW_HEIGHT: &str = "window-height";
const MIN_DEPTH: &str = "min-depth";
const MAX_DEPTH: &str = "max-depth";
const COEFFICIENTS: &str = "coefficients";
const OUTPUT: &str = "output";
const THREADS: &str = "threads";
const READY_LIMIT: &str = "ready-limit";
const ITERATIONS: &str = "iterations";
const PRECISION: &str = "precision";
const DETECT_PRECISION: &str = "detect-precision";
const STATUS: &str = "status";

fn args<'a>(default_threads: &'a str) -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("newton")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Newton fractal and animation renderer")
        .after_help(
            "EXAMPLES:\n    \
             newton --coefficients 1,0,0,-i --output cube.bmp\n    \
             newton --coefficients 1,0,0,-i@0 --coefficients 1,0,0,0,-i@60 --output cube.bmp\n    \
             newton --coefficients 1,0,0,-i@0 --coefficients 1,0,0,0,-i@60 \\\n        \
             | ffmpeg -r 30 -f bmp_pipe -i - -c:v libx264 -crf 0 -r 30 output.avi",
        )
        .arg(
            Arg::with_name(COEFFICIENTS)
                .required(true)
                .long(COEFFICIENTS)
                .short("c")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .validator(|s| validate_keyframe(&s))
                .help("Polynomial coefficients, highest power first, with an optional @frame. Repeat to animate"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .alias("output-filename")
                .short("o")
                .takes_value(true)
                .help("Output bitmap; animations number each frame. Omit to write to stdout"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .required(false)
                .long(WIDTH)
                .takes_value(true)
                .default_value("2048")
                .validator(|s| validate_range(&s, 1, 65_535, "Could not parse width", "Width must be between 1 and 65535"))
                .help("Width of output image in pixels"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .required(false)
                .long(HEIGHT)
                .takes_value(true)
                .default_value("1536")
                .validator(|s| {
                    validate_range(&s, 1, 65_535, "Could not parse height", "Height must be between 1 and 65535")
                })
                .help("Height of output image in pixels"),
        )
        .arg(
            Arg::with_name(WINDOW_WIDTH)
                .required(false)
                .long(WINDOW_WIDTH)
                .takes_value(true)
                .default_value("8")
                .validator(|s| validate_positive(&s, "Window width must be a positive number"))
                .help("Width of the window on the complex plane, centred on 0"),
        )
        .arg(
            Arg::with_name(WINDOW_HEIGHT)
                .required(false)
                .long(WINDOW_HEIGHT)
                .takes_value(true)
                .default_value("6")
                .validator(|s| validate_positive(&s, "Window height must be a positive number"))
                .help("Height of the window on the complex plane, centred on 0"),
        )
        .arg(
            Arg::with_name(MIN_DEPTH)
                .required(false)
                .long(MIN_DEPTH)
                .takes_value(true)
                .validator(|s| {
                    validate_range(&s, 0, u32::max_value(), "Could not parse minimum depth", "Depth out of range")
                })
                .help("Iteration count drawn black; defaults to the fastest pixel of each image"),
        )
        .arg(
            Arg::with_name(MAX_DEPTH)
                .required(false)
                .long(MAX_DEPTH)
                .takes_value(true)
                .validator(|s| {
                    validate_range(&s, 0, u32::max_value(), "Could not parse maximum depth", "Depth out of range")
                })
                .help("Iteration count drawn at full colour; defaults to the slowest pixel of each image"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value(default_threads)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads rendering animation frames"),
        )
        .arg(
            Arg::with_name(READY_LIMIT)
                .required(false)
                .long(READY_LIMIT)
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse ready limit",
                        "Ready limit must be between 1 and 1024",
                    )
                })
                .help("Finished frames allowed to wait for output before workers pause"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Newton iterations per pixel before giving up"),
        )
        .arg(
            Arg::with_name(PRECISION)
                .required(false)
                .long(PRECISION)
                .takes_value(true)
                .default_value("0.0000001")
                .validator(|s| validate_positive(&s, "Precision must be a positive number"))
                .help("Step size below which the iteration has converged"),
        )
        .arg(
            Arg::with_name(DETECT_PRECISION)
                .required(false)
                .long(DETECT_PRECISION)
                .takes_value(true)
                .default_value("0.0001")
                .validator(|s| validate_positive(&s, "Detection precision must be a positive number"))
                .help("Distance below which two converged values are the same root"),
        )
        .arg(
            Arg::with_name(STATUS)
                .required(false)
                .long(STATUS)
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        86_400,
                        "Could not parse status interval",
                        "Status interval must be between 0 and 86400 seconds",
                    )
                })
                .help("Seconds between progress reports; 0 disables them"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, RenderError> {
    let s = matches.value_of(name).unwrap_or_default();
    T::from_str(s).map_err(|_| RenderError::parse(s, format!("bad value for --{}", name)))
}

fn optional<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, RenderError> {
    match matches.value_of(name) {
        Some(_) => value(matches, name).map(Some),
        None => Ok(None),
    }
}

/// `cube.bmp` becomes `cube.7.bmp`; anything else gets `.7` appended.
fn numbered(path: &str, frame: usize) -> String {
    if path.ends_with(".bmp") {
        format!("{}.{}.bmp", &path[..path.len() - 4], frame)
    } else {
        format!("{}.{}", path, frame)
    }
}

fn write_bitmap<W: Write>(
    out: &mut W,
    frame: &FrameResult,
    palette: &Palette,
    range: &DepthRange,
) -> Result<(), RenderError> {
    let raster = &frame.raster;
    let rgb = colour_raster(raster, palette, range);
    // Row 0 of the raster is the bottom of the window.
    let flipped: Vec<u8> = rgb
        .chunks(raster.width() * 3)
        .rev()
        .flat_map(|row| row.iter().cloned())
        .collect();
    BMPEncoder::new(&mut *out).encode(&flipped, raster.width() as u32, raster.height() as u32, ColorType::RGB(8))?;
    out.flush()?;
    Ok(())
}

fn save(
    output: Option<&str>,
    frame: &FrameResult,
    palette: &Palette,
    range: &DepthRange,
) -> Result<(), RenderError> {
    match output {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            write_bitmap(&mut file, frame, palette, range)?;
            info!("frame {} written to {}", frame.index, path);
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_bitmap(&mut lock, frame, palette, range)?;
        }
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), RenderError> {
    let keyframes = parse_keyframes(matches.values_of(COEFFICIENTS).into_iter().flatten())?;
    let params = FrameParams {
        viewport: Viewport::centred(value(matches, WINDOW_WIDTH)?, value(matches, WINDOW_HEIGHT)?),
        width: value(matches, WIDTH)?,
        height: value(matches, HEIGHT)?,
        precision: value(matches, PRECISION)?,
        detect_precision: value(matches, DETECT_PRECISION)?,
        max_iterations: value(matches, ITERATIONS)?,
        ..FrameParams::default()
    };
    let range = DepthRange {
        min: optional(matches, MIN_DEPTH)?,
        max: optional(matches, MAX_DEPTH)?,
    };
    let palette = Palette::default();
    let output = matches.value_of(OUTPUT);

    if keyframes.len() == 1 {
        let polynomial = keyframes.into_iter().map(|(_, p)| p).next();
        let polynomial = polynomial.ok_or_else(|| RenderError::invalid("no coefficients given"))?;
        params.validate()?;
        let frame = render_image(polynomial, params)?;
        return save(output, &frame, &palette, &range);
    }

    let status: u64 = value(matches, STATUS)?;
    let settings = PipelineSettings {
        threads: value(matches, THREADS)?,
        ready_limit: value(matches, READY_LIMIT)?,
        status_interval: if status == 0 { None } else { Some(Duration::from_secs(status)) },
    };
    let frames = render_animation(&keyframes, params, settings, |frame| {
        let name = output.map(|path| numbered(path, frame.index));
        save(name.as_ref().map(String::as_str), frame, &palette, &range)
    })?;
    info!("{} frames rendered", frames);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let default_threads = num_cpus::get().to_string();
    let matches = args(&default_threads);
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
