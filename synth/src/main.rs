//! A CLI tool for synthesizing a DICOM test series.
//!
//! This command line tool takes a reference DICOM file
//! and writes a series of new DICOM files
//! with a banded 8-bit test pattern,
//! one band per slice.
//! Patient and study attributes are copied from the reference file,
//! while each new file receives a fresh SOP Instance UID.
//!
//! The files are encoded in Explicit VR Little Endian.
use std::path::PathBuf;

use clap::Parser;
use dicom_synth::builder::{DEFAULT_SERIES_DESCRIPTION, DEFAULT_SERIES_NUMBER};
use dicom_synth::series::{
    DEFAULT_INTENSITY, DEFAULT_OUTPUT_DIR, DEFAULT_SERIES_INSTANCE_UID, DEFAULT_STUDY_INSTANCE_UID,
};
use dicom_synth::{
    generate_series, HighBit, ModalityProfile, SeriesConfig, SeriesLayout, VolumeShape,
};
use snafu::{Report, ResultExt, Whatever};
use tracing::{error, Level};

/// Exit code for when the options do not describe a valid series.
const ERROR_CONFIG: i32 = -1;
/// Exit code for when an error emerged while generating the series.
const ERROR_GENERATE: i32 = -2;

/// Synthesize a DICOM series from a reference file
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// Path to the reference DICOM file
    /// providing patient and study attributes
    reference: PathBuf,

    /// Directory to write the new DICOM files to
    #[arg(short = 'o', long = "out", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Study Instance UID shared by all files
    #[arg(long = "study-uid", default_value = DEFAULT_STUDY_INSTANCE_UID)]
    study_instance_uid: String,

    /// Series Instance UID shared by all files
    #[arg(long = "series-uid", default_value = DEFAULT_SERIES_INSTANCE_UID)]
    series_instance_uid: String,

    /// Series Number
    #[arg(long = "series-number", default_value_t = DEFAULT_SERIES_NUMBER)]
    series_number: i32,

    /// Series Description
    #[arg(long = "description", default_value = DEFAULT_SERIES_DESCRIPTION)]
    series_description: String,

    /// Start of each output file name
    /// (followed by a dash and a unique identifier)
    #[arg(long = "prefix", default_value = DEFAULT_SERIES_DESCRIPTION)]
    file_prefix: String,

    /// Modality profile (`mr` or `sc`)
    #[arg(long = "profile", default_value = "mr")]
    profile: ModalityProfile,

    /// Write a single multi-frame file instead of one file per slice
    /// (requires the `sc` profile)
    #[arg(long = "multi-frame")]
    multi_frame: bool,

    /// Set High Bit to 7 instead of 8
    #[arg(long = "conventional-high-bit")]
    conventional_high_bit: bool,

    /// Number of rows in each slice
    #[arg(long = "rows", default_value = "100")]
    rows: usize,

    /// Number of columns in each slice
    #[arg(long = "columns", default_value = "100")]
    columns: usize,

    /// Number of slices
    #[arg(long = "slices", default_value = "10")]
    slices: u32,

    /// Sample value of the painted bands
    #[arg(long = "intensity", default_value_t = DEFAULT_INTENSITY)]
    intensity: u8,

    /// Print more information about the generated files
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let App {
        reference,
        output,
        study_instance_uid,
        series_instance_uid,
        series_number,
        series_description,
        file_prefix,
        profile,
        multi_frame,
        conventional_high_bit,
        rows,
        columns,
        slices,
        intensity,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    if multi_frame && !profile.has_number_of_frames() {
        error!("Multi-frame output requires the `sc` profile");
        std::process::exit(ERROR_CONFIG);
    }

    let config = SeriesConfig {
        reference,
        output_dir: output,
        study_instance_uid,
        series_instance_uid,
        series_number,
        series_description,
        file_prefix,
        profile,
        high_bit: if conventional_high_bit {
            HighBit::Conventional
        } else {
            HighBit::Legacy
        },
        layout: if multi_frame {
            SeriesLayout::MultiFrame
        } else {
            SeriesLayout::PerSlice
        },
        shape: VolumeShape {
            rows,
            columns,
            slices,
        },
        intensity,
    };

    let written = generate_series(&config).unwrap_or_else(|e| {
        error!("{}", Report::from_error(e));
        std::process::exit(ERROR_GENERATE);
    });

    if verbose {
        for instance in &written {
            println!(
                "#{} {} {}",
                instance.instance_number,
                instance.sop_instance_uid,
                instance.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::{CommandFactory, Parser};
    use dicom_synth::SeriesConfig;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }

    #[test]
    fn defaults_match_series_config() {
        let app = App::try_parse_from(["dicom-synth", "reference.dcm"]).unwrap();
        let config = SeriesConfig::new("reference.dcm");
        assert_eq!(app.output, config.output_dir);
        assert_eq!(app.study_instance_uid, config.study_instance_uid);
        assert_eq!(app.series_instance_uid, config.series_instance_uid);
        assert_eq!(app.series_number, config.series_number);
        assert_eq!(app.series_description, config.series_description);
        assert_eq!(app.file_prefix, config.file_prefix);
        assert_eq!(app.profile, config.profile);
        assert_eq!(app.rows, config.shape.rows);
        assert_eq!(app.columns, config.shape.columns);
        assert_eq!(app.slices, config.shape.slices);
        assert_eq!(app.intensity, config.intensity);
    }
}
