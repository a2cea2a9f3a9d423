//! Generation of complete synthetic series.
//!
//! [`generate_series`] reads the reference file once,
//! builds the banded test volume
//! and writes one DICOM file per slice
//! (or a single multi-frame file)
//! into the output directory.
use crate::builder::{
    self, SeriesContext, WrittenInstance, DEFAULT_SERIES_DESCRIPTION, DEFAULT_SERIES_NUMBER,
};
use crate::pixel;
use crate::profile::{HighBit, ModalityProfile};
use crate::reference::{self, ReferenceMetadata};
use crate::uid::generate_uid;
use crate::volume::{SyntheticVolume, VolumeShape};
use snafu::{ensure, ResultExt, Snafu};
use std::path::PathBuf;
use tracing::{debug, info};

/// Study Instance UID of the reference fixtures.
pub const DEFAULT_STUDY_INSTANCE_UID: &str =
    "1.2.826.0.1.3680043.8.498.89515756153419402831179022658541245246";

/// Series Instance UID of the reference fixtures.
pub const DEFAULT_SERIES_INSTANCE_UID: &str =
    "1.2.826.0.1.3680043.8.498.94866033580937989770888665857070522827";

/// The default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// The default intensity of the painted bands.
pub const DEFAULT_INTENSITY: u8 = 255;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not load reference metadata"))]
    LoadReference { source: reference::Error },

    #[snafu(display("Could not set up series"))]
    CreateContext { source: builder::Error },

    #[snafu(display("Multi-frame output is not supported by profile `{}`", profile))]
    MultiFrameLayout { profile: ModalityProfile },

    #[snafu(display("Could not create synthetic pixel data"))]
    CreatePixels { source: pixel::Error },

    #[snafu(display("Could not write instance #{}", instance_number))]
    WriteInstance {
        instance_number: u32,
        source: builder::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// How the volume is distributed over files.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum SeriesLayout {
    /// One single frame file per slice.
    #[default]
    PerSlice,
    /// One multi-frame file with all slices.
    MultiFrame,
}

/// Parameters of a synthetic series.
///
/// The default configuration reproduces the reference fixtures:
/// ten 100x100 MR slices in the `data` directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesConfig {
    /// Path to the DICOM file providing patient and study metadata
    pub reference: PathBuf,
    /// Directory to write the files to
    pub output_dir: PathBuf,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    pub series_number: i32,
    pub series_description: String,
    /// Start of each file name, followed by a dash and a fresh UID
    pub file_prefix: String,
    pub profile: ModalityProfile,
    pub high_bit: HighBit,
    pub layout: SeriesLayout,
    pub shape: VolumeShape,
    /// Value of the painted bands
    pub intensity: u8,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        SeriesConfig {
            reference: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            study_instance_uid: DEFAULT_STUDY_INSTANCE_UID.to_string(),
            series_instance_uid: DEFAULT_SERIES_INSTANCE_UID.to_string(),
            series_number: DEFAULT_SERIES_NUMBER,
            series_description: DEFAULT_SERIES_DESCRIPTION.to_string(),
            file_prefix: DEFAULT_SERIES_DESCRIPTION.to_string(),
            profile: ModalityProfile::default(),
            high_bit: HighBit::default(),
            layout: SeriesLayout::default(),
            shape: VolumeShape::default(),
            intensity: DEFAULT_INTENSITY,
        }
    }
}

impl SeriesConfig {
    /// Create the default configuration with the given reference file.
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        SeriesConfig {
            reference: reference.into(),
            ..Default::default()
        }
    }
}

/// Generate a synthetic series as described by the configuration.
///
/// The reference file is read before anything is written,
/// so that an unusable reference leaves the file system untouched.
/// The first failure aborts the whole run.
///
/// Returns the written instances in generation order.
pub fn generate_series(config: &SeriesConfig) -> Result<Vec<WrittenInstance>> {
    let reference = ReferenceMetadata::open(&config.reference).context(LoadReferenceSnafu)?;
    debug!("Loaded reference metadata from {}", config.reference.display());

    let profile = config.profile;
    ensure!(
        config.layout == SeriesLayout::PerSlice || profile.has_number_of_frames(),
        MultiFrameLayoutSnafu { profile }
    );

    let context = SeriesContext::new(
        reference,
        profile,
        config.study_instance_uid.as_str(),
        config.series_instance_uid.as_str(),
    )
    .context(CreateContextSnafu)?
    .series_number(config.series_number)
    .series_description(config.series_description.as_str())
    .high_bit(config.high_bit);

    if config.high_bit == HighBit::Legacy {
        debug!("High Bit set to Bits Stored for compatibility with existing fixtures");
    }

    let volume = SyntheticVolume::banded(config.shape, config.intensity).context(CreatePixelsSnafu)?;

    let written = match config.layout {
        SeriesLayout::PerSlice => {
            let mut written = Vec::new();
            for (pixels, instance_number) in volume.slices().zip(1..) {
                let pixels = pixels.context(CreatePixelsSnafu)?;
                written.push(write(&context, config, &pixels, instance_number)?);
            }
            written
        }
        SeriesLayout::MultiFrame => {
            let pixels = volume.into_multi_frame().context(CreatePixelsSnafu)?;
            vec![write(&context, config, &pixels, 1)?]
        }
    };

    info!(
        "Wrote {} {} instance(s) to {}",
        written.len(),
        profile.modality(),
        config.output_dir.display()
    );

    Ok(written)
}

fn write(
    context: &SeriesContext,
    config: &SeriesConfig,
    pixels: &pixel::PixelBuffer,
    instance_number: u32,
) -> Result<WrittenInstance> {
    let file_stem = format!("{}-{}", config.file_prefix, generate_uid());
    context
        .write_instance(pixels, instance_number, &config.output_dir, &file_stem)
        .context(WriteInstanceSnafu { instance_number })
}
