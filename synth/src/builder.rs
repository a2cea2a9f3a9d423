//! Assembly of synthetic DICOM instances.
//!
//! A [`SeriesContext`] holds everything shared by the instances of a series:
//! the reference metadata, the modality profile and the series identifiers.
//! Each call to [`SeriesContext::build_instance`]
//! creates a new DICOM object with a fresh SOP Instance UID,
//! with these attributes:
//!
//! - patient and study attributes copied verbatim from the reference;
//! - _Station Name_ and _Patient Name_ set to the render name;
//! - study and series identifiers from the context;
//! - _Instance Number_ and a synthesized _Image Position (Patient)_;
//! - the attributes of the [_Image Pixel_ module][1]
//!   for an 8-bit MONOCHROME2 image.
//!
//! The file meta group declares Explicit VR Little Endian.
//!
//! [1]: https://dicom.nema.org/medical/dicom/current/output/chtml/part03/sect_C.7.6.3.html
use crate::pixel::PixelBuffer;
use crate::profile::{HighBit, ModalityProfile};
use crate::reference::ReferenceMetadata;
use crate::uid::generate_uid;
use dicom_core::value::PrimitiveValue;
use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{
    DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject, WithMetaError, WriteError,
};
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bits allocated and stored per sample.
pub const BITS_PER_SAMPLE: u16 = 8;

/// The default _Series Number_.
pub const DEFAULT_SERIES_NUMBER: i32 = 999;

/// The default _Series Description_.
pub const DEFAULT_SERIES_DESCRIPTION: &str = "synthetic_dicom";

/// The default value of _Station Name_ and _Patient Name_.
pub const DEFAULT_RENDER_NAME: &str = "test-render";

/// The maximum length of a decimal string value.
const DS_MAX_LEN: usize = 16;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Instance numbers start at 1"))]
    ZeroInstanceNumber,

    #[snafu(display(
        "Profile `{}` does not support multi-frame images ({} frames given)",
        profile,
        frames
    ))]
    MultiFrameUnsupported {
        profile: ModalityProfile,
        frames: u32,
    },

    #[snafu(display(
        "Profile `{}` requires Image Position (Patient) in the reference data set",
        profile
    ))]
    MissingReferencePosition { profile: ModalityProfile },

    #[snafu(display("Could not create file meta group"))]
    CreateMeta {
        #[snafu(source(from(WithMetaError, Box::new)))]
        source: Box<WithMetaError>,
    },

    #[snafu(display("Could not create output directory '{}'", path.display()))]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Could not write DICOM file '{}'", path.display()))]
    WriteFile {
        path: PathBuf,
        #[snafu(source(from(WriteError, Box::new)))]
        source: Box<WriteError>,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Read-only state shared by all instances of a synthetic series.
#[derive(Debug, Clone)]
pub struct SeriesContext {
    reference: ReferenceMetadata,
    profile: ModalityProfile,
    study_instance_uid: String,
    series_instance_uid: String,
    series_number: i32,
    series_description: String,
    render_name: String,
    high_bit: HighBit,
}

impl SeriesContext {
    /// Create a series context.
    ///
    /// Fails if the profile synthesizes positions from the reference file
    /// and the reference metadata has none.
    pub fn new(
        reference: ReferenceMetadata,
        profile: ModalityProfile,
        study_instance_uid: impl Into<String>,
        series_instance_uid: impl Into<String>,
    ) -> Result<Self> {
        ensure!(
            !profile.position_rule().requires_reference() || reference.image_position().is_some(),
            MissingReferencePositionSnafu { profile }
        );

        Ok(SeriesContext {
            reference,
            profile,
            study_instance_uid: study_instance_uid.into(),
            series_instance_uid: series_instance_uid.into(),
            series_number: DEFAULT_SERIES_NUMBER,
            series_description: DEFAULT_SERIES_DESCRIPTION.to_string(),
            render_name: DEFAULT_RENDER_NAME.to_string(),
            high_bit: HighBit::default(),
        })
    }

    /// Define the _Series Number_.
    pub fn series_number(mut self, series_number: i32) -> Self {
        self.series_number = series_number;
        self
    }

    /// Define the _Series Description_.
    pub fn series_description(mut self, description: impl Into<String>) -> Self {
        self.series_description = description.into();
        self
    }

    /// Define the name used for _Station Name_ and _Patient Name_.
    pub fn render_name(mut self, name: impl Into<String>) -> Self {
        self.render_name = name.into();
        self
    }

    /// Define the rule for _High Bit_.
    pub fn high_bit(mut self, high_bit: HighBit) -> Self {
        self.high_bit = high_bit;
        self
    }

    pub fn reference(&self) -> &ReferenceMetadata {
        &self.reference
    }

    pub fn profile(&self) -> ModalityProfile {
        self.profile
    }

    pub fn study_instance_uid(&self) -> &str {
        &self.study_instance_uid
    }

    pub fn series_instance_uid(&self) -> &str {
        &self.series_instance_uid
    }

    /// Assemble a new DICOM instance in memory.
    pub fn build_instance(
        &self,
        pixels: &PixelBuffer,
        instance_number: u32,
    ) -> Result<SyntheticInstance> {
        ensure!(instance_number > 0, ZeroInstanceNumberSnafu);
        let profile = self.profile;
        ensure!(
            pixels.frames() == 1 || profile.has_number_of_frames(),
            MultiFrameUnsupportedSnafu {
                profile,
                frames: pixels.frames(),
            }
        );
        let position = profile
            .position_rule()
            .position(self.reference.image_position(), instance_number)
            .context(MissingReferencePositionSnafu { profile })?;

        let sop_instance_uid = generate_uid();
        let mut obj = InMemDicomObject::new_empty();

        for elem in self.reference.elements() {
            obj.put(elem.clone());
        }

        put(&mut obj, tags::STATION_NAME, VR::SH, self.render_name.as_str());
        put(&mut obj, tags::PATIENT_NAME, VR::PN, self.render_name.as_str());
        put(
            &mut obj,
            tags::STUDY_INSTANCE_UID,
            VR::UI,
            self.study_instance_uid.as_str(),
        );
        put(
            &mut obj,
            tags::SERIES_INSTANCE_UID,
            VR::UI,
            self.series_instance_uid.as_str(),
        );
        put(
            &mut obj,
            tags::SERIES_DESCRIPTION,
            VR::LO,
            self.series_description.as_str(),
        );
        put(
            &mut obj,
            tags::SERIES_NUMBER,
            VR::IS,
            self.series_number.to_string(),
        );
        put(&mut obj, tags::MODALITY, VR::CS, profile.modality());
        if let Some(conversion_type) = profile.conversion_type() {
            put(&mut obj, tags::CONVERSION_TYPE, VR::CS, conversion_type);
        }
        put(&mut obj, tags::SOP_CLASS_UID, VR::UI, profile.sop_class_uid());
        put(
            &mut obj,
            tags::SOP_INSTANCE_UID,
            VR::UI,
            sop_instance_uid.as_str(),
        );
        put(
            &mut obj,
            tags::INSTANCE_NUMBER,
            VR::IS,
            instance_number.to_string(),
        );
        put(
            &mut obj,
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            decimal_strings(&position),
        );

        // Image Pixel module
        put(&mut obj, tags::SAMPLES_PER_PIXEL, VR::US, 1_u16);
        put(&mut obj, tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
        put(&mut obj, tags::ROWS, VR::US, pixels.rows());
        put(&mut obj, tags::COLUMNS, VR::US, pixels.columns());
        put(&mut obj, tags::PIXEL_SPACING, VR::DS, decimal_strings(&[1., 1.]));
        put(&mut obj, tags::BITS_ALLOCATED, VR::US, BITS_PER_SAMPLE);
        put(&mut obj, tags::BITS_STORED, VR::US, BITS_PER_SAMPLE);
        put(
            &mut obj,
            tags::HIGH_BIT,
            VR::US,
            self.high_bit.value(BITS_PER_SAMPLE),
        );
        put(&mut obj, tags::PIXEL_REPRESENTATION, VR::US, 0_u16);
        if profile.has_number_of_frames() {
            put(
                &mut obj,
                tags::NUMBER_OF_FRAMES,
                VR::IS,
                pixels.frames().to_string(),
            );
        }

        let mut data = pixels.data().to_vec();
        // values of OB must have an even length
        if data.len() % 2 == 1 {
            data.push(0);
        }
        put(&mut obj, tags::PIXEL_DATA, VR::OB, data);

        let object = obj
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(profile.sop_class_uid())
                    .media_storage_sop_instance_uid(sop_instance_uid.as_str()),
            )
            .context(CreateMetaSnafu)?;

        Ok(SyntheticInstance {
            sop_instance_uid,
            instance_number,
            object,
        })
    }

    /// Assemble a new DICOM instance
    /// and save it as `<file_stem>.dcm` in the given directory.
    ///
    /// The directory is created if it does not exist yet.
    pub fn write_instance(
        &self,
        pixels: &PixelBuffer,
        instance_number: u32,
        output_dir: impl AsRef<Path>,
        file_stem: &str,
    ) -> Result<WrittenInstance> {
        let instance = self.build_instance(pixels, instance_number)?;

        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir).context(CreateDirectorySnafu { path: output_dir })?;

        let path = output_dir.join(format!("{}.dcm", file_stem));
        instance.write_to_file(&path)?;

        debug!(
            "Instance #{} ({}) saved to {}",
            instance_number,
            instance.sop_instance_uid(),
            path.display()
        );

        Ok(WrittenInstance {
            path,
            sop_instance_uid: instance.sop_instance_uid,
            instance_number,
        })
    }
}

/// A DICOM instance assembled in memory, ready to be written.
#[derive(Debug, Clone)]
pub struct SyntheticInstance {
    sop_instance_uid: String,
    instance_number: u32,
    object: DefaultDicomObject,
}

impl SyntheticInstance {
    pub fn sop_instance_uid(&self) -> &str {
        &self.sop_instance_uid
    }

    pub fn instance_number(&self) -> u32 {
        self.instance_number
    }

    /// The DICOM file object, including its file meta group.
    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }

    pub fn into_object(self) -> DefaultDicomObject {
        self.object
    }

    /// Save the instance to a DICOM file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.object
            .write_to_file(path)
            .context(WriteFileSnafu { path })
    }
}

/// The outcome of writing a synthetic instance to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenInstance {
    pub path: PathBuf,
    pub sop_instance_uid: String,
    pub instance_number: u32,
}

fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: impl Into<PrimitiveValue>) {
    obj.put(DataElement::new(tag, vr, value.into()));
}

/// Encode numbers as a multi-valued decimal string.
fn decimal_strings(values: &[f64]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().map(|&v| format_ds(v)).collect())
}

/// Format a number as a decimal string of at most 16 characters.
///
/// Falls back to the shortest fixed-point or scientific notation,
/// whichever keeps the value closer.
fn format_ds(value: f64) -> String {
    let plain = value.to_string();
    if plain.len() <= DS_MAX_LEN {
        return plain;
    }

    let fixed = (0..DS_MAX_LEN).rev().find_map(|precision| {
        let fixed = format!("{:.*}", precision, value);
        let fixed = if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.')
        } else {
            fixed.as_str()
        };
        (fixed.len() <= DS_MAX_LEN).then(|| fixed.to_string())
    });
    let exponent = std::iter::once(format!("{:e}", value))
        .chain((0..DS_MAX_LEN).rev().map(|precision| {
            let exponent = format!("{:.*e}", precision, value);
            match exponent.split_once('e') {
                Some((mantissa, power)) if mantissa.contains('.') => format!(
                    "{}e{}",
                    mantissa.trim_end_matches('0').trim_end_matches('.'),
                    power
                ),
                _ => exponent,
            }
        }))
        .find(|s| s.len() <= DS_MAX_LEN);

    let error = |s: &String| {
        s.parse::<f64>()
            .map(|parsed| (parsed - value).abs())
            .unwrap_or(f64::INFINITY)
    };
    match (fixed, exponent) {
        (Some(fixed), Some(exponent)) if error(&exponent) < error(&fixed) => exponent,
        (Some(fixed), _) => fixed,
        (None, Some(exponent)) => exponent,
        (None, None) => format!("{:.8e}", value),
    }
}
