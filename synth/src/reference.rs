//! Metadata taken from a reference DICOM file.
//!
//! The reference file is read once per series.
//! Patient and study level attributes are kept as is
//! and copied verbatim into every synthesized instance.
use dicom_core::header::Header;
use dicom_core::value::ConvertValueError;
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::mem::{InMemDicomObject, InMemElement};
use dicom_object::{OpenFileOptions, ReadError};
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::path::{Path, PathBuf};

/// Attributes which must be present in the reference file,
/// copied verbatim to each new instance.
pub const COPIED_ATTRIBUTES: &[(Tag, &str)] = &[
    (tags::INSTANCE_CREATION_DATE, "InstanceCreationDate"),
    (tags::PATIENT_ID, "PatientID"),
    (tags::PATIENT_BIRTH_DATE, "PatientBirthDate"),
    (tags::PATIENT_SEX, "PatientSex"),
    (tags::STUDY_DESCRIPTION, "StudyDescription"),
    (tags::STUDY_DATE, "StudyDate"),
    (tags::STUDY_TIME, "StudyTime"),
    (tags::REFERRING_PHYSICIAN_NAME, "ReferringPhysicianName"),
    (tags::STUDY_ID, "StudyID"),
    (tags::ACCESSION_NUMBER, "AccessionNumber"),
    (tags::FRAME_OF_REFERENCE_UID, "FrameOfReferenceUID"),
    (tags::IMAGE_ORIENTATION_PATIENT, "ImageOrientationPatient"),
];

/// Attributes copied verbatim only if present.
pub const OPTIONAL_ATTRIBUTES: &[Tag] = &[tags::SPECIFIC_CHARACTER_SET];

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not read reference file '{}'", path.display()))]
    OpenReference {
        path: PathBuf,
        #[snafu(source(from(ReadError, Box::new)))]
        source: Box<ReadError>,
    },

    #[snafu(display("Reference data set is missing attribute {} {}", name, tag))]
    MissingAttribute { tag: Tag, name: &'static str },

    #[snafu(display("Invalid Image Position (Patient) in reference data set"))]
    ConvertImagePosition { source: ConvertValueError },

    #[snafu(display(
        "Image Position (Patient) in reference data set has {} values, expected 3",
        len
    ))]
    ImagePositionArity { len: usize },

    #[snafu(display(
        "Image Position (Patient) in reference data set is not finite: {:?}",
        position
    ))]
    NonFiniteImagePosition { position: [f64; 3] },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Patient and study metadata retained from a reference file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMetadata {
    elements: Vec<InMemElement>,
    image_position: Option<[f64; 3]>,
}

impl ReferenceMetadata {
    /// Read the metadata of the DICOM file at the given path.
    ///
    /// Reading stops before _Pixel Data_.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let obj = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .context(OpenReferenceSnafu { path })?;
        Self::from_object(&obj)
    }

    /// Collect the metadata from a DICOM data set.
    pub fn from_object(obj: &InMemDicomObject) -> Result<Self> {
        let mut elements = Vec::with_capacity(COPIED_ATTRIBUTES.len() + OPTIONAL_ATTRIBUTES.len());

        for &tag in OPTIONAL_ATTRIBUTES {
            if let Ok(e) = obj.element(tag) {
                elements.push(e.clone());
            }
        }

        for &(tag, name) in COPIED_ATTRIBUTES {
            let e = obj.element(tag).ok().context(MissingAttributeSnafu { tag, name })?;
            elements.push(e.clone());
        }

        let image_position = match obj.element(tags::IMAGE_POSITION_PATIENT) {
            Ok(e) => Some(parse_position(e)?),
            Err(_) => None,
        };

        Ok(ReferenceMetadata {
            elements,
            image_position,
        })
    }

    /// Iterate over the elements to copy into new instances.
    pub fn elements(&self) -> impl Iterator<Item = &InMemElement> {
        self.elements.iter()
    }

    /// Retrieve a retained element by tag.
    pub fn get(&self, tag: Tag) -> Option<&InMemElement> {
        self.elements.iter().find(|e| e.tag() == tag)
    }

    /// The _Image Position (Patient)_ of the reference file, if present.
    pub fn image_position(&self) -> Option<[f64; 3]> {
        self.image_position
    }
}

fn parse_position(e: &InMemElement) -> Result<[f64; 3]> {
    let values = e.to_multi_float64().context(ConvertImagePositionSnafu)?;
    let position = match values.as_slice() {
        &[x, y, z] => [x, y, z],
        _ => return ImagePositionAritySnafu { len: values.len() }.fail(),
    };
    ensure!(
        position.iter().all(|v| v.is_finite()),
        NonFiniteImagePositionSnafu { position }
    );
    Ok(position)
}
