//! Modality profiles and the per-profile rules of dataset assembly.
use dicom_dictionary_std::uids;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The kind of image object to synthesize.
///
/// All modality specific choices made by the dataset builder
/// are derived from this value.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ModalityProfile {
    /// Single frame MR Image Storage objects.
    ///
    /// This is the default profile.
    #[default]
    Mr,
    /// Multi-frame Grayscale Byte Secondary Capture Image Storage objects.
    SecondaryCapture,
}

impl ModalityProfile {
    /// The SOP class UID of the objects created with this profile.
    pub fn sop_class_uid(self) -> &'static str {
        match self {
            ModalityProfile::Mr => uids::MR_IMAGE_STORAGE,
            ModalityProfile::SecondaryCapture => {
                uids::MULTI_FRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE_IMAGE_STORAGE
            }
        }
    }

    /// The value of the _Modality_ attribute.
    pub fn modality(self) -> &'static str {
        match self {
            ModalityProfile::Mr => "MR",
            ModalityProfile::SecondaryCapture => "OT",
        }
    }

    /// The value of the _Conversion Type_ attribute, if applicable.
    pub fn conversion_type(self) -> Option<&'static str> {
        match self {
            ModalityProfile::Mr => None,
            // workstation
            ModalityProfile::SecondaryCapture => Some("WSD"),
        }
    }

    /// Whether objects of this profile declare _Number of Frames_,
    /// and may therefore hold more than one frame.
    pub fn has_number_of_frames(self) -> bool {
        matches!(self, ModalityProfile::SecondaryCapture)
    }

    /// How _Image Position (Patient)_ is synthesized for this profile.
    pub fn position_rule(self) -> PositionRule {
        match self {
            ModalityProfile::Mr => PositionRule::FromInstanceNumber,
            ModalityProfile::SecondaryCapture => PositionRule::OffsetReference,
        }
    }
}

impl Display for ModalityProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ModalityProfile::Mr => f.write_str("mr"),
            ModalityProfile::SecondaryCapture => f.write_str("sc"),
        }
    }
}

impl FromStr for ModalityProfile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mr" | "MR" => Ok(ModalityProfile::Mr),
            "sc" | "SC" | "secondary-capture" => Ok(ModalityProfile::SecondaryCapture),
            _ => Err(ParseProfileError),
        }
    }
}

/// The error raised when providing an invalid modality profile.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct ParseProfileError;

impl Display for ParseProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("invalid modality profile (expected `mr` or `sc`)")
    }
}

impl std::error::Error for ParseProfileError {}

/// Rule for synthesizing _Image Position (Patient)_.
///
/// The positions produced here are not meant to be spatially meaningful.
/// They only give slices a stable order
/// in viewers which sort images by position.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum PositionRule {
    /// `[0, 0, n - 1]`, regardless of the reference position.
    FromInstanceNumber,
    /// The reference position, with `n` added to the z component.
    OffsetReference,
}

impl PositionRule {
    /// Whether the rule needs the reference file's image position.
    pub fn requires_reference(self) -> bool {
        matches!(self, PositionRule::OffsetReference)
    }

    /// Compute the image position of the instance with the given number.
    ///
    /// Returns `None` if the rule requires a reference position
    /// and none was provided.
    pub fn position(self, reference: Option<[f64; 3]>, instance_number: u32) -> Option<[f64; 3]> {
        let n = f64::from(instance_number);
        match self {
            PositionRule::FromInstanceNumber => Some([0., 0., n - 1.]),
            PositionRule::OffsetReference => reference.map(|[x, y, z]| [x, y, z + n]),
        }
    }
}

/// Rule for the value of _High Bit_ in 8-bit images.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum HighBit {
    /// High Bit equal to Bits Stored (8),
    /// as found in previously generated fixtures.
    ///
    /// This is the default, so that consumers of existing fixtures
    /// see the same attribute values.
    #[default]
    Legacy,
    /// High Bit equal to Bits Stored minus one (7).
    Conventional,
}

impl HighBit {
    /// The value of _High Bit_ for the given number of bits stored.
    pub fn value(self, bits_stored: u16) -> u16 {
        match self {
            HighBit::Legacy => bits_stored,
            HighBit::Conventional => bits_stored.saturating_sub(1),
        }
    }
}
