//! Synthetic DICOM test series
//!
//! This library creates DICOM image files from raw 8-bit pixel data,
//! taking patient and study metadata from an existing reference file.
//! The outcome is a deterministic series of test fixtures,
//! such as for checking slice ordering and windowing in image viewers.
//!
//! # Examples
//!
//! Generate the default banded series
//! (ten 100x100 MR slices in the `data` directory):
//!
//! ```no_run
//! use dicom_synth::{generate_series, SeriesConfig};
//!
//! let written = generate_series(&SeriesConfig::new("reference.dcm"))?;
//! for instance in &written {
//!     println!("#{}: {}", instance.instance_number, instance.path.display());
//! }
//! # Result::<(), Box<dyn std::error::Error>>::Ok(())
//! ```
//!
//! Instances can also be built one at a time
//! through a [`SeriesContext`]:
//!
//! ```no_run
//! use dicom_synth::{ModalityProfile, PixelBuffer, ReferenceMetadata, SeriesContext};
//!
//! let reference = ReferenceMetadata::open("reference.dcm")?;
//! let context = SeriesContext::new(reference, ModalityProfile::Mr, "1.2.3", "1.2.3.4")?;
//! let pixels = PixelBuffer::new(64, 64, vec![128; 64 * 64])?;
//! context.write_instance(&pixels, 1, "out", "slice-0001")?;
//! # Result::<(), Box<dyn std::error::Error>>::Ok(())
//! ```
pub mod builder;
pub mod pixel;
pub mod profile;
pub mod reference;
pub mod series;
pub mod uid;
pub mod volume;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{SeriesContext, SyntheticInstance, WrittenInstance};
pub use pixel::PixelBuffer;
pub use profile::{HighBit, ModalityProfile, PositionRule};
pub use reference::ReferenceMetadata;
pub use series::{generate_series, SeriesConfig, SeriesLayout};
pub use uid::generate_uid;
pub use volume::{SyntheticVolume, VolumeShape};
