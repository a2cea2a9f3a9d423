//! Validated 8-bit grayscale pixel buffers.
use snafu::{ensure, Snafu};
use std::collections::TryReserveError;

/// An error which may occur when assembling a pixel buffer.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Image dimension `{}` must not be zero", dimension))]
    ZeroDimension { dimension: &'static str },

    #[snafu(display(
        "Image dimension `{}` is too large ({} > {})",
        dimension,
        value,
        u16::MAX
    ))]
    DimensionTooLarge {
        dimension: &'static str,
        value: usize,
    },

    #[snafu(display("Volume of {}x{}x{} samples is too large", rows, columns, slices))]
    VolumeTooLarge {
        rows: usize,
        columns: usize,
        slices: u32,
    },

    #[snafu(display("Could not allocate {} bytes of sample data", len))]
    AllocateSamples {
        len: usize,
        source: TryReserveError,
    },

    #[snafu(display(
        "Pixel data length mismatch: {}x{}x{} requires {} bytes, but got {}",
        rows,
        columns,
        frames,
        expected,
        actual
    ))]
    LengthMismatch {
        rows: u16,
        columns: u16,
        frames: u32,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A row-major, single sample, 8 bits per sample image,
/// with one or more frames laid out one after the other.
///
/// The length of the sample data
/// always matches the declared dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    rows: u16,
    columns: u16,
    frames: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a single frame pixel buffer.
    pub fn new(rows: usize, columns: usize, data: Vec<u8>) -> Result<Self> {
        Self::multi_frame(rows, columns, 1, data)
    }

    /// Create a pixel buffer with the given number of frames.
    pub fn multi_frame(rows: usize, columns: usize, frames: u32, data: Vec<u8>) -> Result<Self> {
        let rows = check_dimension("rows", rows)?;
        let columns = check_dimension("columns", columns)?;
        ensure!(frames > 0, ZeroDimensionSnafu { dimension: "frames" });

        let expected = rows as usize * columns as usize * frames as usize;
        ensure!(
            data.len() == expected,
            LengthMismatchSnafu {
                rows,
                columns,
                frames,
                expected,
                actual: data.len(),
            }
        );

        Ok(PixelBuffer {
            rows,
            columns,
            frames,
            data,
        })
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// The number of bytes in a single frame.
    pub fn frame_len(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Retrieve the samples of the frame at the given index (0-based).
    pub fn frame(&self, index: u32) -> Option<&[u8]> {
        if index >= self.frames {
            return None;
        }
        let len = self.frame_len();
        let start = index as usize * len;
        self.data.get(start..start + len)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn check_dimension(dimension: &'static str, value: usize) -> Result<u16> {
    ensure!(value > 0, ZeroDimensionSnafu { dimension });
    u16::try_from(value).map_err(|_| Error::DimensionTooLarge { dimension, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_length() {
        let pixels = PixelBuffer::new(2, 3, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(pixels.rows(), 2);
        assert_eq!(pixels.columns(), 3);
        assert_eq!(pixels.frames(), 1);
        assert_eq!(pixels.frame(0), Some(&[0, 1, 2, 3, 4, 5][..]));
        assert_eq!(pixels.frame(1), None);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = PixelBuffer::new(4, 4, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 16,
                actual: 15,
                ..
            }
        ));

        let err = PixelBuffer::multi_frame(4, 4, 2, vec![0; 16]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 32,
                actual: 16,
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 4, vec![]),
            Err(Error::ZeroDimension { dimension: "rows" })
        ));
        assert!(matches!(
            PixelBuffer::multi_frame(4, 4, 0, vec![]),
            Err(Error::ZeroDimension { dimension: "frames" })
        ));
        assert!(matches!(
            PixelBuffer::new(1, 70_000, vec![0; 70_000]),
            Err(Error::DimensionTooLarge {
                dimension: "columns",
                value: 70_000
            })
        ));
    }

    #[test]
    fn frames_are_contiguous() {
        let data: Vec<u8> = (0..12).collect();
        let pixels = PixelBuffer::multi_frame(2, 2, 3, data).unwrap();
        assert_eq!(pixels.frame_len(), 4);
        assert_eq!(pixels.frame(1), Some(&[4, 5, 6, 7][..]));
        assert_eq!(pixels.frame(2), Some(&[8, 9, 10, 11][..]));
    }
}
