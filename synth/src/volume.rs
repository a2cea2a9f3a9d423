//! Deterministic synthetic volumes.
use crate::pixel::{
    check_dimension, AllocateSamplesSnafu, PixelBuffer, Result, VolumeTooLargeSnafu,
    ZeroDimensionSnafu,
};
use snafu::{ensure, OptionExt, ResultExt};

/// The dimensions of a synthetic volume.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct VolumeShape {
    pub rows: usize,
    pub columns: usize,
    pub slices: u32,
}

impl Default for VolumeShape {
    fn default() -> Self {
        VolumeShape {
            rows: 100,
            columns: 100,
            slices: 10,
        }
    }
}

impl VolumeShape {
    /// The number of voxels in a single slice,
    /// or `None` if it does not fit in a `usize`.
    pub fn slice_len(&self) -> Option<usize> {
        self.rows.checked_mul(self.columns)
    }

    /// The number of voxels in the whole volume,
    /// or `None` if it does not fit in a `usize`.
    pub fn voxel_count(&self) -> Option<usize> {
        self.slice_len()?.checked_mul(self.slices as usize)
    }

    /// The width of each column band in the banded pattern.
    pub fn band_width(&self) -> usize {
        self.columns / self.slices as usize
    }
}

/// An 8-bit volume, stored one slice after the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticVolume {
    shape: VolumeShape,
    slice_len: usize,
    data: Vec<u8>,
}

impl SyntheticVolume {
    /// Create a volume filled with zeros.
    ///
    /// The dimensions are validated before any sample memory is reserved:
    /// rows and columns must fit an image,
    /// and a volume which cannot be allocated is an error.
    pub fn zeros(shape: VolumeShape) -> Result<Self> {
        let VolumeShape {
            rows,
            columns,
            slices,
        } = shape;
        check_dimension("rows", rows)?;
        check_dimension("columns", columns)?;
        ensure!(slices > 0, ZeroDimensionSnafu { dimension: "slices" });

        let slice_len = shape.slice_len().context(VolumeTooLargeSnafu {
            rows,
            columns,
            slices,
        })?;
        let len = shape.voxel_count().context(VolumeTooLargeSnafu {
            rows,
            columns,
            slices,
        })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).context(AllocateSamplesSnafu { len })?;
        data.resize(len, 0);

        Ok(SyntheticVolume {
            shape,
            slice_len,
            data,
        })
    }

    /// Create the banded test pattern.
    ///
    /// Slice `i` has the columns `i * w .. (i + 1) * w` set to `intensity`,
    /// where `w` is the number of columns divided by the number of slices.
    /// Everything else is zero,
    /// so that each slice is visually distinct
    /// and their order can be verified at a glance.
    pub fn banded(shape: VolumeShape, intensity: u8) -> Result<Self> {
        let mut volume = Self::zeros(shape)?;
        let width = shape.band_width();
        for slice in 0..shape.slices {
            let start = slice as usize * width;
            let offset = slice as usize * volume.slice_len;
            for row in 0..shape.rows {
                let row_offset = offset + row * shape.columns;
                volume.data[row_offset + start..row_offset + start + width].fill(intensity);
            }
        }
        Ok(volume)
    }

    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    /// The voxel value at the given row, column and slice.
    pub fn get(&self, row: usize, column: usize, slice: u32) -> Option<u8> {
        if row >= self.shape.rows || column >= self.shape.columns || slice >= self.shape.slices {
            return None;
        }
        let index = slice as usize * self.slice_len + row * self.shape.columns + column;
        self.data.get(index).copied()
    }

    /// Extract one slice as a single frame pixel buffer.
    pub fn slice(&self, index: u32) -> Option<Result<PixelBuffer>> {
        if index >= self.shape.slices {
            return None;
        }
        let len = self.slice_len;
        let start = index as usize * len;
        let data = self.data[start..start + len].to_vec();
        Some(PixelBuffer::new(self.shape.rows, self.shape.columns, data))
    }

    /// Iterate over all slices in order, as single frame pixel buffers.
    pub fn slices(&self) -> impl Iterator<Item = Result<PixelBuffer>> + '_ {
        (0..self.shape.slices).filter_map(move |i| self.slice(i))
    }

    /// Turn the whole volume into a multi-frame pixel buffer,
    /// one frame per slice.
    pub fn into_multi_frame(self) -> Result<PixelBuffer> {
        PixelBuffer::multi_frame(
            self.shape.rows,
            self.shape.columns,
            self.shape.slices,
            self.data,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Error;

    #[test]
    fn banded_volume_has_one_band_per_slice() {
        let volume = SyntheticVolume::banded(VolumeShape::default(), 255).unwrap();

        for slice in 0..10 {
            for column in 0..100 {
                let expected = if column / 10 == slice as usize { 255 } else { 0 };
                for row in [0, 37, 99] {
                    assert_eq!(
                        volume.get(row, column, slice),
                        Some(expected),
                        "at row {}, column {}, slice {}",
                        row,
                        column,
                        slice
                    );
                }
            }
        }
        assert_eq!(volume.get(100, 0, 0), None);
        assert_eq!(volume.get(0, 0, 10), None);
    }

    #[test]
    fn narrow_volume_leaves_trailing_columns_blank() {
        let shape = VolumeShape {
            rows: 2,
            columns: 7,
            slices: 3,
        };
        let volume = SyntheticVolume::banded(shape, 9).unwrap();
        // band width is 2, column 6 is never painted
        let last = volume.slice(2).unwrap().unwrap();
        assert_eq!(last.data(), &[0, 0, 0, 0, 9, 9, 0, 0, 0, 0, 0, 9, 9, 0]);
    }

    #[test]
    fn slices_match_dimensions() {
        let volume = SyntheticVolume::banded(VolumeShape::default(), 255).unwrap();
        let slices: Vec<_> = volume.slices().collect::<Result<_>>().unwrap();
        assert_eq!(slices.len(), 10);
        for slice in &slices {
            assert_eq!(slice.rows(), 100);
            assert_eq!(slice.columns(), 100);
            assert_eq!(slice.frames(), 1);
            assert_eq!(slice.data().iter().filter(|&&v| v == 255).count(), 1000);
        }
        assert!(volume.slice(10).is_none());
    }

    #[test]
    fn multi_frame_keeps_slice_order() {
        let volume = SyntheticVolume::banded(VolumeShape::default(), 200).unwrap();
        let third = volume.slice(3).unwrap().unwrap();
        let pixels = volume.into_multi_frame().unwrap();
        assert_eq!(pixels.frames(), 10);
        assert_eq!(pixels.data().len(), 100 * 100 * 10);
        assert_eq!(pixels.frame(3), Some(third.data()));
    }

    #[test]
    fn empty_shape_is_rejected() {
        let shape = VolumeShape {
            rows: 10,
            columns: 10,
            slices: 0,
        };
        assert!(SyntheticVolume::zeros(shape).is_err());
    }

    #[test]
    fn oversized_volume_is_rejected() {
        let shape = VolumeShape {
            rows: 1 << 40,
            columns: 1 << 40,
            slices: 1,
        };
        assert_eq!(shape.slice_len(), None);
        assert!(matches!(
            SyntheticVolume::banded(shape, 255),
            Err(Error::DimensionTooLarge {
                dimension: "rows",
                ..
            })
        ));

        let shape = VolumeShape {
            rows: 10,
            columns: 70_000,
            slices: 1,
        };
        assert!(matches!(
            SyntheticVolume::zeros(shape),
            Err(Error::DimensionTooLarge {
                dimension: "columns",
                value: 70_000
            })
        ));
    }

    #[test]
    fn unallocatable_volume_is_rejected() {
        // 60000 x 60000 x u32::MAX samples is far beyond any address space
        let shape = VolumeShape {
            rows: 60_000,
            columns: 60_000,
            slices: u32::MAX,
        };
        assert!(matches!(
            SyntheticVolume::zeros(shape),
            Err(Error::VolumeTooLarge { .. } | Error::AllocateSamples { .. })
        ));
    }
}
