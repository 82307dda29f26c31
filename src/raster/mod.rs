//! In-memory RGBA16 raster with a read-only snapshot and a write-only destination.
//!
//! A convolution pass reads neighbours exclusively from the snapshot (`source`) and writes
//! exclusively into `destination`, so no pass can observe its own writes. Between two effects
//! the caller must [`Raster::commit`] the destination into the snapshot; chained effects
//! otherwise keep re-reading the unfiltered image.

mod io;

pub use io::{load_raster, save_raster};

use crate::foundation::{
    core::{Extent, RowRange, Rgba16},
    error::{FxError, FxResult},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    extent: Extent,
    source: Vec<Rgba16>,
    destination: Vec<Rgba16>,
}

impl Raster {
    /// Creates a raster filled with transparent black.
    pub fn new(width: u32, height: u32) -> FxResult<Self> {
        let extent = Extent::new(width, height)?;
        let source = vec![Rgba16::transparent(); extent.pixel_count()];
        Ok(Self {
            extent,
            destination: source.clone(),
            source,
        })
    }

    /// Wraps row-major pixels. The destination starts as a copy of the source.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba16>) -> FxResult<Self> {
        let extent = Extent::new(width, height)?;
        if pixels.len() != extent.pixel_count() {
            return Err(FxError::validation(format!(
                "raster expects {} pixels for {width}x{height}, got {}",
                extent.pixel_count(),
                pixels.len()
            )));
        }
        Ok(Self {
            extent,
            destination: pixels.clone(),
            source: pixels,
        })
    }

    /// Creates a raster where every pixel is `px`.
    pub fn filled(width: u32, height: u32, px: Rgba16) -> FxResult<Self> {
        let extent = Extent::new(width, height)?;
        Self::from_pixels(width, height, vec![px; extent.pixel_count()])
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> FxResult<Self> {
        load_raster(path.as_ref())
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> FxResult<()> {
        save_raster(self, path.as_ref())
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// `(width, height)`.
    pub fn bounds(&self) -> (u32, u32) {
        (self.extent.width, self.extent.height)
    }

    /// Reads the snapshot. Coordinates outside the extent read as transparent black.
    pub fn sample(&self, x: i64, y: i64) -> Rgba16 {
        sample_zero_padded(self.extent, &self.source, x, y)
    }

    /// Reads the destination view.
    pub fn output_sample(&self, x: u32, y: u32) -> Option<Rgba16> {
        if !self.extent.contains(i64::from(x), i64::from(y)) {
            return None;
        }
        Some(self.destination[self.extent.index(x, y)])
    }

    /// Writes one destination pixel.
    pub fn set_sample(&mut self, x: u32, y: u32, px: Rgba16) -> FxResult<()> {
        if !self.extent.contains(i64::from(x), i64::from(y)) {
            return Err(FxError::validation(format!(
                "pixel ({x},{y}) outside {}x{} raster",
                self.extent.width, self.extent.height
            )));
        }
        let idx = self.extent.index(x, y);
        self.destination[idx] = px;
        Ok(())
    }

    pub fn source_pixels(&self) -> &[Rgba16] {
        &self.source
    }

    pub fn destination_pixels(&self) -> &[Rgba16] {
        &self.destination
    }

    /// Publishes the destination as the snapshot the next pass reads from.
    pub fn commit(&mut self) {
        self.source.copy_from_slice(&self.destination);
    }

    /// Whether the snapshot already reflects every destination write.
    pub fn is_committed(&self) -> bool {
        self.source == self.destination
    }

    /// Splits the destination into disjoint row bands, each paired with its range.
    ///
    /// `bands` must be sorted, non-overlapping and inside the extent. Rows between bands are
    /// not handed out.
    pub fn band_views(
        &mut self,
        bands: &[RowRange],
    ) -> FxResult<(&[Rgba16], Vec<(RowRange, &mut [Rgba16])>)> {
        let extent = self.extent;
        let width = extent.width as usize;
        let mut out = Vec::with_capacity(bands.len());
        let mut rest: &mut [Rgba16] = &mut self.destination;
        let mut cursor = 0u32;

        for &band in bands {
            if band.start < cursor || band.start > band.end {
                return Err(FxError::validation(format!(
                    "row band {}..{} overlaps a previous band",
                    band.start, band.end
                )));
            }
            if band.end > extent.height {
                return Err(FxError::validation(format!(
                    "row band {}..{} exceeds raster height {}",
                    band.start, band.end, extent.height
                )));
            }
            let skip = (band.start - cursor) as usize * width;
            let take = band.len_rows() as usize * width;
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (head, tail) = tail.split_at_mut(take);
            out.push((band, head));
            rest = tail;
            cursor = band.end;
        }

        Ok((&self.source, out))
    }
}

pub(crate) fn sample_zero_padded(extent: Extent, pixels: &[Rgba16], x: i64, y: i64) -> Rgba16 {
    if !extent.contains(x, y) {
        return Rgba16::transparent();
    }
    pixels[extent.index(x as u32, y as u32)]
}
