use crate::foundation::error::{FxError, FxResult};

/// Largest value a 16-bit channel can hold.
pub const SAMPLE_MAX: u16 = u16::MAX;

/// Straight (non-premultiplied) RGBA with 16 bits per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Rgba16 {
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black. Out-of-extent samples read as this value.
    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub const fn opaque(r: u16, g: u16, b: u16) -> Self {
        Self::new(r, g, b, SAMPLE_MAX)
    }

    pub fn to_array(self) -> [u16; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Pixel extent `[0, width) x [0, height)`. Both sides are non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> FxResult<Self> {
        if width == 0 || height == 0 {
            return Err(FxError::validation(format!(
                "raster extent must be non-empty (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn contains(self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Row-major index of an in-extent pixel.
    pub fn index(self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn full_rows(self) -> RowRange {
        RowRange {
            start: 0,
            end: self.height,
        }
    }
}

/// Half-open band of rows `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: u32,
    pub end: u32, // exclusive
}

impl RowRange {
    pub fn new(start: u32, end: u32) -> FxResult<Self> {
        if start > end {
            return Err(FxError::validation(format!(
                "row range start must be <= end (got {start}..{end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len_rows(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, y: u32) -> bool {
        self.start <= y && y < self.end
    }

    /// Checks `0 <= start < end <= extent.height`.
    pub fn validate_within(self, extent: Extent) -> FxResult<()> {
        if self.is_empty() {
            return Err(FxError::validation(format!(
                "row range {}..{} is empty",
                self.start, self.end
            )));
        }
        if self.end > extent.height {
            return Err(FxError::validation(format!(
                "row range {}..{} exceeds raster height {}",
                self.start, self.end, extent.height
            )));
        }
        Ok(())
    }
}
