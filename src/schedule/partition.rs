use crate::foundation::{
    core::RowRange,
    error::{FxError, FxResult},
};

/// Splits `[0, height)` into `bands` contiguous ranges of `height / bands` rows; the last
/// range absorbs the remainder.
///
/// Exactly `bands` ranges are returned. When `height < bands` all but the last are empty.
pub fn partition_rows(height: u32, bands: usize) -> FxResult<Vec<RowRange>> {
    if bands == 0 {
        return Err(FxError::validation("row partition needs at least one band"));
    }
    let per_band = (u64::from(height) / bands as u64) as u32;

    let mut out = Vec::with_capacity(bands);
    for i in 0..bands {
        let start = (i as u64 * u64::from(per_band)) as u32;
        let end = if i + 1 == bands {
            height
        } else {
            start + per_band
        };
        out.push(RowRange::new(start, end)?);
    }
    Ok(out)
}
