use crate::{
    effects::kernel::{Effect, EffectOp, Kernel, clamp_sample},
    foundation::{
        core::{Extent, RowRange, Rgba16, SAMPLE_MAX},
        error::{FxError, FxResult},
    },
    raster::{Raster, sample_zero_padded},
};

/// Convolves rows `rows` of `raster` with `kernel`.
///
/// Reads come from the snapshot, writes go to the destination rows of `rows` only. The
/// snapshot is left untouched; call [`Raster::commit`] before the next effect.
pub fn convolve(raster: &mut Raster, kernel: &Kernel, rows: RowRange) -> FxResult<()> {
    run_on_raster(raster, rows, |extent, source, band, out| {
        convolve_rows(extent, source, kernel, band, out)
    })
}

/// Luminance-averaging grayscale over `rows`. Alpha is carried through.
pub fn grayscale(raster: &mut Raster, rows: RowRange) -> FxResult<()> {
    run_on_raster(raster, rows, grayscale_rows)
}

/// Applies one catalog effect to `rows` of the raster without committing.
pub fn apply_effect(raster: &mut Raster, effect: Effect, rows: RowRange) -> FxResult<()> {
    match effect.op() {
        EffectOp::Convolve(k) => convolve(raster, k, rows),
        EffectOp::Grayscale => grayscale(raster, rows),
    }
}

/// Computes `effect` for `rows` from `source` into `out`, which holds exactly those rows.
///
/// This is the unit of work handed to a row-band task.
pub fn apply_effect_rows(
    effect: Effect,
    extent: Extent,
    source: &[Rgba16],
    rows: RowRange,
    out: &mut [Rgba16],
) -> FxResult<()> {
    check_band(extent, source, rows, out)?;
    match effect.op() {
        EffectOp::Convolve(k) => convolve_rows(extent, source, k, rows, out),
        EffectOp::Grayscale => grayscale_rows(extent, source, rows, out),
    }
    Ok(())
}

fn run_on_raster(
    raster: &mut Raster,
    rows: RowRange,
    pass: impl FnOnce(Extent, &[Rgba16], RowRange, &mut [Rgba16]),
) -> FxResult<()> {
    let extent = raster.extent();
    rows.validate_within(extent)?;

    let (source, mut bands) = raster.band_views(&[rows])?;
    let Some((band, out)) = bands.pop() else {
        return Err(FxError::validation("row band split produced no band"));
    };
    check_band(extent, source, band, out)?;
    pass(extent, source, band, out);
    Ok(())
}

fn check_band(extent: Extent, source: &[Rgba16], rows: RowRange, out: &[Rgba16]) -> FxResult<()> {
    rows.validate_within(extent)?;
    if source.len() != extent.pixel_count() {
        return Err(FxError::validation(format!(
            "source holds {} pixels, extent needs {}",
            source.len(),
            extent.pixel_count()
        )));
    }
    let expected = rows.len_rows() as usize * extent.width as usize;
    if out.len() != expected {
        return Err(FxError::validation(format!(
            "band output holds {} pixels, rows {}..{} need {expected}",
            out.len(),
            rows.start,
            rows.end
        )));
    }
    Ok(())
}

fn convolve_rows(
    extent: Extent,
    source: &[Rgba16],
    kernel: &Kernel,
    rows: RowRange,
    out: &mut [Rgba16],
) {
    let width = extent.width as usize;
    for (row, y) in out.chunks_exact_mut(width).zip(rows.start..rows.end) {
        let y = i64::from(y);
        for (x, dst) in row.iter_mut().enumerate() {
            let x = x as i64;
            let mut acc = [0.0f64; 3];
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let px = sample_zero_padded(extent, source, x + dx, y + dy);
                    let k = kernel.at(dx, dy);
                    acc[0] += f64::from(px.r) * k;
                    acc[1] += f64::from(px.g) * k;
                    acc[2] += f64::from(px.b) * k;
                }
            }
            *dst = Rgba16::new(
                clamp_sample(acc[0]),
                clamp_sample(acc[1]),
                clamp_sample(acc[2]),
                SAMPLE_MAX,
            );
        }
    }
}

fn grayscale_rows(extent: Extent, source: &[Rgba16], rows: RowRange, out: &mut [Rgba16]) {
    let width = extent.width as usize;
    let start = rows.start as usize * width;
    let src_rows = &source[start..start + out.len()];
    for (dst, px) in out.iter_mut().zip(src_rows) {
        let sum = u32::from(px.r) + u32::from(px.g) + u32::from(px.b);
        let grey = clamp_sample(f64::from(sum) / 3.0);
        *dst = Rgba16::new(grey, grey, grey, px.a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::kernel::{BOX_BLUR, EDGE_DETECT, SHARPEN};

    fn full(r: &Raster) -> RowRange {
        r.extent().full_rows()
    }

    fn rgb(px: Rgba16) -> [u16; 3] {
        [px.r, px.g, px.b]
    }

    #[test]
    fn grayscale_keeps_neutral_pixels_and_alpha() {
        let pixels = vec![
            Rgba16::new(100, 100, 100, 7),
            Rgba16::new(0, 0, 0, 0),
            Rgba16::new(65535, 65535, 65535, 65535),
            Rgba16::new(30000, 30000, 30000, 12345),
        ];
        let mut r = Raster::from_pixels(2, 2, pixels.clone()).unwrap();
        let rows = full(&r);
        grayscale(&mut r, rows).unwrap();
        assert_eq!(r.destination_pixels(), pixels.as_slice());
    }

    #[test]
    fn grayscale_averages_channels() {
        let mut r = Raster::from_pixels(1, 1, vec![Rgba16::new(0, 300, 600, 42)]).unwrap();
        grayscale(&mut r, RowRange::new(0, 1).unwrap()).unwrap();
        assert_eq!(r.output_sample(0, 0), Some(Rgba16::new(300, 300, 300, 42)));
    }

    #[test]
    fn grayscale_of_max_channels_does_not_overflow() {
        let mut r = Raster::from_pixels(1, 1, vec![Rgba16::new(65535, 65535, 65534, 1)]).unwrap();
        grayscale(&mut r, RowRange::new(0, 1).unwrap()).unwrap();
        assert_eq!(r.output_sample(0, 0), Some(Rgba16::new(65535, 65535, 65535, 1)));
    }

    #[test]
    fn blur_keeps_uniform_interior_and_darkens_border() {
        let c = Rgba16::opaque(9000, 18000, 27000);
        let mut r = Raster::filled(5, 4, c).unwrap();
        let rows = full(&r);
        convolve(&mut r, &BOX_BLUR, rows).unwrap();

        for y in 0..4u32 {
            for x in 0..5u32 {
                let out = r.output_sample(x, y).unwrap();
                let border = x == 0 || y == 0 || x == 4 || y == 3;
                if border {
                    assert_ne!(rgb(out), rgb(c), "border ({x},{y}) should see zero padding");
                    assert!(out.r < c.r);
                } else {
                    assert_eq!(out, c, "interior ({x},{y})");
                }
            }
        }
        // Corner sees 4 of 9 neighbours.
        assert_eq!(r.output_sample(0, 0).unwrap().r, 4000);
        // Edge (non-corner) sees 6 of 9.
        assert_eq!(r.output_sample(2, 0).unwrap().r, 6000);
    }

    #[test]
    fn edge_detect_blackens_uniform_interior_and_forces_alpha() {
        let c = Rgba16::new(20000, 40000, 60000, 100);
        let mut r = Raster::filled(4, 4, c).unwrap();
        let rows = full(&r);
        convolve(&mut r, &EDGE_DETECT, rows).unwrap();

        for y in 1..3u32 {
            for x in 1..3u32 {
                assert_eq!(r.output_sample(x, y), Some(Rgba16::opaque(0, 0, 0)));
            }
        }
        // A corner sees 5 missing neighbours: 8c - 3c = 5c, saturated.
        assert_eq!(
            r.output_sample(0, 0),
            Some(Rgba16::opaque(65535, 65535, 65535))
        );
        for px in r.destination_pixels() {
            assert_eq!(px.a, SAMPLE_MAX);
        }
    }

    #[test]
    fn sharpen_zero_pads_single_pixel_image() {
        let mut r = Raster::from_pixels(1, 1, vec![Rgba16::new(1000, 20000, 0, 0)]).unwrap();
        convolve(&mut r, &SHARPEN, RowRange::new(0, 1).unwrap()).unwrap();
        // Only the centre tap sees data: 5 * v, clamped.
        assert_eq!(r.output_sample(0, 0), Some(Rgba16::opaque(5000, 65535, 0)));
    }

    #[test]
    fn sharpen_clamps_negative_sums_to_zero() {
        let dark = Rgba16::opaque(0, 0, 0);
        let bright = Rgba16::opaque(60000, 60000, 60000);
        let mut pixels = vec![bright; 9];
        pixels[4] = dark;
        let mut r = Raster::from_pixels(3, 3, pixels).unwrap();
        let rows = full(&r);
        convolve(&mut r, &SHARPEN, rows).unwrap();
        assert_eq!(r.output_sample(1, 1), Some(dark));
    }

    #[test]
    fn pass_reads_only_the_snapshot() {
        let mut pixels = vec![Rgba16::opaque(0, 0, 0); 9];
        pixels[4] = Rgba16::opaque(9000, 9000, 9000);
        let mut r = Raster::from_pixels(3, 3, pixels).unwrap();
        let rows = full(&r);
        convolve(&mut r, &BOX_BLUR, rows).unwrap();

        // Every output sees the single bright centre exactly once.
        for px in r.destination_pixels() {
            assert_eq!(rgb(*px), [1000, 1000, 1000]);
        }
        // The snapshot is still the input.
        assert_eq!(r.sample(1, 1), Rgba16::opaque(9000, 9000, 9000));
        assert_eq!(r.sample(0, 0), Rgba16::opaque(0, 0, 0));
    }

    #[test]
    fn band_pass_touches_only_its_rows() {
        let c = Rgba16::new(500, 500, 500, 3);
        let mut r = Raster::filled(3, 6, c).unwrap();
        apply_effect(&mut r, Effect::EdgeDetect, RowRange::new(2, 4).unwrap()).unwrap();

        for y in 0..6u32 {
            for x in 0..3u32 {
                let out = r.output_sample(x, y).unwrap();
                if (2..4).contains(&y) {
                    assert_eq!(out.a, SAMPLE_MAX);
                } else {
                    assert_eq!(out, c);
                }
            }
        }
    }

    #[test]
    fn invalid_row_ranges_are_rejected() {
        let mut r = Raster::new(2, 3).unwrap();
        assert!(convolve(&mut r, &SHARPEN, RowRange::new(1, 1).unwrap()).is_err());
        assert!(convolve(&mut r, &SHARPEN, RowRange::new(0, 4).unwrap()).is_err());
        assert!(grayscale(&mut r, RowRange::new(2, 5).unwrap()).is_err());
    }

    #[test]
    fn band_rows_reject_mismatched_output() {
        let extent = Extent::new(2, 2).unwrap();
        let source = vec![Rgba16::transparent(); 4];
        let mut out = vec![Rgba16::transparent(); 3];
        let err = apply_effect_rows(
            Effect::Blur,
            extent,
            &source,
            RowRange::new(0, 2).unwrap(),
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("band output holds 3 pixels"));
    }
}
