use std::path::Path;

use crate::{
    foundation::{
        core::Rgba16,
        error::{FxError, FxResult},
    },
    raster::Raster,
};

/// Decodes any format the `image` crate understands into an RGBA16 raster.
///
/// 8-bit sources are widened (`v * 257`), so `255` maps to `65535`.
pub fn load_raster(path: &Path) -> FxResult<Raster> {
    let dyn_img = image::open(path).map_err(|e| FxError::image(path, e))?;
    let rgba = dyn_img.into_rgba16();
    let (width, height) = rgba.dimensions();

    let pixels = rgba
        .into_raw()
        .chunks_exact(4)
        .map(|px| Rgba16::new(px[0], px[1], px[2], px[3]))
        .collect::<Vec<_>>();

    tracing::debug!(path = %path.display(), width, height, "loaded raster");
    Raster::from_pixels(width, height, pixels)
}

/// Encodes the destination view as 16-bit RGBA. The format follows the file extension.
pub fn save_raster(raster: &Raster, path: &Path) -> FxResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| FxError::io(parent, e))?;
    }

    let (width, height) = raster.bounds();
    let mut data = Vec::<u16>::with_capacity(raster.extent().pixel_count() * 4);
    for px in raster.destination_pixels() {
        data.extend_from_slice(&px.to_array());
    }

    let buf = image::ImageBuffer::<image::Rgba<u16>, Vec<u16>>::from_raw(width, height, data)
        .ok_or_else(|| FxError::validation("raster buffer does not match its extent"))?;
    buf.save(path).map_err(|e| FxError::image(path, e))?;

    tracing::debug!(path = %path.display(), width, height, "saved raster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("raster_io").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn png_roundtrip_preserves_16_bit_samples() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("px.png");

        let pixels = vec![
            Rgba16::new(1, 2, 3, 65535),
            Rgba16::new(40000, 0, 65535, 12345),
        ];
        let r = Raster::from_pixels(2, 1, pixels.clone()).unwrap();
        save_raster(&r, &path).unwrap();

        let back = load_raster(&path).unwrap();
        assert_eq!(back.bounds(), (2, 1));
        assert_eq!(back.source_pixels(), pixels.as_slice());
        assert!(back.is_committed());
    }

    #[test]
    fn eight_bit_png_is_widened() {
        let dir = scratch_dir("widen");
        let path = dir.join("px8.png");

        let img = image::RgbaImage::from_raw(1, 1, vec![255u8, 0, 1, 128]).unwrap();
        img.save(&path).unwrap();

        let r = load_raster(&path).unwrap();
        assert_eq!(r.sample(0, 0), Rgba16::new(65535, 0, 257, 128 * 257));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = load_raster(Path::new("target/raster_io/does-not-exist.png")).unwrap_err();
        assert!(matches!(err, FxError::Image { .. }));
        assert!(err.to_string().contains("does-not-exist.png"));
    }
}
