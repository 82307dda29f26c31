#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rasterfx::{Raster, Rgba16};

/// Fresh scratch directory under `target/` for one test.
pub fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("it").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Deterministic pseudo-random RGBA16 image.
pub fn noise_raster(width: u32, height: u32, seed: u32) -> Raster {
    let mut state = seed.wrapping_mul(2654435761) | 1;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state & 0xffff) as u16
    };
    let pixels = (0..width * height)
        .map(|_| Rgba16::new(next(), next(), next(), next()))
        .collect();
    Raster::from_pixels(width, height, pixels).unwrap()
}

/// Writes `<root>/in/<id>/<file>` for every id and returns the input root.
pub fn write_inputs(root: &Path, ids: &[&str], file: &str, width: u32, height: u32) -> PathBuf {
    let in_root = root.join("in");
    for (i, id) in ids.iter().enumerate() {
        let r = noise_raster(width, height, 17 + i as u32);
        r.save(in_root.join(id).join(file)).unwrap();
    }
    in_root
}

pub fn write_effects(root: &Path, body: &str) -> PathBuf {
    let path = root.join("effects.txt");
    std::fs::write(&path, body).unwrap();
    path
}
