// Shared fixtures for the unit tests: scratch directories under the
// system temp dir and small deterministic PNG files.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Fresh, empty directory unique to `name` and this process.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("style_trainer_{}_{}", name, std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a `width`×`height` RGB PNG filled with pseudo-random noise
/// (a small LCG seeded by `seed`, so files compress poorly).
pub fn write_noise_png(dir: &Path, name: &str, width: u32, height: u32, seed: u32) -> PathBuf {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let img = image::RgbImage::from_fn(width, height, |_, _| {
        let mut px = [0u8; 3];
        for c in px.iter_mut() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            *c = (state >> 24) as u8;
        }
        image::Rgb(px)
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Directory holding `count` noise images named `img_<i>.png`.
pub fn image_dir(name: &str, count: usize, side: u32) -> PathBuf {
    let dir = scratch_dir(name);
    for i in 0..count {
        write_noise_png(&dir, &format!("img_{i}.png"), side, side, i as u32 + 1);
    }
    dir
}
