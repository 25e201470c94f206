// Turns a picture into a height map.
// Visual expectation: dark areas of the picture become hills, light areas
// stay flat, and the wireframe always has exactly the requested resolution.
use std::path::Path;

use image::GrayImage;
use image::imageops::{self, FilterType};
use tracing::info;

use crate::error::{Error, Result};
use crate::grid::HeightGrid;

/// Requested output of an image conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTarget {
    pub width: u32,       // columns in the resulting grid
    pub height: u32,      // rows in the resulting grid
    pub max_height: f32,  // elevation given to a pure black pixel
}

/// Decode `path`, convert to grayscale and resample to the target grid.
/// Any decode failure is returned as-is; there is no fallback picture.
pub fn image_to_height_map(path: &Path, target: &ImageTarget) -> Result<HeightGrid<i32>> {
    if target.width == 0 || target.height == 0 {
        return Err(Error::InvalidImageTarget {
            width: target.width,
            height: target.height,
        });
    }

    let img = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        src_width = img.width(),
        src_height = img.height(),
        width = target.width,
        height = target.height,
        "converting image to height map"
    );

    Ok(luma_to_height_map(&img.to_luma8(), target))
}

/// Resample an already-decoded grayscale image (Lanczos3) and map each sample
/// to an integer height. Output is always `target.height` rows by `target.width` columns.
pub fn luma_to_height_map(gray: &GrayImage, target: &ImageTarget) -> HeightGrid<i32> {
    let resized = imageops::resize(gray, target.width, target.height, FilterType::Lanczos3);
    HeightGrid::from_fn(target.width as usize, target.height as usize, |x, y| {
        luminance_to_height(resized.get_pixel(x as u32, y as u32)[0], target.max_height)
    })
}

/// Inverted luminance mapping: 0 (black) -> `max_height`, 255 (white) -> 0.
/// Result never exceeds `max_height`, even when it is not a whole number.
#[inline]
pub fn luminance_to_height(luma: u8, max_height: f32) -> i32 {
    let h = ((255.0 - luma as f32) / 255.0 * max_height).round();
    h.min(max_height.floor()).max(0.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use proptest::prelude::*;

    fn target(width: u32, height: u32, max_height: f32) -> ImageTarget {
        ImageTarget {
            width,
            height,
            max_height,
        }
    }

    #[test]
    fn darker_is_taller() {
        assert_eq!(luminance_to_height(0, 10.0), 10);
        assert_eq!(luminance_to_height(255, 10.0), 0);
        assert_eq!(luminance_to_height(128, 10.0), 5); // 127/255*10 = 4.98
        assert!(luminance_to_height(40, 10.0) > luminance_to_height(200, 10.0));
    }

    #[test]
    fn fractional_max_height_is_not_exceeded() {
        assert_eq!(luminance_to_height(0, 10.6), 10);
    }

    #[test]
    fn uniform_images_map_to_flat_grids() {
        let black = GrayImage::from_pixel(20, 10, Luma([0]));
        let white = GrayImage::from_pixel(20, 10, Luma([255]));
        let t = target(5, 4, 8.0);
        assert!(luma_to_height_map(&black, &t).cells().iter().all(|&h| h == 8));
        assert!(luma_to_height_map(&white, &t).cells().iter().all(|&h| h == 0));
    }

    #[test]
    fn horizontal_gradient_slopes_down_to_the_right() {
        let img = GrayImage::from_fn(64, 8, |x, _| Luma([(x * 4) as u8]));
        let grid = luma_to_height_map(&img, &target(4, 2, 100.0));
        assert!(grid.get(0, 0) > grid.get(3, 0));
        assert!(grid.get(0, 1) > grid.get(3, 1));
    }

    #[test]
    fn decodes_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dark.png");
        GrayImage::from_pixel(30, 30, Luma([0])).save(&path).unwrap();

        let grid = image_to_height_map(&path, &target(6, 3, 12.0)).unwrap();
        assert_eq!(grid.shape(), (3, 6));
        assert!(grid.cells().iter().all(|&h| h == 12));
    }

    #[test]
    fn undecodable_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = image_to_height_map(&path, &target(4, 4, 5.0)).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(!err.is_recoverable());

        let missing = image_to_height_map(&dir.path().join("gone.jpg"), &target(4, 4, 5.0)).unwrap_err();
        assert!(matches!(missing, Error::Decode { .. }));
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let err = image_to_height_map(Path::new("whatever.jpg"), &target(0, 4, 5.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidImageTarget { width: 0, height: 4 }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn output_shape_and_range_hold_for_any_source(
            src_w in 1..48u32,
            src_h in 1..48u32,
            w in 1..24u32,
            h in 1..24u32,
            max_height in 0.0f32..50.0,
            seed in any::<u32>(),
        ) {
            let img = GrayImage::from_fn(src_w, src_h, |x, y| {
                Luma([(x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ seed) as u8])
            });
            let grid = luma_to_height_map(&img, &target(w, h, max_height));
            prop_assert_eq!(grid.shape(), (h as usize, w as usize));
            for &cell in grid.cells() {
                prop_assert!(cell >= 0 && cell as f32 <= max_height, "cell {} outside [0, {}]", cell, max_height);
            }
        }
    }
}
