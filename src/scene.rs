// What the render loop draws each frame: a single height map, or a pair of
// maps morphing into each other.
// Everything that can fail happens in `Scene::prepare`, before a window exists.
use tracing::{info, warn};

use crate::blend::{BlendState, check_same_shape, interpolate};
use crate::config::{Config, MapSource};
use crate::convert::{ImageTarget, image_to_height_map};
use crate::error::Result;
use crate::grid::{HeightGrid, load_height_map_or_empty, write_height_map};

/// Two equally-shaped maps and where we are between them.
pub struct Morph {
    from: HeightGrid<f32>,
    to: HeightGrid<f32>,
    blend: BlendState,
    step: f32,
}

pub struct Scene {
    current: HeightGrid<f32>,
    morph: Option<Morph>,
}

impl Scene {
    /// Resolve the configured sources and run the shape check.
    pub fn prepare(config: &Config) -> Result<Self> {
        let primary = resolve_source(&config.primary)?;

        let morph = match &config.morph {
            Some(source) => {
                let to = resolve_source(source)?;
                check_same_shape(&primary, &to)?;
                info!(rows = to.height(), cols = to.width(), step = config.blend.step, "morphing between two height maps");
                Some(Morph {
                    from: primary.clone(),
                    to,
                    blend: BlendState::default(),
                    step: config.blend.step,
                })
            }
            None => None,
        };

        Ok(Self {
            current: primary,
            morph,
        })
    }

    /// Grid to draw this frame.
    pub fn grid(&self) -> &HeightGrid<f32> {
        &self.current
    }

    pub fn blend(&self) -> Option<BlendState> {
        self.morph.as_ref().map(|m| m.blend)
    }

    /// One frame of animation. Static scenes are left untouched.
    pub fn advance(&mut self) {
        if let Some(morph) = &mut self.morph {
            morph.blend = morph.blend.advance(morph.step);
            self.current = interpolate(&morph.from, &morph.to, morph.blend.alpha);
        }
    }
}

/// Load one source. Text files fall back to the built-in pattern; images must decode.
pub fn resolve_source(source: &MapSource) -> Result<HeightGrid<f32>> {
    match source {
        MapSource::File { path } => {
            let grid = load_height_map_or_empty::<f32>(path)?;
            if grid.is_empty() {
                warn!(path = %path.display(), "using built-in 5x5 height map");
                return Ok(HeightGrid::default_pattern());
            }
            Ok(grid)
        }
        MapSource::Image {
            path,
            width,
            height,
            max_height,
            save_to,
        } => {
            let target = ImageTarget {
                width: *width,
                height: *height,
                max_height: *max_height,
            };
            let grid = image_to_height_map(path, &target)?;
            if let Some(out) = save_to {
                write_height_map(out, &grid)?;
                info!(path = %out.display(), "saved converted height map");
            }
            Ok(grid.map(|h| h as f32))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::Direction;
    use crate::error::Error;
    use crate::grid::load_height_map;
    use image::{GrayImage, Luma};
    use std::fs;
    use std::path::Path;

    fn file(path: &Path) -> MapSource {
        MapSource::File {
            path: path.to_path_buf(),
        }
    }

    fn config(primary: MapSource, morph: Option<MapSource>, step: f32) -> Config {
        let mut config = Config {
            primary,
            morph,
            ..Config::default()
        };
        config.blend.step = step;
        config
    }

    #[test]
    fn missing_file_uses_default_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::prepare(&config(file(&dir.path().join("height_map.txt")), None, 0.01)).unwrap();
        assert_eq!(scene.grid(), &HeightGrid::<f32>::default_pattern());
        assert!(scene.blend().is_none());
    }

    #[test]
    fn malformed_file_uses_default_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "1 2 3\n4 five 6\n").unwrap();
        let grid = resolve_source(&file(&path)).unwrap();
        assert_eq!(grid, HeightGrid::default_pattern());
    }

    #[test]
    fn static_scene_does_not_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.txt");
        fs::write(&path, "1 2\n3 4\n").unwrap();
        let mut scene = Scene::prepare(&config(file(&path), None, 0.5)).unwrap();
        let before = scene.grid().clone();
        scene.advance();
        assert_eq!(scene.grid(), &before);
    }

    #[test]
    fn shape_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "0 0 0\n0 0 0\n0 0 0\n").unwrap();
        fs::write(&b, "0 0 0 0\n0 0 0 0\n0 0 0 0\n").unwrap();

        let err = Scene::prepare(&config(file(&a), Some(file(&b)), 0.01)).err().unwrap();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                left: (3, 3),
                right: (3, 4)
            }
        ));
    }

    #[test]
    fn morph_scene_oscillates_between_maps() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "0 0\n0 0\n").unwrap();
        fs::write(&b, "4 8\n2 0\n").unwrap();

        let mut scene = Scene::prepare(&config(file(&a), Some(file(&b)), 0.5)).unwrap();
        assert_eq!(scene.grid().cells(), &[0.0, 0.0, 0.0, 0.0]);

        scene.advance();
        assert_eq!(scene.grid().cells(), &[2.0, 4.0, 1.0, 0.0]);

        scene.advance();
        assert_eq!(scene.grid().cells(), &[4.0, 8.0, 2.0, 0.0]);
        assert_eq!(scene.blend().unwrap().direction, Direction::Backward);

        scene.advance();
        scene.advance();
        assert_eq!(scene.grid().cells(), &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(scene.blend().unwrap().direction, Direction::Forward);
    }

    #[test]
    fn image_source_is_converted_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("dark.png");
        let out = dir.path().join("converted.txt");
        GrayImage::from_pixel(16, 16, Luma([0])).save(&img).unwrap();

        let source = MapSource::Image {
            path: img,
            width: 5,
            height: 4,
            max_height: 3.0,
            save_to: Some(out.clone()),
        };
        let grid = resolve_source(&source).unwrap();
        assert_eq!(grid.shape(), (4, 5));
        assert!(grid.cells().iter().all(|&h| h == 3.0));

        let saved: HeightGrid<i32> = load_height_map(&out).unwrap();
        assert_eq!(saved.map(|h| h as f32), grid);
    }

    #[test]
    fn broken_image_aborts_preparation() {
        let dir = tempfile::tempdir().unwrap();
        let source = MapSource::Image {
            path: dir.path().join("missing.jpg"),
            width: 5,
            height: 5,
            max_height: 3.0,
            save_to: None,
        };
        let err = Scene::prepare(&config(source, None, 0.01)).err().unwrap();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
