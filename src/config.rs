// Optional `heightmap.toml` configuration.
//
// Every field has a default, so a missing file (or an empty one) gives the
// classic viewer: `height_map.txt` in a 800x600 window at 60 FPS.
//
// Example:
//
// log_level = "debug"
//
// [primary]
// kind = "image"
// path = "mountain.jpg"
// width = 40
// height = 30
// max_height = 8.0
// save_to = "height_map.txt"
//
// [morph]
// kind = "file"
// path = "valley.txt"

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use glam::Vec2;
use serde::Deserialize;
use tracing::Level;

use crate::camera::{CameraState, Projection};
use crate::error::{Error, Result};

/// Where a height map comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapSource {
    /// Whitespace text grid; falls back to the built-in pattern when unusable.
    File { path: PathBuf },
    /// Grayscale conversion of a picture, optionally saved as a text grid.
    Image {
        path: PathBuf,
        width: u32,
        height: u32,
        max_height: f32,
        #[serde(default)]
        save_to: Option<PathBuf>,
    },
}

impl Default for MapSource {
    fn default() -> Self {
        MapSource::File {
            path: PathBuf::from("height_map.txt"),
        }
    }
}

impl MapSource {
    fn validate(&self) -> Result<()> {
        if let MapSource::Image {
            width,
            height,
            max_height,
            ..
        } = self
        {
            if *width == 0 || *height == 0 {
                return Err(Error::InvalidImageTarget {
                    width: *width,
                    height: *height,
                });
            }
            if !max_height.is_finite() || *max_height < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "max_height must be a non-negative number, got {max_height}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub fps: u32,
    /// 0x00RRGGBB
    pub background: u32,
    pub line_color: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Height Map Wireframe".to_string(),
            width: 800,
            height: 600,
            fps: 60,
            background: 0x00_00_00_00,
            line_color: 0x00_FF_FF_FF,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees of rotation per pixel of drag.
    pub sensitivity: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub zoom: f32,
    pub offset: [f32; 2],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.3,
            rotation_x: 25.0,
            rotation_y: 0.0,
            zoom: -15.0,
            offset: [-2.0, -2.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

impl CameraConfig {
    pub fn initial_state(&self) -> CameraState {
        CameraState::new(self.rotation_x, self.rotation_y, self.zoom)
    }

    pub fn projection(&self) -> Projection {
        Projection {
            fov_degrees: self.fov_degrees,
            near: self.near,
            far: self.far,
            offset: Vec2::from(self.offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Change of the blend factor per frame.
    pub step: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self { step: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub blend: BlendConfig,
    pub primary: MapSource,
    /// Second map; when present the viewer morphs between the two.
    pub morph: Option<MapSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            blend: BlendConfig::default(),
            primary: MapSource::default(),
            morph: None,
        }
    }
}

impl Config {
    /// Read `path` if it exists, otherwise use the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| Error::InvalidConfig(format!("unknown log level `{}`", self.log_level)))
    }

    fn validate(&self) -> Result<()> {
        self.level()?;

        let w = &self.window;
        if w.width == 0 || w.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "window size must be non-zero, got {}x{}",
                w.width, w.height
            )));
        }
        if w.fps == 0 {
            return Err(Error::InvalidConfig("fps must be at least 1".into()));
        }

        let c = &self.camera;
        if !c.sensitivity.is_finite() {
            return Err(Error::InvalidConfig("sensitivity must be finite".into()));
        }
        if !(c.fov_degrees > 0.0 && c.fov_degrees < 180.0) {
            return Err(Error::InvalidConfig(format!(
                "fov_degrees must be in (0, 180), got {}",
                c.fov_degrees
            )));
        }
        if !(c.near > 0.0 && c.far > c.near) {
            return Err(Error::InvalidConfig(format!(
                "clip planes need 0 < near < far, got near={} far={}",
                c.near, c.far
            )));
        }

        let step = self.blend.step;
        if !(step > 0.0 && step <= 1.0) {
            return Err(Error::InvalidConfig(format!("blend step must be in (0, 1], got {step}")));
        }

        self.primary.validate()?;
        if let Some(morph) = &self.morph {
            morph.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_classic_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.camera.sensitivity, 0.3);
        assert_eq!(config.window.fps, 60);
        assert_eq!(config.blend.step, 0.01);
        assert_eq!(config.primary, MapSource::File { path: "height_map.txt".into() });
        assert!(config.morph.is_none());
        assert_eq!(config.level().unwrap(), Level::INFO);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("heightmap.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_image_primary_and_file_morph() {
        let config = Config::from_toml_str(
            r#"
            log_level = "debug"

            [camera]
            sensitivity = 0.5

            [primary]
            kind = "image"
            path = "mountain.jpg"
            width = 40
            height = 30
            max_height = 8.0
            save_to = "out.txt"

            [morph]
            kind = "file"
            path = "valley.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.level().unwrap(), Level::DEBUG);
        assert_eq!(config.camera.sensitivity, 0.5);
        assert_eq!(config.camera.zoom, -15.0);
        assert_eq!(
            config.primary,
            MapSource::Image {
                path: "mountain.jpg".into(),
                width: 40,
                height: 30,
                max_height: 8.0,
                save_to: Some("out.txt".into()),
            }
        );
        assert_eq!(config.morph, Some(MapSource::File { path: "valley.txt".into() }));
    }

    #[test]
    fn hex_colors_are_accepted() {
        let config = Config::from_toml_str("[window]\nline_color = 0x00FF00\n").unwrap();
        assert_eq!(config.window.line_color, 0x00FF00);
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn camera_config_builds_state_and_projection() {
        let camera = CameraConfig::default();
        let state = camera.initial_state();
        assert_eq!((state.rotation_x, state.rotation_y, state.zoom), (25.0, 0.0, -15.0));
        assert!(!state.dragging);
        assert_eq!(camera.projection().offset, Vec2::new(-2.0, -2.0));
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "log_level = \"loud\"",
            "[window]\nfps = 0",
            "[window]\nwidth = 0",
            "[blend]\nstep = 0.0",
            "[blend]\nstep = 1.5",
            "[camera]\nnear = 5.0\nfar = 1.0",
            "[camera]\nfov_degrees = 0.0",
            "[primary]\nkind = \"image\"\npath = \"a.jpg\"\nwidth = 0\nheight = 3\nmax_height = 1.0",
            "[morph]\nkind = \"image\"\npath = \"a.jpg\"\nwidth = 3\nheight = 3\nmax_height = -1.0",
        ] {
            assert!(Config::from_toml_str(text).is_err(), "accepted: {text}");
        }
    }

    #[test]
    fn unknown_source_kind_is_a_parse_error() {
        let err = Config::from_toml_str("[primary]\nkind = \"video\"\npath = \"x\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
