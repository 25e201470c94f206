// What you SEE now:
// • A white wireframe of the height map (height_map.txt, a converted picture,
//   or the built-in 5x5 bump when nothing else is available).
// • Hold Left Mouse and move: the wireframe rotates. Wheel: zoom in/out.
// • With a [morph] map configured, the surface slowly melts between two maps.
// • ESC or closing the window quits.
//
// Settings live in an optional heightmap.toml next to the binary's working dir.

mod blend;
mod camera;
mod config;
mod convert;
mod draw;
mod error;
mod grid;
mod pacing;
mod scene;
mod types;

use std::path::Path;
use std::time::Instant;

use camera::{InputEvent, build_view_transform, update_camera};
use config::Config;
use draw::{Drawer, WireframeRasterizer, submit_wireframe};
use error::Error;
use pacing::FpsCounter;
use scene::Scene;
use tracing::{Level, debug, error, info};
use types::FrameBuffer;

const CONFIG_PATH: &str = "heightmap.toml";

fn main() -> Result<(), Error> {
    /* --- Config + logging ---
       The log level comes from the config, so read it first. */
    let loaded = Config::load(Path::new(CONFIG_PATH));
    let level = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.level().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = loaded.inspect_err(|e| error!(error = %e, "configuration rejected"))?;
    info!(path = CONFIG_PATH, found = Path::new(CONFIG_PATH).exists(), "configuration ready");

    /* --- Height maps ---
       Every fatal problem (bad image, shape mismatch) stops us here,
       before a window ever opens. */
    let mut scene = Scene::prepare(&config).inspect_err(|e| error!(error = %e, "cannot build scene"))?;
    info!(
        rows = scene.grid().height(),
        cols = scene.grid().width(),
        morphing = scene.blend().is_some(),
        "scene ready"
    );

    /* --- Window + frame buffer ---
       Visual: an empty black window appears. */
    let window = &config.window;
    let mut drawer = Drawer::new(&window.title, window.width, window.height, window.fps as usize)?;
    let mut screen = FrameBuffer::new(window.width, window.height);

    let mut camera = config.camera.initial_state();
    let projection = config.camera.projection();
    let sensitivity = config.camera.sensitivity;

    let mut fps = FpsCounter::new(Instant::now());

    /* ------------------------------ Main loop ------------------------------ */
    let mut running = true;
    while running {
        /* 1) Inputs: quit finishes this frame, everything else drives the camera. */
        let events = drawer.poll_input();
        if events.contains(&InputEvent::Quit) {
            info!("quit requested");
            running = false;
        }

        let was_dragging = camera.dragging;
        camera = update_camera(camera, &events, sensitivity);
        if camera.dragging != was_dragging {
            // Visual: cursor hides while dragging, comes back on release.
            drawer.set_pointer_captured(camera.dragging);
        }

        /* 2) Morph one step (no-op for a single map). */
        scene.advance();

        /* 3) Draw the lattice through this frame's camera. */
        let view = build_view_transform(&camera, &projection, screen.aspect());
        screen.clear(window.background);
        let mut raster = WireframeRasterizer::new(&mut screen, view, projection.near, window.line_color);
        submit_wireframe(scene.grid(), &mut raster);

        /* 4) Present; minifb holds the frame rate. */
        drawer.present(&screen)?;

        if let Some(rate) = fps.frame(Instant::now()) {
            debug!("FPS: {rate:.1}");
        }
    }

    Ok(())
}
