// Orbit camera driven by the mouse.
// Visual expectation: hold the left button and move the mouse to spin the
// wireframe; the wheel moves it closer or further away.
//
// Everything here is pure: events in, new state out. The window adapter in
// draw.rs turns minifb polling into `InputEvent`s.
use glam::{Mat4, Vec2, Vec3};

/// Zoom change per wheel notch.
pub const ZOOM_STEP: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    WheelForward,
    WheelBackward,
}

/// One thing that happened in the window since the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Quit,
    ButtonDown(PointerButton),
    ButtonUp(PointerButton),
    /// Relative pointer motion in pixels.
    PointerDelta { dx: f32, dy: f32 },
}

/// Camera orientation and distance, plus whether a drag is in progress.
/// Angles are accumulated degrees; nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub zoom: f32, // depth offset along the view axis (negative = away from the eye)
    pub dragging: bool,
}

impl CameraState {
    pub fn new(rotation_x: f32, rotation_y: f32, zoom: f32) -> Self {
        Self {
            rotation_x,
            rotation_y,
            zoom,
            dragging: false,
        }
    }
}

/// Fold this frame's events into the camera.
/// `Quit` is ignored here; the render loop handles it.
pub fn update_camera(state: CameraState, events: &[InputEvent], sensitivity: f32) -> CameraState {
    events
        .iter()
        .fold(state, |camera, event| apply_event(camera, event, sensitivity))
}

fn apply_event(mut camera: CameraState, event: &InputEvent, sensitivity: f32) -> CameraState {
    match *event {
        InputEvent::ButtonDown(PointerButton::Primary) => camera.dragging = true,
        InputEvent::ButtonUp(PointerButton::Primary) => camera.dragging = false,
        InputEvent::ButtonDown(PointerButton::WheelForward) => camera.zoom += ZOOM_STEP,
        InputEvent::ButtonDown(PointerButton::WheelBackward) => camera.zoom -= ZOOM_STEP,
        // Vertical motion tilts around X, horizontal motion spins around Y.
        InputEvent::PointerDelta { dx, dy } if camera.dragging => {
            camera.rotation_x += dy * sensitivity;
            camera.rotation_y += dx * sensitivity;
        }
        // Idle motion is drained and dropped so it never leaks into the next drag.
        _ => {}
    }
    camera
}

/// Fixed lens and scene placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Scene shift in X/Y applied before zoom, so the grid sits in view.
    pub offset: Vec2,
}

/// Translate by (offset, zoom), then rotate about X, then about Y.
pub fn model_view(camera: &CameraState, offset: Vec2) -> Mat4 {
    Mat4::from_translation(Vec3::new(offset.x, offset.y, camera.zoom))
        * Mat4::from_rotation_x(camera.rotation_x.to_radians())
        * Mat4::from_rotation_y(camera.rotation_y.to_radians())
}

/// Full clip-space transform for this frame.
pub fn build_view_transform(camera: &CameraState, projection: &Projection, aspect: f32) -> Mat4 {
    let lens = Mat4::perspective_rh_gl(
        projection.fov_degrees.to_radians(),
        aspect,
        projection.near,
        projection.far,
    );
    lens * model_view(camera, projection.offset)
}
