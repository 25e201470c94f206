// Window + software wireframe drawing.
// Visual effects provided here:
// 1) A window that shows the rendered frame.
// 2) Mouse and keyboard polling turned into `InputEvent`s for the camera.
// 3) Line strips projected through the camera and drawn as 1-pixel lines.

use glam::{Mat4, Vec3};
use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};
use tracing::debug;

use crate::camera::{InputEvent, PointerButton};
use crate::error::Error;
use crate::grid::HeightGrid;
use crate::types::FrameBuffer;

/// Projected points further than this outside the viewport (in NDC units) are dropped.
const NDC_GUARD: f32 = 8.0;

pub struct Drawer {
    window: Window,          // the on-screen window you see
    tracker: PointerTracker, // button edges + motion baseline between polls
}

impl Drawer {
    /// Create the render window, capped at `fps` frames per second.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, fps: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        // update_with_buffer sleeps out the rest of each frame slot.
        window.set_target_fps(fps);
        Ok(Self {
            window,
            tracker: PointerTracker::default(),
        })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new wireframe.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Everything that happened since the previous call, in this order:
    /// quit, button edges, wheel notches, then pointer motion.
    pub fn poll_input(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        // Closing the window or pressing ESC ends the program.
        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            events.push(InputEvent::Quit);
        }

        let buttons = [MouseButton::Left, MouseButton::Right, MouseButton::Middle]
            .map(|button| self.window.get_mouse_down(button));
        let pointer = self.window.get_unscaled_mouse_pos(MouseMode::Pass);
        let scroll = self.window.get_scroll_wheel();
        events.extend(self.tracker.sample(buttons, pointer, scroll));

        events
    }

    /// minifb cannot grab the pointer, so capture means hiding the cursor.
    /// Visual: the arrow disappears while you drag and comes back on release.
    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.window.set_cursor_visibility(!captured);
        debug!(captured, "pointer capture changed");
    }
}

/// Turns raw per-frame mouse state into camera events.
/// Knows nothing about the window, so it can be fed by hand.
pub struct PointerTracker {
    buttons: [(PointerButton, bool); 3], // last known up/down state per button
    last_pointer: Option<(f32, f32)>,    // baseline for relative motion
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            buttons: [
                (PointerButton::Primary, false),
                (PointerButton::Secondary, false),
                (PointerButton::Middle, false),
            ],
            last_pointer: None,
        }
    }
}

impl PointerTracker {
    /// `buttons` is primary, secondary, middle. `pointer` is the absolute
    /// position (if over the window), `scroll` the wheel travel this frame.
    pub fn sample(
        &mut self,
        buttons: [bool; 3],
        pointer: Option<(f32, f32)>,
        scroll: Option<(f32, f32)>,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for ((button, was_down), down) in self.buttons.iter_mut().zip(buttons) {
            if down == *was_down {
                continue;
            }
            *was_down = down;
            if down {
                events.push(InputEvent::ButtonDown(*button));
                // Fresh drag: forget motion that happened before the press.
                if *button == PointerButton::Primary {
                    self.last_pointer = pointer;
                }
            } else {
                events.push(InputEvent::ButtonUp(*button));
            }
        }

        if let Some((_, scroll_y)) = scroll {
            events.extend(wheel_events(scroll_y));
        }

        if let Some((dx, dy)) = pointer_delta(self.last_pointer, pointer) {
            events.push(InputEvent::PointerDelta { dx, dy });
        }
        if pointer.is_some() {
            self.last_pointer = pointer;
        }

        events
    }
}

/// One wheel event per notch. minifb adds 1.0 per notch, so several quick
/// notches arrive as one larger value; any non-zero travel counts at least once.
fn wheel_events(scroll_y: f32) -> Vec<InputEvent> {
    let button = if scroll_y > 0.0 {
        PointerButton::WheelForward
    } else if scroll_y < 0.0 {
        PointerButton::WheelBackward
    } else {
        return Vec::new();
    };
    let notches = scroll_y.abs().round().max(1.0) as usize;
    vec![InputEvent::ButtonDown(button); notches]
}

/// Relative motion between two pointer samples; `None` when there is none.
fn pointer_delta(previous: Option<(f32, f32)>, current: Option<(f32, f32)>) -> Option<(f32, f32)> {
    let ((px, py), (cx, cy)) = (previous?, current?);
    let (dx, dy) = (cx - px, cy - py);
    (dx != 0.0 || dy != 0.0).then_some((dx, dy))
}

/* ---------- Graphics submission: connected line strips ---------- */

/// Receiver of "begin strip / vertex / end strip" geometry.
pub trait LineStripSink {
    fn begin_strip(&mut self);
    fn vertex(&mut self, position: Vec3);
    fn end_strip(&mut self);
}

/// Emit the lattice for `grid`: one strip per row, then one strip per column.
/// Each vertex sits at (column, row, height).
pub fn submit_wireframe<S: LineStripSink>(grid: &HeightGrid<f32>, sink: &mut S) {
    if grid.is_empty() {
        return;
    }

    for y in 0..grid.height() {
        sink.begin_strip();
        for x in 0..grid.width() {
            sink.vertex(Vec3::new(x as f32, y as f32, grid.get(x, y)));
        }
        sink.end_strip();
    }

    for x in 0..grid.width() {
        sink.begin_strip();
        for y in 0..grid.height() {
            sink.vertex(Vec3::new(x as f32, y as f32, grid.get(x, y)));
        }
        sink.end_strip();
    }
}

/// Draws submitted strips into a framebuffer through a clip-space transform.
/// Visual: white lattice lines over the cleared background.
pub struct WireframeRasterizer<'a> {
    fb: &'a mut FrameBuffer,
    transform: Mat4,
    near: f32,
    color: u32,
    previous: Option<(i32, i32)>, // last projected vertex of the open strip
}

impl<'a> WireframeRasterizer<'a> {
    pub fn new(fb: &'a mut FrameBuffer, transform: Mat4, near: f32, color: u32) -> Self {
        Self {
            fb,
            transform,
            near,
            color,
            previous: None,
        }
    }

    /// World position -> pixel, or `None` if behind the eye / far off screen.
    fn project(&self, position: Vec3) -> Option<(i32, i32)> {
        let clip = self.transform * position.extend(1.0);
        if clip.w <= self.near {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        // NaN heights survive the w test above; they must not reach the `as i32` cast.
        if !ndc.is_finite() {
            return None;
        }
        if ndc.x.abs() > NDC_GUARD || ndc.y.abs() > NDC_GUARD || ndc.z.abs() > 1.0 {
            return None;
        }
        let sx = (ndc.x + 1.0) * 0.5 * self.fb.width as f32;
        let sy = (1.0 - ndc.y) * 0.5 * self.fb.height as f32;
        Some((sx.round() as i32, sy.round() as i32))
    }
}

impl LineStripSink for WireframeRasterizer<'_> {
    fn begin_strip(&mut self) {
        self.previous = None;
    }

    fn vertex(&mut self, position: Vec3) {
        let current = self.project(position);
        if let (Some((x0, y0)), Some((x1, y1))) = (self.previous, current) {
            draw_line(self.fb, x0, y0, x1, y1, self.color);
        }
        self.previous = current;
    }

    fn end_strip(&mut self) {
        self.previous = None;
    }
}

/* ---------- Software drawing: pixels and lines ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on the frame.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}
