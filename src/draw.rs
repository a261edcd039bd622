// Window + input utilities.
// Visual effects provided here:
// 1) A window that shows the paint surface 1:1.
// 2) Mouse button/position turned into pointer down/move/up events.
// 3) Keys turned into commands (open, save, copy, paste, share, swatches).

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::types::{FrameBuffer, Point};

/// What the user asked for this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Open,
    Save,
    Copy,
    Paste,
    Share,
    /// Palette swatch 0..=8 (keys 1..9).
    Color(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Command(Command),
}

const BINDINGS: [(Key, Command); 14] = [
    (Key::O, Command::Open),
    (Key::S, Command::Save),
    (Key::C, Command::Copy),
    (Key::V, Command::Paste),
    (Key::H, Command::Share),
    (Key::Key1, Command::Color(0)),
    (Key::Key2, Command::Color(1)),
    (Key::Key3, Command::Color(2)),
    (Key::Key4, Command::Color(3)),
    (Key::Key5, Command::Color(4)),
    (Key::Key6, Command::Color(5)),
    (Key::Key7, Command::Color(6)),
    (Key::Key8, Command::Color(7)),
    (Key::Key9, Command::Color(8)),
];

/// Turns sampled "button held + cursor position" into edge-triggered
/// pointer events. Kept apart from the window so it can be tested.
#[derive(Default)]
pub struct PointerTracker {
    down: bool,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn update(&mut self, held: bool, pos: Option<Point>, out: &mut Vec<InputEvent>) {
        match (self.down, held, pos) {
            (false, true, Some(p)) => {
                out.push(InputEvent::PointerDown(p));
                self.down = true;
                self.last = Some(p);
            }
            (true, true, Some(p)) if self.last != Some(p) => {
                out.push(InputEvent::PointerMove(p));
                self.last = Some(p);
            }
            (true, false, _) => {
                out.push(InputEvent::PointerUp);
                self.down = false;
                self.last = None;
            }
            _ => {}
        }
    }
}

pub struct Drawer {
    window: Window, // the on-screen window you see
    pointer: PointerTracker,
}

impl Drawer {
    /// Create a window sized to the surface.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(120);
        Ok(Self { window, pointer: PointerTracker::default() })
    }

    /// Push the surface pixels to the screen.
    /// Visual: the window immediately shows the latest strokes.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we’ll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current mouse position in surface pixel coordinates (clamped to the window).
    fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| Point::new(x.max(0.0) as i32, y.max(0.0) as i32))
    }

    /// Everything that happened since the last call, pointer first.
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let held = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.mouse_pos();
        self.pointer.update(held, pos, &mut out);

        for (key, cmd) in BINDINGS {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                out.push(InputEvent::Command(cmd));
            }
        }
        out
    }
}
