//! Input handling for the river.
//!
//! [`InputState`] folds raw window events into the three values the frame
//! step cares about: scroll position, pointer position and viewport size.
//! Each frame reads one [`InputSnapshot`], so a frame never sees a
//! half-applied event.
//!
//! The native window has no page to scroll, so scrolling moves a virtual
//! offset over a page of `document_height` pixels.

use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels scrolled per wheel line.
const LINE_HEIGHT: f32 = 40.0;

/// Everything the frame step reads from input, copied once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    /// Scroll position as a fraction of the page, clamped to the configured maximum.
    pub scroll_fraction: f32,
    /// Pointer in `[-1, 1]²`, origin at the window centre, Y up.
    pub pointer: Vec2,
    /// Viewport size in physical pixels.
    pub viewport: (u32, u32),
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            scroll_fraction: 0.0,
            pointer: Vec2::ZERO,
            viewport: (1280, 720),
        }
    }
}

/// Latest-value-wins input state fed by window events.
#[derive(Debug, Clone)]
pub struct InputState {
    scroll_offset: f32,
    document_height: f32,
    max_scroll_fraction: f32,
    pointer: Vec2,
    viewport: (u32, u32),
}

impl InputState {
    /// Create input state for a page of `document_height` pixels.
    pub fn new(document_height: f32, max_scroll_fraction: f32) -> Self {
        Self {
            scroll_offset: 0.0,
            document_height,
            max_scroll_fraction,
            pointer: Vec2::ZERO,
            viewport: (1280, 720),
        }
    }

    /// Copy out the current state.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            scroll_fraction: self.scroll_fraction(),
            pointer: self.pointer,
            viewport: self.viewport,
        }
    }

    /// Scroll offset normalized by page height and clamped to `[0, max_scroll_fraction]`.
    pub fn scroll_fraction(&self) -> f32 {
        (self.scroll_offset / self.document_height).clamp(0.0, self.max_scroll_fraction)
    }

    /// Current scroll offset in pixels.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Jump to an absolute scroll offset, clamped to the page.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset.clamp(0.0, self.document_height);
    }

    /// Scroll by `pixels`; positive moves down the page.
    pub fn scroll_by(&mut self, pixels: f32) {
        self.set_scroll_offset(self.scroll_offset + pixels);
    }

    /// Record a pointer position in screen pixels (origin top-left).
    pub fn set_pointer_position(&mut self, x: f32, y: f32) {
        let (w, h) = self.viewport;
        if w == 0 || h == 0 {
            return;
        }
        self.pointer = Vec2::new(
            (x / w as f32) * 2.0 - 1.0,
            1.0 - (y / h as f32) * 2.0, // Y flipped
        )
        .clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Record a new viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.set_pointer_position(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                // Wheel deltas are positive when scrolling up.
                let pixels = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                self.scroll_by(pixels);
            }

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key);
                }
            }

            WindowEvent::Resized(size) => {
                self.set_viewport(size.width, size.height);
            }

            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let page = self.viewport.1 as f32;
        match key {
            KeyCode::PageDown | KeyCode::Space => self.scroll_by(page),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::ArrowDown => self.scroll_by(LINE_HEIGHT),
            KeyCode::ArrowUp => self.scroll_by(-LINE_HEIGHT),
            KeyCode::Home => self.set_scroll_offset(0.0),
            KeyCode::End => self.set_scroll_offset(self.document_height),
            _ => {}
        }
    }
}
