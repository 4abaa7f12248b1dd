use winit::event::{MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels scrolled per wheel line or arrow key press.
pub const LINE_HEIGHT: f32 = 48.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputAction {
    Quit,
    /// Relative scroll in page pixels, positive is down.
    Scroll(f32),
    ScrollToTop,
    ScrollToBottom,
}

pub struct InputHandler;

impl InputHandler {
    pub fn handle_window_event(event: &WindowEvent, viewport_height: f32) -> Option<InputAction> {
        match event {
            WindowEvent::CloseRequested => Some(InputAction::Quit),
            WindowEvent::MouseWheel { delta, .. } => Some(InputAction::Scroll(Self::wheel_pixels(delta))),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => match event.physical_key {
                PhysicalKey::Code(code) => Self::key_action(code, viewport_height),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn key_action(code: KeyCode, viewport_height: f32) -> Option<InputAction> {
        let page = viewport_height * 0.9;
        match code {
            KeyCode::KeyQ | KeyCode::Escape => Some(InputAction::Quit),
            KeyCode::ArrowDown => Some(InputAction::Scroll(LINE_HEIGHT)),
            KeyCode::ArrowUp => Some(InputAction::Scroll(-LINE_HEIGHT)),
            KeyCode::PageDown | KeyCode::Space => Some(InputAction::Scroll(page)),
            KeyCode::PageUp => Some(InputAction::Scroll(-page)),
            KeyCode::Home => Some(InputAction::ScrollToTop),
            KeyCode::End => Some(InputAction::ScrollToBottom),
            _ => None,
        }
    }

    fn wheel_pixels(delta: &MouseScrollDelta) -> f32 {
        // wheel deltas are positive when scrolling up
        match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
            MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
        }
    }
}
