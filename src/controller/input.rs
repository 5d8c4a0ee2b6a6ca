/// Platform-agnostic pointer tracking for drag-to-rotate
use std::f32::consts::TAU;

/// Platform-independent pointer events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerUp,
    /// Pointer left the drawing surface; handled exactly like `PointerUp`.
    PointerLeave,
    PointerMove { x: f32, y: f32 },
}

/// Whether the platform's default handling of an event should be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    Passthrough,
}

impl EventDisposition {
    pub fn is_consumed(self) -> bool {
        self == EventDisposition::Consumed
    }
}

/// Pointer drag state: whether a drag is active, where the pointer was last
/// seen, the most recent angular delta and the accumulated orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    pub dragging: bool,
    pub last_pos: (f32, f32),
    /// Angular velocity in radians per frame (dX, dY).
    pub velocity: (f32, f32),
    /// Yaw (THETA), radians.
    pub theta: f32,
    /// Pitch (PHI), radians.
    pub phi: f32,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a pointer event. `viewport` is the live surface size in pixels,
    /// used to map one full surface width/height of travel to one turn.
    pub fn process_event(&mut self, event: &InputEvent, viewport: (u32, u32)) -> EventDisposition {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.dragging = true;
                self.last_pos = (x, y);
                EventDisposition::Consumed
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                self.dragging = false;
                EventDisposition::Passthrough
            }
            InputEvent::PointerMove { x, y } => {
                if !self.dragging {
                    return EventDisposition::Passthrough;
                }
                let (width, height) = viewport;
                let dx = (x - self.last_pos.0) * TAU / width.max(1) as f32;
                let dy = (y - self.last_pos.1) * TAU / height.max(1) as f32;

                // Orientation follows the pointer directly; the delta is kept
                // as the coasting velocity for when the drag ends.
                self.velocity = (dx, dy);
                self.theta += dx;
                self.phi += dy;
                self.last_pos = (x, y);
                EventDisposition::Consumed
            }
        }
    }

    /// One idle frame of inertia: decay the velocity by `amortization` and
    /// advance the orientation by the decayed amount.
    pub fn coast(&mut self, amortization: f32) {
        self.velocity.0 *= amortization;
        self.velocity.1 *= amortization;
        self.theta += self.velocity.0;
        self.phi += self.velocity.1;
    }
}

pub mod wasm {
    use super::*;
    use web_sys::MouseEvent;

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerDown {
            x: e.page_x() as f32,
            y: e.page_y() as f32,
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove {
            x: e.page_x() as f32,
            y: e.page_y() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: (u32, u32) = (500, 500);

    #[test]
    fn horizontal_drag_advances_yaw_only() {
        let mut drag = DragState::new();
        drag.process_event(&InputEvent::PointerDown { x: 100.0, y: 100.0 }, VIEWPORT);
        drag.process_event(&InputEvent::PointerMove { x: 110.0, y: 100.0 }, VIEWPORT);

        let expected = 10.0 * TAU / 500.0;
        assert!((drag.theta - expected).abs() < 1e-6);
        assert_eq!(drag.phi, 0.0);
        assert_eq!(drag.velocity, (expected, 0.0));
        assert_eq!(drag.last_pos, (110.0, 100.0));
    }

    #[test]
    fn vertical_delta_scales_by_height() {
        let mut drag = DragState::new();
        drag.process_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 }, (800, 400));
        drag.process_event(&InputEvent::PointerMove { x: 0.0, y: 100.0 }, (800, 400));
        assert!((drag.phi - 100.0 * TAU / 400.0).abs() < 1e-6);
        assert_eq!(drag.theta, 0.0);
    }

    #[test]
    fn press_and_drag_are_consumed() {
        let mut drag = DragState::new();
        let down = drag.process_event(&InputEvent::PointerDown { x: 1.0, y: 2.0 }, VIEWPORT);
        let mv = drag.process_event(&InputEvent::PointerMove { x: 3.0, y: 4.0 }, VIEWPORT);
        assert!(down.is_consumed());
        assert!(mv.is_consumed());
        assert!(drag.dragging);
    }

    #[test]
    fn idle_move_is_passthrough_noop() {
        let mut drag = DragState::new();
        let before = drag;
        let res = drag.process_event(&InputEvent::PointerMove { x: 50.0, y: 50.0 }, VIEWPORT);
        assert_eq!(res, EventDisposition::Passthrough);
        assert_eq!(drag, before);
    }

    #[test]
    fn release_without_press_is_noop() {
        let mut drag = DragState::new();
        let before = drag;
        assert_eq!(drag.process_event(&InputEvent::PointerUp, VIEWPORT), EventDisposition::Passthrough);
        assert_eq!(drag.process_event(&InputEvent::PointerLeave, VIEWPORT), EventDisposition::Passthrough);
        assert_eq!(drag, before);
    }

    #[test]
    fn leaving_surface_ends_drag() {
        let mut drag = DragState::new();
        drag.process_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 }, VIEWPORT);
        drag.process_event(&InputEvent::PointerLeave, VIEWPORT);
        assert!(!drag.dragging);

        let theta = drag.theta;
        drag.process_event(&InputEvent::PointerMove { x: 200.0, y: 0.0 }, VIEWPORT);
        assert_eq!(drag.theta, theta);
    }

    #[test]
    fn press_keeps_existing_velocity() {
        let mut drag = DragState { velocity: (0.1, 0.2), ..DragState::new() };
        drag.process_event(&InputEvent::PointerDown { x: 5.0, y: 5.0 }, VIEWPORT);
        assert_eq!(drag.velocity, (0.1, 0.2));
    }

    #[test]
    fn coasting_decays_geometrically() {
        let mut drag = DragState { velocity: (0.2, -0.1), ..DragState::new() };
        let n = 30;
        for _ in 0..n {
            drag.coast(0.95);
        }
        let factor = 0.95f32.powi(n);
        assert!((drag.velocity.0 - 0.2 * factor).abs() < 1e-6);
        assert!((drag.velocity.1 + 0.1 * factor).abs() < 1e-6);

        // Orientation is the partial sum of the decayed velocities
        let series: f32 = (1..=n).map(|k| 0.95f32.powi(k)).sum();
        assert!((drag.theta - 0.2 * series).abs() < 1e-5);
        assert!((drag.phi + 0.1 * series).abs() < 1e-5);
    }
}
