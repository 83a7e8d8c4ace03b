//! Pointer gesture controller that turns pointer streams into window geometry actions.
//!
//! One gesture runs at a time: `Idle -> Moving | Resizing -> Idle`. The pointer listeners that
//! feed a gesture are represented by a [`PointerCapture`] owned by the gesture and released when
//! the gesture ends, is cancelled, is replaced, or the controller is dropped.

use crate::model::{
    Geometry, PointerPosition, Position, ResizeEdge, SessionSnapshot, WindowId, WindowLimits,
};
use crate::reducer::SessionAction;

/// Gesture-scoped pointer listeners.
pub trait PointerCapture {
    /// Detaches the listeners. Called exactly once per capture.
    fn release(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    /// Pointer position relative to the window's top-left at drag start.
    pub offset: PointerPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: PointerPosition,
    pub geometry_start: Geometry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureSession {
    Move(DragSession),
    Resize(ResizeSession),
}

impl GestureSession {
    pub fn window_id(&self) -> &WindowId {
        match self {
            Self::Move(drag) => &drag.window_id,
            Self::Resize(resize) => &resize.window_id,
        }
    }
}

struct ActiveGesture {
    session: GestureSession,
    capture: Box<dyn PointerCapture>,
}

impl Drop for ActiveGesture {
    fn drop(&mut self) {
        self.capture.release();
    }
}

fn release_unused(mut capture: Box<dyn PointerCapture>) {
    capture.release();
}

#[derive(Default)]
pub struct DragResizeController {
    active: Option<ActiveGesture>,
}

impl DragResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&GestureSession> {
        self.active.as_ref().map(|gesture| &gesture.session)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Starts a move gesture from a title-bar pointer-down.
    ///
    /// The window is always brought to front. Maximized windows are focused but not dragged.
    /// Windows that are not visible on the current desktop are ignored.
    pub fn begin_move(
        &mut self,
        snapshot: &SessionSnapshot,
        window_id: &WindowId,
        pointer: PointerPosition,
        capture: Box<dyn PointerCapture>,
    ) -> Vec<SessionAction> {
        self.active = None;
        let Some(window) = snapshot
            .window(window_id)
            .filter(|_| snapshot.is_visible(window_id))
        else {
            release_unused(capture);
            return Vec::new();
        };

        let focus = SessionAction::FocusWindow {
            window_id: window_id.clone(),
        };
        if window.is_maximized {
            release_unused(capture);
            return vec![focus];
        }

        self.active = Some(ActiveGesture {
            session: GestureSession::Move(DragSession {
                window_id: window_id.clone(),
                offset: PointerPosition {
                    x: pointer.x.saturating_sub(window.position.x),
                    y: pointer.y.saturating_sub(window.position.y),
                },
            }),
            capture,
        });
        vec![focus]
    }

    /// Starts an edge or corner resize gesture. Same eligibility rules as [`Self::begin_move`].
    pub fn begin_resize(
        &mut self,
        snapshot: &SessionSnapshot,
        window_id: &WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
        capture: Box<dyn PointerCapture>,
    ) -> Vec<SessionAction> {
        self.active = None;
        let Some(window) = snapshot
            .window(window_id)
            .filter(|_| snapshot.is_visible(window_id))
        else {
            release_unused(capture);
            return Vec::new();
        };

        let focus = SessionAction::FocusWindow {
            window_id: window_id.clone(),
        };
        if window.is_maximized {
            release_unused(capture);
            return vec![focus];
        }

        self.active = Some(ActiveGesture {
            session: GestureSession::Resize(ResizeSession {
                window_id: window_id.clone(),
                edge,
                pointer_start: pointer,
                geometry_start: window.geometry(),
            }),
            capture,
        });
        vec![focus]
    }

    /// Translates a pointer-move into a geometry action for the active gesture.
    ///
    /// If the window was closed, hidden, or maximized since the gesture started, the gesture ends.
    pub fn update(
        &mut self,
        snapshot: &SessionSnapshot,
        pointer: PointerPosition,
    ) -> Option<SessionAction> {
        let session = self.active()?.clone();
        let window_id = session.window_id();
        let still_draggable = snapshot
            .window(window_id)
            .map(|w| !w.is_maximized && w.is_visible_on(snapshot.current_desktop_id))
            .unwrap_or(false);
        if !still_draggable {
            self.active = None;
            return None;
        }

        let limits = snapshot.limits;
        match session {
            GestureSession::Move(drag) => Some(SessionAction::UpdateWindowPosition {
                position: limits.clamp_position(Position {
                    x: pointer.x.saturating_sub(drag.offset.x),
                    y: pointer.y.saturating_sub(drag.offset.y),
                }),
                window_id: drag.window_id,
            }),
            GestureSession::Resize(resize) => {
                let dx = pointer.x.saturating_sub(resize.pointer_start.x);
                let dy = pointer.y.saturating_sub(resize.pointer_start.y);
                Some(SessionAction::SetWindowGeometry {
                    geometry: resize_geometry(resize.geometry_start, resize.edge, dx, dy, limits),
                    window_id: resize.window_id,
                })
            }
        }
    }

    /// Ends the active gesture on pointer-up. Returns whether a gesture was active.
    pub fn end(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Abandons the active gesture on pointer-cancel or unmount.
    pub fn cancel(&mut self) -> bool {
        self.end()
    }
}

/// Applies an edge/corner resize delta, anchoring the opposite edges.
///
/// Width and height never drop below the limits and the top edge never crosses the menu bar.
pub fn resize_geometry(
    start: Geometry,
    edge: ResizeEdge,
    dx: i32,
    dy: i32,
    limits: WindowLimits,
) -> Geometry {
    let (north, south, east, west) = match edge {
        ResizeEdge::North => (true, false, false, false),
        ResizeEdge::South => (false, true, false, false),
        ResizeEdge::East => (false, false, true, false),
        ResizeEdge::West => (false, false, false, true),
        ResizeEdge::NorthEast => (true, false, true, false),
        ResizeEdge::NorthWest => (true, false, false, true),
        ResizeEdge::SouthEast => (false, true, true, false),
        ResizeEdge::SouthWest => (false, true, false, true),
    };

    let mut left = start.position.x;
    let mut top = start.position.y;
    let mut right = start.right();
    let mut bottom = start.bottom();

    if east {
        right = right
            .saturating_add(dx)
            .max(left.saturating_add(limits.min_width));
    }
    if west {
        left = left
            .saturating_add(dx)
            .min(right.saturating_sub(limits.min_width));
    }
    if south {
        bottom = bottom
            .saturating_add(dy)
            .max(top.saturating_add(limits.min_height));
    }
    if north {
        top = top
            .saturating_add(dy)
            .min(bottom.saturating_sub(limits.min_height))
            .max(limits.menu_bar_height);
    }

    limits.clamp(Geometry::new(
        left,
        top,
        right.saturating_sub(left),
        bottom.saturating_sub(top),
    ))
}
