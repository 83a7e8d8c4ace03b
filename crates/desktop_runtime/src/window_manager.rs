//! Window transition helpers used by the session reducer.
//!
//! Each helper mutates one window and reports whether anything changed. Focus repair after a
//! window disappears or hides is left to [`crate::focus::normalize_focus`].

use crate::config::SessionConfig;
use crate::focus::is_focused_top;
use crate::model::{
    Geometry, OpenWindowRequest, Position, SessionState, Size, WindowId, WindowInstance,
};

/// Cascaded geometry for a window opened without explicit geometry.
pub fn default_geometry(state: &SessionState, config: &SessionConfig) -> Geometry {
    let slot = (state.windows.len() as u32 % config.cascade_slots.max(1)) as i32;
    let offset = slot.saturating_mul(config.cascade_step);
    state.limits.clamp(Geometry {
        position: config.cascade_origin.offset(offset, offset),
        size: Size {
            width: config.default_window_width,
            height: config.default_window_height,
        },
    })
}

/// Creates a window on the current desktop on top of the stack and focuses it.
pub fn insert_window(
    state: &mut SessionState,
    config: &SessionConfig,
    req: OpenWindowRequest,
) -> WindowId {
    let geometry = state.limits.clamp(
        req.geometry
            .unwrap_or_else(|| default_geometry(state, config)),
    );
    let z_index = state.allocate_z_index();
    let window_id = req.id;
    state.windows.push(WindowInstance {
        id: window_id.clone(),
        title: req.title,
        content: req.content,
        position: geometry.position,
        size: geometry.size,
        z_index,
        is_minimized: false,
        is_maximized: false,
        desktop_id: state.current_desktop_id,
        prior_geometry: None,
    });
    state.focused_window_id = Some(window_id.clone());
    window_id
}

/// Focuses and raises `window_id`.
///
/// A minimized window is restored, and a window on another desktop pulls the session over to that
/// desktop. Returns `false` only when the window does not exist.
pub fn focus_window_internal(state: &mut SessionState, window_id: &WindowId) -> bool {
    let Some(desktop_id) = state.window(window_id).map(|w| w.desktop_id) else {
        return false;
    };
    if is_focused_top(state, window_id) {
        return true;
    }

    if desktop_id != state.current_desktop_id && state.has_desktop(desktop_id) {
        state.current_desktop_id = desktop_id;
    }
    let z_index = state.allocate_z_index();
    if let Some(window) = state.window_mut(window_id) {
        window.is_minimized = false;
        window.z_index = z_index;
    }
    state.focused_window_id = Some(window_id.clone());
    true
}

/// Removes a window from the collection, returning it so its content can be unmounted.
pub fn remove_window(state: &mut SessionState, window_id: &WindowId) -> Option<WindowInstance> {
    let index = state.windows.iter().position(|w| &w.id == window_id)?;
    Some(state.windows.remove(index))
}

/// Minimizes a window, leaving maximize first so the two flags never coexist.
pub fn minimize_window(state: &mut SessionState, window_id: &WindowId) -> bool {
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    if window.is_minimized {
        return false;
    }
    if window.is_maximized {
        leave_maximize(window);
    }
    window.is_minimized = true;
    true
}

/// Toggles maximize. Returns the new maximized flag, or `None` for an unknown window.
pub fn toggle_maximize(state: &mut SessionState, window_id: &WindowId) -> Option<bool> {
    let window = state.window_mut(window_id)?;
    if window.is_maximized {
        leave_maximize(window);
        Some(false)
    } else {
        window.prior_geometry = Some(window.geometry());
        window.is_maximized = true;
        window.is_minimized = false;
        Some(true)
    }
}

/// Clears both minimize and maximize. Returns whether either flag was set.
pub fn restore_window(state: &mut SessionState, window_id: &WindowId) -> bool {
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    let was_altered = window.is_minimized || window.is_maximized;
    if window.is_maximized {
        leave_maximize(window);
    }
    window.is_minimized = false;
    was_altered
}

fn leave_maximize(window: &mut WindowInstance) {
    if let Some(prior) = window.prior_geometry.take() {
        window.position = prior.position;
        window.size = prior.size;
    }
    window.is_maximized = false;
}

/// Moves a window, keeping it below the menu bar. Ignored while maximized.
pub fn set_window_position(
    state: &mut SessionState,
    window_id: &WindowId,
    position: Position,
) -> bool {
    let limits = state.limits;
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    if window.is_maximized {
        return false;
    }
    window.position = limits.clamp_position(position);
    true
}

/// Resizes a window, flooring to the minimum size. Ignored while maximized.
pub fn set_window_size(state: &mut SessionState, window_id: &WindowId, size: Size) -> bool {
    let limits = state.limits;
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    if window.is_maximized {
        return false;
    }
    window.size = limits.clamp_size(size);
    true
}

/// Applies position and size together, as an edge resize needs. Ignored while maximized.
pub fn set_window_geometry(
    state: &mut SessionState,
    window_id: &WindowId,
    geometry: Geometry,
) -> bool {
    let limits = state.limits;
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    if window.is_maximized {
        return false;
    }
    let geometry = limits.clamp(geometry);
    window.position = geometry.position;
    window.size = geometry.size;
    true
}
