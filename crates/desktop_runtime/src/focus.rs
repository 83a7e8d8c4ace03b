//! Focus and stacking rules shared by every window and desktop transition.

use crate::model::{DesktopId, SessionState, WindowId, WindowInstance};

/// Picks the window that should receive focus after the current one goes away.
///
/// Candidates are non-minimized windows on `current_desktop`, other than `excluded`; the one with
/// the highest z-index wins.
pub fn next_focus_candidate<'a>(
    windows: &'a [WindowInstance],
    current_desktop: DesktopId,
    excluded: Option<&WindowId>,
) -> Option<&'a WindowInstance> {
    windows
        .iter()
        .filter(|w| w.is_visible_on(current_desktop))
        .filter(|w| Some(&w.id) != excluded)
        .max_by_key(|w| w.z_index)
}

/// Whether `window_id` may hold focus in `state`.
pub fn is_focusable(state: &SessionState, window_id: &WindowId) -> bool {
    state
        .window(window_id)
        .map(|w| w.is_visible_on(state.current_desktop_id))
        .unwrap_or(false)
}

/// Re-establishes the focus invariant after a transition.
///
/// A focus pointer that names a closed, minimized, or off-desktop window is handed to the next
/// candidate. A `None` focus is left alone. Returns `true` when focus changed.
pub fn normalize_focus(state: &mut SessionState) -> bool {
    let Some(focused) = state.focused_window_id.clone() else {
        return false;
    };
    if is_focusable(state, &focused) {
        return false;
    }

    let next = next_focus_candidate(&state.windows, state.current_desktop_id, Some(&focused))
        .map(|w| w.id.clone());
    state.focused_window_id = next;
    true
}

/// Hands focus to the top window of the current desktop, whatever it was before.
pub fn focus_top_of_current_desktop(state: &mut SessionState) {
    state.focused_window_id = next_focus_candidate(&state.windows, state.current_desktop_id, None)
        .map(|w| w.id.clone());
}

/// Whether `window_id` is focused and already carries the highest z-index in the session.
pub fn is_focused_top(state: &SessionState, window_id: &WindowId) -> bool {
    if state.focused_window_id.as_ref() != Some(window_id) {
        return false;
    }
    let Some(window) = state.window(window_id) else {
        return false;
    };
    !window.is_minimized
        && state
            .windows
            .iter()
            .all(|w| w.id == window.id || w.z_index < window.z_index)
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::ContentHandle;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SessionConfig;
    use crate::model::{Position, Size};

    fn window(id: &str, z_index: u64, desktop: u32, minimized: bool) -> WindowInstance {
        WindowInstance {
            id: WindowId::new(id),
            title: id.to_string(),
            content: ContentHandle::empty(),
            position: Position { x: 0, y: 40 },
            size: Size {
                width: 300,
                height: 200,
            },
            z_index,
            is_minimized: minimized,
            is_maximized: false,
            desktop_id: DesktopId(desktop),
            prior_geometry: None,
        }
    }

    #[test]
    fn candidate_is_highest_visible_window_on_current_desktop() {
        let windows = vec![
            window("a", 1, 1, false),
            window("b", 4, 1, true),
            window("c", 3, 1, false),
            window("d", 9, 2, false),
        ];

        let picked = next_focus_candidate(&windows, DesktopId(1), None).map(|w| w.id.as_str());
        assert_eq!(picked, Some("c"));

        let excluded = WindowId::new("c");
        let picked =
            next_focus_candidate(&windows, DesktopId(1), Some(&excluded)).map(|w| w.id.as_str());
        assert_eq!(picked, Some("a"));
    }

    #[test]
    fn candidate_is_none_without_visible_windows() {
        let windows = vec![window("a", 1, 1, true), window("b", 2, 2, false)];

        assert!(next_focus_candidate(&windows, DesktopId(1), None).is_none());
    }

    #[test]
    fn normalize_moves_focus_off_minimized_window() {
        let mut state = SessionState::new(&SessionConfig::default());
        state.windows = vec![window("a", 1, 1, false), window("b", 2, 1, true)];
        state.focused_window_id = Some(WindowId::new("b"));

        assert!(normalize_focus(&mut state));
        assert_eq!(state.focused_window_id, Some(WindowId::new("a")));
        assert!(!normalize_focus(&mut state));
    }
}
