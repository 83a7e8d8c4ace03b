//! Virtual desktop transitions.
//!
//! Desktops own no window lists; a window belongs to a desktop through its `desktop_id`.

use crate::config::DesktopDeletionPolicy;
use crate::focus::focus_top_of_current_desktop;
use crate::model::{DesktopId, SessionState, WindowId, WindowInstance};
use crate::reducer::SessionError;

/// Appends a freshly allocated desktop. The current desktop is left unchanged.
pub fn create_desktop(state: &mut SessionState) -> DesktopId {
    let desktop_id = state.allocate_desktop_id();
    state.available_desktop_ids.push(desktop_id);
    desktop_id
}

/// Outcome of a successful desktop deletion.
#[derive(Debug, Default)]
pub struct DesktopRemoval {
    /// Windows closed under [`DesktopDeletionPolicy::Close`].
    pub closed: Vec<WindowInstance>,
    /// Windows reassigned under [`DesktopDeletionPolicy::Migrate`].
    pub migrated: Vec<WindowId>,
}

/// Deletes a desktop and disposes of its windows according to `policy`.
///
/// When the current desktop is deleted the lowest remaining id becomes current. Migrated windows
/// land on whichever desktop is current after the deletion.
///
/// # Errors
///
/// Returns [`SessionError::LastDesktop`] when `desktop_id` is the only desktop and
/// [`SessionError::DesktopNotFound`] when it does not exist. The state is untouched in both cases.
pub fn delete_desktop(
    state: &mut SessionState,
    desktop_id: DesktopId,
    policy: DesktopDeletionPolicy,
) -> Result<DesktopRemoval, SessionError> {
    if !state.has_desktop(desktop_id) {
        return Err(SessionError::DesktopNotFound(desktop_id));
    }
    if state.available_desktop_ids.len() == 1 {
        return Err(SessionError::LastDesktop(desktop_id));
    }

    state.available_desktop_ids.retain(|id| *id != desktop_id);
    let switched = state.current_desktop_id == desktop_id;
    if switched {
        if let Some(lowest) = state.available_desktop_ids.iter().min().copied() {
            state.current_desktop_id = lowest;
        }
    }

    let mut removal = DesktopRemoval::default();
    match policy {
        DesktopDeletionPolicy::Migrate => {
            let target = state.current_desktop_id;
            for window in state
                .windows
                .iter_mut()
                .filter(|w| w.desktop_id == desktop_id)
            {
                window.desktop_id = target;
                removal.migrated.push(window.id.clone());
            }
        }
        DesktopDeletionPolicy::Close => {
            let (closed, kept): (Vec<WindowInstance>, Vec<WindowInstance>) = std::mem::take(&mut state.windows)
                .into_iter()
                .partition(|w| w.desktop_id == desktop_id);
            state.windows = kept;
            removal.closed = closed;
        }
    }

    if switched {
        focus_top_of_current_desktop(state);
    }
    Ok(removal)
}

/// Switches the current desktop. Unknown ids and the already current desktop are ignored.
///
/// Focus moves to the top non-minimized window of the new desktop; windows are not mutated.
pub fn set_current_desktop(state: &mut SessionState, desktop_id: DesktopId) -> bool {
    if !state.has_desktop(desktop_id) || state.current_desktop_id == desktop_id {
        return false;
    }
    state.current_desktop_id = desktop_id;
    focus_top_of_current_desktop(state);
    true
}

/// Reassigns a window to another existing desktop.
pub fn move_window_to_desktop(
    state: &mut SessionState,
    window_id: &WindowId,
    desktop_id: DesktopId,
) -> bool {
    if !state.has_desktop(desktop_id) {
        return false;
    }
    match state.window_mut(window_id) {
        Some(window) if window.desktop_id != desktop_id => {
            window.desktop_id = desktop_id;
            true
        }
        _ => false,
    }
}
