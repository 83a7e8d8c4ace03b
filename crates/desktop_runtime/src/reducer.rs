//! Session actions, side-effect intents, and the transition function for the desktop session.

use desktop_app_contract::{AppLifecycleEvent, ContentHandle};
use leptos::logging;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::desktops::{create_desktop, delete_desktop, move_window_to_desktop, set_current_desktop};
use crate::focus::normalize_focus;
use crate::model::{
    DesktopId, Geometry, OpenWindowRequest, Position, SessionState, Size, WindowId,
};
use crate::window_manager::{
    focus_window_internal, insert_window, minimize_window, remove_window, restore_window,
    set_window_geometry, set_window_position, set_window_size, toggle_maximize,
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_session`].
///
/// Window actions naming an unknown window are silently ignored.
pub enum SessionAction {
    /// Open a window, or focus it if the id is already open.
    OpenWindow(OpenWindowRequest),
    /// Close a window.
    CloseWindow {
        /// Window to close.
        window_id: WindowId,
    },
    /// Focus and raise a window, restoring it if minimized.
    FocusWindow {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Minimize a window.
    MinimizeWindow {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Toggle the maximized state of a window.
    MaximizeWindow {
        /// Window to maximize or un-maximize.
        window_id: WindowId,
    },
    /// Clear minimized and maximized state and focus the window.
    RestoreWindow {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Dock button behavior: restore if minimized, minimize if focused, focus otherwise.
    ToggleTaskbarWindow {
        /// Window associated with the dock button.
        window_id: WindowId,
    },
    /// Move a window; `y` is clamped below the menu bar.
    UpdateWindowPosition {
        /// Window to move.
        window_id: WindowId,
        /// New top-left corner.
        position: Position,
    },
    /// Resize a window, flooring to the minimum size.
    UpdateWindowSize {
        /// Window to resize.
        window_id: WindowId,
        /// New size.
        size: Size,
    },
    /// Move and resize a window in one step.
    SetWindowGeometry {
        /// Window to update.
        window_id: WindowId,
        /// New geometry.
        geometry: Geometry,
    },
    /// Record the host viewport size used for maximized windows.
    SetViewport {
        /// Viewport size in pixels.
        size: Size,
    },
    /// Append a new virtual desktop.
    CreateDesktop,
    /// Delete a virtual desktop.
    DeleteDesktop {
        /// Desktop to delete.
        desktop_id: DesktopId,
    },
    /// Switch the current virtual desktop.
    SetCurrentDesktop {
        /// Desktop to show.
        desktop_id: DesktopId,
    },
    /// Reassign a window to another desktop.
    MoveWindowToDesktop {
        /// Window to move.
        window_id: WindowId,
        /// Destination desktop.
        desktop_id: DesktopId,
    },
    /// Flip dock visibility.
    ToggleDock,
    /// Set dock visibility.
    SetDockVisible {
        /// Whether the dock is shown.
        visible: bool,
    },
    /// Set the dark-mode flag.
    SetDarkMode {
        /// Whether dark mode is on.
        enabled: bool,
    },
    /// Flip the dark-mode flag.
    ToggleDarkMode,
    /// Show the lock screen.
    Lock,
    /// Hide the lock screen.
    Unlock,
    /// Periodic clock tick from the host.
    ClockTick {
        /// Current unix time in milliseconds.
        now_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_session`] for the session to execute after commit.
pub enum SessionEffect {
    /// Mount the content of a newly opened window.
    MountContent(WindowId),
    /// Unmount the content of a closed window.
    UnmountContent {
        /// Window that was closed.
        window_id: WindowId,
        /// Its content, no longer reachable through the state.
        content: ContentHandle,
    },
    /// Deliver a lifecycle event to a window's content.
    Lifecycle {
        /// Target window.
        window_id: WindowId,
        /// Event to deliver.
        event: AppLifecycleEvent,
    },
    /// A desktop was created.
    DesktopCreated(DesktopId),
    /// A desktop was deleted.
    DesktopDeleted(DesktopId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors surfaced to callers. Everything else degrades to a no-op.
pub enum SessionError {
    /// The desktop id does not exist.
    #[error("desktop {0} not found")]
    DesktopNotFound(DesktopId),
    /// The desktop is the only one left and cannot be deleted.
    #[error("desktop {0} is the last remaining desktop")]
    LastDesktop(DesktopId),
}

/// Applies a [`SessionAction`] to the session state and collects resulting side effects.
///
/// After every action the focus invariant is re-established and focus changes are reported as
/// [`AppLifecycleEvent::Focused`] / [`AppLifecycleEvent::Blurred`] effects.
///
/// # Errors
///
/// Returns [`SessionError`] only for desktop deletion failures; `state` is left unchanged then.
pub fn reduce_session(
    state: &mut SessionState,
    config: &SessionConfig,
    action: SessionAction,
) -> Result<Vec<SessionEffect>, SessionError> {
    let previous_focus = state.focused_window_id.clone();
    let mut effects = Vec::new();

    apply_action(state, config, action, &mut effects)?;
    normalize_focus(state);

    if state.focused_window_id != previous_focus {
        if let Some(blurred) = previous_focus.filter(|id| state.window(id).is_some()) {
            effects.push(lifecycle(blurred, AppLifecycleEvent::Blurred));
        }
        if let Some(focused) = state.focused_window_id.clone() {
            effects.push(lifecycle(focused, AppLifecycleEvent::Focused));
        }
    }
    Ok(effects)
}

/// Creates a desktop and returns its id with the resulting effects.
///
/// Creation never touches windows or focus, so no focus repair follows.
pub fn reduce_create_desktop(state: &mut SessionState) -> (DesktopId, Vec<SessionEffect>) {
    let desktop_id = create_desktop(state);
    logging::log!("created desktop {desktop_id}");
    (desktop_id, vec![SessionEffect::DesktopCreated(desktop_id)])
}

fn apply_action(
    state: &mut SessionState,
    config: &SessionConfig,
    action: SessionAction,
    effects: &mut Vec<SessionEffect>,
) -> Result<(), SessionError> {
    match action {
        SessionAction::OpenWindow(req) => {
            if state.window(&req.id).is_some() {
                focus_existing(state, &req.id, effects);
            } else {
                let window_id = insert_window(state, config, req);
                effects.push(SessionEffect::MountContent(window_id));
            }
        }
        SessionAction::CloseWindow { window_id } => {
            if let Some(window) = remove_window(state, &window_id) {
                effects.push(SessionEffect::UnmountContent {
                    window_id,
                    content: window.content,
                });
            }
        }
        SessionAction::FocusWindow { window_id } => {
            focus_existing(state, &window_id, effects);
        }
        SessionAction::MinimizeWindow { window_id } => {
            if minimize_window(state, &window_id) {
                effects.push(lifecycle(window_id, AppLifecycleEvent::Minimized));
            }
        }
        SessionAction::MaximizeWindow { window_id } => match toggle_maximize(state, &window_id) {
            Some(true) => {
                focus_window_internal(state, &window_id);
                effects.push(lifecycle(window_id, AppLifecycleEvent::Maximized));
            }
            Some(false) => effects.push(lifecycle(window_id, AppLifecycleEvent::Restored)),
            None => {}
        },
        SessionAction::RestoreWindow { window_id } => {
            if restore_window(state, &window_id) {
                effects.push(lifecycle(window_id.clone(), AppLifecycleEvent::Restored));
            }
            focus_window_internal(state, &window_id);
        }
        SessionAction::ToggleTaskbarWindow { window_id } => {
            let Some(minimized) = state.window(&window_id).map(|w| w.is_minimized) else {
                return Ok(());
            };
            let focused = state.focused_window_id.as_ref() == Some(&window_id);
            let next = if minimized {
                SessionAction::RestoreWindow { window_id }
            } else if focused {
                SessionAction::MinimizeWindow { window_id }
            } else {
                SessionAction::FocusWindow { window_id }
            };
            apply_action(state, config, next, effects)?;
        }
        SessionAction::UpdateWindowPosition {
            window_id,
            position,
        } => {
            set_window_position(state, &window_id, position);
        }
        SessionAction::UpdateWindowSize { window_id, size } => {
            set_window_size(state, &window_id, size);
        }
        SessionAction::SetWindowGeometry {
            window_id,
            geometry,
        } => {
            set_window_geometry(state, &window_id, geometry);
        }
        SessionAction::SetViewport { size } => {
            state.viewport = Size {
                width: size.width.max(0),
                height: size.height.max(0),
            };
        }
        SessionAction::CreateDesktop => {
            let (_, created) = reduce_create_desktop(state);
            effects.extend(created);
        }
        SessionAction::DeleteDesktop { desktop_id } => {
            let removal = delete_desktop(state, desktop_id, config.desktop_deletion)?;
            logging::log!(
                "deleted desktop {desktop_id}: {} windows closed, {} migrated",
                removal.closed.len(),
                removal.migrated.len()
            );
            for window in removal.closed {
                effects.push(SessionEffect::UnmountContent {
                    window_id: window.id,
                    content: window.content,
                });
            }
            for window_id in removal.migrated {
                effects.push(lifecycle(window_id, AppLifecycleEvent::DesktopChanged));
            }
            effects.push(SessionEffect::DesktopDeleted(desktop_id));
        }
        SessionAction::SetCurrentDesktop { desktop_id } => {
            set_current_desktop(state, desktop_id);
        }
        SessionAction::MoveWindowToDesktop {
            window_id,
            desktop_id,
        } => {
            if move_window_to_desktop(state, &window_id, desktop_id) {
                effects.push(lifecycle(window_id, AppLifecycleEvent::DesktopChanged));
            }
        }
        SessionAction::ToggleDock => {
            state.chrome.is_dock_visible = !state.chrome.is_dock_visible;
        }
        SessionAction::SetDockVisible { visible } => {
            state.chrome.is_dock_visible = visible;
        }
        SessionAction::SetDarkMode { enabled } => {
            state.chrome.is_dark_mode = enabled;
        }
        SessionAction::ToggleDarkMode => {
            state.chrome.is_dark_mode = !state.chrome.is_dark_mode;
        }
        SessionAction::Lock => {
            state.chrome.is_locked = true;
        }
        SessionAction::Unlock => {
            state.chrome.is_locked = false;
        }
        SessionAction::ClockTick { now_ms } => {
            state.chrome.apply_tick(now_ms);
        }
    }
    Ok(())
}

fn focus_existing(state: &mut SessionState, window_id: &WindowId, effects: &mut Vec<SessionEffect>) {
    let was_minimized = state
        .window(window_id)
        .map(|w| w.is_minimized)
        .unwrap_or(false);
    if focus_window_internal(state, window_id) && was_minimized {
        effects.push(lifecycle(window_id.clone(), AppLifecycleEvent::Restored));
    }
}

fn lifecycle(window_id: WindowId, event: AppLifecycleEvent) -> SessionEffect {
    SessionEffect::Lifecycle { window_id, event }
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::ContentHandle;
    use pretty_assertions::assert_eq;

    use super::*;

    fn open(state: &mut SessionState, config: &SessionConfig, id: &str) -> Vec<SessionEffect> {
        reduce_session(
            state,
            config,
            SessionAction::OpenWindow(OpenWindowRequest::new(id, id, ContentHandle::empty())),
        )
        .expect("open window")
    }

    fn fresh() -> (SessionState, SessionConfig) {
        let config = SessionConfig::default();
        (SessionState::new(&config), config)
    }

    #[test]
    fn open_window_mounts_then_focuses() {
        let (mut state, config) = fresh();

        let effects = open(&mut state, &config, "a");
        assert_eq!(
            effects,
            vec![
                SessionEffect::MountContent(WindowId::new("a")),
                lifecycle(WindowId::new("a"), AppLifecycleEvent::Focused),
            ]
        );

        let effects = open(&mut state, &config, "b");
        assert_eq!(
            effects,
            vec![
                SessionEffect::MountContent(WindowId::new("b")),
                lifecycle(WindowId::new("a"), AppLifecycleEvent::Blurred),
                lifecycle(WindowId::new("b"), AppLifecycleEvent::Focused),
            ]
        );
        assert_eq!(state.window(&WindowId::new("b")).unwrap().z_index, 2);
    }

    #[test]
    fn reopening_an_open_id_focuses_without_replacing_content() {
        let (mut state, config) = fresh();
        open(&mut state, &config, "a");
        open(&mut state, &config, "b");
        let original = state.window(&WindowId::new("a")).unwrap().content.clone();

        let effects = reduce_session(
            &mut state,
            &config,
            SessionAction::OpenWindow(OpenWindowRequest::new(
                "a",
                "Replacement",
                ContentHandle::empty(),
            )),
        )
        .expect("reopen");

        let window = state.window(&WindowId::new("a")).unwrap();
        assert_eq!(state.windows.len(), 2);
        assert_eq!(window.title, "a");
        assert_eq!(window.content, original);
        assert_eq!(window.z_index, 3);
        assert_eq!(state.focused_window_id, Some(WindowId::new("a")));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, SessionEffect::MountContent(_))));
    }

    #[test]
    fn close_transfers_focus_and_unmounts() {
        let (mut state, config) = fresh();
        open(&mut state, &config, "a");
        open(&mut state, &config, "b");

        let effects = reduce_session(
            &mut state,
            &config,
            SessionAction::CloseWindow {
                window_id: WindowId::new("b"),
            },
        )
        .expect("close");

        assert_eq!(state.focused_window_id, Some(WindowId::new("a")));
        assert!(matches!(
            &effects[0],
            SessionEffect::UnmountContent { window_id, .. } if window_id.as_str() == "b"
        ));
        assert_eq!(
            effects[1],
            lifecycle(WindowId::new("a"), AppLifecycleEvent::Focused)
        );
    }

    #[test]
    fn unknown_window_actions_are_silent_noops() {
        let (mut state, config) = fresh();
        open(&mut state, &config, "a");
        let before = state.clone();
        let ghost = WindowId::new("ghost");

        for action in [
            SessionAction::CloseWindow {
                window_id: ghost.clone(),
            },
            SessionAction::FocusWindow {
                window_id: ghost.clone(),
            },
            SessionAction::MinimizeWindow {
                window_id: ghost.clone(),
            },
            SessionAction::MaximizeWindow {
                window_id: ghost.clone(),
            },
            SessionAction::ToggleTaskbarWindow {
                window_id: ghost.clone(),
            },
            SessionAction::UpdateWindowPosition {
                window_id: ghost.clone(),
                position: Position { x: 1, y: 1 },
            },
            SessionAction::UpdateWindowSize {
                window_id: ghost.clone(),
                size: Size {
                    width: 1,
                    height: 1,
                },
            },
        ] {
            let effects = reduce_session(&mut state, &config, action).expect("no-op");
            assert!(effects.is_empty());
        }
        assert_eq!(state, before);
    }

    #[test]
    fn taskbar_toggle_minimizes_if_focused_and_restores_if_minimized() {
        let (mut state, config) = fresh();
        open(&mut state, &config, "a");
        let a = WindowId::new("a");

        reduce_session(
            &mut state,
            &config,
            SessionAction::ToggleTaskbarWindow {
                window_id: a.clone(),
            },
        )
        .expect("minimize");
        assert!(state.window(&a).unwrap().is_minimized);
        assert_eq!(state.focused_window_id, None);

        reduce_session(
            &mut state,
            &config,
            SessionAction::ToggleTaskbarWindow {
                window_id: a.clone(),
            },
        )
        .expect("restore");
        assert!(!state.window(&a).unwrap().is_minimized);
        assert_eq!(state.focused_window_id, Some(a));
    }

    #[test]
    fn maximize_round_trip_restores_geometry() {
        let (mut state, config) = fresh();
        open(&mut state, &config, "a");
        let a = WindowId::new("a");
        let before = state.window(&a).unwrap().geometry();

        reduce_session(
            &mut state,
            &config,
            SessionAction::MaximizeWindow {
                window_id: a.clone(),
            },
        )
        .expect("maximize");
        assert!(state.window(&a).unwrap().is_maximized);
        assert_eq!(
            state.snapshot().effective_geometry(&a),
            Some(state.work_area())
        );

        reduce_session(
            &mut state,
            &config,
            SessionAction::MaximizeWindow {
                window_id: a.clone(),
            },
        )
        .expect("unmaximize");
        let window = state.window(&a).unwrap();
        assert!(!window.is_maximized);
        assert_eq!(window.geometry(), before);
        assert_eq!(window.prior_geometry, None);
    }

    #[test]
    fn failed_desktop_deletion_reports_error() {
        let (mut state, config) = fresh();

        let err = reduce_session(
            &mut state,
            &config,
            SessionAction::DeleteDesktop {
                desktop_id: DesktopId(1),
            },
        )
        .unwrap_err();

        assert_eq!(err, SessionError::LastDesktop(DesktopId(1)));
        assert_eq!(state.available_desktop_ids, vec![DesktopId(1)]);
    }

    #[test]
    fn chrome_flags_toggle_independently_of_windows() {
        let (mut state, config) = fresh();
        open(&mut state, &config, "a");
        let windows = state.windows.clone();

        for action in [
            SessionAction::ToggleDock,
            SessionAction::SetDarkMode { enabled: true },
            SessionAction::Lock,
            SessionAction::ClockTick { now_ms: 61_500 },
        ] {
            assert!(reduce_session(&mut state, &config, action)
                .expect("chrome")
                .is_empty());
        }

        assert!(!state.chrome.is_dock_visible);
        assert!(state.chrome.is_dark_mode);
        assert!(state.chrome.is_locked);
        assert_eq!(state.chrome.clock_ms, 61_000);
        assert_eq!(state.windows, windows);
    }

    #[test]
    fn viewport_drives_maximized_geometry() {
        let (mut state, config) = fresh();
        reduce_session(
            &mut state,
            &config,
            SessionAction::SetViewport {
                size: Size {
                    width: 1920,
                    height: 1080,
                },
            },
        )
        .expect("viewport");

        assert_eq!(state.work_area(), Geometry::new(0, 32, 1920, 1048));
    }
}
