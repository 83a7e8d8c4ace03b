use std::fmt;

use desktop_app_contract::ContentHandle;
use serde::{Deserialize, Serialize};

use crate::chrome::SessionChrome;
use crate::config::SessionConfig;

/// Height of the menu bar strip that windows may never slide under.
pub const MENU_BAR_HEIGHT: i32 = 32;
pub const DEFAULT_WINDOW_WIDTH: i32 = 640;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 420;
/// Smallest width that keeps the title bar controls reachable.
pub const MIN_WINDOW_WIDTH: i32 = 200;
/// Smallest height that keeps the title bar controls reachable.
pub const MIN_WINDOW_HEIGHT: i32 = 150;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub String);

impl WindowId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for WindowId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DesktopId(pub u32);

impl fmt::Display for DesktopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub position: Position,
    pub size: Size,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            position: Position { x, y },
            size: Size { width, height },
        }
    }

    pub fn right(self) -> i32 {
        self.position.x.saturating_add(self.size.width)
    }

    pub fn bottom(self) -> i32 {
        self.position.y.saturating_add(self.size.height)
    }
}

/// Geometry limits every managed window is held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowLimits {
    pub menu_bar_height: i32,
    pub min_width: i32,
    pub min_height: i32,
}

impl WindowLimits {
    pub fn clamp_position(self, position: Position) -> Position {
        Position {
            x: position.x,
            y: position.y.max(self.menu_bar_height),
        }
    }

    pub fn clamp_size(self, size: Size) -> Size {
        Size {
            width: size.width.max(self.min_width),
            height: size.height.max(self.min_height),
        }
    }

    pub fn clamp(self, geometry: Geometry) -> Geometry {
        Geometry {
            position: self.clamp_position(geometry.position),
            size: self.clamp_size(geometry.size),
        }
    }
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            menu_bar_height: MENU_BAR_HEIGHT,
            min_width: MIN_WINDOW_WIDTH,
            min_height: MIN_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowInstance {
    pub id: WindowId,
    pub title: String,
    #[serde(skip)]
    pub content: ContentHandle,
    pub position: Position,
    pub size: Size,
    pub z_index: u64,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub desktop_id: DesktopId,
    pub prior_geometry: Option<Geometry>,
}

impl WindowInstance {
    pub fn geometry(&self) -> Geometry {
        Geometry {
            position: self.position,
            size: self.size,
        }
    }

    /// Whether the window should be drawn while `desktop_id` is current.
    pub fn is_visible_on(&self, desktop_id: DesktopId) -> bool {
        self.desktop_id == desktop_id && !self.is_minimized
    }
}

/// Caller-supplied description of a window to open.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenWindowRequest {
    pub id: WindowId,
    pub title: String,
    pub content: ContentHandle,
    pub geometry: Option<Geometry>,
}

impl OpenWindowRequest {
    pub fn new(id: impl Into<WindowId>, title: impl Into<String>, content: ContentHandle) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content,
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// Mutable session state owned by [`crate::session::DesktopSession`].
///
/// Only the reducer mutates this type; readers receive a [`SessionSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub windows: Vec<WindowInstance>,
    pub focused_window_id: Option<WindowId>,
    pub current_desktop_id: DesktopId,
    pub available_desktop_ids: Vec<DesktopId>,
    pub next_z_index: u64,
    pub next_desktop_id: u32,
    pub viewport: Size,
    pub limits: WindowLimits,
    pub chrome: SessionChrome,
}

impl SessionState {
    /// Creates a session with a single desktop and no windows.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            windows: Vec::new(),
            focused_window_id: None,
            current_desktop_id: DesktopId(1),
            available_desktop_ids: vec![DesktopId(1)],
            next_z_index: 1,
            next_desktop_id: 2,
            viewport: config.viewport,
            limits: config.limits(),
            chrome: SessionChrome::new(config.dark_mode),
        }
    }

    pub fn window(&self, window_id: &WindowId) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| &w.id == window_id)
    }

    pub fn window_mut(&mut self, window_id: &WindowId) -> Option<&mut WindowInstance> {
        self.windows.iter_mut().find(|w| &w.id == window_id)
    }

    pub fn has_desktop(&self, desktop_id: DesktopId) -> bool {
        self.available_desktop_ids.contains(&desktop_id)
    }

    pub fn allocate_z_index(&mut self) -> u64 {
        let z_index = self.next_z_index;
        self.next_z_index = self.next_z_index.saturating_add(1);
        z_index
    }

    pub fn allocate_desktop_id(&mut self) -> DesktopId {
        let id = DesktopId(self.next_desktop_id);
        self.next_desktop_id = self.next_desktop_id.saturating_add(1);
        id
    }

    /// Area below the menu bar that a maximized window fills.
    pub fn work_area(&self) -> Geometry {
        let top = self.limits.menu_bar_height;
        Geometry::new(
            0,
            top,
            self.viewport.width.max(0),
            self.viewport.height.saturating_sub(top).max(0),
        )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            windows: self.windows.clone(),
            focused_window_id: self.focused_window_id.clone(),
            current_desktop_id: self.current_desktop_id,
            available_desktop_ids: self.available_desktop_ids.clone(),
            work_area: self.work_area(),
            limits: self.limits,
            is_dock_visible: self.chrome.is_dock_visible,
            is_dark_mode: self.chrome.is_dark_mode,
            is_locked: self.chrome.is_locked,
            clock_ms: self.chrome.clock_ms,
        }
    }
}

/// Immutable view of the session emitted after every committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub windows: Vec<WindowInstance>,
    pub focused_window_id: Option<WindowId>,
    pub current_desktop_id: DesktopId,
    pub available_desktop_ids: Vec<DesktopId>,
    pub work_area: Geometry,
    pub limits: WindowLimits,
    pub is_dock_visible: bool,
    pub is_dark_mode: bool,
    pub is_locked: bool,
    pub clock_ms: u64,
}

impl SessionSnapshot {
    pub fn window(&self, window_id: &WindowId) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| &w.id == window_id)
    }

    pub fn focused_window(&self) -> Option<&WindowInstance> {
        self.focused_window_id
            .as_ref()
            .and_then(|id| self.window(id))
    }

    pub fn windows_on(&self, desktop_id: DesktopId) -> Vec<&WindowInstance> {
        self.windows
            .iter()
            .filter(|w| w.desktop_id == desktop_id)
            .collect()
    }

    /// Windows the view layer should draw, back to front.
    pub fn visible_windows(&self) -> Vec<&WindowInstance> {
        let mut visible: Vec<_> = self
            .windows
            .iter()
            .filter(|w| w.is_visible_on(self.current_desktop_id))
            .collect();
        visible.sort_by_key(|w| w.z_index);
        visible
    }

    pub fn is_visible(&self, window_id: &WindowId) -> bool {
        self.window(window_id)
            .map(|w| w.is_visible_on(self.current_desktop_id))
            .unwrap_or(false)
    }

    /// Geometry the window occupies on screen; maximized windows fill the work area.
    pub fn effective_geometry(&self, window_id: &WindowId) -> Option<Geometry> {
        self.window(window_id).map(|w| {
            if w.is_maximized {
                self.work_area
            } else {
                w.geometry()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn limits_clamp_menu_bar_and_minimum_size() {
        let limits = WindowLimits::default();
        let clamped = limits.clamp(Geometry::new(-40, 5, 10, 900));

        assert_eq!(clamped, Geometry::new(-40, MENU_BAR_HEIGHT, MIN_WINDOW_WIDTH, 900));
    }

    #[test]
    fn work_area_excludes_menu_bar() {
        let state = SessionState::new(&SessionConfig::default());

        assert_eq!(state.work_area(), Geometry::new(0, 32, 1280, 768));
    }

    #[test]
    fn counters_only_move_forward() {
        let mut state = SessionState::new(&SessionConfig::default());

        assert_eq!(state.allocate_z_index(), 1);
        assert_eq!(state.allocate_z_index(), 2);
        assert_eq!(state.allocate_desktop_id(), DesktopId(2));
        assert_eq!(state.allocate_desktop_id(), DesktopId(3));
    }
}
