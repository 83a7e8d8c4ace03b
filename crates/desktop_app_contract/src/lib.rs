//! Shared contract types between the desktop session manager and hosted window content.
//!
//! The session manager treats window content as opaque. It mounts content when a window is
//! created, unmounts it when the window is closed, and forwards lifecycle transitions in between.
//! Nothing in this contract lets the manager look inside the content.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle events emitted by the desktop session manager.
pub enum AppLifecycleEvent {
    /// Content has been mounted into a managed window.
    Mounted,
    /// Window became focused.
    Focused,
    /// Window lost focus.
    Blurred,
    /// Window was minimized.
    Minimized,
    /// Window was restored from a minimized or maximized state.
    Restored,
    /// Window entered the maximized state.
    Maximized,
    /// Window was moved to another virtual desktop.
    DesktopChanged,
    /// Window close sequence completed.
    Closed,
}

impl AppLifecycleEvent {
    /// Returns a stable string token for debugging hooks.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::Focused => "focused",
            Self::Blurred => "blurred",
            Self::Minimized => "minimized",
            Self::Restored => "restored",
            Self::Maximized => "maximized",
            Self::DesktopChanged => "desktop-changed",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Context passed to content when it is mounted into a window.
pub struct ContentMountContext {
    /// Caller-supplied window id.
    pub window_id: String,
    /// Window title at mount time.
    pub title: String,
    /// Virtual desktop that owns the window at mount time.
    pub desktop_id: u32,
}

/// Capability contract for content hosted inside a managed window.
///
/// Implementations own their own rendering and persistence. The manager only calls these hooks.
///
/// A hook may call back into the session only through a shared handle that delivers hooks after
/// releasing its own borrow. A session owned directly by the caller runs hooks during the call
/// that triggered them, so re-entering it from a hook is not possible.
pub trait WindowContent {
    /// Attaches the content to its window.
    fn mount(&self, context: &ContentMountContext);

    /// Detaches the content; called exactly once when the window closes.
    fn unmount(&self);

    /// Receives a lifecycle transition for the owning window.
    fn on_lifecycle(&self, _event: AppLifecycleEvent) {}
}

/// Content that renders nothing. Used when a caller opens a window without content.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContent;

impl WindowContent for EmptyContent {
    fn mount(&self, _context: &ContentMountContext) {}

    fn unmount(&self) {}
}

/// Opaque, cheaply clonable handle to externally supplied window content.
///
/// Two handles compare equal only when they point at the same content instance.
#[derive(Clone)]
pub struct ContentHandle(Rc<dyn WindowContent>);

impl ContentHandle {
    /// Wraps a content implementation in a handle.
    pub fn new(content: impl WindowContent + 'static) -> Self {
        Self(Rc::new(content))
    }

    /// Wraps already shared content, so the caller can keep its own reference.
    pub fn from_rc(content: Rc<dyn WindowContent>) -> Self {
        Self(content)
    }

    /// Returns a handle to [`EmptyContent`].
    pub fn empty() -> Self {
        Self::new(EmptyContent)
    }

    /// Mounts the underlying content.
    pub fn mount(&self, context: &ContentMountContext) {
        self.0.mount(context);
        self.0.on_lifecycle(AppLifecycleEvent::Mounted);
    }

    /// Unmounts the underlying content.
    pub fn unmount(&self) {
        self.0.on_lifecycle(AppLifecycleEvent::Closed);
        self.0.unmount();
    }

    /// Forwards a lifecycle event to the underlying content.
    pub fn notify(&self, event: AppLifecycleEvent) {
        self.0.on_lifecycle(event);
    }
}

impl Default for ContentHandle {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for ContentHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentHandle(..)")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl WindowContent for Recorder {
        fn mount(&self, context: &ContentMountContext) {
            self.calls
                .borrow_mut()
                .push(format!("mount:{}", context.window_id));
        }

        fn unmount(&self) {
            self.calls.borrow_mut().push("unmount".to_string());
        }

        fn on_lifecycle(&self, event: AppLifecycleEvent) {
            self.calls.borrow_mut().push(event.token().to_string());
        }
    }

    #[test]
    fn handles_compare_by_identity() {
        let first = ContentHandle::empty();
        let second = ContentHandle::empty();

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn mount_and_unmount_bracket_lifecycle_events() {
        let recorder = Rc::new(Recorder::default());
        let handle = ContentHandle::from_rc(recorder.clone());

        handle.mount(&ContentMountContext {
            window_id: "notes".to_string(),
            title: "Notes".to_string(),
            desktop_id: 1,
        });
        handle.notify(AppLifecycleEvent::Focused);
        handle.unmount();

        assert_eq!(
            *recorder.calls.borrow(),
            vec![
                "mount:notes".to_string(),
                "mounted".to_string(),
                "focused".to_string(),
                "closed".to_string(),
                "unmount".to_string(),
            ]
        );
    }
}
