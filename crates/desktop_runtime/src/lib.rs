//! Window and virtual-desktop session manager for the browser desktop shell.
//!
//! [`DesktopSession`] owns every open window, the virtual desktop set, and the shell chrome flags.
//! All mutations go through [`reduce_session`]; consumers read immutable [`SessionSnapshot`]s.

pub mod chrome;
pub mod config;
pub mod desktops;
pub mod effect_executor;
pub mod focus;
pub mod interaction;
pub mod model;
pub mod reducer;
pub mod runtime_context;
pub mod session;
pub mod window_manager;

pub use chrome::{SessionChrome, CLOCK_TICK_INTERVAL_MS};
pub use config::{ConfigError, DesktopDeletionPolicy, SessionConfig};
pub use interaction::{DragResizeController, GestureSession, PointerCapture};
pub use model::*;
pub use reducer::{
    reduce_create_desktop, reduce_session, SessionAction, SessionEffect, SessionError,
};
pub use runtime_context::{
    use_desktop_session, window_frame_style, SessionProvider, SessionRuntimeContext,
};
pub use session::{DesktopSession, SharedSession, SubscriptionId};
