//! Leptos provider and context wiring for the desktop session.
//!
//! The provider owns the [`SharedSession`], mirrors each committed snapshot into a signal, drives
//! the one-second clock tick, and installs window-level pointer listeners only for the lifetime of
//! an active move/resize gesture.

use std::{rc::Rc, time::Duration};

use leptos::leptos_dom::helpers::WindowListenerHandle;
use leptos::*;
use platform_host::SystemClock;

use crate::chrome::CLOCK_TICK_INTERVAL_MS;
use crate::config::SessionConfig;
use crate::interaction::PointerCapture;
use crate::model::{PointerPosition, ResizeEdge, SessionSnapshot, WindowId, WindowInstance};
use crate::reducer::SessionAction;
use crate::session::SharedSession;

#[derive(Clone)]
/// Leptos context for reading session snapshots and dispatching [`SessionAction`] values.
pub struct SessionRuntimeContext {
    /// The session itself. Content hooks run after each call releases it.
    pub session: SharedSession,
    /// Latest committed snapshot.
    pub snapshot: RwSignal<Rc<SessionSnapshot>>,
    /// Action dispatch callback.
    pub dispatch: Callback<SessionAction>,
}

impl SessionRuntimeContext {
    /// Dispatches an action through the context callback.
    pub fn dispatch_action(&self, action: SessionAction) {
        self.dispatch.call(action);
    }

    /// Title-bar pointer-down handler.
    pub fn begin_move(&self, window_id: WindowId, ev: &web_sys::PointerEvent) {
        let capture = WindowPointerCapture::install(self.clone());
        let pointer = pointer_from_pointer_event(ev);
        self.session
            .update(|session| session.begin_move(&window_id, pointer, Box::new(capture)));
        publish(&self.session, self.snapshot);
    }

    /// Resize-handle pointer-down handler.
    pub fn begin_resize(&self, window_id: WindowId, edge: ResizeEdge, ev: &web_sys::PointerEvent) {
        let capture = WindowPointerCapture::install(self.clone());
        let pointer = pointer_from_pointer_event(ev);
        self.session.update(|session| {
            session.begin_resize(&window_id, edge, pointer, Box::new(capture));
        });
        publish(&self.session, self.snapshot);
    }

    fn pointer_move(&self, pointer: PointerPosition) {
        self.session.update(|session| session.pointer_move(pointer));
        publish(&self.session, self.snapshot);
    }

    fn end_pointer_interaction(&self) {
        self.session.update(|session| session.pointer_up());
    }

    fn cancel_pointer_interaction(&self) {
        self.session.update(|session| session.pointer_cancel());
    }
}

/// Pointer listeners attached to the browser window for one gesture.
pub struct WindowPointerCapture {
    handles: Vec<WindowListenerHandle>,
}

impl WindowPointerCapture {
    fn install(runtime: SessionRuntimeContext) -> Self {
        let on_move = runtime.clone();
        let on_up = runtime.clone();
        let on_cancel = runtime;
        Self {
            handles: vec![
                window_event_listener(ev::pointermove, move |ev| {
                    on_move.pointer_move(pointer_from_pointer_event(&ev));
                }),
                window_event_listener(ev::pointerup, move |_| on_up.end_pointer_interaction()),
                window_event_listener(ev::pointercancel, move |_| {
                    on_cancel.cancel_pointer_interaction();
                }),
            ],
        }
    }
}

impl PointerCapture for WindowPointerCapture {
    fn release(&mut self) {
        for handle in self.handles.drain(..) {
            handle.remove();
        }
    }
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

fn publish(session: &SharedSession, snapshot: RwSignal<Rc<SessionSnapshot>>) {
    let next = session.snapshot();
    if !snapshot.with_untracked(|current| Rc::ptr_eq(current, &next)) {
        snapshot.set(next);
    }
}

#[cfg(target_arch = "wasm32")]
fn install_viewport_sync(session: SharedSession, snapshot: RwSignal<Rc<SessionSnapshot>>) {
    fn viewport_size() -> Option<crate::model::Size> {
        let window = window();
        Some(crate::model::Size {
            width: window.inner_width().ok()?.as_f64()? as i32,
            height: window.inner_height().ok()?.as_f64()? as i32,
        })
    }

    let sync = move || {
        if let Some(size) = viewport_size() {
            session.update(|s| s.set_viewport(size));
            publish(&session, snapshot);
        }
    };
    sync();
    let listener = window_event_listener(ev::resize, move |_| sync());
    on_cleanup(move || listener.remove());
}

#[cfg(not(target_arch = "wasm32"))]
fn install_viewport_sync(_: SharedSession, _: RwSignal<Rc<SessionSnapshot>>) {}

fn install_clock_tick(session: SharedSession, snapshot: RwSignal<Rc<SessionSnapshot>>) {
    let tick = move || {
        session.update(|s| s.tick(&SystemClock));
        publish(&session, snapshot);
    };
    tick();
    match set_interval_with_handle(tick, Duration::from_millis(CLOCK_TICK_INTERVAL_MS)) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => logging::warn!("session clock tick unavailable: {err:?}"),
    }
}

#[component]
/// Provides [`SessionRuntimeContext`] to descendant components.
pub fn SessionProvider(
    /// Session settings; defaults apply when omitted.
    #[prop(optional)]
    config: Option<SessionConfig>,
    children: Children,
) -> impl IntoView {
    let session = SharedSession::new(config.unwrap_or_default());
    let snapshot = create_rw_signal(session.snapshot());

    let dispatch = Callback::new({
        let session = session.clone();
        move |action: SessionAction| {
            let result = session.dispatch(action);
            if result.is_ok() {
                publish(&session, snapshot);
            }
        }
    });

    provide_context(SessionRuntimeContext {
        session: session.clone(),
        snapshot,
        dispatch,
    });

    install_viewport_sync(session.clone(), snapshot);
    install_clock_tick(session.clone(), snapshot);
    on_cleanup(move || session.update(|s| s.pointer_cancel()));

    children().into_view()
}

/// Returns the current [`SessionRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`SessionProvider`].
pub fn use_desktop_session() -> SessionRuntimeContext {
    use_context::<SessionRuntimeContext>().expect("SessionRuntimeContext not provided")
}

/// Inline CSS placing a window frame; maximized windows fill the work area.
pub fn window_frame_style(snapshot: &SessionSnapshot, window: &WindowInstance) -> String {
    let geometry = snapshot
        .effective_geometry(&window.id)
        .unwrap_or_else(|| window.geometry());
    format!(
        "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
        geometry.position.x,
        geometry.position.y,
        geometry.size.width,
        geometry.size.height,
        window.z_index
    )
}
