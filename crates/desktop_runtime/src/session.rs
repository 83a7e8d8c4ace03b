//! The desktop session object: owns state, commits reducer results, and publishes snapshots.
//!
//! A session is constructed once at startup and handed to every consumer by reference. Each
//! dispatch runs the reducer against a copy of the state and swaps the copy in only on success, so
//! readers never observe a half-applied action.
//!
//! Hosts that hand the session to hosted content wrap it in a [`SharedSession`], which runs content
//! hooks only after its borrow is released.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    mem,
    rc::Rc,
};

use leptos::logging;
use platform_host::SessionClock;

use crate::config::SessionConfig;
use crate::effect_executor::{deliver, resolve_effects, ContentDelivery};
use crate::interaction::{DragResizeController, GestureSession, PointerCapture};
use crate::model::{
    DesktopId, OpenWindowRequest, PointerPosition, Position, ResizeEdge, SessionSnapshot,
    SessionState, Size, WindowId,
};
use crate::reducer::{
    reduce_create_desktop, reduce_session, SessionAction, SessionEffect, SessionError,
};

/// Handle returned by [`DesktopSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&Rc<SessionSnapshot>)>;

pub struct DesktopSession {
    config: SessionConfig,
    state: SessionState,
    snapshot: Rc<SessionSnapshot>,
    gestures: DragResizeController,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: u64,
    defer_deliveries: bool,
    pending_deliveries: Vec<ContentDelivery>,
}

impl DesktopSession {
    pub fn new(config: SessionConfig) -> Self {
        let state = SessionState::new(&config);
        let snapshot = Rc::new(state.snapshot());
        Self {
            config,
            state,
            snapshot,
            gestures: DragResizeController::new(),
            subscribers: Vec::new(),
            next_subscription_id: 1,
            defer_deliveries: false,
            pending_deliveries: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Latest committed snapshot.
    pub fn snapshot(&self) -> Rc<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Serializes the latest snapshot for diagnostics. Window content is omitted.
    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot.as_ref()).unwrap_or(serde_json::Value::Null)
    }

    /// Registers a callback invoked with every new snapshot.
    ///
    /// Callbacks run while the session is mutably borrowed and must not call back into it.
    pub fn subscribe(&mut self, subscriber: impl Fn(&Rc<SessionSnapshot>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Applies an action, commits the result, runs effects, and notifies subscribers.
    ///
    /// Content hooks run before this returns, unless the session is owned by a [`SharedSession`].
    ///
    /// # Errors
    ///
    /// Propagates [`SessionError`] from the reducer. The committed state is unchanged then.
    pub fn dispatch(&mut self, action: SessionAction) -> Result<Vec<SessionEffect>, SessionError> {
        let mut next = self.state.clone();
        match reduce_session(&mut next, &self.config, action) {
            Ok(effects) => {
                self.commit(next, &effects);
                Ok(effects)
            }
            Err(err) => {
                logging::warn!("desktop session reducer error: {err}");
                Err(err)
            }
        }
    }

    fn commit(&mut self, next: SessionState, effects: &[SessionEffect]) {
        let changed = next != self.state;
        if changed {
            self.state = next;
            self.snapshot = Rc::new(self.state.snapshot());
        }
        let deliveries = resolve_effects(&self.state, effects);
        if self.defer_deliveries {
            self.pending_deliveries.extend(deliveries);
        } else {
            deliver(deliveries);
        }
        if changed {
            for (_, subscriber) in &self.subscribers {
                subscriber(&self.snapshot);
            }
        }
    }

    fn apply(&mut self, action: SessionAction) {
        let _ = self.dispatch(action);
    }

    pub fn open_window(&mut self, req: OpenWindowRequest) {
        self.apply(SessionAction::OpenWindow(req));
    }

    pub fn close_window(&mut self, window_id: &WindowId) {
        self.apply(SessionAction::CloseWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn minimize_window(&mut self, window_id: &WindowId) {
        self.apply(SessionAction::MinimizeWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn maximize_window(&mut self, window_id: &WindowId) {
        self.apply(SessionAction::MaximizeWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn restore_window(&mut self, window_id: &WindowId) {
        self.apply(SessionAction::RestoreWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn focus_window(&mut self, window_id: &WindowId) {
        self.apply(SessionAction::FocusWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn toggle_taskbar_window(&mut self, window_id: &WindowId) {
        self.apply(SessionAction::ToggleTaskbarWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn update_window_position(&mut self, window_id: &WindowId, position: Position) {
        self.apply(SessionAction::UpdateWindowPosition {
            window_id: window_id.clone(),
            position,
        });
    }

    pub fn update_window_size(&mut self, window_id: &WindowId, size: Size) {
        self.apply(SessionAction::UpdateWindowSize {
            window_id: window_id.clone(),
            size,
        });
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.apply(SessionAction::SetViewport { size });
    }

    /// Creates a desktop and returns its id. The current desktop does not change.
    pub fn create_new_desktop(&mut self) -> DesktopId {
        let mut next = self.state.clone();
        let (desktop_id, effects) = reduce_create_desktop(&mut next);
        self.commit(next, &effects);
        desktop_id
    }

    /// Deletes a desktop.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LastDesktop`] for the sole remaining desktop and
    /// [`SessionError::DesktopNotFound`] for unknown ids.
    pub fn delete_desktop(&mut self, desktop_id: DesktopId) -> Result<(), SessionError> {
        self.dispatch(SessionAction::DeleteDesktop { desktop_id })
            .map(|_| ())
    }

    pub fn set_current_desktop(&mut self, desktop_id: DesktopId) {
        self.apply(SessionAction::SetCurrentDesktop { desktop_id });
    }

    pub fn move_window_to_desktop(&mut self, window_id: &WindowId, desktop_id: DesktopId) {
        self.apply(SessionAction::MoveWindowToDesktop {
            window_id: window_id.clone(),
            desktop_id,
        });
    }

    /// Samples `clock` and records the tick.
    pub fn tick(&mut self, clock: &dyn SessionClock) {
        self.apply(SessionAction::ClockTick {
            now_ms: clock.now_ms(),
        });
    }

    /// Title-bar pointer-down. Focuses the window and starts a move unless it is maximized.
    pub fn begin_move(
        &mut self,
        window_id: &WindowId,
        pointer: PointerPosition,
        capture: Box<dyn PointerCapture>,
    ) {
        let snapshot = self.snapshot();
        for action in self
            .gestures
            .begin_move(&snapshot, window_id, pointer, capture)
        {
            self.apply(action);
        }
    }

    /// Resize-handle pointer-down.
    pub fn begin_resize(
        &mut self,
        window_id: &WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
        capture: Box<dyn PointerCapture>,
    ) {
        let snapshot = self.snapshot();
        for action in self
            .gestures
            .begin_resize(&snapshot, window_id, edge, pointer, capture)
        {
            self.apply(action);
        }
    }

    pub fn pointer_move(&mut self, pointer: PointerPosition) {
        let snapshot = self.snapshot();
        if let Some(action) = self.gestures.update(&snapshot, pointer) {
            self.apply(action);
        }
    }

    pub fn pointer_up(&mut self) {
        self.gestures.end();
    }

    pub fn pointer_cancel(&mut self) {
        self.gestures.cancel();
    }

    pub fn active_gesture(&self) -> Option<&GestureSession> {
        self.gestures.active()
    }
}

impl Default for DesktopSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Shared, clonable handle to a [`DesktopSession`].
///
/// Content hooks triggered by a call run after the handle's borrow is released, so hosted content
/// may call back into the session from a hook through its own clone of the handle. Hooks produced
/// by such a nested call are queued behind the ones already pending.
#[derive(Clone)]
pub struct SharedSession {
    session: Rc<RefCell<DesktopSession>>,
    outbox: Rc<RefCell<VecDeque<ContentDelivery>>>,
    delivering: Rc<Cell<bool>>,
}

impl SharedSession {
    pub fn new(config: SessionConfig) -> Self {
        let mut session = DesktopSession::new(config);
        session.defer_deliveries = true;
        Self {
            session: Rc::new(RefCell::new(session)),
            outbox: Rc::default(),
            delivering: Rc::default(),
        }
    }

    /// Latest committed snapshot.
    pub fn snapshot(&self) -> Rc<SessionSnapshot> {
        self.session.borrow().snapshot()
    }

    /// Runs `f` against the session, then delivers the content hooks it produced.
    ///
    /// # Panics
    ///
    /// Panics if called from inside `f` or from a snapshot subscriber, which both run while the
    /// session is borrowed.
    pub fn update<R>(&self, f: impl FnOnce(&mut DesktopSession) -> R) -> R {
        let result = {
            let mut session = self.session.borrow_mut();
            let result = f(&mut session);
            self.outbox
                .borrow_mut()
                .extend(mem::take(&mut session.pending_deliveries));
            result
        };
        if !self.delivering.replace(true) {
            while let Some(delivery) = self.next_delivery() {
                delivery.run();
            }
            self.delivering.set(false);
        }
        result
    }

    fn next_delivery(&self) -> Option<ContentDelivery> {
        self.outbox.borrow_mut().pop_front()
    }

    /// [`DesktopSession::dispatch`] through the shared handle.
    ///
    /// # Errors
    ///
    /// Propagates [`SessionError`] from the reducer.
    pub fn dispatch(&self, action: SessionAction) -> Result<Vec<SessionEffect>, SessionError> {
        self.update(|session| session.dispatch(action))
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use desktop_app_contract::ContentHandle;
    use platform_host::ManualClock;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn subscribers_see_only_committed_changes() {
        let mut session = DesktopSession::default();
        let seen = Rc::new(RefCell::new(Vec::<usize>::new()));
        let sink = seen.clone();
        let id = session.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.windows.len()));

        session.open_window(OpenWindowRequest::new("a", "A", ContentHandle::empty()));
        session.focus_window(&WindowId::new("a"));
        session.close_window(&WindowId::new("ghost"));
        let _ = session.delete_desktop(DesktopId(1));
        session.open_window(OpenWindowRequest::new("b", "B", ContentHandle::empty()));

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
    }

    #[test]
    fn snapshots_are_replaced_not_mutated() {
        let mut session = DesktopSession::default();
        let before = session.snapshot();

        session.open_window(OpenWindowRequest::new("a", "A", ContentHandle::empty()));

        assert!(before.windows.is_empty());
        assert_eq!(session.snapshot().windows.len(), 1);
        assert!(!Rc::ptr_eq(&before, &session.snapshot()));
    }

    #[test]
    fn create_new_desktop_returns_allocated_id() {
        let mut session = DesktopSession::default();

        assert_eq!(session.create_new_desktop(), DesktopId(2));
        assert_eq!(session.create_new_desktop(), DesktopId(3));
        assert_eq!(session.snapshot().current_desktop_id, DesktopId(1));
    }

    #[test]
    fn clock_tick_publishes_once_per_second() {
        let mut session = DesktopSession::default();
        let notified = Rc::new(Cell::new(0));
        let counter = notified.clone();
        session.subscribe(move |_| counter.set(counter.get() + 1));
        let clock = ManualClock::at(1_000_000);

        session.tick(&clock);
        clock.advance(400);
        session.tick(&clock);
        clock.advance(600);
        session.tick(&clock);

        assert_eq!(notified.get(), 2);
        assert_eq!(session.snapshot().clock_ms, 1_001_000);
    }

    #[test]
    fn snapshot_json_omits_content() {
        let mut session = DesktopSession::default();
        session.open_window(OpenWindowRequest::new("a", "A", ContentHandle::empty()));

        let json = session.snapshot_json();
        assert_eq!(json["windows"][0]["id"], "a");
        assert!(json["windows"][0].get("content").is_none());
        assert_eq!(json["current_desktop_id"], 1);
    }
}
