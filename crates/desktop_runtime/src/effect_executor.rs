//! Executes reducer-emitted effects against hosted window content.
//!
//! Effects are resolved against the committed state into [`ContentDelivery`] values first. A
//! delivery carries its own content handle, so it can run after the session borrow is released.

use desktop_app_contract::{AppLifecycleEvent, ContentHandle, ContentMountContext};

use crate::model::SessionState;
use crate::reducer::SessionEffect;

/// A content hook call bound to its target content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentDelivery {
    Mount {
        content: ContentHandle,
        context: ContentMountContext,
    },
    Notify {
        content: ContentHandle,
        event: AppLifecycleEvent,
    },
    Unmount {
        content: ContentHandle,
    },
}

/// Binds `effects` to the content they target in the committed `state`.
///
/// Effects for windows that no longer exist are dropped, except unmounts, which carry their
/// content with them.
pub fn resolve_effects(state: &SessionState, effects: &[SessionEffect]) -> Vec<ContentDelivery> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            SessionEffect::MountContent(window_id) => {
                state.window(window_id).map(|window| ContentDelivery::Mount {
                    content: window.content.clone(),
                    context: ContentMountContext {
                        window_id: window.id.to_string(),
                        title: window.title.clone(),
                        desktop_id: window.desktop_id.0,
                    },
                })
            }
            SessionEffect::UnmountContent { content, .. } => Some(ContentDelivery::Unmount {
                content: content.clone(),
            }),
            SessionEffect::Lifecycle { window_id, event } => {
                state.window(window_id).map(|window| ContentDelivery::Notify {
                    content: window.content.clone(),
                    event: *event,
                })
            }
            SessionEffect::DesktopCreated(_) | SessionEffect::DesktopDeleted(_) => None,
        })
        .collect()
}

impl ContentDelivery {
    /// Calls the content hook.
    pub fn run(self) {
        match self {
            Self::Mount { content, context } => content.mount(&context),
            Self::Notify { content, event } => content.notify(event),
            Self::Unmount { content } => content.unmount(),
        }
    }
}

/// Calls the content hooks in order.
pub fn deliver(deliveries: Vec<ContentDelivery>) {
    for delivery in deliveries {
        delivery.run();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SessionConfig;
    use crate::model::{DesktopId, OpenWindowRequest, WindowId};
    use crate::window_manager::insert_window;

    #[test]
    fn effects_for_missing_windows_are_dropped_except_unmount() {
        let config = SessionConfig::default();
        let mut state = SessionState::new(&config);
        let content = ContentHandle::empty();
        let id = insert_window(
            &mut state,
            &config,
            OpenWindowRequest::new("a", "Alpha", content.clone()),
        );
        let ghost = WindowId::new("ghost");

        let deliveries = resolve_effects(
            &state,
            &[
                SessionEffect::MountContent(id.clone()),
                SessionEffect::MountContent(ghost.clone()),
                SessionEffect::Lifecycle {
                    window_id: ghost.clone(),
                    event: AppLifecycleEvent::Focused,
                },
                SessionEffect::UnmountContent {
                    window_id: ghost,
                    content: content.clone(),
                },
                SessionEffect::DesktopCreated(DesktopId(2)),
            ],
        );

        assert_eq!(
            deliveries,
            vec![
                ContentDelivery::Mount {
                    content: content.clone(),
                    context: ContentMountContext {
                        window_id: "a".to_string(),
                        title: "Alpha".to_string(),
                        desktop_id: 1,
                    },
                },
                ContentDelivery::Unmount { content },
            ]
        );
    }
}
