use gpui::{
    App, Context, Div, Entity, EventEmitter, FocusHandle, Focusable, InteractiveElement,
    MouseButton, Stateful, StatefulInteractiveElement, Subscription, Window,
};

/// A raw interaction signal raised by a [`HoverTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionEvent {
    PointerEnter,
    PointerLeave,
    Focus,
    Blur,
    /// A press landed inside the target.
    PressInside,
    /// A press landed anywhere outside the target.
    PressOutside,
}

impl InteractionEvent {
    pub fn is_activation(self) -> bool {
        matches!(
            self,
            InteractionEvent::PointerEnter | InteractionEvent::Focus | InteractionEvent::PressInside
        )
    }
}

/// The element whose interactions start and stop a preview.
///
/// A player binds to its own container by default. Hosts that want playback
/// to follow a different element create a `HoverTarget`, wire their element
/// with [`HoverTarget::wire`] and hand the entity to the player.
pub struct HoverTarget {
    focus_handle: FocusHandle,
    _focus_subscriptions: [Subscription; 2],
}

impl EventEmitter<InteractionEvent> for HoverTarget {}

impl Focusable for HoverTarget {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl HoverTarget {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let focus_handle = cx.focus_handle();
        let focus_subscriptions = [
            cx.on_focus(&focus_handle, window, |_, _, cx| {
                cx.emit(InteractionEvent::Focus)
            }),
            cx.on_blur(&focus_handle, window, |_, _, cx| {
                cx.emit(InteractionEvent::Blur)
            }),
        ];
        Self {
            focus_handle,
            _focus_subscriptions: focus_subscriptions,
        }
    }

    /// Routes the pointer and focus events of `element` through `target`.
    pub fn wire(target: &Entity<Self>, element: Stateful<Div>, cx: &App) -> Stateful<Div> {
        let focus_handle = target.read(cx).focus_handle.clone();
        let hover = target.clone();
        let press = target.clone();
        let press_outside = target.clone();

        element
            .track_focus(&focus_handle)
            .on_hover(move |hovered, _window, cx| {
                let event = if *hovered {
                    InteractionEvent::PointerEnter
                } else {
                    InteractionEvent::PointerLeave
                };
                hover.update(cx, |_, cx| cx.emit(event));
            })
            .on_mouse_down(MouseButton::Left, move |_, _window, cx| {
                press.update(cx, |_, cx| cx.emit(InteractionEvent::PressInside));
            })
            .on_mouse_down_out(move |_, _window, cx| {
                press_outside.update(cx, |_, cx| cx.emit(InteractionEvent::PressOutside));
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_signals() {
        assert!(InteractionEvent::PointerEnter.is_activation());
        assert!(InteractionEvent::Focus.is_activation());
        assert!(InteractionEvent::PressInside.is_activation());
        assert!(!InteractionEvent::PointerLeave.is_activation());
        assert!(!InteractionEvent::Blur.is_activation());
        assert!(!InteractionEvent::PressOutside.is_activation());
    }
}
