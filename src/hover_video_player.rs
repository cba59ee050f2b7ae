use crate::config::{HoverVideoPlayerConfig, SizingMode};
use crate::controller::{DisplayState, PlaybackInteractionController};
use crate::element::video;
use crate::error::PlaybackError;
use crate::interaction::{HoverTarget, InteractionEvent};
use crate::media::SourceAttachment;
use crate::overlay::OverlayVisibility;
use crate::timer::{QueuedScheduler, TimerId, TimerRequest};
use crate::video::{MediaEvent, Video};
use gpui::{
    AnyElement, App, AppContext, Context, Entity, EventEmitter, IntoElement, ParentElement,
    Render, Styled, Subscription, Task, Window, div, prelude::*,
};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Interval for draining pipeline messages and picking up new frames.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

type Controller = PlaybackInteractionController<Video, QueuedScheduler>;

/// Builds the content of an overlay layer on every render.
pub type OverlayBuilder = Rc<dyn Fn(&mut Window, &mut App) -> AnyElement>;

/// Events that can be emitted by the hover video player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverVideoPlayerEvent {
    /// An activation started (hover, focus, press or override).
    HoverStart,
    /// The activation ended.
    HoverEnd,
    DisplayStateChanged(DisplayState),
    /// A play attempt or the pipeline failed. The player returns to paused.
    PlaybackFailed(String),
}

/// Optional layers drawn over the video.
#[derive(Clone, Default)]
pub struct Overlays {
    paused: Option<OverlayBuilder>,
    loading: Option<OverlayBuilder>,
    hover: Option<OverlayBuilder>,
}

impl Overlays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shown while the video is not playing; fades out once playback starts.
    pub fn paused<E: IntoElement>(mut self, build: impl Fn(&mut Window, &mut App) -> E + 'static) -> Self {
        self.paused = Some(Rc::new(move |window: &mut Window, cx: &mut App| {
            build(window, cx).into_any_element()
        }));
        self
    }

    /// Shown when a play attempt takes longer than the loading delay.
    pub fn loading<E: IntoElement>(mut self, build: impl Fn(&mut Window, &mut App) -> E + 'static) -> Self {
        self.loading = Some(Rc::new(move |window: &mut Window, cx: &mut App| {
            build(window, cx).into_any_element()
        }));
        self
    }

    /// Shown while the player is hovered or focused, whatever the playback state.
    pub fn hover<E: IntoElement>(mut self, build: impl Fn(&mut Window, &mut App) -> E + 'static) -> Self {
        self.hover = Some(Rc::new(move |window: &mut Window, cx: &mut App| {
            build(window, cx).into_any_element()
        }));
        self
    }
}

/// A video that plays while hovered and pauses behind an overlay otherwise.
pub struct HoverVideoPlayer {
    controller: Controller,
    video: Video,
    config: HoverVideoPlayerConfig,
    overlays: Overlays,

    own_target: Entity<HoverTarget>,
    custom_target: Option<Entity<HoverTarget>>,
    binding: Option<Subscription>,

    timers: HashMap<TimerId, Task<()>>,
    _poll: Task<()>,
}

impl EventEmitter<HoverVideoPlayerEvent> for HoverVideoPlayer {}

impl HoverVideoPlayer {
    /// Creates the media element for `config` and a player entity around it.
    pub fn build(
        config: HoverVideoPlayerConfig,
        overlays: Overlays,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<Entity<Self>, crate::Error> {
        let video = Video::new(&config)?;
        Ok(cx.new(|cx| Self::from_video(video, config, overlays, window, cx)))
    }

    /// Create a player around an existing video.
    pub fn from_video(
        video: Video,
        config: HoverVideoPlayerConfig,
        overlays: Overlays,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let options = config.controller_options(overlays.paused.is_some(), overlays.loading.is_some());
        let controller = PlaybackInteractionController::new(video.clone(), QueuedScheduler::new(), options);
        let own_target = cx.new(|cx| HoverTarget::new(window, cx));

        let poll = cx.spawn(async move |this, cx| {
            loop {
                cx.background_executor().timer(POLL_INTERVAL).await;
                if this.update(cx, |this, cx| this.poll_media(cx)).is_err() {
                    // Entity was dropped
                    break;
                }
            }
        });

        let mut player = Self {
            controller,
            video,
            config,
            overlays,
            own_target,
            custom_target: None,
            binding: None,
            timers: HashMap::new(),
            _poll: poll,
        };
        player.bind_events(cx);
        player.drive(cx, |controller| controller.mount());
        player
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    pub fn config(&self) -> &HoverVideoPlayerConfig {
        &self.config
    }

    pub fn display_state(&self) -> DisplayState {
        self.controller.display_state()
    }

    pub fn is_unloaded(&self) -> bool {
        self.controller.is_unloaded()
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// The element interactions are currently read from.
    pub fn hover_target(&self) -> &Entity<HoverTarget> {
        self.custom_target.as_ref().unwrap_or(&self.own_target)
    }

    /// External override: while `true` the video plays regardless of hover.
    pub fn set_focused(&mut self, focused: bool, cx: &mut Context<Self>) {
        self.config.focused = focused;
        self.drive(cx, |controller| controller.set_focused(focused));
    }

    /// Follow the interactions of another element instead of the player's own
    /// container. `None` returns to the container.
    pub fn set_hover_target(&mut self, target: Option<Entity<HoverTarget>>, cx: &mut Context<Self>) {
        self.custom_target = target;
        self.bind_events(cx);
        cx.notify();
    }

    pub fn set_default_event_handling_disabled(&mut self, disabled: bool, cx: &mut Context<Self>) {
        self.config.disable_default_event_handling = disabled;
        self.bind_events(cx);
        cx.notify();
    }

    /// Forwards a raw interaction signal, for hosts that handle events themselves.
    pub fn interact(&mut self, event: InteractionEvent, cx: &mut Context<Self>) {
        self.drive(cx, |controller| {
            if event.is_activation() {
                controller.on_activate();
            } else {
                controller.on_deactivate();
            }
        });
    }

    /// Releases the current binding, then subscribes to the active target
    /// unless default event handling is disabled.
    fn bind_events(&mut self, cx: &mut Context<Self>) {
        self.binding = None;
        if self.config.disable_default_event_handling {
            return;
        }
        let target = self.hover_target().clone();
        self.binding = Some(cx.subscribe(
            &target,
            |this: &mut Self, _target, event: &InteractionEvent, cx| this.interact(*event, cx),
        ));
    }

    /// Runs `f` against the controller, then applies whatever it requested and
    /// reports visible changes.
    fn drive(&mut self, cx: &mut Context<Self>, f: impl FnOnce(&mut Controller)) {
        let display_state = self.controller.display_state();
        let active = self.controller.is_active();

        f(&mut self.controller);
        self.flush(cx);

        if active != self.controller.is_active() {
            cx.emit(if active {
                HoverVideoPlayerEvent::HoverEnd
            } else {
                HoverVideoPlayerEvent::HoverStart
            });
        }
        let new_state = self.controller.display_state();
        if display_state != new_state {
            cx.emit(HoverVideoPlayerEvent::DisplayStateChanged(new_state));
        }
        cx.notify();
    }

    fn flush(&mut self, cx: &mut Context<Self>) {
        let requests = collect_requests(&mut self.controller);

        apply_timer_requests(&mut self.timers, requests.timers, |id, delay| {
            cx.spawn(async move |this, cx| {
                cx.background_executor().timer(delay).await;
                this.update(cx, |this, cx| {
                    this.timers.remove(&id);
                    this.drive(cx, |controller| controller.timer_fired(id));
                })
                .ok();
            })
        });

        if let Some(request) = requests.play {
            let wait = cx.background_spawn(async move { request.wait() });
            cx.spawn(async move |this, cx| {
                let outcome = wait.await;
                this.update(cx, |this, cx| this.play_settled(outcome, cx)).ok();
            })
            .detach();
        }
    }

    fn play_settled(&mut self, outcome: Result<(), PlaybackError>, cx: &mut Context<Self>) {
        if let Err(err) = &outcome {
            if !self.controller.is_unmounted() {
                cx.emit(HoverVideoPlayerEvent::PlaybackFailed(err.to_string()));
            }
        }
        self.drive(cx, |controller| controller.play_settled(outcome));
    }

    fn poll_media(&mut self, cx: &mut Context<Self>) {
        let mut repaint = false;
        let mut stopped = false;
        for event in self.video.poll() {
            match event {
                MediaEvent::NewFrame => repaint = true,
                MediaEvent::EndOfStream => stopped = true,
                MediaEvent::Error(message) => {
                    cx.emit(HoverVideoPlayerEvent::PlaybackFailed(message));
                    stopped = true;
                }
            }
        }
        if stopped {
            self.drive(cx, |controller| controller.media_stopped());
        } else if repaint {
            cx.notify();
        }
    }

    fn overlay_layer(
        builder: Option<&OverlayBuilder>,
        visible: bool,
        sizes_container: bool,
        window: &mut Window,
        cx: &mut App,
    ) -> Option<AnyElement> {
        let build = builder?;
        let content = build(window, cx);
        let layer = if sizes_container {
            div().relative()
        } else {
            div().absolute().inset_0()
        };
        Some(
            layer
                .opacity(OverlayVisibility::opacity(visible))
                .child(content)
                .into_any_element(),
        )
    }
}

/// What the controller asked of the host during one turn.
struct Requests<P> {
    timers: Vec<TimerRequest>,
    play: Option<P>,
}

/// Applies the unload flag to the element before the controller reloads it,
/// then collects the pending timer requests and play attempt. A reattach only
/// issues its play attempt after the reload.
fn collect_requests<M: SourceAttachment>(
    controller: &mut PlaybackInteractionController<M, QueuedScheduler>,
) -> Requests<M::PlayRequest> {
    let attached = !controller.is_unloaded();
    if controller.media().sources_attached() != attached {
        controller.media_mut().set_sources_attached(attached);
    }
    controller.sync_unloaded();

    Requests {
        timers: controller.scheduler_mut().drain(),
        play: controller.media_mut().take_play_request(),
    }
}

/// Keeps one handle per live timer. Cancelling drops the handle, which for a
/// gpui `Task` stops it.
fn apply_timer_requests<T>(
    timers: &mut HashMap<TimerId, T>,
    requests: Vec<TimerRequest>,
    mut start: impl FnMut(TimerId, Duration) -> T,
) {
    for request in requests {
        match request {
            TimerRequest::Schedule(id, delay) => {
                let handle = start(id, delay);
                timers.insert(id, handle);
            }
            TimerRequest::Cancel(id) => {
                timers.remove(&id);
            }
        }
    }
}

impl Drop for HoverVideoPlayer {
    fn drop(&mut self) {
        self.controller.unmount();
    }
}

impl Render for HoverVideoPlayer {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let visible =
            OverlayVisibility::derive(self.controller.display_state(), self.controller.is_active());
        let sizing = self.config.sizing_mode;

        let media = if sizing == SizingMode::Video {
            div()
                .relative()
                .child(video(self.video.clone()).id("hover-video"))
        } else {
            div()
                .absolute()
                .inset_0()
                .child(video(self.video.clone()).id("hover-video").fill())
        };

        let paused = Self::overlay_layer(
            self.overlays.paused.as_ref(),
            visible.paused,
            sizing == SizingMode::Overlay,
            window,
            cx,
        );
        let loading = Self::overlay_layer(self.overlays.loading.as_ref(), visible.loading, false, window, cx);
        let hover = Self::overlay_layer(self.overlays.hover.as_ref(), visible.hover, false, window, cx);

        let container = div()
            .id("hover-video-player")
            .relative()
            .overflow_hidden()
            .when(sizing == SizingMode::Container, |el| el.size_full())
            .child(media)
            .children(paused)
            .children(loading)
            .children(hover);

        if self.custom_target.is_none() && !self.config.disable_default_event_handling {
            HoverTarget::wire(&self.own_target, container, cx)
        } else {
            container
        }
    }
}
