//! Hover-to-play interaction logic.
//!
//! [`PlaybackInteractionController`] turns activation and deactivation
//! signals into play/pause commands on a [`MediaElement`], sequencing the
//! overlay-facing [`DisplayState`] against the element's asynchronous play
//! lifecycle. It is driven entirely from the outside: the host forwards
//! interaction events, reports timer expiry through
//! [`timer_fired`](PlaybackInteractionController::timer_fired) and play
//! outcomes through [`play_settled`](PlaybackInteractionController::play_settled).

use crate::error::PlaybackError;
use crate::media::{MediaElement, MediaLoadState};
use crate::timer::{TimerId, TimerScheduler};
use std::time::Duration;

/// Which overlay the presentation layer should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisplayState {
    #[default]
    Paused,
    Loading,
    Playing,
}

/// Behavioural options of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Delay before the loading overlay is shown for a slow play attempt.
    pub loading_state_delay: Duration,
    /// Time the paused overlay takes to fade in; the pause is committed after it.
    pub overlay_transition_duration: Duration,
    pub restart_on_pause: bool,
    /// Detach the media sources whenever playback is paused.
    pub unload_on_pause: bool,
    pub muted: bool,
    /// Initial value of the external override.
    pub focused: bool,
    /// A paused overlay is rendered over the video.
    pub paused_overlay: bool,
    /// A loading overlay is rendered over the video.
    pub loading_overlay: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            loading_state_delay: Duration::from_millis(200),
            overlay_transition_duration: Duration::from_millis(400),
            restart_on_pause: false,
            unload_on_pause: false,
            muted: true,
            focused: false,
            paused_overlay: false,
            loading_overlay: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum PlayAttempt {
    #[default]
    Idle,
    /// A native play command is outstanding. `cancelled` is consulted once it settles.
    Attempting { cancelled: bool },
}

/// Bookkeeping that survives across asynchronous continuations but never
/// affects what is drawn by itself.
#[derive(Debug, Default)]
struct AsyncPlayState {
    attempt: PlayAttempt,
    unmounted: bool,
    pending_pause_timer: Option<TimerId>,
    pending_loading_timer: Option<TimerId>,
    restore_time_offset: Duration,
}

/// Decides when a preview video plays and which overlay covers it.
#[derive(Debug)]
pub struct PlaybackInteractionController<M, S> {
    media: M,
    scheduler: S,
    options: ControllerOptions,

    display_state: DisplayState,
    unloaded: bool,
    synced_unloaded: bool,
    focused: bool,
    active: bool,

    next_timer: u64,
    play: AsyncPlayState,
}

impl<M: MediaElement, S: TimerScheduler> PlaybackInteractionController<M, S> {
    pub fn new(media: M, scheduler: S, options: ControllerOptions) -> Self {
        let unloaded = options.unload_on_pause;
        Self {
            media,
            scheduler,
            options,
            display_state: DisplayState::Paused,
            unloaded,
            synced_unloaded: unloaded,
            focused: false,
            active: false,
            next_timer: 0,
            play: AsyncPlayState::default(),
        }
    }

    /// Component mount: applies the mute flag and the initial override.
    pub fn mount(&mut self) {
        // Muting goes straight to the element rather than through its
        // declarative configuration, which does not reliably apply it.
        self.media.set_muted(self.options.muted);
        let focused = self.options.focused;
        self.set_focused(focused);
    }

    pub fn display_state(&self) -> DisplayState {
        self.display_state
    }

    /// Whether the media sources should currently be detached.
    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    /// Whether an activation is in effect (hovered, focused or overridden).
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_unmounted(&self) -> bool {
        self.play.unmounted
    }

    pub fn is_play_pending(&self) -> bool {
        matches!(self.play.attempt, PlayAttempt::Attempting { .. })
    }

    /// Position the next play attempt will resume from.
    pub fn restore_time_offset(&self) -> Duration {
        self.play.restore_time_offset
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Hover-enter, focus, press inside, or the override turning on.
    pub fn on_activate(&mut self) {
        if self.play.unmounted {
            return;
        }
        self.active = true;

        if self.unloaded {
            // Playback starts from `sync_unloaded` once the sources are back.
            self.set_unloaded(false);
            return;
        }
        self.request_play();
    }

    /// Hover-leave, blur, press outside, or the override turning off.
    pub fn on_deactivate(&mut self) {
        if self.play.unmounted || self.focused {
            return;
        }
        self.active = false;

        if self.media.load_state() == MediaLoadState::Paused {
            return;
        }

        self.cancel_timers();
        // Start fading the paused overlay in right away.
        self.set_display_state(DisplayState::Paused);

        if let PlayAttempt::Attempting { cancelled } = &mut self.play.attempt {
            *cancelled = true;
        } else if self.options.paused_overlay {
            // Keep playing under the overlay until it fully covers the video.
            let id = self.schedule_timer(self.options.overlay_transition_duration);
            self.play.pending_pause_timer = Some(id);
        } else {
            self.commit_pause();
        }
    }

    /// Starts playback from the saved position, unless it is already running.
    pub fn request_play(&mut self) {
        if self.play.unmounted {
            return;
        }
        self.cancel_timers();
        if let PlayAttempt::Attempting { cancelled } = &mut self.play.attempt {
            *cancelled = false;
        }

        if self.media.load_state() == MediaLoadState::Playing {
            self.set_display_state(DisplayState::Playing);
            return;
        }

        if self.options.loading_overlay {
            let id = self.schedule_timer(self.options.loading_state_delay);
            self.play.pending_loading_timer = Some(id);
        }

        if self.is_play_pending() {
            return;
        }

        self.play.attempt = PlayAttempt::Attempting { cancelled: false };
        self.media.set_current_time(self.play.restore_time_offset);
        log::debug!(
            "starting play attempt at {:?}",
            self.play.restore_time_offset
        );
        self.media.play();
    }

    /// Continuation of the outstanding play attempt.
    pub fn play_settled(&mut self, outcome: Result<(), PlaybackError>) {
        if self.play.unmounted {
            return;
        }
        let PlayAttempt::Attempting { cancelled } = self.play.attempt else {
            log::debug!("ignoring play settlement with no attempt in flight");
            return;
        };
        self.play.attempt = PlayAttempt::Idle;
        self.cancel_loading_timer();

        match outcome {
            Ok(()) if cancelled => self.commit_pause(),
            Ok(()) => self.set_display_state(DisplayState::Playing),
            Err(err) => {
                log::error!(
                    "failed to play video {}: {err}",
                    self.media.current_src().as_deref().unwrap_or("<no source>")
                );
                self.set_display_state(DisplayState::Paused);
                self.commit_pause();
            }
        }
    }

    /// Called by the host when a scheduled timer elapses.
    pub fn timer_fired(&mut self, id: TimerId) {
        if self.play.unmounted {
            return;
        }
        if self.play.pending_loading_timer == Some(id) {
            self.play.pending_loading_timer = None;
            if self.is_play_pending() {
                self.set_display_state(DisplayState::Loading);
            }
        } else if self.play.pending_pause_timer == Some(id) {
            self.play.pending_pause_timer = None;
            self.commit_pause();
        } else {
            log::debug!("ignoring stale timer {id:?}");
        }
    }

    /// The element stopped by itself: it reached the end of a non-looping
    /// stream, or failed and was reset. Brings the display back to paused so
    /// the next activation starts a fresh attempt.
    ///
    /// An outstanding play attempt is left to its own settlement.
    pub fn media_stopped(&mut self) {
        if self.play.unmounted || self.is_play_pending() {
            return;
        }
        self.cancel_timers();
        self.set_display_state(DisplayState::Paused);
        if self.media.ended() {
            // Resuming from the end would stop again straight away.
            self.media.set_current_time(Duration::ZERO);
        }
        self.commit_pause();
    }

    /// Tracks the external override, activating or deactivating on change.
    pub fn set_focused(&mut self, focused: bool) {
        if self.play.unmounted || focused == self.focused {
            return;
        }
        self.focused = focused;
        if focused {
            self.on_activate();
        } else {
            self.on_deactivate();
        }
    }

    /// Component update: reloads the element after its sources were detached
    /// or reattached, and resumes playback after a reattach.
    ///
    /// The presentation layer calls this once it has applied
    /// [`is_unloaded`](Self::is_unloaded) to the element.
    pub fn sync_unloaded(&mut self) {
        if self.play.unmounted || self.unloaded == self.synced_unloaded {
            return;
        }
        self.synced_unloaded = self.unloaded;
        self.media.reload();
        if !self.unloaded {
            self.request_play();
        }
    }

    /// Component teardown. Every later call, including the settlement of an
    /// outstanding play attempt, becomes a no-op.
    pub fn unmount(&mut self) {
        if self.play.unmounted {
            return;
        }
        self.cancel_timers();
        self.play.unmounted = true;
    }

    fn commit_pause(&mut self) {
        self.media.pause();
        if self.options.restart_on_pause {
            self.media.set_current_time(Duration::ZERO);
        }
        self.play.restore_time_offset = self.media.current_time();
        if self.options.unload_on_pause {
            self.set_unloaded(true);
        }
    }

    fn set_display_state(&mut self, state: DisplayState) {
        if self.display_state != state {
            log::debug!("display state {:?} -> {state:?}", self.display_state);
            self.display_state = state;
        }
    }

    fn set_unloaded(&mut self, unloaded: bool) {
        if self.unloaded != unloaded {
            log::debug!("media sources {}", if unloaded { "detached" } else { "attached" });
            self.unloaded = unloaded;
        }
    }

    fn schedule_timer(&mut self, delay: Duration) -> TimerId {
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        self.scheduler.schedule(id, delay);
        id
    }

    fn cancel_loading_timer(&mut self) {
        if let Some(id) = self.play.pending_loading_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.play.pending_pause_timer.take() {
            self.scheduler.cancel(id);
        }
        self.cancel_loading_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Call {
        Play,
        Pause,
        Seek(Duration),
        Reload,
        Muted(bool),
    }

    #[derive(Debug)]
    struct FakeMedia {
        paused: bool,
        ended: bool,
        ready: bool,
        time: Duration,
        calls: Vec<Call>,
    }

    impl FakeMedia {
        fn new() -> Self {
            Self {
                paused: true,
                ended: false,
                ready: false,
                time: Duration::ZERO,
                calls: Vec::new(),
            }
        }

        fn count(&self, call: Call) -> usize {
            self.calls.iter().filter(|c| **c == call).count()
        }
    }

    impl MediaElement for FakeMedia {
        fn paused(&self) -> bool {
            self.paused
        }
        fn ended(&self) -> bool {
            self.ended
        }
        fn ready_to_play(&self) -> bool {
            self.ready
        }
        fn current_time(&self) -> Duration {
            self.time
        }
        fn set_current_time(&mut self, time: Duration) {
            self.time = time;
            self.calls.push(Call::Seek(time));
        }
        fn play(&mut self) {
            self.paused = false;
            self.ended = false;
            self.calls.push(Call::Play);
        }
        fn pause(&mut self) {
            self.paused = true;
            self.calls.push(Call::Pause);
        }
        fn reload(&mut self) {
            self.paused = true;
            self.ended = false;
            self.ready = false;
            self.time = Duration::ZERO;
            self.calls.push(Call::Reload);
        }
        fn set_muted(&mut self, muted: bool) {
            self.calls.push(Call::Muted(muted));
        }
        fn current_src(&self) -> Option<String> {
            Some("preview.mp4".into())
        }
    }

    #[derive(Debug, Default)]
    struct ManualScheduler {
        pending: BTreeMap<TimerId, Duration>,
    }

    impl TimerScheduler for ManualScheduler {
        fn schedule(&mut self, id: TimerId, delay: Duration) {
            self.pending.insert(id, delay);
        }
        fn cancel(&mut self, id: TimerId) {
            self.pending.remove(&id);
        }
    }

    type Controller = PlaybackInteractionController<FakeMedia, ManualScheduler>;

    fn controller(options: ControllerOptions) -> Controller {
        let mut controller =
            PlaybackInteractionController::new(FakeMedia::new(), ManualScheduler::default(), options);
        controller.mount();
        controller
    }

    fn resolve(controller: &mut Controller) {
        controller.media_mut().ready = true;
        controller.play_settled(Ok(()));
    }

    fn pending(controller: &mut Controller) -> Vec<(TimerId, Duration)> {
        controller
            .scheduler_mut()
            .pending
            .iter()
            .map(|(id, delay)| (*id, *delay))
            .collect()
    }

    fn fire(controller: &mut Controller, id: TimerId) {
        controller.scheduler_mut().pending.remove(&id);
        controller.timer_fired(id);
    }

    #[test]
    fn mount_applies_mute() {
        let controller = controller(ControllerOptions::default());
        assert_eq!(controller.media().calls, vec![Call::Muted(true)]);
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert!(!controller.is_unloaded());
    }

    #[test]
    fn playing_only_after_resolution() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        assert!(controller.is_play_pending());
        assert_eq!(controller.display_state(), DisplayState::Paused);

        resolve(&mut controller);
        assert_eq!(controller.display_state(), DisplayState::Playing);
        assert!(!controller.is_play_pending());
    }

    #[test]
    fn repeated_activation_issues_one_play() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        controller.on_activate();
        assert_eq!(controller.media().count(Call::Play), 1);

        resolve(&mut controller);
        controller.on_activate();
        assert_eq!(controller.media().count(Call::Play), 1);
        assert_eq!(controller.display_state(), DisplayState::Playing);
    }

    #[test]
    fn deactivation_during_attempt_pauses_once_on_settlement() {
        let mut controller = controller(ControllerOptions {
            paused_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        controller.on_deactivate();
        assert_eq!(controller.media().count(Call::Pause), 0);
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert!(pending(&mut controller).is_empty());

        resolve(&mut controller);
        assert_eq!(controller.media().count(Call::Pause), 1);
        assert_eq!(controller.display_state(), DisplayState::Paused);
    }

    #[test]
    fn reactivation_clears_cancellation() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        controller.on_deactivate();
        controller.on_activate();
        assert_eq!(controller.media().count(Call::Play), 1);

        resolve(&mut controller);
        assert_eq!(controller.media().count(Call::Pause), 0);
        assert_eq!(controller.display_state(), DisplayState::Playing);
    }

    #[test]
    fn paused_overlay_delays_the_pause() {
        let mut controller = controller(ControllerOptions {
            paused_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        resolve(&mut controller);
        controller.on_deactivate();

        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert_eq!(controller.media().count(Call::Pause), 0);
        let timers = pending(&mut controller);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].1, Duration::from_millis(400));

        fire(&mut controller, timers[0].0);
        assert_eq!(controller.media().count(Call::Pause), 1);
    }

    #[test]
    fn reactivation_under_fading_overlay_keeps_playing() {
        let mut controller = controller(ControllerOptions {
            paused_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        resolve(&mut controller);
        controller.on_deactivate();
        controller.on_activate();

        assert!(pending(&mut controller).is_empty());
        assert_eq!(controller.display_state(), DisplayState::Playing);
        assert_eq!(controller.media().count(Call::Pause), 0);
        assert_eq!(controller.media().count(Call::Play), 1);
    }

    #[test]
    fn without_paused_overlay_pause_is_immediate() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        resolve(&mut controller);
        controller.on_deactivate();
        assert_eq!(controller.media().count(Call::Pause), 1);
        assert!(pending(&mut controller).is_empty());

        controller.on_deactivate();
        assert_eq!(controller.media().count(Call::Pause), 1);
    }

    #[test]
    fn resumes_from_last_pause_position() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        resolve(&mut controller);
        controller.media_mut().time = Duration::from_millis(5_300);
        controller.on_deactivate();
        assert_eq!(controller.restore_time_offset(), Duration::from_millis(5_300));

        controller.media_mut().calls.clear();
        controller.on_activate();
        assert_eq!(
            controller.media().calls,
            vec![Call::Seek(Duration::from_millis(5_300)), Call::Play]
        );
    }

    #[test]
    fn restart_on_pause_resumes_from_zero() {
        let mut controller = controller(ControllerOptions {
            restart_on_pause: true,
            ..Default::default()
        });
        controller.on_activate();
        resolve(&mut controller);
        controller.media_mut().time = Duration::from_secs(4);
        controller.on_deactivate();
        assert_eq!(controller.restore_time_offset(), Duration::ZERO);

        controller.media_mut().calls.clear();
        controller.on_activate();
        assert_eq!(controller.media().calls, vec![Call::Seek(Duration::ZERO), Call::Play]);
    }

    #[test]
    fn unload_round_trip_resumes_at_saved_position() {
        let mut controller = controller(ControllerOptions {
            unload_on_pause: true,
            ..Default::default()
        });
        assert!(controller.is_unloaded());

        controller.on_activate();
        assert!(!controller.is_unloaded());
        assert_eq!(controller.media().count(Call::Play), 0);

        controller.sync_unloaded();
        assert_eq!(
            &controller.media().calls[1..],
            &[Call::Reload, Call::Seek(Duration::ZERO), Call::Play]
        );
        resolve(&mut controller);

        controller.media_mut().time = Duration::from_secs(3);
        controller.on_deactivate();
        assert!(controller.is_unloaded());
        controller.media_mut().calls.clear();
        controller.sync_unloaded();
        assert_eq!(controller.media().calls, vec![Call::Reload]);

        // Nothing changed since the last sync.
        controller.sync_unloaded();
        assert_eq!(controller.media().count(Call::Reload), 1);

        controller.on_activate();
        controller.sync_unloaded();
        assert_eq!(
            controller.media().calls,
            vec![
                Call::Reload,
                Call::Reload,
                Call::Seek(Duration::from_secs(3)),
                Call::Play
            ]
        );
    }

    #[test]
    fn override_blocks_deactivation() {
        let mut controller = controller(ControllerOptions::default());
        controller.set_focused(true);
        resolve(&mut controller);
        assert_eq!(controller.display_state(), DisplayState::Playing);

        controller.on_deactivate();
        assert_eq!(controller.display_state(), DisplayState::Playing);
        assert_eq!(controller.media().count(Call::Pause), 0);
        assert!(controller.is_active());

        controller.set_focused(false);
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert_eq!(controller.media().count(Call::Pause), 1);
    }

    #[test]
    fn initial_override_activates_on_mount() {
        let mut controller = controller(ControllerOptions {
            focused: true,
            ..Default::default()
        });
        assert!(controller.is_focused());
        assert_eq!(controller.media().count(Call::Play), 1);

        controller.set_focused(true);
        assert_eq!(controller.media().count(Call::Play), 1);
    }

    #[test]
    fn no_loading_overlay_never_shows_loading() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        assert!(pending(&mut controller).is_empty());
        assert_eq!(controller.display_state(), DisplayState::Paused);
        resolve(&mut controller);
        assert_eq!(controller.display_state(), DisplayState::Playing);
    }

    #[test]
    fn slow_attempt_shows_loading_overlay() {
        let mut controller = controller(ControllerOptions {
            loading_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        let timers = pending(&mut controller);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].1, Duration::from_millis(200));

        fire(&mut controller, timers[0].0);
        assert_eq!(controller.display_state(), DisplayState::Loading);

        resolve(&mut controller);
        assert_eq!(controller.display_state(), DisplayState::Playing);
    }

    #[test]
    fn fast_attempt_cancels_loading_timer() {
        let mut controller = controller(ControllerOptions {
            loading_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        let timers = pending(&mut controller);
        resolve(&mut controller);
        assert!(pending(&mut controller).is_empty());

        // A host that missed the cancellation fires anyway.
        controller.timer_fired(timers[0].0);
        assert_eq!(controller.display_state(), DisplayState::Playing);
    }

    #[test]
    fn rejected_play_reverts_to_paused() {
        let mut controller = controller(ControllerOptions {
            loading_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        let timers = pending(&mut controller);
        fire(&mut controller, timers[0].0);
        assert_eq!(controller.display_state(), DisplayState::Loading);

        controller.play_settled(Err(PlaybackError::Rejected("autoplay blocked".into())));
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert_eq!(controller.media().count(Call::Pause), 1);
        assert!(!controller.is_play_pending());

        // The next activation tries again.
        controller.on_activate();
        assert_eq!(controller.media().count(Call::Play), 2);
    }

    #[test]
    fn unmount_suppresses_late_settlement() {
        let mut controller = controller(ControllerOptions {
            loading_overlay: true,
            ..Default::default()
        });
        controller.on_activate();
        controller.unmount();
        assert!(pending(&mut controller).is_empty());
        controller.media_mut().calls.clear();

        resolve(&mut controller);
        assert_eq!(controller.display_state(), DisplayState::Paused);
        controller.play_settled(Err(PlaybackError::NoSource));
        controller.on_activate();
        controller.on_deactivate();
        assert!(controller.media().calls.is_empty());
    }

    #[test]
    fn stray_settlement_is_ignored() {
        let mut controller = controller(ControllerOptions::default());
        controller.play_settled(Ok(()));
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert_eq!(controller.media().count(Call::Pause), 0);
    }

    #[test]
    fn end_of_stream_returns_to_paused() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        resolve(&mut controller);
        controller.media_mut().time = Duration::from_secs(12);
        controller.media_mut().ended = true;

        controller.media_stopped();
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert_eq!(controller.restore_time_offset(), Duration::ZERO);
        assert!(controller.media().paused);

        // Leaving and coming back starts a fresh attempt from the top.
        controller.on_deactivate();
        controller.on_activate();
        assert!(controller.is_play_pending());
        assert_eq!(controller.media().calls.last(), Some(&Call::Play));
        resolve(&mut controller);
        assert_eq!(controller.display_state(), DisplayState::Playing);
    }

    #[test]
    fn end_of_stream_while_hovered_replays_on_next_activation() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        resolve(&mut controller);
        controller.media_mut().ended = true;
        controller.media_stopped();

        controller.on_activate();
        assert_eq!(controller.media().count(Call::Play), 2);
    }

    #[test]
    fn failed_reload_mid_play_keeps_overlay_reachable() {
        let options = ControllerOptions {
            paused_overlay: true,
            ..ControllerOptions::default()
        };
        let mut controller = controller(options);
        controller.on_activate();
        resolve(&mut controller);

        // The element switched to a fallback source behind our back.
        controller.media_mut().reload();
        controller.media_stopped();
        assert_eq!(controller.display_state(), DisplayState::Paused);
        assert!(pending(&mut controller).is_empty());

        controller.on_deactivate();
        assert!(!controller.is_active());
        assert_eq!(controller.display_state(), DisplayState::Paused);
    }

    #[test]
    fn media_stop_applies_unload_on_pause() {
        let options = ControllerOptions {
            unload_on_pause: true,
            ..ControllerOptions::default()
        };
        let mut controller = controller(options);
        controller.on_activate();
        resolve(&mut controller);
        controller.media_mut().ended = true;

        controller.media_stopped();
        assert!(controller.is_unloaded());
    }

    #[test]
    fn media_stop_defers_to_pending_attempt() {
        let mut controller = controller(ControllerOptions::default());
        controller.on_activate();
        controller.media_stopped();
        assert!(controller.is_play_pending());
        assert_eq!(controller.media().count(Call::Pause), 0);

        controller.play_settled(Err(PlaybackError::NoSource));
        assert_eq!(controller.display_state(), DisplayState::Paused);
    }
}
