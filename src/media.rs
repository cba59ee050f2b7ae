use std::time::Duration;

/// Playback state of the native element, derived on demand from its signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaLoadState {
    Paused,
    Loading,
    Playing,
}

/// The native media element driven by the playback controller.
///
/// The contract follows the HTML media element: `paused` flips to `false` as
/// soon as [`play`](MediaElement::play) is issued, before playback has
/// actually started, and back to `true` on [`pause`](MediaElement::pause) or
/// [`reload`](MediaElement::reload).
pub trait MediaElement {
    fn paused(&self) -> bool;

    fn ended(&self) -> bool;

    /// Whether enough data is buffered for playback to progress.
    fn ready_to_play(&self) -> bool;

    fn current_time(&self) -> Duration;

    fn set_current_time(&mut self, time: Duration);

    /// Starts an asynchronous play attempt.
    ///
    /// The outcome must be reported later, on a separate turn, through
    /// [`PlaybackInteractionController::play_settled`](crate::PlaybackInteractionController::play_settled).
    fn play(&mut self);

    fn pause(&mut self);

    /// Resets the element and reselects its sources, whatever they currently are.
    fn reload(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Identifier of the source in use, for diagnostics.
    fn current_src(&self) -> Option<String> {
        None
    }

    fn load_state(&self) -> MediaLoadState {
        if self.paused() || self.ended() {
            MediaLoadState::Paused
        } else if self.ready_to_play() {
            MediaLoadState::Playing
        } else {
            MediaLoadState::Loading
        }
    }
}

/// A media element whose source list can be detached, and which hands the
/// play attempts it starts to the host to await.
pub trait SourceAttachment: MediaElement {
    type PlayRequest;

    fn sources_attached(&self) -> bool;

    /// Takes effect on the next [`reload`](MediaElement::reload).
    fn set_sources_attached(&mut self, attached: bool);

    /// The play attempt issued since the last call, if any.
    fn take_play_request(&mut self) -> Option<Self::PlayRequest>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Signals {
        paused: bool,
        ended: bool,
        ready: bool,
    }

    impl MediaElement for Signals {
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
            Duration::ZERO
        }
        fn set_current_time(&mut self, _time: Duration) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn reload(&mut self) {}
        fn set_muted(&mut self, _muted: bool) {}
    }

    #[test]
    fn load_state_follows_native_signals() {
        let signals = |paused, ended, ready| Signals { paused, ended, ready };
        assert_eq!(signals(true, false, true).load_state(), MediaLoadState::Paused);
        assert_eq!(signals(false, true, true).load_state(), MediaLoadState::Paused);
        assert_eq!(signals(false, false, false).load_state(), MediaLoadState::Loading);
        assert_eq!(signals(false, false, true).load_state(), MediaLoadState::Playing);
    }
}
