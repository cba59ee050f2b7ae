use gstreamer as gst;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building the native media pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Glib(#[from] glib::Error),
    #[error("{0}")]
    Bool(#[from] glib::BoolError),
    #[error("{0}")]
    StateChange(#[from] gst::StateChangeError),
    #[error("failed to cast gstreamer element")]
    Cast,
    #[error("failed to get the gstreamer bus")]
    Bus,
    #[error("invalid media URI: {0}")]
    Uri(String),
    #[error("invalid player configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Why a native play attempt was rejected.
///
/// Every variant is handled the same way by the controller: the failure is
/// logged and the player falls back to its paused state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("no media source is attached")]
    NoSource,
    #[error("playback rejected: {0}")]
    Rejected(String),
    #[error("playback did not start within {0:?}")]
    TimedOut(Duration),
}

impl From<gst::StateChangeError> for PlaybackError {
    fn from(err: gst::StateChangeError) -> Self {
        PlaybackError::Rejected(err.to_string())
    }
}

impl From<glib::BoolError> for PlaybackError {
    fn from(err: glib::BoolError) -> Self {
        PlaybackError::Rejected(err.to_string())
    }
}
