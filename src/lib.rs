//! # GPUI Hover Video Player
//!
//! A preview video component for GPUI that plays while the pointer is over
//! it and pauses behind an overlay when the pointer leaves, using GStreamer
//! for media playback.
//!
//! ## Features
//!
//! - Play on hover, focus or press; pause on leave, blur or a press elsewhere
//! - Paused, loading and hover overlays sequenced against the asynchronous
//!   play lifecycle
//! - External `focused` override and custom hover targets
//! - Optional unloading of the media sources while paused
//! - Flexible source and caption inputs, normalized with diagnostics
//!
//! The interaction logic lives in [`PlaybackInteractionController`], which is
//! independent of GPUI and GStreamer and can drive any [`MediaElement`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use gpui::{App, Application, WindowOptions};
//! use gpui_hover_video_player::{HoverVideoPlayer, HoverVideoPlayerConfig, Overlays};
//!
//! Application::new().run(|cx: &mut App| {
//!     cx.open_window(WindowOptions::default(), |window, cx| {
//!         let config = HoverVideoPlayerConfig::new("https://example.com/preview.mp4");
//!         HoverVideoPlayer::build(config, Overlays::new(), window, cx).unwrap()
//!     })
//!     .unwrap();
//! });
//! ```

mod config;
mod controller;
mod element;
mod error;
mod hover_video_player;
mod interaction;
mod media;
mod overlay;
mod source;
mod timer;
mod video;

pub use config::{CrossOrigin, HoverVideoPlayerConfig, Preload, SizingMode};
pub use controller::{ControllerOptions, DisplayState, PlaybackInteractionController};
pub use element::{VideoElement, video};
pub use error::{Error, PlaybackError};
pub use hover_video_player::{HoverVideoPlayer, HoverVideoPlayerEvent, OverlayBuilder, Overlays};
pub use interaction::{HoverTarget, InteractionEvent};
pub use media::{MediaElement, MediaLoadState, SourceAttachment};
pub use overlay::OverlayVisibility;
pub use source::{
    VideoCaptionTrack, VideoSource, default_caption_track, format_video_captions, format_video_src,
};
pub use timer::{QueuedScheduler, TimerId, TimerRequest, TimerScheduler};
pub use video::{MediaEvent, PlayRequest, Video};

// Re-export commonly used types
pub use gstreamer as gst;
pub use url::Url;
