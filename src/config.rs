use crate::controller::ControllerOptions;
use crate::source::{VideoCaptionTrack, VideoSource, format_video_captions, format_video_src};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// How much of the media the element fetches before the first play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preload {
    None,
    #[default]
    Metadata,
    Auto,
}

/// CORS mode used when fetching remote sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossOrigin {
    Anonymous,
    UseCredentials,
}

/// Which layer determines the size of the player's container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// The container takes the natural size of the video.
    #[default]
    Video,
    /// The container takes the size of the paused overlay.
    Overlay,
    /// Every layer fills a container sized by the host.
    Container,
}

/// Options recognised by the hover video player.
///
/// Deserializes from camelCase JSON; absent keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoverVideoPlayerConfig {
    /// Raw source input, see [`format_video_src`].
    pub video_src: Value,
    /// Raw caption input, see [`format_video_captions`].
    pub video_captions: Value,
    pub loading_state_delay_ms: u64,
    pub overlay_transition_duration_ms: u64,
    pub restart_on_pause: bool,
    pub unload_on_pause: bool,
    pub muted_by_default: bool,
    pub volume: f64,
    pub loop_playback: bool,
    /// Accepted for compatibility with web embeddings. A `playbin` always
    /// renders into the player, so this has no effect.
    pub plays_inline: bool,
    /// The GStreamer element has no native controls; when set, only a debug
    /// message is logged.
    pub show_native_controls: bool,
    pub preload_policy: Preload,
    /// Accepted for compatibility with web embeddings. GStreamer's HTTP sources
    /// do not perform CORS checks, so this has no effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_origin_policy: Option<CrossOrigin>,
    pub disable_default_event_handling: bool,
    pub focused: bool,
    pub sizing_mode: SizingMode,
}

impl Default for HoverVideoPlayerConfig {
    fn default() -> Self {
        Self {
            video_src: Value::Null,
            video_captions: Value::Null,
            loading_state_delay_ms: 200,
            overlay_transition_duration_ms: 400,
            restart_on_pause: false,
            unload_on_pause: false,
            muted_by_default: true,
            volume: 1.0,
            loop_playback: true,
            plays_inline: true,
            show_native_controls: false,
            preload_policy: Preload::default(),
            cross_origin_policy: None,
            disable_default_event_handling: false,
            focused: false,
            sizing_mode: SizingMode::default(),
        }
    }
}

impl HoverVideoPlayerConfig {
    pub fn new(video_src: impl Into<Value>) -> Self {
        Self {
            video_src: video_src.into(),
            ..Default::default()
        }
    }

    /// Parses a camelCase JSON document.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn video_captions(mut self, captions: impl Into<Value>) -> Self {
        self.video_captions = captions.into();
        self
    }

    pub fn loading_state_delay(mut self, delay: Duration) -> Self {
        self.loading_state_delay_ms = saturating_millis(delay);
        self
    }

    pub fn overlay_transition_duration(mut self, duration: Duration) -> Self {
        self.overlay_transition_duration_ms = saturating_millis(duration);
        self
    }

    pub fn restart_on_pause(mut self, restart: bool) -> Self {
        self.restart_on_pause = restart;
        self
    }

    pub fn unload_on_pause(mut self, unload: bool) -> Self {
        self.unload_on_pause = unload;
        self
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted_by_default = muted;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn loop_playback(mut self, looping: bool) -> Self {
        self.loop_playback = looping;
        self
    }

    /// Recorded only; inline rendering is the only mode.
    pub fn plays_inline(mut self, inline: bool) -> Self {
        self.plays_inline = inline;
        self
    }

    /// Recorded only; there are no native controls to show.
    pub fn show_native_controls(mut self, show: bool) -> Self {
        self.show_native_controls = show;
        self
    }

    pub fn preload(mut self, preload: Preload) -> Self {
        self.preload_policy = preload;
        self
    }

    /// Recorded only; remote sources are fetched without CORS checks.
    pub fn cross_origin(mut self, policy: CrossOrigin) -> Self {
        self.cross_origin_policy = Some(policy);
        self
    }

    pub fn disable_default_event_handling(mut self, disable: bool) -> Self {
        self.disable_default_event_handling = disable;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn sizing_mode(mut self, mode: SizingMode) -> Self {
        self.sizing_mode = mode;
        self
    }

    pub fn sources(&self) -> Vec<VideoSource> {
        format_video_src(&self.video_src)
    }

    pub fn captions(&self) -> Vec<VideoCaptionTrack> {
        format_video_captions(&self.video_captions)
    }

    /// Volume clamped to the element's accepted range.
    pub fn clamped_volume(&self) -> f64 {
        if self.volume.is_nan() {
            return 1.0;
        }
        self.volume.clamp(0.0, 1.0)
    }

    /// The subset of options the playback controller acts on.
    pub fn controller_options(&self, paused_overlay: bool, loading_overlay: bool) -> ControllerOptions {
        ControllerOptions {
            loading_state_delay: Duration::from_millis(self.loading_state_delay_ms),
            overlay_transition_duration: Duration::from_millis(self.overlay_transition_duration_ms),
            restart_on_pause: self.restart_on_pause,
            unload_on_pause: self.unload_on_pause,
            muted: self.muted_by_default,
            focused: self.focused,
            paused_overlay,
            loading_overlay,
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = HoverVideoPlayerConfig::from_json("{}").unwrap();
        assert_eq!(config, HoverVideoPlayerConfig::default());
        assert_eq!(config.loading_state_delay_ms, 200);
        assert_eq!(config.overlay_transition_duration_ms, 400);
        assert!(config.muted_by_default);
        assert!(config.loop_playback);
        assert!(config.plays_inline);
        assert!(!config.show_native_controls);
        assert!(!config.unload_on_pause);
    }

    #[test]
    fn camel_case_keys_are_recognised() {
        let config = HoverVideoPlayerConfig::from_json(
            r#"{
                "videoSrc": ["a.mp4", { "src": "b.webm", "type": "video/webm" }],
                "unloadOnPause": true,
                "restartOnPause": true,
                "preloadPolicy": "none",
                "crossOriginPolicy": "use-credentials",
                "sizingMode": "container",
                "loadingStateDelayMs": 50
            }"#,
        )
        .unwrap();
        assert_eq!(config.sources().len(), 2);
        assert!(config.unload_on_pause);
        assert!(config.restart_on_pause);
        assert_eq!(config.preload_policy, Preload::None);
        assert_eq!(config.cross_origin_policy, Some(CrossOrigin::UseCredentials));
        assert_eq!(config.sizing_mode, SizingMode::Container);

        let options = config.controller_options(true, false);
        assert_eq!(options.loading_state_delay, Duration::from_millis(50));
        assert!(options.paused_overlay);
        assert!(!options.loading_overlay);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = HoverVideoPlayerConfig::from_json(r#"{ "preloadPolicy": "eager" }"#).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(HoverVideoPlayerConfig::default().volume(3.0).clamped_volume(), 1.0);
        assert_eq!(HoverVideoPlayerConfig::default().volume(-1.0).clamped_volume(), 0.0);
        assert_eq!(HoverVideoPlayerConfig::default().volume(f64::NAN).clamped_volume(), 1.0);
    }

    #[test]
    fn builder_covers_pass_through_options() {
        let config = HoverVideoPlayerConfig::new("a.mp4")
            .plays_inline(false)
            .show_native_controls(true)
            .cross_origin(CrossOrigin::Anonymous);
        assert!(!config.plays_inline);
        assert!(config.show_native_controls);
        assert_eq!(config.cross_origin_policy, Some(CrossOrigin::Anonymous));

        // None of them changes how playback is driven.
        assert_eq!(
            config.controller_options(true, true),
            HoverVideoPlayerConfig::new("a.mp4").controller_options(true, true)
        );
    }

    #[test]
    fn oversized_durations_saturate() {
        let config = HoverVideoPlayerConfig::default()
            .loading_state_delay(Duration::MAX)
            .overlay_transition_duration(Duration::from_micros(1_500));
        assert_eq!(config.loading_state_delay_ms, u64::MAX);
        assert_eq!(config.overlay_transition_duration_ms, 1);
    }
}
