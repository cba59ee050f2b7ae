//! Normalization of the flexible source and caption inputs into ordered
//! descriptor lists.
//!
//! Both normalizers accept free-form JSON so a host can pass whatever shape it
//! has at hand (a bare URL, a single descriptor or a list mixing the two).
//! Invalid entries are logged and dropped; normalization never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single playable source for the media element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    pub src: String,
    /// MIME type hint, e.g. `video/mp4`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl VideoSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: None,
        }
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl From<&str> for VideoSource {
    fn from(src: &str) -> Self {
        VideoSource::new(src)
    }
}

impl From<String> for VideoSource {
    fn from(src: String) -> Self {
        VideoSource::new(src)
    }
}

/// A caption track to attach alongside the video sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCaptionTrack {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub default: bool,
}

impl VideoCaptionTrack {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            src_lang: None,
            label: None,
            default: false,
        }
    }
}

/// Normalizes `input` into an ordered list of sources.
///
/// Accepts a URL string, a `{ src, type? }` object, or an array of either.
pub fn format_video_src(input: &Value) -> Vec<VideoSource> {
    match input {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(_) | Value::Object(_) => source_entry(entry),
                other => {
                    log::error!("invalid entry in video source list, skipping: {other}");
                    None
                }
            })
            .collect(),
        Value::Null => {
            log::error!("no video source provided");
            Vec::new()
        }
        other => source_entry(other).into_iter().collect(),
    }
}

fn source_entry(entry: &Value) -> Option<VideoSource> {
    let source = match entry {
        Value::String(src) => VideoSource::new(src.as_str()),
        Value::Object(_) => match serde_json::from_value::<VideoSource>(entry.clone()) {
            Ok(source) => source,
            Err(err) => {
                log::error!("invalid video source {entry}: {err}");
                return None;
            }
        },
        other => {
            log::error!("invalid video source {other}: expected a URL or a {{ src, type }} object");
            return None;
        }
    };

    if source.src.trim().is_empty() {
        log::error!("invalid video source {entry}: `src` is empty");
        return None;
    }
    Some(source)
}

/// Normalizes `input` into an ordered list of caption tracks.
///
/// `null` means no captions and is not an error.
pub fn format_video_captions(input: &Value) -> Vec<VideoCaptionTrack> {
    match input {
        Value::Null => Vec::new(),
        Value::Array(entries) => entries.iter().filter_map(caption_entry).collect(),
        other => caption_entry(other).into_iter().collect(),
    }
}

fn caption_entry(entry: &Value) -> Option<VideoCaptionTrack> {
    if !entry.is_object() {
        log::error!("invalid caption track {entry}: expected a {{ src, srcLang, label }} object");
        return None;
    }
    match serde_json::from_value::<VideoCaptionTrack>(entry.clone()) {
        Ok(track) if !track.src.trim().is_empty() => Some(track),
        Ok(_) => {
            log::error!("invalid caption track {entry}: `src` is empty");
            None
        }
        Err(err) => {
            log::error!("invalid caption track {entry}: {err}");
            None
        }
    }
}

/// Picks the track a player shows without user interaction: the first one
/// marked `default`, otherwise the first one.
pub fn default_caption_track(tracks: &[VideoCaptionTrack]) -> Option<&VideoCaptionTrack> {
    tracks.iter().find(|track| track.default).or_else(|| tracks.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_url_becomes_single_source() {
        assert_eq!(format_video_src(&json!("a.mp4")), vec![VideoSource::new("a.mp4")]);
    }

    #[test]
    fn mixed_list_keeps_order() {
        let sources = format_video_src(&json!([{ "src": "b.mp4", "type": "video/mp4" }, "c.webm"]));
        assert_eq!(
            sources,
            vec![
                VideoSource::new("b.mp4").with_type("video/mp4"),
                VideoSource::new("c.webm"),
            ]
        );
    }

    #[test]
    fn null_source_yields_nothing() {
        assert!(format_video_src(&Value::Null).is_empty());
    }

    #[test]
    fn invalid_entries_are_dropped() {
        let sources = format_video_src(&json!([
            "ok.mp4",
            null,
            42,
            { "type": "video/mp4" },
            { "src": "" },
            { "src": "also-ok.webm" }
        ]));
        assert_eq!(
            sources,
            vec![VideoSource::new("ok.mp4"), VideoSource::new("also-ok.webm")]
        );
        assert!(format_video_src(&json!(true)).is_empty());
    }

    #[test]
    fn captions_default_to_not_default() {
        let tracks = format_video_captions(&json!({
            "src": "en.vtt",
            "srcLang": "en",
            "label": "English"
        }));
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].src_lang.as_deref(), Some("en"));
        assert_eq!(tracks[0].label.as_deref(), Some("English"));
        assert!(!tracks[0].default);
    }

    #[test]
    fn captions_without_src_are_dropped() {
        let tracks = format_video_captions(&json!([
            { "srcLang": "fr", "label": "Français" },
            { "src": "de.vtt", "srcLang": "de", "label": "Deutsch", "default": true },
            "not-a-track.vtt"
        ]));
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].src, "de.vtt");
        assert!(tracks[0].default);
        assert!(format_video_captions(&Value::Null).is_empty());
    }

    #[test]
    fn default_track_prefers_flagged_entry() {
        let mut en = VideoCaptionTrack::new("en.vtt");
        let mut de = VideoCaptionTrack::new("de.vtt");
        assert_eq!(default_caption_track(&[en.clone(), de.clone()]), Some(&en));
        de.default = true;
        en.default = false;
        assert_eq!(default_caption_track(&[en, de.clone()]), Some(&de));
        assert_eq!(default_caption_track(&[]), None);
    }
}
