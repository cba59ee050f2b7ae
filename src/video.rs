use crate::config::{HoverVideoPlayerConfig, Preload};
use crate::error::{Error, PlaybackError};
use crate::media::{MediaElement, SourceAttachment};
use crate::source::{VideoCaptionTrack, VideoSource, default_caption_track};
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_app::prelude::*;
use gstreamer_video as gst_video;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How long a play attempt may take to reach the playing state.
const PLAY_TIMEOUT: Duration = Duration::from_secs(10);
const PULL_TIMEOUT_MS: u64 = 16;
const IDLE_POLL: Duration = Duration::from_millis(16);

fn clock_time(time: Duration) -> gst::ClockTime {
    gst::ClockTime::from_nseconds(time.as_nanos() as u64)
}

/// Resolves a source string to a URI, treating anything that does not parse
/// as an absolute URL as a local path.
pub(crate) fn source_uri(src: &str) -> Result<url::Url, Error> {
    if let Ok(uri) = url::Url::parse(src) {
        return Ok(uri);
    }
    let path = std::path::absolute(src).map_err(|_| Error::Uri(src.to_string()))?;
    url::Url::from_file_path(path).map_err(|_| Error::Uri(src.to_string()))
}

#[derive(Debug)]
pub(crate) struct Frame(gst::Sample);

impl Frame {
    pub fn empty() -> Self {
        Self(gst::Sample::builder().build())
    }

    pub fn readable(&self) -> Option<gst::BufferMap<'_, gst::buffer::Readable>> {
        self.0.buffer().and_then(|x| x.map_readable().ok())
    }
}

/// Something the pipeline reported since the last [`Video::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    NewFrame,
    EndOfStream,
    Error(String),
}

/// An outstanding play command.
///
/// [`wait`](PlayRequest::wait) blocks until the pipeline is playing or gives
/// up, so hosts run it off the UI thread.
#[derive(Debug)]
pub struct PlayRequest {
    pipeline: gst::Pipeline,
    seek_to: Option<Duration>,
    has_source: bool,
}

impl PlayRequest {
    pub fn wait(self) -> Result<(), PlaybackError> {
        if !self.has_source {
            return Err(PlaybackError::NoSource);
        }

        if let Some(position) = self.seek_to {
            // Seeking needs a prerolled pipeline.
            self.pipeline.set_state(gst::State::Paused)?;
            self.pipeline.state(clock_time(PLAY_TIMEOUT)).0?;
            self.pipeline.seek_simple(
                gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
                clock_time(position),
            )?;
        }

        self.pipeline.set_state(gst::State::Playing)?;
        let (result, state, _) = self.pipeline.state(clock_time(PLAY_TIMEOUT));
        result?;
        if state == gst::State::Playing {
            Ok(())
        } else {
            Err(PlaybackError::TimedOut(PLAY_TIMEOUT))
        }
    }
}

#[derive(Debug)]
pub(crate) struct Internal {
    pub(crate) bus: gst::Bus,
    pub(crate) source: gst::Pipeline,
    pub(crate) alive: Arc<AtomicBool>,
    pub(crate) worker: Option<std::thread::JoinHandle<()>>,

    pub(crate) frame: Arc<Mutex<Frame>>,
    pub(crate) frame_size: Arc<Mutex<Option<(u32, u32)>>>,
    pub(crate) upload_frame: Arc<AtomicBool>,

    sources: Vec<VideoSource>,
    captions: Vec<VideoCaptionTrack>,
    attached: bool,
    active_source: usize,
    preload: Preload,
    looping: bool,

    is_eos: bool,
    play_requested: bool,
    pending_seek: Option<Duration>,
    pending_play: Option<PlayRequest>,
}

impl Internal {
    fn active_uri(&self) -> Option<url::Url> {
        let source = self.sources.get(self.active_source)?;
        match source_uri(&source.src) {
            Ok(uri) => Some(uri),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    fn caption_uri(&self) -> Option<url::Url> {
        let track = default_caption_track(&self.captions)?;
        source_uri(&track.src)
            .map_err(|err| log::error!("caption track skipped: {err}"))
            .ok()
    }

    pub(crate) fn reload(&mut self) {
        if let Err(err) = self.source.set_state(gst::State::Null) {
            log::error!("failed to reset pipeline: {err}");
        }
        self.is_eos = false;
        self.play_requested = false;
        self.pending_seek = None;
        self.pending_play = None;
        *self.frame.lock() = Frame::empty();
        *self.frame_size.lock() = None;

        let (uri, suburi) = if self.attached {
            (self.active_uri(), self.caption_uri())
        } else {
            (None, None)
        };
        self.source
            .set_property("uri", uri.as_ref().map(|uri| uri.as_str()));
        self.source
            .set_property("suburi", suburi.as_ref().map(|uri| uri.as_str()));

        if uri.is_some() && self.preload != Preload::None {
            if let Err(err) = self.source.set_state(gst::State::Paused) {
                log::error!("failed to preroll {:?}: {err}", self.current_src());
            }
        }
    }

    pub(crate) fn play(&mut self) {
        self.play_requested = true;
        self.is_eos = false;
        self.pending_play = Some(PlayRequest {
            pipeline: self.source.clone(),
            seek_to: self.pending_seek.take(),
            has_source: self.attached && self.active_uri().is_some(),
        });
    }

    pub(crate) fn pause(&mut self) {
        self.play_requested = false;
        let running = matches!(
            self.source.current_state(),
            gst::State::Paused | gst::State::Playing
        ) || self.source.pending_state() == gst::State::Playing;
        if running {
            if let Err(err) = self.source.set_state(gst::State::Paused) {
                log::error!("failed to pause {:?}: {err}", self.current_src());
            }
        }
    }

    pub(crate) fn set_current_time(&mut self, time: Duration) {
        self.pending_seek = Some(time);
        if !self.play_requested && self.source.current_state() == gst::State::Paused {
            let seeked = self
                .source
                .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE, clock_time(time));
            if seeked.is_ok() {
                self.pending_seek = None;
            }
        }
    }

    pub(crate) fn current_time(&self) -> Duration {
        if let Some(time) = self.pending_seek {
            return time;
        }
        Duration::from_nanos(
            self.source
                .query_position::<gst::ClockTime>()
                .map_or(0, |pos| pos.nseconds()),
        )
    }

    /// Moves to the next usable source after the current one failed.
    fn fall_back_source(&mut self) -> bool {
        if self.active_source + 1 >= self.sources.len() {
            return false;
        }
        self.active_source += 1;
        log::warn!(
            "falling back to video source {}",
            self.sources[self.active_source].src
        );
        self.reload();
        true
    }

    fn current_src(&self) -> Option<String> {
        self.sources
            .get(self.active_source)
            .map(|source| source.src.clone())
    }
}

/// A preview video backed by a GStreamer `playbin`.
///
/// Behaves like an HTML `<video>` element with an ordered list of `<source>`
/// children: sources can be detached and reattached, and a reload reselects
/// them.
#[derive(Debug, Clone)]
pub struct Video(pub(crate) Arc<RwLock<Internal>>);

impl Drop for Video {
    fn drop(&mut self) {
        // Only cleanup if this is the last reference
        if Arc::strong_count(&self.0) == 1 {
            if let Some(mut inner) = self.0.try_write() {
                if let Err(err) = inner.source.set_state(gst::State::Null) {
                    log::error!("failed to shut down pipeline: {err}");
                }

                inner.alive.store(false, Ordering::SeqCst);
                if let Some(worker) = inner.worker.take() {
                    if let Err(err) = worker.join() {
                        match err.downcast_ref::<String>() {
                            Some(e) => log::error!("Video thread panicked: {e}"),
                            None => log::error!("Video thread panicked with unknown reason"),
                        }
                    }
                }
            }
        }
    }
}

impl Video {
    /// Creates the element for `config`. Sources start detached when
    /// `unload_on_pause` is set.
    pub fn new(config: &HoverVideoPlayerConfig) -> Result<Self, Error> {
        Self::with_sources(config, config.sources(), config.captions())
    }

    pub fn with_sources(
        config: &HoverVideoPlayerConfig,
        sources: Vec<VideoSource>,
        captions: Vec<VideoCaptionTrack>,
    ) -> Result<Self, Error> {
        gst::init()?;

        let pipeline = gst::parse::launch(
            "playbin video-sink=\"videoscale ! videoconvert ! appsink name=hover_video drop=true max-buffers=2 caps=video/x-raw,format=NV12,pixel-aspect-ratio=1/1\"",
        )?
        .downcast::<gst::Pipeline>()
        .map_err(|_| Error::Cast)?;

        let video_sink = pipeline
            .property::<gst::Element>("video-sink")
            .downcast::<gst::Bin>()
            .map_err(|_| Error::Cast)?
            .by_name("hover_video")
            .ok_or(Error::Cast)?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| Error::Cast)?;

        pipeline.set_property("volume", config.clamped_volume());
        pipeline.set_property("mute", config.muted_by_default);
        if config.show_native_controls {
            log::debug!("native controls are not available for GStreamer playback");
        }

        let bus = pipeline.bus().ok_or(Error::Bus)?;

        let frame = Arc::new(Mutex::new(Frame::empty()));
        let frame_size = Arc::new(Mutex::new(None));
        let upload_frame = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        let frame_ref = Arc::clone(&frame);
        let frame_size_ref = Arc::clone(&frame_size);
        let upload_frame_ref = Arc::clone(&upload_frame);
        let alive_ref = Arc::clone(&alive);
        let pipeline_ref = pipeline.clone();

        let worker = std::thread::spawn(move || {
            while alive_ref.load(Ordering::Acquire) {
                let playing = pipeline_ref.current_state() == gst::State::Playing;
                let timeout = gst::ClockTime::from_mseconds(PULL_TIMEOUT_MS);
                let sample = if playing {
                    video_sink.try_pull_sample(timeout)
                } else {
                    video_sink.try_pull_preroll(timeout)
                };

                if let Some(sample) = sample {
                    let size = sample
                        .caps()
                        .and_then(|caps| gst_video::VideoInfo::from_caps(caps).ok())
                        .map(|info| (info.width(), info.height()));
                    if size.is_some() {
                        *frame_size_ref.lock() = size;
                    }
                    *frame_ref.lock() = Frame(sample);
                    upload_frame_ref.store(true, Ordering::SeqCst);
                }

                // The preroll sample is handed out again on every pull.
                if !playing {
                    std::thread::sleep(IDLE_POLL);
                }
            }
        });

        let mut inner = Internal {
            bus,
            source: pipeline,
            alive,
            worker: Some(worker),

            frame,
            frame_size,
            upload_frame,

            sources,
            captions,
            attached: !config.unload_on_pause,
            active_source: 0,
            preload: config.preload_policy,
            looping: config.loop_playback,

            is_eos: false,
            play_requested: false,
            pending_seek: None,
            pending_play: None,
        };
        inner.reload();

        Ok(Video(Arc::new(RwLock::new(inner))))
    }

    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, Internal> {
        self.0.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, Internal> {
        self.0.write()
    }

    /// Natural size of the decoded video, once a frame has been seen.
    pub fn size(&self) -> Option<(u32, u32)> {
        *self.read().frame_size.lock()
    }

    pub fn sources(&self) -> Vec<VideoSource> {
        self.read().sources.clone()
    }

    pub fn set_volume(&self, volume: f64) {
        self.read()
            .source
            .set_property("volume", volume.clamp(0.0, 1.0));
    }

    pub fn volume(&self) -> f64 {
        self.read().source.property("volume")
    }

    pub fn muted(&self) -> bool {
        self.read().source.property("mute")
    }

    pub fn looping(&self) -> bool {
        self.read().looping
    }

    pub fn set_looping(&self, looping: bool) {
        self.write().looping = looping;
    }

    /// Whether a new frame arrived since the last call.
    pub fn take_frame_ready(&self) -> bool {
        self.read().upload_frame.swap(false, Ordering::SeqCst)
    }

    /// Drains pipeline messages: loops at end of stream when configured and
    /// falls back to the next source on errors.
    pub fn poll(&self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        let mut inner = self.write();

        while let Some(msg) = inner
            .bus
            .pop_filtered(&[gst::MessageType::Error, gst::MessageType::Eos])
        {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    log::error!(
                        "GStreamer error while playing {:?}: {}",
                        inner.current_src(),
                        err.error()
                    );
                    events.push(MediaEvent::Error(err.error().to_string()));
                    inner.fall_back_source();
                }
                gst::MessageView::Eos(_) if inner.looping => {
                    if let Err(err) = inner
                        .source
                        .seek_simple(gst::SeekFlags::FLUSH, gst::ClockTime::ZERO)
                    {
                        log::error!("failed to loop video: {err}");
                    }
                }
                gst::MessageView::Eos(_) => {
                    inner.is_eos = true;
                    events.push(MediaEvent::EndOfStream);
                }
                _ => {}
            }
        }

        if inner.upload_frame.load(Ordering::SeqCst) {
            events.push(MediaEvent::NewFrame);
        }
        events
    }

    /// Get the current NV12 frame data if available.
    pub fn current_frame_data(&self) -> Option<(Vec<u8>, u32, u32)> {
        let inner = self.read();
        let (width, height) = (*inner.frame_size.lock())?;

        let frame = inner.frame.lock();
        let readable = frame.readable()?;
        let data = readable.as_slice().to_vec();
        if data.is_empty() {
            return None;
        }
        Some((data, width, height))
    }

    /// Get the underlying GStreamer pipeline.
    pub fn pipeline(&self) -> gst::Pipeline {
        self.read().source.clone()
    }
}

impl MediaElement for Video {
    fn paused(&self) -> bool {
        !self.read().play_requested
    }

    fn ended(&self) -> bool {
        self.read().is_eos
    }

    fn ready_to_play(&self) -> bool {
        self.read().source.current_state() == gst::State::Playing
    }

    fn current_time(&self) -> Duration {
        self.read().current_time()
    }

    fn set_current_time(&mut self, time: Duration) {
        self.write().set_current_time(time)
    }

    fn play(&mut self) {
        self.write().play()
    }

    fn pause(&mut self) {
        self.write().pause()
    }

    fn reload(&mut self) {
        self.write().reload()
    }

    fn set_muted(&mut self, muted: bool) {
        self.read().source.set_property("mute", muted);
    }

    fn current_src(&self) -> Option<String> {
        self.read().current_src()
    }
}

/// Detaching clears both the source and the caption list.
impl SourceAttachment for Video {
    type PlayRequest = PlayRequest;

    fn sources_attached(&self) -> bool {
        self.read().attached
    }

    fn set_sources_attached(&mut self, attached: bool) {
        self.write().attached = attached;
    }

    fn take_play_request(&mut self) -> Option<PlayRequest> {
        self.write().pending_play.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_are_kept() {
        let uri = source_uri("https://example.com/clip.mp4").unwrap();
        assert_eq!(uri.as_str(), "https://example.com/clip.mp4");
    }

    #[test]
    fn relative_paths_become_file_uris() {
        let uri = source_uri("clips/preview.webm").unwrap();
        assert_eq!(uri.scheme(), "file");
        assert!(uri.path().ends_with("/clips/preview.webm"));
    }
}
