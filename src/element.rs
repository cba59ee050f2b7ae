use crate::video::Video;
use gpui::{
    Element, ElementId, GlobalElementId, InspectorElementId, IntoElement, LayoutId, Window,
};
use yuv::{YuvBiPlanarImage, YuvConversionMode, YuvRange, YuvStandardMatrix, yuv_nv12_to_rgba};

/// Size used before the first frame reveals the natural size of the video.
const PLACEHOLDER_SIZE: (u32, u32) = (320, 180);

/// How the element claims layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ElementSize {
    Natural,
    Fixed(gpui::Pixels, gpui::Pixels),
    Fill,
}

/// A gpui element painting the current frame of a [`Video`].
pub struct VideoElement {
    video: Video,
    size: ElementSize,
    element_id: Option<ElementId>,
}

impl VideoElement {
    pub fn new(video: Video) -> Self {
        Self {
            video,
            size: ElementSize::Natural,
            element_id: None,
        }
    }

    pub fn id(mut self, id: impl Into<ElementId>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    pub fn size(mut self, width: gpui::Pixels, height: gpui::Pixels) -> Self {
        self.size = ElementSize::Fixed(width, height);
        self
    }

    /// Stretch over the parent instead of using the video's natural size.
    pub fn fill(mut self) -> Self {
        self.size = ElementSize::Fill;
        self
    }

    fn layout_size(&self) -> gpui::Size<gpui::Length> {
        let absolute = |pixels: gpui::Pixels| {
            gpui::Length::Definite(gpui::DefiniteLength::Absolute(
                gpui::AbsoluteLength::Pixels(pixels),
            ))
        };
        match self.size {
            ElementSize::Fixed(width, height) => gpui::Size {
                width: absolute(width),
                height: absolute(height),
            },
            ElementSize::Fill => gpui::Size {
                width: gpui::Length::Definite(gpui::DefiniteLength::Fraction(1.0)),
                height: gpui::Length::Definite(gpui::DefiniteLength::Fraction(1.0)),
            },
            ElementSize::Natural => {
                let (width, height) = self.video.size().unwrap_or(PLACEHOLDER_SIZE);
                gpui::Size {
                    width: absolute(gpui::px(width as f32)),
                    height: absolute(gpui::px(height as f32)),
                }
            }
        }
    }

    /// Convert NV12 YUV data to RGBA, trying the HD matrix before the SD one.
    fn yuv_to_rgb(&self, yuv_data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
        let width_usize = width as usize;
        let height_usize = height as usize;
        let y_size = width_usize * height_usize;
        let uv_size = (width_usize * height_usize) / 2;

        if yuv_data.len() < y_size + uv_size {
            return None;
        }

        let yuv_bi_planar = YuvBiPlanarImage {
            y_plane: &yuv_data[..y_size],
            y_stride: width,
            uv_plane: &yuv_data[y_size..y_size + uv_size],
            uv_stride: width, // NV12 UV stride is same as width
            width,
            height,
        };

        let mut rgba = vec![0u8; width_usize * height_usize * 4];
        let rgba_stride = width * 4;

        let attempts = [
            (YuvRange::Full, YuvStandardMatrix::Bt709),
            (YuvRange::Limited, YuvStandardMatrix::Bt709),
            (YuvRange::Limited, YuvStandardMatrix::Bt601),
        ];
        for (range, matrix) in attempts {
            if yuv_nv12_to_rgba(
                &yuv_bi_planar,
                &mut rgba,
                rgba_stride,
                range,
                matrix,
                YuvConversionMode::Balanced,
            )
            .is_ok()
            {
                return Some(rgba);
            }
        }
        None
    }
}

impl Element for VideoElement {
    type RequestLayoutState = ();
    type PrepaintState = ();

    fn id(&self) -> Option<ElementId> {
        self.element_id.clone()
    }

    fn source_location(&self) -> Option<&'static core::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut gpui::App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let style = gpui::Style {
            size: self.layout_size(),
            ..Default::default()
        };

        let layout_id = window.request_layout(style, [], cx);
        (layout_id, ())
    }

    fn prepaint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        _bounds: gpui::Bounds<gpui::Pixels>,
        _request_layout_state: &mut Self::RequestLayoutState,
        window: &mut Window,
        _cx: &mut gpui::App,
    ) -> Self::PrepaintState {
        // Schedule repaints only while frames keep arriving.
        if self.video.take_frame_ready() {
            window.request_animation_frame();
        }
    }

    fn paint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: gpui::Bounds<gpui::Pixels>,
        _request_layout_state: &mut Self::RequestLayoutState,
        _prepaint_state: &mut Self::PrepaintState,
        window: &mut Window,
        _cx: &mut gpui::App,
    ) {
        use image::{ImageBuffer, Rgba};
        use smallvec::SmallVec;

        let Some((yuv_data, frame_width, frame_height)) = self.video.current_frame_data() else {
            return;
        };
        let Some(rgb_data) = self.yuv_to_rgb(&yuv_data, frame_width, frame_height) else {
            log::debug!("skipping undecodable frame of {frame_width}x{frame_height}");
            return;
        };

        if let Some(image_buffer) =
            ImageBuffer::<Rgba<u8>, _>::from_raw(frame_width, frame_height, rgb_data)
        {
            let frames: SmallVec<[image::Frame; 1]> =
                SmallVec::from_elem(image::Frame::new(image_buffer), 1);
            let render_image = std::sync::Arc::new(gpui::RenderImage::new(frames));

            window
                .paint_image(
                    bounds,
                    gpui::Corners::default(),
                    render_image,
                    0,     // frame index
                    false, // grayscale
                )
                .ok();
        }
    }
}

impl IntoElement for VideoElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

/// Helper function to create a video element
pub fn video(video: Video) -> VideoElement {
    VideoElement::new(video)
}
