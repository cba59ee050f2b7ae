use crate::controller::DisplayState;

/// Which overlay layers are visible for a given controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayVisibility {
    pub paused: bool,
    pub loading: bool,
    pub hover: bool,
}

impl OverlayVisibility {
    /// The paused overlay stays up until playback has actually started, so
    /// it also covers the loading phase. The loading overlay sits on top of it.
    pub fn derive(state: DisplayState, active: bool) -> Self {
        Self {
            paused: state != DisplayState::Playing,
            loading: state == DisplayState::Loading,
            hover: active,
        }
    }

    pub fn opacity(visible: bool) -> f32 {
        if visible { 1.0 } else { 0.0 }
    }
}
