//! Audio playback state and waveform layout for the meeting detail page.

pub mod player;
pub mod waveform;

pub use player::{
    AudioBackend, PlaybackController, PlaybackSnapshot, PlaybackState, PlayerEvent,
    SKIP_SECONDS, SPEED_OPTIONS,
};
pub use waveform::{format_time, render, Bar, Rect, WaveformFrame, MAX_HEIGHT_RATIO};
