//! Waveform geometry. Pure; the host does the drawing.

/// Share of the canvas height the tallest bar may use.
pub const MAX_HEIGHT_RATIO: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One amplitude bar, mirrored about the centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub width: f32,
    /// Height of each half.
    pub half_height: f32,
    /// Left of the playback cursor.
    pub played: bool,
}

impl Bar {
    pub fn upper(&self, center_y: f32) -> Rect {
        Rect {
            x: self.x,
            y: center_y - self.half_height,
            width: self.width,
            height: self.half_height,
        }
    }

    pub fn lower(&self, center_y: f32) -> Rect {
        Rect {
            x: self.x,
            y: center_y,
            width: self.width,
            height: self.half_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveformFrame {
    pub bars: Vec<Bar>,
    pub center_y: f32,
    pub cursor_x: f32,
}

/// Lays out `samples` (0..1 amplitudes) on a `width` x `height` canvas.
///
/// A non-positive or non-finite duration counts as one second.
pub fn render(
    samples: &[f32],
    current_time: f64,
    duration: f64,
    width: f32,
    height: f32,
) -> WaveformFrame {
    let duration = if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        1.0
    };
    let ratio = if current_time.is_finite() {
        (current_time / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cursor_x = width * ratio as f32;
    let center_y = height / 2.0;

    if samples.is_empty() {
        return WaveformFrame {
            bars: Vec::new(),
            center_y,
            cursor_x,
        };
    }

    let slot = width / samples.len() as f32;
    let max_bar = height * MAX_HEIGHT_RATIO;
    let bars = samples
        .iter()
        .enumerate()
        .map(|(i, amplitude)| {
            let amplitude = if amplitude.is_finite() {
                amplitude.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let x = i as f32 * slot;
            Bar {
                x,
                width: (slot - 1.0).max(0.0),
                half_height: amplitude * max_bar / 2.0,
                played: x < cursor_x,
            }
        })
        .collect();

    WaveformFrame {
        bars,
        center_y,
        cursor_x,
    }
}

/// `MM:SS`; anything invalid shows as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
