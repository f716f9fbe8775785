// SliderGeometry - Pixel <-> frame mapping for the transport slider

/// Horizontal padding on each side of the slider
pub const SLIDER_MARGIN_PX: f64 = 10.0;

/// Closest two section markers may be dragged to each other
pub const MARKER_GAP_PX: f64 = 15.0;

/// Which part of the song the slider spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderRange {
    FullSong { song_length: u64 },
    /// Zoomed onto one section
    Section { start_frame: u64, end_frame: u64 },
}

impl SliderRange {
    fn bounds(&self) -> (u64, u64) {
        match *self {
            SliderRange::FullSong { song_length } => (0, song_length),
            SliderRange::Section {
                start_frame,
                end_frame,
            } => (start_frame, end_frame.max(start_frame)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderGeometry {
    pub width: f64,
    pub range: SliderRange,
}

impl SliderGeometry {
    pub fn full_song(width: f64, song_length: u64) -> Self {
        Self {
            width,
            range: SliderRange::FullSong { song_length },
        }
    }

    pub fn section(width: f64, start_frame: u64, end_frame: u64) -> Self {
        Self {
            width,
            range: SliderRange::Section {
                start_frame,
                end_frame,
            },
        }
    }

    fn usable_width(&self) -> f64 {
        (self.width - 2.0 * SLIDER_MARGIN_PX).max(1.0)
    }

    /// Span in frames, never zero
    fn span(&self) -> u64 {
        let (start, end) = self.range.bounds();
        (end - start).max(1)
    }

    /// X coordinate of `frame`; frames outside the range pin to the edges
    pub fn frame_to_x(&self, frame: u64) -> f64 {
        let (start, _) = self.range.bounds();
        let ratio = frame.saturating_sub(start) as f64 / self.span() as f64;
        SLIDER_MARGIN_PX + ratio.clamp(0.0, 1.0) * self.usable_width()
    }

    /// Frame under x coordinate `x`, clamped to the range
    pub fn x_to_frame(&self, x: f64) -> u64 {
        let (start, _) = self.range.bounds();
        let ratio = if x.is_finite() {
            ((x - SLIDER_MARGIN_PX) / self.usable_width()).clamp(0.0, 1.0)
        } else {
            0.0
        };
        start + (ratio * self.span() as f64).round() as u64
    }

    /// Keep a pointer x inside the drawable area
    pub fn clamp_x(&self, x: f64) -> f64 {
        let right = (self.width - SLIDER_MARGIN_PX).max(SLIDER_MARGIN_PX);
        x.clamp(SLIDER_MARGIN_PX, right)
    }

    /// Frames covered by one pixel
    pub fn frames_per_px(&self) -> f64 {
        self.span() as f64 / self.usable_width()
    }

    /// Minimum distance between markers, in frames (at least one)
    pub fn marker_gap_frames(&self) -> u64 {
        ((MARKER_GAP_PX * self.frames_per_px()).round() as u64).max(1)
    }
}
