// TransportView adapter - What the slider reads and the intents it emits

pub mod drag;
pub mod slider;
pub mod snapshot;
pub mod time;

pub use drag::{DragGesture, DragTarget};
pub use slider::{MARKER_GAP_PX, SLIDER_MARGIN_PX, SliderGeometry, SliderRange};
pub use snapshot::Snapshot;
pub use time::{format_progress, format_time, frames_to_seconds, parse_time, seconds_to_frames};
