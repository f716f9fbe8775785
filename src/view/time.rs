// Time display helpers - frames, seconds and "mm:ss.d" strings

/// Frames to seconds at `sample_rate`
pub fn frames_to_seconds(frames: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    frames as f64 / sample_rate as f64
}

/// Seconds to the nearest frame; negative or non-finite input gives 0
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64).round() as u64
}

/// Format seconds as `mm:ss.d` (tenths are truncated, not rounded)
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    let whole = rest.floor();
    let tenths = ((rest - whole) * 10.0).floor().min(9.0);
    format!("{:02}:{:02}.{}", minutes as u64, whole as u64, tenths as u64)
}

/// Parse `mm:ss.d`, `mm:ss` or plain seconds
///
/// Only the first decimal digit of `mm:ss.d` is used, matching what the
/// formatter prints. The seconds field of the `mm:ss` forms must be below 60.
pub fn parse_time(text: &str) -> Option<f64> {
    let text = text.trim();
    let Some((minutes, rest)) = text.split_once(':') else {
        let seconds: f64 = text.parse().ok()?;
        return (seconds.is_finite() && seconds >= 0.0).then_some(seconds);
    };

    let minutes: u64 = minutes.trim().parse().ok()?;
    let (whole, tenths) = match rest.split_once('.') {
        Some((whole, fraction)) => {
            let tenths = match fraction.chars().next() {
                Some(digit) => digit.to_digit(10)? as f64 / 10.0,
                None => 0.0,
            };
            (whole.parse::<u64>().ok()?, tenths)
        }
        None => (rest.parse::<u64>().ok()?, 0.0),
    };
    if whole >= 60 {
        return None;
    }
    Some(minutes as f64 * 60.0 + whole as f64 + tenths)
}

/// `current / total` label of the transport
pub fn format_progress(current_seconds: f64, total_seconds: f64) -> String {
    format!(
        "{} / {}",
        format_time(current_seconds),
        format_time(total_seconds)
    )
}
