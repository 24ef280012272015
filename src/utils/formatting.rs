/// Linear map of `value` from one range to another, clamped to the output range.
/// A degenerate input range maps to `out_min`.
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if in_max <= in_min {
        return out_min;
    }
    let ratio = ((value - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    (out_min + ratio * (out_max - out_min)).floor()
}

/// Format milliseconds as `m:ss` (or `h:mm:ss` past an hour)
pub fn format_millis(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
