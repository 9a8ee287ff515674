//! Rolling-window helpers.

/// Parses the rolling-window text input.
///
/// Anything that is not a positive integer falls back to 1.
///
/// ```
/// use di_dashboard::parse_window;
///
/// assert_eq!(parse_window("3"), 3);
/// assert_eq!(parse_window(" 6 "), 6);
/// assert_eq!(parse_window("abc"), 1);
/// assert_eq!(parse_window("0"), 1);
/// ```
pub fn parse_window(text: &str) -> usize {
    match text.trim().parse::<usize>() {
        Ok(window) if window > 0 => window,
        _ => 1,
    }
}

/// Trailing mean over `window` values.
///
/// Only positions with a full window produce a value, so the result has
/// `values.len() - window + 1` entries (none when the window is longer than
/// the input). Entry `i` is the mean of `values[i..i + window]`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    if values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|chunk| chunk.iter().sum::<f64>() / window as f64)
        .collect()
}
