//! Single-line download progress display.
//!
//! The line looks like
//! `[=========                                         ] 1.2/6.5 MB at 850.3 KB/s ETA 00:00:06`
//! and is redrawn in place after every chunk.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Width of the bar between the brackets.
pub const BAR_WIDTH: usize = 50;

/// Stand-in for a zero elapsed time when computing the rate.
const ELAPSED_EPSILON: f64 = 1e-7;

const UNITS: [(&str, f64); 4] = [
    ("KB", 1024.0),
    ("MB", 1024.0 * 1024.0),
    ("GB", 1024.0 * 1024.0 * 1024.0),
    ("TB", 1024.0 * 1024.0 * 1024.0 * 1024.0),
];

/// Pick the binary unit for a byte count: the first one in which the value
/// is below 100, TB otherwise.
pub fn unit_for(bytes: f64) -> (&'static str, f64) {
    UNITS
        .iter()
        .copied()
        .find(|(_, size)| bytes / size < 100.0)
        .unwrap_or(UNITS[UNITS.len() - 1])
}

/// Scale a byte count to its unit, e.g. `2048 -> "2.0 KB"`.
pub fn format_bytes(bytes: f64) -> String {
    let (unit, size) = unit_for(bytes);
    format!("{:.1} {}", bytes / size, unit)
}

/// Format seconds as `HH:MM:SS`.
pub fn format_eta(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

/// Render the progress line.
///
/// A `total` of `None` (or zero) means the server did not say how big the
/// file is; the bar is then filled with `?` and total and ETA are unknown.
pub fn render_line(total: Option<u64>, downloaded: u64, elapsed: Duration) -> String {
    let mut seconds = elapsed.as_secs_f64();
    if seconds == 0.0 {
        seconds = ELAPSED_EPSILON;
    }
    let rate = downloaded as f64 / seconds;
    let (rate_unit, rate_size) = unit_for(rate);

    match total.filter(|t| *t > 0) {
        Some(total) => {
            let done = ((BAR_WIDTH as u64 * downloaded) / total).min(BAR_WIDTH as u64) as usize;
            let (unit, size) = unit_for(total as f64);
            let remaining = total.saturating_sub(downloaded) as f64;
            let eta = if rate > 0.0 { remaining / rate } else { 0.0 };
            format!(
                "[{}{}] {:.1}/{:.1} {} at {:.1} {}/s ETA {}",
                "=".repeat(done),
                " ".repeat(BAR_WIDTH - done),
                downloaded as f64 / size,
                total as f64 / size,
                unit,
                rate / rate_size,
                rate_unit,
                format_eta(eta)
            )
        }
        None => {
            let (unit, size) = unit_for(downloaded as f64);
            format!(
                "[{}] {:.1}/??? {} at {:.1} {}/s ETA ??:??:??",
                "?".repeat(BAR_WIDTH),
                downloaded as f64 / size,
                unit,
                rate / rate_size,
                rate_unit
            )
        }
    }
}

/// Live progress of one transfer.
pub struct TransferProgress {
    bar: ProgressBar,
    total: Option<u64>,
    downloaded: u64,
    started: Instant,
}

impl TransferProgress {
    /// Start tracking a transfer. A hidden display still tracks counts.
    pub fn new(total: Option<u64>, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let progress = Self {
            bar,
            total,
            downloaded: 0,
            started: Instant::now(),
        };
        progress.redraw();
        progress
    }

    /// Record a written chunk and redraw.
    pub fn advance(&mut self, chunk_len: usize) {
        self.downloaded += chunk_len as u64;
        self.redraw();
    }

    /// Bytes recorded so far.
    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    /// The line as currently displayed.
    pub fn line(&self) -> String {
        render_line(self.total, self.downloaded, self.started.elapsed())
    }

    fn redraw(&self) {
        self.bar.set_message(self.line());
    }

    /// Leave the final line on screen.
    pub fn finish(self) {
        self.bar.finish_with_message(self.line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_for() {
        assert_eq!(unit_for(0.0).0, "KB");
        assert_eq!(unit_for(99.0 * 1024.0).0, "KB");
        assert_eq!(unit_for(100.0 * 1024.0).0, "MB");
        assert_eq!(unit_for(150.0 * 1024.0 * 1024.0).0, "GB");
        assert_eq!(unit_for(1e15).0, "TB");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(2048.0), "2.0 KB");
        assert_eq!(format_bytes(5.5 * 1024.0 * 1024.0 * 1024.0), "5.5 GB");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0.0), "00:00:00");
        assert_eq!(format_eta(3661.9), "01:01:01");
        assert_eq!(format_eta(f64::INFINITY), "00:00:00");
    }

    #[test]
    fn test_render_known_total() {
        let line = render_line(Some(200 * 1024), 100 * 1024, Duration::from_secs(10));
        let bar = format!("[{}{}]", "=".repeat(25), " ".repeat(25));
        assert_eq!(
            line,
            format!("{} 0.1/0.2 MB at 10.0 KB/s ETA 00:00:10", bar)
        );
    }

    #[test]
    fn test_render_complete() {
        let line = render_line(Some(1), 1, Duration::from_secs(1));
        assert!(line.starts_with(&format!("[{}]", "=".repeat(BAR_WIDTH))));
        assert!(line.ends_with("ETA 00:00:00"));
    }

    #[test]
    fn test_render_unknown_total() {
        let line = render_line(None, 2048, Duration::from_secs(1));
        assert_eq!(
            line,
            format!("[{}] 2.0/??? KB at 2.0 KB/s ETA ??:??:??", "?".repeat(BAR_WIDTH))
        );
        assert_eq!(render_line(Some(0), 2048, Duration::from_secs(1)), line);
    }

    #[test]
    fn test_render_zero_elapsed() {
        let line = render_line(Some(1024), 512, Duration::ZERO);
        assert!(line.contains("ETA 00:00:00"));
        assert!(!line.contains("NaN") && !line.contains("inf"));
    }

    #[test]
    fn test_transfer_progress_counts() {
        let mut progress = TransferProgress::new(Some(30), false);
        progress.advance(10);
        progress.advance(20);
        assert_eq!(progress.downloaded(), 30);
        assert!(progress.line().starts_with(&format!("[{}]", "=".repeat(BAR_WIDTH))));
        progress.finish();
    }
}
