//! Progress reporting for file sends.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Format bytes in human-readable form.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Format a duration as mm:ss or hh:mm:ss.
pub fn format_duration(secs: f64) -> String {
    let total_secs = secs as u64;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{hours:02}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

/// Terminal progress reporter for a single file send.
///
/// Renders to stderr at a bounded rate so it never dominates the transfer.
pub struct ProgressReporter {
    name: String,
    total: u64,
    current: u64,
    start_time: Instant,
    last_render: Instant,
    enabled: bool,
}

impl ProgressReporter {
    const BAR_WIDTH: usize = 30;
    const RENDER_INTERVAL: Duration = Duration::from_millis(100);

    /// Create a reporter for a file of known size.
    pub fn new(name: impl Into<String>, total: u64, enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            name: name.into(),
            total,
            current: 0,
            start_time: now,
            last_render: now,
            enabled,
        }
    }

    /// Add sent bytes to the progress.
    pub fn add(&mut self, bytes: u64) {
        self.current += bytes;

        let now = Instant::now();
        if self.enabled && now.duration_since(self.last_render) >= Self::RENDER_INTERVAL {
            self.render();
            self.last_render = now;
        }
    }

    /// Print the final summary line.
    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let speed = if elapsed > 0.0 {
            self.current as f64 / elapsed
        } else {
            0.0
        };
        eprintln!(
            "\r{}: {} in {} ({}/s){:width$}",
            self.name,
            format_bytes(self.current),
            format_duration(elapsed),
            format_bytes(speed as u64),
            "",
            width = Self::BAR_WIDTH
        );
    }

    fn render(&self) {
        let percent = if self.total > 0 {
            (self.current as f64 / self.total as f64 * 100.0).min(100.0)
        } else {
            100.0
        };
        let filled = ((percent / 100.0) * Self::BAR_WIDTH as f64) as usize;
        let bar: String = (0..Self::BAR_WIDTH)
            .map(|i| if i < filled { '#' } else { '-' })
            .collect();

        let _ = eprint!(
            "\r{}: [{}] {:5.1}% {}/{}",
            self.name,
            bar,
            percent,
            format_bytes(self.current),
            format_bytes(self.total)
        );
        let _ = io::stderr().flush();
    }
}
