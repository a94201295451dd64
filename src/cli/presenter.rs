//! CLI presenter for output formatting

use std::io::{self, Write};
use std::time::Duration as StdDuration;

use chrono::{Local, TimeZone};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::recording::{format_clock, Recording, RecordingId};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(StdDuration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn is_spinner_active(&self) -> bool {
        self.spinner.is_some()
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.suspended(|| eprintln!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.suspended(|| eprintln!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.suspended(|| eprintln!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.suspended(|| eprintln!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        self.suspended(|| println!("{}", text));
    }

    /// Prompt shown before reading a command
    pub fn prompt(&self) {
        if self.spinner.is_none() {
            print!("{} ", ">".cyan());
            let _ = io::stdout().flush();
        }
    }

    /// Recording clock, e.g. `00:07 / 30:00`
    pub fn format_recording(&self, elapsed_secs: u32, max_secs: u64) -> String {
        format!(
            "Recording {} {}",
            format_clock(u64::from(elapsed_secs)).bold(),
            format!("/ {}", format_clock(max_secs)).dimmed()
        )
    }

    /// Show the recording spinner with the elapsed clock
    pub fn show_recording(&mut self, elapsed_secs: u32, max_secs: u64) {
        let message = self.format_recording(elapsed_secs, max_secs);
        if self.spinner.is_some() {
            self.update_spinner(&message);
        } else {
            self.start_spinner(&message);
        }
    }

    /// One row of the recording list
    pub fn format_entry(&self, number: usize, recording: &Recording, playing: bool) -> String {
        let marker = if playing {
            "▶".green().to_string()
        } else {
            " ".to_string()
        };
        format!(
            "{} {:>4}  {}  {}  {}",
            marker,
            format!("#{number}").cyan(),
            recording.duration().clock(),
            format_timestamp(recording.timestamp_ms()).dimmed(),
            recording.audio().human_readable_size().dimmed()
        )
    }

    /// Print recordings newest first; `show_hint` prints a hint when empty
    pub fn recording_list<'a>(
        &self,
        entries: impl Iterator<Item = (usize, &'a Recording)>,
        playing: Option<&RecordingId>,
        show_hint: bool,
    ) {
        let mut any = false;
        for (number, recording) in entries {
            any = true;
            let is_playing = playing == Some(recording.id());
            self.output(&self.format_entry(number, recording, is_playing));
        }
        if !any && show_hint {
            self.info("No recordings yet. Type 'record' to capture your first voice note.");
        }
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    fn suspended(&self, print: impl FnOnce()) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(print),
            None => print(),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Local date and time for a millisecond timestamp
pub fn format_timestamp(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}
