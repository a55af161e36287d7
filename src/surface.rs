//! Controls the application drives.
//!
//! The widget toolkit itself is outside this crate; it only has to implement
//! [`UiSurface`]. Every method is invoked from the UI loop.

use std::fmt;
use std::io::{self, Write};

use tracing::{info, warn};

use crate::artwork::{ImageState, LoadedImage};
use crate::gallery::{GRID_COLUMNS, GalleryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    Play,
    Pause,
}

impl fmt::Display for ToggleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Modal message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

pub trait UiSurface {
    fn set_status(&mut self, message: &str);
    fn set_progress(&mut self, fraction: f64);
    fn set_trigger_enabled(&mut self, enabled: bool);
    fn set_toggle_label(&mut self, label: ToggleLabel);
    fn show_notice(&mut self, notice: Notice);
    fn show_slot(&mut self, index: usize, image: &LoadedImage);
    fn show_grid(&mut self, gallery: &GalleryState);
}

/// Line-oriented surface for a terminal.
pub struct TerminalSurface<W: Write = io::Stdout> {
    out: W,
    progress: f64,
    trigger_enabled: bool,
}

impl TerminalSurface {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            progress: 0.0,
            trigger_enabled: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{args}").and_then(|_| self.out.flush()) {
            warn!("terminal write failed: {err}");
        }
    }
}

fn describe(image: &LoadedImage) -> String {
    let state = match image.state() {
        ImageState::Pending => "loading",
        ImageState::Ready(_) => "ok",
        ImageState::Broken(_) => "broken",
    };
    format!("{} [{state}]", image.locator())
}

impl<W: Write> UiSurface for TerminalSurface<W> {
    fn set_status(&mut self, message: &str) {
        info!(status = message, "status");
        self.line(format_args!("status: {message}"));
    }

    fn set_progress(&mut self, fraction: f64) {
        // only redraw on coarse steps; per-image updates would flood the terminal
        let step = (fraction * 10.0).floor();
        if step != (self.progress * 10.0).floor() || fraction == 0.0 || fraction == 1.0 {
            self.line(format_args!("progress: {:>3.0}%", fraction * 100.0));
        }
        self.progress = fraction;
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        if enabled != self.trigger_enabled {
            self.trigger_enabled = enabled;
            let state = if enabled { "enabled" } else { "disabled" };
            self.line(format_args!("[Get Images] {state}"));
        }
    }

    fn set_toggle_label(&mut self, label: ToggleLabel) {
        self.line(format_args!("[{label}]"));
    }

    fn show_notice(&mut self, notice: Notice) {
        let tag = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Error => "error",
        };
        self.line(format_args!("== {tag}: {} ==\n{}", notice.title, notice.body));
    }

    fn show_slot(&mut self, index: usize, image: &LoadedImage) {
        let (row, col) = (index / GRID_COLUMNS, index % GRID_COLUMNS);
        self.line(format_args!("slot {index:>2} (r{row} c{col}) <- {}", describe(image)));
    }

    fn show_grid(&mut self, gallery: &GalleryState) {
        for (index, image) in gallery.slots().iter().enumerate() {
            self.show_slot(index, image);
        }
        self.line(format_args!("surplus: {} image(s)", gallery.surplus().len()));
    }
}
