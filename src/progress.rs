//! Status lines written to stderr while a batch runs.
//!
//! With `-v` and above the reporter stays silent and tracing carries the
//! same information.

use crate::rename::{FileOutcome, FileStatus};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

pub struct Progress {
    writer: Box<dyn Write>,
    silent: bool,
    colors_enabled: bool,
}

fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: false,
            colors_enabled: should_use_colors(),
        }
    }

    /// Reporter for the CLI; verbose runs leave output to tracing
    pub fn for_verbosity(verbosity: u8) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbosity > 0,
            colors_enabled: should_use_colors(),
        }
    }

    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            writer: Box::new(io::sink()),
            silent: true,
            colors_enabled: false,
        }
    }

    /// One line per finished file
    pub fn file_done(&mut self, current: usize, total: usize, outcome: &FileOutcome) {
        if self.silent {
            return;
        }
        let from = display_name(&outcome.source_path);
        let to = display_name(&outcome.target_path);
        let counter = format!("[{}/{}]", current, total);

        match (&outcome.status, self.colors_enabled) {
            (FileStatus::Committed, true) => {
                let _ = writeln!(
                    self.writer,
                    "{} {} {} {}",
                    counter.cyan(),
                    from.dimmed(),
                    "→".cyan(),
                    to
                );
            }
            (FileStatus::Committed, false) => {
                let _ = writeln!(self.writer, "{} {} -> {}", counter, from, to);
            }
            (FileStatus::Unchanged, _) | (FileStatus::NotProcessed, _) => {}
            (status, true) => {
                let reason = status.reason().map(|e| e.to_string()).unwrap_or_default();
                let _ = writeln!(
                    self.writer,
                    "{} {} {}",
                    counter.cyan(),
                    from,
                    format!("failed: {}", reason).red()
                );
            }
            (status, false) => {
                let reason = status.reason().map(|e| e.to_string()).unwrap_or_default();
                let _ = writeln!(self.writer, "{} {} failed: {}", counter, from, reason);
            }
        }
    }

    pub fn gps_start(&mut self, total: usize) {
        if self.silent {
            return;
        }
        let message = format!("Writing GPS coordinates to {} files...", total);
        if self.colors_enabled {
            let _ = write!(self.writer, "{}", message.dimmed());
        } else {
            let _ = write!(self.writer, "{}", message);
        }
        let _ = self.writer.flush();
    }

    /// Same line as `gps_start`
    pub fn gps_complete(&mut self, written: usize, total: usize) {
        if self.silent {
            return;
        }
        if written == total {
            if self.colors_enabled {
                let _ = writeln!(self.writer, " {}", "done".green());
            } else {
                let _ = writeln!(self.writer, " done");
            }
        } else if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                " {}",
                format!("{} of {} written", written, total).yellow()
            );
        } else {
            let _ = writeln!(self.writer, " {} of {} written", written, total);
        }
    }

    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    pub fn undo_start(&mut self, entries: usize, executed_at: &str) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        let message = format!("Undoing {} renames from {}", entries, executed_at);
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", message.bold());
        } else {
            let _ = writeln!(self.writer, "{}", message);
        }
    }

    pub fn batch_complete(&mut self, committed: usize) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{} {}",
                "✓".green().bold(),
                format!("{} files renamed", committed).green()
            );
        } else {
            let _ = writeln!(self.writer, "Rename complete. {} files renamed.", committed);
        }
    }
}
