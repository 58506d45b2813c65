//! Diagnostic output to stderr.

use std::fmt::Display;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Log level for filtering messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

impl Level {
    fn color(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Level::Info => spec.set_fg(Some(Color::Cyan)),
            Level::Warn => spec.set_fg(Some(Color::Yellow)).set_bold(true),
            Level::Error => spec.set_fg(Some(Color::Red)).set_bold(true),
        };
        spec
    }
}

/// Drops `info` messages when set.
pub static QUIET: AtomicBool = AtomicBool::new(false);

/// Returns `true` if a message of `level` would be printed.
pub fn enabled(level: Level) -> bool {
    level > Level::Info || !QUIET.load(Ordering::Relaxed)
}

/// Internal logging function. Use the `info!`, `warn!`, or `error!` macros instead.
#[doc(hidden)]
pub fn log(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }

    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(&level.color());
    let _ = write!(stderr, "{level}");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {message}");
}

/// Logs an info-level message.
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log::log($crate::log::Level::Info, &format!($($arg)*))
    };
}

/// Logs a warning-level message.
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::log($crate::log::Level::Warn, &format!($($arg)*))
    };
}

/// Logs an error-level message.
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log::log($crate::log::Level::Error, &format!($($arg)*))
    };
}
