//! Terminal output.
//!
//! All user-facing progress goes through [`Shell`]: a right-aligned status
//! word followed by a message, written to stderr. Diagnostics from tracing
//! are separate and controlled by `RUST_LOG` / `--verbose`.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    #[default]
    Normal,
    /// --verbose: also print every tool invocation
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success (green)
    Finished,

    // In progress (cyan)
    Compiling,
    Linking,
    Archiving,
    Linting,
    Running,

    // Warning (yellow)
    Warning,

    // Error (red)
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Compiling => "Compiling",
            Status::Linking => "Linking",
            Status::Archiving => "Archiving",
            Status::Linting => "Linting",
            Status::Running => "Running",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished => "\x1b[1;32m",
            Status::Compiling
            | Status::Linking
            | Status::Archiving
            | Status::Linting
            | Status::Running => "\x1b[1;36m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Width status words are right-aligned to.
const STATUS_WIDTH: usize = 12;

#[derive(Debug)]
enum Output {
    Stderr,
    Buffer(Mutex<Vec<u8>>),
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
    output: Output,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
            output: Output::Stderr,
        }
    }

    /// Create a shell from CLI flags; quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, no_color: bool) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let color = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };

        Shell::new(verbosity, color)
    }

    /// A shell that records its output instead of printing it.
    pub fn capture(verbosity: Verbosity) -> Self {
        Shell {
            verbosity,
            use_color: false,
            output: Output::Buffer(Mutex::new(Vec::new())),
        }
    }

    /// Output recorded by a capturing shell.
    pub fn captured(&self) -> String {
        match &self.output {
            Output::Buffer(buf) => buf
                .lock()
                .map(|b| String::from_utf8_lossy(&b).into_owned())
                .unwrap_or_default(),
            Output::Stderr => String::new(),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    fn write_line(&self, line: &str) {
        match &self.output {
            Output::Stderr => {
                let _ = writeln!(io::stderr().lock(), "{}", line);
            }
            Output::Buffer(buf) => {
                if let Ok(mut buf) = buf.lock() {
                    let _ = writeln!(buf, "{}", line);
                }
            }
        }
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`. In quiet mode only errors print.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }

        let line = format!("{} {}", self.format_status(status), msg);
        self.write_line(&line);
    }

    /// Print a plain line, suppressed in quiet mode.
    pub fn println(&self, msg: impl Display) {
        if !self.is_quiet() {
            self.write_line(&msg.to_string());
        }
    }

    /// Print a command line in verbose mode.
    pub fn command(&self, cmd: impl Display) {
        if self.is_verbose() {
            self.status(Status::Running, format!("`{}`", cmd));
        }
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Echo a failed tool's output, each line marked `ERROR:`, then the
    /// exact command line. Printed even in quiet mode.
    pub fn failure_report<'a>(
        &self,
        diagnostics: impl IntoIterator<Item = &'a String>,
        command: &str,
    ) {
        for line in diagnostics {
            self.write_line(&format!("ERROR: {}", line));
        }
        self.write_line(&format!("command: {}", command));
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();

        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}
