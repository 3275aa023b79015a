//! Output Formatting
//!
//! Decides how labels are decorated in the outline:
//! - [`AnsiStyle`] colours directories cyan and leaves green (PASS) or red (FAIL)
//! - [`PlainStyle`] writes `[PASS]`, `[FAIL]` and `[ERROR]` tags instead
//!
//! The choice comes from `--color` and the `NO_COLOR` environment variable.

use clap::ValueEnum;
use std::io::IsTerminal;

const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

/// Environment variable that disables colour when set to a truthy value
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Label decoration used by the reporter
pub trait Style {
    /// Label for a directory line (including the root)
    fn directory(&self, name: &str) -> String;

    /// Label for a leaf; `verdict` is `Some(passed)` in differential mode
    fn leaf(&self, name: &str, verdict: Option<bool>) -> String;

    /// Label for a leaf that could not be measured.
    ///
    /// `verdict` is still shown when the comparison ran before the failure.
    fn error(&self, name: &str, verdict: Option<bool>, message: &str) -> String;
}

/// ANSI colour decoration
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiStyle;

impl Style for AnsiStyle {
    fn directory(&self, name: &str) -> String {
        format!("{CYAN}{name}{RESET}")
    }

    fn leaf(&self, name: &str, verdict: Option<bool>) -> String {
        match verdict {
            Some(true) => format!("{GREEN}{name}{RESET}"),
            Some(false) => format!("{RED}{name}{RESET}"),
            None => name.to_string(),
        }
    }

    fn error(&self, name: &str, verdict: Option<bool>, message: &str) -> String {
        let colour = if verdict == Some(true) { GREEN } else { RED };
        format!("{colour}{name}{RESET} {YELLOW}error:{RESET} {message}")
    }
}

/// Undecorated output with textual tags
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyle;

impl Style for PlainStyle {
    fn directory(&self, name: &str) -> String {
        name.to_string()
    }

    fn leaf(&self, name: &str, verdict: Option<bool>) -> String {
        match verdict {
            Some(true) => format!("[PASS] {name}"),
            Some(false) => format!("[FAIL] {name}"),
            None => name.to_string(),
        }
    }

    fn error(&self, name: &str, verdict: Option<bool>, message: &str) -> String {
        match verdict {
            Some(true) => format!("[PASS] [ERROR] {name} error: {message}"),
            Some(false) => format!("[FAIL] [ERROR] {name} error: {message}"),
            None => format!("[ERROR] {name} error: {message}"),
        }
    }
}

/// When to colour the outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Colour when stdout is a terminal and `NO_COLOR` is not set
    #[default]
    Auto,
    /// Always colour
    Always,
    /// Never colour
    Never,
}

impl ColorChoice {
    /// Resolve to a boolean.
    ///
    /// `no_color` and `is_tty` are only consulted for `Auto`.
    pub fn should_use_colors(self, no_color: bool, is_tty: bool) -> bool {
        match self {
            ColorChoice::Auto => !no_color && is_tty,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Whether a `NO_COLOR` value asks for plain output.
///
/// Unset, empty, `0`, `false`, `no` and `off` (any case) leave colour on.
pub fn no_color_requested(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
    }
}

/// Pick the style for stdout from `choice` and the environment
pub fn select_style(choice: ColorChoice) -> Box<dyn Style> {
    let no_color = no_color_requested(std::env::var(NO_COLOR_ENV).ok().as_deref());
    let is_tty = std::io::stdout().is_terminal();

    if choice.should_use_colors(no_color, is_tty) {
        Box::new(AnsiStyle)
    } else {
        Box::new(PlainStyle)
    }
}
