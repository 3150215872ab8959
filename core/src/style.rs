//! ANSI styling for help output.
//!
//! A small SGR painter used by the instruction renderer. Styling is
//! skipped entirely when stdout is not a terminal or `NO_COLOR` is set,
//! so captured output stays clean.

use std::env;
use std::io::{IsTerminal, Write};

/// SGR attribute codes understood by most terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Reset,
    Bold,
    Faint,
    Underline,
    FgRed,
    FgGreen,
    FgYellow,
    FgBlue,
    FgMagenta,
    FgCyan,
    FgWhite,
    FgHiRed,
    FgHiGreen,
    FgHiYellow,
    FgHiBlue,
    FgHiMagenta,
    FgHiCyan,
    FgHiWhite,
}

impl Attribute {
    fn code(self) -> u8 {
        match self {
            Attribute::Reset => 0,
            Attribute::Bold => 1,
            Attribute::Faint => 2,
            Attribute::Underline => 4,
            Attribute::FgRed => 31,
            Attribute::FgGreen => 32,
            Attribute::FgYellow => 33,
            Attribute::FgBlue => 34,
            Attribute::FgMagenta => 35,
            Attribute::FgCyan => 36,
            Attribute::FgWhite => 37,
            Attribute::FgHiRed => 91,
            Attribute::FgHiGreen => 92,
            Attribute::FgHiYellow => 93,
            Attribute::FgHiBlue => 94,
            Attribute::FgHiMagenta => 95,
            Attribute::FgHiCyan => 96,
            Attribute::FgHiWhite => 97,
        }
    }
}

/// True when styled output is appropriate for this process.
pub fn color_enabled() -> bool {
    env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Writes `text`, wrapped in the given attributes when color is enabled.
pub fn paint(w: &mut dyn Write, attributes: &[Attribute], text: &str) {
    if attributes.is_empty() || !color_enabled() {
        let _ = w.write_all(text.as_bytes());
        return;
    }
    let sequence = attributes
        .iter()
        .map(|a| a.code().to_string())
        .collect::<Vec<_>>()
        .join(";");
    let _ = write!(w, "\x1b[{sequence}m{text}\x1b[{}m", Attribute::Reset.code());
}

/// High-intensity white, the body style of the help renderer.
pub fn white(w: &mut dyn Write, text: &str) {
    paint(w, &[Attribute::FgHiWhite], text);
}

/// Bold high-intensity white, used for the instruction title line.
pub fn title(w: &mut dyn Write, text: &str) {
    paint(w, &[Attribute::Bold, Attribute::FgHiWhite], text);
}
