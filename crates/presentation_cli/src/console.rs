//! Colored terminal output
//!
//! Colors are dropped when stdout is not a terminal or `NO_COLOR` is set.

use std::io::IsTerminal;

/// Kind of message, mapped to an ANSI color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Progress step (cyan)
    Step,
    /// Success (green)
    Success,
    /// Non-fatal problem (yellow)
    Warning,
    /// Failure (red)
    Error,
    /// Secondary detail (gray)
    Muted,
    /// No color
    Plain,
}

impl Tone {
    const fn ansi(self) -> Option<&'static str> {
        match self {
            Self::Step => Some("36"),
            Self::Success => Some("32"),
            Self::Warning => Some("33"),
            Self::Error => Some("31"),
            Self::Muted => Some("90"),
            Self::Plain => None,
        }
    }
}

/// A line of output with its tone
pub type Line = (Tone, String);

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Wrap `text` in the tone's escape codes when `enabled`
pub fn paint_with(enabled: bool, tone: Tone, text: &str) -> String {
    match tone.ansi() {
        Some(code) if enabled => format!("\x1b[{code}m{text}\x1b[0m"),
        _ => text.to_string(),
    }
}

pub fn paint(tone: Tone, text: &str) -> String {
    paint_with(colors_enabled(), tone, text)
}

/// Print one line; errors go to stderr
pub fn emit(tone: Tone, text: &str) {
    if tone == Tone::Error {
        eprintln!("{}", paint(tone, text));
    } else {
        println!("{}", paint(tone, text));
    }
}

pub fn emit_all(lines: &[Line]) {
    for (tone, text) in lines {
        emit(*tone, text);
    }
}

pub fn step(text: &str) {
    emit(Tone::Step, text);
}

pub fn success(text: &str) {
    emit(Tone::Success, text);
}

pub fn warning(text: &str) {
    emit(Tone::Warning, text);
}

pub fn error(text: &str) {
    emit(Tone::Error, text);
}

pub fn muted(text: &str) {
    emit(Tone::Muted, text);
}

pub fn rule() {
    muted(&"-".repeat(80));
}
