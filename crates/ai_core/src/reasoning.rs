//! Reasoning trace removal
//!
//! Thinking models interleave their chain of thought with the answer. These
//! helpers keep only the final answer.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // Infallible with valid static patterns
static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid think pattern"));

#[allow(clippy::expect_used)]
static REASONING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<reasoning>.*?</reasoning>").expect("valid reasoning pattern")
});

#[allow(clippy::expect_used)]
static ANSWER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:Final\s+)?Answer\s*:\s*(.*)").expect("valid answer pattern")
});

#[allow(clippy::expect_used)]
static THINKING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```thinking.*?```").expect("valid fence pattern"));

#[allow(clippy::expect_used)]
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid blank-line pattern"));

/// Strip reasoning traces and return the cleaned answer
///
/// Applied in order: `<think>` and `<reasoning>` blocks are removed, text
/// after an `Answer:` / `Final Answer:` marker replaces the whole text,
/// ```` ```thinking ```` fences are removed, blank-line runs collapse to a
/// single blank line and the result is trimmed.
pub fn strip_reasoning(text: &str) -> String {
    let text = THINK_BLOCK.replace_all(text, "");
    let text = REASONING_BLOCK.replace_all(&text, "");

    let text = match ANSWER_MARKER.captures(&text).and_then(|c| c.get(1)) {
        Some(answer) => answer.as_str().to_string(),
        None => text.into_owned(),
    };

    let text = THINKING_FENCE.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}
