//! Markdown-lite rendering of message text to HTML.
//!
//! Text is HTML-escaped before any substitution, so message content can be
//! assigned as inner HTML without injecting markup. The substitutions then
//! run in a fixed order: bold, italic, inline code, line breaks. Each pattern
//! is non-greedy and stays within one line.

use std::sync::LazyLock;

use regex::Regex;

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic pattern"));
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.*?)`").expect("valid code pattern"));

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render message text as HTML.
#[must_use]
pub fn format_message(content: &str) -> String {
    let escaped = escape_html(content);
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    let code = CODE.replace_all(&italic, "<code>$1</code>");
    code.replace('\n', "<br>")
}
