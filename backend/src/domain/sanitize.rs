//! Free-text sanitisation applied to thing metadata before storage.
//!
//! Markup is stripped rather than rendered: `<script>` and `<style>` blocks
//! are removed with their content and remaining tags are dropped. Stray `&`,
//! `<` and `>` are escaped so stored text is safe to re-serve verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

#[expect(clippy::expect_used, reason = "pattern is a literal covered by unit tests")]
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(script|style)\b[^>]*>.*?(<\s*/\s*(script|style)\s*>|\z)")
        .expect("script block regex compiles")
});

#[expect(clippy::expect_used, reason = "pattern is a literal covered by unit tests")]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\s*/?\s*[A-Za-z!][^>]*>").expect("tag regex compiles"));

#[expect(clippy::expect_used, reason = "pattern is a literal covered by unit tests")]
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(amp|lt|gt|quot|apos|#39);").expect("entity regex compiles"));

/// Strip markup and scripting content from untrusted text.
///
/// Entities are decoded once before stripping, so text that already went
/// through here (for example a title read back and resubmitted) comes out
/// unchanged.
///
/// # Examples
/// ```
/// use cadinet::domain::sanitize_text;
///
/// assert_eq!(sanitize_text("<b>Bracket</b><script>alert(1)</script>"), "Bracket");
/// assert_eq!(sanitize_text("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(sanitize_text("a &lt; b &amp; c"), "a &lt; b &amp; c");
/// ```
pub fn sanitize_text(input: &str) -> String {
    let without_nul: String = input.chars().filter(|c| *c != '\0').collect();
    let decoded = decode_entities(&without_nul);
    escape(strip_markup(decoded).trim())
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            match caps.get(1).map_or("", |m| m.as_str()) {
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "'",
            }
        })
        .into_owned()
}

/// Removing one tag can join its neighbours into a new one (`<<b>i>`), so
/// strip until nothing changes. Each pass either shortens the text or stops.
fn strip_markup(mut text: String) -> String {
    loop {
        let without_blocks = BLOCK_RE.replace_all(&text, "");
        let stripped = TAG_RE.replace_all(&without_blocks, "").into_owned();
        if stripped.len() == text.len() {
            return stripped;
        }
        text = stripped;
    }
}
