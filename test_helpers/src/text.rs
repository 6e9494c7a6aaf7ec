//! Text normalisation for comparing generated source files.

use std::sync::LazyLock;

use regex::Regex;

/// Placeholder substituted for creation timestamps by [`mask_timestamps`].
pub const TIMESTAMP_MASK: &str = "<CREATED>";

static TIMESTAMP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{2}").ok());

/// Replaces every `yyyy-MM-dd HH:mm:ss.ff` stamp with [`TIMESTAMP_MASK`].
#[must_use]
pub fn mask_timestamps(text: &str) -> String {
    TIMESTAMP.as_ref().map_or_else(
        || text.to_owned(),
        |regex| regex.replace_all(text, TIMESTAMP_MASK).into_owned(),
    )
}

/// Converts CRLF line endings to LF.
#[must_use]
pub fn normalise_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}
