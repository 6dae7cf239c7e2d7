//! Sanitization for text that ends up in stored conversations.

use std::sync::LazyLock;

use analyst_core::validation::{validate_text, MAX_CONTENT_CHARS};
use analyst_core::ValidationError;
use regex::Regex;

/// Maximum characters in a stored conversation title.
pub const MAX_TITLE_CHARS: usize = 50;

/// Title used when sanitization leaves nothing behind.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Suffix marking a title cut from a longer message.
const ELLIPSIS: &str = "...";

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script pattern is valid")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Strip `<script>` blocks, HTML tags and stray angle brackets, then trim.
pub fn sanitize_text(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    let without_tags = HTML_TAG.replace_all(&without_scripts, "");
    without_tags
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize a title and cap it at [`MAX_TITLE_CHARS`].
pub fn sanitize_title(raw: &str) -> String {
    let clean = sanitize_text(raw);
    let capped: String = clean.chars().take(MAX_TITLE_CHARS).collect();
    let capped = capped.trim_end();

    if capped.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        capped.to_string()
    }
}

/// Title derived by truncating the first message of a conversation.
///
/// Long messages keep their first characters followed by `...`, never
/// exceeding [`MAX_TITLE_CHARS`].
pub fn title_from_message(message: &str) -> String {
    let clean = sanitize_text(message);
    if clean.chars().count() <= MAX_TITLE_CHARS {
        return sanitize_title(&clean);
    }

    let head: String = clean.chars().take(MAX_TITLE_CHARS - ELLIPSIS.len()).collect();
    let head = head.trim_end();
    if head.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    format!("{}{}", head, ELLIPSIS)
}

/// Validate and sanitize message content for storage.
pub fn prepare_content(content: &str) -> Result<String, ValidationError> {
    validate_text("content", content, MAX_CONTENT_CHARS)?;

    let clean = sanitize_text(content);
    if clean.is_empty() {
        return Err(ValidationError::Empty {
            field: "content".to_string(),
        });
    }

    Ok(clean)
}
