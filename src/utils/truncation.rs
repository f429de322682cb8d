const MAX_ERROR_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 120;

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
/// Counts characters, not bytes, so multi-byte text never splits mid-char.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub fn truncate_error(error: &str) -> String {
    truncate_chars(error, MAX_ERROR_LENGTH)
}

/// Card-sized description preview.
pub fn truncate_description(description: &str) -> String {
    truncate_chars(description, MAX_DESCRIPTION_LENGTH)
}
