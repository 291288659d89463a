/// Longest player name kept after sanitization.
pub const MAX_NAME_LEN: usize = 11;

/// Trims control characters and spaces from both ends of `raw`, replaces
/// anything outside `[A-Za-z0-9 ]` with a space and keeps at most
/// [`MAX_NAME_LEN`] characters.
///
/// The length bound is taken from the trimmed input, before replacement.
pub fn sanitize_player_name(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c <= ' ');
    let bound = trimmed.chars().count().min(MAX_NAME_LEN);

    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' { c } else { ' ' })
        .take(bound)
        .collect()
}

/// A sanitized name is usable when it has at least one non-space character.
pub fn is_usable_name(sanitized: &str) -> bool {
    !sanitized.trim().is_empty()
}
