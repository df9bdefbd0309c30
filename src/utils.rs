// src/utils.rs

/// Vendor ids are short opaque tokens; anything else is refused before it
/// reaches a URL path.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Shorten a secret for display, keeping a recognizable prefix.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if token.chars().count() <= 6 {
        "*".repeat(token.chars().count())
    } else {
        format!("{}…", visible)
    }
}
