//! HTML output escaping.

/// Escapes text content.
pub fn esc_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes an attribute value. Same rules as text content.
pub fn esc_attr(value: &str) -> String {
    esc_html(value)
}

/// Escapes a URL for an `href`; anything but http(s), root-relative or
/// query-only URLs becomes empty.
pub fn esc_url(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || trimmed.starts_with('/')
        || trimmed.starts_with('?');
    if !allowed || trimmed.chars().any(char::is_control) {
        return String::new();
    }
    esc_attr(&trimmed.replace(' ', "%20"))
}
