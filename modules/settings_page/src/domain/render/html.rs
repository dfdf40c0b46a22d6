//! HTML escaping helpers shared by the renderers

/// Escape text for use inside an attribute value
pub fn esc_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for element content
pub fn esc_html(s: &str) -> String {
    esc_attr(s)
}

/// Escape multi-line text for a textarea body
pub fn esc_textarea(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// ` checked='checked'` when the flag is set
pub fn checked(on: bool) -> &'static str {
    if on {
        " checked='checked'"
    } else {
        ""
    }
}

/// ` selected='selected'` when the flag is set
pub fn selected(on: bool) -> &'static str {
    if on {
        " selected='selected'"
    } else {
        ""
    }
}
