//! Embedding fetched content as JavaScript literals

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Expression that rebuilds `bytes` as a `Uint8Array` when evaluated
pub fn binary_literal(bytes: &[u8]) -> String {
    format!(
        "Uint8Array.from(atob(`{}`), c => c.charCodeAt(0))",
        STANDARD.encode(bytes)
    )
}

/// Template literal whose value is exactly `text`
pub fn template_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('`');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('`');
    out
}
