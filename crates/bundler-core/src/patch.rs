//! Locating and replacing function bodies in source text
//!
//! The scan is a plain brace counter: starting at an anchor (usually the
//! function's name), the first `{` opens the body and the `}` that brings the
//! depth back to zero closes it. Braces inside string or comment literals are
//! counted like any other, so anchors must be chosen where the body is free of
//! unbalanced literal braces.

use crate::error::{BundleError, Result};
use std::ops::Range;

/// Byte range of the body of the function following `anchor`.
///
/// The range excludes the enclosing braces.
pub fn function_body_span(code: &str, anchor: &str) -> Result<Range<usize>> {
    let anchor_at = code.find(anchor).ok_or_else(|| BundleError::AnchorNotFound {
        anchor: anchor.to_string(),
    })?;

    let bytes = code.as_bytes();
    let open = bytes[anchor_at..]
        .iter()
        .position(|&b| b == b'{')
        .map(|offset| anchor_at + offset)
        .ok_or_else(|| BundleError::MissingOpeningBrace {
            anchor: anchor.to_string(),
        })?;

    let start = open + 1;
    let mut depth = 1usize;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(start..i);
                }
            }
            _ => {}
        }
    }

    Err(BundleError::UnbalancedBraces {
        anchor: anchor.to_string(),
        depth,
    })
}

/// Replace the body of the function following `anchor` with `replacement`.
///
/// Everything outside the body, including the anchor and the braces, is kept.
pub fn replace_function_body(code: &str, anchor: &str, replacement: &str) -> Result<String> {
    let span = function_body_span(code, anchor)?;
    let mut out = String::with_capacity(code.len() - span.len() + replacement.len());
    out.push_str(&code[..span.start]);
    out.push_str(replacement);
    out.push_str(&code[span.end..]);
    Ok(out)
}
