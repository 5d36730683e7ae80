//! Type declaration generation from the profile catalog

use crate::error::{BundleError, Result};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// `type ProfileName = ...;` bound to `string`, `never`, or a union of single-quoted literals
static PROFILE_NAME_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"type\s+ProfileName\s*=\s*(?:string|never|'(?:[^'\\]|\\.)*'(?:\s*\|\s*'(?:[^'\\]|\\.)*')*)\s*;",
    )
    .expect("profile name placeholder pattern is valid")
});

/// TypeScript type spelling every name as a literal alternative
pub fn profile_name_union(names: &[String]) -> String {
    if names.is_empty() {
        return "never".to_string();
    }
    names
        .iter()
        .map(|name| format!("'{}'", escape_single_quoted(name)))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn escape_single_quoted(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace the `ProfileName` placeholder in `template` with the union of `names`
pub fn render_declarations(template: &str, names: &[String]) -> Result<String> {
    if !PROFILE_NAME_PLACEHOLDER.is_match(template) {
        return Err(BundleError::PlaceholderNotFound);
    }

    let declaration = format!("type ProfileName = {};", profile_name_union(names));
    Ok(PROFILE_NAME_PLACEHOLDER
        .replace(template, NoExpand(&declaration))
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "declare const quiet: Quiet;\n\n// Common\n\ntype ProfileName = string;\n\ntype Profile = ProfileName | Record<string, any>;\n";

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_union_in_catalog_order() {
        let out = render_declarations(TEMPLATE, &names(&["robust", "ultrasonic"])).unwrap();
        assert!(out.contains("type ProfileName = 'robust' | 'ultrasonic';"));
        assert!(!out.contains("type ProfileName = string;"));
        assert!(out.contains("type Profile = ProfileName | Record<string, any>;"));
    }

    #[test]
    fn test_rest_of_template_untouched() {
        let out = render_declarations(TEMPLATE, &names(&["audible"])).unwrap();
        assert_eq!(
            out,
            TEMPLATE.replace("type ProfileName = string;", "type ProfileName = 'audible';")
        );
    }

    #[test]
    fn test_regenerates_from_previous_output() {
        let first =
            render_declarations(TEMPLATE, &names(&["audible-7k-channel-0", "robust"])).unwrap();
        let second = render_declarations(&first, &names(&["cable-64k"])).unwrap();
        assert!(second.contains("type ProfileName = 'cable-64k';"));
        assert!(!second.contains("robust"));
    }

    #[test]
    fn test_empty_catalog_renders_never() {
        let out = render_declarations(TEMPLATE, &[]).unwrap();
        assert!(out.contains("type ProfileName = never;"));
        assert!(render_declarations(&out, &names(&["robust"])).is_ok());
    }

    #[test]
    fn test_names_are_escaped() {
        assert_eq!(
            profile_name_union(&names(&["it's", r"back\slash"])),
            r"'it\'s' | 'back\\slash'"
        );
    }

    #[test]
    fn test_line_terminators_are_escaped() {
        assert_eq!(
            profile_name_union(&names(&["a\nb", "c\rd", "e\u{2028}f\u{2029}g"])),
            r"'a\nb' | 'c\rd' | 'e\u2028f\u2029g'"
        );
    }

    #[test]
    fn test_escaped_names_can_be_regenerated() {
        let first = render_declarations(TEMPLATE, &names(&["two\nlines", "it's"])).unwrap();
        assert!(first.contains(r"type ProfileName = 'two\nlines' | 'it\'s';"));
        let second = render_declarations(&first, &names(&["robust"])).unwrap();
        assert!(second.contains("type ProfileName = 'robust';"));
    }

    #[test]
    fn test_dollar_in_name_is_literal() {
        let out = render_declarations(TEMPLATE, &names(&["$1 profile"])).unwrap();
        assert!(out.contains("type ProfileName = '$1 profile';"));
    }

    #[test]
    fn test_missing_placeholder() {
        let err = render_declarations("type Profile = string;", &names(&["robust"])).unwrap_err();
        assert!(matches!(err, BundleError::PlaceholderNotFound));
    }

    #[test]
    fn test_only_first_placeholder_replaced() {
        let template = "type ProfileName = string;\ntype ProfileName = string;";
        let out = render_declarations(template, &names(&["a"])).unwrap();
        assert_eq!(out, "type ProfileName = 'a';\ntype ProfileName = string;");
    }
}
