//! Contextual placeholders
//!
//! A placeholder is written `{{#name}}` inside a formula and stands for a
//! value supplied only when the formula is evaluated. Whitespace is
//! allowed between the braces and the name: `{{ #num_of_days }}`.
//! Placeholder names are case-sensitive and follow
//! `[A-Za-z_][A-Za-z0-9_]*`.

use lazy_regex::{lazy_regex, Lazy, Regex};
use std::collections::BTreeSet;
use std::ops::Range;

static PLACEHOLDER: Lazy<Regex> = lazy_regex!(r"\{\{\s*#([A-Za-z_][A-Za-z0-9_]*)\s*\}\}");

/// Names of all distinct placeholders referenced by an expression
///
/// # Example
/// ```rust
/// use formulary_formula::extract_contextual_placeholders;
///
/// let names = extract_contextual_placeholders("{{#y}} + {{#x}} + {{ #x }}");
/// assert_eq!(names.into_iter().collect::<Vec<_>>(), ["x", "y"]);
/// ```
pub fn extract_contextual_placeholders(expression: &str) -> BTreeSet<String> {
    placeholder_spans(expression)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Every placeholder occurrence with its byte range, in source order
pub fn placeholder_spans(expression: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    PLACEHOLDER.captures_iter(expression).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some((whole.range(), name.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn names(expression: &str) -> Vec<String> {
        extract_contextual_placeholders(expression).into_iter().collect()
    }

    #[test]
    fn test_extract_deduplicates() {
        assert_eq!(names("{{#y}} + {{#x}} + {{#x}}"), ["x", "y"]);
    }

    #[test]
    fn test_extract_with_whitespace() {
        assert_eq!(
            names("(GROSS / 30) * {{  #num_of_days\t}}"),
            ["num_of_days"]
        );
    }

    #[test]
    fn test_extract_none() {
        assert!(names("GROSS - DEDUCTIONS").is_empty());
        assert!(names("").is_empty());
        // Missing '#', bad name, or single braces are not placeholders
        assert!(names("{{x}} + {#x} + {{#1x}} + {{# x y}}").is_empty());
    }

    #[test]
    fn test_spans() {
        let expr = "A * {{#rate}} + {{ #bonus }}";
        let spans: Vec<_> = placeholder_spans(expr).collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], (4..13, "rate"));
        assert_eq!(&expr[spans[1].0.clone()], "{{ #bonus }}");
        assert_eq!(spans[1].1, "bonus");
    }

    proptest! {
        #[test]
        fn prop_order_and_repetition_do_not_matter(
            mut list in proptest::collection::vec("[a-z_][a-z0-9_]{0,6}", 0..6),
            repeat in 1usize..3,
        ) {
            let forward = list
                .iter()
                .map(|n| format!("{{{{#{n}}}}}"))
                .collect::<Vec<_>>()
                .join(" + ")
                .repeat(repeat);
            list.reverse();
            let backward = list
                .iter()
                .map(|n| format!("{{{{ #{n} }}}}"))
                .collect::<Vec<_>>()
                .join(" * ");

            let expected: BTreeSet<String> = list.iter().cloned().collect();
            prop_assert_eq!(extract_contextual_placeholders(&forward), expected.clone());
            prop_assert_eq!(extract_contextual_placeholders(&backward), expected);
        }
    }
}
