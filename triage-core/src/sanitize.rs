// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text transforms applied while rendering failures.

use std::borrow::Cow;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Appended to text blocks that were cut short.
pub const TEXT_BLOCK_TRUNCATION_MARKER: &str = "\n … too long, truncated.";

/// Appended to summaries that were cut short.
pub const SUMMARY_TRUNCATION_MARKER: &str = "...";

/// Keeps at most `max_chars` characters of `text`, appending `marker` if anything was cut.
///
/// Lengths are counted in `char`s, never splitting a character.
pub fn truncate_with_marker<'a>(text: &'a str, max_chars: usize, marker: &str) -> Cow<'a, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + marker.len());
            truncated.push_str(&text[..cut]);
            truncated.push_str(marker);
            Cow::Owned(truncated)
        }
        None => Cow::Borrowed(text),
    }
}

/// Replaces every character that is not a letter, a decimal digit, or one of `. / - _` with a
/// space.
///
/// Letters are the Unicode `L*` general categories and digits are `Nd`. Superscripts, fractions
/// and roman numerals are numeric but not decimal digits, so they are replaced.
///
/// The result has as many characters as the input, in the same order, so it can be embedded
/// verbatim in a tracker's quoted phrase search.
pub fn sanitize_summary(text: &str) -> String {
    text.chars()
        .map(|c| if is_summary_char(c) { c } else { ' ' })
        .collect()
}

fn is_summary_char(c: char) -> bool {
    matches!(c, '.' | '/' | '-' | '_')
        || matches!(
            get_general_category(c),
            GeneralCategory::UppercaseLetter
                | GeneralCategory::LowercaseLetter
                | GeneralCategory::TitlecaseLetter
                | GeneralCategory::ModifierLetter
                | GeneralCategory::OtherLetter
                | GeneralCategory::DecimalNumber
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert_eq;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test_case("pkg / Foo FAILED", "pkg / Foo FAILED" ; "already clean")]
    #[test_case(
        "DefaultPoliciesTest / Verify policy Apache Struts: CVE-2017-5638 is triggered FAILED",
        "DefaultPoliciesTest / Verify policy Apache Struts  CVE-2017-5638 is triggered FAILED"
        ; "colon"
    )]
    #[test_case("a\"b'c\\d", "a b c d" ; "quotes")]
    #[test_case("Fixable CVSS >= 7", "Fixable CVSS    7" ; "runs are not collapsed")]
    #[test_case("naïve_テスト-1.0", "naïve_テスト-1.0" ; "unicode letters")]
    #[test_case("x² ½ Ⅷ", "x     " ; "non-decimal numerics")]
    #[test_case("٣ ७", "٣ ७" ; "non-ascii decimal digits")]
    #[test_case("a\u{0301}b", "a b" ; "combining mark")]
    fn sanitize(input: &str, expected: &str) {
        assert_eq!(sanitize_summary(input), expected);
    }

    #[test_case("short", 10, "short" ; "under limit")]
    #[test_case("exact", 5, "exact" ; "at limit")]
    #[test_case("toolong", 4, "tool..." ; "over limit")]
    #[test_case("ééééé", 2, "éé..." ; "multibyte")]
    #[test_case("", 0, "" ; "empty")]
    #[test_case("a", 0, "..." ; "zero limit")]
    fn truncate(input: &str, max_chars: usize, expected: &str) {
        assert_eq!(
            truncate_with_marker(input, max_chars, SUMMARY_TRUNCATION_MARKER),
            expected
        );
    }

    #[proptest]
    fn sanitize_is_idempotent(input: String) {
        let once = sanitize_summary(&input);
        prop_assert_eq!(sanitize_summary(&once), once);
    }

    #[proptest]
    fn sanitize_preserves_char_count(input: String) {
        prop_assert_eq!(sanitize_summary(&input).chars().count(), input.chars().count());
    }

    #[proptest]
    fn truncate_boundary(input: String, #[strategy(0usize..64)] max_chars: usize) {
        let truncated = truncate_with_marker(&input, max_chars, TEXT_BLOCK_TRUNCATION_MARKER);
        if input.chars().count() <= max_chars {
            prop_assert_eq!(truncated.as_ref(), input.as_str());
        } else {
            let expected: String = input
                .chars()
                .take(max_chars)
                .chain(TEXT_BLOCK_TRUNCATION_MARKER.chars())
                .collect();
            prop_assert_eq!(truncated.as_ref(), expected.as_str());
        }
    }
}
