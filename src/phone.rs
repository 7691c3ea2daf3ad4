//! Phone number normalization and matching
//!
//! Phone numbers arrive in wildly inconsistent conventions: formatting
//! punctuation, present-or-absent country codes, trunk zeros. This module
//! canonicalizes them for the equality and grouping comparisons the
//! pipeline depends on.
//!
//! Matching is deliberately fuzzy. Two numbers whose last 8 digits agree
//! are treated as the same line even when their prefixes differ, which
//! reconciles records captured with and without an area/country code but
//! can mis-join short local numbers that merely share a tail. That
//! tradeoff is a documented policy of this module, not an accident.

/// Canonicalize a phone number for comparison.
///
/// Keeps ASCII digits and a leading `+`; every other character (spaces,
/// parentheses, dashes, letters, stray `+`) is dropped. Blank input yields
/// an empty string. Never fails.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if trimmed.starts_with('+') && !digits.is_empty() {
        format!("+{}", digits)
    } else {
        digits
    }
}

/// Possible alternative renderings of a number, used to raise the hit rate
/// when probing a contact directory that may store numbers in a different
/// convention.
///
/// Returns the normalized form first, then de-prefixed variants: without
/// the leading `+`, without a `+86`/`86` country code, and without a single
/// trunk `0` on numbers longer than ten digits. Duplicates are removed,
/// first derivation wins. Blank input yields no variants.
pub fn variants(raw: &str) -> Vec<String> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![normalized.clone()];
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    if let Some(bare) = normalized.strip_prefix('+') {
        push(bare.to_string());
    }

    if let Some(national) = normalized.strip_prefix("+86") {
        push(national.to_string());
    } else if let Some(national) = normalized.strip_prefix("86") {
        push(national.to_string());
    }

    if normalized.len() > 10 {
        if let Some(without_trunk) = normalized.strip_prefix('0') {
            push(without_trunk.to_string());
        }
    }

    variants
}

/// Whether two raw numbers refer to the same line.
///
/// True when the normalized forms are equal, when one is a proper suffix of
/// the other, or when both carry at least [`TAIL_MATCH_DIGITS`] digits and
/// those trailing digits agree. Blank input never matches anything.
/// Symmetric in its arguments.
pub fn matches(a: &str, b: &str) -> bool {
    let left = normalize(a);
    let right = normalize(b);
    if left.is_empty() || right.is_empty() {
        return false;
    }

    if left == right {
        return true;
    }

    if left.len() > right.len() && left.ends_with(right.as_str()) {
        return true;
    }
    if right.len() > left.len() && right.ends_with(left.as_str()) {
        return true;
    }

    let left_digits = digits_of(&left);
    let right_digits = digits_of(&right);
    if left_digits.len() >= TAIL_MATCH_DIGITS && right_digits.len() >= TAIL_MATCH_DIGITS {
        return left_digits[left_digits.len() - TAIL_MATCH_DIGITS..]
            == right_digits[right_digits.len() - TAIL_MATCH_DIGITS..];
    }

    false
}

/// Trailing digit count compared by the tail-match heuristic
pub const TAIL_MATCH_DIGITS: usize = 8;

fn digits_of(normalized: &str) -> &str {
    normalized.strip_prefix('+').unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize("+1 (555) 123-4567"), "+15551234567");
        assert_eq!(normalize("555.123.4567"), "5551234567");
        assert_eq!(normalize("  010-8765 4321 "), "01087654321");
    }

    #[test]
    fn test_normalize_keeps_only_leading_plus() {
        assert_eq!(normalize("+86+138-0013-8000"), "+8613800138000");
        assert_eq!(normalize("86+1380013+8000"), "8613800138000");
    }

    #[test]
    fn test_normalize_blank_and_junk() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("no digits here"), "");
        assert_eq!(normalize("+"), "");
    }

    #[test]
    fn test_variants_cover_prefix_conventions() {
        assert_eq!(
            variants("+86 138 0013 8000"),
            vec!["+8613800138000", "8613800138000", "13800138000"]
        );
        assert_eq!(variants("86 138 0013 8000"), vec!["8613800138000", "13800138000"]);
        assert_eq!(variants("010-8765-4321"), vec!["01087654321", "1087654321"]);
        assert_eq!(variants("5551234"), vec!["5551234"]);
        assert!(variants("  ").is_empty());
    }

    #[test]
    fn test_matches_exact_and_suffix() {
        assert!(matches("+15551234567", "+1 (555) 123-4567"));
        assert!(matches("15551234567", "5551234567"));
        assert!(matches("5551234567", "15551234567"));
    }

    #[test]
    fn test_matches_tail_heuristic() {
        // Differing prefixes, same trailing 8 digits.
        assert!(matches("+8613800138000", "08613800138000"));
        // Short numbers fall back to exact/suffix rules only.
        assert!(!matches("1234567", "9234567"));
        assert!(!matches("", "5551234567"));
    }

    #[test]
    fn test_matches_is_symmetric() {
        let samples = [
            ("+15551234567", "5551234567"),
            ("5551234", "15551234"),
            ("+8613800138000", "13800138000"),
            ("123", "456"),
            ("", "123"),
        ];
        for (a, b) in samples {
            assert_eq!(matches(a, b), matches(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }
}
