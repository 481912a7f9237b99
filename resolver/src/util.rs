//! Token helpers shared by the resolver's classification rules.

/// Returns `true` if `token` is a negative number such as `-1`, `-.5` or
/// `-2.5e3`.
///
/// Only tokens whose second character is a digit or `.` qualify, so words
/// like `-inf` or `-NaN` stay option-shaped.
pub fn is_negative_number(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('-') else {
        return false;
    };
    rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') && token.parse::<f64>().is_ok()
}

/// Removes one pair of surrounding double quotes when the value has no other
/// quote inside.
pub fn strip_quotes(value: &str) -> &str {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) if !inner.contains('"') => inner,
        _ => value,
    }
}

/// Returns `true` for the default values that switch a flag on.
pub fn is_truthy(value: &str) -> bool {
    ["yes", "true", "1"]
        .iter()
        .any(|word| value.eq_ignore_ascii_case(word))
}

/// Splits a non-empty string into its first char and the remainder.
pub fn split_first_char(text: &str) -> Option<(char, &str)> {
    let mut chars = text.chars();
    let first = chars.next()?;
    Some((first, chars.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_negative_number() {
        for token in ["-1", "-0.5", "-.5", "-2.5e3", "-10"] {
            assert!(is_negative_number(token), "{token} should be a number");
        }
        for token in ["-a", "-inf", "-NaN", "-", "1", "-1x", "--1"] {
            assert!(!is_negative_number(token), "{token} should not be a number");
        }
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"hello world\""), "hello world");
        assert_eq!(strip_quotes("\"\""), "");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes("\"a\"b\""), "\"a\"b\"");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("YES"));
        assert!(is_truthy("true"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("on"));
        assert!(!is_truthy("false"));
    }
}
