//! Lenient string parsing used by configuration readers.
//!
//! Each parser takes a fallback so malformed input degrades to a default
//! instead of an error.

use std::str::FromStr;

/// Parses `true`/`1`/`on` and `false`/`0`/`off`, ignoring case and
/// surrounding whitespace.
pub fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => true,
        "false" | "0" | "off" => false,
        _ => default,
    }
}

pub fn parse_or<T: FromStr>(value: &str, default: T) -> T {
    value.trim().parse().unwrap_or(default)
}

/// Parses `"x, y"` into a pair, falling back to `default` when either half is
/// missing or malformed.
pub fn parse_pair<T: FromStr + Copy>(value: &str, default: (T, T)) -> (T, T) {
    let Some((x, y)) = value.split_once(',') else {
        return default;
    };
    match (x.trim().parse(), y.trim().parse()) {
        (Ok(x), Ok(y)) => (x, y),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        for text in ["true", "TRUE", " 1 ", "On"] {
            assert!(parse_bool(text, false), "{text}");
        }
        for text in ["false", "0", "OFF"] {
            assert!(!parse_bool(text, true), "{text}");
        }
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("", false));
    }

    #[test]
    fn numbers_fall_back() {
        assert_eq!(parse_or(" 42 ", 0u32), 42);
        assert_eq!(parse_or("-1", 7u32), 7);
        assert_eq!(parse_or("2.5", 0.0f32), 2.5);
    }

    #[test]
    fn pairs() {
        assert_eq!(parse_pair("3, 4", (0.0f32, 0.0)), (3.0, 4.0));
        assert_eq!(parse_pair("3", (1, 1)), (1, 1));
        assert_eq!(parse_pair("a,4", (1, 1)), (1, 1));
    }
}
