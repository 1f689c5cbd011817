//! Conservative identifier splitting.
//!
//! Splits identifiers only where the naming convention makes the boundary
//! explicit:
//!
//! - separators: any character that is not alphanumeric (`_`, `$`, `-`, ...)
//! - lower to upper: `parseFile` → `parse`, `File`
//! - end of an acronym: `HTTPServer` → `HTTP`, `Server`
//! - letters to digits and back: `utf8Decode` → `utf`, `8`, `Decode`
//!
//! Concatenating the parts gives the identifier back without its separators.

/// Character class used to find boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Upper,
    Lower,
    Digit,
    Other,
}

impl Class {
    fn of(c: char) -> Self {
        if c.is_uppercase() {
            Self::Upper
        } else if c.is_lowercase() || (c.is_alphabetic() && !c.is_uppercase()) {
            Self::Lower
        } else if c.is_numeric() {
            Self::Digit
        } else {
            Self::Other
        }
    }
}

/// Split `identifier` into its words.
#[must_use]
pub fn split(identifier: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = identifier.char_indices().collect();
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &(offset, c)) in chars.iter().enumerate() {
        let class = Class::of(c);
        if class == Class::Other {
            if let Some(s) = start.take() {
                parts.push(&identifier[s..offset]);
            }
            continue;
        }

        let Some(s) = start else {
            start = Some(offset);
            continue;
        };

        let prev = Class::of(chars[i - 1].1);
        let next = chars.get(i + 1).map(|&(_, c)| Class::of(c));
        let boundary = match (prev, class) {
            (Class::Lower, Class::Upper) => true,
            (Class::Upper, Class::Upper) => next == Some(Class::Lower),
            (Class::Digit, Class::Upper | Class::Lower)
            | (Class::Upper | Class::Lower, Class::Digit) => true,
            _ => false,
        };

        if boundary {
            parts.push(&identifier[s..offset]);
            start = Some(offset);
        }
    }

    if let Some(s) = start {
        parts.push(&identifier[s..]);
    }

    parts
}

/// Split `identifier` and lower-case every word.
#[must_use]
pub fn words(identifier: &str) -> Vec<String> {
    split(identifier).into_iter().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("main", &["main"])]
    #[case("parseFile", &["parse", "File"])]
    #[case("ParseFile", &["Parse", "File"])]
    #[case("HTTPServer", &["HTTP", "Server"])]
    #[case("newHTTPClient", &["new", "HTTP", "Client"])]
    #[case("ID", &["ID"])]
    #[case("userID", &["user", "ID"])]
    #[case("utf8Decode", &["utf", "8", "Decode"])]
    #[case("snake_case_name", &["snake", "case", "name"])]
    #[case("__init__", &["init"])]
    #[case("MAX_SIZE", &["MAX", "SIZE"])]
    #[case("x", &["x"])]
    #[case("$jq", &["jq"])]
    fn splits_on_explicit_boundaries(#[case] identifier: &str, #[case] expected: &[&str]) {
        assert_eq!(split(identifier), expected);
    }

    #[test]
    fn words_are_lower_cased() {
        assert_eq!(words("newHTTPClient"), vec!["new", "http", "client"]);
    }

    proptest! {
        #[test]
        fn parts_rebuild_identifier_without_separators(identifier in "[A-Za-z0-9_$]{0,24}") {
            let joined: String = split(&identifier).concat();
            let expected: String = identifier.chars().filter(|c| c.is_alphanumeric()).collect();
            prop_assert_eq!(joined, expected);
        }

        #[test]
        fn parts_are_never_empty(identifier in "\\PC{0,24}") {
            for part in split(&identifier) {
                prop_assert!(!part.is_empty());
            }
        }
    }
}
