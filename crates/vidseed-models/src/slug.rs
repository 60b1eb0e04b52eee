//! Title sanitization for filesystem path segments.

/// Characters replaced with `_` when a title becomes a directory name.
///
/// Covers path separators plus the shell/URL-special set, so the result is a
/// single safe segment on both POSIX and Windows filesystems.
const REPLACED: &str = " \t\r\n/\\.,:;()[]{}<>?!@#$%^&*+=|~`'\"-";

/// Map a human title to a filesystem-safe, collision-resistant segment.
///
/// Total over any input: control characters are dropped, special characters
/// become `_`, and an empty result degrades to `"_"`. Idempotent:
/// `sanitize_title(sanitize_title(t)) == sanitize_title(t)`.
pub fn sanitize_title(title: &str) -> String {
    let out: String = title
        .chars()
        .filter_map(|c| {
            if REPLACED.contains(c) {
                Some('_')
            } else if c.is_control() {
                None
            } else {
                Some(c)
            }
        })
        .collect();
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_separators_and_specials() {
        assert_eq!(sanitize_title("My Movie: Part 2"), "My_Movie__Part_2");
        assert_eq!(sanitize_title("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_title("what?!"), "what__");
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["Hello World!", "a/b\\c", "", "   ", "plain", "ünïcode ok"];
        for input in inputs {
            let once = sanitize_title(input);
            assert_eq!(sanitize_title(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_no_path_separators_survive() {
        let out = sanitize_title("../../etc/passwd");
        assert!(!out.contains('/'));
        assert!(!out.contains('\\'));
    }

    #[test]
    fn test_empty_title_maps_to_valid_segment() {
        assert_eq!(sanitize_title(""), "_");
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(sanitize_title("a\u{0}b"), "ab");
    }
}
