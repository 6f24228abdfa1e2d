//! Archive entry name sanitization.

use std::ops::RangeInclusive;

/// Unicode Hebrew block. Names sent by the upload form are frequently Hebrew.
const HEBREW_BLOCK: RangeInclusive<char> = '\u{0590}'..='\u{05FF}';

/// Replacement for every character outside the allowed set.
const REPLACEMENT: char = '_';

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || HEBREW_BLOCK.contains(&c) || matches!(c, ' ' | '.' | '_' | '-')
}

/// Make an arbitrary string safe to use as a ZIP entry name.
///
/// Trims surrounding whitespace, replaces every character that is not an ASCII
/// alphanumeric, a Hebrew-block character, space, `.`, `_` or `-` with `_`, and
/// collapses runs of spaces into one. Characters outside the Basic
/// Multilingual Plane are replaced by two underscores, one per UTF-16 unit. An input that is empty after trimming
/// yields an empty string; callers pick a placeholder.
///
/// Path separators are replaced too, so the result can never escape the
/// archive root.
pub fn sanitize_name(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_was_space = false;

    for c in input.trim().chars() {
        if !is_allowed(c) {
            // One replacement per UTF-16 code unit, so astral characters
            // (emoji and the like) become two.
            for _ in 0..c.len_utf16() {
                sanitized.push(REPLACEMENT);
            }
            previous_was_space = false;
            continue;
        }
        if c == ' ' {
            if previous_was_space {
                continue;
            }
            previous_was_space = true;
        } else {
            previous_was_space = false;
        }
        sanitized.push(c);
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "photo.jpg",
        "  padded name.png  ",
        "x?y",
        "../../etc/passwd",
        "C:\\Users\\me\\pic.jpeg",
        "a    b\t\tc",
        "תמונה 1.jpg",
        "שלום  עולם",
        "emoji 😀 name.png",
        "tab\tinside",
        "\u{00A0}nbsp\u{00A0}",
        "mixed -_. chars",
        "名前.png",
        " _ ",
        "a \u{3000} b",
    ];

    #[test]
    fn test_keeps_allowed_characters() {
        assert_eq!(sanitize_name("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_name("my-file_v2.final.png"), "my-file_v2.final.png");
        assert_eq!(sanitize_name("תמונה 1.jpg"), "תמונה 1.jpg");
    }

    #[test]
    fn test_replaces_disallowed_characters() {
        assert_eq!(sanitize_name("x?y"), "x_y");
        assert_eq!(sanitize_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_name("a:b*c\"d"), "a_b_c_d");
        assert_eq!(sanitize_name("名前.png"), "__.png");
    }

    #[test]
    fn test_astral_characters_take_two_underscores() {
        assert_eq!(sanitize_name("a😀b"), "a__b");
        assert_eq!(sanitize_name("emoji 😀 name.png"), "emoji __ name.png");
        assert_eq!(sanitize_name("𝒳.jpg"), "__.jpg");
    }

    #[test]
    fn test_trims_and_collapses_spaces() {
        assert_eq!(sanitize_name("  padded name.png  "), "padded name.png");
        assert_eq!(sanitize_name("a     b"), "a b");
        // Tabs are not spaces: they become underscores and are not collapsed.
        assert_eq!(sanitize_name("a\t\tb"), "a__b");
    }

    #[test]
    fn test_empty_after_trim() {
        assert_eq!(sanitize_name(""), "");
        assert_eq!(sanitize_name(" \t\n "), "");
    }

    #[test]
    fn test_idempotent() {
        for sample in SAMPLES {
            let once = sanitize_name(sample);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_output_character_classes() {
        for sample in SAMPLES {
            let out = sanitize_name(sample);
            assert!(out.chars().all(is_allowed), "{:?} -> {:?}", sample, out);
            assert!(!out.contains("  "), "{:?} -> {:?}", sample, out);
            assert_eq!(out.trim(), out);
        }
    }
}
