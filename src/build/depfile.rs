//! Dependency listing parser
//!
//! Compiling with `-MMD -MP` leaves a Makefile fragment next to each object:
//!
//! ```text
//! build/vm/eval.o: src/vm/eval.c src/vm/eval.h src/os/io.h
//!
//! src/vm/eval.h:
//!
//! src/os/io.h:
//! ```
//!
//! `-MP` adds one empty rule per header. Those rules are the only lines
//! that end in `<header-ext>:`, so they name exactly the headers the unit
//! depends on.

use std::path::PathBuf;

/// Headers named by a dependency listing, in file order
pub fn parse_headers(listing: &str, header_ext: &str) -> Vec<PathBuf> {
    let marker = format!("{}:", header_ext);

    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.ends_with(&marker))
        .map(|line| PathBuf::from(unescape(&line[..line.len() - 1])))
        .collect()
}

/// Undo Make escaping of spaces, `#` and `$`
fn unescape(raw: &str) -> String {
    raw.replace("\\ ", " ")
        .replace("\\#", "#")
        .replace("$$", "$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phony_header_rules() {
        let listing = "build/vm/eval.o: src/vm/eval.c src/vm/eval.h \\\n  src/os/io.h\n\nsrc/vm/eval.h:\n\nsrc/os/io.h:\n";
        assert_eq!(
            parse_headers(listing, ".h"),
            vec![PathBuf::from("src/vm/eval.h"), PathBuf::from("src/os/io.h")]
        );
    }

    #[test]
    fn test_target_line_is_not_a_header() {
        assert!(parse_headers("build/a.o: src/a.c\n", ".h").is_empty());
        // a target line whose last prerequisite is a header still ends in ".h"
        assert!(parse_headers("build/a.o: src/a.c src/a.h\n", ".h").is_empty());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let listing = "   src/a.h:   \r\n\tsrc/b.h:\n";
        assert_eq!(
            parse_headers(listing, ".h"),
            vec![PathBuf::from("src/a.h"), PathBuf::from("src/b.h")]
        );
    }

    #[test]
    fn test_other_header_extension() {
        let listing = "build/a.o: src/a.cc src/a.hh\n\nsrc/a.hh:\n\nsrc/legacy.h:\n";
        assert_eq!(
            parse_headers(listing, ".hh"),
            vec![PathBuf::from("src/a.hh")]
        );
    }

    #[test]
    fn test_absolute_and_escaped_paths() {
        let listing = "/usr/include/stdio.h:\nsrc/my\\ dir/x.h:\nsrc/$$var.h:\n";
        assert_eq!(
            parse_headers(listing, ".h"),
            vec![
                PathBuf::from("/usr/include/stdio.h"),
                PathBuf::from("src/my dir/x.h"),
                PathBuf::from("src/$var.h"),
            ]
        );
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_headers("", ".h").is_empty());
        assert!(parse_headers("\n\n", ".h").is_empty());
    }
}
