//! Classification of a hash-discovery build.
//!
//! Nix cannot report a vendor hash directly. It only prints the correct
//! value when it refuses a build that declares a wrong one:
//!
//! ```text
//! error: hash mismatch in fixed-output derivation '/nix/store/...-go-modules.drv':
//!          specified: sha256-AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=
//!             got:    sha256-pQpattmS9VmO3ZIQUFn66az8GSmB4IvYhTTCFn6SUmo=
//! ```
//!
//! The exit code alone cannot tell that refusal apart from a real failure,
//! so the diagnostic text is classified here.

use crate::domain::hash::ContentHash;

/// Marker preceding the hash Nix actually computed.
pub const HASH_MISMATCH_MARKER: &str = "got:";

/// Maximum number of characters of build output surfaced to the operator.
pub const DIAGNOSTIC_EXCERPT_LIMIT: usize = 2000;

/// Outcome of a build run with the placeholder dependency hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDiagnosis {
    /// The build refused the placeholder and reported the real hash.
    HashMismatch { got: ContentHash },
    /// The build succeeded with the placeholder: nothing to vendor.
    EmptyClosure,
    /// The build failed for some other reason.
    Failed { excerpt: String },
}

impl BuildDiagnosis {
    pub fn classify(diagnostics: &str, succeeded: bool) -> Self {
        if let Some(got) = find_reported_hash(diagnostics) {
            return Self::HashMismatch { got };
        }
        if succeeded {
            Self::EmptyClosure
        } else {
            Self::Failed {
                excerpt: excerpt(diagnostics, DIAGNOSTIC_EXCERPT_LIMIT),
            }
        }
    }
}

/// First `got: <hash>` line whose hash parses.
pub fn find_reported_hash(diagnostics: &str) -> Option<ContentHash> {
    diagnostics
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(HASH_MISMATCH_MARKER))
        .filter_map(|line| line.split_whitespace().last())
        .find_map(|token| ContentHash::parse(token).ok())
}

/// Tail of `text`, at most `limit` characters.
///
/// The end of a build log is where Nix prints the failing derivation, so the
/// tail is kept rather than the head.
pub fn excerpt(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOT: &str = "sha256-pQpattmS9VmO3ZIQUFn66az8GSmB4IvYhTTCFn6SUmo=";

    fn mismatch_log() -> String {
        format!(
            "building '/nix/store/abc-auth-go-modules.drv'...\n\
             error: hash mismatch in fixed-output derivation '/nix/store/abc-auth-go-modules.drv':\n\
             \x20        specified: sha256-AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=\n\
             \x20           got:    {GOT}\n\
             error: 1 dependencies of derivation '/nix/store/def-auth.drv' failed to build\n"
        )
    }

    #[test]
    fn mismatch_with_failed_exit_yields_hash() {
        let diagnosis = BuildDiagnosis::classify(&mismatch_log(), false);
        assert_eq!(
            diagnosis,
            BuildDiagnosis::HashMismatch {
                got: ContentHash::parse(GOT).unwrap()
            }
        );
    }

    #[test]
    fn no_marker_and_failure_keeps_diagnostic() {
        let log = "error: builder for '/nix/store/x.drv' failed with exit code 1\n\
                   go: module example.com/missing: not found\n";
        match BuildDiagnosis::classify(log, false) {
            BuildDiagnosis::Failed { excerpt } => assert_eq!(excerpt, log),
            other => panic!("unexpected diagnosis: {other:?}"),
        }
    }

    #[test]
    fn no_marker_and_success_is_empty_closure() {
        assert_eq!(
            BuildDiagnosis::classify("", true),
            BuildDiagnosis::EmptyClosure
        );
    }

    #[test]
    fn marker_without_valid_hash_is_ignored() {
        let log = "got: nothing useful\n";
        assert!(matches!(
            BuildDiagnosis::classify(log, false),
            BuildDiagnosis::Failed { .. }
        ));
    }

    #[test]
    fn marker_must_start_the_line() {
        let log = format!("note: we got: {GOT}\n");
        assert!(find_reported_hash(&log).is_none());
    }

    #[test]
    fn long_failure_is_truncated_to_tail() {
        let log = format!("{}TAIL", "x".repeat(5000));
        match BuildDiagnosis::classify(&log, false) {
            BuildDiagnosis::Failed { excerpt } => {
                assert_eq!(excerpt.chars().count(), DIAGNOSTIC_EXCERPT_LIMIT);
                assert!(excerpt.ends_with("TAIL"));
            }
            other => panic!("unexpected diagnosis: {other:?}"),
        }
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(excerpt(&text, 3), "ééé");
    }
}
