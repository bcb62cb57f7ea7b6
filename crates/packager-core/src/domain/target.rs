//! Kinds of package the scaffolder knows how to describe.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// A packaging target.
///
/// Only Go modules are supported; their vendor hash is what the provoked
/// build discovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Go,
}

impl TargetKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "go" => Ok(Self::Go),
            other => Err(DomainError::UnsupportedTargetKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_parses() {
        assert_eq!("go".parse::<TargetKind>().unwrap(), TargetKind::Go);
    }

    #[test]
    fn anything_else_is_unsupported() {
        for kind in ["rust", "Go", "golang", ""] {
            assert!(matches!(
                kind.parse::<TargetKind>(),
                Err(DomainError::UnsupportedTargetKind { .. })
            ));
        }
    }
}
