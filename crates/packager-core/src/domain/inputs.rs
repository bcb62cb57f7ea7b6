//! Operator inputs and their defaults.
//!
//! Everything here is a pure function of the prior record and the raw
//! answers, so the prompt logic is testable without a terminal.

use std::fmt;

use crate::domain::{
    error::DomainError,
    locator::{Forge, SourceRef},
    record::ConfigRecord,
};

/// One question asked during input collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    Locator,
    Ref,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Description, Field::Locator, Field::Ref];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Package name",
            Self::Description => "Description",
            Self::Locator => "Repository URL",
            Self::Ref => "Git tag or commit to package",
        }
    }

    pub const fn example(self) -> &'static str {
        match self {
            Self::Name => "auth",
            Self::Description => "Supabase Auth server",
            Self::Locator => "github.com/supabase/auth",
            Self::Ref => "v2.175.0",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Locator => "repository URL",
            Self::Ref => "ref",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Defaults offered at each prompt, taken from a previously committed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptDefaults {
    pub name: Option<String>,
    pub description: Option<String>,
    pub locator: Option<String>,
    pub git_ref: Option<String>,
}

impl PromptDefaults {
    /// `prior` must already have been filtered for the template sentinel.
    pub fn from_prior(prior: Option<&ConfigRecord>, forge: &Forge) -> Self {
        let Some(prior) = prior else {
            return Self::default();
        };
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        let locator = (!prior.owner.is_empty() && !prior.repo_name.is_empty())
            .then(|| format!("{}/{}/{}", forge.host(), prior.owner, prior.repo_name));

        Self {
            name: non_empty(&prior.name),
            description: non_empty(&prior.description),
            locator,
            git_ref: non_empty(&prior.git_ref),
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Description => self.description.as_deref(),
            Field::Locator => self.locator.as_deref(),
            Field::Ref => self.git_ref.as_deref(),
        }
    }
}

/// Apply the default to one raw answer: blank input takes the default, and
/// a blank answer with no default is rejected.
pub fn accept_answer(field: Field, raw: &str, default: Option<&str>) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return Ok(trimmed.to_string());
    }
    default
        .map(str::to_string)
        .ok_or(DomainError::EmptyField { field: field.key() })
}

/// Raw operator answers, one per [`Field`]. Blank means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    pub name: String,
    pub description: String,
    pub locator: String,
    pub git_ref: String,
}

impl Answers {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Locator => &self.locator,
            Field::Ref => &self.git_ref,
        }
    }
}

/// Validated inputs for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInputs {
    pub name: String,
    pub description: String,
    pub source: SourceRef,
}

impl SessionInputs {
    /// `(prior record, answers) -> inputs`, the whole of input collection
    /// minus the terminal.
    pub fn resolve(
        prior: Option<&ConfigRecord>,
        answers: &Answers,
        forge: &Forge,
    ) -> Result<Self, DomainError> {
        let defaults = PromptDefaults::from_prior(prior, forge);
        let take = |field| accept_answer(field, answers.get(field), defaults.get(field));

        let name = take(Field::Name)?;
        let description = take(Field::Description)?;
        let locator = forge.parse_locator(&take(Field::Locator)?)?;
        let git_ref = take(Field::Ref)?;

        Ok(Self {
            name,
            description,
            source: SourceRef::new(locator, git_ref),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hash::ContentHash;

    fn prior() -> ConfigRecord {
        ConfigRecord {
            name: "auth".into(),
            description: "Supabase Auth server".into(),
            owner: "supabase".into(),
            repo_name: "auth".into(),
            git_ref: "v2.175.0".into(),
            source_hash: ContentHash::placeholder(),
            dependency_hash: ContentHash::placeholder(),
        }
    }

    fn answers(name: &str, description: &str, locator: &str, git_ref: &str) -> Answers {
        Answers {
            name: name.into(),
            description: description.into(),
            locator: locator.into(),
            git_ref: git_ref.into(),
        }
    }

    #[test]
    fn no_prior_means_no_defaults() {
        assert_eq!(
            PromptDefaults::from_prior(None, &Forge::default()),
            PromptDefaults::default()
        );
    }

    #[test]
    fn prior_offers_every_field() {
        let defaults = PromptDefaults::from_prior(Some(&prior()), &Forge::default());
        assert_eq!(defaults.get(Field::Name), Some("auth"));
        assert_eq!(defaults.get(Field::Description), Some("Supabase Auth server"));
        assert_eq!(defaults.get(Field::Locator), Some("github.com/supabase/auth"));
        assert_eq!(defaults.get(Field::Ref), Some("v2.175.0"));
    }

    #[test]
    fn blank_answers_reproduce_prior() {
        let inputs =
            SessionInputs::resolve(Some(&prior()), &Answers::default(), &Forge::default()).unwrap();
        assert_eq!(inputs.name, "auth");
        assert_eq!(inputs.source.locator.owner(), "supabase");
        assert_eq!(inputs.source.git_ref, "v2.175.0");
    }

    #[test]
    fn explicit_answers_override_prior() {
        let inputs = SessionInputs::resolve(
            Some(&prior()),
            &answers("", "", "", "v2.180.0"),
            &Forge::default(),
        )
        .unwrap();
        assert_eq!(inputs.source.git_ref, "v2.180.0");
        assert_eq!(inputs.name, "auth");
    }

    #[test]
    fn blank_without_default_is_rejected() {
        let err = SessionInputs::resolve(None, &answers("", "d", "github.com/a/b", "v1"), &Forge::default())
            .unwrap_err();
        assert_eq!(err, DomainError::EmptyField { field: "name" });
    }

    #[test]
    fn invalid_locator_is_rejected() {
        let err = SessionInputs::resolve(
            None,
            &answers("a", "d", "github.com/only-owner", "v1"),
            &Forge::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidLocator { .. }));
    }

    #[test]
    fn answers_are_trimmed() {
        assert_eq!(
            accept_answer(Field::Ref, "  v1.0.0 \n", None).unwrap(),
            "v1.0.0"
        );
    }
}
