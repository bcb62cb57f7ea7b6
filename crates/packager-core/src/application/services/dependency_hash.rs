//! Vendor hash discovery through a deliberately failing build.
//!
//! 1. Stage the candidate with the placeholder vendor hash
//! 2. Build it, capturing the diagnostic stream
//! 3. Classify the output (see [`BuildDiagnosis`])
//!
//! A hash mismatch is the expected, successful outcome of this stage.

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{BuildRunner, ConfigStore},
    },
    domain::{BuildDiagnosis, ConfigRecord, ContentHash},
    error::PackagerResult,
};

/// A resolved vendor hash and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyHash {
    /// Reported by the build in its `got:` line.
    Reported(ContentHash),
    /// The build accepted the placeholder, so there is nothing to vendor.
    EmptyClosure,
}

impl DependencyHash {
    /// The value to store in `vendorHash`.
    pub fn hash(&self) -> ContentHash {
        match self {
            Self::Reported(hash) => hash.clone(),
            Self::EmptyClosure => ContentHash::placeholder(),
        }
    }

    pub fn is_empty_closure(&self) -> bool {
        matches!(self, Self::EmptyClosure)
    }
}

/// Resolves the vendor hash of a candidate record.
///
/// Leaves the candidate staged in the store on every path; the caller
/// either commits over it or discards it.
pub struct DependencyHashResolver<'a> {
    store: &'a dyn ConfigStore,
    builder: &'a dyn BuildRunner,
}

impl<'a> DependencyHashResolver<'a> {
    pub fn new(store: &'a dyn ConfigStore, builder: &'a dyn BuildRunner) -> Self {
        Self { store, builder }
    }

    #[instrument(skip_all, fields(attribute = %candidate.attribute()))]
    pub fn resolve(&self, candidate: &ConfigRecord) -> PackagerResult<DependencyHash> {
        let staged = candidate
            .clone()
            .with_dependency_hash(ContentHash::placeholder());
        self.store.stage(&staged)?;
        debug!(path = %self.store.path().display(), "Staged candidate with placeholder vendor hash");

        let report = self.builder.build(staged.attribute(), false)?;

        match BuildDiagnosis::classify(&report.diagnostics, report.succeeded) {
            BuildDiagnosis::HashMismatch { got } => {
                info!(vendor_hash = %got, "Build reported the vendor hash");
                Ok(DependencyHash::Reported(got))
            }
            BuildDiagnosis::EmptyClosure => {
                info!("Build accepted the placeholder vendor hash; dependency closure is empty");
                Ok(DependencyHash::EmptyClosure)
            }
            BuildDiagnosis::Failed { excerpt } => {
                info!(succeeded = report.succeeded, "Build failed without a hash mismatch");
                Err(ApplicationError::DependencyBuildFailed {
                    attribute: staged.attribute().to_string(),
                    excerpt,
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::application::ports::{BuildReport, MockBuildRunner};
    use crate::domain::{Forge, SourceRef};
    use crate::error::PackagerError;

    const SRC: &str = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";
    const GOT: &str = "sha256-pQpattmS9VmO3ZIQUFn66az8GSmB4IvYhTTCFn6SUmo=";

    #[derive(Default)]
    struct StagingStore {
        staged: Mutex<Vec<ConfigRecord>>,
    }

    impl ConfigStore for StagingStore {
        fn path(&self) -> &Path {
            Path::new("staging.json")
        }
        fn read(&self) -> PackagerResult<Option<ConfigRecord>> {
            Ok(None)
        }
        fn stage(&self, record: &ConfigRecord) -> PackagerResult<()> {
            self.staged.lock().unwrap().push(record.clone());
            Ok(())
        }
        fn discard_staged(&self) -> PackagerResult<()> {
            Ok(())
        }
        fn commit(&self, _record: &ConfigRecord) -> PackagerResult<()> {
            unreachable!("resolver never commits")
        }
    }

    fn candidate() -> ConfigRecord {
        let loc = Forge::default().parse_locator("github.com/acme/widget").unwrap();
        ConfigRecord::candidate(
            "widget",
            "",
            &SourceRef::new(loc, "v1.2.3"),
            ContentHash::parse(SRC).unwrap(),
        )
        .with_dependency_hash(ContentHash::parse(GOT).unwrap())
    }

    fn builder(succeeded: bool, diagnostics: &str) -> MockBuildRunner {
        let diagnostics = diagnostics.to_string();
        let mut mock = MockBuildRunner::new();
        mock.expect_build()
            .withf(|attribute, echo| attribute == "widget" && !*echo)
            .times(1)
            .returning(move |_, _| {
                Ok(BuildReport {
                    succeeded,
                    diagnostics: diagnostics.clone(),
                })
            });
        mock
    }

    #[test]
    fn stages_candidate_with_placeholder() {
        let store = StagingStore::default();
        let builder = builder(false, &format!("   got:    {GOT}\n"));
        DependencyHashResolver::new(&store, &builder)
            .resolve(&candidate())
            .unwrap();

        let staged = store.staged.lock().unwrap();
        assert_eq!(staged.len(), 1);
        assert!(staged[0].dependency_hash.is_placeholder());
        assert_eq!(staged[0].source_hash.as_str(), SRC);
    }

    #[test]
    fn mismatch_is_the_resolved_value() {
        let store = StagingStore::default();
        let builder = builder(false, &format!("error: hash mismatch\n   got:    {GOT}\n"));
        let resolved = DependencyHashResolver::new(&store, &builder)
            .resolve(&candidate())
            .unwrap();
        assert_eq!(resolved, DependencyHash::Reported(ContentHash::parse(GOT).unwrap()));
    }

    #[test]
    fn successful_build_means_empty_closure() {
        let store = StagingStore::default();
        let builder = builder(true, "");
        let resolved = DependencyHashResolver::new(&store, &builder)
            .resolve(&candidate())
            .unwrap();
        assert!(resolved.is_empty_closure());
        assert!(resolved.hash().is_placeholder());
    }

    #[test]
    fn other_failure_carries_diagnostic() {
        let store = StagingStore::default();
        let builder = builder(false, "go: cannot find module providing package foo\n");
        let err = DependencyHashResolver::new(&store, &builder)
            .resolve(&candidate())
            .unwrap_err();
        match err {
            PackagerError::Application(ApplicationError::DependencyBuildFailed {
                attribute,
                excerpt,
            }) => {
                assert_eq!(attribute, "widget");
                assert!(excerpt.contains("cannot find module"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn build_that_cannot_run_propagates() {
        let store = StagingStore::default();
        let mut builder = MockBuildRunner::new();
        builder.expect_build().returning(|_, _| {
            Err(ApplicationError::ProcessFailed {
                program: "nix".into(),
                reason: "not found".into(),
            }
            .into())
        });
        let err = DependencyHashResolver::new(&store, &builder)
            .resolve(&candidate())
            .unwrap_err();
        assert!(matches!(
            err,
            PackagerError::Application(ApplicationError::ProcessFailed { .. })
        ));
    }
}
