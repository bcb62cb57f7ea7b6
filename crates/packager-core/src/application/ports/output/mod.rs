//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the session needs from the outside world. The
//! `packager-adapters` crate provides implementations; the CLI provides the
//! [`Operator`].

use std::path::Path;

use crate::domain::{ConfigRecord, ContentHash, Field, SourceRef};
use crate::error::PackagerResult;

/// Port for the metadata-only existence check of a revision.
///
/// Implemented by:
/// - `packager_adapters::probe::HttpRefProbe` (HEAD against the archive URL)
#[cfg_attr(test, mockall::automock)]
pub trait RefProbe: Send + Sync {
    /// `true` only for a `200 OK` or `302 Found` response. Transport
    /// errors and timeouts are reported as `false`.
    fn ref_exists(&self, source: &SourceRef) -> bool;
}

/// Port for computing the content hash of an unpacked source archive.
///
/// Implemented by:
/// - `packager_adapters::nix::NixSourceHasher` (nix-prefetch-url + nix hash convert)
#[cfg_attr(test, mockall::automock)]
pub trait SourceHasher: Send + Sync {
    fn hash(&self, source: &SourceRef) -> PackagerResult<ContentHash>;
}

/// Captured result of one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub succeeded: bool,
    /// Full diagnostic stream (stderr, then stdout).
    pub diagnostics: String,
}

/// Port for invoking the downstream build of a package attribute.
///
/// Implemented by:
/// - `packager_adapters::nix::NixBuildRunner` (`nix build .#<attr> --no-link`)
///
/// `Err` is reserved for failing to run the build at all (spawn error,
/// timeout). A build that ran and failed is an `Ok` report with
/// `succeeded == false`.
#[cfg_attr(test, mockall::automock)]
pub trait BuildRunner: Send + Sync {
    /// `echo` forwards the build output to the operator as it arrives.
    fn build(&self, attribute: &str, echo: bool) -> PackagerResult<BuildReport>;
}

/// Port for the persisted record file.
///
/// Implemented by:
/// - `packager_adapters::store::JsonConfigStore` (production)
/// - `packager_adapters::store::MemoryConfigStore` (testing)
///
/// ## Write discipline
///
/// - [`stage`](Self::stage) is the working write the discovery build reads.
///   The first stage of a session remembers the exact pre-session contents.
/// - [`discard_staged`](Self::discard_staged) restores those contents
///   byte-for-byte (or removes the file if there was none).
/// - [`commit`](Self::commit) replaces the file atomically and forgets the
///   remembered contents.
pub trait ConfigStore: Send + Sync {
    /// Location of the record, for messages.
    fn path(&self) -> &Path;

    /// The record as stored, template or not. `None` if there is no file.
    fn read(&self) -> PackagerResult<Option<ConfigRecord>>;

    fn stage(&self, record: &ConfigRecord) -> PackagerResult<()>;

    /// No-op when nothing is staged.
    fn discard_staged(&self) -> PackagerResult<()>;

    fn commit(&self, record: &ConfigRecord) -> PackagerResult<()>;

    /// The record usable as prompt defaults: `None` when absent or still the
    /// shipped template.
    fn load(&self, template_name: &str) -> PackagerResult<Option<ConfigRecord>> {
        Ok(self
            .read()?
            .filter(|record| !record.is_template(template_name)))
    }
}

/// A question put to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt<'a> {
    pub field: Field,
    pub default: Option<&'a str>,
}

/// Stage-boundary notifications for the operator.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// A committed record was found and its values are offered as defaults.
    Resuming { name: &'a str },
    ValidatingRef { source: &'a SourceRef },
    RefConfirmed { source: &'a SourceRef },
    FetchingSource { url: &'a str },
    SourceHashed { hash: &'a ContentHash },
    ResolvingDependencies { attribute: &'a str },
    DependencyHashResolved { hash: &'a ContentHash, empty_closure: bool },
    /// Same revision as the committed record, different vendor hash.
    DependencyHashDrift {
        previous: &'a ContentHash,
        current: &'a ContentHash,
    },
    Committed { path: &'a Path },
    Verifying { attribute: &'a str },
    Verified { attribute: &'a str },
}

/// Port for the human driving the session.
///
/// Implemented by the CLI (`TerminalOperator`) and by scripted fakes in
/// tests.
pub trait Operator {
    /// Ask one question. Blank means "take the default".
    fn ask(&self, prompt: Prompt<'_>) -> PackagerResult<String>;

    /// Tell the operator why the last answer was refused.
    fn reject(&self, field: Field, reason: &str);

    /// Show the full candidate and ask whether to apply it.
    fn confirm(&self, candidate: &ConfigRecord) -> PackagerResult<bool>;

    fn progress(&self, event: Progress<'_>);
}
