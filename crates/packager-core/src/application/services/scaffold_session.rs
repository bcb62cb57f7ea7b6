//! Scaffold Session - main application orchestrator.
//!
//! This service drives the whole workflow:
//! 1. Collect inputs (defaults from the committed record)
//! 2. Confirm the revision exists upstream
//! 3. Hash the source archive
//! 4. Discover the vendor hash (staged write + provoked build)
//! 5. Confirm with the operator
//! 6. Commit atomically, then run one verification build
//!
//! Every failure before step 6 leaves the record file byte-identical to its
//! pre-session contents. A failed verification is the one exception: the
//! record stays committed so the build can be retried on its own.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{BuildRunner, ConfigStore, Operator, Progress, Prompt, RefProbe, SourceHasher},
        services::dependency_hash::DependencyHashResolver,
    },
    domain::{
        Answers, ConfigRecord, DomainError, Field, Forge, PromptDefaults, SessionInputs,
        TEMPLATE_PACKAGE_NAME, accept_answer,
    },
    error::{PackagerError, PackagerResult},
};

/// Session states, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    CollectingInputs,
    ValidatingRef,
    Hashing,
    ResolvingDependencyHash,
    AwaitingConfirmation,
    Committing,
    Verifying,
    Committed,
    AbortedByUser,
    AbortedByError,
}

impl SessionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CollectingInputs => "collecting-inputs",
            Self::ValidatingRef => "validating-ref",
            Self::Hashing => "hashing",
            Self::ResolvingDependencyHash => "resolving-dependency-hash",
            Self::AwaitingConfirmation => "awaiting-confirmation",
            Self::Committing => "committing",
            Self::Verifying => "verifying",
            Self::Committed => "committed",
            Self::AbortedByUser => "aborted-by-user",
            Self::AbortedByError => "aborted-by-error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a session that did not error ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Committed and verified.
    Committed(ConfigRecord),
    /// The operator declined at the confirmation gate; nothing was written.
    AbortedByUser,
}

/// Knobs that are not ports.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub forge: Forge,
    /// Record name that marks the untouched template.
    pub template_name: String,
    /// Treat the confirmation gate as answered "yes".
    pub assume_yes: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            forge: Forge::default(),
            template_name: TEMPLATE_PACKAGE_NAME.to_string(),
            assume_yes: false,
        }
    }
}

/// Main scaffolding session.
pub struct ScaffoldSession {
    probe: Box<dyn RefProbe>,
    hasher: Box<dyn SourceHasher>,
    builder: Box<dyn BuildRunner>,
    store: Box<dyn ConfigStore>,
    settings: SessionSettings,
}

impl ScaffoldSession {
    pub fn new(
        probe: Box<dyn RefProbe>,
        hasher: Box<dyn SourceHasher>,
        builder: Box<dyn BuildRunner>,
        store: Box<dyn ConfigStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            probe,
            hasher,
            builder,
            store,
            settings,
        }
    }

    /// The committed record, if any (template records read as `None`).
    pub fn current(&self) -> PackagerResult<Option<ConfigRecord>> {
        self.store.load(&self.settings.template_name)
    }

    /// Run one full session.
    ///
    /// `Err` is the `AbortedByError` terminal state; the error's
    /// [`file_state`](PackagerError::file_state) says what was left on disk.
    #[instrument(skip_all, fields(record = %self.store.path().display()))]
    pub fn run(&self, operator: &dyn Operator) -> PackagerResult<SessionOutcome> {
        let mut state = SessionState::Start;
        let result = self.drive(operator, &mut state);

        match &result {
            Ok(SessionOutcome::Committed(record)) => {
                enter(&mut state, SessionState::Committed);
                info!(package = %record.name, "Session committed");
            }
            Ok(SessionOutcome::AbortedByUser) => {
                enter(&mut state, SessionState::AbortedByUser);
                info!("Session cancelled at confirmation");
            }
            Err(e) => {
                info!(failed_in = %state, error = %e, "Session aborted");
                enter(&mut state, SessionState::AbortedByError);
            }
        }

        result
    }

    /// Re-run the verification build against the committed record.
    #[instrument(skip_all, fields(record = %self.store.path().display()))]
    pub fn verify(&self, operator: &dyn Operator) -> PackagerResult<ConfigRecord> {
        let record = self
            .current()?
            .ok_or_else(|| ApplicationError::NotConfigured {
                path: self.store.path().to_path_buf(),
            })?;
        self.verify_record(&record, operator)?;
        Ok(record)
    }

    // -------------------------------------------------------------------------
    // Stages
    // -------------------------------------------------------------------------

    fn drive(
        &self,
        operator: &dyn Operator,
        state: &mut SessionState,
    ) -> PackagerResult<SessionOutcome> {
        let prior = self.current()?;
        if let Some(prior) = &prior {
            operator.progress(Progress::Resuming { name: &prior.name });
        }

        // 1. Inputs
        enter(state, SessionState::CollectingInputs);
        let inputs = self.collect_inputs(prior.as_ref(), operator)?;
        let source = &inputs.source;

        // 2. Revision exists
        enter(state, SessionState::ValidatingRef);
        operator.progress(Progress::ValidatingRef { source });
        if !self.probe.ref_exists(source) {
            return Err(ApplicationError::UnresolvableReference {
                owner: source.locator.owner().to_string(),
                repo: source.locator.repo().to_string(),
                git_ref: source.git_ref.clone(),
                url: self.settings.forge.archive_url(source),
            }
            .into());
        }
        operator.progress(Progress::RefConfirmed { source });

        // 3. Source hash
        enter(state, SessionState::Hashing);
        let url = self.settings.forge.archive_url(source);
        operator.progress(Progress::FetchingSource { url: &url });
        let source_hash = self.hasher.hash(source)?;
        operator.progress(Progress::SourceHashed { hash: &source_hash });

        let candidate =
            ConfigRecord::candidate(&inputs.name, &inputs.description, source, source_hash);

        // 4. Vendor hash. From here on the store holds a staged write.
        enter(state, SessionState::ResolvingDependencyHash);
        operator.progress(Progress::ResolvingDependencies {
            attribute: candidate.attribute(),
        });
        let resolver = DependencyHashResolver::new(self.store.as_ref(), self.builder.as_ref());
        let resolved = resolver
            .resolve(&candidate)
            .map_err(|e| self.rollback(e))?;
        let candidate = candidate.with_dependency_hash(resolved.hash());
        operator.progress(Progress::DependencyHashResolved {
            hash: &candidate.dependency_hash,
            empty_closure: resolved.is_empty_closure(),
        });
        self.report_drift(prior.as_ref(), &candidate, operator);

        // 5. Confirmation
        enter(state, SessionState::AwaitingConfirmation);
        let confirmed = if self.settings.assume_yes {
            debug!("Confirmation skipped (assume yes)");
            true
        } else {
            operator
                .confirm(&candidate)
                .map_err(|e| self.rollback(e))?
        };
        if !confirmed {
            self.store.discard_staged().map_err(|e| self.restore_failed(e))?;
            return Ok(SessionOutcome::AbortedByUser);
        }

        // 6. Commit + verify
        enter(state, SessionState::Committing);
        candidate
            .validate_for_commit()
            .map_err(|e| self.rollback(e.into()))?;
        self.store
            .commit(&candidate)
            .map_err(|e| self.rollback(e))?;
        operator.progress(Progress::Committed {
            path: self.store.path(),
        });

        enter(state, SessionState::Verifying);
        self.verify_record(&candidate, operator)?;

        Ok(SessionOutcome::Committed(candidate))
    }

    fn collect_inputs(
        &self,
        prior: Option<&ConfigRecord>,
        operator: &dyn Operator,
    ) -> PackagerResult<SessionInputs> {
        let forge = &self.settings.forge;
        let defaults = PromptDefaults::from_prior(prior, forge);

        let mut answers = Answers::default();
        for field in Field::ALL {
            let answer = self.ask_until_valid(operator, field, &defaults)?;
            match field {
                Field::Name => answers.name = answer,
                Field::Description => answers.description = answer,
                Field::Locator => answers.locator = answer,
                Field::Ref => answers.git_ref = answer,
            }
        }

        Ok(SessionInputs::resolve(prior, &answers, forge)?)
    }

    /// Re-prompts until the answer is acceptable; never aborts on bad input.
    fn ask_until_valid(
        &self,
        operator: &dyn Operator,
        field: Field,
        defaults: &PromptDefaults,
    ) -> PackagerResult<String> {
        let default = defaults.get(field);
        loop {
            let raw = operator.ask(Prompt { field, default })?;
            let checked = accept_answer(field, &raw, default).and_then(|answer| {
                if field == Field::Locator {
                    self.settings.forge.parse_locator(&answer)?;
                }
                Ok::<_, DomainError>(answer)
            });
            match checked {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    debug!(%field, error = %e, "Answer rejected");
                    operator.reject(field, &e.to_string());
                }
            }
        }
    }

    fn report_drift(
        &self,
        prior: Option<&ConfigRecord>,
        candidate: &ConfigRecord,
        operator: &dyn Operator,
    ) {
        let Some(prior) = prior else { return };
        if !prior.same_revision(candidate) || prior.dependency_hash.is_placeholder() {
            return;
        }
        if prior.dependency_hash != candidate.dependency_hash {
            warn!(
                previous = %prior.dependency_hash,
                current = %candidate.dependency_hash,
                "Vendor hash changed for an unchanged revision"
            );
            operator.progress(Progress::DependencyHashDrift {
                previous: &prior.dependency_hash,
                current: &candidate.dependency_hash,
            });
        }
    }

    fn verify_record(&self, record: &ConfigRecord, operator: &dyn Operator) -> PackagerResult<()> {
        let attribute = record.attribute();
        operator.progress(Progress::Verifying { attribute });

        let failed = |reason: String| -> PackagerError {
            ApplicationError::VerificationFailed {
                attribute: attribute.to_string(),
                path: self.store.path().to_path_buf(),
                reason,
            }
            .into()
        };

        let report = self
            .builder
            .build(attribute, true)
            .map_err(|e| failed(e.to_string()))?;
        if !report.succeeded {
            return Err(failed("build exited with a failure status".into()));
        }

        operator.progress(Progress::Verified { attribute });
        info!(%attribute, "Verification build succeeded");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Rollback
    // -------------------------------------------------------------------------

    /// Discard the staged write, keeping `err` as the reported cause unless
    /// the restore itself fails.
    fn rollback(&self, err: PackagerError) -> PackagerError {
        match self.store.discard_staged() {
            Ok(()) => {
                debug!("Staged write discarded");
                rolled_back(err)
            }
            Err(restore) => {
                warn!(error = %restore, cause = %err, "Rollback failed");
                self.restore_failed(restore)
            }
        }
    }

    fn restore_failed(&self, err: PackagerError) -> PackagerError {
        ApplicationError::RestoreFailed {
            path: self.store.path().to_path_buf(),
            reason: err.to_string(),
        }
        .into()
    }
}

/// A failed write whose pre-session contents were restored leaves the
/// file untouched.
fn rolled_back(err: PackagerError) -> PackagerError {
    match err {
        PackagerError::Application(ApplicationError::StoreWrite { path, reason, .. }) => {
            ApplicationError::StoreWrite {
                path,
                reason,
                rolled_back: true,
            }
            .into()
        }
        other => other,
    }
}

fn enter(state: &mut SessionState, next: SessionState) {
    debug!(from = %state, to = %next, "Session transition");
    *state = next;
}
