//! End-to-end sessions against a real record file.
//!
//! The probe and operator are scripted; the hasher and builder are either
//! scripted or real adapters pointed at fake `nix` shell scripts.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::sync::Mutex;

use packager_adapters::JsonConfigStore;
use packager_core::prelude::*;
use tempfile::TempDir;

const SRC: &str = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";
const GOT: &str = "sha256-pQpattmS9VmO3ZIQUFn66az8GSmB4IvYhTTCFn6SUmo=";

struct FixedProbe(bool);

impl RefProbe for FixedProbe {
    fn ref_exists(&self, _source: &SourceRef) -> bool {
        self.0
    }
}

struct FixedHasher;

impl SourceHasher for FixedHasher {
    fn hash(&self, _source: &SourceRef) -> PackagerResult<ContentHash> {
        Ok(ContentHash::parse(SRC).unwrap())
    }
}

/// Reports `GOT` while the record still holds the placeholder, then
/// succeeds. Records what the record file contained at every build.
struct RecordReadingBuilder {
    path: std::path::PathBuf,
    seen: Mutex<Vec<String>>,
    verify_succeeds: bool,
}

impl BuildRunner for RecordReadingBuilder {
    fn build(&self, _attribute: &str, _echo: bool) -> PackagerResult<BuildReport> {
        let text = fs::read_to_string(&self.path).unwrap();
        let placeholder = text.contains(packager_core::domain::PLACEHOLDER_HASH);
        self.seen.lock().unwrap().push(text);
        Ok(if placeholder {
            BuildReport {
                succeeded: false,
                diagnostics: format!("error: hash mismatch\n         got:    {GOT}\n"),
            }
        } else {
            BuildReport {
                succeeded: self.verify_succeeds,
                diagnostics: String::new(),
            }
        })
    }
}

struct Script {
    answers: RefCell<VecDeque<String>>,
    confirm: bool,
}

impl Script {
    fn new(answers: &[&str], confirm: bool) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|s| s.to_string()).collect()),
            confirm,
        }
    }
}

impl Operator for Script {
    fn ask(&self, _prompt: Prompt<'_>) -> PackagerResult<String> {
        Ok(self.answers.borrow_mut().pop_front().unwrap_or_default())
    }
    fn reject(&self, field: Field, reason: &str) {
        panic!("unexpected rejection of {field}: {reason}");
    }
    fn confirm(&self, _candidate: &ConfigRecord) -> PackagerResult<bool> {
        Ok(self.confirm)
    }
    fn progress(&self, _event: Progress<'_>) {}
}

struct Fixture {
    _dir: TempDir,
    path: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".package-config.json");
        Self { _dir: dir, path }
    }

    fn with_template(self) -> Self {
        fs::write(
            &self.path,
            "{\n  \"name\": \"my-go-service\",\n  \"description\": \"\",\n  \"owner\": \"\",\n  \"repo\": \"\",\n  \"ref\": \"\",\n  \"sha256\": \"\",\n  \"vendorHash\": \"\"\n}\n",
        )
        .unwrap();
        self
    }

    fn session(&self, probe: bool, verify_succeeds: bool) -> ScaffoldSession {
        ScaffoldSession::new(
            Box::new(FixedProbe(probe)),
            Box::new(FixedHasher),
            Box::new(RecordReadingBuilder {
                path: self.path.clone(),
                seen: Mutex::new(Vec::new()),
                verify_succeeds,
            }),
            Box::new(JsonConfigStore::new(&self.path)),
            SessionSettings::default(),
        )
    }

    fn bytes(&self) -> Vec<u8> {
        fs::read(&self.path).unwrap()
    }
}

const ANSWERS: [&str; 4] = ["widget", "Widget server", "https://github.com/acme/widget.git", "v1.2.3"];

#[test]
fn scenario_commits_discovered_hashes() {
    let fx = Fixture::new().with_template();

    let outcome = fx.session(true, true).run(&Script::new(&ANSWERS, true)).unwrap();

    let SessionOutcome::Committed(record) = outcome else {
        panic!("expected commit");
    };
    let on_disk = ConfigRecord::from_json(&fs::read_to_string(&fx.path).unwrap()).unwrap();
    assert_eq!(on_disk, record);
    assert_eq!(on_disk.owner, "acme");
    assert_eq!(on_disk.repo_name, "widget");
    assert_eq!(on_disk.git_ref, "v1.2.3");
    assert_eq!(on_disk.source_hash.as_str(), SRC);
    assert_eq!(on_disk.dependency_hash.as_str(), GOT);
}

#[test]
fn identical_sessions_write_identical_bytes() {
    let fx = Fixture::new();
    fx.session(true, true).run(&Script::new(&ANSWERS, true)).unwrap();
    let first = fx.bytes();

    // Second run takes every default.
    fx.session(true, true).run(&Script::new(&["", "", "", ""], true)).unwrap();

    assert_eq!(fx.bytes(), first);
}

#[test]
fn declining_leaves_file_byte_identical() {
    let fx = Fixture::new().with_template();
    let before = fx.bytes();

    let outcome = fx.session(true, true).run(&Script::new(&ANSWERS, false)).unwrap();

    assert_eq!(outcome, SessionOutcome::AbortedByUser);
    assert_eq!(fx.bytes(), before);
}

#[test]
fn declining_without_prior_file_leaves_no_file() {
    let fx = Fixture::new();
    fx.session(true, true).run(&Script::new(&ANSWERS, false)).unwrap();
    assert!(!fx.path.exists());
}

#[test]
fn unresolvable_ref_touches_nothing() {
    let fx = Fixture::new().with_template();
    let before = fx.bytes();

    let err = fx.session(false, true).run(&Script::new(&ANSWERS, true)).unwrap_err();

    assert_eq!(err.file_state(), FileState::Untouched);
    assert!(err.to_string().contains("acme/widget"));
    assert_eq!(fx.bytes(), before);
}

#[test]
fn malformed_record_file_is_left_untouched() {
    let fx = Fixture::new();
    fs::write(&fx.path, "{ \"name\": \"widget\",").unwrap();

    let err = fx.session(true, true).run(&Script::new(&ANSWERS, true)).unwrap_err();

    assert_eq!(err.file_state(), FileState::Untouched);
    assert!(err.to_string().contains("failed to read record"));
    assert_eq!(fx.bytes(), b"{ \"name\": \"widget\",");
}

#[test]
fn failed_verification_keeps_committed_record() {
    let fx = Fixture::new().with_template();

    let err = fx.session(true, false).run(&Script::new(&ANSWERS, true)).unwrap_err();

    assert_eq!(err.file_state(), FileState::SavedUnverified);
    let on_disk = ConfigRecord::from_json(&fs::read_to_string(&fx.path).unwrap()).unwrap();
    assert_eq!(on_disk.dependency_hash.as_str(), GOT);
}

#[test]
fn verify_reruns_build_on_committed_record() {
    let fx = Fixture::new();
    fx.session(true, true).run(&Script::new(&ANSWERS, true)).unwrap();

    let record = fx.session(true, true).verify(&Script::new(&[], true)).unwrap();
    assert_eq!(record.name, "widget");
}

#[cfg(unix)]
mod nix_scripts {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use packager_adapters::{NixBuildRunner, NixSourceHasher};

    use super::*;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A fake `nix` that refuses the placeholder, then builds.
    fn fake_nix(dir: &Path, record: &Path) -> PathBuf {
        script(
            dir,
            "nix",
            &format!(
                r#"case "$1" in
  hash) echo "{SRC}" ;;
  build)
    if grep -q AAAAAAAAAAAAAAAA "{record}"; then
      echo "error: hash mismatch in fixed-output derivation" >&2
      echo "         specified: sha256-AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=" >&2
      echo "            got:    {GOT}" >&2
      exit 1
    fi
    echo "built $2" >&2 ;;
esac"#,
                record = record.display()
            ),
        )
    }

    #[test]
    fn real_adapters_against_fake_toolchain() {
        let fx = Fixture::new().with_template();
        let bin = TempDir::new().unwrap();
        let nix = fake_nix(bin.path(), &fx.path);
        let prefetch = script(
            bin.path(),
            "nix-prefetch-url",
            "echo \"path is '/nix/store/x-source'\"\necho 0v1x6lh8y0w2l8gr6qjhx0a5i2w0p5n0yl6m0r3x8yq5b3z0f1s",
        );
        let nix = nix.to_string_lossy().into_owned();

        let session = ScaffoldSession::new(
            Box::new(FixedProbe(true)),
            Box::new(
                NixSourceHasher::new(Forge::default())
                    .with_programs(prefetch.to_string_lossy(), nix.clone()),
            ),
            Box::new(NixBuildRunner::new().with_program(nix)),
            Box::new(JsonConfigStore::new(&fx.path)),
            SessionSettings::default(),
        );

        let outcome = session.run(&Script::new(&ANSWERS, true)).unwrap();

        let SessionOutcome::Committed(record) = outcome else {
            panic!("expected commit");
        };
        assert_eq!(record.source_hash.as_str(), SRC);
        assert_eq!(record.dependency_hash.as_str(), GOT);
    }

    #[test]
    fn non_hash_build_failure_restores_template() {
        let fx = Fixture::new().with_template();
        let before = fx.bytes();
        let bin = TempDir::new().unwrap();
        let nix = script(
            bin.path(),
            "nix",
            "echo 'go: cannot find module providing package example.com/x' >&2\nexit 1",
        );

        let session = ScaffoldSession::new(
            Box::new(FixedProbe(true)),
            Box::new(FixedHasher),
            Box::new(NixBuildRunner::new().with_program(nix.to_string_lossy())),
            Box::new(JsonConfigStore::new(&fx.path)),
            SessionSettings::default(),
        );

        let err = session.run(&Script::new(&ANSWERS, true)).unwrap_err();

        assert!(err.to_string().contains("cannot find module"));
        assert_eq!(err.file_state(), FileState::Untouched);
        assert_eq!(fx.bytes(), before);
    }
}

mod in_memory {
    use packager_adapters::MemoryConfigStore;

    use super::*;

    struct MismatchThenPass;

    impl BuildRunner for MismatchThenPass {
        fn build(&self, _attribute: &str, echo: bool) -> PackagerResult<BuildReport> {
            Ok(BuildReport {
                succeeded: echo,
                diagnostics: if echo { String::new() } else { format!("got: {GOT}") },
            })
        }
    }

    fn session(store: &MemoryConfigStore) -> ScaffoldSession {
        ScaffoldSession::new(
            Box::new(FixedProbe(true)),
            Box::new(FixedHasher),
            Box::new(MismatchThenPass),
            Box::new(store.clone()),
            SessionSettings::default(),
        )
    }

    #[test]
    fn cancel_restores_hand_written_bytes() {
        let original = b"{\"name\":\"my-go-service\",\"owner\":\"\",\"repo\":\"\",\"ref\":\"\"}".to_vec();
        let store = MemoryConfigStore::with_bytes(original.clone());

        session(&store).run(&Script::new(&ANSWERS, false)).unwrap();

        assert_eq!(store.bytes(), Some(original));
        assert!(!store.is_staged());
        assert_eq!(store.commits(), 0);
    }

    #[test]
    fn commit_happens_exactly_once() {
        let store = MemoryConfigStore::new();
        session(&store).run(&Script::new(&ANSWERS, true)).unwrap();
        assert_eq!(store.commits(), 1);
        assert!(!store.is_staged());
    }
}
