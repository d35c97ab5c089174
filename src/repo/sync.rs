use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::{Result, SkellyError};
use crate::repo::cache::{IdGenerator, RepoCache};
use crate::repo::git::{classify_git_error, GitRunner, GitStep, StepOutput, SystemGit};
use crate::repo::manifest::ManifestStore;

/// What to do when a git step exits non-zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// Init, fetch and reset failures abort the sync. A failed submodule
    /// update only warns, since the checked-out tree is still current.
    #[default]
    Strict,
    /// Log the failure, skip the rest of that chain, and hand back whatever
    /// the working copy holds.
    BestEffort,
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: GitStep,
    pub output: StepOutput,
}

/// Result of a sync: where the working copy lives and what ran.
#[derive(Debug)]
pub struct SyncOutcome {
    pub path: PathBuf,
    /// True if the working copy was (re)initialized or its `origin`
    /// repaired during this sync.
    pub initialized: bool,
    pub steps: Vec<StepReport>,
}

impl SyncOutcome {
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|r| !r.output.success)
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Keeps cached working copies reset to their remote's default branch.
pub struct SyncEngine<R = SystemGit> {
    runner: R,
    policy: SyncPolicy,
    default_branch: Option<String>,
}

impl Default for SyncEngine {
    fn default() -> Self {
        SyncEngine::new(SystemGit)
    }
}

impl<R: GitRunner> SyncEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            policy: SyncPolicy::default(),
            default_branch: None,
        }
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reset to `origin/<branch>` instead of asking the remote for its default.
    pub fn with_default_branch(mut self, branch: Option<String>) -> Self {
        self.default_branch = branch;
        self
    }

    /// Ensure a working copy for `url` exists and matches the remote.
    pub fn sync<S, G>(&self, cache: &mut RepoCache<S, G>, url: &str) -> Result<SyncOutcome>
    where
        S: ManifestStore,
        G: IdGenerator,
    {
        let path = cache.ensure_slot(url)?;
        let mut steps = Vec::new();

        let repair = self.repair_chain(&path, url)?;
        let initialized = !repair.is_empty();
        if initialized {
            info!("Initializing working copy for {url} at {}", path.display());
            std::fs::create_dir_all(&path).map_err(|e| SkellyError::Io {
                context: format!("creating working copy {}", path.display()),
                source: e,
            })?;
            self.run_chain(&path, url, &repair, &mut steps)?;
        }

        info!("Syncing {url}");
        self.run_chain(&path, url, &self.sync_chain(), &mut steps)?;

        Ok(SyncOutcome {
            path,
            initialized,
            steps,
        })
    }

    /// Steps needed before the slot can be fetched: empty when it already
    /// is a repository whose `origin` is `url`.
    ///
    /// Covers a deleted slot as well as an init that stopped before
    /// `remote add`.
    fn repair_chain(&self, path: &Path, url: &str) -> Result<Vec<GitStep>> {
        let add_origin = GitStep::AddOrigin {
            url: url.to_string(),
        };
        if !path.join(".git").exists() {
            return Ok(vec![GitStep::Init, add_origin]);
        }

        let origin = self.runner.run(path, &GitStep::GetOrigin)?;
        if !origin.success {
            debug!("No origin remote in {}", path.display());
            // Re-running `git init` on an existing repository is harmless.
            return Ok(vec![GitStep::Init, add_origin]);
        }
        if origin.stdout != url {
            debug!("origin of {} is {}, expected {url}", path.display(), origin.stdout);
            return Ok(vec![GitStep::SetOrigin {
                url: url.to_string(),
            }]);
        }
        Ok(Vec::new())
    }

    fn sync_chain(&self) -> Vec<GitStep> {
        let mut chain = vec![GitStep::Fetch];
        let target = match &self.default_branch {
            Some(branch) => format!("origin/{branch}"),
            None => {
                chain.push(GitStep::SetHead);
                "origin/HEAD".to_string()
            }
        };
        chain.push(GitStep::Reset { target });
        chain.push(GitStep::UpdateSubmodules);
        chain
    }

    /// Run `chain` in order. Stops at the first failure; whether that
    /// failure is an error depends on the policy.
    fn run_chain(
        &self,
        dir: &Path,
        url: &str,
        chain: &[GitStep],
        reports: &mut Vec<StepReport>,
    ) -> Result<()> {
        for step in chain {
            let output = self.runner.run(dir, step)?;
            let success = output.success;
            let reason = classify_git_error(&output.stderr);
            reports.push(StepReport {
                step: step.clone(),
                output,
            });

            if success {
                continue;
            }

            match self.policy {
                SyncPolicy::Strict if !is_tolerated(step) => {
                    return Err(SkellyError::SyncFailed {
                        step: step.to_string(),
                        url: url.to_string(),
                        reason,
                    });
                }
                _ => {
                    warn!("`git {step}` failed for {url}: {reason}");
                    debug!("Skipping the remaining steps of this chain");
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

fn is_tolerated(step: &GitStep) -> bool {
    matches!(step, GitStep::UpdateSubmodules)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::repo::manifest::MemoryManifestStore;

    /// Records every step and fails the ones it was told to. Tracks the
    /// `origin` remote so `GetOrigin` answers like git does.
    struct FakeGit {
        calls: RefCell<Vec<GitStep>>,
        failing: Vec<GitStep>,
        origin: RefCell<Option<String>>,
    }

    impl FakeGit {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                failing: Vec::new(),
                origin: RefCell::new(None),
            }
        }

        fn with_origin(self, url: &str) -> Self {
            *self.origin.borrow_mut() = Some(url.to_string());
            self
        }

        fn failing(mut self, step: GitStep) -> Self {
            self.failing.push(step);
            self
        }

        fn calls(&self) -> Vec<GitStep> {
            self.calls.borrow().clone()
        }
    }

    impl GitRunner for &FakeGit {
        fn run(&self, dir: &Path, step: &GitStep) -> Result<StepOutput> {
            self.calls.borrow_mut().push(step.clone());
            if self.failing.contains(step) {
                return Ok(StepOutput::failed("fatal: simulated failure"));
            }
            match step {
                GitStep::Init => std::fs::create_dir_all(dir.join(".git")).unwrap(),
                GitStep::AddOrigin { url } | GitStep::SetOrigin { url } => {
                    *self.origin.borrow_mut() = Some(url.clone());
                }
                GitStep::GetOrigin => {
                    return Ok(match self.origin.borrow().as_deref() {
                        Some(url) => StepOutput {
                            stdout: url.to_string(),
                            ..StepOutput::ok()
                        },
                        None => StepOutput::failed("error: No such remote 'origin'"),
                    });
                }
                _ => {}
            }
            Ok(StepOutput::ok())
        }
    }

    const URL: &str = "https://github.com/foo/bar";

    fn cache(root: &Path) -> RepoCache<MemoryManifestStore, impl FnMut() -> String> {
        RepoCache::with_store(root, MemoryManifestStore::new(), || "slot".to_string())
    }

    fn reset_head() -> GitStep {
        GitStep::Reset {
            target: "origin/HEAD".to_string(),
        }
    }

    fn add_origin() -> GitStep {
        GitStep::AddOrigin {
            url: URL.to_string(),
        }
    }

    #[test]
    fn fresh_slot_is_initialized_then_synced() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new();
        let engine = SyncEngine::new(&git);

        let outcome = engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert_eq!(outcome.path, dir.path().join("slot"));
        assert!(outcome.path.is_dir());
        assert!(outcome.initialized);
        assert!(outcome.is_clean());
        assert_eq!(
            git.calls(),
            vec![
                GitStep::Init,
                add_origin(),
                GitStep::Fetch,
                GitStep::SetHead,
                reset_head(),
                GitStep::UpdateSubmodules,
            ]
        );
    }

    #[test]
    fn existing_working_copy_only_syncs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("slot/.git")).unwrap();
        let git = FakeGit::new().with_origin(URL);
        let engine = SyncEngine::new(&git);

        let outcome = engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert!(!outcome.initialized);
        assert_eq!(
            git.calls(),
            vec![
                GitStep::GetOrigin,
                GitStep::Fetch,
                GitStep::SetHead,
                reset_head(),
                GitStep::UpdateSubmodules,
            ]
        );
    }

    #[test]
    fn repository_without_origin_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("slot/.git")).unwrap();
        let git = FakeGit::new();
        let engine = SyncEngine::new(&git);

        let outcome = engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert!(outcome.initialized);
        assert!(outcome.is_clean());
        assert_eq!(
            &git.calls()[..4],
            &[GitStep::GetOrigin, GitStep::Init, add_origin(), GitStep::Fetch]
        );
    }

    #[test]
    fn origin_pointing_elsewhere_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("slot/.git")).unwrap();
        let git = FakeGit::new().with_origin("https://github.com/someone/else");
        let engine = SyncEngine::new(&git);

        let outcome = engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert!(outcome.initialized);
        assert_eq!(
            &git.calls()[..3],
            &[
                GitStep::GetOrigin,
                GitStep::SetOrigin {
                    url: URL.to_string()
                },
                GitStep::Fetch,
            ]
        );
        assert_eq!(git.origin.borrow().as_deref(), Some(URL));
    }

    #[test]
    fn failed_add_origin_is_retried_on_next_sync() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = cache(dir.path());

        let broken = FakeGit::new().failing(add_origin());
        let err = SyncEngine::new(&broken).sync(&mut cache, URL).unwrap_err();
        assert!(matches!(err, SkellyError::SyncFailed { .. }));
        // `git init` went through, so the slot now has a `.git` directory.
        assert!(dir.path().join("slot/.git").is_dir());

        let git = FakeGit::new();
        let outcome = SyncEngine::new(&git).sync(&mut cache, URL).unwrap();

        assert!(outcome.initialized);
        assert!(outcome.is_clean());
        assert!(git.calls().contains(&add_origin()));
        assert_eq!(git.origin.borrow().as_deref(), Some(URL));
    }

    #[test]
    fn deleted_directory_is_healed() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new();
        let engine = SyncEngine::new(&git);
        let mut cache = cache(dir.path());

        let first = engine.sync(&mut cache, URL).unwrap();
        std::fs::remove_dir_all(&first.path).unwrap();
        let second = engine.sync(&mut cache, URL).unwrap();

        assert_eq!(first.path, second.path);
        assert!(second.initialized);
        assert!(second.path.is_dir());
    }

    #[test]
    fn configured_branch_skips_set_head() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("slot/.git")).unwrap();
        let git = FakeGit::new().with_origin(URL);
        let engine = SyncEngine::new(&git).with_default_branch(Some("main".to_string()));

        engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                GitStep::GetOrigin,
                GitStep::Fetch,
                GitStep::Reset {
                    target: "origin/main".to_string()
                },
                GitStep::UpdateSubmodules,
            ]
        );
    }

    #[test]
    fn strict_fetch_failure_is_fatal_and_never_resets() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new().failing(GitStep::Fetch);
        let engine = SyncEngine::new(&git);

        let err = engine.sync(&mut cache(dir.path()), URL).unwrap_err();

        match err {
            SkellyError::SyncFailed { step, url, .. } => {
                assert_eq!(step, "fetch origin");
                assert_eq!(url, URL);
            }
            other => panic!("expected SyncFailed, got: {other:?}"),
        }
        assert!(!git.calls().contains(&reset_head()));
    }

    #[test]
    fn strict_tolerates_submodule_failure() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new().failing(GitStep::UpdateSubmodules);
        let engine = SyncEngine::new(&git);

        let outcome = engine.sync(&mut cache(dir.path()), URL).unwrap();

        let failed: Vec<_> = outcome.failures().map(|r| r.step.clone()).collect();
        assert_eq!(failed, vec![GitStep::UpdateSubmodules]);
    }

    #[test]
    fn best_effort_returns_path_after_failed_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new().failing(GitStep::Fetch);
        let engine = SyncEngine::new(&git).with_policy(SyncPolicy::BestEffort);

        let outcome = engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert_eq!(outcome.path, dir.path().join("slot"));
        assert!(!outcome.is_clean());
        // `&&` semantics: nothing after the failed fetch runs.
        assert_eq!(git.calls().last(), Some(&GitStep::Fetch));
    }

    #[test]
    fn best_effort_still_syncs_after_failed_init_chain() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new().failing(add_origin());
        let engine = SyncEngine::new(&git).with_policy(SyncPolicy::BestEffort);

        engine.sync(&mut cache(dir.path()), URL).unwrap();

        assert!(git.calls().contains(&GitStep::Fetch));
    }

    #[test]
    fn strict_init_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let git = FakeGit::new().failing(add_origin());
        let engine = SyncEngine::new(&git);

        let err = engine.sync(&mut cache(dir.path()), URL).unwrap_err();
        assert!(matches!(err, SkellyError::SyncFailed { .. }));
        assert!(!git.calls().contains(&GitStep::Fetch));
    }

    #[test]
    fn policy_parses_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: SyncPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "best-effort""#).unwrap();
        assert_eq!(w.policy, SyncPolicy::BestEffort);
    }
}
