use std::fmt;
use std::path::Path;
use std::process::Command;

use log::{debug, trace};

use crate::error::{Result, SkellyError};

/// One external git operation needed to keep a working copy in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitStep {
    Init,
    AddOrigin { url: String },
    /// Print the configured `origin` URL, before any `insteadOf` rewriting.
    /// Exits non-zero when there is no `origin`.
    GetOrigin,
    SetOrigin { url: String },
    Fetch,
    /// Record the remote's default branch as `origin/HEAD`.
    SetHead,
    Reset { target: String },
    UpdateSubmodules,
}

impl GitStep {
    /// Arguments passed to `git`. Never joined into a shell string.
    pub fn args(&self) -> Vec<&str> {
        match self {
            GitStep::Init => vec!["init"],
            GitStep::AddOrigin { url } => vec!["remote", "add", "origin", url.as_str()],
            GitStep::GetOrigin => vec!["config", "--get", "remote.origin.url"],
            GitStep::SetOrigin { url } => vec!["remote", "set-url", "origin", url.as_str()],
            GitStep::Fetch => vec!["fetch", "origin"],
            GitStep::SetHead => vec!["remote", "set-head", "origin", "--auto"],
            GitStep::Reset { target } => vec!["reset", "--hard", target.as_str()],
            GitStep::UpdateSubmodules => {
                vec!["submodule", "update", "--init", "--recursive", "--remote"]
            }
        }
    }
}

impl fmt::Display for GitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

/// Captured result of running one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes git steps inside a working copy.
pub trait GitRunner {
    /// Run `step` with `dir` as the working directory.
    ///
    /// A non-zero exit is reported through [`StepOutput::success`], not as
    /// an `Err`; `Err` is reserved for failing to run git at all.
    fn run(&self, dir: &Path, step: &GitStep) -> Result<StepOutput>;
}

/// Runs the system `git` binary, inheriting the user's credential setup
/// (SSH agent, credential helpers) but never prompting on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, step: &GitStep) -> Result<StepOutput> {
        debug!("Running `git {step}` in {}", dir.display());

        let output = Command::new("git")
            .env("GIT_TERMINAL_PROMPT", "0")
            .args(step.args())
            .current_dir(dir)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SkellyError::GitNotFound,
                _ => SkellyError::Io {
                    context: format!("running git {step}"),
                    source: e,
                },
            })?;

        let result = StepOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };
        trace!("git {step} stdout: {}", result.stdout);
        trace!("git {step} stderr: {}", result.stderr);
        Ok(result)
    }
}

/// Turn git stderr into a message with an actionable suggestion for the
/// common failure modes.
pub fn classify_git_error(stderr: &str) -> String {
    if stderr.contains("Authentication failed") || stderr.contains("could not read Username") {
        format!("authentication failed, configure git credentials or set up SSH keys\n\ngit output:\n{stderr}")
    } else if stderr.contains("No such remote")
        || stderr.contains("'origin' does not appear to be a git repository")
    {
        format!("the cached working copy has no `origin` remote, it is repaired on the next sync\n\ngit output:\n{stderr}")
    } else if stderr.contains("Repository not found")
        || (stderr.contains("not found") && stderr.contains("repository"))
        || stderr.contains("does not appear to be a git repository")
    {
        format!("repository not found, check the URL; if private, ensure git credentials are configured\n\ngit output:\n{stderr}")
    } else if stderr.contains("Host key verification failed") {
        format!("SSH host key verification failed, try: ssh-keyscan github.com >> ~/.ssh/known_hosts\n\ngit output:\n{stderr}")
    } else if stderr.contains("Could not resolve host") || stderr.contains("Connection refused") {
        format!("network error, check your connection and the repository URL\n\ngit output:\n{stderr}")
    } else {
        stderr.to_string()
    }
}
