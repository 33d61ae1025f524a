//! Git collaborator
//!
//! Every version-control operation the registry needs goes through
//! [`GitRepository`], so the registry can be exercised without a network
//! and git lookups can be counted in tests.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{Result, RtmError};

const REMOTE: &str = "origin";

/// Version-control operations against a working directory
#[cfg_attr(test, mockall::automock)]
pub trait GitRepository {
    /// Clone `url` into `dest` (which must not exist yet)
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch the latest refs and tags from the origin remote
    fn fetch(&self, dir: &Path) -> Result<()>;

    /// Name of the origin remote's default branch, e.g. `main`
    fn default_branch(&self, dir: &Path) -> Result<String>;

    /// Check out `git_ref`; remote branches are reset to their fetched tip
    fn checkout(&self, dir: &Path, git_ref: &str) -> Result<()>;

    /// Commit id of `HEAD`
    fn head(&self, dir: &Path) -> Result<String>;

    /// URL of the origin remote
    fn remote_url(&self, dir: &Path) -> Result<String>;
}

/// [`GitRepository`] backed by the `git` binary
#[derive(Debug, Clone)]
pub struct Git {
    program: OsString,
}

impl Default for Git {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
        }
    }
}

impl Git {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, dir: Option<&Path>, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args);
        // Never block on a credential prompt
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        tracing::debug!(?dir, ?args, "running git");
        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let command = args.first().copied().unwrap_or_default();
            return Err(RtmError::git(command, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn has_remote_branch(&self, dir: &Path, branch: &str) -> bool {
        let remote_ref = format!("refs/remotes/{REMOTE}/{branch}");
        self.run(Some(dir), &["rev-parse", "--verify", "--quiet", &remote_ref])
            .is_ok()
    }
}

impl GitRepository for Git {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run(None, &["clone", "--quiet", url, &dest])?;
        Ok(())
    }

    fn fetch(&self, dir: &Path) -> Result<()> {
        self.run(
            Some(dir),
            &["fetch", "--quiet", "--prune", "--tags", "--force", REMOTE],
        )?;
        Ok(())
    }

    fn default_branch(&self, dir: &Path) -> Result<String> {
        let origin_head = format!("refs/remotes/{REMOTE}/HEAD");
        let symbolic = match self.run(Some(dir), &["symbolic-ref", "--short", &origin_head]) {
            Ok(name) => name,
            Err(_) => {
                // Clones made by old git versions lack origin/HEAD
                self.run(Some(dir), &["remote", "set-head", REMOTE, "--auto"])?;
                self.run(Some(dir), &["symbolic-ref", "--short", &origin_head])?
            }
        };

        let prefix = format!("{REMOTE}/");
        Ok(symbolic
            .strip_prefix(&prefix)
            .unwrap_or(&symbolic)
            .to_string())
    }

    fn checkout(&self, dir: &Path, git_ref: &str) -> Result<()> {
        if self.has_remote_branch(dir, git_ref) {
            let remote_branch = format!("{REMOTE}/{git_ref}");
            self.run(
                Some(dir),
                &["checkout", "--quiet", "-B", git_ref, &remote_branch],
            )?;
        } else {
            self.run(Some(dir), &["checkout", "--quiet", git_ref])?;
        }
        Ok(())
    }

    fn head(&self, dir: &Path) -> Result<String> {
        self.run(Some(dir), &["rev-parse", "HEAD"])
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        self.run(Some(dir), &["remote", "get-url", REMOTE])
    }
}
