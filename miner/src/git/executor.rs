//! Git command execution wrapper.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::log::{parse_log_output, CommitInfo, LOG_FORMAT};
use crate::error::{MinerError, Result};

/// Runs git commands against one repository.
#[derive(Debug, Clone)]
pub struct GitExecutor {
    repo_path: PathBuf,
}

impl GitExecutor {
    /// Create an executor, verifying git is installed and `repo_path` is a
    /// repository.
    pub fn new(repo_path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("--version")
            .output()
            .map_err(|_| MinerError::GitNotAvailable)?;
        if !output.status.success() {
            return Err(MinerError::GitNotAvailable);
        }

        let output = Command::new("git")
            .current_dir(repo_path)
            .args(["rev-parse", "--git-dir"])
            .output()?;
        if !output.status.success() {
            return Err(MinerError::NotARepository(repo_path.to_path_buf()));
        }

        Ok(Self {
            repo_path: repo_path.to_path_buf(),
        })
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo_path);
        cmd
    }

    /// Command output, with invalid UTF-8 replaced: file contents and
    /// messages may use any encoding.
    fn stdout(output: Output) -> Result<String> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MinerError::CommandFailed(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Resolve a revision to a full commit hash.
    pub fn resolve(&self, rev: &str) -> Result<String> {
        // a leading dash would be read as an option
        if rev.is_empty() || rev.starts_with('-') {
            return Err(MinerError::UnknownCommit(rev.to_string()));
        }

        let output = self
            .git()
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{}^{{commit}}", rev))
            .output()?;
        if !output.status.success() {
            return Err(MinerError::UnknownCommit(rev.to_string()));
        }
        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }

    /// Hashes of the most recent commits reachable from `rev` (HEAD when
    /// `None`), newest first.
    pub fn log_hashes(&self, rev: Option<&str>, limit: Option<usize>) -> Result<Vec<String>> {
        let mut cmd = self.git();
        cmd.args(["log", "--format=%H"]);
        if let Some(n) = limit {
            cmd.arg(format!("-n{}", n));
        }
        if let Some(rev) = rev {
            cmd.arg(rev);
        }
        cmd.arg("--");

        let stdout = Self::stdout(cmd.output()?)?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Metadata for one commit.
    pub fn show_info(&self, hash: &str) -> Result<CommitInfo> {
        let output = self
            .git()
            .args(["show", "-s", &format!("--format={}", LOG_FORMAT), hash])
            .output()?;
        let stdout = Self::stdout(output)?;
        parse_log_output(&stdout)
            .into_iter()
            .next()
            .ok_or_else(|| MinerError::UnknownCommit(hash.to_string()))
    }

    /// Unified diff of a commit, with rename and copy detection.
    pub fn show_patch(&self, hash: &str) -> Result<String> {
        let output = self
            .git()
            .args([
                "show",
                "--format=",
                "--patch",
                "--find-renames",
                "--find-copies",
                "--no-color",
                "--no-ext-diff",
                hash,
            ])
            .output()?;
        Self::stdout(output)
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Run git in `dir`, returning `None` when git is unusable here.
    fn run(dir: &Path, args: &[&str]) -> Option<()> {
        let status = Command::new("git")
            .current_dir(dir)
            .args(args)
            .env("GIT_AUTHOR_DATE", "2024-03-01T12:00:00Z")
            .env("GIT_COMMITTER_DATE", "2024-03-01T12:00:00Z")
            .output()
            .ok()?
            .status;
        status.success().then_some(())
    }

    /// Write `contents` to `name` and commit it with `message`.
    pub(crate) fn commit_file(
        dir: &Path,
        name: &str,
        contents: &[u8],
        message: &str,
    ) -> Option<()> {
        std::fs::write(dir.join(name), contents).ok()?;
        run(dir, &["add", "."])?;
        run(dir, &["commit", "-q", "-m", message])
    }

    /// A throwaway repository with two commits, or `None` without git.
    pub(crate) fn scratch_repo() -> Option<tempfile::TempDir> {
        let dir = tempfile::tempdir().ok()?;
        let path = dir.path();
        run(path, &["init", "-q"])?;
        run(path, &["config", "user.name", "Dana Reyes"])?;
        run(path, &["config", "user.email", "dana@example.com"])?;
        run(path, &["config", "commit.gpgsign", "false"])?;

        std::fs::write(path.join("README.md"), "# Demo\n").ok()?;
        run(path, &["add", "."])?;
        run(path, &["commit", "-q", "-m", "docs: add readme"])?;

        std::fs::create_dir_all(path.join("src/auth")).ok()?;
        std::fs::write(
            path.join("src/auth/pkce.rs"),
            "pub fn verifier() -> String {\n    String::new()\n}\n",
        )
        .ok()?;
        run(path, &["add", "."])?;
        run(
            path,
            &["commit", "-q", "-m", "feat(auth)!: add PKCE to OAuth flow", "-m", "Closes #12"],
        )?;
        Some(dir)
    }

    #[test]
    fn test_executor_against_scratch_repo() {
        let Some(repo) = scratch_repo() else {
            return;
        };
        let executor = GitExecutor::new(repo.path()).unwrap();

        let hashes = executor.log_hashes(None, Some(10)).unwrap();
        assert_eq!(hashes.len(), 2);
        assert_eq!(executor.resolve("HEAD").unwrap(), hashes[0]);

        let info = executor.show_info(&hashes[0]).unwrap();
        assert_eq!(info.subject, "feat(auth)!: add PKCE to OAuth flow");
        assert_eq!(info.body, "Closes #12");
        assert_eq!(info.author_name, "Dana Reyes");

        let patch = executor.show_patch(&hashes[0]).unwrap();
        assert!(patch.contains("diff --git a/src/auth/pkce.rs b/src/auth/pkce.rs"));
    }

    #[test]
    fn test_patch_with_non_utf8_content() {
        let Some(repo) = scratch_repo() else {
            return;
        };
        let source = b"char *s = \"caf\xe9\";\n";
        commit_file(repo.path(), "legacy.c", source, "chore: import legacy").unwrap();
        let executor = GitExecutor::new(repo.path()).unwrap();
        let hash = executor.resolve("HEAD").unwrap();

        let patch = executor.show_patch(&hash).unwrap();
        assert!(patch.contains("+char *s = \"caf\u{fffd}\";"));
    }

    #[test]
    fn test_unknown_revisions() {
        let Some(repo) = scratch_repo() else {
            return;
        };
        let executor = GitExecutor::new(repo.path()).unwrap();
        assert!(matches!(executor.resolve("0000000"), Err(MinerError::UnknownCommit(_))));
        assert!(matches!(executor.resolve("--all"), Err(MinerError::UnknownCommit(_))));
    }

    #[test]
    fn test_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        match GitExecutor::new(dir.path()) {
            Err(MinerError::NotARepository(path)) => assert_eq!(path, dir.path()),
            Err(MinerError::GitNotAvailable) => {}
            other => panic!("unexpected: {:?}", other.map(|e| e.repo_path().to_path_buf())),
        }
    }
}
