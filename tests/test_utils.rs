use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command as StdCommand;

/// A throwaway git repository for tests that need real git state.
///
/// ```rust
/// // Repository on branch `main` with user config and no commits
/// let repo = TestRepo::with_git();
///
/// // Same with a few commits
/// let repo = TestRepo::with_commits();
///
/// // With an `origin` remote backed by a local bare repository
/// let repo = TestRepo::with_commits().with_bare_origin();
/// ```
pub struct TestRepo {
    pub temp_dir: assert_fs::TempDir,
    remote_dir: Option<assert_fs::TempDir>,
}

impl TestRepo {
    /// Create an empty temporary directory (not a git repository)
    pub fn empty() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().unwrap(),
            remote_dir: None,
        }
    }

    /// Create a git repository on branch `main` with basic configuration
    pub fn with_git() -> Self {
        let repo = Self::empty();
        repo.git(&["init"]);
        // Independent of the installed git's init.defaultBranch.
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.set_git_config("user.name", "Test User")
            .expect("Failed to set git user.name");
        repo.set_git_config("user.email", "test@example.com")
            .expect("Failed to set git user.email");
        repo
    }

    /// Create a git repository with sample commits
    pub fn with_commits() -> Self {
        let repo = Self::with_git();
        repo.add_and_commit("initial.txt", "initial content", "Initial commit")
            .add_and_commit("feature.txt", "feature content", "Add feature");
        repo
    }

    /// Add an `origin` remote pointing at a fresh bare repository
    pub fn with_bare_origin(mut self) -> Self {
        let remote_dir = assert_fs::TempDir::new().unwrap();
        let output = StdCommand::new("git")
            .args(["init", "--bare"])
            .current_dir(&remote_dir)
            .output()
            .expect("Failed to create bare repository");
        assert!(output.status.success(), "Failed to init bare repository: {}", String::from_utf8_lossy(&output.stderr));

        let url = format!("file://{}", remote_dir.path().display());
        self.git(&["remote", "add", "origin", &url]);
        self.remote_dir = Some(remote_dir);
        self
    }

    /// Run git in the repository and return stdout, asserting success
    pub fn git(&self, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(&self.temp_dir)
            .output()
            .expect("Failed to run git");

        assert!(output.status.success(), "git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Add a file with content to the repository
    pub fn add_file(&self, filename: &str, content: &str) -> &Self {
        self.temp_dir.child(filename).write_str(content).unwrap();
        self
    }

    /// Stage files for commit
    pub fn git_add(&self, files: &[&str]) -> &Self {
        let mut args = vec!["add"];
        args.extend(files);
        self.git(&args);
        self
    }

    /// Create a commit with the given message
    pub fn git_commit(&self, message: &str) -> &Self {
        self.git(&["commit", "-m", message]);
        self
    }

    /// Add a file and commit it in one step
    pub fn add_and_commit(&self, filename: &str, content: &str, commit_message: &str) -> &Self {
        self.add_file(filename, content)
            .git_add(&[filename])
            .git_commit(commit_message)
    }

    /// Set a git config value
    pub fn set_git_config(&self, key: &str, value: &str) -> Result<&Self, String> {
        let output = StdCommand::new("git")
            .args(["config", key, value])
            .current_dir(&self.temp_dir)
            .output()
            .expect("Failed to run git config");

        if output.status.success() {
            Ok(self)
        } else {
            Err(String::from_utf8_lossy(&output.stderr).to_string())
        }
    }

    /// Get a git config value
    pub fn get_git_config(&self, key: &str) -> Option<String> {
        let output = StdCommand::new("git")
            .args(["config", key])
            .current_dir(&self.temp_dir)
            .output()
            .expect("Failed to get git config");

        if output.status.success() {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if value.is_empty() { None } else { Some(value) }
        } else {
            None
        }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_git() {
        let repo = TestRepo::with_git();

        assert!(repo.path().join(".git/HEAD").is_file());
        assert_eq!(repo.get_git_config("user.name"), Some("Test User".to_string()));
        assert_eq!(repo.git(&["symbolic-ref", "--short", "HEAD"]).trim(), "main");
    }

    #[test]
    fn test_with_bare_origin() {
        let repo = TestRepo::with_commits().with_bare_origin();

        let remote_dir = repo.remote_dir.as_ref().unwrap();
        assert!(remote_dir.path().join("HEAD").exists());
        assert!(repo.get_git_config("remote.origin.url").unwrap().starts_with("file://"));
    }
}
