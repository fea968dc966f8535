use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::{MenuError, Result};

/// Write side of the repository configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn set_config(&self, repo: &Path, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a key that is not set succeeds.
    async fn unset_config(&self, repo: &Path, key: &str) -> Result<()>;
}

/// [`ConfigStore`] that shells out to `git config`.
#[derive(Debug, Clone, Default)]
pub struct GitConfigStore;

#[async_trait]
impl ConfigStore for GitConfigStore {
    async fn set_config(&self, repo: &Path, key: &str, value: &str) -> Result<()> {
        tracing::info!(key, value, "writing git config");

        let output = tokio::process::Command::new("git")
            .args(["config", key, value])
            .current_dir(repo)
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(MenuError::Config(format!(
                "failed to set git config {}: {}",
                key,
                error.trim()
            )));
        }

        Ok(())
    }

    async fn unset_config(&self, repo: &Path, key: &str) -> Result<()> {
        tracing::info!(key, "removing git config");

        let output = tokio::process::Command::new("git")
            .args(["config", "--unset", key])
            .current_dir(repo)
            .output()
            .await?;

        // Exit code 5: the key was not set.
        if !output.status.success() && output.status.code() != Some(5) {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(MenuError::Config(format!(
                "failed to unset git config {}: {}",
                key,
                error.trim()
            )));
        }

        Ok(())
    }
}

/// Get a git config value for the repository at `repo`.
pub fn get_git_config(repo: &Path, key: &str) -> Result<Option<String>> {
    let output = std::process::Command::new("git")
        .args(["config", key])
        .current_dir(repo)
        .output()?;

    if output.status.success() {
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    } else {
        Ok(None)
    }
}

/// Settings for commit-family operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEditorOptions {
    pub show_staged_changes: bool,
    /// Refresh repository state shortly after git has started.
    pub update_post_commit_task: bool,
    /// Environment variable git reads its editor command from.
    pub editor_env_var: String,
    /// Re-raise process failures after cleanup instead of only reporting them.
    pub propagate_errors: bool,
}

impl Default for CommitEditorOptions {
    fn default() -> Self {
        Self {
            show_staged_changes: true,
            update_post_commit_task: false,
            editor_env_var: "GIT_EDITOR".to_string(),
            propagate_errors: false,
        }
    }
}

/// Application settings, read from the `menugit.*` git config keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub show_staged_changes: bool,
    pub refresh_after_commit: bool,
    pub propagate_errors: bool,
    pub refresh_delay: Duration,
    pub status_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            show_staged_changes: true,
            refresh_after_commit: true,
            propagate_errors: false,
            refresh_delay: Duration::from_millis(50),
            status_duration: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Load settings for `repo`, falling back to defaults for unset or unparsable keys.
    pub fn load(repo: &Path) -> Result<Self> {
        Self::from_lookup(|key| get_git_config(repo, key))
    }

    pub fn from_lookup<F>(mut lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<Option<String>>,
    {
        let defaults = Self::default();
        let mut bool_key = |key: &str, default: bool| -> Result<bool> {
            Ok(lookup(key)?
                .and_then(|value| parse_bool(&value))
                .unwrap_or(default))
        };

        let show_staged_changes =
            bool_key("menugit.commit.showStagedChanges", defaults.show_staged_changes)?;
        let refresh_after_commit =
            bool_key("menugit.commit.refreshAfterCommit", defaults.refresh_after_commit)?;
        let propagate_errors =
            bool_key("menugit.commit.propagateErrors", defaults.propagate_errors)?;

        let refresh_delay = lookup("menugit.commit.refreshDelayMs")?
            .and_then(|value| value.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.refresh_delay);
        let status_duration = lookup("menugit.status.durationSecs")?
            .and_then(|value| value.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.status_duration);

        Ok(Self {
            show_staged_changes,
            refresh_after_commit,
            propagate_errors,
            refresh_delay,
            status_duration,
        })
    }

    /// Orchestrator options for a plain commit.
    pub fn commit_options(&self) -> CommitEditorOptions {
        CommitEditorOptions {
            show_staged_changes: self.show_staged_changes,
            update_post_commit_task: self.refresh_after_commit,
            propagate_errors: self.propagate_errors,
            ..CommitEditorOptions::default()
        }
    }
}

/// Parse a git-style boolean.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Result<Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| Ok(map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.commit_options().show_staged_changes);
        assert_eq!(config.commit_options().editor_env_var, "GIT_EDITOR");
    }

    #[test]
    fn test_reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("menugit.commit.showStagedChanges", "false"),
            ("menugit.commit.propagateErrors", "yes"),
            ("menugit.commit.refreshDelayMs", "250"),
            ("menugit.status.durationSecs", "3"),
        ]))
        .unwrap();

        assert!(!config.show_staged_changes);
        assert!(config.propagate_errors);
        assert_eq!(config.refresh_delay, Duration::from_millis(250));
        assert_eq!(config.status_duration, Duration::from_secs(3));

        let options = config.commit_options();
        assert!(!options.show_staged_changes);
        assert!(options.propagate_errors);
        assert!(options.update_post_commit_task);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("menugit.commit.showStagedChanges", "maybe"),
            ("menugit.commit.refreshDelayMs", "soon"),
        ]))
        .unwrap();
        assert!(config.show_staged_changes);
        assert_eq!(config.refresh_delay, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_git_config_store_set_and_unset() {
        let temp_dir = tempfile::tempdir().unwrap();
        let status = std::process::Command::new("git")
            .args(["init", "-q"])
            .current_dir(temp_dir.path())
            .status()
            .unwrap();
        assert!(status.success());
        let store = GitConfigStore;
        let key = "branch.main.merge";

        store.set_config(temp_dir.path(), key, "refs/heads/main").await.unwrap();
        assert_eq!(
            get_git_config(temp_dir.path(), key).unwrap().as_deref(),
            Some("refs/heads/main")
        );

        store.unset_config(temp_dir.path(), key).await.unwrap();
        assert_eq!(get_git_config(temp_dir.path(), key).unwrap(), None);
        // Already gone.
        store.unset_config(temp_dir.path(), key).await.unwrap();
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
