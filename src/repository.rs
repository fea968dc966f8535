use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Kind of a ref known to the repository.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefType {
    LocalBranch,
    RemoteHead,
    Tag,
}

/// A branch or tag as seen when the state was loaded.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    /// Short name: `main`, `origin/main`, `v1.0.0`.
    pub name: String,
    pub ref_type: RefType,
    pub remote: Option<String>,
    pub commit: Option<String>,
}

impl GitRef {
    pub fn local(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            ref_type: RefType::LocalBranch,
            remote: None,
            commit: Some(commit.to_string()),
        }
    }

    pub fn remote_head(remote: &str, branch: &str, commit: &str) -> Self {
        Self {
            name: format!("{}/{}", remote, branch),
            ref_type: RefType::RemoteHead,
            remote: Some(remote.to_string()),
            commit: Some(commit.to_string()),
        }
    }

    pub fn tag(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            ref_type: RefType::Tag,
            remote: None,
            commit: Some(commit.to_string()),
        }
    }
}

/// A configured remote.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub push_url: Option<String>,
}

/// Where a branch is tracked: a branch `name` on `remote`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackingRef {
    pub name: String,
    pub remote: String,
}

/// HEAD together with its tracking configuration.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadState {
    /// Branch name, `None` when detached.
    pub name: Option<String>,
    pub commit: Option<String>,
    pub upstream: Option<TrackingRef>,
    pub push_remote: Option<TrackingRef>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub summary: String,
    pub time: DateTime<Utc>,
}

/// In-memory snapshot of the repository that menus are built from.
///
/// Configure-then-retry actions update `head` in place after the matching
/// config write succeeded, so a retry sees the new tracking state right away.
#[derive(Serialize, Debug, Clone, Default)]
pub struct RepoState {
    pub root: PathBuf,
    pub head: HeadState,
    pub remotes: Vec<RemoteInfo>,
    pub refs: Vec<GitRef>,
    pub recent_commits: Vec<CommitSummary>,
}

impl RepoState {
    pub fn branch_name(&self) -> Option<&str> {
        self.head.name.as_deref()
    }

    pub fn tags(&self) -> impl Iterator<Item = &GitRef> {
        self.refs.iter().filter(|r| r.ref_type == RefType::Tag)
    }

    /// Remote for tag pushes: upstream remote first, then the push remote.
    pub fn tag_push_remote(&self) -> Option<&str> {
        self.head
            .upstream
            .as_ref()
            .or(self.head.push_remote.as_ref())
            .map(|tracking| tracking.remote.as_str())
    }
}
