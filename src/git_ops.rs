use chrono::{DateTime, Utc};
use git2::{BranchType, ErrorCode, Repository};
use std::path::Path;

use crate::error::Result;
use crate::repository::{
    CommitSummary, GitRef, HeadState, RefType, RemoteInfo, RepoState, TrackingRef,
};

/// How many commits are offered as fixup/squash targets.
const RECENT_COMMIT_LIMIT: usize = 20;

/// Load the repository state that menus are built from.
pub fn load_repo_state(path: &Path) -> Result<RepoState> {
    let repo = Repository::discover(path)?;
    let root = repo
        .workdir()
        .unwrap_or_else(|| repo.path())
        .to_path_buf();

    let remotes = get_remotes(&repo)?;
    let remote_names: Vec<String> = remotes.iter().map(|r| r.name.clone()).collect();
    let head = get_head_state(&repo)?;
    let refs = get_all_refs(&repo, &remote_names)?;
    let recent_commits = get_recent_commits(&repo, RECENT_COMMIT_LIMIT)?;

    tracing::debug!(
        root = %root.display(),
        head = ?head.name,
        remotes = remotes.len(),
        refs = refs.len(),
        "loaded repository state"
    );

    Ok(RepoState {
        root,
        head,
        remotes,
        refs,
        recent_commits,
    })
}

fn get_head_state(repo: &Repository) -> Result<HeadState> {
    let (name, commit) = match repo.head() {
        Ok(head) => {
            let name = if head.is_branch() {
                head.shorthand().map(|s| s.to_string())
            } else {
                None
            };
            let commit = head.peel_to_commit().ok().map(|c| c.id().to_string());
            (name, commit)
        }
        // A fresh repository still has a branch name, just no commit yet.
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head_ref = repo.find_reference("HEAD")?;
            let name = head_ref
                .symbolic_target()
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .map(|s| s.to_string());
            (name, None)
        }
        Err(e) => return Err(e.into()),
    };

    let Some(branch) = name.clone() else {
        return Ok(HeadState {
            name,
            commit,
            upstream: None,
            push_remote: None,
        });
    };

    let config = repo.config()?;
    let read = |key: String| config.get_string(&key).ok().filter(|v| !v.is_empty());

    let upstream = match (
        read(format!("branch.{}.remote", branch)),
        read(format!("branch.{}.merge", branch)),
    ) {
        (Some(remote), Some(merge)) => Some(TrackingRef {
            name: merge
                .strip_prefix("refs/heads/")
                .unwrap_or(&merge)
                .to_string(),
            remote,
        }),
        _ => None,
    };

    let push_remote = read(format!("branch.{}.pushRemote", branch))
        .or_else(|| read("remote.pushDefault".to_string()))
        .map(|remote| TrackingRef {
            name: branch.clone(),
            remote,
        });

    Ok(HeadState {
        name,
        commit,
        upstream,
        push_remote,
    })
}

fn get_remotes(repo: &Repository) -> Result<Vec<RemoteInfo>> {
    let mut remotes = Vec::new();
    for name in repo.remotes()?.iter().flatten() {
        let remote = repo.find_remote(name)?;
        let push_url = remote
            .pushurl()
            .or_else(|| remote.url())
            .map(|s| s.to_string());
        remotes.push(RemoteInfo {
            name: name.to_string(),
            push_url,
        });
    }
    Ok(remotes)
}

/// Local branches, remote-tracking branches and tags, in that order.
fn get_all_refs(repo: &Repository, remote_names: &[String]) -> Result<Vec<GitRef>> {
    let mut refs = Vec::new();

    for branch in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        if let Some(name) = branch.name()? {
            let commit = branch.get().peel_to_commit().ok().map(|c| c.id().to_string());
            refs.push(GitRef {
                name: name.to_string(),
                ref_type: RefType::LocalBranch,
                remote: None,
                commit,
            });
        }
    }

    for branch in repo.branches(Some(BranchType::Remote))? {
        let (branch, _) = branch?;
        // origin/HEAD is a symbolic pointer, not a candidate.
        if branch.get().symbolic_target().is_some() {
            continue;
        }
        if let Some(name) = branch.name()? {
            let commit = branch.get().peel_to_commit().ok().map(|c| c.id().to_string());
            refs.push(GitRef {
                name: name.to_string(),
                ref_type: RefType::RemoteHead,
                remote: owning_remote(name, remote_names),
                commit,
            });
        }
    }

    for reference in repo.references_glob("refs/tags/*")? {
        let reference = reference?;
        if let Some(name) = reference.shorthand() {
            let commit = reference.peel_to_commit().ok().map(|c| c.id().to_string());
            refs.push(GitRef {
                name: name.to_string(),
                ref_type: RefType::Tag,
                remote: None,
                commit,
            });
        }
    }

    Ok(refs)
}

/// Remote a remote-tracking branch belongs to. Remote names may contain `/`,
/// so the longest configured prefix wins.
fn owning_remote(ref_name: &str, remote_names: &[String]) -> Option<String> {
    remote_names
        .iter()
        .filter(|remote| {
            ref_name
                .strip_prefix(remote.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|remote| remote.len())
        .cloned()
        .or_else(|| ref_name.split('/').next().map(|s| s.to_string()))
}

fn get_recent_commits(repo: &Repository, limit: usize) -> Result<Vec<CommitSummary>> {
    let mut revwalk = repo.revwalk()?;
    match revwalk.push_head() {
        Ok(()) => {}
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    }

    let mut commits = Vec::new();
    for oid in revwalk.take(limit) {
        let commit = repo.find_commit(oid?)?;
        let time = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();
        commits.push(CommitSummary {
            id: commit.id().to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
            time,
        });
    }
    Ok(commits)
}
