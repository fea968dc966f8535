use crate::repository::{GitRef, RefType, RemoteInfo};

/// Length of abbreviated commit ids shown in choosers.
pub const ABBREV_LEN: usize = 7;

/// One selectable row in a chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
    pub value: String,
}

impl PickItem {
    pub fn new(label: &str, description: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
            value: value.to_string(),
        }
    }
}

/// Candidate offered when choosing an upstream. Only lives for one chooser call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefCandidate {
    pub name: String,
    pub ref_type: RefType,
    pub remote: Option<String>,
    pub commit: Option<String>,
}

impl RefCandidate {
    fn from_ref(git_ref: &GitRef) -> Self {
        Self {
            name: git_ref.name.clone(),
            ref_type: git_ref.ref_type,
            remote: git_ref.remote.clone(),
            commit: git_ref.commit.clone(),
        }
    }

    /// Branch part of the candidate, i.e. `feature` for `origin/feature`.
    pub fn branch_name(&self) -> &str {
        match &self.remote {
            Some(remote) => self
                .name
                .strip_prefix(remote.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(&self.name),
            None => &self.name,
        }
    }

    /// Remote to record in `branch.<name>.remote`; `.` for a local upstream.
    pub fn remote_name(&self) -> &str {
        self.remote.as_deref().unwrap_or(".")
    }

    pub fn to_pick_item(&self) -> PickItem {
        PickItem::new(&self.name, &abbreviate(self.commit.as_deref()), &self.name)
    }
}

pub fn abbreviate(commit: Option<&str>) -> String {
    commit
        .map(|id| id.chars().take(ABBREV_LEN).collect())
        .unwrap_or_default()
}

/// Chooser items for the configured remotes, in source order.
pub fn remote_items(remotes: &[RemoteInfo]) -> Vec<PickItem> {
    remotes
        .iter()
        .map(|remote| {
            PickItem::new(
                &remote.name,
                remote.push_url.as_deref().unwrap_or(""),
                &remote.name,
            )
        })
        .collect()
}

/// Chooser items for tags.
pub fn tag_items<'a>(refs: impl IntoIterator<Item = &'a GitRef>) -> Vec<PickItem> {
    refs.into_iter()
        .filter(|r| r.ref_type == RefType::Tag)
        .map(|r| PickItem::new(&r.name, &abbreviate(r.commit.as_deref()), &r.name))
        .collect()
}

/// Higher ranks sort first. The conventional `<first remote>/<branch>` ref is
/// the most likely upstream, then other remote heads, then local branches.
fn rank(candidate: &RefCandidate, conventional: Option<&str>) -> u8 {
    if Some(candidate.name.as_str()) == conventional {
        return 3;
    }
    match candidate.ref_type {
        RefType::RemoteHead => 2,
        RefType::LocalBranch => 1,
        RefType::Tag => 0,
    }
}

/// Upstream candidates for `branch`, most likely first.
///
/// Tags and the branch itself are never offered. When the first remote has no
/// `<remote>/<branch>` ref yet, one is synthesized so that a first push can
/// still pick it.
pub fn upstream_candidates(
    branch: &str,
    refs: &[GitRef],
    remotes: &[RemoteInfo],
) -> Vec<RefCandidate> {
    let mut candidates: Vec<RefCandidate> = refs
        .iter()
        .filter(|r| r.ref_type != RefType::Tag && r.name != branch)
        .map(RefCandidate::from_ref)
        .collect();

    let conventional = remotes
        .first()
        .map(|remote| (remote.name.as_str(), format!("{}/{}", remote.name, branch)));

    if let Some((remote, name)) = &conventional {
        if !candidates.iter().any(|c| &c.name == name) {
            candidates.insert(
                0,
                RefCandidate {
                    name: name.clone(),
                    ref_type: RefType::RemoteHead,
                    remote: Some(remote.to_string()),
                    commit: None,
                },
            );
        }
    }

    let conventional_name = conventional.as_ref().map(|(_, name)| name.as_str());
    // Stable sort keeps source order within a rank.
    candidates.sort_by_key(|c| std::cmp::Reverse(rank(c, conventional_name)));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Vec<RemoteInfo> {
        vec![
            RemoteInfo {
                name: "origin".to_string(),
                push_url: Some("git@example.com:me/repo.git".to_string()),
            },
            RemoteInfo {
                name: "fork".to_string(),
                push_url: None,
            },
        ]
    }

    fn refs() -> Vec<GitRef> {
        vec![
            GitRef::local("feature", "1111111aaaa"),
            GitRef::local("main", "2222222bbbb"),
            GitRef::remote_head("origin", "main", "3333333cccc"),
            GitRef::remote_head("fork", "feature", "4444444dddd"),
            GitRef::tag("v1.0.0", "5555555eeee"),
        ]
    }

    #[test]
    fn test_synthesizes_conventional_candidate_first() {
        let candidates = upstream_candidates("feature", &refs(), &origin());

        assert_eq!(candidates[0].name, "origin/feature");
        assert_eq!(candidates[0].ref_type, RefType::RemoteHead);
        assert_eq!(candidates[0].commit, None);
        assert_eq!(candidates[0].to_pick_item().description, "");
    }

    #[test]
    fn test_empty_ref_set_still_offers_conventional_candidate() {
        let candidates = upstream_candidates("feature", &[], &origin());

        assert_eq!(
            candidates,
            vec![RefCandidate {
                name: "origin/feature".to_string(),
                ref_type: RefType::RemoteHead,
                remote: Some("origin".to_string()),
                commit: None,
            }]
        );
    }

    #[test]
    fn test_no_duplicate_when_conventional_exists() {
        let mut refs = refs();
        refs.push(GitRef::remote_head("origin", "feature", "6666666ffff"));

        let candidates = upstream_candidates("feature", &refs, &origin());

        let count = candidates.iter().filter(|c| c.name == "origin/feature").count();
        assert_eq!(count, 1);
        assert_eq!(candidates[0].name, "origin/feature");
        assert_eq!(candidates[0].to_pick_item().description, "6666666");
    }

    #[test]
    fn test_excludes_tags_and_current_branch() {
        let candidates = upstream_candidates("feature", &refs(), &origin());

        assert!(candidates.iter().all(|c| c.name != "feature"));
        assert!(candidates.iter().all(|c| c.ref_type != RefType::Tag));
    }

    #[test]
    fn test_remote_heads_sort_before_local_branches() {
        let candidates = upstream_candidates("feature", &refs(), &origin());
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["origin/feature", "origin/main", "fork/feature", "main"]);
    }

    #[test]
    fn test_no_remotes_means_no_synthesized_candidate() {
        let candidates = upstream_candidates("feature", &refs(), &[]);
        assert!(candidates.iter().all(|c| c.name != "origin/feature"));
    }

    #[test]
    fn test_candidate_branch_and_remote_names() {
        let candidates = upstream_candidates("feature", &refs(), &origin());
        let fork = candidates.iter().find(|c| c.name == "fork/feature").unwrap();
        assert_eq!(fork.branch_name(), "feature");
        assert_eq!(fork.remote_name(), "fork");

        let local = candidates.iter().find(|c| c.name == "main").unwrap();
        assert_eq!(local.branch_name(), "main");
        assert_eq!(local.remote_name(), ".");
    }

    #[test]
    fn test_remote_items_use_push_url() {
        let items = remote_items(&origin());
        assert_eq!(items[0], PickItem::new("origin", "git@example.com:me/repo.git", "origin"));
        assert_eq!(items[1].description, "");
    }

    #[test]
    fn test_tag_items() {
        let items = tag_items(&refs());
        assert_eq!(items, vec![PickItem::new("v1.0.0", "5555555", "v1.0.0")]);
    }
}
