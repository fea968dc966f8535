use async_trait::async_trait;

use super::{ask, choose, run_and_report};
use crate::error::{MenuError, Result};
use crate::menu::{Menu, MenuCommand, MenuContext};
use crate::refs::{remote_items, tag_items, upstream_candidates};
use crate::repository::{RepoState, TrackingRef};
use crate::switches::Switch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAction {
    ToPushRemote,
    SetPushRemoteThenPush,
    ToUpstream,
    SetUpstreamThenPush,
    Elsewhere,
    AnotherBranch,
    Tag,
    AllTags,
}

pub fn push_switches() -> Vec<Switch> {
    vec![
        Switch::new("-f", "--force-with-lease", "Force with lease"),
        Switch::new("-F", "--force", "Force"),
        Switch::new("-h", "--no-verify", "Disable hooks"),
        Switch::new("-n", "--dry-run", "Dry run"),
    ]
}

/// Build the push menu. Without a push remote or upstream, `p` and `u` offer
/// to configure one first.
pub fn push_menu(repo: &RepoState) -> Menu<PushAction> {
    let mut menu = Menu::new("Pushing", push_switches());

    if let Some(branch) = repo.branch_name() {
        menu = match &repo.head.push_remote {
            Some(push_remote) => menu.action(
                'p',
                &format!("{}/{}", push_remote.remote, push_remote.name),
                PushAction::ToPushRemote,
            ),
            None => menu.action(
                'p',
                "pushRemote, after setting it",
                PushAction::SetPushRemoteThenPush,
            ),
        };
        menu = match &repo.head.upstream {
            Some(upstream) => menu.action(
                'u',
                &format!("{}/{}", upstream.remote, upstream.name),
                PushAction::ToUpstream,
            ),
            None => menu.action(
                'u',
                "@{upstream}, after setting it",
                PushAction::SetUpstreamThenPush,
            ),
        };
        menu = menu.action('e', &format!("{} elsewhere", branch), PushAction::Elsewhere);
    }

    menu.action('o', "another branch", PushAction::AnotherBranch)
        .action('T', "a tag", PushAction::Tag)
        .action('t', "all tags", PushAction::AllTags)
}

fn current_branch(ctx: &MenuContext<'_>) -> Result<String> {
    ctx.repo
        .branch_name()
        .map(|s| s.to_string())
        .ok_or(MenuError::DetachedHead)
}

#[async_trait]
impl MenuCommand for PushAction {
    async fn invoke(&self, ctx: &mut MenuContext<'_>) -> Result<()> {
        match self {
            PushAction::ToPushRemote => {
                let branch = current_branch(ctx)?;
                let Some(push_remote) = ctx.repo.head.push_remote.clone() else {
                    tracing::debug!("no push remote configured");
                    return Ok(());
                };
                let args = ctx.command_args("push", &[&push_remote.remote, &branch]);
                let done = format!("Pushed {} to {}", branch, push_remote.remote);
                run_and_report(ctx, args, &done).await
            }
            PushAction::SetPushRemoteThenPush => {
                let branch = current_branch(ctx)?;
                let items = remote_items(&ctx.repo.remotes);
                let Some(remote) = choose(ctx, "Set pushRemote then push", &items).await? else {
                    return Ok(());
                };

                ctx.host
                    .config
                    .set_config(
                        &ctx.repo.root,
                        &format!("branch.{}.pushRemote", branch),
                        &remote,
                    )
                    .await?;
                ctx.repo.head.push_remote = Some(TrackingRef {
                    name: branch,
                    remote,
                });

                PushAction::ToPushRemote.invoke(ctx).await
            }
            PushAction::ToUpstream => {
                let branch = current_branch(ctx)?;
                let Some(upstream) = ctx.repo.head.upstream.clone() else {
                    tracing::debug!("no upstream configured");
                    return Ok(());
                };
                let refspec = format!("{}:{}", branch, upstream.name);
                let args = ctx.command_args("push", &[&upstream.remote, &refspec]);
                let done = format!("Pushed {} to {}/{}", branch, upstream.remote, upstream.name);
                run_and_report(ctx, args, &done).await
            }
            PushAction::SetUpstreamThenPush => {
                let branch = current_branch(ctx)?;
                let candidates = upstream_candidates(&branch, &ctx.repo.refs, &ctx.repo.remotes);
                let items: Vec<_> = candidates.iter().map(|c| c.to_pick_item()).collect();
                let Some(chosen) = choose(ctx, "Set upstream then push", &items).await? else {
                    return Ok(());
                };
                let Some(candidate) = candidates.into_iter().find(|c| c.name == chosen) else {
                    return Ok(());
                };

                let merge = format!("refs/heads/{}", candidate.branch_name());
                let remote = candidate.remote_name().to_string();
                let merge_key = format!("branch.{}.merge", branch);
                let config = &ctx.host.config;
                config.set_config(&ctx.repo.root, &merge_key, &merge).await?;
                // Both keys or neither: a lone merge key is a broken upstream.
                if let Err(e) = config
                    .set_config(&ctx.repo.root, &format!("branch.{}.remote", branch), &remote)
                    .await
                {
                    if let Err(undo) = config.unset_config(&ctx.repo.root, &merge_key).await {
                        tracing::warn!(error = %undo, key = %merge_key, "could not roll back upstream");
                    }
                    return Err(e);
                }
                ctx.repo.head.upstream = Some(TrackingRef {
                    name: candidate.branch_name().to_string(),
                    remote,
                });

                PushAction::ToUpstream.invoke(ctx).await
            }
            PushAction::Elsewhere => {
                let branch = current_branch(ctx)?;
                let items = remote_items(&ctx.repo.remotes);
                let Some(remote) = choose(ctx, "Push to remote", &items).await? else {
                    return Ok(());
                };
                let args = ctx.command_args("push", &[&remote, &branch]);
                run_and_report(ctx, args, &format!("Pushed {} to {}", branch, remote)).await
            }
            PushAction::AnotherBranch => {
                let Some(remote) = ask(ctx, "Push to remote").await? else {
                    return Ok(());
                };
                let Some(refspec) = ask(ctx, "Push branch or refspec").await? else {
                    return Ok(());
                };
                let args = ctx.command_args("push", &[&remote, &refspec]);
                run_and_report(ctx, args, &format!("Pushed {} to {}", refspec, remote)).await
            }
            PushAction::Tag => {
                let Some(remote) = ctx.repo.tag_push_remote().map(|s| s.to_string()) else {
                    tracing::debug!("no upstream or push remote to push tags to");
                    return Ok(());
                };
                let items = tag_items(ctx.repo.tags());
                let Some(tag) = choose(ctx, "Push tag", &items).await? else {
                    return Ok(());
                };
                let args = ctx.command_args("push", &[&remote, &tag]);
                run_and_report(ctx, args, &format!("Pushed {} to {}", tag, remote)).await
            }
            PushAction::AllTags => {
                let Some(remote) = ctx.repo.tag_push_remote().map(|s| s.to_string()) else {
                    tracing::debug!("no upstream or push remote to push tags to");
                    return Ok(());
                };
                let args = ctx.command_args("push", &[&remote, "--tags"]);
                run_and_report(ctx, args, &format!("Pushed tags to {}", remote)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::HeadState;

    fn repo(name: Option<&str>, upstream: Option<&str>, push_remote: Option<&str>) -> RepoState {
        let tracking = |remote: &str| TrackingRef {
            name: "main".to_string(),
            remote: remote.to_string(),
        };
        RepoState {
            head: HeadState {
                name: name.map(|s| s.to_string()),
                commit: None,
                upstream: upstream.map(tracking),
                push_remote: push_remote.map(tracking),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_offers_configure_then_push() {
        let menu = push_menu(&repo(Some("main"), None, None));
        assert_eq!(menu.labels(), vec!['p', 'u', 'e', 'o', 'T', 't']);
        assert_eq!(menu.find('p').unwrap().action, PushAction::SetPushRemoteThenPush);
        assert_eq!(menu.find('u').unwrap().action, PushAction::SetUpstreamThenPush);
    }

    #[test]
    fn test_menu_offers_direct_push_when_configured() {
        let menu = push_menu(&repo(Some("main"), Some("origin"), Some("fork")));
        assert_eq!(menu.find('p').unwrap().action, PushAction::ToPushRemote);
        assert_eq!(menu.find('p').unwrap().description, "fork/main");
        assert_eq!(menu.find('u').unwrap().action, PushAction::ToUpstream);
        assert_eq!(menu.find('u').unwrap().description, "origin/main");
    }

    #[test]
    fn test_detached_head_menu() {
        let menu = push_menu(&repo(None, None, None));
        assert_eq!(menu.labels(), vec!['o', 'T', 't']);
    }
}
