use async_trait::async_trait;

use super::{ask, choose, run_and_report};
use crate::error::Result;
use crate::menu::{Menu, MenuCommand, MenuContext};
use crate::refs::remote_items;
use crate::repository::RepoState;
use crate::switches::Switch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAction {
    FromPushRemote,
    FromUpstream,
    Elsewhere,
    AllRemotes,
    AnotherBranch,
}

pub fn fetch_switches() -> Vec<Switch> {
    vec![Switch::new("-p", "--prune", "Prune deleted branches")]
}

/// Build the fetch menu. `p` and `u` only appear when HEAD has the matching
/// tracking configuration.
pub fn fetch_menu(repo: &RepoState) -> Menu<FetchAction> {
    let mut menu = Menu::new("Fetching", fetch_switches());

    if let Some(push_remote) = &repo.head.push_remote {
        menu = menu.action('p', &push_remote.remote, FetchAction::FromPushRemote);
    }
    if let Some(upstream) = &repo.head.upstream {
        menu = menu.action(
            'u',
            &format!("{}/{}", upstream.remote, upstream.name),
            FetchAction::FromUpstream,
        );
    }

    menu.action('e', "elsewhere", FetchAction::Elsewhere)
        .action('a', "all remotes", FetchAction::AllRemotes)
        .action('o', "another branch", FetchAction::AnotherBranch)
}

#[async_trait]
impl MenuCommand for FetchAction {
    async fn invoke(&self, ctx: &mut MenuContext<'_>) -> Result<()> {
        match self {
            FetchAction::FromPushRemote => {
                let Some(push_remote) = ctx.repo.head.push_remote.clone() else {
                    tracing::debug!("no push remote configured");
                    return Ok(());
                };
                let args = ctx.command_args("fetch", &[&push_remote.remote]);
                run_and_report(ctx, args, &format!("Fetched {}", push_remote.remote)).await
            }
            FetchAction::FromUpstream => {
                let Some(upstream) = ctx.repo.head.upstream.clone() else {
                    tracing::debug!("no upstream configured");
                    return Ok(());
                };
                let args = ctx.command_args("fetch", &[&upstream.remote]);
                run_and_report(ctx, args, &format!("Fetched {}", upstream.remote)).await
            }
            FetchAction::Elsewhere => {
                let items = remote_items(&ctx.repo.remotes);
                let Some(remote) = choose(ctx, "Fetch remote", &items).await? else {
                    return Ok(());
                };
                let args = ctx.command_args("fetch", &[&remote]);
                run_and_report(ctx, args, &format!("Fetched {}", remote)).await
            }
            FetchAction::AllRemotes => {
                let args = ctx.command_args("fetch", &["--all"]);
                run_and_report(ctx, args, "Fetched all remotes").await
            }
            FetchAction::AnotherBranch => {
                let Some(remote) = ask(ctx, "Fetch from remote or url").await? else {
                    return Ok(());
                };
                let Some(branch) = ask(ctx, "Fetch branch").await? else {
                    return Ok(());
                };
                let args = ctx.command_args("fetch", &[&remote, &branch]);
                run_and_report(ctx, args, &format!("Fetched {} from {}", branch, remote)).await
            }
        }
    }
}
