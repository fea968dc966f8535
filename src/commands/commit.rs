use async_trait::async_trait;

use super::choose;
use crate::config::CommitEditorOptions;
use crate::error::{MenuError, Result};
use crate::menu::{Menu, MenuCommand, MenuContext};
use crate::orchestrator::run_commit_like_command;
use crate::refs::{abbreviate, PickItem};
use crate::repository::CommitSummary;
use crate::switches::Switch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Commit,
    Amend,
    Extend,
    Reword,
    Fixup,
    Squash,
}

pub fn commit_switches() -> Vec<Switch> {
    vec![
        Switch::new("-a", "--all", "Stage all modified and deleted files"),
        Switch::new("-e", "--allow-empty", "Allow empty commit"),
        Switch::new("-v", "--verbose", "Show diff of changes to be committed"),
        Switch::new("-n", "--no-verify", "Disable hooks"),
        Switch::new("-R", "--reset-author", "Claim authorship and reset author date"),
        Switch::new("-s", "--signoff", "Add Signed-off-by line"),
    ]
}

pub fn commit_menu() -> Menu<CommitAction> {
    Menu::new("Committing", commit_switches())
        .action('c', "Commit", CommitAction::Commit)
        .action('a', "Amend", CommitAction::Amend)
        .action('e', "Extend", CommitAction::Extend)
        .action('w', "Reword", CommitAction::Reword)
        .action('f', "Fixup", CommitAction::Fixup)
        .action('s', "Squash", CommitAction::Squash)
}

fn commit_items(commits: &[CommitSummary]) -> Vec<PickItem> {
    commits
        .iter()
        .map(|commit| {
            PickItem::new(
                &abbreviate(Some(&commit.id)),
                &format!("{}  {}", commit.summary, commit.time.format("%Y-%m-%d")),
                &commit.id,
            )
        })
        .collect()
}

/// Choose the commit a fixup or squash targets. Nothing chosen is an error.
async fn choose_target(ctx: &MenuContext<'_>, kind: &str) -> Result<String> {
    let items = commit_items(&ctx.repo.recent_commits);
    choose(ctx, &format!("{} commit", kind), &items)
        .await?
        .ok_or_else(|| MenuError::NoTargetChosen(format!("{} needs a target commit", kind)))
}

impl CommitAction {
    /// Flags appended after the compiled switches.
    fn flags(&self) -> Vec<String> {
        match self {
            CommitAction::Commit | CommitAction::Fixup | CommitAction::Squash => vec![],
            CommitAction::Amend => vec!["--amend".to_string()],
            CommitAction::Extend => vec!["--amend".to_string(), "--no-edit".to_string()],
            CommitAction::Reword => vec!["--amend".to_string(), "--only".to_string()],
        }
    }

    fn options(&self, base: CommitEditorOptions) -> CommitEditorOptions {
        match self {
            // Nothing staged is part of a reword and a fixup never opens the editor.
            CommitAction::Reword | CommitAction::Fixup => CommitEditorOptions {
                show_staged_changes: false,
                ..base
            },
            _ => base,
        }
    }
}

#[async_trait]
impl MenuCommand for CommitAction {
    async fn invoke(&self, ctx: &mut MenuContext<'_>) -> Result<()> {
        let mut args = ctx.command_args("commit", &[]);
        args.extend(self.flags());

        match self {
            CommitAction::Fixup => {
                let target = choose_target(ctx, "Fixup").await?;
                args.push(format!("--fixup={}", target));
            }
            CommitAction::Squash => {
                let target = choose_target(ctx, "Squash").await?;
                args.push(format!("--squash={}", target));
            }
            _ => {}
        }

        let options = self.options(ctx.host.settings.commit_options());
        run_commit_like_command(ctx.repo, ctx.host, args, &options).await
    }
}
