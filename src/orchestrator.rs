//! Runs commit-like git commands whose message is composed in this
//! application, keeping a staged-changes preview open for the duration.

use std::env;

use crate::config::CommitEditorOptions;
use crate::error::{MenuError, Result};
use crate::host::{Host, PreviewHandle, PreviewKind, show_until_disposed};
use crate::process::{collapse_output, RunOptions};
use crate::repository::RepoState;

pub const INSTRUCTION_MESSAGE: &str =
    "Type the commit message and confirm to finish, or press Esc to cancel";
pub const CANCELED_MESSAGE: &str = "Commit canceled.";

/// Editor command git should run: this executable's `edit` subcommand in wait mode.
pub fn editor_command() -> Result<String> {
    let exe = env::current_exe()?;
    let exe = exe.to_string_lossy();
    let quoted = shlex::try_quote(&exe)
        .map_err(|e| MenuError::Config(format!("cannot quote editor path {}: {}", exe, e)))?;
    Ok(format!("{} edit --wait", quoted))
}

/// Run a commit-family git command.
///
/// The preview and the git process start together. Once git has settled the
/// preview is awaited too, then the instruction message is disposed, the
/// outcome is reported and the preview is closed, whatever git's result was.
/// A git failure is returned only when `propagate_errors` is set.
pub async fn run_commit_like_command(
    repo: &RepoState,
    host: &Host,
    args: Vec<String>,
    options: &CommitEditorOptions,
) -> Result<()> {
    let editor = editor_command()?;
    run_with_editor(repo, host, args, options, &editor).await
}

/// [`run_commit_like_command`] with an explicit editor command.
pub async fn run_with_editor(
    repo: &RepoState,
    host: &Host,
    args: Vec<String>,
    options: &CommitEditorOptions,
    editor: &str,
) -> Result<()> {
    tracing::debug!(args = ?args, "commit orchestration started");
    let instruction = show_until_disposed(host.status.as_ref(), INSTRUCTION_MESSAGE);

    let preview_task = async {
        if !options.show_staged_changes {
            return None;
        }
        match host
            .preview
            .open(&repo.root, PreviewKind::StagedChanges, true)
            .await
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "could not open staged changes preview");
                None
            }
        }
    };

    let run_options = RunOptions::default()
        .with_env(&options.editor_env_var, editor)
        .interactive();
    let process_task = host.runner.run(&repo.root, &args, run_options);

    // Gives git time to open the message buffer; independent of git settling.
    let refresh_task = async {
        if !options.update_post_commit_task {
            return;
        }
        tokio::time::sleep(host.settings.refresh_delay).await;
        if let Err(e) = host.refresher.refresh(&repo.root).await {
            tracing::debug!(error = %e, "post-commit refresh failed, ignoring");
        }
    };

    let (preview, outcome, ()) = tokio::join!(preview_task, process_task, refresh_task);

    drop(instruction);
    match &outcome {
        Ok(output) => host.notify(&format!("Git finished: {}", collapse_output(&output.stdout))),
        Err(e) => {
            if e.is_process_failure() {
                tracing::info!(error = %e, "commit did not complete");
            } else {
                tracing::warn!(error = %e, "commit could not be run");
            }
            host.notify(CANCELED_MESSAGE);
        }
    }

    if let Some(handle) = preview {
        close_preview(host, handle).await;
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(e) if options.propagate_errors => Err(e),
        Err(_) => Ok(()),
    }
}

/// Close every pane showing the preview document, moving focus away and back
/// so the user lands where they were. Takes the handle so it is closed once.
async fn close_preview(host: &Host, handle: PreviewHandle) {
    let bindings = match host.preview.locate(&handle).await {
        Ok(bindings) => bindings,
        Err(e) => {
            tracing::warn!(error = %e, "could not locate preview");
            return;
        }
    };
    if bindings.is_empty() {
        return;
    }

    if let Err(e) = host.preview.focus_opposite().await {
        tracing::debug!(error = %e, "focus change failed");
    }
    for binding in bindings {
        if let Err(e) = host.preview.close(binding).await {
            tracing::warn!(error = %e, "could not close preview");
        }
    }
    if let Err(e) = host.preview.focus_opposite().await {
        tracing::debug!(error = %e, "focus change failed");
    }
}
