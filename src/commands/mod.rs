pub mod commit;
pub mod fetch;
pub mod push;

use crate::error::Result;
use crate::menu::MenuContext;
use crate::refs::PickItem;

/// Run git for a non-commit action and report success on the status bar.
/// Process failures propagate to the caller unchanged.
pub(crate) async fn run_and_report(ctx: &MenuContext<'_>, args: Vec<String>, done: &str) -> Result<()> {
    ctx.run_git(&args).await?;
    ctx.host.notify(done);
    Ok(())
}

/// Pick from `items`; `None` when dismissed or when there is nothing to pick.
pub(crate) async fn choose(ctx: &MenuContext<'_>, prompt: &str, items: &[PickItem]) -> Result<Option<String>> {
    if items.is_empty() {
        tracing::debug!(prompt, "nothing to choose from");
        return Ok(None);
    }
    ctx.host.chooser.pick(prompt, items).await
}

/// Free-text prompt where an empty answer counts as dismissal.
pub(crate) async fn ask(ctx: &MenuContext<'_>, prompt: &str) -> Result<Option<String>> {
    let answer = ctx.host.chooser.input(prompt).await?;
    Ok(answer
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}
