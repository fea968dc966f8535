//! Capabilities the menus need from whatever is hosting them, plus the
//! terminal implementations used by the binary.

use async_trait::async_trait;
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{AppConfig, ConfigStore, GitConfigStore};
use crate::error::Result;
use crate::menu::MenuEntry;
use crate::process::{GitProcess, GitRunner, RunOptions};
use crate::refs::PickItem;
use crate::switches::Switch;

/// Lists, free-text prompts and menus. `Ok(None)` means the user dismissed it.
#[async_trait]
pub trait Chooser: Send + Sync {
    async fn pick(&self, prompt: &str, items: &[PickItem]) -> Result<Option<String>>;

    async fn input(&self, prompt: &str) -> Result<Option<String>>;

    /// Present a menu. Switches are toggled in place; returns the chosen action label.
    async fn menu(
        &self,
        title: &str,
        switches: &mut [Switch],
        entries: &[MenuEntry],
    ) -> Result<Option<char>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    StagedChanges,
}

/// Owned handle to an open preview. Not `Clone`: whoever holds it closes it.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: u64,
    /// Identifier of the underlying document, shared by every pane showing it.
    pub document: String,
}

/// A pane currently displaying a preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBinding {
    pub document: String,
    pub pane: usize,
}

#[async_trait]
pub trait PreviewSurface: Send + Sync {
    async fn open(&self, repo: &Path, kind: PreviewKind, read_only: bool) -> Result<PreviewHandle>;

    async fn locate(&self, handle: &PreviewHandle) -> Result<Vec<PreviewBinding>>;

    async fn focus_opposite(&self) -> Result<()>;

    async fn close(&self, binding: PreviewBinding) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDuration {
    For(Duration),
    UntilDisposed,
}

pub type MessageId = u64;

pub trait StatusBar: Send + Sync {
    fn show(&self, text: &str, duration: StatusDuration) -> MessageId;

    fn dispose(&self, id: MessageId);
}

/// A status message that is disposed when dropped.
pub struct StatusMessage<'a> {
    bar: &'a dyn StatusBar,
    id: MessageId,
}

impl StatusMessage<'_> {
    pub fn id(&self) -> MessageId {
        self.id
    }
}

impl Drop for StatusMessage<'_> {
    fn drop(&mut self) {
        self.bar.dispose(self.id);
    }
}

/// Show a message that stays until the returned guard is dropped.
pub fn show_until_disposed<'a>(bar: &'a dyn StatusBar, text: &str) -> StatusMessage<'a> {
    let id = bar.show(text, StatusDuration::UntilDisposed);
    StatusMessage { bar, id }
}

/// The single explicit "refresh repository state" trigger.
#[async_trait]
pub trait StateRefresher: Send + Sync {
    async fn refresh(&self, repo: &Path) -> Result<()>;
}

/// Every collaborator a menu action may reach for.
#[derive(Clone)]
pub struct Host {
    pub runner: Arc<dyn GitRunner>,
    pub config: Arc<dyn ConfigStore>,
    pub chooser: Arc<dyn Chooser>,
    pub preview: Arc<dyn PreviewSurface>,
    pub status: Arc<dyn StatusBar>,
    pub refresher: Arc<dyn StateRefresher>,
    pub settings: AppConfig,
}

impl Host {
    /// Host backed by the real `git` binary and the current terminal.
    pub fn terminal(settings: AppConfig) -> Self {
        let runner: Arc<dyn GitRunner> = Arc::new(GitProcess::new());
        Self {
            runner: runner.clone(),
            config: Arc::new(GitConfigStore),
            chooser: Arc::new(TerminalChooser),
            preview: Arc::new(TerminalPreview::new(runner.clone())),
            status: Arc::new(TerminalStatusBar::new(settings.status_duration)),
            refresher: Arc::new(IndexRefresher::new(runner)),
            settings,
        }
    }

    /// Show a transient status message with the configured duration.
    pub fn notify(&self, text: &str) {
        self.status
            .show(text, StatusDuration::For(self.settings.status_duration));
    }
}

/// Map prompt dismissal to `None`.
fn cancellable<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            tracing::debug!("prompt dismissed");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

struct PickOption<'a>(&'a PickItem);

impl fmt::Display for PickOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.description.is_empty() {
            write!(f, "{}", self.0.label)
        } else {
            write!(f, "{:<24} {}", self.0.label, self.0.description)
        }
    }
}

enum MenuOption {
    Switch { index: usize, text: String },
    Action { label: char, text: String },
}

impl fmt::Display for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuOption::Switch { text, .. } | MenuOption::Action { text, .. } => f.write_str(text),
        }
    }
}

fn menu_options(switches: &[Switch], entries: &[MenuEntry]) -> Vec<MenuOption> {
    let switch_rows = switches.iter().enumerate().map(|(index, switch)| {
        let mark = if switch.enabled { "x" } else { " " };
        MenuOption::Switch {
            index,
            text: format!(
                "[{}] {} {} ({})",
                mark,
                switch.short_form,
                switch.description,
                switch.token()
            ),
        }
    });
    let action_rows = entries.iter().map(|entry| MenuOption::Action {
        label: entry.label,
        text: format!("{}  {}", entry.label, entry.description),
    });
    switch_rows.chain(action_rows).collect()
}

/// [`Chooser`] that prompts on the terminal with inquire.
#[derive(Debug, Clone, Default)]
pub struct TerminalChooser;

#[async_trait]
impl Chooser for TerminalChooser {
    async fn pick(&self, prompt: &str, items: &[PickItem]) -> Result<Option<String>> {
        if items.is_empty() {
            return Ok(None);
        }
        let options: Vec<PickOption> = items.iter().map(PickOption).collect();
        let chosen = cancellable(Select::new(prompt, options).prompt())?;
        Ok(chosen.map(|option| option.0.value.clone()))
    }

    async fn input(&self, prompt: &str) -> Result<Option<String>> {
        cancellable(Text::new(prompt).prompt())
    }

    async fn menu(
        &self,
        title: &str,
        switches: &mut [Switch],
        entries: &[MenuEntry],
    ) -> Result<Option<char>> {
        let mut cursor = switches.len();
        loop {
            let options = menu_options(switches, entries);
            let chosen = cancellable(
                Select::new(title, options)
                    .with_starting_cursor(cursor)
                    .with_help_message("enter toggles a switch or runs an action, esc to quit")
                    .prompt(),
            )?;
            match chosen {
                None => return Ok(None),
                Some(MenuOption::Action { label, .. }) => return Ok(Some(label)),
                Some(MenuOption::Switch { index, .. }) => {
                    switches[index].toggle();
                    cursor = index;
                }
            }
        }
    }
}

/// Preview that prints the staged diffstat to stderr and tracks which
/// documents are considered visible.
pub struct TerminalPreview {
    runner: Arc<dyn GitRunner>,
    next_id: AtomicU64,
    visible: Mutex<Vec<PreviewBinding>>,
}

impl TerminalPreview {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self {
            runner,
            next_id: AtomicU64::new(1),
            visible: Mutex::new(Vec::new()),
        }
    }

    fn visible(&self) -> std::sync::MutexGuard<'_, Vec<PreviewBinding>> {
        self.visible.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PreviewSurface for TerminalPreview {
    async fn open(&self, repo: &Path, kind: PreviewKind, read_only: bool) -> Result<PreviewHandle> {
        let PreviewKind::StagedChanges = kind;
        let args = vec![
            "diff".to_string(),
            "--cached".to_string(),
            "--stat".to_string(),
            "--color=always".to_string(),
        ];
        let output = self.runner.run(repo, &args, RunOptions::default()).await?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let document = format!("menugit:staged/{}", repo.display());
        eprintln!(
            "Staged changes{}:\n{}",
            if read_only { " (read-only)" } else { "" },
            output.stdout.trim_end()
        );

        self.visible().push(PreviewBinding {
            document: document.clone(),
            pane: 1,
        });
        Ok(PreviewHandle { id, document })
    }

    async fn locate(&self, handle: &PreviewHandle) -> Result<Vec<PreviewBinding>> {
        Ok(self
            .visible()
            .iter()
            .filter(|binding| binding.document == handle.document)
            .cloned()
            .collect())
    }

    async fn focus_opposite(&self) -> Result<()> {
        tracing::debug!("focus moved to opposite pane");
        Ok(())
    }

    async fn close(&self, binding: PreviewBinding) -> Result<()> {
        let mut visible = self.visible();
        if let Some(pos) = visible.iter().position(|b| *b == binding) {
            visible.remove(pos);
        }
        tracing::debug!(document = %binding.document, "preview closed");
        Ok(())
    }
}

/// Status bar that writes to stderr. Terminal output cannot be retracted,
/// so disposal only records the message as gone.
pub struct TerminalStatusBar {
    default_duration: Duration,
    next_id: AtomicU64,
}

impl TerminalStatusBar {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            next_id: AtomicU64::new(1),
        }
    }
}

impl StatusBar for TerminalStatusBar {
    fn show(&self, text: &str, duration: StatusDuration) -> MessageId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let shown_for = match duration {
            StatusDuration::For(d) => d,
            StatusDuration::UntilDisposed => self.default_duration,
        };
        tracing::debug!(id, ?shown_for, "status message");
        eprintln!("» {}", text);
        id
    }

    fn dispose(&self, id: MessageId) {
        tracing::debug!(id, "status message disposed");
    }
}

/// Refreshes the index stat cache so a following status read is accurate.
pub struct IndexRefresher {
    runner: Arc<dyn GitRunner>,
}

impl IndexRefresher {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl StateRefresher for IndexRefresher {
    async fn refresh(&self, repo: &Path) -> Result<()> {
        let args = vec![
            "update-index".to_string(),
            "-q".to_string(),
            "--refresh".to_string(),
        ];
        self.runner.run(repo, &args, RunOptions::default()).await?;
        Ok(())
    }
}
