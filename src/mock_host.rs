use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{AppConfig, ConfigStore};
use crate::error::{MenuError, Result};
use crate::host::{
    Chooser, Host, MessageId, PreviewBinding, PreviewHandle, PreviewKind, PreviewSurface,
    StateRefresher, StatusBar, StatusDuration,
};
use crate::menu::MenuEntry;
use crate::process::{GitRunner, ProcessOutput, RunOptions};
use crate::refs::PickItem;
use crate::switches::Switch;

/// Ordered record of what the mocks saw, shared between them.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == event)
    }
}

/// A git invocation captured by [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub args: Vec<String>,
    pub options: RunOptions,
}

/// Git runner that records invocations instead of spawning processes.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    calls: Arc<Mutex<Vec<RecordedRun>>>,
    /// Subcommands (first argument) that fail.
    failing: Arc<Mutex<Vec<String>>>,
    stdout: Arc<Mutex<String>>,
    delay: Arc<Mutex<Duration>>,
    log: EventLog,
}

impl MockRunner {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn fail_on(&self, subcommand: &str) {
        self.failing.lock().unwrap().push(subcommand.to_string());
    }

    pub fn set_stdout(&self, stdout: &str) {
        *self.stdout.lock().unwrap() = stdout.to_string();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> Vec<RecordedRun> {
        self.calls.lock().unwrap().clone()
    }

    /// Argument vectors of every call, joined with spaces.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.args.join(" ")).collect()
    }
}

#[async_trait]
impl GitRunner for MockRunner {
    async fn run(&self, _repo: &Path, args: &[String], options: RunOptions) -> Result<ProcessOutput> {
        let command_line = args.join(" ");
        self.calls.lock().unwrap().push(RecordedRun {
            args: args.to_vec(),
            options,
        });
        self.log.push(format!("process:start {}", command_line));

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fails = args
            .first()
            .is_some_and(|sub| self.failing.lock().unwrap().contains(sub));
        self.log.push(format!("process:end {}", command_line));

        if fails {
            return Err(MenuError::Process {
                command: command_line,
                code: Some(1),
                stderr: "mock failure".to_string(),
            });
        }
        Ok(ProcessOutput {
            stdout: self.stdout.lock().unwrap().clone(),
            stderr: String::new(),
        })
    }
}

/// Configuration store that keeps writes in memory.
#[derive(Debug, Clone, Default)]
pub struct MockConfigStore {
    writes: Arc<Mutex<Vec<(String, String)>>>,
    values: Arc<Mutex<HashMap<String, String>>>,
    fail: Arc<Mutex<bool>>,
    failing_keys: Arc<Mutex<Vec<String>>>,
    log: EventLog,
}

impl MockConfigStore {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn fail_writes(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Refuse writes to `key` only.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.lock().unwrap().push(key.to_string());
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// Current value of `key`, taking removals into account.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn set_config(&self, _repo: &Path, key: &str, value: &str) -> Result<()> {
        let refused = *self.fail.lock().unwrap()
            || self.failing_keys.lock().unwrap().iter().any(|k| k == key);
        if refused {
            return Err(MenuError::Config(format!("mock refused {}", key)));
        }
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.log.push(format!("config {}={}", key, value));
        Ok(())
    }

    async fn unset_config(&self, _repo: &Path, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        self.log.push(format!("config unset {}", key));
        Ok(())
    }
}

/// Scripted chooser: answers come from queues filled by the test.
#[derive(Debug, Clone, Default)]
pub struct MockChooser {
    menu_choice: Arc<Mutex<Option<char>>>,
    toggles: Arc<Mutex<Vec<char>>>,
    picks: Arc<Mutex<VecDeque<Option<String>>>>,
    inputs: Arc<Mutex<VecDeque<Option<String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    offered: Arc<Mutex<Vec<Vec<PickItem>>>>,
    menus: Arc<Mutex<Vec<Vec<MenuEntry>>>>,
}

impl MockChooser {
    /// Label chosen from the next menu; `None` dismisses it.
    pub fn choose_label(&self, label: Option<char>) {
        *self.menu_choice.lock().unwrap() = label;
    }

    /// Switch keys to toggle before choosing the menu action.
    pub fn toggle_switches(&self, keys: &[char]) {
        self.toggles.lock().unwrap().extend_from_slice(keys);
    }

    pub fn queue_pick(&self, value: Option<&str>) {
        self.picks
            .lock()
            .unwrap()
            .push_back(value.map(|v| v.to_string()));
    }

    pub fn queue_input(&self, value: Option<&str>) {
        self.inputs
            .lock()
            .unwrap()
            .push_back(value.map(|v| v.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Item lists offered to `pick`, in call order.
    pub fn offered(&self) -> Vec<Vec<PickItem>> {
        self.offered.lock().unwrap().clone()
    }

    pub fn menus(&self) -> Vec<Vec<MenuEntry>> {
        self.menus.lock().unwrap().clone()
    }
}

#[async_trait]
impl Chooser for MockChooser {
    async fn pick(&self, prompt: &str, items: &[PickItem]) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.offered.lock().unwrap().push(items.to_vec());
        Ok(self.picks.lock().unwrap().pop_front().flatten())
    }

    async fn input(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.inputs.lock().unwrap().pop_front().flatten())
    }

    async fn menu(
        &self,
        title: &str,
        switches: &mut [Switch],
        entries: &[MenuEntry],
    ) -> Result<Option<char>> {
        self.prompts.lock().unwrap().push(title.to_string());
        self.menus.lock().unwrap().push(entries.to_vec());
        for key in self.toggles.lock().unwrap().drain(..) {
            if let Some(switch) = switches.iter_mut().find(|s| s.key() == key) {
                switch.toggle();
            }
        }
        Ok(*self.menu_choice.lock().unwrap())
    }
}

/// Preview surface that tracks handles and counts closes per document.
#[derive(Debug, Clone, Default)]
pub struct MockPreview {
    next_id: Arc<Mutex<u64>>,
    visible: Arc<Mutex<Vec<PreviewBinding>>>,
    closes: Arc<Mutex<HashMap<String, usize>>>,
    opened: Arc<Mutex<Vec<String>>>,
    open_delay: Arc<Mutex<Duration>>,
    fail_open: Arc<Mutex<bool>>,
    log: EventLog,
}

impl MockPreview {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn set_open_delay(&self, delay: Duration) {
        *self.open_delay.lock().unwrap() = delay;
    }

    pub fn fail_open(&self) {
        *self.fail_open.lock().unwrap() = true;
    }

    /// Documents opened so far.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn close_count(&self, document: &str) -> usize {
        self.closes.lock().unwrap().get(document).copied().unwrap_or(0)
    }

    pub fn visible(&self) -> Vec<PreviewBinding> {
        self.visible.lock().unwrap().clone()
    }
}

#[async_trait]
impl PreviewSurface for MockPreview {
    async fn open(&self, _repo: &Path, kind: PreviewKind, read_only: bool) -> Result<PreviewHandle> {
        self.log.push("preview:open:start");
        let delay = *self.open_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_open.lock().unwrap() {
            self.log.push("preview:open:failed");
            return Err(MenuError::Io(std::io::Error::other("mock preview failure")));
        }

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let document = format!("mock:{:?}:{}:{}", kind, if read_only { "ro" } else { "rw" }, id);
        self.opened.lock().unwrap().push(document.clone());
        self.visible.lock().unwrap().push(PreviewBinding {
            document: document.clone(),
            pane: 1,
        });
        self.log.push("preview:open:end");
        Ok(PreviewHandle { id, document })
    }

    async fn locate(&self, handle: &PreviewHandle) -> Result<Vec<PreviewBinding>> {
        Ok(self
            .visible
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.document == handle.document)
            .cloned()
            .collect())
    }

    async fn focus_opposite(&self) -> Result<()> {
        self.log.push("preview:focus");
        Ok(())
    }

    async fn close(&self, binding: PreviewBinding) -> Result<()> {
        self.visible.lock().unwrap().retain(|b| *b != binding);
        *self
            .closes
            .lock()
            .unwrap()
            .entry(binding.document.clone())
            .or_insert(0) += 1;
        self.log.push("preview:close");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownMessage {
    pub id: MessageId,
    pub text: String,
    pub duration: StatusDuration,
}

/// Status bar that records shown and disposed messages.
#[derive(Debug, Clone, Default)]
pub struct MockStatusBar {
    shown: Arc<Mutex<Vec<ShownMessage>>>,
    disposed: Arc<Mutex<Vec<MessageId>>>,
    log: EventLog,
}

impl MockStatusBar {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn shown(&self) -> Vec<ShownMessage> {
        self.shown.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.shown().into_iter().map(|m| m.text).collect()
    }

    pub fn disposed(&self) -> Vec<MessageId> {
        self.disposed.lock().unwrap().clone()
    }
}

impl StatusBar for MockStatusBar {
    fn show(&self, text: &str, duration: StatusDuration) -> MessageId {
        let mut shown = self.shown.lock().unwrap();
        let id = shown.len() as MessageId + 1;
        shown.push(ShownMessage {
            id,
            text: text.to_string(),
            duration,
        });
        self.log.push(format!("status:{}", text));
        id
    }

    fn dispose(&self, id: MessageId) {
        self.disposed.lock().unwrap().push(id);
        self.log.push(format!("status:dispose:{}", id));
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockRefresher {
    count: Arc<Mutex<usize>>,
    fail: Arc<Mutex<bool>>,
    log: EventLog,
}

impl MockRefresher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn fail_refresh(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn count(&self) -> usize {
        *self.count.lock().unwrap()
    }
}

#[async_trait]
impl StateRefresher for MockRefresher {
    async fn refresh(&self, _repo: &Path) -> Result<()> {
        *self.count.lock().unwrap() += 1;
        self.log.push("refresh");
        if *self.fail.lock().unwrap() {
            return Err(MenuError::Io(std::io::Error::other("mock refresh failure")));
        }
        Ok(())
    }
}

/// All mocks wired to one event log, convertible into a [`Host`].
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    pub runner: MockRunner,
    pub config: MockConfigStore,
    pub chooser: MockChooser,
    pub preview: MockPreview,
    pub status: MockStatusBar,
    pub refresher: MockRefresher,
    pub log: EventLog,
}

impl MockHost {
    pub fn new() -> Self {
        let log = EventLog::default();
        Self {
            runner: MockRunner::new(log.clone()),
            config: MockConfigStore::new(log.clone()),
            chooser: MockChooser::default(),
            preview: MockPreview::new(log.clone()),
            status: MockStatusBar::new(log.clone()),
            refresher: MockRefresher::new(log.clone()),
            log,
        }
    }

    /// Host with default settings and a short refresh delay.
    pub fn host(&self) -> Host {
        self.host_with(AppConfig {
            refresh_delay: Duration::from_millis(5),
            ..AppConfig::default()
        })
    }

    pub fn host_with(&self, settings: AppConfig) -> Host {
        Host {
            runner: Arc::new(self.runner.clone()),
            config: Arc::new(self.config.clone()),
            chooser: Arc::new(self.chooser.clone()),
            preview: Arc::new(self.preview.clone()),
            status: Arc::new(self.status.clone()),
            refresher: Arc::new(self.refresher.clone()),
            settings,
        }
    }
}
