use async_trait::async_trait;

use crate::error::Result;
use crate::host::Host;
use crate::process::{ProcessOutput, RunOptions};
use crate::repository::RepoState;
use crate::switches::{compile_switches, Switch};

/// What the chooser displays for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: char,
    pub description: String,
}

/// A labeled action offered by a menu.
#[derive(Debug, Clone)]
pub struct MenuAction<A> {
    pub label: char,
    pub description: String,
    pub action: A,
}

/// An action that can be invoked from a menu with a bound context.
#[async_trait]
pub trait MenuCommand: Send + Sync {
    async fn invoke(&self, ctx: &mut MenuContext<'_>) -> Result<()>;
}

/// Context handed to the chosen action.
pub struct MenuContext<'a> {
    /// Shared with the caller; actions may update tracking state in place.
    pub repo: &'a mut RepoState,
    /// Switches as toggled during this presentation.
    pub switches: Vec<Switch>,
    pub host: &'a Host,
}

impl MenuContext<'_> {
    pub fn compiled_switches(&self) -> Vec<String> {
        compile_switches(&self.switches)
    }

    /// `keyword` + enabled switches + `positional`.
    pub fn command_args(&self, keyword: &str, positional: &[&str]) -> Vec<String> {
        let mut args = vec![keyword.to_string()];
        args.extend(self.compiled_switches());
        args.extend(positional.iter().map(|arg| arg.to_string()));
        args
    }

    /// Run git in the repository; failures propagate unchanged.
    pub async fn run_git(&self, args: &[String]) -> Result<ProcessOutput> {
        self.host
            .runner
            .run(&self.repo.root, args, RunOptions::default())
            .await
    }
}

/// A named, ordered set of actions plus the switches offered alongside them.
#[derive(Debug, Clone)]
pub struct Menu<A> {
    pub title: String,
    pub switches: Vec<Switch>,
    actions: Vec<MenuAction<A>>,
}

impl<A> Menu<A> {
    pub fn new(title: &str, switches: Vec<Switch>) -> Self {
        Self {
            title: title.to_string(),
            switches,
            actions: Vec::new(),
        }
    }

    /// Append an action. Labels must be unique within a menu.
    pub fn action(mut self, label: char, description: &str, action: A) -> Self {
        debug_assert!(
            self.find(label).is_none(),
            "duplicate menu label '{}'",
            label
        );
        self.actions.push(MenuAction {
            label,
            description: description.to_string(),
            action,
        });
        self
    }

    pub fn labels(&self) -> Vec<char> {
        self.actions.iter().map(|a| a.label).collect()
    }

    pub fn find(&self, label: char) -> Option<&MenuAction<A>> {
        self.actions.iter().find(|a| a.label == label)
    }

    pub fn entries(&self) -> Vec<MenuEntry> {
        self.actions
            .iter()
            .map(|a| MenuEntry {
                label: a.label,
                description: a.description.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Invoked(char),
    Dismissed,
}

/// Present `menu`, then invoke the chosen action once with the toggled switches.
pub async fn show_menu<A: MenuCommand>(
    menu: Menu<A>,
    repo: &mut RepoState,
    host: &Host,
) -> Result<MenuOutcome> {
    let entries = menu.entries();
    let Menu {
        title,
        mut switches,
        actions,
    } = menu;

    let Some(label) = host.chooser.menu(&title, &mut switches, &entries).await? else {
        tracing::debug!(menu = %title, "menu dismissed");
        return Ok(MenuOutcome::Dismissed);
    };

    let Some(chosen) = actions.into_iter().find(|a| a.label == label) else {
        tracing::warn!(menu = %title, %label, "no action bound to label");
        return Ok(MenuOutcome::Dismissed);
    };

    tracing::info!(menu = %title, %label, action = %chosen.description, "invoking menu action");
    let mut ctx = MenuContext {
        repo,
        switches,
        host,
    };
    chosen.action.invoke(&mut ctx).await?;
    Ok(MenuOutcome::Invoked(label))
}
