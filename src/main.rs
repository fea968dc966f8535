use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use menugit::cli::{Cli, Commands};
use menugit::commands::{commit, fetch, push};
use menugit::config::AppConfig;
use menugit::error::Result;
use menugit::git_ops::load_repo_state;
use menugit::host::Host;
use menugit::menu::show_menu;
use menugit::{editor, repository::RepoState};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MENUGIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(path: &Path) -> Result<(RepoState, AppConfig)> {
    let state = load_repo_state(path)?;
    let settings = AppConfig::load(&state.root)?;
    Ok((state, settings))
}

async fn handle_fetch(path: &Path) -> Result<()> {
    let (mut state, settings) = open(path)?;
    let host = Host::terminal(settings);
    show_menu(fetch::fetch_menu(&state), &mut state, &host).await?;
    Ok(())
}

async fn handle_push(path: &Path) -> Result<()> {
    let (mut state, settings) = open(path)?;
    let host = Host::terminal(settings);
    show_menu(push::push_menu(&state), &mut state, &host).await?;
    Ok(())
}

async fn handle_commit(path: &Path, no_preview: bool, propagate_errors: bool) -> Result<()> {
    let (mut state, mut settings) = open(path)?;
    if no_preview {
        settings.show_staged_changes = false;
    }
    if propagate_errors {
        settings.propagate_errors = true;
    }
    let host = Host::terminal(settings);
    show_menu(commit::commit_menu(), &mut state, &host).await?;
    Ok(())
}

fn handle_edit(file: &Path, wait: bool) -> Result<()> {
    tracing::debug!(file = %file.display(), wait, "composing commit message");
    if !editor::compose_message(file)? {
        eprintln!("Aborting commit.");
        std::process::exit(1);
    }
    Ok(())
}

fn handle_state(path: &Path, json: bool) -> Result<()> {
    let state = load_repo_state(path)?;
    if json {
        let out = serde_json::to_string_pretty(&state)
            .map_err(|e| menugit::error::MenuError::Config(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("Head:     {}", state.head.name.as_deref().unwrap_or("(detached)"));
    if let Some(upstream) = &state.head.upstream {
        println!("Upstream: {}/{}", upstream.remote, upstream.name);
    }
    if let Some(push_remote) = &state.head.push_remote {
        println!("Push:     {}/{}", push_remote.remote, push_remote.name);
    }
    for remote in &state.remotes {
        println!("Remote:   {} {}", remote.name, remote.push_url.as_deref().unwrap_or(""));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Fetch => handle_fetch(&cli.path).await,
        Commands::Push => handle_push(&cli.path).await,
        Commands::Commit { no_preview, propagate_errors } => {
            handle_commit(&cli.path, *no_preview, *propagate_errors).await
        }
        Commands::Edit { wait, file } => handle_edit(file, *wait),
        Commands::State { json } => handle_state(&cli.path, *json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
