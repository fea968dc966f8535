use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;

use crate::error::{MenuError, Result};

/// Extra settings for one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Variables added to the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Hand the terminal to the process (stdin and stderr inherited) so that
    /// an editor launched by git can talk to the user.
    pub interactive: bool,
}

impl RunOptions {
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env.insert(name.to_string(), value.to_string());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs git in a repository. Fails with [`MenuError::Process`] on non-zero exit.
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, repo: &Path, args: &[String], options: RunOptions) -> Result<ProcessOutput>;
}

/// [`GitRunner`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitProcess {
    program: String,
}

impl GitProcess {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    #[cfg(test)]
    fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for GitProcess {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitRunner for GitProcess {
    async fn run(&self, repo: &Path, args: &[String], options: RunOptions) -> Result<ProcessOutput> {
        let command_line = args.join(" ");
        tracing::debug!(
            repo = %repo.display(),
            args = %command_line,
            env = ?options.env.keys().collect::<Vec<_>>(),
            interactive = options.interactive,
            "running git"
        );

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args).current_dir(repo).envs(&options.env);
        if options.interactive {
            cmd.stdin(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null()).stderr(Stdio::piped());
        }
        cmd.stdout(Stdio::piped());

        let output = cmd.output().await.map_err(|e| MenuError::Process {
            command: command_line.clone(),
            code: None,
            stderr: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(code = ?output.status.code(), "git exited unsuccessfully");
            return Err(MenuError::Process {
                command: command_line,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(ProcessOutput { stdout, stderr })
    }
}

/// Collapse multi-line process output into one status-bar line.
pub fn collapse_output(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
