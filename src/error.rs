use thiserror::Error;

/// Errors surfaced by menus, actions and the commit orchestrator.
///
/// Dismissed choosers and missing tracking configuration are not errors: they
/// show up as `Ok(None)` from the host and end the action silently.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The external git process exited non-zero or could not be spawned.
    #[error("git {} failed{}: {}", .command, exit_suffix(.code), .stderr)]
    Process {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A required interactive choice produced nothing.
    #[error("no target chosen: {0}")]
    NoTargetChosen(String),

    #[error("HEAD is detached, this action needs a branch")]
    DetachedHead,

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("configuration error: {0}")]
    Config(String),
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with exit code {c}")).unwrap_or_default()
}

impl MenuError {
    pub fn is_process_failure(&self) -> bool {
        matches!(self, MenuError::Process { .. })
    }
}

impl From<inquire::InquireError> for MenuError {
    fn from(err: inquire::InquireError) -> Self {
        MenuError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
