//! In-terminal commit message editor. Git runs it through `GIT_EDITOR` with
//! the message file as the last argument and waits for it to exit; a non-zero
//! exit makes git abort the commit.

use inquire::{InquireError, Text};
use std::fs;
use std::path::Path;

use crate::error::Result;

const COMMENT_CHAR: char = '#';
const SCISSORS: &str = "------------------------ >8 ------------------------";
/// Typed into the body prompt to start a new line.
const LINE_BREAK: &str = "\\n";

/// A message file split into the message itself and git's comment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTemplate {
    pub summary: String,
    pub body: String,
    pub comments: Vec<String>,
}

pub fn parse_template(contents: &str) -> MessageTemplate {
    let mut message = Vec::new();
    let mut comments = Vec::new();
    let mut lines = contents.lines();
    while let Some(line) = lines.next() {
        // `commit --verbose` appends the diff below a scissors line.
        if line.starts_with(COMMENT_CHAR) && line.contains(SCISSORS) {
            comments.push(line.to_string());
            comments.extend(lines.by_ref().map(|l| l.to_string()));
            break;
        }
        if line.starts_with(COMMENT_CHAR) {
            comments.push(line.to_string());
        } else {
            message.push(line.trim_end());
        }
    }

    let mut lines = message.into_iter().skip_while(|l| l.is_empty());
    let summary = lines.next().unwrap_or("").to_string();
    let body = lines
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string();

    MessageTemplate {
        summary,
        body,
        comments,
    }
}

pub fn render_message(summary: &str, body: &str, comments: &[String]) -> String {
    let mut out = format!("{}\n", summary.trim());
    let body = body.trim();
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }
    if !comments.is_empty() {
        out.push('\n');
        for comment in comments {
            out.push_str(comment);
            out.push('\n');
        }
    }
    out
}

/// Backslashes are doubled first so a literal `\n` in an existing body
/// survives being prefilled and accepted unchanged.
fn escape_body(body: &str) -> String {
    body.replace('\\', "\\\\").replace('\n', LINE_BREAK)
}

fn unescape_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            // Anything else the user typed is kept as is.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Prompt for a commit message and write it to `path`.
/// Returns `false` when the user cancelled or left the summary empty.
pub fn compose_message(path: &Path) -> Result<bool> {
    let contents = fs::read_to_string(path)?;
    let template = parse_template(&contents);

    for comment in &template.comments {
        eprintln!("{}", comment);
    }

    let summary = match Text::new("Summary:")
        .with_initial_value(&template.summary)
        .with_help_message("enter to confirm, esc to cancel the commit")
        .prompt()
    {
        Ok(summary) => summary,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };
    if summary.trim().is_empty() {
        return Ok(false);
    }

    let escaped = escape_body(&template.body);
    let body = match Text::new("Body (optional):")
        .with_initial_value(&escaped)
        .with_help_message("type \\n for a new line, \\\\ for a backslash")
        .prompt()
    {
        Ok(body) => unescape_body(&body),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    fs::write(path, render_message(&summary, &body, &template.comments))?;
    tracing::debug!(path = %path.display(), "commit message written");
    Ok(true)
}
