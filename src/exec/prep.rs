// src/exec/prep.rs

//! Prep commands: short-lived commands run to completion before a block's
//! daemons are (re)started.
//!
//! Two placeholders are expanded before a command runs:
//! - `@mods`: the shell-quoted paths that changed (deleted paths excluded),
//! - `@dirmods`: the unique parent directories of those paths.
//!
//! On the initial, unconditional run the path list is every file currently
//! matching the block's patterns.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Block;
use crate::exec::shell::{forward_lines, shell_command};
use crate::filter::{find, ROOT};
use crate::watch::Mod;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(dir)?mods\b").expect("placeholder regex is valid"));

/// Why a prep command did not succeed.
///
/// Only [`PrepError::CommandFailed`] means the user's command ran and
/// reported failure; it is what rings the bell and raises a notification.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("prep command `{command}` failed{}", exit_suffix(.code))]
    CommandFailed {
        command: String,
        /// Captured stdout followed by stderr.
        output: String,
        code: Option<i32>,
    },

    #[error("could not run prep command `{command}`: {source}")]
    Setup {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl PrepError {
    pub fn command(&self) -> &str {
        match self {
            PrepError::CommandFailed { command, .. } | PrepError::Setup { command, .. } => command,
        }
    }

    pub fn is_command_failure(&self) -> bool {
        matches!(self, PrepError::CommandFailed { .. })
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {code})"),
        None => " (killed by signal)".to_string(),
    }
}

/// Which changes a prep run is scoped to.
#[derive(Debug, Clone, Copy)]
pub enum PrepScope<'a> {
    /// No change set: the unconditional startup run.
    Everything,
    /// The block's filtered share of a change batch.
    Changes(&'a Mod),
}

/// Run every prep command of `block` in order, stopping at the first
/// failure.
pub async fn run_preps(block: &Block, scope: PrepScope<'_>) -> Result<(), PrepError> {
    if block.prep.is_empty() {
        return Ok(());
    }

    let needs_paths = block.prep.iter().any(|c| PLACEHOLDER.is_match(c));
    let paths = if needs_paths {
        scope_paths(block, scope)?
    } else {
        Vec::new()
    };

    for command in &block.prep {
        let expanded = expand_placeholders(command, &paths);
        run_prep(&block.label(), &expanded, block).await?;
    }
    Ok(())
}

fn scope_paths(block: &Block, scope: PrepScope<'_>) -> Result<Vec<String>, PrepError> {
    match scope {
        PrepScope::Changes(batch) => Ok(batch.existing_paths()),
        PrepScope::Everything => {
            let found = find(ROOT, &block.include, &block.exclude).map_err(|e| {
                PrepError::Setup {
                    command: block.prep.join("; "),
                    source: std::io::Error::other(format!("{e:#}")),
                }
            })?;
            if let Some(err) = &found.error {
                warn!(block = %block.label(), error = %err, "pattern error while listing files");
            }
            Ok(found.matched)
        }
    }
}

/// Substitute `@mods` and `@dirmods` in `command`.
pub fn expand_placeholders(command: &str, paths: &[String]) -> String {
    PLACEHOLDER
        .replace_all(command, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                let dirs: BTreeSet<String> = paths.iter().map(|p| parent_dir(p)).collect();
                quote_all(dirs.iter())
            } else {
                quote_all(paths.iter())
            }
        })
        .into_owned()
}

fn parent_dir(path: &str) -> String {
    match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().replace('\\', "/"),
        _ => ROOT.to_string(),
    }
}

fn quote_all<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(|s| shell_quote(s)).collect::<Vec<_>>().join(" ")
}

/// Single-quote `s` for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

async fn run_prep(label: &str, command: &str, block: &Block) -> Result<(), PrepError> {
    info!(block = %label, cmd = %command, "prep");
    let started = Instant::now();

    let mut child = shell_command(command, &block.variables)
        .spawn()
        .map_err(|source| PrepError::Setup {
            command: command.to_string(),
            source,
        })?;

    let stdout = child
        .stdout
        .take()
        .map(|s| forward_lines(s, format!("{label} prep"), true));
    let stderr = child
        .stderr
        .take()
        .map(|s| forward_lines(s, format!("{label} prep"), true));

    let status = child.wait().await.map_err(|source| PrepError::Setup {
        command: command.to_string(),
        source,
    })?;

    let mut output = String::new();
    for reader in [stdout, stderr].into_iter().flatten() {
        if let Ok(text) = reader.await {
            output.push_str(&text);
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.success() {
        debug!(block = %label, cmd = %command, elapsed_ms, "prep done");
        Ok(())
    } else {
        Err(PrepError::CommandFailed {
            command: command.to_string(),
            output,
            code: status.code(),
        })
    }
}
