// src/exec/shell.rs

//! Building shell commands and draining their output.

use std::collections::BTreeMap;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::info;

use crate::logging::OUTPUT_TARGET;

/// A shell invocation of `command` with `variables` exported, stdout and
/// stderr piped, and the child killed if its handle is dropped.
pub fn shell_command(command: &str, variables: &BTreeMap<String, String>) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.envs(variables)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Echo every line of `reader` to the log. With `capture`, the lines are
/// also collected and returned once the stream closes.
pub fn forward_lines<R>(reader: R, source: String, capture: bool) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut captured = String::new();
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: OUTPUT_TARGET, "{source}: {line}");
            if capture {
                captured.push_str(&line);
                captured.push('\n');
            }
        }
        captured
    })
}
