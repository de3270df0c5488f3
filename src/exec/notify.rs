// src/exec/notify.rs

//! Desktop notifications for failed prep commands.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, warn};

/// Title used for every failure notification.
pub const NOTIFY_TITLE: &str = "modwatch error";

/// Something that can put a message in front of the user.
pub trait Notifier: Send + Sync {
    fn push(&self, title: &str, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    NotifySend,
    TerminalNotifier,
}

/// Notifier backed by `notify-send` (Linux/BSD) or, failing that,
/// `terminal-notifier` (macOS).
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: PathBuf,
    flavor: Flavor,
}

impl DesktopNotifier {
    /// `None` when no supported notifier is installed.
    pub fn detect() -> Option<Self> {
        let found = which::which("notify-send")
            .map(|program| Self { program, flavor: Flavor::NotifySend })
            .or_else(|_| {
                which::which("terminal-notifier").map(|program| Self {
                    program,
                    flavor: Flavor::TerminalNotifier,
                })
            })
            .ok()?;
        debug!(program = %found.program.display(), "desktop notifier found");
        Some(found)
    }

    /// The resolved notifier binary.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Notifier for DesktopNotifier {
    fn push(&self, title: &str, text: &str) {
        let mut cmd = Command::new(&self.program);
        match self.flavor {
            Flavor::NotifySend => cmd.arg(title).arg(text),
            Flavor::TerminalNotifier => cmd.arg("-title").arg(title).arg("-message").arg(text),
        };

        match cmd.spawn() {
            Ok(mut child) => {
                // Reap in the background so the notifier never turns zombie.
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(err) => warn!(error = %err, "failed to send desktop notification"),
        }
    }
}
