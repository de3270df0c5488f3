// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`shell`] builds `sh -c` invocations and forwards their output to the log.
//! - [`prep`] runs a block's short-lived prep commands to completion.
//! - [`supervisor`] owns a block's long-lived daemons across restarts.
//! - [`notify`] raises desktop notifications when a prep command fails.

pub mod notify;
pub mod prep;
pub mod shell;
pub mod supervisor;

pub use notify::{DesktopNotifier, Notifier, NOTIFY_TITLE};
pub use prep::{expand_placeholders, run_preps, shell_quote, PrepError, PrepScope};
pub use supervisor::{Supervisor, SupervisorError, SupervisorState, DEFAULT_GRACE_PERIOD};
