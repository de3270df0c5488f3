// tests/notifier_detect.rs
//
// Kept to a single test: it rewrites `PATH` for the whole process.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::TempDir;

use modwatch::exec::DesktopNotifier;

fn install(dir: &Path, name: &str, mode: u32) -> std::io::Result<()> {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\nexit 0\n")?;
    fs::set_permissions(&path, fs::Permissions::from_mode(mode))
}

fn set_path(dir: &Path) {
    // SAFETY: the only test in this binary, so no other thread reads the
    // environment concurrently.
    unsafe { std::env::set_var("PATH", dir) };
}

#[test]
fn detect_prefers_notify_send_and_skips_non_executables() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    set_path(dir.path());
    assert!(DesktopNotifier::detect().is_none());

    install(dir.path(), "notify-send", 0o644)?;
    assert!(DesktopNotifier::detect().is_none(), "non-executable file was picked up");

    install(dir.path(), "terminal-notifier", 0o755)?;
    let found = DesktopNotifier::detect().ok_or("terminal-notifier not found")?;
    assert_eq!(found.program(), dir.path().join("terminal-notifier"));

    install(dir.path(), "notify-send", 0o755)?;
    let found = DesktopNotifier::detect().ok_or("notify-send not found")?;
    assert_eq!(found.program(), dir.path().join("notify-send"));
    Ok(())
}
