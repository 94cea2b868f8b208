// Drives the compiled binary through a PTY: real event loop, real crossterm
// input handling.
//
// Unix-only and ignored by default. Run manually via:
// `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("paceclock");
    let cmd = format!(
        "{} --config {} --export-dir {}",
        bin.display(),
        dir.path().join("config.json").display(),
        dir.path().display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start a lap session, then quit
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
