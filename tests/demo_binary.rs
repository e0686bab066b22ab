//! Demo Binary Tests
//!
//! Runs the `tablestash` binary in a scratch working directory.

use std::process::Command;
use tablestash::store::Sidecar;
use tempfile::tempdir;

#[test]
fn test_demo_writes_store_and_compares() {
    let dir = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tablestash"))
        .current_dir(dir.path())
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to execute tablestash");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    assert!(stdout.contains("d: datetime"), "stdout: {stdout}");
    assert!(stdout.contains("comparing test_object (a) to test_object (b)"));
    assert!(stdout.contains("tables a and b are equal"));
    assert!(stderr.contains("dumping table"), "logs go to stderr");

    let primary = dir.path().join("sandbox/pickle_store/test");
    assert!(primary.is_file());
    for sidecar in Sidecar::ALL {
        assert!(sidecar.path_for(&primary).is_file(), "{:?}", sidecar);
    }
}
