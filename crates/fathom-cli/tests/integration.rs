//! Integration tests for the `fathom` CLI binary.

use std::process::Command;

fn fathom_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fathom"))
}

#[test]
fn cli_help_works() {
    let output = fathom_bin().arg("--help").output().expect("failed to run fathom --help");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fathom acoustic FDTD solver CLI"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("devices"));
    assert!(stdout.contains("presets"));
    assert!(stdout.contains("bench"));
}

#[test]
fn cli_version_works() {
    let output = fathom_bin().arg("--version").output().expect("failed to run fathom --version");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fathom"));
}

#[test]
fn cli_devices_list_does_not_panic() {
    let output = fathom_bin().args(["devices", "list"]).output().expect("failed to run fathom devices list");
    assert!(output.status.success());
}

#[test]
fn cli_presets_list_shows_built_ins() {
    let output = fathom_bin().args(["presets", "list"]).output().expect("failed to run fathom presets list");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("realistic"));
    assert!(stdout.contains("visualization"));
    assert!(stdout.contains("anechoic"));
}

#[test]
fn cli_presets_show_built_in() {
    let output = fathom_bin()
        .args(["presets", "show", "anechoic"])
        .output()
        .expect("failed to run fathom presets show");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("absorbing boundary:       true"));
}

#[test]
fn cli_presets_show_unknown_fails() {
    let output = fathom_bin()
        .args(["presets", "show", "not_a_real_preset_xyz"])
        .output()
        .expect("failed to run fathom presets show");
    assert!(!output.status.success());
}

#[test]
fn cli_presets_save_and_show_round_trips() {
    let dir = tempfile::TempDir::new().unwrap();

    let save = fathom_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["presets", "save", "cli_test_preset", "-d", "0.98", "-r", "0.2"])
        .output()
        .expect("failed to run fathom presets save");
    assert!(save.status.success(), "{}", String::from_utf8_lossy(&save.stderr));

    let show = fathom_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["presets", "show", "cli_test_preset"])
        .output()
        .expect("failed to run fathom presets show");
    assert!(show.status.success(), "{}", String::from_utf8_lossy(&show.stderr));
}

#[test]
fn cli_bench_reports_a_substep_rate() {
    let output = fathom_bin()
        .args(["bench", "--width", "32", "--height", "32", "--frames", "3"])
        .output()
        .expect("failed to run fathom bench");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CPU:"));
    assert!(stdout.contains("substeps/sec"));
}

#[test]
fn cli_run_with_a_duration_terminates_on_its_own() {
    let output = fathom_bin()
        .args([
            "run",
            "--width",
            "32",
            "--height",
            "32",
            "--duration",
            "0.05",
            "--output",
            "nonexistent device that will not match anything 12345",
        ])
        .output()
        .expect("failed to run fathom run");
    // No matching output device: the run should fail fast rather than hang.
    assert!(!output.status.success());
}
