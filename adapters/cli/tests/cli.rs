use std::process::Command;

fn lane_defence(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lane-defence"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run the lane-defence binary")
}

#[test]
fn json_output_has_one_report_per_turn() {
    let output = lane_defence(&["--turns", "4", "--seed", "21", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let reports: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let reports = reports.as_array().expect("array of reports");
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0]["posture"], "StartingDefense");
    assert_eq!(reports[3]["posture"], "InitialCommit");
}

#[test]
fn same_seed_prints_the_same_skirmish() {
    let first = lane_defence(&["--turns", "6", "--seed", "5"]);
    let second = lane_defence(&["--turns", "6", "--seed", "5"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(String::from_utf8_lossy(&first.stdout).lines().count(), 6);
}

#[test]
fn missing_config_fails_with_context() {
    let output = lane_defence(&["--config", "does/not/exist.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loading settings from does/not/exist.toml"), "{stderr}");
}
