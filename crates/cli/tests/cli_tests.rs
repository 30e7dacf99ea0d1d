// Binary contract: exit codes and stdout/stderr shape of `remrecon`.
//
// Run with: cargo test -p rem-recon-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn remrecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_remrecon"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    remrecon().args(args).output().expect("spawn remrecon")
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn generate(dir: &Path, n: &str) {
    let out = run(&["generate", "--out-dir", s(dir), "--n", n, "--seed", "42"]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
}

#[test]
fn generate_run_verify_succeeds() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    let out_dir = tmp.path().join("out");
    generate(&data, "1000");
    assert!(data.join("injected_breaks.json").is_file());

    let out = run(&["run", "--data-dir", s(&data), "--out-dir", s(&out_dir)]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("full rows A+B: 1940"));
    assert!(stderr(&out).contains("mismatches: 300 full, 300 reduced"));

    let out = run(&["verify", "--out-dir", s(&out_dir)]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("PASS: reduced reconciliation is equivalent"));
}

#[test]
fn run_json_is_single_value() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    generate(&data, "500");

    let out = run(&[
        "run",
        "--data-dir",
        s(&data),
        "--out-dir",
        s(&tmp.path().join("out")),
        "--json",
    ]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));

    let val: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&out.stdout).trim()).unwrap();
    assert_eq!(val["full_mismatches"], val["reduced_mismatches"]);
    assert_eq!(val["equivalent"], true);
    assert!(val["reduction_ratio"].as_f64().unwrap() > 0.0);
    assert!(val["kept_keys"].as_u64().unwrap() > 0);
}

#[test]
fn prove_runs_both_steps() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    let out_dir = tmp.path().join("out");
    generate(&data, "800");

    let out = run(&["prove", "--data-dir", s(&data), "--out-dir", s(&out_dir)]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(out_dir.join("equivalence_report.txt").is_file());
}

#[test]
fn tampered_result_exits_6() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    let out_dir = tmp.path().join("out");
    generate(&data, "500");
    assert_eq!(code(&run(&["run", "--data-dir", s(&data), "--out-dir", s(&out_dir)])), 0);

    // An empty reduced result disagrees on mismatch_count.
    fs::write(
        out_dir.join("reduced_recon_result.json"),
        r#"{"meta":{"rows_A":0,"rows_B":0,"totalA_cents":0,"totalB_cents":0,"mismatch_count":0,"mismatch_delta_total_cents":0},"mismatches":[]}"#,
    )
    .unwrap();

    let out = run(&["verify", "--out-dir", s(&out_dir)]);
    assert_eq!(code(&out), 6);
    let report = fs::read_to_string(out_dir.join("equivalence_report.txt")).unwrap();
    assert!(report.starts_with("FAIL: mismatch_count differs (full="));
    assert!(report.ends_with(" reduced=0).\n"));
}

#[test]
fn malformed_row_exits_3() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    generate(&data, "10");
    fs::write(
        data.join("ledger_A.csv"),
        "ledger,trace_id,timestamp_iso,amount_cents,currency,direction\nA,T1,not-a-time,100,USD,DEBIT\n",
    )
    .unwrap();

    let out = run(&["run", "--data-dir", s(&data), "--out-dir", s(&tmp.path().join("out"))]);
    assert_eq!(code(&out), 3);
    let err = stderr(&out);
    assert!(err.contains("error: "));
    assert!(err.contains("ledger A, record 0: cannot parse timestamp 'not-a-time'"));
    assert!(err.contains("hint:"));
}

#[test]
fn amount_overflow_exits_3() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    generate(&data, "10");
    fs::write(
        data.join("ledger_A.csv"),
        "ledger,trace_id,timestamp_iso,amount_cents,currency,direction\nA,T1,2026-01-01T09:00:00,9223372036854775807,USD,DEBIT\n",
    )
    .unwrap();
    fs::write(
        data.join("ledger_B.csv"),
        "ledger,trace_id,timestamp_iso,amount_cents,currency,direction\nB,T1,2026-01-01T09:00:00,-1,USD,DEBIT\n",
    )
    .unwrap();

    let out = run(&["run", "--data-dir", s(&data), "--out-dir", s(&tmp.path().join("out"))]);
    assert_eq!(code(&out), 3);
    let err = stderr(&out);
    assert!(err.contains("amount overflow: delta for T1/USD/DEBIT/2026-01-01T09:00"));
    assert!(err.contains("hint:"));
}

#[test]
fn missing_ledger_exits_4() {
    let tmp = tempdir().unwrap();
    let out = run(&[
        "run",
        "--data-dir",
        s(&tmp.path().join("nowhere")),
        "--out-dir",
        s(&tmp.path().join("out")),
    ]);
    assert_eq!(code(&out), 4);
}

#[test]
fn verify_empty_dir_exits_4_with_hint() {
    let tmp = tempdir().unwrap();
    let out = run(&["verify", "--out-dir", s(tmp.path())]);
    assert_eq!(code(&out), 4);
    assert!(stderr(&out).contains("remrecon run"));
}

#[test]
fn bad_config_exits_5() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("proof.toml");
    fs::write(&config, "[inputs]\nledger_a = \"x.csv\"\nledger_b = \"x.csv\"\n").unwrap();

    let out = run(&["validate-config", s(&config)]);
    assert_eq!(code(&out), 5);
    assert!(stderr(&out).contains("ledger_a and ledger_b both point at 'x.csv'"));

    fs::write(&config, "[outputs]\nbogus = \"y\"\n").unwrap();
    assert_eq!(code(&run(&["validate-config", s(&config)])), 5);
}

#[test]
fn good_config_validates() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("proof.toml");
    fs::write(&config, "[outputs]\nreport = \"verdict.txt\"\n").unwrap();

    let out = run(&["validate-config", s(&config)]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("verdict.txt"));
}

#[test]
fn missing_argument_is_usage_error() {
    assert_eq!(code(&run(&["run", "--data-dir", "x"])), 2);
    assert_eq!(code(&run(&["frobnicate"])), 2);
}

#[test]
fn verify_json_reports_verdict() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    let out_dir = tmp.path().join("out");
    generate(&data, "300");
    assert_eq!(code(&run(&["run", "--data-dir", s(&data), "--out-dir", s(&out_dir)])), 0);

    let out = run(&["verify", "--out-dir", s(&out_dir), "--json"]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    let val: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&out.stdout).trim()).unwrap();
    assert_eq!(val["passed"], true);
    assert!(val.get("failure").is_none());
}
