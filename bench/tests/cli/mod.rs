use crate::common::{records, RECORD_SIZE};
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn aibench() -> Command {
    let mut command = Command::cargo_bin("aibench").unwrap();
    command.env_remove("RUST_LOG");
    command
}

fn generate(path: &Path, count: u64) {
    aibench()
        .args(["generate", "--count", &count.to_string(), "--record-size"])
        .arg(RECORD_SIZE.to_string())
        .args(["--seed", "7", "--output"])
        .arg(path)
        .assert()
        .success();
}

#[test]
fn should_generate_fixed_width_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.bin");
    generate(&path, 100);

    let metadata = std::fs::metadata(&path).unwrap();
    assert_eq!(metadata.len(), 100 * RECORD_SIZE as u64);
}

#[test]
fn should_run_inference_benchmark_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.bin");
    let results = dir.path().join("results.json");
    generate(&input, 100);

    aibench()
        .args(["inference", "--workers", "4", "--record-size"])
        .arg(RECORD_SIZE.to_string())
        .args(["--synthetic-latency", "0", "--reporting-period", "0"])
        .arg("--file")
        .arg(&input)
        .arg("--json-out-file")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Run complete after 100 inferences with 4 workers",
        ))
        .stdout(predicate::str::contains("All queries"));

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&results).unwrap()).unwrap();
    assert_eq!(json["Totals"]["ItemsProcessed"], 100);
}

#[test]
fn should_fail_on_truncated_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.bin");
    let mut bytes = records(10);
    bytes.truncate(9 * RECORD_SIZE + 5);
    std::fs::write(&input, bytes).unwrap();

    aibench()
        .args(["inference", "--record-size"])
        .arg(RECORD_SIZE.to_string())
        .args(["--reporting-period", "0", "--file"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TruncatedRecord"));
}

#[test]
fn should_load_records_from_stdin() {
    aibench()
        .args(["load", "--workers", "2", "--record-size"])
        .arg(RECORD_SIZE.to_string())
        .args(["--commands-per-record", "2", "--synthetic-latency", "0", "--reporting-period", "0"])
        .write_stdin(records(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 10 inserts"))
        .stdout(predicate::str::contains("20 commands issued"));
}

#[test]
fn should_reject_zero_workers() {
    aibench()
        .args(["inference", "--workers", "0"])
        .assert()
        .failure();
}

#[test]
fn should_take_profile_paths_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let cpu_profile = dir.path().join("cpu.json");
    let mem_profile = dir.path().join("mem.json");

    aibench()
        .env("AIBENCH_CPUPROFILE", &cpu_profile)
        .env("AIBENCH_MEMPROFILE", &mem_profile)
        .args(["load", "--record-size"])
        .arg(RECORD_SIZE.to_string())
        .args(["--synthetic-latency", "0", "--reporting-period", "0"])
        .write_stdin(records(5))
        .assert()
        .success();

    assert!(cpu_profile.exists());
    assert!(mem_profile.exists());
}
