use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

const TRACE: &str = r#"{"event":"user_message","timestamp":1700000000,"session_id":"a","text":"run the tests"}
{"event":"tool_call","timestamp":1700000001,"session_id":"a","tool":"bash","params":{"cmd":"npm test","timeoutMs":30000}}
{"event":"tool_result","timestamp":1700000002,"session_id":"a","tool":"bash","error":"ENOENT pid 4242"}
{"event":"assistant_message","timestamp":1700000003,"session_id":"a","text":"The tests could not start."}
this line is not json
{"schema":2,"type":"tool_call","ts":"2023-11-15T10:00:00Z","session":"b","data":{"toolName":"bash","input":{"cmd":"npm test","timeoutMs":1000}}}
{"schema":2,"type":"tool_result","ts":"2023-11-15T10:00:01Z","session":"b","data":{"toolName":"bash","error":{"message":"ENOENT pid 77"}}}
{"schema":2,"type":"message_out","ts":"2023-11-15T10:00:02Z","session":"b","data":{"text":"Still failing."}}
"#;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_trace-scan"))
}

fn write_trace(dir: &Path) -> PathBuf {
    let path = dir.join("trace.jsonl");
    fs::write(&path, TRACE).expect("write trace");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn trace-scan")
}

fn reports(output: &Output) -> Vec<Value> {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("report is JSON"))
        .collect()
}

fn kinds(report: &Value) -> Vec<String> {
    report["signals"]
        .as_array()
        .expect("signals array")
        .iter()
        .map(|s| s["kind"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn analyze_prints_one_report_per_chain() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace = write_trace(dir.path());

    let out = run(&["analyze", "--events", trace.to_str().unwrap()]);
    let reports = reports(&out);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["session_id"], "a");
    assert_eq!(reports[0]["chain_id"], "a:main:0");
    assert_eq!(reports[1]["session_id"], "b");
    assert!(kinds(&reports[0]).contains(&"tool_fail".to_string()));
    assert!(kinds(&reports[1]).contains(&"repeat_fail".to_string()));
}

#[test]
fn state_file_carries_fingerprints_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace = write_trace(dir.path());
    let state = dir.path().join("state.json");
    let trace = trace.to_str().unwrap();
    let state_arg = state.to_str().unwrap();

    let first = reports(&run(&[
        "analyze", "--events", trace, "--session", "a", "--state", state_arg,
    ]));
    assert!(first.iter().all(|r| !kinds(r).contains(&"repeat_fail".to_string())));
    let saved: Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["entries"].as_object().map(|m| m.len()), Some(1));

    let second = reports(&run(&[
        "analyze", "--events", trace, "--session", "b", "--state", state_arg,
    ]));
    assert_eq!(second.len(), 1);
    let repeat = second[0]["signals"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["kind"] == "repeat_fail")
        .expect("repeat_fail signal");
    assert_eq!(repeat["severity"], "high");
}

#[test]
fn config_can_disable_signals() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace = write_trace(dir.path());
    let config = dir.path().join("scan.toml");
    fs::write(&config, "[enabledSignals]\ntool_fail = false\n").unwrap();

    let out = run(&[
        "analyze",
        "--events",
        trace.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    for report in reports(&out) {
        assert!(!kinds(&report).contains(&"tool_fail".to_string()));
    }
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace = write_trace(dir.path());
    let config = dir.path().join("scan.toml");
    fs::write(&config, "similarityThreshold = 7\n").unwrap();

    let out = run(&[
        "analyze",
        "--events",
        trace.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("similarityThreshold"));
}

#[test]
fn missing_trace_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.jsonl");
    let out = run(&["analyze", "--events", missing.to_str().unwrap()]);
    assert!(!out.status.success());
}

#[test]
fn languages_lists_builtin_packs() {
    let out = run(&["languages"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let codes: Vec<_> = stdout
        .lines()
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(codes, vec!["en", "es", "de", "fr"]);
}
