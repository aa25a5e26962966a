use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "netstack-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn summary_field<'a>(stdout: &'a str, key: &str) -> Option<&'a str> {
    let line = stdout.lines().find(|l| l.starts_with("exchange done "))?;
    line.split(", ")
        .find_map(|part| part.strip_prefix(key)?.strip_prefix('='))
}

#[test]
fn http_exchange_with_defaults_gets_200() {
    let output = Command::new(env!("CARGO_BIN_EXE_http_exchange"))
        .output()
        .expect("run http_exchange");
    assert!(
        output.status.success(),
        "http_exchange failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "status"), Some("200"), "stdout={stdout}");
    assert_eq!(summary_field(&stdout, "lost_frames"), Some("0"));
    assert_eq!(summary_field(&stdout, "requests_seen"), Some("1"));
    assert_eq!(summary_field(&stdout, "responses_seen"), Some("1"));
}

#[test]
fn http_exchange_writes_trace_json_with_link_up_first() {
    let dir = unique_temp_dir("trace");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "schema_version": 1,
    "seed": 3,
    "client": { "mss": 24 },
    "uplink": { "medium": "fiber", "rate_bps": 1e9, "distance_m": 5000, "jitter_ms": 1.0 },
    "downlink": { "medium": "token-ring", "rate_bps": null }
}
        "#,
    );
    let out_json = dir.join("trace.json");

    let output = Command::new(env!("CARGO_BIN_EXE_http_exchange"))
        .args([
            "--scenario",
            scenario.to_str().unwrap(),
            "--trace-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run http_exchange");
    assert!(
        output.status.success(),
        "http_exchange failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "status"), Some("200"), "stdout={stdout}");
    let request_frames: usize = summary_field(&stdout, "request_frames")
        .and_then(|v| v.parse().ok())
        .expect("request_frames");
    assert!(request_frames > 1, "mss 24 should split the request");

    let raw = fs::read_to_string(&out_json).expect("read trace.json");
    let v: Value = serde_json::from_str(&raw).expect("parse trace.json");
    let arr = v.as_array().expect("trace.json must be a JSON array");
    assert_eq!(arr[0].get("kind").and_then(|k| k.as_str()), Some("link_up"));
    assert_eq!(arr[1].get("medium").and_then(|k| k.as_str()), Some("token-ring"));
    assert_eq!(arr[1].get("rate_bps").and_then(Value::as_f64), Some(16e6));

    let sent = arr
        .iter()
        .filter(|ev| ev.get("kind").and_then(|k| k.as_str()) == Some("frame_sent"))
        .count();
    let completed = arr
        .iter()
        .filter(|ev| ev.get("kind").and_then(|k| k.as_str()) == Some("message_complete"))
        .count();
    assert!(sent > request_frames);
    assert_eq!(completed, 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn http_exchange_overrides_loss() {
    let output = Command::new(env!("CARGO_BIN_EXE_http_exchange"))
        .args(["--loss", "1.0", "--mss", "16"])
        .output()
        .expect("run http_exchange");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "status"), Some("none"), "stdout={stdout}");
    assert_eq!(summary_field(&stdout, "delivered_frames"), Some("0"));
    assert_eq!(summary_field(&stdout, "requests_seen"), Some("0"));
}

#[test]
fn http_exchange_rejects_bad_config_with_exit_code_2() {
    let dir = unique_temp_dir("bad-config");
    let scenario = write_file(&dir, "scenario.json", r#"{ "schema_version": 9 }"#);

    let output = Command::new(env!("CARGO_BIN_EXE_http_exchange"))
        .args(["--scenario", scenario.to_str().unwrap()])
        .output()
        .expect("run http_exchange");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("schema_version"));

    let output = Command::new(env!("CARGO_BIN_EXE_http_exchange"))
        .args(["--medium", "carrier-pigeon"])
        .output()
        .expect("run http_exchange");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("carrier-pigeon"));

    let output = Command::new(env!("CARGO_BIN_EXE_http_exchange"))
        .args(["--mss", "70000"])
        .output()
        .expect("run http_exchange");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("mss 70000"));

    let _ = fs::remove_dir_all(&dir);
}
