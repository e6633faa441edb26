use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rota(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rota").expect("binary built");
    cmd.current_dir(dir.path())
        .env_remove("ROTA_API_URL")
        .env_remove("ROTA_TOKEN")
        .env_remove("ROTA_REFRESH_TOKEN")
        .env_remove("FORMAT")
        .env("ROTA_LOG", "off");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().expect("tempdir");
    rota(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("board"))
        .stdout(predicate::str::contains("unassign"));
}

#[test]
fn unreachable_api_reports_json_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = rota(&dir)
        .args([
            "--json",
            "--api-url",
            "http://127.0.0.1:9",
            "board",
            "--year",
            "1",
            "--day",
            "1",
        ])
        .output()
        .expect("run");

    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stderr).expect("json error");
    assert_eq!(value["error"]["error_code"], "E5003");
    assert!(
        value["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("failed to load catalog for year 1"))
    );
}

#[test]
fn broken_project_config_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".rota")).expect("mkdir");
    std::fs::write(dir.path().join(".rota/config.toml"), "[api\nbase_url = 1").expect("write");

    rota(&dir)
        .args(["--format", "text", "board", "--year", "1", "--day", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn login_rejects_malformed_payload() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("widget.json"), "{\"id\": \"nope\"}").expect("write");

    rota(&dir)
        .args(["--format", "text", "login", "--widget-json", "widget.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Telegram widget"));
}
