use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rtm(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rtm").unwrap();
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env("NO_COLOR", "1")
        .env_remove("RTM_CONFIG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

fn add_plugin_dir(data_dir: &Path, name: &str) {
    fs::create_dir_all(data_dir.join("plugins").join(name)).unwrap();
}

fn add_install_dir(data_dir: &Path, name: &str, version: &str) {
    fs::create_dir_all(data_dir.join("installs").join(name).join(version)).unwrap();
}

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(["-c", "user.name=rtm", "-c", "user.email=rtm@example.com"])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?}");
}

fn init_upstream(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-q"]);
    fs::write(dir.join("README.md"), "plugin").unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "init"]);
}

#[test]
fn plugin_list_empty() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .args(["plugin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugins installed"));
}

#[test]
fn plugin_list_sorted_names() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "ruby");
    add_plugin_dir(temp.path(), "lua");

    rtm(temp.path())
        .args(["plugin", "list"])
        .assert()
        .success()
        .stdout("lua\nruby\n");
}

#[test]
fn plugin_list_json() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");

    let output = rtm(temp.path())
        .args(["plugin", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!([{ "name": "lua" }]));
}

#[test]
fn plugin_add_existing_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");

    rtm(temp.path())
        .args(["plugin", "add", "lua", "https://example.invalid/asdf-lua.git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already added"));
}

#[test]
fn plugin_add_invalid_name() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .args(["plugin", "add", "../lua", "https://example.invalid/asdf-lua.git"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid plugin name"));
}

#[test]
fn plugin_remove_missing() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .args(["plugin", "remove", "lua"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No such plugin: lua"));
}

#[test]
fn plugin_remove_existing() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");
    add_install_dir(temp.path(), "lua", "5.4.6");

    rtm(temp.path())
        .args(["plugin", "remove", "lua"])
        .assert()
        .success();

    assert!(!temp.path().join("plugins/lua").exists());
    assert!(!temp.path().join("installs/lua").exists());
}

#[test]
fn plugin_update_requires_name_or_all() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .args(["plugin", "update"])
        .assert()
        .failure();
}

#[test]
fn plugin_update_all_without_plugins() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .args(["plugin", "update", "--all"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn list_installed_versions() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");
    add_install_dir(temp.path(), "lua", "5.4.6");
    add_install_dir(temp.path(), "lua", "5.1.5");

    rtm(temp.path())
        .args(["list", "lua"])
        .assert()
        .success()
        .stdout("  5.1.5\n  5.4.6\n");
}

#[test]
fn list_without_installs() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");

    rtm(temp.path())
        .args(["list", "lua"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No versions installed"));
}

#[test]
fn where_prints_install_path() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");
    add_install_dir(temp.path(), "lua", "1.0.0");

    let expected = temp.path().join("installs").join("lua").join("1.0.0");
    rtm(temp.path())
        .args(["where", "lua", "1.0.0"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn where_missing_version() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");

    rtm(temp.path())
        .args(["where", "lua", "4.0.0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn uninstall_version() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");
    add_install_dir(temp.path(), "lua", "1.0.0");

    rtm(temp.path())
        .args(["uninstall", "lua", "1.0.0"])
        .assert()
        .success();

    assert!(!temp.path().join("installs/lua/1.0.0").exists());
}

#[test]
fn plugin_update_all_quiet_hides_successes() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");
    let upstream = temp.path().join("upstream");
    init_upstream(&upstream);

    rtm(&data_dir)
        .args(["plugin", "add", "lua"])
        .arg(&upstream)
        .assert()
        .success();

    rtm(&data_dir)
        .args(["-q", "plugin", "update", "--all"])
        .assert()
        .success()
        .stdout("");

    rtm(&data_dir)
        .args(["plugin", "update", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated: lua"));
}

#[test]
fn plugin_update_all_quiet_still_reports_failures() {
    let temp = TempDir::new().unwrap();
    // Not a git checkout, so the update fails
    add_plugin_dir(temp.path(), "lua");

    rtm(temp.path())
        .args(["-q", "plugin", "update", "--all"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("failed to update lua"));
}

#[test]
fn where_rejects_path_like_version() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");
    add_install_dir(temp.path(), "ruby", "3.3.0");

    for version in ["..", ".", "a/b", "/abs"] {
        rtm(temp.path())
            .args(["where", "lua", version])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Invalid version"));
    }
}

#[test]
fn uninstall_dotdot_keeps_other_plugins() {
    let temp = TempDir::new().unwrap();
    add_plugin_dir(temp.path(), "lua");
    add_install_dir(temp.path(), "lua", "5.4.6");
    add_install_dir(temp.path(), "ruby", "3.3.0");

    rtm(temp.path())
        .args(["uninstall", "lua", ".."])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid version"));

    assert!(temp.path().join("installs/ruby/3.3.0").is_dir());
    assert!(temp.path().join("installs/lua/5.4.6").is_dir());
}

#[test]
fn info_shows_data_dir() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(temp.path().display().to_string()))
        .stdout(predicate::str::contains("plugin_repository_url"));
}

#[test]
fn malformed_config_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.toml"),
        "disable_plugin_short_name_repository = \"maybe\"\n",
    )
    .unwrap();

    rtm(temp.path())
        .args(["plugin", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config parse error"));
}

#[test]
fn completions_bash() {
    let temp = TempDir::new().unwrap();

    rtm(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rtm"));
}
