use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BODY: &str = "Plans multi-step refactors and hands each step to the right specialist.\n";

fn agentlint(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agentlint"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("NO_COLOR", "1")
        .env("HOME", root)
        .env_remove("AGENTLINT_LOG")
        .output()
        .expect("run agentlint")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn project() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    fs::create_dir_all(tmp.path().join("agents")).expect("agents dir");
    tmp
}

fn agent(root: &Path, file: &str, header: &str) {
    fs::write(
        root.join("agents").join(file),
        format!("---\n{}---\n{}", header, BODY),
    )
    .expect("write descriptor");
}

#[test]
fn clean_descriptors_pass() {
    let tmp = project();
    agent(
        tmp.path(),
        "planner.md",
        "name: planner\ndescription: Plans refactors across many files\ntools: [Read, Grep]\nmodel: opus\n",
    );

    let out = agentlint(tmp.path(), &["agents"]);
    assert!(out.status.success(), "stdout: {}", stdout(&out));
    let text = stdout(&out);
    assert!(text.contains("Descriptors checked:  1"));
    assert!(text.contains("PASS"));
}

#[test]
fn warnings_alone_do_not_fail() {
    let tmp = project();
    agent(
        tmp.path(),
        "baz.md",
        "name: bar\ndescription: Plans refactors across many files\ntools: Read\n",
    );

    let out = agentlint(tmp.path(), &["agents"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("name 'bar' does not match file name 'baz'"));
    assert!(text.contains("Warnings:             1"));
}

#[test]
fn schema_errors_fail_with_remediation() {
    let tmp = project();
    agent(tmp.path(), "x.md", "name: x\nmodel: gpt-9\n");
    fs::write(tmp.path().join("agents").join("raw.md"), "no header at all\n").expect("write");

    let out = agentlint(tmp.path(), &["agents"]);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("missing required field 'description'"));
    assert!(text.contains("missing required field 'tools'"));
    assert!(text.contains("invalid model 'gpt-9'"));
    assert!(text.contains("missing header"));
    assert!(text.contains("Suggested fixes"));
    assert!(text.contains("FAIL"));
    assert!(String::from_utf8_lossy(&out.stderr).contains("4 error(s)"));
}

#[test]
fn manifest_drift_is_reported() {
    let tmp = project();
    for name in ["a", "b"] {
        agent(
            tmp.path(),
            &format!("{}.md", name),
            &format!(
                "name: {}\ndescription: Plans refactors across many files\ntools: [Read]\n",
                name
            ),
        );
    }
    fs::create_dir_all(tmp.path().join(".claude-plugin")).expect("plugin dir");
    fs::write(
        tmp.path().join(".claude-plugin/plugin.json"),
        r#"{ "name": "demo", "agents": ["./agents/a.md", "./agents/"] }"#,
    )
    .expect("write manifest");

    let out = agentlint(tmp.path(), &["agents"]);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("references a directory"));
    assert!(text.contains("'b.md' exists on disk but is not declared"));

    let skipped = agentlint(tmp.path(), &["agents", "--no-manifest"]);
    assert!(skipped.status.success());
}

#[test]
fn explicit_manifest_must_exist() {
    let tmp = project();
    agent(
        tmp.path(),
        "a.md",
        "name: a\ndescription: Plans refactors across many files\ntools: [Read]\n",
    );

    let out = agentlint(tmp.path(), &["agents", "--manifest", "typo.json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("manifest file not found"));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: manifest: manifest file not found"));
    assert!(stderr.contains("1 error(s)"));
}

#[test]
fn missing_directory_exits_before_validation() {
    let tmp = TempDir::new().expect("tempdir");
    let out = agentlint(tmp.path(), &["agents"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("descriptor directory"));
}

#[test]
fn json_format_and_custom_dir() {
    let tmp = TempDir::new().expect("tempdir");
    fs::create_dir_all(tmp.path().join("subagents")).expect("dir");
    fs::write(
        tmp.path().join("subagents/solo.md"),
        format!("---\nname: solo\ndescription: Short\ntools: [Read]\n---\n{}", BODY),
    )
    .expect("write");

    let out = agentlint(
        tmp.path(),
        &["--format", "json", "agents", "--dir", "subagents"],
    );
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json report");
    assert_eq!(json["summary"]["descriptors"], 1);
    assert_eq!(json["summary"]["warnings"], 1);
    assert_eq!(json["summary"]["passed"], true);
    assert_eq!(
        json["sections"][0]["outcome"]["diagnostics"][0]["location"]["field"],
        "description"
    );
}

#[test]
fn config_command_prints_effective_settings() {
    let tmp = TempDir::new().expect("tempdir");
    fs::write(
        tmp.path().join("agentlint.toml"),
        "[agents]\nmin_body_chars = 10\n",
    )
    .expect("write config");

    let out = agentlint(tmp.path(), &["config"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("min_body_chars = 10"));
    assert!(text.contains("max_timeout = 600"));

    fs::write(tmp.path().join("agentlint.toml"), "[agents\n").expect("write config");
    let out = agentlint(tmp.path(), &["config"]);
    assert_eq!(out.status.code(), Some(1));
}
