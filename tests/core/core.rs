use agentlint::core::config::{self, Config};
use agentlint::core::diagnostic::IssueKind;
use agentlint::core::error::AgentlintError;
use agentlint::core::frontmatter::{FieldValue, parse_document};
use agentlint::core::paths::PathResolver;
use agentlint::core::report::{Report, Section};
use agentlint::plugins::agents::{self, AgentsOptions};
use agentlint::plugins::hooks::{HookSelection, HookValidator, run_hooks};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const BODY: &str = "Reviews diffs for correctness and asks for missing tests before approving.\n";

fn write_agent(dir: &Path, file: &str, header: &str) {
    fs::create_dir_all(dir).expect("agents dir");
    fs::write(dir.join(file), format!("---\n{}---\n\n{}", header, BODY)).expect("write agent");
}

fn write_manifest(root: &Path, entries: serde_json::Value) {
    let dir = root.join(".claude-plugin");
    fs::create_dir_all(&dir).expect("manifest dir");
    fs::write(
        dir.join("plugin.json"),
        serde_json::to_string_pretty(&json!({ "name": "demo", "agents": entries }))
            .expect("manifest json"),
    )
    .expect("write manifest");
}

#[test]
fn well_formed_descriptor_is_clean() {
    let tmp = tempdir().expect("tempdir");
    let dir = tmp.path().join("agents");
    write_agent(
        &dir,
        "foo.md",
        "name: foo\ndescription: Reviews diffs for defects!\ntools: [Read, Write]\n",
    );

    let run = agents::run_agents(tmp.path(), &Config::default(), &AgentsOptions::default())
        .expect("run");
    assert_eq!(run.documents, 1);
    assert_eq!(run.outcome.error_count(), 0);
    assert_eq!(run.outcome.warning_count(), 0);
}

#[test]
fn renamed_descriptor_warns_once() {
    let tmp = tempdir().expect("tempdir");
    write_agent(
        &tmp.path().join("agents"),
        "baz.md",
        "name: bar\ndescription: Reviews diffs for defects!\ntools: [Read, Write]\n",
    );
    let run = agents::run_agents(tmp.path(), &Config::default(), &AgentsOptions::default())
        .expect("run");
    assert_eq!(run.outcome.error_count(), 0);
    assert_eq!(run.outcome.warning_count(), 1);
}

#[test]
fn manifest_short_by_one_is_a_single_count_error() {
    let tmp = tempdir().expect("tempdir");
    let dir = tmp.path().join("agents");
    let header = |n: &str| {
        format!(
            "name: {}\ndescription: Reviews diffs for defects!\ntools: [Read]\n",
            n
        )
    };
    for name in ["a", "b", "c", "d"] {
        write_agent(&dir, &format!("{}.md", name), &header(name));
    }
    write_manifest(
        tmp.path(),
        json!(["./agents/a.md", "./agents/b.md", "./agents/c.md"]),
    );

    let run = agents::run_agents(tmp.path(), &Config::default(), &AgentsOptions::default())
        .expect("run");
    assert_eq!(run.outcome.error_count(), 0);
    let manifest = run.manifest.expect("manifest checked");
    assert_eq!(manifest.entries, 3);
    let errors: Vec<_> = manifest.outcome.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, IssueKind::Referential);
    assert!(errors[0].message.contains("declares 3"));
    assert!(errors[0].message.contains("but 4 exist"));

    write_manifest(
        tmp.path(),
        json!(["./agents/a.md", "./agents/b.md", "./agents/c.md", "./agents/d.md"]),
    );
    let run = agents::run_agents(tmp.path(), &Config::default(), &AgentsOptions::default())
        .expect("run");
    assert!(run.manifest.expect("manifest checked").outcome.is_empty());
}

#[test]
fn missing_descriptor_directory_aborts() {
    let tmp = tempdir().expect("tempdir");
    let err = agents::run_agents(tmp.path(), &Config::default(), &AgentsOptions::default())
        .expect_err("no agents dir");
    assert!(matches!(err, AgentlintError::NotFound(_)));
}

#[test]
fn hook_script_resolution_end_to_end() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    fs::create_dir_all(root.join(".claude/hooks")).expect("hooks dir");
    fs::write(root.join(".claude/hooks/fmt.py"), "print('ok')\n").expect("script");
    fs::write(
        root.join(".claude/settings.json"),
        serde_json::to_string(&json!({ "hooks": {
            "PostToolUse": [{
                "matcher": "Write|Edit",
                "hooks": [
                    { "type": "command", "command": "python3 \"$CLAUDE_PROJECT_DIR/.claude/hooks/fmt.py\"", "timeout": 30 },
                    { "type": "command", "command": "python3 .claude/hooks/lint.py", "timeout": 30 }
                ]
            }]
        } }))
        .expect("settings json"),
    )
    .expect("write settings");

    let resolver = PathResolver::new(root).with_var("CLAUDE_PROJECT_DIR", root.to_string_lossy());
    let run = run_hooks(
        &Config::default(),
        &resolver,
        HookSelection {
            global: false,
            project: true,
        },
    );
    assert_eq!(run.checked(), 1);
    assert_eq!(run.hooks(), 1);

    let outcome = run.outcome();
    let errors: Vec<_> = outcome.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, IssueKind::Referential);
    let expected = root.join(".claude").join("hooks").join("lint.py");
    assert!(errors[0].message.contains(&expected.display().to_string()));
    assert_eq!(errors[0].location.action, Some(1));
}

#[test]
fn source_without_hooks_key_yields_one_structural_error() {
    let rules = Config::default().hooks;
    let resolver = PathResolver::new(".");
    let report = HookValidator::new(&rules, &resolver).validate(
        &json!({ "permissions": { "allow": ["Bash(ls)"] } }),
        "global",
    );
    assert_eq!(report.outcome.diagnostics.len(), 1);
    assert_eq!(report.outcome.diagnostics[0].kind, IssueKind::Structural);
    assert_eq!(report.summary().hooks, 0);
}

#[test]
fn header_round_trips_through_serialization() {
    let text = "---\nname: planner\ndescription: \"  padded: value  \"\ntools: [Read, Grep, \"Bash(git *)\"]\nskills:\n  - review\n  - '- dash'\n---\nbody\n";
    let doc = parse_document(text).expect("parse");
    assert_eq!(
        doc.header.get("tools"),
        Some(&FieldValue::List(vec![
            "Read".into(),
            "Grep".into(),
            "Bash(git *)".into()
        ]))
    );
    let again = parse_document(&format!("{}body\n", doc.header.to_header())).expect("reparse");
    assert_eq!(again.header, doc.header);
}

#[test]
fn config_file_overrides_defaults() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(config::CONFIG_FILE),
        "[agents]\ndir = \"subagents\"\n\n[hooks]\nmax_timeout = 120\n",
    )
    .expect("write config");
    let config = config::load_config(tmp.path(), None).expect("load");
    assert_eq!(config.agents.dir, "subagents");
    assert_eq!(config.hooks.max_timeout, 120);
    assert_eq!(config.hooks.min_timeout, 1);
    assert_eq!(config.manifest.key, "agents");
}

#[test]
fn report_fails_when_any_section_has_errors() {
    let tmp = tempdir().expect("tempdir");
    write_agent(&tmp.path().join("agents"), "x.md", "model: gpt\n");
    let run = agents::run_agents(tmp.path(), &Config::default(), &AgentsOptions::default())
        .expect("run");

    let mut report = Report::new();
    report.descriptors = run.documents;
    report.push(Section::new("agents", Some(run.dir), run.outcome));
    let summary = report.summary();
    assert!(!summary.passed);
    // three missing fields plus the unknown model
    assert_eq!(summary.errors, 4);
    assert!(report
        .remediations()
        .iter()
        .any(|r| r.contains("descriptor header")));
}
