use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_optresolve");

/// `ls`-like definition with a required output group and defaults.
const DEFINITION_YAML: &str = r#"options:
  - short: a
    long: all
    description: Show hidden entries
  - short: w
    long: width
    args: 1
    arg_name: COLS
  - short: D
    args: unlimited
    value_separator: "="
  - long: debug
  - long: dump
groups:
  - required: true
    options:
      - long: json
      - long: yaml
defaults:
  width: "80"
"#;

fn write_definition(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write definition");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run optresolve")
}

fn parse(definition: &Path, extra: &[&str], tokens: &[&str]) -> Output {
    let mut args = vec!["parse", "--definition", definition.to_str().unwrap()];
    args.extend_from_slice(extra);
    args.push("--");
    args.extend_from_slice(tokens);
    run(&args)
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_resolved_options_and_args() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "ls.yaml", DEFINITION_YAML);

    let output = parse(&definition, &[], &["-aw", "100", "--json", "src", "--", "-a"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    let keys: Vec<&str> = json["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["a", "w", "json"]);
    assert_eq!(json["options"][1]["values"][0], "100");
    assert_eq!(json["args"], serde_json::json!(["src", "-a"]));
}

#[test]
fn parse_applies_definition_and_cli_defaults() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "ls.yaml", DEFINITION_YAML);

    let output = parse(&definition, &[], &["--yaml"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["options"][1]["key"], "w");
    assert_eq!(json["options"][1]["values"][0], "80");

    let output = parse(&definition, &["--default", "width=120"], &["--yaml"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["options"][1]["values"][0], "120");
}

#[test]
fn parse_reports_resolution_errors() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "ls.yaml", DEFINITION_YAML);

    let output = parse(&definition, &[], &["--json", "--d"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: ambiguous option"), "{stderr}");

    let output = parse(&definition, &[], &["-a"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required option"), "{stderr}");

    let output = parse(&definition, &[], &["--json", "--yaml"]);
    assert!(!output.status.success());
}

#[test]
fn parse_honors_exact_and_stop_flags() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "ls.yaml", DEFINITION_YAML);

    let output = parse(&definition, &[], &["--json", "--al"]);
    assert!(output.status.success());

    let output = parse(&definition, &["--exact"], &["--json", "--al"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized option: --al"), "{stderr}");

    let output = parse(
        &definition,
        &["--stop-at-non-option"],
        &["--json", "--bogus", "-a"],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["args"], serde_json::json!(["--bogus", "-a"]));
}

#[test]
fn parse_reads_json_definitions_and_yaml_output() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(
        &dir,
        "tool.json",
        r#"{"options": [{"short": "o", "long": "output", "args": 1, "required": true}]}"#,
    );

    let output = parse(&definition, &["--format", "yaml"], &["--output=out.txt"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("key: o"), "{stdout}");
    assert!(stdout.contains("- out.txt"), "{stdout}");
}

// ---------------------------------------------------------------------------
// validate / inspect
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_clean_definition() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "ls.yaml", DEFINITION_YAML);

    let output = run(&["validate", "--definition", definition.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("7 option(s), 1 group(s)"), "{stdout}");
}

#[test]
fn validate_counts_each_option_once() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(
        &dir,
        "shared.yaml",
        "options:\n  - short: f\ngroups:\n  - options:\n      - short: f\n      - short: m\n",
    );

    let output = run(&["validate", "--definition", definition.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 option(s), 1 group(s)"), "{stdout}");
}

#[test]
fn validate_reports_every_problem() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(
        &dir,
        "bad.yaml",
        "options:\n  - short: a\n    long: all\n  - short: b\n    long: all\ndefaults:\n  nope: x\n",
    );

    let output = run(&["validate", "--definition", definition.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Found 2 problem(s)"), "{stderr}");
}

#[test]
fn validate_rejects_malformed_names() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "bad.yaml", "options:\n  - long: \"-x\"\n");

    let output = run(&["validate", "--definition", definition.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn inspect_lists_registry_contents() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "ls.yaml", DEFINITION_YAML);

    let output = run(&[
        "inspect",
        "--definition",
        definition.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["options"].as_array().unwrap().len(), 7);
    assert_eq!(json["groups"].as_array().unwrap().len(), 1);
    assert_eq!(json["required"][0]["group"]["members"], serde_json::json!(["json", "yaml"]));
    assert_eq!(json["defaults"]["width"], "80");
    assert_eq!(json["settings"]["partial_matching"], true);
}

#[test]
fn missing_definition_file_fails() {
    let output = run(&["inspect", "--definition", "/nonexistent/definition.yaml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Failed to read"), "{stderr}");
}
