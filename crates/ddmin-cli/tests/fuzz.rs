use assert_cmd::cargo::cargo_bin_cmd;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn load_schema() -> JSONSchema {
    let schema_path = repo_root().join("schemas").join("ddmin-result.schema.json");
    let schema_text = fs::read_to_string(schema_path).expect("read schema");
    let schema_json: Value = serde_json::from_str(&schema_text).expect("parse schema");
    JSONSchema::compile(&schema_json).expect("compile schema")
}

fn run_json(args: &[&str]) -> Value {
    let output = cargo_bin_cmd!("ddmin")
        .args(args)
        .output()
        .expect("run ddmin");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("parse json")
}

#[test]
fn fuzz_is_reproducible_from_seed() {
    let schema = load_schema();
    let first = run_json(&["fuzz", "--count", "5", "--seed", "7"]);
    let second = run_json(&["fuzz", "--count", "5", "--seed", "7"]);

    assert!(schema.validate(&first).is_ok());
    assert_eq!(first["samples"], second["samples"]);
    assert_eq!(first["samples"].as_array().expect("samples").len(), 5);
}

#[test]
fn fuzz_with_max_length_one_is_empty() {
    let result = run_json(&["fuzz", "--count", "20", "--max-length", "1"]);
    let samples = result["samples"].as_array().expect("samples");

    assert!(samples.iter().all(|sample| sample == ""));
}

#[test]
fn evaluate_does_not_depend_on_jobs() {
    let schema = load_schema();
    let single = run_json(&["evaluate", "--tries", "200", "--jobs", "1", "--seed", "3"]);
    let many = run_json(&["evaluate", "--tries", "200", "--jobs", "4", "--seed", "3"]);

    assert!(schema.validate(&single).is_ok());
    assert_eq!(single["evaluation"], many["evaluation"]);
    assert!(single["evaluation"]["max_length"].as_u64().expect("max") < 100);
}
