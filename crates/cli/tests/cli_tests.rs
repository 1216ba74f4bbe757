// End-to-end tests for the docreg binary: exit codes, the --json stdout
// contract, and report files.
//
// Run with: cargo test -p docreg-cli --test cli_tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn docreg() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docreg"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("DOCREG_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    docreg().args(args).output().expect("failed to run docreg")
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("process terminated by signal")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}"))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const WAREHOUSE: &str = "tests/fixtures/warehouse.docreg.toml";

/// Write a config, a two-row register and a local storage tree under `dir`.
fn write_clean_project(dir: &Path) {
    fs::write(
        dir.join("project.docreg.toml"),
        r#"name = "L25_2016 - Warehouse"

[register]
file = "register.csv"

[storage]
root = "drive"

[output]
json = "out/result.json"
"#,
    )
    .unwrap();
    fs::write(
        dir.join("register.csv"),
        "full_name,revisao_atual_col_g,disciplina_ld\n\
         25.2016.00.PC.ARQ.004.PLA,2,ARQ\n\
         25.2016.00.PC.ELE.001.ILU,0,ELE\n",
    )
    .unwrap();
    fs::create_dir_all(dir.join("drive/1 Arq/Antigos")).unwrap();
    fs::create_dir_all(dir.join("drive/9 Elétr")).unwrap();
    fs::create_dir_all(dir.join("out")).unwrap();
    fs::write(dir.join("drive/1 Arq/25.2016.00.PC.ARQ.004.PLA.R02.pdf"), b"").unwrap();
    fs::write(dir.join("drive/1 Arq/Antigos/25.2016.00.PC.ARQ.004.PLA.R01.pdf"), b"").unwrap();
    fs::write(dir.join("drive/9 Elétr/25.2016.00.PC.ELE.001.ILU.R00.pdf"), b"").unwrap();
    fs::write(dir.join("drive/9 Elétr/notes.txt"), b"").unwrap();
}

// ===========================================================================
// recon run
// ===========================================================================

#[test]
fn recon_run_divergences_exit_1() {
    let output = run(&["recon", "run", WAREHOUSE, "--json"]);
    assert_eq!(code(&output), 1, "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["meta"]["project"], "L25_2016 - Warehouse");
    assert_eq!(report["stats"]["register_items"], 4);
    assert_eq!(report["stats"]["storage_files"], 6);
    assert_eq!(report["stats"]["matched_register"], 3);
    assert_eq!(report["stats"]["superseded"], 1);

    let arq = &report["disciplines"]["ARQ"];
    assert_eq!(arq["register_only"][0]["full_name"], "25.2016.00.PC.ARQ.005.PLA");
    assert_eq!(arq["storage_only"][0]["name"], "25.2016.00.PC.ARQ.005.PLA.R02.pdf");
    assert_eq!(report["disciplines"]["UNMAPPED"]["storage_only"][0]["name"], "Memorial Descritivo.pdf");

    let err = stderr(&output);
    assert!(err.contains("error: divergences found"), "stderr: {err}");
    assert!(err.contains("1 register only"), "stderr: {err}");
}

#[test]
fn recon_run_human_summary_keeps_stdout_empty() {
    let output = run(&["recon", "run", WAREHOUSE]);
    assert_eq!(code(&output), 1);
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("recon 'L25_2016 - Warehouse': 4 register items, 6 storage files"));
}

#[test]
fn recon_run_clean_project_exit_0_and_writes_reports() {
    let dir = tempdir().unwrap();
    write_clean_project(dir.path());
    let config = dir.path().join("project.docreg.toml");
    let xlsx = dir.path().join("report.xlsx");

    let output = docreg()
        .args(["recon", "run"])
        .arg(&config)
        .arg("--xlsx")
        .arg(&xlsx)
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    // output.json resolves against the config directory
    let written = fs::read_to_string(dir.path().join("out/result.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(report["stats"]["matched_register"], 2);
    assert_eq!(report["stats"]["superseded"], 1);
    assert_eq!(report["disciplines"], serde_json::json!({}));

    assert!(xlsx.exists());
    assert!(stderr(&output).contains("wrote"));
}

#[test]
fn recon_run_output_flag_overrides_config() {
    let dir = tempdir().unwrap();
    write_clean_project(dir.path());
    let config = dir.path().join("project.docreg.toml");
    let explicit = dir.path().join("explicit.json");

    let output = docreg()
        .args(["recon", "run"])
        .arg(&config)
        .arg("--output")
        .arg(&explicit)
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(explicit.exists());
    assert!(!dir.path().join("out/result.json").exists());
}

#[test]
fn recon_run_flag_colliding_with_configured_output_is_usage_error() {
    let dir = tempdir().unwrap();
    write_clean_project(dir.path());
    let config = dir.path().join("project.docreg.toml");
    let configured_json = dir.path().join("out/result.json");

    // --xlsx points at the file [output].json already names
    let output = docreg()
        .args(["recon", "run"])
        .arg(&config)
        .arg("--xlsx")
        .arg(&configured_json)
        .output()
        .unwrap();
    assert_eq!(code(&output), 2, "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("different files"));
    assert!(!configured_json.exists());
}

#[test]
fn recon_run_empty_register_exit_62() {
    let output = run(&["recon", "run", "tests/fixtures/filtered-out.docreg.toml"]);
    assert_eq!(code(&output), 62);
    let err = stderr(&output);
    assert!(err.contains("error:"), "stderr: {err}");
    assert!(err.contains("hint:"), "stderr: {err}");
    assert!(output.stdout.is_empty());
}

#[test]
fn recon_run_invalid_config_exit_60() {
    let output = run(&["recon", "run", "tests/fixtures/both-sources.docreg.toml"]);
    assert_eq!(code(&output), 60);
    assert!(stderr(&output).contains("mutually exclusive"));
}

#[test]
fn recon_run_missing_config_exit_61() {
    let output = run(&["recon", "run", "tests/fixtures/nope.docreg.toml"]);
    assert_eq!(code(&output), 61);
}

#[test]
fn recon_run_missing_register_exit_61() {
    let dir = tempdir().unwrap();
    write_clean_project(dir.path());
    fs::remove_file(dir.path().join("register.csv")).unwrap();

    let output = docreg()
        .args(["recon", "run"])
        .arg(dir.path().join("project.docreg.toml"))
        .output()
        .unwrap();
    assert_eq!(code(&output), 61);
    assert!(stderr(&output).contains("register.csv"));
}

#[test]
fn recon_run_without_args_is_usage_error() {
    let output = run(&["recon", "run"]);
    assert_eq!(code(&output), 2);
}

// ===========================================================================
// recon validate
// ===========================================================================

#[test]
fn recon_validate_reports_context() {
    let output = run(&["recon", "validate", WAREHOUSE]);
    assert_eq!(code(&output), 0);
    let err = stderr(&output);
    assert!(err.contains("valid: 'L25_2016 - Warehouse' (year 2025, project 2016)"), "stderr: {err}");
    assert!(err.contains("manifest"));
}

#[test]
fn recon_validate_rejects_invalid() {
    let output = run(&["recon", "validate", "tests/fixtures/both-sources.docreg.toml"]);
    assert_eq!(code(&output), 60);
}

// ===========================================================================
// register summary
// ===========================================================================

#[test]
fn register_summary_json() {
    let output = run(&["register", "summary", WAREHOUSE, "--json"]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let summary = stdout_json(&output);
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["by_situation"]["EMITIDO"], 3);
    assert_eq!(summary["by_situation"]["CANCELADO"], 1);
    assert_eq!(summary["by_status"]["APROVADO"], 2);
    assert_eq!(summary["by_status"]["(blank)"], 1);
}

#[test]
fn register_summary_applies_filters() {
    let dir = tempdir().unwrap();
    write_clean_project(dir.path());
    let config = dir.path().join("project.docreg.toml");
    let mut text = fs::read_to_string(&config).unwrap();
    text.push_str("\n[filters]\ndiscipline = \"arq\"\n");
    fs::write(&config, text).unwrap();

    let output = docreg().args(["register", "summary"]).arg(&config).arg("--json").output().unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let summary = stdout_json(&output);
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["filters"]["discipline"], "arq");
    assert_eq!(summary["by_discipline"]["ARQ"], 1);
}

#[test]
fn register_summary_xlsx() {
    let dir = tempdir().unwrap();
    let xlsx = dir.path().join("register.xlsx");
    let output = docreg()
        .args(["register", "summary", WAREHOUSE, "--xlsx"])
        .arg(&xlsx)
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(xlsx.exists());
    assert!(stderr(&output).contains("register 'L25_2016 - Warehouse': 4 documents"));
}

// ===========================================================================
// parse
// ===========================================================================

#[test]
fn parse_json_gives_join_key() {
    let output = run(&["parse", "25.2016.00.PC.ARQ.004.PLA.R02.pdf", "--json"]);
    assert_eq!(code(&output), 0);

    let parsed = stdout_json(&output);
    let first = &parsed[0];
    assert_eq!(first["filename"], "25.2016.00.PC.ARQ.004.PLA.R02.pdf");
    assert_eq!(first["valid"], true);
    assert_eq!(first["variant"], "standard");
    assert_eq!(first["discipline_code"], "ARQ");
    assert_eq!(first["key_base_name"], "25.2016.00.pc.arq.004.pla");
    assert_eq!(first["key_revision"], ".R02");
}

#[test]
fn parse_reports_context_mismatch() {
    let output = run(&[
        "parse",
        "25.2016.00.PC.ARQ.004.PLA.R02.pdf",
        "--year",
        "2024",
        "--project",
        "2016",
    ]);
    assert_eq!(code(&output), 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("grammar 1\tinvalid"), "stdout: {stdout}");
    assert!(stdout.contains("does not match folder year"), "stdout: {stdout}");
}

#[test]
fn parse_unrecognized_name_uses_fallback_key() {
    let output = run(&["parse", "Planta_Baixa-R03.pdf", "--json"]);
    assert_eq!(code(&output), 0);
    let parsed = stdout_json(&output);
    assert_eq!(parsed[0]["valid"], false);
    assert_eq!(parsed[0]["variant"], serde_json::Value::Null);
    assert_eq!(parsed[0]["reject_reason"], "pattern not recognized");
    assert_eq!(parsed[0]["key_base_name"], "planta_baixa");
    assert_eq!(parsed[0]["key_revision"], ".R03");
}
