//! CLI integration tests for dbf-pg-schema.
//!
//! These tests verify command-line argument parsing, help output,
//! DDL generation from real DBF headers, and exit codes for error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get a command for the dbf-pg-schema binary.
fn cmd() -> Command {
    Command::cargo_bin("dbf-pg-schema").unwrap()
}

/// Build a DBF header (no records) with `(name, type, length, decimal)` fields.
fn dbf_bytes(fields: &[(&str, char, u8, u8)]) -> Vec<u8> {
    let header_length = 32 + 32 * fields.len() + 1;
    let record_length: usize = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();

    let mut out = vec![0u8; 32];
    out[0] = 0x03;
    out[1] = 124;
    out[2] = 1;
    out[3] = 15;
    out[8..10].copy_from_slice(&(header_length as u16).to_le_bytes());
    out[10..12].copy_from_slice(&(record_length as u16).to_le_bytes());

    for (name, type_code, length, decimal) in fields {
        let mut descriptor = [0u8; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = *type_code as u8;
        descriptor[16] = *length;
        descriptor[17] = *decimal;
        out.extend_from_slice(&descriptor);
    }
    out.push(0x0D);
    out.push(0x1A);
    out
}

/// Write `clientes.dbf` into `dir`.
fn clientes_dbf(dir: &Path) -> PathBuf {
    let path = dir.join("clientes.dbf");
    std::fs::write(
        &path,
        dbf_bytes(&[
            ("NOME", 'C', 30, 0),
            ("SENHA", 'C', 12, 0),
            ("VALOR", 'N', 12, 2),
            ("NASC", 'D', 8, 0),
        ]),
    )
    .unwrap();
    path
}

/// Config path that does not exist, so defaults are used.
fn no_config(dir: &Path) -> String {
    dir.join("absent.yaml").to_str().unwrap().to_string()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("create"));
}

#[test]
fn test_generate_subcommand_help() {
    cmd()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--exclude"))
        .stdout(predicate::str::contains("--preview"))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn test_create_subcommand_help() {
    cmd()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbf-pg-schema"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Inspect Tests
// =============================================================================

#[test]
fn test_inspect_lists_fields() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "inspect"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Table: clientes"))
        .stdout(predicate::str::contains("dBASE III"))
        .stdout(predicate::str::contains("Fields: 4"))
        .stdout(predicate::str::contains("VALOR"));
}

#[test]
fn test_inspect_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "--output-json", "inspect"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"table_name\": \"clientes\""))
        .stdout(predicate::str::contains("\"type\": \"N\""));
}

// =============================================================================
// Generate Tests
// =============================================================================

#[test]
fn test_generate_basic_table() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "generate"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("CREATE TABLE clientes ("))
        .stdout(predicate::str::contains("local_id SERIAL PRIMARY KEY"))
        .stdout(predicate::str::contains("nome VARCHAR(30)"))
        .stdout(predicate::str::contains("valor NUMERIC(12,2)"))
        .stdout(predicate::str::contains("nasc DATE"))
        .stdout(predicate::str::contains("created_at").not());
}

#[test]
fn test_generate_audit_mode_with_exclusion() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args([
            "--config",
            &no_config(dir.path()),
            "generate",
            "--mode",
            "audit",
            "--exclude",
            "senha",
        ])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL"))
        .stdout(predicate::str::contains("updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL"))
        .stdout(predicate::str::contains("senha").not());
}

#[test]
fn test_generate_uses_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    let config_path = dir.path().join("config.yaml");
    let mut config = std::fs::File::create(&config_path).unwrap();
    writeln!(config, "features:").unwrap();
    writeln!(config, "  table_mode: timestamp").unwrap();
    writeln!(config, "translation:").unwrap();
    writeln!(config, "  exclude_fields: [NASC]").unwrap();
    writeln!(config, "  pk_prefix: dbf_").unwrap();

    cmd()
        .args(["--config", config_path.to_str().unwrap(), "generate"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("dbf_id SERIAL PRIMARY KEY"))
        .stdout(predicate::str::contains("created_at"))
        .stdout(predicate::str::contains("updated_at").not())
        .stdout(predicate::str::contains("nasc").not());
}

#[test]
fn test_generate_preview_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());
    let out_dir = dir.path().join("generated_sql");

    cmd()
        .args(["--config", &no_config(dir.path()), "generate", "--preview", "--output-dir"])
        .arg(&out_dir)
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Preview written to"));

    let previews: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(previews.len(), 1);

    let content = std::fs::read_to_string(&previews[0]).unwrap();
    assert!(content.starts_with("-- SQL Preview generated for table: clientes\n"));
    assert!(content.contains("CREATE TABLE clientes ("));
}

#[test]
fn test_generate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "--output-json", "generate"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ddl\": \"CREATE TABLE clientes"))
        .stdout(predicate::str::contains("\"primary_key_name\": \"local_id\""))
        .stdout(predicate::str::contains("\"preview\": null"));
}

#[test]
fn test_generate_rejects_unknown_mode() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "generate", "--mode", "fancy"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("fancy"));
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_create_dry_run_does_not_connect() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "create", "--dry-run"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("CREATE TABLE clientes ("));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_dbf_exits_with_code_7() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["--config", &no_config(dir.path()), "generate"])
        .arg(dir.path().join("missing.dbf"))
        .assert()
        .code(7); // EXIT_IO_ERROR
}

#[test]
fn test_wrong_extension_exits_with_code_5() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clientes.csv");
    std::fs::write(&file, dbf_bytes(&[("NOME", 'C', 30, 0)])).unwrap();

    cmd()
        .args(["--config", &no_config(dir.path()), "inspect"])
        .arg(&file)
        .assert()
        .code(5); // EXIT_SOURCE_ERROR
}

#[test]
fn test_unsupported_type_exits_with_code_3() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("odd.dbf");
    std::fs::write(&file, dbf_bytes(&[("NOME", 'C', 30, 0), ("ODD", 'Q', 4, 0)])).unwrap();

    cmd()
        .args(["--config", &no_config(dir.path()), "generate"])
        .arg(&file)
        .assert()
        .code(3) // EXIT_UNSUPPORTED_TYPE
        .stderr(predicate::str::contains("Unsupported DBF field type: Q"));
}

#[test]
fn test_field_named_created_at_in_timestamp_mode_exits_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("eventos.dbf");
    std::fs::write(&file, dbf_bytes(&[("NOME", 'C', 30, 0), ("CREATED_AT", 'D', 8, 0)])).unwrap();

    cmd()
        .args(["--config", &no_config(dir.path()), "generate", "--mode", "timestamp"])
        .arg(&file)
        .assert()
        .code(2) // EXIT_VALIDATION_ERROR
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("CREATED_AT"));

    // Basic mode adds no timestamp column, so the field is kept
    cmd()
        .args(["--config", &no_config(dir.path()), "generate"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("created_at DATE"));
}

#[test]
fn test_field_name_with_sql_exits_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clientes.dbf");
    std::fs::write(&file, dbf_bytes(&[("NOME", 'C', 30, 0), ("A);DROP--", 'C', 5, 0)])).unwrap();

    cmd()
        .args(["--config", &no_config(dir.path()), "generate"])
        .arg(&file)
        .assert()
        .code(2) // EXIT_VALIDATION_ERROR
        .stdout(predicate::str::contains("DROP").not());
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", config.path().to_str().unwrap(), "generate"])
        .arg(&file)
        .assert()
        .code(1); // EXIT_CONFIG_ERROR
}

#[test]
fn test_invalid_config_values_exit_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "database:").unwrap();
    writeln!(config, "  port: 0").unwrap();

    cmd()
        .args(["--config", config.path().to_str().unwrap(), "generate"])
        .arg(&file)
        .assert()
        .code(1); // EXIT_CONFIG_ERROR
}

#[test]
fn test_unknown_log_format_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .args(["--config", &no_config(dir.path()), "--log-format", "xml", "generate"])
        .arg(&file)
        .assert()
        .code(1);
}

// =============================================================================
// Logging Tests
// =============================================================================

#[test]
fn test_verbosity_controls_log_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = clientes_dbf(dir.path());

    cmd()
        .env_remove("RUST_LOG")
        .args(["--config", &no_config(dir.path()), "--verbosity", "debug", "generate"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Generating basic table clientes"));

    cmd()
        .env_remove("RUST_LOG")
        .args(["--config", &no_config(dir.path()), "--verbosity", "error", "generate"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated table").not());
}
