use std::fs;
use std::path::Path;

use assert_cmd::Command;
use minuta_core::PdfWriter;
use predicates::prelude::*;
use tempfile::TempDir;

fn minuta() -> Command {
    let mut cmd = Command::cargo_bin("minuta").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Config with a two-token catalog and OCR disabled.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let catalog = dir.join("catalog.json");
    fs::write(&catalog, r#"["¿nome>", "¿cpf>"]"#).unwrap();

    let config = dir.join("config.json");
    let json = serde_json::json!({
        "catalog": { "path": catalog },
        "ocr": { "enabled": false },
    });
    fs::write(&config, json.to_string()).unwrap();
    config
}

#[test]
fn help_lists_commands() {
    minuta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn catalog_list_uses_configured_catalog() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["catalog", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"¿nome>\""))
        .stdout(predicate::str::contains("\"label\": \"cpf\""));
}

#[test]
fn catalog_check_flags_unknown_tokens() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let template = dir.path().join("modelo.txt");
    fs::write(&template, "¿nome>, portador de ¿rg>").unwrap();

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["catalog", "check"])
        .arg(&template)
        .assert()
        .failure()
        .stdout(predicate::str::contains("¿rg> (not in catalog)"))
        .stderr(predicate::str::contains("not in the catalog"));
}

#[test]
fn config_init_then_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "resolver.sentinel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DADO NÃO ENCONTRADO"));

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "server.port", "8080"])
        .assert()
        .success();

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8080"));

    minuta()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "server.colour", "blue"])
        .assert()
        .failure();
}

#[test]
fn generate_writes_pdf_with_failures_annotated() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let doc = dir.path().join("corrompido.pdf");
    fs::write(&doc, "not a pdf").unwrap();
    let template = dir.path().join("modelo.txt");
    fs::write(&template, "Outorgante: ¿nome>").unwrap();
    let output = dir.path().join("minuta.pdf");
    let corpus = dir.path().join("corpus.txt");

    minuta()
        .arg("-c")
        .arg(&config)
        .arg("generate")
        .arg("--docs")
        .arg(&doc)
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .arg("--dump-corpus")
        .arg(&corpus)
        .assert()
        .success()
        .stdout(predicate::str::contains("corrompido.pdf [failed]"))
        .stdout(predicate::str::contains("0/2 placeholders found"));

    assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));
    let corpus = fs::read_to_string(&corpus).unwrap();
    assert!(corpus.starts_with("=== Documento corrompido.pdf ===\n[Erro ao processar arquivo corrompido.pdf - "));
}

#[test]
fn generate_resolves_from_text_pdf() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let doc = dir.path().join("certidao.pdf");
    let pdf = PdfWriter::default()
        .render_text("CERTIDÃO\nnome: Ana Souza\ncpf: 111.222.333-44")
        .unwrap();
    fs::write(&doc, pdf).unwrap();
    let template = dir.path().join("modelo.txt");
    fs::write(&template, "Outorgante: ¿nome>").unwrap();

    minuta()
        .arg("-c")
        .arg(&config)
        .arg("generate")
        .arg("--docs")
        .arg(dir.path().join("*.pdf").to_string_lossy().as_ref())
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(dir.path().join("saida.pdf"))
        .arg("--show-resolution")
        .assert()
        .success()
        .stdout(predicate::str::contains("¿nome> = Ana Souza"))
        .stdout(predicate::str::contains("2/2 placeholders found"));
}

#[test]
fn generate_without_documents_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let template = dir.path().join("modelo.txt");
    fs::write(&template, "¿nome>").unwrap();

    minuta()
        .arg("-c")
        .arg(&config)
        .arg("generate")
        .arg("--docs")
        .arg(dir.path().join("*.pdf").to_string_lossy().as_ref())
        .arg("--template")
        .arg(&template)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input documents found"));
}
