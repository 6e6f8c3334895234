//! End-to-end tests for the cdic command line

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

/// The binary run from an empty directory with no config in the environment
fn cdic(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cdic").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CDIC_CONFIG")
        .env_remove("CDIC_API_URL")
        .env_remove("CDIC_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Decimals are written as strings in form files
fn decimal(value: &serde_json::Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

#[test]
fn form_init_add_and_show() {
    let dir = TempDir::new().unwrap();
    let form = dir.path().join("form.json");

    cdic(&dir)
        .args(["form", "init", "-o", "form.json"])
        .assert()
        .success();
    assert_eq!(read_json(&form)["installments"].as_array().unwrap().len(), 1);

    cdic(&dir)
        .args(["form", "set", "-f", "form.json", "1", "--due", "01022026", "--amount", "1500"])
        .assert()
        .success();
    cdic(&dir)
        .args(["form", "add", "-f", "form.json", "--kind", "interest", "--due", "01/02/2026"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added installment 2"));

    let json = read_json(&form);
    assert_eq!(json["installments"][0]["due_date"], "01/02/2026");
    assert_eq!(json["installments"][0]["principal"], "1500.00");
    assert_eq!(json["installments"][1]["kind"], 1);
    assert_eq!(json["installments"][1]["principal"], "0");

    cdic(&dir)
        .args(["form", "show", "-f", "form.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Percentual CDI:  14,9%"))
        .stdout(predicate::str::contains("R$ 1.500,00"))
        .stdout(predicate::str::contains("Juros"));
}

#[test]
fn form_refuses_to_remove_last_installment() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["form", "init", "-o", "form.json"])
        .assert()
        .success();

    cdic(&dir)
        .args(["form", "remove", "-f", "form.json", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one installment"));
}

#[test]
fn form_params_parse_percentages_and_dates() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["form", "init", "-o", "form.json"])
        .assert()
        .success();
    cdic(&dir)
        .args([
            "form", "params", "-f", "form.json", "--cdi", "110,5", "--spread", "2", "--start",
            "01032026",
        ])
        .assert()
        .success();

    let json = read_json(&dir.path().join("form.json"));
    assert_eq!(json["start_date"], "01/03/2026");
    assert_eq!(decimal(&json["cdi_rate"]), 1.105);
    assert_eq!(decimal(&json["annual_spread"]), 0.02);
}

#[test]
fn validate_reports_errors_with_exit_code() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["form", "init", "-o", "form.json"])
        .assert()
        .success();

    cdic(&dir)
        .args(["validate", "-f", "form.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("parcela_0_vencimento"))
        .stdout(predicate::str::contains("Vencimento é obrigatório"));

    cdic(&dir)
        .args(["validate", "-f", "form.json", "--json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"valid\": false"));
}

#[test]
fn validate_accepts_complete_form() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["validate", "-f"])
        .arg(data("form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Form is valid (4 installments)"));
}

#[test]
fn schedule_writes_form_file() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args([
            "schedule", "--start", "31/01/2026", "--amount", "3000", "-n", "3", "--cdi", "100",
            "-o", "schedule.json",
        ])
        .assert()
        .success();

    let json = read_json(&dir.path().join("schedule.json"));
    let rows = json["installments"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["kind"], 1);
    assert_eq!(rows[0]["due_date"], "28/02/2026");
    assert_eq!(rows[1]["kind"], 0);
    assert_eq!(rows[1]["principal"], "1000.00");
    assert_eq!(rows[5]["due_date"], "30/04/2026");
    assert_eq!(json["start_date"], "31/01/2026");
    assert_eq!(decimal(&json["cdi_rate"]), 1.0);

    cdic(&dir)
        .args(["validate", "-f", "schedule.json"])
        .assert()
        .success();
}

#[test]
fn schedule_prints_table() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["schedule", "--start", "15/01/2026", "--amount", "1000", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15/03/2026"))
        .stdout(predicate::str::contains("R$ 500,00"));
}

#[test]
fn schedule_rejects_zero_installments() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["schedule", "--start", "15/01/2026", "--amount", "1000", "-n", "0"])
        .assert()
        .failure();
}

#[test]
fn calculate_posts_form_and_renders_results() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/jurosPosFixados/calcular-parcelas")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "dataInicial": "2026-01-01",
            "dataReferencia": "2026-04-15"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fs::read_to_string(data("response.json")).unwrap())
        .expect(1)
        .create();

    cdic(&dir)
        .args(["calculate", "--api-url", &server.url(), "--save-response", "saved.json", "-f"])
        .arg(data("form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Vencimento"))
        .stdout(predicate::str::contains("R$ 1.000,00"))
        .stdout(predicate::str::contains("R$ 23,17"))
        .stdout(predicate::str::contains("Página 1 de 1"));

    mock.assert();
    let saved = read_json(&dir.path().join("saved.json"));
    assert_eq!(saved["parcelas"].as_array().unwrap().len(), 4);
}

#[test]
fn calculate_surfaces_service_errors() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/jurosPosFixados/calcular-parcelas")
        .with_status(500)
        .with_body(r#"{"error":{"message":"Série CDI indisponível"}}"#)
        .create();

    cdic(&dir)
        .args(["calculate", "--api-url", &server.url(), "-f"])
        .arg(data("form.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Série CDI indisponível"));
}

#[test]
fn calculate_uses_configured_url() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/jurosPosFixados/calcular-parcelas")
        .with_status(200)
        .with_body(r#"{"parcelas": []}"#)
        .create();
    fs::write(
        dir.path().join("cdic.toml"),
        format!("[api]\nbase_url = \"{}/api\"\n", server.url()),
    )
    .unwrap();

    cdic(&dir)
        .args(["calculate", "-f"])
        .arg(data("form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Nenhum resultado encontrado."));
    mock.assert();
}

#[test]
fn table_sorts_filters_and_pages() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["table", "--kind", "interest", "--sort", "interest", "--desc", "-r"])
        .arg(data("response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 23,17"))
        .stdout(predicate::str::contains("R$ 1.000,00").not())
        .stdout(predicate::str::contains("Total juros: R$ 34,19"));

    cdic(&dir)
        .args(["table", "--page-size", "3", "--page", "2", "-r"])
        .arg(data("response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Página 2 de 2"));
}

#[test]
fn table_csv_output() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["table", "--csv", "-r"])
        .arg(data("response.json"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "tipo,liquidada,vencimento,valor_principal,valor_juros\n",
        ))
        .stdout(predicate::str::contains("Principal,Sim,01/02/2026,\"R$ 1.000,00\",-"));
}

#[test]
fn schema_describes_formats() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("InstallmentForm"))
        .stdout(predicate::str::contains("reference_date"));

    cdic(&dir)
        .args(["schema", "csv-header"])
        .assert()
        .success()
        .stdout("tipo,liquidada,vencimento,valor_principal,valor_juros\n");
}

#[test]
fn schedule_with_many_installments_stays_valid() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args([
            "schedule", "--start", "01/01/2026", "--amount", "1000", "-n", "600", "-o", "long.json",
        ])
        .assert()
        .success();

    let json = read_json(&dir.path().join("long.json"));
    let rows = json["installments"].as_array().unwrap();
    assert!(rows
        .iter()
        .all(|row| !row["principal"].as_str().unwrap().starts_with('-')));

    cdic(&dir)
        .args(["validate", "-f", "long.json"])
        .assert()
        .success();
}

#[test]
fn ambiguous_thousands_amount_is_rejected() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["schedule", "--start", "01/01/2026", "--amount", "1.500", "-n", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous amount"));
}

#[test]
fn zero_timeout_is_rejected() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .env("CDIC_TIMEOUT_SECS", "0")
        .args(["table", "-r"])
        .arg(data("response.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout must be at least 1 second"));
}

#[test]
fn table_links_neighbouring_pages() {
    let dir = TempDir::new().unwrap();
    cdic(&dir)
        .args(["table", "--page-size", "1", "--page", "2", "-r"])
        .arg(data("response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("« anterior: --page 1 | próxima: --page 3 »"));
}
