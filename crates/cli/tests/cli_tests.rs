// End-to-end tests for the `pwatch` binary.
//
// Each test builds a throwaway config + snapshot directory and checks the
// stdout contract and exit codes.
//
// Run with: cargo test -p pricewatch-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

const CONFIG: &str = r#"
name = "dell-monitors"

[snapshots]
data_dir = "data"

[index]
file = "index.csv"
product_name = "Dell_product"

[reference]
file_prefix = "dell"
columns = { product_name = "Dell_product", price = "Dell_price" }

[retailers.bestbuy]
display_name = "Best Buy"
file_prefix = "bestbuy"
contact = "pricing@bestbuy.example"
columns = { sku = "Bestbuy_sku", price = "Bestbuy_price" }

[retailers.newegg]
file_prefix = "newegg"
contact = "vendors@newegg.example"
columns = { product_name = "Dell_product", price = "Newegg_price" }

[notice]
sender_name = "Channel Compliance"
organization = "Dell Technologies"
"#;

const DATE: &str = "2024-03-10";

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let data = root.join("data");
        fs::create_dir(&data).unwrap();

        fs::write(root.join("pricewatch.toml"), CONFIG).unwrap();
        fs::write(
            root.join("index.csv"),
            "Dell_product,Bestbuy_sku\nDell S2721D,1001\nDell P2422H,1002\nDell U2723QE,1003\n",
        )
        .unwrap();
        fs::write(
            data.join("dell_20240310.csv"),
            "Dell_product,Dell_price\nDell S2721D,100.00\nDell P2422H,200.00\nDell U2723QE,500.00\n",
        )
        .unwrap();
        fs::write(
            data.join("newegg_20240310.csv"),
            "Dell_product,Newegg_price\nDell S2721D,104.00\nDell P2422H,N/A\nDell U2723QE,450.00\n",
        )
        .unwrap();
        // Two days old: exercises the stale fallback
        fs::write(
            data.join("bestbuy_20240308.csv"),
            "Bestbuy_sku,Bestbuy_price\n1001,$120.00\n1002,200.00\n1003,\"$1,000.00\"\n",
        )
        .unwrap();

        Self { _dir: dir, root }
    }

    fn config(&self) -> PathBuf {
        self.root.join("pricewatch.toml")
    }

    fn run(&self, args: &[&str]) -> Output {
        pwatch()
            .arg("--config")
            .arg(self.config())
            .args(args)
            .output()
            .expect("run pwatch")
    }
}

fn pwatch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pwatch"));
    cmd.env_remove("PRICEWATCH_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn parse_json(output: &Output) -> serde_json::Value {
    let text = stdout(output);
    serde_json::from_str(text.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{text}"))
}

// ===========================================================================
// report
// ===========================================================================

#[test]
fn report_json_envelope() {
    let fx = Fixture::new();
    let output = fx.run(&["report", "--date", DATE, "--json"]);
    assert_exit(&output, 0);

    let val = parse_json(&output);
    assert_eq!(val["meta"]["config"], "dell-monitors");
    assert_eq!(val["meta"]["as_of"], DATE);
    assert_eq!(val["meta"]["retailers"]["bestbuy"]["snapshot"]["stale"], true);
    assert_eq!(val["meta"]["retailers"]["newegg"]["snapshot"]["stale"], false);

    assert_eq!(val["network"]["retailer_count"], 2);
    assert_eq!(val["network"]["total_non_compliant"], 2);
    assert_eq!(val["network"]["offending_retailers"], 1);

    let bestbuy = &val["report"]["bestbuy"];
    assert_eq!(bestbuy["total_products"], 3);
    assert_eq!(bestbuy["compliant_count"], 1);
    let offenders = bestbuy["top_offenders"].as_array().unwrap();
    assert_eq!(offenders.len(), 2);
    assert_eq!(offenders[0]["product_name"], "Dell U2723QE");
    assert_eq!(offenders[0]["status"], "non_compliant");
    assert_eq!(offenders[1]["product_name"], "Dell S2721D");

    let newegg = &val["report"]["newegg"];
    assert_eq!(newegg["records"][1]["status"], "undetermined");
    assert!(newegg["records"][1]["deviation_percent"].is_null());
}

#[test]
fn report_human_summary() {
    let fx = Fixture::new();
    let output = fx.run(&["report", "--date", DATE]);
    assert_exit(&output, 0);

    assert!(stdout(&output).is_empty());
    // stderr also carries the stale-snapshot warning
    let text = stderr(&output);
    assert!(text.contains("dell-monitors as of 2024-03-10"));
    assert!(text.contains("Best Buy (snapshot 2024-03-08, stale)"));
    assert!(text.contains("compliance rate 33.33%, average deviation 40.00%"));
    assert!(text.contains("Dell U2723QE"));
}

#[test]
fn report_output_file_and_strict() {
    let fx = Fixture::new();
    let out = fx.root.join("report.json");
    let output = fx.run(&[
        "report",
        "--date",
        DATE,
        "--output",
        out.to_str().unwrap(),
        "--strict",
    ]);
    assert_exit(&output, 6);
    assert!(stderr(&output).contains("2 non-compliant listings at 1 retailer"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["network"]["total_deviated"], 4);
}

#[test]
fn missing_reference_snapshot_exits_5() {
    let fx = Fixture::new();
    let output = fx.run(&["report", "--date", "2024-03-01"]);
    assert_exit(&output, 5);
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn missing_retailer_snapshot_still_reports() {
    let fx = Fixture::new();
    fs::remove_file(fx.root.join("data/newegg_20240310.csv")).unwrap();

    let output = fx.run(&["report", "--date", DATE, "--json"]);
    assert_exit(&output, 0);
    let val = parse_json(&output);
    assert!(val["meta"]["retailers"]["newegg"]["snapshot"].is_null());
    assert_eq!(val["report"]["newegg"]["compliance_rate_percent"], 0.0);
    assert_eq!(val["report"]["newegg"]["total_products"], 3);
}

#[test]
fn bad_price_exits_4() {
    let fx = Fixture::new();
    fs::write(
        fx.root.join("data/newegg_20240310.csv"),
        "Dell_product,Newegg_price\nDell S2721D,call us\n",
    )
    .unwrap();
    let output = fx.run(&["report", "--date", DATE]);
    assert_exit(&output, 4);
    assert!(stderr(&output).contains("cannot parse price 'call us'"));
}

#[test]
fn duplicate_reference_exits_4() {
    let fx = Fixture::new();
    fs::write(
        fx.root.join("data/dell_20240310.csv"),
        "Dell_product,Dell_price\nDell S2721D,100.00\nDell S2721D,110.00\n",
    )
    .unwrap();
    let output = fx.run(&["report", "--date", DATE]);
    assert_exit(&output, 4);
}

// ===========================================================================
// export
// ===========================================================================

#[test]
fn export_writes_offender_rows() {
    let fx = Fixture::new();
    let out = fx.root.join("offenders.csv");
    let output = fx.run(&["export", "--date", DATE, "--out", out.to_str().unwrap()]);
    assert_exit(&output, 0);

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "Best Buy,Dell U2723QE,500.00,1000.00,100.00%,2,40.00%,33.33%"
    );
    assert_eq!(
        lines[2],
        "Best Buy,Dell S2721D,100.00,120.00,20.00%,2,40.00%,33.33%"
    );
    assert_eq!(lines[3], "newegg,,,,,2,7.00%,33.33%");
}

#[test]
fn export_to_stdout() {
    let fx = Fixture::new();
    let output = fx.run(&["export", "--date", DATE]);
    assert_exit(&output, 0);
    assert!(stdout(&output).starts_with("Retailer,Product Name,MSRP"));
}

// ===========================================================================
// products
// ===========================================================================

#[test]
fn products_search_json() {
    let fx = Fixture::new();
    let output = fx.run(&["products", "--date", DATE, "--search", "p24", "--json"]);
    assert_exit(&output, 0);

    let val = parse_json(&output);
    let rows = val["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["product_name"], "Dell P2422H");
    assert_eq!(rows[0]["id"], 2);
    assert_eq!(rows[0]["prices"]["bestbuy"], 200.0);
    assert!(rows[0]["prices"]["newegg"].is_null());
}

#[test]
fn products_table() {
    let fx = Fixture::new();
    let output = fx.run(&["products", "--date", DATE]);
    assert_exit(&output, 0);
    let text = stdout(&output);
    assert!(text.contains("Best Buy lists 3 of 3 products"));
    assert!(text.contains("newegg lists 2 of 3 products"));
}

// ===========================================================================
// notify
// ===========================================================================

#[test]
fn notify_drafts_notice() {
    let fx = Fixture::new();
    let output = fx.run(&["notify", "bestbuy", "--date", DATE]);
    assert_exit(&output, 0);

    let text = stdout(&output);
    assert!(text.starts_with("To: pricing@bestbuy.example\n"));
    assert!(text.contains("Subject: MSRP Compliance Report for Best Buy"));
    assert!(text.contains("Dell U2723QE"));
    assert!(text.contains("Channel Compliance"));
}

#[test]
fn notify_without_offenders_is_quiet() {
    let fx = Fixture::new();
    let output = fx.run(&["notify", "newegg", "--date", DATE]);
    assert_exit(&output, 0);
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("nothing to send"));
}

#[test]
fn notify_unknown_retailer_exits_2() {
    let fx = Fixture::new();
    let output = fx.run(&["notify", "walmart", "--date", DATE]);
    assert_exit(&output, 2);
    assert!(stderr(&output).contains("configured retailers: bestbuy, newegg"));
}

// ===========================================================================
// validate
// ===========================================================================

#[test]
fn validate_ok() {
    let fx = Fixture::new();
    let output = pwatch()
        .arg("validate")
        .arg(fx.config())
        .output()
        .unwrap();
    assert_exit(&output, 0);
    assert!(stdout(&output).starts_with("dell-monitors: ok (2 retailers"));
}

#[test]
fn validate_rejects_bad_mapping() {
    let fx = Fixture::new();
    let bad = CONFIG.replace("columns = { sku = \"Bestbuy_sku\",", "columns = {");
    let path = fx.root.join("bad.toml");
    fs::write(&path, bad).unwrap();

    let output = pwatch().arg("validate").arg(&path).output().unwrap();
    assert_exit(&output, 3);
    assert!(stderr(&output).contains("bestbuy"));
}

#[test]
fn missing_config_exits_3() {
    let output = pwatch()
        .args(["--config", "/nonexistent/pricewatch.toml", "report"])
        .output()
        .unwrap();
    assert_exit(&output, 3);
    assert!(stderr(&output).contains("PRICEWATCH_CONFIG"));
}

#[test]
fn config_from_env() {
    let fx = Fixture::new();
    let output = pwatch()
        .env("PRICEWATCH_CONFIG", fx.config())
        .args(["report", "--date", DATE, "--json"])
        .output()
        .unwrap();
    assert_exit(&output, 0);
    assert_eq!(parse_json(&output)["meta"]["config"], "dell-monitors");
}
