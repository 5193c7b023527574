//! Integration tests for argument parsing and the import command.

use std::fs;
use std::path::Path;

use clap::Parser;
use csvdb_cli::cli::{Cli, DefaultActionArg, parse_delimiter};
use csvdb_cli::commands::{Outcome, error_line, run_import};
use csvdb_cli::summary::{plan_table, report_table};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("csvdb").chain(args.iter().copied())).expect("valid arguments")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_defaults() {
    let cli = parse(&["-i", "people.csv"]);

    assert_eq!(cli.import.input, Path::new("people.csv"));
    assert_eq!(cli.import.output, Path::new("db.sqlite"));
    assert!(cli.import.mapping.is_none());
    assert!(!cli.import.has_header_row);
    assert_eq!(cli.import.default_mapping_action, DefaultActionArg::Ignore);
    assert_eq!(cli.import.delimiter, b',');
    assert!(!cli.import.dry_run);
    assert!(!cli.log_data);
}

#[test]
fn test_long_flags_and_alias() {
    let cli = parse(&[
        "--input",
        "in.csv",
        "--output",
        "out.db",
        "--mapping",
        "map.json",
        "--csv-has-title-columns",
        "--default-mapping-action",
        "import",
        "--delimiter",
        ";",
        "--dry-run",
        "--log-data",
    ]);

    assert_eq!(cli.import.output, Path::new("out.db"));
    assert_eq!(cli.import.mapping.as_deref(), Some(Path::new("map.json")));
    assert!(cli.import.has_header_row);
    assert_eq!(cli.import.default_mapping_action, DefaultActionArg::Import);
    assert_eq!(cli.import.delimiter, b';');
    assert!(cli.import.dry_run);
    assert!(cli.log_data);
}

#[test]
fn test_short_flags() {
    let cli = parse(&["-i", "in.csv", "-o", "out.db", "-m", "map.json", "-t", "-d", "import"]);

    assert!(cli.import.has_header_row);
    assert_eq!(cli.import.default_mapping_action, DefaultActionArg::Import);
}

#[test]
fn test_input_is_required() {
    assert!(Cli::try_parse_from(["csvdb"]).is_err());
    assert!(Cli::try_parse_from(["csvdb", "-i", "in.csv", "-d", "sometimes"]).is_err());
}

#[test]
fn test_delimiter_parsing() {
    assert_eq!(parse_delimiter("|"), Ok(b'|'));
    assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
    assert!(parse_delimiter("").is_err());
    assert!(parse_delimiter("ab").is_err());
    assert!(parse_delimiter("é").is_err());
}

#[test]
fn test_dry_run_resolves_without_database() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "people.csv", "name,email\nAda,ada@example.com\n");
    let mapping = write(
        dir.path(),
        "people.json",
        r#"{ "mappings": [ { "csv_index": "email", "key": "fk" } ] }"#,
    );
    let output = dir.path().join("db.sqlite");
    let cli = parse(&[
        "-i",
        &input,
        "-m",
        &mapping,
        "-t",
        "-o",
        &output.to_string_lossy(),
        "--dry-run",
    ]);

    let outcome = run_import(&cli.import).expect("dry run");

    let Outcome::Planned(plan) = outcome else {
        panic!("expected a plan");
    };
    assert_eq!(plan.table_name, "people");
    assert!(!output.exists());
    let rendered = plan_table(&plan).to_string();
    assert!(rendered.contains("email_id"));
    assert!(rendered.contains("fk"));
}

#[test]
fn test_import_writes_database() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "animals.tsv", "cat\t3\ndog\t4\ncat\t5\n");
    let output = dir.path().join("zoo.sqlite");
    let cli = parse(&[
        "-i",
        &input,
        "-o",
        &output.to_string_lossy(),
        "-d",
        "import",
        "--delimiter",
        "tab",
    ]);

    let outcome = run_import(&cli.import).expect("import");

    let Outcome::Imported(report) = outcome else {
        panic!("expected an import report");
    };
    assert_eq!(report.table_name, "animals");
    assert_eq!(report.inserted_rows, 3);
    assert!(output.exists());
    assert!(report_table(&report).to_string().contains("animals"));
}

#[test]
fn test_error_line_names_category() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.csv");
    let cli = parse(&["-i", &missing.to_string_lossy(), "--dry-run"]);

    let error = run_import(&cli.import).expect_err("missing input");

    let line = error_line(&error);
    assert!(line.starts_with("error: file not found: "), "{line}");
    assert!(!line.contains('\n'));
}

#[test]
fn test_malformed_mapping_error_line() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "people.csv", "name\nAda\n");
    let mapping = write(dir.path(), "bad.json", "{ \"mappings\": [ }");
    let cli = parse(&["-i", &input, "-m", &mapping, "--dry-run"]);

    let error = run_import(&cli.import).expect_err("bad mapping");

    let line = error_line(&error);
    assert!(
        line.starts_with("error: malformed configuration document: "),
        "{line}"
    );
    assert!(line.contains("line 1"), "{line}");
}
