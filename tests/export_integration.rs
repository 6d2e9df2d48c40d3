//! Integration tests for the roster export
//!
//! These tests run the whole export against the in-memory spreadsheet service and
//! check the CSV written to disk and the spreadsheet state afterwards.

use eyre::Result;
use moodle_roster::cli::export;
use moodle_roster::{
    Destination, ExportRequest, MemorySheets, OutputRecord, RosterError, SchemaVariant,
    VariantChoice,
};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

const SPREADSHEET: &str = "CARGAS_MOODLE_LEGADO";

fn basic_roster() -> Vec<Vec<Value>> {
    vec![
        vec![json!("CPF"), json!("Nome"), json!("E-mail"), json!("Telefone")],
        vec![json!("123.456.789-00"), json!("Ana"), json!("a@x.com"), json!("555")],
        vec![json!(1234567890u64), json!("Bia"), json!("b@x.com")],
        vec![json!("123.456.789-00"), json!("Ana"), json!("a@x.com"), json!("555")],
    ]
}

fn role_roster() -> Vec<Vec<Value>> {
    vec![
        vec![json!("Nome"), json!("CPF"), json!("Cargo"), json!("E-mail")],
        vec![json!("Caio"), json!("111.222.333-44"), json!("Tutor"), json!("c@x.com")],
        vec![json!("Duda"), json!("5.556.667-77"), json!("Docente"), json!("d@x.com")],
    ]
}

fn request(tab: &str, destination: Destination, output_dir: &Path) -> ExportRequest {
    ExportRequest {
        spreadsheet: SPREADSHEET.to_string(),
        source_tab: tab.to_string(),
        course: "CURSO1".to_string(),
        group: "T1".to_string(),
        destination,
        variant: VariantChoice::Auto,
        output_dir: output_dir.to_path_buf(),
    }
}

fn read_csv(path: &Path) -> Result<Vec<OutputRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records: Vec<OutputRecord> = reader.deserialize().collect::<Result<_, _>>()?;
    Ok(records)
}

fn strings(values: &[Vec<Value>]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn test_download_only_export() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Turma A", basic_roster());

    let report = export(
        &sheets,
        &request("Turma A", Destination::DownloadOnly, temp.path()),
    )
    .await?;

    assert_eq!(report.variant, SchemaVariant::Basic);
    assert_eq!(report.records, 3);
    assert!(report.write_back.is_none());
    assert_eq!(report.csv_path, temp.path().join("CURSO1_T1.csv"));

    let text = std::fs::read_to_string(&report.csv_path)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("username,password,firstname,lastname,email,course1,role1,group1")
    );
    assert_eq!(
        lines.next(),
        Some("12345678900,Ead#1234,Ana,.,a@x.com,CURSO1,student,T1")
    );
    assert_eq!(
        lines.next(),
        Some("01234567890,Ead#1234,Bia,.,b@x.com,CURSO1,student,T1")
    );

    // duplicates are kept, source tab untouched
    let records = read_csv(&report.csv_path)?;
    assert_eq!(records[0], records[2]);
    assert_eq!(
        sheets.tab_values(SPREADSHEET, "Turma A").await,
        Some(basic_roster())
    );

    Ok(())
}

#[tokio::test]
async fn test_new_tab_export() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Turma A", basic_roster());

    let report = export(
        &sheets,
        &request(
            "Turma A",
            Destination::NewTab("Moodle".to_string()),
            temp.path(),
        ),
    )
    .await?;

    assert_eq!(report.write_back, Some(Ok(3)));

    let written = strings(&sheets.tab_values(SPREADSHEET, "Moodle").await.unwrap());
    assert_eq!(written.len(), 4);
    assert_eq!(written[0], OutputRecord::header());
    assert_eq!(written[2][0], "'01234567890");
    // the CSV keeps the plain username
    let records = read_csv(&report.csv_path)?;
    assert_eq!(records[1].username, "01234567890");

    Ok(())
}

#[tokio::test]
async fn test_new_tab_replaces_existing_contents() -> Result<()> {
    let temp = TempDir::new()?;
    let stale: Vec<Vec<Value>> = (0..50)
        .map(|i| (0..12).map(|j| json!(format!("old {} {}", i, j))).collect())
        .collect();
    let sheets = MemorySheets::new()
        .with_tab(SPREADSHEET, "Turma A", basic_roster())
        .with_tab(SPREADSHEET, "Moodle", stale);

    export(
        &sheets,
        &request(
            "Turma A",
            Destination::NewTab("Moodle".to_string()),
            temp.path(),
        ),
    )
    .await?;

    let written = strings(&sheets.tab_values(SPREADSHEET, "Moodle").await.unwrap());
    assert_eq!(written.len(), 4);
    assert!(written.iter().all(|row| row.len() == 8));
    assert!(written.iter().flatten().all(|cell| !cell.starts_with("old")));

    Ok(())
}

#[tokio::test]
async fn test_overwrite_source_export() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Equipe", role_roster());

    let report = export(
        &sheets,
        &request("Equipe", Destination::OverwriteSource, temp.path()),
    )
    .await?;

    assert_eq!(report.variant, SchemaVariant::WithRole);
    assert_eq!(report.write_back, Some(Ok(2)));

    let written = strings(&sheets.tab_values(SPREADSHEET, "Equipe").await.unwrap());
    assert_eq!(
        written,
        vec![
            OutputRecord::header(),
            vec![
                "11122233344", "Ead#1234", "Caio", "Tutor", "c@x.com", "CURSO1", "student", "T1"
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            vec![
                "00555666777", "Ead#1234", "Duda", "Docente", "d@x.com", "CURSO1", "student", "T1"
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_forced_basic_layout_on_role_roster() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Equipe", role_roster());
    let request = ExportRequest {
        variant: VariantChoice::Basic,
        ..request("Equipe", Destination::DownloadOnly, temp.path())
    };

    let report = export(&sheets, &request).await?;

    let records = read_csv(&report.csv_path)?;
    assert!(records.iter().all(|r| r.lastname == "."));

    Ok(())
}

#[tokio::test]
async fn test_missing_columns_writes_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(
        SPREADSHEET,
        "Turma A",
        vec![
            vec![json!("CPF"), json!("Nome")],
            vec![json!("123"), json!("Ana")],
        ],
    );

    let err = export(
        &sheets,
        &request(
            "Turma A",
            Destination::NewTab("Moodle".to_string()),
            temp.path(),
        ),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<RosterError>(),
        Some(&RosterError::MissingColumns {
            missing: vec!["E-mail".to_string()]
        })
    );
    assert!(!temp.path().join("CURSO1_T1.csv").exists());
    assert!(sheets.tab_values(SPREADSHEET, "Moodle").await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_new_tab_reads_role_roster_as_basic() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Equipe", role_roster());

    let report = export(
        &sheets,
        &request(
            "Equipe",
            Destination::NewTab("Moodle".to_string()),
            temp.path(),
        ),
    )
    .await?;

    assert_eq!(report.variant, SchemaVariant::Basic);
    assert_eq!(report.write_back, Some(Ok(2)));
    assert!(read_csv(&report.csv_path)?.iter().all(|r| r.lastname == "."));
    assert_eq!(sheets.tab_values(SPREADSHEET, "Equipe").await, Some(role_roster()));

    Ok(())
}

#[tokio::test]
async fn test_write_back_failure_keeps_csv() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new()
        .with_tab(SPREADSHEET, "Turma A", basic_roster())
        .failing_writes();

    let report = export(
        &sheets,
        &request(
            "Turma A",
            Destination::NewTab("Moodle".to_string()),
            temp.path(),
        ),
    )
    .await?;

    assert!(matches!(
        report.write_back,
        Some(Err(RosterError::WriteBackFailure { .. }))
    ));
    assert_eq!(read_csv(&report.csv_path)?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_lookup_failures() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Turma A", basic_roster());

    let missing_tab = export(
        &sheets,
        &request("Turma B", Destination::DownloadOnly, temp.path()),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        missing_tab.downcast_ref::<RosterError>(),
        Some(RosterError::TabNotFound { .. })
    ));

    let missing_spreadsheet = export(
        &sheets,
        &ExportRequest {
            spreadsheet: "OUTRA".to_string(),
            ..request("Turma A", Destination::DownloadOnly, temp.path())
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        missing_spreadsheet.downcast_ref::<RosterError>(),
        Some(RosterError::SpreadsheetNotFound { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_blank_inputs_stop_before_reading() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new();
    let request = ExportRequest {
        course: String::new(),
        ..request("", Destination::DownloadOnly, temp.path())
    };

    let err = export(&sheets, &request).await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<RosterError>(),
        Some(&RosterError::MissingInput {
            fields: vec!["source tab".to_string(), "course".to_string()]
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_forced_layout_rejects_destination_before_lookup() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new();

    let err = export(
        &sheets,
        &ExportRequest {
            variant: VariantChoice::WithRole,
            ..request(
                "Equipe",
                Destination::NewTab("Moodle".to_string()),
                temp.path(),
            )
        },
    )
    .await
    .unwrap_err();

    // The spreadsheet does not exist, so only an early check can produce this error
    assert!(matches!(
        err.downcast_ref::<RosterError>(),
        Some(RosterError::UnsupportedDestination { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_unsaved_csv_leaves_source_tab() -> Result<()> {
    let temp = TempDir::new()?;
    let blocker = temp.path().join("out");
    std::fs::write(&blocker, "not a directory")?;
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Equipe", role_roster());

    let result = export(
        &sheets,
        &request("Equipe", Destination::OverwriteSource, &blocker),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(sheets.tab_values(SPREADSHEET, "Equipe").await, Some(role_roster()));

    Ok(())
}

#[tokio::test]
async fn test_group_with_path_separator_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    let output_dir = temp.path().join("out");
    let sheets = MemorySheets::new().with_tab(SPREADSHEET, "Equipe", role_roster());

    let err = export(
        &sheets,
        &ExportRequest {
            group: "../T1".to_string(),
            ..request("Equipe", Destination::OverwriteSource, &output_dir)
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RosterError>(),
        Some(RosterError::InvalidInput { .. })
    ));
    assert!(!output_dir.exists());
    assert_eq!(sheets.tab_values(SPREADSHEET, "Equipe").await, Some(role_roster()));

    Ok(())
}

#[tokio::test]
async fn test_rejected_credentials_stop_the_export() -> Result<()> {
    let temp = TempDir::new()?;
    let sheets = MemorySheets::new()
        .with_tab(SPREADSHEET, "Equipe", role_roster())
        .rejecting_credentials();

    let err = export(
        &sheets,
        &request("Equipe", Destination::OverwriteSource, temp.path()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RosterError>(),
        Some(RosterError::AuthenticationFailure { .. })
    ));
    assert!(!temp.path().join("CURSO1_T1.csv").exists());
    assert_eq!(sheets.tab_values(SPREADSHEET, "Equipe").await, Some(role_roster()));

    Ok(())
}
