use crate::api::{self, Mode, Sheet, EXPENSES, INCOMES};
use crate::commands::Out;
use crate::model::Buckets;
use crate::{ImportConfig, Result};
use serde::Serialize;
use std::future::Future;
use tracing::debug;

/// Row counts from an import run.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ImportSummary {
    expenses: usize,
    incomes: usize,
    skipped: usize,
}

impl ImportSummary {
    fn new(buckets: &Buckets) -> Self {
        Self {
            expenses: buckets.expenses().len(),
            incomes: buckets.incomes().len(),
            skipped: buckets.skipped(),
        }
    }

    pub fn expenses(&self) -> usize {
        self.expenses
    }

    pub fn incomes(&self) -> usize {
        self.incomes
    }

    /// Rows that were dropped because their date or amount could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Handles the `sesterce import` command.
///
/// 1. Reads and classifies the CSV at `config.csv_path()`
/// 2. Authenticates with the service account (unless `mode` is `Mode::Test`)
/// 3. Clears the Expenses and Incomes tables and appends the classified rows
///
/// With `dry_run` only the first step runs.
///
/// # Errors
/// - Returns an error if the CSV file does not exist. The sheet is not touched in that case.
/// - Returns an error if authentication or any Sheets API request fails. If that happens after the
///   tables were cleared, they are left empty.
pub async fn import(config: ImportConfig, mode: Mode, dry_run: bool) -> Result<Out<ImportSummary>> {
    import_with(&config, dry_run, || api::sheet(&config, mode)).await
}

/// Runs the import, calling `open_sheet` only once the CSV has been read and only when the sheet
/// is going to be written.
async fn import_with<F, Fut>(
    config: &ImportConfig,
    dry_run: bool,
    open_sheet: F,
) -> Result<Out<ImportSummary>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Box<dyn Sheet + Send>>>,
{
    let buckets = Buckets::load(config.csv_path())?;

    if dry_run {
        for row in buckets.expenses().iter().chain(buckets.incomes()) {
            debug!("{}: {row:?}", row.bucket());
        }
        return Ok(Out::new(
            format!(
                "Dry run: {} expenses and {} income rows would be imported",
                buckets.expenses().len(),
                buckets.incomes().len()
            ),
            ImportSummary::new(&buckets),
        ));
    }

    let mut sheet = open_sheet().await?;
    let summary = write_buckets(sheet.as_mut(), &buckets).await?;
    Ok(Out::new(
        format!(
            "{} expenses and {} income rows imported successfully!",
            summary.expenses(),
            summary.incomes()
        ),
        summary,
    ))
}

/// Replaces the Expenses and Incomes tables with the contents of `buckets`.
async fn write_buckets(
    sheet: &mut (dyn Sheet + Send),
    buckets: &Buckets,
) -> Result<ImportSummary> {
    api::replace_table_contents(
        sheet,
        &[(EXPENSES, buckets.expenses()), (INCOMES, buckets.incomes())],
    )
    .await?;
    Ok(ImportSummary::new(buckets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{SheetCall, TestSheet};
    use crate::test::TestEnv;
    use serde_json::json;
    use std::cell::Cell;

    async fn open_test_sheet(opened: &Cell<bool>) -> Result<Box<dyn Sheet + Send>> {
        opened.set(true);
        Ok(Box::new(TestSheet::default()))
    }

    #[tokio::test]
    async fn test_import_missing_file_aborts_before_auth() {
        let env = TestEnv::new();
        let config = env.import_config(env.path("missing.csv"));

        // The service account file does not exist either, so reaching authentication would fail
        // with a different error.
        let err = import(config, Mode::Google, false).await.unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }

    #[tokio::test]
    async fn test_missing_file_never_opens_the_sheet() {
        let env = TestEnv::new();
        let config = env.import_config(env.path("missing.csv"));
        let opened = Cell::new(false);

        let err = import_with(&config, false, || open_test_sheet(&opened))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("File not found"));
        assert!(!opened.get());
    }

    #[tokio::test]
    async fn test_dry_run_never_opens_the_sheet() {
        let env = TestEnv::new();
        let csv = env.write_csv(&[["20240115", "Salary", "2000", "", "", "Job", ""]]);
        let opened = Cell::new(false);

        let out = import_with(&env.import_config(csv), true, || open_test_sheet(&opened))
            .await
            .unwrap();

        assert_eq!(out.summary().incomes(), 1);
        assert!(!opened.get());
    }

    #[tokio::test]
    async fn test_sheet_is_opened_after_reading_the_csv() {
        let env = TestEnv::new();
        let csv = env.write_csv(&[["20240115", "Groceries", "45.50", "", "", "Alimentación", ""]]);
        let opened = Cell::new(false);

        let out = import_with(&env.import_config(csv), false, || open_test_sheet(&opened))
            .await
            .unwrap();

        assert!(opened.get());
        assert_eq!(out.summary().expenses(), 1);
    }

    #[tokio::test]
    async fn test_import_test_mode() {
        let env = TestEnv::new();
        let csv = env.write_csv(&[
            ["20240115", "Groceries", "45.50", "", "", "Alimentación", ""],
            ["2024-01-15", "Bad", "1", "", "", "Alimentación", ""],
            ["20240115", "Salary", "2000", "", "", "Job", ""],
        ]);
        let out = import(env.import_config(csv), Mode::Test, false)
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "1 expenses and 1 income rows imported successfully!"
        );
        let summary = out.summary();
        assert_eq!(summary.expenses(), 1);
        assert_eq!(summary.incomes(), 1);
        assert_eq!(summary.skipped(), 1);
    }

    #[tokio::test]
    async fn test_import_dry_run() {
        let env = TestEnv::new();
        let csv = env.write_csv(&[["20240115", "Salary", "2000", "", "", "Job", ""]]);
        // Mode::Google with a missing service account proves no sheet is created.
        let out = import(env.import_config(csv), Mode::Google, true)
            .await
            .unwrap();
        assert!(out.message().starts_with("Dry run"));
        assert_eq!(out.summary().incomes(), 1);
    }

    #[tokio::test]
    async fn test_import_without_credentials_fails() {
        let env = TestEnv::new();
        let csv = env.write_csv(&[["20240115", "Salary", "2000", "", "", "Job", ""]]);
        assert!(import(env.import_config(csv), Mode::Google, false)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_write_buckets() {
        let env = TestEnv::new();
        let csv = env.write_csv(&[
            ["20240102", "Train", "25", "", "", "Transporte", ""],
            ["20240101", "Bonus", "300", "", "", "Extra", ""],
            ["20240103", "Rent", "900.50", "", "", "Vivienda", ""],
        ]);
        let buckets = Buckets::load(&csv).unwrap();
        let mut sheet = TestSheet::default();
        sheet.seed("Expenses", vec![vec![json!("stale")]]);

        let summary = write_buckets(&mut sheet, &buckets).await.unwrap();

        assert_eq!(summary.expenses(), 2);
        assert_eq!(summary.incomes(), 1);
        assert!(matches!(&sheet.calls()[0], SheetCall::Clear(_)));
        assert_eq!(
            sheet.rows("Expenses"),
            &[
                vec![
                    json!("02/01/2024"),
                    json!("Transporte"),
                    json!("Train"),
                    json!(25.0)
                ],
                vec![
                    json!("03/01/2024"),
                    json!("Vivienda"),
                    json!("Rent"),
                    json!(900.5)
                ],
            ]
        );
        assert_eq!(
            sheet.rows("Incomes"),
            &[vec![
                json!("01/01/2024"),
                json!("Extra"),
                json!("Bonus"),
                json!(300.0)
            ]]
        );
    }
}
