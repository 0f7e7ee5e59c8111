//! Access to the Google sheet that receives the import.
//!
//! The `Sheet` trait is the seam between the importer and Google. `GoogleSheet` talks to the
//! Sheets API and `TestSheet` keeps everything in memory.

mod service_account;
mod sheet;
mod test_sheet;

use crate::model::Row;
use crate::{ImportConfig, Result};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tracing::{debug, info};

pub(crate) use sheet::GoogleSheet;
#[cfg(test)]
pub(crate) use test_sheet::SheetCall;
pub(crate) use test_sheet::TestSheet;

const SHEETS_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

const TEST_MODE_ENV: &str = "SESTERCE_SYNC_IN_TEST_MODE";

pub(crate) const EXPENSES: Table = Table::new("Expenses");
pub(crate) const INCOMES: Table = Table::new("Incomes");

/// Selects the `Sheet` implementation used at runtime.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Talk to the Google Sheets API.
    #[default]
    Google,
    /// Keep everything in memory, nothing leaves the process.
    Test,
}

impl Mode {
    /// `Mode::Test` when `SESTERCE_SYNC_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// The minimal set of spreadsheet operations the importer needs.
#[async_trait::async_trait]
pub(crate) trait Sheet {
    /// Clears the values in every range in `ranges` with a single request.
    async fn clear_ranges(&mut self, ranges: &[&str]) -> Result<()>;

    /// Appends `rows` as new rows after the last row of the table found at `range`.
    async fn append_rows(&mut self, range: &str, rows: &[Vec<Value>]) -> Result<()>;
}

/// Creates the `Sheet` for `mode`. In `Mode::Google` this authenticates with the service account.
pub(crate) async fn sheet(config: &ImportConfig, mode: Mode) -> Result<Box<dyn Sheet + Send>> {
    match mode {
        Mode::Google => Ok(Box::new(GoogleSheet::new(config).await?)),
        Mode::Test => {
            info!("{TEST_MODE_ENV} is set, the Google sheet will not be modified");
            Ok(Box::new(TestSheet::default()))
        }
    }
}

/// A four-column table on its own tab: date, category, description, amount. Row 1 holds the
/// headers and is never touched.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Table {
    sheet_name: &'static str,
}

impl Table {
    const fn new(sheet_name: &'static str) -> Self {
        Self { sheet_name }
    }

    /// Everything below the header row, e.g. `Expenses!A2:D`.
    pub(crate) fn clear_range(&self) -> String {
        format!("{}!A2:D", self.sheet_name)
    }

    /// The anchor the Sheets API uses to find the end of the table, e.g. `Expenses!A1`.
    pub(crate) fn append_range(&self) -> String {
        format!("{}!A1", self.sheet_name)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name)
    }
}

/// Replaces the contents of each table with its rows: every table's range is cleared first and
/// then the rows are appended, one request per table.
///
/// This is not atomic. If an append fails, the tables stay cleared and no earlier contents are
/// restored. Tables with no rows are cleared but not appended to.
pub(crate) async fn replace_table_contents(
    sheet: &mut (dyn Sheet + Send),
    contents: &[(Table, &[Row])],
) -> Result<()> {
    let ranges: Vec<String> = contents.iter().map(|(t, _)| t.clear_range()).collect();
    let ranges: Vec<&str> = ranges.iter().map(String::as_str).collect();
    debug!("Clearing {ranges:?}");
    sheet.clear_ranges(&ranges).await?;

    for (table, rows) in contents {
        if rows.is_empty() {
            debug!("No rows for {table}, nothing to append");
            continue;
        }
        let values: Vec<Vec<Value>> = rows.iter().map(Row::to_cells).collect();
        debug!("Appending {} rows to {table}", values.len());
        sheet.append_rows(&table.append_range(), &values).await?;
    }
    Ok(())
}
