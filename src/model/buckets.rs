//! Reads the Sesterce CSV export and routes each row into the expense or income bucket.

use crate::model::row::RawRow;
use crate::model::{Bucket, Row};
use crate::Result;
use anyhow::{bail, Context};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// The rows of one import run, split by bucket. Order within each bucket is the order of the
/// rows in the CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    expenses: Vec<Row>,
    incomes: Vec<Row>,
    skipped: usize,
}

impl Buckets {
    /// Opens the CSV at `path` and classifies its rows.
    ///
    /// # Errors
    /// - Fails with "File not found" when `path` does not exist.
    /// - Fails when the file cannot be read or is not valid UTF-8 CSV.
    ///
    /// Rows that cannot be transformed are logged and skipped, they do not cause an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }
        info!("Reading CSV file: {}", path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("Unable to open file {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Unable to read CSV file {}", path.display()))
    }

    /// Classifies CSV data. The first record is treated as the header and skipped.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut buckets = Buckets::default();
        for (ix, result) in rdr.records().enumerate() {
            let record = result?;
            // +2 because the header is line 1
            let line = ix + 2;
            let row = match RawRow::try_from(&record).and_then(Row::try_from) {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping invalid row at line {line}: {e:#}");
                    buckets.skipped += 1;
                    continue;
                }
            };
            buckets.push(row);
        }

        debug!(
            "Classified {} expense rows and {} income rows, skipped {}",
            buckets.expenses.len(),
            buckets.incomes.len(),
            buckets.skipped
        );
        Ok(buckets)
    }

    fn push(&mut self, row: Row) {
        match row.bucket() {
            Bucket::Expense => self.expenses.push(row),
            Bucket::Income => self.incomes.push(row),
        }
    }

    pub fn expenses(&self) -> &[Row] {
        &self.expenses
    }

    pub fn incomes(&self) -> &[Row] {
        &self.incomes
    }

    /// The number of rows that were dropped because they could not be transformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
