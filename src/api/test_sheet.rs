//! Implements the very simple `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::Sheet;
use crate::Result;
use anyhow::{bail, Context};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

/// A request made against a `TestSheet`, recorded in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SheetCall {
    Clear(Vec<String>),
    Append { range: String, rows: Vec<Vec<Value>> },
}

/// An implementation of the `Sheet` trait that does not use Google sheets. It holds the rows below
/// the header of each tab in memory and records every call made against it.
#[derive(Debug, Default)]
pub(crate) struct TestSheet {
    data: HashMap<String, Vec<Vec<Value>>>,
    calls: Vec<SheetCall>,
    fail_appends: bool,
}

impl TestSheet {
    /// Makes every `append_rows` call fail after it has been recorded.
    #[cfg(test)]
    pub(crate) fn fail_appends(mut self) -> Self {
        self.fail_appends = true;
        self
    }

    /// Replaces the rows of `sheet_name`.
    #[cfg(test)]
    pub(crate) fn seed(&mut self, sheet_name: &str, rows: Vec<Vec<Value>>) {
        self.data.insert(sheet_name.to_string(), rows);
    }

    #[cfg(test)]
    pub(crate) fn calls(&self) -> &[SheetCall] {
        &self.calls
    }

    /// The rows currently held for `sheet_name`.
    #[cfg(test)]
    pub(crate) fn rows(&self, sheet_name: &str) -> &[Vec<Value>] {
        self.data.get(sheet_name).map(Vec::as_slice).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn clear_ranges(&mut self, ranges: &[&str]) -> Result<()> {
        for range in ranges {
            let sheet_name = sheet_name(range)?;
            info!("Clearing {range} (in memory)");
            self.data.remove(sheet_name);
        }
        self.calls
            .push(SheetCall::Clear(ranges.iter().map(|s| s.to_string()).collect()));
        Ok(())
    }

    async fn append_rows(&mut self, range: &str, rows: &[Vec<Value>]) -> Result<()> {
        self.calls.push(SheetCall::Append {
            range: range.to_string(),
            rows: rows.to_vec(),
        });
        if self.fail_appends {
            bail!("Appending to {range} failed");
        }
        let sheet_name = sheet_name(range)?;
        info!("Appending {} rows to {range} (in memory)", rows.len());
        self.data
            .entry(sheet_name.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }
}

/// The tab name of an A1 range such as `Expenses!A2:D`.
fn sheet_name(range: &str) -> Result<&str> {
    range
        .split_once('!')
        .map(|(name, _)| name)
        .with_context(|| format!("The range '{range}' does not name a sheet"))
}
