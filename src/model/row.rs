use crate::model::date::format_date;
use crate::model::{Amount, Bucket};
use crate::Result;
use anyhow::{bail, Context};
use csv::StringRecord;
use serde_json::Value;
use std::str::FromStr;

/// Number of columns in a Sesterce export row.
pub(crate) const RAW_COLUMN_COUNT: usize = 7;

const DATE_IDX: usize = 0;
const DESCRIPTION_IDX: usize = 1;
const AMOUNT_IDX: usize = 2;
const CATEGORY_IDX: usize = 5;

/// A row as it appears in the Sesterce CSV export:
/// `date, description, amount, _, _, category, _`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct RawRow {
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) amount: String,
    pub(crate) category: String,
}

impl TryFrom<&StringRecord> for RawRow {
    type Error = crate::Error;

    fn try_from(record: &StringRecord) -> Result<Self> {
        if record.len() != RAW_COLUMN_COUNT {
            bail!(
                "Expected {RAW_COLUMN_COUNT} columns but found {}",
                record.len()
            );
        }
        let field = |ix: usize| record.get(ix).unwrap_or_default().to_string();
        Ok(Self {
            date: field(DATE_IDX),
            description: field(DESCRIPTION_IDX),
            amount: field(AMOUNT_IDX),
            category: field(CATEGORY_IDX),
        })
    }
}

/// A row in the shape of the Expenses and Incomes tabs: date, category, description, amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    date: String,
    category: String,
    description: String,
    amount: Amount,
}

impl Row {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            description: description.into(),
            amount,
        }
    }

    #[cfg(test)]
    pub(crate) fn description(&self) -> &str {
        &self.description
    }

    #[cfg(test)]
    pub(crate) fn amount(&self) -> Amount {
        self.amount
    }

    /// Which tab this row belongs to.
    pub fn bucket(&self) -> Bucket {
        Bucket::for_category(&self.category)
    }

    /// The cell values written to the sheet. The amount is a number so the sheet can sum it.
    pub(crate) fn to_cells(&self) -> Vec<Value> {
        vec![
            Value::from(self.date.as_str()),
            Value::from(self.category.as_str()),
            Value::from(self.description.as_str()),
            Value::from(self.amount.to_f64()),
        ]
    }
}

impl TryFrom<RawRow> for Row {
    type Error = crate::Error;

    fn try_from(raw: RawRow) -> Result<Self> {
        let date = format_date(&raw.date)?;
        let amount = Amount::from_str(&raw.amount)
            .with_context(|| format!("Unable to parse the amount for '{}'", raw.description))?;
        Ok(Row::new(date, raw.category, raw.description, amount))
    }
}
