use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

use super::ArrearsItem;
use crate::wizard::domain::Pence;
use crate::wizard::facts::parse_date;

#[derive(Debug, thiserror::Error)]
pub enum ArrearsImportError {
    #[error("failed to read rent ledger: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rent ledger CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: '{value}' is not a valid amount")]
    InvalidAmount { row: usize, value: String },
    #[error("row {row}: '{value}' is not a valid date")]
    InvalidDate { row: usize, value: String },
}

/// Parse a rent ledger export with `period_start,period_end,rent_due,rent_paid`
/// columns (an `amount_owed` column is optional).
pub fn import_ledger<R: Read>(reader: R) -> Result<Vec<ArrearsItem>, ArrearsImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut items = Vec::new();

    for (index, record) in csv_reader.deserialize::<LedgerRow>().enumerate() {
        let row = record?;
        // header is row 1
        items.push(row.into_item(index + 2)?);
    }

    Ok(items)
}

pub fn import_ledger_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ArrearsItem>, ArrearsImportError> {
    let file = std::fs::File::open(path)?;
    import_ledger(file)
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    period_start: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    period_end: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rent_due: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rent_paid: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amount_owed: Option<String>,
}

impl LedgerRow {
    fn into_item(self, row: usize) -> Result<ArrearsItem, ArrearsImportError> {
        Ok(ArrearsItem {
            period_start: parse_optional_date(row, self.period_start)?,
            period_end: parse_optional_date(row, self.period_end)?,
            rent_due: parse_optional_amount(row, self.rent_due)?.unwrap_or_default(),
            rent_paid: parse_optional_amount(row, self.rent_paid)?.unwrap_or_default(),
            amount_owed: parse_optional_amount(row, self.amount_owed)?,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_optional_date(
    row: usize,
    value: Option<String>,
) -> Result<Option<NaiveDate>, ArrearsImportError> {
    value
        .map(|raw| parse_date(&raw).ok_or(ArrearsImportError::InvalidDate { row, value: raw }))
        .transpose()
}

fn parse_optional_amount(
    row: usize,
    value: Option<String>,
) -> Result<Option<Pence>, ArrearsImportError> {
    value
        .map(|raw| {
            let cleaned: String = raw.chars().filter(|ch| !matches!(ch, '£' | ',')).collect();
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Pence::from_pounds)
                .ok_or(ArrearsImportError::InvalidAmount { row, value: raw })
        })
        .transpose()
}
