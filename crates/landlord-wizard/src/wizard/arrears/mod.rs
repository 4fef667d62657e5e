mod ledger;

pub use ledger::{import_ledger, import_ledger_path, ArrearsImportError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::Pence;
use super::facts::{number_from_value, parse_date, CaseFacts};

/// Facts path holding the itemised arrears schedule.
pub const ARREARS_ITEMS_PATH: &str = "issues.rent_arrears.arrears_items";
/// Optional single total used when no schedule has been itemised.
pub const ARREARS_TOTAL_PATH: &str = "issues.rent_arrears.total_arrears";

/// One rent period on the arrears schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrearsItem {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub rent_due: Pence,
    pub rent_paid: Pence,
    /// Explicit arrears for the period, overriding `rent_due - rent_paid`.
    pub amount_owed: Option<Pence>,
}

impl ArrearsItem {
    pub fn arrears(&self) -> Pence {
        match self.amount_owed {
            Some(owed) => Pence(owed.0.max(0)),
            None => Pence(self.rent_due.saturating_sub(self.rent_paid).0.max(0)),
        }
    }

    pub fn has_inverted_period(&self) -> bool {
        matches!((self.period_start, self.period_end), (Some(start), Some(end)) if end < start)
    }

    /// Read one schedule entry; entries without any amount are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let amount = |key: &str| {
            object
                .get(key)
                .and_then(number_from_value)
                .and_then(Pence::from_pounds)
        };
        let date = |key: &str| object.get(key).and_then(Value::as_str).and_then(parse_date);

        let rent_due = amount("rent_due");
        let rent_paid = amount("rent_paid");
        let amount_owed = amount("amount_owed").or_else(|| amount("arrears_amount"));

        if rent_due.is_none() && amount_owed.is_none() {
            return None;
        }

        Some(Self {
            period_start: date("period_start"),
            period_end: date("period_end"),
            rent_due: rent_due.unwrap_or_default(),
            rent_paid: rent_paid.unwrap_or_default(),
            amount_owed,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "period_start": self.period_start.map(|d| d.to_string()),
            "period_end": self.period_end.map(|d| d.to_string()),
            "rent_due": self.rent_due.pounds(),
            "rent_paid": self.rent_paid.pounds(),
        });
        if let (Some(owed), Value::Object(map)) = (self.amount_owed, &mut value) {
            map.insert("amount_owed".to_string(), json!(owed.pounds()));
        }
        value
    }
}

/// The arrears schedule recorded in facts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrearsSchedule {
    pub items: Vec<ArrearsItem>,
    pub declared_total: Option<Pence>,
}

impl ArrearsSchedule {
    pub fn from_facts(facts: &CaseFacts) -> Self {
        let items = facts
            .array(ARREARS_ITEMS_PATH)
            .iter()
            .filter_map(ArrearsItem::from_value)
            .collect();
        let declared_total = facts.pence(ARREARS_TOTAL_PATH);
        Self {
            items,
            declared_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.declared_total.is_none()
    }

    /// Sum of itemised arrears, or the declared total when nothing is itemised.
    pub fn total(&self) -> Pence {
        if self.items.is_empty() {
            return self.declared_total.unwrap_or_default().max(Pence::ZERO);
        }
        self.items.iter().map(ArrearsItem::arrears).sum()
    }

    /// Count of periods carrying any arrears.
    pub fn periods_in_arrears(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.arrears().is_positive())
            .count()
    }

    /// Longest unbroken run of periods in arrears, taken in period order.
    /// A fully paid period ends the run.
    pub fn longest_arrears_run(&self) -> usize {
        let mut ordered: Vec<&ArrearsItem> = self.items.iter().collect();
        ordered.sort_by_key(|item| item.period_start);

        let mut longest = 0;
        let mut current = 0;
        for item in ordered {
            if item.arrears().is_positive() {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest
    }

    /// Facts patch replacing the whole schedule.
    pub fn to_facts_patch(&self) -> Value {
        let items: Vec<Value> = self.items.iter().map(ArrearsItem::to_value).collect();
        json!({ "issues": { "rent_arrears": { "arrears_items": items } } })
    }
}
