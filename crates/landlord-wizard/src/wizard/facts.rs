//! The per-case answer bag.
//!
//! Facts are stored as loosely typed JSON so each wizard section can add the
//! keys it needs. Every typed accessor here is total: a missing or malformed
//! value reads as "not yet answered" instead of failing.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{Answer, Jurisdiction, Pence, Product, RentFrequency, Route};

const META_KEY: &str = "__meta";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseFacts(Map<String, Value>);

impl CaseFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap arbitrary JSON; anything other than an object becomes empty facts.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merge a partial update into these facts.
    pub fn merge(&mut self, update: &Map<String, Value>) {
        merge_objects(&mut self.0, update);
    }

    /// Merge a JSON value; non-object updates are ignored.
    pub fn merge_value(&mut self, update: &Value) {
        if let Value::Object(map) = update {
            self.merge(map);
        }
    }

    pub fn merged(&self, update: &Map<String, Value>) -> Self {
        let mut next = self.clone();
        next.merge(update);
        next
    }

    /// Look up a dotted path such as `issues.rent_arrears.arrears_items`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Write a value at a dotted path, creating (or replacing non-object) parents.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.0;
        for segment in parents {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }
        current.insert((*last).to_string(), value);
    }

    /// Non-blank trimmed text.
    pub fn text(&self, path: &str) -> Option<&str> {
        match self.get(path)? {
            Value::String(raw) => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    pub fn has_text(&self, path: &str) -> bool {
        self.text(path).is_some()
    }

    pub fn answer(&self, path: &str) -> Answer {
        Answer::from_value(self.get(path))
    }

    /// Numbers, or numeric strings such as `"£1,250.00"`.
    pub fn number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(number_from_value)
    }

    pub fn pence(&self, path: &str) -> Option<Pence> {
        self.number(path).and_then(Pence::from_pounds)
    }

    /// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
    pub fn date(&self, path: &str) -> Option<NaiveDate> {
        self.text(path).and_then(parse_date)
    }

    pub fn array(&self, path: &str) -> &[Value] {
        match self.get(path) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// String entries of an array; a lone string is treated as one entry.
    pub fn string_list(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(raw)) if !raw.trim().is_empty() => vec![raw.trim().to_string()],
            _ => Vec::new(),
        }
    }

    pub fn rent_amount(&self) -> Option<Pence> {
        self.pence("rent_amount").filter(|rent| rent.is_positive())
    }

    pub fn rent_frequency(&self) -> Option<RentFrequency> {
        self.text("rent_frequency").and_then(RentFrequency::parse)
    }

    /// The selected possession route, only if it exists in `jurisdiction`.
    pub fn route(&self, jurisdiction: Jurisdiction) -> Option<Route> {
        self.raw_route().filter(|route| route.available_in(jurisdiction))
    }

    /// The selected route regardless of jurisdiction.
    pub fn raw_route(&self) -> Option<Route> {
        self.text("eviction_route").and_then(Route::parse)
    }

    pub fn product(&self) -> Option<Product> {
        self.text("__meta.product").and_then(Product::parse)
    }

    pub fn jurisdiction(&self) -> Option<Jurisdiction> {
        self.text("__meta.jurisdiction").and_then(Jurisdiction::parse)
    }

    /// Stamp the product and jurisdiction the case is being answered for.
    pub fn set_meta(&mut self, product: Product, jurisdiction: Jurisdiction) {
        self.set(
            &format!("{META_KEY}.product"),
            Value::String(product.as_str().to_string()),
        );
        self.set(
            &format!("{META_KEY}.jurisdiction"),
            Value::String(jurisdiction.as_str().to_string()),
        );
    }
}

impl From<Map<String, Value>> for CaseFacts {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// Objects merge key by key; arrays, scalars and nulls replace outright.
pub fn merge_objects(target: &mut Map<String, Value>, update: &Map<String, Value>) {
    for (key, incoming) in update {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(patch)) => {
                merge_objects(existing, patch);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(raw) => {
            let cleaned: String = raw
                .trim()
                .chars()
                .filter(|ch| !matches!(ch, '£' | ',' | ' '))
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}
