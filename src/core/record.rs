use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::types::decimal_to_f64;
use crate::error::{SankeyError, SankeyResult};

/// Raw data row as supplied by the host or read back from JSON.
///
/// Fields stay untyped until validation. `to` distinguishes an absent key
/// (`None`, the row is malformed) from an explicit `null` (a drop-off).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    #[serde(default)]
    pub from: Value,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<Value>,
    #[serde(default, alias = "weight")]
    pub flow: Value,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FlowRow {
    /// Row describing a flow between two named nodes.
    #[must_use]
    pub fn link(from: impl Into<String>, to: impl Into<String>, flow: f64) -> Self {
        Self {
            from: Value::String(from.into()),
            to: Some(Value::String(to.into())),
            flow: number_value(flow),
        }
    }

    /// Row describing a flow leaving the diagram at `from`.
    #[must_use]
    pub fn dropoff(from: impl Into<String>, flow: f64) -> Self {
        Self {
            from: Value::String(from.into()),
            to: Some(Value::Null),
            flow: number_value(flow),
        }
    }

    /// Reports which fields fail validation.
    #[must_use]
    pub fn missing_fields(&self) -> MissingFields {
        let weight = value_to_number(&self.flow);
        MissingFields {
            from: non_empty_str(&self.from).is_none(),
            to: match &self.to {
                None => true,
                Some(Value::Null) => false,
                Some(value) => non_empty_str(value).is_none(),
            },
            weight: !(weight.is_finite() && weight > 0.0),
        }
    }
}

impl From<&FlowRecord> for FlowRow {
    fn from(record: &FlowRecord) -> Self {
        match &record.to {
            Some(to) => Self::link(record.from.clone(), to.clone(), record.weight),
            None => Self::dropoff(record.from.clone(), record.weight),
        }
    }
}

fn number_value(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn non_empty_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.as_str()),
        _ => None,
    }
}

/// Numeric coercion for the `flow` column.
///
/// Numbers pass through, strings are parsed after trimming (empty is zero),
/// everything else is NaN.
#[must_use]
pub fn value_to_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

/// Per-field validation outcome for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingFields {
    pub from: bool,
    pub to: bool,
    pub weight: bool,
}

impl MissingFields {
    #[must_use]
    pub fn any(self) -> bool {
        self.from || self.to || self.weight
    }

    #[must_use]
    pub fn all(self) -> bool {
        self.from && self.to && self.weight
    }
}

/// How the three per-field checks combine into "row is missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingPolicy {
    /// Drop the row when any field is invalid.
    #[default]
    AnyFieldMissing,
    /// Drop the row only when every field is invalid; surviving rows are
    /// normalized (empty `from`, drop-off `to`, zero weight).
    AllFieldsMissing,
}

impl MissingPolicy {
    #[must_use]
    pub fn is_missing(self, fields: MissingFields) -> bool {
        match self {
            Self::AnyFieldMissing => fields.any(),
            Self::AllFieldsMissing => fields.all(),
        }
    }
}

/// Validated flow row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub from: String,
    pub to: Option<String>,
    pub weight: f64,
}

impl FlowRecord {
    #[must_use]
    pub fn new(from: impl Into<String>, to: Option<&str>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.map(str::to_owned),
            weight,
        }
    }

    /// Builds a record from an exact decimal amount.
    pub fn from_decimal(
        from: impl Into<String>,
        to: Option<&str>,
        weight: Decimal,
    ) -> SankeyResult<Self> {
        Ok(Self::new(from, to, decimal_to_f64(weight, "flow weight")?))
    }

    #[must_use]
    pub fn is_dropoff(&self) -> bool {
        self.to.is_none()
    }

    /// Validates a raw row, returning `None` when `policy` rejects it.
    #[must_use]
    pub fn from_row(row: &FlowRow, policy: MissingPolicy) -> Option<Self> {
        let fields = row.missing_fields();
        if policy.is_missing(fields) {
            return None;
        }

        let from = non_empty_str(&row.from).unwrap_or_default().to_owned();
        let to = row
            .to
            .as_ref()
            .and_then(non_empty_str)
            .map(str::to_owned);
        let weight = if fields.weight {
            0.0
        } else {
            value_to_number(&row.flow)
        };
        Some(Self { from, to, weight })
    }

    /// Checks a typed record against `policy`.
    pub fn validate(&self, policy: MissingPolicy) -> SankeyResult<()> {
        let fields = FlowRow::from(self).missing_fields();
        if policy.is_missing(fields) {
            return Err(SankeyError::InvalidData(format!(
                "flow record `{}` -> `{}` is missing required values",
                self.from,
                self.to.as_deref().unwrap_or("<dropoff>")
            )));
        }
        Ok(())
    }
}

/// Accepted record together with the index of the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub data_index: usize,
    pub record: FlowRecord,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRows {
    pub records: Vec<IndexedRecord>,
    pub dropped: usize,
}

/// Validates every row, keeping the data index of accepted ones.
#[must_use]
pub fn parse_rows(rows: &[FlowRow], policy: MissingPolicy) -> ParsedRows {
    let mut parsed = ParsedRows {
        records: Vec::with_capacity(rows.len()),
        dropped: 0,
    };
    for (data_index, row) in rows.iter().enumerate() {
        match FlowRecord::from_row(row, policy) {
            Some(record) => parsed.records.push(IndexedRecord { data_index, record }),
            None => {
                debug!(data_index, ?policy, "dropping malformed flow row");
                parsed.dropped += 1;
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FlowRecord, FlowRow, MissingPolicy, parse_rows, value_to_number};

    fn row(value: serde_json::Value) -> FlowRow {
        serde_json::from_value(value).expect("row json")
    }

    #[test]
    fn numeric_strings_are_coerced() {
        assert_eq!(value_to_number(&json!(" 12.5 ")), 12.5);
        assert_eq!(value_to_number(&json!("")), 0.0);
        assert!(value_to_number(&json!(true)).is_nan());
        assert!(value_to_number(&json!(null)).is_nan());
    }

    #[test]
    fn absent_to_differs_from_null_to() {
        let dropoff = row(json!({"from": "A", "to": null, "flow": 3}));
        let absent = row(json!({"from": "A", "flow": 3}));

        let record = FlowRecord::from_row(&dropoff, MissingPolicy::AnyFieldMissing)
            .expect("null target is a drop-off");
        assert!(record.is_dropoff());
        assert!(FlowRecord::from_row(&absent, MissingPolicy::AnyFieldMissing).is_none());
    }

    #[test]
    fn weight_alias_is_accepted() {
        let parsed = row(json!({"from": "A", "to": "B", "weight": "7"}));
        let record =
            FlowRecord::from_row(&parsed, MissingPolicy::AnyFieldMissing).expect("valid row");
        assert_eq!(record.weight, 7.0);
    }

    #[test]
    fn any_policy_drops_rows_with_one_bad_field() {
        let rows = vec![
            FlowRow::link("A", "B", 10.0),
            FlowRow::link("A", "B", 0.0),
            FlowRow::link("", "B", 4.0),
            row(json!({"from": "A", "to": "", "flow": 4})),
        ];
        let parsed = parse_rows(&rows, MissingPolicy::AnyFieldMissing);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 3);
        assert_eq!(parsed.records[0].data_index, 0);
    }

    #[test]
    fn all_policy_keeps_partially_valid_rows_normalized() {
        let rows = vec![
            FlowRow::link("A", "B", -3.0),
            row(json!({"from": 5, "to": "", "flow": "x"})),
        ];
        let parsed = parse_rows(&rows, MissingPolicy::AllFieldsMissing);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.records[0].record.weight, 0.0);
        assert_eq!(parsed.records[0].record.to.as_deref(), Some("B"));
    }
}
