//! Typed model of the table-comparison payload and its validation.
//!
//! The payload is produced by an external diff service and arrives as JSON.
//! [`validate()`] checks the two required top-level sections and decodes them
//! once into typed structs. Every field decodes leniently: absent or `null`
//! values take their default, so a payload of `{"schema_diff": {}, "row_diff": {}}`
//! is valid and renders as an empty report.
//!
//! Two shapes that the wire format leaves loose are pinned down here:
//!
//! - column statistics are either a breakdown of named values or a bare scalar,
//!   represented by [`ColumnStat`];
//! - sample rows carry `__`-prefixed metadata fields, which are lifted into
//!   [`SampleRow`] and never appear among its ordinary fields.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Rejection;

pub const DEFAULT_DECIMALS: u32 = 3;
pub const RESERVED_PREFIX: &str = "__";

const COLUMN_NAME_FIELD: &str = "__column_name__";
const SOURCE_NAME_FIELD: &str = "__source_name__";
const TARGET_NAME_FIELD: &str = "__target_name__";

#[derive(Debug, Clone, PartialEq)]
pub struct DiffPayload {
    pub schema_diff: SchemaDiff,
    pub row_diff: RowDiff,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaDiff {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub added: IndexMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed: IndexMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RowDiff {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_count: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_count: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count_pct_change: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: RowStatCounters,
    #[serde(default, deserialize_with = "null_as_default")]
    pub column_stats: IndexMap<String, ColumnStat>,
    #[serde(default = "default_decimals", deserialize_with = "decimals_or_default")]
    pub decimals: u32,
    #[serde(default)]
    pub processed_sample_data: Option<ProcessedSampleData>,
}

impl Default for RowDiff {
    fn default() -> Self {
        Self {
            source_count: 0.0,
            target_count: 0.0,
            count_pct_change: 0.0,
            stats: RowStatCounters::default(),
            column_stats: IndexMap::new(),
            decimals: DEFAULT_DECIMALS,
            processed_sample_data: None,
        }
    }
}

/// Named counters reported by the row join. Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RowStatCounters {
    #[serde(default)]
    pub full_match_count: Option<f64>,
    #[serde(default)]
    pub join_count: Option<f64>,
    #[serde(default)]
    pub s_only_count: Option<f64>,
    #[serde(default)]
    pub t_only_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProcessedSampleData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub column_differences: Vec<SampleRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_only: Vec<SampleRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_only: Vec<SampleRow>,
}

impl ProcessedSampleData {
    pub fn total_rows(&self) -> usize {
        self.column_differences.len() + self.source_only.len() + self.target_only.len()
    }
}

/// A single heterogeneous cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SampleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SampleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            SampleValue::Null => false,
            SampleValue::Bool(b) => *b,
            SampleValue::Number(n) => *n != 0.0 && !n.is_nan(),
            SampleValue::Text(s) => !s.is_empty(),
        }
    }
}

impl From<&Value> for SampleValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SampleValue::Null,
            Value::Bool(b) => SampleValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(SampleValue::Number)
                .unwrap_or_else(|| SampleValue::Text(n.to_string())),
            Value::String(s) => SampleValue::Text(s.clone()),
            // Nested values are not part of the cell contract; keep them readable.
            other => SampleValue::Text(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for SampleValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(SampleValue::from(&raw))
    }
}

/// Natural string form: `null`, `true`/`false`, the shortest round-trip
/// number, or the text itself. Magnitudes from `1e21` up and below `1e-6`
/// switch to exponent form (`1e+21`, `1.5e-7`).
impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Null => f.write_str("null"),
            SampleValue::Bool(b) => write!(f, "{b}"),
            SampleValue::Number(n) if *n == 0.0 => f.write_str("0"),
            SampleValue::Number(n) if n.is_finite() && !(1e-6..1e21).contains(&n.abs()) => {
                let exp = format!("{n:e}");
                match exp.split_once('e') {
                    Some((mantissa, power)) if !power.starts_with('-') => {
                        write!(f, "{mantissa}e+{power}")
                    }
                    _ => f.write_str(&exp),
                }
            }
            SampleValue::Number(n) => write!(f, "{n}"),
            SampleValue::Text(s) => f.write_str(s),
        }
    }
}

/// Per-column statistic entry: usually a breakdown of named values, sometimes
/// a single scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStat {
    Scalar(SampleValue),
    Breakdown(IndexMap<String, SampleValue>),
}

impl ColumnStat {
    pub fn stat_names(&self) -> Vec<&str> {
        match self {
            ColumnStat::Scalar(_) => Vec::new(),
            ColumnStat::Breakdown(map) => map.keys().map(String::as_str).collect(),
        }
    }

    pub fn values(&self) -> Vec<&SampleValue> {
        match self {
            ColumnStat::Scalar(value) => vec![value],
            ColumnStat::Breakdown(map) => map.values().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnStat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(match &raw {
            Value::Object(map) => ColumnStat::Breakdown(
                map.iter()
                    .map(|(name, value)| (name.clone(), SampleValue::from(value)))
                    .collect(),
            ),
            other => ColumnStat::Scalar(SampleValue::from(other)),
        })
    }
}

/// One illustrative row. Ordinary fields keep their payload order; the
/// metadata fields are decoded into dedicated slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleRow {
    pub fields: IndexMap<String, SampleValue>,
    /// The differing column this row illustrates.
    pub column_name: Option<String>,
    /// Ordinary field holding the source-side value.
    pub source_field: Option<String>,
    /// Ordinary field holding the target-side value.
    pub target_field: Option<String>,
}

impl SampleRow {
    pub fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let mut row = SampleRow::default();
        for (key, value) in object {
            match key.as_str() {
                COLUMN_NAME_FIELD => {
                    let value = SampleValue::from(value);
                    if value.is_truthy() {
                        row.column_name = Some(value.to_string());
                    }
                }
                SOURCE_NAME_FIELD => row.source_field = value.as_str().map(str::to_string),
                TARGET_NAME_FIELD => row.target_field = value.as_str().map(str::to_string),
                reserved if reserved.starts_with(RESERVED_PREFIX) => {}
                _ => {
                    row.fields.insert(key.clone(), SampleValue::from(value));
                }
            }
        }
        row
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for SampleRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        Ok(SampleRow::from_object(&object))
    }
}

/// Checks the payload shape and decodes it into the typed model.
pub fn validate(raw: Option<&Value>) -> Result<DiffPayload, Rejection> {
    let object = match raw {
        None | Some(Value::Null) => return Err(Rejection::NoData),
        Some(Value::Object(object)) => object,
        Some(_) => return Err(Rejection::invalid("payload is not a JSON object")),
    };
    let schema = required_section(object, "schema_diff")?;
    let rows = required_section(object, "row_diff")?;

    let schema_diff = SchemaDiff::deserialize(schema)
        .map_err(|err| Rejection::invalid(format!("schema_diff: {err}")))?;
    let row_diff =
        RowDiff::deserialize(rows).map_err(|err| Rejection::invalid(format!("row_diff: {err}")))?;
    Ok(DiffPayload {
        schema_diff,
        row_diff,
    })
}

/// Validates raw JSON text. Blank input counts as no data.
pub fn validate_str(text: &str) -> Result<DiffPayload, Rejection> {
    if text.trim().is_empty() {
        return Err(Rejection::NoData);
    }
    let raw: Value = serde_json::from_str(text)
        .map_err(|err| Rejection::invalid(format!("payload is not valid JSON: {err}")))?;
    validate(Some(&raw))
}

fn required_section<'a>(
    object: &'a serde_json::Map<String, Value>,
    name: &str,
) -> Result<&'a Value, Rejection> {
    match object.get(name) {
        Some(Value::Null) | None => Err(Rejection::invalid(format!("missing `{name}`"))),
        Some(value) => Ok(value),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

fn decimals_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(DEFAULT_DECIMALS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sample_row_lifts_metadata_fields() {
        let raw = json!({
            "id": 7,
            "__column_name__": "price",
            "price__source": 1.5,
            "price__target": 2.5,
            "__source_name__": "price__source",
            "__target_name__": "price__target",
            "__extra__": "ignored"
        });
        let row = SampleRow::deserialize(&raw).expect("decode row");
        assert_eq!(row.column_name.as_deref(), Some("price"));
        assert_eq!(row.source_field.as_deref(), Some("price__source"));
        assert_eq!(row.target_field.as_deref(), Some("price__target"));
        assert_eq!(
            row.field_names().collect::<Vec<_>>(),
            vec!["id", "price__source", "price__target"]
        );
    }

    #[test]
    fn falsy_column_name_is_treated_as_absent() {
        for marker in [json!(null), json!(""), json!(0), json!(false)] {
            let raw = json!({ "__column_name__": marker, "v": 1 });
            let row = SampleRow::deserialize(&raw).expect("decode row");
            assert_eq!(row.column_name, None, "marker {marker}");
        }
        let raw = json!({ "__column_name__": 12 });
        let row = SampleRow::deserialize(&raw).expect("decode row");
        assert_eq!(row.column_name.as_deref(), Some("12"));
    }

    #[test]
    fn column_stats_resolve_scalar_and_breakdown() {
        let raw = json!({
            "schema_diff": {},
            "row_diff": {
                "column_stats": {
                    "amount": { "mean": 1.25, "max": 9 },
                    "flag": "n/a"
                }
            }
        });
        let payload = validate(Some(&raw)).expect("valid payload");
        let stats = &payload.row_diff.column_stats;
        assert_eq!(stats["amount"].stat_names(), vec!["mean", "max"]);
        assert_eq!(
            stats["flag"],
            ColumnStat::Scalar(SampleValue::Text("n/a".to_string()))
        );
    }

    #[test]
    fn null_fields_take_defaults() {
        let raw = json!({
            "schema_diff": { "source": null, "added": null },
            "row_diff": { "decimals": null, "stats": null, "column_stats": null }
        });
        let payload = validate(Some(&raw)).expect("valid payload");
        assert_eq!(payload.schema_diff, SchemaDiff::default());
        assert_eq!(payload.row_diff, RowDiff::default());
    }

    #[test]
    fn mistyped_section_is_invalid_structure() {
        let raw = json!({
            "schema_diff": {},
            "row_diff": { "source_count": "many" }
        });
        let err = validate(Some(&raw)).expect_err("should reject");
        assert!(matches!(err, Rejection::InvalidStructure { .. }));
        assert!(err.detail().starts_with("row_diff"));
    }

    #[test]
    fn natural_string_matches_display_conventions() {
        assert_eq!(SampleValue::Number(3.0).to_string(), "3");
        assert_eq!(SampleValue::Number(-0.0).to_string(), "0");
        assert_eq!(SampleValue::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(SampleValue::Bool(false).to_string(), "false");
        assert_eq!(SampleValue::Null.to_string(), "null");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(SampleValue::Number(1e21).to_string(), "1e+21");
        assert_eq!(SampleValue::Number(-1.23e22).to_string(), "-1.23e+22");
        assert_eq!(SampleValue::Number(1.5e-7).to_string(), "1.5e-7");
        assert_eq!(SampleValue::Number(1e-7).to_string(), "1e-7");
        assert_eq!(SampleValue::Number(1e-6).to_string(), "0.000001");
        assert_eq!(SampleValue::Number(1e20).to_string(), "100000000000000000000");
    }
}
