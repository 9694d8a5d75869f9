//! Stall records as served by `GET /api/employee/stalls`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// ============================================================================
// Stall Record
// ============================================================================

/// A single stall.
///
/// Only the fields the client displays are modeled; everything else the
/// server sends is kept in [`StallMap::raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallRecord {
    /// Stall code (e.g. "A1").
    #[serde(default, alias = "stall_code", deserialize_with = "null_as_default")]
    pub stall_code: String,

    /// Floor the stall is on.
    #[serde(default, alias = "floor_name", deserialize_with = "null_as_default")]
    pub floor_name: String,

    /// Stall type (e.g. "Food", "Retail").
    #[serde(default, alias = "stall_type", deserialize_with = "null_as_default")]
    pub stall_type: String,

    /// Whether a vendor holds the stall.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reserved: bool,

    /// Vendor holding the stall.
    #[serde(default, alias = "vendor_name")]
    pub vendor_name: Option<String>,

    /// Vendor's business name.
    #[serde(default, alias = "business_name")]
    pub business_name: Option<String>,

    /// Payment status of the reservation.
    #[serde(default, alias = "payment_status")]
    pub payment_status: Option<String>,
}

impl StallRecord {
    /// Creates an available stall.
    pub fn new(
        stall_code: impl Into<String>,
        floor_name: impl Into<String>,
        stall_type: impl Into<String>,
    ) -> Self {
        Self {
            stall_code: stall_code.into(),
            floor_name: floor_name.into(),
            stall_type: stall_type.into(),
            ..Self::default()
        }
    }

    /// Marks the stall reserved by a vendor.
    #[must_use]
    pub fn reserved_by(
        mut self,
        vendor_name: impl Into<String>,
        business_name: impl Into<String>,
        payment_status: impl Into<String>,
    ) -> Self {
        self.reserved = true;
        self.vendor_name = Some(vendor_name.into());
        self.business_name = Some(business_name.into());
        self.payment_status = Some(payment_status.into());
        self
    }

    /// Returns the display label for the reservation status.
    pub fn status_label(&self) -> &'static str {
        if self.reserved { "RESERVED" } else { "AVAILABLE" }
    }
}

// ============================================================================
// Stall Summary
// ============================================================================

/// Counts over a [`StallMap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StallSummary {
    /// Number of stalls.
    pub total: usize,
    /// Stalls held by a vendor.
    pub reserved: usize,
    /// `total - reserved`.
    pub available: usize,
}

// ============================================================================
// Stall Map
// ============================================================================

/// The stall sequence exactly as the server returned it.
///
/// Record order is the server's; the client imposes none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StallMap {
    records: Vec<StallRecord>,
    raw: Vec<Value>,
}

impl StallMap {
    /// Decodes a stalls response body.
    ///
    /// The body must be a JSON array. Each element must be an object that
    /// decodes as a [`StallRecord`]; unknown fields are kept in the raw view.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Decodes an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let Value::Array(raw) = value else {
            return Err(CoreError::InvalidData(format!(
                "expected a JSON array of stalls, got {}",
                json_kind(&value)
            )));
        };

        let records = raw
            .iter()
            .map(|item| StallRecord::deserialize(item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records, raw })
    }

    /// Builds a map from typed records. The raw view is their serialization.
    pub fn from_records(records: Vec<StallRecord>) -> Result<Self, CoreError> {
        let raw = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records, raw })
    }

    /// Typed records, in server order.
    pub fn records(&self) -> &[StallRecord] {
        &self.records
    }

    /// Raw JSON elements, in server order, including unmodeled fields.
    pub fn raw(&self) -> &[Value] {
        &self.raw
    }

    /// Number of stalls.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the server returned no stalls.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total, reserved and available counts.
    pub fn summary(&self) -> StallSummary {
        let total = self.records.len();
        let reserved = self.records.iter().filter(|r| r.reserved).count();
        StallSummary {
            total,
            reserved,
            available: total - reserved,
        }
    }
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let body = r#"[
            {"stallCode":"A1","floorName":"Ground","stallType":"Food","reserved":true,
             "vendorName":"Ana","businessName":"Ana's Tacos","paymentStatus":"PAID"},
            {"stallCode":"A2","floorName":"Ground","stallType":"Retail","reserved":false}
        ]"#;

        let map = StallMap::from_json(body).unwrap();
        let summary = map.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.reserved, 1);
        assert_eq!(summary.available, 1);
    }

    #[test]
    fn test_empty_array() {
        let map = StallMap::from_json("[]").unwrap();
        assert!(map.is_empty());
        assert_eq!(map.summary(), StallSummary::default());
    }

    #[test]
    fn test_object_body_is_rejected() {
        let err = StallMap::from_json(r#"{"stalls": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidData(_)));
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let err = StallMap::from_json("[{").unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn test_raw_keeps_unknown_fields() {
        let body = r#"[{"stallCode":"B7","reserved":false,"id":42,"price":1500.0}]"#;
        let map = StallMap::from_json(body).unwrap();

        assert_eq!(map.records()[0].stall_code, "B7");
        assert_eq!(map.raw()[0]["id"], 42);
        assert_eq!(map.raw()[0]["price"], 1500.0);
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let body = r#"[{"stallCode":null,"floorName":"Second","reserved":null,"vendorName":null}]"#;
        let map = StallMap::from_json(body).unwrap();
        let stall = &map.records()[0];

        assert_eq!(stall.stall_code, "");
        assert_eq!(stall.floor_name, "Second");
        assert!(!stall.reserved);
        assert!(stall.vendor_name.is_none());
    }

    #[test]
    fn test_status_label() {
        let stall = StallRecord::new("C3", "First", "Food");
        assert_eq!(stall.status_label(), "AVAILABLE");
        assert_eq!(
            stall.reserved_by("Ben", "Ben's Books", "PENDING").status_label(),
            "RESERVED"
        );
    }
}
