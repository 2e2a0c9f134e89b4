//! Raw sensor readings and the field mappings that locate them in records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the value, latitude and longitude fields in a source's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub value: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            value: "value".into(),
            latitude: "latitude".into(),
            longitude: "longitude".into(),
        }
    }
}

impl FieldMapping {
    pub fn new(
        value: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// One reading with every field still optional.
///
/// `None` means the field was absent, null, or not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawReading {
    pub value: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RawReading {
    pub fn new(latitude: f64, longitude: f64, value: f64) -> Self {
        Self {
            value: Some(value),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Pull the mapped fields out of a JSON object.
    ///
    /// Accepts JSON numbers and numeric strings (sensor feeds often quote
    /// their numbers). Anything else maps to `None`.
    pub fn from_record(record: &Value, mapping: &FieldMapping) -> Self {
        Self {
            value: numeric_field(record, &mapping.value),
            latitude: numeric_field(record, &mapping.latitude),
            longitude: numeric_field(record, &mapping.longitude),
        }
    }
}

fn numeric_field(record: &Value, name: &str) -> Option<f64> {
    match record.get(name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A named batch of readings from one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSource {
    pub name: String,
    pub readings: Vec<RawReading>,
}

impl ReadingSource {
    pub fn from_readings(name: impl Into<String>, readings: Vec<RawReading>) -> Self {
        Self {
            name: name.into(),
            readings,
        }
    }

    /// Map raw JSON records through `mapping`.
    pub fn from_records(name: impl Into<String>, records: &[Value], mapping: &FieldMapping) -> Self {
        Self::from_readings(
            name,
            records
                .iter()
                .map(|r| RawReading::from_record(r, mapping))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_numeric_strings() {
        let mapping = FieldMapping::new("pm25", "gps_lat", "gps_long");
        let r = RawReading::from_record(
            &json!({"pm25": "12.5", "gps_lat": 14.6, "gps_long": " 121.0 "}),
            &mapping,
        );
        assert_eq!(r, RawReading::new(14.6, 121.0, 12.5));
    }

    #[test]
    fn test_null_missing_and_garbage_are_none() {
        let mapping = FieldMapping::default();
        let r = RawReading::from_record(
            &json!({"value": null, "latitude": "n/a", "other": 1}),
            &mapping,
        );
        assert_eq!(r, RawReading::default());
    }

    #[test]
    fn test_non_object_record() {
        let r = RawReading::from_record(&json!([1, 2, 3]), &FieldMapping::default());
        assert_eq!(r, RawReading::default());
    }

    #[test]
    fn test_mapping_defaults_from_partial_json() {
        let mapping: FieldMapping = serde_json::from_value(json!({"value": "pm10"})).unwrap();
        assert_eq!(mapping.value, "pm10");
        assert_eq!(mapping.latitude, "latitude");
        assert_eq!(mapping.longitude, "longitude");
    }

    #[test]
    fn test_source_from_records_preserves_order() {
        let records = vec![
            json!({"value": 1, "latitude": 0, "longitude": 0}),
            json!({"value": 2, "latitude": 1, "longitude": 1}),
        ];
        let src = ReadingSource::from_records("a", &records, &FieldMapping::default());
        assert_eq!(src.len(), 2);
        assert_eq!(src.readings[1].value, Some(2.0));
    }
}
