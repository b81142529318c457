// Copyright 2025 The mqtt2influx Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The time-series point model produced by the mapper and consumed by the
//! writer.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single field value, keeping the representation JSON decoding produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    UInteger(u64),
    Text(String),
    Boolean(bool),
}

impl FieldValue {
    /// Convert a decoded JSON value into a field value.
    ///
    /// Numbers keep the integer/float distinction serde_json decoded them
    /// with. Null, arrays and objects have no field representation and
    /// yield `None`.
    pub fn from_json(value: &Value) -> Option<FieldValue> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(FieldValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Some(FieldValue::UInteger(u))
                } else {
                    n.as_f64().map(FieldValue::Float)
                }
            }
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            _ => None,
        }
    }
}

/// One time-series observation, constructed per delivery and written
/// immediately.
///
/// `measurement` stays optional until write time: the mapper forwards
/// whatever it could extract and the writer rejects incomplete points when
/// it encodes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: Option<String>,
    /// Tag keys are unique; inserting a key twice keeps the last value.
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_types_preserved() {
        assert_eq!(FieldValue::from_json(&json!(5)), Some(FieldValue::Integer(5)));
        assert_eq!(
            FieldValue::from_json(&json!(21.5)),
            Some(FieldValue::Float(21.5))
        );
        assert_eq!(
            FieldValue::from_json(&json!(u64::MAX)),
            Some(FieldValue::UInteger(u64::MAX))
        );
    }

    #[test]
    fn test_text_and_bool_pass_through() {
        assert_eq!(
            FieldValue::from_json(&json!("on")),
            Some(FieldValue::Text("on".into()))
        );
        assert_eq!(
            FieldValue::from_json(&json!(true)),
            Some(FieldValue::Boolean(true))
        );
    }

    #[test]
    fn test_null_and_composites_have_no_field_form() {
        assert_eq!(FieldValue::from_json(&json!(null)), None);
        assert_eq!(FieldValue::from_json(&json!([1, 2])), None);
        assert_eq!(FieldValue::from_json(&json!({"nested": 1})), None);
    }
}
