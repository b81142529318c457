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

//! InfluxDB line-protocol encoding.

use thiserror::Error;

use crate::point::{FieldValue, Point};

/// A point that cannot be represented in line protocol.
///
/// This is where the emittability invariant is enforced: the mapper forwards
/// incomplete points, the store boundary rejects them per point.
#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("point has no measurement")]
    MissingMeasurement,
    #[error("point has no fields")]
    NoFields,
}

/// Encode one point as a v1 line-protocol line with nanosecond timestamp.
///
/// Tags and fields are emitted in key order.
pub fn encode(point: &Point) -> Result<String, EncodeError> {
    let measurement = point
        .measurement
        .as_deref()
        .ok_or(EncodeError::MissingMeasurement)?;
    if point.fields.is_empty() {
        return Err(EncodeError::NoFields);
    }

    let mut line = escape_measurement(measurement);
    for (key, value) in &point.tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        push_field_value(&mut line, value);
    }

    line.push(' ');
    line.push_str(&point.timestamp.to_string());
    Ok(line)
}

fn push_field_value(line: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Float(f) => line.push_str(&f.to_string()),
        FieldValue::Integer(i) => {
            line.push_str(&i.to_string());
            line.push('i');
        }
        FieldValue::UInteger(u) => {
            line.push_str(&u.to_string());
            line.push('u');
        }
        FieldValue::Text(s) => {
            line.push('"');
            line.push_str(&s.replace('\\', "\\\\").replace('"', "\\\""));
            line.push('"');
        }
        FieldValue::Boolean(b) => line.push_str(if *b { "true" } else { "false" }),
    }
}

/// Measurements escape commas and spaces.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys escape commas, equals signs and
/// spaces.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn point() -> Point {
        Point {
            measurement: Some("temperature".into()),
            tags: BTreeMap::from([("room".into(), "livingroom".into())]),
            fields: BTreeMap::from([("value".into(), FieldValue::Float(21.5))]),
            timestamp: 1_700_000_000_000_000_000,
        }
    }

    #[test]
    fn test_basic_line() {
        assert_eq!(
            encode(&point()).unwrap(),
            "temperature,room=livingroom value=21.5 1700000000000000000"
        );
    }

    #[test]
    fn test_tags_sorted_by_key() {
        let mut p = point();
        p.tags.insert("floor".into(), "1".into());
        assert_eq!(
            encode(&p).unwrap(),
            "temperature,floor=1,room=livingroom value=21.5 1700000000000000000"
        );
    }

    #[test]
    fn test_field_type_suffixes() {
        let mut p = point();
        p.fields = BTreeMap::from([
            ("count".into(), FieldValue::Integer(5)),
            ("max".into(), FieldValue::UInteger(7)),
            ("on".into(), FieldValue::Boolean(true)),
            ("state".into(), FieldValue::Text("open".into())),
        ]);
        assert_eq!(
            encode(&p).unwrap(),
            "temperature,room=livingroom count=5i,max=7u,on=true,state=\"open\" 1700000000000000000"
        );
    }

    #[test]
    fn test_escaping() {
        let p = Point {
            measurement: Some("air quality".into()),
            tags: BTreeMap::from([("room name".into(), "living,room".into())]),
            fields: BTreeMap::from([(
                "note".into(),
                FieldValue::Text("said \"ok\" \\ done".into()),
            )]),
            timestamp: 0,
        };
        assert_eq!(
            encode(&p).unwrap(),
            "air\\ quality,room\\ name=living\\,room note=\"said \\\"ok\\\" \\\\ done\" 0"
        );
    }

    #[test]
    fn test_missing_measurement_rejected() {
        let mut p = point();
        p.measurement = None;
        assert_eq!(encode(&p), Err(EncodeError::MissingMeasurement));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut p = point();
        p.fields.clear();
        assert_eq!(encode(&p), Err(EncodeError::NoFields));
    }
}
