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

//! The topic-to-point mapping engine.
//!
//! Turns one `(topic, payload)` delivery into time-series points, one per
//! connector whose pattern matches the topic.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use bridge_sink_influx::{FieldValue, Point};
use log::warn;
use regex::Captures;
use serde::Deserialize;
use serde_json::Value;

use crate::connector::{Connector, ConnectorTable};

/// Reserved capture-group name that supplies the measurement.
const MEASUREMENT_GROUP: &str = "measurement";
/// Capture groups with this prefix become tags, keyed by the remainder of
/// the group name.
const TAG_GROUP_PREFIX: &str = "tag_";

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// The measured portion of an incoming payload.
///
/// Payloads are JSON objects; `val` and `ts` are both optional and other
/// members are ignored. `ts` is a Unix timestamp in whole seconds.
#[derive(Debug, Deserialize)]
struct TelemetryPayload {
    val: Option<Value>,
    ts: Option<i64>,
}

/// Map one delivery to points, in connector table order.
///
/// The sequence is lazy and finite, at most one point per connector. A
/// connector whose pattern does not match the topic produces nothing (not
/// an error). A payload that fails to decode is logged and skips only the
/// connector it was decoded for; later connectors and later messages are
/// unaffected. Emitting the points is the caller's concern; the mapper
/// never touches the store.
pub fn map_message<'a>(
    table: &'a ConnectorTable,
    topic: &'a str,
    payload: &'a [u8],
) -> impl Iterator<Item = Point> + 'a {
    table.connectors().filter_map(move |connector| {
        let caps = connector.pattern.captures(topic)?;
        match synthesize(connector, &caps, payload) {
            Ok(point) => Some(point),
            Err(e) => {
                warn!(
                    "mqtt: undecodable payload on '{topic}' (pattern '{}'): {e}",
                    connector.pattern.as_str()
                );
                None
            }
        }
    })
}

/// Build the point for one matched connector.
fn synthesize(
    connector: &Connector,
    caps: &Captures<'_>,
    payload: &[u8],
) -> Result<Point, serde_json::Error> {
    let payload: TelemetryPayload = serde_json::from_slice(payload)?;

    // Measurement from the topic when the pattern captured one, else the
    // connector's static name.
    let measurement = caps
        .name(MEASUREMENT_GROUP)
        .map(|m| m.as_str().to_string())
        .or_else(|| connector.measurement.clone());

    // Pattern-derived tags first, static connector tags overlaid on top.
    let mut tags = BTreeMap::new();
    for name in connector.pattern.capture_names().flatten() {
        if let Some(key) = name.strip_prefix(TAG_GROUP_PREFIX) {
            if let Some(m) = caps.name(name) {
                tags.insert(key.to_string(), m.as_str().to_string());
            }
        }
    }
    for (key, value) in &connector.tags {
        tags.insert(key.clone(), value.clone());
    }

    let mut fields = BTreeMap::new();
    if let (Some(name), Some(val)) = (&connector.field_name, &payload.val) {
        if let Some(value) = FieldValue::from_json(val) {
            fields.insert(name.clone(), value);
        }
    }

    let timestamp = match payload.ts {
        Some(secs) => secs * NANOS_PER_SEC,
        None => now_nanos(),
    };

    Ok(Point {
        measurement,
        tags,
        fields,
        timestamp,
    })
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}
