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

//! The connector table: topic-pattern to extraction-rule bindings.
//!
//! Loaded once from configuration and immutable for the process lifetime.
//! Order matters: several connectors may match the same topic and each
//! produces its own point, in declaration order.

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// One connector entry as it appears in the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDef {
    /// Subscription filter registered with the broker (broker wildcard
    /// syntax, e.g. `home/+/temperature`).
    pub topic: String,
    /// Pattern applied to the concrete topic of each delivery. Required.
    ///
    /// Named capture groups drive extraction: a group called `measurement`
    /// supplies the measurement, groups prefixed `tag_` become tags.
    #[serde(rename = "match")]
    pub match_pattern: Option<String>,
    /// Static measurement name, used when the pattern does not capture one.
    pub measurement: Option<String>,
    /// Static tags overlaid onto pattern-derived tags (static wins).
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Field name under which the payload's `val` is stored.
    pub field_name: Option<String>,
}

/// A compiled connector.
#[derive(Debug, Clone)]
pub struct Connector {
    pub topic: String,
    pub pattern: Regex,
    pub measurement: Option<String>,
    pub tags: HashMap<String, String>,
    pub field_name: Option<String>,
}

/// Connector-load failure. Fatal at startup: without a valid pattern no
/// mapping can take place.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("connector {index} ({topic}): missing match pattern")]
    MissingPattern { index: usize, topic: String },
    #[error("connector {index} ({topic}): invalid match pattern")]
    InvalidPattern {
        index: usize,
        topic: String,
        #[source]
        source: regex::Error,
    },
}

/// The ordered, immutable collection of connectors.
#[derive(Debug, Clone, Default)]
pub struct ConnectorTable {
    connectors: Vec<Connector>,
}

impl ConnectorTable {
    /// Compile the configured connector definitions, in declaration order.
    pub fn load(defs: &[ConnectorDef]) -> Result<ConnectorTable, ConfigError> {
        let mut connectors = Vec::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            let raw = def
                .match_pattern
                .as_deref()
                .ok_or_else(|| ConfigError::MissingPattern {
                    index,
                    topic: def.topic.clone(),
                })?;
            let pattern = Regex::new(raw).map_err(|source| ConfigError::InvalidPattern {
                index,
                topic: def.topic.clone(),
                source,
            })?;
            connectors.push(Connector {
                topic: def.topic.clone(),
                pattern,
                measurement: def.measurement.clone(),
                tags: def.tags.clone(),
                field_name: def.field_name.clone(),
            });
        }
        Ok(ConnectorTable { connectors })
    }

    /// Connectors in declaration order.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter()
    }

    /// Subscription filters in declaration order, for the bus layer to
    /// register.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.connectors.iter().map(|c| c.topic.as_str())
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defs(value: serde_json::Value) -> Vec<ConnectorDef> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_load_compiles_in_declaration_order() {
        let table = ConnectorTable::load(&defs(json!([
            {
                "topic": "home/+/temperature",
                "match": "^home/(?P<tag_room>[^/]+)/temperature$",
                "measurement": "temperature",
                "fieldName": "value"
            },
            {
                "topic": "home/+/humidity",
                "match": "^home/(?P<tag_room>[^/]+)/humidity$",
                "measurement": "humidity",
                "tags": {"unit": "percent"},
                "fieldName": "value"
            }
        ])))
        .unwrap();

        assert_eq!(table.len(), 2);
        let measurements: Vec<_> = table
            .connectors()
            .map(|c| c.measurement.clone().unwrap())
            .collect();
        assert_eq!(measurements, ["temperature", "humidity"]);
        let topics: Vec<_> = table.topics().collect();
        assert_eq!(topics, ["home/+/temperature", "home/+/humidity"]);
    }

    #[test]
    fn test_only_pattern_is_required() {
        let table = ConnectorTable::load(&defs(json!([
            {"topic": "sensors/#", "match": "^sensors/"}
        ])))
        .unwrap();

        let connector = table.connectors().next().unwrap();
        assert_eq!(connector.measurement, None);
        assert_eq!(connector.field_name, None);
        assert!(connector.tags.is_empty());
    }

    #[test]
    fn test_missing_pattern_is_fatal() {
        let err = ConnectorTable::load(&defs(json!([
            {"topic": "sensors/#", "measurement": "m"}
        ])))
        .unwrap_err();

        match err {
            ConfigError::MissingPattern { index, topic } => {
                assert_eq!(index, 0);
                assert_eq!(topic, "sensors/#");
            }
            other => panic!("expected MissingPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let err = ConnectorTable::load(&defs(json!([
            {"topic": "ok/#", "match": "^ok/"},
            {"topic": "broken/#", "match": "^broken/(?P<tag_x>["}
        ])))
        .unwrap_err();

        match err {
            ConfigError::InvalidPattern { index, topic, .. } => {
                assert_eq!(index, 1);
                assert_eq!(topic, "broken/#");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }
}
