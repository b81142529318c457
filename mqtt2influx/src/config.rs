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

//! Bridge configuration file.
//!
//! A single JSON file read once at startup, before anything else runs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bridge_source_mqtt::ConnectorDef;
use serde::Deserialize;

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Default log filter, overridable with `RUST_LOG`.
    #[serde(default = "default_log")]
    pub log: String,
    pub mqtt: MqttSection,
    pub influxdb: InfluxSection,
}

/// The `mqtt` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttSection {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    /// Bridge instance name; the retained status topic is
    /// `{name}/connected`.
    #[serde(default = "default_name")]
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The `influxdb` section, including the connector list.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxSection {
    pub host: String,
    #[serde(default = "default_influx_port")]
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub connectors: Vec<ConnectorDef>,
}

fn default_log() -> String {
    "info".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_influx_port() -> u16 {
    8086
}

fn default_name() -> String {
    "mqtt2influx".to_string()
}

impl BridgeConfig {
    /// Read and parse the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<BridgeConfig> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
