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

//! MQTT subscription side of the mqtt2influx bridge.
//!
//! Subscribes to the configured connector topics, maps every delivery to
//! time-series points via the connector table, and hands each point to the
//! store sink as a fire-and-forget write.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_source_mqtt::{ConnectorTable, MqttSource, MqttSourceConfig};
//!
//! let table = ConnectorTable::load(&defs)?;
//! let config = MqttSourceConfig::builder("broker.local")
//!     .port(1883)
//!     .name("mqtt2influx")
//!     .build();
//!
//! let source = MqttSource::new(config, table, Arc::new(writer));
//! source.start().await?;
//! ```

pub mod config;
pub mod connector;
pub mod mapper;
pub mod source;

pub use config::{MqttSourceConfig, MqttSourceConfigBuilder};
pub use connector::{ConfigError, Connector, ConnectorDef, ConnectorTable};
pub use source::MqttSource;
