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

//! InfluxDB write side of the mqtt2influx bridge.
//!
//! Defines the [`Point`] model, encodes points as v1 line protocol and
//! writes them over HTTP, one fire-and-forget request per point.
//!
//! # Example
//!
//! ```ignore
//! use bridge_sink_influx::{InfluxConfig, InfluxWriter};
//!
//! let config = InfluxConfig::builder("influx.local", "telemetry")
//!     .port(8086)
//!     .build();
//!
//! let writer = InfluxWriter::new(config);
//! // Pass `Arc::new(writer)` to MqttSource::new as the point sink.
//! ```

pub mod config;
pub mod line;
pub mod point;
pub mod writer;

pub use config::{InfluxConfig, InfluxConfigBuilder};
pub use point::{FieldValue, Point};
pub use writer::{spawn_write, InfluxWriter, PointSink, WriteError};
