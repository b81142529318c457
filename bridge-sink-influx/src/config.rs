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

//! Configuration types for the InfluxDB writer.

use serde::Deserialize;

/// Configuration for the InfluxDB writer.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxConfig {
    /// InfluxDB hostname or IP.
    pub host: String,
    /// InfluxDB HTTP port (default: 8086).
    pub port: u16,
    /// Database written to.
    pub database: String,
    /// Optional username for basic auth.
    pub username: Option<String>,
    /// Optional password for basic auth.
    pub password: Option<String>,
}

impl InfluxConfig {
    /// Start building a new config with the required fields.
    pub fn builder(host: impl Into<String>, database: impl Into<String>) -> InfluxConfigBuilder {
        InfluxConfigBuilder {
            host: host.into(),
            port: 8086,
            database: database.into(),
            username: None,
            password: None,
        }
    }
}

/// Builder for [`InfluxConfig`].
pub struct InfluxConfigBuilder {
    host: String,
    port: u16,
    database: String,
    username: Option<String>,
    password: Option<String>,
}

impl InfluxConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Build the config.
    pub fn build(self) -> InfluxConfig {
        InfluxConfig {
            host: self.host,
            port: self.port,
            database: self.database,
            username: self.username,
            password: self.password,
        }
    }
}
