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

//! Configuration types for the MQTT connection.

use serde::Deserialize;

/// Configuration for the MQTT side of the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttSourceConfig {
    /// MQTT broker hostname or IP.
    pub broker_host: String,
    /// MQTT broker port (default: 1883).
    pub port: u16,
    /// Bridge instance name. The retained status topic is
    /// `{name}/connected` (`"2"` while connected, `"0"` as last will).
    pub name: String,
    /// MQTT client ID. Defaults to `"mqtt2influx-{uuid}"`.
    pub client_id: String,
    /// Optional MQTT username for authentication.
    pub username: Option<String>,
    /// Optional MQTT password for authentication.
    pub password: Option<String>,
}

impl MqttSourceConfig {
    /// Start building a new config with the required fields.
    pub fn builder(broker_host: impl Into<String>) -> MqttSourceConfigBuilder {
        MqttSourceConfigBuilder {
            broker_host: broker_host.into(),
            port: 1883,
            name: "mqtt2influx".to_string(),
            client_id: format!("mqtt2influx-{}", uuid::Uuid::new_v4()),
            username: None,
            password: None,
        }
    }

    /// The retained connection-status topic.
    pub fn status_topic(&self) -> String {
        format!("{}/connected", self.name)
    }
}

/// Builder for [`MqttSourceConfig`].
pub struct MqttSourceConfigBuilder {
    broker_host: String,
    port: u16,
    name: String,
    client_id: String,
    username: Option<String>,
    password: Option<String>,
}

impl MqttSourceConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
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
    pub fn build(self) -> MqttSourceConfig {
        MqttSourceConfig {
            broker_host: self.broker_host,
            port: self.port,
            name: self.name,
            client_id: self.client_id,
            username: self.username,
            password: self.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MqttSourceConfig::builder("broker.local").build();
        assert_eq!(config.port, 1883);
        assert_eq!(config.name, "mqtt2influx");
        assert!(config.client_id.starts_with("mqtt2influx-"));
        assert_eq!(config.status_topic(), "mqtt2influx/connected");
    }

    #[test]
    fn test_builder_overrides() {
        let config = MqttSourceConfig::builder("broker.local")
            .port(8883)
            .name("bridge-1")
            .client_id("fixed-id")
            .username("user")
            .password("pass")
            .build();
        assert_eq!(config.port, 8883);
        assert_eq!(config.status_topic(), "bridge-1/connected");
        assert_eq!(config.client_id, "fixed-id");
        assert_eq!(config.username.as_deref(), Some("user"));
    }
}
