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

//! Bridge daemon: MQTT topics in, InfluxDB points out.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use bridge_sink_influx::{InfluxConfig, InfluxWriter};
use bridge_source_mqtt::{ConnectorTable, MqttSource, MqttSourceConfig};
use log::info;

mod config;

use config::BridgeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let cfg = BridgeConfig::load(&config_path)?;

    env_logger::init_from_env(env_logger::Env::default().default_filter_or(cfg.log.as_str()));

    info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    // Connector problems are the only fatal per-message concern; everything
    // past this point is contained and logged.
    let table = ConnectorTable::load(&cfg.influxdb.connectors)
        .context("invalid connector configuration")?;
    info!("loaded {} connector(s) from {config_path}", table.len());

    let mut influx = InfluxConfig::builder(&cfg.influxdb.host, &cfg.influxdb.database)
        .port(cfg.influxdb.port);
    if let (Some(user), Some(pass)) = (&cfg.influxdb.username, &cfg.influxdb.password) {
        influx = influx.username(user).password(pass);
    }
    let writer = InfluxWriter::new(influx.build());

    let mut mqtt = MqttSourceConfig::builder(&cfg.mqtt.host)
        .port(cfg.mqtt.port)
        .name(&cfg.mqtt.name);
    if let (Some(user), Some(pass)) = (&cfg.mqtt.username, &cfg.mqtt.password) {
        mqtt = mqtt.username(user).password(pass);
    }
    let source = MqttSource::new(mqtt.build(), table, Arc::new(writer));

    source.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    source.stop().await?;

    Ok(())
}
