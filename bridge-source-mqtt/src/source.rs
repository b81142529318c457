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

//! MQTT connection and subscription layer.
//!
//! Owns the broker connection, the retained `{name}/connected` status topic
//! and the delivery loop that runs each incoming message through the point
//! mapper.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bridge_sink_influx::{spawn_write, PointSink};
use log::{error, info, warn};
use rumqttc::{AsyncClient, Event, Incoming, LastWill, MqttOptions, QoS};
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::MqttSourceConfig;
use crate::connector::ConnectorTable;
use crate::mapper;

/// MQTT side of the bridge.
///
/// Connects to the broker with a retained last will on the status topic,
/// subscribes every connector's filter on ConnAck (which also restores
/// subscriptions after a reconnect) and submits each mapped point to the
/// sink without awaiting the write.
pub struct MqttSource {
    config: MqttSourceConfig,
    table: Arc<ConnectorTable>,
    sink: Arc<dyn PointSink>,
    /// MQTT client handle (set on start, cleared on stop).
    client: Arc<RwLock<Option<AsyncClient>>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MqttSource {
    /// Create a new source over the given connector table and point sink.
    pub fn new(config: MqttSourceConfig, table: ConnectorTable, sink: Arc<dyn PointSink>) -> Self {
        Self {
            config,
            table: Arc::new(table),
            sink,
            client: Arc::new(RwLock::new(None)),
            shutdown_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Connect and start the delivery loop.
    pub async fn start(&self) -> Result<()> {
        let name = self.config.name.clone();
        let broker = format!("{}:{}", self.config.broker_host, self.config.port);
        let status_topic = self.config.status_topic();

        info!(
            "[{name}] starting MQTT source (broker={broker}, connectors={})",
            self.table.len()
        );

        let mut mqtt_opts = MqttOptions::new(
            &self.config.client_id,
            &self.config.broker_host,
            self.config.port,
        );
        mqtt_opts.set_keep_alive(Duration::from_secs(30));
        mqtt_opts.set_last_will(LastWill::new(&status_topic, "0", QoS::AtLeastOnce, true));

        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            mqtt_opts.set_credentials(user, pass);
        }

        let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 100);

        // Store client for later disconnect.
        *self.client.write().await = Some(client.clone());

        // Clone what we need for the spawned task.
        let table = self.table.clone();
        let sink = self.sink.clone();

        // Create shutdown channel.
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        *self.shutdown_tx.lock().await = Some(shutdown_tx);

        // Spawn the MQTT event loop task.
        let handle = tokio::spawn(async move {
            info!("[{name}] MQTT event loop started");
            let mut connected = false;
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("[{name}] shutdown signal received");
                        break;
                    }
                    event = eventloop.poll() => {
                        match event {
                            Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                                connected = true;
                                info!("[{name}] mqtt: connected {broker}");
                                if let Err(e) = client
                                    .publish(&status_topic, QoS::AtLeastOnce, true, "2")
                                    .await
                                {
                                    warn!("[{name}] mqtt: status publish failed: {e}");
                                }
                                for topic in table.topics() {
                                    match client.subscribe(topic, QoS::AtLeastOnce).await {
                                        Ok(()) => info!("[{name}] mqtt: subscribe {topic}"),
                                        Err(e) => {
                                            error!("[{name}] mqtt: subscribe {topic} failed: {e}")
                                        }
                                    }
                                }
                            }
                            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                                for point in
                                    mapper::map_message(&table, &publish.topic, &publish.payload)
                                {
                                    spawn_write(sink.clone(), point);
                                }
                            }
                            Ok(_) => {} // Ignore other events (PingResp, SubAck, etc.)
                            Err(e) => {
                                if connected {
                                    connected = false;
                                    info!("[{name}] mqtt: disconnected {broker}");
                                }
                                error!("[{name}] mqtt: connection error: {e}");
                                // rumqttc reconnects on the next poll().
                                tokio::time::sleep(Duration::from_secs(1)).await;
                            }
                        }
                    }
                }
            }
        });

        *self.task.lock().await = Some(handle);
        info!("[{}] MQTT source started", self.config.name);
        Ok(())
    }

    /// Publish the disconnected status, disconnect and stop the loop.
    pub async fn stop(&self) -> Result<()> {
        if let Some(client) = self.client.write().await.take() {
            let status_topic = self.config.status_topic();
            let _ = client
                .publish(&status_topic, QoS::AtLeastOnce, true, "0")
                .await;
            let _ = client.disconnect().await;
        }
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
        info!("[{}] MQTT source stopped", self.config.name);
        Ok(())
    }
}
