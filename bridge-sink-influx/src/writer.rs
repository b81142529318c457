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

//! Asynchronous store-writing layer.
//!
//! Writes are fire-and-forget: [`spawn_write`] submits one point per task
//! and only logs the outcome. A failed write is never retried and never
//! affects other points.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};
use thiserror::Error;

use crate::config::InfluxConfig;
use crate::line::{self, EncodeError};
use crate::point::Point;

/// Failure of a single point write.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("influxdb request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("influxdb returned status {status}: {body}")]
    Server { status: u16, body: String },
}

/// Destination for mapped points.
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Write one point, completing when the store has accepted or rejected
    /// it.
    async fn write(&self, point: &Point) -> Result<(), WriteError>;
}

/// Issue a write without awaiting it.
///
/// Completion is reported through the log only: the point is traced at
/// debug level on success, the error logged on failure.
pub fn spawn_write(sink: Arc<dyn PointSink>, point: Point) {
    tokio::spawn(async move {
        match sink.write(&point).await {
            Ok(()) => debug!("influxdb: write data {point:?}"),
            Err(e) => error!("influxdb: write failed: {e}"),
        }
    });
}

/// HTTP writer for the InfluxDB v1 `/write` endpoint.
pub struct InfluxWriter {
    write_url: String,
    credentials: Option<(String, String)>,
    client: reqwest::Client,
}

impl InfluxWriter {
    /// Create a writer for the given server and database.
    pub fn new(config: InfluxConfig) -> Self {
        let write_url = format!(
            "http://{}:{}/write?db={}&precision=ns",
            config.host, config.port, config.database
        );
        Self {
            write_url,
            credentials: config.username.zip(config.password),
            client: reqwest::Client::new(),
        }
    }

    /// The endpoint this writer posts to.
    pub fn write_url(&self) -> &str {
        &self.write_url
    }
}

#[async_trait]
impl PointSink for InfluxWriter {
    async fn write(&self, point: &Point) -> Result<(), WriteError> {
        let body = line::encode(point)?;

        let mut request = self.client.post(&self.write_url).body(body);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WriteError::Server { status, body });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::FieldValue;
    use std::collections::BTreeMap;
    use tokio::sync::Mutex;

    struct RecordingSink {
        points: Mutex<Vec<Point>>,
    }

    #[async_trait]
    impl PointSink for RecordingSink {
        async fn write(&self, point: &Point) -> Result<(), WriteError> {
            self.points.lock().await.push(point.clone());
            Ok(())
        }
    }

    fn point() -> Point {
        Point {
            measurement: Some("temperature".into()),
            tags: BTreeMap::new(),
            fields: BTreeMap::from([("value".into(), FieldValue::Float(21.5))]),
            timestamp: 1,
        }
    }

    #[tokio::test]
    async fn test_spawn_write_delivers_point() {
        let sink = Arc::new(RecordingSink {
            points: Mutex::new(Vec::new()),
        });
        spawn_write(sink.clone(), point());

        // The spawned task has no await points besides the sink itself, so
        // yielding lets it run to completion on the test runtime.
        for _ in 0..100 {
            tokio::task::yield_now().await;
            if !sink.points.lock().await.is_empty() {
                break;
            }
        }
        assert_eq!(*sink.points.lock().await, vec![point()]);
    }

    #[tokio::test]
    async fn test_incomplete_point_is_a_write_error() {
        let writer = InfluxWriter::new(InfluxConfig::builder("localhost", "telemetry").build());
        let mut p = point();
        p.measurement = None;

        match writer.write(&p).await {
            Err(WriteError::Encode(EncodeError::MissingMeasurement)) => {}
            other => panic!("expected encode error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_url() {
        let writer = InfluxWriter::new(
            InfluxConfig::builder("influx.local", "telemetry")
                .port(9999)
                .build(),
        );
        assert_eq!(
            writer.write_url(),
            "http://influx.local:9999/write?db=telemetry&precision=ns"
        );
    }
}
