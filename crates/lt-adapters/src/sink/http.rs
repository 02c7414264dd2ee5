// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP sink adapter: bulk-POSTs a batch as JSON.
//!
//! The response body may report that some records were rejected by id
//! (`{"missing_ids": [...]}`) — the structured equivalent of the source's
//! `'.*objects with ids: {...} out of requested .*'` exception-string match.
//! A transport-level connect failure maps to [`SinkError::ConnectionRefused`];
//! anything else is [`SinkError::Other`].

use super::{SinkAdapter, SinkError};
use crate::env::sink_request_timeout_ms;
use async_trait::async_trait;
use lt_core::BatchRecord;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
struct SinkResponse {
    #[serde(default)]
    missing_ids: Vec<String>,
}

#[derive(Clone)]
pub struct HttpSinkAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSinkAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, sink_request_timeout_ms())
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SinkAdapter for HttpSinkAdapter {
    async fn send_batch(&self, records: &[BatchRecord]) -> Result<(), SinkError> {
        let payload: Vec<_> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id.as_str(),
                    "callable_name": r.callable_name,
                    "start_time": r.start_time.to_rfc3339(),
                    "delta_ms": r.delta_ms,
                })
            })
            .collect();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SinkError::ConnectionRefused
                } else {
                    SinkError::Other(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(SinkError::Other(format!(
                "sink responded with status {}",
                response.status()
            )));
        }

        let parsed: SinkResponse = response
            .json()
            .await
            .unwrap_or_default();

        if parsed.missing_ids.is_empty() {
            Ok(())
        } else {
            Err(SinkError::PartialMiss(parsed.missing_ids))
        }
    }
}
