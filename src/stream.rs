//! # Skystream: archive stream façade
//!
//! This module defines the [`Skystream`](crate::stream::Skystream) struct, the central façade that
//! wires together:
//!
//! 1. **Environment state** ([`SkystreamEnv`](crate::env_state::SkystreamEnv)) — HTTP client and
//!    archive credential.
//! 2. **Stream initiation** — submits an [`ArchiveQuery`](crate::query::ArchiveQuery) and obtains
//!    the opaque resume token identifying the server-side result stream.
//! 3. **Stream consumption** — drains the full alert sequence behind a resume token through the
//!    [`AlertSource`] boundary, with bounded exponential backoff while the archive is still
//!    building the stream.
//!
//! ## Key responsibilities
//!
//! - Single entry point for the **batch pipeline**: create stream → drain alerts; the merged
//!   history and summary features are then derived with
//!   [`merge_alerts`](crate::alerts::merge::merge_alerts) and
//!   [`extract_features`](crate::alerts::features::extract_features).
//! - **Best-effort token persistence**: a freshly created stream's token is written to the
//!   [`token_cache`](crate::token_cache); a write failure is logged and never aborts the caller.
//! - **Retry policy**: HTTP 423 from the archive means the stream is still locked for building.
//!   Consumption retries with sleep-based exponential backoff (base delay doubling per attempt)
//!   until the cumulative [`RetryPolicy::max_elapsed`] budget runs out, then escalates to
//!   [`SkystreamError::StreamTimeout`]. Every other failure propagates immediately.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use skystream::query::ArchiveQuery;
//! use skystream::stream::Skystream;
//!
//! # fn demo() -> Result<(), skystream::skystream_errors::SkystreamError> {
//! let archive = Skystream::new()?;
//!
//! let query = ArchiveQuery::from_object_ids(["ZTF19aapreis"], None);
//! let resume_token = archive.create_stream(&query)?;
//!
//! let alerts = archive.access_stream(&resume_token)?;
//! let merged = skystream::merge_alerts(alerts);
//! let features = skystream::extract_features(&merged);
//! # Ok(()) }
//! ```
//!
//! ## See also
//! ------------
//! * [`ArchiveQuery`](crate::query::ArchiveQuery) – Query payload construction.
//! * [`AlertSource`] – Opaque producer of the raw alert sequence.
//! * [`RetryPolicy`] – Backoff settings for locked streams.
//! * [`token_cache`](crate::token_cache) – Resume-token persistence.
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::alerts::Alert;
use crate::constants::{
    AlertBatch, ARCHIVE_BASE_URL, RETRY_BASE_DELAY, RETRY_MAX_ELAPSED, STATUS_STREAM_LOCKED,
    STREAM_QUERY_PATH,
};
use crate::env_state::SkystreamEnv;
use crate::query::ArchiveQuery;
use crate::skystream_errors::SkystreamError;
use crate::token_cache;

/// Success body of the stream-creation endpoint.
#[derive(Debug, Deserialize)]
struct StreamCreated {
    resume_token: String,
}

/// Error body of a rejected query: `{"detail": [{"msg": ...}, ...]}`.
#[derive(Debug, Deserialize)]
struct QueryRejection {
    #[serde(default)]
    detail: Vec<RejectionDetail>,
}

#[derive(Debug, Deserialize)]
struct RejectionDetail {
    msg: String,
}

/// Backoff settings applied while a stream is locked for building.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// First wait; doubled after every locked attempt.
    pub base_delay: Duration,
    /// Cumulative budget; once exceeded the consumer gives up with a timeout.
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            base_delay: RETRY_BASE_DELAY,
            max_elapsed: RETRY_MAX_ELAPSED,
        }
    }
}

/// Opaque producer of the raw alert sequence behind a resume token.
///
/// The default implementation is [`HttpAlertSource`]; tests substitute their
/// own to exercise the consumer without a network.
pub trait AlertSource {
    /// Pull the complete alert sequence for a stream token.
    fn get_alerts(&self, stream_token: &str) -> Result<AlertBatch, SkystreamError>;
}

/// Archive stream façade: query submission and alert-stream consumption.
#[derive(Debug, Clone)]
pub struct Skystream {
    env: SkystreamEnv,
    archive_url: String,
}

impl Skystream {
    /// Construct a façade against the default archive deployment, reading the
    /// bearer token from the process environment.
    pub fn new() -> Result<Self, SkystreamError> {
        Ok(Self::with_env(SkystreamEnv::new()?))
    }

    /// Construct a façade from an explicit environment.
    pub fn with_env(env: SkystreamEnv) -> Self {
        Skystream {
            env,
            archive_url: ARCHIVE_BASE_URL.to_string(),
        }
    }

    /// Point the façade at a non-default archive deployment.
    pub fn with_archive_url(mut self, archive_url: impl Into<String>) -> Self {
        self.archive_url = archive_url.into();
        self
    }

    /// Submit a query and obtain the resume token of the server-side stream.
    ///
    /// The token is persisted to the [`token_cache`] best-effort; a cache
    /// failure is logged as a warning and does not fail the call.
    ///
    /// Arguments
    /// ---------
    /// * `query`: the query payload to submit
    ///
    /// Return
    /// ------
    /// * the opaque resume token, or [`SkystreamError::QueryRejected`] carrying
    ///   the first server-side validation message when the archive refuses the
    ///   query
    pub fn create_stream(&self, query: &ArchiveQuery) -> Result<String, SkystreamError> {
        let url = format!("{}/{}", self.archive_url, STREAM_QUERY_PATH);
        let bearer = self.env.bearer_header();
        let mut response = self
            .env
            .http_client
            .post(url.as_str())
            .header("Authorization", bearer.as_str())
            .send_json(query)?;

        if !response.status().is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            warn!("stream query not successful, response: {body}");
            return Err(SkystreamError::QueryRejected(first_rejection_msg(&body)));
        }

        let created: StreamCreated = response.body_mut().read_json()?;
        info!("stream initiated, resume token: {}", created.resume_token);

        if let Err(err) = token_cache::store_resume_token(&created.resume_token) {
            warn!("could not persist resume token: {err}");
        }

        Ok(created.resume_token)
    }

    /// Drain the full alert sequence for a resume token with the default HTTP
    /// source and retry policy.
    pub fn access_stream(&self, resume_token: &str) -> Result<AlertBatch, SkystreamError> {
        let source = HttpAlertSource::new(&self.env, &self.archive_url);
        self.access_stream_with(&source, resume_token, &RetryPolicy::default())
    }

    /// Drain the full alert sequence through an explicit source and policy.
    ///
    /// While the source reports [`SkystreamError::StreamNotReady`], the call
    /// sleeps and retries with exponentially growing delays. Once the next wait
    /// would push the cumulative elapsed time past `policy.max_elapsed`, the
    /// condition escalates to [`SkystreamError::StreamTimeout`]. Any other
    /// error propagates immediately without retry.
    pub fn access_stream_with<S: AlertSource>(
        &self,
        source: &S,
        resume_token: &str,
        policy: &RetryPolicy,
    ) -> Result<AlertBatch, SkystreamError> {
        let started = Instant::now();
        let mut delay = policy.base_delay;

        loop {
            match source.get_alerts(resume_token) {
                Err(SkystreamError::StreamNotReady(status)) => {
                    if started.elapsed() + delay > policy.max_elapsed {
                        return Err(SkystreamError::StreamTimeout {
                            waited_secs: started.elapsed().as_secs(),
                        });
                    }
                    debug!("stream not ready (HTTP {status}), retrying in {delay:?}");
                    thread::sleep(delay);
                    delay *= 2;
                }
                other => return other,
            }
        }
    }
}

/// First server-side validation message from a rejection body, or the raw body
/// when it does not carry one.
fn first_rejection_msg(body: &str) -> String {
    serde_json::from_str::<QueryRejection>(body)
        .ok()
        .and_then(|rejection| rejection.detail.into_iter().next())
        .map(|detail| detail.msg)
        .unwrap_or_else(|| body.to_string())
}

/// Body of one chunk of a stream, as served by the archive.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    alerts: Vec<Alert>,
    #[serde(default)]
    chunk: Option<i64>,
    #[serde(default)]
    remaining: ChunksRemaining,
}

#[derive(Debug, Default, Deserialize)]
struct ChunksRemaining {
    chunks: i64,
}

/// Default [`AlertSource`]: drains the archive chunk endpoints for a resume
/// token, acknowledging each chunk until none remain.
#[derive(Debug, Clone)]
pub struct HttpAlertSource {
    http_client: ureq::Agent,
    archive_url: String,
}

impl HttpAlertSource {
    pub fn new(env: &SkystreamEnv, archive_url: &str) -> Self {
        HttpAlertSource {
            http_client: env.http_client.clone(),
            archive_url: archive_url.to_string(),
        }
    }

    fn fetch_chunk(&self, stream_token: &str) -> Result<StreamChunk, SkystreamError> {
        let url = format!("{}/stream/{}/chunk", self.archive_url, stream_token);
        let mut response = self.http_client.get(url.as_str()).call()?;

        let status = response.status().as_u16();
        if status == STATUS_STREAM_LOCKED {
            return Err(SkystreamError::StreamNotReady(status));
        }
        if !response.status().is_success() {
            return Err(SkystreamError::StreamFailure {
                status,
                body: response.body_mut().read_to_string().unwrap_or_default(),
            });
        }

        Ok(response.body_mut().read_json()?)
    }

    fn acknowledge_chunk(&self, stream_token: &str, chunk_id: i64) -> Result<(), SkystreamError> {
        let url = format!(
            "{}/stream/{}/chunk/{}/acknowledge",
            self.archive_url, stream_token, chunk_id
        );
        let response = self.http_client.post(url.as_str()).send_empty()?;

        if !response.status().is_success() {
            return Err(SkystreamError::StreamFailure {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }
        Ok(())
    }
}

impl AlertSource for HttpAlertSource {
    fn get_alerts(&self, stream_token: &str) -> Result<AlertBatch, SkystreamError> {
        let mut alerts = AlertBatch::new();

        loop {
            let chunk = self.fetch_chunk(stream_token)?;
            let drained = chunk.remaining.chunks == 0;
            debug!(
                "fetched {} alerts, {} chunks remaining",
                chunk.alerts.len(),
                chunk.remaining.chunks
            );
            alerts.extend(chunk.alerts);

            if let Some(chunk_id) = chunk.chunk {
                self.acknowledge_chunk(stream_token, chunk_id)?;
            }
            if drained {
                return Ok(alerts);
            }
        }
    }
}

#[cfg(test)]
mod stream_test {
    use super::*;
    use std::cell::Cell;

    fn test_facade() -> Skystream {
        Skystream::with_env(SkystreamEnv::with_token("test-token"))
    }

    /// Source that is never ready, counting how often it was polled.
    struct AlwaysLocked {
        calls: Cell<u32>,
    }

    impl AlertSource for AlwaysLocked {
        fn get_alerts(&self, _stream_token: &str) -> Result<AlertBatch, SkystreamError> {
            self.calls.set(self.calls.get() + 1);
            Err(SkystreamError::StreamNotReady(STATUS_STREAM_LOCKED))
        }
    }

    /// Source that fails hard on the first call.
    struct BrokenSource {
        calls: Cell<u32>,
    }

    impl AlertSource for BrokenSource {
        fn get_alerts(&self, _stream_token: &str) -> Result<AlertBatch, SkystreamError> {
            self.calls.set(self.calls.get() + 1);
            Err(SkystreamError::StreamFailure {
                status: 500,
                body: "internal error".to_string(),
            })
        }
    }

    struct EmptySource;

    impl AlertSource for EmptySource {
        fn get_alerts(&self, _stream_token: &str) -> Result<AlertBatch, SkystreamError> {
            Ok(AlertBatch::new())
        }
    }

    #[test]
    fn test_retry_stops_at_the_elapsed_budget() {
        let source = AlwaysLocked {
            calls: Cell::new(0),
        };
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_elapsed: Duration::from_millis(30),
        };

        let err = test_facade()
            .access_stream_with(&source, "token", &policy)
            .unwrap_err();

        assert!(matches!(err, SkystreamError::StreamTimeout { .. }));
        // retried at least once before the budget ran out, then stopped
        assert!(source.calls.get() >= 2);
        assert!(source.calls.get() < 30);
    }

    #[test]
    fn test_non_transient_failure_is_not_retried() {
        let source = BrokenSource {
            calls: Cell::new(0),
        };

        let err = test_facade()
            .access_stream_with(&source, "token", &RetryPolicy::default())
            .unwrap_err();

        assert!(matches!(err, SkystreamError::StreamFailure { status: 500, .. }));
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_ready_stream_passes_through() {
        let batch = test_facade()
            .access_stream_with(&EmptySource, "token", &RetryPolicy::default())
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_first_rejection_msg_prefers_the_detail() {
        let body = r#"{"detail": [{"msg": "objectId list too long", "loc": ["body"]},
                                   {"msg": "second"}]}"#;
        assert_eq!(first_rejection_msg(body), "objectId list too long");
    }

    #[test]
    fn test_first_rejection_msg_falls_back_to_the_raw_body() {
        assert_eq!(first_rejection_msg("gateway timeout"), "gateway timeout");
        assert_eq!(first_rejection_msg(r#"{"detail": []}"#), r#"{"detail": []}"#);
    }

    #[test]
    fn test_default_retry_policy_matches_the_archive_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_elapsed, Duration::from_secs(3600));
    }
}
