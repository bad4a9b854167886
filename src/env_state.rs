//! # Skystream environment state
//!
//! This module defines [`crate::env_state::SkystreamEnv`], the **shared environment object** used
//! across the `skystream` library. It provides access to:
//!
//! - A persistent **HTTP client** (for submitting queries and draining alert streams).
//! - The archive **bearer token**, read once from the process environment.
//!
//! This object is designed to be **cheaply cloneable** and passed to the components
//! that talk to the archive service.
//!
//! ## Structure
//!
//! ```text
//! SkystreamEnv
//! ├── http_client (ureq::Agent)
//! └── auth_token  (String)
//! ```
//!
//! ## Notes
//!
//! - The agent is configured with `http_status_as_error(false)` so that non-2xx
//!   responses come back as plain responses: the archive encodes its validation
//!   details and the "stream locked" condition in status codes and bodies the
//!   caller must be able to inspect.
//! - The bearer token is required at startup; a missing
//!   [`TOKEN_ENV_VAR`](crate::constants::TOKEN_ENV_VAR) is a fatal configuration error.
use std::env;
use std::time::Duration;

use ureq::Agent;

use crate::constants::TOKEN_ENV_VAR;
use crate::skystream_errors::SkystreamError;

/// This object is passed to the components of the library that perform
/// HTTP requests against the archive service.
///
/// # Fields
///
/// * `http_client` - A ureq agent used to make HTTP requests
/// * `auth_token` - The archive bearer token
#[derive(Debug, Clone)]
pub struct SkystreamEnv {
    pub http_client: Agent,
    pub(crate) auth_token: String,
}

impl SkystreamEnv {
    /// Create a new environment, reading the bearer token from the process environment.
    ///
    /// Return
    /// ------
    /// * A new environment, or [`SkystreamError::MissingArchiveToken`] when the
    ///   credential variable is absent.
    pub fn new() -> Result<Self, SkystreamError> {
        let auth_token = env::var(TOKEN_ENV_VAR)
            .map_err(|_| SkystreamError::MissingArchiveToken(TOKEN_ENV_VAR.to_string()))?;
        Ok(Self::with_token(auth_token))
    }

    /// Create an environment with an explicit token, bypassing the process environment.
    pub fn with_token(auth_token: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();

        SkystreamEnv {
            http_client: agent,
            auth_token: auth_token.into(),
        }
    }

    /// Value of the `Authorization` header expected by the archive.
    pub(crate) fn bearer_header(&self) -> String {
        format!("bearer {}", self.auth_token)
    }
}
