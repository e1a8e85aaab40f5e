//! # HTTP environment of phab
//!
//! This module defines [`PhabEnv`], the object holding the persistent HTTP
//! client used to reach the TAP services. It is the production
//! [`TapTransport`] handed to the [`ArchiveClient`](crate::tap::ArchiveClient).
//!
//! ## TAP synchronous queries
//!
//! Each query is one blocking request:
//!
//! ```text
//! POST {endpoint}/sync
//!   REQUEST=doQuery  LANG=ADQL  FORMAT=csv  QUERY=<adql>
//!
//! 2xx + CSV                          → SubmitOutcome::Rows
//! 2xx/400 + QUERY_STATUS = "ERROR"   → SubmitOutcome::Rejected(message)
//! 400                                → SubmitOutcome::Rejected(body)
//! any other status                   → PhabError::HttpStatus
//! ```
//!
//! Services report a malformed query inside a VOTable document, whatever the
//! requested format:
//!
//! ```xml
//! <INFO name="QUERY_STATUS" value="ERROR">Incorrect ADQL query: ...</INFO>
//! ```
//!
//! ## Notes
//!
//! - The agent is cheap to clone and is meant to be reused across queries.
//! - There is no retry at this level; the only retry policy lives in the
//!   archive client.
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use ureq::Agent;

use crate::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::phab_errors::PhabError;
use crate::tap::{QueryResult, SubmitOutcome, TapTransport};

static VOTABLE_INFO_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<INFO([^>]*)>(.*?)</INFO>").expect("VOTable INFO regex must compile")
});

/// Holds the HTTP client used to query TAP services.
///
/// # Fields
///
/// * `http_client` - a ureq agent with a global timeout, HTTP statuses are
///   read rather than turned into errors
#[derive(Debug, Clone)]
pub struct PhabEnv {
    pub http_client: Agent,
}

impl Default for PhabEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl PhabEnv {
    /// A new environment with the default timeout.
    pub fn new() -> Self {
        PhabEnv::with_timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();

        PhabEnv { http_client: agent }
    }

    /// Submit an ADQL query to the synchronous endpoint of a TAP service.
    ///
    /// Arguments
    /// ---------
    /// * `endpoint`: the TAP base URL (or its `/sync` URL)
    /// * `adql`: the query
    ///
    /// Return
    /// ------
    /// * the status code and the response body
    pub fn post_query(&self, endpoint: &str, adql: &str) -> Result<(u16, String), PhabError> {
        let url = sync_url(endpoint);
        debug!("POST {url}");
        let mut response = self.http_client.post(&url).send_form([
            ("REQUEST", "doQuery"),
            ("LANG", "ADQL"),
            ("FORMAT", "csv"),
            ("QUERY", adql),
        ])?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok((status, body))
    }
}

impl TapTransport for PhabEnv {
    fn submit(&self, endpoint: &str, adql: &str) -> Result<SubmitOutcome, PhabError> {
        let (status, body) = self.post_query(endpoint, adql)?;
        interpret_response(status, &body)
    }
}

/// The synchronous query URL of a TAP endpoint.
pub fn sync_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.ends_with("/sync") {
        endpoint.to_string()
    } else {
        format!("{endpoint}/sync")
    }
}

/// The message of a VOTable `QUERY_STATUS` error, if the body holds one.
fn votable_error(body: &str) -> Option<String> {
    VOTABLE_INFO_REGEX.captures_iter(body).find_map(|captures| {
        let attributes = captures.get(1)?.as_str();
        (attributes.contains(r#"name="QUERY_STATUS""#) && attributes.contains(r#"value="ERROR""#))
            .then(|| captures.get(2).map(|m| m.as_str().trim().to_string()))
            .flatten()
    })
}

/// Turn a TAP response into a [`SubmitOutcome`].
pub fn interpret_response(status: u16, body: &str) -> Result<SubmitOutcome, PhabError> {
    if let Some(message) = votable_error(body) {
        return Ok(SubmitOutcome::Rejected(message));
    }
    match status {
        200..=299 => Ok(SubmitOutcome::Rows(QueryResult::from_csv(body)?)),
        400 => Ok(SubmitOutcome::Rejected(body.trim().to_string())),
        _ => Err(PhabError::HttpStatus {
            status,
            body: body.to_string(),
        }),
    }
}
