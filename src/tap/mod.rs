//! # Querying archives through TAP
//!
//! Every archive the crate talks to (NASA, PADC, Gaia, SIMBAD) exposes a
//! [TAP](https://ivoa.net/documents/TAP/) interface accepting
//! [ADQL](https://ivoa.net/documents/ADQL/) queries. This module holds the
//! protocol the rest of the crate relies on:
//!
//! 1. a [`TapTransport`] submits one query and reports rows, a rejection
//!    ([`SubmitOutcome::Rejected`]) or a fatal error;
//! 2. the [`ArchiveClient`] adds the query policy on top of it: a rejected
//!    query is escaped ([`adql::escape_special_characters_for_adql`]) and
//!    submitted one more time, and zero rows become [`QueryOutcome::Empty`],
//!    which is not an error.
//!
//! ```text
//! ArchiveClient::query(endpoint, adql, retry)
//!   └─ transport.submit(adql)
//!        ├─ Rows(n > 0)  → QueryOutcome::Rows
//!        ├─ Rows(0)      → QueryOutcome::Empty
//!        ├─ Rejected     → retry ? submit(escape(adql)) : Err(QueryRejected)
//!        └─ Err(e)       → Err(e)
//! ```
//!
//! The HTTP transport is [`PhabEnv`](crate::env_state::PhabEnv); tests plug
//! in scripted transports.
//!
//! ## See also
//! ------------
//! * [`services`] – the registry of endpoints and per-service metadata.
//! * [`nasa`] / [`padc`] – parameter lookups in the exoplanet archives.
//! * [`crate::simbad`] – identifier resolution on top of this client.
pub mod adql;
pub mod nasa;
pub mod padc;
pub mod query_result;
pub mod services;

use std::rc::Rc;

use tracing::{debug, warn};

use crate::phab_errors::PhabError;

use adql::escape_special_characters_for_adql;
pub use query_result::{QueryResult, Row};
pub use services::{ArchiveService, ServiceRegistry, TapService};

/// What a TAP service answered to one query.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The query ran; the result may hold zero rows.
    Rows(QueryResult),
    /// The service refused the query (malformed ADQL), with its message.
    Rejected(String),
}

/// Submits a single ADQL query to a TAP endpoint.
///
/// Fatal failures (network, unexpected HTTP status, unreadable response) are
/// returned as `Err`; a refused query is a regular [`SubmitOutcome::Rejected`].
pub trait TapTransport {
    fn submit(&self, endpoint: &str, adql: &str) -> Result<SubmitOutcome, PhabError>;
}

impl<T: TapTransport + ?Sized> TapTransport for Rc<T> {
    fn submit(&self, endpoint: &str, adql: &str) -> Result<SubmitOutcome, PhabError> {
        (**self).submit(endpoint, adql)
    }
}

impl<T: TapTransport + ?Sized> TapTransport for Box<T> {
    fn submit(&self, endpoint: &str, adql: &str) -> Result<SubmitOutcome, PhabError> {
        (**self).submit(endpoint, adql)
    }
}

/// Result of [`ArchiveClient::query`]: some rows, or none at all.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(QueryResult),
    Empty,
}

impl QueryOutcome {
    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            QueryOutcome::Rows(result) => Some(result),
            QueryOutcome::Empty => None,
        }
    }

    pub fn into_rows(self) -> Option<QueryResult> {
        match self {
            QueryOutcome::Rows(result) => Some(result),
            QueryOutcome::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutcome::Empty)
    }
}

/// Sends ADQL queries to the registered services.
///
/// # Fields
///
/// * `registry` - the immutable service registry
/// * `transport` - how queries reach the services
pub struct ArchiveClient {
    registry: ServiceRegistry,
    transport: Box<dyn TapTransport>,
}

impl ArchiveClient {
    pub fn new(registry: ServiceRegistry, transport: impl TapTransport + 'static) -> Self {
        ArchiveClient {
            registry,
            transport: Box::new(transport),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn endpoint(&self, service: TapService) -> Result<&str, PhabError> {
        self.registry.endpoint(service)
    }

    /// Send an ADQL query to a TAP endpoint.
    ///
    /// Arguments
    /// ---------
    /// * `endpoint`: the TAP endpoint URL
    /// * `adql_query`: the query to execute
    /// * `retry_on_failure`: on rejection, submit the escaped query once more
    ///
    /// Return
    /// ------
    /// * [`QueryOutcome::Rows`] with at least one row, or [`QueryOutcome::Empty`]
    /// * [`PhabError::QueryRejected`] if the query was rejected and no retry was
    ///   allowed, or if the escaped query was rejected too
    /// * any other transport error, unchanged
    pub fn query(
        &self,
        endpoint: &str,
        adql_query: &str,
        retry_on_failure: bool,
    ) -> Result<QueryOutcome, PhabError> {
        debug!("ADQL query to execute: {adql_query}");

        let outcome = match self.transport.submit(endpoint, adql_query)? {
            SubmitOutcome::Rows(result) => result,
            SubmitOutcome::Rejected(message) if retry_on_failure => {
                warn!(
                    "The query failed, will try to execute again, but this time with escaped characters. Original error message: {message}"
                );
                let escaped = escape_special_characters_for_adql(adql_query);
                debug!("Escaped ADQL query to execute: {escaped}");
                match self.transport.submit(endpoint, &escaped)? {
                    SubmitOutcome::Rows(result) => result,
                    SubmitOutcome::Rejected(message) => {
                        return Err(PhabError::QueryRejected {
                            endpoint: endpoint.to_string(),
                            message,
                        })
                    }
                }
            }
            SubmitOutcome::Rejected(message) => {
                return Err(PhabError::QueryRejected {
                    endpoint: endpoint.to_string(),
                    message,
                })
            }
        };

        if outcome.is_empty() {
            Ok(QueryOutcome::Empty)
        } else {
            debug!("Results: {}", outcome.len());
            Ok(QueryOutcome::Rows(outcome))
        }
    }

    /// [`ArchiveClient::query`] against a registered service, with retry enabled.
    pub fn query_service(
        &self,
        service: TapService,
        adql_query: &str,
    ) -> Result<QueryOutcome, PhabError> {
        let endpoint = self.endpoint(service)?;
        self.query(endpoint, adql_query, true)
    }
}

#[cfg(test)]
pub(crate) mod test_transport {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays scripted answers in order and records every submitted query.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        answers: RefCell<VecDeque<Result<SubmitOutcome, PhabError>>>,
        pub(crate) queries: RefCell<Vec<(String, String)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Rc<Self> {
            Rc::new(ScriptedTransport::default())
        }

        pub(crate) fn push(&self, answer: Result<SubmitOutcome, PhabError>) {
            self.answers.borrow_mut().push_back(answer);
        }

        pub(crate) fn push_rows(&self, csv: &str) {
            self.push(Ok(SubmitOutcome::Rows(QueryResult::from_csv(csv).unwrap())));
        }

        pub(crate) fn queries(&self) -> Vec<String> {
            self.queries.borrow().iter().map(|(_, q)| q.clone()).collect()
        }

        pub(crate) fn calls(&self) -> usize {
            self.queries.borrow().len()
        }
    }

    impl TapTransport for ScriptedTransport {
        fn submit(&self, endpoint: &str, adql: &str) -> Result<SubmitOutcome, PhabError> {
            self.queries
                .borrow_mut()
                .push((endpoint.to_string(), adql.to_string()));
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("no scripted answer left for query: {adql}"))
        }
    }
}
