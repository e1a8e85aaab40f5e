#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use phab::datasets::{Table, Value};
use phab::phab_errors::PhabError;
use phab::tap::{ArchiveClient, QueryResult, ServiceRegistry, SubmitOutcome, TapTransport};

/// TAP transport answering from a script, in order, and recording the queries it gets.
#[derive(Default)]
pub struct MockTap {
    answers: RefCell<VecDeque<Result<SubmitOutcome, PhabError>>>,
    submitted: RefCell<Vec<(String, String)>>,
}

impl MockTap {
    pub fn new() -> Rc<Self> {
        Rc::new(MockTap::default())
    }

    pub fn rows(&self, csv: &str) -> &Self {
        let result = QueryResult::from_csv(csv).expect("scripted CSV must parse");
        self.answers
            .borrow_mut()
            .push_back(Ok(SubmitOutcome::Rows(result)));
        self
    }

    pub fn reject(&self, message: &str) -> &Self {
        self.answers
            .borrow_mut()
            .push_back(Ok(SubmitOutcome::Rejected(message.to_string())));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.submitted.borrow().iter().map(|(_, q)| q.clone()).collect()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.submitted.borrow().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl TapTransport for MockTap {
    fn submit(&self, endpoint: &str, adql: &str) -> Result<SubmitOutcome, PhabError> {
        self.submitted
            .borrow_mut()
            .push((endpoint.to_string(), adql.to_string()));
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer left for query: {adql}"))
    }
}

pub fn mock_client(tap: &Rc<MockTap>) -> ArchiveClient {
    ArchiveClient::new(ServiceRegistry::default(), Rc::clone(tap))
}

/// A dataset of planets keyed by their host star.
pub fn systems_table() -> Table {
    Table::from_rows(
        vec![0, 1, 2, 3],
        &["star_name", "pl_name", "pl_massj"],
        vec![
            vec!["TWA 20".into(), "TWA 20 b".into(), 0.5.into()],
            vec!["Teegarden's Star".into(), "Teegarden's Star b".into(), 0.0033.into()],
            vec!["Teegarden's Star".into(), "Teegarden's Star c".into(), Value::Missing],
            vec!["TWA 20".into(), "TWA 20 c".into(), 1.2.into()],
        ],
    )
    .expect("systems table must build")
}
