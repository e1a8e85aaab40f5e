use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhabError {
    #[error("There is no TAP service under the name [{0}]")]
    UnknownService(String),

    #[error("The [{0}] service has no registered endpoint")]
    ServiceHasNoEndpoint(String),

    #[error("Incorrect ADQL query sent to [{endpoint}]: {message}")]
    QueryRejected { endpoint: String, message: String },

    #[error("Results table has neither of the {expected:?} columns, available columns: {available:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        available: Vec<String>,
    },

    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),

    #[error("HTTP ureq error: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("TAP service answered with HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unable to parse the CSV response: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unable to (de)serialize the table: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unable to build the identifier pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Provided path to [{0}] seems to be wrong")]
    InvalidPath(String),

    #[error("The [{0}] file already exists")]
    FileAlreadyExists(String),

    #[error("There are no files to merge in [{0}]")]
    NoFilesToMerge(String),

    #[error("Tables have overlapping index values: {0:?}")]
    DuplicateIndex(Vec<i64>),

    #[error("Inconsistent table shape: {0}")]
    InvalidShape(String),

    #[error("Table has no column [{0}]")]
    MissingColumn(String),

    #[error("Unexpected value in column [{column}]: {value}")]
    UnexpectedValue { column: String, value: String },
}

impl PartialEq for PhabError {
    fn eq(&self, other: &Self) -> bool {
        use PhabError::*;
        match (self, other) {
            (UnknownService(a), UnknownService(b)) => a == b,
            (ServiceHasNoEndpoint(a), ServiceHasNoEndpoint(b)) => a == b,
            (
                QueryRejected {
                    endpoint: e1,
                    message: m1,
                },
                QueryRejected {
                    endpoint: e2,
                    message: m2,
                },
            ) => e1 == e2 && m1 == m2,
            (
                SchemaMismatch {
                    expected: e1,
                    available: a1,
                },
                SchemaMismatch {
                    expected: e2,
                    available: a2,
                },
            ) => e1 == e2 && a1 == a2,
            (InvalidObjectKey(a), InvalidObjectKey(b)) => a == b,

            // not comparable, same variant is enough
            (HttpError(_), HttpError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (IoError(_), IoError(_)) => true,
            (RegexError(a), RegexError(b)) => a == b,

            (
                HttpStatus {
                    status: s1,
                    body: b1,
                },
                HttpStatus {
                    status: s2,
                    body: b2,
                },
            ) => s1 == s2 && b1 == b2,
            (InvalidPath(a), InvalidPath(b)) => a == b,
            (FileAlreadyExists(a), FileAlreadyExists(b)) => a == b,
            (NoFilesToMerge(a), NoFilesToMerge(b)) => a == b,
            (DuplicateIndex(a), DuplicateIndex(b)) => a == b,
            (InvalidShape(a), InvalidShape(b)) => a == b,
            (MissingColumn(a), MissingColumn(b)) => a == b,
            (
                UnexpectedValue {
                    column: c1,
                    value: v1,
                },
                UnexpectedValue {
                    column: c2,
                    value: v2,
                },
            ) => c1 == c2 && v1 == v2,

            _ => false,
        }
    }
}
