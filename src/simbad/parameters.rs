//! Latest published parameters of SIMBAD objects.
//!
//! SIMBAD measurement tables (`mesVar`, `mesFe_h`, ...) reference objects
//! through `oidref` and carry the publication `bibcode` of every
//! measurement. The *latest* measurement is the first row ordered by
//! `bibcode DESC`, the bibcode starting with the publication year.
use tracing::debug;

use crate::datasets::Value;
use crate::phab_errors::PhabError;
use crate::tap::{ArchiveClient, TapService};

use super::IdentifierResolver;

/// How an object is designated in a SIMBAD parameter query.
#[derive(Debug, Clone, PartialEq)]
pub enum SimbadObjectKey {
    /// The `basic.main_id` of the object.
    MainId(String),
    /// The `basic.oid` of the object.
    ObjectId(i64),
}

impl SimbadObjectKey {
    /// Build a key out of two optional designations, exactly one of which must be given.
    pub fn from_options(main_id: Option<&str>, object_id: Option<i64>) -> Result<Self, PhabError> {
        match (main_id, object_id) {
            (Some(main_id), None) => Ok(SimbadObjectKey::MainId(main_id.to_string())),
            (None, Some(oid)) => Ok(SimbadObjectKey::ObjectId(oid)),
            (Some(_), Some(_)) => Err(PhabError::InvalidObjectKey(
                "either main ID or object ID needs to be provided, not both".into(),
            )),
            (None, None) => Err(PhabError::InvalidObjectKey(
                "neither main ID nor object ID is provided".into(),
            )),
        }
    }
}

/// A parameter value with the publication it comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    pub value: Value,
    pub reference: Option<String>,
}

/// Latest value of a parameter of a SIMBAD object.
///
/// Arguments
/// ---------
/// * `client`: the archive client
/// * `key`: the object designation
/// * `table`: the SIMBAD measurement table, like `mesVar`
/// * `param`: the parameter column, like `period`
///
/// Return
/// ------
/// * `Some(record)` for the latest publication, `None` if there is no value
pub fn fetch_latest_parameter(
    client: &ArchiveClient,
    key: &SimbadObjectKey,
    table: &str,
    param: &str,
) -> Result<Option<ParameterRecord>, PhabError> {
    let query = match key {
        SimbadObjectKey::MainId(main_id) => format!(
            "SELECT TOP 1 v.{param}, v.bibcode FROM {table} AS v JOIN basic AS b ON v.oidref = b.oid \
             WHERE b.main_id = '{main_id}' AND {param} IS NOT NULL ORDER BY bibcode DESC"
        ),
        SimbadObjectKey::ObjectId(oid) => format!(
            "SELECT TOP 1 {param}, bibcode FROM {table} \
             WHERE oidref = {oid} AND {param} IS NOT NULL ORDER BY bibcode DESC"
        ),
    };

    let outcome = client.query_service(TapService::Simbad, &query)?;
    let Some(row) = outcome.rows().and_then(|rows| rows.first()) else {
        debug!("SIMBAD has no [{param}] in [{table}] for {key:?}");
        return Ok(None);
    };
    let Some(value) = row.get(param).filter(|value| !value.is_missing()) else {
        return Ok(None);
    };
    Ok(Some(ParameterRecord {
        value: value.clone(),
        reference: row
            .get("bibcode")
            .filter(|bibcode| !bibcode.is_missing())
            .map(Value::to_string),
    }))
}

pub fn get_stellar_parameter_from_simbad_by_main_id(
    client: &ArchiveClient,
    main_id: &str,
    table: &str,
    param: &str,
) -> Result<Option<ParameterRecord>, PhabError> {
    fetch_latest_parameter(client, &SimbadObjectKey::MainId(main_id.into()), table, param)
}

pub fn get_stellar_parameter_from_simbad_by_object_id(
    client: &ArchiveClient,
    object_id: i64,
    table: &str,
    param: &str,
) -> Result<Option<ParameterRecord>, PhabError> {
    fetch_latest_parameter(client, &SimbadObjectKey::ObjectId(object_id), table, param)
}

impl IdentifierResolver<'_> {
    /// Resolve the object first, then fetch its latest parameter by object ID.
    pub fn get_stellar_parameter(
        &self,
        name: &str,
        table: &str,
        param: &str,
    ) -> Result<Option<ParameterRecord>, PhabError> {
        match self.get_object_id(name)? {
            Some(oid) => get_stellar_parameter_from_simbad_by_object_id(self.client(), oid, table, param),
            None => Ok(None),
        }
    }
}
