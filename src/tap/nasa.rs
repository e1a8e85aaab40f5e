//! # NASA Exoplanet Archive lookups
//!
//! Parameters are read from the Planetary Systems (`ps`) table, where each
//! planet has one row per publication. The latest (*newest*) published value
//! is the first row ordered by `pl_pubdate DESC`.
//!
//! ## Rounded doubles
//!
//! NASA rounds `double` columns in `SELECT` according to their display format
//! but compares the stored values in `WHERE`. Two workarounds follow from it:
//!
//! * doubles are selected as `CAST(param AS REAL) AS param_real` to get the
//!   full precision back;
//! * a value read from NASA may not match itself in an equality clause, so
//!   [`get_planetary_parameter_reference_from_nasa`] can retry with
//!   `CAST(param AS VARCHAR(n)) LIKE '<truncated value>%'`
//!   (see [`float_to_string_for_adql_cast_varchar`]).
//!
//! `TOP` is broken in NASA's ADQL, so none of these queries use it.
use tracing::{debug, warn};

use crate::datasets::Value;
use crate::phab_errors::PhabError;
use crate::strings::conversion::float_to_string_for_adql_cast_varchar;
use crate::strings::extraction::ads_ref_from_full_reference_nasa;

use super::services::is_nasa_stellar_parameter;
use super::{ArchiveClient, QueryOutcome, TapService};

/// How [`get_planetary_parameter_reference_from_nasa`] handles the double precision problem.
///
/// # Fields
///
/// * `parameter_is_double` - the parameter is a `double` column in NASA
/// * `retry_on_empty` - retry with a `CAST ... LIKE` comparison when nothing matched
/// * `return_raw_on_extraction_failure` - return the full reference when no
///   bibcode can be extracted from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLookup {
    pub parameter_is_double: bool,
    pub retry_on_empty: bool,
    pub return_raw_on_extraction_failure: bool,
}

impl Default for ReferenceLookup {
    fn default() -> Self {
        ReferenceLookup {
            parameter_is_double: false,
            retry_on_empty: true,
            return_raw_on_extraction_failure: true,
        }
    }
}

fn first_value(outcome: QueryOutcome, column: &str) -> Option<Value> {
    outcome
        .rows()
        .and_then(|rows| rows.first())
        .and_then(|row| row.get(column))
        .filter(|value| !value.is_missing())
        .cloned()
}

/// Names of the `ps` columns that have the `double` type.
///
/// Those are the parameters to select through `CAST(... AS REAL)` and to
/// compare through `CAST(... AS VARCHAR(n))`.
pub fn get_parameters_that_are_double_in_nasa(
    client: &ArchiveClient,
) -> Result<Vec<String>, PhabError> {
    let outcome = client.query_service(
        TapService::Nasa,
        "SELECT column_name FROM tap_schema.columns WHERE table_name = 'ps' AND datatype = 'double'",
    )?;
    Ok(outcome
        .rows()
        .and_then(|rows| rows.column("column_name"))
        .map(|cells| cells.into_iter().map(Value::to_string).collect())
        .unwrap_or_default())
}

fn latest_parameter(
    client: &ArchiveClient,
    key_column: &str,
    key: &str,
    param: &str,
    parameter_is_double: bool,
) -> Result<Option<Value>, PhabError> {
    let select = if parameter_is_double {
        format!("SELECT CAST({param} AS REAL) AS {param}_real")
    } else {
        format!("SELECT {param}")
    };
    let query = [
        select.as_str(),
        "FROM ps",
        &format!("WHERE {key_column} = '{key}' AND {param} IS NOT NULL"),
        "ORDER BY pl_pubdate DESC",
    ]
    .join(" ");

    let outcome = client.query_service(TapService::Nasa, &query)?;
    let column = if parameter_is_double {
        format!("{param}_real")
    } else {
        param.to_string()
    };
    Ok(first_value(outcome, &column))
}

/// Latest published stellar parameter of a system (`hostname`).
pub fn get_stellar_parameter_from_nasa(
    client: &ArchiveClient,
    system_name: &str,
    param: &str,
    parameter_is_double: bool,
) -> Result<Option<Value>, PhabError> {
    latest_parameter(client, "hostname", system_name, param, parameter_is_double)
}

/// Latest published planetary parameter of a planet (`pl_name`).
pub fn get_planetary_parameter_from_nasa(
    client: &ArchiveClient,
    planet_name: &str,
    param: &str,
    parameter_is_double: bool,
) -> Result<Option<Value>, PhabError> {
    latest_parameter(client, "pl_name", planet_name, param, parameter_is_double)
}

/// Latest published parameter, stellar or planetary.
///
/// The kind is decided with the NASA → PADC stars mapping, which is handy
/// when one only has a list of parameter names.
pub fn get_parameter_from_nasa(
    client: &ArchiveClient,
    system_name: &str,
    planet_name: &str,
    param: &str,
    parameter_is_double: bool,
) -> Result<Option<Value>, PhabError> {
    if is_nasa_stellar_parameter(param) {
        get_stellar_parameter_from_nasa(client, system_name, param, parameter_is_double)
    } else {
        get_planetary_parameter_from_nasa(client, planet_name, param, parameter_is_double)
    }
}

/// Latest published errors of a parameter, as `(PARAMerr2, PARAMerr1)`,
/// that is `(minimum error, maximum error)`.
pub fn get_parameter_errors_from_nasa(
    client: &ArchiveClient,
    system_name: &str,
    planet_name: &str,
    param: &str,
) -> Result<(Option<Value>, Option<Value>), PhabError> {
    if !client.registry().get(TapService::Nasa)?.has_errors(param) {
        debug!("[{param}] is not registered as a parameter with errors in NASA");
    }
    let err_min = get_parameter_from_nasa(client, system_name, planet_name, &format!("{param}err2"), false)?;
    let err_max = get_parameter_from_nasa(client, system_name, planet_name, &format!("{param}err1"), false)?;
    Ok((err_min, err_max))
}

/// Publication reference of a given planetary parameter value.
///
/// The reference row is the one where `param_name` equals `param_value`,
/// latest publication first. The full reference is NASA citation markup; the
/// ADS bibcode is extracted from it.
///
/// Arguments
/// ---------
/// * `client`: the archive client
/// * `planet_name`: the `pl_name` of the planet
/// * `param_name`: the parameter column
/// * `param_value`: the value as it was read from NASA; text values and
///   string-typed parameters are compared as quoted literals
/// * `lookup`: how to handle the double precision problem and failed extractions
///
/// Return
/// ------
/// * `Some(bibcode)`, or the full reference if extraction failed and
///   `return_raw_on_extraction_failure` is set
/// * `None` if nothing matched
pub fn get_planetary_parameter_reference_from_nasa(
    client: &ArchiveClient,
    planet_name: &str,
    param_name: &str,
    param_value: &Value,
    lookup: ReferenceLookup,
) -> Result<Option<String>, PhabError> {
    if lookup.retry_on_empty && !lookup.parameter_is_double {
        warn!("The re-execution flag is passed, but parameter type is not double, so the query will not be re-executed");
    }

    let nasa = client.registry().get(TapService::Nasa)?;
    let literal = if nasa.is_string_parameter(param_name) && !param_value.is_text() {
        format!("'{param_value}'")
    } else {
        param_value.to_adql_literal()
    };

    let query = [
        "SELECT pl_refname",
        "FROM ps",
        &format!("WHERE pl_name = '{planet_name}' AND {param_name}"),
        &format!("= {literal}"),
        "ORDER BY pl_pubdate DESC",
    ]
    .join(" ");

    let mut full_reference = first_value(client.query_service(TapService::Nasa, &query)?, "pl_refname");

    if full_reference.is_none() && lookup.parameter_is_double && lookup.retry_on_empty {
        match param_value.as_f64() {
            Some(float_value) => {
                warn!("The query returned no results, will try to execute again, but this time with the parameter casted from double to string");
                let value_length = param_value.to_string().len();
                let pattern =
                    float_to_string_for_adql_cast_varchar(float_value, nasa.drops_leading_zero());
                let query = [
                    "SELECT pl_refname",
                    "FROM ps",
                    &format!("WHERE pl_name = '{planet_name}'"),
                    &format!("AND CAST({param_name} AS VARCHAR({value_length})) LIKE '{pattern}'"),
                    "ORDER BY pl_pubdate DESC",
                ]
                .join(" ");
                full_reference =
                    first_value(client.query_service(TapService::Nasa, &query)?, "pl_refname");
            }
            None => warn!("The value [{param_value}] of [{param_name}] is not a number, cannot cast it"),
        }
    }

    let Some(full_reference) = full_reference else {
        return Ok(None);
    };
    let full_reference = full_reference.to_string();
    match ads_ref_from_full_reference_nasa(&full_reference) {
        Some(reference) => Ok(Some(reference)),
        None if lookup.return_raw_on_extraction_failure => Ok(Some(full_reference)),
        None => Ok(None),
    }
}
