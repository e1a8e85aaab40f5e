//! # Reconfirming stellar parameters
//!
//! Enriches a dataset of stars with parameters from another archive, Gaia
//! being the usual one:
//!
//! 1. the distinct star names are read from the name column;
//! 2. each star gets its identifier in the target catalogue from SIMBAD
//!    (`Gaia DR3 6132146982868270976` → `6132146982868270976`);
//! 3. one column per requested parameter is added, filled with missing values;
//! 4. the target archive is queried once per resolved star, for all the
//!    parameters at once, and the first row is written into the rows of that star;
//! 5. the number of enriched stars is reported.
//!
//! Stars that cannot be resolved or have no record in the target archive are
//! skipped with a warning; any other failure aborts the run.
//!
//! ```rust,ignore
//! use phab::env_state::PhabEnv;
//! use phab::simbad::IdentifierResolver;
//! use phab::tap::{ArchiveClient, ServiceRegistry};
//! use phab::tasks::reconfirming_stellar_parameters::look_for_parameters_in_gaia;
//!
//! let client = ArchiveClient::new(ServiceRegistry::default(), PhabEnv::new());
//! let resolver = IdentifierResolver::new(&client);
//! let (table, report) = look_for_parameters_in_gaia(
//!     &resolver,
//!     "./data/systems-528n.tbl".into(),
//!     "gaiadr3.astrophysical_parameters",
//!     &["age_flame", "mass_flame", "teff_gspphot"],
//!     Some("dr3"),
//! )?;
//! println!("{report}");
//! ```
use std::fmt;

use camino::Utf8Path;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_NAME_COLUMN, GAIA_CATALOGUE, GAIA_ID_COLUMN};
use crate::datasets::table_file::open_table;
use crate::datasets::{Table, Value};
use crate::phab_errors::PhabError;
use crate::simbad::IdentifierResolver;
use crate::tap::TapService;

/// What to look for, where, and how the stars are identified there.
///
/// # Fields
///
/// * `service` - the archive holding the parameters
/// * `table` - the archive table, like `gaiadr3.astrophysical_parameters`
/// * `parameters` - the columns to fetch, each becoming a dataset column
/// * `id_catalogue` - the catalogue name in SIMBAD identifiers, like `gaia`
/// * `id_version` - the catalogue version in SIMBAD identifiers, like `dr3`
/// * `id_column` - the archive column holding the identifier, like `source_id`
/// * `name_column` - the dataset column holding the star names
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRequest {
    pub service: TapService,
    pub table: String,
    pub parameters: Vec<String>,
    pub id_catalogue: String,
    pub id_version: Option<String>,
    pub id_column: String,
    pub name_column: String,
}

impl EnrichmentRequest {
    /// A request against Gaia, identifying stars by `source_id`.
    pub fn gaia<S: AsRef<str>>(table: &str, parameters: &[S], version: Option<&str>) -> Self {
        EnrichmentRequest {
            service: TapService::Gaia,
            table: table.to_string(),
            parameters: parameters.iter().map(|p| p.as_ref().to_string()).collect(),
            id_catalogue: GAIA_CATALOGUE.to_string(),
            id_version: version.map(str::to_string),
            id_column: GAIA_ID_COLUMN.to_string(),
            name_column: DEFAULT_NAME_COLUMN.to_string(),
        }
    }

    fn select_query(&self, identifier: &str) -> String {
        let literal = if identifier.parse::<i64>().is_ok() {
            identifier.to_string()
        } else {
            format!("'{identifier}'")
        };
        format!(
            "SELECT {} FROM {} WHERE {} = {literal}",
            self.parameters.join(", "),
            self.table,
            self.id_column
        )
    }
}

/// Outcome of an enrichment run.
///
/// # Fields
///
/// * `total` - number of distinct star names
/// * `found` - stars that got their parameters
/// * `unresolved` - stars without an identifier in the target catalogue
/// * `not_found` - resolved stars the archive had no record of
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentReport {
    pub total: usize,
    pub found: usize,
    pub unresolved: Vec<String>,
    pub not_found: Vec<String>,
}

impl fmt::Display for EnrichmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found parameters for {}/{} stars", self.found, self.total)
    }
}

/// Add the requested parameters to a dataset, as new columns.
///
/// Arguments
/// ---------
/// * `resolver`: the SIMBAD resolver, its client also queries the target archive
/// * `dataset`: the original dataset
/// * `request`: what to fetch and from where
///
/// Return
/// ------
/// * the dataset with one more column per parameter, rows and index untouched
/// * the [`EnrichmentReport`] of the run
/// * [`PhabError::MissingColumn`] if the dataset has no name column,
///   [`PhabError::SchemaMismatch`] if the archive answered without a requested
///   parameter, and any query error
pub fn enrich(
    resolver: &IdentifierResolver,
    mut dataset: Table,
    request: &EnrichmentRequest,
) -> Result<(Table, EnrichmentReport), PhabError> {
    let names: Vec<Value> = dataset
        .unique_values(&request.name_column)?
        .into_iter()
        .filter(|name| !name.is_missing())
        .collect();

    let mut report = EnrichmentReport {
        total: names.len(),
        ..Default::default()
    };

    info!(
        "Getting {} IDs from SIMBAD for {} stars",
        request.id_catalogue, report.total
    );
    let mut resolved: Vec<(Value, String)> = Vec::with_capacity(names.len());
    for name in names {
        let star = name.to_string();
        match resolver.find_identifier_from_another_catalogue(
            &star,
            &request.id_catalogue,
            request.id_version.as_deref(),
            true,
        )? {
            Some(identifier) => {
                debug!("- found {} ID for [{star}]: {identifier}", request.id_catalogue);
                resolved.push((name, identifier));
            }
            None => {
                warn!("did not find {} ID for [{star}]", request.id_catalogue);
                report.unresolved.push(star);
            }
        }
    }

    for parameter in request.parameters.iter() {
        dataset.add_column(parameter, Value::Missing);
    }

    info!("Looking for parameters in {}", request.service);
    let endpoint = resolver.client().endpoint(request.service)?;
    for (name, identifier) in resolved {
        debug!("- {name} | {identifier}...");
        let outcome = resolver
            .client()
            .query(endpoint, &request.select_query(&identifier), true)?;

        let Some(rows) = outcome.into_rows() else {
            warn!("did not find anything in {} for [{identifier}]", request.service);
            report.not_found.push(name.to_string());
            continue;
        };
        if rows.len() > 1 {
            warn!(
                "{} has more than one record for ID [{identifier}], will take only the first one",
                request.service
            );
        }
        if let Some(missing) = request.parameters.iter().find(|p| !rows.has_column(p)) {
            return Err(PhabError::SchemaMismatch {
                expected: vec![missing.clone()],
                available: rows.column_names().to_vec(),
            });
        }

        let Some(first) = rows.first() else {
            continue;
        };
        let positions = dataset.positions_where(&request.name_column, &name)?;
        for parameter in request.parameters.iter() {
            let value = first.get(parameter).cloned().unwrap_or(Value::Missing);
            for position in positions.iter() {
                dataset.set(*position, parameter, value.clone())?;
            }
        }
        report.found += 1;
    }

    if !report.unresolved.is_empty() {
        debug!("Unresolved stars: {}", report.unresolved.iter().join(", "));
    }
    info!("{report}");
    Ok((dataset, report))
}

/// Enrich a dataset file with parameters from a Gaia table.
///
/// The `version` is needed when SIMBAD lists several releases, like
/// `Gaia DR2 ...` and `Gaia DR3 ...`, and only one of them is wanted.
pub fn look_for_parameters_in_gaia<S: AsRef<str>>(
    resolver: &IdentifierResolver,
    original_table: &Utf8Path,
    adql_table: &str,
    adql_parameters: &[S],
    simbad_id_version: Option<&str>,
) -> Result<(Table, EnrichmentReport), PhabError> {
    let dataset = open_table(original_table)?;
    enrich(
        resolver,
        dataset,
        &EnrichmentRequest::gaia(adql_table, adql_parameters, simbad_id_version),
    )
}

#[cfg(test)]
mod reconfirming_stellar_parameters_test {
    use std::rc::Rc;

    use super::*;
    use crate::tap::test_transport::ScriptedTransport;
    use crate::tap::{ArchiveClient, ServiceRegistry};

    fn dataset() -> Table {
        Table::from_rows(
            vec![3, 5, 8, 13],
            &["star_name", "pl_name"],
            vec![
                vec!["TWA 20".into(), "TWA 20 b".into()],
                vec!["Nowhere".into(), "Nowhere b".into()],
                vec!["TWA 20".into(), "TWA 20 c".into()],
                vec!["Kepler-11".into(), "Kepler-11 b".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_enrich_with_gaia() {
        let transport = ScriptedTransport::new();
        transport.push_rows("id\nTWA 20\nGaia DR3 6132146982868270976\n");
        transport.push_rows("id\n");
        transport.push_rows("id\nKepler-11\nGaia DR3 2135237601028549888\n");
        transport.push_rows("teff_gspphot,mass_flame\n3370.5,0.41\n3371.0,0.42\n");
        transport.push_rows("teff_gspphot,mass_flame\n");
        let client = ArchiveClient::new(ServiceRegistry::default(), Rc::clone(&transport));
        let resolver = IdentifierResolver::new(&client);

        let request = EnrichmentRequest::gaia(
            "gaiadr3.astrophysical_parameters",
            &["teff_gspphot", "mass_flame"],
            Some("dr3"),
        );
        let (table, report) = enrich(&resolver, dataset(), &request).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.found, 1);
        assert_eq!(report.unresolved, vec!["Nowhere".to_string()]);
        assert_eq!(report.not_found, vec!["Kepler-11".to_string()]);
        assert_eq!(report.to_string(), "Found parameters for 1/3 stars");

        assert_eq!(table.index(), &[3, 5, 8, 13]);
        assert_eq!(
            table.column_names(),
            vec!["star_name", "pl_name", "teff_gspphot", "mass_flame"]
        );
        assert_eq!(
            table.column("teff_gspphot").unwrap(),
            &[
                Value::Float(3370.5),
                Value::Missing,
                Value::Float(3370.5),
                Value::Missing
            ]
        );
        assert_eq!(table.get(2, "mass_flame"), Some(&Value::Float(0.41)));

        let queries = transport.queries();
        assert_eq!(
            queries[3],
            "SELECT teff_gspphot, mass_flame FROM gaiadr3.astrophysical_parameters WHERE source_id = 6132146982868270976"
        );
        let (endpoint, _) = transport.queries.borrow()[3].clone();
        assert_eq!(endpoint, "https://gea.esac.esa.int/tap-server/tap");
    }

    #[test]
    fn test_enrich_without_name_column() {
        let transport = ScriptedTransport::new();
        let client = ArchiveClient::new(ServiceRegistry::default(), Rc::clone(&transport));
        let resolver = IdentifierResolver::new(&client);

        let table = Table::from_rows_default_index(&["hostname"], vec![vec!["TWA 20".into()]]).unwrap();
        let request = EnrichmentRequest::gaia("gaiadr3.gaia_source", &["ra"], None);
        assert_eq!(
            enrich(&resolver, table, &request),
            Err(PhabError::MissingColumn("star_name".into()))
        );
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_text_identifiers_are_quoted() {
        let request = EnrichmentRequest {
            id_column: "designation".into(),
            ..EnrichmentRequest::gaia("gaiadr3.gaia_source", &["ra", "dec"], None)
        };
        assert_eq!(
            request.select_query("DR3 123"),
            "SELECT ra, dec FROM gaiadr3.gaia_source WHERE designation = 'DR3 123'"
        );
    }
}
