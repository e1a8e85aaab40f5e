//! # Resolving object names in SIMBAD
//!
//! SIMBAD stores every object once, under an internal integer identifier
//! (`basic.oid`), and keeps all the names an object is known by in the
//! `ident` table. Only one of those names is the *main* identifier
//! (`basic.main_id`), and there is no telling which one it is, so resolution
//! looks up the name itself first and then every alias in turn:
//!
//! ```text
//! get_object_id(name)
//!   ├─ main_id = name ?                      → oid
//!   └─ aliases(name)
//!        ├─ none                             → not found
//!        └─ for alias in aliases (≠ name)
//!             ├─ main_id = alias ?           → oid
//!             └─ alias starts with a fallback prefix ?
//!                  └─ main_id LIKE 'alias%' ? → oid (warning)
//! ```
//!
//! Some identifier families (`CD-...` by default) are stored in `main_id`
//! with a spacing that never matches the alias exactly, which is what the
//! prefix fallback is for. A `LIKE` match is weaker evidence than equality,
//! hence the warning.
//!
//! ## See also
//! ------------
//! * [`parameters`] – fetching a parameter once the object is known.
//! * [`crate::tasks::reconfirming_stellar_parameters`] – the bulk pipeline
//!   relying on [`IdentifierResolver::find_identifier_from_another_catalogue`].
pub mod parameters;

use std::cell::RefCell;
use std::collections::HashMap;

use regex::RegexBuilder;
use tracing::{debug, error, warn};

use crate::constants::DEFAULT_FALLBACK_PREFIXES;
use crate::datasets::Value;
use crate::phab_errors::PhabError;
use crate::tap::{ArchiveClient, QueryResult, TapService};

/// The alias list column, upper-cased in older services and lower-cased since.
const ID_COLUMN_SPELLINGS: [&str; 2] = ["ID", "id"];

/// How an [`IdentifierResolver`] behaves.
///
/// # Fields
///
/// * `fallback_prefixes` - upper-cased alias prefixes eligible to the `LIKE` fallback
/// * `fallback_enabled` - whether the fallback is used at all
/// * `cache_object_ids` - remember resolved identifiers for the resolver's lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    fallback_prefixes: Vec<String>,
    fallback_enabled: bool,
    cache_object_ids: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::new(DEFAULT_FALLBACK_PREFIXES, true, false)
    }
}

impl ResolverConfig {
    pub fn new<S: AsRef<str>>(
        fallback_prefixes: &[S],
        fallback_enabled: bool,
        cache_object_ids: bool,
    ) -> Self {
        ResolverConfig {
            fallback_prefixes: fallback_prefixes
                .iter()
                .map(|prefix| prefix.as_ref().to_uppercase())
                .collect(),
            fallback_enabled,
            cache_object_ids,
        }
    }

    pub fn fallback_prefixes(&self) -> &[String] {
        &self.fallback_prefixes
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    pub fn cache_object_ids(&self) -> bool {
        self.cache_object_ids
    }

    fn is_fallback_candidate(&self, alias: &str) -> bool {
        if !self.fallback_enabled {
            return false;
        }
        let alias = alias.to_uppercase();
        self.fallback_prefixes
            .iter()
            .any(|prefix| alias.starts_with(prefix.as_str()))
    }
}

/// Resolves object names against SIMBAD through an [`ArchiveClient`].
pub struct IdentifierResolver<'a> {
    client: &'a ArchiveClient,
    config: ResolverConfig,
    cache: RefCell<HashMap<String, Option<i64>>>,
}

fn oid_from(result: &QueryResult) -> Result<Option<i64>, PhabError> {
    if !result.has_column("oid") {
        return Err(PhabError::SchemaMismatch {
            expected: vec!["oid".into()],
            available: result.column_names().to_vec(),
        });
    }
    Ok(result
        .first()
        .and_then(|row| row.get("oid"))
        .and_then(Value::as_i64))
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(client: &'a ArchiveClient) -> Self {
        IdentifierResolver::with_config(client, ResolverConfig::default())
    }

    pub fn with_config(client: &'a ArchiveClient, config: ResolverConfig) -> Self {
        IdentifierResolver {
            client,
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &'a ArchiveClient {
        self.client
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn lookup_main_id(&self, candidate: &str) -> Result<Option<i64>, PhabError> {
        let query = format!("SELECT oid FROM basic WHERE main_id = '{candidate}'");
        match self.client.query_service(TapService::Simbad, &query)?.rows() {
            Some(rows) => oid_from(rows),
            None => Ok(None),
        }
    }

    fn lookup_main_id_prefix(&self, alias: &str) -> Result<Option<i64>, PhabError> {
        let query = format!("SELECT TOP 1 oid FROM basic WHERE main_id LIKE '{alias}%'");
        match self.client.query_service(TapService::Simbad, &query)?.rows() {
            Some(rows) => oid_from(rows),
            None => Ok(None),
        }
    }

    /// All the identifiers SIMBAD knows for an object.
    ///
    /// Return
    /// ------
    /// * `None` if SIMBAD has no record of the object
    /// * [`PhabError::SchemaMismatch`] if the alias list has neither an `ID`
    ///   nor an `id` column
    pub fn query_object_ids(&self, name: &str) -> Result<Option<Vec<String>>, PhabError> {
        let query = [
            "SELECT id2.id",
            "FROM ident AS id1 JOIN ident AS id2 USING(oidref)",
            &format!("WHERE id1.id = '{name}'"),
        ]
        .join(" ");

        let Some(rows) = self
            .client
            .query_service(TapService::Simbad, &query)?
            .into_rows()
        else {
            warn!("SIMBAD database doesn't have information about [{name}]");
            return Ok(None);
        };

        let Some(column) = ID_COLUMN_SPELLINGS
            .iter()
            .find(|spelling| rows.has_column(spelling))
        else {
            error!("SIMBAD results table has neither [ID] nor [id] column");
            return Err(PhabError::SchemaMismatch {
                expected: ID_COLUMN_SPELLINGS.iter().map(|c| c.to_string()).collect(),
                available: rows.column_names().to_vec(),
            });
        };

        Ok(rows
            .column_text(column)
            .map(|cells| cells.into_iter().map(str::to_string).collect()))
    }

    /// SIMBAD object identifier (`basic.oid`) of a named object.
    ///
    /// The name is looked up as the main identifier first. Otherwise every alias
    /// is looked up in the order SIMBAD returns them, with the prefix fallback
    /// for the configured identifier families.
    ///
    /// Arguments
    /// ---------
    /// * `name`: any name the object is known by, like `A2 146`
    ///
    /// Return
    /// ------
    /// * `Some(oid)`, or `None` if no lookup matched
    /// * query errors and [`PhabError::SchemaMismatch`] are propagated
    pub fn get_object_id(&self, name: &str) -> Result<Option<i64>, PhabError> {
        if self.config.cache_object_ids {
            if let Some(cached) = self.cache.borrow().get(name) {
                debug!("Object ID of [{name}] is already known: {cached:?}");
                return Ok(*cached);
            }
        }

        let oid = self.resolve(name)?;

        if self.config.cache_object_ids {
            self.cache.borrow_mut().insert(name.to_string(), oid);
        }
        Ok(oid)
    }

    fn resolve(&self, name: &str) -> Result<Option<i64>, PhabError> {
        debug!("Checking whether [{name}] is already the main ID");
        if let Some(oid) = self.lookup_main_id(name)? {
            debug!("- yes, SIMBAD object ID is: {oid}");
            return Ok(Some(oid));
        }
        debug!("- no, will have to iterate all the other identifiers");

        let Some(aliases) = self.query_object_ids(name)? else {
            return Ok(None);
        };

        for alias in aliases.iter() {
            if alias == name {
                debug!("...the [{alias}] has already been tested, skipping");
                continue;
            }
            if let Some(oid) = self.lookup_main_id(alias)? {
                debug!("The [{alias}] is the main ID for [{name}], SIMBAD object ID is: {oid}");
                return Ok(Some(oid));
            }
            if self.config.is_fallback_candidate(alias) {
                if let Some(oid) = self.lookup_main_id_prefix(alias)? {
                    warn!(
                        "The main ID for [{name}] was found with LIKE '{alias}%', its correctness is not guaranteed. SIMBAD object ID is: {oid}"
                    );
                    return Ok(Some(oid));
                }
            }
        }
        Ok(None)
    }

    /// Identifier of an object in another catalogue, as known by SIMBAD.
    ///
    /// SIMBAD lists identifiers prefixed with the catalogue name (and
    /// version), like `Gaia DR3 6132146982868270976` for `TWA 20`.
    ///
    /// Arguments
    /// ---------
    /// * `name`: the object name
    /// * `catalogue`: the catalogue name, like `gaia`
    /// * `version`: the catalogue version, like `dr3`
    /// * `without_prefix`: strip `"<catalogue> <version>"` from the result
    ///
    /// Return
    /// ------
    /// * the first matching identifier, `None` if there is none
    pub fn find_identifier_from_another_catalogue(
        &self,
        name: &str,
        catalogue: &str,
        version: Option<&str>,
        without_prefix: bool,
    ) -> Result<Option<String>, PhabError> {
        let Some(aliases) = self.query_object_ids(name)? else {
            return Ok(None);
        };
        debug!("Checking SIMBAD IDs for [{name}]:");

        let id_to_look_for = match version {
            Some(version) if !version.is_empty() => format!("{catalogue} {version}"),
            _ => catalogue.to_string(),
        };
        let catalogue = catalogue.to_lowercase();
        let lowered_id = id_to_look_for.to_lowercase();

        let Some(candidate) = aliases.into_iter().find(|candidate| {
            debug!("- {candidate}");
            let lowered = candidate.to_lowercase();
            lowered.contains(&catalogue) && lowered.contains(&lowered_id)
        }) else {
            return Ok(None);
        };

        if !without_prefix {
            return Ok(Some(candidate));
        }
        let prefix = RegexBuilder::new(&format!(r"{}\s?", regex::escape(&id_to_look_for)))
            .case_insensitive(true)
            .build()?;
        Ok(Some(prefix.replace_all(&candidate, "").into_owned()))
    }
}
