//! # Constants shared across phab
//!
//! Default column names, catalogue names and tuning values used by the
//! resolver, the enrichment pipeline and the outlier detector.

// -------------------------------------------------------------------------------------------------
// Dataset columns
// -------------------------------------------------------------------------------------------------

/// Column holding the star names in the datasets
pub const DEFAULT_NAME_COLUMN: &str = "star_name";

// -------------------------------------------------------------------------------------------------
// Catalogues
// -------------------------------------------------------------------------------------------------

/// Catalogue name of Gaia identifiers in SIMBAD (`Gaia DR3 ...`)
pub const GAIA_CATALOGUE: &str = "gaia";

/// Gaia column holding the source identifier
pub const GAIA_ID_COLUMN: &str = "source_id";

/// SIMBAD identifier families that only match `main_id` through `LIKE`
pub const DEFAULT_FALLBACK_PREFIXES: &[&str] = &["CD"];

// -------------------------------------------------------------------------------------------------
// Networking
// -------------------------------------------------------------------------------------------------

/// Global timeout of an HTTP request to a TAP service, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

// -------------------------------------------------------------------------------------------------
// Outliers
// -------------------------------------------------------------------------------------------------

/// Default threshold of the outlier detector, in robust sigmas
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

/// Default number of non-outlier points joined between two outliers
pub const DEFAULT_NEIGHBOUR_SPAN: usize = 3;
