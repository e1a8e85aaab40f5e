use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the NASA citation markup and captures the ADS bibliographic code,
/// e.g. `<a refstr=... href=https://ui.adsabs.harvard.edu/abs/2014A&A...571A..38B/abstract target=ref>...</a>`
static NASA_REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<a refstr=.* href=.*/abs/(.*)/abstract.*</a>")
        .expect("NASA reference regex must compile")
});

/// Extract the short reference (ADS bibcode) from a full NASA reference string.
///
/// Arguments
/// ---------
/// * `full_reference`: the raw `pl_refname`/`st_refname` value
///
/// Return
/// ------
/// * `Some(bibcode)` when the markup matches, `None` otherwise
pub fn ads_ref_from_full_reference_nasa(full_reference: &str) -> Option<String> {
    NASA_REFERENCE_REGEX
        .captures(full_reference)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
