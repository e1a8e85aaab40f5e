use once_cell::sync::Lazy;
use regex::Regex;

/// A quoted literal broken in two by one embedded apostrophe: `'A'B'`.
static BROKEN_LITERAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"('([^']*)(')([^']*)')").expect("ADQL literal regex must compile"));

/// Escape special characters in an ADQL query. Only the single quote is
/// handled: `'A'B'` becomes `'A''B'`, so a name such as
/// `NAME Teegarden's Star` stays one literal.
///
/// Arguments
/// ---------
/// * `raw_query`: the ADQL query as written
///
/// Return
/// ------
/// * the escaped query
///
/// Examples
/// ----------
/// ```rust
/// use phab::tap::adql::escape_special_characters_for_adql;
///
/// let escaped = escape_special_characters_for_adql(
///     "SELECT oid FROM basic WHERE main_id = 'NAME Teegarden's Star'",
/// );
/// assert_eq!(escaped, "SELECT oid FROM basic WHERE main_id = 'NAME Teegarden''s Star'");
/// ```
pub fn escape_special_characters_for_adql(raw_query: &str) -> String {
    BROKEN_LITERAL_REGEX
        .replace_all(raw_query, "'${2}'${3}${4}'")
        .into_owned()
}
