//! Number ↔ string conversions used when building ADQL literals.
//!
//! Archives round floating-point values when they are displayed in a `SELECT`
//! but compare the stored, full-precision values in a `WHERE`. A value read
//! from an archive can then fail to match itself in an equality clause. The
//! workaround is to cast the column to `VARCHAR` and compare with `LIKE`
//! against a truncated rendering of the value:
//!
//! ```sql
//! WHERE CAST(some_float AS VARCHAR(6)) LIKE '1.234%'
//! ```
//!
//! See also
//! ------------
//! * [`crate::tap::nasa::get_planetary_parameter_reference_from_nasa`] – the only consumer of the workaround.

/// Render a float the way archives and ADQL literals expect it.
///
/// The digits are the shortest representation that round-trips; integral
/// values keep a trailing `.0` and very small or very large magnitudes
/// switch to the `1e-05` / `1e+16` scientific form.
///
/// Arguments
/// ---------
/// * `value`: the float to render
///
/// Return
/// ------
/// * the rendered string, `nan`, `inf` or `-inf` for non-finite values
pub fn render_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let mut plain = format!("{value}");
        if !plain.contains('.') {
            plain.push_str(".0");
        }
        plain
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// Convert a float into the pattern used with `CAST(... AS VARCHAR(n)) LIKE`.
///
/// The last rendered character is dropped and replaced with the `%` wildcard.
/// Some archives cast `0.123` as `.123`, so with `drop_leading_zero` the
/// leading zero of values with `|v| < 1` is removed too (the sign is kept).
///
/// Arguments
/// ---------
/// * `value`: the float value to convert
/// * `drop_leading_zero`: whether the archive drops the leading zero on cast
///
/// Return
/// ------
/// * the `LIKE` pattern, for example `1.234%` for `1.2345`
///
/// Examples
/// ----------
/// ```rust
/// use phab::strings::conversion::float_to_string_for_adql_cast_varchar;
///
/// assert_eq!(float_to_string_for_adql_cast_varchar(0.2345, false), "0.234%");
/// assert_eq!(float_to_string_for_adql_cast_varchar(-0.2345, true), "-.234%");
/// ```
pub fn float_to_string_for_adql_cast_varchar(value: f64, drop_leading_zero: bool) -> String {
    let rendered = render_float(value);
    let mut chars: Vec<char> = rendered.chars().collect();
    chars.pop();

    if drop_leading_zero && value.abs() < 1.0 {
        let zero_position = if value.is_sign_negative() { 1 } else { 0 };
        if chars.get(zero_position) == Some(&'0') {
            chars.remove(zero_position);
        }
    }

    let mut pattern: String = chars.into_iter().collect();
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod conversion_test {
    use super::*;

    #[test]
    fn test_render_float() {
        assert_eq!(render_float(1.2345), "1.2345");
        assert_eq!(render_float(1.0), "1.0");
        assert_eq!(render_float(-0.2345), "-0.2345");
        assert_eq!(render_float(0.31212), "0.31212");
        assert_eq!(render_float(1e15), "1000000000000000.0");
        assert_eq!(render_float(1e16), "1e+16");
        assert_eq!(render_float(0.00001), "1e-05");
        assert_eq!(render_float(0.0001), "0.0001");
        assert_eq!(render_float(f64::NAN), "nan");
        assert_eq!(render_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_cast_varchar_pattern() {
        assert_eq!(float_to_string_for_adql_cast_varchar(1.2345, false), "1.234%");
        assert_eq!(float_to_string_for_adql_cast_varchar(1.2345, true), "1.234%");
        assert_eq!(float_to_string_for_adql_cast_varchar(0.2345, false), "0.234%");
        assert_eq!(float_to_string_for_adql_cast_varchar(0.2345, true), ".234%");
        assert_eq!(float_to_string_for_adql_cast_varchar(-0.2345, false), "-0.234%");
        assert_eq!(float_to_string_for_adql_cast_varchar(-0.2345, true), "-.234%");
    }

    #[test]
    fn test_cast_varchar_pattern_other_values() {
        assert_eq!(float_to_string_for_adql_cast_varchar(0.31212, true), ".3121%");
        assert_eq!(float_to_string_for_adql_cast_varchar(-12.5, true), "-12.%");
        assert_eq!(float_to_string_for_adql_cast_varchar(3.0, false), "3.%");
    }
}
