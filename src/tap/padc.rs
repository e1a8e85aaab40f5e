//! PADC (`exoplanet.epn_core`) lookups.
//!
//! PADC keeps a single row per planet, keyed by `granule_uid`, so there is no
//! publication ordering to deal with. Errors live in the
//! `PARAM_error_min` / `PARAM_error_max` columns.
use crate::datasets::Value;
use crate::phab_errors::PhabError;

use super::{ArchiveClient, TapService};

/// A parameter of a planet in PADC.
pub fn get_parameter_from_padc(
    client: &ArchiveClient,
    planet_name: &str,
    param: &str,
) -> Result<Option<Value>, PhabError> {
    let query = format!(
        "SELECT {param} FROM exoplanet.epn_core WHERE granule_uid = '{planet_name}' AND {param} IS NOT NULL"
    );

    let outcome = client.query_service(TapService::Padc, &query)?;
    Ok(outcome
        .rows()
        .and_then(|rows| rows.first())
        .and_then(|row| row.get(param))
        .filter(|value| !value.is_missing())
        .cloned())
}

/// Errors of a planet parameter in PADC, as `(PARAM_error_min, PARAM_error_max)`.
pub fn get_parameter_errors_from_padc(
    client: &ArchiveClient,
    planet_name: &str,
    param: &str,
) -> Result<(Option<Value>, Option<Value>), PhabError> {
    let err_min = get_parameter_from_padc(client, planet_name, &format!("{param}_error_min"))?;
    let err_max = get_parameter_from_padc(client, planet_name, &format!("{param}_error_max"))?;
    Ok((err_min, err_max))
}

#[cfg(test)]
mod padc_test {
    use std::rc::Rc;

    use super::*;
    use crate::tap::test_transport::ScriptedTransport;
    use crate::tap::ServiceRegistry;

    #[test]
    fn test_parameter_from_padc() {
        let transport = ScriptedTransport::new();
        transport.push_rows("mass\n0.0069\n");
        transport.push_rows("eccentricity\n");
        let client = ArchiveClient::new(ServiceRegistry::default(), Rc::clone(&transport));

        assert_eq!(
            get_parameter_from_padc(&client, "Kepler-11 b", "mass").unwrap(),
            Some(Value::Float(0.0069))
        );
        assert_eq!(
            get_parameter_from_padc(&client, "Kepler-11 b", "eccentricity").unwrap(),
            None
        );
        assert_eq!(
            transport.queries()[0],
            "SELECT mass FROM exoplanet.epn_core WHERE granule_uid = 'Kepler-11 b' AND mass IS NOT NULL"
        );
        let (endpoint, _) = transport.queries.borrow()[0].clone();
        assert_eq!(endpoint, "http://voparis-tap-planeto.obspm.fr/tap");
    }

    #[test]
    fn test_errors_from_padc() {
        let transport = ScriptedTransport::new();
        transport.push_rows("mass_error_min\n0.001\n");
        transport.push_rows("mass_error_max\n0.002\n");
        let client = ArchiveClient::new(ServiceRegistry::default(), Rc::clone(&transport));

        assert_eq!(
            get_parameter_errors_from_padc(&client, "Kepler-11 b", "mass").unwrap(),
            (Some(Value::Float(0.001)), Some(Value::Float(0.002)))
        );
        assert!(transport.queries()[1].starts_with("SELECT mass_error_max FROM"));
    }
}
