//! # Registry of the known TAP services
//!
//! [`TapService`] is the closed set of archives the crate talks to, and
//! [`ServiceRegistry`] maps each of them to an [`ArchiveService`] entry:
//!
//! | service  | endpoint                                          | drops leading zero on cast |
//! |----------|---------------------------------------------------|----------------------------|
//! | `nasa`   | `https://exoplanetarchive.ipac.caltech.edu/TAP`   | yes                        |
//! | `padc`   | `http://voparis-tap-planeto.obspm.fr/tap`         | no                         |
//! | `gaia`   | `https://gea.esac.esa.int/tap-server/tap`         | no                         |
//! | `simbad` | `http://simbad.cds.unistra.fr/simbad/sim-tap/sync`| CAST not supported         |
//!
//! The registry is built once and handed to the
//! [`ArchiveClient`](crate::tap::ArchiveClient); it is never mutated afterwards.
//! Endpoints can be overridden at construction time with
//! [`ServiceRegistry::with_endpoint`].
//!
//! The module also carries the NASA → PADC column mappings, which tell
//! stellar parameters apart from planetary ones.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::phab_errors::PhabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TapService {
    Nasa,
    Padc,
    Gaia,
    Simbad,
}

impl TapService {
    pub const ALL: [TapService; 4] = [
        TapService::Nasa,
        TapService::Padc,
        TapService::Gaia,
        TapService::Simbad,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TapService::Nasa => "nasa",
            TapService::Padc => "padc",
            TapService::Gaia => "gaia",
            TapService::Simbad => "simbad",
        }
    }
}

impl FromStr for TapService {
    type Err = PhabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TapService::ALL
            .into_iter()
            .find(|service| service.name() == s)
            .ok_or_else(|| PhabError::UnknownService(s.to_string()))
    }
}

impl fmt::Display for TapService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-service metadata.
///
/// # Fields
///
/// * `endpoint` - the TAP base URL, case-sensitive for some services
/// * `parameters_that_are_strings` - parameters compared as quoted literals
/// * `parameters_that_have_errors` - parameters with `NAMEerr1`/`NAMEerr2` error columns
/// * `drops_leading_zero_on_cast_to_varchar` - whether `CAST(0.123 AS VARCHAR)` gives `.123`;
///   `None` for services without `CAST` support
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveService {
    pub endpoint: Option<String>,
    pub parameters_that_are_strings: Vec<String>,
    pub parameters_that_have_errors: Vec<String>,
    pub drops_leading_zero_on_cast_to_varchar: Option<bool>,
}

impl ArchiveService {
    pub fn new(endpoint: &str) -> Self {
        ArchiveService {
            endpoint: Some(endpoint.to_string()),
            ..Default::default()
        }
    }

    pub fn is_string_parameter(&self, param: &str) -> bool {
        self.parameters_that_are_strings.iter().any(|p| p == param)
    }

    pub fn has_errors(&self, param: &str) -> bool {
        self.parameters_that_have_errors.iter().any(|p| p == param)
    }

    pub fn drops_leading_zero(&self) -> bool {
        self.drops_leading_zero_on_cast_to_varchar.unwrap_or(false)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRegistry {
    services: HashMap<TapService, ArchiveService>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        ServiceRegistry::empty()
            .with_service(
                TapService::Nasa,
                ArchiveService {
                    endpoint: Some("https://exoplanetarchive.ipac.caltech.edu/TAP".into()),
                    parameters_that_are_strings: strings(&["st_metratio", "st_spectype"]),
                    parameters_that_have_errors: strings(&[
                        "period",
                        "pl_massj",
                        "pl_orbper",
                        "pl_orbsmax",
                        "pl_radj",
                        "semi_major_axis",
                    ]),
                    drops_leading_zero_on_cast_to_varchar: Some(true),
                },
            )
            .with_service(
                TapService::Padc,
                ArchiveService {
                    drops_leading_zero_on_cast_to_varchar: Some(false),
                    ..ArchiveService::new("http://voparis-tap-planeto.obspm.fr/tap")
                },
            )
            .with_service(
                TapService::Gaia,
                ArchiveService {
                    drops_leading_zero_on_cast_to_varchar: Some(false),
                    ..ArchiveService::new("https://gea.esac.esa.int/tap-server/tap")
                },
            )
            .with_service(
                TapService::Simbad,
                ArchiveService::new("http://simbad.cds.unistra.fr/simbad/sim-tap/sync"),
            )
    }
}

impl ServiceRegistry {
    pub fn empty() -> Self {
        ServiceRegistry {
            services: HashMap::new(),
        }
    }

    pub fn with_service(mut self, service: TapService, entry: ArchiveService) -> Self {
        self.services.insert(service, entry);
        self
    }

    /// Replace the endpoint of a service, registering it if needed.
    pub fn with_endpoint(mut self, service: TapService, endpoint: &str) -> Self {
        self.services.entry(service).or_default().endpoint = Some(endpoint.to_string());
        self
    }

    pub fn get(&self, service: TapService) -> Result<&ArchiveService, PhabError> {
        self.services
            .get(&service)
            .ok_or_else(|| PhabError::UnknownService(service.name().to_string()))
    }

    /// The endpoint of a registered service.
    ///
    /// Return
    /// ------
    /// * the endpoint URL
    /// * [`PhabError::UnknownService`] if the service is not registered,
    ///   [`PhabError::ServiceHasNoEndpoint`] if it has no endpoint
    pub fn endpoint(&self, service: TapService) -> Result<&str, PhabError> {
        self.get(service)?
            .endpoint
            .as_deref()
            .ok_or_else(|| PhabError::ServiceHasNoEndpoint(service.name().to_string()))
    }

    /// Get a TAP service endpoint by the service name (`nasa`, `padc`, `gaia`, `simbad`).
    pub fn get_service_endpoint(&self, name: &str) -> Result<&str, PhabError> {
        self.endpoint(name.parse()?)
    }
}

/// NASA `ps` columns of planetary parameters and their PADC `exoplanet.epn_core` counterparts.
pub const NASA_TO_PADC_PLANETS: &[(&str, &str)] = &[
    ("ima_flag", "ima_flag"),
    ("pl_massj", "mass"),
    ("pl_massjerr1", "mass_error_max"),
    ("pl_massjerr2", "mass_error_min"),
    ("pl_massjlim", "pl_massjlim"),
    ("pl_name", "granule_uid"),
    ("pl_orbeccen", "eccentricity"),
    ("pl_orbincl", "inclination"),
    ("pl_orbper", "period"),
    ("pl_orbpererr1", "period_error_max"),
    ("pl_orbpererr2", "period_error_min"),
    ("pl_orbperlim", "pl_orbperlim"),
    ("pl_orbsmax", "semi_major_axis"),
    ("pl_orbsmaxerr1", "semi_major_axis_error_max"),
    ("pl_orbsmaxerr2", "semi_major_axis_error_min"),
    ("pl_orbsmaxlim", "pl_orbsmaxlim"),
    ("pl_radj", "radius"),
    ("pl_radjerr1", "radius_error_max"),
    ("pl_radjerr2", "radius_error_min"),
    ("pl_radjlim", "pl_radjlim"),
    ("rv_flag", "rv_flag"),
    ("tran_flag", "tran_flag"),
    ("ttv_flag", "ttv_flag"),
];

/// NASA `ps` columns of stellar parameters and their PADC counterparts.
pub const NASA_TO_PADC_STARS: &[(&str, &str)] = &[
    ("cb_flag", "cb_flag"),
    ("hostname", "star_name"),
    ("ra", "ra"),
    ("st_age", "star_age"),
    ("st_lum", "st_lum"),
    ("st_mass", "star_mass"),
    ("st_met", "star_metallicity"),
    ("st_metratio", "st_metratio"),
    ("st_rad", "star_radius"),
    ("st_rotp", "st_rotp"),
    ("st_spectype", "star_spec_type"),
    ("st_teff", "star_teff"),
    ("sy_dist", "sy_dist"),
    ("sy_pnum", "sy_pnum"),
    ("sy_snum", "sy_snum"),
];

/// Whether a NASA parameter belongs to the host star rather than to the planet.
pub fn is_nasa_stellar_parameter(param: &str) -> bool {
    NASA_TO_PADC_STARS.iter().any(|(nasa, _)| *nasa == param)
}

/// The PADC column matching a NASA column, if any.
pub fn nasa_to_padc(param: &str) -> Option<&'static str> {
    NASA_TO_PADC_PLANETS
        .iter()
        .chain(NASA_TO_PADC_STARS)
        .find(|(nasa, _)| *nasa == param)
        .map(|(_, padc)| *padc)
}
