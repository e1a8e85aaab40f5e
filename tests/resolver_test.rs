mod common;

use common::{mock_client, MockTap};
use phab::datasets::Value;
use phab::phab_errors::PhabError;
use phab::simbad::parameters::{fetch_latest_parameter, SimbadObjectKey};
use phab::simbad::{IdentifierResolver, ResolverConfig};
use phab::tap::nasa::{get_planetary_parameter_reference_from_nasa, ReferenceLookup};

#[test]
fn test_resolve_then_fetch_latest_period() {
    let tap = MockTap::new();
    tap.rows("oid\n")
        .rows("id\nPPM 725297\nV* AU Mic\nHD 197481\n")
        .rows("oid\n")
        .rows("oid\n1575544\n")
        .rows("period,bibcode\n4.86,2021A&A...649A.177M\n");
    let client = mock_client(&tap);
    let resolver = IdentifierResolver::new(&client);

    let oid = resolver.get_object_id("PPM 725297").unwrap().unwrap();
    assert_eq!(oid, 1575544);
    // PPM 725297 is skipped, V* AU Mic and HD 197481 are looked up
    assert_eq!(tap.queries().len(), 4);

    let key = SimbadObjectKey::from_options(None, Some(oid)).unwrap();
    let record = fetch_latest_parameter(&client, &key, "mesVar", "period")
        .unwrap()
        .unwrap();
    assert_eq!(record.value, Value::Float(4.86));
    assert_eq!(record.reference.as_deref(), Some("2021A&A...649A.177M"));
}

#[test]
fn test_fallback_is_the_last_resort() {
    let tap = MockTap::new();
    tap.rows("oid\n")
        .rows("id\nCD-44 1173\nCPD-44 301\n")
        .rows("oid\n")
        .rows("oid\n")
        .rows("oid\n")
        .rows("oid\n")
        .rows("oid\n");
    let client = mock_client(&tap);
    let resolver = IdentifierResolver::with_config(
        &client,
        ResolverConfig::new(&["cd", "cpd"], true, false),
    );

    assert_eq!(resolver.get_object_id("HIP 17764").unwrap(), None);
    let queries = tap.queries();
    // one name lookup, the alias list, then exact + LIKE for both aliases
    assert_eq!(queries.len(), 6);
    assert_eq!(
        queries[3],
        "SELECT TOP 1 oid FROM basic WHERE main_id LIKE 'CD-44 1173%'"
    );
    assert_eq!(tap.remaining(), 1);
}

#[test]
fn test_rejected_twice_is_fatal() {
    let tap = MockTap::new();
    tap.reject("first").reject("second");
    let client = mock_client(&tap);
    let resolver = IdentifierResolver::new(&client);

    assert!(matches!(
        resolver.get_object_id("Barnard's Star"),
        Err(PhabError::QueryRejected { .. })
    ));
}

#[test]
fn test_nasa_reference_of_a_rounded_double() {
    let tap = MockTap::new();
    tap.rows("pl_refname\n").rows(
        "pl_refname\n\"<a refstr=STASSUN_ET_AL__2017 href=https://ui.adsabs.harvard.edu/abs/2017AJ....153..136S/abstract target=ref>Stassun et al. 2017</a>\"\n",
    );
    let client = mock_client(&tap);

    let reference = get_planetary_parameter_reference_from_nasa(
        &client,
        "HD 209458 b",
        "pl_orbsmax",
        &Value::Float(1.2345),
        ReferenceLookup {
            parameter_is_double: true,
            ..ReferenceLookup::default()
        },
    )
    .unwrap();

    assert_eq!(reference.as_deref(), Some("2017AJ....153..136S"));
    assert!(tap.queries()[1].contains("CAST(pl_orbsmax AS VARCHAR(6)) LIKE '1.234%'"));
}
