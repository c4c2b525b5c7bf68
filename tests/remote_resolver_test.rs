use anyhow::Result;
use httpmock::prelude::*;
use std::time::Duration;
use zipgate::{
    ChainResolver, CoordinateResolver, GateError, ProximityGate, Radius, RemoteResolver,
    ServiceAreaConfig, ServiceAreaEntry, ZipCode, ZipTable,
};

fn zippopotam_body(lat: &str, lon: &str) -> serde_json::Value {
    serde_json::json!({
        "post code": "10001",
        "country": "United States",
        "country abbreviation": "US",
        "places": [{
            "place name": "New York City",
            "longitude": lon,
            "state": "New York",
            "state abbreviation": "NY",
            "latitude": lat
        }]
    })
}

#[tokio::test]
async fn test_resolves_coordinates_from_remote_lookup() -> Result<()> {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path("/us/10001");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(zippopotam_body("40.7484", "-73.9967"));
        })
        .await;

    let resolver = RemoteResolver::new(server.url("/us/"), Duration::from_secs(2))?;
    let coordinate = resolver.resolve(&ZipCode::parse("10001")?).await?;

    lookup.assert_async().await;
    assert_eq!(coordinate.latitude, 40.7484);
    assert_eq!(coordinate.longitude, -73.9967);
    Ok(())
}

#[tokio::test]
async fn test_not_found_is_unknown_zip() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/us/00000");
            then.status(404).json_body(serde_json::json!({}));
        })
        .await;

    let resolver = RemoteResolver::new(server.url("/us"), Duration::from_secs(2))?;
    let err = resolver.resolve(&ZipCode::parse("00000")?).await.unwrap_err();

    assert!(matches!(err, GateError::UnknownZip { ref zip } if zip == "00000"));
    Ok(())
}

#[tokio::test]
async fn test_server_error_and_bad_body_degrade_to_unknown_zip() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/us/10001");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/us/90210");
            then.status(200)
                .json_body(zippopotam_body("not-a-number", "-118.4105"));
        })
        .await;

    let resolver = RemoteResolver::new(server.url("/us"), Duration::from_secs(2))?;

    for zip in ["10001", "90210"] {
        let err = resolver.resolve(&ZipCode::parse(zip)?).await.unwrap_err();
        assert!(matches!(err, GateError::UnknownZip { .. }), "zip {}", zip);
    }
    Ok(())
}

#[tokio::test]
async fn test_slow_lookup_times_out_as_unknown_zip() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/us/10001");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(zippopotam_body("40.7484", "-73.9967"));
        })
        .await;

    let resolver = RemoteResolver::new(server.url("/us"), Duration::from_millis(200))?;
    let err = resolver.resolve(&ZipCode::parse("10001")?).await.unwrap_err();

    assert!(matches!(err, GateError::UnknownZip { .. }));
    Ok(())
}

#[tokio::test]
async fn test_gate_with_table_then_remote_fallback() -> Result<()> {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path("/us/06902");
            then.status(200)
                .json_body(zippopotam_body("41.0534", "-73.5387"));
        })
        .await;

    let table = ZipTable::from_reader("zip,latitude,longitude\n10001,40.7484,-73.9967\n".as_bytes())?;
    let remote = RemoteResolver::new(server.url("/us"), Duration::from_secs(2))?;
    let gate = ProximityGate::new(ChainResolver::new().then(table).then(remote));

    let config = ServiceAreaConfig::from_entries(vec![ServiceAreaEntry::new(
        ZipCode::parse("10001")?,
        Radius::Forty,
    )]);

    let decision = gate.evaluate("06902", &config).await?;

    lookup.assert_async().await;
    assert!(decision.accepted);
    assert!((decision.distance_miles.unwrap() - 31.88).abs() < 0.1);
    Ok(())
}
