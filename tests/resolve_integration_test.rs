use httpmock::prelude::*;
use std::time::Duration;
use twin_resolver::{ModelParser, ModelRepositoryClient, ModelResolver, ResolveError};

fn thermostat_doc() -> serde_json::Value {
    serde_json::json!({
        "@context": "dtmi:dtdl:context;2",
        "@id": "dtmi:com:example:Thermostat;1",
        "@type": "Interface",
        "displayName": "Thermostat",
        "extends": ["dtmi:com:example:BaseDevice;1"],
        "contents": [
            {
                "@type": ["Telemetry", "Temperature"],
                "name": "temp",
                "schema": "integer",
                "displayName": { "en": "Temperature" },
                "unit": "degreeCelsius"
            },
            {
                "@type": "Telemetry",
                "name": "humidity",
                "schema": "double"
            },
            {
                "@type": "Command",
                "name": "reboot"
            },
            {
                "@type": "Command",
                "name": "setTarget",
                "displayName": "Set Target",
                "description": { "en": "Sets the target temperature" },
                "request": { "name": "target", "schema": "double" }
            },
            {
                "@type": "Component",
                "name": "deviceInfo",
                "schema": "dtmi:com:example:DeviceInformation;1"
            }
        ]
    })
}

fn base_device_doc() -> serde_json::Value {
    serde_json::json!({
        "@id": "dtmi:com:example:BaseDevice;1",
        "@type": "Interface",
        "contents": [
            { "@type": "Telemetry", "name": "uptime", "schema": "long" }
        ]
    })
}

fn device_info_doc() -> serde_json::Value {
    serde_json::json!({
        "@id": "dtmi:com:example:DeviceInformation;1",
        "@type": "Interface",
        "contents": [
            { "@type": "Property", "name": "manufacturer", "schema": "string" }
        ]
    })
}

fn mock_repository(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/dtmi/com/example/thermostat-1.json");
        then.status(200).json_body(thermostat_doc());
    });
    server.mock(|when, then| {
        when.method(GET).path("/dtmi/com/example/basedevice-1.json");
        then.status(200).json_body(base_device_doc());
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/dtmi/com/example/deviceinformation-1.json");
        then.status(200).json_body(device_info_doc());
    });
}

fn resolver_for(server: &MockServer, token: Option<&str>) -> ModelResolver<ModelRepositoryClient> {
    let repository = ModelRepositoryClient::new(
        server.base_url(),
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .unwrap();
    ModelResolver::new(repository)
}

#[tokio::test]
async fn test_end_to_end_resolution_with_dependencies() {
    let server = MockServer::start();
    mock_repository(&server);

    let resolver = resolver_for(&server, None);
    let description = resolver
        .describe("dtmi:com:example:Thermostat;1")
        .await
        .unwrap();

    // Root and extended-interface telemetry, in graph order.
    let names: Vec<&str> = description
        .telemetry
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["temp", "humidity", "uptime"]);

    assert_eq!(
        description.telemetry[0].display_name.as_deref(),
        Some("Temperature")
    );
    assert_eq!(description.telemetry[0].unit.as_deref(), Some("°C"));
    assert_eq!(description.telemetry[0].data_type, "Long");
    assert_eq!(description.telemetry[1].display_name, None);
    assert_eq!(description.telemetry[1].data_type, "Double");

    assert_eq!(description.commands.len(), 2);
    assert_eq!(description.commands[0].name, "reboot");
    assert_eq!(description.commands[0].display_name, None);
    assert_eq!(description.commands[0].request_name, None);
    assert_eq!(description.commands[1].name, "setTarget");
    assert_eq!(
        description.commands[1].display_name.as_deref(),
        Some("Set Target")
    );
    assert_eq!(description.commands[1].request_name.as_deref(), Some("target"));
    assert_eq!(description.commands[1].request_kind.as_deref(), Some("Double"));
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let server = MockServer::start();
    mock_repository(&server);

    let resolver = resolver_for(&server, None);
    let first = resolver
        .describe("dtmi:com:example:Thermostat;1")
        .await
        .unwrap();
    let second = resolver
        .describe("dtmi:com:example:Thermostat;1")
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_auth_token_reaches_repository() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/dtmi/com/example/basedevice-1.json")
            .header("Authorization", "token secret123");
        then.status(200).json_body(base_device_doc());
    });

    let resolver = resolver_for(&server, Some("secret123"));
    resolver
        .describe("dtmi:com:example:BaseDevice;1")
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_missing_dependency_fails_resolution() {
    let server = MockServer::start();
    // Root is served, but its extends target is not.
    server.mock(|when, then| {
        when.method(GET).path("/dtmi/com/example/thermostat-1.json");
        then.status(200).json_body(thermostat_doc());
    });
    server.mock(|when, then| {
        when.method(GET).path("/dtmi/com/example/basedevice-1.json");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/dtmi/com/example/deviceinformation-1.json");
        then.status(200).json_body(device_info_doc());
    });

    let resolver = resolver_for(&server, None);
    let err = resolver
        .describe("dtmi:com:example:Thermostat;1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::UnresolvedReference { dtmi } if dtmi == "dtmi:com:example:BaseDevice;1"
    ));
}

#[tokio::test]
async fn test_unknown_root_model_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404);
    });

    let resolver = resolver_for(&server, None);
    let err = resolver
        .describe("dtmi:com:example:Nope;1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::UnresolvedReference { dtmi } if dtmi == "dtmi:com:example:Nope;1"
    ));
}

#[tokio::test]
async fn test_depth_cap_applies_end_to_end() {
    let server = MockServer::start();
    mock_repository(&server);

    let repository = ModelRepositoryClient::new(server.base_url(), None, Duration::from_secs(5))
        .unwrap();
    let resolver =
        ModelResolver::with_parser(repository, ModelParser::new().with_max_depth(0));

    let err = resolver
        .describe("dtmi:com:example:Thermostat;1")
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::DepthCapExceeded { cap: 0 }));
}
