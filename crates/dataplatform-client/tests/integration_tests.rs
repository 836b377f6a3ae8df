//! Integration tests for dataplatform-client
//!
//! These tests serve a mock platform from an in-process axum server and drive
//! it with the blocking client, including the pre-signed transfer links.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::net::TcpListener;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use dataplatform_client::testing::{init_tracing, TestServer};
use dataplatform_client::{
    DataPlatformError, Decoder, DownloadRequest, EventQuery, ImportQuery, JsonDecoder,
    OutputFormat, SizeCallback, SortOrder,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// =============================================================================
// Fixtures
// =============================================================================

type Captured<T> = Arc<Mutex<Vec<T>>>;

fn captured<T>() -> Captured<T> {
    Arc::new(Mutex::new(Vec::new()))
}

fn device_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "serialNumber": format!("SN-{}", id),
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-02T00:00:00.000Z"
    })
}

/// MCAP container with one channel per `(topic, schema encoding, payload)`
fn container(records: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = mcap::Writer::new(&mut cursor).unwrap();
        for (sequence, (topic, encoding, payload)) in records.iter().enumerate() {
            let (schema_name, schema_data): (String, &[u8]) = match *encoding {
                "ros1msg" => ("std_msgs/String".to_string(), b"string data"),
                _ => (format!("Reading{}", sequence), br#"{"type":"object"}"#),
            };
            let schema_id = writer
                .add_schema(&schema_name, encoding, schema_data)
                .unwrap();
            let message_encoding = if *encoding == "jsonschema" { "json" } else { "ros1" };
            let channel_id = writer
                .add_channel(schema_id, topic, message_encoding, &BTreeMap::new())
                .unwrap();
            writer
                .write_to_known_channel(
                    &mcap::records::MessageHeader {
                        channel_id,
                        sequence: sequence as u32,
                        log_time: 1_000 + sequence as u64,
                        publish_time: 1_000 + sequence as u64,
                    },
                    payload,
                )
                .unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// MCAP container holding a single ros1msg schema and one message
#[cfg(feature = "ros1")]
fn ros1_container(schema_name: &str, definition: &str, payload: &[u8]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = mcap::Writer::new(&mut cursor).unwrap();
        let schema_id = writer
            .add_schema(schema_name, "ros1msg", definition.as_bytes())
            .unwrap();
        let channel_id = writer
            .add_channel(schema_id, "/value", "ros1", &BTreeMap::new())
            .unwrap();
        writer
            .write_to_known_channel(
                &mcap::records::MessageHeader {
                    channel_id,
                    sequence: 0,
                    log_time: 1_000,
                    publish_time: 1_000,
                },
                payload,
            )
            .unwrap();
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

fn json_only() -> HashMap<String, Arc<dyn Decoder>> {
    [(
        "jsonschema".to_string(),
        Arc::new(JsonDecoder) as Arc<dyn Decoder>,
    )]
    .into()
}

/// Serves `/v1/data/stream` handing out a link to `/signed/data`, which
/// streams `chunks` as separate body frames
fn download_server(chunks: Vec<&'static [u8]>, requests: Captured<Value>) -> TestServer {
    TestServer::start_with(move |base| {
        let link = format!("{}/signed/data", base);
        Router::new()
            .route(
                "/v1/data/stream",
                post(move |Json(body): Json<Value>| async move {
                    requests.lock().push(body);
                    Json(json!({ "link": link }))
                }),
            )
            .route(
                "/signed/data",
                get(move |headers: HeaderMap| async move {
                    if headers.contains_key(header::AUTHORIZATION) {
                        return (StatusCode::BAD_REQUEST, Body::from("unexpected credentials"));
                    }
                    let frames = chunks
                        .into_iter()
                        .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c)));
                    (StatusCode::OK, Body::from_stream(futures::stream::iter(frames)))
                }),
            )
    })
    .unwrap()
}

// =============================================================================
// Response Unwrapping
// =============================================================================

#[test]
fn test_not_found_uses_server_message() {
    init_tracing();
    let router = Router::new().route(
        "/v1/devices/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "device not found" })),
            )
        })
        .delete(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "device not found" })),
            )
        }),
    );
    let server = TestServer::start(router).unwrap();
    let client = server.client().unwrap();

    let err = client.get_device("missing").unwrap_err();
    assert_eq!(err.to_string(), "device not found");
    assert_eq!(err.status(), Some(404));

    let err = client.delete_device("missing").unwrap_err();
    assert_eq!(err.to_string(), "device not found");
}

#[test]
fn test_server_error_uses_reason_phrase() {
    let router = Router::new().route(
        "/v1/devices",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "database exploded" })),
            )
        }),
    );
    let server = TestServer::start(router).unwrap();

    let err = server.client().unwrap().get_devices().unwrap_err();
    assert_eq!(err.to_string(), "Internal Server Error");
    assert_eq!(err.status(), Some(500));
}

#[test]
fn test_non_json_body_is_unexpected_format() {
    let router = Router::new().route("/v1/devices", get(|| async { "<html>ok</html>" }));
    let server = TestServer::start(router).unwrap();

    let err = server.client().unwrap().get_devices().unwrap_err();
    assert!(matches!(
        err,
        DataPlatformError::UnexpectedFormat { status: 200, .. }
    ));
}

#[test]
fn test_bearer_token_sent_to_api() {
    let seen = captured::<Option<String>>();
    let sink = seen.clone();
    let router = Router::new().route(
        "/v1/devices",
        get(move |headers: HeaderMap| async move {
            sink.lock().push(
                headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            );
            Json(json!([device_json("dev_1", "rover")]))
        }),
    );
    let server = TestServer::start(router).unwrap();

    let devices = server.client().unwrap().get_devices().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].serial_number, "SN-dev_1");
    assert_eq!(seen.lock()[0].as_deref(), Some("Bearer test-token"));
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn test_get_events_timestamp_and_params() {
    let params = captured::<HashMap<String, String>>();
    let sink = params.clone();
    let router = Router::new().route(
        "/beta/device-events",
        get(move |Query(query): Query<HashMap<String, String>>| async move {
            sink.lock().push(query);
            Json(json!([{
                "id": "evt_1",
                "deviceId": "dev_1",
                "timestampNanos": "1500000000",
                "durationNanos": "250",
                "metadata": { "kind": "stop" },
                "createdAt": "2024-01-01T00:00:00.000Z",
                "updatedAt": "2024-01-01T00:00:00.000Z"
            }]))
        }),
    );
    let server = TestServer::start(router).unwrap();

    let query = EventQuery::for_device_name("rover")
        .sort("created_at", SortOrder::Desc)
        .page(10, 0)
        .metadata("kind", "stop");
    let events = server.client().unwrap().get_events(&query).unwrap();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.timestamp, Utc.timestamp_opt(1, 500_000_000).unwrap());
    assert_eq!(event.timestamp_nanos, 1_500_000_000);
    assert_eq!(event.duration_nanos, 250);

    let params = params.lock();
    let expected: HashMap<String, String> = [
        ("deviceName", "rover"),
        ("sortBy", "createdAt"),
        ("sortOrder", "desc"),
        ("limit", "10"),
        ("key", "kind"),
        ("value", "stop"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(params[0], expected);
}

#[test]
fn test_get_events_without_device_sends_nothing() {
    let hits = captured::<()>();
    let sink = hits.clone();
    let router = Router::new().route(
        "/beta/device-events",
        get(move || async move {
            sink.lock().push(());
            Json(json!([]))
        }),
    );
    let server = TestServer::start(router).unwrap();

    let err = server
        .client()
        .unwrap()
        .get_events(&EventQuery::default())
        .unwrap_err();
    assert!(matches!(err, DataPlatformError::InvalidArgument(_)));
    assert!(hits.lock().is_empty());
}

#[test]
fn test_create_and_delete_event() {
    let bodies = captured::<Value>();
    let sink = bodies.clone();
    let router = Router::new()
        .route(
            "/beta/device-events",
            post(move |Json(body): Json<Value>| async move {
                sink.lock().push(body.clone());
                Json(json!({
                    "id": "evt_9",
                    "deviceId": body["deviceId"],
                    "timestampNanos": "1700000000000000000",
                    "durationNanos": body["durationNanos"],
                    "metadata": body["metadata"],
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z"
                }))
            }),
        )
        .route(
            "/beta/device-events/{id}",
            delete(|| async { Json(json!({})) }),
        );
    let server = TestServer::start(router).unwrap();
    let client = server.client().unwrap();

    let time = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let metadata: HashMap<String, String> = [("run".to_string(), "7".to_string())].into();
    let event = client.create_event("dev_1", time, 5_000, &metadata).unwrap();

    assert_eq!(event.id, "evt_9");
    assert_eq!(event.duration_nanos, 5_000);
    assert_eq!(event.metadata, metadata);

    let body = &bodies.lock()[0];
    assert_eq!(body["durationNanos"], "5000");
    assert_eq!(body["timestamp"], "2023-11-14T22:13:20+00:00");

    client.delete_event("evt_9").unwrap();
}

// =============================================================================
// Devices, Imports, Topics, Coverage
// =============================================================================

#[test]
fn test_create_device() {
    let router = Router::new().route(
        "/v1/devices",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "id": "dev_2",
                "name": body["name"],
                "serialNumber": body["serialNumber"]
            }))
        }),
    );
    let server = TestServer::start(router).unwrap();

    let device = server
        .client()
        .unwrap()
        .create_device("rover", "SN-42")
        .unwrap();
    assert_eq!(device.id, "dev_2");
    assert_eq!(device.name, "rover");
    assert_eq!(device.serial_number, "SN-42");
}

#[test]
fn test_imports() {
    let params = captured::<HashMap<String, String>>();
    let list_sink = params.clone();
    let delete_sink = params.clone();
    let router = Router::new()
        .route(
            "/v1/data/imports",
            get(move |Query(query): Query<HashMap<String, String>>| async move {
                list_sink.lock().push(query);
                Json(json!([{
                    "importId": "imp_1",
                    "deviceId": "dev_1",
                    "importTime": "2024-01-03T00:00:00Z",
                    "start": "2024-01-01T00:00:00Z",
                    "end": "2024-01-02T00:00:00Z",
                    "metadata": { "source": "test" },
                    "inputType": "mcap0",
                    "outputType": "mcap0",
                    "filename": "run.mcap",
                    "inputSize": 1024,
                    "totalOutputSize": 2048
                }]))
            }),
        )
        .route(
            "/v1/data/imports/{id}",
            delete(
                move |Query(query): Query<HashMap<String, String>>| async move {
                    delete_sink.lock().push(query);
                    Json(json!({}))
                },
            ),
        );
    let server = TestServer::start(router).unwrap();
    let client = server.client().unwrap();

    let imports = client.get_imports(&ImportQuery::for_device("dev_1")).unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].filename, "run.mcap");
    assert_eq!(imports[0].total_output_size, 2048);
    assert_eq!(imports[0].metadata["source"], "test");

    let query = ImportQuery {
        include_deleted: true,
        filename: Some("run".to_string()),
        ..ImportQuery::for_device("dev_1")
    };
    client.get_imports(&query).unwrap();
    client.delete_import("dev_1", "imp_1").unwrap();

    let params = params.lock();
    // includeDeleted=false is dropped
    assert_eq!(params[0].len(), 1);
    assert_eq!(params[1].get("includeDeleted").map(String::as_str), Some("true"));
    assert_eq!(params[1].get("filename").map(String::as_str), Some("run"));
    assert_eq!(params[2].get("deviceId").map(String::as_str), Some("dev_1"));
}

#[test]
fn test_topics_and_coverage() {
    let params = captured::<HashMap<String, String>>();
    let topics_sink = params.clone();
    let coverage_sink = params.clone();
    let router = Router::new()
        .route(
            "/v1/data/topics",
            get(move |Query(query): Query<HashMap<String, String>>| async move {
                topics_sink.lock().push(query);
                Json(json!([{
                    "topic": "/imu",
                    "version": "1",
                    "encoding": "ros1",
                    "schemaEncoding": "ros1msg",
                    "schemaName": "sensor_msgs/Imu"
                }]))
            }),
        )
        .route(
            "/v1/data/coverage",
            get(move |Query(query): Query<HashMap<String, String>>| async move {
                coverage_sink.lock().push(query);
                Json(json!([{
                    "deviceId": "dev_1",
                    "start": "2024-01-01T00:00:00Z",
                    "end": "2024-01-01T01:00:00Z"
                }]))
            }),
        );
    let server = TestServer::start(router).unwrap();
    let client = server.client().unwrap();

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

    let topics = client.get_topics("dev_1", start, end).unwrap();
    assert_eq!(topics[0].schema_name, "sensor_msgs/Imu");

    let coverage = client.get_coverage(start, end, None, Some(0)).unwrap();
    assert_eq!(coverage[0].end - coverage[0].start, chrono::Duration::hours(1));

    let params = params.lock();
    assert_eq!(
        params[0].get("includeSchemas").map(String::as_str),
        Some("false")
    );
    assert_eq!(
        params[0].get("start").map(String::as_str),
        Some("2024-01-01T00:00:00+00:00")
    );
    // Absent device and zero tolerance are dropped
    assert!(!params[1].contains_key("deviceId"));
    assert!(!params[1].contains_key("tolerance"));
}

// =============================================================================
// Transfers
// =============================================================================

#[test]
fn test_download_streams_chunks_with_progress() {
    init_tracing();
    let requests = captured::<Value>();
    let server = download_server(vec![b"hello ", b"world"], requests.clone());
    let client = server.client().unwrap();

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
    let request = DownloadRequest::new("dev_1", start, end);

    let mut reported = Vec::new();
    let mut progress = |bytes: u64| reported.push(bytes);
    let data = client.download_data(&request, Some(&mut progress)).unwrap();

    assert_eq!(&data[..], b"hello world");
    assert!(!reported.is_empty());
    assert!(reported.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(reported.last(), Some(&11));

    let body = &requests.lock()[0];
    assert_eq!(body["deviceId"], "dev_1");
    assert_eq!(body["outputFormat"], "mcap0");
    assert_eq!(body["start"], "2024-01-01T00:00:00+00:00");
    assert!(body.get("topics").is_none());
}

#[test]
fn test_download_sends_topics_and_format() {
    let requests = captured::<Value>();
    let server = download_server(vec![b"bag"], requests.clone());

    let now = Utc::now();
    let request = DownloadRequest::new("dev_1", now, now)
        .topics(["/imu", "/gps"])
        .output_format(OutputFormat::Bag);
    let data = server
        .client()
        .unwrap()
        .download_data(&request, None)
        .unwrap();

    assert_eq!(&data[..], b"bag");
    let body = &requests.lock()[0];
    assert_eq!(body["outputFormat"], "bag1");
    assert_eq!(body["topics"], json!(["/imu", "/gps"]));
}

#[test]
fn test_download_link_error_fails() {
    let server = TestServer::start_with(|base| {
        let link = format!("{}/signed/expired", base);
        Router::new()
            .route(
                "/v1/data/stream",
                post(move || async move { Json(json!({ "link": link })) }),
            )
            .route(
                "/signed/expired",
                get(|| async { (StatusCode::FORBIDDEN, "expired") }),
            )
    })
    .unwrap();

    let now = Utc::now();
    let err = server
        .client()
        .unwrap()
        .download_data(&DownloadRequest::new("dev_1", now, now), None)
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[test]
fn test_download_with_oversized_content_length_fails() {
    // Announces a petabyte body, sends a few bytes, then hangs up
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let signed = format!("http://{}/signed/huge", listener.local_addr().unwrap());
    let responder = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut byte = [0u8; 1];
        while !request.ends_with(b"\r\n\r\n") && stream.read(&mut byte).unwrap() == 1 {
            request.push(byte[0]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1125899906842624\r\n\r\nhello")
            .unwrap();
    });

    let server = TestServer::start(Router::new().route(
        "/v1/data/stream",
        post(move || async move { Json(json!({ "link": signed })) }),
    ))
    .unwrap();

    let now = Utc::now();
    let result = server
        .client()
        .unwrap()
        .download_data(&DownloadRequest::new("dev_1", now, now), None);
    assert!(result.is_err());
    responder.join().unwrap();
}

/// Serves an upload link whose PUT answers with `status`
fn upload_server(status: StatusCode, received: Captured<(Option<String>, Bytes)>) -> TestServer {
    TestServer::start_with(move |base| {
        let link = format!("{}/signed/upload", base);
        Router::new()
            .route(
                "/v1/data/upload",
                post(move |Json(body): Json<Value>| async move {
                    assert_eq!(body["filename"], "run.mcap");
                    Json(json!({ "link": link }))
                }),
            )
            .route(
                "/signed/upload",
                put(move |headers: HeaderMap, body: Bytes| async move {
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    received.lock().push((content_type, body));
                    (status, "stored")
                }),
            )
    })
    .unwrap()
}

fn recording_callback() -> (SizeCallback, Captured<(u64, u64)>) {
    let calls = captured();
    let sink = calls.clone();
    let callback: SizeCallback = Box::new(move |size, progress| sink.lock().push((size, progress)));
    (callback, calls)
}

#[test]
fn test_upload_bytes_with_progress() {
    let received = captured();
    let server = upload_server(StatusCode::OK, received.clone());
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    let (callback, calls) = recording_callback();
    let result = server
        .client()
        .unwrap()
        .upload_data("dev_1", "run.mcap", payload.clone(), Some(callback))
        .unwrap();

    assert_eq!(result.code, 200);
    assert_eq!(result.text, "stored");
    assert!(result.link.ends_with("/signed/upload"));

    let received = received.lock();
    assert_eq!(
        received[0].0.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(received[0].1.as_ref(), payload.as_slice());
    assert_eq!(calls.lock().last(), Some(&(200_000, 200_000)));
}

#[test]
fn test_upload_error_status_is_returned() {
    let server = upload_server(StatusCode::FORBIDDEN, captured());

    let result = server
        .client()
        .unwrap()
        .upload_data("dev_1", "run.mcap", &b"data"[..], None)
        .unwrap();
    assert_eq!(result.code, 403);
    assert_eq!(result.text, "stored");
}

#[test]
fn test_upload_from_file() {
    let received = captured();
    let server = upload_server(StatusCode::OK, received.clone());

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&[9u8; 70_000]).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let (callback, calls) = recording_callback();
    let result = server
        .client()
        .unwrap()
        .upload_data("dev_1", "run.mcap", file, Some(callback))
        .unwrap();

    assert_eq!(result.code, 200);
    assert_eq!(received.lock()[0].1.len(), 70_000);
    assert_eq!(calls.lock().last(), Some(&(70_000, 70_000)));
}

// =============================================================================
// Message Decoding
// =============================================================================

#[test]
fn test_decode_stops_at_unregistered_encoding() {
    let data = container(&[
        ("/a", "jsonschema", br#"{"n":1}"#),
        ("/b", "jsonschema", br#"{"n":2}"#),
        ("/c", "ros1msg", b"\x02\x00\x00\x00hi"),
    ]);
    let client = dataplatform_client::DataPlatformClient::new("token")
        .unwrap()
        .with_decoders(json_only());

    let mut messages = client.decode_messages(&data).unwrap();

    let first = messages.next().unwrap().unwrap();
    assert_eq!(first.topic, "/a");
    assert_eq!(first.decoded, json!({ "n": 1 }));

    let second = messages.next().unwrap().unwrap();
    assert_eq!(second.topic, "/b");
    assert_eq!(second.decoded, json!({ "n": 2 }));
    assert_eq!(second.message.sequence, 1);

    match messages.next() {
        Some(Err(DataPlatformError::NoDecoder { encoding })) => assert_eq!(encoding, "ros1msg"),
        other => panic!("expected missing decoder, got {:?}", other.map(|r| r.is_ok())),
    }
    assert!(messages.next().is_none());
}

#[test]
fn test_get_messages_downloads_and_decodes() {
    let data = container(&[
        ("/a", "jsonschema", br#"{"n":1}"#),
        ("/b", "jsonschema", br#"{"n":2}"#),
    ]);
    let data: &'static [u8] = Box::leak(data.into_boxed_slice());
    let requests = captured::<Value>();
    let server = download_server(vec![data], requests.clone());

    let now = Utc::now();
    let messages = server
        .client()
        .unwrap()
        .get_messages("dev_1", now, now, &["/a".to_string(), "/b".to_string()])
        .unwrap();

    let topics: Vec<&str> = messages.iter().map(|m| m.topic.as_str()).collect();
    assert_eq!(topics, vec!["/a", "/b"]);
    assert_eq!(messages[1].decoded["n"], 2);
    assert_eq!(requests.lock()[0]["topics"], json!(["/a", "/b"]));
}

#[test]
fn test_get_messages_fails_on_unregistered_encoding() {
    let data = container(&[
        ("/a", "jsonschema", br#"{"n":1}"#),
        ("/c", "ros1msg", b"\x00\x00\x00\x00"),
    ]);
    let data: &'static [u8] = Box::leak(data.into_boxed_slice());
    let server = download_server(vec![data], captured());

    let now = Utc::now();
    let err = server
        .client()
        .unwrap()
        .with_decoders(json_only())
        .get_messages("dev_1", now, now, &[])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no decoder provided for schema encoding ros1msg"
    );
}

#[test]
fn test_auto_load_unknown_encoding() {
    let data = container(&[("/x", "flatbuffer", b"\x00")]);
    let client = dataplatform_client::DataPlatformClient::new("token").unwrap();

    let result: Vec<_> = client.decode_messages(&data).unwrap().collect();
    assert!(matches!(
        result[0],
        Err(DataPlatformError::UnknownEncoding { .. })
    ));
}

#[cfg(feature = "ros1")]
#[test]
fn test_auto_load_ros1() {
    let data = container(&[("/chatter", "ros1msg", b"\x02\x00\x00\x00hi")]);
    let client = dataplatform_client::DataPlatformClient::new("token").unwrap();

    let messages: Vec<_> = client
        .decode_messages(&data)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages[0].decoded, json!({ "data": "hi" }));
    assert_eq!(client.decoders().encodings(), vec!["ros1msg".to_string()]);
}

#[cfg(feature = "ros1")]
#[test]
fn test_decode_reuses_schema_id_across_containers() {
    let first = ros1_container("std_msgs/String", "string data", b"\x02\x00\x00\x00hi");
    let second = ros1_container("std_msgs/UInt32", "uint32 value", &[0x07, 0x00, 0x00, 0x00]);
    let client = dataplatform_client::DataPlatformClient::new("token").unwrap();

    let decode = |data: &[u8]| -> Vec<Value> {
        client
            .decode_messages(data)
            .unwrap()
            .map(|m| m.unwrap().decoded)
            .collect()
    };
    assert_eq!(decode(&first), vec![json!({ "data": "hi" })]);
    assert_eq!(decode(&second), vec![json!({ "value": 7 })]);
}
