use std::sync::{Arc, Mutex};

use futures::TryStreamExt;
use rstest::rstest;
use serde_json::json;
use tokio::runtime::Handle;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xms::domain::MtPayload;
use xms::{
    Address, ApiToken, BatchFilter, BatchId, Callback, CallbackRef, Connection, GroupId,
    MtBatchCreate, MtBatchResult, ServicePlanId, ValidationError, XmsError,
};

const PLAN: &str = "my-plan";
const TOKEN: &str = "my-token";

fn builder(server: &MockServer) -> xms::ConnectionBuilder {
    Connection::builder(
        ServicePlanId::new(PLAN).unwrap(),
        ApiToken::new(TOKEN).unwrap(),
    )
    .endpoint(format!("{}/xms", server.uri()))
}

fn started(server: &MockServer) -> Connection {
    let connection = builder(server).build().unwrap();
    connection.start().unwrap();
    connection
}

fn address(value: &str) -> Address {
    Address::new(value).unwrap()
}

fn batch_path(suffix: &str) -> String {
    format!("/xms/v1/{PLAN}/batches{suffix}")
}

#[tokio::test]
async fn create_batch_sends_json_and_decodes_created_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(batch_path("")))
        .and(header("authorization", "Bearer my-token"))
        .and(header("content-type", "application/json; charset=UTF-8"))
        .and(body_json(json!({
            "type": "mt_text",
            "from": "12345",
            "to": ["987654321", "123456789"],
            "body": "Hello, ${name}!",
            "parameters": { "name": { "987654321": "Mary", "default": "friend" } }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "5Z8QsIRsk86f-jHB",
            "type": "mt_text",
            "from": "12345",
            "to": ["987654321", "123456789"],
            "body": "Hello, ${name}!",
            "parameters": { "name": { "987654321": "Mary", "default": "friend" } },
            "created_at": "2016-12-01T11:53:02.413Z",
            "modified_at": "2016-12-01T11:53:02.413Z",
            "canceled": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = started(&server);
    let batch = MtBatchCreate::text(address("12345"), "Hello, ${name}!")
        .to(address("987654321"))
        .to(address("123456789"))
        .parameter("name", &address("987654321"), "Mary")
        .parameter_default("name", "friend")
        .build()
        .unwrap();

    let result = connection.create_batch(&batch, None).unwrap().await.unwrap();
    assert_eq!(result.id.as_str(), "5Z8QsIRsk86f-jHB");
    assert_eq!(result.from, address("12345"));
    assert_eq!(result.to, vec![address("987654321"), address("123456789")]);
    match &result.payload {
        MtPayload::Text { body, parameters } => {
            assert_eq!(body, "Hello, ${name}!");
            let name = &parameters["name"];
            assert_eq!(name.by_recipient["987654321"], "Mary");
            assert_eq!(name.default.as_deref(), Some("friend"));
        }
        other => panic!("expected a text payload, got {other:?}"),
    }
    assert!(!result.canceled);
    assert_eq!(
        result.created_at.map(|at| at.to_rfc3339()).as_deref(),
        Some("2016-12-01T11:53:02.413+00:00")
    );
    connection.close();
}

#[tokio::test]
async fn structured_api_error_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(batch_path("")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "syntax_constraint_violation",
            "text": "The syntax constraint was violated"
        })))
        .mount(&server)
        .await;

    let connection = started(&server);
    let batch = MtBatchCreate::text(address("12345"), "hi")
        .to(address("987654321"))
        .build()
        .unwrap();

    match connection.create_batch(&batch, None).unwrap().await {
        Err(XmsError::Api(err)) => {
            assert_eq!(err.code, "syntax_constraint_violation");
            assert_eq!(err.text, "The syntax constraint was violated");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_with_alternate_shape_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(batch_path("/abc")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "timestamp": "2016-12-14T15:43:00.000Z",
            "status": 403,
            "error": "Forbidden",
            "message": "Access Denied",
            "path": "/xms/v1/my-plan/batches/abc"
        })))
        .mount(&server)
        .await;

    let connection = started(&server);
    let err = connection
        .fetch_batch(&BatchId::new("abc").unwrap(), None)
        .unwrap()
        .await
        .unwrap_err();
    match err {
        XmsError::BadRequest(bad) => {
            assert_eq!(bad.status, 403);
            assert_eq!(bad.error, "Forbidden");
            assert_eq!(bad.message.as_deref(), Some("Access Denied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_unauthorized_and_server_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(path(batch_path("/missing")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path(batch_path("/locked")))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;
    Mock::given(path(batch_path("/broken")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let connection = started(&server);
    let fetch = |id: &str| {
        connection
            .fetch_batch(&BatchId::new(id).unwrap(), None)
            .unwrap()
    };

    assert!(matches!(
        fetch("missing").await,
        Err(XmsError::NotFound { ref path }) if path == &batch_path("/missing")
    ));
    assert!(matches!(fetch("locked").await, Err(XmsError::Unauthorized)));
    match fetch("broken").await {
        Err(XmsError::UnexpectedResponse(response)) => {
            assert_eq!(response.status().as_u16(), 500);
            assert_eq!(response.body_text(), "internal");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn batches_are_paged_lazily() {
    let server = MockServer::start().await;
    let batch = |id: &str| {
        json!({ "id": id, "type": "mt_text", "from": "12345", "to": ["1"], "body": "b" })
    };
    Mock::given(method("GET"))
        .and(path(batch_path("")))
        .and(query_param("page", "0"))
        .and(query_param("page_size", "2"))
        .and(query_param("from", "12345,54321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 0, "page_size": 2, "count": 3, "batches": [batch("a"), batch("b")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(batch_path("")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1, "page_size": 1, "count": 3, "batches": [batch("c")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = started(&server);
    let filter = BatchFilter::builder()
        .page_size(2)
        .sender(address("12345"))
        .sender(address("54321"))
        .build()
        .unwrap();
    let fetcher = connection.fetch_batches(filter);

    let ids = fetcher
        .items()
        .map_ok(|batch| batch.id.to_string())
        .try_collect::<Vec<_>>()
        .await
        .unwrap();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn delete_group_tolerates_unexpected_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/xms/v1/{PLAN}/groups/g1")))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"surprise":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let connection = started(&server);
    connection
        .delete_group(&GroupId::new("g1").unwrap(), None)
        .unwrap()
        .await
        .unwrap();
}

#[derive(Default)]
struct Recorder {
    signals: Mutex<Vec<String>>,
}

impl Callback<MtBatchResult> for Recorder {
    fn completed(&self, value: &MtBatchResult) {
        self.signals
            .lock()
            .unwrap()
            .push(format!("completed:{}", value.id));
    }

    fn failed(&self, error: &XmsError) {
        self.signals.lock().unwrap().push(format!("failed:{error}"));
    }

    fn cancelled(&self) {
        self.signals.lock().unwrap().push("cancelled".to_owned());
    }
}

#[tokio::test]
async fn handler_is_notified_before_future_resolves() {
    let server = MockServer::start().await;
    Mock::given(path(batch_path("/b1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b1", "type": "mt_text", "from": "1", "to": ["2"], "body": "b"
        })))
        .mount(&server)
        .await;
    Mock::given(path(batch_path("/gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let connection = started(&server);
    let recorder = Arc::new(Recorder::default());
    let callback: CallbackRef<MtBatchResult> = recorder.clone();

    connection
        .fetch_batch(&BatchId::new("b1").unwrap(), Some(callback.clone()))
        .unwrap()
        .await
        .unwrap();
    connection
        .fetch_batch(&BatchId::new("gone").unwrap(), Some(callback))
        .unwrap()
        .await
        .unwrap_err();

    assert_eq!(
        *recorder.signals.lock().unwrap(),
        vec![
            "completed:b1".to_owned(),
            format!("failed:not found: {}", batch_path("/gone")),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn wait_blocks_outside_the_runtime() {
    let server = MockServer::start().await;
    Mock::given(path(batch_path("/b1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b1", "type": "mt_text", "from": "1", "to": ["2"], "body": "b"
        })))
        .mount(&server)
        .await;

    let connection = started(&server);
    let future = connection
        .fetch_batch(&BatchId::new("b1").unwrap(), None)
        .unwrap();
    let result = tokio::task::spawn_blocking(move || future.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.id.as_str(), "b1");
}

#[tokio::test(flavor = "multi_thread")]
async fn closing_leaves_a_supplied_client_usable() {
    let server = MockServer::start().await;
    Mock::given(path(batch_path("/b1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b1", "type": "mt_text", "from": "1", "to": ["2"], "body": "b"
        })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let connection = builder(&server)
        .transport(client.clone(), Handle::current())
        .build()
        .unwrap();
    assert!(connection.is_started());

    connection
        .fetch_batch(&BatchId::new("b1").unwrap(), None)
        .unwrap()
        .await
        .unwrap();
    connection.close();
    assert!(matches!(
        connection.fetch_batch(&BatchId::new("b1").unwrap(), None),
        Err(XmsError::Closed)
    ));

    let response = client
        .get(format!("{}{}", server.uri(), batch_path("/b1")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[rstest]
#[case("ftp://example.com/xms")]
#[case("https://example.com/xms?plan=1")]
#[case("https://example.com/xms#top")]
#[case("mailto:someone@example.com")]
#[case("")]
fn malformed_endpoints_are_rejected(#[case] endpoint: &str) {
    let err = Connection::builder(
        ServicePlanId::new(PLAN).unwrap(),
        ApiToken::new(TOKEN).unwrap(),
    )
    .endpoint(endpoint)
    .build()
    .unwrap_err();
    assert!(matches!(
        err,
        XmsError::Validation(ValidationError::Malformed {
            field: "endpoint",
            ..
        })
    ));
}
