//! SBI dispatch tests against the router, without sockets.

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use amf_service::http::multipart::{encode_related, parse_related, BinaryPart};
use amf_service::http::{
    build_router, AppState, Payload, RequestEnvelope, ResponseEnvelope, INDEX_GREETING, X_REQUEST_ID,
};
use amf_service::models::communication::JsonPayload;
use amf_service::models::ProblemDetails;
use amf_service::services::{build_route_table, Operation, ServiceName};

#[derive(Debug, Clone)]
struct Seen {
    operation: Operation,
    params: HashMap<String, String>,
    payload: Option<Payload>,
}

type SeenLog = Arc<Mutex<Vec<Seen>>>;

/// Router whose handler records what it saw and answers with `reply`.
fn router<F>(reply: F) -> (Router, SeenLog)
where
    F: Fn(Operation) -> ResponseEnvelope + Send + Sync + 'static,
{
    let seen: SeenLog = Arc::default();
    let log = Arc::clone(&seen);
    let handler = move |operation: Operation, request: RequestEnvelope| {
        log.lock().unwrap().push(Seen {
            operation,
            params: request.params.clone(),
            payload: request.payload.clone(),
        });
        reply(operation)
    };

    let routes = build_route_table(&[ServiceName::NamfComm]).unwrap();
    let app = build_router(AppState {
        routes: Arc::new(routes),
        handler: Arc::new(handler),
        max_body_size: 64 * 1024,
    });
    (app, seen)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Bytes) {
    let response: Response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body)
}

fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ue_context_create_data() -> Value {
    json!({
        "ueContext": {"supi": "imsi-208930000000001"},
        "targetId": {"ranNodeId": {"gNbId": {"bitLength": 24, "gNBValue": "000102"}}},
        "sourceToTargetData": {"ngapIeType": "SRC_TO_TAR_CONTAINER"},
        "pduSessionList": [],
    })
}

#[tokio::test]
async fn undecodable_body_is_400_and_never_reaches_handler() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));

    let (status, content_type, body) =
        send(app, json_request(Method::PUT, "/namf-comm/v1/ue-contexts/42", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let problem: ProblemDetails = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem.status, Some(400));
    assert_eq!(problem.title.as_deref(), Some("Malformed request syntax"));
    assert!(problem.detail.as_deref().unwrap().starts_with("[Request Body] "));
    assert!(problem.cause.is_none());
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn absent_body_on_json_route_is_400() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));

    let (status, _, body) = send(app, json_request(Method::POST, "/namf-comm/v1/subscriptions", "")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: ProblemDetails = serde_json::from_slice(&body).unwrap();
    assert!(!problem.detail.unwrap_or_default().is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn body_read_failure_is_system_failure() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"{\"amfStatusUri\":")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset")),
    ];
    let request = Request::builder()
        .method(Method::POST)
        .uri("/namf-comm/v1/subscriptions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(futures_util::stream::iter(chunks)))
        .unwrap();

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let problem: ProblemDetails = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem.status, Some(500));
    assert_eq!(problem.cause.as_deref(), Some("SYSTEM_FAILURE"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unsubscribe_forwards_path_parameter_without_body() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/namf-comm/v1/subscriptions/abc123")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].operation, Operation::AmfStatusChangeUnSubscribe);
    assert_eq!(seen[0].params.get("subscriptionId").map(String::as_str), Some("abc123"));
    assert!(seen[0].payload.is_none());
}

#[tokio::test]
async fn missing_content_type_is_decoded_as_json() {
    let (app, seen) = router(|_| ResponseEnvelope::success(StatusCode::CREATED, &json!({"amfStatusUri": "x"})));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/namf-comm/v1/subscriptions")
        .body(Body::from(r#"{"amfStatusUri":"http://nf.example/status"}"#))
        .unwrap();

    let (status, _, _) = send(app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    let seen = seen.lock().unwrap();
    match seen[0].payload.as_ref().map(Payload::json) {
        Some(JsonPayload::SubscriptionData(data)) => assert_eq!(data.amf_status_uri, "http://nf.example/status"),
        other => panic!("unexpected payload {:?}", other),
    }
}

#[tokio::test]
async fn multipart_body_rejected_on_json_only_route() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));
    let (body, content_type) = encode_related(br#"{"pduSessionId":5}"#, &[]).unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/namf-comm/v1/ue-contexts/42/assign-ebi")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let problem: ProblemDetails = serde_json::from_slice(&body).unwrap();
    assert!(problem.detail.unwrap().contains("unsupported content type"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn composite_request_and_response_on_trigger_status() {
    let (app, seen) = router(|_| {
        ResponseEnvelope::with_parts(
            StatusCode::CREATED,
            &json!({"ueContext": {"supi": "imsi-208930000000001"}}),
            vec![BinaryPart::new("ngap-target", "application/vnd.3gpp.ngap", vec![0x20u8, 0x0e])],
        )
    });

    let root = serde_json::to_vec(&ue_context_create_data()).unwrap();
    let nas = BinaryPart::new("n2-container", "application/vnd.3gpp.ngap", vec![0x00u8, 0x0e, 0x00]);
    let (body, content_type) = encode_related(&root, &[nas.clone()]).unwrap();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/namf-comm/v1/ue-contexts/imsi-208930000000001")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();

    let (status, content_type, body) = send(app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    let content_type = content_type.unwrap();
    assert!(content_type.starts_with("multipart/related"), "{}", content_type);
    let related = parse_related(&content_type, body.clone()).await.unwrap();
    let root: Value = serde_json::from_slice(&related.root).unwrap();
    assert_eq!(root["ueContext"]["supi"], "imsi-208930000000001");
    assert_eq!(related.binaries.len(), 1);
    assert_eq!(&related.binaries[0].data[..], &[0x20, 0x0e]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].operation, Operation::CreateUeContext);
    assert_eq!(seen[0].params.get("ueContextId").map(String::as_str), Some("imsi-208930000000001"));
    let payload = seen[0].payload.as_ref().unwrap();
    assert!(matches!(payload.json(), JsonPayload::UeContextCreateData(_)));
    assert_eq!(payload.binaries(), &[nas]);
}

#[tokio::test]
async fn non_trigger_status_is_plain_json() {
    let (app, _) = router(|_| {
        ResponseEnvelope::with_parts(
            StatusCode::OK,
            &json!({"ueContext": {}}),
            vec![BinaryPart::new("ignored", "application/vnd.3gpp.ngap", vec![1u8])],
        )
    });
    let body = serde_json::to_string(&ue_context_create_data()).unwrap();

    let (status, content_type, body) =
        send(app, json_request(Method::PUT, "/namf-comm/v1/ue-contexts/7", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"ueContext": {}}));
}

#[tokio::test]
async fn handler_problem_passes_through() {
    let (app, _) = router(|_| {
        ResponseEnvelope::problem(
            ProblemDetails::with_status(403)
                .with_title("Forbidden")
                .with_cause("UE_NOT_ALLOWED"),
        )
    });

    let (status, content_type, body) = send(
        app,
        json_request(
            Method::POST,
            "/namf-comm/v1/ue-contexts/7/release",
            r#"{"ngapCause":{"group":0,"value":10}}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let problem: ProblemDetails = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem.status, Some(403));
    assert_eq!(problem.cause.as_deref(), Some("UE_NOT_ALLOWED"));
}

#[tokio::test]
async fn stub_routes_answer_empty_object() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));

    let (status, _, body) = send(
        app,
        json_request(Method::POST, "/namf-comm/v1/non-ue-n2-messages/transfer", "{}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({}));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn service_index_answers_greeting() {
    let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));
    let request = Request::builder().uri("/namf-comm/v1/").body(Body::empty()).unwrap();

    let (status, content_type, body) = send(app.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(&body[..], INDEX_GREETING.as_bytes());
    assert!(seen.lock().unwrap().is_empty());

    let request = Request::builder().uri("/namf-comm/v1").body(Body::empty()).unwrap();
    let (status, _, _) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unregistered_pairs_are_404() {
    for (method, uri) in [
        (Method::GET, "/namf-comm/v1/unknown"),
        (Method::PATCH, "/namf-comm/v1/subscriptions/abc"),
        (Method::GET, "/namf-evts/v1/subscriptions"),
        (Method::DELETE, "/namf-comm/v1/subscriptions/"),
    ] {
        let (app, seen) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));
        let request = Request::builder().method(method.clone()).uri(uri).body(Body::empty()).unwrap();
        let (status, _, _) = send(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert!(seen.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (app, _) = router(|_| ResponseEnvelope::empty(StatusCode::NO_CONTENT));
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/namf-comm/v1/subscriptions/abc123")
        .header(X_REQUEST_ID, "req-7")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "req-7");
}
