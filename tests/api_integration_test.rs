use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use haas_ledger::{Server, TomlConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const CONFIG: &str = r#"
[server]
bind_addr = "127.0.0.1:0"

[[hardware_sets]]
id = "HWSet1"
name = "HWSet1"
total_capacity = 10

[[hardware_sets]]
id = "HWSet2"
name = "HWSet2"
total_capacity = 20

[[projects]]
id = "P1"
name = "Project One"
description = "Seeded for API tests"
owner = "u1"
"#;

fn app() -> Router {
    let config = TomlConfig::from_toml_str(CONFIG).unwrap();
    Server::new(config).unwrap().router().unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(body) => send_raw(app, method, uri, Some("application/json"), &body.to_string()).await,
        None => send_raw(app, method, uri, None, "").await,
    }
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "HaaS API is running");
}

#[tokio::test]
async fn test_checkout_checkin_flow() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/resources/HWSet1/checkout",
        Some(json!({"quantity": 7, "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Checked out 7 units of HWSet1");
    assert_eq!(body["available"], 3);
    assert_eq!(body["allocatedToProject"], 7);

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/resources/HWSet1/checkin",
        Some(json!({"quantity": 3, "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], 6);
    assert_eq!(body["allocatedToProject"], 4);

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/resources/HWSet1/checkin",
        Some(json!({"quantity": 10, "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "over_checkin");

    let (status, body) = send(&app, "GET", "/api/projects/P1/resources?userId=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    let views = body.as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["hwsetId"], "HWSet1");
    assert_eq!(views[0]["total"], 10);
    assert_eq!(views[0]["available"], 6);
    assert_eq!(views[0]["allocatedToProject"], 4);
    assert_eq!(views[1]["allocatedToProject"], 0);
}

#[tokio::test]
async fn test_error_codes() {
    let app = app();

    let cases = [
        (
            "/api/projects/P1/resources/HWSet1/checkout",
            json!({"quantity": 0, "userId": "u1"}),
            StatusCode::BAD_REQUEST,
            "invalid_quantity",
        ),
        (
            "/api/projects/P1/resources/HWSet1/checkout",
            json!({"quantity": 1.5, "userId": "u1"}),
            StatusCode::BAD_REQUEST,
            "invalid_quantity",
        ),
        (
            "/api/projects/P1/resources/HWSet1/checkout",
            json!({"quantity": 11, "userId": "u1"}),
            StatusCode::CONFLICT,
            "insufficient_capacity",
        ),
        (
            "/api/projects/P1/resources/HWSet1/checkout",
            json!({"quantity": 1.5, "userId": "u2"}),
            StatusCode::FORBIDDEN,
            "forbidden",
        ),
        (
            "/api/projects/P1/resources/HWSet9/checkout",
            json!({"quantity": 1, "userId": "u1"}),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
        (
            "/api/projects/P9/resources/HWSet1/checkin",
            json!({"quantity": 1, "userId": "u1"}),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
    ];

    for (uri, body, expected_status, expected_code) in cases {
        let (status, response) = send(&app, "POST", uri, Some(body)).await;
        assert_eq!(status, expected_status, "{}", uri);
        assert_eq!(response["code"], expected_code);
        assert!(response["error"].is_string());
    }

    let (_, body) = send(&app, "GET", "/api/hardware", None).await;
    assert_eq!(body[0]["available"], 10);
}

#[tokio::test]
async fn test_membership_endpoints() {
    let app = app();

    let (status, _) = send(&app, "GET", "/api/projects/P1/members?userId=u2", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/invite",
        Some(json!({"requestingUser": "u1", "inviteUser": "u2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"], json!(["u1", "u2"]));

    let (status, body) = send(&app, "GET", "/api/projects/P1/members?userId=u2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"], json!(["u1", "u2"]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/invite",
        Some(json!({"requestingUser": "u3", "inviteUser": "u3"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(
        &app,
        "POST",
        "/api/projects/P9/invite",
        Some(json!({"requestingUser": "u1", "inviteUser": "u2"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_endpoints() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects",
        Some(json!({
            "projectId": "P2",
            "name": "Drones",
            "description": "Quadcopters",
            "userId": "u2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["owner"], "u2");
    assert_eq!(body["members"], json!(["u2"]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects",
        Some(json!({"projectId": "P2", "name": "Again", "userId": "u3"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, body) = send(&app, "GET", "/api/projects?userId=u2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "P2");

    let (status, body) = send(&app, "GET", "/api/projects/P1?userId=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Seeded for API tests");

    let (status, _) = send(&app, "GET", "/api/projects/P1?userId=u2", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unreadable_bodies_carry_error_codes() {
    let app = app();
    let checkout = "/api/projects/P1/resources/HWSet1/checkout";

    // the caller cannot be identified, so membership fails first
    let cases = [
        (Some("application/json"), r#"{"quantity": 7, "userId": "intruder""#),
        (None, r#"{"quantity": 7, "userId": "u1"}"#),
        (Some("application/json"), r#"{"quantity": 7, "userId": 5}"#),
    ];
    for (content_type, body) in cases {
        let (status, response) = send_raw(&app, "POST", checkout, content_type, body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
        assert_eq!(response["code"], "forbidden");
    }

    let (status, response) = send_raw(
        &app,
        "POST",
        "/api/projects/P9/resources/HWSet1/checkin",
        Some("application/json"),
        "{",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["code"], "not_found");

    let (status, response) = send_raw(
        &app,
        "POST",
        "/api/projects",
        Some("application/json"),
        r#"{"projectId": "P5", "name": "#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "invalid_request");
    assert!(response["error"].is_string());

    let (status, response) = send_raw(
        &app,
        "POST",
        "/api/projects/P1/invite",
        None,
        r#"{"requestingUser": "u1", "inviteUser": "u2"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "invalid_request");

    let (status, response) = send_raw(
        &app,
        "POST",
        "/api/projects",
        Some("application/json"),
        r#"{"projectId": 5, "name": "Typed", "userId": "u1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "invalid_request");

    let (_, body) = send(&app, "GET", "/api/hardware", None).await;
    assert_eq!(body[0]["available"], 10);
}

#[tokio::test]
async fn test_whole_float_quantity_is_accepted() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/resources/HWSet1/checkout",
        Some(json!({"quantity": 2.0, "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Checked out 2 units of HWSet1");

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects/P1/resources/HWSet1/checkout",
        Some(json!({"quantity": u64::MAX, "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "insufficient_capacity");
}

#[tokio::test]
async fn test_resource_history() {
    let app = app();
    let base = "/api/projects/P1/resources/HWSet2";

    let uri = format!("{}/checkout", base);
    let (status, _) = send(&app, "POST", &uri, Some(json!({"quantity": 5, "userId": "u1"}))).await;
    assert_eq!(status, StatusCode::OK);
    let uri = format!("{}/checkin", base);
    let (status, _) = send(&app, "POST", &uri, Some(json!({"quantity": 2, "userId": "u1"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "POST",
        &format!("{}/checkout", base),
        Some(json!({"quantity": 50, "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &format!("{}/history?userId=u1", base), None).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["quantity"], 2);
    assert_eq!(records[0]["checkedInBy"], "u1");
    assert!(records[0]["checkedInAt"].is_string());
    assert_eq!(records[1]["quantity"], 3);
    assert!(records[1]["checkedInAt"].is_null());
    assert_eq!(records[1]["userId"], "u1");

    let (status, body) = send(&app, "GET", &format!("{}/history?userId=u2", base), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}
