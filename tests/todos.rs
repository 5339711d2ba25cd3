mod common;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{rt, test, web, App, HttpServer};
use chrono::{DateTime, Duration, Utc};
use common::{bearer, init_app, register_token, send, test_state};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::TcpListener;
use tasklist::models::Todo;
use tasklist::routes::{self, health};
use uuid::Uuid;

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

fn create_req(token: &str, payload: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/todos")
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request()
}

fn get_req(token: &str, uri: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(token))
        .to_request()
}

fn update_req(token: &str, id: &str, payload: Value) -> actix_http::Request {
    test::TestRequest::put()
        .uri(&format!("/todos/{}", id))
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request()
}

fn delete_req(token: &str, id: &str) -> actix_http::Request {
    test::TestRequest::delete()
        .uri(&format!("/todos/{}", id))
        .insert_header(bearer(token))
        .to_request()
}

#[test_log::test(actix_rt::test)]
async fn test_todo_lifecycle() {
    let app = init_app(test_state()).await;
    let token = register_token(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        create_req(&token, json!({ "title": "Buy milk", "tags": ["home"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Create failed. Body: {}", body);
    let created: Todo = serde_json::from_value(body["todo"].clone()).unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(body["todo"]["priority"], "medium");
    assert_eq!(body["todo"]["completed"], false);
    assert_eq!(created.tags, vec!["home".to_string()]);
    let id = created.id.to_string();

    let (status, body) = send(&app, get_req(&token, "/todos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["todos"][0]["id"], json!(id));

    let (status, body) = send(&app, update_req(&token, &id, json!({ "completed": true }))).await;
    assert_eq!(status, StatusCode::OK, "Update failed. Body: {}", body);
    assert_eq!(body["todo"]["completed"], true);
    assert_eq!(body["todo"]["title"], "Buy milk");
    assert_eq!(body["todo"]["tags"], json!(["home"]));

    let (status, body) = send(&app, delete_req(&token, &id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Todo deleted successfully" }));

    let (status, body) = send(&app, get_req(&token, &format!("/todos/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Todo not found" }));
}

#[actix_rt::test]
async fn test_other_users_todo_looks_missing() {
    let app = init_app(test_state()).await;
    let alice = register_token(&app, "alice@example.com").await;
    let bob = register_token(&app, "bob@example.com").await;

    let (_, body) = send(&app, create_req(&alice, json!({ "title": "Alice's secret" }))).await;
    let id = body["todo"]["id"].as_str().unwrap().to_string();
    let random_id = Uuid::new_v4().to_string();

    // Bob gets exactly the same answer for Alice's todo as for one that never existed.
    let foreign = send(&app, get_req(&bob, &format!("/todos/{}", id))).await;
    let missing = send(&app, get_req(&bob, &format!("/todos/{}", random_id))).await;
    assert_eq!(foreign, missing);
    assert_eq!(foreign.0, StatusCode::NOT_FOUND);

    let foreign = send(&app, update_req(&bob, &id, json!({ "title": "Hijacked" }))).await;
    let missing = send(&app, update_req(&bob, &random_id, json!({ "title": "Hijacked" }))).await;
    assert_eq!(foreign, missing);
    assert_eq!(foreign.0, StatusCode::NOT_FOUND);

    let foreign = send(&app, delete_req(&bob, &id)).await;
    let missing = send(&app, delete_req(&bob, &random_id)).await;
    assert_eq!(foreign, missing);
    assert_eq!(foreign.0, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, get_req(&bob, "/todos")).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["todos"], json!([]));

    // Alice's todo is untouched.
    let (status, body) = send(&app, get_req(&alice, &format!("/todos/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["title"], "Alice's secret");
}

#[actix_rt::test]
async fn test_invalid_id_is_bad_request() {
    let app = init_app(test_state()).await;
    let token = register_token(&app, "alice@example.com").await;

    for req in [
        get_req(&token, "/todos/not-a-uuid"),
        update_req(&token, "not-a-uuid", json!({ "title": "Something" })),
        delete_req(&token, "not-a-uuid"),
    ] {
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid todo ID format" }));
    }
}

#[actix_rt::test]
async fn test_todos_require_token() {
    let app = init_app(test_state()).await;

    let req = test::TestRequest::get().uri("/todos").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Missing token" }));

    let req = test::TestRequest::post()
        .uri("/todos")
        .set_json(json!({ "title": "No token" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_partial_update_semantics() {
    let app = init_app(test_state()).await;
    let token = register_token(&app, "alice@example.com").await;

    let due = (Utc::now() + Duration::days(2)).to_rfc3339();
    let (_, body) = send(
        &app,
        create_req(
            &token,
            json!({
                "title": "Write report",
                "description": "Quarterly numbers",
                "priority": "high",
                "tags": ["work", "q3"],
                "dueDate": due
            }),
        ),
    )
    .await;
    let original = body["todo"].clone();
    let id = original["id"].as_str().unwrap().to_string();

    rt::time::sleep(std::time::Duration::from_millis(5)).await;

    // Only the title changes.
    let (status, body) = send(&app, update_req(&token, &id, json!({ "title": "Write the report" }))).await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["todo"];
    assert_eq!(updated["title"], "Write the report");
    for field in ["description", "priority", "tags", "dueDate", "completed", "createdAt", "userId"] {
        assert_eq!(updated[field], original[field], "{} changed", field);
    }
    assert!(
        timestamp(&updated["updatedAt"]) > timestamp(&original["updatedAt"]),
        "updatedAt was not bumped: {} -> {}",
        original["updatedAt"],
        updated["updatedAt"]
    );

    // Empty strings are ignored, completed=false is applied.
    send(&app, update_req(&token, &id, json!({ "completed": true }))).await;
    let (status, body) = send(
        &app,
        update_req(
            &token,
            &id,
            json!({ "title": "", "description": "  ", "priority": "", "completed": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["title"], "Write the report");
    assert_eq!(body["todo"]["description"], "Quarterly numbers");
    assert_eq!(body["todo"]["priority"], "high");
    assert_eq!(body["todo"]["completed"], false);

    // An explicit empty list clears tags.
    let (_, body) = send(&app, update_req(&token, &id, json!({ "tags": [] }))).await;
    assert_eq!(body["todo"]["tags"], json!([]));

    // Nothing supplied at all.
    let (status, body) = send(&app, update_req(&token, &id, json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No fields to update" }));

    let (status, _) = send(&app, update_req(&token, &id, json!({ "priority": "urgent" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_create_validation() {
    let app = init_app(test_state()).await;
    let token = register_token(&app, "alice@example.com").await;
    let stale = (Utc::now() - Duration::days(3)).to_rfc3339();

    for payload in [
        json!({}),
        json!({ "title": "ab" }),
        json!({ "title": "x".repeat(201) }),
        json!({ "title": "Valid", "description": "d".repeat(1001) }),
        json!({ "title": "Valid", "priority": "urgent" }),
        json!({ "title": "Valid", "tags": (0..11).map(|i| format!("t{}", i)).collect::<Vec<_>>() }),
        json!({ "title": "Valid", "tags": ["x".repeat(21)] }),
        json!({ "title": "Valid", "dueDate": stale }),
    ] {
        let (status, body) = send(&app, create_req(&token, payload.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{} -> {}", payload, body);
    }

    let (_, body) = send(&app, get_req(&token, "/todos")).await;
    assert_eq!(body["total"], 0);
}

#[actix_rt::test]
async fn test_list_filter_and_limit() {
    let app = init_app(test_state()).await;
    let token = register_token(&app, "alice@example.com").await;

    let mut ids = Vec::new();
    for i in 0..4 {
        let (_, body) = send(&app, create_req(&token, json!({ "title": format!("Todo {}", i) }))).await;
        ids.push(body["todo"]["id"].as_str().unwrap().to_string());
    }
    send(&app, update_req(&token, &ids[1], json!({ "completed": true }))).await;

    let (_, body) = send(&app, get_req(&token, "/todos")).await;
    let titles: Vec<&str> = body["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Todo 0", "Todo 1", "Todo 2", "Todo 3"]);

    let (_, body) = send(&app, get_req(&token, "/todos?completed=true")).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 1);
    assert_eq!(body["todos"][0]["id"], json!(ids[1]));
    assert_eq!(body["total"], 4);

    for (flag, expected) in [("1", 1), ("t", 1), ("TRUE", 1), ("0", 3), ("FALSE", 3), ("f", 3)] {
        let (_, body) = send(&app, get_req(&token, &format!("/todos?completed={}", flag))).await;
        assert_eq!(
            body["todos"].as_array().unwrap().len(),
            expected,
            "completed={}",
            flag
        );
    }

    let (_, body) = send(&app, get_req(&token, "/todos?completed=false&limit=2")).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 2);
    assert_eq!(body["limit"], 2);

    let (_, body) = send(&app, get_req(&token, "/todos?completed=maybe&limit=500")).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 4);
    assert_eq!(body["limit"], 50);
}

#[actix_rt::test]
async fn test_malformed_query_uses_error_envelope() {
    let app = init_app(test_state()).await;
    let token = register_token(&app, "alice@example.com").await;

    let (status, body) = send(&app, get_req(&token, "/todos?limit=1&limit=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid query parameters" }));
}

#[actix_rt::test]
async fn test_unauthorized_over_real_server() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let state = web::Data::new(test_state());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .service(health::health)
            .configure(routes::config)
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client
        .post(format!("{}/todos", base))
        .json(&json!({ "title": "Unauthorized todo" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Missing token" }));

    let resp = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    handle.stop(true).await;
}
