use axum::{http::HeaderName, middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::members;
use super::middleware::{logging::REQUEST_ID_HEADER, logging_middleware};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .merge(members::create_members_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::domain::member::{MemberRepository, MockMemberRepository};
    use crate::domain::DomainError;
    use crate::infrastructure::member::{
        Argon2Hasher, InMemoryMemberRepository, RandomKeyGenerator, VerifiedKeyGenerator,
    };

    fn create_test_router() -> Router {
        let repository: Arc<dyn MemberRepository> = Arc::new(InMemoryMemberRepository::new());
        let keys = Arc::new(VerifiedKeyGenerator::new(repository.clone()));
        create_router(AppState::new(repository, keys, Arc::new(Argon2Hasher::new())))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    fn alice() -> Value {
        json!({
            "username": "alice",
            "email": "a@example.com",
            "name": "Alice A",
            "nickname": "Al",
            "avatar_seed": "seed"
        })
    }

    async fn register_alice(router: &Router) -> String {
        let (status, body) = send(router, Method::POST, "/members", Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let router = create_test_router();

        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&router, Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "member_storage");

        let (status, _) = send(&router, Method::GET, "/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_reports_storage_failure() {
        let mut mock = MockMemberRepository::new();
        mock.expect_list()
            .returning(|| Err(DomainError::storage("connection refused")));
        let router = create_router(AppState::new(
            Arc::new(mock),
            Arc::new(RandomKeyGenerator::new()),
            Arc::new(Argon2Hasher::new()),
        ));

        let (status, body) = send(&router, Method::GET, "/ready", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_register_and_fetch_member() {
        let router = create_test_router();
        let id = register_alice(&router).await;

        let (status, body) = send(&router, Method::GET, &format!("/members/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "a@example.com");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_invalid_fields() {
        let router = create_test_router();
        let mut request = alice();
        request["username"] = json!("");
        request["email"] = json!("nope");

        let (status, body) = send(&router, Method::POST, "/members", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status_code"], 400);
        assert_eq!(body["severity"], "warning");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].as_str().unwrap().starts_with("username:"));
        assert!(messages[1].as_str().unwrap().starts_with("email:"));
    }

    #[tokio::test]
    async fn test_register_taken_username_conflicts() {
        let router = create_test_router();
        register_alice(&router).await;

        let mut request = alice();
        request["username"] = json!("Alice");
        let (status, body) = send(&router, Method::POST, "/members", Some(request)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status_code"], 409);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let router = create_test_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/members",
            Some(json!({ "username": "alice" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_unknown_member_is_not_found() {
        let router = create_test_router();
        let uri = format!("/members/{}", uuid::Uuid::new_v4());

        let (status, body) = send(&router, Method::GET, &uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["severity"], "informational");
    }

    #[tokio::test]
    async fn test_nil_id_is_invalid() {
        let router = create_test_router();

        let (status, body) = send(
            &router,
            Method::GET,
            "/members/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["messages"][0].as_str().unwrap().starts_with("id:"));
    }

    #[tokio::test]
    async fn test_change_commands() {
        let router = create_test_router();
        let id = register_alice(&router).await;

        let changes = [
            ("email", json!({ "email": "new@example.com" })),
            ("username", json!({ "username": "alicia" })),
            ("password", json!({ "password": "a long password" })),
            ("other", json!({ "name": "Alicia A", "nickname": "Ali" })),
        ];

        for (field, body) in changes {
            let uri = format!("/members/{}/{}", id, field);
            let (status, response) = send(&router, Method::PUT, &uri, Some(body)).await;
            assert_eq!(status, StatusCode::OK, "change {} failed", field);
            assert_eq!(response["status"], "success");
        }

        let (_, body) = send(&router, Method::GET, &format!("/members/{}", id), None).await;
        assert_eq!(body["username"], "alicia");
        assert_eq!(body["email"], "new@example.com");
        assert_eq!(body["name"], "Alicia A");
    }

    #[tokio::test]
    async fn test_optional_fields_reach_the_requests() {
        let router = create_test_router();

        let mut request = alice();
        request["password"] = json!("short");
        let (status, body) = send(&router, Method::POST, "/members", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);

        let id = register_alice(&router).await;
        let (_, before) = send(&router, Method::GET, &format!("/members/{}", id), None).await;

        let (status, _) = send(
            &router,
            Method::PUT,
            &format!("/members/{}/other", id),
            Some(json!({ "name": "Alice A", "nickname": "Al", "avatar_seed": "fresh" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, after) = send(&router, Method::GET, &format!("/members/{}", id), None).await;
        assert_ne!(before["avatar"], after["avatar"]);
    }

    #[tokio::test]
    async fn test_change_username_to_empty_is_invalid() {
        let router = create_test_router();
        let id = register_alice(&router).await;

        let (status, body) = send(
            &router,
            Method::PUT,
            &format!("/members/{}/username", id),
            Some(json!({ "username": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_then_list() {
        let router = create_test_router();
        let id = register_alice(&router).await;

        let (status, _) = send(&router, Method::GET, "/members", None).await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/members/{}/deactivate", id);
        let (status, _) = send(&router, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&router, Method::GET, "/members", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["heading"], "Members");
        assert_eq!(body["severity"], "informational");
    }

    #[tokio::test]
    async fn test_fatal_error_is_server_error() {
        let mut mock = MockMemberRepository::new();
        mock.expect_username_exists().returning(|_| Ok(false));
        mock.expect_exists().returning(|_| Ok(true));

        let repository: Arc<dyn MemberRepository> = Arc::new(mock);
        let keys = Arc::new(VerifiedKeyGenerator::new(repository.clone()));
        let router = create_router(AppState::new(repository, keys, Arc::new(Argon2Hasher::new())));

        let (status, body) = send(&router, Method::POST, "/members", Some(alice())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "key_exhausted");
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let router = create_test_router();
        let request = Request::builder()
            .uri("/live")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }
}
