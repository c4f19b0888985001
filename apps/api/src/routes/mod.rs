pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::questions::handlers as questions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route(
            "/api/questions/generate",
            post(generation::handle_generate),
        )
        .route("/api/generate", post(generation::handle_generate))
        .route("/api/llm/status", get(generation::handle_llm_status))
        .route(
            "/api/llm/cache",
            delete(generation::handle_clear_llm_cache),
        )
        // Questions
        .route(
            "/api/questions",
            get(questions::handle_list).delete(questions::handle_clear),
        )
        .route(
            "/api/questions/:id",
            get(questions::handle_get)
                .patch(questions::handle_update_practiced)
                .delete(questions::handle_delete),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::USER_ID_HEADER;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use crate::generation::backend::LiveBackend;
    use crate::generation::generator::QuestionGenerator;
    use crate::llm_client::testing::{completion, status, ScriptedTransport};
    use crate::llm_client::{ClientOptions, LlmClient};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const POSTING: &str = "We are hiring a Senior Rust Engineer to build distributed \
        storage systems. You will own services end to end, mentor engineers and work with \
        Tokio, gRPC and PostgreSQL every day.";

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

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

    async fn seeded(owner: Uuid) -> (Router, Vec<Uuid>) {
        let state = AppState::for_tests();
        let texts: Vec<String> = (1..=5)
            .map(|i| format!("Seeded interview question number {i}?"))
            .collect();
        let ids = state
            .store
            .create_batch(&texts, owner)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        (build_router(state), ids)
    }

    fn generate_body(posting: &str) -> String {
        json!({ "jobPosting": posting }).to_string()
    }

    #[tokio::test]
    async fn test_health_reports_demo_mode() {
        let app = build_router(AppState::for_tests());
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["demo_mode"], true);
    }

    #[tokio::test]
    async fn test_llm_status_in_demo_mode() {
        let app = build_router(AppState::for_tests());
        let (status, body) = send(&app, Method::GET, "/api/llm/status", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["demo_mode"], true);
        assert_eq!(body["model"], Value::Null);
        assert_eq!(body["cache"]["size"], 0);
    }

    #[tokio::test]
    async fn test_requests_without_user_are_unauthorized() {
        let app = build_router(AppState::for_tests());
        let body = generate_body(POSTING);
        for (method, uri, body) in [
            (Method::GET, "/api/questions", None),
            (Method::DELETE, "/api/questions", None),
            (Method::POST, "/api/questions/generate", Some(body.as_str())),
        ] {
            let (status, json) = send(&app, method, uri, None, body).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["error"]["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_persists_one_batch() {
        let user = Uuid::new_v4();
        let app = build_router(AppState::for_tests());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/questions/generate",
            Some(user),
            Some(&generate_body(POSTING)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 5);
        let positions: Vec<i64> = questions
            .iter()
            .map(|q| q["position"].as_i64().unwrap())
            .collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
        assert!(questions.iter().all(|q| q["practiced"] == false));
        assert!(questions.iter().all(|q| q.get("user_id").is_none()));
        assert_eq!(body["message"], "Successfully generated and saved 5 questions");

        let (_, list) = send(&app, Method::GET, "/api/questions", Some(user), None).await;
        assert_eq!(list["pagination"]["total"], 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_alias_route() {
        let app = build_router(AppState::for_tests());
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/generate",
            Some(Uuid::new_v4()),
            Some(&generate_body(POSTING)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_generate_rejects_short_posting_before_generation() {
        let user = Uuid::new_v4();
        let app = build_router(AppState::for_tests());
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/questions/generate",
            Some(user),
            Some(&generate_body("   Rust dev wanted.   ")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "jobPosting");

        let (_, list) = send(&app, Method::GET, "/api/questions", Some(user), None).await;
        assert_eq!(list["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_bodies() {
        let app = build_router(AppState::for_tests());
        let user = Some(Uuid::new_v4());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/questions/generate",
            user,
            Some("{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid JSON in request body");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/questions/generate",
            user,
            Some(r#"{"posting": "wrong field"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "jobPosting");
    }

    #[tokio::test]
    async fn test_list_pagination_and_validation() {
        let user = Uuid::new_v4();
        let (app, _) = seeded(user).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/questions?limit=2&offset=1",
            Some(user),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 2);
        assert_eq!(body["questions"][0]["position"], 2);
        assert_eq!(body["pagination"], json!({"total": 5, "limit": 2, "offset": 1}));

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/questions?limit=500",
            Some(user),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "limit");
    }

    #[tokio::test]
    async fn test_practiced_toggle_and_filter() {
        let user = Uuid::new_v4();
        let (app, ids) = seeded(user).await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/questions/{}", ids[0]),
            Some(user),
            Some(r#"{"practiced": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["practiced"], true);
        assert_eq!(
            body["message"],
            "Question practice status updated to practiced"
        );

        let (_, body) = send(
            &app,
            Method::GET,
            "/api/questions?practiced=true",
            Some(user),
            None,
        )
        .await;
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["questions"][0]["id"], json!(ids[0]));

        let (_, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/questions/{}", ids[0]),
            Some(user),
            Some(r#"{"practiced": false}"#),
        )
        .await;
        assert_eq!(
            body["message"],
            "Question practice status updated to not practiced"
        );
    }

    #[tokio::test]
    async fn test_other_users_cannot_touch_questions() {
        let owner = Uuid::new_v4();
        let intruder = Some(Uuid::new_v4());
        let (app, ids) = seeded(owner).await;
        let uri = format!("/api/questions/{}", ids[0]);

        let (status, body) = send(&app, Method::GET, &uri, intruder, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Question not found or access denied");

        let (status, _) = send(
            &app,
            Method::PATCH,
            &uri,
            intruder,
            Some(r#"{"practiced": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, intruder, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::GET, &uri, Some(owner), None).await;
        assert_eq!(body["question"]["practiced"], false);
    }

    #[tokio::test]
    async fn test_patch_validation() {
        let user = Uuid::new_v4();
        let (app, ids) = seeded(user).await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/questions/not-a-uuid",
            Some(user),
            Some(r#"{"practiced": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid question ID format");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/questions/{}", ids[0]),
            Some(user),
            Some(r#"{"practiced": "yes"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "practiced");
    }

    #[tokio::test]
    async fn test_delete_then_clear() {
        let user = Uuid::new_v4();
        let (app, ids) = seeded(user).await;
        let uri = format!("/api/questions/{}", ids[0]);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(user), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, &uri, Some(user), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/api/questions", Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 4);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let app = build_router(AppState::for_tests());
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/questions/generate",
            Some(Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    // ── Live backend over a scripted transport ──────────────────────────────

    fn live_state(transport: Arc<ScriptedTransport>) -> AppState {
        let llm = LlmClient::new(transport, ClientOptions::default());
        AppState {
            generator: Arc::new(QuestionGenerator::with_backend(Arc::new(LiveBackend::new(
                llm,
            )))),
            ..AppState::for_tests()
        }
    }

    fn questions_json(texts: &[&str]) -> Value {
        completion(&json!({ "questions": texts }).to_string())
    }

    const FIVE: [&str; 5] = [
        "How would you design a replicated key-value store in Rust?",
        "Describe how you debug a deadlock in an async Tokio service.",
        "What trade-offs do you weigh when choosing gRPC over REST?",
        "Tell me about a time you mentored an engineer through a hard bug.",
        "How do you keep PostgreSQL migrations safe in production?",
    ];

    /// Posts a generation request and returns its status, code and the caller's
    /// stored question count afterwards.
    async fn generate_and_count(app: &Router) -> (StatusCode, Value, Value) {
        let user = Some(Uuid::new_v4());
        let (status, body) = send(
            app,
            Method::POST,
            "/api/questions/generate",
            user,
            Some(&generate_body(POSTING)),
        )
        .await;
        let (_, list) = send(app, Method::GET, "/api/questions", user, None).await;
        (
            status,
            body["error"]["code"].clone(),
            list["pagination"]["total"].clone(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_generation_is_persisted() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("en")),
            Ok(questions_json(&FIVE)),
        ]));
        let app = build_router(live_state(transport));

        let (status, _, total) = generate_and_count(&app).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(total, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_too_few_questions_is_422_and_stores_nothing() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("en")),
            Ok(questions_json(&FIVE[..4])),
        ]));
        let app = build_router(live_state(transport));

        let (status, code, total) = generate_and_count(&app).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "INVALID_RESPONSE");
        assert_eq!(total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_object_payload_is_422_and_stores_nothing() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("en")),
            Ok(completion(r#"["first", "second"]"#)),
        ]));
        let app = build_router(live_state(transport));

        let (status, code, total) = generate_and_count(&app).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "INVALID_RESPONSE");
        assert_eq!(total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_rate_limit_is_429_and_stores_nothing() {
        let transport = Arc::new(ScriptedTransport::new(
            (0..6).map(|_| Err(status(429))).collect(),
        ));
        let app = build_router(live_state(transport.clone()));

        let (status, code, total) = generate_and_count(&app).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(code, "RATE_LIMIT");
        assert_eq!(total, 0);
        // Detection and generation each exhaust their attempts.
        assert_eq!(transport.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_llm_cache() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("en")),
            Ok(questions_json(&FIVE)),
        ]));
        let app = build_router(live_state(transport));
        let user = Some(Uuid::new_v4());

        let (status, _, _) = generate_and_count(&app).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, before) = send(&app, Method::GET, "/api/llm/status", None, None).await;
        assert_eq!(before["demo_mode"], false);
        assert_eq!(before["cache"]["size"], 2);

        let (status, _) = send(&app, Method::DELETE, "/api/llm/cache", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, cleared) = send(&app, Method::DELETE, "/api/llm/cache", user, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared, json!({"size": 0, "entries": 0}));

        let (_, after) = send(&app, Method::GET, "/api/llm/status", None, None).await;
        assert_eq!(after["cache"]["size"], 0);
    }
}
