use axum::extract::{ Path, State };
use axum::http::{ HeaderMap, StatusCode };
use axum::response::IntoResponse;
use axum::routing::{ get, patch, post };
use axum::{ Json, Router };
use craddule_chat::api::{ ApiError, ChatBackend, HttpBackend };
use craddule_chat::models::Sender;
use craddule_chat::session::StaticSession;
use craddule_chat::shell::ChatShell;
use craddule_chat::thread::{ FollowUpAnswer, SendOutcome, SEND_FAILED };
use parking_lot::Mutex;
use serde_json::{ json, Value as JsonValue };
use std::sync::Arc;
use url::Url;

#[derive(Clone, Default)]
struct Recorded {
    auth: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<JsonValue>>>,
}

impl Recorded {
    fn note(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        self.auth.lock().push(value);
    }
}

fn analysis() -> JsonValue {
    json!({
        "summary": "Subscription fitness app",
        "suggestions": [{ "direction": "Niche", "description": "Busy parents" }],
        "features": ["Workout plans"],
        "monetization": [{ "stream": "Subscription", "rationale": "Recurring" }],
        "revenue_estimates": [
            { "stream": "Subscription", "estimates": { "low": 1000, "likely": 2000, "high": 5000 } }
        ],
        "go_to_market": [{ "channel": "Instagram", "success_percentage": 55 }]
    })
}

async fn list(State(rec): State<Recorded>, headers: HeaderMap) -> impl IntoResponse {
    rec.note(&headers);
    Json(
        json!([
            { "_id": "c1", "title": "Fitness" },
            { "id": "c2" },
            { "_id": "6650f0", "id": "c3", "title": "Meal kits" }
        ])
    )
}

async fn rename(
    State(rec): State<Recorded>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>
) -> impl IntoResponse {
    rec.note(&headers);
    rec.bodies.lock().push(body.clone());
    if id == "locked" {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "nope" })));
    }
    (StatusCode::OK, Json(json!({ "title": body["newTitle"] })))
}

async fn messages(
    State(rec): State<Recorded>,
    Path(id): Path<String>,
    headers: HeaderMap
) -> impl IntoResponse {
    rec.note(&headers);
    if id != "c1" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })));
    }
    let stored = format!(
        "```json\n{}\n```\nDo you want me to create a Business Plan and Marketing doc?",
        analysis()
    );
    (
        StatusCode::OK,
        Json(
            json!([
                { "from": "system", "text": "You are a business analyst." },
                { "from": "user", "text": "my idea" },
                { "from": "bot", "text": stored }
            ])
        ),
    )
}

async fn chat(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>
) -> impl IntoResponse {
    rec.note(&headers);
    rec.bodies.lock().push(body.clone());
    match body["message"].as_str().unwrap_or_default() {
        "explode" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))),
        "analyse" => (StatusCode::OK, Json(json!({ "reply": analysis() }))),
        "analyse as text" => (StatusCode::OK, Json(json!({ "reply": analysis().to_string() }))),
        "analyse partial" =>
            (
                StatusCode::OK,
                Json(
                    json!({
                    "reply": {
                        "summary": "Meal kits",
                        "suggestions": [{ "direction": "Niche" }],
                        "monetization": null,
                        "revenue_estimates": null,
                        "go_to_market": [{ "channel": "Radio", "success_percentage": null }]
                    }
                })
                ),
            ),
        other => (StatusCode::OK, Json(json!({ "reply": format!("echo: {}", other) }))),
    }
}

async fn spawn_backend() -> (Url, Recorded) {
    let rec = Recorded::default();
    let app = Router::new()
        .route("/api/bot-chat/conversations", get(list))
        .route("/api/bot-chat/conversations/{id}/title", patch(rename))
        .route("/api/bot-chat/conversation/{id}/messages", get(messages))
        .route("/api/bot-chat/chat", post(chat))
        .with_state(rec.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (Url::parse(&format!("http://{}", addr)).unwrap(), rec)
}

fn client(base: Url, token: Option<&str>) -> HttpBackend {
    HttpBackend::new(base, Arc::new(StaticSession::new(token.map(str::to_string))))
}

#[tokio::test]
async fn lists_conversations_with_bearer_token() {
    let (base, rec) = spawn_backend().await;
    let backend = client(base, Some("tok-123"));

    let conversations = backend.list_conversations().await.unwrap();
    assert_eq!(conversations.len(), 3);
    assert_eq!(conversations[0].id, "c1");
    assert_eq!(conversations[1].display_title(), "Conversation c2");
    assert_eq!(conversations[2].id, "c3");
    assert_eq!(conversations[2].display_title(), "Meal kits");
    assert_eq!(rec.auth.lock().as_slice(), ["Bearer tok-123"]);
}

#[tokio::test]
async fn missing_token_still_sends_bearer_header() {
    let (base, rec) = spawn_backend().await;
    let backend = client(base, None);

    backend.list_conversations().await.unwrap();
    assert!(rec.auth.lock()[0].starts_with("Bearer"));
}

#[tokio::test]
async fn rename_sends_new_title() {
    let (base, rec) = spawn_backend().await;
    let backend = client(base, Some("tok"));

    let title = backend.rename_conversation("c1", "Gym plan").await.unwrap();
    assert_eq!(title, "Gym plan");
    assert_eq!(rec.bodies.lock()[0], json!({ "newTitle": "Gym plan" }));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base, _rec) = spawn_backend().await;
    let backend = client(base, Some("tok"));

    match backend.rename_conversation("locked", "x").await {
        Err(ApiError::Status { status, .. }) => assert_eq!(status.as_u16(), 403),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn send_carries_conversation_id() {
    let (base, rec) = spawn_backend().await;
    let backend = client(base, Some("tok"));

    let reply = backend.send_message("hello", Some("c1")).await.unwrap();
    assert_eq!(reply, json!("echo: hello"));
    assert_eq!(rec.bodies.lock()[0], json!({ "message": "hello", "conversation_id": "c1" }));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = client(Url::parse(&format!("http://{}", addr)).unwrap(), Some("tok"));

    assert!(matches!(backend.list_conversations().await, Err(ApiError::Transport(_))));
}

#[tokio::test]
async fn shell_round_trip_over_http() {
    let (base, _rec) = spawn_backend().await;
    let session = Arc::new(StaticSession::new(Some("tok".into())));
    let backend = Arc::new(HttpBackend::new(base, session.clone()));
    let mut shell = ChatShell::new(backend, session, 1280);
    shell.mount().await;
    assert_eq!(shell.directory().conversations().len(), 3);

    shell.select_conversation("c1").await;
    let thread = shell.thread().clone();
    let loaded = thread.snapshot();
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.follow_up_index(), Some(1));

    assert_eq!(thread.send_message("analyse").await, SendOutcome::Delivered);
    let fresh = thread.snapshot();
    assert_eq!(fresh.messages[3].text, loaded.messages[1].text);
    assert_eq!(fresh.follow_up_index(), Some(3));

    assert_eq!(thread.send_message("analyse as text").await, SendOutcome::Delivered);
    assert!(thread.snapshot().messages[5].text.as_analysis().is_some());

    assert_eq!(thread.answer_follow_up(FollowUpAnswer::No).await, SendOutcome::Delivered);
    assert_eq!(thread.snapshot().messages[7].text.as_plain(), Some("echo: NO"));

    assert_eq!(thread.send_message("analyse partial").await, SendOutcome::Delivered);
    let partial = thread.snapshot();
    assert_eq!(partial.messages[9].text.as_analysis().unwrap().summary, "Meal kits");
    assert_eq!(partial.follow_up_index(), Some(9));

    assert_eq!(thread.send_message("explode").await, SendOutcome::Failed);
    let failed = thread.snapshot();
    assert_eq!(failed.messages.last().unwrap().from, Sender::User);
    assert_eq!(failed.error.as_deref(), Some(SEND_FAILED));
}
