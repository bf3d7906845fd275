use super::*;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::Result;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedUpload {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    status_calls: Arc<AtomicUsize>,
    chats: Arc<Mutex<Vec<ChatRequest>>>,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
    initialize_flags: Arc<Mutex<Vec<String>>>,
}

async fn handle_status(State(state): State<ServerState>) -> Json<serde_json::Value> {
    state.status_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "status": "online",
        "initialized": true,
        "content_length": 4200,
        "resume_path": "resume.pdf",
        "has_resume": true
    }))
}

async fn handle_chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let message = request.message.clone();
    state.chats.lock().await.push(request);
    if message == "fail" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "LLM quota exhausted" })),
        )
            .into_response();
    }
    Json(json!({
        "answer": "Python, SQL",
        "context": ["Skills: Python, SQL"],
        "question": message
    }))
    .into_response()
}

async fn handle_upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Ok(Some(field)) = multipart.next_field().await {
        let received = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.map(|b| b.to_vec()).unwrap_or_default(),
        };
        state.uploads.lock().await.push(received);
    }
    Json(json!({
        "status": "success",
        "message": "Resume uploaded and processed successfully!",
        "filename": "resume.pdf",
        "content_length": 4200
    }))
}

async fn handle_initialize(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    state
        .initialize_flags
        .lock()
        .await
        .push(query.get("force_reload").cloned().unwrap_or_default());
    Json(json!({ "status": "success", "message": "RAG system initialized", "content_length": 4200 }))
}

async fn handle_reset() -> Json<serde_json::Value> {
    Json(json!({ "status": "success", "message": "System reset successfully" }))
}

async fn handle_sample_questions() -> Json<serde_json::Value> {
    Json(json!({ "questions": ["What are your main technical skills?", "Tell me about your work experience"] }))
}

async fn spawn_backend() -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route(STATUS_PATH, get(handle_status))
        .route(CHAT_PATH, post(handle_chat))
        .route(UPLOAD_PATH, post(handle_upload))
        .route(INITIALIZE_PATH, post(handle_initialize))
        .route(RESET_PATH, delete(handle_reset))
        .route(SAMPLE_QUESTIONS_PATH, get(handle_sample_questions))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

async fn spawn_failing_backend(status: StatusCode, body: &'static str) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().fallback(move || async move { (status, body) });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[test]
fn rejects_invalid_base_urls() {
    assert!(matches!(
        HttpResumeApi::new("not a url"),
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        HttpResumeApi::new("ftp://example.com"),
        Err(ClientError::Validation(_))
    ));
}

#[test]
fn trailing_slash_in_base_url_is_dropped() {
    let api = HttpResumeApi::new("http://127.0.0.1:8000/").expect("api");
    assert_eq!(api.base_url(), "http://127.0.0.1:8000");
    assert_eq!(api.endpoint(STATUS_PATH), "http://127.0.0.1:8000/api/status");
}

#[test]
fn pdf_detection_is_case_insensitive() {
    assert!(UploadFile::from_bytes("resume.pdf", Vec::new()).is_pdf());
    assert!(UploadFile::from_bytes("RESUME.PDF", Vec::new()).is_pdf());
    assert!(!UploadFile::from_bytes("resume.docx", Vec::new()).is_pdf());
    assert!(!UploadFile::from_bytes("resume.pdf.txt", Vec::new()).is_pdf());
    assert_eq!(
        UploadFile::from_path("/tmp/cv/Resume.Pdf").file_name(),
        "Resume.Pdf"
    );
}

#[tokio::test]
async fn status_decodes_backend_payload() {
    let (base_url, server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let status = api.status().await.expect("status");
    assert!(status.status.is_online());
    assert!(status.has_usable_resume());
    assert_eq!(status.content_length, 4200);
    assert_eq!(status.resume_path.as_deref(), Some("resume.pdf"));
    assert_eq!(server.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn chat_posts_message_and_context_chunks() {
    let (base_url, server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let response = api
        .chat(ChatRequest {
            message: "What are your skills?".to_string(),
            context_chunks: 3,
        })
        .await
        .expect("chat");
    assert_eq!(response.answer, "Python, SQL");

    let chats = server.chats.lock().await;
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].message, "What are your skills?");
    assert_eq!(chats[0].context_chunks, 3);
}

#[tokio::test]
async fn chat_surfaces_backend_detail_on_error_status() {
    let (base_url, _server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let err = api
        .chat(ChatRequest {
            message: "fail".to_string(),
            context_chunks: 3,
        })
        .await
        .expect_err("chat should fail");
    assert_eq!(err, ClientError::backend(Some(500), "LLM quota exhausted"));
}

#[tokio::test]
async fn error_status_without_detail_is_a_transport_failure() {
    let base_url = spawn_failing_backend(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
        .await
        .expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let err = api.status().await.expect_err("status should fail");
    assert_eq!(err, ClientError::Transport("API Error: 502".to_string()));

    let err = api
        .upload(UploadFile::from_bytes("resume.pdf", b"%PDF-1.4".to_vec()))
        .await
        .expect_err("upload should fail");
    assert_eq!(err, ClientError::Transport("Upload failed: 502".to_string()));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpResumeApi::new(&format!("http://{addr}")).expect("api");
    let err = api.status().await.expect_err("status should fail");
    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn upload_sends_pdf_as_multipart_file_field() {
    let (base_url, server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let response = api
        .upload(UploadFile::from_bytes("resume.pdf", b"%PDF-1.4 test".to_vec()))
        .await
        .expect("upload");
    assert!(response.is_success());
    assert_eq!(response.content_length, Some(4200));

    let uploads = server.uploads.lock().await;
    assert_eq!(
        uploads.as_slice(),
        &[ReceivedUpload {
            field: "file".to_string(),
            file_name: Some("resume.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4 test".to_vec(),
        }]
    );
}

#[tokio::test]
async fn upload_reads_path_backed_files_lazily() {
    let (base_url, server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let dir = std::env::temp_dir().join(format!("resume_chat_upload_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("dir");
    let path = dir.join("cv.pdf");
    tokio::fs::write(&path, b"%PDF-1.7").await.expect("write");

    api.upload(UploadFile::from_path(&path))
        .await
        .expect("upload");
    assert_eq!(server.uploads.lock().await[0].bytes, b"%PDF-1.7".to_vec());

    let missing = api
        .upload(UploadFile::from_path(dir.join("missing.pdf")))
        .await
        .expect_err("missing file");
    assert!(matches!(missing, ClientError::Validation(_)));
    assert_eq!(server.uploads.lock().await.len(), 1);

    tokio::fs::remove_dir_all(dir).await.expect("cleanup");
}

#[tokio::test]
async fn initialize_passes_force_reload_flag() {
    let (base_url, server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let ack = api.initialize(true).await.expect("initialize");
    assert_eq!(ack.message.as_deref(), Some("RAG system initialized"));
    api.initialize(false).await.expect("initialize");

    assert_eq!(
        server.initialize_flags.lock().await.as_slice(),
        &["true".to_string(), "false".to_string()]
    );
}

#[tokio::test]
async fn reset_and_sample_questions_round_trip() {
    let (base_url, _server) = spawn_backend().await.expect("spawn backend");
    let api = HttpResumeApi::new(&base_url).expect("api");

    let ack = api.reset().await.expect("reset");
    assert_eq!(ack.status.as_deref(), Some("success"));

    let questions = api.sample_questions().await.expect("questions");
    assert_eq!(
        questions,
        vec![
            "What are your main technical skills?".to_string(),
            "Tell me about your work experience".to_string(),
        ]
    );
}

#[tokio::test]
async fn controller_upload_against_http_backend_switches_to_chat() {
    let (base_url, server) = spawn_backend().await.expect("spawn backend");
    let controller =
        crate::SessionController::with_http(&base_url, crate::ControllerSettings::default())
            .expect("controller");

    let outcome = controller
        .upload_file(UploadFile::from_bytes("resume.pdf", b"%PDF-1.4".to_vec()))
        .await;
    assert_eq!(outcome, crate::UploadOutcome::Uploaded);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view(), crate::ViewState::Chat);
    assert_eq!(snapshot.badge().text, "Ready (4200 chars)");
    assert_eq!(server.status_calls.load(Ordering::SeqCst), 1);

    let reply = controller.send_chat_message("What are your skills?").await;
    assert_eq!(reply, crate::ChatOutcome::Answered("Python, SQL".to_string()));
    let transcript = controller.snapshot().transcript().to_vec();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].text, "What are your skills?");
    assert_eq!(transcript[1].text, "Python, SQL");
}
