use super::*;
use crate::test_support::MockBackend;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn post_json_sends_body_and_returns_payload() {
    let (base_url, backend) = MockBackend::spawn().await.expect("spawn backend");
    backend.respond("/auth/login", StatusCode::OK, json!({"token": "t1"}));
    let api = ApiClient::new(&base_url).expect("client");

    let payload = api
        .post_json("/auth/login", "Login", &json!({"email": "a@b.com", "password": "x"}))
        .await
        .expect("login payload");

    assert_eq!(payload, json!({"token": "t1"}));
    assert_eq!(
        backend.last_body("/auth/login"),
        Some(json!({"email": "a@b.com", "password": "x"}))
    );
}

#[tokio::test]
async fn non_success_status_carries_backend_detail() {
    let (base_url, backend) = MockBackend::spawn().await.expect("spawn backend");
    backend.respond(
        "/auth/login",
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Invalid email or password"}),
    );
    let api = ApiClient::new(&base_url).expect("client");

    let err = api
        .post_json("/auth/login", "Login", &json!({}))
        .await
        .expect_err("should fail");

    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_success_without_detail_uses_generic_message() {
    let (base_url, backend) = MockBackend::spawn().await.expect("spawn backend");
    backend.respond("/save-summary", StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    let api = ApiClient::new(&base_url).expect("client");

    let err = api
        .post_json("/save-summary", "Save Summary", &json!({}))
        .await
        .expect_err("should fail");

    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = ApiClient::new(&format!("http://{addr}")).expect("client");

    let err = api
        .get_json("/summary/get_all_summaries/", "List Summaries")
        .await
        .expect_err("should fail");

    assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn upload_sends_single_file_field_as_multipart() {
    let (base_url, backend) = MockBackend::spawn().await.expect("spawn backend");
    backend.respond("/pdf/upload", StatusCode::OK, json!({"pdf_id": 42}));
    let api = ApiClient::new(&base_url).expect("client");
    let file = SelectedFile::pdf("paper.pdf", b"%PDF-1.7 test".to_vec());

    let payload = api
        .upload_file("/pdf/upload", "Upload", &file)
        .await
        .expect("upload payload");

    assert_eq!(payload, json!({"pdf_id": 42}));
    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field_name, UPLOAD_FIELD_NAME);
    assert_eq!(uploads[0].file_name.as_deref(), Some("paper.pdf"));
    assert_eq!(uploads[0].content_type.as_deref(), Some(PDF_MIME_TYPE));
    assert_eq!(uploads[0].bytes, b"%PDF-1.7 test".to_vec());
}

#[test]
fn decode_reports_shape_mismatch_as_malformed() {
    let err = decode::<Vec<i64>>("List Summaries", json!({"not": "a list"}))
        .expect_err("should fail");
    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[test]
fn new_rejects_invalid_base_url() {
    assert!(ApiClient::new("::::").is_err());
}
