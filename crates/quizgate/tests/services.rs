//! End-to-end tests: both services on real sockets, driven by reqwest the
//! way a browser would drive them (cookies by hand, redirects not followed).

use std::time::Duration;

use quizgate::HealthResponse;
use quizgate::prelude::*;
use quizgate_quiz::AnswerKey;
use reqwest::StatusCode;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use serde_json::Value;

const SECRET: &[u8] = b"integration-shared-secret-0123456789";

fn settings(secret: &[u8]) -> SessionSettings {
    SessionSettings::new(secret, DEFAULT_TTL).unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn spawn_identity(codec: TokenCodec) -> String {
    let server = IdentityServer::builder()
        .bind("127.0.0.1:0")
        .build(MemoryCredentialStore::demo(), codec)
        .await
        .expect("identity service binds");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    format!("http://{addr}")
}

async fn spawn_quiz(auth_url: &str, codec: TokenCodec) -> String {
    let server = QuizServer::builder()
        .bind("127.0.0.1:0")
        .bridge_config(BridgeConfig {
            remote_timeout: Duration::from_secs(2),
        })
        .build(auth_url, codec)
        .await
        .expect("quiz service binds");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    format!("http://{addr}")
}

/// A URL nothing listens on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Extracts the session token from a `Set-Cookie` response header.
fn session_from(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find_map(|pair| pair.strip_prefix("session="))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn login(identity_url: &str, username: &str, password: &str) -> reqwest::Response {
    client()
        .post(format!("{identity_url}/auth"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .unwrap()
}

async fn get_with(url: String, token: Option<&str>) -> reqwest::Response {
    let mut req = client().get(url);
    if let Some(token) = token {
        req = req.header(COOKIE, format!("session={token}"));
    }
    req.send().await.unwrap()
}

// =========================================================================
// Identity service
// =========================================================================

#[tokio::test]
async fn test_login_admin_sets_cookie_and_redirects() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;

    let resp = login(&identity, "admin", "admin123").await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/quiz");
    let set_cookie = resp.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(!set_cookie.contains("Domain"));
    assert!(session_from(&resp).is_some());
}

#[tokio::test]
async fn test_login_wrong_password_is_401_without_cookie() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;

    let resp = login(&identity, "admin", "wrong").await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;

    let unknown = login(&identity, "nobody", "admin123").await;
    let unknown_status = unknown.status();
    let unknown_body: Value = unknown.json().await.unwrap();
    let wrong = login(&identity, "admin", "nope").await;
    let wrong_status = wrong.status();
    let wrong_body: Value = wrong.json().await.unwrap();

    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_login_missing_fields_is_400() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;

    let resp = login(&identity, "admin", "   ").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client()
        .post(format!("{identity}/auth"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authenticate_alias_accepts_identity_fields() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;

    let resp = client()
        .post(format!("{identity}/authenticate"))
        .form(&[("identity", "demo"), ("secret", "demo456")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(session_from(&resp).is_some());
}

#[tokio::test]
async fn test_verify_reports_identity_or_401() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;
    let token = session_from(&login(&identity, "user1", "pass123").await).unwrap();

    let ok = get_with(format!("{identity}/verify"), Some(&token)).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["identity"], "user1");

    let none = get_with(format!("{identity}/verify"), None).await;
    assert_eq!(none.status(), StatusCode::UNAUTHORIZED);
    let body: Value = none.json().await.unwrap();
    assert_eq!(body["authenticated"], false);
    assert!(body.get("identity").is_none());
}

#[tokio::test]
async fn test_login_page_redirects_when_already_logged_in() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    let resp = get_with(format!("{identity}/login"), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = get_with(format!("{identity}/login"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie_but_old_token_still_decodes() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    let resp = get_with(format!("{identity}/logout"), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[LOCATION], "/login");
    assert!(resp.headers()[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));

    // No revocation list: a copy of the token is valid until it expires.
    let verify = get_with(format!("{identity}/verify"), Some(&token)).await;
    assert_eq!(verify.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_failed_login_leaves_existing_session_alone() {
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    let _ = login(&identity, "admin", "wrong").await;

    let verify = get_with(format!("{identity}/verify"), Some(&token)).await;
    assert_eq!(verify.status(), StatusCode::OK);
}

// =========================================================================
// Quiz service
// =========================================================================

#[tokio::test]
async fn test_quiz_without_token_is_unauthenticated() {
    let s = settings(SECRET);
    let identity = spawn_identity(s.codec().clone()).await;
    let quiz = spawn_quiz(&identity, s.codec().clone()).await;

    let resp = get_with(format!("{quiz}/api/question"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["redirect"], "/login");

    let page = get_with(format!("{quiz}/quiz"), None).await;
    assert_eq!(page.status(), StatusCode::SEE_OTHER);
    assert_eq!(page.headers()[LOCATION], "/login");
}

#[tokio::test]
async fn test_quiz_accepts_session_from_identity_service() {
    let s = settings(SECRET);
    let identity = spawn_identity(s.codec().clone()).await;
    let quiz = spawn_quiz(&identity, s.codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    let page = get_with(format!("{quiz}/quiz"), Some(&token)).await;
    assert_eq!(page.status(), StatusCode::OK);
    let body: Value = page.json().await.unwrap();
    assert_eq!(body["identity"], "admin");
    assert_eq!(body["score"], 0);

    let q = get_with(format!("{quiz}/api/question"), Some(&token)).await;
    let body: Value = q.json().await.unwrap();
    assert!(body["id"].is_u64());
    assert!(body.get("correct_answer").is_none());
}

#[tokio::test]
async fn test_answer_updates_cookie_and_keeps_expiry() {
    let s = settings(SECRET);
    let identity = spawn_identity(s.codec().clone()).await;
    let quiz = spawn_quiz(&identity, s.codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();
    let original_exp = s.codec().decode_claims(&token).unwrap().expires_at;

    let q: Value = get_with(format!("{quiz}/api/question"), Some(&token))
        .await
        .json()
        .await
        .unwrap();
    let id = QuestionId(q["id"].as_u64().unwrap());
    let bank = QuestionBank::builtin().unwrap();
    let correct = match &bank.get(id).unwrap().key {
        AnswerKey::MultipleChoice { correct_answer, .. } => serde_json::json!(correct_answer),
        AnswerKey::TrueFalse { correct_answer } => serde_json::json!(correct_answer),
    };

    let resp = client()
        .post(format!("{quiz}/api/answer"))
        .header(COOKIE, format!("session={token}"))
        .json(&serde_json::json!({ "question_id": id.0, "answer": correct }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = session_from(&resp).expect("answer writes the session back");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["correct"], true);
    assert_eq!(body["score"], 1);

    let claims = s.codec().decode_claims(&updated).unwrap();
    assert_eq!(claims.expires_at, original_exp);
    assert!(claims.payload.has_answered(id));

    let score: Value = get_with(format!("{quiz}/api/score"), Some(&updated))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(score["score"], 1);
    assert_eq!(score["answered"], 1);

    // Answering the same question again with the updated cookie is refused.
    let again = client()
        .post(format!("{quiz}/api/answer"))
        .header(COOKIE, format!("session={updated}"))
        .json(&serde_json::json!({ "question_id": id.0, "answer": correct }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert!(again.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_answer_bad_input() {
    let s = settings(SECRET);
    let identity = spawn_identity(s.codec().clone()).await;
    let quiz = spawn_quiz(&identity, s.codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    for body in [
        serde_json::json!({ "question_id": "not_a_number", "answer": true }),
        serde_json::json!({ "answer": true }),
        serde_json::json!({ "question_id": 1 }),
    ] {
        let resp = client()
            .post(format!("{quiz}/api/answer"))
            .header(COOKIE, format!("session={token}"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
    }

    let resp = client()
        .post(format!("{quiz}/api/answer"))
        .header(COOKIE, format!("session={token}"))
        .json(&serde_json::json!({ "question_id": 99999, "answer": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiz_falls_back_when_identity_service_is_down() {
    let s = settings(SECRET);
    let quiz = spawn_quiz(&dead_url().await, s.codec().clone()).await;
    let token = s
        .codec()
        .issue(&SessionPayload::new("admin"))
        .unwrap()
        .into_string();

    let ok: Value = get_with(format!("{quiz}/api/score"), Some(&token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(ok["score"], 0);

    let junk: Value = get_with(format!("{quiz}/api/score"), Some("junk.token"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(junk["authenticated"], false);
}

#[tokio::test]
async fn test_quiz_rejects_session_signed_with_other_secret() {
    // Identity and quiz disagree on the secret: the remote says yes, the
    // local decode says no, and the quiz service refuses.
    let identity = spawn_identity(settings(SECRET).codec().clone()).await;
    let quiz = spawn_quiz(&identity, settings(b"a-different-secret").codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    let body: Value = get_with(format!("{quiz}/api/score"), Some(&token))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_concurrent_requests_all_resolve_admin() {
    let s = settings(SECRET);
    let identity = spawn_identity(s.codec().clone()).await;
    let quiz = spawn_quiz(&identity, s.codec().clone()).await;
    let token = session_from(&login(&identity, "admin", "admin123").await).unwrap();

    let mut handles = Vec::new();
    for _ in 0..100 {
        let url = format!("{quiz}/quiz");
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let body: Value = get_with(url, Some(&token)).await.json().await.unwrap();
            body["identity"].as_str().map(str::to_string)
        }));
    }

    for h in handles {
        assert_eq!(h.await.unwrap().as_deref(), Some("admin"));
    }
}

#[tokio::test]
async fn test_quiz_logout_and_health() {
    let s = settings(SECRET);
    let quiz = spawn_quiz(&dead_url().await, s.codec().clone()).await;

    let resp = get_with(format!("{quiz}/logout"), None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(resp.headers()[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));

    let health: HealthResponse = get_with(format!("{quiz}/health"), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "quiz");
}
