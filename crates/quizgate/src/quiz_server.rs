//! The quiz service: serves questions to sessions it did not issue.
//!
//! Every protected request goes through the same pipeline:
//!
//! ```text
//! Cookie ─→ TrustBridge::resolve ─→ local decode ─→ RequestSession
//!                                                        │ handler mutates
//!                                                        ▼
//!                                   Set-Cookie ←── write_back (same expiry)
//! ```
//!
//! Protected API routes answer an unauthenticated caller with **200** and
//! `{"authenticated": false, "error", "redirect"}`; the page route `/quiz`
//! redirects instead.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quizgate_bridge::{BridgeConfig, HttpRemoteVerifier, RemoteVerifier, TrustBridge};
use quizgate_quiz::{Answer, QuestionBank, next_question, score_report, submit_answer};
use quizgate_token::{Identity, QuestionId, SessionPayload, TokenCodec, TokenError, unix_now};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::cookie;
use crate::{QuizgateError, health};

/// Shared state for the quiz service's handlers.
pub struct QuizState<R> {
    bridge: TrustBridge<R>,
    bank: QuestionBank,
    login_url: String,
}

impl<R: RemoteVerifier> QuizState<R> {
    /// Bundles the bridge, question bank and login redirect target.
    pub fn new(bridge: TrustBridge<R>, bank: QuestionBank, login_url: impl Into<String>) -> Self {
        Self {
            bridge,
            bank,
            login_url: login_url.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestSession
// ---------------------------------------------------------------------------

/// The verified session payload for one request.
///
/// Handlers read and mutate it explicitly; nothing is written to the client
/// unless [`write_back`](Self::write_back) is called.
#[derive(Debug)]
pub struct RequestSession {
    payload: SessionPayload,
    expires_at: u64,
    modified: bool,
}

impl RequestSession {
    /// Wraps a decoded payload; starts unmodified.
    pub fn new(payload: SessionPayload, expires_at: u64) -> Self {
        Self {
            payload,
            expires_at,
            modified: false,
        }
    }

    /// Who the session belongs to.
    pub fn identity(&self) -> &Identity {
        &self.payload.identity
    }

    /// Read-only view of the payload.
    pub fn payload(&self) -> &SessionPayload {
        &self.payload
    }

    /// Mutable access; marks the session for [`write_back`](Self::write_back).
    pub fn payload_mut(&mut self) -> &mut SessionPayload {
        self.modified = true;
        &mut self.payload
    }

    /// Expiry of the token this session came from, in Unix seconds.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Re-encodes a modified payload into a `Set-Cookie` value.
    ///
    /// The token keeps its original expiry, so quiz activity never
    /// lengthens a session. Returns `None` if the payload wasn't touched.
    ///
    /// # Errors
    /// [`TokenError::TooLarge`] (as [`QuizgateError::Token`]) if the payload
    /// has outgrown the cookie; no cookie is set in that case.
    pub fn write_back(self, codec: &TokenCodec) -> Result<Option<String>, QuizgateError> {
        if !self.modified {
            return Ok(None);
        }
        let token = codec.encode(&self.payload, self.expires_at)?;
        let max_age = Duration::from_secs(self.expires_at.saturating_sub(unix_now()));
        Ok(Some(cookie::set_session_cookie(token.as_str(), max_age)))
    }
}

/// Resolves the request's cookie into a [`RequestSession`].
///
/// Returns `None` when the caller isn't authenticated. A positive remote
/// answer for a token this service can't decode (or that names someone
/// else) means the two services disagree on the secret; that is logged and
/// treated as unauthenticated. A token that expired between the remote
/// answer and the local decode is just unauthenticated.
pub async fn establish_session<R: RemoteVerifier>(
    state: &QuizState<R>,
    headers: &HeaderMap,
) -> Option<RequestSession> {
    let token = cookie::session_token(headers);
    let resolution = state.bridge.resolve(token).await;

    let (Some(token), Some(identity)) = (token, resolution.identity()) else {
        return None;
    };

    match state.bridge.codec().decode_claims(token) {
        Ok(claims) if &claims.payload.identity == identity => {
            Some(RequestSession::new(claims.payload, claims.expires_at))
        }
        Ok(claims) => {
            tracing::error!(
                remote = %identity,
                local = %claims.payload.identity,
                "identity service and local decode disagree; check SESSION_SECRET"
            );
            None
        }
        Err(TokenError::Expired { expired_at }) => {
            tracing::debug!(
                expired_at,
                source = ?resolution.source,
                "session expired after remote verification"
            );
            None
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                source = ?resolution.source,
                "accepted session does not decode locally; check SESSION_SECRET"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Unauthenticated<'a> {
    authenticated: bool,
    error: &'static str,
    redirect: &'a str,
}

fn unauthenticated(login_url: &str) -> Response {
    Json(Unauthenticated {
        authenticated: false,
        error: "not authenticated",
        redirect: login_url,
    })
    .into_response()
}

/// What `GET /quiz` returns to a logged-in user.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizSummary {
    pub identity: Identity,
    pub score: u32,
    pub answered: usize,
    pub total: usize,
}

/// Body of `POST /api/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: QuestionId,
    pub answer: Answer,
}

/// Builds the quiz service router.
pub fn quiz_router<R: RemoteVerifier>(state: Arc<QuizState<R>>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/quiz") }))
        .route("/quiz", get(quiz_page::<R>))
        .route("/api/question", get(question::<R>))
        .route("/api/answer", post(answer::<R>))
        .route("/api/score", get(score::<R>))
        .route("/logout", get(logout::<R>).post(logout::<R>))
        .route("/health", get(|| health("quiz")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn quiz_page<R: RemoteVerifier>(
    State(state): State<Arc<QuizState<R>>>,
    headers: HeaderMap,
) -> Response {
    let Some(session) = establish_session(&state, &headers).await else {
        return Redirect::to(&state.login_url).into_response();
    };

    let report = score_report(session.payload());
    Json(QuizSummary {
        identity: session.identity().clone(),
        score: report.score,
        answered: report.answered,
        total: state.bank.len(),
    })
    .into_response()
}

async fn question<R: RemoteVerifier>(
    State(state): State<Arc<QuizState<R>>>,
    headers: HeaderMap,
) -> Result<Response, QuizgateError> {
    let Some(session) = establish_session(&state, &headers).await else {
        return Ok(unauthenticated(&state.login_url));
    };

    let question = next_question(&state.bank, session.payload(), &mut rand::rng())?;
    Ok(Json(question).into_response())
}

async fn answer<R: RemoteVerifier>(
    State(state): State<Arc<QuizState<R>>>,
    headers: HeaderMap,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Response, QuizgateError> {
    let Some(mut session) = establish_session(&state, &headers).await else {
        return Ok(unauthenticated(&state.login_url));
    };

    let Json(request) = body.map_err(|e| QuizgateError::BadRequest(e.body_text()))?;

    let outcome = submit_answer(
        &state.bank,
        session.payload_mut(),
        request.question_id,
        request.answer,
    )?;

    let set_cookie = session.write_back(state.bridge.codec())?;
    Ok((
        AppendHeaders(set_cookie.map(|c| (header::SET_COOKIE, c))),
        Json(outcome),
    )
        .into_response())
}

async fn score<R: RemoteVerifier>(
    State(state): State<Arc<QuizState<R>>>,
    headers: HeaderMap,
) -> Response {
    match establish_session(&state, &headers).await {
        Some(session) => Json(score_report(session.payload())).into_response(),
        None => unauthenticated(&state.login_url),
    }
}

async fn logout<R: RemoteVerifier>(State(state): State<Arc<QuizState<R>>>) -> Response {
    (
        [(header::SET_COOKIE, cookie::clear_session_cookie())],
        Redirect::to(&state.login_url),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Builder / server
// ---------------------------------------------------------------------------

/// Builder for the quiz service.
pub struct QuizServerBuilder {
    bind_addr: String,
    login_url: String,
    bridge_config: BridgeConfig,
    bank: Option<QuestionBank>,
}

impl QuizServerBuilder {
    /// Defaults: `127.0.0.1:5002`, login at `/login`, built-in questions.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:5002".to_string(),
            login_url: "/login".to_string(),
            bridge_config: BridgeConfig::default(),
            bank: None,
        }
    }

    /// Address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Where unauthenticated callers are sent.
    pub fn login_url(mut self, url: &str) -> Self {
        self.login_url = url.to_string();
        self
    }

    /// Remote verification settings, such as the timeout.
    pub fn bridge_config(mut self, config: BridgeConfig) -> Self {
        self.bridge_config = config;
        self
    }

    /// Uses `bank` instead of the built-in questions.
    pub fn bank(mut self, bank: QuestionBank) -> Self {
        self.bank = Some(bank);
        self
    }

    /// Builds a server that verifies sessions against the identity service
    /// at `auth_service_url`.
    pub async fn build(
        self,
        auth_service_url: &str,
        codec: TokenCodec,
    ) -> Result<QuizServer, QuizgateError> {
        let remote = HttpRemoteVerifier::new(auth_service_url, self.bridge_config.remote_timeout)?;
        self.build_with_remote(remote, codec).await
    }

    /// Builds a server with a custom [`RemoteVerifier`].
    pub async fn build_with_remote<R: RemoteVerifier>(
        self,
        remote: R,
        codec: TokenCodec,
    ) -> Result<QuizServer, QuizgateError> {
        let bank = match self.bank {
            Some(bank) => bank,
            None => QuestionBank::builtin()?,
        };
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let bridge = TrustBridge::new(remote, codec, self.bridge_config);
        let state = Arc::new(QuizState::new(bridge, bank, self.login_url));

        Ok(QuizServer {
            listener,
            router: quiz_router(state),
        })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run quiz service.
pub struct QuizServer {
    listener: TcpListener,
    router: Router,
}

impl QuizServer {
    /// Starts a [`QuizServerBuilder`].
    pub fn builder() -> QuizServerBuilder {
        QuizServerBuilder::new()
    }

    /// The bound address; useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C.
    pub async fn run(self) -> Result<(), QuizgateError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "quiz service listening");
        crate::serve(self.listener, self.router).await
    }
}
