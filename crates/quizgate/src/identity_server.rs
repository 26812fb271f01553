//! The identity service: login, session issuance and verification.
//!
//! | Route | Behavior |
//! |---|---|
//! | `GET /login` | 303 to the home URL if already logged in, else a JSON hint |
//! | `POST /auth`, `POST /authenticate` | check credentials, set the session cookie |
//! | `GET /verify` | 200 `{authenticated: true, identity}` or 401 |
//! | `GET\|POST /logout` | clear the cookie, 303 to `/login` |
//! | `GET /health` | liveness |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quizgate_identity::{CredentialVerifier, CredentialStore, SessionIssuer, SessionVerifier};
use quizgate_token::TokenCodec;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::cookie;
use crate::{QuizgateError, health};

const LOGIN_PATH: &str = "/login";

/// Shared state for the identity service's handlers.
pub struct IdentityState<S: CredentialStore> {
    issuer: SessionIssuer<S>,
    verifier: SessionVerifier,
    home_url: String,
}

impl<S: CredentialStore> IdentityState<S> {
    /// Builds the issuer and verifier over one store and codec.
    pub fn new(store: S, codec: TokenCodec, home_url: impl Into<String>) -> Self {
        Self {
            issuer: SessionIssuer::new(CredentialVerifier::new(store), codec.clone()),
            verifier: SessionVerifier::new(codec),
            home_url: home_url.into(),
        }
    }
}

/// Login form. Accepts either `identity`/`secret` or the browser-form
/// names `username`/`password`. Missing fields read as empty.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default, alias = "username")]
    pub identity: String,
    #[serde(default, alias = "password")]
    pub secret: String,
}

#[derive(Serialize)]
struct LoginHint {
    authenticated: bool,
    login: &'static str,
}

/// Builds the identity service router.
pub fn identity_router<S: CredentialStore>(state: Arc<IdentityState<S>>) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(login_page::<S>))
        .route("/auth", post(authenticate::<S>))
        .route("/authenticate", post(authenticate::<S>))
        .route("/verify", get(verify::<S>))
        .route("/logout", get(logout::<S>).post(logout::<S>))
        .route("/health", get(|| health("identity")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn login_page<S: CredentialStore>(
    State(state): State<Arc<IdentityState<S>>>,
    headers: HeaderMap,
) -> Response {
    if state
        .verifier
        .state(cookie::session_token(&headers))
        .is_authenticated()
    {
        return Redirect::to(&state.home_url).into_response();
    }

    Json(LoginHint {
        authenticated: false,
        login: "POST /auth with form fields username and password",
    })
    .into_response()
}

async fn authenticate<S: CredentialStore>(
    State(state): State<Arc<IdentityState<S>>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, QuizgateError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable login form");
            LoginForm::default()
        }
    };

    let issued = state
        .issuer
        .authenticate(&form.identity, &form.secret)
        .await?;

    let set_cookie = cookie::set_session_cookie(issued.token.as_str(), issued.max_age);
    Ok((
        [(header::SET_COOKIE, set_cookie)],
        Redirect::to(&state.home_url),
    )
        .into_response())
}

async fn verify<S: CredentialStore>(
    State(state): State<Arc<IdentityState<S>>>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.verifier.check(cookie::session_token(&headers));
    let status = if outcome.is_authenticated() {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(outcome)).into_response()
}

async fn logout<S: CredentialStore>(
    State(state): State<Arc<IdentityState<S>>>,
    headers: HeaderMap,
) -> Response {
    state
        .verifier
        .state(cookie::session_token(&headers))
        .logout();

    (
        [(header::SET_COOKIE, cookie::clear_session_cookie())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Builder / server
// ---------------------------------------------------------------------------

/// Builder for the identity service.
///
/// ```rust,ignore
/// let server = IdentityServer::builder()
///     .bind("0.0.0.0:5001")
///     .build(MemoryCredentialStore::demo(), settings.codec().clone())
///     .await?;
/// server.run().await
/// ```
pub struct IdentityServerBuilder {
    bind_addr: String,
    home_url: String,
}

impl IdentityServerBuilder {
    /// Defaults: `127.0.0.1:5001`, home at `/quiz`.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".to_string(),
            home_url: "/quiz".to_string(),
        }
    }

    /// Address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Where the browser goes after logging in.
    pub fn home_url(mut self, url: &str) -> Self {
        self.home_url = url.to_string();
        self
    }

    /// Binds the listener and assembles the router.
    pub async fn build<S: CredentialStore>(
        self,
        store: S,
        codec: TokenCodec,
    ) -> Result<IdentityServer, QuizgateError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let state = Arc::new(IdentityState::new(store, codec, self.home_url));
        Ok(IdentityServer {
            listener,
            router: identity_router(state),
        })
    }
}

impl Default for IdentityServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run identity service.
pub struct IdentityServer {
    listener: TcpListener,
    router: Router,
}

impl IdentityServer {
    /// Starts an [`IdentityServerBuilder`].
    pub fn builder() -> IdentityServerBuilder {
        IdentityServerBuilder::new()
    }

    /// The bound address; useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C.
    pub async fn run(self) -> Result<(), QuizgateError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "identity service listening");
        crate::serve(self.listener, self.router).await
    }
}
