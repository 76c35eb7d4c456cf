use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::app::{render_admin_login, render_dashboard, render_feedback_form, render_thank_you};
use crate::error::{AppError, AuthError};
use crate::model::{FeedbackForm, LoginForm};
use crate::session::SessionStore;
use crate::state::State;
use crate::submit_feedback;

type SharedState = AxumState<Arc<State>>;

pub fn build_router(state: Arc<State>) -> Router {
    Router::new()
        .route("/", get(feedback_form_handler))
        .route("/submit", post(submit_handler))
        .route("/thankyou", get(thank_you_handler))
        .route("/admin", get(admin_login_page_handler).post(admin_login_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/logout", get(logout_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn feedback_form_handler() -> Html<String> {
    Html(render_feedback_form())
}

pub async fn submit_handler(
    AxumState(state): SharedState,
    body: Bytes,
) -> Result<Redirect, AppError> {
    // Any body is accepted, whatever its content type.
    let form = FeedbackForm::from_body(&body);
    let storage = state.storage.clone();
    let entry = tokio::task::spawn_blocking(move || submit_feedback(&storage, form)).await??;
    info!("Stored feedback {}", entry.id);
    Ok(Redirect::to("/thankyou"))
}

pub async fn thank_you_handler() -> Html<String> {
    Html(render_thank_you())
}

pub async fn admin_login_page_handler() -> Html<String> {
    Html(render_admin_login(None))
}

pub async fn admin_login_handler(
    AxumState(state): SharedState,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let form = LoginForm::from_body(&body);
    let session = state.auth.login(&form.password).inspect_err(|_| {
        warn!("Rejected admin login attempt");
    })?;

    // Always start from a fresh session id on login.
    state.sessions.take(&headers).await;
    let cookie = state.sessions.create(session).await;
    info!("Admin logged in");

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response())
}

pub async fn dashboard_handler(
    AxumState(state): SharedState,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let session = state.sessions.load(&headers).await;
    if !state.auth.require_admin(session.as_ref()) {
        return Err(AuthError::Unauthorized.into());
    }

    let storage = state.storage.clone();
    let rows = tokio::task::spawn_blocking(move || storage.list_all()).await??;
    let summary = aggregate(&rows);
    Ok(Html(render_dashboard(rows, summary)))
}

pub async fn logout_handler(AxumState(state): SharedState, headers: HeaderMap) -> Response {
    if let Some(mut session) = state.sessions.take(&headers).await {
        state.auth.logout(&mut session);
        info!("Admin logged out");
    }

    (
        [(header::SET_COOKIE, SessionStore::expired_cookie())],
        Redirect::to("/admin"),
    )
        .into_response()
}
