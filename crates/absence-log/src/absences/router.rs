use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use super::auth::{
    expired_session_cookie, session_cookie, session_token, SessionRegistry, UserDirectory,
};
use super::notify::ReportNotifier;
use super::service::{AbsenceService, AbsenceServiceError};
use super::store::RecordStore;
use super::submission::AbsenceSubmission;
use super::views::{self, FlashLevel};
use crate::error::AppError;

pub const LOGIN_FAILED: &str = "Login Unsuccessful. Please check username and password";
pub const EMAIL_SENT: &str = "Email sent successfully!";

/// Source of the current local time for request handlers.
pub type Clock = fn() -> NaiveDateTime;

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Shared state behind every absence route.
pub struct AbsencePortal<S: ?Sized, N: ?Sized> {
    pub service: Arc<AbsenceService<S, N>>,
    pub users: Arc<dyn UserDirectory>,
    pub sessions: Arc<SessionRegistry>,
    pub clock: Clock,
}

impl<S: ?Sized, N: ?Sized> AbsencePortal<S, N> {
    pub fn new(service: Arc<AbsenceService<S, N>>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            service,
            users,
            sessions: Arc::new(SessionRegistry::default()),
            clock: local_now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl<S: ?Sized, N: ?Sized> Clone for AbsencePortal<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            clock: self.clock,
        }
    }
}

/// Router exposing the submission form, admin pages, and JSON endpoints.
pub fn absence_router<S, N>(portal: AbsencePortal<S, N>) -> Router
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    Router::new()
        .route("/", get(index_handler))
        .route("/submit", post(submit_form_handler::<S, N>))
        .route("/login", get(login_page_handler::<S, N>).post(login_handler::<S, N>))
        .route("/logout", get(logout_handler::<S, N>))
        .route("/list", get(list_handler::<S, N>))
        .route("/download_doc", get(download_handler::<S, N>))
        .route("/send_email", post(send_email_handler::<S, N>))
        .route("/api/v1/absences", post(submit_json_handler::<S, N>))
        .route("/api/v1/absences/today", get(today_json_handler::<S, N>))
        .with_state(portal)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailForm {
    email: String,
}

/// `?sent` only needs to be present; its value is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    sent: Option<String>,
}

fn login_redirect() -> Response {
    Redirect::to("/login").into_response()
}

/// Runs a service call off the async workers; the store and the SMTP
/// transport both block.
async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AbsenceServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::Server(axum::Error::new(err)))?
        .map_err(AppError::from)
}

pub(crate) async fn index_handler() -> Html<String> {
    Html(views::index_page().into_string())
}

pub(crate) async fn submit_form_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    let submission = AbsenceSubmission::from_pairs(pairs);
    let service = portal.service.clone();
    let now = (portal.clock)();
    match run_blocking(move || service.submit(submission, now)).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn submit_json_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    Json(submission): Json<AbsenceSubmission>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    let service = portal.service.clone();
    let now = (portal.clock)();
    match run_blocking(move || service.submit(submission, now)).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn login_page_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    if portal.sessions.authenticate(&headers).is_some() {
        return Redirect::to("/list").into_response();
    }
    Html(views::login_page(None).into_string()).into_response()
}

pub(crate) async fn login_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    Form(form): Form<LoginForm>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    match portal
        .users
        .find_by_credentials(&form.username, &form.password)
    {
        Some(user) => {
            info!(username = %user.username, "administrator logged in");
            let token = portal.sessions.open(user);
            with_cookie(Redirect::to("/list").into_response(), &session_cookie(&token))
        }
        None => {
            warn!(username = %form.username, "rejected login attempt");
            (
                StatusCode::UNAUTHORIZED,
                Html(views::login_page(Some(LOGIN_FAILED)).into_string()),
            )
                .into_response()
        }
    }
}

pub(crate) async fn logout_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    let Some(token) = session_token(&headers) else {
        return login_redirect();
    };
    if !portal.sessions.revoke(&token) {
        return login_redirect();
    }
    with_cookie(Redirect::to("/").into_response(), &expired_session_cookie())
}

pub(crate) async fn list_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    if portal.sessions.authenticate(&headers).is_none() {
        return login_redirect();
    }

    let flash = params.sent.map(|_| (FlashLevel::Success, EMAIL_SENT));
    let service = portal.service.clone();
    let now = (portal.clock)();
    match run_blocking(move || service.today_report(now)).await {
        Ok(report) => Html(views::list_page(&report, flash).into_string()).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn today_json_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    if portal.sessions.authenticate(&headers).is_none() {
        return AppError::Unauthorized.into_response();
    }

    let service = portal.service.clone();
    let now = (portal.clock)();
    match run_blocking(move || service.today_report(now)).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn download_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    if portal.sessions.authenticate(&headers).is_none() {
        return login_redirect();
    }

    let service = portal.service.clone();
    let now = (portal.clock)();
    let document = match run_blocking(move || service.export_today(now)).await {
        Ok(document) => document,
        Err(err) => return err.into_response(),
    };

    let disposition = format!(
        "attachment; filename=\"absences.docx\"; filename*=UTF-8''{}",
        percent_encode(document.file_name)
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}

pub(crate) async fn send_email_handler<S, N>(
    State(portal): State<AbsencePortal<S, N>>,
    headers: HeaderMap,
    Form(form): Form<EmailForm>,
) -> Response
where
    S: RecordStore + ?Sized + 'static,
    N: ReportNotifier + ?Sized + 'static,
{
    if portal.sessions.authenticate(&headers).is_none() {
        return login_redirect();
    }

    let service = portal.service.clone();
    let now = (portal.clock)();
    let recipient = form.email;
    match run_blocking(move || service.email_today(&recipient, now)).await {
        Ok(_) => Redirect::to("/list?sent=1").into_response(),
        Err(err) => err.into_response(),
    }
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// RFC 5987 encoding for the `filename*` parameter.
pub(crate) fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
