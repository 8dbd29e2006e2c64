//! Request handlers.

use super::page;
use super::sessions::{session_cookie, SessionHandle};
use super::AppState;
use crate::handler::edit_image_with_prompt;
use crate::image::{EditResult, ImageFile};
use crate::ui::{EditorSession, Screen, SessionError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Multipart, State};
use axum::http::header::{HeaderMap, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;

/// Form field carrying the uploaded file.
const UPLOAD_FIELD: &str = "image";

pub(super) const NO_FILE_MESSAGE: &str = "Please choose an image to upload.";
pub(super) const UNSUPPORTED_MESSAGE: &str = "The uploaded file is not a supported image.";
pub(super) const TOO_LARGE_MESSAGE: &str = "The uploaded file is too large.";

/// `GET /`. Read-only: a visitor without a session sees the upload screen.
pub(crate) async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    Html(page::render(&current_screen(&state, session_cookie(&headers)), None)).into_response()
}

/// `POST /upload`
pub(crate) async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let image = match read_upload(multipart).await {
        Ok(image) => image,
        Err((status, message)) => {
            tracing::debug!(%status, reason = message, "upload rejected");
            return notice(&state, session_cookie(&headers), status, message);
        }
    };
    tracing::info!(
        mime_type = %image.mime_type,
        base64_len = image.base64.len(),
        "image uploaded"
    );

    let (handle, outcome) = state
        .sessions
        .access(session_cookie(&headers), |s| s.upload(image));
    match outcome {
        Ok(()) => with_cookie(&handle, Redirect::to("/").into_response()),
        Err(e) => with_cookie(
            &handle,
            notice(&state, Some(handle.id.as_str()), StatusCode::CONFLICT, &e.to_string()),
        ),
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<ImageFile, (StatusCode, &'static str)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.is_empty() {
            return Err((StatusCode::BAD_REQUEST, NO_FILE_MESSAGE));
        }
        return ImageFile::from_bytes(&data, content_type.as_deref())
            .map_err(|_| (StatusCode::BAD_REQUEST, UNSUPPORTED_MESSAGE));
    }
    Err((StatusCode::BAD_REQUEST, NO_FILE_MESSAGE))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> (StatusCode, &'static str) {
    match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => (StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_MESSAGE),
        status => {
            tracing::debug!(error = %e.body_text(), "malformed multipart body");
            (status, NO_FILE_MESSAGE)
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateForm {
    #[serde(default)]
    prompt: String,
}

/// `POST /generate`
pub(crate) async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Response {
    let (handle, pending) = state
        .sessions
        .access(session_cookie(&headers), |s: &mut EditorSession| {
            s.set_prompt(form.prompt)?;
            s.begin_generation()
        });

    let pending = match pending {
        Ok(pending) => pending,
        Err(e) => {
            let status = match e {
                SessionError::Busy => StatusCode::CONFLICT,
                SessionError::NotReady => StatusCode::BAD_REQUEST,
            };
            return with_cookie(
                &handle,
                notice(&state, Some(handle.id.as_str()), status, &e.to_string()),
            );
        }
    };

    let task_state = state.clone();
    let session_id = handle.id.clone();
    tokio::spawn(async move {
        let result = edit_image_with_prompt(
            task_state.editor.as_ref(),
            &pending.image.base64,
            &pending.image.mime_type,
            &pending.prompt,
        )
        .await;
        let outcome = if result.is_success() { "success" } else { "error" };
        let applied = task_state
            .sessions
            .complete(&session_id, pending.ticket, result);
        tracing::debug!(session = %session_id, outcome, applied, "generation finished");
    });

    with_cookie(&handle, Redirect::to("/").into_response())
}

/// `POST /clear`
pub(crate) async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (handle, ()) = state
        .sessions
        .access(session_cookie(&headers), EditorSession::clear);
    with_cookie(&handle, Redirect::to("/").into_response())
}

/// Body of `POST /api/edit`. Missing fields read as empty and fail validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEditRequest {
    #[serde(default)]
    base64: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    prompt: String,
}

/// `POST /api/edit`. Unreadable bodies answer with an `EditResult` error too.
pub(crate) async fn api_edit(
    State(state): State<AppState>,
    body: Result<Json<ApiEditRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(EditResult::error(rejection.body_text())),
            )
                .into_response();
        }
    };

    Json(
        edit_image_with_prompt(
            state.editor.as_ref(),
            &body.base64,
            &body.mime_type,
            &body.prompt,
        )
        .await,
    )
    .into_response()
}

fn current_screen(state: &AppState, session: Option<&str>) -> Screen {
    state
        .sessions
        .peek(session, EditorSession::view)
        .unwrap_or(Screen::Upload)
}

/// Re-renders the current screen with a message after a rejected action.
fn notice(state: &AppState, session: Option<&str>, status: StatusCode, message: &str) -> Response {
    let screen = current_screen(state, session);
    (status, Html(page::render(&screen, Some(message)))).into_response()
}

fn with_cookie(handle: &SessionHandle, mut response: Response) -> Response {
    if let Some(cookie) = handle.set_cookie() {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}
