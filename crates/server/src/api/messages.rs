use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, info};

use burnlink_message::Message;

use crate::error::ServerError;

use super::AppState;
use super::schemas::LandingResponse;

/// Form body for text submissions.
#[derive(Debug, Deserialize)]
struct SubmitForm {
    /// The message text.
    data: String,
}

/// `POST /api/` -- store a payload and respond with its key.
///
/// `application/x-www-form-urlencoded` bodies carry inline text in the
/// `data` field; `multipart/form-data` bodies carry a file in the `data`
/// part, whose filename and content type are kept as metadata. Anything
/// else is a 400.
pub async fn submit(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, ServerError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let mut msg = Message::new();
    if content_type.starts_with("application/x-www-form-urlencoded") {
        let body = match Bytes::from_request(req, &()).await {
            Ok(body) => body,
            // The rejection already carries the right status (413 when the
            // body limit was exceeded).
            Err(rejection) => return Ok(rejection.into_response()),
        };
        let form: SubmitForm = match serde_urlencoded::from_bytes(&body) {
            Ok(form) => form,
            Err(e) => return Ok(bad_request(&format!("invalid form body: {e}"))),
        };
        msg.data = form.data.into_bytes();
    } else if content_type.starts_with("multipart/form-data") {
        match read_file_part(req).await {
            Ok(Some((data, filename, part_content_type))) => {
                msg.data = data;
                msg.meta.filename = filename;
                msg.meta.content_type = part_content_type;
            }
            Ok(None) => return Ok(bad_request("missing form file: data")),
            Err(response) => return Ok(response),
        }
    } else {
        return Ok(bad_request("unsupported content type"));
    }

    let key = state.store.new_message_key();
    state.store.set_message(&key, msg).await?;
    info!(key = %key, "message stored");

    Ok((StatusCode::OK, key).into_response())
}

/// Pull the `data` file part out of a multipart body.
///
/// Returns `Ok(None)` when no such part exists, or an error response for
/// malformed/oversized bodies.
async fn read_file_part(req: Request) -> Result<Option<(Vec<u8>, String, String)>, Response> {
    let mut multipart = match Multipart::from_request(req, &()).await {
        Ok(multipart) => multipart,
        Err(rejection) => return Err(rejection.into_response()),
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                let status = e.status();
                return Err((status, Json(serde_json::json!({ "error": e.body_text() })))
                    .into_response());
            }
        };

        if field.name() != Some("data") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();
        match field.bytes().await {
            Ok(bytes) => return Ok(Some((bytes.to_vec(), filename, content_type))),
            Err(e) => {
                let status = e.status();
                return Err((status, Json(serde_json::json!({ "error": e.body_text() })))
                    .into_response());
            }
        }
    }
}

/// `GET /api/{key}` -- return the payload once, then the key is dead.
pub async fn fetch(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServerError> {
    serve_message(&state, &key).await
}

/// `GET /{key}/{filename}` -- same consuming fetch; the filename in the URL
/// is only a download hint for the client.
pub async fn fetch_named(
    State(state): State<AppState>,
    Path((key, _filename)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    serve_message(&state, &key).await
}

async fn serve_message(state: &AppState, key: &str) -> Result<Response, ServerError> {
    let msg = state.store.get_message(key).await?;
    info!(key = %key, "message consumed");

    let content_type = if msg.meta.content_type.is_empty() {
        "application/octet-stream".to_owned()
    } else {
        msg.meta.content_type
    };
    Ok(([(header::CONTENT_TYPE, content_type)], msg.data).into_response())
}

/// `GET /{key}` -- landing view: reveals what kind of payload the key holds
/// and the link that retrieves it, without consuming the message.
pub async fn landing(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ServerError> {
    let meta = state.store.get_metadata(&key).await?;
    debug!(key = %key, "landing view");

    let (kind, link) = if meta.filename.is_empty() {
        ("message", format!("/api/{key}"))
    } else {
        ("file", format!("/{key}/{}", meta.filename))
    };

    Ok(Json(LandingResponse {
        key,
        kind: kind.to_owned(),
        link,
        created: meta.created,
    })
    .into_response())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
