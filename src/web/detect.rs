use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use super::{form_or_empty, gate::VerifiedClient, templates, AppState};

#[derive(Default, Deserialize)]
pub struct DetectForm {
    url: Option<String>,
}

pub async fn index(_client: VerifiedClient) -> Html<String> {
    Html(templates::render_index(None))
}

/// The submitted value is used verbatim as both probe target and cache key.
pub async fn submit(
    _client: VerifiedClient,
    State(state): State<Arc<AppState>>,
    form: Result<Form<DetectForm>, FormRejection>,
) -> Response {
    let form: DetectForm = form_or_empty(form);
    let Some(url) = form.url else {
        return (
            StatusCode::BAD_REQUEST,
            Html(templates::render_index(Some("Please enter a URL to check."))),
        )
            .into_response();
    };

    Html(state.detection.detect(&url).await).into_response()
}

pub async fn unsupported(_client: VerifiedClient) -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
