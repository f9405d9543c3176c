use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, FromRequestParts, State},
    http::{header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::captcha::VERIFIED_COOKIE;

use super::{
    cookies::{cookie_header, parse_cookie},
    form_or_empty, templates, AppState,
};

pub const GATE_PATH: &str = "/verify_recaptcha";

/// A client holding `recaptcha_verified=true`. Anyone else is redirected to the gate.
pub struct VerifiedClient;

impl<S> FromRequestParts<S> for VerifiedClient
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parse_cookie(cookie_header(&parts.headers), VERIFIED_COOKIE) == Some("true") {
            return Ok(VerifiedClient);
        }

        tracing::debug!(target: "http", path = %parts.uri.path(), "unverified client redirected");
        Err(Redirect::to(GATE_PATH).into_response())
    }
}

#[derive(Default, Deserialize)]
pub struct CaptchaForm {
    #[serde(rename = "g-recaptcha-response")]
    token: Option<String>,
}

pub async fn challenge(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(templates::render_verification(
        &state.config.recaptcha.site_key,
        None,
    ))
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CaptchaForm>, FormRejection>,
) -> Response {
    let form: CaptchaForm = form_or_empty(form);
    match state.captcha.verify(form.token.as_deref()).await {
        Ok(cookie) => (
            [(header::SET_COOKIE, cookie.header_value())],
            Redirect::to("/"),
        )
            .into_response(),
        Err(err) => Html(templates::render_verification(
            &state.config.recaptcha.site_key,
            Some(&err.to_string()),
        ))
        .into_response(),
    }
}
