use axum::response::{Html, Response};

use super::{not_found, templates};

pub async fn how_it_works() -> Html<String> {
    Html(templates::render_how_it_works())
}

pub async fn faq() -> Html<String> {
    Html(templates::render_faq())
}

pub async fn about() -> Html<String> {
    Html(templates::render_about())
}

pub async fn fallback() -> Response {
    not_found()
}
