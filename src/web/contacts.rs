use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::{db::contacts::PersistenceError, domain::NewContact};

use super::{
    cookies::cookie_header,
    flash::{clear_flash_cookie, flash_cookie, read_flash, FlashMessage},
    form_or_empty, internal_error, not_found, templates, AppState,
};

#[derive(Default, Deserialize)]
pub struct ContactForm {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
}

pub async fn contact_page() -> Html<String> {
    Html(templates::render_contact(false, &[]))
}

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    let form: ContactForm = form_or_empty(form);
    let contact = match NewContact::validate(
        form.name.as_deref(),
        form.email.as_deref(),
        form.message.as_deref(),
    ) {
        Ok(contact) => contact,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Html(templates::render_contact(false, &errors)),
            )
                .into_response();
        }
    };

    match state.contacts.create(contact).await {
        Ok(_) => Html(templates::render_contact(true, &[])).into_response(),
        Err(err) => internal_error(err),
    }
}

pub async fn view_contacts(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let flash = read_flash(cookie_header(&headers), &state.config.secret_key);

    let contacts = match state.contacts.list().await {
        Ok(contacts) => contacts,
        Err(err) => return internal_error(err),
    };

    let page = Html(templates::render_contacts(&contacts, flash.as_ref()));
    if flash.is_some() {
        ([(header::SET_COOKIE, clear_flash_cookie())], page).into_response()
    } else {
        page.into_response()
    }
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let Ok(id) = raw_id.parse::<i64>() else {
        return not_found();
    };

    match state.contacts.delete(id).await {
        Ok(()) => {
            let redirect = Redirect::to("/view_contacts");
            let flash = FlashMessage::success("Contact deleted successfully.");
            match flash_cookie(&flash, &state.config.secret_key) {
                Some(cookie) => ([(header::SET_COOKIE, cookie)], redirect).into_response(),
                None => redirect.into_response(),
            }
        }
        Err(PersistenceError::NotFound(_)) => not_found(),
        Err(err) => internal_error(err),
    }
}
