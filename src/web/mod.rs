use std::{fmt::Display, sync::Arc};

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    captcha::CaptchaVerifier, config::AppConfig, db::contacts::ContactRepository,
    detection::DetectionService,
};

mod contacts;
mod cookies;
mod detect;
mod flash;
mod gate;
mod pages;
pub mod templates;

/// Services shared by every handler, built once at startup.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub detection: Arc<DetectionService>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub contacts: ContactRepository,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(detect::index)
                .post(detect::submit)
                .fallback(detect::unsupported),
        )
        .route(gate::GATE_PATH, get(gate::challenge).post(gate::verify))
        .route("/how_it_works", get(pages::how_it_works))
        .route("/faq", get(pages::faq))
        .route("/about", get(pages::about))
        .route("/contact", get(contacts::contact_page))
        .route("/submit_contact", post(contacts::submit_contact))
        .route("/view_contacts", get(contacts::view_contacts))
        .route("/delete_contact/{id}", post(contacts::delete_contact))
        .fallback(pages::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Treats a missing or undecodable form body as a form with every field absent.
pub(crate) fn form_or_empty<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(target: "http", reason = %rejection.body_text(), "form body ignored");
            T::default()
        }
    }
}

pub(crate) fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(templates::render_not_found())).into_response()
}

pub(crate) fn internal_error(err: impl Display) -> Response {
    tracing::error!(target: "http", error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(templates::render_server_error()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, HeaderMap, Request},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        cache::MemoryResultCache,
        captcha::{GateError, VerifiedCookie},
        db,
        detection::fakes::{FakeProbe, FixedClassifier},
        domain::LivenessOutcome,
    };

    const VERIFIED: &str = "recaptcha_verified=true";
    const FORM: &str = "application/x-www-form-urlencoded";

    struct FakeCaptcha;

    #[async_trait]
    impl CaptchaVerifier for FakeCaptcha {
        async fn verify(&self, token: Option<&str>) -> Result<VerifiedCookie, GateError> {
            match token {
                None | Some("") => Err(GateError::Missing),
                Some("good-token") => Ok(VerifiedCookie::new(Duration::from_secs(60))),
                Some("flaky") => Err(GateError::UpstreamUnavailable),
                Some(_) => Err(GateError::Failed),
            }
        }
    }

    struct Harness {
        app: Router,
        probe: Arc<FakeProbe>,
        classifier: Arc<FixedClassifier>,
    }

    async fn harness(outcome: LivenessOutcome, p_phishing: f64) -> Harness {
        let probe = FakeProbe::new(outcome);
        let classifier = FixedClassifier::new(p_phishing);
        let detection = DetectionService::new(
            Arc::new(MemoryResultCache::new()),
            probe.clone(),
            classifier.clone(),
            Duration::from_secs(3600),
        );
        let state = Arc::new(AppState {
            config: Arc::new(AppConfig::for_tests()),
            detection: Arc::new(detection),
            captcha: Arc::new(FakeCaptcha),
            contacts: ContactRepository::new(db::test_pool().await),
        });
        Harness {
            app: router(state),
            probe,
            classifier,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn bare_post(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location(headers: &HeaderMap) -> &str {
        headers.get(header::LOCATION).unwrap().to_str().unwrap()
    }

    fn set_cookie(headers: &HeaderMap) -> &str {
        headers.get(header::SET_COOKIE).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn unverified_clients_are_sent_to_the_gate_for_any_method() {
        let h = harness(LivenessOutcome::Ok, 0.1).await;

        let requests = vec![
            get_req("/", None),
            get_req("/", Some("recaptcha_verified=false")),
            get_req("/", Some("recaptcha_verified=TRUE")),
            post_req("/", None, "url=http%3A%2F%2Fa.test"),
            Request::builder()
                .method("PUT")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        ];
        for request in requests {
            let (status, headers, _) = send(&h.app, request).await;
            assert_eq!(status, StatusCode::SEE_OTHER);
            assert_eq!(location(&headers), "/verify_recaptcha");
        }
        assert_eq!(h.probe.calls(), 0);
    }

    #[tokio::test]
    async fn verified_client_sees_the_form() {
        let h = harness(LivenessOutcome::Ok, 0.1).await;
        let (status, _, body) = send(&h.app, get_req("/", Some(VERIFIED))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name=\"url\""));
        assert!(!body.contains("id=\"result\""));
    }

    #[tokio::test]
    async fn unreachable_url_renders_phishing_verdict() {
        let h = harness(LivenessOutcome::Unreachable, 0.0).await;
        let (status, _, body) = send(
            &h.app,
            post_req(
                "/",
                Some(VERIFIED),
                "url=http%3A%2F%2Fexample-unreachable.test",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<strong class=\"verdict-phishing\">Phishing</strong>"));
        assert!(body.contains("<span id=\"confidence-phishing\">100.00%</span>"));
        assert!(body.contains("<span id=\"confidence-legitimate\">0.00%</span>"));
        assert_eq!(h.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_submission_is_byte_identical_and_probed_once() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let submit = || post_req("/", Some(VERIFIED), "url=https%3A%2F%2Fdocs.rs%2F");

        let (_, _, first) = send(&h.app, submit()).await;
        let (_, _, second) = send(&h.app, submit()).await;

        assert_eq!(first, second);
        assert!(first.contains("Legitimate"));
        assert_eq!(h.probe.calls(), 1);
        assert_eq!(h.classifier.calls(), 1);
    }

    #[tokio::test]
    async fn missing_url_field_is_bad_request() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let (status, _, body) = send(&h.app, post_req("/", Some(VERIFIED), "other=1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Please enter a URL to check."));
        assert_eq!(h.probe.calls(), 0);
    }

    #[tokio::test]
    async fn gate_page_embeds_site_key() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let (status, _, body) = send(&h.app, get_req("/verify_recaptcha", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("data-sitekey=\"site-key\""));
    }

    #[tokio::test]
    async fn passing_the_gate_sets_flag_and_unlocks_home() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let (status, headers, _) = send(
            &h.app,
            post_req("/verify_recaptcha", None, "g-recaptcha-response=good-token"),
        )
        .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&headers), "/");
        let cookie = set_cookie(&headers);
        assert!(cookie.starts_with("recaptcha_verified=true;"));

        let pair = cookie.split(';').next().unwrap();
        let (status, _, _) = send(&h.app, get_req("/", Some(pair))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn gate_failures_are_shown_inline() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let cases = [
            ("", "Please complete the reCAPTCHA."),
            ("g-recaptcha-response=", "Please complete the reCAPTCHA."),
            ("g-recaptcha-response=nope", "reCAPTCHA verification failed."),
            (
                "g-recaptcha-response=flaky",
                "Failed to verify reCAPTCHA. Please try again later.",
            ),
        ];
        for (form, message) in cases {
            let (status, headers, body) =
                send(&h.app, post_req("/verify_recaptcha", None, form)).await;
            assert_eq!(status, StatusCode::OK);
            assert!(headers.get(header::SET_COOKIE).is_none());
            assert!(body.contains(message), "missing {message:?}");
        }
    }

    #[tokio::test]
    async fn posts_without_a_form_body_reach_the_handlers() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;

        let (status, headers, body) = send(&h.app, bare_post("/verify_recaptcha", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(header::SET_COOKIE).is_none());
        assert!(body.contains("Please complete the reCAPTCHA."));

        let (status, _, body) = send(&h.app, bare_post("/", Some(VERIFIED))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Please enter a URL to check."));
        assert_eq!(h.probe.calls(), 0);

        let (status, _, body) = send(&h.app, bare_post("/submit_contact", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Name is required."));

        let (_, _, body) = send(&h.app, get_req("/view_contacts", None)).await;
        assert!(body.contains("No messages yet."));
    }

    #[tokio::test]
    async fn contact_submission_is_stored_and_listed() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let (status, _, body) = send(
            &h.app,
            post_req(
                "/submit_contact",
                None,
                "name=Ada&email=ada%40example.com&message=Hello+there",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Thank you!"));

        let (status, _, body) = send(&h.app, get_req("/view_contacts", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ada@example.com"));
        assert!(body.contains("Hello there"));
    }

    #[tokio::test]
    async fn incomplete_contact_is_rejected() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let (status, _, body) =
            send(&h.app, post_req("/submit_contact", None, "name=Ada")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Email is required."));
        assert!(body.contains("Message is required."));

        let (_, _, body) = send(&h.app, get_req("/view_contacts", None)).await;
        assert!(body.contains("No messages yet."));
    }

    #[tokio::test]
    async fn deleting_missing_or_malformed_id_is_not_found() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        let (status, _, _) = send(&h.app, post_req("/delete_contact/99", None, "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = send(&h.app, post_req("/delete_contact/abc", None, "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_flashes_confirmation_and_removes_row() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        for name in ["Ada", "Grace"] {
            let form = format!("name={name}&email={name}%40example.com&message=hi");
            send(&h.app, post_req("/submit_contact", None, &form)).await;
        }

        let (status, headers, _) = send(&h.app, post_req("/delete_contact/1", None, "")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&headers), "/view_contacts");
        let flash = set_cookie(&headers).split(';').next().unwrap().to_string();
        assert!(flash.starts_with("flash="));

        let (status, headers, body) =
            send(&h.app, get_req("/view_contacts", Some(flash.as_str()))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Contact deleted successfully."));
        assert!(!body.contains("Ada@example.com"));
        assert!(body.contains("Grace@example.com"));
        assert!(set_cookie(&headers).contains("Max-Age=0"));

        let (status, _, _) = send(&h.app, post_req("/delete_contact/1", None, "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_pages_render_and_unknown_paths_404() {
        let h = harness(LivenessOutcome::Ok, 0.2).await;
        for path in ["/how_it_works", "/faq", "/about", "/contact"] {
            let (status, _, body) = send(&h.app, get_req(path, None)).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert!(body.contains("PhishShield"));
        }
        let (status, _, _) = send(&h.app, get_req("/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
