//! Server-rendered pages. Every interpolated value passes through [`escape_html`].

use crate::domain::{
    contact::{EMAIL_MAX_CHARS, NAME_MAX_CHARS},
    ClassificationResult, ContactMessage, Label,
};

use super::flash::FlashMessage;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f7fa; color: #1f2933; }
nav { background: #1f2933; padding: 0.75rem 1.5rem; }
nav a { color: #f5f7fa; margin-right: 1.25rem; text-decoration: none; }
main { max-width: 46rem; margin: 2rem auto; background: #fff; padding: 2rem; border-radius: 8px; }
input[type=text], input[type=email], textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
button { margin-top: 0.75rem; padding: 0.5rem 1.25rem; }
.error { color: #b42318; }
.success { color: #067647; }
.verdict-phishing { color: #b42318; }
.verdict-legitimate { color: #067647; }
table { width: 100%; border-collapse: collapse; }
td, th { border-bottom: 1px solid #e4e7eb; padding: 0.5rem; text-align: left; vertical-align: top; }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | PhishShield</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Home</a><a href=\"/how_it_works\">How it works</a>\
         <a href=\"/faq\">FAQ</a><a href=\"/about\">About</a><a href=\"/contact\">Contact</a></nav>\n\
         <main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn url_form(value: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/\">\n\
         <label for=\"url\">URL to check</label>\n\
         <input type=\"text\" id=\"url\" name=\"url\" value=\"{}\" placeholder=\"https://example.com\" required>\n\
         <button type=\"submit\">Check</button>\n</form>",
        escape_html(value)
    )
}

fn error_block(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape_html(e)))
        .unwrap_or_default()
}

pub fn render_index(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Phishing URL detection</h1>\n{}{}",
        error_block(error),
        url_form("")
    );
    layout("Check a URL", &body)
}

pub fn render_result(result: &ClassificationResult) -> String {
    let class = match result.label {
        Label::Phishing => "verdict-phishing",
        Label::Legitimate => "verdict-legitimate",
    };
    let body = format!(
        "<h1>Phishing URL detection</h1>\n{form}\n\
         <section id=\"result\">\n\
         <h2>Result for <code>{url}</code></h2>\n\
         <p>Prediction: <strong class=\"{class}\">{label}</strong></p>\n\
         <p>Phishing confidence: <span id=\"confidence-phishing\">{phishing:.2}%</span></p>\n\
         <p>Legitimate confidence: <span id=\"confidence-legitimate\">{legitimate:.2}%</span></p>\n\
         </section>",
        form = url_form(&result.url),
        url = escape_html(&result.url),
        label = result.label,
        phishing = result.phishing_confidence,
        legitimate = result.legitimate_confidence,
    );
    layout("Result", &body)
}

pub fn render_verification(site_key: &str, error: Option<&str>) -> String {
    let body = format!(
        "<h1>Verify you are human</h1>\n{error}\
         <form method=\"post\" action=\"/verify_recaptcha\">\n\
         <div class=\"g-recaptcha\" data-sitekey=\"{site_key}\"></div>\n\
         <button type=\"submit\">Continue</button>\n</form>\n\
         <script src=\"https://www.google.com/recaptcha/api.js\" async defer></script>",
        error = error_block(error),
        site_key = escape_html(site_key),
    );
    layout("Verification", &body)
}

pub fn render_contact(success: bool, errors: &[String]) -> String {
    let mut notice = String::new();
    if success {
        notice.push_str("<p class=\"success\">Thank you! Your message has been sent.</p>\n");
    }
    for error in errors {
        notice.push_str(&error_block(Some(error)));
    }
    let body = format!(
        "<h1>Contact us</h1>\n{notice}\
         <form method=\"post\" action=\"/submit_contact\">\n\
         <label for=\"name\">Name</label>\n\
         <input type=\"text\" id=\"name\" name=\"name\" maxlength=\"{NAME_MAX_CHARS}\" required>\n\
         <label for=\"email\">Email</label>\n\
         <input type=\"email\" id=\"email\" name=\"email\" maxlength=\"{EMAIL_MAX_CHARS}\" required>\n\
         <label for=\"message\">Message</label>\n\
         <textarea id=\"message\" name=\"message\" rows=\"6\" required></textarea>\n\
         <button type=\"submit\">Send</button>\n</form>"
    );
    layout("Contact", &body)
}

pub fn render_contacts(contacts: &[ContactMessage], flash: Option<&FlashMessage>) -> String {
    let mut body = String::from("<h1>Contact messages</h1>\n");
    if let Some(flash) = flash {
        body.push_str(&format!(
            "<p class=\"{}\">{}</p>\n",
            escape_html(&flash.category),
            escape_html(&flash.message)
        ));
    }
    if contacts.is_empty() {
        body.push_str("<p>No messages yet.</p>");
        return layout("Contacts", &body);
    }

    body.push_str(
        "<table>\n<tr><th>ID</th><th>Name</th><th>Email</th><th>Message</th><th></th></tr>\n",
    );
    for contact in contacts {
        body.push_str(&format!(
            "<tr><td>{id}</td><td>{name}</td><td>{email}</td><td>{message}</td>\
             <td><form method=\"post\" action=\"/delete_contact/{id}\">\
             <button type=\"submit\">Delete</button></form></td></tr>\n",
            id = contact.id,
            name = escape_html(&contact.name),
            email = escape_html(&contact.email),
            message = escape_html(&contact.message),
        ));
    }
    body.push_str("</table>");
    layout("Contacts", &body)
}

pub fn render_how_it_works() -> String {
    layout(
        "How it works",
        "<h1>How it works</h1>\n\
         <ol>\n\
         <li>You submit a URL after completing a one-time human check.</li>\n\
         <li>We request the URL. If it does not answer with HTTP 200 within five seconds, \
         it is reported as phishing with full confidence.</li>\n\
         <li>Reachable URLs are scored by a model trained on known phishing and legitimate \
         addresses. Scores above 50% phishing confidence are reported as phishing.</li>\n\
         <li>Results are remembered for one hour, so repeated checks return the same answer.</li>\n\
         </ol>",
    )
}

pub fn render_faq() -> String {
    layout(
        "FAQ",
        "<h1>Frequently asked questions</h1>\n\
         <h3>Why is a site that is down reported as phishing?</h3>\n\
         <p>We cannot vouch for an address that does not respond, so we err on the side of caution.</p>\n\
         <h3>Why did my result not change after the site came back?</h3>\n\
         <p>Results are cached for an hour per exact URL string.</p>\n\
         <h3>Is the page content inspected?</h3>\n\
         <p>No. The model only looks at the URL itself.</p>",
    )
}

pub fn render_about() -> String {
    layout(
        "About",
        "<h1>About PhishShield</h1>\n\
         <p>PhishShield helps people decide whether a link is safe to open. \
         It combines a reachability check with a URL classifier and always fails closed.</p>",
    )
}

pub fn render_not_found() -> String {
    layout(
        "Not found",
        "<h1>Not found</h1>\n<p>The requested resource does not exist.</p>",
    )
}

pub fn render_server_error() -> String {
    layout(
        "Error",
        "<h1>Something went wrong</h1>\n<p>Please try again later.</p>",
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
