//! Minimal HTML layout shared by every page.

use axum::response::Html;

/// Escapes text for use in HTML content and double-quoted attributes.
pub(crate) fn escape(text: &str) -> String {
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

/// Wraps `body` (already escaped HTML) in the site layout.
pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\
         <html lang=\"en\">\
         <head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} | Glampsite</title></head>\
         <body><header><nav>\
         <a href=\"/\">Home</a> <a href=\"/glamps\">Glamps</a> \
         <a href=\"/packages\">Packages</a> <a href=\"/booking\">Book</a> \
         <a href=\"/contact\">Contact</a>\
         </nav></header><main>{body}</main></body></html>",
        title = escape(title),
    ))
}

/// Page with a heading and a paragraph of plain text.
pub(crate) fn simple_page(title: &str, text: &str) -> Html<String> {
    layout(
        title,
        &format!("<h1>{}</h1><p>{}</p>", escape(title), escape(text)),
    )
}

pub(crate) fn error_page(title: &str, message: &str) -> Html<String> {
    simple_page(title, message)
}

/// Neutral placeholder shown while a protected page has not been evaluated.
pub(crate) fn loading() -> Html<String> {
    layout(
        "Loading",
        "<div class=\"loading\" role=\"status\" aria-live=\"polite\">Loading\u{2026}</div>",
    )
}
