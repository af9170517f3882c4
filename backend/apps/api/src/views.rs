//! HTML Views
//!
//! Minimal built-in pages for the demo server. Every value taken from view
//! data is HTML-escaped except `content`, which only ever holds markup
//! written in this crate.

use auth::views::{ViewError, ViewRenderer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlViews;

impl ViewRenderer for HtmlViews {
    fn render(&self, view: &str, data: &Value) -> Result<String, ViewError> {
        let body = match view {
            "signIn" => sign_in(data),
            "signedOut" => format!(
                "<h1>Signed Out</h1><p>You have been signed out. <a href=\"{}\">Sign in again</a></p>",
                field(data, "signInUrl")
            ),
            "signInRedirect" => format!(
                "<h1>Signing In</h1><p>Continue to the <a href=\"{}\">dashboard</a>.</p>",
                field(data, "dashboardUrl")
            ),
            "403" => format!(
                "<h1>Forbidden</h1><p>{} is not allowed to see this page. \
                 <a href=\"{}\">Sign in as someone else</a></p>",
                username(data).unwrap_or_else(|| "You".to_string()),
                field(data, "signOutUrl")
            ),
            "404" => "<h1>Not Found</h1><p>There is nothing here.</p>".to_string(),
            "content" => data
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            "hash" => hash(data),
            other => return Err(ViewError::new(other, "unknown view")),
        };

        Ok(layout(data, &body))
    }
}

fn layout(data: &Value, body: &str) -> String {
    let title = match field(data, "title") {
        title if title.is_empty() => "Sign In Demo".to_string(),
        title => title,
    };
    let user_bar = match username(data) {
        Some(name) => format!(
            "<p class=\"user\">Signed in as {name} | <a href=\"{}\">Sign out</a></p>",
            field(data, "signOutUrl")
        ),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{user_bar}{body}</body></html>\n"
    )
}

fn sign_in(data: &Value) -> String {
    let error = match field(data, "signInError") {
        e if e.is_empty() => String::new(),
        e => format!("<p class=\"error\">{e}</p>"),
    };

    format!(
        "<h1>Sign In</h1>{error}\
         <form method=\"post\" action=\"{}\">\
         <label>Username <input name=\"username\" value=\"{}\" autofocus></label>\
         <label>Password <input name=\"password\" type=\"password\" value=\"{}\"></label>\
         <button type=\"submit\">Sign In</button></form>",
        field(data, "action"),
        field(data, "username"),
        field(data, "password"),
    )
}

fn hash(data: &Value) -> String {
    let error = match field(data, "hashError") {
        e if e.is_empty() => String::new(),
        e => format!("<p class=\"error\">{e}</p>"),
    };
    let hashed = match field(data, "hashed") {
        h if h.is_empty() => String::new(),
        h => format!("<p>Add this as the user's password:</p><pre>{h}</pre>"),
    };

    format!(
        "<h1>Hash</h1>{error}{hashed}\
         <form method=\"post\" action=\"{}\">\
         <label>Password <input name=\"password\" type=\"password\"></label>\
         <label>Confirm <input name=\"confirm_password\" type=\"password\"></label>\
         <button type=\"submit\">Hash</button></form>",
        field(data, "action"),
    )
}

/// Escaped string field; missing or non-string values are empty
fn field(data: &Value, key: &str) -> String {
    escape_html(data.get(key).and_then(Value::as_str).unwrap_or_default())
}

fn username(data: &Value) -> Option<String> {
    data.get("user")
        .and_then(|user| user.get("username"))
        .and_then(Value::as_str)
        .map(escape_html)
}

pub fn escape_html(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
