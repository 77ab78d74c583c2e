use crate::middleware::antiforgery::{AntiforgeryToken, FORM_FIELD};

pub const STYLESHEET: &str = "/assets/app.css";

/// Escapes text for use in HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title} - Storefront</title>
    <link rel="stylesheet" href="{STYLESHEET}" />
</head>
<body>
    <header><a href="/">Storefront</a></header>
    <main>
{body}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn antiforgery_field(token: &AntiforgeryToken) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}" />"#,
        FORM_FIELD,
        escape_html(token.as_str())
    )
}

fn chat_form(token: &AntiforgeryToken, draft: &str) -> String {
    format!(
        r#"        <form method="post" action="/chat" class="chat-form">
            {field}
            <label for="message">Ask our assistant</label>
            <textarea id="message" name="message" rows="3" required>{draft}</textarea>
            <button type="submit">Send</button>
        </form>"#,
        field = antiforgery_field(token),
        draft = escape_html(draft),
    )
}

pub fn home_page(token: &AntiforgeryToken) -> String {
    let body = format!(
        r#"        <h1>Welcome</h1>
        <p>Looking for gear? Ask about any product in our catalog.</p>
{}"#,
        chat_form(token, "")
    );
    layout("Home", &body)
}

/// Renders one exchange. `reply` is `None` when the question was rejected.
pub fn chat_page(token: &AntiforgeryToken, question: &str, reply: Option<&str>) -> String {
    let answer = match reply {
        Some(reply) => format!(
            r#"        <div class="message assistant">{}</div>"#,
            escape_html(reply)
        ),
        None => r#"        <div class="message error">Please enter a question.</div>"#.to_string(),
    };
    let body = format!(
        r#"        <h1>Assistant</h1>
        <div class="message user">{question}</div>
{answer}
{form}"#,
        question = escape_html(question),
        form = chat_form(token, ""),
    );
    layout("Assistant", &body)
}

pub fn error_page(request_id: &str) -> String {
    let body = format!(
        r#"        <h1 class="text-danger">Error.</h1>
        <h2 class="text-danger">An error occurred while processing your request.</h2>
        <p><strong>Request ID:</strong> <code>{}</code></p>"#,
        escape_html(request_id)
    );
    layout("Error", &body)
}
