use ammonia::clean_text;

use crate::chat::render::render_markdown;
use crate::chat::{ ChatView, ViewState };
use crate::models::chat::Role;

const STYLE: &str = r###"
        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            color: #e5e7eb;
            background: linear-gradient(135deg, #111827 0%, #1e3a8a 100%);
            min-height: 100vh;
        }
        .center { display: flex; flex-direction: column; justify-content: center; align-items: center; min-height: 100vh; }
        .card { background: rgba(31, 41, 55, 0.8); padding: 2rem; border-radius: 0.5rem; width: 100%; max-width: 28rem; }
        h1 { color: #22d3ee; text-align: center; }
        input[type=email], input[type=password], input[type=text] {
            width: 100%; padding: 0.75rem; margin-bottom: 1rem;
            background: #374151; color: #f3f4f6; border: 1px solid #4b5563; border-radius: 0.5rem;
        }
        button, .button {
            background: #06b6d4; color: #111827; padding: 0.75rem 1.5rem; border: none;
            border-radius: 0.5rem; font-weight: 600; cursor: pointer; text-decoration: none;
        }
        .button.alt { background: #a855f7; }
        .error { color: #f87171; text-align: center; }
        .notice { color: #4ade80; text-align: center; }
        .muted { color: #9ca3af; text-align: center; }
        .chat { display: flex; flex-direction: column; height: 100vh; max-width: 48rem; margin: 0 auto; padding: 1rem; }
        .chat header { display: flex; justify-content: space-between; align-items: center; }
        .log { flex: 1; overflow-y: auto; margin: 1rem 0; padding: 1rem; background: #f3f4f6; color: #111827; border-radius: 0.5rem; }
        .turn { margin-bottom: 1rem; }
        .turn.user { text-align: right; }
        .bubble { display: inline-block; padding: 0.75rem; border-radius: 0.5rem; max-width: 80%; text-align: left; }
        .turn.user .bubble { background: #2563eb; color: #fff; }
        .turn.ai .bubble { background: #fff; }
        .row { display: flex; gap: 0.5rem; margin-bottom: 1rem; }
        .row input[type=text] { flex: 1; margin: 0; }
        .danger { background: #dc2626; color: #fff; }
        .secondary { background: #4b5563; color: #fff; }
        .save { background: #16a34a; color: #fff; }
"###;

fn layout(title: &str, body: &str) -> String {
    format!(
        r###"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
{body}
</body>
</html>"###,
        title = clean_text(title),
        style = STYLE,
        body = body
    )
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error">{}</p>"#, clean_text(e)))
        .unwrap_or_default()
}

pub fn landing_page() -> String {
    layout(
        "Study Chatbot",
        r###"<div class="center">
    <h1>Study Chatbot</h1>
    <p class="muted">Your AI-powered companion for CS questions and study tips. Log in or sign up to begin!</p>
    <div class="row">
        <a class="button" href="/login">Log In</a>
        <a class="button alt" href="/signup">Sign Up</a>
    </div>
</div>"###
    )
}

struct AuthForm<'a> {
    title: &'a str,
    action: &'a str,
    password_hint: &'a str,
    footer: &'a str,
}

fn auth_page(form: AuthForm<'_>, email: &str, error: Option<&str>) -> String {
    let body = format!(
        r###"<div class="center">
    <form class="card" method="post" action="{action}">
        <h1>{title}</h1>
        <input type="email" name="email" placeholder="Enter your email" value="{email}">
        <input type="password" name="password" placeholder="{password_hint}">
        {error}
        <button type="submit">{title}</button>
        <p class="muted">{footer}</p>
    </form>
</div>"###,
        action = form.action,
        title = form.title,
        email = clean_text(email),
        password_hint = form.password_hint,
        error = error_line(error),
        footer = form.footer
    );
    layout(form.title, &body)
}

pub fn login_page(email: &str, error: Option<&str>) -> String {
    auth_page(
        AuthForm {
            title: "Log In",
            action: "/login",
            password_hint: "Enter your password",
            footer: r#"Don&#39;t have an account? <a href="/signup">Sign Up</a>"#,
        },
        email,
        error
    )
}

pub fn signup_page(email: &str, error: Option<&str>) -> String {
    auth_page(
        AuthForm {
            title: "Sign Up",
            action: "/signup",
            password_hint: "Choose a password (min 6 characters)",
            footer: r#"Already have an account? <a href="/login">Log In</a>"#,
        },
        email,
        error
    )
}

pub fn chat_page(view: &ChatView) -> String {
    let mut log = String::new();
    for message in view.messages() {
        let (class, content) = match message.role {
            Role::User => ("user", clean_text(&message.content)),
            Role::Assistant => ("ai", render_markdown(&message.content)),
        };
        log.push_str(
            &format!(
                r#"<div class="turn {class}"><div class="bubble">{content}</div></div>"#,
                class = class,
                content = content
            )
        );
    }

    let sending = matches!(view.state(), ViewState::Sending);
    if view.messages().is_empty() && !sending {
        log.push_str(r#"<p class="muted">Start by asking a CS or study question!</p>"#);
    }
    if sending {
        log.push_str(r#"<p class="muted">Thinking...</p>"#);
    }
    log.push_str(&error_line(view.error()));
    if let Some(notice) = view.notice() {
        log.push_str(&format!(r#"<p class="notice">{}</p>"#, clean_text(notice)));
    }

    let body = format!(
        r###"<div class="chat">
    <header>
        <h1>Study Chatbot</h1>
        <form method="post" action="/logout"><button class="danger" type="submit">Logout</button></form>
    </header>
    <div class="log" id="log">{log}</div>
    <div class="row">
        <form method="post" action="/chat/reset"><button class="secondary" type="submit">Reset</button></form>
        <form method="post" action="/chat/save"><button class="save" type="submit">Save</button></form>
    </div>
    <form class="row" method="post" action="/chat/send">
        <input type="text" name="message" value="{input}" placeholder="Ask about CS or study tips..." autofocus>
        <button type="submit"{disabled}>Send</button>
    </form>
</div>"###,
        log = log,
        input = clean_text(view.input()),
        disabled = if sending { " disabled" } else { "" }
    );
    layout("Study Chatbot", &body)
}
