//! Server-rendered page handlers for the landing, auth and chat views.

use std::sync::Arc;
use axum::{
    extract::{ Form, State },
    http::{ header::SET_COOKIE, HeaderMap },
    response::{ Html, IntoResponse, Redirect, Response },
};
use serde::Deserialize;
use tokio::sync::Mutex;
use log::info;

use crate::chat::{ ChatView, Route };
use crate::supabase::auth::Credentials;
use super::api::AppState;
use super::pages;
use super::session::{ cleared_cookie, session_cookie, session_id };

#[derive(Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub message: String,
}

pub async fn landing() -> Html<String> {
    Html(pages::landing_page())
}

pub async fn login_form() -> Html<String> {
    Html(pages::login_page("", None))
}

pub async fn signup_form() -> Html<String> {
    Html(pages::signup_page("", None))
}

fn signed_in(sid: &str) -> Response {
    ([(SET_COOKIE, session_cookie(sid))], Redirect::to(Route::Chat.path())).into_response()
}

pub async fn login(State(state): State<AppState>, Form(credentials): Form<Credentials>) -> Response {
    match state.auth.sign_in_with_password(&credentials).await {
        Ok(session) => {
            info!("User {} signed in", session.user.id);
            let sid = state.sessions.open(session.access_token).await;
            signed_in(&sid)
        }
        Err(e) => Html(pages::login_page(&credentials.email, Some(&e.to_string()))).into_response(),
    }
}

pub async fn signup(State(state): State<AppState>, Form(credentials): Form<Credentials>) -> Response {
    match state.auth.sign_up(&credentials, &state.signup_redirect_url).await {
        Ok(Some(session)) => {
            info!("User {} signed up and was confirmed immediately", session.user.id);
            let sid = state.sessions.open(session.access_token).await;
            signed_in(&sid)
        }
        // Awaiting email confirmation; the chat view sends them on to login.
        Ok(None) => Redirect::to(Route::Chat.path()).into_response(),
        Err(e) => Html(pages::signup_page(&credentials.email, Some(&e.to_string()))).into_response(),
    }
}

/// A fresh page load: builds and mounts a new view for the session.
async fn mount_view(state: &AppState, sid: Option<&str>) -> Arc<Mutex<ChatView>> {
    let token = match sid {
        Some(sid) => state.sessions.access_token(sid).await,
        None => None,
    };
    let mut view = ChatView::new(state.chat_deps(), token);
    view.mount().await;
    let signed_out = view.redirect().is_some();

    let view = Arc::new(Mutex::new(view));
    if let Some(sid) = sid {
        if signed_out {
            // Token expired or revoked; the cookie no longer names anyone.
            state.sessions.close(sid).await;
        } else {
            state.sessions.attach_view(sid, view.clone()).await;
        }
    }
    view
}

/// The session's live view, mounting one if the page was never loaded.
async fn current_view(state: &AppState, sid: Option<&str>) -> Arc<Mutex<ChatView>> {
    if let Some(sid) = sid {
        if let Some(view) = state.sessions.view(sid).await {
            return view;
        }
    }
    mount_view(state, sid).await
}

fn render(view: &ChatView) -> Response {
    match view.redirect() {
        Some(route) => Redirect::to(route.path()).into_response(),
        None => Html(pages::chat_page(view)).into_response(),
    }
}

pub async fn chat(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = session_id(&headers);
    let view = mount_view(&state, sid.as_deref()).await;
    let view = view.lock().await;
    render(&view)
}

pub async fn send(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SendForm>
) -> Response {
    let sid = session_id(&headers);
    let view = current_view(&state, sid.as_deref()).await;
    let mut view = view.lock().await;
    view.set_input(form.message);
    view.send().await;
    render(&view)
}

pub async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = session_id(&headers);
    let view = current_view(&state, sid.as_deref()).await;
    let mut view = view.lock().await;
    view.reset().await;
    render(&view)
}

pub async fn save(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let sid = session_id(&headers);
    let view = current_view(&state, sid.as_deref()).await;
    let mut view = view.lock().await;
    view.save().await;
    render(&view)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(sid) = session_id(&headers) {
        let view = match state.sessions.view(&sid).await {
            Some(view) => view,
            None => {
                let token = state.sessions.access_token(&sid).await;
                Arc::new(Mutex::new(ChatView::new(state.chat_deps(), token)))
            }
        };
        view.lock().await.logout().await;
        state.sessions.close(&sid).await;
    }
    ([(SET_COOKIE, cleared_cookie())], Redirect::to(Route::Login.path())).into_response()
}
