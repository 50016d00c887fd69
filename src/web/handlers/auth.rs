use crate::services::auth;
use crate::web::error::AppResult;
use crate::web::extractors::{OptionalUser, SESSION_COOKIE};
use crate::web::handlers::public::make_context;
use crate::web::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use std::sync::Arc;
use time::Duration;

fn session_cookie(token: String, days: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .max_age(Duration::days(days))
        .build()
}

pub async fn login_form(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/posts").into_response());
    }

    let ctx = make_context(&state, &None);
    let html = state.templates.render("auth/login.html", &ctx)?;
    Ok(Html(html).into_response())
}

#[derive(Deserialize)]
pub struct LoginForm {
    admin_id: String,
    password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if !state.login_limiter.check(&form.admin_id) {
        let mut ctx = make_context(&state, &None);
        ctx.insert("error", "Too many attempts. Try again later.");
        let html = state.templates.render("auth/login.html", &ctx)?;
        return Ok((StatusCode::TOO_MANY_REQUESTS, Html(html)).into_response());
    }

    match auth::authenticate(&state.db, &form.admin_id, &form.password)? {
        Some(user) => {
            state.login_limiter.clear(&form.admin_id);
            let days = state.config.auth.session_days;
            let token = auth::create_session(&state.db, user.id, days)?;
            Ok((jar.add(session_cookie(token, days)), Redirect::to("/posts")).into_response())
        }
        None => {
            state.login_limiter.record_attempt(&form.admin_id);
            tracing::info!(admin_id = %form.admin_id, "failed login attempt");
            let mut ctx = make_context(&state, &None);
            ctx.insert("error", "Invalid staff ID or password");
            let html = state.templates.render("auth/login.html", &ctx)?;
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let _ = auth::delete_session(&state.db, cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build();

    Ok((jar.remove(cookie), Redirect::to("/posts")).into_response())
}

pub async fn register_form(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/posts").into_response());
    }

    let ctx = make_context(&state, &None);
    let html = state.templates.render("auth/register.html", &ctx)?;
    Ok(Html(html).into_response())
}

#[derive(Deserialize)]
pub struct RegisterForm {
    admin_id: String,
    name: String,
    email: String,
    password: String,
    password_confirmation: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let rerender = |error: &str| -> AppResult<Response> {
        let mut ctx = make_context(&state, &None);
        ctx.insert("error", error);
        ctx.insert("admin_id", &form.admin_id);
        ctx.insert("name", &form.name);
        ctx.insert("email", &form.email);
        let html = state.templates.render("auth/register.html", &ctx)?;
        Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
    };

    if form.password != form.password_confirmation {
        return rerender("Passwords do not match");
    }

    let user_id = match auth::create_user(
        &state.db,
        &form.admin_id,
        &form.name,
        &form.email,
        &form.password,
        Default::default(),
        Default::default(),
        None,
    ) {
        Ok(id) => id,
        Err(e) => return rerender(&e.to_string()),
    };

    let days = state.config.auth.session_days;
    let token = auth::create_session(&state.db, user_id, days)?;
    Ok((jar.add(session_cookie(token, days)), Redirect::to("/posts")).into_response())
}
