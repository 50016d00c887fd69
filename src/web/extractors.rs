use crate::models::User;
use crate::services::auth;
use crate::web::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session";

/// Requires a valid session; unauthenticated requests bounce to the login
/// page, the way every server-rendered flow here expects.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookies = CookieJar::from_headers(&parts.headers);
        let token = cookies
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        let user = auth::validate_session(&state.db, &token)
            .ok()
            .flatten()
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        Ok(CurrentUser(user))
    }
}

pub struct OptionalUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookies = CookieJar::from_headers(&parts.headers);
        let token = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());

        let user = match token {
            Some(t) => auth::validate_session(&state.db, &t).ok().flatten(),
            None => None,
        };

        Ok(OptionalUser(user))
    }
}
