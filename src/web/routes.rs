use super::handlers;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// The whole surface in one table. Pages that need a session enforce it via
/// the `CurrentUser` extractor; everything else takes `OptionalUser`.
/// Updates and deletes go over POST because HTML forms speak nothing else.
pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::public::home))
        .route("/posts", get(handlers::public::index))
        .route("/posts", post(handlers::posts::store))
        .route("/posts/new", get(handlers::posts::new_form))
        .route("/posts/:slug", get(handlers::public::show))
        .route("/posts/:slug", post(handlers::posts::update))
        .route("/posts/:slug/edit", get(handlers::posts::edit_form))
        .route("/posts/:slug/delete", post(handlers::posts::destroy))
        .route("/users", get(handlers::users::index))
        .route(
            "/upload-image",
            post(handlers::uploads::store).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/uploads/:filename", get(handlers::public::serve_upload))
        .route("/static/style.css", get(handlers::public::stylesheet))
        .route("/login", get(handlers::auth::login_form))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/register", get(handlers::auth::register_form))
        .route("/register", post(handlers::auth::register))
}
