use crate::models::User;
use crate::services::posts;
use crate::web::error::AppResult;
use crate::web::extractors::OptionalUser;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

pub fn make_context(state: &AppState, user: &Option<User>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx.insert("user", user);
    ctx
}

const MAX_PAGE: usize = 10000;

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

pub fn clamp_page(page: usize) -> usize {
    page.max(1).min(MAX_PAGE)
}

pub fn render_not_found(state: &AppState, user: &Option<User>) -> AppResult<Response> {
    let ctx = make_context(state, user);
    let html = state.templates.render("404.html", &ctx)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

pub async fn home() -> Response {
    axum::response::Redirect::to("/posts").into_response()
}

/// The feed: published posts for everyone, the viewer's own drafts folded in.
pub async fn index(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Html<String>> {
    let viewer = user.as_ref().map(|u| u.id);
    let per_page = state.config.content.posts_per_page;
    let page = clamp_page(pagination.page);
    let offset = (page - 1) * per_page;

    let posts = posts::list_posts(&state.db, viewer, per_page, offset)?;
    let total = posts::count_posts(&state.db, viewer)?;
    let total_pages = (total as usize).div_ceil(per_page);

    let mut ctx = make_context(&state, &user);
    ctx.insert("posts", &posts);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);

    let html = state.templates.render("posts/index.html", &ctx)?;
    Ok(Html(html))
}

/// Detail page. Drafts and archived posts resolve only for their owner;
/// everyone else gets a 404 so private posts stay unguessable.
pub async fn show(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let viewer = user.as_ref().map(|u| u.id);

    let post = match posts::find_post_by_slug(&state.db, &slug)? {
        Some(p) if posts::can_view(viewer, &p) => p,
        _ => return render_not_found(&state, &user),
    };

    let can_edit = viewer.map(|id| posts::can_mutate(id, &post)).unwrap_or(false);
    let post = posts::with_author(&state.db, post)?;

    let mut ctx = make_context(&state, &user);
    ctx.insert("post", &post);
    ctx.insert("can_edit", &can_edit);

    let html = state.templates.render("posts/show.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn stylesheet(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let css = state.templates.render("css/style.css", &Context::new())?;
    Ok(([(header::CONTENT_TYPE, "text/css")], css).into_response())
}

/// Serves previously uploaded editor images straight from the upload dir.
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    // Bare filenames only; anything path-like is refused outright.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    let path = state.upload_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&filename).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_string())], bytes).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
