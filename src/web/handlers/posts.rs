use crate::models::{NewPost, PostStatus, UpdatePost, User};
use crate::services::posts::{self, PostError};
use crate::web::error::{AppError, AppResult};
use crate::web::extractors::CurrentUser;
use crate::web::handlers::public::{make_context, render_not_found};
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PostForm {
    title: String,
    excerpt: Option<String>,
    body: String,
    status: String,
}

/// Echoed back into the form template when validation fails.
#[derive(Serialize)]
struct FormValues<'a> {
    title: &'a str,
    excerpt: &'a str,
    body: &'a str,
    status: &'a str,
}

impl PostForm {
    fn status(&self) -> Result<PostStatus, PostError> {
        self.status
            .parse()
            .map_err(|_| PostError::Validation(format!("Unknown status: {}", self.status)))
    }

    fn excerpt(&self) -> Option<String> {
        self.excerpt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn values(&self) -> FormValues<'_> {
        FormValues {
            title: &self.title,
            excerpt: self.excerpt.as_deref().unwrap_or(""),
            body: &self.body,
            status: &self.status,
        }
    }
}

fn render_form(
    state: &AppState,
    user: &User,
    form: Option<&PostForm>,
    slug: Option<&str>,
    error: Option<&str>,
) -> AppResult<Html<String>> {
    let mut ctx = make_context(state, &Some(user.clone()));
    ctx.insert("is_new", &slug.is_none());
    match form {
        Some(form) => ctx.insert("form", &form.values()),
        None => ctx.insert(
            "form",
            &FormValues {
                title: "",
                excerpt: "",
                body: "",
                status: "draft",
            },
        ),
    }
    if let Some(slug) = slug {
        ctx.insert("slug", slug);
    }
    if let Some(error) = error {
        ctx.insert("error", error);
    }

    let html = state.templates.render("posts/form.html", &ctx)?;
    Ok(Html(html))
}

pub async fn new_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    render_form(&state, &user, None, None, None)
}

pub async fn store(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let input = match form.status() {
        Ok(status) => NewPost {
            title: form.title.clone(),
            excerpt: form.excerpt(),
            body: form.body.clone(),
            status,
        },
        Err(PostError::Validation(msg)) => {
            let html = render_form(&state, &user, Some(&form), None, Some(msg.as_str()))?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    match posts::create_post(&state.db, user.id, input) {
        Ok(post) => Ok(Redirect::to(&format!("/posts/{}", post.slug)).into_response()),
        Err(PostError::Validation(msg)) => {
            let html = render_form(&state, &user, Some(&form), None, Some(msg.as_str()))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let post = match posts::find_post_by_slug(&state.db, &slug)? {
        Some(p) => p,
        None => return render_not_found(&state, &Some(user)),
    };

    if !posts::can_mutate(user.id, &post) {
        return Err(AppError::Forbidden);
    }

    let form = PostForm {
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        body: post.body.clone(),
        status: post.status.to_string(),
    };

    let html = render_form(&state, &user, Some(&form), Some(post.slug.as_str()), None)?;
    Ok(html.into_response())
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let post = match posts::find_post_by_slug(&state.db, &slug)? {
        Some(p) => p,
        None => return render_not_found(&state, &Some(user)),
    };

    let input = match form.status() {
        Ok(status) => UpdatePost {
            title: form.title.clone(),
            excerpt: form.excerpt(),
            body: form.body.clone(),
            status,
        },
        Err(PostError::Validation(msg)) => {
            let html = render_form(&state, &user, Some(&form), Some(post.slug.as_str()), Some(msg.as_str()))?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    match posts::update_post(&state.db, user.id, &post, input) {
        Ok(updated) => Ok(Redirect::to(&format!("/posts/{}", updated.slug)).into_response()),
        Err(PostError::Validation(msg)) => {
            let html = render_form(&state, &user, Some(&form), Some(post.slug.as_str()), Some(msg.as_str()))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn destroy(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let post = match posts::find_post_by_slug(&state.db, &slug)? {
        Some(p) => p,
        None => return render_not_found(&state, &Some(user)),
    };

    posts::soft_delete_post(&state.db, user.id, &post)?;
    Ok(Redirect::to("/posts").into_response())
}
