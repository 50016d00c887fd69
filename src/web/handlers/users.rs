use crate::services::users;
use crate::web::error::AppResult;
use crate::web::extractors::CurrentUser;
use crate::web::handlers::public::{clamp_page, make_context, Pagination};
use crate::web::state::AppState;
use axum::extract::{Query, State};
use axum::response::Html;
use std::sync::Arc;

const USERS_PER_PAGE: usize = 10;

/// Staff directory, visible to any signed-in user.
pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Html<String>> {
    let page = clamp_page(pagination.page);
    let offset = (page - 1) * USERS_PER_PAGE;

    let entries = users::list_users_page(&state.db, USERS_PER_PAGE, offset)?;
    let total = users::count_users(&state.db)?;
    let total_pages = (total as usize).div_ceil(USERS_PER_PAGE);

    let mut ctx = make_context(&state, &Some(user));
    ctx.insert("users", &entries);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);

    let html = state.templates.render("users/index.html", &ctx)?;
    Ok(Html(html))
}
