use crate::models::{NewPost, Post, PostFields, PostStatus, PostWithAuthor, UpdatePost, UserSummary};
use crate::services::slug::assign_slug;
use crate::Database;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 255;
pub const EXCERPT_MAX_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("{0}")]
    Validation(String),
    #[error("post not found")]
    NotFound,
    #[error("not the owner of this post")]
    Forbidden,
    #[error("slug is already taken")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type PostResult<T> = Result<T, PostError>;

fn validate_fields(title: &str, excerpt: Option<&str>, body: &str) -> PostResult<()> {
    if title.trim().is_empty() {
        return Err(PostError::Validation("title is required".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(PostError::Validation(format!(
            "title must be {} characters or less",
            TITLE_MAX_CHARS
        )));
    }
    if let Some(excerpt) = excerpt {
        if excerpt.chars().count() > EXCERPT_MAX_CHARS {
            return Err(PostError::Validation(format!(
                "excerpt must be {} characters or less",
                EXCERPT_MAX_CHARS
            )));
        }
    }
    if body.trim().is_empty() {
        return Err(PostError::Validation("body is required".into()));
    }
    Ok(())
}

/// Computes the stored fields for a new post. A post may be created as a
/// draft or straight to published; archived is an update-only status.
/// `published_at` is stamped iff the post goes live immediately.
pub fn prepare_create(
    author_id: i64,
    input: &NewPost,
    now: DateTime<Utc>,
) -> PostResult<PostFields> {
    validate_fields(&input.title, input.excerpt.as_deref(), &input.body)?;

    if input.status == PostStatus::Archived {
        return Err(PostError::Validation(
            "a new post must be draft or published".into(),
        ));
    }

    let published_at = if input.status == PostStatus::Published {
        Some(now.to_rfc3339())
    } else {
        None
    };

    Ok(PostFields {
        user_id: author_id,
        title: input.title.clone(),
        excerpt: input.excerpt.clone(),
        body: input.body.clone(),
        status: input.status,
        published_at,
    })
}

/// Computes the stored fields for an update. Only the owner may mutate.
///
/// `published_at` is stamped on the first transition into published and
/// preserved verbatim in every other case, archival included; it is never
/// cleared once set.
pub fn prepare_update(
    actor_id: i64,
    post: &Post,
    input: &UpdatePost,
    now: DateTime<Utc>,
) -> PostResult<PostFields> {
    if !can_mutate(actor_id, post) {
        return Err(PostError::Forbidden);
    }

    validate_fields(&input.title, input.excerpt.as_deref(), &input.body)?;

    let published_at = if input.status == PostStatus::Published && post.published_at.is_none() {
        Some(now.to_rfc3339())
    } else {
        post.published_at.clone()
    };

    Ok(PostFields {
        user_id: post.user_id,
        title: input.title.clone(),
        excerpt: input.excerpt.clone(),
        body: input.body.clone(),
        status: input.status,
        published_at,
    })
}

/// Published posts are world-readable; drafts and archived posts only exist
/// for their owner. Callers render a denial as 404, not 403.
pub fn can_view(actor: Option<i64>, post: &Post) -> bool {
    post.status == PostStatus::Published || actor == Some(post.user_id)
}

/// Edit, update, and delete share the same gate: exact owner match.
pub fn can_mutate(actor_id: i64, post: &Post) -> bool {
    actor_id == post.user_id
}

/// Probes the whole table, soft-deleted rows included. A slug stays claimed
/// even after its post lands in the trash, so URLs are never recycled.
pub fn slug_exists(db: &Database, candidate: &str) -> PostResult<bool> {
    let conn = db.get()?;
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?)",
            [candidate],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::new)?;
    Ok(exists)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    )
}

pub fn create_post(db: &Database, author_id: i64, input: NewPost) -> PostResult<Post> {
    let fields = prepare_create(author_id, &input, Utc::now())?;

    let slug = assign_slug(&input.title, |candidate| {
        slug_exists(db, candidate).map_err(anyhow::Error::new)
    })?;

    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO posts (user_id, title, slug, excerpt, body, status, published_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        (
            fields.user_id,
            &fields.title,
            &slug,
            &fields.excerpt,
            &fields.body,
            fields.status.to_string(),
            &fields.published_at,
        ),
    )
    .map_err(|e| {
        // Lost the probe-then-insert race against a concurrent creator.
        if is_unique_violation(&e) {
            PostError::Conflict
        } else {
            PostError::Storage(e.into())
        }
    })?;

    let id = conn.last_insert_rowid();
    drop(conn);

    find_post_by_id(db, id)?.ok_or(PostError::NotFound)
}

pub fn update_post(
    db: &Database,
    actor_id: i64,
    post: &Post,
    input: UpdatePost,
) -> PostResult<Post> {
    let fields = prepare_update(actor_id, post, &input, Utc::now())?;

    let conn = db.get()?;
    conn.execute(
        r#"
        UPDATE posts
        SET title = ?, excerpt = ?, body = ?, status = ?, published_at = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
        (
            &fields.title,
            &fields.excerpt,
            &fields.body,
            fields.status.to_string(),
            &fields.published_at,
            post.id,
        ),
    )
    .map_err(anyhow::Error::new)?;
    drop(conn);

    find_post_by_id(db, post.id)?.ok_or(PostError::NotFound)
}

/// Marks the row deleted; the record and its slug stay in the table.
pub fn soft_delete_post(db: &Database, actor_id: i64, post: &Post) -> PostResult<()> {
    if !can_mutate(actor_id, post) {
        return Err(PostError::Forbidden);
    }

    let conn = db.get()?;
    conn.execute(
        "UPDATE posts SET deleted_at = datetime('now'), updated_at = datetime('now') \
         WHERE id = ? AND deleted_at IS NULL",
        [post.id],
    )
    .map_err(anyhow::Error::new)?;
    Ok(())
}

const POST_COLUMNS: &str =
    "id, user_id, title, slug, excerpt, body, status, published_at, created_at, updated_at, deleted_at";

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        excerpt: row.get(4)?,
        body: row.get(5)?,
        status: row
            .get::<_, String>(6)?
            .parse()
            .unwrap_or(PostStatus::Draft),
        published_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        deleted_at: row.get(10)?,
    })
}

fn find_post_by_id(db: &Database, id: i64) -> PostResult<Option<Post>> {
    let conn = db.get()?;
    let post = conn
        .query_row(
            &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
            [id],
            row_to_post,
        )
        .optional()
        .map_err(anyhow::Error::new)?;
    Ok(post)
}

/// Lookup used by every public entry point; soft-deleted rows do not resolve.
pub fn find_post_by_slug(db: &Database, slug: &str) -> PostResult<Option<Post>> {
    let conn = db.get()?;
    let post = conn
        .query_row(
            &format!(
                "SELECT {} FROM posts WHERE slug = ? AND deleted_at IS NULL",
                POST_COLUMNS
            ),
            [slug],
            row_to_post,
        )
        .optional()
        .map_err(anyhow::Error::new)?;
    Ok(post)
}

/// The index feed: published posts for everyone, plus the viewer's own
/// drafts, newest publication first.
pub fn list_posts(
    db: &Database,
    viewer: Option<i64>,
    limit: usize,
    offset: usize,
) -> PostResult<Vec<PostWithAuthor>> {
    let conn = db.get()?;

    let mut sql = format!(
        "SELECT {} FROM posts WHERE deleted_at IS NULL AND (status = 'published'",
        POST_COLUMNS
    );
    let mut params: Vec<i64> = Vec::new();

    if let Some(viewer) = viewer {
        sql.push_str(" OR (status = 'draft' AND user_id = ?)");
        params.push(viewer);
    }
    sql.push_str(") ORDER BY published_at DESC LIMIT ? OFFSET ?");

    let mut stmt = conn.prepare(&sql).map_err(anyhow::Error::new)?;

    let limit = limit as i64;
    let offset = offset as i64;
    let param_refs: Vec<&dyn rusqlite::ToSql> = params
        .iter()
        .map(|p| p as &dyn rusqlite::ToSql)
        .chain(std::iter::once(&limit as &dyn rusqlite::ToSql))
        .chain(std::iter::once(&offset as &dyn rusqlite::ToSql))
        .collect();

    let posts = stmt
        .query_map(param_refs.as_slice(), row_to_post)
        .map_err(anyhow::Error::new)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(anyhow::Error::new)?;
    drop(stmt);
    drop(conn);

    posts.into_iter().map(|p| with_author(db, p)).collect()
}

pub fn count_posts(db: &Database, viewer: Option<i64>) -> PostResult<i64> {
    let conn = db.get()?;

    let mut sql = String::from(
        "SELECT COUNT(*) FROM posts WHERE deleted_at IS NULL AND (status = 'published'",
    );
    let mut params: Vec<i64> = Vec::new();

    if let Some(viewer) = viewer {
        sql.push_str(" OR (status = 'draft' AND user_id = ?)");
        params.push(viewer);
    }
    sql.push(')');

    let param_refs: Vec<&dyn rusqlite::ToSql> =
        params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
    let count: i64 = conn
        .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
        .map_err(anyhow::Error::new)?;
    Ok(count)
}

pub fn with_author(db: &Database, post: Post) -> PostResult<PostWithAuthor> {
    let conn = db.get()?;

    let author = conn
        .query_row(
            "SELECT id, name FROM users WHERE id = ?",
            [post.user_id],
            |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .ok();

    let status_label = post.status.label();
    Ok(PostWithAuthor {
        post,
        status_label,
        author,
    })
}
