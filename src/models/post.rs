use super::UserSummary;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    /// Human-facing name used by list and detail views.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
            Self::Archived => "Archived",
        }
    }
}

impl FromStr for PostStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub status: PostStatus,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub status_label: &'static str,
    pub author: Option<UserSummary>,
}

/// Validated input for a new post. Archived is not a legal creation status;
/// `prepare_create` rejects it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    #[serde(default)]
    pub status: PostStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub status: PostStatus,
}

/// The field set computed by the lifecycle for a single insert or update.
/// The caller merges it into storage; the slug is assigned separately on
/// create and never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub user_id: i64,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub status: PostStatus,
    pub published_at: Option<String>,
}
