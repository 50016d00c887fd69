use crate::models::{DirectoryEntry, User};
use crate::services::auth::{row_to_user, USER_COLUMNS};
use crate::Database;
use anyhow::Result;
use rusqlite::OptionalExtension;

/// One page of the staff directory, oldest accounts first.
pub fn list_users_page(db: &Database, limit: usize, offset: usize) -> Result<Vec<DirectoryEntry>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY id ASC LIMIT ? OFFSET ?",
        USER_COLUMNS
    ))?;
    let users = stmt
        .query_map((limit as i64, offset as i64), row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users.iter().map(DirectoryEntry::from).collect())
}

pub fn count_users(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

pub fn list_users(db: &Database) -> Result<Vec<User>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY id ASC",
        USER_COLUMNS
    ))?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn get_user(db: &Database, id: i64) -> Result<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            [id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}
