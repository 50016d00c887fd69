use crate::models::{Department, Qualification, StaffRole, User};
use crate::Database;
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const ADMIN_ID_LENGTH: usize = 4;
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254;

/// The staff ID doubles as the login identifier.
pub fn validate_admin_id(admin_id: &str) -> Result<()> {
    if admin_id.len() != ADMIN_ID_LENGTH || !admin_id.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Staff ID must be exactly {} digits", ADMIN_ID_LENGTH);
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        anyhow::bail!("Name must be {} characters or less", MAX_NAME_LENGTH);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        anyhow::bail!("Email cannot be empty");
    }
    if email.len() > MAX_EMAIL_LENGTH {
        anyhow::bail!("Email must be {} characters or less", MAX_EMAIL_LENGTH);
    }
    if !email.contains('@') || !email.contains('.') {
        anyhow::bail!("Invalid email format");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        anyhow::bail!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        );
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        anyhow::bail!("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        anyhow::bail!("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        anyhow::bail!("Password must contain at least one number");
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$0000000000000000000000000000000000000000000";

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => {
            if let Ok(dummy) = PasswordHash::new(DUMMY_HASH) {
                let _ = Argon2::default().verify_password(password.as_bytes(), &dummy);
            }
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) const USER_COLUMNS: &str =
    "id, admin_id, name, email, password_hash, qualification, role, department, created_at, updated_at";

pub(crate) fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        admin_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        qualification: row
            .get::<_, String>(5)?
            .parse()
            .unwrap_or(Qualification::Unqualified),
        role: row
            .get::<_, String>(6)?
            .parse()
            .unwrap_or(StaffRole::General),
        department: row
            .get::<_, Option<String>>(7)?
            .and_then(|d| d.parse::<Department>().ok()),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn create_user(
    db: &Database,
    admin_id: &str,
    name: &str,
    email: &str,
    password: &str,
    qualification: Qualification,
    role: StaffRole,
    department: Option<Department>,
) -> Result<i64> {
    validate_admin_id(admin_id)?;
    validate_name(name)?;
    validate_email(email)?;
    let password_hash = hash_password(password)?;
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO users (admin_id, name, email, password_hash, qualification, role, department) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            admin_id,
            name,
            email,
            &password_hash,
            qualification.to_string(),
            role.to_string(),
            department.map(|d| d.to_string()),
        ),
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => {
            anyhow::anyhow!("Staff ID or email is already registered")
        }
        _ => anyhow::Error::new(e),
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn update_password(db: &Database, admin_id: &str, password: &str) -> Result<()> {
    let password_hash = hash_password(password)?;
    let conn = db.get()?;
    let changed = conn.execute(
        "UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE admin_id = ?",
        (&password_hash, admin_id),
    )?;
    if changed == 0 {
        anyhow::bail!("No user with staff ID {}", admin_id);
    }
    Ok(())
}

pub fn authenticate(db: &Database, admin_id: &str, password: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let user: Option<User> = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE admin_id = ?", USER_COLUMNS),
            [admin_id],
            row_to_user,
        )
        .ok();

    match user {
        Some(u) if verify_password(password, &u.password_hash) => Ok(Some(u)),
        _ => {
            // Equalize timing for unknown IDs.
            verify_password(password, "");
            Ok(None)
        }
    }
}

pub fn create_session(db: &Database, user_id: i64, duration_days: i64) -> Result<String> {
    let token = generate_session_token();
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, datetime('now', ?||' days'))",
        (user_id, &token, duration_days),
    )?;
    Ok(token)
}

pub fn validate_session(db: &Database, token: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            r#"
            SELECT u.id, u.admin_id, u.name, u.email, u.password_hash,
                   u.qualification, u.role, u.department, u.created_at, u.updated_at
            FROM users u
            JOIN sessions s ON s.user_id = u.id
            WHERE s.token = ? AND s.expires_at > datetime('now')
            "#,
            [token],
            row_to_user,
        )
        .ok();
    Ok(user)
}

pub fn delete_session(db: &Database, token: &str) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
    Ok(())
}

pub fn cleanup_expired_sessions(db: &Database) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    Ok(())
}

pub fn delete_user(db: &Database, admin_id: &str) -> Result<()> {
    let conn = db.get()?;
    let removed = conn.execute("DELETE FROM users WHERE admin_id = ?", [admin_id])?;
    if removed == 0 {
        anyhow::bail!("No user with staff ID {}", admin_id);
    }
    Ok(())
}
