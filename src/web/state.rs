use crate::web::security::RateLimiter;
use crate::{Config, Database};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tera::{Tera, Value};

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub templates: Tera,
    pub upload_dir: PathBuf,
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let mut templates = Tera::default();

        templates.register_filter("format_date", format_date_filter);
        templates.register_filter("nl2br", nl2br_filter);
        templates.add_raw_templates(vec![
            ("css/style.css", include_str!("../../templates/css/style.css")),
            ("base.html", include_str!("../../templates/base.html")),
            ("posts/index.html", include_str!("../../templates/posts/index.html")),
            ("posts/show.html", include_str!("../../templates/posts/show.html")),
            ("posts/form.html", include_str!("../../templates/posts/form.html")),
            ("users/index.html", include_str!("../../templates/users/index.html")),
            ("auth/login.html", include_str!("../../templates/auth/login.html")),
            ("auth/register.html", include_str!("../../templates/auth/register.html")),
            ("404.html", include_str!("../../templates/404.html")),
        ])?;

        let upload_dir = PathBuf::from(&config.media.upload_dir);

        Ok(Self {
            config,
            db,
            templates,
            upload_dir,
            login_limiter: Arc::new(RateLimiter::default()),
        })
    }
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date requires a string"))?;

    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%B %d, %Y");

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    Ok(Value::String(date_str.to_string()))
}

/// HTML-escapes the value, then turns newlines into `<br>`. Post bodies are
/// stored as plain text; templates pipe this through `safe`.
fn nl2br_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("nl2br requires a string"))?;

    let escaped = tera::escape_html(text);
    Ok(Value::String(escaped.replace("\r\n", "<br>").replace('\n', "<br>")))
}
