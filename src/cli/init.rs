use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "Team Atrium".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;
    std::fs::create_dir_all(path.join("data/uploads"))?;

    let config = format!(
        r#"[site]
title = "{}"
description = "Team announcements and articles"
url = "http://localhost:3000"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/atrium.db"

[content]
posts_per_page = 10

[media]
upload_dir = "./data/uploads"
max_upload_bytes = 10485760

[auth]
session_days = 7
"#,
        site_name
    );

    std::fs::write(path.join("atrium.toml"), config)?;

    tracing::info!("Created new Atrium site at {:?}", path);
    tracing::info!("Run 'atrium migrate' to set up the database");
    tracing::info!("Run 'atrium user add' to create the first account");
    tracing::info!("Run 'atrium serve' to start the server");

    Ok(())
}
