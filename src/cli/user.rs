use crate::models::Qualification;
use crate::services::{auth, users};
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    match command {
        UserCommand::Add {
            admin_id,
            name,
            email,
            role,
            department,
            qualified,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let p = rpassword::prompt_password("Password: ")?;
                    let p_confirm = rpassword::prompt_password("Confirm password: ")?;
                    if p != p_confirm {
                        anyhow::bail!("Passwords do not match");
                    }
                    p
                }
            };

            let role = role.parse().map_err(|_| anyhow::anyhow!("Invalid role"))?;
            let department = department
                .map(|d| {
                    d.parse()
                        .map_err(|_| anyhow::anyhow!("Invalid department: {}", d))
                })
                .transpose()?;
            let qualification = if qualified {
                Qualification::Qualified
            } else {
                Qualification::Unqualified
            };

            auth::create_user(
                &db,
                &admin_id,
                &name,
                &email,
                &password,
                qualification,
                role,
                department,
            )?;
            tracing::info!("User '{}' ({}) created", name, admin_id);
        }
        UserCommand::List => {
            let all = users::list_users(&db)?;

            println!(
                "{:<6} {:<20} {:<30} {:<10} {:<20}",
                "ID", "NAME", "EMAIL", "ROLE", "DEPARTMENT"
            );
            println!("{}", "-".repeat(90));
            for user in all {
                println!(
                    "{:<6} {:<20} {:<30} {:<10} {:<20}",
                    user.admin_id,
                    user.name,
                    user.email,
                    user.role.to_string(),
                    user.department.map(|d| d.label()).unwrap_or("-"),
                );
            }
        }
        UserCommand::Remove { admin_id } => {
            auth::delete_user(&db, &admin_id)?;
            tracing::info!("User '{}' removed", admin_id);
        }
        UserCommand::Passwd { admin_id } => {
            let password = rpassword::prompt_password("New password: ")?;
            let password_confirm = rpassword::prompt_password("Confirm password: ")?;

            if password != password_confirm {
                anyhow::bail!("Passwords do not match");
            }

            auth::update_password(&db, &admin_id, &password)?;
            tracing::info!("Password updated for '{}'", admin_id);
        }
    }

    Ok(())
}
