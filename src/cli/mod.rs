pub mod init;
pub mod migrate;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atrium")]
#[command(version)]
#[command(about = "A small server-rendered team CMS", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "atrium.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a new site directory with a default config
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Run the web server
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        /// 4-digit staff ID used to sign in
        #[arg(long)]
        admin_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "general")]
        role: String,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        qualified: bool,
        #[arg(long)]
        password: Option<String>,
    },
    List,
    Remove {
        admin_id: String,
    },
    Passwd {
        admin_id: String,
    },
}
