use clap::{Parser, Subcommand};
use association_backend::config::Config;
use association_backend::helper::media_helpers;
use association_backend::helper::media_storage::LocalMediaStore;
use association_backend::models::db_operations::{admin_users_db_operations, open_pool};
use association_backend::setup::db_setup;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial site setup and maintenance.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    Media {
        #[command(subcommand)]
        action: MediaAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Creates the site database and its tables.
    Setup,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    List,
    ChangePassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        new_password: String,
    },
    SetActive {
        #[arg(long)]
        username: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
}

#[derive(Subcommand, Debug)]
enum MediaAction {
    /// Lists gallery files without a record and photo records without a file.
    Reconcile,
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup => setup_site_database(&config),
        },
        Commands::Admin { action } => {
            let conn = match open_site_db(&config) {
                Some(c) => c,
                None => return,
            };
            match action {
                AdminAction::Create { username, password, full_name } => {
                    create_admin_user(&conn, username, password, full_name.as_deref())
                }
                AdminAction::List => list_admin_users(&conn),
                AdminAction::ChangePassword { username, new_password } => {
                    change_admin_password(&conn, username, new_password)
                }
                AdminAction::SetActive { username, active } => set_admin_active(&conn, username, *active),
            }
        }
        Commands::Media { action } => match action {
            MediaAction::Reconcile => reconcile_media(&config),
        },
    }
}

fn setup_site_database(config: &Config) {
    let db_path = config.site_db_path();
    println!("\nSetting up site database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create site database file.");
    match db_setup::setup_site_db(&mut conn) {
        Ok(_) => println!("✅ Site database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up site database: {}", e),
    }

    match fs::create_dir_all(config.gallery_path()) {
        Ok(_) => println!("✅ Gallery directory ready at '{}'.", config.gallery_path().display()),
        Err(e) => eprintln!("❌ Error creating gallery directory: {}", e),
    }
}

fn open_site_db(config: &Config) -> Option<Connection> {
    let db_path = config.site_db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Site database not found at '{}'. Please run `setup_cli db setup` first.", db_path.display());
        return None;
    }
    match Connection::open(&db_path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("❌ Error opening site database: {}", e);
            None
        }
    }
}

fn create_admin_user(conn: &Connection, username: &str, password: &str, full_name: Option<&str>) {
    let username = username.trim();
    if username.is_empty() || password.len() < 8 {
        eprintln!("❌ Error: The username must not be empty and the password needs at least 8 characters.");
        return;
    }
    match admin_users_db_operations::create_admin(conn, username, password, full_name) {
        Ok(_) => println!("✅ Admin user '{}' created successfully.", username),
        Err(e) => eprintln!("❌ Error creating admin user: {}. It might be because the username already exists.", e),
    }
}

fn list_admin_users(conn: &Connection) {
    println!("Listing Admin Users:");
    match admin_users_db_operations::read_all_admins(conn) {
        Ok(admins) => {
            for admin in admins {
                let state = if admin.is_active { "active" } else { "suspended" };
                let last_login = admin.last_login_time.as_deref().unwrap_or("never");
                println!("- {} ({}, last login: {})", admin.username, state, last_login);
            }
        }
        Err(e) => eprintln!("❌ Error fetching admins: {}", e),
    }
}

fn change_admin_password(conn: &Connection, username: &str, new_password: &str) {
    if new_password.len() < 8 {
        eprintln!("❌ Error: The new password needs at least 8 characters.");
        return;
    }
    match admin_users_db_operations::change_password(conn, username, new_password) {
        Ok(0) => eprintln!("❌ Error: No admin user named '{}' found.", username),
        Ok(_) => println!("✅ Password for admin user '{}' changed successfully.", username),
        Err(e) => eprintln!("❌ Error updating password: {}", e),
    }
}

fn set_admin_active(conn: &Connection, username: &str, active: bool) {
    match admin_users_db_operations::set_active(conn, username, active) {
        Ok(0) => eprintln!("❌ Error: No admin user named '{}' found.", username),
        Ok(_) if active => println!("✅ Admin user '{}' reactivated.", username),
        Ok(_) => println!("✅ Admin user '{}' suspended.", username),
        Err(e) => eprintln!("❌ Error updating admin user: {}", e),
    }
}

fn reconcile_media(config: &Config) {
    let pool = match open_pool(&config.site_db_path()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("❌ Error opening site database: {}", e);
            return;
        }
    };
    let store = LocalMediaStore::new(config.gallery_path());
    match media_helpers::reconcile(&pool, &store) {
        Ok(report) if report.is_clean() => println!("✅ Gallery files and photo records match."),
        Ok(report) => {
            println!("Orphaned files (no photo record):");
            for key in &report.orphaned_files {
                println!("- {}", store.root().join(key).display());
            }
            println!("Photo records whose file is missing:");
            for missing in &report.missing_files {
                println!("- #{} {}", missing.id, missing.file_path);
            }
        }
        Err(e) => eprintln!("❌ Error reconciling media: {}", e),
    }
}
