use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware::{Logger, DefaultHeaders}, cookie::Key, HttpResponse, Responder};
use actix_session::{SessionMiddleware, storage::CookieSessionStore, SessionExt};
use actix_csrf::CsrfMiddleware;
use association_backend::{
    config::Config,
    routes,
    helper::{admin_helpers, media_storage::LocalMediaStore},
    middleware::{admin_guard, ip_guard},
    models::db_operations::open_pool,
    AppState,
};
use std::fs;
use std::sync::Arc;
use clap::Parser;
use std::path::PathBuf;
use rand::prelude::StdRng;

/// Pages that hand out a CSRF token for the forms they lead to.
const TOKEN_PAGES: [&str; 5] = ["login", "dashboard", "members", "contacts", "media"];

async fn root_handler() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

#[derive(Parser, Debug)]
#[command(name = "association_server", author, version, about = "Starts the association site web server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let site_db_path = config.site_db_path();
    if let Some(parent) = site_db_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create database directory");
    }
    if !site_db_path.exists() {
        panic!("FATAL: site.db not found. Run 'cargo run --bin setup_cli -- --env-file <path> db setup'");
    }

    let pool = open_pool(&site_db_path)
        .expect("FATAL: Failed to create Rusqlite connection pool.");

    match admin_helpers::admin_exists(&pool) {
        Ok(true) => {}
        Ok(false) => log::warn!("No admin account exists. Create one with 'setup_cli admin create'."),
        Err(e) => log::error!("Could not check for admin accounts: {}", e),
    }

    let app_state = web::Data::new(AppState {
        media_store: Arc::new(LocalMediaStore::new(config.gallery_path())),
    });

    let session_key_bytes = hex::decode(&config.session_secret_key)
        .expect("FATAL: SESSION_SECRET_KEY in .env is not a valid hex string.");
    let session_key = Key::try_from(session_key_bytes.as_slice())
        .expect("FATAL: The decoded SESSION_SECRET_KEY is not long enough (minimum 64 bytes required).");

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    log::info!("Server starting at http://{}", server_address);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
            .cookie_secure(config.use_secure_cookies)
            .cookie_http_only(true)
            .cookie_same_site(actix_web::cookie::SameSite::Lax)
            .build();

        let cors = {
            let allowed_origins_str = &config.allowed_origins;
            let cors = if allowed_origins_str.trim() == "*" {
                Cors::default().allow_any_origin()
            } else {
                allowed_origins_str
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            };
            cors.allowed_methods(vec!["GET", "POST"])
                .allowed_headers(vec![actix_web::http::header::AUTHORIZATION, actix_web::http::header::ACCEPT, actix_web::http::header::CONTENT_TYPE])
                .supports_credentials()
                .max_age(3600)
        };

        let admin_base_url = config.admin_base_url();
        let csrf = TOKEN_PAGES.iter().fold(CsrfMiddleware::<StdRng>::new(), |csrf, page| {
            csrf.set_cookie(actix_web::http::Method::GET, format!("{}/{}", admin_base_url, page))
        });

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(app_state.clone())

            .configure(routes::public::config_api)
            .service(actix_files::Files::new("/media", &config.media_path))

            .route("/", web::get().to(root_handler))

            .service(
                web::scope("")
                    .wrap(session_mw)
                    .service(
                        web::scope("/management")
                            .service(
                                web::scope(&config.admin_url_prefix)
                                    .wrap(csrf)
                                    .guard(actix_web::guard::fn_guard(ip_guard))
                                    .configure(routes::admin::config_login)
                                    .service(
                                        web::scope("")
                                            .guard(actix_web::guard::fn_guard(|ctx| admin_guard(&ctx.get_session())))
                                            .configure(routes::admin::config_dashboard)
                                    )
                            )
                    )
            )
    })
    .bind(server_address)?
    .run()
    .await
}
