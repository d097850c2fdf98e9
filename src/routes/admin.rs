use crate::config::Config;
use crate::helper::form_helpers::read_photo_upload;
use crate::helper::media_storage::FileCleanup;
use crate::helper::{admin_helpers, contact_helpers, media_helpers, membership_helpers, WorkflowError};
use crate::middleware::{AuthenticatedAdmin, ADMIN_ROLE};
use crate::models::{MediaDetailsUpdate, MemberStatus, Notification};
use crate::{AppState, DbPool};
use actix_csrf::extractor::{Csrf, CsrfGuarded, CsrfToken};
use actix_multipart::Multipart;
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct LoginForm {
    csrf_token: CsrfToken,
    username: String,
    password: String,
}

/// A POST that carries nothing but its CSRF token.
#[derive(Deserialize)]
struct ConfirmForm {
    csrf_token: CsrfToken,
}

#[derive(Deserialize)]
struct MemberStatusForm {
    csrf_token: CsrfToken,
    status: String,
}

#[derive(Deserialize)]
struct ReadFlagForm {
    csrf_token: CsrfToken,
    is_read: bool,
}

#[derive(Deserialize)]
struct PublishForm {
    csrf_token: CsrfToken,
    is_published: bool,
}

#[derive(Deserialize)]
struct VideoForm {
    csrf_token: CsrfToken,
    title: String,
    description: Option<String>,
    url: String,
}

#[derive(Deserialize)]
struct MediaDetailsForm {
    csrf_token: CsrfToken,
    title: String,
    description: Option<String>,
    #[serde(default)]
    display_order: i32,
    // Unchecked checkboxes are absent from the form.
    #[serde(default)]
    is_published: bool,
}

macro_rules! csrf_guarded {
    ($($form:ty),* $(,)?) => {
        $(impl CsrfGuarded for $form {
            fn csrf_token(&self) -> &CsrfToken {
                &self.csrf_token
            }
        })*
    };
}

csrf_guarded!(LoginForm, ConfirmForm, MemberStatusForm, ReadFlagForm, PublishForm, VideoForm, MediaDetailsForm);

#[derive(Deserialize)]
struct MemberListQuery {
    status: Option<String>,
}

#[derive(Deserialize)]
struct ContactListQuery {
    filter: Option<String>,
}

pub fn config_login(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(show_admin_login_form))
        .route("/login", web::post().to(handle_admin_login))
        .route("/logout", web::post().to(handle_admin_logout));
}

pub fn config_dashboard(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(show_admin_dashboard))
        .route("/members", web::get().to(show_members))
        .route("/members/{id}/status", web::post().to(set_member_status_action))
        .route("/members/{id}/delete", web::post().to(delete_member_action))
        .route("/contacts", web::get().to(show_contacts))
        .route("/contacts/{id}/read", web::post().to(set_contact_read_action))
        .route("/contacts/{id}/delete", web::post().to(delete_contact_action))
        .route("/media", web::get().to(show_media))
        .route("/media/upload", web::post().to(upload_photo_action))
        .route("/media/video", web::post().to(add_video_action))
        .route("/media/reconcile", web::get().to(reconcile_media_action))
        .route("/media/{id}/publish", web::post().to(set_media_published_action))
        .route("/media/{id}/update", web::post().to(update_media_action))
        .route("/media/{id}/delete", web::post().to(delete_media_action));
}

fn set_notification(session: &Session, message: &str, r#type: &str) {
    let notification = Notification { message: message.to_string(), r#type: r#type.to_string() };
    if let Err(e) = session.insert("notification", &notification) {
        log::error!("Failed to store notification in session: {}", e);
    }
}

fn take_notification(session: &Session) -> Option<Notification> {
    let notification = session.get::<Notification>("notification").unwrap_or(None);
    if notification.is_some() {
        session.remove("notification");
    }
    notification
}

/// Records the outcome of an admin action for the next page load.
fn notify_outcome(session: &Session, outcome: Result<String, WorkflowError>) {
    match outcome {
        Ok(message) => set_notification(session, &message, "success"),
        Err(e) => {
            match &e {
                WorkflowError::NotFound { .. } | WorkflowError::InvalidInput(_) | WorkflowError::DuplicateEmail(_) => {
                    log::warn!("Admin action rejected: {}", e)
                }
                _ => log::error!("Admin action failed: {}", e),
            }
            set_notification(session, &user_message(&e), "error");
        }
    }
}

fn user_message(e: &WorkflowError) -> String {
    match e {
        WorkflowError::NotFound { .. } | WorkflowError::InvalidInput(_) | WorkflowError::DuplicateEmail(_) => e.to_string(),
        _ => "The action failed because of a server error.".to_string(),
    }
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found().append_header(("location", location)).finish()
}

fn admin_url(config: &Config, page: &str) -> String {
    format!("{}/{}", config.admin_base_url(), page)
}

async fn show_admin_login_form(
    session: Session,
    token: CsrfToken,
    config: web::Data<Config>,
) -> impl Responder {
    if session.get::<String>("role").unwrap_or(None).as_deref() == Some(ADMIN_ROLE) {
        return redirect(admin_url(&config, "dashboard"));
    }

    let error = session.get::<String>("error").unwrap_or(None);
    if error.is_some() {
        session.remove("error");
    }
    HttpResponse::Ok().json(json!({
        "csrf_token": token.get(),
        "error": error,
    }))
}

async fn handle_admin_login(
    session: Session,
    pool: web::Data<DbPool>,
    form: Csrf<web::Form<LoginForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let login_url = admin_url(&config, "login");
    let login_data = form.into_inner();

    match admin_helpers::verify_admin_credentials(&pool, login_data.username.trim(), &login_data.password) {
        Some(username) => {
            session.renew();
            let stored = session.insert("username", &username).and_then(|_| session.insert("role", ADMIN_ROLE));
            if let Err(e) = stored {
                log::error!("Failed to store admin session for '{}': {}", username, e);
                return redirect(login_url);
            }
            session.remove("error");
            if let Err(e) = admin_helpers::record_login(&pool, &username) {
                log::warn!("Could not record login time for '{}': {}", username, e);
            }
            redirect(admin_url(&config, "dashboard"))
        }
        None => {
            log::warn!("Failed admin login attempt for '{}'", login_data.username.trim());
            if let Err(e) = session.insert("error", "Invalid credentials or account suspended.") {
                log::error!("Failed to store login error in session: {}", e);
            }
            redirect(login_url)
        }
    }
}

async fn handle_admin_logout(session: Session, config: web::Data<Config>) -> impl Responder {
    session.purge();
    redirect(admin_url(&config, "login"))
}

async fn show_admin_dashboard(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    token: CsrfToken,
) -> Result<HttpResponse, WorkflowError> {
    let summary = admin_helpers::dashboard(&pool)?;
    Ok(HttpResponse::Ok().json(json!({
        "user": auth_user,
        "csrf_token": token.get(),
        "notification": take_notification(&session),
        "summary": summary,
    })))
}

async fn show_members(
    _auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    token: CsrfToken,
    query: web::Query<MemberListQuery>,
) -> Result<HttpResponse, WorkflowError> {
    let members = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(label) => {
            let status: MemberStatus = label.parse().map_err(|e: crate::models::UnknownLabel| {
                WorkflowError::InvalidInput(e.to_string())
            })?;
            membership_helpers::list_by_status(&pool, status)?
        }
        None => membership_helpers::list_all(&pool)?,
    };
    Ok(HttpResponse::Ok().json(json!({
        "csrf_token": token.get(),
        "notification": take_notification(&session),
        "members": members,
    })))
}

async fn set_member_status_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    form: Csrf<web::Form<MemberStatusForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let form = form.into_inner();
    let outcome = form
        .status
        .parse::<MemberStatus>()
        .map_err(|e| WorkflowError::InvalidInput(e.to_string()))
        .and_then(|status| {
            membership_helpers::set_status(&pool, &auth_user, id, status)
                .map(|_| format!("Member {} is now {}.", id, status))
        });
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "members"))
}

async fn delete_member_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    _form: Csrf<web::Form<ConfirmForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let outcome = membership_helpers::delete(&pool, &auth_user, id).map(|_| format!("Member {} deleted.", id));
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "members"))
}

async fn show_contacts(
    _auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    token: CsrfToken,
    query: web::Query<ContactListQuery>,
) -> Result<HttpResponse, WorkflowError> {
    let messages = match query.filter.as_deref().map(str::trim).unwrap_or("all") {
        "unread" => contact_helpers::list_unread(&pool)?,
        "read" => contact_helpers::list_read(&pool)?,
        "all" | "" => contact_helpers::list_all(&pool)?,
        other => return Err(WorkflowError::InvalidInput(format!("unknown filter '{}'", other))),
    };
    Ok(HttpResponse::Ok().json(json!({
        "csrf_token": token.get(),
        "notification": take_notification(&session),
        "unread_count": contact_helpers::count_unread(&pool)?,
        "messages": messages,
    })))
}

async fn set_contact_read_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    form: Csrf<web::Form<ReadFlagForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let is_read = form.into_inner().is_read;
    let outcome = contact_helpers::set_read(&pool, &auth_user, id, is_read).map(|_| {
        let state = if is_read { "read" } else { "unread" };
        format!("Message {} marked as {}.", id, state)
    });
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "contacts"))
}

async fn delete_contact_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    _form: Csrf<web::Form<ConfirmForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let outcome = contact_helpers::delete(&pool, &auth_user, id).map(|_| format!("Message {} deleted.", id));
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "contacts"))
}

async fn show_media(
    _auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    token: CsrfToken,
) -> Result<HttpResponse, WorkflowError> {
    let items = media_helpers::list_all(&pool)?;
    Ok(HttpResponse::Ok().json(json!({
        "csrf_token": token.get(),
        "notification": take_notification(&session),
        "published_count": media_helpers::count_published(&pool)?,
        "items": items,
    })))
}

async fn upload_photo_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
    config: web::Data<Config>,
    payload: Multipart,
) -> impl Responder {
    let media_url = admin_url(&config, "media");
    let upload = match read_photo_upload(payload, config.max_upload_bytes()).await {
        Ok(upload) => upload,
        Err(e) => {
            notify_outcome(&session, Err(e));
            return redirect(media_url);
        }
    };

    let pool = pool.get_ref().clone();
    let store = app_state.media_store.clone();
    let outcome = web::block(move || {
        media_helpers::add_photo(
            &pool,
            store.as_ref(),
            &auth_user,
            &upload.bytes,
            upload.original_filename.as_deref(),
            &upload.title,
            upload.description.as_deref(),
        )
    })
    .await;

    match outcome {
        Ok(result) => notify_outcome(&session, result.map(|item| format!("Photo '{}' added.", item.title))),
        Err(e) => {
            log::error!("Blocking error while storing photo: {}", e);
            set_notification(&session, "The action failed because of a server error.", "error");
        }
    }
    redirect(media_url)
}

async fn add_video_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    form: Csrf<web::Form<VideoForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let form = form.into_inner();
    let outcome = media_helpers::add_video(&pool, &auth_user, &form.title, form.description.as_deref(), &form.url)
        .map(|item| format!("Video '{}' added.", item.title));
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "media"))
}

async fn set_media_published_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    form: Csrf<web::Form<PublishForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let is_published = form.into_inner().is_published;
    let outcome = media_helpers::set_published(&pool, &auth_user, id, is_published).map(|_| {
        let state = if is_published { "published" } else { "hidden" };
        format!("Media item {} is now {}.", id, state)
    });
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "media"))
}

async fn update_media_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    form: Csrf<web::Form<MediaDetailsForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let form = form.into_inner();
    let update = MediaDetailsUpdate {
        title: form.title.clone(),
        description: form.description.clone(),
        display_order: form.display_order,
        is_published: form.is_published,
    };
    let outcome = media_helpers::update_details(&pool, &auth_user, id, &update)
        .map(|item| format!("Media item '{}' updated.", item.title));
    notify_outcome(&session, outcome);
    redirect(admin_url(&config, "media"))
}

async fn delete_media_action(
    auth_user: AuthenticatedAdmin,
    session: Session,
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    _form: Csrf<web::Form<ConfirmForm>>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = path.into_inner();
    let pool = pool.get_ref().clone();
    let store = app_state.media_store.clone();
    let outcome = web::block(move || media_helpers::delete(&pool, store.as_ref(), &auth_user, id)).await;

    match outcome {
        Ok(Ok(FileCleanup::Failed(failure))) => set_notification(
            &session,
            &format!("Media item {} deleted, but its file could not be removed ({}).", id, failure.reason),
            "warning",
        ),
        Ok(result) => notify_outcome(&session, result.map(|_| format!("Media item {} deleted.", id))),
        Err(e) => {
            log::error!("Blocking error while deleting media item {}: {}", id, e);
            set_notification(&session, "The action failed because of a server error.", "error");
        }
    }
    redirect(admin_url(&config, "media"))
}

async fn reconcile_media_action(
    _auth_user: AuthenticatedAdmin,
    pool: web::Data<DbPool>,
    app_state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let pool = pool.get_ref().clone();
    let store = app_state.media_store.clone();
    let report = web::block(move || media_helpers::reconcile(&pool, store.as_ref())).await??;
    Ok(HttpResponse::Ok().json(report))
}
