use crate::helper::{contact_helpers, media_helpers, membership_helpers, WorkflowError};
use crate::models::{ContactSubmission, MediaType, MembershipApplication};
use crate::DbPool;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/membership", web::post().to(submit_membership))
            .route("/contact", web::post().to(submit_contact))
            .route("/gallery", web::get().to(get_gallery))
            .route("/gallery/{media_type}", web::get().to(get_gallery_by_type)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn submit_membership(
    pool: web::Data<DbPool>,
    application: web::Json<MembershipApplication>,
) -> Result<HttpResponse, WorkflowError> {
    let member = membership_helpers::register(&pool, &application)?;
    Ok(HttpResponse::Created().json(member))
}

async fn submit_contact(
    pool: web::Data<DbPool>,
    submission: web::Json<ContactSubmission>,
) -> Result<HttpResponse, WorkflowError> {
    let message = contact_helpers::submit(&pool, &submission)?;
    Ok(HttpResponse::Created().json(message))
}

async fn get_gallery(pool: web::Data<DbPool>) -> Result<HttpResponse, WorkflowError> {
    let photos = media_helpers::list_published_by_type(&pool, MediaType::Photo)?;
    let videos = media_helpers::list_published_by_type(&pool, MediaType::Video)?;
    Ok(HttpResponse::Ok().json(json!({ "photos": photos, "videos": videos })))
}

async fn get_gallery_by_type(
    pool: web::Data<DbPool>,
    media_type: web::Path<String>,
) -> Result<HttpResponse, WorkflowError> {
    let media_type: MediaType = media_type
        .parse()
        .map_err(|e: crate::models::UnknownLabel| WorkflowError::InvalidInput(e.to_string()))?;
    let items = media_helpers::list_published_by_type(&pool, media_type)?;
    Ok(HttpResponse::Ok().json(items))
}
