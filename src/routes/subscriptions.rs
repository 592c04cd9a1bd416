use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::domain::SubscriberEmail;
use crate::subscribers;

/// Web form data
#[derive(serde::Deserialize)]
pub struct FormData {
    email: String,
}

/// Query parameters of an unsubscribe link
#[derive(serde::Deserialize)]
pub struct Parameters {
    email: String,
}

/// Subscribe handler
#[tracing::instrument(name = "Subscribe", skip(form, db_pool), fields(subscriber_email = %form.email))]
pub async fn subscribe(form: web::Form<FormData>, db_pool: web::Data<PgPool>) -> HttpResponse {
    let Ok(email) = SubscriberEmail::parse(form.0.email) else {
        return HttpResponse::BadRequest().finish();
    };

    if subscribers::add(&email, &db_pool).await {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::Conflict().finish()
    }
}

/// Unsubscribe handler, reached from the link in every newsletter footer
#[tracing::instrument(name = "Unsubscribe", skip(parameters, db_pool), fields(subscriber_email = %parameters.email))]
pub async fn unsubscribe(
    parameters: web::Query<Parameters>,
    db_pool: web::Data<PgPool>,
) -> HttpResponse {
    let email = parameters.email.trim();
    if !subscribers::remove(email, &db_pool).await {
        return HttpResponse::NotFound().finish();
    }

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("unsubscribed.html"),
            htmlescape::encode_minimal(email)
        ))
}
