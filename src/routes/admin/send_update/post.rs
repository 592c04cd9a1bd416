use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use sqlx::PgPool;

use crate::authentication::AdminName;
use crate::dispatch::broadcast;
use crate::mailer::SmtpMailer;
use crate::utils::see_other;

/// Web form data
#[derive(serde::Deserialize)]
pub struct FormData {
    subject: String,
    body: String,
}

/// Send update handler
#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Send an update to all subscribers",
    skip(form, db_pool, mailer, admin),
    fields(admin = %*admin)
)]
pub async fn send_update(
    form: web::Form<FormData>,
    db_pool: web::Data<PgPool>,
    mailer: web::Data<SmtpMailer>,
    admin: web::ReqData<AdminName>,
) -> HttpResponse {
    let FormData { subject, body } = form.0;

    // Nothing is sent or recorded for blank input
    if subject.trim().is_empty() || body.trim().is_empty() {
        FlashMessage::error("Subject and message cannot be empty").send();
        return see_other("/send_update");
    }

    let outcome = broadcast(&subject, &body, mailer.get_ref(), &db_pool).await;
    if outcome.is_success() {
        FlashMessage::info(outcome.to_string()).send();
    } else {
        FlashMessage::error(outcome.to_string()).send();
    }
    see_other("/send_update")
}
