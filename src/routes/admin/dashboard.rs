use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;
use sqlx::PgPool;

use crate::authentication::AdminName;
use crate::routes::helpers::flash_messages_html;
use crate::subscribers;

/// Admin dashboard handler
pub async fn dashboard(
    db_pool: web::Data<PgPool>,
    admin: web::ReqData<AdminName>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let msg_html = flash_messages_html(&flash_messages);

    // An unreachable store shows up as an empty list
    let emails = subscribers::list_emails(&db_pool).await;
    let list_html: String = emails
        .iter()
        .map(|e| format!("        <li>{}</li>\n", htmlescape::encode_minimal(e)))
        .collect();

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("dashboard.html"),
            msg_html,
            htmlescape::encode_minimal(&admin),
            emails.len(),
            list_html
        ))
}
