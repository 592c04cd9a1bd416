use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;
use sqlx::PgPool;

use crate::newsletter_log;
use crate::routes::helpers::flash_messages_html;

/// How many past newsletters are listed under the form
const RECENT_NEWSLETTERS: i64 = 10;

/// Send update form handler
pub async fn send_update_form(
    db_pool: web::Data<PgPool>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let msg_html = flash_messages_html(&flash_messages);

    let history_html = match newsletter_log::recent(RECENT_NEWSLETTERS, &db_pool).await {
        Ok(records) if records.is_empty() => "<p>No newsletters sent yet.</p>".to_string(),
        Ok(records) => {
            let items: String = records
                .iter()
                .map(|r| {
                    format!(
                        "        <li>{} - {}</li>\n",
                        r.sent_at.format("%Y-%m-%d %H:%M UTC"),
                        htmlescape::encode_minimal(&r.subject)
                    )
                })
                .collect();
            format!("<ul>\n{items}    </ul>")
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to load newsletter history");
            "<p>Newsletter history is unavailable.</p>".to_string()
        }
    };

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("send_update_form.html"),
            msg_html, history_html
        ))
}
