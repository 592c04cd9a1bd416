use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use actix_web_flash_messages::IncomingFlashMessages;

use crate::routes::helpers::flash_messages_html;
use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

/// Login GET handler
#[allow(clippy::future_not_send)]
pub async fn login_form(
    session: TypedSession,
    flash_messages: IncomingFlashMessages,
) -> actix_web::Result<HttpResponse> {
    // Already logged in
    if session.is_authenticated().map_err(err500)? {
        return Ok(see_other("/"));
    }

    let msg_html = flash_messages_html(&flash_messages);
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(include_str!("login_form.html"), msg_html)))
}
