use actix_web::HttpResponse;
use actix_web_flash_messages::FlashMessage;

use crate::session_state::TypedSession;
use crate::utils::see_other;

/// Logout handler
#[allow(clippy::future_not_send)]
pub async fn logout(session: TypedSession) -> HttpResponse {
    // Purge the session, even if it was never authenticated, and go back to the login form
    session.logout();
    FlashMessage::info("Logged out successfully").send();
    see_other("/login")
}
