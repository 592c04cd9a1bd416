use std::fmt;

use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use secrecy::SecretBox;
use sqlx::PgPool;

use crate::authentication::{authenticate, AuthError, Credentials};
use crate::routes::helpers::error_chain_fmt;
use crate::session_state::TypedSession;
use crate::utils::see_other;

/// Web form data
#[derive(serde::Deserialize)]
pub struct FormData {
    username: String,
    password: SecretBox<String>,
}

/// Login error type
#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Invalid username or password")]
    AuthError(#[source] anyhow::Error),
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Login POST handler
#[allow(clippy::future_not_send)]
#[tracing::instrument(
    skip(form, db_pool, session),
    fields(username=tracing::field::Empty, admin_id=tracing::field::Empty)
)]
pub async fn login(
    form: web::Form<FormData>,
    db_pool: web::Data<PgPool>,
    session: TypedSession,
) -> Result<HttpResponse, InternalError<LoginError>> {
    // Extract authentication credentials
    let FormData { username, password } = form.0;
    let creds = Credentials { username, password };

    // Validate authentication credentials
    tracing::Span::current().record("username", tracing::field::display(&creds.username));
    match authenticate(creds, &db_pool).await {
        // Valid credentials: rotate the session id and store the principal
        Ok(admin) => {
            tracing::Span::current().record("admin_id", admin.id);
            session.renew();
            session
                .insert_username(&admin.username)
                .map_err(|e| login_redirect(LoginError::UnexpectedError(e.into())))?;
            FlashMessage::success("Logged in successfully").send();
            Ok(see_other("/"))
        }

        // Invalid credentials or unreachable credential store
        Err(err) => {
            let err = match err {
                AuthError::InvalidCredentials(_) => LoginError::AuthError(err.into()),
                AuthError::UnexpectedError(_) => LoginError::UnexpectedError(err.into()),
            };
            Err(login_redirect(err))
        }
    }
}

/// Redirect back to the login form with the error in a flash message
fn login_redirect(err: LoginError) -> InternalError<LoginError> {
    FlashMessage::error(err.to_string()).send();
    InternalError::from_response(err, see_other("/login"))
}
