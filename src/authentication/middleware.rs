use std::fmt;
use std::ops::Deref;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::middleware::Next;
use actix_web::{FromRequest, HttpMessage};

use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

/// Username of the logged-in admin, available to handlers behind [`reject_logged_out_users`]
#[derive(Clone, Debug)]
pub struct AdminName(String);

impl fmt::Display for AdminName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for AdminName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Redirect users that are not logged in to the login form
#[allow(clippy::future_not_send)]
pub async fn reject_logged_out_users(
    mut req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> actix_web::Result<ServiceResponse<impl MessageBody>> {
    // Retrieve session
    let session = {
        let (http_request, payload) = req.parts_mut();
        TypedSession::from_request(http_request, payload).await
    }?;

    // Check if the session state contains an authenticated principal
    if let Some(username) = session.get_username().map_err(err500)? {
        req.extensions_mut().insert(AdminName(username));
        next.call(req).await
    } else {
        let response = see_other("/login");
        let e = anyhow::anyhow!("The user is not logged in");
        Err(InternalError::from_response(e, response).into())
    }
}
