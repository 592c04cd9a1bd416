use std::future::{ready, Ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

/// Session type, holding at most one authenticated principal (the admin username)
pub struct TypedSession(Session);

impl FromRequest for TypedSession {
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}

impl TypedSession {
    const USERNAME_KEY: &'static str = "username";

    /// Renew the session key
    pub fn renew(&self) {
        self.0.renew();
    }

    /// Mark the session as authenticated by `username`
    pub fn insert_username(&self, username: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::USERNAME_KEY, username)
    }

    /// Get the authenticated principal, if any
    pub fn get_username(&self) -> Result<Option<String>, SessionGetError> {
        self.0.get(Self::USERNAME_KEY)
    }

    /// Whether the session carries an authenticated principal
    pub fn is_authenticated(&self) -> Result<bool, SessionGetError> {
        Ok(self.get_username()?.is_some())
    }

    /// Purge session data to logout
    pub fn logout(self) {
        self.0.purge();
    }
}
