mod credentials;
mod middleware;

pub use credentials::{
    authenticate, compute_password_hash, ensure_default_admin, get_admin, Admin, AuthError,
    Credentials,
};
pub use middleware::{reject_logged_out_users, AdminName};
