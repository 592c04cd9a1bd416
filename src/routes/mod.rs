mod admin;
mod health_check;
mod helpers;
mod login;
mod subscriptions;

pub use admin::*;
pub use health_check::*;
pub use login::*;
pub use subscriptions::*;
