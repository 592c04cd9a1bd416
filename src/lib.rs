pub mod authentication;
pub mod configuration;
pub mod dispatch;
pub mod domain;
pub mod mailer;
pub mod newsletter_log;
pub mod routes;
pub mod session_state;
pub mod startup;
pub mod subscribers;
pub mod telemetry;
pub mod utils;
