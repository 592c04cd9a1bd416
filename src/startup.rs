use std::{io, net, time};

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use anyhow::Context;
use secrecy::{ExposeSecret, SecretBox, SecretString};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::authentication::{ensure_default_admin, reject_logged_out_users};
use crate::configuration::Settings;
use crate::mailer::SmtpMailer;
use crate::routes::{
    dashboard, health_check, login, login_form, logout, send_update, send_update_form, subscribe,
    unsubscribe,
};

/// Minimum length of the secret used to sign session and flash message cookies
const SESSION_KEY_MIN_LEN: usize = 64;

/// Application
pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    /// Build an application based on settings
    pub async fn build(config: Settings) -> anyhow::Result<Self> {
        // Connect to the database
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(time::Duration::from_secs(2))
            .connect_lazy_with(config.database.db_options());

        // Run the HTTP server and return its data
        Self::build_with_db_pool(config, &db_pool).await
    }

    /// Build an application based on settings and database pool
    pub async fn build_with_db_pool(config: Settings, db_pool: &PgPool) -> anyhow::Result<Self> {
        // Create the schema if needed
        sqlx::migrate!("./migrations")
            .run(db_pool)
            .await
            .context("Failed to run database migrations")?;

        // Seed the admin account, a failure here must not prevent the server from starting
        let admin_password = SecretBox::new(Box::new(
            config.admin.password.expose_secret().to_string(),
        ));
        if let Err(e) = ensure_default_admin(&config.admin.username, admin_password, db_pool).await
        {
            tracing::error!(error.cause_chain = ?e, "Failed to create the default admin");
        }

        // Build the mailer
        let base_url = config
            .application
            .base_url()
            .context("Invalid application base URL")?;
        let mailer = config.smtp.mailer(base_url.clone())?;

        // Run the HTTP server and return its data
        let listener = net::TcpListener::bind(format!(
            "{}:{}",
            config.application.app_host, config.application.app_port
        ))?;
        let port = listener.local_addr()?.port();
        let server = run_server(
            listener,
            db_pool.clone(),
            mailer,
            &config.application.session_key,
            base_url.scheme() == "https",
        )?;
        Ok(Self { server, port })
    }

    /// Get application port
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Run application until it is stopped
    pub async fn run_until_stopped(self) -> io::Result<()> {
        self.server.await
    }
}

/// Run the HTTP server
pub fn run_server(
    listener: net::TcpListener,
    db_pool: PgPool,
    mailer: SmtpMailer,
    session_key: &SecretString,
    secure_cookies: bool,
) -> anyhow::Result<Server> {
    // Derive the cookie signing key from the configured secret
    let session_key = session_key.expose_secret().as_bytes();
    anyhow::ensure!(
        session_key.len() >= SESSION_KEY_MIN_LEN,
        "Session key must be at least {SESSION_KEY_MIN_LEN} bytes long"
    );
    let signing_key = Key::from(session_key);

    // Build message framework
    let message_store = CookieMessageStore::builder(signing_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    // Prepare data to be added the application context
    let db_pool = web::Data::new(db_pool);
    let mailer = web::Data::new(mailer);

    // Start the HTTP server
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), signing_key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .route("/login", web::get().to(login_form))
            .route("/login", web::post().to(login))
            .route("/logout", web::get().to(logout))
            .route("/health_check", web::get().to(health_check))
            .route("/subscribe", web::post().to(subscribe))
            .route("/unsubscribe", web::get().to(unsubscribe))
            .service(
                web::scope("")
                    .wrap(from_fn(reject_logged_out_users))
                    .route("/", web::get().to(dashboard))
                    .route("/send_update", web::get().to(send_update_form))
                    .route("/send_update", web::post().to(send_update)),
            )
            .app_data(db_pool.clone())
            .app_data(mailer.clone())
    })
    .listen(listener)?
    .run())
}
