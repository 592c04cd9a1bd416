use std::{env, io, sync};

use fake::faker::internet::en::{Password, SafeEmail, Username};
use fake::Fake;
use fdlimit::raise_fd_limit;
use reqwest::Url;
use secrecy::SecretString;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use newsletter_admin::configuration::Settings;
use newsletter_admin::mailer::SmtpSecurity;
use newsletter_admin::startup::Application;
use newsletter_admin::telemetry::{get_subscriber, init_subscriber};

/// Ensure the tracing stack is initialized only once
static TRACING: sync::LazyLock<()> = sync::LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::sink,
        ));
    };
});

/// Test application data
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db_pool: PgPool,
    pub config: Settings,
    pub test_admin: TestAdmin,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spin up a test application and return its data
    pub async fn spawn(db_pool: &PgPool) -> Self {
        // Initialize logging
        sync::LazyLock::force(&TRACING);

        // Raise file descriptors limit to avoid "Too many open files" error
        raise_fd_limit().expect("Failed to raise fd limit");

        // Generate the admin account that the application seeds at startup
        let test_admin = TestAdmin::generate();

        // Get settings and modify them for testing
        let config = {
            let mut c = Settings::get_config().expect("Failed to read configuration");
            // Listen on a random TCP port
            c.application.app_port = 0;
            // Point the mailer at a closed local port, so that every send fails fast
            c.smtp.host = "127.0.0.1".into();
            c.smtp.port = 1;
            c.smtp.security = SmtpSecurity::None;
            c.smtp.timeout_secs = 1;
            // Seed the generated admin account
            c.admin.username.clone_from(&test_admin.username);
            c.admin.password = SecretString::from(test_admin.password.clone());
            c
        };

        // Build the application and get its address
        let app = Application::build_with_db_pool(config.clone(), db_pool)
            .await
            .expect("Failed to build application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{port}");

        // Build the API client
        let api_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .unwrap();

        // Run the application and return its data
        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run_until_stopped());
        Self {
            address,
            port,
            db_pool: db_pool.clone(),
            config,
            test_admin,
            api_client,
        }
    }

    /// GET a path on the test application
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{path}", &self.address))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET a path on the test application, extract HTML
    pub async fn get_html(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    /// POST to the login endpoint
    #[allow(clippy::future_not_send)]
    pub async fn post_login<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/login", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Login as the seeded admin
    pub async fn login(&self) {
        let response = self
            .post_login(&serde_json::json!({
                "username": &self.test_admin.username,
                "password": &self.test_admin.password,
            }))
            .await;
        assert_is_redirect_to(&response, "/");
    }

    /// POST to the send update endpoint
    #[allow(clippy::future_not_send)]
    pub async fn post_send_update<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/send_update", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// POST to the subscribe endpoint
    pub async fn post_subscribe(&self, body: String) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscribe", &self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Rewrite a link generated with the configured base URL so that it reaches the test application
    pub fn local_link(&self, link: &Url) -> Url {
        let mut link = link.clone();
        assert_eq!(link.host_str().unwrap(), "127.0.0.1");
        link.set_port(Some(self.port)).unwrap();
        link
    }

    /// Count the recorded newsletters
    pub async fn newsletter_count(&self) -> i64 {
        newsletter_count(&self.db_pool).await
    }
}

/// Test admin data
pub struct TestAdmin {
    pub username: String,
    pub password: String,
}

impl TestAdmin {
    /// Generate new test authentication credentials
    pub fn generate() -> Self {
        Self {
            username: fake_username(),
            password: fake_password(),
        }
    }
}

/// Initialize test database pool
pub async fn init_test_db_pool(conn_opts: PgConnectOptions) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(conn_opts)
}

/// Count the recorded newsletters
pub async fn newsletter_count(db_pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM newsletters")
        .fetch_one(db_pool)
        .await
        .expect("Failed to count newsletters")
}

/// Assert: response is a redirect to the specified location
pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}

/// Generate a fake username
pub fn fake_username() -> String {
    Username().fake()
}

/// Generate a fake password
pub fn fake_password() -> String {
    Password(32..33).fake()
}

/// Generate a fake subscriber email
pub fn fake_email() -> String {
    SafeEmail().fake()
}
