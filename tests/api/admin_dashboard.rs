use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use newsletter_admin::domain::SubscriberEmail;
use newsletter_admin::subscribers;

use crate::helpers::{assert_is_redirect_to, init_test_db_pool, TestApp};

#[sqlx::test]
async fn you_must_be_logged_in_to_access_the_admin_dashboard(
    _pool_opts: PgPoolOptions,
    conn_opts: PgConnectOptions,
) {
    let db_pool = init_test_db_pool(conn_opts).await;
    let app = TestApp::spawn(&db_pool).await;

    let response = app.get("/").await;

    assert_is_redirect_to(&response, "/login");
}

#[sqlx::test]
async fn dashboard_lists_subscribers_in_insertion_order(
    _pool_opts: PgPoolOptions,
    conn_opts: PgConnectOptions,
) {
    let db_pool = init_test_db_pool(conn_opts).await;
    let app = TestApp::spawn(&db_pool).await;
    for email in ["b@example.com", "a@example.com"] {
        let email = SubscriberEmail::parse(email.to_string()).unwrap();
        assert!(subscribers::add(&email, &db_pool).await);
    }

    app.login().await;
    let html = app.get_html("/").await;

    assert!(html.contains("Subscribers (2)"));
    let b = html.find("<li>b@example.com</li>").unwrap();
    let a = html.find("<li>a@example.com</li>").unwrap();
    assert!(b < a);
    assert!(html.contains(r#"<a href="/send_update">"#));
    assert!(html.contains(r#"<a href="/logout">"#));
}

#[sqlx::test]
async fn dashboard_escapes_subscriber_emails(
    _pool_opts: PgPoolOptions,
    conn_opts: PgConnectOptions,
) {
    let db_pool = init_test_db_pool(conn_opts).await;
    let app = TestApp::spawn(&db_pool).await;

    // Bypass syntax validation to plant markup in the store
    sqlx::query("INSERT INTO subscribers (email) VALUES ('<b>x</b>@example.com')")
        .execute(&db_pool)
        .await
        .unwrap();

    app.login().await;
    let html = app.get_html("/").await;

    assert!(html.contains("&lt;b&gt;x&lt;/b&gt;@example.com"));
    assert!(!html.contains("<b>x</b>"));
}
