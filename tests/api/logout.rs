use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::helpers::{assert_is_redirect_to, init_test_db_pool, TestApp};

#[sqlx::test]
async fn logout_clears_session_state(_pool_opts: PgPoolOptions, conn_opts: PgConnectOptions) {
    let db_pool = init_test_db_pool(conn_opts).await;
    let app = TestApp::spawn(&db_pool).await;

    // Login and reach the dashboard
    app.login().await;
    let response = app.get("/").await;
    assert_eq!(response.status().as_u16(), 200);

    // Logout
    let response = app.get("/logout").await;
    assert_is_redirect_to(&response, "/login");

    let html = app.get_html("/login").await;
    assert!(html.contains("<p><i>Logged out successfully</i></p>"));

    // The dashboard is no longer reachable
    let response = app.get("/").await;
    assert_is_redirect_to(&response, "/login");
}

#[sqlx::test]
async fn logout_without_a_session_still_redirects_to_login(
    _pool_opts: PgPoolOptions,
    conn_opts: PgConnectOptions,
) {
    let db_pool = init_test_db_pool(conn_opts).await;
    let app = TestApp::spawn(&db_pool).await;

    let response = app.get("/logout").await;
    assert_is_redirect_to(&response, "/login");
}
