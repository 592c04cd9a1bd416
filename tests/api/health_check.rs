use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::helpers::{init_test_db_pool, TestApp};

#[sqlx::test]
async fn health_check_works(_pool_opts: PgPoolOptions, conn_opts: PgConnectOptions) {
    let db_pool = init_test_db_pool(conn_opts).await;
    let app = TestApp::spawn(&db_pool).await;

    let response = app.get("/health_check").await;

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}
