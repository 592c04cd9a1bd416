use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, SecretBox};
use sqlx::PgPool;

use crate::telemetry::spawn_blocking_with_tracing;

/// Fallback hash in case an invalid username is provided during authentication
const FALLBACK_HASH: &str =
    "$argon2id$v=19$m=15000,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Authentication credentials data
pub struct Credentials {
    pub username: String,
    pub password: SecretBox<String>,
}

/// Admin account as stored in the credential store
#[derive(Debug)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    pub password_hash: SecretBox<String>,
}

/// Authentication error type
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

/// Validate provided authentication credentials and return the matching admin if they are valid
#[tracing::instrument(name = "Authenticate admin", skip(creds, db_pool))]
pub async fn authenticate(creds: Credentials, db_pool: &PgPool) -> Result<Admin, AuthError> {
    // Verify against a fallback hash for unknown usernames to prevent timing attacks
    let admin = get_admin(&creds.username, db_pool).await?;
    let expected_password_hash = admin.as_ref().map_or_else(
        || SecretBox::new(Box::new(FALLBACK_HASH.to_string())),
        |a| SecretBox::new(Box::new(a.password_hash.expose_secret().clone())),
    );

    spawn_blocking_with_tracing(move || {
        verify_password_hash(&expected_password_hash, &creds.password)
    })
    .await
    .context("Failed to spawn blocking task")??;

    admin.ok_or_else(|| AuthError::InvalidCredentials(anyhow::anyhow!("Unknown username")))
}

/// Look up an admin by username
#[tracing::instrument(name = "Get admin", skip(db_pool))]
pub async fn get_admin(username: &str, db_pool: &PgPool) -> anyhow::Result<Option<Admin>> {
    let row = sqlx::query_as::<_, (i32, String, String)>(
        r"
        SELECT id, username, password_hash
        FROM admin_users
        WHERE username = $1
        ",
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await
    .context("Failed to perform a query to retrieve admin credentials")?
    .map(|(id, username, password_hash)| Admin {
        id,
        username,
        password_hash: SecretBox::new(Box::new(password_hash)),
    });

    Ok(row)
}

/// Create the admin account unless one with the same username already exists.
/// Returns whether a new row was inserted.
#[tracing::instrument(name = "Ensure default admin", skip(password, db_pool))]
pub async fn ensure_default_admin(
    username: &str,
    password: SecretBox<String>,
    db_pool: &PgPool,
) -> anyhow::Result<bool> {
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(&password))
        .await?
        .context("Failed to hash password")?;

    let result = sqlx::query(
        r"
        INSERT INTO admin_users (username, password_hash)
        VALUES ($1, $2)
        ON CONFLICT (username) DO NOTHING
        ",
    )
    .bind(username)
    .bind(password_hash.expose_secret())
    .execute(db_pool)
    .await
    .context("Failed to create default admin")?;

    let created = result.rows_affected() > 0;
    if created {
        tracing::info!("Default admin created");
    } else {
        tracing::info!("Default admin already exists");
    }
    Ok(created)
}

/// Compare a candidate password against a stored PHC password hash
#[tracing::instrument(name = "Verify password hash", skip(password_hash, password))]
fn verify_password_hash(
    password_hash: &SecretBox<String>,
    password: &SecretBox<String>,
) -> Result<(), AuthError> {
    let password_hash =
        PasswordHash::new(password_hash.expose_secret()).context("Invalid stored password hash")?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .context("Invalid password")
        .map_err(AuthError::InvalidCredentials)
}

/// Compute an Argon2id PHC string for the provided password, with a random salt
pub fn compute_password_hash(password: &SecretBox<String>) -> anyhow::Result<SecretBox<String>> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let params = Params::new(15000, 2, 1, None)?;
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)?
        .to_string();

    Ok(SecretBox::new(Box::new(password_hash)))
}
