use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    // checked on logins for unknown emails so both failures cost one argon2 run
    static ref DUMMY_HASH: String = hash_sync("placeshare-no-such-user").unwrap_or_default();
}

fn hash_sync(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn verify_sync(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Argon2 hash, computed on the blocking pool.
pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_string();
    tokio::task::spawn_blocking(move || hash_sync(&plain)).await?
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub async fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let plain = plain.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || verify_sync(&plain, &hash)).await?
}

/// Runs a verification that always fails, for callers with no user to check.
pub async fn verify_against_dummy(plain: &str) {
    let plain = plain.to_string();
    let _ = tokio::task::spawn_blocking(move || verify_sync(&plain, DUMMY_HASH.as_str())).await;
}
