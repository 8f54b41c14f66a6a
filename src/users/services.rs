use tracing::{info, instrument, warn};

use super::password::{hash_password, verify_against_dummy, verify_password};
use super::repo_types::{DuplicateEmail, NewUser, User, UserFilter};
use crate::error::AppError;
use crate::state::AppState;

fn email_taken() -> AppError {
    AppError::Conflict("User exists already, please login instead.".into())
}

#[instrument(skip(st))]
pub async fn list_users(st: &AppState) -> Result<Vec<User>, AppError> {
    st.users
        .find(UserFilter::All)
        .await
        .map_err(|e| AppError::persistence("Fetching users failed, please try again later.", e))
}

/// Registers a user with an empty place list. Emails compare exactly.
#[instrument(skip(st, password))]
pub async fn signup(
    st: &AppState,
    name: String,
    email: String,
    password: &str,
) -> Result<User, AppError> {
    let existing = st
        .users
        .find_one(UserFilter::Email(email.clone()))
        .await
        .map_err(|e| AppError::persistence("Signing up failed, please try again later.", e))?;
    if existing.is_some() {
        warn!(%email, "email already registered");
        return Err(email_taken());
    }

    let password_hash = hash_password(password)
        .await
        .map_err(|e| AppError::persistence("Signing up failed, please try again later.", e))?;

    let user = st
        .users
        .create(NewUser {
            name,
            email,
            image: st.config.default_image_url.clone(),
            password_hash,
        })
        .await
        .map_err(|e| {
            // lost a race with a concurrent signup for the same address
            if e.downcast_ref::<DuplicateEmail>().is_some() {
                email_taken()
            } else {
                AppError::persistence("Signing up failed, please try again later.", e)
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Unknown email and wrong password fail identically.
#[instrument(skip(st, password))]
pub async fn login(st: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let user = st
        .users
        .find_one(UserFilter::Email(email.to_string()))
        .await
        .map_err(|e| AppError::persistence("Logging in failed, please try again later.", e))?;

    let Some(user) = user else {
        verify_against_dummy(password).await;
        warn!(%email, "login unknown email");
        return Err(AppError::invalid_credentials());
    };

    let ok = verify_password(password, &user.password_hash)
        .await
        .map_err(|e| AppError::persistence("Logging in failed, please try again later.", e))?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::invalid_credentials());
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signup_creates_user_with_no_places() {
        let fake = AppState::fake();
        let user = signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap();
        assert!(user.places.is_empty());
        assert_eq!(user.image, fake.state.config.default_image_url);
        assert_ne!(user.password_hash, "secret1");
        assert_eq!(list_users(&fake.state).await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn signup_with_existing_email_conflicts_and_creates_nothing() {
        let fake = AppState::fake();
        signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap();

        let err = signup(&fake.state, "Other".into(), "ada@example.com".into(), "secret2")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(fake.users.len().await, 1);
    }

    #[tokio::test]
    async fn signup_store_failure_is_persistence() {
        let fake = AppState::fake();
        fake.users.fail_creates(true);
        let err = signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[tokio::test]
    async fn login_accepts_correct_password() {
        let fake = AppState::fake();
        let user = signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap();
        let logged = login(&fake.state, "ada@example.com", "secret1").await.unwrap();
        assert_eq!(logged.id, user.id);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let fake = AppState::fake();
        signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap();

        let unknown = login(&fake.state, "nobody@example.com", "secret1")
            .await
            .unwrap_err();
        let wrong = login(&fake.state, "ada@example.com", "secret2")
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::Auth(_)));
        assert!(matches!(wrong, AppError::Auth(_)));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status(), wrong.status());
    }

    #[tokio::test]
    async fn login_yields_while_checking_passwords() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let fake = AppState::fake();
        signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap();

        // on a single-threaded runtime the sibling future only runs if login awaits argon2
        for email in ["nobody@example.com", "ada@example.com"] {
            let other_ran = AtomicBool::new(false);
            let (res, ()) = tokio::join!(
                async {
                    let res = login(&fake.state, email, "wrong-pass").await;
                    (res, other_ran.load(Ordering::SeqCst))
                },
                async { other_ran.store(true, Ordering::SeqCst) },
            );
            let (res, ran_first) = res;
            assert!(matches!(res, Err(AppError::Auth(_))));
            assert!(ran_first, "login blocked the runtime for {}", email);
        }
    }

    #[tokio::test]
    async fn login_with_corrupt_stored_hash_is_persistence() {
        let fake = AppState::fake();
        let mut user = signup(&fake.state, "Ada".into(), "ada@example.com".into(), "secret1")
            .await
            .unwrap();
        user.password_hash = "not-a-hash".into();
        fake.state.users.save(&user).await.unwrap();

        let err = login(&fake.state, "ada@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }
}
