use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::user_store::UserStore;

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// A signed session token together with the account it belongs to
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct UserService<S: UserStore> {
    store: S,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<Session, AuthError> {
        let username = require_field(input.username.as_deref(), "username")?;
        let email = require_field(input.email.as_deref(), "email")?;
        let password = require_field(input.password.as_deref(), "password")?;

        if self.store.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let hash = auth::hash_password(password, &salt);

        let user = self.store.insert(username, email, &hash, &salt).await?;
        issue_session(user)
    }

    pub async fn login(&self, input: LoginInput) -> Result<Session, AuthError> {
        let username = require_field(input.username.as_deref(), "username")?;
        let password = require_field(input.password.as_deref(), "password")?;

        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_salt, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        issue_session(user)
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.store.find_by_id(user_id).await?)
    }
}

fn require_field<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, AuthError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::MissingField(name)),
    }
}

fn issue_session(user: User) -> Result<Session, AuthError> {
    let claims = Claims::new(user.id, user.username.clone());
    let token = auth::generate_jwt(claims).map_err(|e| AuthError::Token(e.to_string()))?;
    Ok(Session { user, token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryUserStore;
    use anyhow::Result;

    fn service() -> UserService<MemoryUserStore> {
        UserService::new(MemoryUserStore::new())
    }

    fn register_input(username: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: Some(username.to_string()),
            email: Some(format!("{}@example.com", username)),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn register_then_login() -> Result<()> {
        let service = service();

        let session = service.register(register_input("alice", "hunter2")).await?;
        assert_eq!(session.user.username, "alice");
        assert!(!session.token.is_empty());

        let login = service
            .login(LoginInput {
                username: Some("alice".to_string()),
                password: Some("hunter2".to_string()),
            })
            .await?;
        assert_eq!(login.user.id, session.user.id);

        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let service = service();

        let mut input = register_input("alice", "hunter2");
        input.email = None;
        assert!(matches!(
            service.register(input).await,
            Err(AuthError::MissingField("email"))
        ));

        let mut input = register_input("alice", "hunter2");
        input.password = Some(String::new());
        assert!(matches!(
            service.register(input).await,
            Err(AuthError::MissingField("password"))
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let service = service();
        service
            .register(register_input("alice", "hunter2"))
            .await
            .expect("register");

        assert!(matches!(
            service.register(register_input("alice", "other")).await,
            Err(AuthError::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let service = service();
        service
            .register(register_input("alice", "hunter2"))
            .await
            .expect("register");

        assert!(matches!(
            service
                .login(LoginInput {
                    username: Some("alice".to_string()),
                    password: Some("wrong".to_string()),
                })
                .await,
            Err(AuthError::InvalidCredentials)
        ));

        assert!(matches!(
            service
                .login(LoginInput {
                    username: Some("nobody".to_string()),
                    password: Some("hunter2".to_string()),
                })
                .await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
