//! Auth service
//!
//! Registration, password login and federated login, all issuing the
//! same bearer token. Login failures deliberately share one generic
//! message so callers cannot distinguish an unknown email from a wrong
//! password.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;

use super::account::{AccountService, Profile};
use crate::auth::{decode_unverified_claims, issue_token};
use crate::config::AppConfig;
use crate::data::{Account, Database, EntityId};
use crate::error::AppError;

/// Avatar seeded for accounts that have not uploaded one
const DEFAULT_AVATAR_URL: &str = "https://via.placeholder.com/150";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Outcome of an authentication operation
///
/// Business failures surface as `succeeded: false` with a message,
/// never as an error.
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Profile>,
    pub message: String,
}

impl AuthOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            token: None,
            user: None,
            message: message.into(),
        }
    }

    fn success(token: String, user: Profile, message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            token: Some(token),
            user: Some(user),
            message: message.into(),
        }
    }
}

/// Auth service
pub struct AuthService {
    db: Arc<Database>,
    config: Arc<AppConfig>,
}

impl AuthService {
    /// Create new auth service
    pub fn new(db: Arc<Database>, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new account and issue a bearer token.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthOutcome, AppError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Ok(AuthOutcome::failure(
                "Username, email and password are required",
            ));
        }

        let accounts = self.db.accounts();
        if accounts.get_by_email(email).await?.is_some() {
            return Ok(AuthOutcome::failure("User with this email already exists"));
        }
        if accounts.get_by_username(username).await?.is_some() {
            return Ok(AuthOutcome::failure("Username is already taken"));
        }

        let password_hash = hash_password(password.to_string()).await?;

        let now = Utc::now();
        let account = Account {
            id: EntityId::new().0,
            username: username.to_string(),
            email: email.to_string(),
            display_name: if display_name.trim().is_empty() {
                username.to_string()
            } else {
                display_name.trim().to_string()
            },
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let mut uow = self.db.unit_of_work().await?;
        uow.insert_account(&account).await?;
        uow.commit().await?;

        tracing::info!(username = %account.username, "Account registered");

        self.issue_outcome(&account, "User registered successfully")
            .await
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AppError> {
        let Some(account) = self.db.accounts().get_by_email(email.trim()).await? else {
            return Ok(AuthOutcome::failure(INVALID_CREDENTIALS));
        };

        let valid = verify_password(password.to_string(), account.password_hash.clone()).await?;
        if !valid {
            return Ok(AuthOutcome::failure(INVALID_CREDENTIALS));
        }

        self.issue_outcome(&account, "Login successful").await
    }

    /// Authenticate with an external identity token.
    ///
    /// The token's claims are decoded without re-verifying its signature
    /// against the issuer; transport-level validation is trusted. An
    /// account is auto-provisioned on first sight of a new email.
    pub async fn federated_login(&self, id_token: &str) -> Result<AuthOutcome, AppError> {
        if id_token.is_empty() {
            return Ok(AuthOutcome::failure("Identity token is required"));
        }

        let claims = match decode_unverified_claims(id_token) {
            Ok(claims) => claims,
            Err(_) => return Ok(AuthOutcome::failure("Invalid identity token")),
        };

        let Some(email) = claims.email.filter(|email| !email.is_empty()) else {
            return Ok(AuthOutcome::failure(
                "Invalid identity token: email claim not found",
            ));
        };

        let local_part = email.split('@').next().unwrap_or_default().to_string();
        let name = claims.name.filter(|name| !name.is_empty());

        let account = match self.db.accounts().get_by_email(&email).await? {
            Some(existing) => existing,
            None => {
                self.provision_account(&email, &local_part, name.as_deref().unwrap_or(&local_part))
                    .await?
            }
        };

        self.issue_outcome(&account, "Federated login successful")
            .await
    }

    /// Create an account for a first-time federated login.
    ///
    /// A colliding handle is disambiguated with a short random suffix.
    async fn provision_account(
        &self,
        email: &str,
        preferred_username: &str,
        display_name: &str,
    ) -> Result<Account, AppError> {
        let accounts = self.db.accounts();
        let username = if accounts.get_by_username(preferred_username).await?.is_none() {
            preferred_username.to_string()
        } else {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(6)
                .map(char::from)
                .collect();
            format!("{preferred_username}{}", suffix.to_lowercase())
        };

        let now = Utc::now();
        let account = Account {
            id: EntityId::new().0,
            username,
            email: email.to_string(),
            display_name: display_name.to_string(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            // No local credential; password login stays impossible
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        };

        let mut uow = self.db.unit_of_work().await?;
        uow.insert_account(&account).await?;
        uow.commit().await?;

        tracing::info!(username = %account.username, "Account provisioned via federated login");

        Ok(account)
    }

    async fn issue_outcome(
        &self,
        account: &Account,
        message: &str,
    ) -> Result<AuthOutcome, AppError> {
        let token = issue_token(account, &self.config.auth)?;
        let profile = AccountService::new(self.db.clone())
            .get_profile(&account.id, Some(&account.id))
            .await?;

        Ok(AuthOutcome::success(token, profile, message))
    }
}

/// Hash a password on the blocking pool; argon2 is CPU-bound.
async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || -> Result<String, anyhow::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
    .map_err(AppError::Internal)
}

/// Verify a password against a stored PHC string.
///
/// An empty or malformed stored hash (federated accounts) verifies false.
async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig};
    use crate::auth::verify_token;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use tempfile::TempDir;

    fn test_config(db_path: std::path::PathBuf) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_allowed_origin: None,
            },
            database: DatabaseConfig { path: db_path },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes!!".to_string(),
                issuer: "PeerLens".to_string(),
                audience: "PeerLensClient".to_string(),
                token_ttl_days: 7,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        })
    }

    async fn create_test_service() -> (AuthService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-auth.db");
        let db = Arc::new(Database::connect(&db_path).await.unwrap());
        let config = test_config(db_path);
        (AuthService::new(db.clone(), config), db, temp_dir)
    }

    fn external_token(claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"external-issuer-key"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn register_issues_verifiable_token() {
        let (service, db, _temp_dir) = create_test_service().await;

        let outcome = service
            .register("alice", "alice@example.com", "s3cret-password", "Alice")
            .await
            .unwrap();
        assert!(outcome.succeeded);

        let token = outcome.token.unwrap();
        let claims = verify_token(&token, &service.config.auth).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");

        let user = outcome.user.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.avatar_url, DEFAULT_AVATAR_URL);

        // Password is stored hashed, never verbatim
        let stored = db
            .accounts()
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn register_refuses_duplicate_email_without_new_row() {
        let (service, db, _temp_dir) = create_test_service().await;

        let first = service
            .register("alice", "alice@example.com", "s3cret-password", "Alice")
            .await
            .unwrap();
        assert!(first.succeeded);

        let second = service
            .register("alice2", "alice@example.com", "other-password", "Alice 2")
            .await
            .unwrap();
        assert!(!second.succeeded);
        assert_eq!(second.message, "User with this email already exists");

        // No second account row was created
        assert!(db.accounts().get_by_username("alice2").await.unwrap().is_none());
        let existing = db
            .accounts()
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(existing.username, "alice");
    }

    #[tokio::test]
    async fn register_refuses_taken_username_and_empty_fields() {
        let (service, _db, _temp_dir) = create_test_service().await;

        assert!(service
            .register("alice", "alice@example.com", "s3cret-password", "")
            .await
            .unwrap()
            .succeeded);

        let taken = service
            .register("alice", "other@example.com", "s3cret-password", "")
            .await
            .unwrap();
        assert!(!taken.succeeded);
        assert_eq!(taken.message, "Username is already taken");

        let empty = service.register("", "", "", "").await.unwrap();
        assert!(!empty.succeeded);
    }

    #[tokio::test]
    async fn login_uses_one_generic_failure_message() {
        let (service, _db, _temp_dir) = create_test_service().await;

        service
            .register("alice", "alice@example.com", "s3cret-password", "Alice")
            .await
            .unwrap();

        let ok = service.login("alice@example.com", "s3cret-password").await.unwrap();
        assert!(ok.succeeded);
        assert!(ok.token.is_some());

        let wrong_password = service
            .login("alice@example.com", "not-the-password")
            .await
            .unwrap();
        let unknown_email = service
            .login("nobody@example.com", "s3cret-password")
            .await
            .unwrap();

        assert!(!wrong_password.succeeded);
        assert!(!unknown_email.succeeded);
        // Identical messages: no account enumeration through the error text
        assert_eq!(wrong_password.message, unknown_email.message);
    }

    #[tokio::test]
    async fn federated_login_provisions_once_and_reuses() {
        let (service, db, _temp_dir) = create_test_service().await;

        let token = external_token(serde_json::json!({
            "email": "carol@example.com",
            "name": "Carol",
        }));

        let first = service.federated_login(&token).await.unwrap();
        assert!(first.succeeded);
        let user = first.user.unwrap();
        assert_eq!(user.username, "carol");
        assert_eq!(user.display_name, "Carol");

        // Provisioned accounts carry no local credential
        let account = db
            .accounts()
            .get_by_email("carol@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(account.password_hash.is_empty());
        let login = service.login("carol@example.com", "anything").await.unwrap();
        assert!(!login.succeeded);

        // A second federated login reuses the same account
        let second = service.federated_login(&token).await.unwrap();
        assert!(second.succeeded);
        assert_eq!(second.user.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn federated_login_disambiguates_colliding_handle() {
        let (service, _db, _temp_dir) = create_test_service().await;

        service
            .register("dave", "dave@example.com", "s3cret-password", "Dave")
            .await
            .unwrap();

        let token = external_token(serde_json::json!({
            "email": "dave@elsewhere.example.com",
            "name": "Other Dave",
        }));

        let outcome = service.federated_login(&token).await.unwrap();
        assert!(outcome.succeeded);
        let user = outcome.user.unwrap();
        assert_ne!(user.username, "dave");
        assert!(user.username.starts_with("dave"));
        assert_eq!(user.username.len(), "dave".len() + 6);
    }

    #[tokio::test]
    async fn federated_login_requires_email_claim() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let token = external_token(serde_json::json!({ "name": "No Email" }));
        let outcome = service.federated_login(&token).await.unwrap();
        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("email claim"));

        let garbage = service.federated_login("not-a-jwt").await.unwrap();
        assert!(!garbage.succeeded);

        let empty = service.federated_login("").await.unwrap();
        assert!(!empty.succeeded);
    }
}
