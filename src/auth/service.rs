// Authentication service - business logic layer

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};
use crate::auth::{
    error::AuthError,
    models::User,
    password::PasswordService,
    repository::{PasswordUpdate, UserStore},
    token::{ResetClaims, SessionClaims, SignedClaims, TokenService},
};
use crate::mail::{reset_email_body, Mailer};

/// How the reset link carries the token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetLinkStyle {
    /// `<frontend>/reset-password?token=<token>`
    Query,
    /// `<frontend>/reset-password/<token>`
    Path,
}

impl ResetLinkStyle {
    pub fn build(self, frontend_url: &str, token: &str) -> String {
        match self {
            ResetLinkStyle::Query => format!("{}/reset-password?token={}", frontend_url, token),
            ResetLinkStyle::Path => format!("{}/reset-password/{}", frontend_url, token),
        }
    }
}

/// Authentication service coordinating all auth operations
pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
    reset_token_ttl: Duration,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: PasswordService,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        frontend_url: String,
        reset_token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            passwords: Arc::new(passwords),
            tokens,
            mailer,
            frontend_url,
            reset_token_ttl,
        }
    }

    /// Register a new user. Does not log the user in.
    pub async fn signup(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, AuthError> {
        let (username, email, password) = match (username, email, password) {
            (Some(u), Some(e), Some(p)) => (u, e, p),
            _ => return Err(AuthError::InvalidInput("All fields are required".to_string())),
        };

        if self
            .users
            .find_by_username_or_email(Some(username), Some(email))
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict);
        }

        PasswordService::validate_password_strength(password)?;

        let password_hash = self.hash(password).await?;
        let user = self.users.create(username, email, &password_hash).await?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and issue a session token
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, AuthError> {
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) => (u, p),
            _ => {
                return Err(AuthError::InvalidInput(
                    "Username and password are required".to_string(),
                ))
            }
        };

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.verify(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.generate_session_token(user.id, &user.username)?;
        info!("User {} logged in", user.id);
        Ok(token)
    }

    /// Email a reset link to the account owning `email`
    pub async fn forgot_password(
        &self,
        email: Option<&str>,
        style: ResetLinkStyle,
    ) -> Result<(), AuthError> {
        let email = email.ok_or_else(|| AuthError::InvalidInput("Email is required".to_string()))?;

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = self.tokens.issue(
            ResetClaims {
                user_id: user.id,
                token_version: user.token_version,
            },
            self.reset_token_ttl,
        )?;

        let link = style.build(&self.frontend_url, &token);
        let body = reset_email_body(&link, self.reset_token_ttl.num_minutes());

        self.mailer
            .send(&user.email, "Reset Your Password - Filmatik", &body)
            .await
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        info!("Password reset link sent for user {}", user.id);
        Ok(())
    }

    /// Replace the password of the user named by a valid reset token
    pub async fn reset_password(
        &self,
        token: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<(), AuthError> {
        let (token, new_password) = match (token, new_password) {
            (Some(t), Some(p)) => (t, p),
            _ => {
                return Err(AuthError::InvalidInput(
                    "Token and new password are required".to_string(),
                ))
            }
        };

        let claims = self
            .tokens
            .verify::<ResetClaims>(token)
            .map_err(|_| AuthError::InvalidResetToken)?
            .claims;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.token_version != claims.token_version {
            warn!("Reused reset token for user {}", user.id);
            return Err(AuthError::InvalidResetToken);
        }

        PasswordService::validate_password_strength(new_password)?;

        let password_hash = self.hash(new_password).await?;
        match self
            .users
            .update_password(user.id, &password_hash, claims.token_version)
            .await?
        {
            PasswordUpdate::Updated => {
                info!("Password reset for user {}", user.id);
                Ok(())
            }
            PasswordUpdate::StaleVersion => {
                warn!("Concurrent reset lost the race for user {}", user.id);
                Err(AuthError::InvalidResetToken)
            }
        }
    }

    /// Decode a session token presented to a protected route
    pub fn authenticate(&self, token: &str) -> Result<SignedClaims<SessionClaims>, AuthError> {
        self.tokens.verify(token)
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_string();
        let hash = hash.to_string();
        let matches = tokio::task::spawn_blocking(move || passwords.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {}", e)))?;
        debug!("Password verification finished");
        Ok(matches)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::password::HashCost;
    use crate::auth::repository::MemoryUserStore;
    use crate::mail::MailError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Captures outgoing mail instead of sending it
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string(), html_body.to_string()));
            Ok(())
        }
    }

    /// Always fails, as an unreachable relay would
    pub(crate) struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> Result<(), MailError> {
            Err(MailError::Address(lettre::address::AddressError::MissingParts))
        }
    }

    /// Pull the token out of the first href in a reset email
    pub(crate) fn token_from_email(body: &str, style: ResetLinkStyle) -> String {
        let start = body.find("href=\"").unwrap() + "href=\"".len();
        let link = &body[start..];
        let link = &link[..link.find('"').unwrap()];
        match style {
            ResetLinkStyle::Query => link.split("token=").nth(1).unwrap().to_string(),
            ResetLinkStyle::Path => link.rsplit('/').next().unwrap().to_string(),
        }
    }

    pub(crate) const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

    fn test_service(mailer: Arc<dyn Mailer>) -> (AuthService, Arc<MemoryUserStore>) {
        let users = Arc::new(MemoryUserStore::new());
        let passwords = PasswordService::new(HashCost {
            memory_kib: 64,
            iterations: 1,
        })
        .unwrap();
        let service = AuthService::new(
            users.clone(),
            passwords,
            Arc::new(TokenService::new(TEST_SECRET)),
            mailer,
            "https://filmatik.app".to_string(),
            Duration::minutes(15),
        );
        (service, users)
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (service, users) = test_service(Arc::new(RecordingMailer::default()));

        let user = service
            .signup(Some("alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();
        let stored = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");

        let token = service.login(Some("alice"), Some("secret1")).await.unwrap();
        let claims = service.authenticate(&token).unwrap().claims;
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn test_signup_validation_order() {
        let (service, _) = test_service(Arc::new(RecordingMailer::default()));

        assert!(matches!(
            service.signup(Some("alice"), None, Some("secret1")).await,
            Err(AuthError::InvalidInput(_))
        ));

        service
            .signup(Some("alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();

        // Uniqueness is checked before password length
        assert!(matches!(
            service.signup(Some("alice"), Some("b@x.com"), Some("123")).await,
            Err(AuthError::Conflict)
        ));
        assert!(matches!(
            service.signup(Some("bob"), Some("b@x.com"), Some("123")).await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_signups_one_wins() {
        let (service, _) = test_service(Arc::new(RecordingMailer::default()));

        let (first, second) = tokio::join!(
            service.signup(Some("alice"), Some("a1@x.com"), Some("secret1")),
            service.signup(Some("alice"), Some("a2@x.com"), Some("secret1")),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|r| matches!(r, Err(AuthError::Conflict)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_login_distinguishes_unknown_user_and_bad_password() {
        let (service, _) = test_service(Arc::new(RecordingMailer::default()));
        service
            .signup(Some("alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();

        assert!(matches!(
            service.login(Some("bob"), Some("secret1")).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            service.login(Some("alice"), Some("wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login(Some("alice"), None).await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_flow_is_single_use() {
        let mailer = Arc::new(RecordingMailer::default());
        let (service, users) = test_service(mailer.clone());
        let user = service
            .signup(Some("alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();

        service
            .forgot_password(Some("a@x.com"), ResetLinkStyle::Path)
            .await
            .unwrap();

        let (to, _, body) = mailer.sent.lock().await[0].clone();
        assert_eq!(to, "a@x.com");
        assert!(body.contains("https://filmatik.app/reset-password/"));
        let token = token_from_email(&body, ResetLinkStyle::Path);

        service
            .reset_password(Some(&token), Some("newpass1"))
            .await
            .unwrap();
        assert!(service.login(Some("alice"), Some("newpass1")).await.is_ok());

        // Replay is rejected and leaves the new password in place
        assert!(matches!(
            service.reset_password(Some(&token), Some("hijack1")).await,
            Err(AuthError::InvalidResetToken)
        ));
        assert!(service.login(Some("alice"), Some("newpass1")).await.is_ok());
        assert_eq!(users.find_by_id(user.id).await.unwrap().unwrap().token_version, 1);
    }

    #[tokio::test]
    async fn test_invalid_reset_token_does_not_mutate() {
        let (service, users) = test_service(Arc::new(RecordingMailer::default()));
        let user = service
            .signup(Some("alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();
        let before = users.find_by_id(user.id).await.unwrap().unwrap();

        // A session token is not a reset token
        let session = service.login(Some("alice"), Some("secret1")).await.unwrap();
        for token in ["garbage", session.as_str()] {
            assert!(matches!(
                service.reset_password(Some(token), Some("newpass1")).await,
                Err(AuthError::InvalidResetToken)
            ));
        }

        let after = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);
        assert_eq!(before.token_version, after.token_version);
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let (service, _) = test_service(mailer.clone());

        assert!(matches!(
            service.forgot_password(Some("ghost@x.com"), ResetLinkStyle::Query).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_mail_failure_is_internal() {
        let (service, users) = test_service(Arc::new(FailingMailer));
        let user = service
            .signup(Some("alice"), Some("a@x.com"), Some("secret1"))
            .await
            .unwrap();

        assert!(matches!(
            service.forgot_password(Some("a@x.com"), ResetLinkStyle::Query).await,
            Err(AuthError::Mail(_))
        ));
        let stored = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.token_version, 0);
    }

    #[test]
    fn test_reset_link_styles() {
        assert_eq!(
            ResetLinkStyle::Query.build("https://f.app", "tok"),
            "https://f.app/reset-password?token=tok"
        );
        assert_eq!(
            ResetLinkStyle::Path.build("https://f.app", "tok"),
            "https://f.app/reset-password/tok"
        );
    }
}
